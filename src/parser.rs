//! Recursive-descent string-to-unit parser (spec section 4.3,
//! component F).
//!
//! [`unit_from_string`] drives a fixed phase order: a cheap exact
//! dictionary hit first, then progressively more aggressive rewrites
//! (cleanup, arithmetic splitting, prefix stripping, locality and
//! `per`/`of` handling, and finally a character-by-character
//! partitioning fallback). Every phase either produces a unit or
//! falls through to the next; the outermost caller sees
//! [`PreciseUnit::INVALID`] only once, at the very end.
//!
//! Most phases are naturally bounded because they operate on a
//! strictly shorter remainder than their input (stripping a prefix,
//! splitting on an operator). The two phases that don't shrink length
//! on their own — nested operator/power splits and character
//! partitioning — are bounded instead by the recursion and partition
//! counters carried in [`MatchFlags`].

use crate::base::BaseUnit;
use crate::commodity;
use crate::custom;
use crate::dictionary;
use crate::equation::EqType;
use crate::flags::MatchFlags;
use crate::prefix;
use crate::registry;
use crate::unit::PreciseUnit;

const MAX_INPUT_LEN: usize = 1024;

/// Parse `text` into a [`PreciseUnit`] under the given match flags
/// (spec section 6.1's `unit_from_string`).
pub fn unit_from_string(text: &str, flags: MatchFlags) -> PreciseUnit {
    parse_unit(text, flags)
}

fn parse_unit(input: &str, flags: MatchFlags) -> PreciseUnit {
    if input.len() > MAX_INPUT_LEN {
        return PreciseUnit::INVALID;
    }
    if let Some(u) = quick_match(input) {
        return u;
    }
    let cleaned = clean(input);
    if !validate(&cleaned) {
        return PreciseUnit::INVALID;
    }
    if cleaned != input {
        if let Some(u) = quick_match(&cleaned) {
            return u;
        }
    }
    parse_cleaned(&cleaned, flags)
}

/// Phase 1: an exact hit in the overlay or built-in dictionary.
fn quick_match(s: &str) -> Option<PreciseUnit> {
    if s.is_empty() {
        return Some(PreciseUnit::ONE);
    }
    dictionary::global().lookup(s, registry::active_domain())
}

/// Phases 2 and 3, plus dispatch over phases 4 through 17.
fn parse_cleaned(s: &str, flags: MatchFlags) -> PreciseUnit {
    if flags.allow_custom_units() {
        if let Some(u) = try_custom_code(s) {
            return u;
        }
    }
    if flags.match_commodities() {
        if let Some((prefix, name)) = strip_commodity_suffix(s) {
            let inner = parse_unit(prefix, flags);
            if !inner.is_invalid() && !inner.is_error() {
                let code = commodity::global().add(&name);
                return inner.with_commodity(code);
            }
        }
    }
    if let Some((rest, power)) = strip_power_word_prefix(s) {
        let base = parse_unit(rest, flags);
        if !base.is_invalid() {
            return base.pow(power);
        }
    }
    if let Some(u) = phase_leading_number(s, flags) {
        return u;
    }
    if let Some(u) = phase_addition(s, flags) {
        return u;
    }
    if let Some(u) = phase_operator_split(s, flags) {
        return u;
    }
    if let Some(u) = phase_power_split(s, flags) {
        return u;
    }
    if flags.match_si_prefixes() {
        if let Some(u) = phase_si_prefix(s, flags) {
            return u;
        }
    }
    if let Some(u) = phase_capitalization_retry(s, flags) {
        return u;
    }
    if flags.match_si_prefixes() {
        if let Some(u) = phase_word_prefix(s) {
            return u;
        }
    }
    if flags.allow_custom_units() {
        if let Some(u) = try_bracketed_custom(s) {
            return u;
        }
    }
    if let Some(u) = phase_locality(s, flags) {
        return u;
    }
    if let Some(u) = phase_per_operator(s, flags) {
        return u;
    }
    if flags.can_partition() {
        if let Some(u) = phase_partition(s, flags) {
            return u;
        }
    }
    if flags.match_commodities() {
        if let Some(u) = phase_commodity_of(s, flags) {
            return u;
        }
    }
    PreciseUnit::INVALID
}

// ---------------------------------------------------------------------
// Phase 2: clean
// ---------------------------------------------------------------------

/// Canonical Unicode/HTML substitutions (spec section 6.3). Applied in
/// order; none of these outputs are themselves inputs to a later rule,
/// so a single left-to-right pass is enough.
const SUBSTITUTIONS: &[(&str, &str)] = &[
    ("\u{00d7}", "*"),
    ("\u{00f7}", "/"),
    ("\u{00b7}", "*"),
    ("\u{2217}", "*"),
    ("\u{00b5}", "u"),
    ("\u{03bc}", "u"),
    ("\u{2212}", "-"),
    ("\u{00b2}", "^(2)"),
    ("\u{00b3}", "^(3)"),
    ("\u{00bd}", "(0.5)"),
    ("\u{00bc}", "(0.25)"),
    ("\u{00be}", "(0.75)"),
    ("\u{2153}", "(1/3)"),
    ("\u{2154}", "(2/3)"),
    ("\u{207b}\u{00b9}", "^(-1)"),
    ("\u{207b}\u{00b2}", "^(-2)"),
    ("\u{207b}\u{00b3}", "^(-3)"),
    ("\u{207b}\u{2074}", "^(-4)"),
    ("\u{207b}\u{2075}", "^(-5)"),
    ("\u{207b}\u{2076}", "^(-6)"),
    ("\u{207b}\u{2077}", "^(-7)"),
    ("\u{207b}\u{2078}", "^(-8)"),
    ("\u{207b}\u{2079}", "^(-9)"),
    ("\u{221a}Hz", "rootHertz"),
    ("**", "^"),
    ("U.S.", "US"),
    ("B.T.U.", "BTU"),
    ("--", "*"),
];

fn clean(s: &str) -> String {
    let mut out = s.trim().to_owned();
    for (from, to) in SUBSTITUTIONS {
        out = out.replace(from, to);
    }
    out = out.replace("<sup>", "^(").replace("</sup>", ")");
    out = out.replace("<sub>", "_(").replace("</sub>", ")");
    out = collapse_ten_power(&out);
    out = collapse_whitespace(&out);
    out = strip_balanced_outer_parens(out);
    out
}

/// Collapse `10^n`/`10^-n` into scientific notation (`1en`/`1e-n`)
/// ahead of numeric parsing.
fn collapse_ten_power(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let bytes = s.as_bytes();
    let mut i = 0;
    while i < s.len() {
        if s[i..].starts_with("10^") {
            let mut j = i + 3;
            let sign_start = j;
            if j < s.len() && (bytes[j] == b'-' || bytes[j] == b'+') {
                j += 1;
            }
            let digits_start = j;
            while j < s.len() && bytes[j].is_ascii_digit() {
                j += 1;
            }
            if j > digits_start {
                out.push_str("1e");
                out.push_str(&s[sign_start..j]);
                i = j;
                continue;
            }
        }
        let c = s[i..].chars().next().expect("non-empty slice");
        out.push(c);
        i += c.len_utf8();
    }
    out
}

fn collapse_whitespace(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut last_was_space = false;
    for c in s.trim().chars() {
        if c.is_whitespace() {
            if !last_was_space {
                out.push(' ');
            }
            last_was_space = true;
        } else {
            out.push(c);
            last_was_space = false;
        }
    }
    out
}

fn strip_balanced_outer_parens(mut s: String) -> String {
    loop {
        if !s.starts_with('(') || !s.ends_with(')') {
            return s;
        }
        match matching_bracket(&s, 0) {
            Some(idx) if idx == s.len() - 1 => {
                s = s[1..s.len() - 1].to_owned();
            }
            _ => return s,
        }
    }
}

/// `"square "`/`"sq "`/`"cubic "`/`"cu "` prefixes (spec section 6.3's
/// `sq.`/`cu.` abbreviations, generalized to the unabbreviated words)
/// squaring or cubing whatever unit follows.
fn strip_power_word_prefix(s: &str) -> Option<(&str, i32)> {
    for (word, power) in [("square ", 2), ("sq ", 2), ("cubic ", 3), ("cu ", 3)] {
        if let Some(rest) = s.strip_prefix(word) {
            return Some((rest, power));
        }
    }
    None
}

// ---------------------------------------------------------------------
// Phase 3: validate
// ---------------------------------------------------------------------

fn validate(s: &str) -> bool {
    let mut stack = Vec::new();
    for c in s.chars() {
        match c {
            '(' | '[' | '{' => stack.push(c),
            ')' => {
                if stack.pop() != Some('(') {
                    return false;
                }
            }
            ']' => {
                if stack.pop() != Some('[') {
                    return false;
                }
            }
            '}' => {
                if stack.pop() != Some('{') {
                    return false;
                }
            }
            _ => {}
        }
    }
    if !stack.is_empty() {
        return false;
    }
    let chars: Vec<char> = s.chars().collect();
    !chars.windows(2).any(|w| matches!(w[0], '*' | '/' | '^') && matches!(w[1], '*' | '/' | '^'))
}

// ---------------------------------------------------------------------
// Shared scanning helpers
// ---------------------------------------------------------------------

/// Index of the matching close bracket for the bracket character at
/// `open_idx`, tracking nesting of that bracket type only.
fn matching_bracket(s: &str, open_idx: usize) -> Option<usize> {
    let open = s[open_idx..].chars().next()?;
    let close = match open {
        '(' => ')',
        '[' => ']',
        '{' => '}',
        _ => return None,
    };
    let mut depth = 0i32;
    for (i, c) in s[open_idx..].char_indices() {
        if c == open {
            depth += 1;
        } else if c == close {
            depth -= 1;
            if depth == 0 {
                return Some(open_idx + i);
            }
        }
    }
    None
}

/// The last occurrence, at bracket depth zero, of any of `targets`.
/// Skips a `+` that is the exponent sign of scientific notation
/// (`1e+5`) or a leading sign.
fn find_last_top_level(s: &str, targets: &[char]) -> Option<usize> {
    let mut depth = 0i32;
    let mut found = None;
    for (i, c) in s.char_indices() {
        match c {
            '(' | '[' | '{' => depth += 1,
            ')' | ']' | '}' => depth -= 1,
            _ if depth == 0 && targets.contains(&c) => {
                if c == '+' {
                    if i == 0 {
                        continue;
                    }
                    if matches!(s[..i].chars().last(), Some('e') | Some('E')) {
                        continue;
                    }
                }
                found = Some(i);
            }
            _ => {}
        }
    }
    found
}

/// The first whole-word occurrence of `word` at bracket depth zero
/// (used for `"per"`, `"of"`, and the locality tokens).
fn find_top_level_word(s: &str, word: &str) -> Option<usize> {
    let mut depth = 0i32;
    let bytes = s.as_bytes();
    let mut i = 0;
    while i < s.len() {
        let c = s[i..].chars().next().expect("non-empty slice");
        match c {
            '(' | '[' | '{' => depth += 1,
            ')' | ']' | '}' => depth -= 1,
            _ => {}
        }
        if depth == 0 && s[i..].starts_with(word) {
            let before_ok = i == 0 || !bytes[i - 1].is_ascii_alphanumeric();
            let after_idx = i + word.len();
            let after_ok = after_idx >= s.len() || !bytes[after_idx].is_ascii_alphanumeric();
            if before_ok && after_ok {
                return Some(i);
            }
        }
        i += c.len_utf8();
    }
    None
}

fn nth_char_boundary(s: &str, n: usize) -> Option<usize> {
    s.char_indices().map(|(i, _)| i).chain(std::iter::once(s.len())).nth(n)
}

// ---------------------------------------------------------------------
// A small arithmetic evaluator for leading numeric expressions
// (grammar in spec section 6.2: "a parenthesized arithmetic expression
// over * / ^").
// ---------------------------------------------------------------------

struct ExprParser<'a> {
    s: &'a [u8],
    pos: usize,
}

impl ExprParser<'_> {
    fn skip_ws(&mut self) {
        while self.pos < self.s.len() && self.s[self.pos] == b' ' {
            self.pos += 1;
        }
    }

    fn parse_add(&mut self) -> Option<f64> {
        let mut v = self.parse_mul()?;
        loop {
            self.skip_ws();
            if self.pos < self.s.len() && (self.s[self.pos] == b'+' || self.s[self.pos] == b'-') {
                let op = self.s[self.pos];
                self.pos += 1;
                let rhs = self.parse_mul()?;
                v = if op == b'+' { v + rhs } else { v - rhs };
            } else {
                break;
            }
        }
        Some(v)
    }

    fn parse_mul(&mut self) -> Option<f64> {
        let mut v = self.parse_pow()?;
        loop {
            self.skip_ws();
            if self.pos < self.s.len() && (self.s[self.pos] == b'*' || self.s[self.pos] == b'/') {
                let op = self.s[self.pos];
                self.pos += 1;
                let rhs = self.parse_pow()?;
                v = if op == b'*' { v * rhs } else { v / rhs };
            } else {
                break;
            }
        }
        Some(v)
    }

    fn parse_pow(&mut self) -> Option<f64> {
        let base = self.parse_atom()?;
        self.skip_ws();
        if self.pos < self.s.len() && self.s[self.pos] == b'^' {
            self.pos += 1;
            let exp = self.parse_pow()?;
            return Some(base.powf(exp));
        }
        Some(base)
    }

    fn parse_atom(&mut self) -> Option<f64> {
        self.skip_ws();
        if self.pos < self.s.len() && self.s[self.pos] == b'-' {
            self.pos += 1;
            return Some(-self.parse_atom()?);
        }
        if self.pos < self.s.len() && self.s[self.pos] == b'(' {
            self.pos += 1;
            let v = self.parse_add()?;
            self.skip_ws();
            if self.pos >= self.s.len() || self.s[self.pos] != b')' {
                return None;
            }
            self.pos += 1;
            return Some(v);
        }
        let start = self.pos;
        if self.pos < self.s.len() && self.s[self.pos] == b'+' {
            self.pos += 1;
        }
        while self.pos < self.s.len() && (self.s[self.pos].is_ascii_digit() || self.s[self.pos] == b'.') {
            self.pos += 1;
        }
        if self.pos < self.s.len() && (self.s[self.pos] == b'e' || self.s[self.pos] == b'E') {
            let save = self.pos;
            self.pos += 1;
            if self.pos < self.s.len() && (self.s[self.pos] == b'+' || self.s[self.pos] == b'-') {
                self.pos += 1;
            }
            let digits_start = self.pos;
            while self.pos < self.s.len() && self.s[self.pos].is_ascii_digit() {
                self.pos += 1;
            }
            if self.pos == digits_start {
                self.pos = save;
            }
        }
        if self.pos == start {
            return None;
        }
        std::str::from_utf8(&self.s[start..self.pos]).ok()?.parse().ok()
    }
}

fn eval_numeric_expr(s: &str) -> Option<f64> {
    let trimmed = s.trim();
    let mut p = ExprParser { s: trimmed.as_bytes(), pos: 0 };
    let v = p.parse_add()?;
    p.skip_ws();
    if p.pos != p.s.len() {
        return None;
    }
    Some(v)
}

fn parse_leading_scalar(s: &str) -> Option<(f64, &str)> {
    if s.starts_with('(') {
        let close = matching_bracket(s, 0)?;
        let value = eval_numeric_expr(&s[1..close])?;
        return Some((value, &s[close + 1..]));
    }
    let bytes = s.as_bytes();
    let mut i = 0;
    if i < bytes.len() && (bytes[i] == b'+' || bytes[i] == b'-') {
        i += 1;
    }
    let digits_start = i;
    while i < bytes.len() && bytes[i].is_ascii_digit() {
        i += 1;
    }
    if i < bytes.len() && bytes[i] == b'.' {
        i += 1;
        while i < bytes.len() && bytes[i].is_ascii_digit() {
            i += 1;
        }
    }
    if !s[digits_start..i].bytes().any(|b| b.is_ascii_digit()) {
        return None;
    }
    let mut end = i;
    if end < bytes.len() && (bytes[end] == b'e' || bytes[end] == b'E') {
        let mut j = end + 1;
        if j < bytes.len() && (bytes[j] == b'+' || bytes[j] == b'-') {
            j += 1;
        }
        let exp_digits_start = j;
        while j < bytes.len() && bytes[j].is_ascii_digit() {
            j += 1;
        }
        if j > exp_digits_start {
            end = j;
        }
    }
    let value: f64 = s[..end].parse().ok()?;
    Some((value, &s[end..]))
}

// ---------------------------------------------------------------------
// Phases 4-17
// ---------------------------------------------------------------------

/// Phase 4: a leading scalar multiplier, optionally a parenthesized
/// expression, applied to whatever unit parses out of the remainder.
fn phase_leading_number(s: &str, flags: MatchFlags) -> Option<PreciseUnit> {
    let (value, rest) = parse_leading_scalar(s)?;
    let rest = rest.trim_start();
    if rest.is_empty() {
        return Some(PreciseUnit::new(value, BaseUnit::DIMENSIONLESS, commodity::NONE));
    }
    let unit = parse_unit(rest, flags);
    if unit.is_invalid() {
        return None;
    }
    Some(PreciseUnit::new(value, BaseUnit::DIMENSIONLESS, commodity::NONE) * unit)
}

/// Phase 5: a top-level `+` requires both sides to share a dimensional
/// base; the result sums their multipliers.
fn phase_addition(s: &str, flags: MatchFlags) -> Option<PreciseUnit> {
    if !flags.can_recurse() {
        return None;
    }
    let idx = find_last_top_level(s, &['+'])?;
    let left = &s[..idx];
    let right = &s[idx + 1..];
    if left.is_empty() || right.is_empty() {
        return None;
    }
    let sub_flags = flags.recursed();
    let l = parse_unit(left, sub_flags);
    let r = parse_unit(right, sub_flags);
    if l.is_invalid() || r.is_invalid() || l.is_error() || r.is_error() {
        return None;
    }
    if !l.base_unit().has_same_base(r.base_unit()) {
        return None;
    }
    Some(PreciseUnit::new(l.multiplier() + r.multiplier(), l.base_unit(), l.commodity()))
}

/// Phase 6: the last top-level `*` or `/` (left-associative parse puts
/// the numerator on the right of a chain).
fn phase_operator_split(s: &str, flags: MatchFlags) -> Option<PreciseUnit> {
    if !flags.can_recurse() {
        return None;
    }
    let idx = find_last_top_level(s, &['*', '/'])?;
    let op = s[idx..].chars().next().expect("matched char");
    let left = &s[..idx];
    let right = &s[idx + op.len_utf8()..];
    if left.is_empty() || right.is_empty() {
        return None;
    }
    let sub_flags = flags.recursed();
    let l = parse_unit(left, sub_flags);
    let r = parse_unit(right, sub_flags);
    if l.is_invalid() || r.is_invalid() {
        return None;
    }
    Some(if op == '*' { l * r } else { l / r })
}

/// Phase 7: `^` with an integer exponent, optionally parenthesized.
fn phase_power_split(s: &str, flags: MatchFlags) -> Option<PreciseUnit> {
    if !flags.can_recurse() {
        return None;
    }
    let idx = find_last_top_level(s, &['^'])?;
    let base_str = &s[..idx];
    let mut exp_str = &s[idx + 1..];
    if base_str.is_empty() || exp_str.is_empty() {
        return None;
    }
    if exp_str.starts_with('(') && exp_str.ends_with(')') && matching_bracket(exp_str, 0) == Some(exp_str.len() - 1)
    {
        exp_str = &exp_str[1..exp_str.len() - 1];
    }
    let exponent: i32 = exp_str.parse().ok()?;
    let sub_flags = flags.recursed();
    let base = parse_unit(base_str, sub_flags);
    if base.is_invalid() {
        return None;
    }
    Some(base.pow(exponent))
}

/// Phase 8: a one- or two-character SI/binary prefix off the front,
/// resolved against a direct dictionary hit on the remainder (not a
/// full recursive parse, so a prefix-like dictionary entry such as
/// `"min"` can't itself be mistaken for `m` + SI-prefixed `in`: spec
/// section 4.3's tie-break gives the dictionary's phase-1 entry
/// priority over this phase).
fn phase_si_prefix(s: &str, flags: MatchFlags) -> Option<PreciseUnit> {
    let domain = registry::active_domain();
    if let Some(end) = nth_char_boundary(s, 2) {
        if let Some(mult) = prefix::two_char_prefix(&s[..end]) {
            let rest = &s[end..];
            if !rest.is_empty() {
                if let Some(u) = dictionary::global().lookup(rest, domain) {
                    return Some(PreciseUnit::new(mult, BaseUnit::DIMENSIONLESS, commodity::NONE) * u);
                }
            }
        }
    }
    let end = nth_char_boundary(s, 1)?;
    let c = s[..end].chars().next()?;
    let mult = prefix::one_char_prefix(c, flags.strict())?;
    let rest = &s[end..];
    if rest.is_empty() {
        return None;
    }
    let u = dictionary::global().lookup(rest, domain)?;
    Some(PreciseUnit::new(mult, BaseUnit::DIMENSIONLESS, commodity::NONE) * u)
}

/// Phase 9: lowercase the first character and retry from the top, once
/// (the retry only fires when the first character actually changes, so
/// it can't loop).
fn phase_capitalization_retry(s: &str, flags: MatchFlags) -> Option<PreciseUnit> {
    if !flags.case_insensitive_retry() {
        return None;
    }
    if s.chars().count() < 3 {
        return None;
    }
    let mut chars = s.chars();
    let first = chars.next()?;
    if !first.is_uppercase() {
        return None;
    }
    let mut lowered: String = first.to_lowercase().collect();
    lowered.push_str(chars.as_str());
    if lowered == s {
        return None;
    }
    let u = parse_unit(&lowered, flags);
    if u.is_invalid() {
        None
    } else {
        Some(u)
    }
}

/// Phase 10: a spelled-out prefix word (`"kilo"`, `"hella"`, ...).
fn phase_word_prefix(s: &str) -> Option<PreciseUnit> {
    let (mult, rest) = prefix::word_prefix(s)?;
    if rest.is_empty() {
        return None;
    }
    let u = dictionary::global().lookup(rest, registry::active_domain())?;
    Some(PreciseUnit::new(mult, BaseUnit::DIMENSIONLESS, commodity::NONE) * u)
}

const CUSTOM_UNIT_PREFIX: &str = "CXUN[";
const CUSTOM_COUNT_PREFIX: &str = "CXCUN[";
const EQUATION_PREFIX: &str = "EQXUN[";

/// Phase 16 content, checked early (its tokens are unambiguous and
/// cheap to rule out): `CXUN[n]`, `CXCUN[n]`, `EQXUN[n]` decode a
/// literal numeric index rather than hashing a name.
fn try_custom_code(s: &str) -> Option<PreciseUnit> {
    if let Some(rest) = s.strip_prefix(CUSTOM_UNIT_PREFIX) {
        let n: u16 = rest.strip_suffix(']')?.parse().ok()?;
        let base = custom::custom_unit(n % custom::CUSTOM_UNIT_SLOTS);
        return Some(PreciseUnit::new(1.0, base, commodity::NONE));
    }
    if let Some(rest) = s.strip_prefix(CUSTOM_COUNT_PREFIX) {
        let n: u8 = rest.strip_suffix(']')?.parse().ok()?;
        let base = custom::custom_count_unit(n % custom::CUSTOM_COUNT_UNIT_SLOTS);
        return Some(PreciseUnit::new(1.0, base, commodity::NONE));
    }
    if let Some(rest) = s.strip_prefix(EQUATION_PREFIX) {
        let n: i32 = rest.strip_suffix(']')?.parse().ok()?;
        let eq = EqType::from_index(n)?;
        return Some(PreciseUnit::new(1.0, eq.base_unit(), commodity::NONE));
    }
    None
}

/// Phase 11: `[...]` and `{...}` spanning the whole string name an
/// opaque custom unit — a literal slot index, or a name hashed into
/// one of the 1024 (bracket form) or 16 (brace form) slots. A brace
/// group with something *before* it is a commodity suffix instead
/// (handled earlier in [`parse_cleaned`]), which is why this phase
/// only fires when the brackets consume the entire string.
fn try_bracketed_custom(s: &str) -> Option<PreciseUnit> {
    if s.len() >= 2 && s.starts_with('[') && s.ends_with(']') {
        let inner = &s[1..s.len() - 1];
        let slot = custom_slot_from_token(inner, u32::from(custom::CUSTOM_UNIT_SLOTS));
        return Some(PreciseUnit::new(1.0, custom::custom_unit(slot as u16), commodity::NONE));
    }
    if s.len() >= 2 && s.starts_with('{') && s.ends_with('}') {
        let inner = &s[1..s.len() - 1];
        let slot = custom_slot_from_token(inner, u32::from(custom::CUSTOM_COUNT_UNIT_SLOTS));
        return Some(PreciseUnit::new(1.0, custom::custom_count_unit(slot as u8), commodity::NONE));
    }
    None
}

fn custom_slot_from_token(token: &str, modulus: u32) -> u32 {
    let token = token.strip_suffix("'u").unwrap_or(token);
    if let Ok(n) = token.parse::<u32>() {
        return n % modulus;
    }
    commodity::hash_long_code(token) % modulus
}

const LOCALE_TOKENS: &[&str] =
    &["US", "br", "troy", "av", "apothecaries", "IT", "th", "Chinese", "Canadian"];

/// Phase 12: strip locale qualifiers (`US`, `br`, `troy`, ...) and a
/// trailing bracketed temperature-point marker (`[20]`), then retry.
fn phase_locality(s: &str, flags: MatchFlags) -> Option<PreciseUnit> {
    let mut stripped = s.to_owned();
    let mut changed = false;
    for token in LOCALE_TOKENS {
        if let Some(pos) = find_top_level_word(&stripped, token) {
            stripped.replace_range(pos..pos + token.len(), "");
            changed = true;
        }
    }
    if let Some(open) = stripped.rfind('[') {
        let marker = &stripped[open..];
        if marker.ends_with(']') && marker[1..marker.len() - 1].bytes().all(|b| b.is_ascii_digit()) {
            stripped.truncate(open);
            changed = true;
        }
    }
    if !changed {
        return None;
    }
    let cleaned = collapse_whitespace(&stripped);
    if cleaned == s || cleaned.is_empty() {
        return None;
    }
    let u = parse_unit(&cleaned, flags);
    if u.is_invalid() {
        None
    } else {
        Some(u)
    }
}

/// Phase 13: the word `per` is a synonym for `/`.
fn phase_per_operator(s: &str, flags: MatchFlags) -> Option<PreciseUnit> {
    let pos = find_top_level_word(s, "per")?;
    let mut replaced = String::with_capacity(s.len());
    replaced.push_str(&s[..pos]);
    replaced.push('/');
    replaced.push_str(&s[pos + 3..]);
    let replaced = collapse_whitespace(&replaced);
    let u = parse_unit(&replaced, flags);
    if u.is_invalid() {
        None
    } else {
        Some(u)
    }
}

/// Phase 14: try every top-level split point left-to-right. Among
/// splits whose two halves both resolve, prefer the longest left
/// prefix; among splits tied on prefix length, prefer the one whose
/// combined multiplier is closest to 1.0 (spec section 4.3's tie-break).
fn phase_partition(s: &str, flags: MatchFlags) -> Option<PreciseUnit> {
    let sub_flags = flags.partitioned();
    let mut depth = 0i32;
    let mut best: Option<(usize, PreciseUnit)> = None;
    for (i, c) in s.char_indices() {
        match c {
            '(' | '[' | '{' => depth += 1,
            ')' | ']' | '}' => depth -= 1,
            _ => {}
        }
        if i == 0 || depth != 0 {
            continue;
        }
        let left = parse_unit(&s[..i], sub_flags);
        if left.is_invalid() || left.is_error() {
            continue;
        }
        let right = parse_unit(&s[i..], sub_flags);
        if right.is_invalid() || right.is_error() {
            continue;
        }
        let candidate = left * right;
        let is_better = match best {
            None => true,
            Some((best_i, best_unit)) => {
                i > best_i
                    || (i == best_i
                        && candidate.multiplier().abs().ln().abs()
                            < best_unit.multiplier().abs().ln().abs())
            }
        };
        if is_better {
            best = Some((i, candidate));
        }
    }
    best.map(|(_, unit)| unit)
}

/// Phase 15: `<unit> of <name>` attaches `<name>` as a commodity.
fn phase_commodity_of(s: &str, flags: MatchFlags) -> Option<PreciseUnit> {
    let pos = find_top_level_word(s, "of")?;
    let left = s[..pos].trim_end();
    let right = s[pos + 2..].trim_start();
    if left.is_empty() || right.is_empty() {
        return None;
    }
    let unit = parse_unit(left, flags);
    if unit.is_invalid() || unit.is_error() {
        return None;
    }
    let code = commodity::global().add(right);
    Some(unit.with_commodity(code))
}

/// Find an unescaped `{` at bracket depth zero, searching for the
/// commodity-suffix brace (as opposed to one consuming the whole
/// string, which [`try_bracketed_custom`] handles instead).
fn find_unescaped_open_brace(s: &str) -> Option<usize> {
    let bytes = s.as_bytes();
    let mut depth = 0i32;
    let mut last_open_at_depth0 = None;
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'\\' {
            i += 2;
            continue;
        }
        match bytes[i] {
            b'{' => {
                if depth == 0 {
                    last_open_at_depth0 = Some(i);
                }
                depth += 1;
            }
            b'}' => depth -= 1,
            _ => {}
        }
        i += 1;
    }
    last_open_at_depth0
}

fn unescape_commodity(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars().peekable();
    while let Some(c) = chars.next() {
        if c == '\\' {
            if let Some(&next) = chars.peek() {
                out.push(next);
                chars.next();
                continue;
            }
        }
        out.push(c);
    }
    out
}

/// `<unit>{<name>}` (spec section 6.2): a trailing, non-whole-string
/// brace group names a commodity rather than a custom-unit slot.
fn strip_commodity_suffix(s: &str) -> Option<(&str, String)> {
    if !s.ends_with('}') {
        return None;
    }
    let open = find_unescaped_open_brace(s)?;
    if open == 0 {
        return None;
    }
    let inner = &s[open + 1..s.len() - 1];
    Some((&s[..open], unescape_commodity(inner)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::round::compare_round_equals_precise;

    fn default_flags() -> MatchFlags {
        MatchFlags::DEFAULT
    }

    #[test]
    fn dictionary_hit_is_exact() {
        let u = unit_from_string("kg", default_flags());
        assert!(!u.is_invalid());
        assert_eq!(u.base_unit().kilogram(), 1);
    }

    #[test]
    fn one_char_si_prefix_scales_meter() {
        let u = unit_from_string("km", default_flags());
        assert!(!u.is_invalid());
        assert_eq!(u.base_unit().meter(), 1);
        assert!(compare_round_equals_precise(u.multiplier(), 1000.0));
    }

    #[test]
    fn operator_split_builds_joule_from_newton_meter() {
        let u = unit_from_string("N*m", default_flags());
        let joule = dictionary::global().lookup("J", registry::active_domain()).unwrap();
        assert_eq!(u.base_unit(), joule.base_unit());
        assert!(compare_round_equals_precise(u.multiplier(), joule.multiplier()));
    }

    #[test]
    fn operator_split_and_power_split_combine_for_acceleration() {
        let u = unit_from_string("m/s^2", default_flags());
        assert!(!u.is_invalid());
        assert_eq!(u.base_unit().meter(), 1);
        assert_eq!(u.base_unit().second(), -2);
    }

    #[test]
    fn word_prefix_parses_kilowatt() {
        let u = unit_from_string("kilowatt", default_flags());
        let watt = dictionary::global().lookup("W", registry::active_domain()).unwrap();
        assert_eq!(u.base_unit(), watt.base_unit());
        assert!(compare_round_equals_precise(u.multiplier(), watt.multiplier() * 1000.0));
    }

    #[test]
    fn addition_of_same_base_units_sums_multipliers() {
        let u = unit_from_string("ft+ft", default_flags());
        let ft = unit_from_string("ft", default_flags());
        assert!(compare_round_equals_precise(u.multiplier(), ft.multiplier() * 2.0));
    }

    #[test]
    fn per_operator_is_a_division_synonym() {
        let a = unit_from_string("m per s", default_flags());
        let b = unit_from_string("m/s", default_flags());
        assert_eq!(a.base_unit(), b.base_unit());
        assert!(compare_round_equals_precise(a.multiplier(), b.multiplier()));
    }

    #[test]
    fn of_operator_attaches_a_commodity() {
        let u = unit_from_string("kg of milk", default_flags());
        assert!(!u.is_invalid());
        assert_ne!(u.commodity(), commodity::NONE);
        assert_eq!(commodity::global().get_name(u.commodity()).as_deref(), Some("milk"));
    }

    #[test]
    fn braced_commodity_suffix_attaches_to_a_prefix_unit() {
        let u = unit_from_string("kg{oil}", default_flags());
        assert!(!u.is_invalid());
        assert_eq!(commodity::global().get_name(u.commodity()).as_deref(), Some("oil"));
    }

    #[test]
    fn custom_code_decoders_round_trip_a_literal_index() {
        let flags = default_flags().with_allow_custom_units(true);
        let u = unit_from_string("CXUN[17]", flags);
        assert!(!u.is_invalid());
        assert_eq!(custom::custom_unit_number(u.base_unit()), Some(17));
    }

    #[test]
    fn equation_code_decoder_selects_decibel_power() {
        let flags = default_flags().with_allow_custom_units(true);
        let u = unit_from_string("EQXUN[11]", flags);
        assert_eq!(crate::equation::eq_type_of(u.base_unit()), Some(EqType::DecibelPower));
    }

    #[test]
    fn capitalization_retry_falls_back_to_lowercase() {
        let u = unit_from_string("Kg", default_flags());
        assert!(!u.is_invalid());
        assert_eq!(u.base_unit().kilogram(), 1);
    }

    #[test]
    fn locality_marker_is_stripped_before_retry() {
        let plain = unit_from_string("ft", default_flags());
        let localized = unit_from_string("ft US", default_flags());
        assert_eq!(localized.base_unit(), plain.base_unit());
    }

    #[test]
    fn invalid_input_returns_invalid_sentinel() {
        let u = unit_from_string("not a unit at all!!", default_flags());
        assert!(u.is_invalid());
    }

    #[test]
    fn partitioning_recovers_adjacent_unit_tokens() {
        let flags = MatchFlags::DEFAULT.with_partition_depth(3);
        let u = unit_from_string("kgm", flags);
        assert!(!u.is_invalid());
        assert_eq!(u.base_unit().kilogram(), 1);
        assert_eq!(u.base_unit().meter(), 1);
    }
}
