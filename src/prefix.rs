//! SI, binary, and spelled-out unit prefix tables (spec section 6.3,
//! supplemented from `units.cpp`'s `getPrefixMultiplier` family, which
//! is the only source for the full one/two-character disambiguation
//! tables the distilled spec only shows an excerpt of).
//!
//! Three independent lookup tables are exposed, matching the three
//! ways the parser tries to strip a prefix off the front of a string
//! (phases 8 and 10 of spec section 4.3):
//!
//! - [`one_char_prefix`]: a single ASCII character, e.g. `k` -> kilo.
//! - [`two_char_prefix`]: a two-character prefix that would otherwise
//!   be ambiguous with a one-character match, e.g. `Mi` -> mebi versus
//!   `M` -> mega.
//! - [`word_prefix`]: a prefix spelled out in English, e.g. `kilo`,
//!   including the tongue-in-cheek `hella` (`1e27`) the reference
//!   implementation carries as an easter egg alongside the real
//!   2022 SI prefixes ronna/quetta/ronto/quecto.

/// Look up a single-character SI prefix multiplier.
///
/// When `strict` is `true`, only the canonical-case SI symbol is
/// accepted (`k` not `K`, `u` not `U`); casing variants that the
/// reference implementation tolerates loosely are rejected.
pub fn one_char_prefix(c: char, strict: bool) -> Option<f64> {
    let m = match c {
        'm' => 1e-3,
        'k' => 1e3,
        'K' if !strict => 1e3,
        'M' => 1e6,
        'u' => 1e-6,
        'U' if !strict => 1e-6,
        '\u{b5}' => 1e-6,
        'd' => 1e-1,
        'D' if !strict => 1e-1,
        'c' => 1e-2,
        'C' if !strict => 1e-2,
        'h' => 1e2,
        'H' if !strict => 1e2,
        'n' => 1e-9,
        'p' => 1e-12,
        'G' => 1e9,
        'B' if !strict => 1e9,
        'T' => 1e12,
        'f' => 1e-15,
        'F' if !strict => 1e-15,
        'E' => 1e18,
        'P' => 1e15,
        'Z' => 1e21,
        'Y' => 1e24,
        'y' => 1e-24,
        'a' => 1e-18,
        'A' if !strict => 1e-18,
        'z' => 1e-21,
        'R' => 1e27,
        'r' => 1e-27,
        'Q' => 1e30,
        'q' => 1e-30,
        _ => return None,
    };
    Some(m)
}

/// Look up a two-character SI or binary prefix, for cases where the
/// two-character form takes priority over the one-character form
/// (`Mi` is mebi, not mega followed by a stray `i`).
pub fn two_char_prefix(s: &str) -> Option<f64> {
    let m = match s {
        "da" => 1e1,
        "DA" => 1e1,
        "EX" => 1e18,
        "Ei" => 2f64.powi(60),
        "GA" => 1e9,
        "Gi" => 2f64.powi(30),
        "Ki" => 2f64.powi(10),
        "MA" => 1e6,
        "MM" => 1e6,
        "Mi" => 2f64.powi(20),
        "PT" => 1e15,
        "Pi" => 2f64.powi(50),
        "TR" => 1e12,
        "Ti" => 2f64.powi(40),
        "YA" => 1e24,
        "YO" => 1e-24,
        "Yi" => 2f64.powi(80),
        "Ri" => 2f64.powi(90),
        "Qi" => 2f64.powi(100),
        "ZA" => 1e21,
        "ZO" => 1e-21,
        "Zi" => 2f64.powi(70),
        "mA" => 1e6,
        "mc" => 1e-6,
        "pT" => 1e15,
        _ => return None,
    };
    Some(m)
}

/// A spelled-out word prefix, its multiplier, and the byte length of
/// the prefix within the source word (so the caller can slice off the
/// remainder).
struct WordPrefix {
    word: &'static str,
    multiplier: f64,
}

const WORD_PREFIXES: &[WordPrefix] = &[
    WordPrefix { word: "quetta", multiplier: 1e30 },
    WordPrefix { word: "ronna", multiplier: 1e27 },
    WordPrefix { word: "yotta", multiplier: 1e24 },
    WordPrefix { word: "zetta", multiplier: 1e21 },
    WordPrefix { word: "hella", multiplier: 1e27 },
    WordPrefix { word: "exa", multiplier: 1e18 },
    WordPrefix { word: "peta", multiplier: 1e15 },
    WordPrefix { word: "tera", multiplier: 1e12 },
    WordPrefix { word: "giga", multiplier: 1e9 },
    WordPrefix { word: "mega", multiplier: 1e6 },
    WordPrefix { word: "kilo", multiplier: 1e3 },
    WordPrefix { word: "hecto", multiplier: 1e2 },
    WordPrefix { word: "deka", multiplier: 1e1 },
    WordPrefix { word: "deca", multiplier: 1e1 },
    WordPrefix { word: "deci", multiplier: 1e-1 },
    WordPrefix { word: "centi", multiplier: 1e-2 },
    WordPrefix { word: "milli", multiplier: 1e-3 },
    WordPrefix { word: "micro", multiplier: 1e-6 },
    WordPrefix { word: "nano", multiplier: 1e-9 },
    WordPrefix { word: "pico", multiplier: 1e-12 },
    WordPrefix { word: "femto", multiplier: 1e-15 },
    WordPrefix { word: "atto", multiplier: 1e-18 },
    WordPrefix { word: "zepto", multiplier: 1e-21 },
    WordPrefix { word: "yocto", multiplier: 1e-24 },
    WordPrefix { word: "ronto", multiplier: 1e-27 },
    WordPrefix { word: "quecto", multiplier: 1e-30 },
    WordPrefix { word: "kibi", multiplier: 1024.0 },
    WordPrefix { word: "mebi", multiplier: 1_048_576.0 },
    WordPrefix { word: "gibi", multiplier: 1_073_741_824.0 },
    WordPrefix { word: "tebi", multiplier: 1_099_511_627_776.0 },
    WordPrefix { word: "pebi", multiplier: 1.125_899_906_842_624e15 },
    WordPrefix { word: "exbi", multiplier: 1.152_921_504_606_846_9e18 },
];

/// Strip a spelled-out prefix word off the front of `s`, returning the
/// multiplier and the remainder of the string. Tries the longest
/// candidate words first so `"deka"` isn't mistaken for `"deci"` truncated.
pub fn word_prefix(s: &str) -> Option<(f64, &str)> {
    let lower = s.to_ascii_lowercase();
    let mut candidates: Vec<&WordPrefix> = WORD_PREFIXES.iter().collect();
    candidates.sort_by_key(|p| std::cmp::Reverse(p.word.len()));
    for prefix in candidates {
        if lower.starts_with(prefix.word) && s.len() > prefix.word.len() {
            return Some((prefix.multiplier, &s[prefix.word.len()..]));
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn one_char_strict_accepts_canonical_case() {
        assert_eq!(one_char_prefix('k', true), Some(1e3));
        assert_eq!(one_char_prefix('K', true), None);
        assert_eq!(one_char_prefix('K', false), Some(1e3));
    }

    #[test]
    fn two_char_disambiguates_binary_from_decimal() {
        assert_eq!(two_char_prefix("Mi"), Some(2f64.powi(20)));
        assert_eq!(two_char_prefix("MA"), Some(1e6));
    }

    #[test]
    fn word_prefix_prefers_longest_match() {
        let (mult, rest) = word_prefix("decameter").unwrap();
        assert_eq!(mult, 1e1);
        assert_eq!(rest, "meter");
        let (mult, rest) = word_prefix("decimeter").unwrap();
        assert_eq!(mult, 1e-1);
        assert_eq!(rest, "meter");
    }

    #[test]
    fn word_prefix_hella_is_recognized() {
        let (mult, rest) = word_prefix("hellawatt").unwrap();
        assert_eq!(mult, 1e27);
        assert_eq!(rest, "watt");
    }

    #[test]
    fn word_prefix_rejects_whole_word_match() {
        // "kilo" alone with nothing left isn't a valid prefix + unit split.
        assert!(word_prefix("kilo").is_none());
    }
}
