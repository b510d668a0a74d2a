//! Parser behavior flags (spec section 4.6).
//!
//! String parsing is heuristic and recursive; [`MatchFlags`] bounds how
//! hard the parser tries (recursion and partition depth) and toggles
//! individual heuristics (case-insensitive retry, commodity "of"
//! splitting, single-character-unit matching, and so on) without
//! threading a dozen boolean parameters through every parser function.

/// A 64-bit word of parser behavior switches, passed by value through
/// the recursive-descent parser in `parser.rs`.
#[derive(Copy, Clone, Eq, PartialEq, Hash)]
#[repr(transparent)]
pub struct MatchFlags(u64);

impl MatchFlags {
    /// Raw bit pattern, for storing in the process-wide default
    /// (`registry.rs`) or round-tripping through the flag word spec
    /// section 4.6 describes.
    pub const fn to_bits(self) -> u64 {
        self.0
    }

    /// Reconstruct from a raw bit pattern produced by
    /// [`MatchFlags::to_bits`].
    pub const fn from_bits(bits: u64) -> Self {
        Self(bits)
    }
}

macro_rules! flag_bit {
    ($getter:ident, $setter:ident, $bit:expr) => {
        /// See the field name for what this flag gates.
        pub const fn $getter(self) -> bool {
            self.0 & (1 << $bit) != 0
        }
        /// Return a copy with this flag set to `value`.
        pub const fn $setter(self, value: bool) -> Self {
            if value {
                Self(self.0 | (1 << $bit))
            } else {
                Self(self.0 & !(1 << $bit))
            }
        }
    };
}

impl MatchFlags {
    /// No heuristics enabled, full recursion/partition budget.
    pub const NONE: MatchFlags = MatchFlags(0);

    /// Default flags used by [`crate::unit_from_string`] et al: case
    /// retry, SI-prefix matching, and commodity splitting all on;
    /// strict-mode and single-character matching off.
    pub const DEFAULT: MatchFlags = MatchFlags::NONE
        .with_case_insensitive_retry(true)
        .with_match_si_prefixes(true)
        .with_match_commodities(true)
        .with_recursion_depth(MAX_RECURSION_DEPTH)
        .with_partition_depth(MAX_PARTITION_DEPTH);

    flag_bit!(case_insensitive_retry, with_case_insensitive_retry, 0);
    flag_bit!(match_si_prefixes, with_match_si_prefixes, 1);
    flag_bit!(match_commodities, with_match_commodities, 2);
    flag_bit!(strict, with_strict, 3);
    flag_bit!(match_single_character_units, with_match_single_character_units, 4);
    flag_bit!(allow_custom_units, with_allow_custom_units, 5);

    const DEPTH_BITS: u32 = 6;
    const RECURSION_SHIFT: u32 = 16;
    const PARTITION_SHIFT: u32 = 24;
    const DEPTH_MASK: u64 = (1 << Self::DEPTH_BITS) - 1;

    /// Remaining recursion budget (how many more times the parser may
    /// recurse into a sub-unit on an arithmetic split).
    pub const fn recursion_depth(self) -> u8 {
        ((self.0 >> Self::RECURSION_SHIFT) & Self::DEPTH_MASK) as u8
    }

    /// Return a copy with the recursion budget set to `depth`
    /// (saturating at the field width).
    pub const fn with_recursion_depth(self, depth: u8) -> Self {
        let depth = if (depth as u64) > Self::DEPTH_MASK {
            Self::DEPTH_MASK
        } else {
            depth as u64
        };
        let cleared = self.0 & !(Self::DEPTH_MASK << Self::RECURSION_SHIFT);
        Self(cleared | (depth << Self::RECURSION_SHIFT))
    }

    /// Remaining character-partition budget (how many more times the
    /// parser may try splitting an unmatched run character-by-character).
    pub const fn partition_depth(self) -> u8 {
        ((self.0 >> Self::PARTITION_SHIFT) & Self::DEPTH_MASK) as u8
    }

    /// Return a copy with the partition budget set to `depth`.
    pub const fn with_partition_depth(self, depth: u8) -> Self {
        let depth = if (depth as u64) > Self::DEPTH_MASK {
            Self::DEPTH_MASK
        } else {
            depth as u64
        };
        let cleared = self.0 & !(Self::DEPTH_MASK << Self::PARTITION_SHIFT);
        Self(cleared | (depth << Self::PARTITION_SHIFT))
    }

    /// One fewer recursion step available; used when the parser
    /// descends into a sub-expression.
    pub const fn recursed(self) -> Self {
        self.with_recursion_depth(self.recursion_depth().saturating_sub(1))
    }

    /// One fewer partition step available.
    pub const fn partitioned(self) -> Self {
        self.with_partition_depth(self.partition_depth().saturating_sub(1))
    }

    /// Whether the parser is still allowed to recurse further.
    pub const fn can_recurse(self) -> bool {
        self.recursion_depth() > 0
    }

    /// Whether the parser is still allowed to partition further.
    pub const fn can_partition(self) -> bool {
        self.partition_depth() > 0
    }
}

/// Default recursion depth budget: at most three nested operator
/// splits, the bound spec section 9 calls out to keep pathological
/// inputs from blowing the stack.
pub const MAX_RECURSION_DEPTH: u8 = 3;
/// Default character-partition depth budget: at most three nested
/// partitioning attempts (spec section 9).
pub const MAX_PARTITION_DEPTH: u8 = 3;

impl Default for MatchFlags {
    fn default() -> Self {
        MatchFlags::DEFAULT
    }
}

impl std::fmt::Debug for MatchFlags {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MatchFlags")
            .field("case_insensitive_retry", &self.case_insensitive_retry())
            .field("match_si_prefixes", &self.match_si_prefixes())
            .field("match_commodities", &self.match_commodities())
            .field("strict", &self.strict())
            .field(
                "match_single_character_units",
                &self.match_single_character_units(),
            )
            .field("allow_custom_units", &self.allow_custom_units())
            .field("recursion_depth", &self.recursion_depth())
            .field("partition_depth", &self.partition_depth())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_has_expected_toggles() {
        let f = MatchFlags::DEFAULT;
        assert!(f.case_insensitive_retry());
        assert!(f.match_si_prefixes());
        assert!(f.match_commodities());
        assert!(!f.strict());
        assert_eq!(f.recursion_depth(), MAX_RECURSION_DEPTH);
        assert_eq!(f.partition_depth(), MAX_PARTITION_DEPTH);
    }

    #[test]
    fn recursed_counts_down_and_saturates() {
        let f = MatchFlags::NONE.with_recursion_depth(1);
        assert!(f.can_recurse());
        let f = f.recursed();
        assert!(!f.can_recurse());
        let f = f.recursed();
        assert_eq!(f.recursion_depth(), 0);
    }

    #[test]
    fn setters_do_not_disturb_other_fields() {
        let f = MatchFlags::DEFAULT.with_strict(true);
        assert!(f.strict());
        assert!(f.case_insensitive_retry());
        assert_eq!(f.recursion_depth(), MAX_RECURSION_DEPTH);
    }
}
