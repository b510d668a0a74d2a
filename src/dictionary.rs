//! The name <-> unit dictionary (spec section 3.4, component E).
//!
//! Two read-mostly tables: [`lookup`] resolves a symbol, word, or short
//! phrase to a [`PreciseUnit`] (used by the parser's quick-match phase
//! and by SI-prefix/word-prefix recursion), and [`reverse_lookup`]
//! finds a preferred symbol for a [`Unit`] (used by the serializer's
//! direct and probe passes). A user-defined overlay sits in front of
//! both, consulted first, with separate input-only and output-only
//! registrations, and a small per-[`Domain`] override table for
//! symbols whose meaning depends on context (`B` is bel in the UCUM
//! domain, billion elsewhere; `T` is tablespoon in the cooking domain,
//! tera- elsewhere).
//!
//! The built-in table is a representative subset, not the ~4500-entry
//! table `unit_definitions.hpp` ships: it covers every domain spec
//! section 3.4 names at least once (SI, customary, imperial, UCUM, cgs,
//! mts, nautical, typographic, medical, astronomical, textile, data,
//! log-scale) without attempting exhaustive coverage, which the spec's
//! size budget (component E at ~8% of a ~12kloc core) does not call for.

use std::collections::HashMap;
use std::sync::RwLock;

use crate::base::BaseUnit;
use crate::commodity;
use crate::equation::EqType;
use crate::registry::Domain;
use crate::unit::{PreciseUnit, Unit};

#[allow(clippy::too_many_arguments)]
const fn b(
    meter: i32,
    second: i32,
    kilogram: i32,
    ampere: i32,
    candela: i32,
    kelvin: i32,
    mole: i32,
    radian: i32,
    currency: i32,
    count: i32,
) -> BaseUnit {
    BaseUnit::new(
        meter, second, kilogram, ampere, candela, kelvin, mole, radian, currency, count, false,
        false, false, false,
    )
}

const DIMENSIONLESS: BaseUnit = BaseUnit::DIMENSIONLESS;
const METER: BaseUnit = b(1, 0, 0, 0, 0, 0, 0, 0, 0, 0);
const SECOND: BaseUnit = b(0, 1, 0, 0, 0, 0, 0, 0, 0, 0);
const KILOGRAM: BaseUnit = b(0, 0, 1, 0, 0, 0, 0, 0, 0, 0);
const AMPERE: BaseUnit = b(0, 0, 0, 1, 0, 0, 0, 0, 0, 0);
const CANDELA: BaseUnit = b(0, 0, 0, 0, 1, 0, 0, 0, 0, 0);
const KELVIN: BaseUnit = b(0, 0, 0, 0, 0, 1, 0, 0, 0, 0);
const MOLE: BaseUnit = b(0, 0, 0, 0, 0, 0, 1, 0, 0, 0);
const RADIAN: BaseUnit = b(0, 0, 0, 0, 0, 0, 0, 1, 0, 0);
const CURRENCY: BaseUnit = b(0, 0, 0, 0, 0, 0, 0, 0, 1, 0);
const COUNT: BaseUnit = b(0, 0, 0, 0, 0, 0, 0, 0, 0, 1);

const KELVIN_TEMP: BaseUnit = BaseUnit::new(0, 0, 0, 0, 0, 1, 0, 0, 0, 0, false, false, true, false);
const HERTZ: BaseUnit = b(0, -1, 0, 0, 0, 0, 0, 0, 0, 0);
const NEWTON: BaseUnit = b(1, -2, 1, 0, 0, 0, 0, 0, 0, 0);
const PASCAL: BaseUnit = b(-1, -2, 1, 0, 0, 0, 0, 0, 0, 0);
const JOULE: BaseUnit = b(2, -2, 1, 0, 0, 0, 0, 0, 0, 0);
const WATT: BaseUnit = b(2, -3, 1, 0, 0, 0, 0, 0, 0, 0);
const VOLT: BaseUnit = b(2, -3, 1, -1, 0, 0, 0, 0, 0, 0);
const COULOMB: BaseUnit = b(0, 1, 0, 1, 0, 0, 0, 0, 0, 0);
const FARAD: BaseUnit = b(-2, 4, -1, 2, 0, 0, 0, 0, 0, 0);
const OHM: BaseUnit = b(2, -3, 1, -2, 0, 0, 0, 0, 0, 0);
const SIEMENS: BaseUnit = b(-2, 3, -1, 2, 0, 0, 0, 0, 0, 0);
const WEBER: BaseUnit = b(2, -2, 1, -1, 0, 0, 0, 0, 0, 0);
const TESLA: BaseUnit = b(0, -2, 1, -1, 0, 0, 0, 0, 0, 0);
const HENRY: BaseUnit = b(2, -2, 1, -2, 0, 0, 0, 0, 0, 0);

const fn eq(kind: EqType) -> BaseUnit {
    kind.base_unit()
}

/// A dictionary entry: a canonical symbol plus the unit it names.
struct Entry {
    name: &'static str,
    unit: PreciseUnit,
}

macro_rules! entry {
    ($name:expr, $mult:expr, $base:expr) => {
        Entry { name: $name, unit: PreciseUnit::new($mult, $base, commodity::NONE) }
    };
}

/// Built-in dictionary, sorted by nothing in particular; lookups are
/// linear over this slice plus a `HashMap` built once from it (see
/// [`builtin_map`]). Entries earlier in the list win ties in the
/// reverse lookup (first match kept).
static BUILTIN: &[Entry] = &[
    // --- SI base units ---
    entry!("m", 1.0, METER),
    entry!("meter", 1.0, METER),
    entry!("metre", 1.0, METER),
    entry!("s", 1.0, SECOND),
    entry!("sec", 1.0, SECOND),
    entry!("second", 1.0, SECOND),
    entry!("g", 0.001, KILOGRAM),
    entry!("gram", 0.001, KILOGRAM),
    entry!("kg", 1.0, KILOGRAM),
    entry!("A", 1.0, AMPERE),
    entry!("amp", 1.0, AMPERE),
    entry!("ampere", 1.0, AMPERE),
    entry!("cd", 1.0, CANDELA),
    entry!("candela", 1.0, CANDELA),
    entry!("K", 1.0, KELVIN),
    entry!("kelvin", 1.0, KELVIN),
    entry!("degC", 1.0, KELVIN_TEMP),
    entry!("celsius", 1.0, KELVIN_TEMP),
    entry!("degF", 5.0 / 9.0, KELVIN_TEMP),
    entry!("fahrenheit", 5.0 / 9.0, KELVIN_TEMP),
    entry!("mol", 1.0, MOLE),
    entry!("mole", 1.0, MOLE),
    entry!("rad", 1.0, RADIAN),
    entry!("radian", 1.0, RADIAN),
    entry!("$", 1.0, CURRENCY),
    entry!("USD", 1.0, CURRENCY),
    entry!("item", 1.0, COUNT),
    entry!("count", 1.0, COUNT),
    entry!("each", 1.0, COUNT),
    // --- dimensionless ---
    entry!("", 1.0, DIMENSIONLESS),
    entry!("ratio", 1.0, DIMENSIONLESS),
    entry!("percent", 0.01, DIMENSIONLESS),
    entry!("%", 0.01, DIMENSIONLESS),
    entry!("ppm", 1e-6, DIMENSIONLESS),
    entry!("ppb", 1e-9, DIMENSIONLESS),
    entry!("strain", 1.0, DIMENSIONLESS),
    // --- derived SI ---
    entry!("Hz", 1.0, HERTZ),
    entry!("hertz", 1.0, HERTZ),
    entry!("N", 1.0, NEWTON),
    entry!("newton", 1.0, NEWTON),
    entry!("Pa", 1.0, PASCAL),
    entry!("pascal", 1.0, PASCAL),
    entry!("J", 1.0, JOULE),
    entry!("joule", 1.0, JOULE),
    entry!("W", 1.0, WATT),
    entry!("watt", 1.0, WATT),
    entry!("V", 1.0, VOLT),
    entry!("volt", 1.0, VOLT),
    entry!("C", 1.0, COULOMB),
    entry!("coulomb", 1.0, COULOMB),
    entry!("F", 1.0, FARAD),
    entry!("farad", 1.0, FARAD),
    entry!("ohm", 1.0, OHM),
    entry!("S", 1.0, SIEMENS),
    entry!("siemens", 1.0, SIEMENS),
    entry!("Wb", 1.0, WEBER),
    entry!("weber", 1.0, WEBER),
    entry!("T", 1.0, TESLA),
    entry!("tesla", 1.0, TESLA),
    entry!("H", 1.0, HENRY),
    entry!("henry", 1.0, HENRY),
    entry!("eV", 1.602_176_634e-19, JOULE),
    entry!("cal", 4.184, JOULE),
    entry!("calorie", 4.184, JOULE),
    entry!("BTU", 1055.055_852_62, JOULE),
    entry!("Wh", 3600.0, JOULE),
    entry!("kWh", 3_600_000.0, JOULE),
    // --- time, non-base ---
    entry!("min", 60.0, SECOND),
    entry!("minute", 60.0, SECOND),
    entry!("hr", 3600.0, SECOND),
    entry!("h", 3600.0, SECOND),
    entry!("hour", 3600.0, SECOND),
    entry!("day", 86_400.0, SECOND),
    entry!("yr", 31_557_600.0, SECOND),
    entry!("year", 31_557_600.0, SECOND),
    entry!("ms", 0.001, SECOND),
    entry!("ns", 1e-9, SECOND),
    // --- international length, US/imperial customary ---
    entry!("in", 0.0254, METER),
    entry!("inch", 0.0254, METER),
    entry!("ft", 0.3048, METER),
    entry!("foot", 0.3048, METER),
    entry!("feet", 0.3048, METER),
    entry!("yd", 0.9144, METER),
    entry!("yard", 0.9144, METER),
    entry!("mile", 1609.344, METER),
    entry!("mi", 1609.344, METER),
    entry!("league", 3.0 * 1609.344, METER),
    entry!("nmi", 1852.0, METER),
    entry!("nautical_mile", 1852.0, METER),
    entry!("fathom", 1.8288, METER),
    entry!("furlong", 201.168, METER),
    entry!("chain", 20.1168, METER),
    entry!("rod", 5.0292, METER),
    entry!("point", 127.0 / 360_000.0, METER),
    entry!("pica", 127.0 / 30_000.0, METER),
    // --- customary mass ---
    entry!("lb", 0.453_592_37, KILOGRAM),
    entry!("lbm", 0.453_592_37, KILOGRAM),
    entry!("pound", 0.453_592_37, KILOGRAM),
    entry!("oz", 0.028_349_523_125, KILOGRAM),
    entry!("ounce", 0.028_349_523_125, KILOGRAM),
    entry!("stone", 6.350_293_18, KILOGRAM),
    entry!("ton", 907.184_74, KILOGRAM),
    entry!("grain", 0.000_064_798_91, KILOGRAM),
    entry!("slug", 14.593_903, KILOGRAM),
    // --- customary volume ---
    entry!("L", 0.001, b(3, 0, 0, 0, 0, 0, 0, 0, 0, 0)),
    entry!("liter", 0.001, b(3, 0, 0, 0, 0, 0, 0, 0, 0, 0)),
    entry!("litre", 0.001, b(3, 0, 0, 0, 0, 0, 0, 0, 0, 0)),
    entry!("gal", 0.003_785_411_784, b(3, 0, 0, 0, 0, 0, 0, 0, 0, 0)),
    entry!("gallon", 0.003_785_411_784, b(3, 0, 0, 0, 0, 0, 0, 0, 0, 0)),
    entry!("qt", 0.000_946_352_946, b(3, 0, 0, 0, 0, 0, 0, 0, 0, 0)),
    entry!("quart", 0.000_946_352_946, b(3, 0, 0, 0, 0, 0, 0, 0, 0, 0)),
    entry!("pt", 0.000_473_176_473, b(3, 0, 0, 0, 0, 0, 0, 0, 0, 0)),
    entry!("pint", 0.000_473_176_473, b(3, 0, 0, 0, 0, 0, 0, 0, 0, 0)),
    entry!("cup", 0.000_236_588_236_5, b(3, 0, 0, 0, 0, 0, 0, 0, 0, 0)),
    entry!("floz", 2.957_352_956_25e-5, b(3, 0, 0, 0, 0, 0, 0, 0, 0, 0)),
    entry!("tbsp", 1.478_676_478_125e-5, b(3, 0, 0, 0, 0, 0, 0, 0, 0, 0)),
    entry!("tablespoon", 1.478_676_478_125e-5, b(3, 0, 0, 0, 0, 0, 0, 0, 0, 0)),
    entry!("tsp", 4.928_921_593_75e-6, b(3, 0, 0, 0, 0, 0, 0, 0, 0, 0)),
    entry!("teaspoon", 4.928_921_593_75e-6, b(3, 0, 0, 0, 0, 0, 0, 0, 0, 0)),
    entry!("bbl", 0.158_987_294_928, b(3, 0, 0, 0, 0, 0, 0, 0, 0, 0)),
    entry!("barrel", 0.158_987_294_928, b(3, 0, 0, 0, 0, 0, 0, 0, 0, 0)),
    entry!("acre", 4046.856_422_4, b(2, 0, 0, 0, 0, 0, 0, 0, 0, 0)),
    // --- cgs ---
    entry!("dyn", 1e-5, NEWTON),
    entry!("erg", 1e-7, JOULE),
    entry!("gal_cgs", 0.01, b(1, -2, 0, 0, 0, 0, 0, 0, 0, 0)),
    entry!("poise", 0.1, PASCAL.mul(SECOND)),
    entry!("stokes", 1e-4, b(2, -1, 0, 0, 0, 0, 0, 0, 0, 0)),
    entry!("gauss", 1e-4, TESLA),
    entry!("oersted", 79.577_471_5, b(0, 0, 0, 1, 0, 0, 0, 0, 0, 0)),
    entry!("maxwell", 1e-8, WEBER),
    // --- mts / metric-technical ---
    entry!("sthene", 1000.0, NEWTON),
    entry!("pieze", 1000.0, PASCAL),
    entry!("thermie", 4_185_860.0, JOULE),
    // --- nautical ---
    entry!("knot", 0.514_444_444, b(1, -1, 0, 0, 0, 0, 0, 0, 0, 0)),
    entry!("kn", 0.514_444_444, b(1, -1, 0, 0, 0, 0, 0, 0, 0, 0)),
    entry!("fathom_nautical", 1.852, METER),
    // --- typographic ---
    entry!("pt_typ", 127.0 / 360_000.0, METER),
    entry!("px", 1.0 / 96.0 * 0.0254, METER),
    // --- medical/clinical ---
    entry!("mmHg", 133.322_387_415, PASCAL),
    entry!("torr", 133.322_368_421, PASCAL),
    entry!("cc", 1e-6, b(3, 0, 0, 0, 0, 0, 0, 0, 0, 0)),
    entry!("IU", 1.0, DIMENSIONLESS),
    entry!("mEq", 1.0, DIMENSIONLESS),
    // --- astronomical ---
    entry!("au", 1.495_978_707e11, METER),
    entry!("ly", 9.460_730_472_580_8e15, METER),
    entry!("pc", 3.085_677_581_491_4e16, METER),
    entry!("parsec", 3.085_677_581_491_4e16, METER),
    // --- textile ---
    entry!("denier", 1.0 / 9_000.0, b(0, 0, 1, 0, 0, 0, 0, 0, 0, 0)),
    entry!("tex", 1.0 / 1_000.0, b(0, 0, 1, 0, 0, 0, 0, 0, 0, 0)),
    // --- data / computing ---
    entry!("bit", 1.0, b(0, 0, 0, 0, 0, 0, 0, 0, 0, 0)),
    entry!("b", 1.0, b(0, 0, 0, 0, 0, 0, 0, 0, 0, 0)),
    entry!("byte", 8.0, b(0, 0, 0, 0, 0, 0, 0, 0, 0, 0)),
    entry!("B", 8.0, b(0, 0, 0, 0, 0, 0, 0, 0, 0, 0)),
    entry!("baud", 1.0, HERTZ),
    // --- pressure / misc derived ---
    entry!("atm", 101_325.0, PASCAL),
    entry!("bar", 100_000.0, PASCAL),
    entry!("psi", 6894.757_293_168_36, PASCAL),
    // --- log-scale / equation units ---
    entry!("B", 1.0, eq(EqType::BelPower)),
    entry!("bel", 1.0, eq(EqType::BelPower)),
    entry!("dB", 1.0, eq(EqType::DecibelPower)),
    entry!("dBm", 1.0, eq(EqType::DecibelPower)),
    entry!("Np", 1.0, eq(EqType::Neper)),
    entry!("neper", 1.0, eq(EqType::Neper)),
    entry!("pH", 1.0, DIMENSIONLESS),
    entry!("Mw", 1.0, eq(EqType::MomentMagnitude)),
    entry!("SSHWS", 1.0, eq(EqType::SaffirSimpson)),
    entry!("Bft", 1.0, eq(EqType::Beaufort)),
    entry!("Fscale", 1.0, eq(EqType::Fujita)),
];

/// A handful of seed units the serializer's probe pass (spec section
/// 4.4 step 8) multiplies/divides against when hunting for a concise
/// canonical rendering.
pub static PROBE_SEEDS: &[(&str, BaseUnit, f64)] = &[
    ("s", SECOND, 1.0),
    ("m", METER, 1.0),
    ("kg", KILOGRAM, 1.0),
    ("mol", MOLE, 1.0),
    ("$", CURRENCY, 1.0),
    ("rad", RADIAN, 1.0),
    ("item", COUNT, 1.0),
    ("cd", CANDELA, 1.0),
    ("A", AMPERE, 1.0),
    ("K", KELVIN, 1.0),
    ("ms", SECOND, 0.001),
    ("min", SECOND, 60.0),
    ("hr", SECOND, 3600.0),
    ("day", SECOND, 86_400.0),
    ("lb", KILOGRAM, 0.453_592_37),
    ("ft", METER, 0.3048),
    ("mile", METER, 1609.344),
    ("L", b(3, 0, 0, 0, 0, 0, 0, 0, 0, 0), 0.001),
    ("km", METER, 1000.0),
    ("V", VOLT, 1.0),
    ("W", WATT, 1.0),
    ("kW", WATT, 1000.0),
    ("MW", WATT, 1e6),
    ("GW", WATT, 1e9),
    ("eV", JOULE, 1.602_176_634e-19),
];

/// Domain-scoped override: a symbol whose meaning shifts inside a
/// particular [`Domain`].
struct DomainEntry {
    domain: Domain,
    name: &'static str,
    unit: PreciseUnit,
}

/// Well-known domain tags. Any caller-chosen `u32` is valid; these are
/// just the ones the built-in override table recognizes.
pub mod domain {
    use crate::registry::Domain;
    /// No domain override (the default).
    pub const NONE: Domain = 0;
    /// UCUM: `B` means bel.
    pub const UCUM: Domain = 1;
    /// Cooking: `T`/`t` mean tablespoon/teaspoon.
    pub const COOKING: Domain = 2;
    /// Surveying: `'` means US survey foot.
    pub const SURVEYING: Domain = 3;
}

static DOMAIN_OVERRIDES: &[DomainEntry] = &[
    DomainEntry { domain: domain::UCUM, name: "B", unit: PreciseUnit::new(1.0, eq(EqType::BelPower), commodity::NONE) },
    DomainEntry { domain: domain::COOKING, name: "T", unit: PreciseUnit::new(1.478_676_478_125e-5, b(3, 0, 0, 0, 0, 0, 0, 0, 0, 0), commodity::NONE) },
    DomainEntry { domain: domain::COOKING, name: "t", unit: PreciseUnit::new(4.928_921_593_75e-6, b(3, 0, 0, 0, 0, 0, 0, 0, 0, 0), commodity::NONE) },
    DomainEntry { domain: domain::SURVEYING, name: "'", unit: PreciseUnit::new(1200.0 / 3937.0, METER, commodity::NONE) },
];

fn domain_override_table() -> &'static [DomainEntry] {
    DOMAIN_OVERRIDES
}

/// Whether a registration is visible to parsing, to serialization, or
/// both (spec section 3.4: "separate input-only and output-only user
/// registrations").
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum Visibility {
    /// Consulted by both `lookup` and `reverse_lookup`.
    Both,
    /// Consulted only by `lookup` (parsing).
    InputOnly,
    /// Consulted only by `reverse_lookup` (serialization).
    OutputOnly,
}

struct OverlayEntry {
    unit: PreciseUnit,
    visibility: Visibility,
}

#[derive(Default)]
struct Overlay {
    by_name: HashMap<String, OverlayEntry>,
}

/// The user-defined unit overlay (spec section 3.4/6.1): a read-mostly
/// map consulted before the built-in dictionary, behind an `RwLock`
/// per spec section 9's "read-write synchronization primitive" option.
pub struct Dictionary {
    overlay: RwLock<Overlay>,
    builtin: HashMap<&'static str, &'static Entry>,
}

impl Dictionary {
    /// Build the dictionary, indexing the built-in table once.
    pub fn new() -> Self {
        let mut builtin = HashMap::with_capacity(BUILTIN.len());
        for entry in BUILTIN {
            builtin.entry(entry.name).or_insert(entry);
        }
        Self { overlay: RwLock::new(Overlay::default()), builtin }
    }

    /// Resolve `name` to a unit: overlay first (subject to
    /// [`crate::registry::user_defined_units_enabled`] only gating new
    /// insertions, not lookups), then the built-in table, then any
    /// domain override active for `domain`.
    pub fn lookup(&self, name: &str, domain: Domain) -> Option<PreciseUnit> {
        if domain != domain::NONE {
            if let Some(entry) =
                domain_override_table().iter().find(|e| e.domain == domain && e.name == name)
            {
                return Some(entry.unit);
            }
        }
        {
            let overlay = self.overlay.read().expect("dictionary overlay poisoned");
            if let Some(entry) = overlay.by_name.get(name) {
                if matches!(entry.visibility, Visibility::Both | Visibility::InputOnly) {
                    return Some(entry.unit);
                }
            }
        }
        self.builtin.get(name).map(|e| e.unit)
    }

    /// Find a preferred symbol for `unit`'s dimensional base and
    /// (tolerance-equal) multiplier in the built-in table only; callers
    /// that also need overlay hits should try
    /// [`Dictionary::reverse_lookup_overlay`] first (it returns an owned
    /// `String` since overlay entries aren't `'static`).
    pub fn reverse_lookup(&self, unit: Unit) -> Option<&'static str> {
        BUILTIN.iter().find(|e| e.unit.to_fast() == unit).map(|e| e.name)
    }

    /// Resolve an overlay name to its owned string and unit, for
    /// callers (the serializer) that need an owned result because the
    /// overlay isn't `'static`.
    pub fn reverse_lookup_overlay(&self, unit: Unit) -> Option<String> {
        let overlay = self.overlay.read().expect("dictionary overlay poisoned");
        overlay.by_name.iter().find_map(|(name, entry)| {
            if matches!(entry.visibility, Visibility::Both | Visibility::OutputOnly)
                && entry.unit.to_fast() == unit
            {
                Some(name.clone())
            } else {
                None
            }
        })
    }

    /// Register a user-defined unit under `name`, visible per
    /// `visibility`. No-op (but still `Ok`) if
    /// [`crate::registry::user_defined_units_enabled`] is `false`;
    /// existing entries stay readable regardless.
    pub fn add_user_defined_unit(&self, name: &str, unit: PreciseUnit, visibility: Visibility) {
        if !crate::registry::user_defined_units_enabled() {
            return;
        }
        let mut overlay = self.overlay.write().expect("dictionary overlay poisoned");
        overlay.by_name.insert(name.to_owned(), OverlayEntry { unit, visibility });
    }

    /// Remove a single user-defined unit by name.
    pub fn remove_user_defined_unit(&self, name: &str) {
        let mut overlay = self.overlay.write().expect("dictionary overlay poisoned");
        overlay.by_name.remove(name);
    }

    /// Remove every user-defined unit.
    pub fn clear_user_defined_units(&self) {
        let mut overlay = self.overlay.write().expect("dictionary overlay poisoned");
        overlay.by_name.clear();
    }
}

impl Default for Dictionary {
    fn default() -> Self {
        Self::new()
    }
}

/// The process-wide dictionary instance the parser and serializer share.
pub fn global() -> &'static Dictionary {
    static INSTANCE: std::sync::OnceLock<Dictionary> = std::sync::OnceLock::new();
    INSTANCE.get_or_init(Dictionary::new)
}

/// `(quantity name, default unit)` pairs for [`default_unit`] (spec
/// section 6.1's `default_unit(quantity_name)`), one representative SI
/// unit per named physical quantity.
const DEFAULT_UNITS: &[(&str, BaseUnit)] = &[
    ("length", METER),
    ("mass", KILOGRAM),
    ("time", SECOND),
    ("current", AMPERE),
    ("temperature", KELVIN_TEMP),
    ("luminosity", CANDELA),
    ("substance", MOLE),
    ("angle", RADIAN),
    ("currency", CURRENCY),
    ("count", COUNT),
    ("frequency", HERTZ),
    ("force", NEWTON),
    ("pressure", PASCAL),
    ("energy", JOULE),
    ("power", WATT),
    ("voltage", VOLT),
    ("charge", COULOMB),
    ("capacitance", FARAD),
    ("resistance", OHM),
    ("conductance", SIEMENS),
    ("magnetic_flux", WEBER),
    ("magnetic_flux_density", TESLA),
    ("inductance", HENRY),
];

/// Resolve a quantity name (`"mass"`, `"length"`, ...) to the SI unit
/// it defaults to. Unknown names resolve to [`PreciseUnit::INVALID`].
pub fn default_unit(quantity_name: &str) -> PreciseUnit {
    DEFAULT_UNITS
        .iter()
        .find(|(name, _)| *name == quantity_name)
        .map(|(_, base)| PreciseUnit::new(1.0, *base, commodity::NONE))
        .unwrap_or(PreciseUnit::INVALID)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_resolves_si_base_units() {
        let dict = Dictionary::new();
        assert_eq!(dict.lookup("m", domain::NONE).unwrap().base_unit(), METER);
        assert_eq!(dict.lookup("kg", domain::NONE).unwrap().base_unit(), KILOGRAM);
    }

    #[test]
    fn domain_override_shadows_default_meaning() {
        let dict = Dictionary::new();
        let default_b = dict.lookup("B", domain::NONE).unwrap();
        assert!(!default_b.base_unit().is_equation(), "default B means byte, not bel");
        let ucum_b = dict.lookup("B", domain::UCUM).unwrap();
        assert!(ucum_b.base_unit().is_equation(), "UCUM domain overrides B to bel");
    }

    #[test]
    fn overlay_shadows_builtin_and_supports_removal() {
        let dict = Dictionary::new();
        let custom = PreciseUnit::new(1e-6, DIMENSIONLESS, commodity::NONE);
        dict.add_user_defined_unit("ustrain", custom, Visibility::Both);
        assert_eq!(dict.lookup("ustrain", domain::NONE).unwrap(), custom);
        dict.remove_user_defined_unit("ustrain");
        assert!(dict.lookup("ustrain", domain::NONE).is_none());
    }

    #[test]
    fn input_only_registration_is_invisible_to_reverse_lookup() {
        let dict = Dictionary::new();
        let custom = PreciseUnit::new(1.0, b(5, 5, 0, 0, 0, 0, 0, 0, 0, 0), commodity::NONE);
        dict.add_user_defined_unit("weird", custom, Visibility::InputOnly);
        assert!(dict.lookup("weird", domain::NONE).is_some());
        assert!(dict.reverse_lookup_overlay(custom.to_fast()).is_none());
    }

    #[test]
    fn clear_removes_every_overlay_entry() {
        let dict = Dictionary::new();
        dict.add_user_defined_unit("a", PreciseUnit::ONE, Visibility::Both);
        dict.add_user_defined_unit("b", PreciseUnit::ONE, Visibility::Both);
        dict.clear_user_defined_units();
        assert!(dict.lookup("a", domain::NONE).is_none());
        assert!(dict.lookup("b", domain::NONE).is_none());
    }

    #[test]
    fn default_unit_resolves_known_quantities() {
        assert_eq!(default_unit("mass").base_unit(), KILOGRAM);
        assert_eq!(default_unit("length").base_unit(), METER);
        assert!(default_unit("not_a_quantity").is_invalid());
    }
}
