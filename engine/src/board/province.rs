//! Provinces, coasts and powers of the standard board.
//!
//! The 75 provinces are generated from a single table in alphabetical order
//! of their three-letter code, so `Province as usize` doubles as an index
//! into every per-province array in the crate.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// The number of provinces on the standard board.
pub const PROVINCE_COUNT: usize = 75;

/// The number of supply centers on the standard board.
pub const SUPPLY_CENTER_COUNT: usize = 34;

/// Supply-center status of a province.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Center {
    /// Not a supply center.
    Barren,
    /// A supply center nobody starts with.
    Neutral,
    /// A home supply center of the given power.
    Home(Power),
}

/// Classifies a province by terrain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProvinceType {
    Land,
    Sea,
    Coastal,
}

/// Static metadata for a province.
#[derive(Debug)]
pub struct ProvinceInfo {
    pub abbr: &'static str,
    pub name: &'static str,
    pub kind: ProvinceType,
    pub center: Center,
    pub coasts: &'static [Coast],
}

macro_rules! standard_provinces {
    ($($variant:ident => $abbr:literal, $name:literal, $kind:ident, $center:expr $(, [$($coast:ident),+])?;)+) => {
        /// A province of the standard board.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        #[repr(u8)]
        pub enum Province {
            $($variant,)+
        }

        /// All provinces in index order.
        pub const ALL_PROVINCES: [Province; PROVINCE_COUNT] = [$(Province::$variant,)+];

        /// Lookup table indexed by `Province as usize`.
        pub static PROVINCE_INFO: [ProvinceInfo; PROVINCE_COUNT] = {
            use Center::*;
            use Power::*;
            [$(ProvinceInfo {
                abbr: $abbr,
                name: $name,
                kind: ProvinceType::$kind,
                center: $center,
                coasts: &[$($(Coast::$coast),+)?],
            },)+]
        };

        impl Province {
            /// Looks up a province by its three-letter code (lowercase).
            fn from_code(code: &str) -> Option<Province> {
                match code {
                    $($abbr => Some(Province::$variant),)+
                    _ => None,
                }
            }
        }
    };
}

standard_provinces! {
    Adr => "adr", "Adriatic Sea", Sea, Barren;
    Aeg => "aeg", "Aegean Sea", Sea, Barren;
    Alb => "alb", "Albania", Coastal, Barren;
    Ank => "ank", "Ankara", Coastal, Home(Turkey);
    Apu => "apu", "Apulia", Coastal, Barren;
    Arm => "arm", "Armenia", Coastal, Barren;
    Bal => "bal", "Baltic Sea", Sea, Barren;
    Bar => "bar", "Barents Sea", Sea, Barren;
    Bel => "bel", "Belgium", Coastal, Neutral;
    Ber => "ber", "Berlin", Coastal, Home(Germany);
    Bla => "bla", "Black Sea", Sea, Barren;
    Boh => "boh", "Bohemia", Land, Barren;
    Bot => "bot", "Gulf of Bothnia", Sea, Barren;
    Bre => "bre", "Brest", Coastal, Home(France);
    Bud => "bud", "Budapest", Land, Home(Austria);
    Bul => "bul", "Bulgaria", Coastal, Neutral, [East, South];
    Bur => "bur", "Burgundy", Land, Barren;
    Cly => "cly", "Clyde", Coastal, Barren;
    Con => "con", "Constantinople", Coastal, Home(Turkey);
    Den => "den", "Denmark", Coastal, Neutral;
    Eas => "eas", "Eastern Mediterranean", Sea, Barren;
    Edi => "edi", "Edinburgh", Coastal, Home(England);
    Eng => "eng", "English Channel", Sea, Barren;
    Fin => "fin", "Finland", Coastal, Barren;
    Gal => "gal", "Galicia", Land, Barren;
    Gas => "gas", "Gascony", Coastal, Barren;
    Gol => "gol", "Gulf of Lyon", Sea, Barren;
    Gre => "gre", "Greece", Coastal, Neutral;
    Hel => "hel", "Heligoland Bight", Sea, Barren;
    Hol => "hol", "Holland", Coastal, Neutral;
    Ion => "ion", "Ionian Sea", Sea, Barren;
    Iri => "iri", "Irish Sea", Sea, Barren;
    Kie => "kie", "Kiel", Coastal, Home(Germany);
    Lon => "lon", "London", Coastal, Home(England);
    Lvn => "lvn", "Livonia", Coastal, Barren;
    Lvp => "lvp", "Liverpool", Coastal, Home(England);
    Mao => "mao", "Mid-Atlantic Ocean", Sea, Barren;
    Mar => "mar", "Marseilles", Coastal, Home(France);
    Mos => "mos", "Moscow", Land, Home(Russia);
    Mun => "mun", "Munich", Land, Home(Germany);
    Naf => "naf", "North Africa", Coastal, Barren;
    Nao => "nao", "North Atlantic Ocean", Sea, Barren;
    Nap => "nap", "Naples", Coastal, Home(Italy);
    Nrg => "nrg", "Norwegian Sea", Sea, Barren;
    Nth => "nth", "North Sea", Sea, Barren;
    Nwy => "nwy", "Norway", Coastal, Neutral;
    Par => "par", "Paris", Land, Home(France);
    Pic => "pic", "Picardy", Coastal, Barren;
    Pie => "pie", "Piedmont", Coastal, Barren;
    Por => "por", "Portugal", Coastal, Neutral;
    Pru => "pru", "Prussia", Coastal, Barren;
    Rom => "rom", "Rome", Coastal, Home(Italy);
    Ruh => "ruh", "Ruhr", Land, Barren;
    Rum => "rum", "Rumania", Coastal, Neutral;
    Ser => "ser", "Serbia", Land, Neutral;
    Sev => "sev", "Sevastopol", Coastal, Home(Russia);
    Sil => "sil", "Silesia", Land, Barren;
    Ska => "ska", "Skagerrak", Sea, Barren;
    Smy => "smy", "Smyrna", Coastal, Home(Turkey);
    Spa => "spa", "Spain", Coastal, Neutral, [North, South];
    Stp => "stp", "St. Petersburg", Coastal, Home(Russia), [North, South];
    Swe => "swe", "Sweden", Coastal, Neutral;
    Syr => "syr", "Syria", Coastal, Barren;
    Tri => "tri", "Trieste", Coastal, Home(Austria);
    Tun => "tun", "Tunisia", Coastal, Neutral;
    Tus => "tus", "Tuscany", Coastal, Barren;
    Tyr => "tyr", "Tyrolia", Land, Barren;
    Tys => "tys", "Tyrrhenian Sea", Sea, Barren;
    Ukr => "ukr", "Ukraine", Land, Barren;
    Ven => "ven", "Venice", Coastal, Home(Italy);
    Vie => "vie", "Vienna", Land, Home(Austria);
    Wal => "wal", "Wales", Coastal, Barren;
    War => "war", "Warsaw", Land, Home(Russia);
    Wes => "wes", "Western Mediterranean", Sea, Barren;
    Yor => "yor", "Yorkshire", Coastal, Barren;
}

impl Province {
    /// Returns the three-letter code, e.g. `"edi"`.
    pub fn abbr(self) -> &'static str {
        PROVINCE_INFO[self as usize].abbr
    }

    /// Returns the display name, e.g. `"Edinburgh"`.
    pub fn name(self) -> &'static str {
        PROVINCE_INFO[self as usize].name
    }

    pub fn province_type(self) -> ProvinceType {
        PROVINCE_INFO[self as usize].kind
    }

    pub fn is_supply_center(self) -> bool {
        !matches!(PROVINCE_INFO[self as usize].center, Center::Barren)
    }

    /// Returns the power this province is a home center of, if any.
    pub fn home_power(self) -> Option<Power> {
        match PROVINCE_INFO[self as usize].center {
            Center::Home(power) => Some(power),
            _ => None,
        }
    }

    /// Named coasts of a split-coast province; empty for every other province.
    pub fn coasts(self) -> &'static [Coast] {
        PROVINCE_INFO[self as usize].coasts
    }

    pub fn has_coasts(self) -> bool {
        !PROVINCE_INFO[self as usize].coasts.is_empty()
    }

    pub fn is_sea(self) -> bool {
        matches!(self.province_type(), ProvinceType::Sea)
    }

    pub fn is_land(self) -> bool {
        matches!(self.province_type(), ProvinceType::Land)
    }

    /// Parses a province code, ignoring case. The DATC spellings `lyo` and
    /// `nwg` are accepted for the Gulf of Lyon and the Norwegian Sea.
    pub fn from_abbr(abbr: &str) -> Option<Province> {
        match abbr.to_ascii_lowercase().as_str() {
            "lyo" => Some(Province::Gol),
            "nwg" => Some(Province::Nrg),
            code => Province::from_code(code),
        }
    }

    /// Converts an array index back to a province.
    pub fn from_index(idx: usize) -> Option<Province> {
        ALL_PROVINCES.get(idx).copied()
    }
}

impl fmt::Display for Province {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.abbr())
    }
}

impl Serialize for Province {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.abbr())
    }
}

impl<'de> Deserialize<'de> for Province {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let code = String::deserialize(deserializer)?;
        Province::from_abbr(&code)
            .ok_or_else(|| serde::de::Error::custom(format!("unknown province '{}'", code)))
    }
}

/// A named coast of a split-coast province (bul, spa, stp).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Coast {
    North,
    South,
    East,
}

impl Coast {
    /// Returns the two-letter code used inside parentheses, e.g. `stp(sc)`.
    pub const fn abbr(self) -> &'static str {
        match self {
            Coast::North => "nc",
            Coast::South => "sc",
            Coast::East => "ec",
        }
    }

    /// Parses a coast code, ignoring case.
    pub fn from_abbr(s: &str) -> Option<Coast> {
        match s.to_ascii_lowercase().as_str() {
            "nc" => Some(Coast::North),
            "sc" => Some(Coast::South),
            "ec" => Some(Coast::East),
            _ => None,
        }
    }
}

impl fmt::Display for Coast {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.abbr())
    }
}

/// One of the seven great powers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Power {
    Austria,
    England,
    France,
    Germany,
    Italy,
    Russia,
    Turkey,
}

/// All seven powers in standard order.
pub const ALL_POWERS: [Power; 7] = [
    Power::Austria,
    Power::England,
    Power::France,
    Power::Germany,
    Power::Italy,
    Power::Russia,
    Power::Turkey,
];

impl Power {
    /// Returns the three-letter order prefix, e.g. `"ENG"`.
    pub const fn code(self) -> &'static str {
        match self {
            Power::Austria => "AUS",
            Power::England => "ENG",
            Power::France => "FRA",
            Power::Germany => "GER",
            Power::Italy => "ITA",
            Power::Russia => "RUS",
            Power::Turkey => "TUR",
        }
    }

    /// Returns the capitalized full name.
    pub const fn name(self) -> &'static str {
        match self {
            Power::Austria => "Austria",
            Power::England => "England",
            Power::France => "France",
            Power::Germany => "Germany",
            Power::Italy => "Italy",
            Power::Russia => "Russia",
            Power::Turkey => "Turkey",
        }
    }

    /// Parses a power from its three-letter code or its full name, ignoring case.
    pub fn from_name(s: &str) -> Option<Power> {
        let lower = s.trim().to_ascii_lowercase();
        ALL_POWERS
            .iter()
            .copied()
            .find(|p| p.code().eq_ignore_ascii_case(&lower) || p.name().eq_ignore_ascii_case(&lower))
    }
}

impl fmt::Display for Power {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl Serialize for Power {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.code())
    }
}

impl<'de> Deserialize<'de> for Power {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Power::from_name(&s).ok_or_else(|| serde::de::Error::custom(format!("unknown power '{}'", s)))
    }
}
