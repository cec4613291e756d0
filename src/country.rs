//! Country/prefix lookup contract and built-in prefix table.

use hashbrown::HashMap;

use crate::types::Continent;

/// Entity data resolved from a callsign prefix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CountryInfo {
    /// DXCC entity name.
    pub entity: String,
    /// Continent of the entity.
    pub continent: Continent,
    /// Primary DXCC prefix (the multiplier key in country-mult contests).
    pub primary_prefix: String,
    /// CQ zone.
    pub cq_zone: u8,
    /// ITU zone.
    pub itu_zone: u8,
}

/// Resolves callsigns to DXCC entity data.
///
/// Missing lookups are not errors: scoring degrades to zero credit when a
/// callsign cannot be resolved.
pub trait CountryResolver: Send + Sync {
    /// Looks up the entity for `call`, or `None` when unresolvable.
    fn lookup(&self, call: &str) -> Option<CountryInfo>;
}

/// Prefix table resolving ambiguity by longest-prefix-match.
///
/// When several table prefixes match a callsign, the longest one wins
/// deterministically.
#[derive(Debug, Clone, Default)]
pub struct PrefixTable {
    entries: HashMap<String, CountryInfo>,
    max_prefix_len: usize,
}

impl PrefixTable {
    /// Empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Table seeded with a compact built-in entity list.
    ///
    /// A production deployment replaces this with a full cty.dat import;
    /// the built-in list covers the entities the bundled contest rules
    /// and tests reference.
    pub fn builtin() -> Self {
        let mut table = Self::new();
        for (prefix, entity, continent, primary, cq, itu) in BUILTIN_ENTITIES {
            table.insert(
                prefix,
                CountryInfo {
                    entity: (*entity).to_string(),
                    continent: *continent,
                    primary_prefix: (*primary).to_string(),
                    cq_zone: *cq,
                    itu_zone: *itu,
                },
            );
        }
        table
    }

    /// Adds or replaces a prefix entry.
    pub fn insert(&mut self, prefix: &str, info: CountryInfo) {
        let key = prefix.trim().to_ascii_uppercase();
        self.max_prefix_len = self.max_prefix_len.max(key.len());
        self.entries.insert(key, info);
    }
}

impl CountryResolver for PrefixTable {
    fn lookup(&self, call: &str) -> Option<CountryInfo> {
        let call = call.trim().to_ascii_uppercase();
        if call.is_empty() {
            return None;
        }
        // Portable designators resolve by their prefix part when it is
        // shorter than the base call (PA/K1ABC is Netherlands).
        let probe = match call.split_once('/') {
            Some((head, tail)) if !tail.is_empty() && tail.len() < head.len() && tail.len() > 1 => {
                tail.to_string()
            }
            Some((head, _)) => head.to_string(),
            None => call,
        };

        let upper = probe.len().min(self.max_prefix_len);
        for len in (1..=upper).rev() {
            if let Some(info) = self.entries.get(&probe[..len]) {
                return Some(info.clone());
            }
        }
        None
    }
}

type EntityRow = (
    &'static str,
    &'static str,
    Continent,
    &'static str,
    u8,
    u8,
);

const BUILTIN_ENTITIES: &[EntityRow] = &[
    ("K", "United States", Continent::NA, "K", 5, 8),
    ("W", "United States", Continent::NA, "K", 5, 8),
    ("N", "United States", Continent::NA, "K", 5, 8),
    ("AA", "United States", Continent::NA, "K", 5, 8),
    ("VE", "Canada", Continent::NA, "VE", 5, 9),
    ("VY", "Canada", Continent::NA, "VE", 5, 9),
    ("VO", "Canada", Continent::NA, "VE", 5, 9),
    ("XE", "Mexico", Continent::NA, "XE", 6, 10),
    ("G", "England", Continent::EU, "G", 14, 27),
    ("M", "England", Continent::EU, "G", 14, 27),
    ("2E", "England", Continent::EU, "G", 14, 27),
    ("GM", "Scotland", Continent::EU, "GM", 14, 27),
    ("GW", "Wales", Continent::EU, "GW", 14, 27),
    ("GI", "Northern Ireland", Continent::EU, "GI", 14, 27),
    ("GD", "Isle of Man", Continent::EU, "GD", 14, 27),
    ("GU", "Guernsey", Continent::EU, "GU", 14, 27),
    ("GJ", "Jersey", Continent::EU, "GJ", 14, 27),
    ("EI", "Ireland", Continent::EU, "EI", 14, 27),
    ("DL", "Germany", Continent::EU, "DL", 14, 28),
    ("DA", "Germany", Continent::EU, "DL", 14, 28),
    ("F", "France", Continent::EU, "F", 14, 27),
    ("I", "Italy", Continent::EU, "I", 15, 28),
    ("EA", "Spain", Continent::EU, "EA", 14, 37),
    ("CT", "Portugal", Continent::EU, "CT", 14, 37),
    ("PA", "Netherlands", Continent::EU, "PA", 14, 27),
    ("ON", "Belgium", Continent::EU, "ON", 14, 27),
    ("HB", "Switzerland", Continent::EU, "HB", 14, 28),
    ("OE", "Austria", Continent::EU, "OE", 15, 28),
    ("SM", "Sweden", Continent::EU, "SM", 14, 18),
    ("SP", "Poland", Continent::EU, "SP", 15, 28),
    ("LA", "Norway", Continent::EU, "LA", 14, 18),
    ("OH", "Finland", Continent::EU, "OH", 15, 18),
    ("OZ", "Denmark", Continent::EU, "OZ", 14, 18),
    ("ES", "Estonia", Continent::EU, "ES", 15, 29),
    ("YL", "Latvia", Continent::EU, "YL", 15, 29),
    ("LY", "Lithuania", Continent::EU, "LY", 15, 29),
    ("OK", "Czech Republic", Continent::EU, "OK", 15, 28),
    ("HA", "Hungary", Continent::EU, "HA", 15, 28),
    ("YO", "Romania", Continent::EU, "YO", 20, 28),
    ("LZ", "Bulgaria", Continent::EU, "LZ", 20, 28),
    ("SV", "Greece", Continent::EU, "SV", 20, 28),
    ("UA", "European Russia", Continent::EU, "UA", 16, 29),
    ("RA", "European Russia", Continent::EU, "UA", 16, 29),
    ("UA9", "Asiatic Russia", Continent::AS, "UA9", 17, 30),
    ("RA9", "Asiatic Russia", Continent::AS, "UA9", 17, 30),
    ("UA0", "Asiatic Russia", Continent::AS, "UA9", 19, 32),
    ("UR", "Ukraine", Continent::EU, "UR", 16, 29),
    ("JA", "Japan", Continent::AS, "JA", 25, 45),
    ("JH", "Japan", Continent::AS, "JA", 25, 45),
    ("HL", "South Korea", Continent::AS, "HL", 25, 44),
    ("BY", "China", Continent::AS, "BY", 24, 44),
    ("VU", "India", Continent::AS, "VU", 22, 41),
    ("4X", "Israel", Continent::AS, "4X", 20, 39),
    ("VK", "Australia", Continent::OC, "VK", 30, 59),
    ("ZL", "New Zealand", Continent::OC, "ZL", 32, 60),
    ("KH6", "Hawaii", Continent::OC, "KH6", 31, 61),
    ("PY", "Brazil", Continent::SA, "PY", 11, 15),
    ("LU", "Argentina", Continent::SA, "LU", 13, 16),
    ("CE", "Chile", Continent::SA, "CE", 12, 14),
    ("ZS", "South Africa", Continent::AF, "ZS", 38, 57),
    ("EA8", "Canary Islands", Continent::AF, "EA8", 33, 36),
    ("CN", "Morocco", Continent::AF, "CN", 33, 37),
    ("5B", "Cyprus", Continent::AS, "5B", 20, 39),
    ("TF", "Iceland", Continent::EU, "TF", 40, 17),
    ("OX", "Greenland", Continent::NA, "OX", 40, 5),
    ("VP8", "Falkland Islands", Continent::SA, "VP8", 13, 16),
    ("KL", "Alaska", Continent::NA, "KL", 1, 1),
];
