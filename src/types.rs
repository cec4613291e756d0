//! Shared primitive IDs and contest-related enums.

use serde::{Deserialize, Serialize};

/// Monotonic contact identifier.
pub type ContactId = u64;
/// Monotonic operation sequence number.
pub type OpSeq = u64;
/// Contest run identifier; every ledger query scopes by this key.
pub type ContestId = u64;

/// Continent code as resolved from a callsign prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Continent {
    /// North America.
    NA,
    /// South America.
    SA,
    /// Europe.
    EU,
    /// Africa.
    AF,
    /// Asia.
    AS,
    /// Oceania.
    OC,
    /// Antarctica.
    AN,
}

impl Continent {
    /// Parses a two-letter continent code, case-insensitive.
    pub fn from_code(code: &str) -> Option<Self> {
        match code.trim().to_ascii_uppercase().as_str() {
            "NA" => Some(Self::NA),
            "SA" => Some(Self::SA),
            "EU" => Some(Self::EU),
            "AF" => Some(Self::AF),
            "AS" => Some(Self::AS),
            "OC" => Some(Self::OC),
            "AN" => Some(Self::AN),
            _ => None,
        }
    }

    /// Two-letter code used in exports.
    pub fn code(&self) -> &'static str {
        match self {
            Self::NA => "NA",
            Self::SA => "SA",
            Self::EU => "EU",
            Self::AF => "AF",
            Self::AS => "AS",
            Self::OC => "OC",
            Self::AN => "AN",
        }
    }
}

/// Normalized emission mode bucket.
///
/// Contacts store the operator-entered mode text verbatim; scoring and
/// dupe checks compare these buckets instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ModeGroup {
    /// CW and reversed CW.
    CW,
    /// All voice modes (LSB/USB/SSB/FM/AM).
    Phone,
    /// RTTY variants.
    Rtty,
    /// Other digital modes (PSK, FT8, FT4, MFSK, ...).
    Digital,
}

impl ModeGroup {
    /// Folds a free-text mode name into its bucket.
    ///
    /// Unknown modes fold into [`ModeGroup::Digital`], matching how
    /// unrecognized decoder modes are scored.
    pub fn normalize(raw: &str) -> Self {
        match raw.trim().to_ascii_uppercase().as_str() {
            "CW" | "CW-R" | "CWR" => Self::CW,
            "LSB" | "USB" | "SSB" | "FM" | "AM" | "PH" | "PHONE" => Self::Phone,
            "RTTY" | "RTTY-R" | "RY" => Self::Rtty,
            _ => Self::Digital,
        }
    }

    /// Two-letter Cabrillo mode token.
    pub fn cabrillo(&self) -> &'static str {
        match self {
            Self::CW => "CW",
            Self::Phone => "PH",
            Self::Rtty => "RY",
            Self::Digital => "DG",
        }
    }
}

/// Standard dupe-checking policies selectable per contest.
///
/// Contests with bespoke windows (e.g. field-day periods) override
/// `ContestRules::is_dupe` directly instead of picking a policy here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DupeCheck {
    /// Once per entire contest, any band or mode.
    ContestWide,
    /// Once per band, any mode.
    PerBand,
    /// Once per band and normalized mode.
    PerBandMode,
    /// Dupe checking disabled.
    NoCheck,
}

/// Transmit power class used by power-tiered contests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum PowerClass {
    /// Above 100 W.
    #[default]
    High,
    /// 100 W or less.
    Low,
    /// 5 W or less.
    Qrp,
}
