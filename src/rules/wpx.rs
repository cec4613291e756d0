//! CQ WPX rules: serial exchange, prefix multipliers.

use crate::{
    contact::Contact,
    geo,
    types::{Continent, DupeCheck},
};

use super::{ContestRules, ExchangeFieldSpec, ExchangeSlot, StationProfile};

const LOW_BANDS: &[&str] = &["160", "80", "40"];

/// CQ WPX. Point value depends on continent relationship and band tier;
/// the multiplier is the WPX prefix, counted once per contest.
#[derive(Debug, Clone)]
pub struct CqWpx {
    cabrillo: &'static str,
}

impl CqWpx {
    /// CW weekend.
    pub fn cw() -> Self {
        Self {
            cabrillo: "CQ-WPX-CW",
        }
    }

    /// SSB weekend.
    pub fn ssb() -> Self {
        Self {
            cabrillo: "CQ-WPX-SSB",
        }
    }
}

impl ContestRules for CqWpx {
    fn name(&self) -> &'static str {
        "CQ WPX"
    }

    fn cabrillo_name(&self) -> &'static str {
        self.cabrillo
    }

    fn exchange_fields(&self) -> Vec<ExchangeFieldSpec> {
        vec![
            ExchangeFieldSpec {
                slot: ExchangeSlot::Rcv,
                label: "RST",
                hint: "599",
            },
            ExchangeFieldSpec {
                slot: ExchangeSlot::Nr,
                label: "Nr",
                hint: "#",
            },
        ]
    }

    fn dupe_check(&self) -> DupeCheck {
        DupeCheck::PerBand
    }

    fn points(&self, profile: &StationProfile, contact: &Contact, is_dupe: bool) -> f64 {
        if is_dupe {
            return 0.0;
        }
        let Some(their_cont) = contact.continent else {
            return 0.0;
        };
        let Some(my_cont) = profile.continent else {
            return 0.0;
        };

        let low = LOW_BANDS.contains(&contact.band.as_str());

        if contact.country_prefix == profile.country_prefix {
            return 1.0;
        }
        if their_cont == my_cont {
            // Same continent, different country. North America keeps the
            // doubled values on every band tier.
            return match (my_cont, low) {
                (Continent::NA, false) => 2.0,
                (Continent::NA, true) => 4.0,
                (_, false) => 1.0,
                (_, true) => 2.0,
            };
        }
        if low { 6.0 } else { 3.0 }
    }

    fn mult_key(
        &self,
        axis: usize,
        _profile: &StationProfile,
        contact: &Contact,
    ) -> Option<String> {
        if axis != 1 {
            return None;
        }
        let prefix = geo::wpx_prefix(&contact.call);
        if prefix.is_empty() {
            return None;
        }
        // Prefixes count once per contest, not per band.
        Some(prefix)
    }
}
