//! UK/EI DX contest.

use chrono::{DateTime, Timelike};

use crate::{contact::Contact, types::DupeCheck};

use super::{ContestRules, ExchangeFieldSpec, ExchangeSlot, StationProfile};

/// Primary prefixes counting as home (UK or Ireland) stations.
const HOME_PREFIXES: &[&str] = &["G", "GM", "GW", "GI", "GD", "GU", "GJ", "EI"];

fn is_home(prefix: &str) -> bool {
    HOME_PREFIXES.contains(&prefix)
}

/// UK/EI DX contest: everyone works everyone, UK/EI contacts are worth
/// the most, and home stations double their QSO points during the
/// night-time bonus window.
#[derive(Debug, Clone)]
pub struct UkEiDx {
    cabrillo: &'static str,
}

impl UkEiDx {
    /// CW weekend.
    pub fn cw() -> Self {
        Self {
            cabrillo: "UKEI-DX-CW",
        }
    }

    /// SSB weekend.
    pub fn ssb() -> Self {
        Self {
            cabrillo: "UKEI-DX-SSB",
        }
    }

    /// The 0100-0459 UTC double-points window for home stations.
    fn in_bonus_window(ts: i64) -> bool {
        DateTime::from_timestamp(ts, 0)
            .map(|dt| (1..=4).contains(&dt.hour()))
            .unwrap_or(false)
    }
}

impl ContestRules for UkEiDx {
    fn name(&self) -> &'static str {
        "UK/EI DX"
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
            ExchangeFieldSpec {
                slot: ExchangeSlot::Exchange1,
                label: "District",
                hint: "UK/EI district code",
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
        let base = if is_home(&contact.country_prefix) {
            6.0
        } else if contact.continent.is_some() && contact.continent == profile.continent {
            2.0
        } else if contact.continent.is_some() {
            4.0
        } else {
            return 0.0;
        };

        if is_home(&profile.country_prefix) && Self::in_bonus_window(contact.ts) {
            base * 2.0
        } else {
            base
        }
    }

    fn mult_key(
        &self,
        axis: usize,
        _profile: &StationProfile,
        contact: &Contact,
    ) -> Option<String> {
        match axis {
            // UK/EI district codes, per band.
            1 => {
                let district = contact.exchange.exchange1.trim().to_ascii_uppercase();
                if district.is_empty() || !is_home(&contact.country_prefix) {
                    return None;
                }
                Some(format!("{}|{}", contact.band, district))
            }
            // DXCC entities, per band.
            2 => {
                if contact.country_prefix.is_empty() {
                    return None;
                }
                Some(format!("{}|{}", contact.band, contact.country_prefix))
            }
            _ => None,
        }
    }

    fn cabrillo_rcvd(&self, contact: &Contact) -> Vec<String> {
        vec![
            contact.exchange.rcv.clone(),
            contact.exchange.nr.clone(),
            contact.exchange.exchange1.clone(),
        ]
    }

}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bonus_window_edges() {
        // 2026-01-10 00:59:59Z and 01:00:00Z.
        assert!(!UkEiDx::in_bonus_window(1_768_006_799));
        assert!(UkEiDx::in_bonus_window(1_768_006_800));
        // 04:59:59Z in, 05:00:00Z out.
        assert!(UkEiDx::in_bonus_window(1_768_021_199));
        assert!(!UkEiDx::in_bonus_window(1_768_021_200));
    }
}
