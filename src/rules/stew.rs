//! Stew Perry Topband Distance Challenge.

use crate::{
    contact::Contact,
    geo,
    types::{DupeCheck, PowerClass},
};

use super::{ContestRules, ExchangeFieldSpec, ExchangeSlot, StationProfile};

/// Stew Perry: 160 meters only, grid-square exchange, one point per
/// started 500 km with the operator's power class scaling each QSO.
/// No multipliers; stored points depend only on the contact itself, so
/// the recalculation replay is disabled.
#[derive(Debug, Clone, Default)]
pub struct StewPerry;

impl ContestRules for StewPerry {
    fn name(&self) -> &'static str {
        "Stew Perry Topband"
    }

    fn cabrillo_name(&self) -> &'static str {
        "STEW-PERRY"
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
                label: "Grid",
                hint: "4-character grid square",
            },
        ]
    }

    fn dupe_check(&self) -> DupeCheck {
        DupeCheck::ContestWide
    }

    fn sent_template(&self) -> &'static str {
        ""
    }

    fn prefill(
        &self,
        _ledger: &crate::ledger::ContactLedger,
        _contest: crate::types::ContestId,
    ) -> String {
        String::new()
    }

    fn points(&self, profile: &StationProfile, contact: &Contact, is_dupe: bool) -> f64 {
        if is_dupe {
            return 0.0;
        }
        let Some(km) = geo::grid_distance_km(&profile.grid, &contact.exchange.nr) else {
            return 0.0;
        };
        let power = match profile.power {
            PowerClass::High => 1,
            PowerClass::Low => 2,
            PowerClass::Qrp => 4,
        };
        f64::from(distance_blocks(km) * power)
    }

    fn mult_key(
        &self,
        _axis: usize,
        _profile: &StationProfile,
        _contact: &Contact,
    ) -> Option<String> {
        None
    }

    fn adif_exchange(&self, contact: &Contact) -> (String, String) {
        (String::new(), contact.exchange.nr.clone())
    }

    fn supports_recalc(&self) -> bool {
        false
    }
}

/// Number of started 500 km blocks a path covers. An exact multiple
/// only fills the block it completes: 500 km is one point, 501 km two.
fn distance_blocks(km: u32) -> u32 {
    km.div_ceil(500).max(1)
}
