//! Grid-locator VHF/UHF distance contest.

use crate::{
    contact::Contact,
    geo,
    ledger::ContactLedger,
    types::{ContestId, DupeCheck},
};

use super::{ContestRules, ExchangeFieldSpec, ExchangeSlot, StationProfile};

/// Distance-scored VHF contest: the received exchange is the other
/// station's grid square, points are whole kilometers between grid
/// centers with a floor of one.
#[derive(Debug, Clone, Default)]
pub struct GridVhf;

impl ContestRules for GridVhf {
    fn name(&self) -> &'static str {
        "VHF Grid Contest"
    }

    fn cabrillo_name(&self) -> &'static str {
        "VHF-GRID"
    }

    fn exchange_fields(&self) -> Vec<ExchangeFieldSpec> {
        vec![
            ExchangeFieldSpec {
                slot: ExchangeSlot::Rcv,
                label: "RST",
                hint: "59",
            },
            ExchangeFieldSpec {
                slot: ExchangeSlot::Nr,
                label: "Grid",
                hint: "4- or 6-character grid square",
            },
        ]
    }

    fn dupe_check(&self) -> DupeCheck {
        DupeCheck::PerBand
    }

    fn sent_template(&self) -> &'static str {
        ""
    }

    fn prefill(&self, _ledger: &ContactLedger, _contest: ContestId) -> String {
        String::new()
    }

    fn points(&self, profile: &StationProfile, contact: &Contact, is_dupe: bool) -> f64 {
        if is_dupe {
            return 0.0;
        }
        // Malformed grids earn nothing; a same-grid contact still earns
        // the one-point floor.
        match geo::grid_distance_km(&profile.grid, &contact.exchange.nr) {
            Some(km) => f64::from(km.max(1)),
            None => 0.0,
        }
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
        let grid = contact.exchange.nr.trim().to_ascii_uppercase();
        if geo::grid_to_latlon(&grid).is_none() {
            return None;
        }
        let field: String = grid.chars().take(2).collect();
        // Grid fields count once per band.
        Some(format!("{}|{}", contact.band, field))
    }

    fn adif_exchange(&self, contact: &Contact) -> (String, String) {
        (String::new(), contact.exchange.nr.clone())
    }

    fn edi_capable(&self) -> bool {
        true
    }
}
