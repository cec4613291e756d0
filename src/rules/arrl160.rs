//! ARRL 160 Meter contest.

use crate::{contact::Contact, types::DupeCheck};

use super::{ContestRules, ExchangeFieldSpec, ExchangeSlot, StationProfile};

fn is_w_ve(prefix: &str) -> bool {
    matches!(prefix, "K" | "VE")
}

/// ARRL 160: W/VE stations send their section, DX stations send a
/// report only. Sections are multipliers for everyone; DXCC countries
/// count as multipliers only when the operator is W/VE.
#[derive(Debug, Clone, Default)]
pub struct Arrl160;

impl ContestRules for Arrl160 {
    fn name(&self) -> &'static str {
        "ARRL 160"
    }

    fn cabrillo_name(&self) -> &'static str {
        "ARRL-160"
    }

    fn exchange_fields(&self) -> Vec<ExchangeFieldSpec> {
        vec![
            ExchangeFieldSpec {
                slot: ExchangeSlot::Rcv,
                label: "RST",
                hint: "599",
            },
            ExchangeFieldSpec {
                slot: ExchangeSlot::Sect,
                label: "Section",
                hint: "ARRL/RAC section, blank for DX",
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

    fn points(&self, _profile: &StationProfile, contact: &Contact, is_dupe: bool) -> f64 {
        if is_dupe {
            return 0.0;
        }
        if is_w_ve(&contact.country_prefix) { 2.0 } else { 5.0 }
    }

    fn mult_key(
        &self,
        axis: usize,
        profile: &StationProfile,
        contact: &Contact,
    ) -> Option<String> {
        match axis {
            1 => {
                let sect = contact.exchange.sect.trim().to_ascii_uppercase();
                if sect.is_empty() {
                    return None;
                }
                Some(sect)
            }
            // Countries only count toward W/VE operators' totals.
            2 => {
                if !is_w_ve(&profile.country_prefix)
                    || is_w_ve(&contact.country_prefix)
                    || contact.country_prefix.is_empty()
                {
                    return None;
                }
                Some(contact.country_prefix.clone())
            }
            _ => None,
        }
    }

    fn cabrillo_rcvd(&self, contact: &Contact) -> Vec<String> {
        vec![contact.exchange.rcv.clone(), contact.exchange.sect.clone()]
    }

    fn adif_exchange(&self, contact: &Contact) -> (String, String) {
        (contact.exchange.sent_nr.clone(), contact.exchange.sect.clone())
    }
}
