//! ES Field Day.
//!
//! The contest is split into fixed-length periods from a configured
//! start time, and the same station may be worked again on the same
//! band and mode in every period. Contacts outside all periods fall
//! back to plain band+mode dupe checking.

use hashbrown::HashSet;

use crate::{
    contact::Contact,
    ledger::{ContactLedger, DupeScope},
    types::{DupeCheck, ModeGroup},
};

use super::{ContestRules, ExchangeFieldSpec, ExchangeSlot, StationProfile};

/// ES Field Day rules, parameterized on the period layout.
#[derive(Debug, Clone)]
pub struct EsFieldDay {
    start_ts: i64,
    period_secs: i64,
    periods: u32,
}

impl EsFieldDay {
    /// Rules for a run starting at `start_ts` (UTC seconds) with
    /// `periods` periods of `period_secs` each.
    pub fn new(start_ts: i64, periods: u32, period_secs: i64) -> Self {
        Self {
            start_ts,
            period_secs,
            periods,
        }
    }

    /// Conventional layout: four one-hour periods.
    pub fn standard(start_ts: i64) -> Self {
        Self::new(start_ts, 4, 3600)
    }

    /// Period index containing `ts`, or `None` outside the contest.
    fn period_of(&self, ts: i64) -> Option<u32> {
        if ts < self.start_ts || self.period_secs <= 0 {
            return None;
        }
        let idx = (ts - self.start_ts) / self.period_secs;
        if idx < i64::from(self.periods) {
            Some(idx as u32)
        } else {
            None
        }
    }

    fn period_bounds(&self, idx: u32) -> (i64, i64) {
        let start = self.start_ts + i64::from(idx) * self.period_secs;
        (start, start + self.period_secs)
    }
}

impl ContestRules for EsFieldDay {
    fn name(&self) -> &'static str {
        "ES Field Day"
    }

    fn cabrillo_name(&self) -> &'static str {
        "ES-FIELD-DAY"
    }

    fn exchange_fields(&self) -> Vec<ExchangeFieldSpec> {
        vec![
            ExchangeFieldSpec {
                slot: ExchangeSlot::Rcv,
                label: "RST",
                hint: "59(9)",
            },
            ExchangeFieldSpec {
                slot: ExchangeSlot::Nr,
                label: "Nr/County",
                hint: "serial, or county code from ES stations",
            },
        ]
    }

    fn dupe_check(&self) -> DupeCheck {
        DupeCheck::PerBandMode
    }

    fn is_dupe(&self, ledger: &ContactLedger, contact: &Contact) -> bool {
        let mode = ModeGroup::normalize(&contact.mode);
        let scope = match self.period_of(contact.ts) {
            Some(idx) => {
                let (start_ts, end_ts) = self.period_bounds(idx);
                DupeScope::BandModeWindow {
                    band: contact.band.clone(),
                    mode,
                    start_ts,
                    end_ts,
                }
            }
            None => DupeScope::BandMode(contact.band.clone(), mode),
        };
        ledger.worked(contact.contest_id, &contact.call, &scope)
    }

    fn dupe_key(&self, contact: &Contact) -> Option<String> {
        let mode = ModeGroup::normalize(&contact.mode);
        let plain = format!("{}|{}|{:?}", contact.call, contact.band, mode);
        match self.period_of(contact.ts) {
            Some(idx) => Some(format!("{plain}|p{idx}")),
            None => Some(plain),
        }
    }

    // The dupe scope is asymmetric: in-period contacts dedupe within
    // their own period, while out-of-period contacts dupe against any
    // earlier same-band/mode contact. Mirror that by recording both the
    // windowed and the plain key for in-period contacts.
    fn replay_dupe(&self, seen: &mut HashSet<String>, contact: &Contact) -> bool {
        let mode = ModeGroup::normalize(&contact.mode);
        let plain = format!("{}|{}|{:?}", contact.call, contact.band, mode);
        match self.period_of(contact.ts) {
            Some(idx) => {
                let dupe = !seen.insert(format!("{plain}|p{idx}"));
                seen.insert(plain);
                dupe
            }
            None => !seen.insert(plain),
        }
    }

    fn points(&self, _profile: &StationProfile, contact: &Contact, is_dupe: bool) -> f64 {
        if is_dupe {
            return 0.0;
        }
        if contact.country_prefix == "ES" { 2.0 } else { 1.0 }
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
        // County codes are text; serial numbers are not mult-eligible.
        if contact.exchange.nr_is_numeric() || contact.exchange.nr.trim().is_empty() {
            return None;
        }
        let county = contact.exchange.nr.trim().to_ascii_uppercase();
        Some(format!("{}|{}", contact.band, county))
    }
}
