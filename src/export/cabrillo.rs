//! Cabrillo 3.0 rendering.
//!
//! Lines are CRLF-terminated; QSO columns follow the robot's fixed
//! layout with the frequency right-aligned to five digits.

use chrono::DateTime;

use crate::{
    ledger::ContactLedger,
    rules::{ContestRules, StationProfile},
    types::{ContestId, ModeGroup},
};

/// Renders the complete Cabrillo document for a contest run.
pub fn render(
    rules: &dyn ContestRules,
    profile: &StationProfile,
    ledger: &ContactLedger,
    contest: ContestId,
    claimed_score: i64,
) -> String {
    let mut out = String::new();
    let mut line = |s: &str| {
        out.push_str(s);
        out.push_str("\r\n");
    };

    line("START-OF-LOG: 3.0");
    line(concat!("CREATED-BY: contestlog v", env!("CARGO_PKG_VERSION")));
    line(&format!("CONTEST: {}", rules.cabrillo_name()));
    line(&format!("CALLSIGN: {}", profile.call));
    line(&format!("CLAIMED-SCORE: {claimed_score}"));
    if !profile.club.is_empty() {
        line(&format!("CLUB: {}", profile.club));
    }
    if !profile.name.is_empty() {
        line(&format!("NAME: {}", profile.name));
    }
    line(&format!("GRID-LOCATOR: {}", profile.grid));

    for contact in ledger.all_ascending(contest) {
        let mode = ModeGroup::normalize(&contact.mode).cabrillo();
        let (date, time) = date_time(contact.ts);
        let freq = format!("{:>5}", contact.freq_khz.round() as i64);

        let mut qso = format!(
            "QSO: {freq} {mode} {date} {time} {:<13}",
            profile.call
        );
        for col in rules.cabrillo_sent(contact) {
            qso.push_str(&format!("{:<4} ", col));
        }
        qso.push_str(&format!("{:<13}", contact.call));
        for col in rules.cabrillo_rcvd(contact) {
            qso.push_str(&format!("{:<4} ", col));
        }
        line(qso.trim_end());
    }

    line("END-OF-LOG:");
    out
}

fn date_time(ts: i64) -> (String, String) {
    match DateTime::from_timestamp(ts, 0) {
        Some(dt) => (
            dt.format("%Y-%m-%d").to_string(),
            dt.format("%H%M").to_string(),
        ),
        None => ("0000-00-00".to_string(), "0000".to_string()),
    }
}
