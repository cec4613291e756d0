//! EDI (REG1TEST) rendering for VHF contests.
//!
//! Colon-keyed header lines plus a `[QSORecords;N]` section with
//! semicolon-delimited rows.

use chrono::DateTime;

use crate::{
    ledger::ContactLedger,
    rules::{ContestRules, StationProfile},
    types::{ContestId, ModeGroup},
};

use super::ExportError;

/// Renders the contest run as an EDI document, or fails for contests
/// that do not define the format.
pub fn render(
    rules: &dyn ContestRules,
    profile: &StationProfile,
    ledger: &ContactLedger,
    contest: ContestId,
    claimed_score: i64,
) -> Result<String, ExportError> {
    if !rules.edi_capable() {
        return Err(ExportError::Unsupported("EDI"));
    }

    let contacts = ledger.all_ascending(contest);
    let (first_date, last_date) = match (contacts.first(), contacts.last()) {
        (Some(a), Some(b)) => (edi_date(a.ts), edi_date(b.ts)),
        _ => (String::new(), String::new()),
    };

    let mut out = String::new();
    let mut line = |s: &str| {
        out.push_str(s);
        out.push_str("\r\n");
    };

    line("[REG1TEST;1]");
    line(&format!("TName={}", rules.name()));
    line(&format!("TDate={first_date};{last_date}"));
    line(&format!("PCall={}", profile.call));
    line(&format!("PWWLo={}", profile.grid.to_ascii_uppercase()));
    line(&format!("RName={}", profile.name));
    line(&format!("PClub={}", profile.club));
    line(&format!("CQSOs={};1", contacts.len()));
    line(&format!("CTotSc={claimed_score}"));
    line("[Remarks]");
    line("");

    line(&format!("[QSORecords;{}]", contacts.len()));
    for contact in &contacts {
        let (date, time) = match DateTime::from_timestamp(contact.ts, 0) {
            Some(dt) => (
                dt.format("%y%m%d").to_string(),
                dt.format("%H%M").to_string(),
            ),
            None => ("000000".to_string(), "0000".to_string()),
        };
        let mode = match ModeGroup::normalize(&contact.mode) {
            ModeGroup::Phone => 1,
            ModeGroup::CW => 2,
            ModeGroup::Rtty => 6,
            ModeGroup::Digital => 7,
        };
        let grid = contact.exchange.nr.trim().to_ascii_uppercase();
        let points = contact.score.points.round() as i64;
        line(&format!(
            "{date};{time};{};{mode};{};{};{};{};;{grid};{points};;;;;",
            contact.call,
            contact.exchange.snt,
            contact.exchange.sent_nr,
            contact.exchange.rcv,
            contact.exchange.nr,
        ));
    }

    Ok(out)
}

fn edi_date(ts: i64) -> String {
    DateTime::from_timestamp(ts, 0)
        .map(|dt| dt.format("%Y%m%d").to_string())
        .unwrap_or_default()
}
