//! ADIF 3.x rendering.

use chrono::DateTime;

use crate::{
    contact::Contact,
    geo,
    ledger::ContactLedger,
    rules::{ContestRules, StationProfile},
    types::ContestId,
};

/// Renders the contest run as an ADIF document.
pub fn render(
    rules: &dyn ContestRules,
    profile: &StationProfile,
    ledger: &ContactLedger,
    contest: ContestId,
) -> String {
    let mut out = String::new();
    out.push_str("ADIF export\n");
    push_field(&mut out, "ADIF_VER", "3.1.4");
    push_field(&mut out, "PROGRAMID", "contestlog");
    out.push_str("<EOH>\n");

    for contact in ledger.all_ascending(contest) {
        render_record(&mut out, rules, profile, contact);
    }
    out
}

fn render_record(
    out: &mut String,
    rules: &dyn ContestRules,
    profile: &StationProfile,
    contact: &Contact,
) {
    push_field(out, "CALL", &contact.call);

    if let Some(dt) = DateTime::from_timestamp(contact.ts, 0) {
        push_field(out, "QSO_DATE", &dt.format("%Y%m%d").to_string());
        push_field(out, "TIME_ON", &dt.format("%H%M%S").to_string());
    }

    let freq_mhz = contact.freq_khz / 1_000.0;
    if let Some(band) = geo::adif_band(freq_mhz) {
        push_field(out, "BAND", band);
    }
    push_field(out, "FREQ", &format!("{freq_mhz:.4}"));
    push_field(out, "MODE", &contact.mode.trim().to_ascii_uppercase());

    if !contact.exchange.snt.is_empty() {
        push_field(out, "RST_SENT", &contact.exchange.snt);
    }
    if !contact.exchange.rcv.is_empty() {
        push_field(out, "RST_RCVD", &contact.exchange.rcv);
    }

    let (stx, srx) = rules.adif_exchange(contact);
    if !stx.is_empty() {
        push_field(out, "STX_STRING", &stx);
    }
    if !srx.is_empty() {
        push_field(out, "SRX_STRING", &srx);
    }

    if !profile.call.is_empty() {
        push_field(out, "STATION_CALLSIGN", &profile.call);
    }
    if !contact.country_prefix.is_empty() {
        push_field(out, "PFX", &contact.country_prefix);
    }

    out.push_str("<EOR>\n");
}

fn push_field(out: &mut String, tag: &str, value: &str) {
    out.push_str(&format!("<{}:{}>{}", tag, value.len(), value));
}
