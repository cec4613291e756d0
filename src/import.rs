//! ADIF import.
//!
//! Parses an external ADIF document into contact drafts, maps the
//! common historical tag aliases onto the internal exchange slots,
//! suppresses rows whose (timestamp, callsign) pair is already in the
//! ledger, and commits the rest through the scoring engine so imported
//! contacts carry proper points and multiplier flags.

use chrono::{NaiveDate, NaiveTime};
use hashbrown::HashMap;

use crate::{
    contact::{ContactDraft, Exchange, normalize_call},
    engine::ScoreEngine,
    geo,
    ledger::ContactLedger,
    types::ContestId,
};

/// Import failures. Any malformed record aborts the whole import; no
/// partial batch is committed before validation finishes.
#[derive(Debug, thiserror::Error)]
pub enum ImportError {
    /// A record is missing one of the mandatory fields.
    #[error("record {record}: missing mandatory field {field}")]
    MissingField {
        /// 1-based record number in the source file.
        record: usize,
        /// ADIF tag name.
        field: &'static str,
    },
    /// A record carries an unparseable value.
    #[error("record {record}: {message}")]
    BadValue {
        /// 1-based record number in the source file.
        record: usize,
        /// What failed to parse.
        message: String,
    },
    /// The document is not structurally valid ADIF.
    #[error("malformed ADIF: {0}")]
    Malformed(String),
    /// Commit failed in the ledger.
    #[error("ledger rejected imported contact: {0:?}")]
    Store(#[from] crate::ledger::StoreError),
}

/// Counters reported after an import.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ImportSummary {
    /// Rows committed to the ledger.
    pub imported: usize,
    /// Rows suppressed because their (timestamp, call) already exists.
    pub duplicates: usize,
}

/// Imports an ADIF document into `contest`.
pub fn import_adif(
    engine: &ScoreEngine,
    ledger: &mut ContactLedger,
    contest: ContestId,
    text: &str,
) -> Result<ImportSummary, ImportError> {
    let records = parse_records(text)?;

    // Validate everything before the first commit so a bad row cannot
    // leave a half-imported batch behind.
    let mut drafts = Vec::with_capacity(records.len());
    for (idx, record) in records.iter().enumerate() {
        drafts.push(draft_from_record(record, idx + 1, contest)?);
    }

    let mut summary = ImportSummary::default();
    for draft in drafts {
        if ledger.has_ts_call(contest, draft.ts, &draft.call) {
            summary.duplicates += 1;
            continue;
        }
        engine.commit(ledger, draft)?;
        summary.imported += 1;
    }
    Ok(summary)
}

type AdifRecord = HashMap<String, String>;

/// Splits an ADIF document into records of canonical-tag fields.
fn parse_records(text: &str) -> Result<Vec<AdifRecord>, ImportError> {
    let bytes = text.as_bytes();
    let mut pos = 0;
    let mut records = Vec::new();
    let mut current: AdifRecord = HashMap::new();
    let mut in_header = text.trim_start().chars().next() != Some('<');

    while let Some(open) = find_byte(bytes, pos, b'<') {
        let close = find_byte(bytes, open, b'>')
            .ok_or_else(|| ImportError::Malformed("unterminated tag".to_string()))?;
        let tag = &text[open + 1..close];
        pos = close + 1;

        let mut parts = tag.splitn(3, ':');
        let name = parts.next().unwrap_or("").to_ascii_uppercase();

        match name.as_str() {
            "EOH" => {
                in_header = false;
                continue;
            }
            "EOR" => {
                if !current.is_empty() {
                    records.push(std::mem::take(&mut current));
                }
                continue;
            }
            _ => {}
        }

        let Some(len) = parts.next().and_then(|l| l.parse::<usize>().ok()) else {
            // A bare name without a length is header prose, not data.
            continue;
        };
        let end = pos + len;
        // Declared lengths are bytes; reject lengths that run past the
        // end of the document or split a multi-byte character.
        let Some(value) = text.get(pos..end).map(str::to_string) else {
            return Err(ImportError::Malformed(format!(
                "field {name} has a bad length"
            )));
        };
        pos = end;

        if in_header {
            continue;
        }
        if let Some(canonical) = canonical_tag(&name) {
            current.insert(canonical.to_string(), value.trim().to_string());
        }
    }

    if !current.is_empty() {
        records.push(current);
    }
    Ok(records)
}

/// Maps an external tag (including historical aliases) onto the
/// canonical internal name, or drops it.
fn canonical_tag(name: &str) -> Option<&'static str> {
    Some(match name {
        "CALL" => "CALL",
        "QSO_DATE" => "QSO_DATE",
        "TIME_ON" | "TIME_OFF" => "TIME_ON",
        "FREQ" => "FREQ",
        "BAND" => "BAND",
        "MODE" => "MODE",
        "RST_SENT" | "RST_SNT" => "RST_SENT",
        "RST_RCVD" | "RST_RX" => "RST_RCVD",
        "STX" | "STX_STRING" | "SENT_EXCHANGE" => "STX",
        "SRX" | "SRX_STRING" | "EXCHANGE" => "SRX",
        "SECT" | "ARRL_SECT" => "SECT",
        "ZN" | "CQZ" | "CQ_ZONE" => "ZN",
        "NAME" | "OP_NAME" => "NAME",
        "PREC" | "PRECEDENCE" => "PREC",
        "CHECK" | "CK" => "CK",
        "GRIDSQUARE" | "GRID" | "LOC" => "GRID",
        "COMMENT" | "EXCHANGE1" => "EXCHANGE1",
        _ => return None,
    })
}

fn draft_from_record(
    record: &AdifRecord,
    number: usize,
    contest: ContestId,
) -> Result<ContactDraft, ImportError> {
    let call_raw = mandatory(record, "CALL", number)?;
    let date = mandatory(record, "QSO_DATE", number)?;
    let time = mandatory(record, "TIME_ON", number)?;

    let ts = parse_timestamp(&date, &time).ok_or_else(|| ImportError::BadValue {
        record: number,
        message: format!("bad timestamp {date} {time}"),
    })?;

    let freq_khz = match record.get("FREQ").and_then(|f| f.parse::<f64>().ok()) {
        Some(mhz) => mhz * 1_000.0,
        None => match record.get("BAND") {
            Some(band) => {
                // "20m" style tokens map onto the display-band key;
                // centimeter bands already match it as-is.
                let band = band.to_ascii_lowercase();
                if band.ends_with("cm") {
                    geo::fake_freq(&band)
                } else {
                    geo::fake_freq(band.trim_end_matches('m'))
                }
            }
            None => {
                return Err(ImportError::MissingField {
                    record: number,
                    field: "FREQ",
                });
            }
        },
    };

    let get = |tag: &str| record.get(tag).cloned().unwrap_or_default();
    let grid = get("GRID");
    let srx = get("SRX");

    let exchange = Exchange {
        snt: get("RST_SENT"),
        rcv: get("RST_RCVD"),
        sent_nr: get("STX"),
        // Grid-exchange contests store the locator in the nr slot.
        nr: if srx.is_empty() { grid } else { srx },
        exchange1: get("EXCHANGE1"),
        name: get("NAME"),
        sect: get("SECT"),
        zn: get("ZN"),
        prec: get("PREC"),
        ck: get("CK"),
    };

    let call = normalize_call(&call_raw);
    Ok(ContactDraft {
        contest_id: contest,
        ts,
        freq_khz,
        band: geo::display_band(freq_khz).to_string(),
        mode: get("MODE"),
        call_raw,
        call,
        exchange,
    })
}

fn mandatory(
    record: &AdifRecord,
    field: &'static str,
    number: usize,
) -> Result<String, ImportError> {
    match record.get(field) {
        Some(v) if !v.is_empty() => Ok(v.clone()),
        _ => Err(ImportError::MissingField {
            record: number,
            field,
        }),
    }
}

fn parse_timestamp(date: &str, time: &str) -> Option<i64> {
    let date = NaiveDate::parse_from_str(date, "%Y%m%d").ok()?;
    let time = match time.len() {
        4 => NaiveTime::parse_from_str(time, "%H%M").ok()?,
        6 => NaiveTime::parse_from_str(time, "%H%M%S").ok()?,
        _ => return None,
    };
    Some(date.and_time(time).and_utc().timestamp())
}

fn find_byte(bytes: &[u8], from: usize, needle: u8) -> Option<usize> {
    bytes[from.min(bytes.len())..]
        .iter()
        .position(|b| *b == needle)
        .map(|p| from + p)
}
