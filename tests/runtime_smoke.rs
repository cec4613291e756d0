use std::sync::Arc;
use std::sync::atomic::AtomicBool;
use std::time::Duration;

use contestlog::{
    contact::{ContactDraft, ContactPatch, Exchange},
    country::PrefixTable,
    engine::ScoreEngine,
    ledger::ContactLedger,
    rules::{StationProfile, wpx::CqWpx},
    runtime::{LogEvent, RuntimeConfig, spawn_contest_log},
    types::Continent,
};

fn engine() -> ScoreEngine {
    ScoreEngine::new(
        Arc::new(CqWpx::cw()),
        Arc::new(PrefixTable::builtin()),
        StationProfile {
            call: "OH2BH".to_string(),
            country_prefix: "OH".to_string(),
            continent: Some(Continent::EU),
            ..StationProfile::default()
        },
    )
}

fn draft(call: &str, ts: i64, sent_nr: &str) -> ContactDraft {
    ContactDraft {
        contest_id: 1,
        ts,
        freq_khz: 14_025.0,
        band: "20".to_string(),
        mode: "CW".to_string(),
        call_raw: call.to_string(),
        call: call.to_string(),
        exchange: Exchange {
            snt: "599".to_string(),
            rcv: "599".to_string(),
            sent_nr: sent_nr.to_string(),
            ..Exchange::default()
        },
    }
}

#[tokio::test]
async fn log_edit_recalc_query_and_events() {
    let handle = spawn_contest_log(
        engine(),
        ContactLedger::new(),
        1,
        None,
        RuntimeConfig::default(),
    );
    let mut sub = handle.subscribe();

    assert_eq!(handle.prefill().await.expect("prefill"), "001");

    let logged = handle.log(draft("W1AA", 200, "001")).await.expect("log");
    assert!(!logged.evaluation.is_dupe);
    assert_eq!(logged.evaluation.score.points, 3.0);

    assert_eq!(handle.prefill().await.expect("prefill"), "002");

    let second = handle.log(draft("W1BB", 300, "002")).await.expect("log");
    assert!(!second.evaluation.score.mult1);

    // Backdate the second contact and replay.
    handle
        .edit(
            second.id,
            ContactPatch {
                ts: Some(100),
                ..ContactPatch::default()
            },
        )
        .await
        .expect("edit");

    let summary = handle
        .recalculate(Arc::new(AtomicBool::new(false)))
        .await
        .expect("recalc");
    assert_eq!(summary.rewritten, 2);

    let rec = handle.get(second.id).await.expect("get").expect("record");
    assert!(rec.score.mult1);

    let recent = handle.recent(10).await.expect("recent");
    assert_eq!(recent.len(), 2);

    let by_call = handle.by_call("W1AA").await.expect("by_call");
    assert_eq!(by_call.len(), 1);

    let totals = handle.totals().await.expect("totals");
    assert_eq!(totals.qsos, 2);
    assert_eq!(totals.points, 6.0);
    assert_eq!(totals.mult_total, 1);
    assert_eq!(handle.claimed_score().await.expect("claimed"), 6);

    let mut kinds = Vec::new();
    while kinds.len() < 4 {
        let evt = tokio::time::timeout(Duration::from_secs(1), sub.recv())
            .await
            .expect("event")
            .expect("recv");
        if !matches!(evt, LogEvent::DurableUpTo { .. }) {
            kinds.push(evt);
        }
    }
    assert!(matches!(kinds[0], LogEvent::Logged { dupe: false, .. }));
    assert!(matches!(kinds[1], LogEvent::Logged { .. }));
    assert!(matches!(kinds[2], LogEvent::Edited { .. }));
    assert!(matches!(kinds[3], LogEvent::Recalculated { rewritten: 2 }));

    handle.shutdown().await.expect("shutdown");
}

#[tokio::test]
async fn import_and_export_round_through_the_handle() {
    let handle = spawn_contest_log(
        engine(),
        ContactLedger::new(),
        1,
        None,
        RuntimeConfig::default(),
    );

    let text =
        "<EOH>\n<CALL:5>K1ABC<QSO_DATE:8>20260110<TIME_ON:4>0101<FREQ:6>14.025<MODE:2>CW<EOR>\n";
    let summary = handle.import_adif(text).await.expect("import");
    assert_eq!(summary.imported, 1);
    assert_eq!(summary.duplicates, 0);

    let cbr = handle.export_cabrillo().await.expect("cabrillo");
    assert!(cbr.contains("CONTEST: CQ-WPX-CW"));
    assert!(cbr.contains("K1ABC"));

    let adif = handle.export_adif().await.expect("adif");
    assert!(adif.contains("<CALL:5>K1ABC"));

    // WPX defines no EDI document.
    assert!(handle.export_edi().await.is_err());

    handle.shutdown().await.expect("shutdown");
}
