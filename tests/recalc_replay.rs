use std::sync::Arc;
use std::sync::atomic::AtomicBool;

use contestlog::{
    contact::{ContactDraft, ContactPatch, Exchange},
    country::PrefixTable,
    engine::{ScoreEngine, recalculate},
    ledger::ContactLedger,
    rules::{StationProfile, esfd::EsFieldDay, stew::StewPerry, wpx::CqWpx},
    types::Continent,
};

fn engine() -> ScoreEngine {
    ScoreEngine::new(
        Arc::new(CqWpx::cw()),
        Arc::new(PrefixTable::builtin()),
        StationProfile {
            call: "OH2BH".to_string(),
            grid: "KP20".to_string(),
            country_prefix: "OH".to_string(),
            continent: Some(Continent::EU),
            ..StationProfile::default()
        },
    )
}

fn draft(call: &str, ts: i64) -> ContactDraft {
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
            ..Exchange::default()
        },
    }
}

#[test]
fn backdated_edit_moves_the_mult_flag() {
    let eng = engine();
    let mut ledger = ContactLedger::new();
    let cancel = AtomicBool::new(false);

    let a = eng.commit(&mut ledger, draft("W1AA", 200)).expect("commit");
    let b = eng.commit(&mut ledger, draft("W1BB", 300)).expect("commit");
    assert!(a.evaluation.score.mult1);
    assert!(!b.evaluation.score.mult1);

    // Backdate the second contact before the first.
    ledger
        .patch(
            b.id,
            ContactPatch {
                ts: Some(100),
                ..ContactPatch::default()
            },
        )
        .expect("patch");

    let summary = recalculate(
        eng.rules().as_ref(),
        eng.profile(),
        &mut ledger,
        1,
        &cancel,
    )
    .expect("recalc");
    assert!(!summary.skipped);
    assert_eq!(summary.scanned, 2);
    assert_eq!(summary.rewritten, 2);

    assert!(ledger.get(b.id).expect("b").score.mult1);
    assert!(!ledger.get(a.id).expect("a").score.mult1);

    // Flags stay binary: exactly one carrier per key.
    assert_eq!(ledger.flagged_count(1, 1), 1);
}

#[test]
fn backdated_edit_moves_the_dupe_verdict() {
    let eng = engine();
    let mut ledger = ContactLedger::new();
    let cancel = AtomicBool::new(false);

    let first = eng.commit(&mut ledger, draft("K3AA", 400)).expect("commit");
    let second = eng.commit(&mut ledger, draft("K3AA", 500)).expect("commit");
    assert_eq!(first.evaluation.score.points, 3.0);
    assert_eq!(second.evaluation.score.points, 0.0);

    // Move the originally-first contact after the dupe.
    ledger
        .patch(
            first.id,
            ContactPatch {
                ts: Some(600),
                ..ContactPatch::default()
            },
        )
        .expect("patch");

    recalculate(
        eng.rules().as_ref(),
        eng.profile(),
        &mut ledger,
        1,
        &cancel,
    )
    .expect("recalc");

    assert_eq!(ledger.get(second.id).expect("second").score.points, 3.0);
    assert_eq!(ledger.get(first.id).expect("first").score.points, 0.0);
    assert_eq!(ledger.sum_points(1), 3.0);
}

#[test]
fn recalculation_is_idempotent() {
    let eng = engine();
    let mut ledger = ContactLedger::new();
    let cancel = AtomicBool::new(false);

    for (i, call) in ["W1AA", "W1BB", "K3AA", "OH1AB", "K3AA"].iter().enumerate() {
        eng.commit(&mut ledger, draft(call, 100 * (i as i64 + 1)))
            .expect("commit");
    }

    let first = recalculate(
        eng.rules().as_ref(),
        eng.profile(),
        &mut ledger,
        1,
        &cancel,
    )
    .expect("recalc");
    // Log-time scoring already matches ascending order here.
    assert_eq!(first.rewritten, 0);

    let again = recalculate(
        eng.rules().as_ref(),
        eng.profile(),
        &mut ledger,
        1,
        &cancel,
    )
    .expect("recalc");
    assert_eq!(again.rewritten, 0);
}

#[test]
fn field_day_out_of_period_repeat_survives_replay() {
    let eng = ScoreEngine::new(
        Arc::new(EsFieldDay::new(1_000, 2, 600)),
        Arc::new(PrefixTable::builtin()),
        StationProfile::default(),
    );
    let mut ledger = ContactLedger::new();
    let cancel = AtomicBool::new(false);

    let fd_draft = |ts: i64| {
        let mut d = draft("ES5X", ts);
        d.freq_khz = 3_550.0;
        d.band = "80".to_string();
        d
    };

    let first = eng.commit(&mut ledger, fd_draft(1_100)).expect("commit");
    assert_eq!(first.evaluation.score.points, 2.0);

    // A repeat in the next period is a fresh contact.
    let next_period = eng.commit(&mut ledger, fd_draft(1_700)).expect("commit");
    assert!(!next_period.evaluation.is_dupe);
    assert_eq!(next_period.evaluation.score.points, 2.0);

    // A repeat after the last period dupes against the in-period
    // contacts, and the replay must agree with the log-time verdict.
    let late = eng.commit(&mut ledger, fd_draft(9_000)).expect("commit");
    assert!(late.evaluation.is_dupe);
    assert_eq!(late.evaluation.score.points, 0.0);

    let summary = recalculate(
        eng.rules().as_ref(),
        eng.profile(),
        &mut ledger,
        1,
        &cancel,
    )
    .expect("recalc");
    assert_eq!(summary.rewritten, 0);
    assert_eq!(ledger.get(late.id).expect("late").score.points, 0.0);
    assert_eq!(ledger.sum_points(1), 4.0);
}

#[test]
fn cancel_aborts_before_scanning() {
    let eng = engine();
    let mut ledger = ContactLedger::new();
    eng.commit(&mut ledger, draft("W1AA", 100)).expect("commit");

    let cancel = AtomicBool::new(true);
    let err = recalculate(
        eng.rules().as_ref(),
        eng.profile(),
        &mut ledger,
        1,
        &cancel,
    )
    .expect_err("cancelled");
    assert!(matches!(
        err,
        contestlog::engine::RecalcError::Cancelled
    ));
}

#[test]
fn recalc_incapable_contest_is_skipped() {
    let eng = ScoreEngine::new(
        Arc::new(StewPerry),
        Arc::new(PrefixTable::builtin()),
        StationProfile {
            grid: "KP20".to_string(),
            ..StationProfile::default()
        },
    );
    let mut ledger = ContactLedger::new();
    let mut d = draft("OH1AB", 100);
    d.freq_khz = 1_830.0;
    d.band = "160".to_string();
    d.exchange.nr = "KP20".to_string();
    eng.commit(&mut ledger, d).expect("commit");

    let cancel = AtomicBool::new(false);
    let summary = recalculate(
        eng.rules().as_ref(),
        eng.profile(),
        &mut ledger,
        1,
        &cancel,
    )
    .expect("recalc");
    assert!(summary.skipped);
    assert_eq!(summary.scanned, 0);
    assert_eq!(summary.rewritten, 0);
}
