use std::sync::Arc;
use std::sync::atomic::AtomicBool;

use criterion::{Criterion, criterion_group, criterion_main};

use contestlog::{
    contact::{ContactDraft, Exchange},
    country::PrefixTable,
    engine::{ScoreEngine, recalculate},
    ledger::{ContactLedger, LedgerSnapshotV1},
    rules::{StationProfile, wpx::CqWpx},
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

fn draft(i: u64) -> ContactDraft {
    let call = format!("K{}A{}", i % 10, i % 100);
    ContactDraft {
        contest_id: 1,
        ts: i as i64,
        freq_khz: 14_025.0,
        band: "20".to_string(),
        mode: "CW".to_string(),
        call_raw: call.clone(),
        call,
        exchange: Exchange {
            snt: "599".to_string(),
            rcv: "599".to_string(),
            ..Exchange::default()
        },
    }
}

fn seeded_snapshot(n: u64) -> LedgerSnapshotV1 {
    let eng = engine();
    let mut ledger = ContactLedger::new();
    for i in 0..n {
        eng.commit(&mut ledger, draft(i)).expect("commit");
    }
    ledger.export_snapshot()
}

fn bench_log_throughput(c: &mut Criterion) {
    let eng = engine();
    c.bench_function("commit_2k", |b| {
        b.iter(|| {
            let mut ledger = ContactLedger::new();
            for i in 0..2_000u64 {
                eng.commit(&mut ledger, draft(i)).expect("commit");
            }
            ledger
        });
    });
}

fn bench_recalc(c: &mut Criterion) {
    let eng = engine();
    let snapshot = seeded_snapshot(2_000);
    let cancel = AtomicBool::new(false);
    c.bench_function("recalc_2k", |b| {
        b.iter(|| {
            let mut ledger = ContactLedger::from_snapshot(snapshot.clone());
            recalculate(eng.rules().as_ref(), eng.profile(), &mut ledger, 1, &cancel)
                .expect("recalc")
        });
    });
}

criterion_group!(benches, bench_log_throughput, bench_recalc);
criterion_main!(benches);
