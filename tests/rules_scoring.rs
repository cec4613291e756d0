use std::sync::Arc;

use contestlog::{
    contact::{ContactDraft, Exchange},
    country::PrefixTable,
    engine::ScoreEngine,
    ledger::ContactLedger,
    rules::{
        ContestRules, StationProfile, arrl160::Arrl160, esfd::EsFieldDay, raem::Raem,
        stew::StewPerry, ukeidx::UkEiDx, vhf::GridVhf, wpx::CqWpx,
    },
    types::{Continent, PowerClass},
};

fn profile_oh() -> StationProfile {
    StationProfile {
        call: "OH2BH".to_string(),
        grid: "KP20".to_string(),
        country_prefix: "OH".to_string(),
        continent: Some(Continent::EU),
        cq_zone: 15,
        ..StationProfile::default()
    }
}

fn engine(rules: Arc<dyn ContestRules>, profile: StationProfile) -> ScoreEngine {
    ScoreEngine::new(rules, Arc::new(PrefixTable::builtin()), profile)
}

fn draft(call: &str, freq_khz: f64, band: &str, mode: &str, ts: i64, nr: &str) -> ContactDraft {
    ContactDraft {
        contest_id: 1,
        ts,
        freq_khz,
        band: band.to_string(),
        mode: mode.to_string(),
        call_raw: call.to_string(),
        call: call.to_string(),
        exchange: Exchange {
            snt: "599".to_string(),
            rcv: "599".to_string(),
            sent_nr: "001".to_string(),
            nr: nr.to_string(),
            ..Exchange::default()
        },
    }
}

#[test]
fn wpx_tiers_dupes_and_prefix_mults() {
    let eng = engine(Arc::new(CqWpx::cw()), profile_oh());
    let mut ledger = ContactLedger::new();

    // Inter-continent, high band.
    let a = eng
        .commit(&mut ledger, draft("K1ABC", 14_025.0, "20", "CW", 100, "001"))
        .expect("commit");
    assert!(!a.evaluation.is_dupe);
    assert_eq!(a.evaluation.score.points, 3.0);
    assert!(a.evaluation.score.mult1);

    // Same call, same band: dupe, logged with zero points, no mult.
    let b = eng
        .commit(&mut ledger, draft("K1ABC", 14_030.0, "20", "CW", 200, "002"))
        .expect("commit");
    assert!(b.evaluation.is_dupe);
    assert_eq!(b.evaluation.score.points, 0.0);
    assert!(!b.evaluation.score.mult1);

    // Same call on a low band: no dupe, doubled points, prefix already
    // counted contest-wide.
    let c = eng
        .commit(&mut ledger, draft("K1ABC", 7_020.0, "40", "CW", 300, "003"))
        .expect("commit");
    assert!(!c.evaluation.is_dupe);
    assert_eq!(c.evaluation.score.points, 6.0);
    assert!(!c.evaluation.score.mult1);

    // Same country.
    let d = eng
        .commit(&mut ledger, draft("OH1AB", 14_040.0, "20", "CW", 400, "004"))
        .expect("commit");
    assert_eq!(d.evaluation.score.points, 1.0);
    assert!(d.evaluation.score.mult1);

    // Same continent, different country, high band, non-NA operator.
    let e = eng
        .commit(&mut ledger, draft("DL1AA", 14_050.0, "20", "CW", 500, "005"))
        .expect("commit");
    assert_eq!(e.evaluation.score.points, 1.0);
    assert!(e.evaluation.score.mult1);

    let totals = eng.totals(&ledger, 1);
    assert_eq!(totals.qsos, 5);
    assert_eq!(totals.points, 11.0);
    assert_eq!(totals.mults, [3, 0, 0]);
    assert_eq!(eng.claimed_score(&ledger, 1), 33);
}

#[test]
fn wpx_north_america_same_continent_exception() {
    let profile = StationProfile {
        call: "K5ZD".to_string(),
        country_prefix: "K".to_string(),
        continent: Some(Continent::NA),
        ..StationProfile::default()
    };
    let eng = engine(Arc::new(CqWpx::cw()), profile);
    let mut ledger = ContactLedger::new();

    let high = eng
        .commit(&mut ledger, draft("VE3AA", 14_025.0, "20", "CW", 100, "001"))
        .expect("commit");
    assert_eq!(high.evaluation.score.points, 2.0);

    let low = eng
        .commit(&mut ledger, draft("VE3AA", 1_830.0, "160", "CW", 200, "002"))
        .expect("commit");
    assert_eq!(low.evaluation.score.points, 4.0);
}

#[test]
fn vhf_distance_points_and_grid_field_mults() {
    let eng = engine(Arc::new(GridVhf), profile_oh());
    let mut ledger = ContactLedger::new();

    // Same grid square still earns the one-point floor.
    let near = eng
        .commit(&mut ledger, draft("OH2AA", 144_200.0, "2", "SSB", 100, "KP20"))
        .expect("commit");
    assert_eq!(near.evaluation.score.points, 1.0);
    assert!(near.evaluation.score.mult1);

    // KP20 to KP30 is a computed 110 km.
    let far = eng
        .commit(&mut ledger, draft("OH5XX", 144_300.0, "2", "SSB", 200, "KP30"))
        .expect("commit");
    assert_eq!(far.evaluation.score.points, 110.0);
    // Same grid field KP, already counted on this band.
    assert!(!far.evaluation.score.mult1);

    // Malformed grid: zero credit.
    let bad = eng
        .commit(&mut ledger, draft("OH6YY", 144_300.0, "2", "SSB", 300, "XYZ"))
        .expect("commit");
    assert_eq!(bad.evaluation.score.points, 0.0);
    assert!(!bad.evaluation.score.mult1);
}

#[test]
fn ukeidx_tiers_and_night_window() {
    // Home (England) operator.
    let profile = StationProfile {
        call: "G3XYZ".to_string(),
        country_prefix: "G".to_string(),
        continent: Some(Continent::EU),
        ..StationProfile::default()
    };
    let eng = engine(Arc::new(UkEiDx::cw()), profile);
    let mut ledger = ContactLedger::new();

    // 2026-01-10 12:00:00 UTC, outside the bonus window.
    let daytime = 1_768_046_400;
    // 2026-01-10 02:00:00 UTC, inside it.
    let night = 1_768_010_400;

    let ei = eng
        .commit(&mut ledger, draft("EI5DI", 14_025.0, "20", "CW", daytime, "001"))
        .expect("commit");
    assert_eq!(ei.evaluation.score.points, 6.0);

    let dl = eng
        .commit(&mut ledger, draft("DL1AA", 14_030.0, "20", "CW", daytime, "002"))
        .expect("commit");
    assert_eq!(dl.evaluation.score.points, 2.0);

    let dx = eng
        .commit(&mut ledger, draft("K1ABC", 14_035.0, "20", "CW", daytime, "003"))
        .expect("commit");
    assert_eq!(dx.evaluation.score.points, 4.0);

    let night_ei = eng
        .commit(&mut ledger, draft("EI6AL", 14_040.0, "20", "CW", night, "004"))
        .expect("commit");
    assert_eq!(night_ei.evaluation.score.points, 12.0);
}

#[test]
fn ukeidx_district_and_country_mults_per_band() {
    let eng = engine(Arc::new(UkEiDx::cw()), profile_oh());
    let mut ledger = ContactLedger::new();

    let mut d = draft("GM4AFF", 14_025.0, "20", "CW", 100, "001");
    d.exchange.exchange1 = "AB".to_string();
    let first = eng.commit(&mut ledger, d).expect("commit");
    // District axis and country axis both first on 20.
    assert!(first.evaluation.score.mult1);
    assert!(first.evaluation.score.mult2);

    let mut d = draft("GM4AFF", 7_020.0, "40", "CW", 200, "002");
    d.exchange.exchange1 = "AB".to_string();
    let other_band = eng.commit(&mut ledger, d).expect("commit");
    // Per-band scope: both axes count again on 40.
    assert!(other_band.evaluation.score.mult1);
    assert!(other_band.evaluation.score.mult2);

    // Non-home station never yields a district key.
    let dl = eng
        .commit(&mut ledger, draft("DL1AA", 14_030.0, "20", "CW", 300, "003"))
        .expect("commit");
    assert!(!dl.evaluation.score.mult1);
    assert!(dl.evaluation.score.mult2);
}

#[test]
fn stew_perry_distance_blocks_and_power_factor() {
    let mut ledger = ContactLedger::new();

    let high = engine(Arc::new(StewPerry), profile_oh());
    let a = high
        .commit(&mut ledger, draft("OH1AB", 1_830.0, "160", "CW", 100, "KP20"))
        .expect("commit");
    assert_eq!(a.evaluation.score.points, 1.0);

    // 547 km: second started 500 km block.
    let b = high
        .commit(&mut ledger, draft("OH9XX", 1_832.0, "160", "CW", 200, "KP70"))
        .expect("commit");
    assert_eq!(b.evaluation.score.points, 2.0);

    let qrp = engine(
        Arc::new(StewPerry),
        StationProfile {
            power: PowerClass::Qrp,
            ..profile_oh()
        },
    );
    let mut ledger2 = ContactLedger::new();
    let c = qrp
        .commit(&mut ledger2, draft("OH9XX", 1_832.0, "160", "CW", 300, "KP70"))
        .expect("commit");
    assert_eq!(c.evaluation.score.points, 8.0);

    // No multiplier axes: claimed score is raw points.
    assert_eq!(qrp.claimed_score(&ledger2, 1), 8);
}

#[test]
fn arrl160_points_and_gated_country_axis() {
    let w_profile = StationProfile {
        call: "K5ZD".to_string(),
        country_prefix: "K".to_string(),
        continent: Some(Continent::NA),
        ..StationProfile::default()
    };
    let eng = engine(Arc::new(Arrl160), w_profile);
    let mut ledger = ContactLedger::new();

    let mut d = draft("VE1AA", 1_830.0, "160", "CW", 100, "");
    d.exchange.sect = "NS".to_string();
    let domestic = eng.commit(&mut ledger, d).expect("commit");
    assert_eq!(domestic.evaluation.score.points, 2.0);
    assert!(domestic.evaluation.score.mult1);
    // Domestic contacts never hit the country axis.
    assert!(!domestic.evaluation.score.mult2);

    let dx = eng
        .commit(&mut ledger, draft("DL1AA", 1_832.0, "160", "CW", 200, ""))
        .expect("commit");
    assert_eq!(dx.evaluation.score.points, 5.0);
    assert!(!dx.evaluation.score.mult1);
    assert!(dx.evaluation.score.mult2);

    // A non-W/VE operator gets no country multipliers at all.
    let eng_oh = engine(Arc::new(Arrl160), profile_oh());
    let mut ledger_oh = ContactLedger::new();
    let dx2 = eng_oh
        .commit(&mut ledger_oh, draft("DL1AA", 1_830.0, "160", "CW", 100, ""))
        .expect("commit");
    assert!(!dx2.evaluation.score.mult2);
}

#[test]
fn raem_coordinate_scoring_and_bonuses() {
    let eng = engine(Arc::new(Raem), profile_oh());
    let mut ledger = ContactLedger::new();

    // KP20 center is 60.5N 25E; own coordinates round to 61N 25E.
    let plain = eng
        .commit(&mut ledger, draft("UA9AA", 14_025.0, "20", "CW", 100, "57N085E"))
        .expect("commit");
    assert_eq!(plain.evaluation.score.points, 50.0 + 4.0 + 60.0);

    // Polar correspondent plus the memorial callsign bonus.
    let memorial = eng
        .commit(&mut ledger, draft("RAEM", 14_030.0, "20", "CW", 200, "75N100E"))
        .expect("commit");
    assert_eq!(memorial.evaluation.score.points, 50.0 + 14.0 + 75.0 + 100.0 + 300.0);

    // "O" accepted as the east marker.
    let ost = eng
        .commit(&mut ledger, draft("UA1AA", 14_035.0, "20", "CW", 300, "60N030O"))
        .expect("commit");
    assert_eq!(ost.evaluation.score.points, 50.0 + 1.0 + 5.0);

    // Unparseable coordinates: zero credit.
    let bad = eng
        .commit(&mut ledger, draft("UA2AA", 14_040.0, "20", "CW", 400, "abc"))
        .expect("commit");
    assert_eq!(bad.evaluation.score.points, 0.0);

    // No mult axes and a sub-polar own station: claimed equals points.
    let totals = eng.totals(&ledger, 1);
    assert_eq!(totals.mult_total, 0);
    assert_eq!(
        eng.claimed_score(&ledger, 1),
        totals.points.round() as i64
    );
}

#[test]
fn esfd_period_windowed_dupes_and_county_mults() {
    let rules = Arc::new(EsFieldDay::new(1_000, 2, 600));
    let eng = engine(rules, profile_oh());
    let mut ledger = ContactLedger::new();

    let first = eng
        .commit(&mut ledger, draft("ES5X", 3_550.0, "80", "CW", 1_100, "HARJU"))
        .expect("commit");
    assert!(!first.evaluation.is_dupe);
    assert_eq!(first.evaluation.score.points, 2.0);
    assert!(first.evaluation.score.mult1);

    // Same call, band, and mode inside the same period: dupe.
    let same_period = eng
        .commit(&mut ledger, draft("ES5X", 3_552.0, "80", "CW", 1_200, "HARJU"))
        .expect("commit");
    assert!(same_period.evaluation.is_dupe);
    assert_eq!(same_period.evaluation.score.points, 0.0);

    // Next period: workable again.
    let next_period = eng
        .commit(&mut ledger, draft("ES5X", 3_551.0, "80", "CW", 1_700, "HARJU"))
        .expect("commit");
    assert!(!next_period.evaluation.is_dupe);
    assert_eq!(next_period.evaluation.score.points, 2.0);
    // County already counted on this band.
    assert!(!next_period.evaluation.score.mult1);

    // Non-ES station is one point; a numeric exchange is a serial, not
    // a county.
    let k = eng
        .commit(&mut ledger, draft("K1ABC", 3_553.0, "80", "CW", 1_300, "012"))
        .expect("commit");
    assert_eq!(k.evaluation.score.points, 1.0);
    assert!(!k.evaluation.score.mult1);
}
