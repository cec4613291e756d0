//! Scoring driver: pre-log evaluation, commit, aggregates.
//!
//! The engine is the only place the rule plugin, the country resolver,
//! and the ledger meet. Everything here is deterministic given the
//! ledger contents, so replaying the same drafts in the same order
//! always yields the same scores.

/// Full-ledger recalculation replay.
pub mod recalc;

pub use recalc::{RecalcError, RecalcSummary, recalculate};

use std::sync::Arc;

use crate::{
    contact::{Contact, ContactDraft, Score},
    country::CountryResolver,
    ledger::ContactLedger,
    op::StoredOp,
    rules::{ContestRules, StationProfile, Totals},
    types::{ContactId, ContestId, Continent},
};

/// Outcome of evaluating a draft against the current ledger.
#[derive(Debug, Clone, PartialEq)]
pub struct Evaluation {
    /// Dupe verdict under the contest's policy.
    pub is_dupe: bool,
    /// Resolved primary DXCC prefix, empty when unresolved.
    pub country_prefix: String,
    /// Resolved continent.
    pub continent: Option<Continent>,
    /// Points and multiplier flags the contact would be stored with.
    pub score: Score,
}

/// A committed contact: its id, journal op, and the evaluation that
/// produced its stored score.
#[derive(Debug, Clone)]
pub struct Committed {
    /// Assigned contact id.
    pub id: ContactId,
    /// Journal op recorded for the insert.
    pub op: StoredOp,
    /// Evaluation stored with the contact.
    pub evaluation: Evaluation,
}

/// Binds a contest's rules, the station profile, and a country resolver
/// into the scoring pipeline.
pub struct ScoreEngine {
    rules: Arc<dyn ContestRules>,
    resolver: Arc<dyn CountryResolver>,
    profile: StationProfile,
}

impl ScoreEngine {
    /// New engine over the given policy and resolver.
    pub fn new(
        rules: Arc<dyn ContestRules>,
        resolver: Arc<dyn CountryResolver>,
        profile: StationProfile,
    ) -> Self {
        Self {
            rules,
            resolver,
            profile,
        }
    }

    /// The contest rules this engine drives.
    pub fn rules(&self) -> &Arc<dyn ContestRules> {
        &self.rules
    }

    /// The station profile this engine scores against.
    pub fn profile(&self) -> &StationProfile {
        &self.profile
    }

    /// Evaluates a draft without mutating the ledger: resolve country,
    /// check dupe, compute points, claim first-occurrence flags.
    pub fn evaluate(&self, ledger: &ContactLedger, draft: &ContactDraft) -> Evaluation {
        let info = self.resolver.lookup(&draft.call);
        let country_prefix = info
            .as_ref()
            .map(|i| i.primary_prefix.clone())
            .unwrap_or_default();
        let continent = info.map(|i| i.continent);

        // Probe record: same shape the contact would be stored in, so
        // the rule plugin sees identical inputs now and during replay.
        let probe = Contact {
            id: 0,
            contest_id: draft.contest_id,
            ts: draft.ts,
            freq_khz: draft.freq_khz,
            band: draft.band.clone(),
            mode: draft.mode.clone(),
            call_raw: draft.call_raw.clone(),
            call: draft.call.clone(),
            country_prefix: country_prefix.clone(),
            continent,
            exchange: draft.exchange.clone(),
            score: Score::default(),
        };

        let is_dupe = self.rules.is_dupe(ledger, &probe);
        let points = self.rules.points(&self.profile, &probe, is_dupe);

        let mut flags = [false; 3];
        for axis in 1..=3 {
            if let Some(key) = self.rules.mult_key(axis, &self.profile, &probe) {
                let seen = ledger.key_seen(draft.contest_id, &key, |c| {
                    self.rules.mult_key(axis, &self.profile, c)
                });
                flags[axis - 1] = !seen;
            }
        }

        Evaluation {
            is_dupe,
            country_prefix,
            continent,
            score: Score {
                points,
                mult1: flags[0],
                mult2: flags[1],
                mult3: flags[2],
            },
        }
    }

    /// Evaluates and inserts a draft.
    pub fn commit(
        &self,
        ledger: &mut ContactLedger,
        draft: ContactDraft,
    ) -> Result<Committed, crate::ledger::StoreError> {
        let evaluation = self.evaluate(ledger, &draft);
        let (id, op) = ledger.insert(
            draft,
            evaluation.country_prefix.clone(),
            evaluation.continent,
            evaluation.score.clone(),
        )?;
        Ok(Committed { id, op, evaluation })
    }

    /// Aggregate totals for a contest run.
    ///
    /// Multiplier counts are distinct-key counts under the contest's own
    /// key functions, so they stay correct even mid-recalculation.
    pub fn totals(&self, ledger: &ContactLedger, contest: ContestId) -> Totals {
        let mut mults = [0usize; 3];
        for axis in 1..=3 {
            mults[axis - 1] = ledger.count_distinct(contest, |c| {
                self.rules.mult_key(axis, &self.profile, c)
            });
        }
        Totals {
            qsos: ledger.contact_count(contest),
            points: ledger.sum_points(contest),
            mults,
            mult_total: mults.iter().sum(),
        }
    }

    /// Final claimed score per the contest's formula.
    pub fn claimed_score(&self, ledger: &ContactLedger, contest: ContestId) -> i64 {
        let totals = self.totals(ledger, contest);
        self.rules.claimed_score(&self.profile, &totals)
    }
}
