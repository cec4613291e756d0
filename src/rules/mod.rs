//! Contest rule plugins.
//!
//! Every contest implements [`ContestRules`]: one uniform contract over
//! the in-progress contact, the station profile, and the ledger. The
//! scoring arithmetic, multiplier axes, and dupe policy live here as
//! per-variant data; the driving pipeline lives in [`crate::engine`].

/// ARRL 160 Meter contest.
pub mod arrl160;
/// ES Field Day with period-windowed dupe checking.
pub mod esfd;
/// RAEM memorial contest.
pub mod raem;
/// Stew Perry Topband Distance Challenge.
pub mod stew;
/// UK/EI DX contest.
pub mod ukeidx;
/// Grid-locator VHF/UHF distance contest.
pub mod vhf;
/// CQ WPX.
pub mod wpx;

use hashbrown::HashSet;

use crate::{
    contact::Contact,
    ledger::{ContactLedger, DupeScope},
    types::{Continent, ContestId, DupeCheck, ModeGroup, PowerClass},
};

/// Static configuration of the operator's own station.
#[derive(Debug, Clone, Default)]
pub struct StationProfile {
    /// Own callsign.
    pub call: String,
    /// Own Maidenhead grid square.
    pub grid: String,
    /// Own primary DXCC prefix.
    pub country_prefix: String,
    /// Own continent.
    pub continent: Option<Continent>,
    /// Own CQ zone.
    pub cq_zone: u8,
    /// Transmit power class.
    pub power: PowerClass,
    /// Club name for Cabrillo headers.
    pub club: String,
    /// Operator name for Cabrillo headers.
    pub name: String,
}

impl StationProfile {
    /// Own latitude, when the profile grid decodes.
    pub fn latitude(&self) -> Option<f64> {
        crate::geo::grid_to_latlon(&self.grid).map(|(lat, _)| lat)
    }
}

/// One visible exchange slot with its UI labeling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExchangeFieldSpec {
    /// Which contact slot this field writes.
    pub slot: ExchangeSlot,
    /// Short label shown next to the entry field.
    pub label: &'static str,
    /// Entry hint ("#", "4-character grid square", ...).
    pub hint: &'static str,
}

/// Addressable exchange slots of a contact.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExchangeSlot {
    /// Sent report.
    Snt,
    /// Received report.
    Rcv,
    /// Sent serial/exchange.
    SentNr,
    /// Received serial/exchange.
    Nr,
    /// Secondary exchange.
    Exchange1,
    /// Name.
    Name,
    /// Section.
    Sect,
    /// Zone.
    Zn,
    /// Precedence.
    Prec,
    /// Check.
    Ck,
}

/// Aggregate totals of a contest run, recomputed from the ledger.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Totals {
    /// Number of logged contacts.
    pub qsos: usize,
    /// Sum of stored QSO points.
    pub points: f64,
    /// First-occurrence counts per multiplier axis.
    pub mults: [usize; 3],
    /// Sum over the contest's multiplier axes.
    pub mult_total: usize,
}

/// Uniform per-contest rule contract.
///
/// Implementations are pure policy: all queries go through the ledger
/// contract, and `points` must be deterministic given the contact's own
/// stored fields plus the station profile.
pub trait ContestRules: Send + Sync {
    /// Human-readable contest name.
    fn name(&self) -> &'static str;

    /// CONTEST: header value for Cabrillo export.
    fn cabrillo_name(&self) -> &'static str;

    /// Visible exchange slots and their labels for this contest.
    fn exchange_fields(&self) -> Vec<ExchangeFieldSpec>;

    /// Standard dupe policy; contests with bespoke windows override
    /// [`ContestRules::is_dupe`] and [`ContestRules::dupe_key`] instead.
    fn dupe_check(&self) -> DupeCheck;

    /// Pre-log dupe query. A positive match zeroes points but never
    /// blocks logging.
    fn is_dupe(&self, ledger: &ContactLedger, contact: &Contact) -> bool {
        let scope = match self.dupe_check() {
            DupeCheck::NoCheck => return false,
            DupeCheck::ContestWide => DupeScope::Any,
            DupeCheck::PerBand => DupeScope::Band(contact.band.clone()),
            DupeCheck::PerBandMode => DupeScope::BandMode(
                contact.band.clone(),
                ModeGroup::normalize(&contact.mode),
            ),
        };
        ledger.worked(contact.contest_id, &contact.call, &scope)
    }

    /// Scope key equivalent of the dupe policy. Two contacts are mutual
    /// dupes exactly when their keys match; `None` disables dupe
    /// tracking.
    fn dupe_key(&self, contact: &Contact) -> Option<String> {
        match self.dupe_check() {
            DupeCheck::NoCheck => None,
            DupeCheck::ContestWide => Some(contact.call.clone()),
            DupeCheck::PerBand => Some(format!("{}|{}", contact.call, contact.band)),
            DupeCheck::PerBandMode => Some(format!(
                "{}|{}|{:?}",
                contact.call,
                contact.band,
                ModeGroup::normalize(&contact.mode)
            )),
        }
    }

    /// Replay-side dupe verdict over the seen-key set of an ascending
    /// scan. The default checks and records [`ContestRules::dupe_key`];
    /// contests whose scopes are asymmetric (a contact can dupe against
    /// a wider scope than the one it occupies) override this and manage
    /// the set themselves. Must agree with [`ContestRules::is_dupe`] on
    /// every ascending-ordered ledger.
    fn replay_dupe(&self, seen: &mut HashSet<String>, contact: &Contact) -> bool {
        match self.dupe_key(contact) {
            Some(key) => !seen.insert(key),
            None => false,
        }
    }

    /// Sent-exchange template; `#` is substituted with the next serial.
    fn sent_template(&self) -> &'static str {
        "#"
    }

    /// Proposes the outgoing exchange before the operator types
    /// anything: the next unused serial (highest logged + 1, zero padded
    /// to three digits) substituted into the template.
    fn prefill(&self, ledger: &ContactLedger, contest: ContestId) -> String {
        let serial = ledger.highest_sent_serial(contest) + 1;
        self.sent_template().replace('#', &format!("{serial:03}"))
    }

    /// QSO point value. Every implementation checks `is_dupe` first and
    /// returns zero for dupes.
    fn points(&self, profile: &StationProfile, contact: &Contact, is_dupe: bool) -> f64;

    /// Multiplier key for an axis (1..=3), or `None` when the contact
    /// earns no key on that axis. Keys embed the contest's scope (band,
    /// mode) so first-occurrence-wins is uniform across contests. The
    /// profile is available for contests that gate an axis on the
    /// operator's own entity.
    fn mult_key(&self, axis: usize, profile: &StationProfile, contact: &Contact)
    -> Option<String>;

    /// Final claimed score from the aggregate totals. The near-universal
    /// formula is points times total multipliers, with a floor of one
    /// multiplier for contests that define no mult axis.
    fn claimed_score(&self, profile: &StationProfile, totals: &Totals) -> i64 {
        let _ = profile;
        let mults = totals.mult_total.max(1);
        (totals.points * mults as f64).round() as i64
    }

    /// Whether the recalculation replay applies to this contest. False
    /// for contests whose stored scores depend only on the contact's own
    /// fields and therefore never go stale.
    fn supports_recalc(&self) -> bool {
        true
    }

    /// Sent exchange columns of a Cabrillo QSO line.
    fn cabrillo_sent(&self, contact: &Contact) -> Vec<String> {
        vec![contact.exchange.snt.clone(), contact.exchange.sent_nr.clone()]
    }

    /// Received exchange columns of a Cabrillo QSO line.
    fn cabrillo_rcvd(&self, contact: &Contact) -> Vec<String> {
        vec![contact.exchange.rcv.clone(), contact.exchange.nr.clone()]
    }

    /// (STX_STRING, SRX_STRING) values for ADIF export.
    fn adif_exchange(&self, contact: &Contact) -> (String, String) {
        (
            contact.exchange.sent_nr.clone(),
            contact.exchange.nr.clone(),
        )
    }

    /// True for VHF contests that render EDI logs.
    fn edi_capable(&self) -> bool {
        false
    }
}

/// Latitude of the polar circle used by polar-bonus contests.
pub const POLAR_LATITUDE: f64 = 66.55;
