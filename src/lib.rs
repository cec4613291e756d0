//! Contest logging engine: per-contest rule plugins over an
//! authoritative in-memory contact ledger with append-only SQLite
//! journaling, recalculation replay, and Cabrillo/ADIF/EDI export.
//!
//! # Examples
//!
//! Direct, synchronous use of the scoring engine:
//! ```
//! use std::sync::Arc;
//! use contestlog::{
//!     contact::{ContactDraft, Exchange},
//!     country::PrefixTable,
//!     engine::ScoreEngine,
//!     ledger::ContactLedger,
//!     rules::{StationProfile, wpx::CqWpx},
//!     types::Continent,
//! };
//!
//! let engine = ScoreEngine::new(
//!     Arc::new(CqWpx::cw()),
//!     Arc::new(PrefixTable::builtin()),
//!     StationProfile {
//!         call: "OH2BH".to_string(),
//!         grid: "KP20".to_string(),
//!         country_prefix: "OH".to_string(),
//!         continent: Some(Continent::EU),
//!         ..StationProfile::default()
//!     },
//! );
//!
//! let mut ledger = ContactLedger::new();
//! let committed = engine
//!     .commit(&mut ledger, ContactDraft {
//!         contest_id: 1,
//!         ts: 1_767_225_600,
//!         freq_khz: 14_025.0,
//!         band: "20".to_string(),
//!         mode: "CW".to_string(),
//!         call_raw: "K1ABC".to_string(),
//!         call: "K1ABC".to_string(),
//!         exchange: Exchange {
//!             snt: "599".to_string(),
//!             rcv: "599".to_string(),
//!             sent_nr: "001".to_string(),
//!             nr: "001".to_string(),
//!             ..Exchange::default()
//!         },
//!     })
//!     .expect("commit");
//! assert_eq!(committed.id, 1);
//! assert_eq!(committed.evaluation.score.points, 3.0);
//! ```
//!
//! Async runtime with a SQLite journal:
//! ```no_run
//! use std::sync::Arc;
//! use contestlog::{
//!     country::PrefixTable,
//!     engine::ScoreEngine,
//!     ledger::ContactLedger,
//!     persist::sqlite::SqliteOpSink,
//!     rules::{StationProfile, wpx::CqWpx},
//!     runtime::{RuntimeConfig, spawn_contest_log},
//! };
//!
//! # #[tokio::main]
//! # async fn main() {
//! let sink = SqliteOpSink::open("contest.db").expect("open sqlite");
//! let engine = ScoreEngine::new(
//!     Arc::new(CqWpx::cw()),
//!     Arc::new(PrefixTable::builtin()),
//!     StationProfile::default(),
//! );
//! let handle = spawn_contest_log(
//!     engine,
//!     ContactLedger::new(),
//!     1,
//!     Some(Box::new(sink)),
//!     RuntimeConfig::default(),
//! );
//! let exchange = handle.prefill().await.expect("prefill");
//! assert_eq!(exchange, "001");
//! handle.shutdown().await.expect("shutdown");
//! # }
//! ```
#![deny(missing_docs)]

/// Contact domain records, drafts, scores, and patches.
pub mod contact;
/// Country/prefix resolution contract and built-in table.
pub mod country;
/// Scoring driver and recalculation replay.
pub mod engine;
/// Cabrillo/ADIF/EDI renderers.
pub mod export;
/// Geography and band-classification helpers.
pub mod geo;
/// ADIF import.
pub mod import;
/// Authoritative in-memory contact ledger.
pub mod ledger;
/// Mutation op model and journal wrapper types.
pub mod op;
/// Persistence abstraction and SQLite implementation.
pub mod persist;
/// Contest rule plugins.
pub mod rules;
/// Single-writer runtime handle and events.
pub mod runtime;
/// Shared primitive types and enums.
pub mod types;
