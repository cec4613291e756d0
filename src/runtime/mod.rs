//! Single-writer async runtime and event stream APIs.

/// Event stream types emitted by the runtime.
pub mod events;
/// Handle and command loop implementation.
pub mod handle;

pub use events::LogEvent;
pub use handle::{ContestLogHandle, RuntimeConfig, RuntimeError, spawn_contest_log};
