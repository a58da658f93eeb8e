//! Session module — the unlock window and its optional persistence.
//!
//! This module provides:
//! - The time source used for expiry checks (`clock`)
//! - The in-memory session holding the derived key (`manager`)
//! - Machine-bound persistence across restarts (`persisted`)

pub mod clock;
pub mod manager;
pub mod persisted;

pub use clock::{Clock, ManualClock, SystemClock};
pub use manager::{SessionManager, DEFAULT_SESSION_TIMEOUT_SECS};
pub use persisted::{PersistedSessionStore, DEFAULT_PERSISTED_TTL_SECS};
