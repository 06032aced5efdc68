//! Save/load persistence with integrity verification
//!
//! Features:
//! - Versioned JSON envelope
//! - BLAKE3 integrity digest
//! - Backup rotation (previous good save kept as `<key>.bak`)
//! - Corruption detection and recovery

pub mod envelope;
pub mod storage;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use envelope::{Envelope, SAVE_VERSION, open, seal};
pub use storage::{FileStorage, MemoryStorage, SaveSlot, Storage};

use crate::catalog::TierLevel;
use crate::ledger::ChargeLedger;
use crate::sim::snapshot::BoardSnapshot;
use crate::sim::state::SessionState;

/// Storage key of the session save
pub const SESSION_KEY: &str = "orb_merge_session";
/// Storage key of the charge ledger
pub const ECONOMY_KEY: &str = "orb_merge_economy";

#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("invalid save data: {0}")]
    Json(#[from] serde_json::Error),
    #[error("unsupported save version {0}")]
    UnsupportedVersion(u32),
    #[error("save digest mismatch")]
    DigestMismatch,
    #[error("no save under key {0}")]
    Missing(String),
    #[error("storage I/O: {0}")]
    Io(#[from] std::io::Error),
}

/// A drop accepted by the session but not yet spawned
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PendingDrop {
    pub x: f32,
    pub tier: TierLevel,
}

/// Persisted subset of a session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavedSession {
    #[serde(default)]
    pub best_score: u64,
    #[serde(default)]
    pub score: u64,
    pub current_tier: TierLevel,
    pub next_tier: TierLevel,
    #[serde(default)]
    pub highest_tier_reached: TierLevel,
    #[serde(default)]
    pub elapsed_secs: f64,
    #[serde(default)]
    pub paused: bool,
    /// Run already ended (and was submitted)
    #[serde(default)]
    pub game_over: bool,
    #[serde(default)]
    pub board: BoardSnapshot,
    #[serde(default)]
    pub pending_drops: Vec<PendingDrop>,
}

impl SavedSession {
    pub fn capture(state: &SessionState) -> Self {
        state.to_saved()
    }
}

/// Save the session under [`SESSION_KEY`]
pub fn save_session<S: Storage + ?Sized>(
    storage: &mut S,
    state: &SessionState,
) -> Result<(), PersistenceError> {
    let saved = SavedSession::capture(state);
    SaveSlot::new(SESSION_KEY).save(storage, &saved)?;
    log::info!(
        "Session saved: score {}, best {}, {} orbs",
        saved.score,
        saved.best_score,
        saved.board.len()
    );
    Ok(())
}

/// Load a saved session into `state`. Returns false when there is none.
pub fn load_session<S: Storage + ?Sized>(
    storage: &S,
    state: &mut SessionState,
) -> Result<bool, PersistenceError> {
    match SaveSlot::new(SESSION_KEY).load::<_, SavedSession>(storage) {
        Ok(saved) => {
            state.apply_saved(saved);
            Ok(true)
        }
        Err(PersistenceError::Missing(_)) => Ok(false),
        Err(e) => Err(e),
    }
}

pub fn save_ledger<S: Storage + ?Sized>(
    storage: &mut S,
    ledger: &ChargeLedger,
) -> Result<(), PersistenceError> {
    SaveSlot::new(ECONOMY_KEY).save(storage, ledger)
}

/// Load the ledger, or start from the daily allowance when none is saved
pub fn load_ledger<S: Storage + ?Sized>(storage: &S) -> Result<ChargeLedger, PersistenceError> {
    match SaveSlot::new(ECONOMY_KEY).load(storage) {
        Ok(ledger) => Ok(ledger),
        Err(PersistenceError::Missing(_)) => Ok(ChargeLedger::daily_allowance()),
        Err(e) => Err(e),
    }
}
