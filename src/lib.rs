//! Orb Merge - session engine for a physics-based merge game
//!
//! Core modules:
//! - `catalog`: Static orb tier table (radius, score, display tag)
//! - `sim`: Rules layer on top of a physics collaborator (merges, danger, power-ups, snapshots)
//! - `ledger`: Power-up charge accounting
//! - `persistence`: Save/load with integrity verification
//! - `tuning`: Data-driven game balance
//! - `submission`: Final score handed to the leaderboard backend

pub mod catalog;
pub mod ledger;
pub mod persistence;
pub mod sim;
pub mod submission;
pub mod tuning;

pub use catalog::{MAX_TIER, Tier, TierLevel};
pub use ledger::{ChargeLedger, PowerUpKind};
pub use submission::ScoreSubmission;
pub use tuning::Tuning;

use glam::Vec2;

/// Game configuration constants
///
/// Board coordinates are screen-space: x grows right, y grows DOWN.
/// "Above the danger line" therefore means `y < DANGER_LINE_Y`.
pub mod consts {
    /// Default simulation timestep (60 Hz)
    pub const SIM_DT: f32 = 1.0 / 60.0;

    /// Board dimensions
    pub const BOARD_WIDTH: f32 = 500.0;
    pub const BOARD_HEIGHT: f32 = 700.0;
    pub const WALL_THICKNESS: f32 = 50.0;

    /// Height at which dropped orbs appear
    pub const SPAWN_Y: f32 = 50.0;
    /// Settled orbs above this line count toward overflow
    pub const DANGER_LINE_Y: f32 = 150.0;
    /// How long the zone may stay occupied before the run ends
    pub const DANGER_GRACE_MS: f32 = 3000.0;
    /// Speed (px/s) below which an orb counts as settled (0.2 px per 60 Hz step)
    pub const SETTLED_SPEED_EPSILON: f32 = 12.0;

    /// Minimum time between two player drops
    pub const DROP_COOLDOWN_MS: f32 = 500.0;
    /// Highest tier the "next orb" roll may produce
    pub const NEXT_TIER_CAP: u8 = 5;
    /// Orbs removed from the top of the stack by a revive
    pub const REVIVE_CLEAR_COUNT: usize = 3;
    /// Velocity change (px/s) applied by a shake; horizontal kick is +/- half of it
    pub const SHAKE_STRENGTH: f32 = 300.0;
}

/// Midpoint between two body positions (spawn point of a merge result)
#[inline]
pub fn midpoint(a: Vec2, b: Vec2) -> Vec2 {
    (a + b) * 0.5
}

/// Clamp a requested drop column to the playable span between the walls
#[inline]
pub fn clamp_drop_x(x: f32, min_x: f32, max_x: f32) -> f32 {
    if !x.is_finite() {
        return (min_x + max_x) * 0.5;
    }
    x.clamp(min_x, max_x)
}
