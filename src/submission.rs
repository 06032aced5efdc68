//! Final score submission
//!
//! Staged once per transition into GameOver and handed to whatever posts
//! scores to the leaderboard backend.

use serde::{Deserialize, Serialize};

use crate::catalog::TierLevel;

/// Upper bound on scoring rate accepted by the leaderboard
pub const MAX_POINTS_PER_SECOND: u64 = 1000;
/// Duration assumed when a run reports zero seconds
pub const ZERO_DURATION_ALLOWANCE_SECS: u64 = 600;

/// Terminal result of a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreSubmission {
    pub final_score: u64,
    pub duration_seconds: u32,
    /// Largest tier produced during the run
    #[serde(default)]
    pub highest_tier: TierLevel,
}

impl ScoreSubmission {
    /// Whether the score is reachable in the reported time
    pub fn is_plausible(&self) -> bool {
        let secs = match self.duration_seconds {
            0 => ZERO_DURATION_ALLOWANCE_SECS,
            d => d as u64,
        };
        self.final_score <= secs.saturating_mul(MAX_POINTS_PER_SECOND)
    }

    /// Worth posting at all (zero scores are not recorded)
    pub fn should_submit(&self) -> bool {
        self.final_score > 0 && self.is_plausible()
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}
