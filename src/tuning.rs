//! Data-driven game balance
//!
//! Every field has a default, so a tuning file only needs the keys it changes.

use serde::{Deserialize, Serialize};

use crate::catalog::{MAX_TIER, TierLevel};
use crate::consts::*;

/// Balance values consumed by the rules layer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    // === Danger zone ===
    /// Orbs settled above this y (screen space, y down) are dangerous
    pub danger_line_y: f32,
    /// Sustained occupancy before the run ends
    pub danger_grace_ms: f32,
    /// Speed below which an orb counts as settled (px/s)
    pub settled_speed_epsilon: f32,

    // === Drops ===
    /// Minimum time between two drops
    pub drop_cooldown_ms: f32,
    /// Spawn height of dropped orbs
    pub spawn_y: f32,
    /// Leftmost drop column
    pub drop_min_x: f32,
    /// Rightmost drop column
    pub drop_max_x: f32,
    /// Cap on the "next orb" roll
    pub next_tier_cap: TierLevel,

    // === Power-ups ===
    /// Orbs removed from the top by a revive
    pub revive_clear_count: usize,
    /// Velocity change (px/s) of a shake
    pub shake_strength: f32,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            danger_line_y: DANGER_LINE_Y,
            danger_grace_ms: DANGER_GRACE_MS,
            settled_speed_epsilon: SETTLED_SPEED_EPSILON,

            drop_cooldown_ms: DROP_COOLDOWN_MS,
            spawn_y: SPAWN_Y,
            drop_min_x: WALL_THICKNESS,
            drop_max_x: BOARD_WIDTH - WALL_THICKNESS,
            next_tier_cap: NEXT_TIER_CAP,

            revive_clear_count: REVIVE_CLEAR_COUNT,
            shake_strength: SHAKE_STRENGTH,
        }
    }
}

impl Tuning {
    /// Parse tuning JSON (partial documents allowed) and sanitize it
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        let mut tuning: Tuning = serde_json::from_str(json)?;
        tuning.validate();
        Ok(tuning)
    }

    /// Serialize to pretty JSON
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Replace nonsensical values with defaults. Returns true if anything changed.
    pub fn validate(&mut self) -> bool {
        let defaults = Tuning::default();
        let mut changed = false;

        let mut fix = |value: &mut f32, fallback: f32, name: &str| {
            if !value.is_finite() || *value <= 0.0 {
                log::warn!("Tuning: invalid {} ({}), using {}", name, value, fallback);
                *value = fallback;
                changed = true;
            }
        };
        fix(&mut self.danger_grace_ms, defaults.danger_grace_ms, "danger_grace_ms");
        fix(
            &mut self.settled_speed_epsilon,
            defaults.settled_speed_epsilon,
            "settled_speed_epsilon",
        );
        fix(&mut self.shake_strength, defaults.shake_strength, "shake_strength");
        fix(&mut self.danger_line_y, defaults.danger_line_y, "danger_line_y");

        // Zero cooldown is allowed (tests, accessibility), negative is not
        if !self.drop_cooldown_ms.is_finite() || self.drop_cooldown_ms < 0.0 {
            log::warn!("Tuning: invalid drop_cooldown_ms ({})", self.drop_cooldown_ms);
            self.drop_cooldown_ms = defaults.drop_cooldown_ms;
            changed = true;
        }

        if !(self.drop_min_x.is_finite() && self.drop_max_x.is_finite())
            || self.drop_min_x > self.drop_max_x
        {
            log::warn!(
                "Tuning: invalid drop span [{}, {}]",
                self.drop_min_x,
                self.drop_max_x
            );
            self.drop_min_x = defaults.drop_min_x;
            self.drop_max_x = defaults.drop_max_x;
            changed = true;
        }

        let cap = self.next_tier_cap.clamp(1, MAX_TIER);
        if cap != self.next_tier_cap {
            log::warn!("Tuning: next_tier_cap {} clamped to {}", self.next_tier_cap, cap);
            self.next_tier_cap = cap;
            changed = true;
        }

        changed
    }
}
