//! Overflow detection
//!
//! An orb settled above the danger line for longer than the grace period
//! ends the run. Accumulates elapsed tick time, not tick count, so uneven
//! frame pacing doesn't change the outcome.

use super::physics::BodyInfo;
use crate::tuning::Tuning;

/// Result of one danger scan
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DangerStatus {
    /// No orb in the zone
    Clear,
    /// Zone occupied; grace period still running
    Warning { elapsed_ms: f32 },
    /// Grace period exhausted
    Overflow,
}

/// Whether a body counts toward overflow: an orb above the line that is settled
pub fn is_dangerous(body: &BodyInfo, tuning: &Tuning) -> bool {
    body.tag.is_orb()
        && body.position.y < tuning.danger_line_y
        && body.speed() < tuning.settled_speed_epsilon
}

/// Danger duration accumulator
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DangerMonitor {
    accumulated_ms: f32,
    zone_occupied: bool,
}

impl DangerMonitor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Scan the current bodies after `dt_ms` of simulated time
    pub fn scan(&mut self, bodies: &[BodyInfo], dt_ms: f32, tuning: &Tuning) -> DangerStatus {
        self.zone_occupied = bodies.iter().any(|b| is_dangerous(b, tuning));

        if !self.zone_occupied {
            // No partial credit across gaps
            self.accumulated_ms = 0.0;
            return DangerStatus::Clear;
        }

        self.accumulated_ms += dt_ms.max(0.0);
        if self.accumulated_ms >= tuning.danger_grace_ms {
            DangerStatus::Overflow
        } else {
            DangerStatus::Warning {
                elapsed_ms: self.accumulated_ms,
            }
        }
    }

    /// Zone currently occupied (UI warning, not the terminal decision)
    #[inline]
    pub fn is_zone_active(&self) -> bool {
        self.zone_occupied
    }

    #[inline]
    pub fn elapsed_ms(&self) -> f32 {
        self.accumulated_ms
    }

    pub fn reset(&mut self) {
        self.accumulated_ms = 0.0;
        self.zone_occupied = false;
    }
}
