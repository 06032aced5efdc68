//! Session state and lifecycle
//!
//! Owns score, tier progression, timer, phase and the queue of player
//! commands waiting for the next tick boundary. UI-facing operations live
//! here and never fail loudly: an action that makes no sense in the current
//! phase returns `false` and changes nothing.

use std::collections::VecDeque;

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::danger::DangerMonitor;
use super::merge::MergeOutcome;
use super::physics::{BodyHandle, PhysicsWorld};
use super::snapshot::BoardSnapshot;
use crate::catalog::{self, MAX_TIER, TierLevel};
use crate::clamp_drop_x;
use crate::ledger::{ChargeLedger, PowerUpKind};
use crate::persistence::{PendingDrop, SavedSession};
use crate::submission::ScoreSubmission;
use crate::tuning::Tuning;

/// Session lifecycle phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Before the first drop
    Idle,
    /// Active run
    Playing,
    /// Timer stopped, board captured
    Paused,
    /// Overflowed; only a revive or reset leaves this phase
    GameOver,
}

/// Player intent queued for the next tick
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Command {
    /// Spawn an orb of `tier` at column `x`
    Drop { x: f32, tier: TierLevel },
    /// Destabilize the board (charge already paid)
    Shake,
    /// Hit-test and remove one orb under `point`
    Strike { point: Vec2 },
    /// Clear the top of the stack and continue the run
    Revive,
    /// Remove every orb (new run)
    ClearBoard,
}

/// Things that happened during a tick, for UI feedback
#[derive(Debug, Clone, PartialEq)]
pub enum GameEvent {
    OrbDropped { handle: BodyHandle, tier: TierLevel, x: f32 },
    /// An accepted drop that never spawned (run ended or session replaced)
    DropDiscarded { tier: TierLevel, x: f32 },
    Merged(MergeOutcome),
    Shaken { bodies: usize },
    Struck { handle: BodyHandle, tier: TierLevel },
    /// Targeting stays armed after a miss
    StrikeMissed { point: Vec2 },
    Revived { removed: usize },
    BoardCleared { removed: usize },
    GameOver(ScoreSubmission),
}

/// Authoritative state of one player's session
#[derive(Debug, Clone)]
pub struct SessionState {
    /// Seed of the "next orb" RNG
    pub seed: u64,
    pub(super) rng: Pcg32,
    pub(super) tuning: Tuning,
    score: u64,
    /// Best score across runs (survives reset)
    best_score: u64,
    /// Tier the player drops next
    current_tier: TierLevel,
    /// Tier after that (preview)
    next_tier: TierLevel,
    /// Watermark of merge results this run (0 before the first merge)
    highest_tier_reached: TierLevel,
    elapsed_secs: f64,
    phase: GamePhase,
    /// Most recent merge result, for feedback
    last_merged_tier: Option<TierLevel>,
    /// Bumped on reset so consumers rebuild their physics world
    generation: u64,
    pub(super) targeting: bool,
    drop_cooldown_ms: f32,
    pub(super) danger: DangerMonitor,
    snapshot: Option<BoardSnapshot>,
    commands: VecDeque<Command>,
    /// Events raised outside a tick, reported by the next one
    pending_events: Vec<GameEvent>,
    pending_submission: Option<ScoreSubmission>,
}

impl SessionState {
    /// New session in `Idle` with default tuning
    pub fn new(seed: u64) -> Self {
        Self::with_tuning(seed, Tuning::default())
    }

    pub fn with_tuning(seed: u64, mut tuning: Tuning) -> Self {
        tuning.validate();
        let mut state = Self {
            seed,
            rng: Pcg32::seed_from_u64(seed),
            tuning,
            score: 0,
            best_score: 0,
            current_tier: 1,
            next_tier: 1,
            highest_tier_reached: 0,
            elapsed_secs: 0.0,
            phase: GamePhase::Idle,
            last_merged_tier: None,
            generation: 0,
            targeting: false,
            drop_cooldown_ms: 0.0,
            danger: DangerMonitor::new(),
            snapshot: None,
            commands: VecDeque::new(),
            pending_events: Vec::new(),
            pending_submission: None,
        };
        state.next_tier = state.roll_next_tier();
        state
    }

    // === Observers ===

    pub fn score(&self) -> u64 {
        self.score
    }

    pub fn best_score(&self) -> u64 {
        self.best_score
    }

    pub fn phase(&self) -> GamePhase {
        self.phase
    }

    pub fn current_tier(&self) -> TierLevel {
        self.current_tier
    }

    pub fn next_tier(&self) -> TierLevel {
        self.next_tier
    }

    pub fn highest_tier_reached(&self) -> TierLevel {
        self.highest_tier_reached
    }

    pub fn last_merged_tier(&self) -> Option<TierLevel> {
        self.last_merged_tier
    }

    /// Whole seconds of play this run
    pub fn elapsed_seconds(&self) -> u32 {
        self.elapsed_secs.floor().min(u32::MAX as f64) as u32
    }

    /// Danger zone occupied (warning), independent of the game-over decision
    pub fn is_danger_zone_active(&self) -> bool {
        self.phase == GamePhase::Playing && self.danger.is_zone_active()
    }

    pub fn is_targeting(&self) -> bool {
        self.targeting
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn tuning(&self) -> &Tuning {
        &self.tuning
    }

    /// Last captured board, if any
    pub fn snapshot(&self) -> Option<&BoardSnapshot> {
        self.snapshot.as_ref()
    }

    /// Commands waiting for the next tick
    pub fn pending_commands(&self) -> usize {
        self.commands.len()
    }

    /// Take the staged final score (once per game over)
    pub fn take_submission(&mut self) -> Option<ScoreSubmission> {
        self.pending_submission.take()
    }

    // === Lifecycle ===

    /// Idle -> Playing
    pub fn start(&mut self) -> bool {
        if self.phase != GamePhase::Idle {
            return false;
        }
        self.phase = GamePhase::Playing;
        log::info!("Run started (generation {})", self.generation);
        true
    }

    /// Begin a fresh run from any phase. Keeps `best_score`.
    pub fn reset(&mut self) {
        self.score = 0;
        self.elapsed_secs = 0.0;
        self.highest_tier_reached = 0;
        self.last_merged_tier = None;
        self.current_tier = 1;
        self.next_tier = self.roll_next_tier();
        self.targeting = false;
        self.drop_cooldown_ms = 0.0;
        self.danger.reset();
        self.snapshot = None;
        self.discard_queued_drops();
        self.commands.push_back(Command::ClearBoard);
        self.generation += 1;
        self.phase = GamePhase::Playing;
        log::info!(
            "Run reset (generation {}, best {})",
            self.generation,
            self.best_score
        );
    }

    /// Playing -> Paused, capturing the board
    pub fn pause<W: PhysicsWorld + ?Sized>(&mut self, world: &W) -> bool {
        if self.phase != GamePhase::Playing {
            return false;
        }
        self.snapshot = Some(BoardSnapshot::capture(world));
        self.phase = GamePhase::Paused;
        log::info!("Paused at {}s, score {}", self.elapsed_seconds(), self.score);
        true
    }

    /// Page hidden / world about to be torn down: capture the board and
    /// pause if a run is active
    pub fn suspend<W: PhysicsWorld + ?Sized>(&mut self, world: &W) -> bool {
        match self.phase {
            GamePhase::Playing => self.pause(world),
            GamePhase::Paused => {
                self.snapshot = Some(BoardSnapshot::capture(world));
                true
            }
            GamePhase::Idle | GamePhase::GameOver => false,
        }
    }

    /// Paused -> Playing. The live world is assumed intact; call
    /// [`attach_world`](Self::attach_world) first if it was recreated.
    pub fn resume(&mut self) -> bool {
        if self.phase != GamePhase::Paused {
            return false;
        }
        self.phase = GamePhase::Playing;
        log::info!("Resumed");
        true
    }

    /// A physics world was (re)created: repopulate it from the last snapshot.
    /// Returns the number of orbs restored.
    pub fn attach_world<W: PhysicsWorld + ?Sized>(&mut self, world: &mut W) -> usize {
        match &self.snapshot {
            Some(snapshot) => snapshot.restore(world),
            None => 0,
        }
    }

    // === Player actions ===

    /// Queue a drop of the current orb at column `x` and advance the turn
    pub fn drop_at(&mut self, x: f32) -> bool {
        if self.phase == GamePhase::Idle {
            self.start();
        }
        if self.phase != GamePhase::Playing || self.targeting {
            return false;
        }
        if self.drop_cooldown_ms > 0.0 {
            log::debug!("Drop ignored, cooldown {:.0}ms", self.drop_cooldown_ms);
            return false;
        }

        let x = clamp_drop_x(x, self.tuning.drop_min_x, self.tuning.drop_max_x);
        self.commands.push_back(Command::Drop {
            x,
            tier: self.current_tier,
        });
        self.drop_cooldown_ms = self.tuning.drop_cooldown_ms;
        self.next_turn();
        true
    }

    /// Arm targeting mode. Fails without charging if no strike is available.
    pub fn activate_strike_mode(&mut self, ledger: &ChargeLedger) -> bool {
        if self.phase != GamePhase::Playing {
            return false;
        }
        if !ledger.has_charge(PowerUpKind::Strike) {
            log::debug!("Strike unavailable, no charges");
            return false;
        }
        self.targeting = true;
        true
    }

    /// Leave targeting mode. Nothing was charged, nothing to undo.
    pub fn cancel_strike_mode(&mut self) -> bool {
        std::mem::replace(&mut self.targeting, false)
    }

    /// Pointer selection while targeting: queue a strike at `point`
    pub fn point_select(&mut self, point: Vec2) -> bool {
        if self.phase != GamePhase::Playing || !self.targeting || !point.is_finite() {
            return false;
        }
        self.commands.push_back(Command::Strike { point });
        true
    }

    /// Spend a shake charge and queue the shake
    pub fn activate_shake(&mut self, ledger: &mut ChargeLedger) -> bool {
        if self.phase != GamePhase::Playing {
            return false;
        }
        if !ledger.try_consume(PowerUpKind::Shake) {
            return false;
        }
        self.commands.push_back(Command::Shake);
        true
    }

    /// Queue a revive. Only valid after game over.
    pub fn activate_revive(&mut self) -> bool {
        if self.phase != GamePhase::GameOver {
            return false;
        }
        if self.commands.contains(&Command::Revive) {
            return true;
        }
        self.commands.push_back(Command::Revive);
        true
    }

    // === Tick-side helpers ===

    /// Uniform roll in 1..=min(cap, highest + 1)
    fn roll_next_tier(&mut self) -> TierLevel {
        let cap = self
            .tuning
            .next_tier_cap
            .min(self.highest_tier_reached.saturating_add(1))
            .clamp(1, MAX_TIER);
        self.rng.random_range(1..=cap)
    }

    fn next_turn(&mut self) {
        self.current_tier = self.next_tier;
        self.next_tier = self.roll_next_tier();
    }

    pub(super) fn take_commands(&mut self) -> VecDeque<Command> {
        std::mem::take(&mut self.commands)
    }

    /// Empty the queue, reporting any drops in it as discarded
    fn discard_queued_drops(&mut self) {
        for command in std::mem::take(&mut self.commands) {
            if let Command::Drop { x, tier } = command {
                log::warn!("Queued drop of tier {} discarded", tier);
                self.pending_events.push(GameEvent::DropDiscarded { tier, x });
            }
        }
    }

    pub(super) fn take_pending_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.pending_events)
    }

    /// Undo the turn advance of a drop that never spawned: its orb goes
    /// back in hand and the previous current tier becomes the preview again
    pub(super) fn return_drop(&mut self, tier: TierLevel) {
        self.next_tier = self.current_tier;
        self.current_tier = tier;
    }

    /// Advance run time and cooldowns
    pub(super) fn advance_clock(&mut self, dt: f32) {
        self.elapsed_secs += dt as f64;
        self.drop_cooldown_ms = (self.drop_cooldown_ms - dt * 1000.0).max(0.0);
    }

    pub(super) fn record_merge(&mut self, outcome: &MergeOutcome) {
        self.score = self.score.saturating_add(outcome.points as u64);
        self.highest_tier_reached = self.highest_tier_reached.max(outcome.tier);
        self.last_merged_tier = Some(outcome.tier);
    }

    /// Enter GameOver, update best score and stage the submission
    pub(super) fn enter_game_over(&mut self) -> ScoreSubmission {
        self.phase = GamePhase::GameOver;
        self.targeting = false;
        if self.score > self.best_score {
            log::info!("New best score: {} (was {})", self.score, self.best_score);
            self.best_score = self.score;
        }
        let submission = ScoreSubmission {
            final_score: self.score,
            duration_seconds: self.elapsed_seconds(),
            highest_tier: self.highest_tier_reached,
        };
        self.pending_submission = Some(submission);
        log::info!(
            "Game over: score {} in {}s",
            submission.final_score,
            submission.duration_seconds
        );
        submission
    }

    /// GameOver -> Playing after the board was trimmed
    pub(super) fn continue_after_revive(&mut self) {
        self.phase = GamePhase::Playing;
        self.danger.reset();
        self.drop_cooldown_ms = 0.0;
        log::info!("Revived, continuing with score {}", self.score);
    }

    // === Persistence ===

    /// Persisted subset of this session
    pub fn to_saved(&self) -> SavedSession {
        SavedSession {
            best_score: self.best_score,
            score: self.score,
            current_tier: self.current_tier,
            next_tier: self.next_tier,
            highest_tier_reached: self.highest_tier_reached,
            elapsed_secs: self.elapsed_secs,
            paused: self.phase == GamePhase::Paused,
            game_over: self.phase == GamePhase::GameOver,
            board: self.snapshot.clone().unwrap_or_default(),
            pending_drops: self
                .commands
                .iter()
                .filter_map(|command| match *command {
                    Command::Drop { x, tier } => Some(PendingDrop { x, tier }),
                    _ => None,
                })
                .collect(),
        }
    }

    /// Load a saved session. A finished run comes back in `GameOver` (its
    /// score was already submitted). A run with progress comes back `Paused`
    /// so the driver can attach a world and resume; otherwise `Idle`.
    ///
    /// Drops still queued in the replaced session are reported as
    /// [`GameEvent::DropDiscarded`] on the next tick; drops queued in the
    /// saved session are queued again.
    pub fn apply_saved(&mut self, mut saved: SavedSession) {
        let valid_or_one = |level: TierLevel| if catalog::is_valid(level) { level } else { 1 };

        self.best_score = self.best_score.max(saved.best_score).max(saved.score);
        self.score = saved.score;
        self.current_tier = valid_or_one(saved.current_tier);
        self.next_tier = valid_or_one(saved.next_tier);
        self.highest_tier_reached = saved.highest_tier_reached.min(MAX_TIER);
        self.elapsed_secs = if saved.elapsed_secs.is_finite() {
            saved.elapsed_secs.max(0.0)
        } else {
            0.0
        };
        self.last_merged_tier = None;
        self.targeting = false;
        self.drop_cooldown_ms = 0.0;
        self.danger.reset();
        self.pending_submission = None;

        self.discard_queued_drops();
        for drop in &saved.pending_drops {
            if catalog::is_valid(drop.tier) {
                let x = clamp_drop_x(drop.x, self.tuning.drop_min_x, self.tuning.drop_max_x);
                self.commands.push_back(Command::Drop { x, tier: drop.tier });
            }
        }

        let discarded = saved.board.sanitize();
        if discarded > 0 {
            log::warn!("Dropped {} invalid orbs from saved board", discarded);
        }
        let has_progress = saved.paused
            || saved.score > 0
            || !saved.board.is_empty()
            || !self.commands.is_empty();
        self.snapshot = if saved.board.is_empty() {
            None
        } else {
            Some(saved.board)
        };
        self.phase = if saved.game_over {
            GamePhase::GameOver
        } else if has_progress {
            GamePhase::Paused
        } else {
            GamePhase::Idle
        };
        log::info!(
            "Loaded session: score {}, best {}, {} orbs, phase {:?}",
            self.score,
            self.best_score,
            self.snapshot.as_ref().map_or(0, BoardSnapshot::len),
            self.phase
        );
    }
}
