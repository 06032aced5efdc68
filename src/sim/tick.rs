//! Fixed timestep session tick
//!
//! Runs once per physics step, after the world has advanced and reported
//! its contact-start events. Queued commands are applied first, then
//! merges, then the overflow check.

use glam::Vec2;

use super::danger::DangerStatus;
use super::merge::resolve_contacts;
use super::physics::{BodyTag, ContactPair, PhysicsWorld};
use super::powerup::{clear_top, shake, strike_target};
use super::snapshot::clear_orbs;
use super::state::{Command, GameEvent, GamePhase, SessionState};
use crate::catalog;
use crate::ledger::{ChargeLedger, PowerUpKind};

/// Advance the session by one fixed timestep.
///
/// `contacts` are the contact-start pairs the world reported for the step
/// that just ran. Returns what happened, in order.
pub fn tick<W: PhysicsWorld + ?Sized>(
    state: &mut SessionState,
    ledger: &mut ChargeLedger,
    world: &mut W,
    contacts: &[ContactPair],
    dt: f32,
) -> Vec<GameEvent> {
    let mut events = state.take_pending_events();

    // Commands wait in the queue until the run resumes
    if state.phase() == GamePhase::Paused {
        return events;
    }

    let mut returned = Vec::new();
    for command in state.take_commands() {
        match command {
            Command::Drop { x, tier } if state.phase() != GamePhase::Playing => {
                log::warn!("Drop of tier {} discarded in {:?}", tier, state.phase());
                returned.push(tier);
                events.push(GameEvent::DropDiscarded { tier, x });
            }
            command => apply_command(state, ledger, world, command, &mut events),
        }
    }
    // Newest first, so the hand ends up as it was before the earliest drop
    for tier in returned.into_iter().rev() {
        state.return_drop(tier);
    }

    if state.phase() != GamePhase::Playing {
        return events;
    }

    let dt = if dt.is_finite() { dt.max(0.0) } else { 0.0 };
    state.advance_clock(dt);

    for outcome in resolve_contacts(world, contacts) {
        state.record_merge(&outcome);
        events.push(GameEvent::Merged(outcome));
    }

    let bodies = world.all_bodies();
    if let DangerStatus::Overflow = state.danger.scan(&bodies, dt * 1000.0, &state.tuning) {
        let submission = state.enter_game_over();
        events.push(GameEvent::GameOver(submission));
    }

    events
}

fn apply_command<W: PhysicsWorld + ?Sized>(
    state: &mut SessionState,
    ledger: &mut ChargeLedger,
    world: &mut W,
    command: Command,
    events: &mut Vec<GameEvent>,
) {
    let playing = state.phase() == GamePhase::Playing;

    match command {
        Command::Drop { x, tier } => {
            let Some(def) = catalog::tier_of(tier) else {
                log::warn!("Drop with unknown tier {}", tier);
                return;
            };
            let position = Vec2::new(x, state.tuning.spawn_y);
            let handle = world.spawn_circle(position, def.radius, BodyTag::Orb(tier));
            log::debug!("Dropped tier {} at x={:.1}", tier, x);
            events.push(GameEvent::OrbDropped { handle, tier, x });
        }
        Command::Shake => {
            if !playing {
                // Charge was spent at invocation
                log::info!("Shake dropped, run no longer active");
                return;
            }
            let strength = state.tuning.shake_strength;
            let bodies = shake(world, &mut state.rng, strength);
            log::info!("Shake applied to {} bodies", bodies);
            events.push(GameEvent::Shaken { bodies });
        }
        Command::Strike { point } => {
            if !playing || !state.targeting {
                return;
            }
            let Some(target) = strike_target(world, point) else {
                events.push(GameEvent::StrikeMissed { point });
                return;
            };
            state.targeting = false;
            if !ledger.try_consume(PowerUpKind::Strike) {
                log::warn!("Strike charge gone before selection resolved");
                return;
            }
            world.remove_body(target.handle);
            let tier = target.tag.tier().unwrap_or_default();
            log::info!("Struck tier {} orb {:?}", tier, target.handle);
            events.push(GameEvent::Struck {
                handle: target.handle,
                tier,
            });
        }
        Command::Revive => {
            if state.phase() != GamePhase::GameOver {
                return;
            }
            let removed = clear_top(world, state.tuning.revive_clear_count).len();
            state.continue_after_revive();
            events.push(GameEvent::Revived { removed });
        }
        Command::ClearBoard => {
            let removed = clear_orbs(world);
            log::debug!("Cleared {} orbs", removed);
            events.push(GameEvent::BoardCleared { removed });
        }
    }
}
