//! Whole-session scenarios against the sandbox world

use glam::Vec2;

use orb_merge::consts::SIM_DT;
use orb_merge::persistence::{self, MemoryStorage};
use orb_merge::sim::{
    BodyTag, GameEvent, GamePhase, PhysicsWorld, SandboxWorld, SessionState, tick,
};
use orb_merge::{ChargeLedger, PowerUpKind};

struct Harness {
    state: SessionState,
    ledger: ChargeLedger,
    world: SandboxWorld,
}

impl Harness {
    fn new(seed: u64) -> Self {
        Self {
            state: SessionState::new(seed),
            ledger: ChargeLedger::new(),
            world: SandboxWorld::with_walls(),
        }
    }

    fn zero_gravity(seed: u64) -> Self {
        let mut harness = Self::new(seed);
        harness.world.set_gravity(Vec2::ZERO);
        harness
    }

    fn run(&mut self, steps: usize) -> Vec<GameEvent> {
        let mut events = Vec::new();
        for _ in 0..steps {
            let contacts = self.world.step(SIM_DT);
            events.extend(tick(
                &mut self.state,
                &mut self.ledger,
                &mut self.world,
                &contacts,
                SIM_DT,
            ));
        }
        events
    }
}

fn merges(events: &[GameEvent]) -> usize {
    events
        .iter()
        .filter(|e| matches!(e, GameEvent::Merged(_)))
        .count()
}

#[test]
fn test_two_drops_merge_into_next_tier() {
    let mut h = Harness::new(1);

    assert!(h.state.drop_at(250.0));
    let mut events = h.run(40);
    assert!(h.state.drop_at(250.0));
    events.extend(h.run(600));

    assert_eq!(merges(&events), 1);
    assert_eq!(h.state.score(), 10);
    assert_eq!(h.state.highest_tier_reached(), 2);
    let orbs = h.world.orbs();
    assert_eq!(orbs.len(), 1);
    assert_eq!(orbs[0].tag, BodyTag::Orb(2));
    assert_eq!(h.state.phase(), GamePhase::Playing);
}

#[test]
fn test_drop_cooldown_gates_rapid_input() {
    let mut h = Harness::zero_gravity(2);
    assert!(h.state.drop_at(100.0));
    assert!(!h.state.drop_at(200.0));
    h.run(1);
    assert!(!h.state.drop_at(200.0));
    h.run(30);
    assert!(h.state.drop_at(200.0));
    h.run(1);
    assert_eq!(h.world.orb_count(), 2);
}

#[test]
fn test_overflow_ends_run_and_revive_continues() {
    let mut h = Harness::zero_gravity(3);
    h.state.start();
    for x in [100.0, 200.0, 300.0] {
        h.world.spawn_circle(Vec2::new(x, 120.0), 15.0, BodyTag::Orb(1));
    }

    // Just under three seconds: warning only
    let events = h.run(170);
    assert!(events.is_empty());
    assert!(h.state.is_danger_zone_active());

    let events = h.run(20);
    let submissions: Vec<_> = events
        .iter()
        .filter_map(|e| match e {
            GameEvent::GameOver(s) => Some(*s),
            _ => None,
        })
        .collect();
    assert_eq!(submissions.len(), 1);
    assert_eq!(submissions[0].duration_seconds, 3);
    assert_eq!(h.state.phase(), GamePhase::GameOver);
    assert_eq!(h.state.take_submission(), Some(submissions[0]));

    // Frozen until revived
    assert!(!h.state.drop_at(250.0));
    let time = h.state.elapsed_seconds();
    h.run(60);
    assert_eq!(h.state.elapsed_seconds(), time);

    assert!(h.state.activate_revive());
    let events = h.run(1);
    assert!(events.contains(&GameEvent::Revived { removed: 3 }));
    assert_eq!(h.state.phase(), GamePhase::Playing);
    assert_eq!(h.world.orb_count(), 0);
    assert!(h.state.drop_at(250.0));
}

#[test]
fn test_warning_clears_when_zone_empties() {
    let mut h = Harness::zero_gravity(4);
    h.state.start();
    let orb = h.world.spawn_circle(Vec2::new(250.0, 100.0), 15.0, BodyTag::Orb(1));

    h.run(120);
    assert!(h.state.is_danger_zone_active());

    h.world.remove_body(orb);
    h.run(1);
    assert!(!h.state.is_danger_zone_active());

    // A fresh grace period is needed after the gap
    h.world.spawn_circle(Vec2::new(250.0, 100.0), 15.0, BodyTag::Orb(1));
    h.run(120);
    assert_eq!(h.state.phase(), GamePhase::Playing);
}

#[test]
fn test_strike_without_charges_never_targets() {
    let mut h = Harness::zero_gravity(5);
    h.state.start();
    h.world.spawn_circle(Vec2::new(250.0, 500.0), 15.0, BodyTag::Orb(1));

    assert!(!h.state.activate_strike_mode(&h.ledger));
    assert!(!h.state.is_targeting());
    assert!(!h.state.point_select(Vec2::new(250.0, 500.0)));
    h.run(1);
    assert_eq!(h.world.orb_count(), 1);
}

#[test]
fn test_purchased_strike_used_after_free() {
    let mut h = Harness::zero_gravity(6);
    h.state.start();
    h.ledger = ChargeLedger::daily_allowance();
    h.ledger.grant_pack(PowerUpKind::Strike);
    let a = h.world.spawn_circle(Vec2::new(150.0, 500.0), 15.0, BodyTag::Orb(1));
    let b = h.world.spawn_circle(Vec2::new(350.0, 500.0), 15.0, BodyTag::Orb(1));

    for (handle, point) in [(a, Vec2::new(150.0, 500.0)), (b, Vec2::new(350.0, 500.0))] {
        assert!(h.state.activate_strike_mode(&h.ledger));
        assert!(h.state.point_select(point));
        let events = h.run(1);
        assert!(events.contains(&GameEvent::Struck { handle, tier: 1 }));
    }

    assert_eq!(h.ledger.free_strikes, 0);
    assert_eq!(h.ledger.purchased_strikes, 1);
    assert_eq!(h.world.orb_count(), 0);
}

#[test]
fn test_shake_lifts_board() {
    let mut h = Harness::new(7);
    h.state.start();
    h.ledger = ChargeLedger::daily_allowance();
    let orb = h.world.spawn_circle(Vec2::new(250.0, 675.0), 15.0, BodyTag::Orb(1));
    h.run(30);
    let resting_y = h.world.body(orb).unwrap().position.y;

    assert!(h.state.activate_shake(&mut h.ledger));
    assert!(!h.state.activate_shake(&mut h.ledger));
    let events = h.run(1);
    assert!(events.contains(&GameEvent::Shaken { bodies: 1 }));
    h.run(5);
    assert!(h.world.body(orb).unwrap().position.y < resting_y - 5.0);
}

#[test]
fn test_best_score_monotonic_across_resets() {
    let mut h = Harness::zero_gravity(8);
    let mut best = 0;

    for round in 0..3u32 {
        h.state.reset();
        h.run(1);
        // Two touching tier-1 orbs per extra round: score grows then resets
        for i in 0..=round {
            let x = 100.0 + i as f32 * 80.0;
            h.world.spawn_circle(Vec2::new(x, 500.0), 15.0, BodyTag::Orb(1));
            h.world.spawn_circle(Vec2::new(x + 29.8, 500.0), 15.0, BodyTag::Orb(1));
        }
        h.run(2);
        assert_eq!(h.state.score(), 10 * (round as u64 + 1));

        // Overflow to end the round
        h.world.spawn_circle(Vec2::new(400.0, 100.0), 15.0, BodyTag::Orb(1));
        h.run(200);
        assert_eq!(h.state.phase(), GamePhase::GameOver);
        assert!(h.state.best_score() >= best);
        best = h.state.best_score();
    }
    assert_eq!(best, 30);

    h.state.reset();
    assert_eq!(h.state.score(), 0);
    assert_eq!(h.state.best_score(), 30);
}

#[test]
fn test_reset_bumps_generation_and_clears_board() {
    let mut h = Harness::zero_gravity(9);
    h.state.drop_at(250.0);
    h.run(1);
    assert_eq!(h.world.orb_count(), 1);

    let generation = h.state.generation();
    h.state.reset();
    assert_eq!(h.state.generation(), generation + 1);
    let events = h.run(1);
    assert!(events.contains(&GameEvent::BoardCleared { removed: 1 }));
    assert_eq!(h.world.orb_count(), 0);
    assert_eq!(h.state.phase(), GamePhase::Playing);
}

#[test]
fn test_pause_survives_world_teardown() {
    let mut h = Harness::new(10);
    h.state.start();
    h.world.spawn_circle(Vec2::new(150.0, 675.0), 15.0, BodyTag::Orb(1));
    h.world.spawn_circle(Vec2::new(300.0, 665.0), 25.0, BodyTag::Orb(2));
    h.run(10);

    assert!(h.state.suspend(&h.world));
    assert_eq!(h.state.phase(), GamePhase::Paused);
    let paused_at = h.state.elapsed_seconds();

    // World destroyed while hidden; a new one gets the board back
    h.world = SandboxWorld::with_walls();
    assert_eq!(h.state.attach_world(&mut h.world), 2);
    // Attaching again doesn't duplicate
    assert_eq!(h.state.attach_world(&mut h.world), 2);
    assert_eq!(h.world.orb_count(), 2);

    assert!(h.state.resume());
    h.run(60);
    assert_eq!(h.state.elapsed_seconds(), paused_at + 1);
    assert_eq!(h.world.orb_count(), 2);
}

#[test]
fn test_save_and_reload_session() {
    let mut storage = MemoryStorage::new();
    let mut h = Harness::new(11);
    h.state.start();
    h.world.spawn_circle(Vec2::new(150.0, 675.0), 15.0, BodyTag::Orb(1));
    h.run(30);
    h.state.suspend(&h.world);
    persistence::save_session(&mut storage, &h.state).unwrap();

    let mut loaded = SessionState::new(12);
    assert!(persistence::load_session(&storage, &mut loaded).unwrap());
    assert_eq!(loaded.phase(), GamePhase::Paused);
    assert_eq!(loaded.current_tier(), h.state.current_tier());
    assert_eq!(loaded.next_tier(), h.state.next_tier());

    let mut world = SandboxWorld::with_walls();
    assert_eq!(loaded.attach_world(&mut world), 1);
    assert!(loaded.resume());
}
