//! Orb Merge headless driver
//!
//! Plays a seeded session against the sandbox world: an auto-player drops
//! orbs at random columns, spends its power-up charges, saves mid-run and
//! reloads into a fresh world. Useful for watching the rules in the log
//! (`RUST_LOG=debug`).

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();

    let seed = std::env::args()
        .nth(1)
        .and_then(|arg| arg.parse::<u64>().ok())
        .unwrap_or(0x5eed);
    log::info!("Orb Merge (headless) starting, seed {}", seed);

    native::run(seed);
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // Browser builds drive the library directly
}

#[cfg(not(target_arch = "wasm32"))]
mod native {
    use glam::Vec2;
    use rand::{Rng, SeedableRng};
    use rand_pcg::Pcg32;

    use orb_merge::consts::*;
    use orb_merge::persistence::{self, MemoryStorage};
    use orb_merge::sim::{GameEvent, GamePhase, PhysicsWorld, SandboxWorld, SessionState, tick};
    use orb_merge::ChargeLedger;

    /// Hard stop for the demo (10 simulated minutes)
    const MAX_TICKS: u32 = 60 * 60 * 10;
    /// Save and reload once, this far into the run
    const SAVE_AT_TICK: u32 = 60 * 30;

    /// Driver state: session, physics world and the economy it spends from
    struct Game {
        state: SessionState,
        world: SandboxWorld,
        ledger: ChargeLedger,
        player: Pcg32,
        storage: MemoryStorage,
        accumulator: f32,
        ticks: u32,
        merges: u32,
    }

    impl Game {
        fn new(seed: u64) -> Self {
            Self {
                state: SessionState::new(seed),
                world: SandboxWorld::with_walls(),
                ledger: ChargeLedger::daily_allowance(),
                player: Pcg32::seed_from_u64(seed ^ 0xa11ce),
                storage: MemoryStorage::new(),
                accumulator: 0.0,
                ticks: 0,
                merges: 0,
            }
        }

        /// Feed a frame of wall-clock time, stepping at the fixed rate
        fn frame(&mut self, frame_dt: f32) {
            self.accumulator += frame_dt;
            while self.accumulator >= SIM_DT {
                self.accumulator -= SIM_DT;
                self.step();
            }
        }

        fn step(&mut self) {
            self.ticks += 1;
            self.auto_play();

            let contacts = self.world.step(SIM_DT);
            let events = tick(
                &mut self.state,
                &mut self.ledger,
                &mut self.world,
                &contacts,
                SIM_DT,
            );
            for event in events {
                match event {
                    GameEvent::Merged(outcome) => {
                        self.merges += 1;
                        log::debug!("Merge -> tier {} (+{})", outcome.tier, outcome.points);
                    }
                    GameEvent::GameOver(submission) => {
                        log::info!(
                            "Final score {} after {}s (submit: {})",
                            submission.final_score,
                            submission.duration_seconds,
                            submission.should_submit()
                        );
                    }
                    other => log::debug!("{:?}", other),
                }
            }
        }

        /// Drop whenever allowed, shake when the danger zone fills up,
        /// strike the highest orb once as a last resort
        fn auto_play(&mut self) {
            if self.state.phase() == GamePhase::GameOver {
                return;
            }
            if self.state.is_danger_zone_active() {
                if self.state.activate_shake(&mut self.ledger) {
                    log::info!("Auto-player used a shake");
                    return;
                }
                if self.state.activate_strike_mode(&self.ledger) {
                    let top = self
                        .world
                        .orbs()
                        .into_iter()
                        .min_by(|a, b| a.position.y.total_cmp(&b.position.y));
                    match top {
                        Some(orb) => {
                            self.state.point_select(orb.position);
                        }
                        None => {
                            self.state.cancel_strike_mode();
                        }
                    }
                    return;
                }
            }
            let x = self
                .player
                .random_range(BOARD_WIDTH * 0.15..BOARD_WIDTH * 0.85);
            self.state.drop_at(x);
        }

        /// Save, tear down the world, reload into a new one
        fn save_and_reload(&mut self) {
            self.state.suspend(&self.world);
            if let Err(e) = persistence::save_session(&mut self.storage, &self.state) {
                log::error!("Save failed: {}", e);
                return;
            }
            if let Err(e) = persistence::save_ledger(&mut self.storage, &self.ledger) {
                log::error!("Ledger save failed: {}", e);
            }

            self.world = SandboxWorld::with_walls();
            match persistence::load_session(&self.storage, &mut self.state) {
                Ok(true) => {
                    let restored = self.state.attach_world(&mut self.world);
                    log::info!("Reloaded {} orbs into a fresh world", restored);
                }
                Ok(false) => log::warn!("Nothing to reload"),
                Err(e) => log::error!("Load failed: {}", e),
            }
            match persistence::load_ledger(&self.storage) {
                Ok(ledger) => self.ledger = ledger,
                Err(e) => log::error!("Ledger load failed: {}", e),
            }
            self.state.resume();
        }
    }

    pub fn run(seed: u64) {
        let mut game = Game::new(seed);
        // Uneven frame pacing; the fixed step absorbs it
        let frames = [1.0 / 60.0, 1.0 / 30.0, 1.0 / 144.0];

        let mut saved = false;
        for frame_dt in frames.iter().cycle() {
            game.frame(*frame_dt);

            if !saved && game.ticks >= SAVE_AT_TICK {
                game.save_and_reload();
                saved = true;
            }
            if game.state.phase() == GamePhase::GameOver {
                break;
            }
            if game.ticks >= MAX_TICKS {
                log::info!("Time limit reached");
                break;
            }
        }

        log::info!(
            "Score {} (best {}), {} merges, highest tier {}, {} orbs on board, {}",
            game.state.score(),
            game.state.best_score(),
            game.merges,
            game.state.highest_tier_reached(),
            game.world.orb_count(),
            describe(game.world.orbs().first().map(|o| o.position))
        );
    }

    fn describe(first: Option<Vec2>) -> String {
        match first {
            Some(p) => format!("first orb at ({:.0}, {:.0})", p.x, p.y),
            None => "board empty".to_string(),
        }
    }
}
