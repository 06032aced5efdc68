//! Power-up effects on the physics world
//!
//! Pure world mutations. Charge accounting and phase gating happen in
//! [`SessionState`](super::state::SessionState) before these run.

use glam::Vec2;
use rand::Rng;

use super::physics::{BodyHandle, BodyInfo, PhysicsWorld};

/// Kick every non-static body: random horizontal impulse plus a fixed
/// upward one, both proportional to mass. Returns the number of bodies hit.
pub fn shake<W, R>(world: &mut W, rng: &mut R, strength: f32) -> usize
where
    W: PhysicsWorld + ?Sized,
    R: Rng,
{
    let mut shaken = 0;
    for body in world.all_bodies() {
        if body.is_static || !body.mass.is_finite() {
            continue;
        }
        let horizontal = (rng.random::<f32>() - 0.5) * strength;
        // Screen space: negative y is up
        let impulse = Vec2::new(horizontal, -strength) * body.mass;
        world.apply_impulse(body.handle, impulse);
        shaken += 1;
    }
    shaken
}

/// First live orb under `point`, if any
pub fn strike_target<W: PhysicsWorld + ?Sized>(world: &W, point: Vec2) -> Option<BodyInfo> {
    world
        .query_point(point)
        .into_iter()
        .filter_map(|handle| world.body(handle))
        .find(|body| body.tag.is_orb())
}

/// Remove the `count` topmost orbs (smallest y first).
/// Returns the handles removed, topmost first.
pub fn clear_top<W: PhysicsWorld + ?Sized>(world: &mut W, count: usize) -> Vec<BodyHandle> {
    let mut orbs = world.orbs();
    orbs.sort_by(|a, b| {
        a.position
            .y
            .partial_cmp(&b.position.y)
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    let mut removed = Vec::with_capacity(count.min(orbs.len()));
    for orb in orbs.into_iter().take(count) {
        if world.remove_body(orb.handle) {
            removed.push(orb.handle);
        }
    }
    removed
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::physics::BodyTag;
    use crate::sim::sandbox::SandboxWorld;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    fn world() -> SandboxWorld {
        let mut world = SandboxWorld::with_walls();
        world.set_gravity(Vec2::ZERO);
        world
    }

    #[test]
    fn test_shake_moves_only_dynamic_bodies() {
        let mut world = world();
        let orb = world.spawn_circle(Vec2::new(200.0, 600.0), 25.0, BodyTag::Orb(2));
        let mut rng = Pcg32::seed_from_u64(7);

        assert_eq!(shake(&mut world, &mut rng, 300.0), 1);

        let v = world.body(orb).unwrap().velocity;
        assert!((v.y + 300.0).abs() < 1e-2, "upward kick, got {}", v.y);
        assert!(v.x.abs() <= 150.0 + 1e-2);
        for wall in world.all_bodies().iter().filter(|b| b.is_static) {
            assert_eq!(wall.velocity, Vec2::ZERO);
        }
    }

    #[test]
    fn test_strike_target_ignores_walls() {
        let mut world = world();
        let orb = world.spawn_circle(Vec2::new(200.0, 600.0), 25.0, BodyTag::Orb(2));

        assert_eq!(strike_target(&world, Vec2::new(210.0, 600.0)).map(|b| b.handle), Some(orb));
        assert!(strike_target(&world, Vec2::new(250.0, 700.0)).is_none());
        assert!(strike_target(&world, Vec2::new(400.0, 300.0)).is_none());
    }

    #[test]
    fn test_clear_top_removes_highest() {
        let mut world = world();
        let low = world.spawn_circle(Vec2::new(100.0, 600.0), 15.0, BodyTag::Orb(1));
        let top = world.spawn_circle(Vec2::new(200.0, 100.0), 15.0, BodyTag::Orb(1));
        let mid = world.spawn_circle(Vec2::new(300.0, 300.0), 15.0, BodyTag::Orb(1));
        let high = world.spawn_circle(Vec2::new(400.0, 200.0), 15.0, BodyTag::Orb(1));

        let removed = clear_top(&mut world, 3);
        assert_eq!(removed, vec![top, high, mid]);
        assert!(world.body(low).is_some());
        assert_eq!(world.orb_count(), 1);
    }

    #[test]
    fn test_clear_top_with_fewer_orbs() {
        let mut world = world();
        world.spawn_circle(Vec2::new(100.0, 600.0), 15.0, BodyTag::Orb(1));
        assert_eq!(clear_top(&mut world, 3).len(), 1);
        assert_eq!(world.orb_count(), 0);
        assert_eq!(world.body_count(), 3);
    }
}
