//! Board snapshots
//!
//! Captures every live orb (tier, position, velocity) so a board survives
//! physics-world teardown (tab hide, remount, reload). Body handles are
//! intentionally dropped: they are not stable across worlds.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::physics::{BodyTag, PhysicsWorld};
use crate::catalog::{self, TierLevel};

/// One orb in a snapshot
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OrbRecord {
    pub tier: TierLevel,
    pub position: Vec2,
    #[serde(default)]
    pub velocity: Vec2,
}

/// Ordered capture of all live orbs
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BoardSnapshot {
    pub orbs: Vec<OrbRecord>,
}

impl BoardSnapshot {
    /// Capture all orb bodies from a world, in world order
    pub fn capture<W: PhysicsWorld + ?Sized>(world: &W) -> Self {
        let orbs = world
            .all_bodies()
            .into_iter()
            .filter_map(|body| {
                body.tag.tier().map(|tier| OrbRecord {
                    tier,
                    position: body.position,
                    velocity: body.velocity,
                })
            })
            .collect();
        Self { orbs }
    }

    pub fn len(&self) -> usize {
        self.orbs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.orbs.is_empty()
    }

    /// Drop records with unknown tiers or non-finite coordinates.
    /// Returns how many were discarded.
    pub fn sanitize(&mut self) -> usize {
        let before = self.orbs.len();
        self.orbs.retain(|orb| {
            let ok = catalog::is_valid(orb.tier)
                && orb.position.is_finite()
                && orb.velocity.is_finite();
            if !ok {
                log::warn!("Discarding snapshot entry {:?}", orb);
            }
            ok
        });
        before - self.orbs.len()
    }

    /// Repopulate a world from this snapshot.
    ///
    /// Live orbs already in the world are removed first so restoring twice
    /// never duplicates the board. Entries with unknown tiers are skipped.
    /// Returns the number of orbs spawned.
    pub fn restore<W: PhysicsWorld + ?Sized>(&self, world: &mut W) -> usize {
        let cleared = clear_orbs(world);
        if cleared > 0 {
            log::debug!("Cleared {} live orbs before restore", cleared);
        }

        let mut spawned = 0;
        for record in &self.orbs {
            let Some(tier) = catalog::tier_of(record.tier) else {
                log::warn!("Snapshot references unknown tier {}", record.tier);
                continue;
            };
            if !record.position.is_finite() {
                log::warn!("Snapshot entry with invalid position {:?}", record.position);
                continue;
            }
            let handle = world.spawn_circle(record.position, tier.radius, BodyTag::Orb(tier.level));
            if record.velocity.is_finite() && record.velocity != Vec2::ZERO {
                world.set_velocity(handle, record.velocity);
            }
            spawned += 1;
        }

        log::info!("Restored {} orbs from snapshot", spawned);
        spawned
    }
}

/// Remove every orb body from a world. Walls stay. Returns the count removed.
pub fn clear_orbs<W: PhysicsWorld + ?Sized>(world: &mut W) -> usize {
    let mut removed = 0;
    for orb in world.orbs() {
        if world.remove_body(orb.handle) {
            removed += 1;
        }
    }
    removed
}
