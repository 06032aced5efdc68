//! Physics collaborator contract
//!
//! The rules layer never owns body memory. It issues spawn/remove/impulse
//! commands against a [`PhysicsWorld`] and reads positions back. Contact-start
//! events arrive once per tick as a batch of [`ContactPair`]s.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::catalog::TierLevel;

/// Opaque body id assigned by the physics world.
/// Not stable across world teardown/recreation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BodyHandle(pub u64);

/// What a body is, as far as the rules layer cares
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BodyTag {
    /// A live orb of the given tier
    Orb(TierLevel),
    /// Static boundary (floor, side walls)
    Wall,
}

impl BodyTag {
    /// Tier carried by an orb tag
    #[inline]
    pub fn tier(&self) -> Option<TierLevel> {
        match self {
            BodyTag::Orb(level) => Some(*level),
            BodyTag::Wall => None,
        }
    }

    #[inline]
    pub fn is_orb(&self) -> bool {
        matches!(self, BodyTag::Orb(_))
    }
}

/// Read-only view of a body
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BodyInfo {
    pub handle: BodyHandle,
    pub position: Vec2,
    pub velocity: Vec2,
    pub tag: BodyTag,
    pub mass: f32,
    pub is_static: bool,
}

impl BodyInfo {
    #[inline]
    pub fn speed(&self) -> f32 {
        self.velocity.length()
    }
}

/// Two bodies that started touching this tick
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ContactPair {
    pub a: BodyHandle,
    pub b: BodyHandle,
}

impl ContactPair {
    pub fn new(a: BodyHandle, b: BodyHandle) -> Self {
        Self { a, b }
    }
}

/// Operations the engine needs from a rigid-body simulation.
///
/// Implementations must tolerate stale handles: removing or touching a
/// body that no longer exists is a no-op.
pub trait PhysicsWorld {
    /// Insert a dynamic circle at rest
    fn spawn_circle(&mut self, position: Vec2, radius: f32, tag: BodyTag) -> BodyHandle;

    /// Remove a body. Returns false if it was already gone.
    fn remove_body(&mut self, handle: BodyHandle) -> bool;

    /// Apply an instantaneous impulse (mass * delta-v) at the body center
    fn apply_impulse(&mut self, handle: BodyHandle, impulse: Vec2);

    /// Overwrite a body's linear velocity
    fn set_velocity(&mut self, handle: BodyHandle, velocity: Vec2);

    /// Bodies whose shape contains `point`, topmost-inserted last
    fn query_point(&self, point: Vec2) -> Vec<BodyHandle>;

    /// Every body, static ones included
    fn all_bodies(&self) -> Vec<BodyInfo>;

    /// Look up a single body
    fn body(&self, handle: BodyHandle) -> Option<BodyInfo>;

    /// Live orbs only
    fn orbs(&self) -> Vec<BodyInfo> {
        self.all_bodies()
            .into_iter()
            .filter(|b| b.tag.is_orb())
            .collect()
    }
}
