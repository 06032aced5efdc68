//! Merge resolution
//!
//! Turns a tick's batch of contact-start events into world mutations:
//! two touching orbs of the same tier become one orb of the next tier,
//! at rest, at their midpoint.

use std::collections::HashSet;

use glam::Vec2;

use super::physics::{BodyHandle, BodyTag, ContactPair, PhysicsWorld};
use crate::catalog::{self, TierLevel};
use crate::midpoint;

/// A merge that happened this tick
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MergeOutcome {
    /// The two bodies removed
    pub consumed: [BodyHandle; 2],
    /// The body inserted
    pub result: BodyHandle,
    /// Tier of the result orb
    pub tier: TierLevel,
    pub position: Vec2,
    /// Points earned (keyed on the result tier)
    pub points: u32,
}

/// Resolve one tick's contacts against the world.
///
/// Each body takes part in at most one merge per batch. Contacts that
/// reference bodies already gone (batched delivery races) are ignored.
pub fn resolve_contacts<W: PhysicsWorld + ?Sized>(
    world: &mut W,
    contacts: &[ContactPair],
) -> Vec<MergeOutcome> {
    let mut consumed: HashSet<BodyHandle> = HashSet::new();
    let mut outcomes = Vec::new();

    for contact in contacts {
        if contact.a == contact.b
            || consumed.contains(&contact.a)
            || consumed.contains(&contact.b)
        {
            continue;
        }

        let (Some(a), Some(b)) = (world.body(contact.a), world.body(contact.b)) else {
            log::debug!("Ignoring contact with removed body {:?}", contact);
            continue;
        };

        let (BodyTag::Orb(tier_a), BodyTag::Orb(tier_b)) = (a.tag, b.tag) else {
            continue;
        };
        if tier_a != tier_b {
            continue;
        }
        // Top tier (or a corrupt tag) has no successor: plain collision
        let Some(next) = catalog::successor(tier_a) else {
            continue;
        };

        let position = midpoint(a.position, b.position);
        consumed.insert(a.handle);
        consumed.insert(b.handle);
        world.remove_body(a.handle);
        world.remove_body(b.handle);
        let result = world.spawn_circle(position, next.radius, BodyTag::Orb(next.level));

        log::debug!(
            "Merged {:?} + {:?} -> tier {} at ({:.1}, {:.1})",
            a.handle,
            b.handle,
            next.level,
            position.x,
            position.y
        );

        outcomes.push(MergeOutcome {
            consumed: [a.handle, b.handle],
            result,
            tier: next.level,
            position,
            points: next.score,
        });
    }

    outcomes
}
