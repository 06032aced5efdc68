//! Orb tier catalog
//!
//! Static, ordered table of every orb tier. Level 1 is the smallest orb;
//! two orbs of level N merge into one of level N + 1 until [`MAX_TIER`].

/// Tier level (1-based)
pub type TierLevel = u8;

/// Highest tier; orbs of this tier never merge further
pub const MAX_TIER: TierLevel = 11;

/// A single orb tier
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tier {
    pub level: TierLevel,
    /// Display name
    pub name: &'static str,
    /// Solid colour (0xRRGGBB) for renderers
    pub color: u32,
    /// Physics radius in board pixels
    pub radius: f32,
    /// Points awarded when a merge produces this tier
    pub score: u32,
}

/// The reference tier table
pub const ORB_TIERS: [Tier; MAX_TIER as usize] = [
    Tier { level: 1, name: "Tiny Spark", color: 0xa21caf, radius: 15.0, score: 0 },
    Tier { level: 2, name: "Red Dwarf", color: 0xef4444, radius: 25.0, score: 10 },
    Tier { level: 3, name: "Orange Star", color: 0xf97316, radius: 35.0, score: 20 },
    Tier { level: 4, name: "Yellow Sun", color: 0xeab308, radius: 45.0, score: 30 },
    Tier { level: 5, name: "Green Planet", color: 0x22c55e, radius: 60.0, score: 40 },
    Tier { level: 6, name: "Blue Giant", color: 0x3b82f6, radius: 75.0, score: 50 },
    Tier { level: 7, name: "Indigo Nebula", color: 0x6366f1, radius: 90.0, score: 60 },
    Tier { level: 8, name: "Violet Void", color: 0xa855f7, radius: 105.0, score: 70 },
    Tier { level: 9, name: "Cosmic Core", color: 0xec4899, radius: 120.0, score: 80 },
    Tier { level: 10, name: "Galactic Swirl", color: 0x14b8a6, radius: 135.0, score: 90 },
    Tier { level: 11, name: "Vinu Verse", color: 0xf8fafc, radius: 150.0, score: 100 },
];

/// Look up a tier by level. `None` outside `[1, MAX_TIER]`.
pub fn tier_of(level: TierLevel) -> Option<&'static Tier> {
    if level == 0 {
        return None;
    }
    ORB_TIERS.get(level as usize - 1)
}

/// Points for producing `level` by a merge (0 for unknown levels)
pub fn score_for(level: TierLevel) -> u32 {
    tier_of(level).map(|t| t.score).unwrap_or(0)
}

/// Whether `level` names a real tier
#[inline]
pub fn is_valid(level: TierLevel) -> bool {
    tier_of(level).is_some()
}

/// The tier two orbs of `level` merge into. `None` at the top tier
/// (terminal, not an error) and for unknown levels.
pub fn successor(level: TierLevel) -> Option<&'static Tier> {
    if !is_valid(level) || level >= MAX_TIER {
        return None;
    }
    tier_of(level.checked_add(1)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_is_ordered() {
        for (i, tier) in ORB_TIERS.iter().enumerate() {
            assert_eq!(tier.level as usize, i + 1);
        }
        for pair in ORB_TIERS.windows(2) {
            assert!(pair[1].radius > pair[0].radius);
            assert!(pair[1].score > pair[0].score);
        }
    }

    #[test]
    fn test_tier_of_bounds() {
        assert!(tier_of(0).is_none());
        assert_eq!(tier_of(1).map(|t| t.radius), Some(15.0));
        assert_eq!(tier_of(MAX_TIER).map(|t| t.name), Some("Vinu Verse"));
        assert!(tier_of(MAX_TIER + 1).is_none());
    }

    #[test]
    fn test_score_for() {
        assert_eq!(score_for(2), 10);
        assert_eq!(score_for(11), 100);
        assert_eq!(score_for(42), 0);
    }

    #[test]
    fn test_successor_stops_at_max() {
        assert_eq!(successor(1).map(|t| t.level), Some(2));
        assert_eq!(successor(MAX_TIER - 1).map(|t| t.level), Some(MAX_TIER));
        assert!(successor(MAX_TIER).is_none());
        assert!(successor(0).is_none());
    }
}
