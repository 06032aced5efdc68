//! Power-up charge ledger
//!
//! Economy state owned by the driver and passed into the engine explicitly.
//! Free charges are always spent before purchased ones.

use serde::{Deserialize, Serialize};

/// Charges handed out by the daily allowance (per kind)
pub const DAILY_FREE_CHARGES: u32 = 1;
/// Shakes in one shop pack
pub const SHAKE_PACK_SIZE: u32 = 5;
/// Strikes in one shop pack
pub const STRIKE_PACK_SIZE: u32 = 2;

/// Charge-gated power-ups
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PowerUpKind {
    /// Destabilize every loose body
    Shake,
    /// Remove a single targeted orb
    Strike,
}

impl PowerUpKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            PowerUpKind::Shake => "shake",
            PowerUpKind::Strike => "strike",
        }
    }

    /// Charges granted by one shop pack of this kind
    pub fn pack_size(&self) -> u32 {
        match self {
            PowerUpKind::Shake => SHAKE_PACK_SIZE,
            PowerUpKind::Strike => STRIKE_PACK_SIZE,
        }
    }
}

/// Free and purchased charge counts
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChargeLedger {
    #[serde(default)]
    pub free_shakes: u32,
    #[serde(default)]
    pub free_strikes: u32,
    #[serde(default)]
    pub purchased_shakes: u32,
    #[serde(default)]
    pub purchased_strikes: u32,
}

impl ChargeLedger {
    /// Empty ledger
    pub fn new() -> Self {
        Self::default()
    }

    /// Fresh ledger with the daily free allowance
    pub fn daily_allowance() -> Self {
        Self {
            free_shakes: DAILY_FREE_CHARGES,
            free_strikes: DAILY_FREE_CHARGES,
            ..Self::default()
        }
    }

    fn counts_mut(&mut self, kind: PowerUpKind) -> (&mut u32, &mut u32) {
        match kind {
            PowerUpKind::Shake => (&mut self.free_shakes, &mut self.purchased_shakes),
            PowerUpKind::Strike => (&mut self.free_strikes, &mut self.purchased_strikes),
        }
    }

    /// Total charges (free + purchased) of a kind
    pub fn available(&self, kind: PowerUpKind) -> u32 {
        match kind {
            PowerUpKind::Shake => self.free_shakes.saturating_add(self.purchased_shakes),
            PowerUpKind::Strike => self.free_strikes.saturating_add(self.purchased_strikes),
        }
    }

    #[inline]
    pub fn has_charge(&self, kind: PowerUpKind) -> bool {
        self.available(kind) > 0
    }

    /// Spend one charge, free pool first.
    /// Returns false (and changes nothing) when both pools are empty.
    pub fn try_consume(&mut self, kind: PowerUpKind) -> bool {
        let (free, purchased) = self.counts_mut(kind);
        if *free > 0 {
            *free -= 1;
        } else if *purchased > 0 {
            *purchased -= 1;
        } else {
            log::debug!("No {} charges left", kind.as_str());
            return false;
        }
        true
    }

    /// Add purchased charges
    pub fn grant(&mut self, kind: PowerUpKind, amount: u32) {
        let (_, purchased) = self.counts_mut(kind);
        *purchased = purchased.saturating_add(amount);
        log::info!("Granted {} {} charge(s)", amount, kind.as_str());
    }

    /// Add one shop pack of purchased charges
    pub fn grant_pack(&mut self, kind: PowerUpKind) {
        self.grant(kind, kind.pack_size());
    }
}
