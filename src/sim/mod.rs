//! Session simulation module
//!
//! All gameplay rules live here. The physics engine is a collaborator behind
//! [`PhysicsWorld`]; the session only sees its contact events and body queries.
//! - Fixed timestep only
//! - Seeded RNG only
//! - Player input is queued and applied at tick boundaries
//! - No rendering or platform dependencies

pub mod danger;
pub mod merge;
pub mod physics;
pub mod powerup;
pub mod sandbox;
pub mod snapshot;
pub mod state;
pub mod tick;

pub use danger::{DangerMonitor, DangerStatus};
pub use merge::{MergeOutcome, resolve_contacts};
pub use physics::{BodyHandle, BodyInfo, BodyTag, ContactPair, PhysicsWorld};
pub use sandbox::SandboxWorld;
pub use snapshot::{BoardSnapshot, OrbRecord};
pub use state::{Command, GameEvent, GamePhase, SessionState};
pub use tick::tick;
