//! Ephemeral voice-room provisioning engine.
//!
//! When a member joins a tenant's creator resource, a personal room is
//! created for them and they are moved into it. Rooms are tracked in a
//! [`Directory`] and deleted as soon as they are observed empty. A periodic
//! reconciliation sweep converges the directory with live platform state, so
//! missed or reordered membership notifications never leak a room.
//!
//! The engine talks to the outside world through two seams:
//! [`VoicePlatform`] for the hosting platform's gateway and
//! [`PolicyProvider`] for per-tenant settings.

pub mod config;
pub mod directory;
pub mod manager;
pub mod memory;
pub mod platform;
pub mod policy;
pub mod provisioner;
pub mod reclaimer;
pub mod reset;
pub mod router;
pub mod sweeper;

mod context;

pub use config::{EngineConfig, PlatformLimits, MIN_SWEEP_INTERVAL};
pub use directory::{Directory, ManagedResource};
pub use manager::{AutoRoomManager, EngineHandle};
pub use memory::MemoryPlatform;
pub use platform::{AccessRule, AccessTarget, Permission, ResourceSpec, VoicePlatform};
pub use policy::{PolicyProvider, StaticPolicyProvider};
pub use reclaimer::ReclaimOutcome;
pub use reset::ResetReport;
pub use router::{Dispatch, VoiceTransition};
pub use sweeper::SweepReport;
