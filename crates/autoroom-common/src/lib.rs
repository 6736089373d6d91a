pub mod errors;
pub mod events;
pub mod id;
pub mod policy;

pub use errors::{ConfigError, EngineError, PlatformError};
pub use events::{EngineEvent, EventBus, ReclaimReason};
pub use id::{new_correlation_id, GroupId, MemberId, ResourceId, TenantId};
pub use policy::{TenantPolicy, DEFAULT_NAME_TEMPLATE};

pub type Result<T> = std::result::Result<T, EngineError>;
