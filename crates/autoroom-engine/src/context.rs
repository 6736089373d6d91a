//! State shared by the router, provisioner, reclaimer, and sweeper.

use std::sync::Arc;

use autoroom_common::{EngineEvent, EventBus};

use crate::config::EngineConfig;
use crate::directory::Directory;
use crate::platform::{Gateway, VoicePlatform};
use crate::policy::PolicyProvider;

pub(crate) struct EngineContext {
    pub(crate) directory: Directory,
    pub(crate) gateway: Gateway,
    pub(crate) policies: Arc<dyn PolicyProvider>,
    pub(crate) config: EngineConfig,
    events: EventBus,
}

impl EngineContext {
    pub(crate) fn new(
        platform: Arc<dyn VoicePlatform>,
        policies: Arc<dyn PolicyProvider>,
        config: EngineConfig,
    ) -> Self {
        Self {
            directory: Directory::new(),
            gateway: Gateway::new(platform, config.platform_timeout),
            policies,
            events: EventBus::new(config.event_buffer.max(1)),
            config,
        }
    }

    pub(crate) fn publish(&self, event: EngineEvent) {
        self.events.publish(event);
    }

    pub(crate) fn events(&self) -> &EventBus {
        &self.events
    }
}
