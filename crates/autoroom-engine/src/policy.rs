//! Tenant policy lookup.

use std::collections::HashMap;

use async_trait::async_trait;
use autoroom_common::{TenantId, TenantPolicy};
use tokio::sync::RwLock;

/// Read-only access to per-tenant settings owned by the host application.
#[async_trait]
pub trait PolicyProvider: Send + Sync {
    /// `None` means the tenant has not configured rooms; its events are ignored.
    async fn tenant_policy(&self, tenant_id: TenantId) -> Option<TenantPolicy>;
}

/// In-process policy table, typically filled from the config file.
#[derive(Default)]
pub struct StaticPolicyProvider {
    policies: RwLock<HashMap<TenantId, TenantPolicy>>,
}

impl StaticPolicyProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_policies(policies: impl IntoIterator<Item = (TenantId, TenantPolicy)>) -> Self {
        Self {
            policies: RwLock::new(policies.into_iter().collect()),
        }
    }

    /// Insert or replace a tenant's policy. Returns the previous one.
    pub async fn set_policy(&self, tenant_id: TenantId, policy: TenantPolicy) -> Option<TenantPolicy> {
        self.policies.write().await.insert(tenant_id, policy)
    }

    pub async fn remove_policy(&self, tenant_id: TenantId) -> Option<TenantPolicy> {
        self.policies.write().await.remove(&tenant_id)
    }
}

#[async_trait]
impl PolicyProvider for StaticPolicyProvider {
    async fn tenant_policy(&self, tenant_id: TenantId) -> Option<TenantPolicy> {
        self.policies.read().await.get(&tenant_id).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use autoroom_common::ResourceId;

    #[tokio::test]
    async fn lookup_returns_configured_policy() {
        let provider = StaticPolicyProvider::from_policies([(
            TenantId::new(1),
            TenantPolicy::new(ResourceId::new(10)),
        )]);

        let policy = provider.tenant_policy(TenantId::new(1)).await.unwrap();
        assert_eq!(policy.creator_resource_id, ResourceId::new(10));
        assert!(provider.tenant_policy(TenantId::new(2)).await.is_none());
    }

    #[tokio::test]
    async fn set_and_remove_policy() {
        let provider = StaticPolicyProvider::new();
        let previous = provider
            .set_policy(TenantId::new(1), TenantPolicy::new(ResourceId::new(10)))
            .await;
        assert!(previous.is_none());

        let previous = provider
            .set_policy(TenantId::new(1), TenantPolicy::new(ResourceId::new(11)))
            .await;
        assert_eq!(previous.unwrap().creator_resource_id, ResourceId::new(10));

        provider.remove_policy(TenantId::new(1)).await;
        assert!(provider.tenant_policy(TenantId::new(1)).await.is_none());
    }
}
