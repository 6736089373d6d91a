//! Validation for the `[tenants]` table.

use autoroom_common::TenantId;

use crate::schema::AutoRoomConfig;

pub(crate) fn validate_tenants(errors: &mut Vec<String>, config: &AutoRoomConfig) {
    for (key, tenant) in &config.tenants {
        if key.parse::<TenantId>().is_err() {
            errors.push(format!("tenants.{key}: tenant id is not numeric"));
        }
        if let Err(e) = tenant.to_policy() {
            errors.push(format!("tenants.{key}: {e}"));
        }
        if tenant.name_template.trim().is_empty() {
            errors.push(format!("tenants.{key}.name_template must not be empty"));
        }
    }
}
