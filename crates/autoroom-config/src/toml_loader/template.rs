//! Default TOML config template with inline documentation comments.

use crate::schema::CONFIG_SCHEMA_VERSION;

pub(crate) fn default_config_toml() -> String {
    format!(
        "# AutoRoom Configuration\n# Schema version {CONFIG_SCHEMA_VERSION}\n{BODY}"
    )
}

const BODY: &str = r##"# Only override what you want to change -- missing fields use defaults.

[engine]
# sweep_interval_secs = 10     # 1-3600, reconciliation period
# platform_timeout_secs = 10   # 1-120, per platform call
# event_buffer = 256           # 1-65536

[limits]
# max_name_len = 100           # 1-100
# max_capacity = 99            # 0-99, 0 = unlimited
# min_bitrate = 8000
# max_bitrate = 96000

[logging]
# level = "info"               # trace, debug, info, warn, error

# One table per tenant. Ids are strings.
#
# [tenants."123456789012345678"]
# creator_resource_id = "234567890123456789"
# parent_group_id = "345678901234567890"   # defaults to the creator's group
# name_template = "{user}'s Room"          # {user}, {count}, {game}
# capacity = 0                             # 0 = unlimited
# bitrate = 64000
# is_private = false
# cleanup_grace_minutes = 5                # accepted but unused, rooms go when empty
"##;
