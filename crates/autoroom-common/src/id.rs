use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Short hex id used to tie together the log lines of a single transition.
pub fn new_correlation_id() -> String {
    let uuid = uuid::Uuid::new_v4();
    let bytes = uuid.as_bytes();
    format!(
        "{:02x}{:02x}{:02x}{:02x}",
        bytes[0], bytes[1], bytes[2], bytes[3]
    )
}

/// Platform identifiers are opaque 64-bit snowflakes. Each kind gets its own
/// newtype so a member id can never be passed where a resource id is expected.
macro_rules! snowflake_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(u64);

        impl $name {
            pub const fn new(raw: u64) -> Self {
                Self(raw)
            }

            pub const fn get(self) -> u64 {
                self.0
            }
        }

        impl From<u64> for $name {
            fn from(raw: u64) -> Self {
                Self(raw)
            }
        }

        impl FromStr for $name {
            type Err = std::num::ParseIntError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                s.trim().parse().map(Self)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

snowflake_id!(
    /// An isolated community scope (a guild).
    TenantId
);
snowflake_id!(
    /// A voice resource on the platform (creator or managed room).
    ResourceId
);
snowflake_id!(MemberId);
snowflake_id!(
    /// A grouping container (category) that resources are created under.
    GroupId
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn correlation_id_length() {
        let cid = new_correlation_id();
        assert_eq!(cid.len(), 8);
    }

    #[test]
    fn correlation_id_is_hex() {
        let cid = new_correlation_id();
        assert!(cid.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn correlation_id_is_unique() {
        let a = new_correlation_id();
        let b = new_correlation_id();
        assert_ne!(a, b);
    }

    #[test]
    fn ids_parse_from_strings() {
        let tenant: TenantId = "123456789012345678".parse().unwrap();
        assert_eq!(tenant.get(), 123_456_789_012_345_678);

        let resource: ResourceId = " 42 ".parse().unwrap();
        assert_eq!(resource, ResourceId::new(42));

        assert!("not-a-number".parse::<MemberId>().is_err());
    }

    #[test]
    fn ids_display_as_raw_number() {
        assert_eq!(GroupId::new(99).to_string(), "99");
        assert_eq!(MemberId::from(5).to_string(), "5");
    }

    #[test]
    fn ids_serialize_transparently() {
        let json = serde_json::to_string(&ResourceId::new(17)).unwrap();
        assert_eq!(json, "17");

        let parsed: TenantId = serde_json::from_str("3").unwrap();
        assert_eq!(parsed, TenantId::new(3));
    }

    #[test]
    fn ids_hash_by_value() {
        use std::collections::HashSet;
        let mut set = HashSet::new();
        set.insert(ResourceId::new(1));
        set.insert(ResourceId::new(1));
        set.insert(ResourceId::new(2));
        assert_eq!(set.len(), 2);
    }
}
