//! Cache key construction.
//!
//! Keys are `namespace:method:<json array of params>`, so identical calls map to
//! the same entry and every entry of a module shares the namespace prefix.

use std::time::Duration;

use serde_json::Value;

/// Cache namespaces, one per module.
pub mod namespaces {
    pub const PRODUCERS: &str = "producers";
    pub const FARMS: &str = "farms";
    pub const CROPS: &str = "crops";
    pub const HARVESTS: &str = "harvests";
    pub const FARM_CROPS: &str = "farm-crops";
    pub const DASHBOARD: &str = "dashboard";

    pub const ALL: [&str; 6] = [PRODUCERS, FARMS, CROPS, HARVESTS, FARM_CROPS, DASHBOARD];
}

const DEFAULT_TTL_SECS: u64 = 5;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub id: String,
    pub ttl: Duration,
}

impl CacheKey {
    pub fn ttl_millis(&self) -> u64 {
        u64::try_from(self.ttl.as_millis()).unwrap_or(u64::MAX)
    }
}

/// Build the key for `method` of `namespace` called with `params`.
///
/// A `ttl_secs` of zero falls back to five seconds.
pub fn create_cache_key(namespace: &str, ttl_secs: u64, method: &str, params: &[Value]) -> CacheKey {
    let params = Value::Array(params.to_vec());
    let ttl_secs = if ttl_secs == 0 {
        DEFAULT_TTL_SECS
    } else {
        ttl_secs
    };
    CacheKey {
        id: format!("{namespace}:{method}:{params}"),
        ttl: Duration::from_secs(ttl_secs),
    }
}
