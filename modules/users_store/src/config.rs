use serde::{Deserialize, Serialize};

/// Configuration for the users_store module
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct UsersStoreConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Records requested by the initial bulk fetch.
    #[serde(default = "default_fetch_limit")]
    pub fetch_limit: u32,
    /// Per-request timeout; 0 leaves remote calls unbounded.
    #[serde(default)]
    pub request_timeout_ms: u64,
}

impl Default for UsersStoreConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            fetch_limit: default_fetch_limit(),
            request_timeout_ms: 0,
        }
    }
}

fn default_base_url() -> String {
    "https://dummyjson.com".to_string()
}

fn default_fetch_limit() -> u32 {
    100
}
