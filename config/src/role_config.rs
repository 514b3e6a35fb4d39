use serde::{
    Deserialize,
    Serialize,
};

/// Polling settings for one daemon role.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleConfig {
    #[serde(default)]
    pub enabled: bool,
    /// Timeout hint passed to the daemon, in ms. `0` means unset.
    #[serde(default)]
    pub timeout: u64,
    /// `host` or `host:port` entries.
    #[serde(default)]
    pub endpoints: Vec<String>,
    /// Metric groups to keep. Empty keeps all of them.
    #[serde(default)]
    pub collections: Vec<String>,
}
