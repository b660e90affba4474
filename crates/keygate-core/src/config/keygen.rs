//! Activation key code generation configuration.

use serde::{Deserialize, Serialize};

/// Settings for generated key codes (`PREFIX-YEAR-XXXX-XXXX-XXXX`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KeygenConfig {
    /// Product prefix placed at the front of every code.
    #[serde(default = "default_prefix")]
    pub prefix: String,
    /// Device quota assigned to new keys when the operator does not specify one.
    #[serde(default = "default_max_devices")]
    pub default_max_devices: i64,
}

impl Default for KeygenConfig {
    fn default() -> Self {
        Self {
            prefix: default_prefix(),
            default_max_devices: default_max_devices(),
        }
    }
}

fn default_prefix() -> String {
    "KG".to_string()
}

fn default_max_devices() -> i64 {
    3
}
