/*
 * Copyright (c) 2024. Govcraft
 *
 * Licensed under either of
 *   * Apache License, Version 2.0 (the "License");
 *     you may not use this file except in compliance with the License.
 *     You may obtain a copy of the License at http://www.apache.org/licenses/LICENSE-2.0
 *   * MIT license: http://opensource.org/licenses/MIT
 *
 * Unless required by applicable law or agreed to in writing, software
 * distributed under the License is distributed on an "AS IS" BASIS,
 * WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
 * See the applicable License for the specific language governing permissions and
 * limitations under that License.
 */

use std::time::Duration;

use lazy_static::lazy_static;
use serde::{Deserialize, Serialize};

use crate::common::Format;

/// Configuration for Transit nodes.
///
/// Loaded once from `config.toml` in the XDG `transit` config directory. Every
/// section and every field falls back to its default when absent, so a file
/// only needs to mention what it overrides.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransitConfig {
    /// Channel capacities
    pub limits: LimitsConfig,
    /// How agent state is serialised for same-node test moves
    pub codec: CodecConfig,
    /// Shutdown timing
    pub timeouts: TimeoutConfig,
    /// Behavioral configuration switches
    pub behavior: BehaviorConfig,
}

/// Limits and capacity configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LimitsConfig {
    /// Capacity of each node's inbound envelope channel
    pub node_inbox_capacity: usize,
    /// Capacity of each control store subscription channel
    pub control_subscriber_capacity: usize,
}

/// State serialisation configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CodecConfig {
    /// Format used by the test-dispatch round trip
    pub state_format: Format,
}

/// Timeout-related configuration values
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// How long a node waits for in-flight handlers during shutdown, in milliseconds
    pub node_shutdown_timeout_ms: u64,
}

/// Behavioral configuration switches
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BehaviorConfig {
    /// Log the full captured state of every moved agent at debug level
    pub log_captured_state: bool,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            node_inbox_capacity: 255,
            control_subscriber_capacity: 255,
        }
    }
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            node_shutdown_timeout_ms: 10_000,
        }
    }
}

impl TransitConfig {
    /// Convert the node shutdown timeout to Duration
    pub const fn node_shutdown_timeout(&self) -> Duration {
        Duration::from_millis(self.timeouts.node_shutdown_timeout_ms)
    }

    /// Parses a configuration document.
    pub fn from_toml_str(document: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(document)
    }

    /// Load configuration from XDG-compliant locations
    ///
    /// Looks for `transit/config.toml` under `$XDG_CONFIG_HOME` and then the
    /// XDG config search path. If no configuration file is found, returns the
    /// default configuration. If a configuration file exists but is malformed,
    /// logs an error and uses defaults.
    pub fn load() -> Self {
        use tracing::{error, info};

        let xdg_dirs = match xdg::BaseDirectories::with_prefix("transit") {
            Ok(dirs) => dirs,
            Err(e) => {
                error!("Failed to initialize XDG directories: {}", e);
                return Self::default();
            }
        };

        let Some(path) = xdg_dirs.find_config_file("config.toml") else {
            info!("No configuration file found, using defaults");
            return Self::default();
        };

        info!("Loading configuration from: {}", path.display());
        match std::fs::read_to_string(&path) {
            Ok(config_str) => match Self::from_toml_str(&config_str) {
                Ok(config) => {
                    info!("Successfully loaded configuration");
                    config
                }
                Err(e) => {
                    error!("Failed to parse configuration file {}: {}", path.display(), e);
                    Self::default()
                }
            },
            Err(e) => {
                error!("Failed to read configuration file {}: {}", path.display(), e);
                Self::default()
            }
        }
    }
}

lazy_static! {
    /// Global configuration instance loaded from XDG-compliant locations
    pub static ref CONFIG: TransitConfig = TransitConfig::load();
}
