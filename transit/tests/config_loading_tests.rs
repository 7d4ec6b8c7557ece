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

#![allow(dead_code, unused_doc_comments)]

use std::fs;
use std::time::Duration;

use tempfile::TempDir;
use transit::common::{LimitsConfig, TransitConfig};
use transit::prelude::*;
use transit_test::prelude::*;

use crate::setup::initialize_tracing;

mod setup;

/// Tests configuration loading from the XDG config directory.
///
/// The cases share one test because they all steer `XDG_CONFIG_HOME`.
///
/// **Scenario:**
/// 1. Load with an empty config home.
/// 2. Load with a `transit/config.toml` overriding some values.
/// 3. Load with a malformed `transit/config.toml`.
///
/// **Verification:**
/// - Missing and malformed files yield the defaults.
/// - A partial file overrides what it names and keeps defaults elsewhere.
#[transit_test]
async fn test_configuration_loading_from_xdg_home() -> anyhow::Result<()> {
    initialize_tracing();
    let temp_dir = TempDir::new()?;
    std::env::set_var("XDG_CONFIG_HOME", temp_dir.path());

    assert_eq!(TransitConfig::load(), TransitConfig::default());

    let config_dir = temp_dir.path().join("transit");
    fs::create_dir_all(&config_dir)?;
    fs::write(
        config_dir.join("config.toml"),
        r#"
        [timeouts]
        node_shutdown_timeout_ms = 2500

        [limits]
        node_inbox_capacity = 64

        [codec]
        state_format = "messagepack"
        "#,
    )?;
    let config = TransitConfig::load();
    assert_eq!(config.node_shutdown_timeout(), Duration::from_millis(2500));
    assert_eq!(config.limits.node_inbox_capacity, 64);
    assert_eq!(
        config.limits.control_subscriber_capacity,
        LimitsConfig::default().control_subscriber_capacity
    );
    assert_eq!(config.codec.state_format, Format::MessagePack);
    assert!(!config.behavior.log_captured_state);

    fs::write(config_dir.join("config.toml"), "[limits\nnode_inbox_capacity = ")?;
    assert_eq!(TransitConfig::load(), TransitConfig::default());

    temp_dir.close()?;
    Ok(())
}

/// Tests that the defaults match the documented values.
#[transit_test]
async fn test_default_configuration_values() -> anyhow::Result<()> {
    let config = TransitConfig::default();
    assert_eq!(config.limits.node_inbox_capacity, 255);
    assert_eq!(config.limits.control_subscriber_capacity, 255);
    assert_eq!(config.node_shutdown_timeout(), Duration::from_secs(10));
    assert_eq!(config.codec.state_format, Format::Json);
    Ok(())
}
