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

use std::sync::{Arc, Once};
use std::time::Duration;

use tracing::Level;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::{EnvFilter, FmtSubscriber};
use transit::prelude::*;

// Declare the submodules.
pub mod agents;
pub mod support;

// Ensures tracing initialization happens only once across all tests.
static INIT: Once = Once::new();

/// Initializes the global tracing subscriber for tests.
///
/// Everything is written to `logs/transit_tests.txt`; set `RUST_LOG` style
/// directives below to narrow it down while debugging.
pub fn initialize_tracing() {
    INIT.call_once(|| {
        std::fs::create_dir_all("logs").expect("could not create logs dir");

        let file_appender = RollingFileAppender::new(Rotation::NEVER, "logs", "transit_tests.txt");
        let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
        // Leak the guard so the non-blocking writer is not dropped before process exit
        Box::leak(Box::new(guard));

        let filter = EnvFilter::new("trace")
            .add_directive("transit::protocol=trace".parse().unwrap())
            .add_directive("transit::node=trace".parse().unwrap())
            .add_directive("transit::control::blackboard=debug".parse().unwrap())
            .add_directive("move_tests=trace".parse().unwrap())
            .add_directive("protocol_tests=trace".parse().unwrap())
            .add_directive("tokio=info".parse().unwrap())
            .add_directive(tracing_subscriber::filter::LevelFilter::TRACE.into());

        let subscriber = FmtSubscriber::builder()
            .with_span_events(FmtSpan::NONE)
            .with_max_level(Level::TRACE)
            .compact()
            .with_line_number(true)
            .without_time()
            .with_target(true)
            .with_env_filter(filter)
            .with_writer(non_blocking)
            .finish();

        tracing::subscriber::set_global_default(subscriber)
            .expect("setting default subscriber failed");
    });
}

/// Connects a node called `name` to the shared blackboard and switchboard
/// and launches it with `container` and `observer`.
pub fn launch_node(
    name: &str,
    blackboard: &Blackboard,
    switchboard: &Switchboard,
    container: LocalContainer,
    observer: Arc<agents::RecordingObserver>,
) -> MobilityNode {
    let inbox = switchboard.connect(name);
    MobilityNode::builder(
        name,
        NodeServices::new(
            Arc::new(blackboard.view(name)),
            Arc::new(switchboard.clone()),
            Arc::new(container),
        ),
    )
    .observer(observer)
    .launch(inbox)
}

/// A node with a default container.
pub fn spawn_node(
    name: &str,
    blackboard: &Blackboard,
    switchboard: &Switchboard,
    observer: Arc<agents::RecordingObserver>,
) -> MobilityNode {
    launch_node(name, blackboard, switchboard, LocalContainer::new(name), observer)
}

/// Waits until `record` carries a status.
pub async fn await_status(record: &ControlRecord) -> anyhow::Result<ControlStatus> {
    tokio::time::timeout(Duration::from_secs(5), async {
        loop {
            let status = record.status();
            if !status.is_none() {
                return status;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await
    .map_err(|_| anyhow::anyhow!("control record {} never completed", record.uid()))
}

/// Waits until `node` no longer has an action pending for `agent`.
pub async fn await_idle(node: &MobilityNode, agent: &MessageAddress) -> anyhow::Result<()> {
    tokio::time::timeout(Duration::from_secs(5), async {
        while node
            .pending_action(agent)
            .is_some_and(|action| action != PendingAction::None)
        {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await
    .map_err(|_| anyhow::anyhow!("agent {} stayed busy on node {}", agent, node.address()))
}
