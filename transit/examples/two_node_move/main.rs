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

use std::sync::Arc;
use std::time::Duration;

use transit::prelude::*;

// state an agent takes along when it moves
#[mobility_state]
struct Odometer {
    kilometres: u64,
}

// prints what the origin node sees happening to its agents
#[derive(Debug)]
struct Printer;

impl MobilityObserver for Printer {
    fn on_arrival(&self, agent: &MessageAddress, ticket: &MoveTicket) {
        println!("{agent} arrived: {ticket}");
    }

    fn on_failure(&self, agent: &MessageAddress, ticket: &MoveTicket, error: &MobilityError) {
        println!("{agent} stayed home after {ticket}: {error}");
    }
}

fn launch(name: &str, blackboard: &Blackboard, switchboard: &Switchboard) -> MobilityNode {
    MobilityNode::builder(
        name,
        NodeServices::new(
            Arc::new(blackboard.view(name)),
            Arc::new(switchboard.clone()),
            Arc::new(LocalContainer::new(name)),
        ),
    )
    .observer(Arc::new(Printer))
    .launch(switchboard.connect(name))
}

async fn completed(record: &ControlRecord) -> ControlStatus {
    loop {
        if let Some(status) = record.response() {
            return status;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    // nodes share one control store and one transport in this process
    let blackboard = Blackboard::new();
    let switchboard = Switchboard::new();
    let lisbon = launch("lisbon", &blackboard, &switchboard);
    let oslo = launch("oslo", &blackboard, &switchboard);

    let state = AgentState::capture(&Odometer { kilometres: 2_750 })?;
    lisbon
        .spawn_agent(AgentDescription::new("courier"), Some(state))
        .await?;

    let courier = lisbon.mobility_service("courier");
    let record = courier.move_to("oslo").await?;
    println!("move finished with {}", completed(&record).await);

    let arrived = oslo
        .agent(&MessageAddress::new("courier"))
        .and_then(|agent| agent.state_provider().map(|p| p.capture_state()))
        .transpose()?
        .map(|state| state.restore::<Odometer>())
        .transpose()?;
    println!("courier in oslo carries {arrived:?}");

    // a second move to a node that does not exist fails and leaves the courier in oslo
    let record = oslo.mobility_service("courier").move_to("reykjavik").await?;
    println!("second move finished with {}", completed(&record).await);

    lisbon.shutdown().await?;
    oslo.shutdown().await?;
    Ok(())
}
