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

use std::sync::Arc;

use transit::prelude::*;
use transit_test::prelude::*;

use crate::setup::agents::RecordingObserver;
use crate::setup::{await_status, initialize_tracing, launch_node, spawn_node};

mod setup;

/// Tests that an add request published on one node is carried out by its
/// destination and the outcome is relayed back.
///
/// **Scenario:**
/// 1. Launch `n1` and `n2`.
/// 2. From `n1`, request that `a1` be added on `n2`.
///
/// **Verification:**
/// - The requester's record completes with `CREATED`.
/// - `a1` is registered on `n2` only.
#[transit_test]
async fn test_add_runs_on_destination() -> anyhow::Result<()> {
    initialize_tracing();
    let blackboard = Blackboard::new();
    let switchboard = Switchboard::new();
    let n1 = spawn_node("n1", &blackboard, &switchboard, RecordingObserver::new());
    let n2 = spawn_node("n2", &blackboard, &switchboard, RecordingObserver::new());
    let a1 = MessageAddress::new("a1");

    let ticket = AddTicket::builder()
        .generate_id()
        .agent("a1")
        .destination("n2")
        .build()?;
    let record = n1.request_add(ticket).await;

    let status = await_status(&record).await?;
    assert_eq!(status.code, StatusCode::Created);
    assert!(record.is_source());
    assert_eq!(record.response(), Some(ControlStatus::of(StatusCode::Created)));
    assert!(n2.is_registered(&a1));
    assert!(!n1.is_registered(&a1));
    Ok(())
}

/// Tests that an add without a destination runs on the requesting node.
#[transit_test]
async fn test_add_without_destination_runs_locally() -> anyhow::Result<()> {
    initialize_tracing();
    let blackboard = Blackboard::new();
    let switchboard = Switchboard::new();
    let n1 = spawn_node("n1", &blackboard, &switchboard, RecordingObserver::new());

    let ticket = AddTicket::builder()
        .agent("a1")
        .description(AgentDescription::new("a1").with_argument("warm"))
        .build()?;
    let record = n1.request_add(ticket).await;

    assert_eq!(await_status(&record).await?.code, StatusCode::Created);
    assert!(n1.is_registered(&MessageAddress::new("a1")));
    Ok(())
}

/// Tests that adding an agent that already exists completes with
/// `ALREADY_EXISTS` and leaves the existing agent alone.
#[transit_test]
async fn test_duplicate_add_reports_already_exists() -> anyhow::Result<()> {
    initialize_tracing();
    let blackboard = Blackboard::new();
    let switchboard = Switchboard::new();
    let n1 = spawn_node("n1", &blackboard, &switchboard, RecordingObserver::new());
    let n2 = spawn_node("n2", &blackboard, &switchboard, RecordingObserver::new());
    let a1 = MessageAddress::new("a1");

    let existing = n2.spawn_agent(AgentDescription::new("a1"), None).await?;
    let ticket = AddTicket::builder().agent("a1").destination("n2").build()?;
    let record = n1.request_add(ticket).await;

    let status = await_status(&record).await?;
    assert_eq!(status.code, StatusCode::AlreadyExists);
    assert!(status.failure.is_none());
    let hosted = n2.agent(&a1).expect("a1 still hosted on n2");
    assert!(Arc::ptr_eq(&hosted, &existing));
    Ok(())
}

/// Tests that a failing agent factory completes the add with `FAILURE`.
#[transit_test]
async fn test_failed_add_reports_failure() -> anyhow::Result<()> {
    initialize_tracing();
    let blackboard = Blackboard::new();
    let switchboard = Switchboard::new();
    let broken = LocalContainer::with_factory(
        "n1",
        Arc::new(
            |description: &AgentDescription,
             _state: Option<AgentState>|
             -> Result<Arc<dyn MobileAgent>, MobilityError> {
                Err(MobilityError::AgentLifecycle {
                    agent: description.agent.clone(),
                    phase: transit::common::LifecyclePhase::Add,
                    reason: format!("no factory named {}", description.factory),
                })
            },
        ),
    );
    let n1 = launch_node("n1", &blackboard, &switchboard, broken, RecordingObserver::new());

    let ticket = AddTicket::builder().agent("a1").build()?;
    let record = n1.request_add(ticket).await;

    let status = await_status(&record).await?;
    assert_eq!(status.code, StatusCode::Failure);
    assert_eq!(
        status.failure.map(|failure| failure.kind),
        Some(FailureKind::Lifecycle)
    );
    assert!(!n1.is_registered(&MessageAddress::new("a1")));
    assert_eq!(n1.pending_action(&MessageAddress::new("a1")), None);
    Ok(())
}

/// Tests removal of a hosted agent on another node.
///
/// **Scenario:**
/// 1. Spawn `a1` on `n2`.
/// 2. From `n1`, request its removal from `n2`.
///
/// **Verification:**
/// - The record completes with `REMOVED`.
/// - `a1` is unloaded and no longer registered on `n2`.
#[transit_test]
async fn test_remove_runs_on_destination() -> anyhow::Result<()> {
    initialize_tracing();
    let blackboard = Blackboard::new();
    let switchboard = Switchboard::new();
    let n1 = spawn_node("n1", &blackboard, &switchboard, RecordingObserver::new());
    let n2 = spawn_node("n2", &blackboard, &switchboard, RecordingObserver::new());
    let a1 = MessageAddress::new("a1");

    let agent = n2.spawn_agent(AgentDescription::new("a1"), None).await?;
    let ticket = RemoveTicket::builder().agent("a1").destination("n2").build()?;
    let record = n1.request_remove(ticket).await;

    assert_eq!(await_status(&record).await?.code, StatusCode::Removed);
    assert_eq!(agent.run_state(), RunState::Unloaded);
    assert!(!n2.is_registered(&a1));
    assert_eq!(n2.pending_action(&a1), None);
    Ok(())
}

/// Tests that removing an agent nobody hosts completes with
/// `DOES_NOT_EXIST`.
#[transit_test]
async fn test_remove_of_unknown_agent_reports_does_not_exist() -> anyhow::Result<()> {
    initialize_tracing();
    let blackboard = Blackboard::new();
    let switchboard = Switchboard::new();
    let n1 = spawn_node("n1", &blackboard, &switchboard, RecordingObserver::new());

    let ticket = RemoveTicket::builder().agent("ghost").build()?;
    let record = n1.request_remove(ticket).await;

    let status = await_status(&record).await?;
    assert_eq!(status.code, StatusCode::DoesNotExist);
    assert!(status.failure.is_none());
    assert_eq!(n1.pending_action(&MessageAddress::new("ghost")), None);
    Ok(())
}

/// Tests that a request made on behalf of another request keeps its owner.
#[transit_test]
async fn test_request_keeps_its_owner() -> anyhow::Result<()> {
    initialize_tracing();
    let blackboard = Blackboard::new();
    let switchboard = Switchboard::new();
    let n1 = spawn_node("n1", &blackboard, &switchboard, RecordingObserver::new());
    let owner = ControlUid::generate();

    let ticket = AddTicket::builder().agent("a1").build()?;
    let record = n1.request(Some(owner.clone()), ticket).await;

    assert_eq!(await_status(&record).await?.code, StatusCode::Created);
    assert_eq!(record.owner(), Some(&owner));
    Ok(())
}

/// Tests that a completed request stays visible until its requester
/// withdraws it, and then leaves every view.
#[transit_test]
async fn test_withdraw_clears_completed_request() -> anyhow::Result<()> {
    initialize_tracing();
    let blackboard = Blackboard::new();
    let switchboard = Switchboard::new();
    let n1 = spawn_node("n1", &blackboard, &switchboard, RecordingObserver::new());
    let _n2 = spawn_node("n2", &blackboard, &switchboard, RecordingObserver::new());

    let ticket = AddTicket::builder().agent("a1").destination("n2").build()?;
    let record = n1.request_add(ticket).await;
    assert_eq!(await_status(&record).await?.code, StatusCode::Created);
    assert_eq!(blackboard.view("n1").len(), 1);
    assert_eq!(blackboard.view("n2").len(), 1);

    n1.withdraw(&record).await;

    assert!(blackboard.view("n1").is_empty());
    assert!(blackboard.view("n2").is_empty());
    Ok(())
}
