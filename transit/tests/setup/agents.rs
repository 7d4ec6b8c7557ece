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

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;
use transit::common::LifecyclePhase;
use transit::prelude::*;

/// Application state carried by the agents in these tests.
#[mobility_state]
pub struct Counter {
    pub count: u64,
    pub label: String,
}

impl Counter {
    pub fn state(count: u64) -> AgentState {
        AgentState::capture(&Counter {
            count,
            label: format!("counter-{count}"),
        })
        .unwrap()
    }
}

/// Lifecycle steps a [`ScriptedAgent`] can be told to fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Fault {
    Suspend,
    Resume,
    Stop,
    Unload,
    Capture,
}

/// A mobile agent that follows the hosted lifecycle but fails the steps it
/// is scripted to fail, and records every lifecycle call it sees.
#[derive(Debug)]
pub struct ScriptedAgent {
    address: MessageAddress,
    run_state: Mutex<RunState>,
    state: Option<AgentState>,
    faults: Vec<Fault>,
    calls: Mutex<Vec<&'static str>>,
    dispatched_to: Mutex<Option<MessageAddress>>,
}

impl ScriptedAgent {
    pub fn new(address: &str, state: Option<AgentState>) -> Self {
        Self {
            address: MessageAddress::new(address),
            run_state: Mutex::new(RunState::Running),
            state,
            faults: Vec::new(),
            calls: Mutex::default(),
            dispatched_to: Mutex::default(),
        }
    }

    pub fn failing(mut self, fault: Fault) -> Self {
        self.faults.push(fault);
        self
    }

    pub fn calls(&self) -> Vec<&'static str> {
        self.calls.lock().clone()
    }

    pub fn dispatched_to(&self) -> Option<MessageAddress> {
        self.dispatched_to.lock().clone()
    }

    fn step(
        &self,
        name: &'static str,
        fault: Fault,
        phase: LifecyclePhase,
        from: RunState,
        to: RunState,
    ) -> Result<(), MobilityError> {
        self.calls.lock().push(name);
        let mut run_state = self.run_state.lock();
        if self.faults.contains(&fault) || *run_state != from {
            return Err(MobilityError::AgentLifecycle {
                agent: self.address.clone(),
                phase,
                reason: format!("scripted {name} failure while {}", *run_state),
            });
        }
        *run_state = to;
        Ok(())
    }
}

impl AgentModel for ScriptedAgent {
    fn address(&self) -> &MessageAddress {
        &self.address
    }

    fn run_state(&self) -> RunState {
        *self.run_state.lock()
    }

    fn suspend(&self) -> Result<(), MobilityError> {
        self.step("suspend", Fault::Suspend, LifecyclePhase::Suspend, RunState::Running, RunState::Suspended)
    }

    fn resume(&self) -> Result<(), MobilityError> {
        self.step("resume", Fault::Resume, LifecyclePhase::Resume, RunState::Suspended, RunState::Running)
    }

    fn stop(&self) -> Result<(), MobilityError> {
        self.step("stop", Fault::Stop, LifecyclePhase::Stop, RunState::Suspended, RunState::Stopped)
    }

    fn unload(&self) -> Result<(), MobilityError> {
        self.step("unload", Fault::Unload, LifecyclePhase::Unload, RunState::Stopped, RunState::Unloaded)
    }
}

impl StateProvider for ScriptedAgent {
    fn capture_state(&self) -> Result<AgentState, MobilityError> {
        self.calls.lock().push("capture");
        match &self.state {
            Some(state) if !self.faults.contains(&Fault::Capture) => Ok(state.clone()),
            _ => Err(MobilityError::StateCaptureFailure {
                agent: self.address.clone(),
                reason: "scripted capture failure".to_string(),
            }),
        }
    }
}

impl MobileAgent for ScriptedAgent {
    fn state_provider(&self) -> Option<&dyn StateProvider> {
        (self.state.is_some() || self.faults.contains(&Fault::Capture))
            .then_some(self as &dyn StateProvider)
    }

    fn on_dispatch(&self, destination: Option<&MessageAddress>) {
        *self.dispatched_to.lock() = destination.cloned();
    }
}

/// Counts the terminal notifications each agent receives.
#[derive(Debug, Default)]
pub struct RecordingObserver {
    dispatches: AtomicUsize,
    arrivals: Mutex<HashMap<MessageAddress, usize>>,
    failures: Mutex<HashMap<MessageAddress, Vec<FailureKind>>>,
    removals: AtomicUsize,
}

impl RecordingObserver {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn arrivals(&self, agent: &str) -> usize {
        self.arrivals
            .lock()
            .get(&MessageAddress::new(agent))
            .copied()
            .unwrap_or_default()
    }

    pub fn failures(&self, agent: &str) -> Vec<FailureKind> {
        self.failures
            .lock()
            .get(&MessageAddress::new(agent))
            .cloned()
            .unwrap_or_default()
    }

    pub fn dispatches(&self) -> usize {
        self.dispatches.load(Ordering::SeqCst)
    }

    pub fn removals(&self) -> usize {
        self.removals.load(Ordering::SeqCst)
    }
}

impl MobilityObserver for RecordingObserver {
    fn on_dispatch(&self, _agent: &MessageAddress, _ticket: &MoveTicket) {
        self.dispatches.fetch_add(1, Ordering::SeqCst);
    }

    fn on_arrival(&self, agent: &MessageAddress, _ticket: &MoveTicket) {
        *self.arrivals.lock().entry(agent.clone()).or_default() += 1;
    }

    fn on_failure(&self, agent: &MessageAddress, _ticket: &MoveTicket, error: &MobilityError) {
        self.failures
            .lock()
            .entry(agent.clone())
            .or_default()
            .push(error.kind());
    }

    fn on_removal(&self, _agent: &MessageAddress, _ticket: &MoveTicket) {
        self.removals.fetch_add(1, Ordering::SeqCst);
    }
}

/// A codec that silently drops every field but `count` when decoding.
#[derive(Debug)]
pub struct LossyCodec;

impl StateCodec for LossyCodec {
    fn name(&self) -> &str {
        "lossy"
    }

    fn encode(&self, state: &AgentState) -> Result<Vec<u8>, transit::common::CodecError> {
        Format::Json.encode(state)
    }

    fn decode(&self, bytes: &[u8]) -> Result<AgentState, transit::common::CodecError> {
        let decoded = Format::Json.decode(bytes)?;
        let count = decoded.as_value().get("count").cloned().unwrap_or_default();
        Ok(AgentState::from_value(serde_json::json!({ "count": count })))
    }
}
