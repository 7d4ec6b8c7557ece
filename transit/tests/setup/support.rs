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

use parking_lot::Mutex;
use tracing::Span;
use transit::prelude::*;

/// A [`MobilitySupport`] that performs nothing and records every call, with
/// optional failures for the operations a handler depends on.
#[derive(Debug)]
pub struct RecordingSupport {
    agent: MessageAddress,
    node: MessageAddress,
    ticket: MoveTicket,
    pub fail_transfer: bool,
    pub fail_add: bool,
    pub fail_remove: bool,
    calls: Mutex<Vec<String>>,
    transferred: Mutex<Option<Option<AgentState>>>,
    nacked: Mutex<Option<FailureDetail>>,
    failures: Mutex<Vec<MobilityError>>,
}

impl RecordingSupport {
    pub fn new(agent: &str, node: &str, ticket: MoveTicket) -> Self {
        Self {
            agent: MessageAddress::new(agent),
            node: MessageAddress::new(node),
            ticket,
            fail_transfer: false,
            fail_add: false,
            fail_remove: false,
            calls: Mutex::default(),
            transferred: Mutex::default(),
            nacked: Mutex::default(),
            failures: Mutex::default(),
        }
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().clone()
    }

    pub fn called(&self, name: &str) -> bool {
        self.calls.lock().iter().any(|call| call == name)
    }

    /// The number of terminal notifications: arrivals plus failures.
    pub fn terminal_notifications(&self) -> usize {
        self.calls
            .lock()
            .iter()
            .filter(|call| *call == "on_arrival" || *call == "on_failure")
            .count()
    }

    pub fn transferred_state(&self) -> Option<Option<AgentState>> {
        self.transferred.lock().clone()
    }

    pub fn nacked(&self) -> Option<FailureDetail> {
        self.nacked.lock().clone()
    }

    pub fn failures(&self) -> Vec<MobilityError> {
        self.failures.lock().clone()
    }

    fn record(&self, call: &str) {
        self.calls.lock().push(call.to_string());
    }
}

#[async_trait]
impl MobilitySupport for RecordingSupport {
    fn span(&self) -> Span {
        tracing::info_span!("recording_support", agent = %self.agent)
    }

    fn agent(&self) -> &MessageAddress {
        &self.agent
    }

    fn node(&self) -> &MessageAddress {
        &self.node
    }

    fn ticket(&self) -> &MoveTicket {
        &self.ticket
    }

    async fn send_transfer(
        &self,
        _description: &AgentDescription,
        state: Option<AgentState>,
    ) -> Result<(), MobilityError> {
        self.record("send_transfer");
        if self.fail_transfer {
            return Err(MobilityError::TransferSendFailure {
                agent: self.agent.clone(),
                destination: MessageAddress::new("unreachable"),
                reason: "no route".to_string(),
            });
        }
        *self.transferred.lock() = Some(state);
        Ok(())
    }

    async fn send_ack(&self) -> Result<(), MobilityError> {
        self.record("send_ack");
        Ok(())
    }

    async fn send_nack(&self, failure: &FailureDetail) -> Result<(), MobilityError> {
        self.record("send_nack");
        *self.nacked.lock() = Some(failure.clone());
        Ok(())
    }

    async fn add_agent(&self, _description: &AgentDescription) -> Result<(), MobilityError> {
        self.record("add_agent");
        if self.fail_add {
            return Err(MobilityError::AlreadyExists {
                agent: self.agent.clone(),
                node: self.node.clone(),
            });
        }
        Ok(())
    }

    async fn remove_agent(&self) -> Result<(), MobilityError> {
        self.record("remove_agent");
        if self.fail_remove {
            return Err(MobilityError::DoesNotExist {
                agent: self.agent.clone(),
                node: self.node.clone(),
            });
        }
        Ok(())
    }

    fn on_dispatch(&self) {
        self.record("on_dispatch");
    }

    fn on_arrival(&self) {
        self.record("on_arrival");
    }

    fn on_failure(&self, error: &MobilityError) {
        self.record("on_failure");
        self.failures.lock().push(error.clone());
    }

    fn on_removal(&self) {
        self.record("on_removal");
    }
}
