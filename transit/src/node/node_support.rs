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

use async_trait::async_trait;
use parking_lot::Mutex;
use tracing::{error, info_span, Span};

use crate::common::{AgentDescription, AgentState, FailureDetail, MobilityError};
use crate::control::{ControlRecord, ControlUid, StatusCode};
use crate::message::{Envelope, MessageAddress, MobilityMessage};
use crate::node::mobility_node::NodeInner;
use crate::ticket::{MoveTicket, TransferTicket};
use crate::traits::MobilitySupport;

/// The [`MobilitySupport`] a node hands to one protocol handler.
///
/// On the origin it owns the move control record and completes it when the
/// handler reports arrival or failure. The completed record is queued and
/// published once the handler has finished.
pub(crate) struct NodeSupport {
    node: Arc<NodeInner>,
    agent: MessageAddress,
    ticket: MoveTicket,
    move_control_uid: ControlUid,
    move_control: Option<Arc<ControlRecord>>,
    peer: Option<MessageAddress>,
    publications: Mutex<Vec<Arc<ControlRecord>>>,
    span: Span,
}

impl NodeSupport {
    fn new(
        node: Arc<NodeInner>,
        agent: MessageAddress,
        ticket: MoveTicket,
        move_control_uid: ControlUid,
        move_control: Option<Arc<ControlRecord>>,
        peer: Option<MessageAddress>,
    ) -> Self {
        let span = info_span!(
            "mobility",
            node = %node.address,
            agent = %agent,
            ticket = %ticket
        );
        Self {
            node,
            agent,
            ticket,
            move_control_uid,
            move_control,
            peer,
            publications: Mutex::default(),
            span,
        }
    }

    /// Support for a dispatch on the origin; the peer is the destination.
    pub(crate) fn for_departure(
        node: Arc<NodeInner>,
        agent: MessageAddress,
        ticket: MoveTicket,
        control: Arc<ControlRecord>,
    ) -> Self {
        let destination = ticket.destination_node().cloned();
        Self::new(
            node,
            agent,
            ticket,
            control.uid().clone(),
            Some(control),
            destination,
        )
    }

    /// Support for an arrival on the destination; the peer is the origin.
    pub(crate) fn for_arrival(
        node: Arc<NodeInner>,
        agent: MessageAddress,
        ticket: MoveTicket,
        move_control_uid: ControlUid,
        origin: MessageAddress,
    ) -> Self {
        Self::new(node, agent, ticket, move_control_uid, None, Some(origin))
    }

    /// Support for finishing a move on the origin after the reply.
    pub(crate) fn for_reply(
        node: Arc<NodeInner>,
        agent: MessageAddress,
        ticket: MoveTicket,
        control: Arc<ControlRecord>,
    ) -> Self {
        Self::new(node, agent, ticket, control.uid().clone(), Some(control), None)
    }

    /// Control records completed by the handler, ready to publish.
    pub(crate) fn take_publications(&self) -> Vec<Arc<ControlRecord>> {
        std::mem::take(&mut *self.publications.lock())
    }

    fn complete(&self, code: StatusCode, failure: Option<FailureDetail>) {
        let Some(control) = &self.move_control else {
            return;
        };
        match control.set_status(code, failure) {
            Ok(()) => self.publications.lock().push(Arc::clone(control)),
            Err(e) => error!(uid = %control.uid(), error = %e, "Move control completed twice"),
        }
    }

    async fn reply(&self, message: MobilityMessage) -> Result<(), MobilityError> {
        let Some(origin) = &self.peer else {
            return Err(MobilityError::TicketMismatch(format!(
                "no origin to reply to for agent {}",
                self.agent
            )));
        };
        let envelope = Envelope::new(self.node.address.clone(), origin.clone(), message);
        self.node
            .transport
            .send(envelope)
            .await
            .map_err(|e| MobilityError::TransferSendFailure {
                agent: self.agent.clone(),
                destination: origin.clone(),
                reason: e.to_string(),
            })
    }
}

#[async_trait]
impl MobilitySupport for NodeSupport {
    fn span(&self) -> Span {
        self.span.clone()
    }

    fn agent(&self) -> &MessageAddress {
        &self.agent
    }

    fn node(&self) -> &MessageAddress {
        &self.node.address
    }

    fn ticket(&self) -> &MoveTicket {
        &self.ticket
    }

    async fn send_transfer(
        &self,
        description: &AgentDescription,
        state: Option<AgentState>,
    ) -> Result<(), MobilityError> {
        let Some(destination) = &self.peer else {
            return Err(MobilityError::TicketMismatch(
                "transfer without a destination node".to_string(),
            ));
        };
        let transfer = TransferTicket::new(
            self.ticket.clone(),
            self.agent.clone(),
            self.node.address.clone(),
            destination.clone(),
            description.clone(),
            state,
            self.move_control_uid.clone(),
        );
        let envelope = Envelope::new(
            self.node.address.clone(),
            destination.clone(),
            MobilityMessage::Transfer(transfer),
        );
        self.node
            .transport
            .send(envelope)
            .await
            .map_err(|e| MobilityError::TransferSendFailure {
                agent: self.agent.clone(),
                destination: destination.clone(),
                reason: e.to_string(),
            })
    }

    async fn send_ack(&self) -> Result<(), MobilityError> {
        self.reply(MobilityMessage::Ack {
            agent: self.agent.clone(),
            move_control: self.move_control_uid.clone(),
        })
        .await
    }

    async fn send_nack(&self, failure: &FailureDetail) -> Result<(), MobilityError> {
        self.reply(MobilityMessage::Nack {
            agent: self.agent.clone(),
            move_control: self.move_control_uid.clone(),
            failure: failure.clone(),
        })
        .await
    }

    async fn add_agent(&self, description: &AgentDescription) -> Result<(), MobilityError> {
        let state = self.node.registry.holder(&self.agent).take();
        let instance = self.node.container.add_agent(description, state).await?;
        self.node.registry.register(instance, description.clone())
    }

    async fn remove_agent(&self) -> Result<(), MobilityError> {
        self.node.container.remove_agent(&self.agent).await?;
        self.node.registry.unregister(&self.agent);
        Ok(())
    }

    fn on_dispatch(&self) {
        for observer in &self.node.observers {
            observer.on_dispatch(&self.agent, &self.ticket);
        }
    }

    fn on_arrival(&self) {
        self.complete(StatusCode::Moved, None);
        for observer in &self.node.observers {
            observer.on_arrival(&self.agent, &self.ticket);
        }
    }

    fn on_failure(&self, error: &MobilityError) {
        self.complete(StatusCode::Failure, Some(error.detail()));
        for observer in &self.node.observers {
            observer.on_failure(&self.agent, &self.ticket, error);
        }
    }

    fn on_removal(&self) {
        for observer in &self.node.observers {
            observer.on_removal(&self.agent, &self.ticket);
        }
    }
}
