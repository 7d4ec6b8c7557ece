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

use derive_new::new;
use tracing::instrument;

use crate::control::ControlRecord;
use crate::message::MessageAddress;
use crate::node::MobilityNode;
use crate::ticket::{AddTicket, MoveTicket, RemoveTicket, TicketError};

/// Mobility requests on behalf of one agent.
///
/// Move tickets that leave the agent unset are resolved to the calling agent
/// before they are published.
#[derive(new, Debug, Clone)]
pub struct MobilityService {
    node: MobilityNode,
    agent: MessageAddress,
}

impl MobilityService {
    /// The agent requests are made for.
    pub fn agent(&self) -> &MessageAddress {
        &self.agent
    }

    /// Publishes `ticket` with its agent resolved to the caller.
    #[instrument(skip(self), fields(agent = %self.agent))]
    pub async fn request_move(&self, ticket: MoveTicket) -> Arc<ControlRecord> {
        self.node
            .request_move(ticket.resolve_agent(&self.agent))
            .await
    }

    /// Moves the calling agent to `destination`.
    pub async fn move_to(
        &self,
        destination: impl Into<MessageAddress>,
    ) -> Result<Arc<ControlRecord>, TicketError> {
        let ticket = MoveTicket::builder()
            .generate_id()
            .agent(self.agent.clone())
            .origin(self.node.address().clone())
            .destination(destination)
            .build()?;
        Ok(self.request_move(ticket).await)
    }

    /// Restarts the calling agent in place by moving it through a
    /// suspend, capture and re-create cycle on its own node.
    pub async fn restart(&self) -> Result<Arc<ControlRecord>, TicketError> {
        let ticket = MoveTicket::builder()
            .generate_id()
            .agent(self.agent.clone())
            .origin(self.node.address().clone())
            .force_restart(true)
            .build()?;
        Ok(self.request_move(ticket).await)
    }

    /// Publishes an add request.
    pub async fn request_add(&self, ticket: AddTicket) -> Arc<ControlRecord> {
        self.node.request_add(ticket).await
    }

    /// Publishes a remove request.
    pub async fn request_remove(&self, ticket: RemoveTicket) -> Arc<ControlRecord> {
        self.node.request_remove(ticket).await
    }
}
