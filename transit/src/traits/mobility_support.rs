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

use async_trait::async_trait;
use tracing::Span;

use crate::common::{AgentDescription, AgentState, FailureDetail, MobilityError};
use crate::message::MessageAddress;
use crate::ticket::MoveTicket;

/// Everything a protocol handler needs from the node it runs on.
///
/// A support is bound to one agent and one move ticket. Handlers only read
/// from it and call into it; they keep no state of their own, so a handler
/// runs once against its support and is dropped.
///
/// # Messaging
///
/// [`send_transfer`](MobilitySupport::send_transfer),
/// [`send_ack`](MobilitySupport::send_ack) and
/// [`send_nack`](MobilitySupport::send_nack) hand one message to the
/// transport. Delivery is at most once; nothing here retries.
///
/// # Container
///
/// [`add_agent`](MobilitySupport::add_agent) and
/// [`remove_agent`](MobilitySupport::remove_agent) complete before they
/// return. An add is seeded from whatever state the node holds for the agent.
///
/// # Notifications
///
/// The `on_*` methods tell higher layers how the move went. Across the whole
/// protocol exactly one of [`on_arrival`](MobilitySupport::on_arrival) and
/// [`on_failure`](MobilitySupport::on_failure) fires per ticket.
#[async_trait]
pub trait MobilitySupport: Send + Sync {
    /// Span every log line of the handler is recorded in.
    fn span(&self) -> Span;

    /// The agent being handled.
    fn agent(&self) -> &MessageAddress;

    /// The node the handler runs on.
    fn node(&self) -> &MessageAddress;

    /// The active move ticket.
    fn ticket(&self) -> &MoveTicket;

    /// Sends the agent's description and captured state to the destination.
    async fn send_transfer(
        &self,
        description: &AgentDescription,
        state: Option<AgentState>,
    ) -> Result<(), MobilityError>;

    /// Tells the origin the agent arrived.
    async fn send_ack(&self) -> Result<(), MobilityError>;

    /// Tells the origin the agent could not be re-created.
    async fn send_nack(&self, failure: &FailureDetail) -> Result<(), MobilityError>;

    /// Creates the agent in the local container.
    async fn add_agent(&self, description: &AgentDescription) -> Result<(), MobilityError>;

    /// Deletes the agent from the local container.
    async fn remove_agent(&self) -> Result<(), MobilityError>;

    /// The move has started.
    fn on_dispatch(&self);

    /// The move completed; the agent runs at its destination.
    fn on_arrival(&self);

    /// The move failed.
    fn on_failure(&self, error: &MobilityError);

    /// The local instance of the agent is gone.
    fn on_removal(&self);
}
