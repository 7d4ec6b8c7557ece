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

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::common::AgentDescription;
use crate::message::MessageAddress;
use crate::ticket::{non_empty, write_prefix, TicketError, TicketId};

/// A request to create an agent on a node.
///
/// Without a destination the agent is created on the node that receives the
/// request. Without an explicit description the agent is built by the
/// default factory.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AddTicket {
    id: Option<TicketId>,
    mobile_agent: MessageAddress,
    destination_node: Option<MessageAddress>,
    description: AgentDescription,
}

impl AddTicket {
    /// Starts building an add ticket.
    pub fn builder() -> AddTicketBuilder {
        AddTicketBuilder::default()
    }

    /// The ticket's identifier, if one was assigned.
    pub fn id(&self) -> Option<&TicketId> {
        self.id.as_ref()
    }

    /// The agent to create.
    pub fn mobile_agent(&self) -> &MessageAddress {
        &self.mobile_agent
    }

    /// The node to create it on.
    pub fn destination_node(&self) -> Option<&MessageAddress> {
        self.destination_node.as_ref()
    }

    /// How to build the agent.
    pub fn description(&self) -> &AgentDescription {
        &self.description
    }
}

impl fmt::Display for AddTicket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_prefix(f, "Add", self.id.as_ref())?;
        write!(f, " of agent \"{}\"", self.mobile_agent)?;
        if let Some(dest) = &self.destination_node {
            write!(f, " to node \"{}\"", dest)?;
        }
        Ok(())
    }
}

/// Builder for [`AddTicket`].
#[derive(Debug, Default, Clone)]
pub struct AddTicketBuilder {
    id: Option<TicketId>,
    mobile_agent: Option<MessageAddress>,
    destination_node: Option<MessageAddress>,
    description: Option<AgentDescription>,
}

impl AddTicketBuilder {
    /// Uses a caller-supplied identifier.
    pub fn id(mut self, id: TicketId) -> Self {
        self.id = Some(id);
        self
    }

    /// Assigns a freshly generated identifier.
    pub fn generate_id(mut self) -> Self {
        self.id = Some(TicketId::generate());
        self
    }

    /// Names the agent to create.
    pub fn agent(mut self, agent: impl Into<MessageAddress>) -> Self {
        self.mobile_agent = Some(agent.into());
        self
    }

    /// Names the node to create it on.
    pub fn destination(mut self, node: impl Into<MessageAddress>) -> Self {
        self.destination_node = Some(node.into());
        self
    }

    /// Supplies an explicit description; it must name the same agent.
    pub fn description(mut self, description: AgentDescription) -> Self {
        self.description = Some(description);
        self
    }

    /// Validates the fields and produces the ticket.
    pub fn build(self) -> Result<AddTicket, TicketError> {
        let mobile_agent = non_empty("agent", self.mobile_agent)?
            .ok_or(TicketError::MissingAgent { kind: "add" })?;
        let destination_node = non_empty("destination", self.destination_node)?;
        let description = match self.description {
            Some(description) if description.agent != mobile_agent => {
                return Err(TicketError::DescriptionMismatch {
                    agent: mobile_agent,
                    described: description.agent,
                });
            }
            Some(description) => description,
            None => AgentDescription::new(mobile_agent.clone()),
        };
        Ok(AddTicket {
            id: self.id,
            mobile_agent,
            destination_node,
            description,
        })
    }
}
