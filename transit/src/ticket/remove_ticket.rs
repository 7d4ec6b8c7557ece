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

use crate::message::MessageAddress;
use crate::ticket::{non_empty, write_prefix, TicketError, TicketId};

/// A request to delete an agent from a node.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RemoveTicket {
    id: Option<TicketId>,
    mobile_agent: MessageAddress,
    destination_node: Option<MessageAddress>,
}

impl RemoveTicket {
    /// Starts building a remove ticket.
    pub fn builder() -> RemoveTicketBuilder {
        RemoveTicketBuilder::default()
    }

    /// The ticket's identifier, if one was assigned.
    pub fn id(&self) -> Option<&TicketId> {
        self.id.as_ref()
    }

    /// The agent to delete.
    pub fn mobile_agent(&self) -> &MessageAddress {
        &self.mobile_agent
    }

    /// The node hosting it; `None` means the receiving node.
    pub fn destination_node(&self) -> Option<&MessageAddress> {
        self.destination_node.as_ref()
    }
}

impl fmt::Display for RemoveTicket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_prefix(f, "Remove", self.id.as_ref())?;
        write!(f, " of agent \"{}\"", self.mobile_agent)?;
        if let Some(dest) = &self.destination_node {
            write!(f, " from node \"{}\"", dest)?;
        }
        Ok(())
    }
}

/// Builder for [`RemoveTicket`].
#[derive(Debug, Default, Clone)]
pub struct RemoveTicketBuilder {
    id: Option<TicketId>,
    mobile_agent: Option<MessageAddress>,
    destination_node: Option<MessageAddress>,
}

impl RemoveTicketBuilder {
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

    /// Names the agent to delete.
    pub fn agent(mut self, agent: impl Into<MessageAddress>) -> Self {
        self.mobile_agent = Some(agent.into());
        self
    }

    /// Names the node hosting it.
    pub fn destination(mut self, node: impl Into<MessageAddress>) -> Self {
        self.destination_node = Some(node.into());
        self
    }

    /// Validates the fields and produces the ticket.
    pub fn build(self) -> Result<RemoveTicket, TicketError> {
        let mobile_agent = non_empty("agent", self.mobile_agent)?
            .ok_or(TicketError::MissingAgent { kind: "remove" })?;
        Ok(RemoveTicket {
            id: self.id,
            mobile_agent,
            destination_node: non_empty("destination", self.destination_node)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_remove_requires_agent() {
        assert_eq!(
            RemoveTicket::builder().build(),
            Err(TicketError::MissingAgent { kind: "remove" })
        );
    }

    #[test]
    fn test_description() {
        let ticket = RemoveTicket::builder()
            .agent("a1")
            .destination("n2")
            .build()
            .unwrap();
        assert_eq!(ticket.to_string(), "Remove of agent \"a1\" from node \"n2\"");
    }
}
