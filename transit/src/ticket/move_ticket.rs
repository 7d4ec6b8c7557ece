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

/// A request to relocate a running agent, or to restart it in place.
///
/// Every field except `force_restart` is optional. An unset agent means
/// "whoever issues the request" and is filled in with
/// [`MoveTicket::resolve_agent`]. An unset origin is not checked. An unset
/// destination is only meaningful together with a forced restart, which asks
/// the current node to cycle the agent through capture and re-creation.
///
/// The node executing the ticket re-checks the agent, origin and destination
/// against its own context; a ticket that passed its builder can still fail
/// there with a ticket mismatch.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MoveTicket {
    id: Option<TicketId>,
    mobile_agent: Option<MessageAddress>,
    origin_node: Option<MessageAddress>,
    destination_node: Option<MessageAddress>,
    force_restart: bool,
}

impl MoveTicket {
    /// Starts building a move ticket.
    pub fn builder() -> MoveTicketBuilder {
        MoveTicketBuilder::default()
    }

    /// The ticket's identifier, if one was assigned.
    pub fn id(&self) -> Option<&TicketId> {
        self.id.as_ref()
    }

    /// The agent to move; `None` means the requester itself.
    pub fn mobile_agent(&self) -> Option<&MessageAddress> {
        self.mobile_agent.as_ref()
    }

    /// The node the agent is expected to be on.
    pub fn origin_node(&self) -> Option<&MessageAddress> {
        self.origin_node.as_ref()
    }

    /// The node the agent should end up on.
    pub fn destination_node(&self) -> Option<&MessageAddress> {
        self.destination_node.as_ref()
    }

    /// Whether the agent must be restarted even when it stays put.
    pub fn is_force_restart(&self) -> bool {
        self.force_restart
    }

    /// Returns a copy whose unset agent is replaced by `caller`.
    pub fn resolve_agent(&self, caller: &MessageAddress) -> Self {
        let mut resolved = self.clone();
        if resolved.mobile_agent.is_none() {
            resolved.mobile_agent = Some(caller.clone());
        }
        resolved
    }

    /// Whether executing on `node` keeps the agent where it is.
    pub fn is_local_to(&self, node: &MessageAddress) -> bool {
        self.destination_node.as_ref().map_or(true, |dest| dest == node)
    }
}

impl fmt::Display for MoveTicket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_prefix(f, "Move", self.id.as_ref())?;
        match &self.mobile_agent {
            Some(agent) => write!(f, " of agent \"{}\"", agent)?,
            None => f.write_str(" of requesting agent")?,
        }
        if let Some(origin) = &self.origin_node {
            write!(f, " from node \"{}\"", origin)?;
        }
        if let Some(dest) = &self.destination_node {
            write!(f, " to node \"{}\"", dest)?;
        }
        if self.force_restart {
            f.write_str(" with forced restart")?;
        }
        Ok(())
    }
}

/// Builder for [`MoveTicket`].
#[derive(Debug, Default, Clone)]
pub struct MoveTicketBuilder {
    id: Option<TicketId>,
    mobile_agent: Option<MessageAddress>,
    origin_node: Option<MessageAddress>,
    destination_node: Option<MessageAddress>,
    force_restart: bool,
}

impl MoveTicketBuilder {
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

    /// Names the agent to move.
    pub fn agent(mut self, agent: impl Into<MessageAddress>) -> Self {
        self.mobile_agent = Some(agent.into());
        self
    }

    /// States where the agent is expected to be.
    pub fn origin(mut self, node: impl Into<MessageAddress>) -> Self {
        self.origin_node = Some(node.into());
        self
    }

    /// States where the agent should go.
    pub fn destination(mut self, node: impl Into<MessageAddress>) -> Self {
        self.destination_node = Some(node.into());
        self
    }

    /// Requests a restart cycle even when the agent stays on its node.
    pub fn force_restart(mut self, force: bool) -> Self {
        self.force_restart = force;
        self
    }

    /// Validates the fields and produces the ticket.
    pub fn build(self) -> Result<MoveTicket, TicketError> {
        let mobile_agent = non_empty("agent", self.mobile_agent)?;
        let origin_node = non_empty("origin", self.origin_node)?;
        let destination_node = non_empty("destination", self.destination_node)?;
        if destination_node.is_none() && !self.force_restart {
            return Err(TicketError::NothingRequested);
        }
        Ok(MoveTicket {
            id: self.id,
            mobile_agent,
            origin_node,
            destination_node,
            force_restart: self.force_restart,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_move_without_destination_or_restart_is_invalid() {
        let result = MoveTicket::builder().agent("a1").origin("n1").build();
        assert_eq!(result, Err(TicketError::NothingRequested));
    }

    #[test]
    fn test_forced_restart_needs_no_destination() {
        let ticket = MoveTicket::builder().agent("a1").force_restart(true).build().unwrap();
        assert!(ticket.is_force_restart());
        assert!(ticket.is_local_to(&MessageAddress::new("anywhere")));
    }

    #[test]
    fn test_blank_destination_is_invalid() {
        let result = MoveTicket::builder().agent("a1").destination(" ").build();
        assert_eq!(
            result,
            Err(TicketError::EmptyAddress {
                field: "destination"
            })
        );
    }

    #[test]
    fn test_resolve_agent_only_fills_unset_agent() {
        let caller = MessageAddress::new("caller");
        let anonymous = MoveTicket::builder().destination("n2").build().unwrap();
        assert_eq!(anonymous.resolve_agent(&caller).mobile_agent(), Some(&caller));

        let named = MoveTicket::builder().agent("a1").destination("n2").build().unwrap();
        assert_eq!(
            named.resolve_agent(&caller).mobile_agent(),
            Some(&MessageAddress::new("a1"))
        );
    }

    #[test]
    fn test_equality_is_by_fields() {
        let build = || {
            MoveTicket::builder()
                .id(TicketId::from("t-1"))
                .agent("a1")
                .origin("n1")
                .destination("n2")
                .build()
                .unwrap()
        };
        assert_eq!(build(), build());
        let restarted = MoveTicket::builder()
            .id(TicketId::from("t-1"))
            .agent("a1")
            .origin("n1")
            .destination("n2")
            .force_restart(true)
            .build()
            .unwrap();
        assert_ne!(build(), restarted);
    }

    #[test]
    fn test_description() {
        let ticket = MoveTicket::builder()
            .id(TicketId::from("t-1"))
            .agent("a1")
            .origin("n1")
            .destination("n2")
            .build()
            .unwrap();
        assert_eq!(
            ticket.to_string(),
            "Move t-1 of agent \"a1\" from node \"n1\" to node \"n2\""
        );
    }
}
