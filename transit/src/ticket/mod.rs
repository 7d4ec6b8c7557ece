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

//! Immutable descriptions of requested mobility operations.
//!
//! A [`Ticket`] is validated once, when its builder runs, and is plain data
//! afterwards: it can be cloned, compared, logged and shipped to other nodes.
//!
//! *   [`AddTicket`]: create an agent on a node.
//! *   [`MoveTicket`]: relocate a running agent, or restart it in place.
//! *   [`RemoveTicket`]: delete an agent from a node.
//! *   [`TransferTicket`]: the payload the origin sends to the destination
//!     during a move.

use std::fmt;

use mti::prelude::*;
use serde::{Deserialize, Serialize};

use crate::message::MessageAddress;

// --- Public Re-exports ---
pub use add_ticket::{AddTicket, AddTicketBuilder};
pub use move_ticket::{MoveTicket, MoveTicketBuilder};
pub use remove_ticket::{RemoveTicket, RemoveTicketBuilder};
pub use transfer_ticket::TransferTicket;

// --- Submodules ---

/// Defines [`AddTicket`].
mod add_ticket;
/// Defines [`MoveTicket`].
mod move_ticket;
/// Defines [`RemoveTicket`].
mod remove_ticket;
/// Defines [`TransferTicket`].
mod transfer_ticket;

/// Time-ordered unique identifier of a ticket.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TicketId(String);

impl TicketId {
    /// Generates a fresh identifier.
    pub fn generate() -> Self {
        Self("ticket".create_type_id::<V7>().to_string())
    }

    /// Returns the identifier as text.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TicketId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TicketId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

/// Reasons a ticket builder refuses to produce a ticket.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TicketError {
    /// The ticket kind requires an agent and none was given.
    MissingAgent {
        /// Which ticket kind was being built.
        kind: &'static str,
    },
    /// An address field was supplied but blank.
    EmptyAddress {
        /// Which field was blank.
        field: &'static str,
    },
    /// A move ticket with neither a destination nor a forced restart.
    NothingRequested,
    /// An add ticket's description names a different agent than the ticket.
    DescriptionMismatch {
        /// The ticket's agent.
        agent: MessageAddress,
        /// The agent named by the description.
        described: MessageAddress,
    },
}

impl fmt::Display for TicketError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TicketError::MissingAgent { kind } => {
                write!(f, "{} ticket requires a mobile agent", kind)
            }
            TicketError::EmptyAddress { field } => write!(f, "{} address is empty", field),
            TicketError::NothingRequested => write!(
                f,
                "move ticket needs a destination node or a forced restart"
            ),
            TicketError::DescriptionMismatch { agent, described } => write!(
                f,
                "description names agent {} but the ticket moves agent {}",
                described, agent
            ),
        }
    }
}

impl std::error::Error for TicketError {}

/// Rejects blank addresses supplied to a builder.
pub(crate) fn non_empty(
    field: &'static str,
    address: Option<MessageAddress>,
) -> Result<Option<MessageAddress>, TicketError> {
    match address {
        Some(address) if address.is_empty() => Err(TicketError::EmptyAddress { field }),
        other => Ok(other),
    }
}

/// One requested mobility operation.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Ticket {
    /// Create an agent.
    Add(AddTicket),
    /// Relocate or restart an agent.
    Move(MoveTicket),
    /// Delete an agent.
    Remove(RemoveTicket),
}

impl Ticket {
    /// The ticket's identifier, if one was assigned.
    pub fn id(&self) -> Option<&TicketId> {
        match self {
            Ticket::Add(ticket) => ticket.id(),
            Ticket::Move(ticket) => ticket.id(),
            Ticket::Remove(ticket) => ticket.id(),
        }
    }

    /// The node expected to carry the operation out, if stated.
    pub fn destination_node(&self) -> Option<&MessageAddress> {
        match self {
            Ticket::Add(ticket) => ticket.destination_node(),
            Ticket::Move(ticket) => ticket.destination_node(),
            Ticket::Remove(ticket) => ticket.destination_node(),
        }
    }

    /// Returns the move ticket, if this is one.
    pub fn as_move(&self) -> Option<&MoveTicket> {
        match self {
            Ticket::Move(ticket) => Some(ticket),
            _ => None,
        }
    }
}

impl fmt::Display for Ticket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Ticket::Add(ticket) => ticket.fmt(f),
            Ticket::Move(ticket) => ticket.fmt(f),
            Ticket::Remove(ticket) => ticket.fmt(f),
        }
    }
}

impl From<AddTicket> for Ticket {
    fn from(ticket: AddTicket) -> Self {
        Ticket::Add(ticket)
    }
}

impl From<MoveTicket> for Ticket {
    fn from(ticket: MoveTicket) -> Self {
        Ticket::Move(ticket)
    }
}

impl From<RemoveTicket> for Ticket {
    fn from(ticket: RemoveTicket) -> Self {
        Ticket::Remove(ticket)
    }
}

/// Writes the `"<kind> [<id>] "` prefix shared by ticket descriptions.
pub(crate) fn write_prefix(
    f: &mut fmt::Formatter<'_>,
    kind: &str,
    id: Option<&TicketId>,
) -> fmt::Result {
    match id {
        Some(id) => write!(f, "{} {}", kind, id),
        None => f.write_str(kind),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_ids_are_unique_and_prefixed() {
        let first = TicketId::generate();
        let second = TicketId::generate();
        assert_ne!(first, second);
        assert!(first.as_str().starts_with("ticket_"));
    }
}
