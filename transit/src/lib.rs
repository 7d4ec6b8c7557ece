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

#![forbid(unsafe_code)]
#![warn(missing_docs)]

//! # Transit
//!
//! Live agent mobility for a multi-agent runtime: a running agent is
//! suspended, its state captured, shipped to another node, re-created there
//! and only then removed from the node it left. At no point do two live
//! copies of an agent run, and a move that fails leaves the agent running
//! where it was.
//!
//! ## Key Concepts
//!
//! - **Tickets (`AddTicket`, `MoveTicket`, `RemoveTicket`)**: Immutable,
//!   validated requests.
//! - **Control records (`ControlRecord`)**: A ticket plus a status that is set
//!   exactly once. The requester holds the source view; the executing node
//!   holds a target view whose status is relayed back.
//! - **Protocol (`ProtocolEvent`)**: One-shot handlers for each step of a move
//!   (dispatch, arrival, ack, nack), run against a `MobilitySupport`.
//! - **Nodes (`MobilityNode`)**: The runtime that watches a control store and
//!   an inbox and drives the protocol for the agents it hosts.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use transit::prelude::*;
//!
//! let record = node.mobility_service("a1").move_to("n2").await?;
//! ```

/// Shared errors, agent state, codecs and configuration.
pub mod common;

/// Control records and the in-memory store that relays them.
pub mod control;

/// Addresses and the messages nodes exchange.
pub mod message;

/// The node runtime and its in-memory collaborators.
pub mod node;

/// The relocation protocol handlers.
pub mod protocol;

/// Add, move, remove and transfer tickets.
pub mod ticket;

/// Traits at the seams between the protocol and its host.
pub mod traits;

/// A prelude module for conveniently importing the most commonly used items.
///
/// # Re-exports
///
/// ## Macros (from `transit-macro`)
/// *   [`transit_macro::mobility_message`]: Attribute macro for types sent between nodes.
/// *   [`transit_macro::mobility_state`]: Attribute macro for agent state snapshots.
///
/// ## External Crates
/// *   [`async_trait::async_trait`](https://docs.rs/async-trait/latest/async_trait/attr.async_trait.html): The macro for defining async functions in traits.
///
/// ## Core Types
/// *   [`crate::ticket::MoveTicket`], [`crate::ticket::AddTicket`], [`crate::ticket::RemoveTicket`]: Requests.
/// *   [`crate::control::ControlRecord`] and [`crate::control::StatusCode`]: Request tracking.
/// *   [`crate::node::MobilityNode`] and [`crate::node::MobilityService`]: The node runtime.
/// *   [`crate::common::AgentState`] and [`crate::common::AgentDescription`]: What moves.
pub mod prelude {
    // Macros from transit-macro
    pub use transit_macro::*;

    // External crate re-exports
    pub use async_trait::async_trait;

    // Core types
    pub use crate::common::{
        AgentDescription, AgentState, FailureDetail, FailureKind, Format, MobilityError,
        StateCodec, TransitConfig, CONFIG,
    };
    pub use crate::control::{
        Blackboard, BlackboardView, ControlRecord, ControlStatus, ControlUid, StatusCode,
    };
    pub use crate::message::{Envelope, MessageAddress, MobilityMessage};
    pub use crate::node::{
        HostedAgent, LocalContainer, MobilityNode, MobilityService, NodeServices, PendingAction,
        Switchboard,
    };
    pub use crate::protocol::{Outcome, ProtocolEvent};
    pub use crate::ticket::{AddTicket, MoveTicket, RemoveTicket, Ticket, TicketId, TransferTicket};
    pub use crate::traits::{
        AgentContainer, AgentModel, ControlStore, MobileAgent, MobilityObserver, MobilitySupport,
        RunState, StateProvider, Transport,
    };
}
