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

//! The node runtime that carries mobility requests out.
//!
//! *   [`MobilityNode`]: watches its control store and inbox, runs protocol
//!     steps and completes control records.
//! *   [`MobilityService`]: request facade bound to one agent.
//! *   [`LocalContainer`] / [`HostedAgent`]: an in-memory agent container.
//! *   [`Switchboard`]: an in-memory transport between nodes of one process.

// --- Public Re-exports ---
pub use local_container::{AgentFactory, HostedAgent, LocalContainer};
pub use mobility_node::{MobilityNode, MobilityNodeBuilder, NodeServices};
pub use mobility_service::MobilityService;
pub use registry::PendingAction;
pub use switchboard::Switchboard;

// --- Submodules ---

/// Defines [`LocalContainer`] and [`HostedAgent`].
mod local_container;
/// Defines [`MobilityNode`] and its builder.
pub(crate) mod mobility_node;
/// Defines [`MobilityService`].
mod mobility_service;
/// Defines the per-node `MobilitySupport` implementation.
mod node_support;
/// Defines the agent registry and [`PendingAction`].
mod registry;
/// Defines the in-memory [`Switchboard`] transport.
mod switchboard;
