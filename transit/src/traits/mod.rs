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

//! The seams between the protocol and its host.
//!
//! *   [`MobilitySupport`]: what a protocol handler may ask of its node.
//! *   [`AgentModel`], [`StateProvider`], [`MobileAgent`]: what the protocol
//!     drives on an agent.
//! *   [`AgentContainer`]: where agents are hosted.
//! *   [`ControlStore`]: where control records are exchanged.
//! *   [`Transport`]: how nodes message each other.
//! *   [`MobilityObserver`]: who hears about moves.

// --- Public Re-exports ---
pub use agent_container::AgentContainer;
pub use agent_model::{AgentModel, MobileAgent, RunState, StateProvider};
pub use control_store::{ControlChange, ControlStore};
pub use mobility_observer::MobilityObserver;
pub use mobility_support::MobilitySupport;
pub use transport::Transport;

// --- Submodules ---

/// Defines [`AgentContainer`].
mod agent_container;
/// Defines [`AgentModel`], [`StateProvider`] and [`MobileAgent`].
mod agent_model;
/// Defines [`ControlStore`] and [`ControlChange`].
mod control_store;
/// Defines [`MobilityObserver`].
mod mobility_observer;
/// Defines [`MobilitySupport`].
mod mobility_support;
/// Defines [`Transport`].
mod transport;
