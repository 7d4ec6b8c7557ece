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
use std::sync::Arc;

use parking_lot::Mutex;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::common::CodecError;
use crate::message::MessageAddress;

/// Name of the factory used when an add request does not name one.
pub const DEFAULT_AGENT_FACTORY: &str = "hosted";

/// An opaque, serialisable snapshot of an agent's application state.
///
/// The snapshot is stored as a self-describing value so a node can carry it
/// without knowing the agent's concrete state type. Agents turn their own
/// state into a snapshot with [`AgentState::capture`] and back with
/// [`AgentState::restore`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AgentState(serde_json::Value);

impl AgentState {
    /// Snapshots any serialisable value.
    pub fn capture<T: Serialize>(value: &T) -> Result<Self, CodecError> {
        serde_json::to_value(value)
            .map(Self)
            .map_err(|e| CodecError::new("capture", e.to_string()))
    }

    /// Rebuilds a typed value from the snapshot.
    pub fn restore<T: DeserializeOwned>(&self) -> Result<T, CodecError> {
        T::deserialize(&self.0).map_err(|e| CodecError::new("restore", e.to_string()))
    }

    /// Wraps an already self-describing value.
    pub fn from_value(value: serde_json::Value) -> Self {
        Self(value)
    }

    /// Borrows the underlying value.
    pub fn as_value(&self) -> &serde_json::Value {
        &self.0
    }
}

impl fmt::Display for AgentState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Everything a container needs to create an agent: its name, which factory
/// builds it, and the arguments that factory takes.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AgentDescription {
    /// Address the agent is registered under.
    pub agent: MessageAddress,
    /// Name of the factory that builds the agent.
    pub factory: String,
    /// Factory arguments.
    pub arguments: Vec<String>,
}

impl AgentDescription {
    /// Describes an agent built by the default factory with no arguments.
    pub fn new(agent: impl Into<MessageAddress>) -> Self {
        Self {
            agent: agent.into(),
            factory: DEFAULT_AGENT_FACTORY.to_string(),
            arguments: Vec::new(),
        }
    }

    /// Names the factory that builds the agent.
    pub fn with_factory(mut self, factory: impl Into<String>) -> Self {
        self.factory = factory.into();
        self
    }

    /// Appends a factory argument.
    pub fn with_argument(mut self, argument: impl Into<String>) -> Self {
        self.arguments.push(argument.into());
        self
    }
}

impl fmt::Display for AgentDescription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}", self.agent, self.factory)?;
        for argument in &self.arguments {
            write!(f, " {}", argument)?;
        }
        f.write_str(")")
    }
}

/// A single-slot hand-off cell for state that must survive an agent being
/// re-created on the same node, or that arrived with a transfer before the
/// agent exists.
///
/// Cloning the holder shares the slot.
#[derive(Clone, Debug, Default)]
pub struct LocalMoveState(Arc<Mutex<Option<AgentState>>>);

impl LocalMoveState {
    /// Stores a snapshot, replacing anything already held.
    pub fn set(&self, state: AgentState) {
        *self.0.lock() = Some(state);
    }

    /// Takes the snapshot out, leaving the slot empty.
    pub fn take(&self) -> Option<AgentState> {
        self.0.lock().take()
    }

    /// Returns `true` when nothing is held.
    pub fn is_empty(&self) -> bool {
        self.0.lock().is_none()
    }
}
