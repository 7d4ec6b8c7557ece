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

use std::fmt::{self, Debug};

use crate::common::{AgentState, MobilityError};
use crate::message::MessageAddress;

/// Where an agent is in its lifecycle.
///
/// `Running -> Suspended -> Stopped -> Unloaded`, with `Suspended -> Running`
/// as the recovery edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum RunState {
    /// Processing work.
    #[default]
    Running,
    /// Paused; its state can be captured safely.
    Suspended,
    /// Halted, resources still held.
    Stopped,
    /// Resources released; the instance is finished.
    Unloaded,
}

impl fmt::Display for RunState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = match self {
            RunState::Running => "running",
            RunState::Suspended => "suspended",
            RunState::Stopped => "stopped",
            RunState::Unloaded => "unloaded",
        };
        f.write_str(state)
    }
}

/// The lifecycle operations the protocol drives on an agent.
///
/// Each operation is invoked at most once per move, possibly from a
/// different task than the previous one.
pub trait AgentModel: Send + Sync + Debug {
    /// The agent's address.
    fn address(&self) -> &MessageAddress;

    /// The current lifecycle state.
    fn run_state(&self) -> RunState;

    /// Stops the agent from taking new work.
    fn suspend(&self) -> Result<(), MobilityError>;

    /// Lets a suspended agent run again.
    fn resume(&self) -> Result<(), MobilityError>;

    /// Halts a suspended agent.
    fn stop(&self) -> Result<(), MobilityError>;

    /// Releases a stopped agent's resources.
    fn unload(&self) -> Result<(), MobilityError>;
}

/// Produces a snapshot of an agent's application state.
pub trait StateProvider: Send + Sync {
    /// Captures the current state. Called once per move, after suspension.
    fn capture_state(&self) -> Result<AgentState, MobilityError>;
}

/// An agent that can be moved.
pub trait MobileAgent: AgentModel {
    /// The agent's state provider, if it has state worth carrying.
    fn state_provider(&self) -> Option<&dyn StateProvider>;

    /// Informs the agent that it is about to move.
    fn on_dispatch(&self, _destination: Option<&MessageAddress>) {}
}
