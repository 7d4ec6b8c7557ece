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

use derive_new::new;
use transit_macro::mobility_message;

use crate::common::{AgentDescription, AgentState};
use crate::control::ControlUid;
use crate::message::MessageAddress;
use crate::ticket::MoveTicket;

/// What the origin ships to the destination during a remote move: the
/// original move ticket, where the agent comes from, how to rebuild it, and
/// the state captured after it was suspended.
#[mobility_message]
#[derive(new, PartialEq)]
pub struct TransferTicket {
    /// The move being carried out, with its agent resolved.
    pub move_ticket: MoveTicket,
    /// The agent being moved.
    pub agent: MessageAddress,
    /// The node it leaves.
    pub origin: MessageAddress,
    /// The node it goes to.
    pub destination: MessageAddress,
    /// How the destination rebuilds it.
    pub description: AgentDescription,
    /// State captured on the origin, if the agent provides any.
    pub state: Option<AgentState>,
    /// Uid of the move control record on the origin.
    pub move_control: ControlUid,
}

impl TransferTicket {
    /// Takes the carried state out, so it is consumed exactly once.
    pub fn take_state(&mut self) -> Option<AgentState> {
        self.state.take()
    }
}

impl fmt::Display for TransferTicket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Transfer of agent \"{}\" from node \"{}\" to node \"{}\" ({} state)",
            self.agent,
            self.origin,
            self.destination,
            if self.state.is_some() { "with" } else { "without" }
        )
    }
}
