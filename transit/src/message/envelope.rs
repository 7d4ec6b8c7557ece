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

use derive_new::new;
use transit_macro::mobility_message;

use crate::common::FailureDetail;
use crate::control::ControlUid;
use crate::message::MessageAddress;
use crate::ticket::TransferTicket;

/// The node-to-node messages of the relocation protocol.
#[mobility_message]
#[derive(PartialEq)]
pub enum MobilityMessage {
    /// Origin to destination: the agent, its description and captured state.
    Transfer(TransferTicket),
    /// Destination to origin: the agent was re-created and is running.
    Ack {
        /// The agent that arrived.
        agent: MessageAddress,
        /// Uid of the move control record on the origin.
        move_control: ControlUid,
    },
    /// Destination to origin: re-creation failed, the origin keeps the agent.
    Nack {
        /// The agent that could not be re-created.
        agent: MessageAddress,
        /// Uid of the move control record on the origin.
        move_control: ControlUid,
        /// Why the destination refused the agent.
        failure: FailureDetail,
    },
}

impl MobilityMessage {
    /// Short name used in log output.
    pub fn kind(&self) -> &'static str {
        match self {
            MobilityMessage::Transfer(_) => "transfer",
            MobilityMessage::Ack { .. } => "ack",
            MobilityMessage::Nack { .. } => "nack",
        }
    }
}

/// A [`MobilityMessage`] addressed from one node to another.
#[mobility_message]
#[derive(new, PartialEq)]
pub struct Envelope {
    /// The node that sent the message.
    pub sender: MessageAddress,
    /// The node the message is for.
    pub recipient: MessageAddress,
    /// The protocol message itself.
    pub message: MobilityMessage,
}
