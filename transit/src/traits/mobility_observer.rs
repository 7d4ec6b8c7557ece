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

use std::fmt::Debug;

use crate::common::MobilityError;
use crate::message::MessageAddress;
use crate::ticket::MoveTicket;

/// Receives the lifecycle notifications of moves handled by a node.
///
/// All methods default to doing nothing.
pub trait MobilityObserver: Send + Sync + Debug {
    /// A move of `agent` started.
    fn on_dispatch(&self, _agent: &MessageAddress, _ticket: &MoveTicket) {}

    /// `agent` arrived at its destination.
    fn on_arrival(&self, _agent: &MessageAddress, _ticket: &MoveTicket) {}

    /// The move of `agent` failed.
    fn on_failure(&self, _agent: &MessageAddress, _ticket: &MoveTicket, _error: &MobilityError) {}

    /// The local instance of `agent` was removed.
    fn on_removal(&self, _agent: &MessageAddress, _ticket: &MoveTicket) {}
}
