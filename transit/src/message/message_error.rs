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

use crate::message::MessageAddress;

/// Represents errors that can occur when handing an envelope to a transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MessageError {
    /// No node is connected under the recipient address.
    NoRoute(MessageAddress),
    /// The recipient is known but delivery failed.
    SendFailed(String),
}

impl std::fmt::Display for MessageError {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            MessageError::NoRoute(node) => write!(f, "No route to node {}", node),
            MessageError::SendFailed(msg) => write!(f, "Failed to send message: {}", msg),
        }
    }
}

impl std::error::Error for MessageError {}

/// Converts a `SendError` from Tokio's MPSC channel to a `MessageError`.
impl<T> From<tokio::sync::mpsc::error::SendError<T>> for MessageError {
    fn from(_: tokio::sync::mpsc::error::SendError<T>) -> Self {
        MessageError::SendFailed("Channel closed".into())
    }
}
