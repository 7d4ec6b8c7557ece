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

//! Addresses and node-to-node messages.
//!
//! *   [`MessageAddress`]: The serialisable name of an agent or node.
//! *   [`Envelope`] and [`MobilityMessage`]: Transfer, acknowledgement and
//!     negative acknowledgement exchanged between an origin and a destination.
//! *   [`MessageError`]: Delivery failures reported by a transport.

// --- Public Re-exports ---
pub use envelope::{Envelope, MobilityMessage};
pub use message_address::MessageAddress;
pub use message_error::MessageError;

// --- Submodules ---

/// Defines [`Envelope`] and [`MobilityMessage`].
mod envelope;
/// Defines [`MessageAddress`].
mod message_address;
/// Defines [`MessageError`].
mod message_error;
