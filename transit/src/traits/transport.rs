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

use async_trait::async_trait;

use crate::message::{Envelope, MessageError};

/// Point-to-point delivery of protocol messages between nodes.
///
/// Delivery is at most once. A successful send means the envelope was
/// handed to the recipient's inbox, not that it was processed.
#[async_trait]
pub trait Transport: Send + Sync + Debug {
    /// Delivers an envelope to its recipient node.
    async fn send(&self, envelope: Envelope) -> Result<(), MessageError>;
}
