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

use std::sync::Arc;

use async_trait::async_trait;
use dashmap::DashMap;
use tokio::sync::mpsc;
use tracing::{instrument, trace, warn};

use crate::common::CONFIG;
use crate::message::{Envelope, MessageAddress, MessageError};
use crate::traits::Transport;

/// An in-memory [`Transport`] connecting the nodes of one process.
///
/// Each connected node owns the receiving end of a bounded channel; sending
/// to a node that is not connected fails with [`MessageError::NoRoute`].
#[derive(Debug, Clone, Default)]
pub struct Switchboard {
    routes: Arc<DashMap<MessageAddress, mpsc::Sender<Envelope>>>,
}

impl Switchboard {
    /// Creates a switchboard with no nodes connected.
    pub fn new() -> Self {
        Self::default()
    }

    /// Connects `node` and returns its inbox. Reconnecting replaces the
    /// previous inbox.
    pub fn connect(&self, node: impl Into<MessageAddress>) -> mpsc::Receiver<Envelope> {
        let (sender, receiver) = mpsc::channel(CONFIG.limits.node_inbox_capacity);
        self.routes.insert(node.into(), sender);
        receiver
    }

    /// Disconnects `node`. Returns `false` if it was not connected.
    pub fn disconnect(&self, node: &MessageAddress) -> bool {
        self.routes.remove(node).is_some()
    }

    /// Whether `node` is connected.
    pub fn is_connected(&self, node: &MessageAddress) -> bool {
        self.routes.contains_key(node)
    }
}

#[async_trait]
impl Transport for Switchboard {
    #[instrument(skip(self, envelope), fields(from = %envelope.sender, to = %envelope.recipient, kind = envelope.message.kind()))]
    async fn send(&self, envelope: Envelope) -> Result<(), MessageError> {
        let Some(route) = self
            .routes
            .get(&envelope.recipient)
            .map(|entry| entry.value().clone())
        else {
            warn!("No route to recipient");
            return Err(MessageError::NoRoute(envelope.recipient));
        };
        route.send(envelope).await?;
        trace!("Envelope delivered");
        Ok(())
    }
}
