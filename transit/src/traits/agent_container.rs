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
use std::sync::Arc;

use async_trait::async_trait;

use crate::common::{AgentDescription, AgentState, MobilityError};
use crate::message::MessageAddress;
use crate::traits::MobileAgent;

/// Hosts agent instances on a node.
#[async_trait]
pub trait AgentContainer: Send + Sync + Debug {
    /// Creates and starts an agent, seeded with `state` when present.
    ///
    /// Fails with [`MobilityError::AlreadyExists`] when the name is taken.
    async fn add_agent(
        &self,
        description: &AgentDescription,
        state: Option<AgentState>,
    ) -> Result<Arc<dyn MobileAgent>, MobilityError>;

    /// Deletes an agent, shutting it down first if it still runs.
    ///
    /// Fails with [`MobilityError::DoesNotExist`] for unknown agents.
    async fn remove_agent(&self, agent: &MessageAddress) -> Result<(), MobilityError>;

    /// Looks up a hosted agent.
    fn get(&self, agent: &MessageAddress) -> Option<Arc<dyn MobileAgent>>;

    /// Whether an agent is hosted under that name.
    fn contains(&self, agent: &MessageAddress) -> bool {
        self.get(agent).is_some()
    }
}
