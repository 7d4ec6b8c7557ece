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

use async_trait::async_trait;
use dashmap::DashMap;
use parking_lot::{Mutex, RwLock};
use tracing::{debug, info, instrument};

use crate::common::{AgentDescription, AgentState, LifecyclePhase, MobilityError};
use crate::message::MessageAddress;
use crate::traits::{AgentContainer, AgentModel, MobileAgent, RunState, StateProvider};

/// A plain in-process agent: a lifecycle state machine plus an optional
/// state snapshot it reports when captured.
#[derive(Debug)]
pub struct HostedAgent {
    address: MessageAddress,
    run_state: Mutex<RunState>,
    state: RwLock<Option<AgentState>>,
}

impl HostedAgent {
    /// Creates a running agent, seeded with `state` when present.
    pub fn new(address: impl Into<MessageAddress>, state: Option<AgentState>) -> Self {
        Self {
            address: address.into(),
            run_state: Mutex::new(RunState::Running),
            state: RwLock::new(state),
        }
    }

    /// The agent's current application state.
    pub fn state(&self) -> Option<AgentState> {
        self.state.read().clone()
    }

    /// Replaces the agent's application state.
    pub fn set_state(&self, state: AgentState) {
        *self.state.write() = Some(state);
    }

    fn transition(
        &self,
        phase: LifecyclePhase,
        from: RunState,
        to: RunState,
    ) -> Result<(), MobilityError> {
        let mut run_state = self.run_state.lock();
        if *run_state != from {
            return Err(MobilityError::AgentLifecycle {
                agent: self.address.clone(),
                phase,
                reason: format!("agent is {}, expected {}", *run_state, from),
            });
        }
        *run_state = to;
        Ok(())
    }
}

impl AgentModel for HostedAgent {
    fn address(&self) -> &MessageAddress {
        &self.address
    }

    fn run_state(&self) -> RunState {
        *self.run_state.lock()
    }

    fn suspend(&self) -> Result<(), MobilityError> {
        self.transition(LifecyclePhase::Suspend, RunState::Running, RunState::Suspended)
    }

    fn resume(&self) -> Result<(), MobilityError> {
        self.transition(LifecyclePhase::Resume, RunState::Suspended, RunState::Running)
    }

    fn stop(&self) -> Result<(), MobilityError> {
        self.transition(LifecyclePhase::Stop, RunState::Suspended, RunState::Stopped)
    }

    fn unload(&self) -> Result<(), MobilityError> {
        self.transition(LifecyclePhase::Unload, RunState::Stopped, RunState::Unloaded)
    }
}

impl StateProvider for HostedAgent {
    fn capture_state(&self) -> Result<AgentState, MobilityError> {
        self.state().ok_or_else(|| MobilityError::StateCaptureFailure {
            agent: self.address.clone(),
            reason: "agent holds no state".to_string(),
        })
    }
}

impl MobileAgent for HostedAgent {
    fn state_provider(&self) -> Option<&dyn StateProvider> {
        self.state.read().is_some().then_some(self as &dyn StateProvider)
    }
}

/// Builds agent instances from a description and optional state.
pub type AgentFactory = Arc<
    dyn Fn(&AgentDescription, Option<AgentState>) -> Result<Arc<dyn MobileAgent>, MobilityError>
        + Send
        + Sync,
>;

/// An in-memory [`AgentContainer`].
///
/// Agents are built by a pluggable factory; the default one builds
/// [`HostedAgent`]s.
#[derive(Clone)]
pub struct LocalContainer {
    node: MessageAddress,
    agents: Arc<DashMap<MessageAddress, Arc<dyn MobileAgent>>>,
    factory: AgentFactory,
}

impl LocalContainer {
    /// Creates an empty container that builds [`HostedAgent`]s.
    pub fn new(node: impl Into<MessageAddress>) -> Self {
        Self::with_factory(
            node,
            Arc::new(|description: &AgentDescription, state: Option<AgentState>| {
                let agent: Arc<dyn MobileAgent> =
                    Arc::new(HostedAgent::new(description.agent.clone(), state));
                Ok(agent)
            }),
        )
    }

    /// Creates an empty container that builds agents with `factory`.
    pub fn with_factory(node: impl Into<MessageAddress>, factory: AgentFactory) -> Self {
        Self {
            node: node.into(),
            agents: Arc::default(),
            factory,
        }
    }

    /// Names of all hosted agents.
    pub fn agents(&self) -> Vec<MessageAddress> {
        self.agents.iter().map(|entry| entry.key().clone()).collect()
    }

    fn shut_down(agent: &dyn MobileAgent) -> Result<(), MobilityError> {
        loop {
            match agent.run_state() {
                RunState::Running => agent.suspend()?,
                RunState::Suspended => agent.stop()?,
                RunState::Stopped => agent.unload()?,
                RunState::Unloaded => return Ok(()),
            }
        }
    }
}

impl fmt::Debug for LocalContainer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LocalContainer")
            .field("node", &self.node)
            .field("agents", &self.agents.len())
            .finish()
    }
}

#[async_trait]
impl AgentContainer for LocalContainer {
    #[instrument(skip(self, description, state), fields(node = %self.node, agent = %description.agent))]
    async fn add_agent(
        &self,
        description: &AgentDescription,
        state: Option<AgentState>,
    ) -> Result<Arc<dyn MobileAgent>, MobilityError> {
        use dashmap::mapref::entry::Entry;

        match self.agents.entry(description.agent.clone()) {
            Entry::Occupied(_) => Err(MobilityError::AlreadyExists {
                agent: description.agent.clone(),
                node: self.node.clone(),
            }),
            Entry::Vacant(slot) => {
                let agent = (self.factory)(description, state)?;
                slot.insert(Arc::clone(&agent));
                info!(description = %description, "Agent created");
                Ok(agent)
            }
        }
    }

    #[instrument(skip(self), fields(node = %self.node))]
    async fn remove_agent(&self, agent: &MessageAddress) -> Result<(), MobilityError> {
        let Some((_, instance)) = self.agents.remove(agent) else {
            return Err(MobilityError::DoesNotExist {
                agent: agent.clone(),
                node: self.node.clone(),
            });
        };
        if instance.run_state() != RunState::Unloaded {
            debug!("Shutting down agent before removal");
            Self::shut_down(instance.as_ref())?;
        }
        info!("Agent removed");
        Ok(())
    }

    fn get(&self, agent: &MessageAddress) -> Option<Arc<dyn MobileAgent>> {
        self.agents.get(agent).map(|entry| Arc::clone(entry.value()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lifecycle_follows_suspend_stop_unload() {
        let agent = HostedAgent::new("a1", None);
        assert!(agent.stop().is_err());
        agent.suspend().unwrap();
        agent.resume().unwrap();
        agent.suspend().unwrap();
        agent.stop().unwrap();
        agent.unload().unwrap();
        assert_eq!(agent.run_state(), RunState::Unloaded);
        assert!(agent.resume().is_err());
    }

    #[test]
    fn test_agent_without_state_has_no_provider() {
        let agent = HostedAgent::new("a1", None);
        assert!(agent.state_provider().is_none());
        agent.set_state(AgentState::from_value(serde_json::json!({"n": 1})));
        assert!(agent.state_provider().is_some());
    }

    #[tokio::test]
    async fn test_container_rejects_duplicates_and_unknown_removals() {
        let container = LocalContainer::new("n1");
        let description = AgentDescription::new("a1");
        container.add_agent(&description, None).await.unwrap();
        assert!(matches!(
            container.add_agent(&description, None).await,
            Err(MobilityError::AlreadyExists { .. })
        ));
        assert!(matches!(
            container.remove_agent(&MessageAddress::new("ghost")).await,
            Err(MobilityError::DoesNotExist { .. })
        ));
    }

    #[tokio::test]
    async fn test_removal_shuts_running_agent_down() {
        let container = LocalContainer::new("n1");
        let agent = container
            .add_agent(&AgentDescription::new("a1"), None)
            .await
            .unwrap();
        container.remove_agent(agent.address()).await.unwrap();
        assert_eq!(agent.run_state(), RunState::Unloaded);
        assert!(!container.contains(agent.address()));
    }
}
