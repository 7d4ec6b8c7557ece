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

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::{debug, trace};

use crate::common::{AgentDescription, AgentState, LocalMoveState, MobilityError};
use crate::control::{ControlRecord, ControlUid};
use crate::message::MessageAddress;
use crate::traits::MobileAgent;

/// The mobility action an agent is currently part of on a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum PendingAction {
    /// Idle.
    #[default]
    None,
    /// Being created.
    Add,
    /// Being removed.
    Remove,
    /// Leaving this node; waiting for the destination's reply.
    MoveDepart,
    /// Arriving on this node.
    MoveArrival,
    /// The destination replied; the move is being finalised.
    MoveConfirm,
}

impl fmt::Display for PendingAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let action = match self {
            PendingAction::None => "none",
            PendingAction::Add => "add",
            PendingAction::Remove => "remove",
            PendingAction::MoveDepart => "move-depart",
            PendingAction::MoveArrival => "move-arrival",
            PendingAction::MoveConfirm => "move-confirm",
        };
        f.write_str(action)
    }
}

#[derive(Debug, Default)]
struct AgentEntry {
    description: Option<AgentDescription>,
    agent: Option<Arc<dyn MobileAgent>>,
    pending: PendingAction,
    control: Option<Arc<ControlRecord>>,
    holder: LocalMoveState,
}

impl AgentEntry {
    fn is_registered(&self) -> bool {
        self.agent.is_some()
    }
}

/// An agent claimed for a departure.
#[derive(Debug, Clone)]
pub(crate) struct Departure {
    pub(crate) agent: Arc<dyn MobileAgent>,
    pub(crate) description: AgentDescription,
    pub(crate) holder: LocalMoveState,
}

/// An agent claimed for finalising a move after the destination replied.
#[derive(Debug, Clone)]
pub(crate) struct Confirmation {
    pub(crate) agent: Arc<dyn MobileAgent>,
    pub(crate) control: Arc<ControlRecord>,
}

/// Bookkeeping of the agents hosted on a node and the mobility action each
/// one is part of. At most one action runs per agent.
#[derive(Debug, Default)]
pub(crate) struct AgentRegistry {
    node: MessageAddress,
    entries: Mutex<HashMap<MessageAddress, AgentEntry>>,
}

impl AgentRegistry {
    pub(crate) fn new(node: MessageAddress) -> Self {
        Self {
            node,
            entries: Mutex::default(),
        }
    }

    fn busy(&self, agent: &MessageAddress) -> MobilityError {
        MobilityError::AgentBusy {
            agent: agent.clone(),
            node: self.node.clone(),
        }
    }

    fn not_registered(&self, agent: &MessageAddress) -> MobilityError {
        MobilityError::AgentNotRegistered {
            agent: agent.clone(),
            node: self.node.clone(),
        }
    }

    /// Records a live agent instance.
    pub(crate) fn register(
        &self,
        agent: Arc<dyn MobileAgent>,
        description: AgentDescription,
    ) -> Result<(), MobilityError> {
        let address = agent.address().clone();
        let mut entries = self.entries.lock();
        let entry = entries.entry(address.clone()).or_default();
        if entry.is_registered() {
            return Err(MobilityError::AlreadyExists {
                agent: address,
                node: self.node.clone(),
            });
        }
        debug!(agent = %address, "Registered agent");
        entry.agent = Some(agent);
        entry.description = Some(description);
        Ok(())
    }

    /// Forgets an agent instance. The entry survives while an action is
    /// still pending for it.
    pub(crate) fn unregister(&self, agent: &MessageAddress) {
        let mut entries = self.entries.lock();
        let Some(entry) = entries.get_mut(agent) else {
            return;
        };
        debug!(agent = %agent, "Unregistered agent");
        entry.agent = None;
        if entry.pending == PendingAction::None {
            entries.remove(agent);
        }
    }

    pub(crate) fn is_registered(&self, agent: &MessageAddress) -> bool {
        self.entries
            .lock()
            .get(agent)
            .is_some_and(AgentEntry::is_registered)
    }

    pub(crate) fn pending(&self, agent: &MessageAddress) -> Option<PendingAction> {
        self.entries.lock().get(agent).map(|entry| entry.pending)
    }

    /// The state holder of an agent, created on demand.
    pub(crate) fn holder(&self, agent: &MessageAddress) -> LocalMoveState {
        self.entries
            .lock()
            .entry(agent.clone())
            .or_default()
            .holder
            .clone()
    }

    /// Claims an idle, registered agent for an add or remove.
    pub(crate) fn claim(
        &self,
        agent: &MessageAddress,
        action: PendingAction,
    ) -> Result<(), MobilityError> {
        let mut entries = self.entries.lock();
        let entry = entries.entry(agent.clone()).or_default();
        if entry.pending != PendingAction::None {
            return Err(self.busy(agent));
        }
        trace!(agent = %agent, %action, "Claimed agent");
        entry.pending = action;
        Ok(())
    }

    /// Claims a registered, idle agent for leaving this node.
    ///
    /// With `mark` unset the agent is only checked, not claimed, so a move
    /// that does nothing never blocks other actions.
    pub(crate) fn claim_departure(
        &self,
        agent: &MessageAddress,
        control: &Arc<ControlRecord>,
        mark: bool,
    ) -> Result<Departure, MobilityError> {
        let mut entries = self.entries.lock();
        let Some(entry) = entries.get_mut(agent) else {
            return Err(self.not_registered(agent));
        };
        if entry.pending != PendingAction::None {
            return Err(self.busy(agent));
        }
        let (Some(instance), Some(description)) = (&entry.agent, &entry.description) else {
            return Err(self.not_registered(agent));
        };
        let departure = Departure {
            agent: Arc::clone(instance),
            description: description.clone(),
            holder: entry.holder.clone(),
        };
        if mark {
            trace!(agent = %agent, uid = %control.uid(), "Claimed agent for departure");
            entry.pending = PendingAction::MoveDepart;
            entry.control = Some(Arc::clone(control));
        }
        Ok(departure)
    }

    /// Claims an agent name for an arriving transfer and stores its state.
    pub(crate) fn claim_arrival(
        &self,
        agent: &MessageAddress,
        state: Option<AgentState>,
    ) -> Result<(), MobilityError> {
        let mut entries = self.entries.lock();
        let entry = entries.entry(agent.clone()).or_default();
        if entry.pending != PendingAction::None {
            return Err(self.busy(agent));
        }
        if entry.is_registered() {
            return Err(MobilityError::AlreadyExists {
                agent: agent.clone(),
                node: self.node.clone(),
            });
        }
        trace!(agent = %agent, "Claimed agent for arrival");
        entry.pending = PendingAction::MoveArrival;
        if let Some(state) = state {
            entry.holder.set(state);
        }
        Ok(())
    }

    /// Claims a departed agent for finalising its move.
    ///
    /// The reply must belong to the move the agent departed with.
    pub(crate) fn claim_confirmation(
        &self,
        agent: &MessageAddress,
        uid: &ControlUid,
    ) -> Result<Confirmation, MobilityError> {
        let mut entries = self.entries.lock();
        let Some(entry) = entries.get_mut(agent) else {
            return Err(self.not_registered(agent));
        };
        let (PendingAction::MoveDepart, Some(control), Some(instance)) =
            (entry.pending, &entry.control, &entry.agent)
        else {
            return Err(MobilityError::TicketMismatch(format!(
                "agent {} is not departing from node {} (pending {})",
                agent, self.node, entry.pending
            )));
        };
        if control.uid() != uid {
            return Err(MobilityError::TicketMismatch(format!(
                "reply for move {} but agent {} departs with move {}",
                uid,
                agent,
                control.uid()
            )));
        }
        let confirmation = Confirmation {
            agent: Arc::clone(instance),
            control: Arc::clone(control),
        };
        entry.pending = PendingAction::MoveConfirm;
        Ok(confirmation)
    }

    /// Ends the action pending for an agent.
    pub(crate) fn release(&self, agent: &MessageAddress) {
        let mut entries = self.entries.lock();
        let Some(entry) = entries.get_mut(agent) else {
            return;
        };
        trace!(agent = %agent, action = %entry.pending, "Released agent");
        entry.pending = PendingAction::None;
        entry.control = None;
        if !entry.is_registered() {
            entries.remove(agent);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::HostedAgent;
    use crate::ticket::MoveTicket;

    fn registry_with(agent: &str) -> AgentRegistry {
        let registry = AgentRegistry::new(MessageAddress::new("n1"));
        registry
            .register(Arc::new(HostedAgent::new(agent, None)), AgentDescription::new(agent))
            .unwrap();
        registry
    }

    fn move_record() -> Arc<ControlRecord> {
        let ticket = MoveTicket::builder().agent("a1").destination("n2").build().unwrap();
        Arc::new(ControlRecord::create(None, "n1", None, ticket))
    }

    #[test]
    fn test_second_departure_is_busy() {
        let registry = registry_with("a1");
        let agent = MessageAddress::new("a1");
        registry.claim_departure(&agent, &move_record(), true).unwrap();
        assert!(matches!(
            registry.claim_departure(&agent, &move_record(), true),
            Err(MobilityError::AgentBusy { .. })
        ));
    }

    #[test]
    fn test_unmarked_departure_does_not_claim() {
        let registry = registry_with("a1");
        let agent = MessageAddress::new("a1");
        registry.claim_departure(&agent, &move_record(), false).unwrap();
        assert_eq!(registry.pending(&agent), Some(PendingAction::None));
    }

    #[test]
    fn test_unknown_agent_cannot_depart() {
        let registry = registry_with("a1");
        assert!(matches!(
            registry.claim_departure(&MessageAddress::new("ghost"), &move_record(), true),
            Err(MobilityError::AgentNotRegistered { .. })
        ));
    }

    #[test]
    fn test_arrival_of_hosted_agent_already_exists() {
        let registry = registry_with("a1");
        assert!(matches!(
            registry.claim_arrival(&MessageAddress::new("a1"), None),
            Err(MobilityError::AlreadyExists { .. })
        ));
    }

    #[test]
    fn test_confirmation_requires_departure() {
        let registry = registry_with("a1");
        let agent = MessageAddress::new("a1");
        let record = move_record();
        assert!(registry.claim_confirmation(&agent, record.uid()).is_err());
        registry.claim_departure(&agent, &record, true).unwrap();
        assert!(registry
            .claim_confirmation(&agent, &ControlUid::generate())
            .is_err());
        let confirmation = registry.claim_confirmation(&agent, record.uid()).unwrap();
        assert_eq!(confirmation.control.uid(), record.uid());
        assert_eq!(registry.pending(&agent), Some(PendingAction::MoveConfirm));
    }

    #[test]
    fn test_release_drops_unregistered_entry() {
        let registry = registry_with("a1");
        let agent = MessageAddress::new("a1");
        registry.claim_departure(&agent, &move_record(), true).unwrap();
        registry.unregister(&agent);
        assert_eq!(registry.pending(&agent), Some(PendingAction::MoveDepart));
        registry.release(&agent);
        assert_eq!(registry.pending(&agent), None);
    }
}
