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

use anyhow::anyhow;
use dashmap::DashMap;
use derive_new::new;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;
use tracing::{debug, error, info, info_span, instrument, trace, warn, Instrument};

use crate::common::{
    AgentDescription, AgentState, FailureDetail, MobilityError, StateCodec, CONFIG,
};
use crate::control::{ControlRecord, ControlUid, StatusCode};
use crate::message::{Envelope, MessageAddress, MobilityMessage};
use crate::node::node_support::NodeSupport;
use crate::node::registry::AgentRegistry;
use crate::node::{MobilityService, PendingAction};
use crate::protocol::{Outcome, ProtocolEvent};
use crate::ticket::{AddTicket, MoveTicket, RemoveTicket, Ticket, TransferTicket};
use crate::traits::{
    AgentContainer, ControlChange, ControlStore, MobileAgent, MobilityObserver, Transport,
};

/// The collaborators a node is built on.
#[derive(new, Clone, Debug)]
pub struct NodeServices {
    /// This node's view of the control record store.
    pub store: Arc<dyn ControlStore>,
    /// How this node reaches other nodes.
    pub transport: Arc<dyn Transport>,
    /// Where this node hosts its agents.
    pub container: Arc<dyn AgentContainer>,
}

pub(crate) struct NodeInner {
    pub(crate) address: MessageAddress,
    pub(crate) registry: AgentRegistry,
    pub(crate) store: Arc<dyn ControlStore>,
    pub(crate) transport: Arc<dyn Transport>,
    pub(crate) container: Arc<dyn AgentContainer>,
    pub(crate) codec: Arc<dyn StateCodec>,
    pub(crate) observers: Vec<Arc<dyn MobilityObserver>>,
    /// Move requests relayed here by other nodes, keyed by the incoming uid,
    /// with the request this node re-issued for each.
    redirects: DashMap<ControlUid, Arc<ControlRecord>>,
    tracker: TaskTracker,
    cancellation_token: CancellationToken,
}

impl fmt::Debug for NodeInner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MobilityNode")
            .field("address", &self.address)
            .field("codec", &self.codec.name())
            .field("observers", &self.observers.len())
            .field("redirects", &self.redirects.len())
            .field("tasks", &self.tracker.len())
            .finish()
    }
}

/// Configures and launches a [`MobilityNode`].
pub struct MobilityNodeBuilder {
    address: MessageAddress,
    services: NodeServices,
    codec: Option<Arc<dyn StateCodec>>,
    observers: Vec<Arc<dyn MobilityObserver>>,
}

impl MobilityNodeBuilder {
    /// Overrides the codec used by test moves. Defaults to the configured
    /// state format.
    pub fn codec(mut self, codec: Arc<dyn StateCodec>) -> Self {
        self.codec = Some(codec);
        self
    }

    /// Adds an observer of this node's moves.
    pub fn observer(mut self, observer: Arc<dyn MobilityObserver>) -> Self {
        self.observers.push(observer);
        self
    }

    /// Starts the node's event loop over `inbox`.
    ///
    /// Must be called from within a tokio runtime.
    pub fn launch(self, inbox: mpsc::Receiver<Envelope>) -> MobilityNode {
        let changes = self.services.store.subscribe();
        let inner = Arc::new(NodeInner {
            registry: AgentRegistry::new(self.address.clone()),
            address: self.address,
            store: self.services.store,
            transport: self.services.transport,
            container: self.services.container,
            codec: self
                .codec
                .unwrap_or_else(|| Arc::new(CONFIG.codec.state_format)),
            observers: self.observers,
            redirects: DashMap::new(),
            tracker: TaskTracker::new(),
            cancellation_token: CancellationToken::new(),
        });
        let span = info_span!("mobility_node", node = %inner.address);
        inner
            .tracker
            .spawn(Arc::clone(&inner).run(changes, inbox).instrument(span));
        info!(node = %inner.address, "Mobility node started");
        MobilityNode { inner }
    }
}

/// A node that hosts agents and carries out add, remove and move requests.
///
/// The node watches its control store for requests addressed to it and its
/// inbox for protocol messages from other nodes. Each protocol step runs as
/// its own task; the node keeps one mobility action per agent in flight and
/// completes the request's control record when the action ends.
///
/// ```rust,ignore
/// let blackboard = Blackboard::new();
/// let switchboard = Switchboard::new();
/// let node = MobilityNode::builder(
///     "n1",
///     NodeServices::new(
///         Arc::new(blackboard.view("n1")),
///         Arc::new(switchboard.clone()),
///         Arc::new(LocalContainer::new("n1")),
///     ),
/// )
/// .launch(switchboard.connect("n1"));
/// ```
#[derive(Debug, Clone)]
pub struct MobilityNode {
    inner: Arc<NodeInner>,
}

impl MobilityNode {
    /// Starts configuring a node.
    pub fn builder(address: impl Into<MessageAddress>, services: NodeServices) -> MobilityNodeBuilder {
        MobilityNodeBuilder {
            address: address.into(),
            services,
            codec: None,
            observers: Vec::new(),
        }
    }

    /// The node's address.
    pub fn address(&self) -> &MessageAddress {
        &self.inner.address
    }

    /// Creates an agent directly, bypassing the control store.
    #[instrument(skip(self, state), fields(node = %self.inner.address))]
    pub async fn spawn_agent(
        &self,
        description: AgentDescription,
        state: Option<AgentState>,
    ) -> Result<Arc<dyn MobileAgent>, MobilityError> {
        let agent = self.inner.container.add_agent(&description, state).await?;
        self.inner.registry.register(Arc::clone(&agent), description)?;
        Ok(agent)
    }

    /// The hosted agent registered under `agent`.
    pub fn agent(&self, agent: &MessageAddress) -> Option<Arc<dyn MobileAgent>> {
        if self.inner.registry.is_registered(agent) {
            self.inner.container.get(agent)
        } else {
            None
        }
    }

    /// Whether `agent` is registered on this node.
    pub fn is_registered(&self, agent: &MessageAddress) -> bool {
        self.inner.registry.is_registered(agent)
    }

    /// The mobility action `agent` is part of, if the node knows the agent.
    pub fn pending_action(&self, agent: &MessageAddress) -> Option<PendingAction> {
        self.inner.registry.pending(agent)
    }

    /// A request facade bound to one agent.
    pub fn mobility_service(&self, agent: impl Into<MessageAddress>) -> MobilityService {
        MobilityService::new(self.clone(), agent.into())
    }

    /// Publishes a request.
    ///
    /// Add and remove requests go to their destination node, or to this node
    /// when none is named. Move requests go to the origin node the ticket
    /// names, which re-issues them on behalf of this request; without an
    /// origin this node carries the move out and must host the agent. The
    /// returned record completes when the request does and stays in the store
    /// until [`MobilityNode::withdraw`] is called.
    #[instrument(skip(self, ticket), fields(node = %self.inner.address))]
    pub async fn request(
        &self,
        owner: Option<ControlUid>,
        ticket: impl Into<Ticket>,
    ) -> Arc<ControlRecord> {
        let ticket = ticket.into();
        let target = match &ticket {
            Ticket::Add(_) | Ticket::Remove(_) => ticket.destination_node().cloned(),
            Ticket::Move(ticket) => ticket.origin_node().cloned(),
        };
        let record = Arc::new(ControlRecord::create(
            owner,
            self.inner.address.clone(),
            target,
            ticket,
        ));
        info!(uid = %record.uid(), ticket = %record.ticket(), "Publishing request");
        self.inner.store.publish_add(Arc::clone(&record)).await;
        record
    }

    /// Publishes a move request.
    pub async fn request_move(&self, ticket: MoveTicket) -> Arc<ControlRecord> {
        self.request(None, ticket).await
    }

    /// Publishes an add request.
    pub async fn request_add(&self, ticket: AddTicket) -> Arc<ControlRecord> {
        self.request(None, ticket).await
    }

    /// Publishes a remove request.
    pub async fn request_remove(&self, ticket: RemoveTicket) -> Arc<ControlRecord> {
        self.request(None, ticket).await
    }

    /// Withdraws a request from this node's view and from every view it was
    /// relayed to.
    #[instrument(skip(self, record), fields(node = %self.inner.address, uid = %record.uid()))]
    pub async fn withdraw(&self, record: &Arc<ControlRecord>) {
        debug!("Withdrawing request");
        self.inner.store.publish_remove(Arc::clone(record)).await;
    }

    /// Stops the event loop and waits for running protocol steps to finish.
    ///
    /// Moves waiting for a reply are not aborted; their agents stay
    /// suspended.
    #[instrument(skip(self), fields(node = %self.inner.address))]
    pub async fn shutdown(&self) -> anyhow::Result<()> {
        self.inner.cancellation_token.cancel();
        self.inner.tracker.close();
        let timeout = CONFIG.node_shutdown_timeout();
        tokio::time::timeout(timeout, self.inner.tracker.wait())
            .await
            .map_err(|_| {
                anyhow!(
                    "node {} did not finish its protocol steps within {:?}",
                    self.inner.address,
                    timeout
                )
            })?;
        info!("Mobility node stopped");
        Ok(())
    }
}

impl NodeInner {
    async fn run(
        self: Arc<Self>,
        mut changes: mpsc::Receiver<ControlChange>,
        mut inbox: mpsc::Receiver<Envelope>,
    ) {
        loop {
            tokio::select! {
                () = self.cancellation_token.cancelled() => {
                    trace!("Cancellation received, leaving event loop");
                    break;
                }
                Some(change) = changes.recv() => self.observe(change).await,
                Some(envelope) = inbox.recv() => self.receive(envelope),
                else => break,
            }
        }
    }

    async fn observe(self: &Arc<Self>, change: ControlChange) {
        match change {
            ControlChange::Added(record) => self.on_added(record).await,
            ControlChange::Changed(record) => {
                if record.is_source() {
                    debug!(uid = %record.uid(), status = %record.status(), "Request status changed");
                    if record.owner().is_some() && record.response().is_some() {
                        self.forward_response(record);
                    }
                }
            }
            ControlChange::Removed(record) => {
                trace!(uid = %record.uid(), "Request withdrawn");
                if let Some((_, redirected)) = self.redirects.remove(record.uid()) {
                    info!(incoming = %record.uid(), redirected = %redirected.uid(), "Withdrawing redirected move request");
                    let store = Arc::clone(&self.store);
                    self.tracker.spawn(async move { store.publish_remove(redirected).await });
                }
            }
        }
    }

    /// Whether a published add or remove is this node's to carry out.
    fn executes(&self, record: &ControlRecord, destination: Option<&MessageAddress>) -> bool {
        if record.is_source() {
            record.targets().is_empty() && destination.map_or(true, |dest| *dest == self.address)
        } else {
            true
        }
    }

    async fn on_added(self: &Arc<Self>, record: Arc<ControlRecord>) {
        match record.ticket().clone() {
            Ticket::Add(ticket) if self.executes(&record, ticket.destination_node()) => {
                self.run_add(record, ticket);
            }
            Ticket::Remove(ticket) if self.executes(&record, ticket.destination_node()) => {
                self.run_remove(record, ticket);
            }
            Ticket::Move(ticket) if !record.is_source() => self.redirect_move(record, ticket),
            Ticket::Move(ticket) if record.targets().is_empty() => self.dispatch_move(record, ticket),
            _ => trace!(uid = %record.uid(), "Request is not for this node"),
        }
    }

    fn run_add(self: &Arc<Self>, record: Arc<ControlRecord>, ticket: AddTicket) {
        let inner = Arc::clone(self);
        let span = info_span!("add", node = %self.address, agent = %ticket.mobile_agent());
        self.tracker.spawn(
            async move {
                let (code, failure) = match inner.add(&ticket).await {
                    Ok(()) => (StatusCode::Created, None),
                    Err(MobilityError::AlreadyExists { .. }) => {
                        error!("Agent already exists");
                        (StatusCode::AlreadyExists, None)
                    }
                    Err(e) => {
                        error!(error = %e, "Failed to add agent");
                        (StatusCode::Failure, Some(e.detail()))
                    }
                };
                inner.complete(record, code, failure).await;
            }
            .instrument(span),
        );
    }

    async fn add(&self, ticket: &AddTicket) -> Result<(), MobilityError> {
        let agent = ticket.mobile_agent();
        self.registry.claim(agent, PendingAction::Add)?;
        let result = async {
            let instance = self.container.add_agent(ticket.description(), None).await?;
            self.registry.register(instance, ticket.description().clone())
        }
        .await;
        self.registry.release(agent);
        result
    }

    fn run_remove(self: &Arc<Self>, record: Arc<ControlRecord>, ticket: RemoveTicket) {
        let inner = Arc::clone(self);
        let span = info_span!("remove", node = %self.address, agent = %ticket.mobile_agent());
        self.tracker.spawn(
            async move {
                let (code, failure) = match inner.remove(&ticket).await {
                    Ok(()) => (StatusCode::Removed, None),
                    Err(MobilityError::DoesNotExist { .. }) => {
                        error!("Agent does not exist");
                        (StatusCode::DoesNotExist, None)
                    }
                    Err(e) => {
                        error!(error = %e, "Failed to remove agent");
                        (StatusCode::Failure, Some(e.detail()))
                    }
                };
                inner.complete(record, code, failure).await;
            }
            .instrument(span),
        );
    }

    async fn remove(&self, ticket: &RemoveTicket) -> Result<(), MobilityError> {
        let agent = ticket.mobile_agent();
        self.registry.claim(agent, PendingAction::Remove)?;
        let result = self.container.remove_agent(agent).await;
        if result.is_ok() {
            self.registry.unregister(agent);
        }
        self.registry.release(agent);
        result
    }

    async fn complete(
        &self,
        record: Arc<ControlRecord>,
        code: StatusCode,
        failure: Option<FailureDetail>,
    ) {
        if let Err(e) = record.set_status(code, failure) {
            error!(uid = %record.uid(), error = %e, "Request completed twice");
            return;
        }
        info!(uid = %record.uid(), status = %record.status(), "Request completed");
        self.store.publish_change(record).await;
    }

    /// Re-issues a move relayed from another node as a request of this node,
    /// owned by the incoming record.
    fn redirect_move(self: &Arc<Self>, incoming: Arc<ControlRecord>, ticket: MoveTicket) {
        if self.redirects.contains_key(incoming.uid()) {
            warn!(uid = %incoming.uid(), "Move request already redirected");
            return;
        }
        let redirected = Arc::new(ControlRecord::create(
            Some(incoming.uid().clone()),
            self.address.clone(),
            None,
            ticket,
        ));
        info!(
            from = %incoming.source(),
            incoming = %incoming.uid(),
            redirected = %redirected.uid(),
            "Redirecting move request to this node"
        );
        self.redirects
            .insert(incoming.uid().clone(), Arc::clone(&redirected));
        let store = Arc::clone(&self.store);
        self.tracker
            .spawn(async move { store.publish_add(redirected).await });
    }

    /// Copies the final status of a redirected move into the request it was
    /// issued for, then withdraws the redirected record.
    fn forward_response(self: &Arc<Self>, redirected: Arc<ControlRecord>) {
        let (Some(owner), Some(response)) = (redirected.owner().cloned(), redirected.response())
        else {
            return;
        };
        if self
            .redirects
            .remove_if(&owner, |_, issued| issued.uid() == redirected.uid())
            .is_none()
        {
            trace!(uid = %redirected.uid(), "Owned request was not redirected by this node");
            return;
        }
        let inner = Arc::clone(self);
        self.tracker.spawn(async move {
            match inner.store.find(&owner) {
                Some(incoming) => match incoming.set_status(response.code, response.failure) {
                    Ok(()) => {
                        info!(uid = %incoming.uid(), status = %incoming.status(), "Redirected request completed");
                        inner.store.publish_change(incoming).await;
                    }
                    Err(e) => warn!(uid = %owner, error = %e, "Incoming request already completed"),
                },
                None => info!(uid = %owner, "Incoming request is no longer in the store"),
            }
            inner.store.publish_remove(redirected).await;
        });
    }

    /// Validates a move request and starts the matching dispatch.
    fn dispatch_move(self: &Arc<Self>, record: Arc<ControlRecord>, ticket: MoveTicket) {
        let Some(agent) = ticket
            .mobile_agent()
            .filter(|agent| **agent != self.address)
            .cloned()
        else {
            let error = MobilityError::TicketMismatch(format!(
                "move request {} targets node {}; nodes are not movable",
                record.uid(),
                self.address
            ));
            let agent = self.address.clone();
            return self.reject_move(record, agent, ticket, error);
        };

        let local = ticket.is_local_to(&self.address);
        let noop = local && !ticket.is_force_restart();
        let departure = match self.registry.claim_departure(&agent, &record, !noop) {
            Ok(departure) => departure,
            Err(e) => return self.reject_move(record, agent, ticket, e),
        };

        let event = if noop {
            ProtocolEvent::DispatchNoop
        } else if local {
            ProtocolEvent::DispatchTest {
                agent: departure.agent,
                description: departure.description,
                holder: departure.holder,
                codec: Arc::clone(&self.codec),
            }
        } else {
            ProtocolEvent::DispatchRemote {
                agent: departure.agent,
                description: departure.description,
            }
        };
        let support = NodeSupport::for_departure(Arc::clone(self), agent, ticket, record);
        self.queue(event, support, !noop);
    }

    /// Fails a move that never reached a handler.
    fn reject_move(
        self: &Arc<Self>,
        record: Arc<ControlRecord>,
        agent: MessageAddress,
        ticket: MoveTicket,
        error: MobilityError,
    ) {
        error!(uid = %record.uid(), %agent, %error, "Rejecting move request");
        for observer in &self.observers {
            observer.on_failure(&agent, &ticket, &error);
        }
        let inner = Arc::clone(self);
        self.tracker.spawn(async move {
            inner
                .complete(record, StatusCode::Failure, Some(error.detail()))
                .await;
        });
    }

    fn receive(self: &Arc<Self>, envelope: Envelope) {
        if envelope.recipient != self.address {
            warn!(recipient = %envelope.recipient, "Dropping envelope for another node");
            return;
        }
        trace!(from = %envelope.sender, kind = envelope.message.kind(), "Envelope received");
        let origin = envelope.sender;
        match envelope.message {
            MobilityMessage::Transfer(transfer) => self.accept_transfer(origin, transfer),
            MobilityMessage::Ack {
                agent,
                move_control,
            } => self.confirm(agent, move_control, None),
            MobilityMessage::Nack {
                agent,
                move_control,
                failure,
            } => self.confirm(agent, move_control, Some(failure)),
        }
    }

    fn accept_transfer(self: &Arc<Self>, origin: MessageAddress, mut transfer: TransferTicket) {
        let agent = transfer.agent.clone();
        let state = transfer.take_state();
        if let Err(e) = self.registry.claim_arrival(&agent, state) {
            let rejection = MobilityError::RemoteAddFailure {
                agent: agent.clone(),
                node: self.address.clone(),
                reason: e.to_string(),
            };
            error!(%agent, %origin, error = %rejection, "Refusing transfer");
            let nack = Envelope::new(
                self.address.clone(),
                origin,
                MobilityMessage::Nack {
                    agent,
                    move_control: transfer.move_control,
                    failure: rejection.detail(),
                },
            );
            let transport = Arc::clone(&self.transport);
            self.tracker.spawn(async move {
                if let Err(e) = transport.send(nack).await {
                    error!(error = %e, "Failed to send negative acknowledgement");
                }
            });
            return;
        }
        let ticket = transfer.move_ticket.resolve_agent(&agent);
        let support = NodeSupport::for_arrival(
            Arc::clone(self),
            agent,
            ticket,
            transfer.move_control,
            origin,
        );
        self.queue(
            ProtocolEvent::Arrival {
                description: transfer.description,
            },
            support,
            true,
        );
    }

    fn confirm(
        self: &Arc<Self>,
        agent: MessageAddress,
        move_control: ControlUid,
        failure: Option<FailureDetail>,
    ) {
        let confirmation = match self.registry.claim_confirmation(&agent, &move_control) {
            Ok(confirmation) => confirmation,
            Err(e) => {
                error!(%agent, uid = %move_control, error = %e, "Ignoring reply");
                return;
            }
        };
        let Some(ticket) = confirmation.control.ticket().as_move().cloned() else {
            error!(%agent, uid = %move_control, "Reply refers to a control record that is not a move");
            self.registry.release(&agent);
            return;
        };
        let ticket = ticket.resolve_agent(&agent);
        let event = match failure {
            None => ProtocolEvent::Ack {
                agent: confirmation.agent,
            },
            Some(failure) => ProtocolEvent::Nack {
                agent: confirmation.agent,
                failure,
            },
        };
        let support = NodeSupport::for_reply(Arc::clone(self), agent, ticket, confirmation.control);
        self.queue(event, support, true);
    }

    /// Runs a protocol step as its own task.
    fn queue(self: &Arc<Self>, event: ProtocolEvent, support: NodeSupport, claimed: bool) {
        let inner = Arc::clone(self);
        self.tracker.spawn(async move {
            let step = event.name();
            let outcome = event.run(&support).await;
            inner.dequeue(step, outcome, support, claimed).await;
        });
    }

    async fn dequeue(&self, step: &str, outcome: Outcome, support: NodeSupport, claimed: bool) {
        use crate::traits::MobilitySupport;

        let agent = support.agent().clone();
        debug!(%agent, step, ?outcome, "Protocol step finished");
        if claimed && !outcome.is_awaiting_reply() {
            self.registry.release(&agent);
        }
        for record in support.take_publications() {
            self.store.publish_change(record).await;
        }
    }
}
