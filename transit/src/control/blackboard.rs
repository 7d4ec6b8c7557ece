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
use futures::future::join_all;
use parking_lot::Mutex;
use tokio::sync::mpsc;
use tracing::{debug, instrument, trace, warn};

use crate::common::CONFIG;
use crate::control::{ControlRecord, ControlUid, MergeOutcome};
use crate::message::MessageAddress;
use crate::traits::{ControlChange, ControlStore};

/// An in-memory control store shared by every node of a process.
///
/// Each node works through its own [`BlackboardView`]. The blackboard relays
/// records between views: a requester's record is copied, via
/// [`ControlRecord::derive_target`], into the view of its target node, and a
/// status change on that copy is merged into the requester's record.
///
/// Records are kept after they complete. A requester withdraws its record
/// with [`ControlStore::publish_remove`] (or `MobilityNode::withdraw`), which
/// also drops the copies relayed to the target.
#[derive(Debug, Clone, Default)]
pub struct Blackboard {
    boards: Arc<DashMap<MessageAddress, Arc<Board>>>,
}

#[derive(Debug, Default)]
struct Board {
    records: DashMap<ControlUid, Arc<ControlRecord>>,
    subscribers: Mutex<Vec<mpsc::Sender<ControlChange>>>,
}

impl Board {
    async fn notify(&self, change: ControlChange) {
        let subscribers: Vec<_> = self.subscribers.lock().clone();
        trace!(uid = %change.record().uid(), subscribers = subscribers.len(), "Notifying subscribers");
        let sends = subscribers.iter().map(|subscriber| subscriber.send(change.clone()));
        let results = join_all(sends).await;
        if results.iter().any(Result::is_err) {
            self.subscribers.lock().retain(|subscriber| !subscriber.is_closed());
        }
    }
}

impl Blackboard {
    /// Creates an empty blackboard.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the view for `node`, creating it on first use.
    pub fn view(&self, node: impl Into<MessageAddress>) -> BlackboardView {
        let node = node.into();
        let board = self.board(&node);
        BlackboardView {
            node,
            board,
            blackboard: self.clone(),
        }
    }

    fn board(&self, node: &MessageAddress) -> Arc<Board> {
        Arc::clone(self.boards.entry(node.clone()).or_default().value())
    }
}

/// One node's window onto a [`Blackboard`].
#[derive(Debug, Clone)]
pub struct BlackboardView {
    node: MessageAddress,
    board: Arc<Board>,
    blackboard: Blackboard,
}

impl BlackboardView {
    /// The node this view belongs to.
    pub fn node(&self) -> &MessageAddress {
        &self.node
    }

    /// Number of records currently visible.
    pub fn len(&self) -> usize {
        self.board.records.len()
    }

    /// Whether no records are visible.
    pub fn is_empty(&self) -> bool {
        self.board.records.is_empty()
    }
}

#[async_trait]
impl ControlStore for BlackboardView {
    #[instrument(skip(self, record), fields(node = %self.node, uid = %record.uid()))]
    async fn publish_add(&self, record: Arc<ControlRecord>) {
        self.board
            .records
            .insert(record.uid().clone(), Arc::clone(&record));
        let targets = record.targets();
        self.board.notify(ControlChange::Added(Arc::clone(&record))).await;

        for target in targets {
            debug!(%target, "Relaying control record");
            let derived = Arc::new(record.derive_target());
            let board = self.blackboard.board(&target);
            board
                .records
                .insert(derived.uid().clone(), Arc::clone(&derived));
            board.notify(ControlChange::Added(derived)).await;
        }
    }

    #[instrument(skip(self, record), fields(node = %self.node, uid = %record.uid()))]
    async fn publish_change(&self, record: Arc<ControlRecord>) {
        self.board.notify(ControlChange::Changed(Arc::clone(&record))).await;

        if record.is_source() {
            return;
        }
        let source_board = self.blackboard.board(record.source());
        let Some(source) = source_board
            .records
            .get(record.uid())
            .map(|entry| Arc::clone(entry.value()))
        else {
            warn!(source = %record.source(), "No source record to take the response");
            return;
        };
        match source.merge_response(&record.status()) {
            MergeOutcome::Changed => {
                debug!(status = %source.status(), "Response merged into source record");
                source_board.notify(ControlChange::Changed(source)).await;
            }
            MergeOutcome::Unchanged => trace!("Response already held by source record"),
        }
    }

    #[instrument(skip(self, record), fields(node = %self.node, uid = %record.uid()))]
    async fn publish_remove(&self, record: Arc<ControlRecord>) {
        if let Some((_, removed)) = self.board.records.remove(record.uid()) {
            self.board.notify(ControlChange::Removed(removed)).await;
        }
        for target in record.targets() {
            let board = self.blackboard.board(&target);
            if let Some((_, removed)) = board.records.remove(record.uid()) {
                board.notify(ControlChange::Removed(removed)).await;
            }
        }
    }

    fn find(&self, uid: &ControlUid) -> Option<Arc<ControlRecord>> {
        self.board
            .records
            .get(uid)
            .map(|entry| Arc::clone(entry.value()))
    }

    fn subscribe(&self) -> mpsc::Receiver<ControlChange> {
        let (sender, receiver) = mpsc::channel(CONFIG.limits.control_subscriber_capacity);
        self.board.subscribers.lock().push(sender);
        receiver
    }
}
