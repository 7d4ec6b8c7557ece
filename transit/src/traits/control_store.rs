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
use tokio::sync::mpsc;

use crate::control::{ControlRecord, ControlUid};

/// A change a control store reports to its subscribers.
#[derive(Debug, Clone)]
pub enum ControlChange {
    /// A record appeared in this node's view.
    Added(Arc<ControlRecord>),
    /// A record in this node's view took a new status.
    Changed(Arc<ControlRecord>),
    /// A record left this node's view.
    Removed(Arc<ControlRecord>),
}

impl ControlChange {
    /// The record the change concerns.
    pub fn record(&self) -> &Arc<ControlRecord> {
        match self {
            ControlChange::Added(record)
            | ControlChange::Changed(record)
            | ControlChange::Removed(record) => record,
        }
    }
}

/// One node's view of the shared store through which control records are
/// exchanged.
///
/// Publishing a requester-side record makes a derived copy appear at its
/// target node; changing a derived copy merges its status back into the
/// requester's copy, which is then reported as changed on the requester.
#[async_trait]
pub trait ControlStore: Send + Sync + Debug {
    /// Publishes a new record.
    async fn publish_add(&self, record: Arc<ControlRecord>);

    /// Announces that a record's status changed.
    async fn publish_change(&self, record: Arc<ControlRecord>);

    /// Withdraws a record.
    async fn publish_remove(&self, record: Arc<ControlRecord>);

    /// Looks a record up in this view.
    fn find(&self, uid: &ControlUid) -> Option<Arc<ControlRecord>>;

    /// Subscribes to changes in this view.
    fn subscribe(&self) -> mpsc::Receiver<ControlChange>;
}
