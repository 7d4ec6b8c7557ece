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
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use mti::prelude::*;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use static_assertions::assert_impl_all;
use tracing::{trace, warn};

use crate::common::FailureDetail;
use crate::control::{ControlError, ControlStatus, MergeOutcome, StatusCode};
use crate::message::MessageAddress;
use crate::ticket::Ticket;

/// Globally unique, time-ordered identity of a control record.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ControlUid(String);

impl ControlUid {
    /// Generates a fresh uid.
    pub fn generate() -> Self {
        Self("ctl".create_type_id::<V7>().to_string())
    }

    /// Returns the uid as text.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ControlUid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// The immutable part of a control record, shared by the source copy and
/// every copy derived from it.
#[derive(Debug, PartialEq, Eq)]
pub struct ControlPayload {
    uid: ControlUid,
    owner: Option<ControlUid>,
    source: MessageAddress,
    ticket: Ticket,
}

/// The requester's copy of a control record.
///
/// It names the node expected to carry the request out and absorbs that
/// node's response through [`ControlRecord::merge_response`].
#[derive(Debug)]
pub struct SourceView {
    payload: Arc<ControlPayload>,
    target: Option<MessageAddress>,
    status: Mutex<ControlStatus>,
}

/// The executing node's copy of a control record.
///
/// It carries no target, so a change to it can only flow back to the source.
#[derive(Debug)]
pub struct TargetView {
    payload: Arc<ControlPayload>,
    status: Mutex<ControlStatus>,
}

/// A ticket travelling between the node that requests an operation and the
/// node that performs it, together with the operation's outcome.
///
/// The record starts with status `NONE` and is completed exactly once with
/// [`ControlRecord::set_status`]. The requester publishes a
/// [`ControlRecord::Source`]; the store delivers a
/// [`ControlRecord::Target`] derived from it to the target node, whose status
/// change is merged back into the source.
///
/// Records compare and hash by uid.
#[derive(Debug)]
pub enum ControlRecord {
    /// The requester's copy.
    Source(SourceView),
    /// A copy derived for the executing node.
    Target(TargetView),
}

assert_impl_all!(ControlRecord: Send, Sync);

impl ControlRecord {
    /// Creates a requester-side record with a fresh uid and status `NONE`.
    pub fn create(
        owner: Option<ControlUid>,
        source: impl Into<MessageAddress>,
        target: Option<MessageAddress>,
        ticket: impl Into<Ticket>,
    ) -> Self {
        ControlRecord::Source(SourceView {
            payload: Arc::new(ControlPayload {
                uid: ControlUid::generate(),
                owner,
                source: source.into(),
                ticket: ticket.into(),
            }),
            target,
            status: Mutex::new(ControlStatus::default()),
        })
    }

    /// Produces the copy handed to the executing node: same payload, no
    /// target, fresh `NONE` status.
    pub fn derive_target(&self) -> Self {
        ControlRecord::Target(TargetView {
            payload: Arc::clone(self.payload()),
            status: Mutex::new(ControlStatus::default()),
        })
    }

    fn payload(&self) -> &Arc<ControlPayload> {
        match self {
            ControlRecord::Source(view) => &view.payload,
            ControlRecord::Target(view) => &view.payload,
        }
    }

    fn status_cell(&self) -> &Mutex<ControlStatus> {
        match self {
            ControlRecord::Source(view) => &view.status,
            ControlRecord::Target(view) => &view.status,
        }
    }

    /// The record's identity.
    pub fn uid(&self) -> &ControlUid {
        &self.payload().uid
    }

    /// Correlation id of the record this one was issued for, if any.
    pub fn owner(&self) -> Option<&ControlUid> {
        self.payload().owner.as_ref()
    }

    /// The node that requested the operation.
    pub fn source(&self) -> &MessageAddress {
        &self.payload().source
    }

    /// The node expected to perform the operation. Always `None` on a
    /// derived copy.
    pub fn target(&self) -> Option<&MessageAddress> {
        match self {
            ControlRecord::Source(view) => view.target.as_ref(),
            ControlRecord::Target(_) => None,
        }
    }

    /// Nodes this record must be relayed to: the target, unless it is unset
    /// or is the source itself.
    pub fn targets(&self) -> Vec<MessageAddress> {
        match self.target() {
            Some(target) if target != self.source() => vec![target.clone()],
            _ => Vec::new(),
        }
    }

    /// The requested operation.
    pub fn ticket(&self) -> &Ticket {
        &self.payload().ticket
    }

    /// Whether this is the requester's copy.
    pub fn is_source(&self) -> bool {
        matches!(self, ControlRecord::Source(_))
    }

    /// A snapshot of the current status.
    pub fn status(&self) -> ControlStatus {
        self.status_cell().lock().clone()
    }

    /// The status, once the operation has completed.
    pub fn response(&self) -> Option<ControlStatus> {
        let status = self.status();
        (!status.is_none()).then_some(status)
    }

    /// Completes the record. Allowed exactly once, and never with `NONE`.
    pub fn set_status(
        &self,
        code: StatusCode,
        failure: Option<FailureDetail>,
    ) -> Result<(), ControlError> {
        if code == StatusCode::None {
            return Err(ControlError::NoneStatus);
        }
        let mut status = self.status_cell().lock();
        if !status.is_none() {
            return Err(ControlError::AlreadySet {
                current: status.code,
                attempted: code,
            });
        }
        trace!(uid = %self.uid(), %code, "Control status set");
        *status = ControlStatus::new(code, failure);
        Ok(())
    }

    /// Takes a response from the executing node into the requester's copy.
    ///
    /// Equal responses are absorbed, so a duplicated reply changes nothing.
    /// Derived copies never take responses.
    pub fn merge_response(&self, response: &ControlStatus) -> MergeOutcome {
        match self {
            ControlRecord::Source(view) => {
                let mut status = view.status.lock();
                if *status == *response {
                    MergeOutcome::Unchanged
                } else {
                    trace!(uid = %view.payload.uid, from = %status.code, to = %response.code, "Control response merged");
                    *status = response.clone();
                    MergeOutcome::Changed
                }
            }
            ControlRecord::Target(view) => {
                warn!(uid = %view.payload.uid, "Derived control record cannot take a response");
                MergeOutcome::Unchanged
            }
        }
    }
}

impl PartialEq for ControlRecord {
    fn eq(&self, other: &Self) -> bool {
        self.uid() == other.uid()
    }
}

impl Eq for ControlRecord {}

impl Hash for ControlRecord {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.uid().hash(state);
    }
}

impl fmt::Display for ControlRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Control {} [{}] from \"{}\"",
            self.uid(),
            self.ticket(),
            self.source()
        )?;
        if let Some(target) = self.target() {
            write!(f, " to \"{}\"", target)?;
        }
        write!(f, ": {}", self.status())
    }
}
