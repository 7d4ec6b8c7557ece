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

use serde::{Deserialize, Serialize};

use crate::common::FailureDetail;

/// Completion status of a control record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StatusCode {
    /// Not completed yet.
    #[default]
    None,
    /// Add: the agent was created.
    Created,
    /// Add: an agent with that name already exists.
    AlreadyExists,
    /// Remove: the agent was deleted.
    Removed,
    /// Remove: no such agent.
    DoesNotExist,
    /// Move: the agent arrived at its destination.
    Moved,
    /// Move: the agent is already where it was asked to go.
    AlreadyMoved,
    /// Any operation: it failed; see the failure detail.
    Failure,
}

impl StatusCode {
    /// The upper-case name used in logs.
    pub const fn as_str(self) -> &'static str {
        match self {
            StatusCode::None => "NONE",
            StatusCode::Created => "CREATED",
            StatusCode::AlreadyExists => "ALREADY_EXISTS",
            StatusCode::Removed => "REMOVED",
            StatusCode::DoesNotExist => "DOES_NOT_EXIST",
            StatusCode::Moved => "MOVED",
            StatusCode::AlreadyMoved => "ALREADY_MOVED",
            StatusCode::Failure => "FAILURE",
        }
    }
}

impl fmt::Display for StatusCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A status code plus the failure detail that explains a `Failure`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct ControlStatus {
    /// The code.
    pub code: StatusCode,
    /// Why the operation failed, when it did.
    pub failure: Option<FailureDetail>,
}

impl ControlStatus {
    /// Creates a status.
    pub fn new(code: StatusCode, failure: Option<FailureDetail>) -> Self {
        Self { code, failure }
    }

    /// A status that carries only a code.
    pub fn of(code: StatusCode) -> Self {
        Self::new(code, None)
    }

    /// Whether the operation has not completed yet.
    pub fn is_none(&self) -> bool {
        self.code == StatusCode::None
    }
}

impl fmt::Display for ControlStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.failure {
            Some(failure) => write!(f, "{} ({})", self.code, failure),
            None => write!(f, "{}", self.code),
        }
    }
}

/// Whether merging a response changed the record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeOutcome {
    /// The record took the new status.
    Changed,
    /// The record already held it, or cannot take responses.
    Unchanged,
}

/// A control record refused a status update.
///
/// Both variants indicate a caller breaking the record's contract, not a
/// condition to recover from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ControlError {
    /// The status was already set once.
    AlreadySet {
        /// The status the record holds.
        current: StatusCode,
        /// The status that was refused.
        attempted: StatusCode,
    },
    /// `None` is not a completion status.
    NoneStatus,
}

impl fmt::Display for ControlError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ControlError::AlreadySet { current, attempted } => write!(
                f,
                "status already set to {}, refusing {}",
                current, attempted
            ),
            ControlError::NoneStatus => write!(f, "cannot set status to NONE"),
        }
    }
}

impl std::error::Error for ControlError {}
