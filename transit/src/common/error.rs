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

use crate::control::ControlError;
use crate::message::MessageAddress;
use crate::ticket::TicketError;

/// The lifecycle step of an agent that failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LifecyclePhase {
    /// Stopping new work before a capture.
    Suspend,
    /// Letting a suspended agent run again.
    Resume,
    /// Halting the suspended agent.
    Stop,
    /// Releasing the agent's resources.
    Unload,
    /// Detaching the agent from its container.
    Remove,
    /// Creating the agent in a container.
    Add,
}

impl fmt::Display for LifecyclePhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let phase = match self {
            LifecyclePhase::Suspend => "suspend",
            LifecyclePhase::Resume => "resume",
            LifecyclePhase::Stop => "stop",
            LifecyclePhase::Unload => "unload",
            LifecyclePhase::Remove => "remove",
            LifecyclePhase::Add => "add",
        };
        f.write_str(phase)
    }
}

/// Serialisable classification of a [`MobilityError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// A ticket was malformed when it was built.
    InvalidTicket,
    /// A handler was invoked with a ticket that does not match its context.
    TicketMismatch,
    /// The agent's state could not be captured or did not survive encoding.
    StateCapture,
    /// The transfer message could not be delivered.
    TransferSend,
    /// The destination could not re-create the agent.
    RemoteAdd,
    /// A suspended agent could not be resumed after a failure.
    Resume,
    /// A suspend, stop, unload, remove or add step failed.
    Lifecycle,
    /// The agent is not registered on the node.
    NotRegistered,
    /// Another add, remove or move is already in flight for the agent.
    Busy,
    /// An agent with the same name already exists.
    AlreadyExists,
    /// The agent to remove does not exist.
    DoesNotExist,
    /// A control record rejected a status update.
    Control,
}

/// The wire form of a failure: enough to report it on another node.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FailureDetail {
    /// What kind of failure occurred.
    pub kind: FailureKind,
    /// Human readable description.
    pub message: String,
}

impl FailureDetail {
    /// Creates a detail record.
    pub fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

impl fmt::Display for FailureDetail {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}: {}", self.kind, self.message)
    }
}

/// Errors raised while adding, removing or relocating agents.
///
/// Every failure a handler reports to its support, and every failure
/// recorded on a control record, is one of these. Errors that have to travel
/// to another node are flattened into a [`FailureDetail`] first.
#[derive(Debug, Clone, PartialEq)]
pub enum MobilityError {
    /// A ticket failed validation.
    InvalidTicket(TicketError),
    /// A handler's precondition on its ticket did not hold.
    TicketMismatch(String),
    /// Capturing, encoding or decoding the agent's state failed.
    StateCaptureFailure {
        /// The agent being moved.
        agent: MessageAddress,
        /// What went wrong.
        reason: String,
    },
    /// The transfer message never left the origin.
    TransferSendFailure {
        /// The agent being moved.
        agent: MessageAddress,
        /// Where it was headed.
        destination: MessageAddress,
        /// What went wrong.
        reason: String,
    },
    /// The destination failed to re-create the agent.
    RemoteAddFailure {
        /// The agent being moved.
        agent: MessageAddress,
        /// The destination node.
        node: MessageAddress,
        /// What went wrong.
        reason: String,
    },
    /// A suspended agent could not be resumed while recovering from a failure.
    ResumeFailure {
        /// The agent left suspended.
        agent: MessageAddress,
        /// The resume error followed by the failure being recovered from.
        reason: String,
    },
    /// A lifecycle step of the agent failed.
    AgentLifecycle {
        /// The agent.
        agent: MessageAddress,
        /// The step that failed.
        phase: LifecyclePhase,
        /// What went wrong.
        reason: String,
    },
    /// The agent is not registered on the node.
    AgentNotRegistered {
        /// The agent.
        agent: MessageAddress,
        /// The node that was asked.
        node: MessageAddress,
    },
    /// Another mobility action is in flight for the agent.
    AgentBusy {
        /// The agent.
        agent: MessageAddress,
        /// The node that was asked.
        node: MessageAddress,
    },
    /// An agent with the same name is already hosted on the node.
    AlreadyExists {
        /// The agent.
        agent: MessageAddress,
        /// The node that was asked.
        node: MessageAddress,
    },
    /// The agent to remove is not hosted on the node.
    DoesNotExist {
        /// The agent.
        agent: MessageAddress,
        /// The node that was asked.
        node: MessageAddress,
    },
    /// A control record refused a status update.
    Control(ControlError),
    /// A failure reported by another node.
    Remote(FailureDetail),
}

impl MobilityError {
    /// Wraps a resume failure together with the error that triggered the resume.
    pub fn resume_failed(agent: &MessageAddress, resume: &MobilityError, cause: &MobilityError) -> Self {
        MobilityError::ResumeFailure {
            agent: agent.clone(),
            reason: format!("{resume}; while recovering from: {cause}"),
        }
    }

    /// Classifies this error.
    pub fn kind(&self) -> FailureKind {
        match self {
            MobilityError::InvalidTicket(_) => FailureKind::InvalidTicket,
            MobilityError::TicketMismatch(_) => FailureKind::TicketMismatch,
            MobilityError::StateCaptureFailure { .. } => FailureKind::StateCapture,
            MobilityError::TransferSendFailure { .. } => FailureKind::TransferSend,
            MobilityError::RemoteAddFailure { .. } => FailureKind::RemoteAdd,
            MobilityError::ResumeFailure { .. } => FailureKind::Resume,
            MobilityError::AgentLifecycle { .. } => FailureKind::Lifecycle,
            MobilityError::AgentNotRegistered { .. } => FailureKind::NotRegistered,
            MobilityError::AgentBusy { .. } => FailureKind::Busy,
            MobilityError::AlreadyExists { .. } => FailureKind::AlreadyExists,
            MobilityError::DoesNotExist { .. } => FailureKind::DoesNotExist,
            MobilityError::Control(_) => FailureKind::Control,
            MobilityError::Remote(detail) => detail.kind,
        }
    }

    /// Flattens this error into its wire form.
    pub fn detail(&self) -> FailureDetail {
        match self {
            MobilityError::Remote(detail) => detail.clone(),
            other => FailureDetail::new(other.kind(), other.to_string()),
        }
    }
}

impl fmt::Display for MobilityError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MobilityError::InvalidTicket(err) => write!(f, "Invalid ticket: {}", err),
            MobilityError::TicketMismatch(msg) => write!(f, "Ticket mismatch: {}", msg),
            MobilityError::StateCaptureFailure { agent, reason } => {
                write!(f, "Failed to capture state of agent {}: {}", agent, reason)
            }
            MobilityError::TransferSendFailure {
                agent,
                destination,
                reason,
            } => write!(
                f,
                "Failed to send agent {} to node {}: {}",
                agent, destination, reason
            ),
            MobilityError::RemoteAddFailure { agent, node, reason } => {
                write!(f, "Node {} failed to add agent {}: {}", node, agent, reason)
            }
            MobilityError::ResumeFailure { agent, reason } => {
                write!(f, "Failed to resume agent {}: {}", agent, reason)
            }
            MobilityError::AgentLifecycle {
                agent,
                phase,
                reason,
            } => write!(f, "Failed to {} agent {}: {}", phase, agent, reason),
            MobilityError::AgentNotRegistered { agent, node } => {
                write!(f, "Agent {} is not registered on node {}", agent, node)
            }
            MobilityError::AgentBusy { agent, node } => write!(
                f,
                "Agent {} on node {} is busy with another mobility action",
                agent, node
            ),
            MobilityError::AlreadyExists { agent, node } => {
                write!(f, "Agent {} already exists on node {}", agent, node)
            }
            MobilityError::DoesNotExist { agent, node } => {
                write!(f, "Agent {} does not exist on node {}", agent, node)
            }
            MobilityError::Control(err) => write!(f, "Control record error: {}", err),
            MobilityError::Remote(detail) => write!(f, "Remote failure: {}", detail.message),
        }
    }
}

impl std::error::Error for MobilityError {}

impl From<TicketError> for MobilityError {
    fn from(err: TicketError) -> Self {
        MobilityError::InvalidTicket(err)
    }
}

impl From<ControlError> for MobilityError {
    fn from(err: ControlError) -> Self {
        MobilityError::Control(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_remote_error_keeps_original_detail() {
        let detail = FailureDetail::new(FailureKind::AlreadyExists, "taken");
        let error = MobilityError::Remote(detail.clone());
        assert_eq!(error.kind(), FailureKind::AlreadyExists);
        assert_eq!(error.detail(), detail);
    }

    #[test]
    fn test_resume_failure_mentions_both_errors() {
        let agent = MessageAddress::new("worker");
        let resume = MobilityError::AgentLifecycle {
            agent: agent.clone(),
            phase: LifecyclePhase::Resume,
            reason: "wedged".into(),
        };
        let cause = MobilityError::StateCaptureFailure {
            agent: agent.clone(),
            reason: "not serialisable".into(),
        };
        let error = MobilityError::resume_failed(&agent, &resume, &cause);
        let text = error.to_string();
        assert!(text.contains("wedged"));
        assert!(text.contains("not serialisable"));
        assert_eq!(error.kind(), FailureKind::Resume);
    }
}
