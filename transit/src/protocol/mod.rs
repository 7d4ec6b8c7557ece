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

//! The relocation protocol as a set of one-shot handlers.
//!
//! Each step of a move is a [`ProtocolEvent`]. Running an event against a
//! [`MobilitySupport`] performs exactly one transition and yields an
//! [`Outcome`]:
//!
//! | Event            | Runs on     | Outcome                                      |
//! |------------------|-------------|----------------------------------------------|
//! | `DispatchNoop`   | origin      | `Arrived` or `Failed`                        |
//! | `DispatchRemote` | origin      | `AwaitingReply` or `Failed`                  |
//! | `DispatchTest`   | origin      | `Arrived` or `Failed`                        |
//! | `Arrival`        | destination | `Accepted` or `Rejected`                     |
//! | `Ack`            | origin      | `Arrived` or `ArrivedWithResidue`            |
//! | `Nack`           | origin      | `Failed`                                     |
//!
//! A ticket runs either `DispatchNoop`, or `DispatchTest`, or
//! `DispatchRemote` then `Arrival` then one of `Ack` and `Nack`. Whatever the
//! path, the origin's support sees exactly one of `on_arrival` and
//! `on_failure`.

use std::fmt;
use std::sync::Arc;

use tracing::Instrument;

use crate::common::{AgentDescription, FailureDetail, LocalMoveState, MobilityError, StateCodec};
use crate::traits::{MobileAgent, MobilitySupport};

pub(crate) use context::HandlerContext;

mod context;
mod dispatch;
mod lifecycle;
mod reply;

/// One step of the relocation protocol, with the inputs that step needs.
pub enum ProtocolEvent {
    /// The move leaves the agent where it is.
    DispatchNoop,
    /// The agent leaves for another node.
    DispatchRemote {
        /// The agent to move.
        agent: Arc<dyn MobileAgent>,
        /// How the destination rebuilds it.
        description: AgentDescription,
    },
    /// The agent is restarted on its own node through a full capture cycle.
    DispatchTest {
        /// The agent to restart.
        agent: Arc<dyn MobileAgent>,
        /// How to rebuild it.
        description: AgentDescription,
        /// Carries the state from the old instance to the new one.
        holder: LocalMoveState,
        /// Codec for the round-trip check.
        codec: Arc<dyn StateCodec>,
    },
    /// A transferred agent reached its destination.
    Arrival {
        /// How to rebuild it.
        description: AgentDescription,
    },
    /// The destination accepted the agent.
    Ack {
        /// The suspended local copy.
        agent: Arc<dyn MobileAgent>,
    },
    /// The destination refused the agent.
    Nack {
        /// The suspended local copy.
        agent: Arc<dyn MobileAgent>,
        /// Why it was refused.
        failure: FailureDetail,
    },
}

impl ProtocolEvent {
    /// The step's name.
    pub fn name(&self) -> &'static str {
        match self {
            ProtocolEvent::DispatchNoop => "dispatch-noop",
            ProtocolEvent::DispatchRemote { .. } => "dispatch-remote",
            ProtocolEvent::DispatchTest { .. } => "dispatch-test",
            ProtocolEvent::Arrival { .. } => "arrival",
            ProtocolEvent::Ack { .. } => "ack",
            ProtocolEvent::Nack { .. } => "nack",
        }
    }

    /// Performs the step.
    pub async fn run(self, support: &dyn MobilitySupport) -> Outcome {
        let ctx = HandlerContext::from_support(support);
        let span = support.span();
        let step = self.name();
        async move {
            tracing::debug!(step, "Running protocol step");
            match self {
                ProtocolEvent::DispatchNoop => dispatch::dispatch_noop(&ctx, support),
                ProtocolEvent::DispatchRemote { agent, description } => {
                    dispatch::dispatch_remote(&ctx, support, agent, description).await
                }
                ProtocolEvent::DispatchTest {
                    agent,
                    description,
                    holder,
                    codec,
                } => dispatch::dispatch_test(&ctx, support, agent, description, holder, codec).await,
                ProtocolEvent::Arrival { description } => {
                    reply::arrival(&ctx, support, description).await
                }
                ProtocolEvent::Ack { agent } => reply::ack(&ctx, support, agent).await,
                ProtocolEvent::Nack { agent, failure } => reply::nack(&ctx, support, agent, failure),
            }
        }
        .instrument(span)
        .await
    }
}

impl fmt::Debug for ProtocolEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// How a protocol step ended.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// The agent is at its destination and the move is complete.
    Arrived,
    /// The agent is at its destination but its old copy could not be fully
    /// removed.
    ArrivedWithResidue(MobilityError),
    /// The agent was shipped; an ack or nack will finish the move.
    AwaitingReply,
    /// Destination side: the agent was re-created and acknowledged.
    Accepted,
    /// Destination side: the agent could not be re-created.
    Rejected(MobilityError),
    /// The move failed.
    Failed(MobilityError),
}

impl Outcome {
    /// Whether the move is still in flight after this step.
    pub fn is_awaiting_reply(&self) -> bool {
        matches!(self, Outcome::AwaitingReply)
    }

    /// The error this step ended with, if any.
    pub fn error(&self) -> Option<&MobilityError> {
        match self {
            Outcome::ArrivedWithResidue(e) | Outcome::Rejected(e) | Outcome::Failed(e) => Some(e),
            _ => None,
        }
    }
}
