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

use tracing::{error, info, warn};

use crate::common::{AgentDescription, FailureDetail, MobilityError};
use crate::protocol::lifecycle::{fail, resume, stop, unload};
use crate::protocol::{HandlerContext, Outcome};
use crate::traits::{MobileAgent, MobilitySupport};

/// Destination side: re-create the agent and answer the origin.
pub(super) async fn arrival(
    ctx: &HandlerContext,
    support: &dyn MobilitySupport,
    description: AgentDescription,
) -> Outcome {
    info!(agent = %ctx.agent, node = %ctx.node, "Agent arriving");
    support.on_dispatch();

    match support.add_agent(&description).await {
        Ok(()) => {
            info!(agent = %ctx.agent, "Agent arrived, acknowledging");
            if let Err(e) = support.send_ack().await {
                error!(
                    agent = %ctx.agent,
                    error = %e,
                    "Acknowledgement lost; the origin keeps its suspended copy"
                );
            }
            Outcome::Accepted
        }
        Err(e) => {
            let rejection = match e {
                MobilityError::RemoteAddFailure { .. } => e,
                other => MobilityError::RemoteAddFailure {
                    agent: ctx.agent.clone(),
                    node: ctx.node.clone(),
                    reason: other.to_string(),
                },
            };
            error!(agent = %ctx.agent, error = %rejection, "Failed to add arriving agent");
            if let Err(send_error) = support.send_nack(&rejection.detail()).await {
                error!(agent = %ctx.agent, error = %send_error, "Failed to send negative acknowledgement");
            }
            Outcome::Rejected(rejection)
        }
    }
}

/// Origin side, success reply: retire the local copy.
///
/// The agent already runs at the destination, so a cleanup failure here is
/// reported but the move still counts as arrived.
pub(super) async fn ack(
    ctx: &HandlerContext,
    support: &dyn MobilitySupport,
    agent: Arc<dyn MobileAgent>,
) -> Outcome {
    info!(agent = %ctx.agent, "Agent arrived at destination, removing local copy");
    let cleanup = async {
        stop(agent.as_ref())?;
        unload(agent.as_ref())?;
        info!(agent = %ctx.agent, "Remove agent");
        support.remove_agent().await
    };
    let outcome = match cleanup.await {
        Ok(()) => {
            support.on_removal();
            Outcome::Arrived
        }
        Err(e) => {
            warn!(agent = %ctx.agent, error = %e, "Failed to remove local copy of moved agent");
            Outcome::ArrivedWithResidue(e)
        }
    };
    support.on_arrival();
    outcome
}

/// Origin side, failure reply: put the agent back to work.
pub(super) fn nack(
    ctx: &HandlerContext,
    support: &dyn MobilitySupport,
    agent: Arc<dyn MobileAgent>,
    failure: FailureDetail,
) -> Outcome {
    let cause = MobilityError::Remote(failure);
    error!(agent = %ctx.agent, error = %cause, "Destination refused agent");
    let reported = match resume(agent.as_ref()) {
        Ok(()) => cause,
        Err(resume_error) => MobilityError::resume_failed(&ctx.agent, &resume_error, &cause),
    };
    fail(support, reported)
}
