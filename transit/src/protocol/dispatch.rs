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

use tracing::{error, info};

use crate::common::{AgentDescription, LocalMoveState, StateCodec};
use crate::protocol::lifecycle::{
    capture_state, fail, fail_suspended, round_trip, stop, suspend, unload,
};
use crate::protocol::{HandlerContext, Outcome};
use crate::traits::{MobileAgent, MobilitySupport};

/// The agent stays where it is and nothing is restarted.
pub(super) fn dispatch_noop(ctx: &HandlerContext, support: &dyn MobilitySupport) -> Outcome {
    let checked = ctx
        .check_dispatch()
        .and_then(|()| ctx.check_local_destination())
        .and_then(|()| ctx.check_restart(false));
    if let Err(e) = checked {
        return fail(support, e);
    }
    info!(agent = %ctx.agent, node = %ctx.node, "Agent already on destination node");
    support.on_dispatch();
    support.on_arrival();
    Outcome::Arrived
}

/// Suspend, capture and ship the agent; the reply finishes the move.
pub(super) async fn dispatch_remote(
    ctx: &HandlerContext,
    support: &dyn MobilitySupport,
    agent: Arc<dyn MobileAgent>,
    description: AgentDescription,
) -> Outcome {
    if let Err(e) = ctx.check_dispatch().and_then(|()| ctx.check_remote_destination()) {
        return fail(support, e);
    }
    info!(ticket = %ctx.ticket, "Begin move of agent {}", ctx.agent);
    agent.on_dispatch(ctx.ticket.destination_node());
    support.on_dispatch();

    if let Err(e) = suspend(agent.as_ref()) {
        return fail(support, e);
    }
    let state = match capture_state(ctx, agent.as_ref()) {
        Ok(state) => state,
        Err(e) => return fail_suspended(ctx, support, agent.as_ref(), e),
    };
    if let Err(e) = support.send_transfer(&description, state).await {
        return fail_suspended(ctx, support, agent.as_ref(), e);
    }
    info!(agent = %ctx.agent, "Transferring agent, waiting for acknowledgement");
    Outcome::AwaitingReply
}

/// Restart the agent on this node through a full capture cycle.
///
/// The state makes a codec round trip before the original instance is
/// touched. Until the instance is unloaded every failure resumes it; from
/// then on the original is gone and a failure is final.
pub(super) async fn dispatch_test(
    ctx: &HandlerContext,
    support: &dyn MobilitySupport,
    agent: Arc<dyn MobileAgent>,
    description: AgentDescription,
    holder: LocalMoveState,
    codec: Arc<dyn StateCodec>,
) -> Outcome {
    let checked = ctx
        .check_dispatch()
        .and_then(|()| ctx.check_local_destination())
        .and_then(|()| ctx.check_restart(true));
    if let Err(e) = checked {
        return fail(support, e);
    }
    info!(ticket = %ctx.ticket, "Begin test move of agent {}", ctx.agent);
    agent.on_dispatch(Some(&ctx.node));
    support.on_dispatch();

    if let Err(e) = suspend(agent.as_ref()) {
        return fail(support, e);
    }
    let state = match capture_state(ctx, agent.as_ref())
        .and_then(|state| round_trip(ctx, codec.as_ref(), state))
    {
        Ok(state) => state,
        Err(e) => return fail_suspended(ctx, support, agent.as_ref(), e),
    };
    if let Err(e) = stop(agent.as_ref()) {
        return fail_suspended(ctx, support, agent.as_ref(), e);
    }

    if let Err(e) = unload(agent.as_ref()) {
        error!(agent = %ctx.agent, "Agent lost during test move");
        return fail(support, e);
    }
    info!(agent = %ctx.agent, "Remove agent");
    if let Err(e) = support.remove_agent().await {
        error!(agent = %ctx.agent, "Agent lost during test move");
        return fail(support, e);
    }
    support.on_removal();

    if let Some(state) = state {
        holder.set(state);
    }
    info!(agent = %ctx.agent, "Add agent");
    if let Err(e) = support.add_agent(&description).await {
        error!(agent = %ctx.agent, "Agent lost during test move");
        return fail(support, e);
    }
    info!(agent = %ctx.agent, "Test move of agent complete");
    support.on_arrival();
    Outcome::Arrived
}
