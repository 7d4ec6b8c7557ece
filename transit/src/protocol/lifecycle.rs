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

use tracing::{debug, error, info, warn};

use crate::common::{AgentState, MobilityError, StateCodec, CONFIG};
use crate::protocol::{HandlerContext, Outcome};
use crate::traits::{MobileAgent, MobilitySupport};

pub(crate) fn suspend(agent: &dyn MobileAgent) -> Result<(), MobilityError> {
    info!(agent = %agent.address(), "Suspend agent");
    agent.suspend()?;
    info!(agent = %agent.address(), "Suspended agent");
    Ok(())
}

pub(crate) fn resume(agent: &dyn MobileAgent) -> Result<(), MobilityError> {
    info!(agent = %agent.address(), "Resume agent");
    agent.resume()?;
    info!(agent = %agent.address(), "Resumed agent");
    Ok(())
}

pub(crate) fn stop(agent: &dyn MobileAgent) -> Result<(), MobilityError> {
    info!(agent = %agent.address(), "Stop agent");
    agent.stop()?;
    info!(agent = %agent.address(), "Stopped agent");
    Ok(())
}

pub(crate) fn unload(agent: &dyn MobileAgent) -> Result<(), MobilityError> {
    info!(agent = %agent.address(), "Unload agent");
    agent.unload()?;
    info!(agent = %agent.address(), "Unloaded agent");
    Ok(())
}

/// Captures the agent's state through its provider.
///
/// An agent without a provider moves without state.
pub(crate) fn capture_state(
    ctx: &HandlerContext,
    agent: &dyn MobileAgent,
) -> Result<Option<AgentState>, MobilityError> {
    let Some(provider) = agent.state_provider() else {
        warn!(agent = %ctx.agent, "Agent has no state provider, moving without state");
        return Ok(None);
    };
    info!(agent = %ctx.agent, "Capture agent state");
    let state = provider.capture_state().map_err(|e| match e {
        MobilityError::StateCaptureFailure { .. } => e,
        other => MobilityError::StateCaptureFailure {
            agent: ctx.agent.clone(),
            reason: other.to_string(),
        },
    })?;
    if CONFIG.behavior.log_captured_state {
        debug!(agent = %ctx.agent, %state, "Captured agent state");
    }
    Ok(Some(state))
}

/// Encodes and decodes the state, requiring the result to equal the input.
pub(crate) fn round_trip(
    ctx: &HandlerContext,
    codec: &dyn StateCodec,
    state: Option<AgentState>,
) -> Result<Option<AgentState>, MobilityError> {
    let Some(state) = state else {
        return Ok(None);
    };
    let capture_failure = |reason: String| MobilityError::StateCaptureFailure {
        agent: ctx.agent.clone(),
        reason,
    };
    info!(agent = %ctx.agent, codec = codec.name(), "Serialize agent state");
    let bytes = codec
        .encode(&state)
        .map_err(|e| capture_failure(e.to_string()))?;
    info!(agent = %ctx.agent, bytes = bytes.len(), "Deserialize agent state");
    let restored = codec
        .decode(&bytes)
        .map_err(|e| capture_failure(e.to_string()))?;
    if restored != state {
        return Err(capture_failure(format!(
            "state changed across a {} round trip",
            codec.name()
        )));
    }
    Ok(Some(restored))
}

/// Reports a failure that happened while the agent was suspended.
///
/// The agent is resumed first. If that fails too, the reported error says
/// so and carries the original cause.
pub(crate) fn fail_suspended(
    ctx: &HandlerContext,
    support: &dyn MobilitySupport,
    agent: &dyn MobileAgent,
    cause: MobilityError,
) -> Outcome {
    error!(agent = %ctx.agent, error = %cause, "Move failed, resuming agent");
    let reported = match resume(agent) {
        Ok(()) => cause,
        Err(resume_error) => {
            error!(agent = %ctx.agent, error = %resume_error, "Failed to resume agent");
            MobilityError::resume_failed(&ctx.agent, &resume_error, &cause)
        }
    };
    fail(support, reported)
}

/// Reports a failure with nothing left to undo.
pub(crate) fn fail(support: &dyn MobilitySupport, error: MobilityError) -> Outcome {
    error!(agent = %support.agent(), %error, "Move failed");
    support.on_failure(&error);
    Outcome::Failed(error)
}
