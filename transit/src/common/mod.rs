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

//! Shared building blocks: errors, agent state, serialisation and configuration.

// --- Public Re-exports ---
pub use agent_state::{AgentDescription, AgentState, LocalMoveState, DEFAULT_AGENT_FACTORY};
pub use codec::{CodecError, Format, StateCodec};
pub use config::{
    BehaviorConfig, CodecConfig, LimitsConfig, TimeoutConfig, TransitConfig, CONFIG,
};
pub use error::{FailureDetail, FailureKind, LifecyclePhase, MobilityError};

// --- Submodules ---

/// Defines [`AgentState`], [`AgentDescription`] and [`LocalMoveState`].
mod agent_state;
/// Defines [`StateCodec`] and the built-in [`Format`]s.
mod codec;
/// Defines [`TransitConfig`] and the global [`CONFIG`].
mod config;
/// Defines [`MobilityError`] and its wire form [`FailureDetail`].
mod error;
