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

//! Replicated control records and the store that relays them.
//!
//! *   [`ControlRecord`]: a ticket plus its completion status, either the
//!     requester's [`SourceView`] or a [`TargetView`] derived for the node that
//!     carries the request out.
//! *   [`ControlStatus`] / [`StatusCode`]: the outcome, set exactly once.
//! *   [`Blackboard`]: an in-memory store with one [`BlackboardView`] per node
//!     that relays records to their targets and responses back to the source.

// --- Public Re-exports ---
pub use agent_control::{ControlPayload, ControlRecord, ControlUid, SourceView, TargetView};
pub use blackboard::{Blackboard, BlackboardView};
pub use status::{ControlError, ControlStatus, MergeOutcome, StatusCode};

// --- Submodules ---

/// Defines [`ControlRecord`] and its two views.
mod agent_control;
/// Defines the in-memory [`Blackboard`] store.
mod blackboard;
/// Defines [`ControlStatus`], [`StatusCode`] and [`ControlError`].
mod status;
