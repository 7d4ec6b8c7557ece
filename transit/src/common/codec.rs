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

use crate::common::AgentState;

/// Error raised while turning agent state into bytes or back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodecError {
    operation: &'static str,
    reason: String,
}

impl CodecError {
    /// Creates an error for the named operation.
    pub fn new(operation: &'static str, reason: impl Into<String>) -> Self {
        Self {
            operation,
            reason: reason.into(),
        }
    }

    /// The operation that failed, such as `encode` or `decode`.
    pub fn operation(&self) -> &'static str {
        self.operation
    }
}

impl fmt::Display for CodecError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} failed: {}", self.operation, self.reason)
    }
}

impl std::error::Error for CodecError {}

/// Serialises agent state for a same-node test move or for the wire.
pub trait StateCodec: Send + Sync + fmt::Debug {
    /// Name shown in log output.
    fn name(&self) -> &str;

    /// Encodes a snapshot.
    fn encode(&self, state: &AgentState) -> Result<Vec<u8>, CodecError>;

    /// Decodes bytes produced by [`StateCodec::encode`].
    fn decode(&self, bytes: &[u8]) -> Result<AgentState, CodecError>;
}

/// Built-in serialisation formats for agent state.
///
/// ```rust,ignore
/// let bytes = Format::MessagePack.encode(&state)?;
/// assert_eq!(Format::MessagePack.decode(&bytes)?, state);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Format {
    /// JSON, human readable.
    #[default]
    Json,
    /// MessagePack, compact binary.
    MessagePack,
}

impl StateCodec for Format {
    fn name(&self) -> &str {
        match self {
            Format::Json => "json",
            Format::MessagePack => "messagepack",
        }
    }

    fn encode(&self, state: &AgentState) -> Result<Vec<u8>, CodecError> {
        match self {
            Format::Json => {
                serde_json::to_vec(state).map_err(|e| CodecError::new("encode", e.to_string()))
            }
            Format::MessagePack => {
                rmp_serde::to_vec(state).map_err(|e| CodecError::new("encode", e.to_string()))
            }
        }
    }

    fn decode(&self, bytes: &[u8]) -> Result<AgentState, CodecError> {
        match self {
            Format::Json => {
                serde_json::from_slice(bytes).map_err(|e| CodecError::new("decode", e.to_string()))
            }
            Format::MessagePack => rmp_serde::from_slice(bytes)
                .map_err(|e| CodecError::new("decode", e.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_state() -> AgentState {
        AgentState::from_value(serde_json::json!({
            "name": "ledger",
            "entries": [1, -2, 3],
            "ratio": 0.5,
            "open": true,
        }))
    }

    #[test]
    fn test_messagepack_preserves_state() {
        let state = sample_state();
        let bytes = Format::MessagePack.encode(&state).unwrap();
        assert_eq!(Format::MessagePack.decode(&bytes).unwrap(), state);
    }

    #[test]
    fn test_json_rejects_garbage() {
        let err = Format::Json.decode(b"{not json").unwrap_err();
        assert_eq!(err.operation(), "decode");
    }
}
