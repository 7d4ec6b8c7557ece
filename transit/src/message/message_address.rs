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

/// The name under which an agent or a node can be reached.
///
/// Addresses are plain names rather than channel handles: a ticket or a
/// control record carrying an address must stay serialisable so it can be
/// shipped to another node. Resolving an address to a live endpoint is the
/// job of a [`Transport`](crate::traits::Transport).
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MessageAddress(String);

impl MessageAddress {
    /// Creates an address from any string-like name.
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Returns the name this address resolves to.
    #[inline]
    pub fn name(&self) -> &str {
        &self.0
    }

    /// Returns `true` when the address carries no name at all.
    ///
    /// Blank names (only whitespace) count as empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl fmt::Display for MessageAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for MessageAddress {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl From<String> for MessageAddress {
    fn from(name: String) -> Self {
        Self(name)
    }
}

impl From<&MessageAddress> for MessageAddress {
    fn from(address: &MessageAddress) -> Self {
        address.clone()
    }
}
