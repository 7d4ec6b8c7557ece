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

//! Test harness for Transit.
//!
//! [`transit_test`] turns an `async fn` returning a `Result` into a `#[test]`
//! that runs on its own multi-thread tokio runtime inside a `transit_test`
//! tracing span, and reports panics raised on any runtime thread with their
//! location.
//!
//! ```ignore
//! use transit_test::prelude::*;
//!
//! #[transit_test]
//! async fn test_move() -> anyhow::Result<()> {
//!     Ok(())
//! }
//! ```

pub use transit_test_macro::transit_test;

/// Everything a test module needs.
pub mod prelude {
    pub use crate::transit_test;
}

/// Crates the generated test code refers to.
#[doc(hidden)]
pub mod __private {
    pub use parking_lot;
    pub use tokio;
    pub use tracing;
}
