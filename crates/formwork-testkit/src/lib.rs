//! Formwork Testing Infrastructure
//!
//! Common setup for tests that drive fields, groups and forms: a local
//! runtime wrapper for async validation, a recorder that captures every
//! committed snapshot, async validators that count their invocations, and
//! proptest strategies for the core vocabulary.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(missing_docs)]
//!
//! # Usage
//!
//! ```toml
//! [dev-dependencies]
//! formwork-testkit = { path = "../formwork-testkit" }
//! ```
//!
//! ```rust,no_run
//! use formwork_testkit::*;
//!
//! #[tokio::test(start_paused = true)]
//! async fn my_test() {
//!     run_local(async {
//!         // create fields, set values, then
//!         settle(std::time::Duration::from_millis(50)).await;
//!     })
//!     .await;
//! }
//! ```

pub mod assertions;
pub mod recorder;
pub mod runtime;
pub mod strategies;
pub mod validators;

pub use assertions::*;
pub use recorder::StateRecorder;
pub use runtime::{init_tracing, run_local, settle};
pub use validators::{
    failing_validator, never_validator, panicking_validator, timed_validator, InvocationCounter,
};

// Re-exported for the assertion macros
pub use formwork_core;
