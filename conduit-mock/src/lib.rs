//! Test doubles for the conduit workspace.
//!
//! - [`DynamicMockBroker`]: a `Broker` whose every answer, delay and event is
//!   driven by a [`DynamicMockController`].
//! - [`ScriptedReset`]: a `ResetProvider` that counts runs, tracks overlap and
//!   fails or panics on chosen runs.
#![warn(missing_docs)]

mod dynamic;
mod reset;

pub use dynamic::{DynamicMockBroker, DynamicMockController, MockBehavior, MockCall, MockOp};
pub use reset::ScriptedReset;
