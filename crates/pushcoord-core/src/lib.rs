//! Core policy for the push subscription coordinator.
//!
//! Everything here is either pure (key codec, prompt gate, retry schedule) or
//! a thin query against an adapter (capability detection), so it can be unit
//! tested without a platform or a network.

#![deny(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![forbid(unsafe_code)]

pub mod capability;
pub mod key_codec;
pub mod prelude;
pub mod prompt_gate;
pub mod retry;
pub mod settings;
pub mod timeout;

pub use capability::{CapabilityDetector, Detection};
pub use key_codec::VapidKey;
pub use prompt_gate::{should_prompt, PromptGate};
pub use retry::RetryPolicy;
pub use settings::CoordinatorOpts;
pub use timeout::with_timeout;

// vim: ts=4
