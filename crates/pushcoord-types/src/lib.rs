//! Shared types, adapter traits, and error types for the push subscription
//! coordinator.
//!
//! Everything the coordinator talks to (the push platform, the cloud
//! messaging provider, the backend registry, the auth token source and the
//! durable state store) is an adapter trait defined here, so the coordinator
//! crates and the adapter crates can depend on this crate alone.

#![deny(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![forbid(unsafe_code)]

pub mod auth;
pub mod error;
pub mod messaging_adapter;
pub mod platform_adapter;
pub mod prelude;
pub mod registry_adapter;
pub mod state_adapter;
pub mod types;

// vim: ts=4
