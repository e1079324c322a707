//! Backend registry client
//!
//! [`BackendRegistrar`] owns the retry policy, the bearer token source and the
//! cancellation of pending backoffs. [`HttpRegistry`] is the wire client for
//! the registry endpoints:
//!
//! - `GET  /notifications/vapid-public-key`
//! - `POST /notifications/register-web`
//! - `POST /notifications/unregister-web`

#![deny(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![forbid(unsafe_code)]

pub mod http;
pub mod registrar;

mod prelude;

pub use http::HttpRegistry;
pub use registrar::BackendRegistrar;

// vim: ts=4
