//! Adapter for the backend subscription registry.
//!
//! The backend's record is the source of truth for delivery; the coordinator
//! only caches it. Both calls are idempotent by endpoint.
//!
//! Implementations classify every outcome:
//! - 2xx: `Ok`
//! - 401/403: `Unauthenticated`
//! - 408/429/5xx, connect errors, timeouts: `NetworkTransient`
//! - other 4xx: `RegistrationRejected(Status)`

use async_trait::async_trait;
use std::fmt::Debug;

use crate::prelude::*;
use crate::types::RegistrationRequest;

#[async_trait]
pub trait RegistryAdapter: Debug + Send + Sync {
	/// Fetches the application's VAPID public key (base64url)
	async fn fetch_vapid_key(&self, auth_token: Option<&str>) -> PcResult<Box<str>>;

	/// Upserts the subscription, keyed by its endpoint
	async fn register(&self, req: &RegistrationRequest) -> PcResult<()>;

	/// Removes the record for `endpoint`; unknown endpoints are acknowledged
	async fn unregister(&self, endpoint: &str, auth_token: &str) -> PcResult<()>;
}

/// Maps an HTTP status of a registry call onto the error taxonomy
pub fn classify_status(status: u16) -> PcResult<()> {
	match status {
		200..=299 => Ok(()),
		401 | 403 => Err(Error::Unauthenticated),
		408 | 429 => Err(Error::NetworkTransient(format!("HTTP {}", status))),
		400..=499 => Err(Error::RegistrationRejected(RejectReason::Status(status))),
		_ => Err(Error::NetworkTransient(format!("HTTP {}", status))),
	}
}


// vim: ts=4
