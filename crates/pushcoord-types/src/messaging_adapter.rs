//! Adapter for a cloud-messaging provider that issues its own device token
//! instead of exposing the raw push endpoint.

use async_trait::async_trait;
use std::fmt::Debug;

use crate::platform_adapter::WorkerRegistration;
use crate::prelude::*;

#[async_trait]
pub trait CloudMessagingAdapter: Debug + Send + Sync {
	/// Whether the provider can run in this environment at all
	fn is_supported(&self) -> bool;

	/// Obtains (or returns the cached) device token, bound to the VAPID key
	/// and delivered through the given worker.
	///
	/// `Ok(None)` means the provider refused to issue a token, which the
	/// coordinator treats as a declined channel. Provider outages must be
	/// reported as `NetworkTransient`, never folded into `Ok(None)`.
	async fn get_token(
		&self,
		vapid_key: &[u8],
		registration: &WorkerRegistration,
	) -> PcResult<Option<Box<str>>>;

	/// The token issued earlier in this session, without contacting the provider
	async fn current_token(&self) -> PcResult<Option<Box<str>>>;

	/// Invalidates the token. Returns false if there was none.
	async fn delete_token(&self) -> PcResult<bool>;
}

// vim: ts=4
