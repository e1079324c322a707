//! Backend registrar
//!
//! Wraps a `RegistryAdapter` with the bearer token source and the retry
//! policy. Only `NetworkTransient` failures are retried; everything else is
//! surfaced on the first occurrence. Backoff sleeps and in-flight attempts
//! abort with `Cancelled` once the registrar is shut down.

use std::future::Future;
use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use crate::prelude::*;
use pushcoord_core::{RetryPolicy, VapidKey};
use pushcoord_types::auth::AuthTokenProvider;
use pushcoord_types::registry_adapter::RegistryAdapter;
use pushcoord_types::types::{RegistrationRequest, Subscription};

#[derive(Debug)]
pub struct BackendRegistrar {
	registry: Arc<dyn RegistryAdapter>,
	auth: Arc<dyn AuthTokenProvider>,
	retry: RetryPolicy,
	cancel: CancellationToken,
}

impl BackendRegistrar {
	pub fn new(
		registry: Arc<dyn RegistryAdapter>,
		auth: Arc<dyn AuthTokenProvider>,
		retry: RetryPolicy,
	) -> Self {
		Self { registry, auth, retry, cancel: CancellationToken::new() }
	}

	/// Aborts pending backoffs and in-flight attempts; later calls fail fast
	pub fn shutdown(&self) {
		self.cancel.cancel();
	}

	pub fn is_shut_down(&self) -> bool {
		self.cancel.is_cancelled()
	}

	async fn bearer(&self) -> PcResult<Box<str>> {
		match self.auth.token().await {
			Some(token) if !token.is_empty() => Ok(token),
			_ => Err(Error::Unauthenticated),
		}
	}

	/// Pairs the subscription with the current bearer token
	pub async fn registration_request(&self, subscription: &Subscription) -> PcResult<RegistrationRequest> {
		Ok(RegistrationRequest { subscription: subscription.clone(), auth_token: self.bearer().await? })
	}

	/// Upserts the subscription in the backend registry
	pub async fn register(&self, req: &RegistrationRequest) -> PcResult<()> {
		if req.auth_token.is_empty() {
			return Err(Error::Unauthenticated);
		}
		info!(endpoint = %req.subscription.endpoint, channel = %req.subscription.channel, "Registering push subscription");
		self.with_retry("register", exhausted_rejection, || self.registry.register(req)).await?;
		debug!(endpoint = %req.subscription.endpoint, "Push subscription registered");
		Ok(())
	}

	/// Removes the endpoint from the backend registry
	pub async fn unregister(&self, endpoint: &str) -> PcResult<()> {
		let token = self.bearer().await?;
		info!(endpoint = %endpoint, "Unregistering push subscription");
		self.with_retry("unregister", exhausted_rejection, || self.registry.unregister(endpoint, &token))
			.await
	}

	/// Fetches and decodes the application's VAPID public key
	pub async fn fetch_vapid_key(&self) -> PcResult<VapidKey> {
		let token = self.auth.token().await;
		let encoded = self
			.with_retry("vapid key", exhausted_transient, || {
				self.registry.fetch_vapid_key(token.as_deref())
			})
			.await?;
		VapidKey::decode(&encoded)
	}

	async fn with_retry<T, F, Fut>(
		&self,
		op: &'static str,
		on_exhausted: fn(u16, Error) -> Error,
		mut call: F,
	) -> PcResult<T>
	where
		F: FnMut() -> Fut,
		Fut: Future<Output = PcResult<T>>,
	{
		let mut retries: u16 = 0;
		loop {
			if self.cancel.is_cancelled() {
				return Err(Error::Cancelled);
			}

			let res = tokio::select! {
				() = self.cancel.cancelled() => Err(Error::Cancelled),
				res = call() => res,
			};

			match res {
				Ok(value) => return Ok(value),
				Err(err) if err.is_transient() => {
					if !self.retry.should_retry(retries) {
						let attempts = retries.saturating_add(1);
						error!(op, attempts, error = %err, "Registry call failed, retries exhausted");
						return Err(on_exhausted(attempts, err));
					}
					let backoff = self.retry.calculate_backoff(retries);
					retries += 1;
					warn!(
						op,
						attempt = retries,
						backoff_ms = u64::try_from(backoff.as_millis()).unwrap_or(u64::MAX),
						error = %err,
						"Transient registry failure, retrying"
					);
					tokio::select! {
						() = self.cancel.cancelled() => return Err(Error::Cancelled),
						() = tokio::time::sleep(backoff) => {}
					}
				}
				Err(err) => {
					warn!(op, error = %err, "Registry call failed");
					return Err(err);
				}
			}
		}
	}
}

fn exhausted_rejection(attempts: u16, err: Error) -> Error {
	Error::RegistrationRejected(RejectReason::RetriesExhausted { attempts, last_error: err.to_string() })
}

fn exhausted_transient(_attempts: u16, err: Error) -> Error {
	err
}

// vim: ts=4
