//! Raw web push channel
//!
//! Two platform steps, each a suspension point under the step timeout:
//! register (or reuse) the background worker and wait for it to activate,
//! then ask its push manager for a user-visible channel bound to the VAPID key.

use std::sync::Arc;
use std::time::Duration;

use crate::prelude::*;
use pushcoord_core::{with_timeout, CoordinatorOpts, VapidKey};
use pushcoord_types::platform_adapter::{
	PlatformSubscription, PushPlatform, SubscribeOptions, WorkerRegistration, WorkerState,
};
use pushcoord_types::types::{Credential, Subscription};

/// Where the background worker lives and how long each platform step may take
#[derive(Clone, Debug)]
pub struct WorkerOpts {
	pub script_path: Box<str>,
	pub scope: Box<str>,
	pub step_timeout: Duration,
}

impl WorkerOpts {
	pub fn from_opts(opts: &CoordinatorOpts) -> Self {
		Self {
			script_path: opts.worker_path.clone(),
			scope: opts.worker_scope.clone(),
			step_timeout: opts.step_timeout(),
		}
	}
}

impl Default for WorkerOpts {
	fn default() -> Self {
		Self::from_opts(&CoordinatorOpts::default())
	}
}

/// Registers (or reuses) the worker and waits until it is active
pub(crate) async fn ensure_worker(
	platform: &dyn PushPlatform,
	opts: &WorkerOpts,
) -> PcResult<WorkerRegistration> {
	let registration = with_timeout(
		"worker registration",
		opts.step_timeout,
		platform.register_worker(&opts.script_path, &opts.scope),
	)
	.await?;

	if registration.state == WorkerState::Activated {
		return Ok(registration);
	}
	debug!(scope = %registration.scope, state = ?registration.state, "Waiting for worker activation");
	let registration =
		with_timeout("worker activation", opts.step_timeout, platform.wait_active(&registration))
			.await?;
	if registration.state != WorkerState::Activated {
		return Err(Error::WorkerRegistrationFailed(format!(
			"worker ended in state {:?}",
			registration.state
		)));
	}
	Ok(registration)
}

#[derive(Debug, Clone)]
pub struct WebPushSubscriber {
	platform: Arc<dyn PushPlatform>,
	opts: WorkerOpts,
}

impl WebPushSubscriber {
	pub fn new(platform: Arc<dyn PushPlatform>, opts: WorkerOpts) -> Self {
		Self { platform, opts }
	}

	/// Opens the push channel, or returns the live one unchanged
	pub async fn subscribe(&self, key: &VapidKey) -> PcResult<Subscription> {
		let registration = ensure_worker(self.platform.as_ref(), &self.opts).await?;

		if let Some(existing) = self.lookup(&registration).await? {
			debug!(endpoint = %existing.endpoint, "Reusing live push channel");
			return Ok(to_subscription(existing));
		}

		let opts = SubscribeOptions::visible(key.as_bytes());
		let created =
			with_timeout("push subscribe", self.opts.step_timeout, self.platform.subscribe(&registration, &opts))
				.await?;
		if created.endpoint.is_empty() {
			return Err(Error::Internal("platform returned an empty endpoint".into()));
		}
		info!(endpoint = %created.endpoint, "Push channel created");
		Ok(to_subscription(created))
	}

	/// The live channel, re-derived from the platform
	pub async fn current(&self) -> PcResult<Option<Subscription>> {
		let registration = ensure_worker(self.platform.as_ref(), &self.opts).await?;
		Ok(self.lookup(&registration).await?.map(to_subscription))
	}

	/// Tears down the channel. Returns false if there was none.
	pub async fn unsubscribe(&self) -> PcResult<bool> {
		let registration = ensure_worker(self.platform.as_ref(), &self.opts).await?;
		let removed = with_timeout(
			"push unsubscribe",
			self.opts.step_timeout,
			self.platform.unsubscribe(&registration),
		)
		.await?;
		info!(scope = %registration.scope, removed, "Push channel torn down");
		Ok(removed)
	}

	async fn lookup(&self, registration: &WorkerRegistration) -> PcResult<Option<PlatformSubscription>> {
		with_timeout(
			"push lookup",
			self.opts.step_timeout,
			self.platform.get_subscription(registration),
		)
		.await
	}
}

fn to_subscription(sub: PlatformSubscription) -> Subscription {
	Subscription {
		endpoint: sub.endpoint,
		channel: ChannelKind::WebPush,
		credential: Credential::Keys { p256dh: sub.keys.p256dh, auth: sub.keys.auth },
		created_at: Timestamp::now(),
		// Browser reports milliseconds
		expiration_time: sub.expiration_time.map(|ms| Timestamp(ms / 1000)),
	}
}

// vim: ts=4
