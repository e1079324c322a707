//! Coordinator builder - wires the adapters into a `Coordinator`

use std::path::PathBuf;
use std::sync::Arc;

use crate::lifecycle::Coordinator;
use crate::prelude::*;
use pushcoord_channel::{ChannelSubscriber, WorkerOpts};
use pushcoord_core::{CapabilityDetector, CoordinatorOpts, RetryPolicy};
use pushcoord_registrar::{BackendRegistrar, HttpRegistry};
use pushcoord_types::auth::AuthTokenProvider;
use pushcoord_types::messaging_adapter::CloudMessagingAdapter;
use pushcoord_types::platform_adapter::PushPlatform;
use pushcoord_types::registry_adapter::RegistryAdapter;
use pushcoord_types::state_adapter::StateAdapter;

#[derive(Debug, Default)]
pub struct CoordinatorBuilder {
	opts: CoordinatorOpts,
	platform: Option<Arc<dyn PushPlatform>>,
	messaging: Option<Arc<dyn CloudMessagingAdapter>>,
	registry: Option<Arc<dyn RegistryAdapter>>,
	auth: Option<Arc<dyn AuthTokenProvider>>,
	state_adapter: Option<Arc<dyn StateAdapter>>,
}

impl CoordinatorBuilder {
	pub fn new() -> Self {
		Self::default()
	}

	// Opts
	pub fn opts(&mut self, opts: CoordinatorOpts) -> &mut Self {
		self.opts = opts;
		self
	}
	pub fn base_url(&mut self, base_url: impl Into<Box<str>>) -> &mut Self {
		self.opts.base_url = base_url.into();
		self
	}
	pub fn worker_path(&mut self, worker_path: impl Into<Box<str>>) -> &mut Self {
		self.opts.worker_path = worker_path.into();
		self
	}
	pub fn worker_scope(&mut self, worker_scope: impl Into<Box<str>>) -> &mut Self {
		self.opts.worker_scope = worker_scope.into();
		self
	}
	pub fn vapid_public_key(&mut self, vapid_public_key: impl Into<Box<str>>) -> &mut Self {
		self.opts.vapid_public_key = Some(vapid_public_key.into());
		self
	}
	pub fn channel(&mut self, channel: ChannelKind) -> &mut Self {
		self.opts.channel = channel;
		self
	}
	pub fn step_timeout_ms(&mut self, step_timeout_ms: u64) -> &mut Self {
		self.opts.step_timeout_ms = step_timeout_ms;
		self
	}
	pub fn permission_timeout_ms(&mut self, permission_timeout_ms: u64) -> &mut Self {
		self.opts.permission_timeout_ms = permission_timeout_ms;
		self
	}
	pub fn request_timeout_ms(&mut self, request_timeout_ms: u64) -> &mut Self {
		self.opts.request_timeout_ms = request_timeout_ms;
		self
	}
	pub fn retry(&mut self, retry: RetryPolicy) -> &mut Self {
		self.opts.retry = retry;
		self
	}
	pub fn prompt_cooldown_secs(&mut self, prompt_cooldown_secs: u64) -> &mut Self {
		self.opts.prompt_cooldown_secs = prompt_cooldown_secs;
		self
	}
	pub fn state_dir(&mut self, state_dir: impl Into<PathBuf>) -> &mut Self {
		self.opts.state_dir = state_dir.into();
		self
	}

	// Adapters
	pub fn platform(&mut self, platform: Arc<dyn PushPlatform>) -> &mut Self {
		self.platform = Some(platform);
		self
	}
	pub fn messaging(&mut self, messaging: Arc<dyn CloudMessagingAdapter>) -> &mut Self {
		self.messaging = Some(messaging);
		self
	}
	/// Defaults to an HTTP client for `base_url`
	pub fn registry(&mut self, registry: Arc<dyn RegistryAdapter>) -> &mut Self {
		self.registry = Some(registry);
		self
	}
	pub fn auth(&mut self, auth: Arc<dyn AuthTokenProvider>) -> &mut Self {
		self.auth = Some(auth);
		self
	}
	pub fn state_adapter(&mut self, state_adapter: Arc<dyn StateAdapter>) -> &mut Self {
		self.state_adapter = Some(state_adapter);
		self
	}

	pub fn build(&self) -> PcResult<Coordinator> {
		self.opts.validate()?;

		let Some(platform) = self.platform.clone() else {
			error!("No push platform configured");
			return Err(Error::Internal("No push platform configured".to_string()));
		};
		let Some(auth) = self.auth.clone() else {
			error!("No auth token provider configured");
			return Err(Error::Internal("No auth token provider configured".to_string()));
		};
		let Some(state_adapter) = self.state_adapter.clone() else {
			error!("No state adapter configured");
			return Err(Error::Internal("No state adapter configured".to_string()));
		};
		let registry: Arc<dyn RegistryAdapter> = match &self.registry {
			Some(registry) => registry.clone(),
			None => Arc::new(HttpRegistry::new(&self.opts.base_url, self.opts.request_timeout())?),
		};

		let detector = CapabilityDetector::new(platform.clone(), self.messaging.clone());
		let subscriber = ChannelSubscriber::select(
			&detector.detect(),
			self.opts.channel,
			platform.clone(),
			self.messaging.clone(),
			WorkerOpts::from_opts(&self.opts),
		);
		let registrar = BackendRegistrar::new(registry, auth, self.opts.retry);

		Ok(Coordinator::new(self.opts.clone(), platform, detector, subscriber, registrar, state_adapter))
	}
}

// vim: ts=4
