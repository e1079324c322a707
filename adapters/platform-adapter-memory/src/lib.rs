//! In-process push platform.
//!
//! Models a browser-like environment: a worker container keyed by scope, a
//! push manager that issues one channel per registration, and a permission
//! prompt whose answer is scripted. Hosts without a real push platform (CLI
//! harnesses, integration tests) plug this in behind `PushPlatform`, together
//! with [`MemoryCloudMessaging`] and [`MemoryState`].
//!
//! Every platform call is appended to a [`CallLog`], which can be shared with
//! other doubles to assert the order of calls across adapters.

#![deny(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![forbid(unsafe_code)]

use std::{collections::HashMap, sync::Arc};

use async_trait::async_trait;
use parking_lot::Mutex;

use pushcoord::platform_adapter::{
	PlatformSubscription, PlatformSubscriptionKeys, PushPlatform, SubscribeOptions,
	WorkerRegistration, WorkerState,
};
use pushcoord::prelude::*;

mod messaging;
mod state;

pub use messaging::MemoryCloudMessaging;
pub use state::MemoryState;

/// Ordered record of adapter calls
pub type CallLog = Arc<Mutex<Vec<String>>>;

pub fn new_call_log() -> CallLog {
	Arc::new(Mutex::new(Vec::new()))
}

/// How the simulated user answers the permission prompt
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PromptAnswer {
	Grant,
	Deny,
	/// Closes the prompt without deciding; permission stays `default`
	Dismiss,
	/// Never answers
	Ignore,
}

#[derive(Debug)]
struct Registration {
	script_path: Box<str>,
	state: WorkerState,
	subscription: Option<PlatformSubscription>,
}

#[derive(Debug)]
struct PlatformState {
	notification_surface: bool,
	worker_host: bool,
	push_manager: bool,
	permission: PermissionState,
	prompt_answer: PromptAnswer,
	worker_rejection: Option<String>,
	decline_channel: bool,
	stall_activation: bool,
	registrations: HashMap<Box<str>, Registration>,
	next_channel_id: u64,
	prompts: usize,
	channels_created: usize,
	channels_removed: usize,
}

#[derive(Debug)]
pub struct MemoryPlatform {
	state: Mutex<PlatformState>,
	log: CallLog,
}

impl Default for MemoryPlatform {
	fn default() -> Self {
		Self::new()
	}
}

impl MemoryPlatform {
	/// A fully capable platform with permission still undecided
	pub fn new() -> Self {
		Self::with_call_log(new_call_log())
	}

	pub fn with_call_log(log: CallLog) -> Self {
		Self {
			state: Mutex::new(PlatformState {
				notification_surface: true,
				worker_host: true,
				push_manager: true,
				permission: PermissionState::Default,
				prompt_answer: PromptAnswer::Grant,
				worker_rejection: None,
				decline_channel: false,
				stall_activation: false,
				registrations: HashMap::new(),
				next_channel_id: 1,
				prompts: 0,
				channels_created: 0,
				channels_removed: 0,
			}),
			log,
		}
	}

	/// A platform lacking the push manager, like an old browser
	pub fn without_push_manager() -> Self {
		let platform = Self::new();
		platform.state.lock().push_manager = false;
		platform
	}

	pub fn call_log(&self) -> CallLog {
		Arc::clone(&self.log)
	}

	pub fn calls(&self) -> Vec<String> {
		self.log.lock().clone()
	}

	// Scripting
	pub fn set_primitives(&self, notification_surface: bool, worker_host: bool, push_manager: bool) {
		let mut state = self.state.lock();
		state.notification_surface = notification_surface;
		state.worker_host = worker_host;
		state.push_manager = push_manager;
	}

	/// Changes the permission out of band, as a user editing OS settings would
	pub fn set_permission(&self, permission: PermissionState) {
		self.state.lock().permission = permission;
	}

	pub fn answer_prompt_with(&self, answer: PromptAnswer) {
		self.state.lock().prompt_answer = answer;
	}

	pub fn reject_worker(&self, reason: impl Into<String>) {
		self.state.lock().worker_rejection = Some(reason.into());
	}

	pub fn decline_channel(&self, decline: bool) {
		self.state.lock().decline_channel = decline;
	}

	pub fn stall_activation(&self, stall: bool) {
		self.state.lock().stall_activation = stall;
	}

	/// Drops every live channel without telling anyone, as a push service
	/// expiring a subscription would
	pub fn expire_channels(&self) {
		for reg in self.state.lock().registrations.values_mut() {
			reg.subscription = None;
		}
	}

	// Inspection
	pub fn prompt_count(&self) -> usize {
		self.state.lock().prompts
	}

	pub fn channels_created(&self) -> usize {
		self.state.lock().channels_created
	}

	pub fn channels_removed(&self) -> usize {
		self.state.lock().channels_removed
	}

	pub fn live_channel(&self, scope: &str) -> Option<PlatformSubscription> {
		self.state.lock().registrations.get(scope).and_then(|reg| reg.subscription.clone())
	}

	fn record(&self, call: impl Into<String>) {
		self.log.lock().push(call.into());
	}
}

#[async_trait]
impl PushPlatform for MemoryPlatform {
	fn has_notification_surface(&self) -> bool {
		self.state.lock().notification_surface
	}

	fn has_worker_host(&self) -> bool {
		self.state.lock().worker_host
	}

	fn has_push_manager(&self) -> bool {
		self.state.lock().push_manager
	}

	fn permission(&self) -> PermissionState {
		let state = self.state.lock();
		if state.notification_surface { state.permission } else { PermissionState::Unsupported }
	}

	async fn request_permission(&self) -> PcResult<PermissionState> {
		self.record("platform.request_permission");
		let answer = {
			let mut state = self.state.lock();
			if !state.notification_surface {
				return Err(Error::Unsupported);
			}
			// Browsers only show the prompt while undecided
			if state.permission != PermissionState::Default {
				return Ok(state.permission);
			}
			state.prompts += 1;
			match state.prompt_answer {
				PromptAnswer::Grant => state.permission = PermissionState::Granted,
				PromptAnswer::Deny => state.permission = PermissionState::Denied,
				PromptAnswer::Dismiss | PromptAnswer::Ignore => {}
			}
			state.prompt_answer
		};

		if answer == PromptAnswer::Ignore {
			std::future::pending::<()>().await;
		}
		Ok(self.state.lock().permission)
	}

	async fn register_worker(
		&self,
		script_path: &str,
		scope: &str,
	) -> PcResult<WorkerRegistration> {
		self.record(format!("platform.register_worker {}", script_path));
		let mut state = self.state.lock();
		if !state.worker_host {
			return Err(Error::Unsupported);
		}
		if let Some(reason) = &state.worker_rejection {
			return Err(Error::WorkerRegistrationFailed(reason.clone()));
		}

		let reg = state.registrations.entry(scope.into()).or_insert_with(|| Registration {
			script_path: script_path.into(),
			state: WorkerState::Installing,
			subscription: None,
		});
		// A new script for the same scope replaces the worker, keeping the channel
		if *reg.script_path != *script_path {
			reg.script_path = script_path.into();
			reg.state = WorkerState::Installing;
		}
		Ok(WorkerRegistration {
			scope: scope.into(),
			script_path: reg.script_path.clone(),
			state: reg.state,
		})
	}

	async fn wait_active(
		&self,
		registration: &WorkerRegistration,
	) -> PcResult<WorkerRegistration> {
		if self.state.lock().stall_activation {
			std::future::pending::<()>().await;
		}

		let mut state = self.state.lock();
		let reg = state.registrations.get_mut(&registration.scope).ok_or_else(|| {
			Error::WorkerRegistrationFailed(format!("no registration for {}", registration.scope))
		})?;
		reg.state = WorkerState::Activated;
		Ok(WorkerRegistration {
			scope: registration.scope.clone(),
			script_path: reg.script_path.clone(),
			state: reg.state,
		})
	}

	async fn get_subscription(
		&self,
		registration: &WorkerRegistration,
	) -> PcResult<Option<PlatformSubscription>> {
		Ok(self.live_channel(&registration.scope))
	}

	async fn subscribe(
		&self,
		registration: &WorkerRegistration,
		opts: &SubscribeOptions,
	) -> PcResult<PlatformSubscription> {
		self.record("platform.subscribe");
		let mut state = self.state.lock();
		if !state.push_manager {
			return Err(Error::Unsupported);
		}
		if !opts.user_visible_only {
			return Err(Error::PushChannelDenied);
		}
		if state.decline_channel || state.permission != PermissionState::Granted {
			return Err(Error::PushChannelDenied);
		}

		let channel_id = state.next_channel_id;
		let PlatformState { registrations, .. } = &mut *state;
		let reg = registrations.get_mut(&registration.scope).ok_or_else(|| {
			Error::WorkerRegistrationFailed(format!("no registration for {}", registration.scope))
		})?;
		if reg.state != WorkerState::Activated {
			return Err(Error::WorkerRegistrationFailed("no active worker".into()));
		}
		// The push manager deduplicates by scope
		if let Some(existing) = &reg.subscription {
			return Ok(existing.clone());
		}

		let subscription = PlatformSubscription {
			endpoint: format!("https://push.example.net/send/{:016x}", channel_id).into(),
			expiration_time: None,
			keys: PlatformSubscriptionKeys {
				p256dh: format!("BPk{:016x}", channel_id).into(),
				auth: format!("au{:08x}", channel_id).into(),
			},
		};
		reg.subscription = Some(subscription.clone());
		state.next_channel_id += 1;
		state.channels_created += 1;
		debug!(endpoint = %subscription.endpoint, "Memory platform channel created");
		Ok(subscription)
	}

	async fn unsubscribe(&self, registration: &WorkerRegistration) -> PcResult<bool> {
		self.record("platform.unsubscribe");
		let mut state = self.state.lock();
		let removed = state
			.registrations
			.get_mut(&registration.scope)
			.and_then(|reg| reg.subscription.take())
			.is_some();
		if removed {
			state.channels_removed += 1;
		}
		Ok(removed)
	}
}

// vim: ts=4
