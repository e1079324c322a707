//! Adapter for the runtime's push platform: notification permission, the
//! background worker host and the push manager.
//!
//! Implementations map platform failures onto the coordinator's taxonomy:
//! worker rejection is `WorkerRegistrationFailed`, a declined push channel is
//! `PushChannelDenied`. The probe methods are cheap and side-effect free.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;
use std::fmt::Debug;

use crate::prelude::*;

/// Lifecycle of a background worker
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WorkerState {
	Installing,
	Installed,
	Activating,
	Activated,
	Redundant,
}

/// Handle to a registered background worker
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WorkerRegistration {
	pub scope: Box<str>,
	pub script_path: Box<str>,
	pub state: WorkerState,
}

/// Options for opening a push channel
#[derive(Clone, Debug)]
pub struct SubscribeOptions {
	/// Every push must surface a visible notification. Always true here.
	pub user_visible_only: bool,
	/// Decoded VAPID public key
	pub application_server_key: Box<[u8]>,
}

impl SubscribeOptions {
	pub fn visible(application_server_key: &[u8]) -> Self {
		Self { user_visible_only: true, application_server_key: application_server_key.into() }
	}
}

/// Push channel as returned by the platform, in the browser's JSON shape
#[skip_serializing_none]
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlatformSubscription {
	pub endpoint: Box<str>,
	/// Unix timestamp in milliseconds
	#[serde(rename = "expirationTime")]
	pub expiration_time: Option<i64>,
	pub keys: PlatformSubscriptionKeys,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlatformSubscriptionKeys {
	/// P-256 public key (base64url encoded)
	pub p256dh: Box<str>,
	/// Auth secret (base64url encoded)
	pub auth: Box<str>,
}

#[async_trait]
pub trait PushPlatform: Debug + Send + Sync {
	// Capability probes
	fn has_notification_surface(&self) -> bool;
	fn has_worker_host(&self) -> bool;
	fn has_push_manager(&self) -> bool;

	/// Current notification permission, re-read on every call
	fn permission(&self) -> PermissionState;

	/// Shows the platform permission prompt and waits for the user's answer
	async fn request_permission(&self) -> PcResult<PermissionState>;

	/// Registers the worker script, or returns the existing registration for
	/// the same scope
	async fn register_worker(&self, script_path: &str, scope: &str)
	-> PcResult<WorkerRegistration>;

	/// Waits until the registration has an activated worker
	async fn wait_active(&self, registration: &WorkerRegistration)
	-> PcResult<WorkerRegistration>;

	/// The live push channel of this registration, if any
	async fn get_subscription(
		&self,
		registration: &WorkerRegistration,
	) -> PcResult<Option<PlatformSubscription>>;

	async fn subscribe(
		&self,
		registration: &WorkerRegistration,
		opts: &SubscribeOptions,
	) -> PcResult<PlatformSubscription>;

	/// Tears down the push channel. Returns false if there was none.
	async fn unsubscribe(&self, registration: &WorkerRegistration) -> PcResult<bool>;
}

// vim: ts=4
