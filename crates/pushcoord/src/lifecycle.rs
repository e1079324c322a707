//! Subscription lifecycle manager
//!
//! Drives `Idle -> Detecting -> AwaitingPermission -> Subscribing ->
//! Registering -> Active`, with `Error(kind)` reachable from every step and
//! `Revoked` after an explicit unsubscribe.
//!
//! Operations are serialized by one async mutex, so a subscribe never
//! interleaves with a teardown. The canonical subscription is only set after
//! the registrar acknowledged it. A channel the platform confirmed but the
//! backend did not take is kept as *pending*; the next attempt re-registers it
//! instead of opening another channel.

use std::sync::Arc;

use tokio::sync::{watch, Mutex};

use crate::prelude::*;
use crate::state::{CoordinatorSnapshot, LifecycleState};
use pushcoord_channel::ChannelSubscriber;
use pushcoord_core::{
	should_prompt, with_timeout, CapabilityDetector, CoordinatorOpts, Detection, PromptGate, VapidKey,
};
use pushcoord_registrar::BackendRegistrar;
use pushcoord_types::platform_adapter::PushPlatform;
use pushcoord_types::state_adapter::StateAdapter;
use pushcoord_types::types::{DismissalRecord, Subscription};

#[derive(Debug, Default)]
struct Inner {
	state: LifecycleState,
	detection: Detection,
	subscription: Option<Subscription>,
	/// Confirmed by the platform, not yet acknowledged by the backend
	pending: Option<Subscription>,
	vapid_key: Option<VapidKey>,
	/// Set once the user denied permission in this session
	denied: bool,
}

#[derive(Debug)]
pub struct Coordinator {
	opts: CoordinatorOpts,
	platform: Arc<dyn PushPlatform>,
	detector: CapabilityDetector,
	subscriber: ChannelSubscriber,
	registrar: BackendRegistrar,
	state_adapter: Arc<dyn StateAdapter>,
	gate: PromptGate,
	inner: Mutex<Inner>,
	snapshot: watch::Sender<CoordinatorSnapshot>,
}

impl Coordinator {
	pub(crate) fn new(
		opts: CoordinatorOpts,
		platform: Arc<dyn PushPlatform>,
		detector: CapabilityDetector,
		subscriber: ChannelSubscriber,
		registrar: BackendRegistrar,
		state_adapter: Arc<dyn StateAdapter>,
	) -> Self {
		let detection = detector.detect();
		let (snapshot, _) = watch::channel(CoordinatorSnapshot {
			supported: detection.supported(),
			permission: detection.permission,
			state: LifecycleState::Idle,
			subscription: None,
		});
		info!(
			supported = detection.supported(),
			permission = %detection.permission,
			channel = %subscriber.kind(),
			"Push coordinator created"
		);
		Self {
			gate: PromptGate::new(opts.prompt_cooldown()),
			opts,
			platform,
			detector,
			subscriber,
			registrar,
			state_adapter,
			inner: Mutex::new(Inner { detection, ..Inner::default() }),
			snapshot,
		}
	}

	// Observers
	//***********

	pub fn snapshot(&self) -> CoordinatorSnapshot {
		self.snapshot.borrow().clone()
	}

	/// Receiver that sees every published snapshot
	pub fn watch(&self) -> watch::Receiver<CoordinatorSnapshot> {
		self.snapshot.subscribe()
	}

	pub fn supported(&self) -> bool {
		self.snapshot.borrow().supported
	}

	pub fn permission(&self) -> PermissionState {
		self.snapshot.borrow().permission
	}

	pub fn state(&self) -> LifecycleState {
		self.snapshot.borrow().state
	}

	pub fn subscription(&self) -> Option<Subscription> {
		self.snapshot.borrow().subscription.clone()
	}

	pub fn channel(&self) -> ChannelKind {
		self.subscriber.kind()
	}

	pub fn opts(&self) -> &CoordinatorOpts {
		&self.opts
	}

	// Operations
	//************

	/// Asks the user for notification permission
	///
	/// Never prompts when the platform already reports `denied` or the user
	/// denied earlier in this session.
	pub async fn request_permission(&self) -> PcResult<PermissionState> {
		let mut inner = self.inner.lock().await;
		let detection = self.detect(&mut inner);
		if !detection.supported() {
			return Err(self.fail(&mut inner, Error::Unsupported));
		}
		match self.ensure_permission(&mut inner, detection.permission).await {
			Ok(permission) => {
				if !inner.state.is_active() {
					self.transition(&mut inner, LifecycleState::Idle);
				}
				Ok(permission)
			}
			Err(err) => Err(self.fail(&mut inner, err)),
		}
	}

	/// Establishes the push channel and registers it with the backend
	///
	/// Idempotent: while `Active` with a live channel, no new channel is
	/// opened and the backend sees at most one extra (idempotent) register.
	pub async fn subscribe(&self) -> PcResult<Subscription> {
		let mut inner = self.inner.lock().await;
		match self.run_subscribe(&mut inner).await {
			Ok(sub) => Ok(sub),
			Err(err) => Err(self.fail(&mut inner, err)),
		}
	}

	/// Deregisters from the backend, then tears down the platform channel
	pub async fn unsubscribe(&self) -> PcResult<()> {
		let mut inner = self.inner.lock().await;
		match self.run_unsubscribe(&mut inner).await {
			Ok(()) => Ok(()),
			Err(err) => Err(self.fail(&mut inner, err)),
		}
	}

	/// Re-runs only the `Registering` step for a pending channel
	pub async fn retry_registration(&self) -> PcResult<Subscription> {
		let mut inner = self.inner.lock().await;
		if inner.state.is_active()
			&& let Some(sub) = &inner.subscription
		{
			return Ok(sub.clone());
		}
		let res = match self.live_pending(&mut inner).await {
			Ok(Some(pending)) => self.register(&mut inner, pending).await,
			Ok(None) => return Err(Error::Internal("no pending registration to retry".into())),
			Err(err) => Err(err),
		};
		res.map_err(|err| self.fail(&mut inner, err))
	}

	/// Re-polls capability and permission, picking up out-of-band changes
	pub async fn refresh(&self) -> Detection {
		let mut inner = self.inner.lock().await;
		let previous = inner.detection.permission;
		let detection = self.detect(&mut inner);

		if inner.denied && detection.permission == PermissionState::Default {
			info!("Notification permission reset from denied to default");
			inner.denied = false;
			if inner.state == LifecycleState::Error(ErrorKind::PermissionDenied) {
				self.transition(&mut inner, LifecycleState::Idle);
			}
		} else if previous != detection.permission {
			info!(from = %previous, to = %detection.permission, "Notification permission changed");
		}
		self.persist_permission(detection.permission).await;
		detection
	}

	/// Reconciles with the live platform channel at startup
	///
	/// The subscription is never restored from a local cache. If a live
	/// channel exists and permission is granted it is re-registered
	/// (idempotently) and the coordinator becomes `Active`.
	pub async fn restore(&self) -> PcResult<Option<Subscription>> {
		let mut inner = self.inner.lock().await;
		match self.state_adapter.read_permission().await {
			Ok(Some(last)) => debug!(last_known = %last, "Last-known permission"),
			Ok(None) => {}
			Err(err) => warn!(error = %err, "Cannot read last-known permission"),
		}

		self.transition(&mut inner, LifecycleState::Detecting);
		let detection = self.detect(&mut inner);
		self.persist_permission(detection.permission).await;
		if !detection.supported() || detection.permission != PermissionState::Granted {
			debug!(permission = %detection.permission, "Nothing to restore");
			self.transition(&mut inner, LifecycleState::Idle);
			return Ok(None);
		}

		let live = match self.subscriber.current().await {
			Ok(live) => live,
			Err(err) => return Err(self.fail(&mut inner, err)),
		};
		let Some(live) = live else {
			debug!("No live push channel to restore");
			self.transition(&mut inner, LifecycleState::Idle);
			return Ok(None);
		};
		info!(endpoint = %live.endpoint, "Restoring live push channel");
		match self.register(&mut inner, live).await {
			Ok(sub) => Ok(Some(sub)),
			Err(err) => Err(self.fail(&mut inner, err)),
		}
	}

	/// Whether the UI may show the permission prompt at `now`
	///
	/// Reads the last published snapshot, so it answers while another
	/// operation is in flight. False while a prompt is already showing.
	pub async fn should_prompt(&self, now: Timestamp) -> PcResult<bool> {
		let (supported, permission, state) = {
			let snapshot = self.snapshot.borrow();
			(snapshot.supported, snapshot.permission, snapshot.state)
		};
		if state == LifecycleState::AwaitingPermission {
			return Ok(false);
		}
		let dismissal = self.state_adapter.read_dismissal().await?;
		Ok(should_prompt(supported, permission, dismissal.as_ref(), now, self.gate.cooldown()))
	}

	/// Records that the user closed the prompt at `now`
	pub async fn dismiss_prompt(&self, now: Timestamp) -> PcResult<DismissalRecord> {
		let record = DismissalRecord { dismissed_at: now };
		self.state_adapter.write_dismissal(&record).await?;
		debug!(dismissed_at = %now, next_prompt_at = %self.gate.next_prompt_at(&record), "Prompt dismissed");
		Ok(record)
	}

	/// When the prompt cooldown ends, if a dismissal is on record
	pub async fn next_prompt_at(&self) -> PcResult<Option<Timestamp>> {
		let dismissal = self.state_adapter.read_dismissal().await?;
		Ok(dismissal.map(|record| self.gate.next_prompt_at(&record)))
	}

	/// Cancels pending registrar backoffs. Later registrar calls fail with
	/// `Cancelled`.
	pub fn shutdown(&self) {
		info!("Push coordinator shutting down");
		self.registrar.shutdown();
	}

	// Pipeline
	//**********

	async fn run_subscribe(&self, inner: &mut Inner) -> PcResult<Subscription> {
		if inner.state.is_active()
			&& let Some(active) = inner.subscription.clone()
		{
			match self.subscriber.current().await? {
				Some(live) if live.endpoint == active.endpoint => {
					debug!(endpoint = %active.endpoint, "Already subscribed, re-registering");
					return self.register(inner, active).await;
				}
				_ => {
					warn!(endpoint = %active.endpoint, "Active channel is gone, subscribing again");
					if let Err(err) = self.registrar.unregister(&active.endpoint).await {
						warn!(endpoint = %active.endpoint, error = %err, "Cannot unregister stale endpoint");
					}
					inner.subscription = None;
				}
			}
		}

		self.transition(inner, LifecycleState::Detecting);
		let detection = self.detect(inner);
		if !detection.supported() {
			return Err(Error::Unsupported);
		}
		self.ensure_permission(inner, detection.permission).await?;

		if let Some(pending) = self.live_pending(inner).await? {
			info!(endpoint = %pending.endpoint, "Resuming registration of pending channel");
			return self.register(inner, pending).await;
		}

		self.transition(inner, LifecycleState::Subscribing);
		let key = self.vapid_key(inner).await?;
		let sub = self.subscriber.subscribe(&key).await?;
		self.register(inner, sub).await
	}

	async fn run_unsubscribe(&self, inner: &mut Inner) -> PcResult<()> {
		let known = inner.subscription.clone().or_else(|| inner.pending.clone());
		let target = match known {
			Some(sub) => Some(sub),
			None if self.detect(inner).supported() => self.subscriber.current().await?,
			None => None,
		};

		if let Some(sub) = target {
			self.registrar.unregister(&sub.endpoint).await?;
			inner.subscription = None;
			inner.pending = None;
			self.publish(inner);
			self.subscriber.unsubscribe().await?;
			info!(endpoint = %sub.endpoint, "Push subscription revoked");
		} else {
			debug!("No push subscription to revoke");
		}
		self.transition(inner, LifecycleState::Revoked);
		Ok(())
	}

	/// Resolves the current permission, prompting the user if still undecided
	async fn ensure_permission(
		&self,
		inner: &mut Inner,
		permission: PermissionState,
	) -> PcResult<PermissionState> {
		match permission {
			PermissionState::Granted => return Ok(permission),
			PermissionState::Unsupported => return Err(Error::Unsupported),
			PermissionState::Denied => {
				inner.denied = true;
				return Err(Error::PermissionDenied);
			}
			PermissionState::Default if inner.denied => return Err(Error::PermissionDenied),
			PermissionState::Default => {}
		}

		self.transition(inner, LifecycleState::AwaitingPermission);
		let answer = with_timeout(
			"permission prompt",
			self.opts.permission_timeout(),
			self.platform.request_permission(),
		)
		.await?;
		inner.detection.permission = answer;
		self.publish(inner);
		self.persist_permission(answer).await;

		match answer {
			PermissionState::Granted => {
				info!("Notification permission granted");
				if let Err(err) = self.state_adapter.clear_dismissal().await {
					warn!(error = %err, "Cannot clear prompt dismissal");
				}
				Ok(answer)
			}
			PermissionState::Denied => {
				info!("Notification permission denied");
				inner.denied = true;
				Err(Error::PermissionDenied)
			}
			// Closed without deciding
			PermissionState::Default => Err(Error::PermissionDenied),
			PermissionState::Unsupported => Err(Error::Unsupported),
		}
	}

	/// Hands a platform-confirmed channel to the registrar
	async fn register(&self, inner: &mut Inner, sub: Subscription) -> PcResult<Subscription> {
		self.transition(inner, LifecycleState::Registering);
		inner.pending = Some(sub.clone());

		let req = self.registrar.registration_request(&sub).await?;
		self.registrar.register(&req).await?;

		inner.pending = None;
		inner.subscription = Some(sub.clone());
		self.transition(inner, LifecycleState::Active);
		info!(endpoint = %sub.endpoint, channel = %sub.channel, "Push subscription active");
		Ok(sub)
	}

	/// The pending channel, if the platform still has it
	async fn live_pending(&self, inner: &mut Inner) -> PcResult<Option<Subscription>> {
		let Some(pending) = inner.pending.clone() else {
			return Ok(None);
		};
		match self.subscriber.current().await? {
			Some(live) if live.endpoint == pending.endpoint => Ok(Some(pending)),
			_ => {
				warn!(endpoint = %pending.endpoint, "Pending channel is gone");
				inner.pending = None;
				Ok(None)
			}
		}
	}

	/// Static key from the settings, or fetched once per session
	async fn vapid_key(&self, inner: &mut Inner) -> PcResult<VapidKey> {
		if let Some(key) = &inner.vapid_key {
			return Ok(key.clone());
		}
		let key = match &self.opts.vapid_public_key {
			Some(encoded) => VapidKey::decode(encoded)?,
			None => self.registrar.fetch_vapid_key().await?,
		};
		if key.is_empty() {
			return Err(Error::MalformedKey("empty VAPID key".into()));
		}
		if !key.is_uncompressed_p256() {
			warn!(len = key.len(), "VAPID key is not an uncompressed P-256 point");
		}
		inner.vapid_key = Some(key.clone());
		Ok(key)
	}

	fn detect(&self, inner: &mut Inner) -> Detection {
		inner.detection = self.detector.detect();
		self.publish(inner);
		inner.detection
	}

	async fn persist_permission(&self, permission: PermissionState) {
		if let Err(err) = self.state_adapter.write_permission(permission).await {
			warn!(error = %err, "Cannot persist permission");
		}
	}

	fn transition(&self, inner: &mut Inner, next: LifecycleState) {
		if inner.state != next {
			debug!(from = %inner.state, to = %next, "Lifecycle transition");
			inner.state = next;
		}
		self.publish(inner);
	}

	fn publish(&self, inner: &Inner) {
		self.snapshot.send_replace(CoordinatorSnapshot {
			supported: inner.detection.supported(),
			permission: inner.detection.permission,
			state: inner.state,
			subscription: inner.subscription.clone(),
		});
	}

	fn fail(&self, inner: &mut Inner, err: Error) -> Error {
		let kind = err.kind();
		if kind == ErrorKind::Internal {
			error!(state = %inner.state, error = %err, "Push operation failed");
		} else {
			warn!(state = %inner.state, code = kind.code(), error = %err, "Push operation failed");
		}
		self.transition(inner, LifecycleState::Error(kind));
		err
	}
}

// vim: ts=4
