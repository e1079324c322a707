//! Cloud-messaging channel
//!
//! The provider delivers through the same background worker, but hands out
//! an opaque device token instead of the raw endpoint. The token is mapped
//! onto the provider's send URL so the backend sees one endpoint shape.

use std::sync::Arc;

use crate::prelude::*;
use crate::webpush::{ensure_worker, WorkerOpts};
use pushcoord_core::{with_timeout, VapidKey};
use pushcoord_types::messaging_adapter::CloudMessagingAdapter;
use pushcoord_types::platform_adapter::PushPlatform;
use pushcoord_types::types::{Credential, Subscription};

pub const FCM_ENDPOINT_BASE: &str = "https://fcm.googleapis.com/fcm/send/";

#[derive(Debug, Clone)]
pub struct CloudMessageSubscriber {
	platform: Arc<dyn PushPlatform>,
	messaging: Arc<dyn CloudMessagingAdapter>,
	opts: WorkerOpts,
}

impl CloudMessageSubscriber {
	pub fn new(
		platform: Arc<dyn PushPlatform>,
		messaging: Arc<dyn CloudMessagingAdapter>,
		opts: WorkerOpts,
	) -> Self {
		Self { platform, messaging, opts }
	}

	/// Obtains a device token, or returns the one already issued
	pub async fn subscribe(&self, key: &VapidKey) -> PcResult<Subscription> {
		if !self.messaging.is_supported() {
			return Err(Error::Unsupported);
		}
		let registration = ensure_worker(self.platform.as_ref(), &self.opts).await?;

		if let Some(token) = self.messaging.current_token().await? {
			debug!("Reusing cloud-messaging token");
			return Ok(to_subscription(token));
		}

		let token = with_timeout(
			"token request",
			self.opts.step_timeout,
			self.messaging.get_token(key.as_bytes(), &registration),
		)
		.await?;
		match token {
			Some(token) if !token.is_empty() => {
				let sub = to_subscription(token);
				info!(endpoint = %sub.endpoint, "Cloud-messaging token issued");
				Ok(sub)
			}
			_ => {
				warn!("Cloud-messaging provider issued no token");
				Err(Error::PushChannelDenied)
			}
		}
	}

	pub async fn current(&self) -> PcResult<Option<Subscription>> {
		Ok(self.messaging.current_token().await?.map(to_subscription))
	}

	pub async fn unsubscribe(&self) -> PcResult<bool> {
		let removed =
			with_timeout("token delete", self.opts.step_timeout, self.messaging.delete_token()).await?;
		info!(removed, "Cloud-messaging token deleted");
		Ok(removed)
	}
}

fn to_subscription(token: Box<str>) -> Subscription {
	Subscription {
		endpoint: format!("{}{}", FCM_ENDPOINT_BASE, token).into(),
		channel: ChannelKind::Fcm,
		credential: Credential::Token { token },
		created_at: Timestamp::now(),
		expiration_time: None,
	}
}

// vim: ts=4
