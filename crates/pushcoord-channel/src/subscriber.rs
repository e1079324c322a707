//! Channel subscriber
//!
//! The variant is picked once from capability detection. A third substrate
//! is a new variant here; the lifecycle manager does not change.

use std::sync::Arc;

use crate::cloud_message::CloudMessageSubscriber;
use crate::prelude::*;
use crate::webpush::{WebPushSubscriber, WorkerOpts};
use pushcoord_core::{Detection, VapidKey};
use pushcoord_types::messaging_adapter::CloudMessagingAdapter;
use pushcoord_types::platform_adapter::PushPlatform;
use pushcoord_types::types::Subscription;

#[derive(Debug, Clone)]
pub enum ChannelSubscriber {
	WebPush(WebPushSubscriber),
	CloudMessage(CloudMessageSubscriber),
}

impl ChannelSubscriber {
	/// Picks the channel for `preferred`, falling back to raw web push when
	/// the cloud-messaging provider is absent or unsupported
	pub fn select(
		detection: &Detection,
		preferred: ChannelKind,
		platform: Arc<dyn PushPlatform>,
		messaging: Option<Arc<dyn CloudMessagingAdapter>>,
		opts: WorkerOpts,
	) -> Self {
		match (detection.select_channel(preferred), messaging) {
			(ChannelKind::Fcm, Some(messaging)) => {
				ChannelSubscriber::CloudMessage(CloudMessageSubscriber::new(platform, messaging, opts))
			}
			(kind, _) => {
				if kind != preferred {
					info!(preferred = %preferred, "Preferred channel unavailable, using web push");
				}
				ChannelSubscriber::WebPush(WebPushSubscriber::new(platform, opts))
			}
		}
	}

	pub fn kind(&self) -> ChannelKind {
		match self {
			ChannelSubscriber::WebPush(_) => ChannelKind::WebPush,
			ChannelSubscriber::CloudMessage(_) => ChannelKind::Fcm,
		}
	}

	pub async fn subscribe(&self, key: &VapidKey) -> PcResult<Subscription> {
		match self {
			ChannelSubscriber::WebPush(s) => s.subscribe(key).await,
			ChannelSubscriber::CloudMessage(s) => s.subscribe(key).await,
		}
	}

	pub async fn current(&self) -> PcResult<Option<Subscription>> {
		match self {
			ChannelSubscriber::WebPush(s) => s.current().await,
			ChannelSubscriber::CloudMessage(s) => s.current().await,
		}
	}

	pub async fn unsubscribe(&self) -> PcResult<bool> {
		match self {
			ChannelSubscriber::WebPush(s) => s.unsubscribe().await,
			ChannelSubscriber::CloudMessage(s) => s.unsubscribe().await,
		}
	}
}

// vim: ts=4
