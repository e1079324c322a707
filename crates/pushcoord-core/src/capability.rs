//! Capability detection
//!
//! A pure query against the platform adapters. It is cheap, so the
//! coordinator re-runs it whenever it needs a fresh view, which is how
//! out-of-band permission changes in the OS settings get picked up.

use serde::Serialize;
use std::sync::Arc;

use crate::prelude::*;
use pushcoord_types::messaging_adapter::CloudMessagingAdapter;
use pushcoord_types::platform_adapter::PushPlatform;
use pushcoord_types::types::Capability;

/// Result of one detection run
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Detection {
	pub capability: Capability,
	pub permission: PermissionState,
}

impl Detection {
	pub fn supported(&self) -> bool {
		self.capability.supported()
	}

	/// The `(capability flag, permission)` pair consumed by the gate and the UI
	pub fn as_tuple(&self) -> (bool, PermissionState) {
		(self.supported(), self.permission)
	}

	/// Channel to use given the configured preference. Cloud messaging falls
	/// back to raw web push when the provider cannot run here.
	pub fn select_channel(&self, preferred: ChannelKind) -> ChannelKind {
		match preferred {
			ChannelKind::Fcm if self.capability.cloud_messaging => ChannelKind::Fcm,
			_ => ChannelKind::WebPush,
		}
	}
}

#[derive(Debug, Clone)]
pub struct CapabilityDetector {
	platform: Arc<dyn PushPlatform>,
	messaging: Option<Arc<dyn CloudMessagingAdapter>>,
}

impl CapabilityDetector {
	pub fn new(
		platform: Arc<dyn PushPlatform>,
		messaging: Option<Arc<dyn CloudMessagingAdapter>>,
	) -> Self {
		Self { platform, messaging }
	}

	pub fn detect(&self) -> Detection {
		let capability = Capability {
			notifications: self.platform.has_notification_surface(),
			worker_host: self.platform.has_worker_host(),
			push_manager: self.platform.has_push_manager(),
			cloud_messaging: self.messaging.as_ref().is_some_and(|m| m.is_supported()),
		};

		let permission = if capability.supported() {
			self.platform.permission()
		} else {
			PermissionState::Unsupported
		};

		debug!(
			notifications = capability.notifications,
			worker_host = capability.worker_host,
			push_manager = capability.push_manager,
			cloud_messaging = capability.cloud_messaging,
			permission = %permission,
			"Capability detected"
		);
		Detection { capability, permission }
	}
}


// vim: ts=4
