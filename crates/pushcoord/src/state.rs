//! Lifecycle state and the snapshot published to observers

use serde::Serialize;
use std::fmt;

use crate::prelude::*;
use pushcoord_types::types::Subscription;

/// Where the coordinator is in the subscribe pipeline
///
/// `Error` absorbs a failure from any step and keeps only its kind. The
/// coordinator stays callable from there.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase", tag = "name", content = "error")]
pub enum LifecycleState {
	#[default]
	Idle,
	Detecting,
	AwaitingPermission,
	Subscribing,
	Registering,
	Active,
	Error(ErrorKind),
	Revoked,
}

impl LifecycleState {
	pub fn is_active(self) -> bool {
		self == LifecycleState::Active
	}

	pub fn error(self) -> Option<ErrorKind> {
		match self {
			LifecycleState::Error(kind) => Some(kind),
			_ => None,
		}
	}
}

impl fmt::Display for LifecycleState {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			LifecycleState::Idle => f.write_str("idle"),
			LifecycleState::Detecting => f.write_str("detecting"),
			LifecycleState::AwaitingPermission => f.write_str("awaiting-permission"),
			LifecycleState::Subscribing => f.write_str("subscribing"),
			LifecycleState::Registering => f.write_str("registering"),
			LifecycleState::Active => f.write_str("active"),
			LifecycleState::Error(kind) => write!(f, "error({})", kind),
			LifecycleState::Revoked => f.write_str("revoked"),
		}
	}
}

/// What the UI layer renders
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CoordinatorSnapshot {
	pub supported: bool,
	pub permission: PermissionState,
	pub state: LifecycleState,
	pub subscription: Option<Subscription>,
}


// vim: ts=4
