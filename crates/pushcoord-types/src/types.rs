//! Common types used throughout the coordinator.

use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;
use std::fmt;
use std::time::SystemTime;

// Timestamp //
//***********//
/// Unix timestamp in seconds
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Timestamp(pub i64);

impl Timestamp {
	pub fn now() -> Timestamp {
		let res = SystemTime::now().duration_since(SystemTime::UNIX_EPOCH).unwrap_or_default();
		Timestamp(i64::try_from(res.as_secs()).unwrap_or(i64::MAX))
	}

	pub fn add_seconds(self, seconds: i64) -> Timestamp {
		Timestamp(self.0.saturating_add(seconds))
	}

	/// Seconds elapsed since `earlier`, negative if `earlier` is in the future
	pub fn seconds_since(self, earlier: Timestamp) -> i64 {
		self.0.saturating_sub(earlier.0)
	}
}

impl fmt::Display for Timestamp {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}", self.0)
	}
}

impl Serialize for Timestamp {
	fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
	where
		S: serde::Serializer,
	{
		serializer.serialize_i64(self.0)
	}
}

impl<'de> Deserialize<'de> for Timestamp {
	fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
	where
		D: serde::Deserializer<'de>,
	{
		Ok(Timestamp(i64::deserialize(deserializer)?))
	}
}

// PermissionState //
//*****************//
/// Notification permission as reported by the platform
///
/// Moves forward only, except `Denied -> Default` when the user resets the
/// platform settings. That change is picked up by polling, never pushed.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PermissionState {
	Unsupported,
	#[default]
	Default,
	Granted,
	Denied,
}

impl PermissionState {
	pub fn as_str(self) -> &'static str {
		match self {
			PermissionState::Unsupported => "unsupported",
			PermissionState::Default => "default",
			PermissionState::Granted => "granted",
			PermissionState::Denied => "denied",
		}
	}
}

impl fmt::Display for PermissionState {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

impl std::str::FromStr for PermissionState {
	type Err = crate::error::Error;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s {
			"unsupported" => Ok(PermissionState::Unsupported),
			"default" | "prompt" => Ok(PermissionState::Default),
			"granted" => Ok(PermissionState::Granted),
			"denied" => Ok(PermissionState::Denied),
			other => Err(crate::error::Error::Parse(format!("unknown permission state: {}", other))),
		}
	}
}

// ChannelKind //
//*************//
/// Delivery substrate a subscription lives on
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChannelKind {
	#[default]
	WebPush,
	Fcm,
}

impl ChannelKind {
	pub fn as_str(self) -> &'static str {
		match self {
			ChannelKind::WebPush => "webpush",
			ChannelKind::Fcm => "fcm",
		}
	}
}

impl fmt::Display for ChannelKind {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

impl std::str::FromStr for ChannelKind {
	type Err = crate::error::Error;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s {
			"webpush" | "web-push" => Ok(ChannelKind::WebPush),
			"fcm" => Ok(ChannelKind::Fcm),
			other => Err(crate::error::Error::Parse(format!("unknown channel: {}", other))),
		}
	}
}

// Capability //
//************//
/// Platform primitives found at detection time
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Capability {
	pub notifications: bool,
	pub worker_host: bool,
	pub push_manager: bool,
	pub cloud_messaging: bool,
}

impl Capability {
	/// All three primitives of the raw push path are required
	pub fn supported(&self) -> bool {
		self.notifications && self.worker_host && self.push_manager
	}
}

// Subscription //
//**************//
/// Channel credential. Raw web push carries the browser's ECDH keys, cloud
/// messaging an opaque provider token.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", tag = "type")]
pub enum Credential {
	Keys { p256dh: Box<str>, auth: Box<str> },
	Token { token: Box<str> },
}

/// A push channel confirmed by the platform
#[skip_serializing_none]
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Subscription {
	pub endpoint: Box<str>,
	pub channel: ChannelKind,
	pub credential: Credential,
	pub created_at: Timestamp,
	pub expiration_time: Option<Timestamp>,
}

/// Client-side record of the last prompt dismissal
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DismissalRecord {
	pub dismissed_at: Timestamp,
}

/// What the registrar sends to the backend registry
#[derive(Clone, Debug)]
pub struct RegistrationRequest {
	pub subscription: Subscription,
	pub auth_token: Box<str>,
}


// vim: ts=4
