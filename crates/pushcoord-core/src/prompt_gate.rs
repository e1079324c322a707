//! Prompt gate
//!
//! Decides whether the UI may ask for notification permission again. The
//! decision is a pure function of its inputs; reading the dismissal record
//! and running timers is the caller's business.

use std::time::Duration;

use crate::capability::Detection;
use crate::prelude::*;
use pushcoord_types::types::DismissalRecord;

pub const DEFAULT_COOLDOWN: Duration = Duration::from_secs(7 * 24 * 3600);

/// True only if push is supported, permission is still `default`, and the
/// last dismissal (if any) is older than `cooldown`.
pub fn should_prompt(
	supported: bool,
	permission: PermissionState,
	dismissal: Option<&DismissalRecord>,
	now: Timestamp,
	cooldown: Duration,
) -> bool {
	if !supported || permission != PermissionState::Default {
		return false;
	}
	match dismissal {
		None => true,
		Some(record) => {
			let cooldown = i64::try_from(cooldown.as_secs()).unwrap_or(i64::MAX);
			now.seconds_since(record.dismissed_at) > cooldown
		}
	}
}

#[derive(Clone, Copy, Debug)]
pub struct PromptGate {
	cooldown: Duration,
}

impl Default for PromptGate {
	fn default() -> Self {
		Self { cooldown: DEFAULT_COOLDOWN }
	}
}

impl PromptGate {
	pub fn new(cooldown: Duration) -> Self {
		Self { cooldown }
	}

	pub fn cooldown(&self) -> Duration {
		self.cooldown
	}

	pub fn should_prompt(
		&self,
		detection: &Detection,
		dismissal: Option<&DismissalRecord>,
		now: Timestamp,
	) -> bool {
		should_prompt(detection.supported(), detection.permission, dismissal, now, self.cooldown)
	}

	/// First moment the gate opens again after `dismissal`
	pub fn next_prompt_at(&self, dismissal: &DismissalRecord) -> Timestamp {
		let cooldown = i64::try_from(self.cooldown.as_secs()).unwrap_or(i64::MAX);
		dismissal.dismissed_at.add_seconds(cooldown).add_seconds(1)
	}
}


// vim: ts=4
