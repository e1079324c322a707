//! Retry schedule for backend registry calls

use serde::Deserialize;
use std::time::Duration;

/// Backoff between attempts: `min * factor^n`, capped at `max`
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RetryPolicy {
	pub min_ms: u64,
	pub max_ms: u64,
	pub factor: u32,
	/// Retries after the first attempt
	pub times: u16,
}

impl Default for RetryPolicy {
	/// Two retries, 1s then 3s apart
	fn default() -> Self {
		Self { min_ms: 1000, max_ms: 3000, factor: 3, times: 2 }
	}
}

impl RetryPolicy {
	pub fn new(wait_min_max: (u64, u64), factor: u32, times: u16) -> Self {
		Self { min_ms: wait_min_max.0, max_ms: wait_min_max.1, factor, times }
	}

	/// Single attempt, no retries
	pub fn none() -> Self {
		Self { times: 0, ..Self::default() }
	}

	/// Wait before retry number `retry` (0-based)
	pub fn calculate_backoff(&self, retry: u16) -> Duration {
		let multiplier = u64::from(self.factor).saturating_pow(u32::from(retry));
		Duration::from_millis(self.min_ms.saturating_mul(multiplier).min(self.max_ms))
	}

	/// Check if another retry is allowed after `retries_done` retries
	pub fn should_retry(&self, retries_done: u16) -> bool {
		retries_done < self.times
	}

	pub fn max_attempts(&self) -> u16 {
		self.times.saturating_add(1)
	}
}


// vim: ts=4
