//! Step timeouts
//!
//! Platform steps can block on the user indefinitely (the permission prompt
//! has no natural deadline), so every suspension point runs under a limit and
//! reports `Timeout` with the step name when it expires.

use std::future::Future;
use std::time::Duration;

use crate::prelude::*;

pub async fn with_timeout<T, F>(step: &'static str, limit: Duration, fut: F) -> PcResult<T>
where
	F: Future<Output = PcResult<T>>,
{
	match tokio::time::timeout(limit, fut).await {
		Ok(res) => res,
		Err(_) => {
			warn!(step, limit_ms = u64::try_from(limit.as_millis()).unwrap_or(u64::MAX), "Step timed out");
			Err(Error::Timeout(step))
		}
	}
}


// vim: ts=4
