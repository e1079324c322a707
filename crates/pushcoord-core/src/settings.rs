//! Coordinator settings
//!
//! Every option has a default, so an empty JSON object, an empty environment
//! or `CoordinatorOpts::default()` all give a working configuration.
//!
//! # Environment
//!
//! - `PUSHCOORD_BASE_URL` - backend origin of the registry endpoints
//! - `PUSHCOORD_WORKER_PATH` / `PUSHCOORD_WORKER_SCOPE` - background worker script and scope
//! - `PUSHCOORD_VAPID_PUBLIC_KEY` - static key; fetched from the backend when unset
//! - `PUSHCOORD_CHANNEL` - `webpush` or `fcm`
//! - `PUSHCOORD_STEP_TIMEOUT_MS` - per platform step
//! - `PUSHCOORD_PERMISSION_TIMEOUT_MS` - permission prompt
//! - `PUSHCOORD_REQUEST_TIMEOUT_MS` - per HTTP attempt
//! - `PUSHCOORD_RETRY_TIMES` - registrar retries after the first attempt
//! - `PUSHCOORD_PROMPT_COOLDOWN_SECS` - prompt gate cooldown
//! - `PUSHCOORD_STATE_DIR` - directory for durable client state

use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

use crate::prelude::*;
use crate::prompt_gate::DEFAULT_COOLDOWN;
use crate::retry::RetryPolicy;

pub const ENV_PREFIX: &str = "PUSHCOORD_";

#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CoordinatorOpts {
	pub base_url: Box<str>,
	pub worker_path: Box<str>,
	pub worker_scope: Box<str>,
	pub vapid_public_key: Option<Box<str>>,
	pub channel: ChannelKind,
	pub step_timeout_ms: u64,
	pub permission_timeout_ms: u64,
	pub request_timeout_ms: u64,
	pub retry: RetryPolicy,
	pub prompt_cooldown_secs: u64,
	pub state_dir: PathBuf,
}

impl Default for CoordinatorOpts {
	fn default() -> Self {
		Self {
			base_url: "http://localhost:8080".into(),
			worker_path: "/sw.js".into(),
			worker_scope: "/".into(),
			vapid_public_key: None,
			channel: ChannelKind::WebPush,
			step_timeout_ms: 15_000,
			permission_timeout_ms: 15_000,
			request_timeout_ms: 10_000,
			retry: RetryPolicy::default(),
			prompt_cooldown_secs: DEFAULT_COOLDOWN.as_secs(),
			state_dir: PathBuf::from("./data/push"),
		}
	}
}

impl CoordinatorOpts {
	pub fn from_json(json: &str) -> PcResult<Self> {
		let opts: Self = serde_json::from_str(json)?;
		opts.validate()?;
		Ok(opts)
	}

	pub fn from_env() -> PcResult<Self> {
		Self::from_lookup(|name| std::env::var(name).ok())
	}

	/// Builds the options from a variable lookup, `PUSHCOORD_` prefixed names
	pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> PcResult<Self> {
		let var = |name: &str| lookup(&format!("{}{}", ENV_PREFIX, name)).filter(|v| !v.is_empty());
		let mut opts = Self::default();

		if let Some(v) = var("BASE_URL") {
			opts.base_url = v.into();
		}
		if let Some(v) = var("WORKER_PATH") {
			opts.worker_path = v.into();
		}
		if let Some(v) = var("WORKER_SCOPE") {
			opts.worker_scope = v.into();
		}
		opts.vapid_public_key = var("VAPID_PUBLIC_KEY").map(Into::into);
		if let Some(v) = var("CHANNEL") {
			opts.channel = v.parse()?;
		}
		if let Some(v) = var("STEP_TIMEOUT_MS") {
			opts.step_timeout_ms = parse_num("STEP_TIMEOUT_MS", &v)?;
		}
		if let Some(v) = var("PERMISSION_TIMEOUT_MS") {
			opts.permission_timeout_ms = parse_num("PERMISSION_TIMEOUT_MS", &v)?;
		}
		if let Some(v) = var("REQUEST_TIMEOUT_MS") {
			opts.request_timeout_ms = parse_num("REQUEST_TIMEOUT_MS", &v)?;
		}
		if let Some(v) = var("RETRY_TIMES") {
			opts.retry.times = parse_num("RETRY_TIMES", &v)?;
		}
		if let Some(v) = var("PROMPT_COOLDOWN_SECS") {
			opts.prompt_cooldown_secs = parse_num("PROMPT_COOLDOWN_SECS", &v)?;
		}
		if let Some(v) = var("STATE_DIR") {
			opts.state_dir = PathBuf::from(v);
		}

		opts.validate()?;
		Ok(opts)
	}

	pub fn validate(&self) -> PcResult<()> {
		let url = url::Url::parse(&self.base_url)
			.map_err(|e| Error::Parse(format!("invalid base URL {}: {}", self.base_url, e)))?;
		if !matches!(url.scheme(), "http" | "https") {
			return Err(Error::Parse(format!("base URL must be http(s): {}", self.base_url)));
		}
		if !self.worker_path.starts_with('/') {
			return Err(Error::Parse(format!("worker path must be absolute: {}", self.worker_path)));
		}
		if self.step_timeout_ms == 0 || self.permission_timeout_ms == 0 {
			return Err(Error::Parse("timeouts must be positive".into()));
		}
		Ok(())
	}

	pub fn step_timeout(&self) -> Duration {
		Duration::from_millis(self.step_timeout_ms)
	}

	pub fn permission_timeout(&self) -> Duration {
		Duration::from_millis(self.permission_timeout_ms)
	}

	pub fn request_timeout(&self) -> Duration {
		Duration::from_millis(self.request_timeout_ms)
	}

	pub fn prompt_cooldown(&self) -> Duration {
		Duration::from_secs(self.prompt_cooldown_secs)
	}
}

fn parse_num<T: std::str::FromStr>(name: &str, value: &str) -> PcResult<T> {
	value
		.trim()
		.parse()
		.map_err(|_| Error::Parse(format!("{}{} is not a number: {}", ENV_PREFIX, name, value)))
}


// vim: ts=4
