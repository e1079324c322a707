//! Shared harness for the coordinator integration tests
//!
//! The platform and the registry double write into one call log, so tests
//! can assert the order of calls across both sides.

#![allow(dead_code)]

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use pushcoord::prelude::*;
use pushcoord::registry_adapter::RegistryAdapter;
use pushcoord::types::RegistrationRequest;
use pushcoord::{Coordinator, CoordinatorBuilder, RetryPolicy, StaticToken};
use pushcoord_platform_adapter_memory::{new_call_log, CallLog, MemoryPlatform, MemoryState};

pub const VAPID_KEY: &str =
	"BA1Hxzyi1RUM1b5wjxsn7nGxAszw2u61m164i3MrAIxHF6YK5h4SDYic-dRuU_RCPCfA5aq9ojSwk5Y2EmClBPs";

pub fn setup_test_logging() {
	let _ = tracing_subscriber::fmt()
		.with_test_writer()
		.with_max_level(tracing::Level::DEBUG)
		.try_init();
}

pub fn transient() -> Error {
	Error::NetworkTransient("HTTP 503".into())
}

/// Registry double: records every call, answers with scripted failures first
#[derive(Debug)]
pub struct RecordingRegistry {
	log: CallLog,
	register_failures: Mutex<VecDeque<Error>>,
	unregister_failures: Mutex<VecDeque<Error>>,
}

impl RecordingRegistry {
	pub fn new(log: CallLog) -> Self {
		Self {
			log,
			register_failures: Mutex::default(),
			unregister_failures: Mutex::default(),
		}
	}

	pub fn fail_register(&self, errors: impl IntoIterator<Item = Error>) {
		self.register_failures.lock().unwrap().extend(errors);
	}

	pub fn fail_unregister(&self, errors: impl IntoIterator<Item = Error>) {
		self.unregister_failures.lock().unwrap().extend(errors);
	}

	pub fn calls(&self) -> Vec<String> {
		self.log.lock().iter().filter(|c| c.starts_with("registry.")).cloned().collect()
	}

	pub fn count(&self, prefix: &str) -> usize {
		self.log.lock().iter().filter(|c| c.starts_with(prefix)).count()
	}
}

#[async_trait]
impl RegistryAdapter for RecordingRegistry {
	async fn fetch_vapid_key(&self, _auth_token: Option<&str>) -> PcResult<Box<str>> {
		self.log.lock().push("registry.vapid".into());
		Ok(VAPID_KEY.into())
	}

	async fn register(&self, req: &RegistrationRequest) -> PcResult<()> {
		self.log.lock().push(format!("registry.register {}", req.subscription.endpoint));
		match self.register_failures.lock().unwrap().pop_front() {
			Some(err) => Err(err),
			None => Ok(()),
		}
	}

	async fn unregister(&self, endpoint: &str, _auth_token: &str) -> PcResult<()> {
		self.log.lock().push(format!("registry.unregister {}", endpoint));
		match self.unregister_failures.lock().unwrap().pop_front() {
			Some(err) => Err(err),
			None => Ok(()),
		}
	}
}

pub struct Harness {
	pub log: CallLog,
	pub platform: Arc<MemoryPlatform>,
	pub registry: Arc<RecordingRegistry>,
	pub state: Arc<MemoryState>,
	pub coordinator: Coordinator,
}

impl Harness {
	pub fn new() -> Self {
		Self::with(|_, _| {})
	}

	/// Scripts the platform and tweaks the builder before building
	pub fn with(configure: impl FnOnce(&MemoryPlatform, &mut CoordinatorBuilder)) -> Self {
		let log = new_call_log();
		let platform = Arc::new(MemoryPlatform::with_call_log(log.clone()));
		let registry = Arc::new(RecordingRegistry::new(log.clone()));
		let state = Arc::new(MemoryState::new());

		let mut builder = CoordinatorBuilder::new();
		builder
			.platform(platform.clone())
			.registry(registry.clone())
			.auth(Arc::new(StaticToken::new("tok")))
			.state_adapter(state.clone())
			.retry(RetryPolicy::default());
		configure(&platform, &mut builder);
		let coordinator = builder.build().unwrap();

		Self { log, platform, registry, state, coordinator }
	}

	/// A second coordinator on the same platform, registry and state, as
	/// after an application restart
	pub fn restart(&self) -> Coordinator {
		CoordinatorBuilder::new()
			.platform(self.platform.clone())
			.registry(self.registry.clone())
			.auth(Arc::new(StaticToken::new("tok")))
			.state_adapter(self.state.clone())
			.build()
			.unwrap()
	}

	pub fn calls(&self) -> Vec<String> {
		self.log.lock().clone()
	}
}

// vim: ts=4
