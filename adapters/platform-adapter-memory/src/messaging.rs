//! In-process cloud-messaging provider

use async_trait::async_trait;
use parking_lot::Mutex;

use pushcoord::messaging_adapter::CloudMessagingAdapter;
use pushcoord::platform_adapter::{WorkerRegistration, WorkerState};
use pushcoord::prelude::*;

use crate::{new_call_log, CallLog};

#[derive(Debug)]
struct MessagingState {
	supported: bool,
	refuse: bool,
	outage: bool,
	token: Option<Box<str>>,
	issued: usize,
}

/// Issues `token-<n>` device tokens, at most one live token at a time
#[derive(Debug)]
pub struct MemoryCloudMessaging {
	state: Mutex<MessagingState>,
	log: CallLog,
}

impl Default for MemoryCloudMessaging {
	fn default() -> Self {
		Self::new()
	}
}

impl MemoryCloudMessaging {
	pub fn new() -> Self {
		Self::with_call_log(new_call_log())
	}

	pub fn with_call_log(log: CallLog) -> Self {
		Self {
			state: Mutex::new(MessagingState {
				supported: true,
				refuse: false,
				outage: false,
				token: None,
				issued: 0,
			}),
			log,
		}
	}

	pub fn set_supported(&self, supported: bool) {
		self.state.lock().supported = supported;
	}

	/// Provider answers without a token
	pub fn refuse_tokens(&self, refuse: bool) {
		self.state.lock().refuse = refuse;
	}

	/// Provider is unreachable
	pub fn set_outage(&self, outage: bool) {
		self.state.lock().outage = outage;
	}

	pub fn tokens_issued(&self) -> usize {
		self.state.lock().issued
	}
}

#[async_trait]
impl CloudMessagingAdapter for MemoryCloudMessaging {
	fn is_supported(&self) -> bool {
		self.state.lock().supported
	}

	async fn get_token(
		&self,
		vapid_key: &[u8],
		registration: &WorkerRegistration,
	) -> PcResult<Option<Box<str>>> {
		self.log.lock().push("messaging.get_token".into());
		let mut state = self.state.lock();
		if !state.supported {
			return Err(Error::Unsupported);
		}
		if state.outage {
			return Err(Error::NetworkTransient("messaging provider unreachable".into()));
		}
		if registration.state != WorkerState::Activated {
			return Err(Error::WorkerRegistrationFailed("no active worker".into()));
		}
		if state.refuse || vapid_key.is_empty() {
			return Ok(None);
		}
		if state.token.is_none() {
			state.issued += 1;
			state.token = Some(format!("token-{}", state.issued).into());
		}
		Ok(state.token.clone())
	}

	async fn current_token(&self) -> PcResult<Option<Box<str>>> {
		Ok(self.state.lock().token.clone())
	}

	async fn delete_token(&self) -> PcResult<bool> {
		self.log.lock().push("messaging.delete_token".into());
		Ok(self.state.lock().token.take().is_some())
	}
}

// vim: ts=4
