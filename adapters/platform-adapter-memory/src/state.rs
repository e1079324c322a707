//! In-process durable state, lost when the process exits

use async_trait::async_trait;
use parking_lot::Mutex;

use pushcoord::prelude::*;
use pushcoord::state_adapter::StateAdapter;
use pushcoord::types::DismissalRecord;

#[derive(Debug, Default)]
pub struct MemoryState {
	dismissal: Mutex<Option<DismissalRecord>>,
	permission: Mutex<Option<PermissionState>>,
}

impl MemoryState {
	pub fn new() -> Self {
		Self::default()
	}

	/// Pre-seeds the state as if a previous session had left it behind
	pub fn with_records(
		dismissal: Option<DismissalRecord>,
		permission: Option<PermissionState>,
	) -> Self {
		Self { dismissal: Mutex::new(dismissal), permission: Mutex::new(permission) }
	}
}

#[async_trait]
impl StateAdapter for MemoryState {
	async fn read_dismissal(&self) -> PcResult<Option<DismissalRecord>> {
		Ok(*self.dismissal.lock())
	}

	async fn write_dismissal(&self, record: &DismissalRecord) -> PcResult<()> {
		*self.dismissal.lock() = Some(*record);
		Ok(())
	}

	async fn clear_dismissal(&self) -> PcResult<()> {
		*self.dismissal.lock() = None;
		Ok(())
	}

	async fn read_permission(&self) -> PcResult<Option<PermissionState>> {
		Ok(*self.permission.lock())
	}

	async fn write_permission(&self, permission: PermissionState) -> PcResult<()> {
		*self.permission.lock() = Some(permission);
		Ok(())
	}
}

// vim: ts=4
