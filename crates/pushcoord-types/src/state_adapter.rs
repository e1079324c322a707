//! Adapter for the coordinator's durable client-side state.
//!
//! Only the prompt dismissal and the last-known permission survive a restart.
//! The subscription itself is always re-derived from the live platform
//! channel, never stored here.

use async_trait::async_trait;
use std::fmt::Debug;

use crate::prelude::*;
use crate::types::DismissalRecord;

#[async_trait]
pub trait StateAdapter: Debug + Send + Sync {
	async fn read_dismissal(&self) -> PcResult<Option<DismissalRecord>>;
	async fn write_dismissal(&self, record: &DismissalRecord) -> PcResult<()>;
	async fn clear_dismissal(&self) -> PcResult<()>;

	async fn read_permission(&self) -> PcResult<Option<PermissionState>>;
	async fn write_permission(&self, permission: PermissionState) -> PcResult<()>;
}

// vim: ts=4
