//! File state adapter tests

use pushcoord::prelude::*;
use pushcoord::state_adapter::StateAdapter;
use pushcoord::types::DismissalRecord;
use pushcoord_state_adapter_fs::{StateAdapterFs, STATE_FILE};
use tempfile::TempDir;

async fn create_test_adapter() -> (StateAdapterFs, TempDir) {
	let temp_dir = TempDir::new().expect("Failed to create temp directory");
	let adapter = StateAdapterFs::new(temp_dir.path()).await.expect("Failed to create adapter");
	(adapter, temp_dir)
}

#[tokio::test]
async fn test_empty_state() {
	let (adapter, _temp) = create_test_adapter().await;
	assert!(adapter.read_dismissal().await.unwrap().is_none());
	assert!(adapter.read_permission().await.unwrap().is_none());
	// Nothing is written until something changes
	assert!(!adapter.file_path().exists());
}

#[tokio::test]
async fn test_dismissal_roundtrip() {
	let (adapter, _temp) = create_test_adapter().await;
	let record = DismissalRecord { dismissed_at: Timestamp(1_700_000_000) };

	adapter.write_dismissal(&record).await.unwrap();
	assert_eq!(adapter.read_dismissal().await.unwrap(), Some(record));

	adapter.clear_dismissal().await.unwrap();
	assert!(adapter.read_dismissal().await.unwrap().is_none());
}

#[tokio::test]
async fn test_records_are_independent() {
	let (adapter, _temp) = create_test_adapter().await;
	let record = DismissalRecord { dismissed_at: Timestamp(1_700_000_000) };

	adapter.write_permission(PermissionState::Denied).await.unwrap();
	adapter.write_dismissal(&record).await.unwrap();
	adapter.write_permission(PermissionState::Granted).await.unwrap();

	assert_eq!(adapter.read_dismissal().await.unwrap(), Some(record));
	assert_eq!(adapter.read_permission().await.unwrap(), Some(PermissionState::Granted));
}

#[tokio::test]
async fn test_state_survives_restart() {
	let temp_dir = TempDir::new().expect("Failed to create temp directory");
	{
		let adapter = StateAdapterFs::new(temp_dir.path()).await.unwrap();
		adapter.write_permission(PermissionState::Denied).await.unwrap();
	}

	let adapter = StateAdapterFs::new(temp_dir.path()).await.unwrap();
	assert_eq!(adapter.read_permission().await.unwrap(), Some(PermissionState::Denied));

	let doc: serde_json::Value =
		serde_json::from_slice(&std::fs::read(temp_dir.path().join(STATE_FILE)).unwrap()).unwrap();
	assert_eq!(doc["permission"], "denied");
	assert!(doc.get("dismissal").is_none());
}

#[tokio::test]
async fn test_corrupt_file_is_replaced() {
	let (adapter, _temp) = create_test_adapter().await;
	std::fs::write(adapter.file_path(), b"{ not json").unwrap();

	assert!(adapter.read_permission().await.unwrap().is_none());
	adapter.write_permission(PermissionState::Granted).await.unwrap();
	assert_eq!(adapter.read_permission().await.unwrap(), Some(PermissionState::Granted));
}

#[tokio::test]
async fn test_creates_missing_directory() {
	let temp_dir = TempDir::new().expect("Failed to create temp directory");
	let nested = temp_dir.path().join("data").join("push");
	let adapter = StateAdapterFs::new(&nested).await.unwrap();
	adapter.write_permission(PermissionState::Default).await.unwrap();
	assert!(nested.join(STATE_FILE).exists());
}

// vim: ts=4
