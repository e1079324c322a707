//! File-backed durable state.
//!
//! Both records live in one small JSON document in the state directory.
//! Writes go to a temporary file that is renamed over the document, so a
//! crash leaves either the old or the new state, never a torn one.

#![deny(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![forbid(unsafe_code)]

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::{
	fs::{create_dir_all, read, remove_file, rename, File},
	io::AsyncWriteExt,
	sync::Mutex,
};

use pushcoord::prelude::*;
use pushcoord::state_adapter::StateAdapter;
use pushcoord::types::DismissalRecord;

pub const STATE_FILE: &str = "push-state.json";
const STATE_TMP_FILE: &str = "push-state.json.tmp";

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StateDoc {
	#[serde(default, skip_serializing_if = "Option::is_none")]
	dismissal: Option<DismissalRecord>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	permission: Option<PermissionState>,
}

#[derive(Debug)]
pub struct StateAdapterFs {
	base_dir: Box<Path>,
	/// Serializes read-modify-write cycles
	lock: Mutex<()>,
}

impl StateAdapterFs {
	pub async fn new(base_dir: impl Into<PathBuf>) -> PcResult<Self> {
		let base_dir: PathBuf = base_dir.into();
		create_dir_all(&base_dir).await?;
		debug!(dir = %base_dir.display(), "State adapter ready");
		Ok(Self { base_dir: base_dir.into_boxed_path(), lock: Mutex::new(()) })
	}

	pub fn file_path(&self) -> PathBuf {
		self.base_dir.join(STATE_FILE)
	}

	async fn load(&self) -> PcResult<StateDoc> {
		let data = match read(self.file_path()).await {
			Ok(data) => data,
			Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(StateDoc::default()),
			Err(err) => return Err(err.into()),
		};
		match serde_json::from_slice(&data) {
			Ok(doc) => Ok(doc),
			Err(err) => {
				// Unreadable state is dropped and rewritten by the next update
				warn!(path = %self.file_path().display(), error = %err, "Ignoring corrupt state file");
				Ok(StateDoc::default())
			}
		}
	}

	async fn store(&self, doc: &StateDoc) -> PcResult<()> {
		let tmp_path = self.base_dir.join(STATE_TMP_FILE);
		let data = serde_json::to_vec_pretty(doc)?;

		let res = async {
			let mut file = File::create(&tmp_path).await?;
			file.write_all(&data).await?;
			file.sync_all().await?;
			rename(&tmp_path, self.file_path()).await?;
			Ok::<(), Error>(())
		}
		.await;
		if res.is_err() {
			warn!(path = %tmp_path.display(), "State write failed, removing tmpfile");
			let _ = remove_file(&tmp_path).await;
		}
		res
	}

	async fn update(&self, f: impl FnOnce(&mut StateDoc) + Send) -> PcResult<()> {
		let _guard = self.lock.lock().await;
		let mut doc = self.load().await?;
		let before = doc;
		f(&mut doc);
		if doc == before {
			return Ok(());
		}
		self.store(&doc).await
	}
}

#[async_trait]
impl StateAdapter for StateAdapterFs {
	async fn read_dismissal(&self) -> PcResult<Option<DismissalRecord>> {
		let _guard = self.lock.lock().await;
		Ok(self.load().await?.dismissal)
	}

	async fn write_dismissal(&self, record: &DismissalRecord) -> PcResult<()> {
		let record = *record;
		self.update(move |doc| doc.dismissal = Some(record)).await
	}

	async fn clear_dismissal(&self) -> PcResult<()> {
		self.update(|doc| doc.dismissal = None).await
	}

	async fn read_permission(&self) -> PcResult<Option<PermissionState>> {
		let _guard = self.lock.lock().await;
		Ok(self.load().await?.permission)
	}

	async fn write_permission(&self, permission: PermissionState) -> PcResult<()> {
		self.update(move |doc| doc.permission = Some(permission)).await
	}
}

// vim: ts=4
