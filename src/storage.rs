//! Durable single-slot store for the most recent analysis, plus JSON export.
//!
//! The store is one JSON file holding one object store (`analysis`) with one
//! fixed-key record (`last`). Every fault on this path is absorbed: a save that
//! fails leaves the caller unaffected and a load that fails reports an empty
//! slot.

use crate::model::{AnalysisResult, CachedEntry};
use anyhow::{bail, Context, Result};
use rand::RngCore;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tokio::fs;

const STORE_DIR: &str = "resume-analyzer";
const STORE_FILE: &str = "analysis.json";
const LAST_KEY: &str = "last";
const SCHEMA_VERSION: u32 = 1;

#[derive(Debug, Serialize, Deserialize)]
struct StoreFile {
    version: u32,
    #[serde(default)]
    analysis: BTreeMap<String, CachedEntry>,
}

/// Best-effort persistence of the last analysis result.
#[derive(Debug, Clone)]
pub struct ResultCache {
    path: Option<PathBuf>,
}

impl ResultCache {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: Some(path.into()),
        }
    }

    /// Store in the platform data directory, or an unavailable cache when the
    /// platform has none.
    pub fn default_location() -> Self {
        Self {
            path: dirs::data_dir().map(|d| d.join(STORE_DIR).join(STORE_FILE)),
        }
    }

    /// A cache with no backing store. Saves are dropped, loads find nothing.
    pub fn unavailable() -> Self {
        Self { path: None }
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Persist `result` as the only entry, stamped with the current time.
    /// Returns the store path when the entry was written.
    pub async fn save(&self, result: &AnalysisResult) -> Option<PathBuf> {
        match self.try_save(result).await {
            Ok(path) => Some(path),
            Err(e) => {
                tracing::debug!("result cache save skipped: {e:#}");
                None
            }
        }
    }

    /// The last saved result, or `None` when nothing usable is stored.
    pub async fn load(&self) -> Option<AnalysisResult> {
        self.load_entry().await.map(|entry| entry.data)
    }

    /// Like [`load`](Self::load) but keeps the save timestamp.
    pub async fn load_entry(&self) -> Option<CachedEntry> {
        match self.try_load().await {
            Ok(entry) => entry,
            Err(e) => {
                tracing::debug!("result cache load failed: {e:#}");
                None
            }
        }
    }

    /// Resolve the store path and create its directory if needed.
    async fn open(&self) -> Result<&Path> {
        let Some(path) = self.path.as_deref() else {
            bail!("result cache has no backing store");
        };
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir)
                .await
                .with_context(|| format!("create cache dir failed: {}", dir.display()))?;
        }
        Ok(path)
    }

    async fn try_save(&self, result: &AnalysisResult) -> Result<PathBuf> {
        let path = self.open().await?;
        let mut analysis = BTreeMap::new();
        analysis.insert(
            LAST_KEY.to_string(),
            CachedEntry {
                data: result.clone(),
                saved_at: now_millis(),
            },
        );
        let store = StoreFile {
            version: SCHEMA_VERSION,
            analysis,
        };
        let content = serde_json::to_string_pretty(&store)?;
        atomic_write(path, &content).await?;
        Ok(path.to_path_buf())
    }

    async fn try_load(&self) -> Result<Option<CachedEntry>> {
        let path = self.open().await?;
        let content = match fs::read_to_string(path).await {
            Ok(s) => s,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(e).with_context(|| format!("read cache failed: {}", path.display()))
            }
        };
        let mut store: StoreFile = serde_json::from_str(&content)
            .with_context(|| format!("parse cache failed: {}", path.display()))?;
        if store.version != SCHEMA_VERSION {
            bail!("unsupported cache schema version {}", store.version);
        }
        Ok(store.analysis.remove(LAST_KEY))
    }
}

/// Write to a uniquely named sibling file, then rename over the target.
async fn atomic_write(path: &Path, content: &str) -> Result<()> {
    let mut suffix = [0u8; 6];
    rand::thread_rng().fill_bytes(&mut suffix);
    let tmp_name = format!(
        ".{}.{}.tmp",
        path.file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| STORE_FILE.to_string()),
        suffix.iter().map(|b| format!("{b:02x}")).collect::<String>()
    );
    let tmp_path = path.with_file_name(tmp_name);

    fs::write(&tmp_path, content)
        .await
        .with_context(|| format!("write temp cache failed: {}", tmp_path.display()))?;
    if let Err(e) = fs::rename(&tmp_path, path).await {
        let _ = fs::remove_file(&tmp_path).await;
        return Err(e).with_context(|| {
            format!(
                "rename temp cache failed: {} -> {}",
                tmp_path.display(),
                path.display()
            )
        });
    }
    Ok(())
}

fn now_millis() -> i64 {
    (time::OffsetDateTime::now_utc().unix_timestamp_nanos() / 1_000_000) as i64
}

/// Export a result as pretty JSON to a user-chosen path.
pub fn export_json(path: &Path, result: &AnalysisResult) -> Result<()> {
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        std::fs::create_dir_all(dir).with_context(|| format!("create {}", dir.display()))?;
    }
    let content = serde_json::to_string_pretty(result)?;
    std::fs::write(path, content).with_context(|| format!("write {}", path.display()))?;
    Ok(())
}
