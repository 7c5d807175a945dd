//! Platform-aware data storage directory management
//!
//! ## Platform Paths
//!
//! | Type | Windows | macOS | Linux |
//! |------|---------|-------|-------|
//! | Data | `%APPDATA%\Pubflow\` | `~/Library/Application Support/Pubflow/` | `$XDG_DATA_HOME/pubflow/` |

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use directories::ProjectDirs;

use super::constants::{APP_NAME, ENV_DATA_DIR};
use crate::utils::file::expand_path;

/// Data subdirectories
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataSubdir {
    /// Staged copies of uploaded topology config text (debug mode only, §4.10).
    Topologies,
}

impl DataSubdir {
    pub const fn as_str(&self) -> &'static str {
        match self {
            DataSubdir::Topologies => "topologies",
        }
    }
}

/// Application storage manager. Only used in debug mode, to stage uploaded topology
/// text to disk for auditability (spec §4.10/§6 "Persisted state").
#[derive(Debug, Clone)]
pub struct AppStorage {
    data_dir: PathBuf,
}

impl AppStorage {
    /// Initialize storage with platform-appropriate data directory
    pub async fn init(debug: bool) -> Result<Self> {
        let data_dir = Self::resolve_data_dir();

        tokio::fs::create_dir_all(&data_dir)
            .await
            .with_context(|| format!("Failed to create data directory: {}", data_dir.display()))?;

        if debug {
            let path = data_dir.join(DataSubdir::Topologies.as_str());
            tokio::fs::create_dir_all(&path)
                .await
                .with_context(|| format!("Failed to create topologies directory: {}", path.display()))?;
        }

        let data_dir = data_dir.canonicalize().unwrap_or(data_dir);
        tracing::debug!(data_dir = %data_dir.display(), "Storage initialized");

        Ok(Self { data_dir })
    }

    /// Resolve data directory from env var or platform default
    pub fn resolve_data_dir() -> PathBuf {
        if let Ok(dir) = std::env::var(ENV_DATA_DIR) {
            return expand_path(&dir);
        }

        if let Some(proj_dirs) = ProjectDirs::from("", "", APP_NAME) {
            return proj_dirs.data_dir().to_path_buf();
        }

        let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
        cwd.join(".pubflow")
    }

    /// Get the data directory path
    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// Stage an uploaded topology's raw text under the topologies subdirectory,
    /// named by upload sequence number. No-op if the subdirectory wasn't created
    /// (i.e. debug mode is off).
    pub async fn stage_topology(&self, sequence: u64, text: &str) -> Result<PathBuf> {
        let dir = self.data_dir.join(DataSubdir::Topologies.as_str());
        let path = dir.join(format!("{sequence:06}.txt"));
        tokio::fs::write(&path, text)
            .await
            .with_context(|| format!("Failed to stage topology upload: {}", path.display()))?;
        Ok(path)
    }

    /// Create AppStorage for testing with a specific data directory
    #[cfg(test)]
    pub fn init_for_test(data_dir: PathBuf) -> Self {
        Self { data_dir }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_data_subdir_as_str() {
        assert_eq!(DataSubdir::Topologies.as_str(), "topologies");
    }

    #[test]
    fn test_resolve_data_dir_fallback() {
        // SAFETY: Test runs single-threaded, no concurrent access to env var
        unsafe { std::env::remove_var(ENV_DATA_DIR) };
        let path = AppStorage::resolve_data_dir();
        assert!(!path.as_os_str().is_empty());
    }

    #[tokio::test]
    async fn stage_topology_writes_file() {
        let tmp = tempfile::tempdir().unwrap();
        let storage = AppStorage::init_for_test(tmp.path().to_path_buf());
        tokio::fs::create_dir_all(tmp.path().join(DataSubdir::Topologies.as_str()))
            .await
            .unwrap();
        let path = storage.stage_topology(1, "a -> add -> b\n").await.unwrap();
        let contents = tokio::fs::read_to_string(&path).await.unwrap();
        assert_eq!(contents, "a -> add -> b\n");
    }
}
