//! Store-and-forward policy.

use std::path::{Path, PathBuf};
use std::time::Duration;

/// TTL sentinel meaning "keep messages forever".
pub const INFINITE_TIME_TO_LIVE_SECS: i64 = -1;

/// Folder appended to the base storage directory.
pub const STORAGE_SUBFOLDER: &str = "edge-hub";

/// Whether undelivered messages are buffered, for how long, and where.
///
/// `storage_path` is `Some` exactly when the policy is enabled with
/// persistent storage, and the directory existed when the policy was built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreAndForwardPolicy {
    enabled: bool,
    use_persistent_storage: bool,
    time_to_live_secs: i64,
    storage_path: Option<PathBuf>,
}

impl StoreAndForwardPolicy {
    /// Store-and-forward off; persistence and TTL settings were not consulted.
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            use_persistent_storage: false,
            time_to_live_secs: INFINITE_TIME_TO_LIVE_SECS,
            storage_path: None,
        }
    }

    /// Buffered in memory only.
    pub fn in_memory(time_to_live_secs: i64) -> Self {
        Self {
            enabled: true,
            use_persistent_storage: false,
            time_to_live_secs,
            storage_path: None,
        }
    }

    /// Buffered on disk under `storage_path`, which the caller has created.
    pub fn persistent(time_to_live_secs: i64, storage_path: PathBuf) -> Self {
        Self {
            enabled: true,
            use_persistent_storage: true,
            time_to_live_secs,
            storage_path: Some(storage_path),
        }
    }

    pub fn enabled(&self) -> bool {
        self.enabled
    }

    pub fn use_persistent_storage(&self) -> bool {
        self.use_persistent_storage
    }

    /// Raw TTL in seconds; [`INFINITE_TIME_TO_LIVE_SECS`] means infinite.
    pub fn time_to_live_secs(&self) -> i64 {
        self.time_to_live_secs
    }

    /// TTL as a duration, `None` for infinite.
    pub fn time_to_live(&self) -> Option<Duration> {
        u64::try_from(self.time_to_live_secs)
            .ok()
            .map(Duration::from_secs)
    }

    pub fn storage_path(&self) -> Option<&Path> {
        self.storage_path.as_deref()
    }
}

impl Default for StoreAndForwardPolicy {
    fn default() -> Self {
        Self::disabled()
    }
}
