//! StoreAndForwardPolicyResolver.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::domain::{StoreAndForwardPolicy, INFINITE_TIME_TO_LIVE_SECS, STORAGE_SUBFOLDER};
use crate::error::{ResolveError, ResolveResult};
use crate::keys;
use crate::ports::{ConfigProvider, ConfigProviderExt};

/// Resolves the store-and-forward policy and prepares its storage directory.
#[derive(Debug, Clone)]
pub struct StoreAndForwardPolicyResolver {
    temp_dir: PathBuf,
}

impl Default for StoreAndForwardPolicyResolver {
    fn default() -> Self {
        Self {
            temp_dir: std::env::temp_dir(),
        }
    }
}

impl StoreAndForwardPolicyResolver {
    /// Resolver falling back to the platform temporary directory.
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolver falling back to `temp_dir` instead of the platform one.
    pub fn with_temp_dir(temp_dir: impl Into<PathBuf>) -> Self {
        Self {
            temp_dir: temp_dir.into(),
        }
    }

    /// Resolve from configuration.
    ///
    /// TTL and persistence settings are only read when store-and-forward is
    /// enabled; the storage folder only when persistence is requested too.
    pub fn resolve(&self, provider: &dyn ConfigProvider) -> ResolveResult<StoreAndForwardPolicy> {
        if !provider.bool_or(keys::STORE_AND_FORWARD_ENABLED, false)? {
            debug!("Store-and-forward disabled");
            return Ok(StoreAndForwardPolicy::disabled());
        }

        let ttl = provider.parse_or(
            keys::TIME_TO_LIVE_SECS,
            INFINITE_TIME_TO_LIVE_SECS,
            "an integer number of seconds",
        )?;

        if !provider.bool_or(keys::USE_PERSISTENT_STORAGE, false)? {
            info!(ttl_secs = ttl, "Store-and-forward enabled (in memory)");
            return Ok(StoreAndForwardPolicy::in_memory(ttl));
        }

        let base = provider.non_blank_string(keys::STORAGE_FOLDER)?;
        let storage_path = self.prepare_storage(base.as_deref())?;
        info!(
            ttl_secs = ttl,
            path = %storage_path.display(),
            "Store-and-forward enabled (persistent)"
        );
        Ok(StoreAndForwardPolicy::persistent(ttl, storage_path))
    }

    /// Pick the base directory, append the fixed subfolder and create it.
    ///
    /// A blank or non-existent base falls back to the temp directory.
    /// Creation is idempotent.
    pub fn prepare_storage(&self, base: Option<&str>) -> ResolveResult<PathBuf> {
        let base = match base.map(str::trim).filter(|b| !b.is_empty()) {
            Some(b) if Path::new(b).exists() => PathBuf::from(b),
            Some(b) => {
                debug!(
                    configured = b,
                    fallback = %self.temp_dir.display(),
                    "Storage folder does not exist, using temp directory"
                );
                self.temp_dir.clone()
            }
            None => self.temp_dir.clone(),
        };

        let storage_path = base.join(STORAGE_SUBFOLDER);
        fs::create_dir_all(&storage_path).map_err(|source| ResolveError::StorageUnavailable {
            path: storage_path.clone(),
            source,
        })?;
        Ok(storage_path)
    }
}
