//! CertificateLoader.

use std::fs;
use std::path::Path;
use std::sync::Arc;

use tracing::info;

use crate::domain::ServerCertificate;
use crate::error::{ResolveError, ResolveResult};
use crate::keys;
use crate::ports::{ConfigProvider, ConfigProviderExt};

/// Loads the TLS server certificate once; callers share the returned `Arc`.
#[derive(Debug, Clone, Copy, Default)]
pub struct CertificateLoader;

impl CertificateLoader {
    /// Read the directory and file name from configuration, then load.
    pub fn load_from_config(&self, provider: &dyn ConfigProvider) -> ResolveResult<Arc<ServerCertificate>> {
        let dir = provider.required_string(keys::TLS_CERTIFICATE_DIR)?;
        let file = provider.required_string(keys::TLS_CERTIFICATE_FILE)?;
        self.load(Path::new(&dir), &file)
    }

    /// Load `dir/file`. No retry on failure.
    pub fn load(&self, dir: &Path, file: &str) -> ResolveResult<Arc<ServerCertificate>> {
        let path = dir.join(file);
        let bytes = fs::read(&path).map_err(|e| ResolveError::CertificateLoadFailure {
            path: path.clone(),
            reason: e.to_string(),
        })?;

        let certificate = ServerCertificate::from_bytes(&bytes, &path)?;
        info!(
            path = %path.display(),
            chain_len = certificate.chain().len(),
            "Loaded TLS server certificate"
        );
        Ok(Arc::new(certificate))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::InMemoryProvider;
    use crate::domain::certificate::fixtures::{PEM_CHAIN, PEM_KEY_ONLY};
    use tempfile::TempDir;

    #[test]
    fn test_load_chain_from_directory() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("server.pem"), PEM_CHAIN).unwrap();

        let cert = CertificateLoader.load(dir.path(), "server.pem").unwrap();
        assert_eq!(cert.chain().len(), 2);
        assert_eq!(cert.source_path(), dir.path().join("server.pem"));
    }

    #[test]
    fn test_missing_file_fails() {
        let dir = TempDir::new().unwrap();
        let err = CertificateLoader.load(dir.path(), "absent.pem").unwrap_err();
        assert!(matches!(err, ResolveError::CertificateLoadFailure { path, .. } if path.ends_with("absent.pem")));
    }

    #[test]
    fn test_key_without_certificate_fails() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("key.pem"), PEM_KEY_ONLY).unwrap();
        assert!(matches!(
            CertificateLoader.load(dir.path(), "key.pem"),
            Err(ResolveError::CertificateLoadFailure { .. })
        ));
    }

    #[test]
    fn test_config_requires_both_keys() {
        let provider = InMemoryProvider::builder()
            .set(keys::TLS_CERTIFICATE_DIR, "/etc/edge-hub/certs")
            .build();
        let err = CertificateLoader.load_from_config(&provider).unwrap_err();
        assert!(matches!(
            err,
            ResolveError::MissingRequiredConfig { key } if key == keys::TLS_CERTIFICATE_FILE
        ));
    }

    #[test]
    fn test_load_from_config() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("edge.pem"), PEM_CHAIN).unwrap();
        let provider = InMemoryProvider::builder()
            .set(keys::TLS_CERTIFICATE_DIR, dir.path().display())
            .set(keys::TLS_CERTIFICATE_FILE, "edge.pem")
            .build();

        let cert = CertificateLoader.load_from_config(&provider).unwrap();
        assert_eq!(Arc::strong_count(&cert), 1);
    }
}
