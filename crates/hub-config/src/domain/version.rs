//! Build version information.

use std::fmt;

/// Version, build number and commit of the running binary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionInfo {
    pub version: String,
    pub build: String,
    pub commit: String,
}

impl VersionInfo {
    /// Version of this build. Build number and commit come from
    /// `EDGE_HUB_BUILD_NUMBER` / `EDGE_HUB_COMMIT_ID` at compile time.
    pub fn current() -> Self {
        Self {
            version: env!("CARGO_PKG_VERSION").to_string(),
            build: option_env!("EDGE_HUB_BUILD_NUMBER").unwrap_or_default().to_string(),
            commit: option_env!("EDGE_HUB_COMMIT_ID").unwrap_or_default().to_string(),
        }
    }
}

impl fmt::Display for VersionInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.version)?;
        if !self.build.is_empty() {
            write!(f, ".{}", self.build)?;
        }
        if !self.commit.is_empty() {
            write!(f, " ({})", self.commit)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        let info = VersionInfo {
            version: "1.4.0".to_string(),
            build: "27".to_string(),
            commit: "a1b2c3".to_string(),
        };
        assert_eq!(info.to_string(), "1.4.0.27 (a1b2c3)");

        let bare = VersionInfo {
            build: String::new(),
            commit: String::new(),
            ..info
        };
        assert_eq!(bare.to_string(), "1.4.0");
    }
}
