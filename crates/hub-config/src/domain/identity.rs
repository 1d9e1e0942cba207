//! Resolved gateway identity.

use std::fmt;

use crate::domain::connection_string::ModuleConnectionString;
use crate::error::ResolveError;

/// Which configuration source produced an [`Identity`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdentitySource {
    /// Parsed from a full connection string; discrete settings were ignored.
    ConnectionString,
    /// Taken verbatim from the discrete hostname/device/module settings.
    DiscreteSettings,
}

/// (hub hostname, device id, module id) plus the raw connection string when
/// that was the source.
///
/// When `connection_string` is present the other fields are the values
/// embedded in it. Fields are private so that invariant cannot be broken
/// after resolution.
#[derive(Clone, PartialEq, Eq)]
pub struct Identity {
    hub_hostname: String,
    device_id: String,
    module_id: String,
    connection_string: Option<String>,
}

impl Identity {
    /// Parse `raw` and take every identity field from it.
    pub fn from_connection_string(raw: &str) -> Result<Self, ResolveError> {
        let parsed: ModuleConnectionString = raw.parse()?;
        Ok(Self {
            hub_hostname: parsed.host_name().to_string(),
            device_id: parsed.device_id().to_string(),
            module_id: parsed.module_id().to_string(),
            connection_string: Some(raw.to_string()),
        })
    }

    /// Identity from discrete settings. Empty values are accepted here.
    pub fn from_discrete(
        hub_hostname: impl Into<String>,
        device_id: impl Into<String>,
        module_id: impl Into<String>,
    ) -> Self {
        Self {
            hub_hostname: hub_hostname.into(),
            device_id: device_id.into(),
            module_id: module_id.into(),
            connection_string: None,
        }
    }

    pub fn hub_hostname(&self) -> &str {
        &self.hub_hostname
    }

    pub fn device_id(&self) -> &str {
        &self.device_id
    }

    pub fn module_id(&self) -> &str {
        &self.module_id
    }

    pub fn connection_string(&self) -> Option<&str> {
        self.connection_string.as_deref()
    }

    /// Source tag.
    pub fn source(&self) -> IdentitySource {
        if self.connection_string.is_some() {
            IdentitySource::ConnectionString
        } else {
            IdentitySource::DiscreteSettings
        }
    }

    /// `device/module`, used as the client identifier in log lines.
    pub fn client_id(&self) -> String {
        format!("{}/{}", self.device_id, self.module_id)
    }
}

impl fmt::Debug for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Identity")
            .field("hub_hostname", &self.hub_hostname)
            .field("device_id", &self.device_id)
            .field("module_id", &self.module_id)
            .field(
                "connection_string",
                &self.connection_string.as_ref().map(|_| "<redacted>"),
            )
            .finish()
    }
}
