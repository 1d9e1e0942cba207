//! Module connection string parsing.
//!
//! A connection string is a `;`-separated list of `Key=Value` pairs. Keys are
//! matched case-insensitively; values are kept verbatim (shared access keys
//! are base64 and may themselves end in `=`).

use std::fmt;
use std::str::FromStr;

use crate::error::ResolveError;

/// Parsed module connection string.
#[derive(Clone, PartialEq, Eq)]
pub struct ModuleConnectionString {
    host_name: String,
    device_id: String,
    module_id: String,
    shared_access_key_name: Option<String>,
    shared_access_key: Option<String>,
    gateway_host_name: Option<String>,
}

impl ModuleConnectionString {
    pub fn host_name(&self) -> &str {
        &self.host_name
    }

    pub fn device_id(&self) -> &str {
        &self.device_id
    }

    pub fn module_id(&self) -> &str {
        &self.module_id
    }

    pub fn shared_access_key_name(&self) -> Option<&str> {
        self.shared_access_key_name.as_deref()
    }

    pub fn shared_access_key(&self) -> Option<&str> {
        self.shared_access_key.as_deref()
    }

    pub fn gateway_host_name(&self) -> Option<&str> {
        self.gateway_host_name.as_deref()
    }
}

impl fmt::Debug for ModuleConnectionString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModuleConnectionString")
            .field("host_name", &self.host_name)
            .field("device_id", &self.device_id)
            .field("module_id", &self.module_id)
            .field("shared_access_key_name", &self.shared_access_key_name)
            .field(
                "shared_access_key",
                &self.shared_access_key.as_ref().map(|_| "<redacted>"),
            )
            .field("gateway_host_name", &self.gateway_host_name)
            .finish()
    }
}

fn set_once(slot: &mut Option<String>, key: &str, value: &str) -> Result<(), ResolveError> {
    if slot.is_some() {
        return Err(ResolveError::malformed(format!("duplicate key '{key}'")));
    }
    *slot = Some(value.to_string());
    Ok(())
}

fn required(slot: Option<String>, key: &str) -> Result<String, ResolveError> {
    match slot {
        Some(v) if !v.is_empty() => Ok(v),
        Some(_) => Err(ResolveError::malformed(format!("'{key}' is empty"))),
        None => Err(ResolveError::malformed(format!("missing required key '{key}'"))),
    }
}

impl FromStr for ModuleConnectionString {
    type Err = ResolveError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let mut host_name = None;
        let mut device_id = None;
        let mut module_id = None;
        let mut shared_access_key_name = None;
        let mut shared_access_key = None;
        let mut gateway_host_name = None;

        for segment in raw.split(';').map(str::trim).filter(|s| !s.is_empty()) {
            let (key, value) = segment.split_once('=').ok_or_else(|| {
                ResolveError::malformed(format!("segment '{segment}' is not a Key=Value pair"))
            })?;
            let key = key.trim();
            let value = value.trim();
            if key.is_empty() {
                return Err(ResolveError::malformed("empty key"));
            }

            match key.to_ascii_lowercase().as_str() {
                "hostname" => set_once(&mut host_name, "HostName", value)?,
                "deviceid" => set_once(&mut device_id, "DeviceId", value)?,
                "moduleid" => set_once(&mut module_id, "ModuleId", value)?,
                "sharedaccesskeyname" => {
                    set_once(&mut shared_access_key_name, "SharedAccessKeyName", value)?
                }
                "sharedaccesskey" => set_once(&mut shared_access_key, "SharedAccessKey", value)?,
                "gatewayhostname" => set_once(&mut gateway_host_name, "GatewayHostName", value)?,
                // Unknown keys are carried by newer service versions; ignore them.
                _ => {}
            }
        }

        Ok(Self {
            host_name: required(host_name, "HostName")?,
            device_id: required(device_id, "DeviceId")?,
            module_id: required(module_id, "ModuleId")?,
            shared_access_key_name,
            shared_access_key,
            gateway_host_name,
        })
    }
}
