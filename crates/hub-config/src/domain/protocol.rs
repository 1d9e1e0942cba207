//! Upstream protocol and routes source selectors.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// Protocol used for the connection to the upstream hub.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UpstreamProtocol {
    Amqp,
    Mqtt,
    AmqpWs,
    MqttWs,
}

/// Unrecognized protocol token.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown upstream protocol '{0}'")]
pub struct UnknownProtocol(pub String);

/// Unrecognized routes source.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown config source '{0}', expected local or twin")]
pub struct UnknownConfigSource(pub String);

impl UpstreamProtocol {
    /// Lenient parse: anything unrecognized, including blank, is `None` so the
    /// routing layer can pick its default.
    pub fn parse_optional(raw: &str) -> Option<Self> {
        raw.parse().ok()
    }

    /// True for the WebSocket variants.
    pub fn over_websocket(self) -> bool {
        matches!(self, Self::AmqpWs | Self::MqttWs)
    }
}

impl FromStr for UpstreamProtocol {
    type Err = UnknownProtocol;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "amqp" => Ok(Self::Amqp),
            "mqtt" => Ok(Self::Mqtt),
            "amqpws" => Ok(Self::AmqpWs),
            "mqttws" => Ok(Self::MqttWs),
            _ => Err(UnknownProtocol(s.to_string())),
        }
    }
}

impl fmt::Display for UpstreamProtocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Amqp => "Amqp",
            Self::Mqtt => "Mqtt",
            Self::AmqpWs => "AmqpWs",
            Self::MqttWs => "MqttWs",
        };
        f.write_str(name)
    }
}

/// Where routes come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConfigSource {
    /// Routes are read from local configuration.
    #[default]
    Local,
    /// Routes arrive later through the module twin.
    Twin,
}

impl FromStr for ConfigSource {
    type Err = UnknownConfigSource;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "local" => Ok(Self::Local),
            "twin" => Ok(Self::Twin),
            _ => Err(UnknownConfigSource(s.to_string())),
        }
    }
}
