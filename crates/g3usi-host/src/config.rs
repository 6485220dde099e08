use std::path::Path;
use std::time::Duration;

use g3usi_frame::{FrameConfig, MTU};
use g3usi_proto::CodecConfig;
use g3usi_transport::{TransportConfig, DEFAULT_BAUD_RATE, DEFAULT_TCP_PORT};
use serde::Deserialize;

use crate::error::Result;

/// Settings for one modem connection.
///
/// Loadable from JSON; every field is optional:
///
/// ```json
/// { "endpoint": "/dev/ttyUSB0", "baud_rate": 230400,
///   "codec": { "hybrid": true, "order": "little" },
///   "sync_timeout_ms": 2000 }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct HostConfig {
    /// TTY path or IPv4 address (optionally `addr:port`).
    pub endpoint: String,
    pub baud_rate: u32,
    pub tcp_port: u16,
    pub codec: CodecConfig,
    /// Deadline of synchronous calls made without an explicit timeout.
    pub sync_timeout_ms: u64,
    /// Upper bound on one blocking read; also how often waiters re-check.
    pub poll_interval_ms: u64,
    /// Maximum unescaped frame size.
    pub max_frame_size: usize,
}

impl Default for HostConfig {
    fn default() -> Self {
        Self {
            endpoint: String::new(),
            baud_rate: DEFAULT_BAUD_RATE,
            tcp_port: DEFAULT_TCP_PORT,
            codec: CodecConfig::default(),
            sync_timeout_ms: 2_000,
            poll_interval_ms: 20,
            max_frame_size: MTU,
        }
    }
}

impl HostConfig {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            ..Self::default()
        }
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    pub fn with_codec(mut self, codec: CodecConfig) -> Self {
        self.codec = codec;
        self
    }

    pub fn with_baud_rate(mut self, baud_rate: u32) -> Self {
        self.baud_rate = baud_rate;
        self
    }

    pub fn with_tcp_port(mut self, tcp_port: u16) -> Self {
        self.tcp_port = tcp_port;
        self
    }

    pub fn with_sync_timeout(mut self, timeout: Duration) -> Self {
        self.sync_timeout_ms = duration_ms(timeout);
        self
    }

    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval_ms = duration_ms(interval);
        self
    }

    pub fn sync_timeout(&self) -> Duration {
        Duration::from_millis(self.sync_timeout_ms)
    }

    /// Never zero, so a blocking read always returns periodically.
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms.max(1))
    }

    pub fn transport(&self) -> TransportConfig {
        TransportConfig::new(self.endpoint.clone())
            .with_baud_rate(self.baud_rate)
            .with_tcp_port(self.tcp_port)
            .with_read_timeout(self.poll_interval())
    }

    pub fn frame_config(&self) -> FrameConfig {
        FrameConfig {
            max_frame_size: self.max_frame_size,
            read_timeout: Some(self.poll_interval()),
            write_timeout: Some(self.sync_timeout()),
        }
    }
}

fn duration_ms(d: Duration) -> u64 {
    u64::try_from(d.as_millis()).unwrap_or(u64::MAX)
}

#[cfg(test)]
mod tests {
    use g3usi_proto::WireOrder;

    use super::*;

    #[test]
    fn json_overrides_defaults() {
        let cfg = HostConfig::from_json(
            r#"{"endpoint":"10.0.0.7","tcp_port":5001,"codec":{"hybrid":true,"order":"big"}}"#,
        )
        .expect("config should parse");
        assert_eq!(cfg.endpoint, "10.0.0.7");
        assert_eq!(cfg.tcp_port, 5001);
        assert!(cfg.codec.hybrid);
        assert_eq!(cfg.codec.order, WireOrder::Big);
        assert_eq!(cfg.baud_rate, DEFAULT_BAUD_RATE);
        assert_eq!(cfg.sync_timeout(), Duration::from_secs(2));
    }

    #[test]
    fn unknown_byte_order_is_rejected() {
        assert!(HostConfig::from_json(r#"{"codec":{"order":"middle"}}"#).is_err());
    }

    #[test]
    fn derived_configs() {
        let cfg = HostConfig::new("/dev/ttyUSB0")
            .with_baud_rate(115_200)
            .with_poll_interval(Duration::ZERO)
            .with_sync_timeout(Duration::from_millis(500));
        assert_eq!(cfg.poll_interval(), Duration::from_millis(1));

        let transport = cfg.transport();
        assert_eq!(transport.baud_rate, 115_200);
        assert!(!transport.endpoint().expect("tty path should parse").is_tcp());

        let frame = cfg.frame_config();
        assert_eq!(frame.max_frame_size, MTU);
        assert_eq!(frame.write_timeout, Some(Duration::from_millis(500)));
    }
}
