//! サーバー設定

use std::time::Duration;

use thiserror::Error;

/// Liveness Monitor の既定の巡回間隔
pub const DEFAULT_LIVENESS_INTERVAL: Duration = Duration::from_secs(30);

pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 8080;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("liveness interval must be greater than zero")]
    ZeroLivenessInterval,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub liveness_interval: Duration,
}

impl ServerConfig {
    pub fn new(host: String, port: u16, liveness_interval: Duration) -> Result<Self, ConfigError> {
        if liveness_interval.is_zero() {
            return Err(ConfigError::ZeroLivenessInterval);
        }
        Ok(Self {
            host,
            port,
            liveness_interval,
        })
    }

    /// `host:port` 形式のバインドアドレス
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            liveness_interval: DEFAULT_LIVENESS_INTERVAL,
        }
    }
}
