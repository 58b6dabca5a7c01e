use drawgate::{GatewayConfig, GatewayConfigError};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::time::Duration;

/// Server configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    /// Server bind address
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,

    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Maximum request body size in MB.
    ///
    /// Must leave room above the upload limit so oversize files are reported
    /// by the validator rather than cut off by the transport.
    #[serde(default = "default_max_body_size_mb")]
    pub max_body_size_mb: usize,

    /// Cross-origin policy applied to every route
    #[serde(default)]
    pub cors: CorsConfig,

    /// Log level
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Metrics endpoint enabled
    #[serde(default = "default_true")]
    pub metrics_enabled: bool,

    /// Validation rules and upload directory
    #[serde(default)]
    pub gateway: GatewayConfig,
}

/// Cross-origin resource sharing policy.
///
/// An empty origin list means any origin (`*`), which cannot be combined
/// with credentials.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct CorsConfig {
    pub allowed_origins: Vec<String>,
    pub allow_credentials: bool,
}

impl CorsConfig {
    pub fn is_wildcard(&self) -> bool {
        self.allowed_origins.is_empty()
    }

    /// Restrict to the local frontend dev servers (Vite and CRA) with credentials.
    pub fn local_dev() -> Self {
        Self {
            allowed_origins: vec![
                "http://localhost:5173".to_string(),
                "http://localhost:3000".to_string(),
            ],
            allow_credentials: true,
        }
    }
}

/// Configuration problems detected at startup
#[derive(Debug, thiserror::Error)]
pub enum ServerConfigError {
    #[error("gateway: {0}")]
    Gateway(#[from] GatewayConfigError),

    #[error("cors: credentials cannot be allowed for a wildcard origin")]
    WildcardCredentials,

    #[error("cors: invalid origin '{0}'")]
    InvalidOrigin(String),

    #[error(
        "max_body_size_mb ({body_mb}MB) must exceed the upload limit ({upload_bytes} bytes)"
    )]
    BodyLimitTooSmall { body_mb: usize, upload_bytes: usize },
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: default_bind_addr(),
            port: default_port(),
            timeout_secs: default_timeout_secs(),
            max_body_size_mb: default_max_body_size_mb(),
            cors: CorsConfig::default(),
            log_level: default_log_level(),
            metrics_enabled: default_true(),
            gateway: GatewayConfig::default(),
        }
    }
}

impl ServerConfig {
    /// Load configuration from environment variables and config files
    pub fn load() -> anyhow::Result<Self> {
        let builder = config::Config::builder()
            // Load from file if exists
            .add_source(config::File::with_name("server").required(false))
            // Override with environment variables
            .add_source(
                config::Environment::with_prefix("DRAWGATE")
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("cors.allowed_origins")
                    .try_parsing(true),
            );

        let config: ServerConfig = builder.build()?.try_deserialize()?;
        config.validate()?;

        if config.cors.is_wildcard() {
            tracing::debug!("CORS allows any origin");
        }

        Ok(config)
    }

    /// Check cross-field constraints
    pub fn validate(&self) -> Result<(), ServerConfigError> {
        self.gateway.validate()?;

        if self.cors.is_wildcard() && self.cors.allow_credentials {
            return Err(ServerConfigError::WildcardCredentials);
        }
        if let Some(bad) = self
            .cors
            .allowed_origins
            .iter()
            .find(|origin| http::HeaderValue::from_str(origin).is_err() || origin.as_str() == "*")
        {
            return Err(ServerConfigError::InvalidOrigin(bad.clone()));
        }

        if self.max_body_size() <= self.gateway.ingest.max_upload_bytes {
            return Err(ServerConfigError::BodyLimitTooSmall {
                body_mb: self.max_body_size_mb,
                upload_bytes: self.gateway.ingest.max_upload_bytes,
            });
        }

        Ok(())
    }

    /// Get the socket address to bind to
    pub fn socket_addr(&self) -> anyhow::Result<SocketAddr> {
        let addr_str = format!("{}:{}", self.bind_addr, self.port);
        Ok(addr_str.parse()?)
    }

    /// Get request timeout as Duration
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Get max body size in bytes
    pub fn max_body_size(&self) -> usize {
        self.max_body_size_mb * 1024 * 1024
    }
}

fn default_bind_addr() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8000
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_max_body_size_mb() -> usize {
    64
}

fn default_true() -> bool {
    true
}

fn default_log_level() -> String {
    "info".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let cfg = ServerConfig::default();
        assert_eq!(cfg.port, 8000);
        assert_eq!(cfg.timeout_secs, 30);
        assert_eq!(cfg.max_body_size_mb, 64);
        assert!(cfg.cors.is_wildcard());
        assert!(cfg.metrics_enabled);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn test_socket_addr() {
        let cfg = ServerConfig::default();
        let addr = cfg.socket_addr().unwrap();
        assert_eq!(addr.port(), 8000);
    }

    #[test]
    fn wildcard_with_credentials_is_rejected() {
        let cfg = ServerConfig {
            cors: CorsConfig {
                allowed_origins: vec![],
                allow_credentials: true,
            },
            ..Default::default()
        };
        assert!(matches!(
            cfg.validate(),
            Err(ServerConfigError::WildcardCredentials)
        ));
    }

    #[test]
    fn local_dev_policy_is_valid() {
        let cfg = ServerConfig {
            cors: CorsConfig::local_dev(),
            ..Default::default()
        };
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn star_inside_origin_list_is_rejected() {
        let cfg = ServerConfig {
            cors: CorsConfig {
                allowed_origins: vec!["*".into()],
                allow_credentials: false,
            },
            ..Default::default()
        };
        assert!(matches!(
            cfg.validate(),
            Err(ServerConfigError::InvalidOrigin(_))
        ));
    }

    #[test]
    fn body_limit_must_exceed_upload_limit() {
        let cfg = ServerConfig {
            max_body_size_mb: 50,
            ..Default::default()
        };
        assert!(matches!(
            cfg.validate(),
            Err(ServerConfigError::BodyLimitTooSmall { .. })
        ));
    }
}
