use super::ConfigError;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Protocol {
    Http,
    Https,
}

impl Protocol {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Http => "http",
            Self::Https => "https",
        }
    }
}

impl std::fmt::Display for Protocol {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Wrapper matching the layout of `auth_config.json`: connection details live
/// under the `eas_server` key.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AuthConfigFile {
    pub eas_server: ConnectionConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ConnectionConfig {
    pub host: String,
    pub port: u16,
    pub protocol: Protocol,
    pub access_token: String,
    #[serde(default = "default_true")]
    pub verify_certificate: bool,
    #[serde(default)]
    pub ca_filename: Option<PathBuf>,
}

fn default_true() -> bool {
    true
}

impl ConnectionConfig {
    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let raw = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        let file: AuthConfigFile =
            serde_json::from_str(&raw).map_err(|source| ConfigError::ParseJson {
                path: path.display().to_string(),
                source,
            })?;
        Ok(file.eas_server)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.host.trim().is_empty() {
            return Err(ConfigError::Settings(
                "`eas_server.host` must be non-empty".to_string(),
            ));
        }
        if self.port == 0 {
            return Err(ConfigError::Settings(
                "`eas_server.port` must be > 0".to_string(),
            ));
        }
        if self.access_token.trim().is_empty() {
            return Err(ConfigError::Settings(
                "`eas_server.access_token` must be non-empty".to_string(),
            ));
        }
        if let Some(ca) = &self.ca_filename {
            if ca.as_os_str().is_empty() {
                return Err(ConfigError::Settings(
                    "`eas_server.ca_filename` must be non-empty when set".to_string(),
                ));
            }
        }
        Ok(())
    }

    pub fn base_url(&self) -> String {
        format!("{}://{}:{}", self.protocol, self.host, self.port)
    }
}
