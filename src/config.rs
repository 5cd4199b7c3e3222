use crate::constants::{
    DEFAULT_BANNER, DEFAULT_DATA_TIMEOUT, DEFAULT_DOWNLOAD_BUFFER_SIZE, DEFAULT_IDLE_TIMEOUT,
    DEFAULT_LISTEN_ADDRESSES, DEFAULT_MAX_LOGIN_ATTEMPTS, DEFAULT_PERMISSIONS,
    DEFAULT_SHUTDOWN_GRACE, DEFAULT_UPLOAD_BUFFER_SIZE,
};
use crate::core_auth::{CredentialError, User};
use crate::core_perm::{PermissionError, Permissions};
use crate::core_tls::{TlsConfig, TlsError};
use crate::core_transfer::TransferSettings;
use log::info;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read configuration file {path:?}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse configuration: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error("Invalid permissions for user {username}: {source}")]
    Permissions {
        username: String,
        source: PermissionError,
    },

    #[error(transparent)]
    Tls(#[from] TlsError),

    #[error(transparent)]
    Credentials(#[from] CredentialError),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Every address gets its own listening socket.
    pub listen_addresses: Vec<SocketAddr>,
    /// Home of users that do not name their own.
    pub root_dir: PathBuf,
    pub banner: String,
    /// Address announced in PASV replies instead of the control socket's.
    pub pasv_address: Option<IpAddr>,
    /// Inclusive port range for passive listeners; any free port when unset.
    pub passive_ports: Option<[u16; 2]>,
    #[serde(with = "serde_secs")]
    pub idle_timeout: Duration,
    #[serde(with = "serde_secs")]
    pub data_timeout: Duration,
    #[serde(with = "serde_secs")]
    pub shutdown_grace: Duration,
    pub max_login_attempts: u32,
    pub upload_buffer_size: Option<usize>,
    pub download_buffer_size: Option<usize>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_addresses: DEFAULT_LISTEN_ADDRESSES
                .iter()
                .filter_map(|addr| addr.parse().ok())
                .collect(),
            root_dir: PathBuf::from("."),
            banner: DEFAULT_BANNER.to_string(),
            pasv_address: None,
            passive_ports: None,
            idle_timeout: DEFAULT_IDLE_TIMEOUT,
            data_timeout: DEFAULT_DATA_TIMEOUT,
            shutdown_grace: DEFAULT_SHUTDOWN_GRACE,
            max_login_attempts: DEFAULT_MAX_LOGIN_ATTEMPTS,
            upload_buffer_size: Some(DEFAULT_UPLOAD_BUFFER_SIZE),
            download_buffer_size: Some(DEFAULT_DOWNLOAD_BUFFER_SIZE),
        }
    }
}

#[derive(Clone, Serialize, Deserialize)]
pub struct UserConfig {
    pub username: String,
    pub password: String,
    #[serde(default)]
    pub home_dir: Option<PathBuf>,
    #[serde(default = "default_permissions")]
    pub permissions: String,
}

impl fmt::Debug for UserConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UserConfig")
            .field("username", &self.username)
            .field("home_dir", &self.home_dir)
            .field("permissions", &self.permissions)
            .finish_non_exhaustive()
    }
}

impl UserConfig {
    pub fn new(username: &str, password: &str) -> Self {
        Self {
            username: username.to_string(),
            password: password.to_string(),
            home_dir: None,
            permissions: default_permissions(),
        }
    }
}

fn default_permissions() -> String {
    DEFAULT_PERMISSIONS.to_string()
}

/// The two accounts the fixture has always shipped with.
fn default_users() -> Vec<UserConfig> {
    vec![
        UserConfig::new("user", "password"),
        UserConfig::new("alice", "password"),
    ]
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub tls: TlsConfig,
    #[serde(default = "default_users")]
    pub users: Vec<UserConfig>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            tls: TlsConfig::default(),
            users: default_users(),
        }
    }
}

impl Config {
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let config_str = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&config_str)
    }

    pub fn from_toml_str(config_str: &str) -> Result<Self, ConfigError> {
        let mut config: Config = toml::from_str(config_str)?;

        // Set defaults if not specified
        if config.server.upload_buffer_size.is_none() {
            config.server.upload_buffer_size = Some(DEFAULT_UPLOAD_BUFFER_SIZE);
        }
        if config.server.download_buffer_size.is_none() {
            config.server.download_buffer_size = Some(DEFAULT_DOWNLOAD_BUFFER_SIZE);
        }

        Ok(config)
    }

    /// Rejects configurations the server could not run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server.listen_addresses.is_empty() {
            return Err(ConfigError::Invalid(
                "at least one listen address is required".to_string(),
            ));
        }
        if !self.server.root_dir.is_dir() {
            return Err(ConfigError::Invalid(format!(
                "root directory {:?} does not exist",
                self.server.root_dir
            )));
        }
        if let Some([low, high]) = self.server.passive_ports {
            if low == 0 || low > high {
                return Err(ConfigError::Invalid(format!(
                    "invalid passive port range {}-{}",
                    low, high
                )));
            }
        }
        if self.server.idle_timeout.is_zero() || self.server.data_timeout.is_zero() {
            return Err(ConfigError::Invalid("timeouts must be positive".to_string()));
        }
        if self.users.is_empty() {
            return Err(ConfigError::Invalid("no users configured".to_string()));
        }
        self.tls.validate()?;
        Ok(())
    }

    /// Turns the `[[users]]` tables into credential store entries.
    pub fn build_users(&self) -> Result<Vec<User>, ConfigError> {
        self.users
            .iter()
            .map(|entry| {
                let permissions: Permissions =
                    entry
                        .permissions
                        .parse()
                        .map_err(|source| ConfigError::Permissions {
                            username: entry.username.clone(),
                            source,
                        })?;
                Ok(User {
                    username: entry.username.clone(),
                    password: entry.password.clone(),
                    home_dir: entry
                        .home_dir
                        .clone()
                        .unwrap_or_else(|| self.server.root_dir.clone()),
                    permissions,
                })
            })
            .collect()
    }

    /// Replaces the port of every listen address.
    pub fn set_listen_port(&mut self, port: u16) {
        for addr in &mut self.server.listen_addresses {
            addr.set_port(port);
        }
    }

    pub fn transfer_settings(&self) -> TransferSettings {
        TransferSettings {
            upload_buffer_size: self
                .server
                .upload_buffer_size
                .unwrap_or(DEFAULT_UPLOAD_BUFFER_SIZE),
            download_buffer_size: self
                .server
                .download_buffer_size
                .unwrap_or(DEFAULT_DOWNLOAD_BUFFER_SIZE),
            timeout: self.server.data_timeout,
        }
    }
}

// Helper function to log configuration options
pub fn log_config(config: &Config) {
    info!("  Listen Addresses: {:?}", config.server.listen_addresses);
    info!("  Root Directory: {:?}", config.server.root_dir);
    if let Some(pasv) = config.server.pasv_address {
        info!("  PASV Address: {}", pasv);
    }
    info!(
        "  TLS: control required {}, data required {}, {}",
        config.tls.control_required,
        config.tls.data_required,
        if config.tls.implicit { "implicit" } else { "explicit" }
    );
    info!("  Idle Timeout: {:?}", config.server.idle_timeout);
    info!("  Users: {}", config.users.len());
}

/// Durations written as (possibly fractional) seconds.
pub mod serde_secs {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(value.as_secs_f64())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        let secs = f64::deserialize(deserializer)?;
        if !secs.is_finite() || secs < 0.0 {
            return Err(serde::de::Error::custom("duration must be a non-negative number"));
        }
        Ok(Duration::from_secs_f64(secs))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core_perm::Capability;

    #[test]
    fn test_defaults_match_fixture() {
        let config = Config::default();
        assert_eq!(config.server.banner, "FTP server is ready.");
        assert_eq!(config.server.listen_addresses.len(), 2);
        assert!(config.server.listen_addresses[0].is_ipv4());
        assert!(config.server.listen_addresses[1].is_ipv6());
        let names: Vec<_> = config.users.iter().map(|u| u.username.as_str()).collect();
        assert_eq!(names, ["user", "alice"]);
        assert!(!config.tls.control_required);
    }

    #[test]
    fn test_parse_full_file() {
        let config = Config::from_toml_str(
            r#"
            [server]
            listen_addresses = ["127.0.0.1:2121"]
            root_dir = "/tmp"
            idle_timeout = 0.5
            passive_ports = [50000, 50010]

            [tls]
            cert_file = "cert.pem"
            key_file = "key.pem"
            control_required = true
            data_required = true
            handshake_timeout = 2

            [[users]]
            username = "reader"
            password = "pw"
            permissions = "elr"
            "#,
        )
        .unwrap();

        assert_eq!(config.server.idle_timeout, Duration::from_millis(500));
        assert_eq!(config.server.passive_ports, Some([50000, 50010]));
        assert_eq!(config.server.upload_buffer_size, Some(DEFAULT_UPLOAD_BUFFER_SIZE));
        assert_eq!(config.tls.handshake_timeout, Duration::from_secs(2));
        assert!(config.tls.implicit);

        let users = config.build_users().unwrap();
        assert_eq!(users[0].home_dir, PathBuf::from("/tmp"));
        assert!(users[0].permissions.contains(Capability::Retrieve));
        assert!(!users[0].permissions.contains(Capability::Store));
    }

    #[test]
    fn test_bad_permission_letter_names_user() {
        let mut config = Config::default();
        config.users[1].permissions = "elz".to_string();
        match config.build_users() {
            Err(ConfigError::Permissions { username, .. }) => assert_eq!(username, "alice"),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_tls_required_without_certificate_is_invalid() {
        let mut config = Config::default();
        config.server.root_dir = std::env::temp_dir();
        config.tls.control_required = true;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Tls(TlsError::TlsNotConfigured))
        ));
    }

    #[test]
    fn test_set_listen_port() {
        let mut config = Config::default();
        config.set_listen_port(2222);
        assert!(config.server.listen_addresses.iter().all(|a| a.port() == 2222));
    }
}
