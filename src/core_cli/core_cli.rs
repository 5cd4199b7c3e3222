use crate::config::{Config, ConfigError};
use clap::Parser;
use std::path::PathBuf;

/// Command-line arguments
#[derive(Parser, Debug, Default)]
#[command(name = "fixtureftpd", about = "A test-fixture FTP server with optional FTPS.")]
pub struct Cli {
    /// Path to the configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Port for every listen address
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Home directory of users that do not name their own
    #[arg(short, long)]
    pub root: Option<PathBuf>,

    /// Require TLS on both the control and the data channel
    #[arg(long)]
    pub tls: bool,

    /// PEM certificate chain
    #[arg(long)]
    pub cert: Option<PathBuf>,

    /// PEM private key (PKCS#8 or RSA)
    #[arg(long)]
    pub key: Option<PathBuf>,

    /// Enable verbose mode
    #[arg(short, long)]
    pub verbose: bool,

    /// Print a bcrypt hash of PASSWORD for the `password` key of a user, then exit
    #[arg(long, value_name = "PASSWORD")]
    pub hash_password: Option<String>,
}

impl Cli {
    /// Loads the configuration file, or the built-in fixture defaults, and
    /// applies the command-line overrides on top.
    pub fn load_config(&self) -> Result<Config, ConfigError> {
        let mut config = match &self.config {
            Some(path) => Config::load_from_file(path)?,
            None => Config::default(),
        };
        self.apply_overrides(&mut config);
        Ok(config)
    }

    pub fn apply_overrides(&self, config: &mut Config) {
        if let Some(port) = self.port {
            config.set_listen_port(port);
        }
        if let Some(root) = &self.root {
            config.server.root_dir = root.clone();
        }
        if let Some(cert) = &self.cert {
            config.tls.cert_file = Some(cert.clone());
        }
        if let Some(key) = &self.key {
            config.tls.key_file = Some(key.clone());
        }
        if self.tls {
            config.tls.control_required = true;
            config.tls.data_required = true;
        }
    }
}
