use crate::constants::DEFAULT_HANDSHAKE_TIMEOUT;
use crate::core_tls::error::TlsError;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TlsConfig {
    /// PEM certificate chain.
    pub cert_file: Option<PathBuf>,

    /// PEM private key (PKCS#8 or RSA).
    pub key_file: Option<PathBuf>,

    /// Require TLS on the control channel.
    pub control_required: bool,

    /// Require TLS on every data connection.
    pub data_required: bool,

    /// Implicit FTPS: handshake as soon as a connection is accepted.
    /// When false, clients upgrade with AUTH TLS.
    pub implicit: bool,

    #[serde(with = "crate::config::serde_secs")]
    pub handshake_timeout: Duration,
}

impl Default for TlsConfig {
    fn default() -> Self {
        Self {
            cert_file: None,
            key_file: None,
            control_required: false,
            data_required: false,
            implicit: true,
            handshake_timeout: DEFAULT_HANDSHAKE_TIMEOUT,
        }
    }
}

impl TlsConfig {
    /// Whether a certificate is configured at all.
    pub fn enabled(&self) -> bool {
        self.cert_file.is_some() || self.key_file.is_some()
    }

    /// Checks that a required channel has a certificate and that configured
    /// files exist.
    pub fn validate(&self) -> Result<(), TlsError> {
        if (self.control_required || self.data_required) && !self.enabled() {
            return Err(TlsError::TlsNotConfigured);
        }

        if self.enabled() {
            match &self.cert_file {
                Some(cert) if cert.exists() => {}
                other => {
                    return Err(TlsError::CertificateLoadError(format!(
                        "Certificate file not found: {:?}",
                        other
                    )))
                }
            }

            match &self.key_file {
                Some(key) if key.exists() => {}
                other => {
                    return Err(TlsError::PrivateKeyLoadError(format!(
                        "Private key file not found: {:?}",
                        other
                    )))
                }
            }
        }

        Ok(())
    }
}
