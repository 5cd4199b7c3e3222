use crate::constants::TLS_HANDSHAKE_RECORD;
use crate::core_network::stream::{linger_close, FtpStream};
use crate::core_tls::error::TlsError;
use crate::core_tls::tls_config::TlsConfig;
use log::{debug, warn};
use std::fmt;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use tokio::net::TcpStream;
use tokio::time::{timeout_at, Instant};
use tokio_rustls::{rustls, TlsAcceptor};

/// Which of the two FTP channels is being secured.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelRole {
    Control,
    Data,
}

impl fmt::Display for ChannelRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChannelRole::Control => f.write_str("control"),
            ChannelRole::Data => f.write_str("data"),
        }
    }
}

pub struct TlsConnection {
    tls_acceptor: TlsAcceptor,
    handshake_timeout: Duration,
}

impl fmt::Debug for TlsConnection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TlsConnection")
            .field("handshake_timeout", &self.handshake_timeout)
            .finish_non_exhaustive()
    }
}

impl TlsConnection {
    pub fn new(cert_file: &Path, key_file: &Path, handshake_timeout: Duration) -> Result<Self, TlsError> {
        let certs = std::fs::read(cert_file)
            .map_err(|e| TlsError::CertificateLoadError(format!("{:?}: {}", cert_file, e)))?;
        let key = std::fs::read(key_file)
            .map_err(|e| TlsError::PrivateKeyLoadError(format!("{:?}: {}", key_file, e)))?;

        let cert_chain = rustls_pemfile::certs(&mut &certs[..])
            .map_err(|e| TlsError::CertificateLoadError(e.to_string()))?;
        if cert_chain.is_empty() {
            return Err(TlsError::CertificateLoadError(format!(
                "No certificate found in {:?}",
                cert_file
            )));
        }

        let mut keys = rustls_pemfile::pkcs8_private_keys(&mut &key[..])
            .map_err(|e| TlsError::PrivateKeyLoadError(e.to_string()))?;
        if keys.is_empty() {
            keys = rustls_pemfile::rsa_private_keys(&mut &key[..])
                .map_err(|e| TlsError::PrivateKeyLoadError(e.to_string()))?;
        }
        let private_key = keys.pop().ok_or_else(|| {
            TlsError::PrivateKeyLoadError(format!("No private key found in {:?}", key_file))
        })?;

        let cert_chain: Vec<rustls::Certificate> =
            cert_chain.into_iter().map(rustls::Certificate).collect();
        let private_key = rustls::PrivateKey(private_key);

        let config = rustls::ServerConfig::builder()
            .with_safe_defaults()
            .with_no_client_auth()
            .with_single_cert(cert_chain, private_key)
            .map_err(|e| TlsError::TlsConfigError(e.to_string()))?;

        Ok(Self {
            tls_acceptor: TlsAcceptor::from(Arc::new(config)),
            handshake_timeout,
        })
    }

    /// Builds the acceptor when a certificate is configured.
    pub fn from_config(config: &TlsConfig) -> Result<Option<Self>, TlsError> {
        config.validate()?;
        match (&config.cert_file, &config.key_file) {
            (Some(cert), Some(key)) => {
                Self::new(cert, key, config.handshake_timeout).map(Some)
            }
            _ => Ok(None),
        }
    }

    /// Runs the server side of the handshake, bounded by the handshake timeout.
    ///
    /// The first byte from the peer must open a TLS handshake record; a
    /// plaintext client is rejected without waiting for the full timeout.
    pub async fn accept_tls(
        &self,
        stream: TcpStream,
    ) -> Result<tokio_rustls::server::TlsStream<TcpStream>, TlsError> {
        let deadline = Instant::now() + self.handshake_timeout;
        await_client_hello(&stream, deadline).await?;

        match timeout_at(deadline, self.tls_acceptor.accept(stream)).await {
            Ok(Ok(tls_stream)) => Ok(tls_stream),
            Ok(Err(e)) => Err(TlsError::TlsHandshakeError(e.to_string())),
            Err(_) => Err(TlsError::HandshakeTimeout),
        }
    }
}

/// Secures a freshly established channel when `required` is set.
///
/// When the peer never starts a handshake on the control channel it is sent
/// a plaintext 421 before the socket is dropped. For the data channel the
/// caller reports the failure on the control channel instead.
///
/// # Arguments
///
/// * `tls` - The configured acceptor, if any.
/// * `stream` - The raw TCP connection.
/// * `role` - Control or data channel.
/// * `required` - Whether this channel must be encrypted.
pub async fn maybe_upgrade(
    tls: Option<&TlsConnection>,
    mut stream: TcpStream,
    role: ChannelRole,
    required: bool,
) -> Result<FtpStream, TlsError> {
    if !required {
        return Ok(FtpStream::Plain(stream));
    }

    let tls = tls.ok_or(TlsError::TlsNotConfigured)?;
    let deadline = Instant::now() + tls.handshake_timeout;

    if let Err(e) = await_client_hello(&stream, deadline).await {
        warn!("TLS required on {} channel: {}", role, e);
        if role == ChannelRole::Control {
            let reply = format!("{}\r\n", e.to_ftp_response());
            let _ = stream.write_all(reply.as_bytes()).await;
            linger_close(&mut stream).await;
        }
        return Err(e);
    }

    match tls.accept_tls(stream).await {
        Ok(tls_stream) => {
            debug!("TLS established on {} channel", role);
            Ok(FtpStream::Tls(Box::new(tls_stream)))
        }
        Err(e) => {
            warn!("TLS handshake on {} channel failed: {}", role, e);
            Err(e)
        }
    }
}

async fn await_client_hello(stream: &TcpStream, deadline: Instant) -> Result<(), TlsError> {
    let mut first = [0u8; 1];
    match timeout_at(deadline, stream.peek(&mut first)).await {
        Err(_) => Err(TlsError::HandshakeTimeout),
        Ok(Ok(0)) => Err(TlsError::TlsHandshakeError(
            "connection closed before handshake".to_string(),
        )),
        Ok(Ok(_)) if first[0] == TLS_HANDSHAKE_RECORD => Ok(()),
        Ok(Ok(_)) => Err(TlsError::NotTls),
        Ok(Err(e)) => Err(TlsError::TlsHandshakeError(e.to_string())),
    }
}
