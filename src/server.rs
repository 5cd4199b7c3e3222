use crate::config::{log_config, Config, ConfigError};
use crate::core_auth::CredentialStore;
use crate::core_fs::{Filesystem, LocalFilesystem};
use crate::core_network::network;
use crate::core_tls::TlsConnection;
use anyhow::Result;
use log::{error, info};
use std::io;
use std::net::SocketAddr;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::watch;
use tokio::task::JoinHandle;

#[derive(Error, Debug)]
pub enum ServerError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Failed to bind {addr}: {source}")]
    Bind { addr: SocketAddr, source: io::Error },
}

/// Everything sessions share, built once at startup and never mutated.
#[derive(Debug)]
pub struct ServerContext {
    pub config: Config,
    pub credentials: CredentialStore,
    pub tls: Option<TlsConnection>,
    pub fs: Arc<dyn Filesystem>,
}

/// A validated server that has not started listening yet.
#[derive(Debug)]
pub struct FtpServer {
    ctx: Arc<ServerContext>,
}

impl FtpServer {
    /// Builds a server storing files on the local disk.
    pub fn new(config: Config) -> Result<Self, ServerError> {
        Self::with_filesystem(config, Arc::new(LocalFilesystem))
    }

    /// Builds a server on top of another storage backend.
    ///
    /// Fails when the configuration is invalid, a user entry is rejected or
    /// the certificate cannot be loaded.
    pub fn with_filesystem(config: Config, fs: Arc<dyn Filesystem>) -> Result<Self, ServerError> {
        config.validate()?;
        let credentials =
            CredentialStore::from_users(config.build_users()?).map_err(ConfigError::from)?;
        let tls = TlsConnection::from_config(&config.tls).map_err(ConfigError::from)?;
        Ok(Self {
            ctx: Arc::new(ServerContext {
                config,
                credentials,
                tls,
                fs,
            }),
        })
    }

    pub fn context(&self) -> &Arc<ServerContext> {
        &self.ctx
    }

    /// Binds every configured address and starts accepting connections.
    pub async fn bind(self) -> Result<ServerHandle, ServerError> {
        let listeners = network::bind_listeners(&self.ctx.config.server.listen_addresses)
            .await
            .map_err(|(addr, source)| ServerError::Bind { addr, source })?;
        let local_addrs = listeners
            .iter()
            .filter_map(|listener| listener.local_addr().ok())
            .collect();

        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let grace = self.ctx.config.server.shutdown_grace;
        let supervisor = network::start_server(listeners, self.ctx, shutdown_rx, grace);
        Ok(ServerHandle {
            local_addrs,
            shutdown_tx,
            supervisor,
        })
    }
}

/// A running server.
#[derive(Debug)]
pub struct ServerHandle {
    local_addrs: Vec<SocketAddr>,
    shutdown_tx: watch::Sender<bool>,
    supervisor: JoinHandle<()>,
}

impl ServerHandle {
    /// The bound addresses, with the real ports when port 0 was configured.
    pub fn local_addrs(&self) -> &[SocketAddr] {
        &self.local_addrs
    }

    /// Stops accepting, tells idle sessions `421` and waits for the rest up
    /// to the configured grace period.
    pub async fn shutdown(self) {
        let _ = self.shutdown_tx.send(true);
        if let Err(e) = self.supervisor.await {
            error!("Server supervisor failed: {}", e);
        }
        info!("Server stopped.");
    }
}

/// Runs the FTP server with the provided configuration until Ctrl-C.
///
/// # Returns
///
/// Result<(), anyhow::Error> indicating the success or failure of the operation.
pub async fn run(config: Config) -> Result<()> {
    info!("Starting server with config:");
    log_config(&config);

    let handle = FtpServer::new(config)?.bind().await?;
    info!("Server started successfully.");

    tokio::signal::ctrl_c().await?;
    info!("Shutdown requested.");
    handle.shutdown().await;
    Ok(())
}
