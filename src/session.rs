use crate::core_auth::User;
use crate::core_fs::{path, Filesystem, FsError, PathError};
use crate::core_network::data_channel::{DataChannel, TransferMode};
use crate::core_transfer::TransferType;
use crate::server::ServerContext;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

/// Login progress of a control connection.
#[derive(Debug, Clone)]
pub enum SessionState {
    Unauthenticated,
    AwaitingPassword { username: String },
    Authenticated(Arc<User>),
}

/// A client path resolved against the working directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedPath {
    /// Normalized path as the client sees it, rooted at the user's home.
    pub virtual_path: String,
    /// The same location on disk.
    pub real: PathBuf,
}

impl ResolvedPath {
    pub fn is_root(&self) -> bool {
        self.virtual_path == "/"
    }
}

/// Per-connection state, owned by the connection's task.
#[derive(Debug)]
pub struct Session {
    pub ctx: Arc<ServerContext>,
    pub peer_addr: SocketAddr,
    pub local_addr: SocketAddr,
    pub state: SessionState,
    pub current_dir: String,
    pub transfer_type: TransferType,
    pub data_channel: Option<DataChannel>,
    pub rename_from: Option<ResolvedPath>,
    pub control_secure: bool,
    pub pbsz_set: bool,
    /// PROT P was issued.
    pub data_protected: bool,
    pub failed_logins: u32,
    /// Byte offset set by REST for the next RETR or STOR.
    pub restart_offset: u64,
    /// EPSV ALL was sent; every other way of opening a data channel is refused.
    pub epsv_all: bool,
    /// Control input read while a transfer was running, to be handled
    /// before anything else is read.
    pub pending_input: Vec<u8>,
}

impl Session {
    pub fn new(
        ctx: Arc<ServerContext>,
        peer_addr: SocketAddr,
        local_addr: SocketAddr,
        control_secure: bool,
    ) -> Self {
        Self {
            ctx,
            peer_addr,
            local_addr,
            state: SessionState::Unauthenticated,
            current_dir: String::from("/"),
            transfer_type: TransferType::Ascii,
            data_channel: None,
            rename_from: None,
            control_secure,
            pbsz_set: false,
            data_protected: false,
            failed_logins: 0,
            restart_offset: 0,
            epsv_all: false,
            pending_input: Vec::new(),
        }
    }

    pub fn user(&self) -> Option<&Arc<User>> {
        match &self.state {
            SessionState::Authenticated(user) => Some(user),
            _ => None,
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.user().is_some()
    }

    /// Name for log lines: the logged-in user, the claimed one, or `-`.
    pub fn username(&self) -> &str {
        match &self.state {
            SessionState::Authenticated(user) => &user.username,
            SessionState::AwaitingPassword { username } => username,
            SessionState::Unauthenticated => "-",
        }
    }

    pub fn fs(&self) -> &dyn Filesystem {
        self.ctx.fs.as_ref()
    }

    pub fn transfer_mode(&self) -> Option<TransferMode> {
        self.data_channel.as_ref().map(DataChannel::mode)
    }

    pub fn login(&mut self, user: Arc<User>) {
        self.state = SessionState::Authenticated(user);
        self.current_dir = String::from("/");
        self.failed_logins = 0;
    }

    /// Back to the freshly connected state; TLS on the control channel stays.
    pub fn reinitialize(&mut self) {
        self.state = SessionState::Unauthenticated;
        self.current_dir = String::from("/");
        self.transfer_type = TransferType::Ascii;
        self.data_channel = None;
        self.rename_from = None;
        self.restart_offset = 0;
        self.epsv_all = false;
    }

    /// The pending REST offset, which only applies to one transfer.
    pub fn take_restart_offset(&mut self) -> u64 {
        std::mem::take(&mut self.restart_offset)
    }

    /// Resolves a client path for the logged-in user.
    ///
    /// Fails with [`PathError::Violation`] for anything above the home
    /// directory, and when nobody is logged in.
    pub fn resolve(&self, arg: &str) -> Result<ResolvedPath, PathError> {
        let user = self
            .user()
            .ok_or_else(|| PathError::Violation(arg.to_string()))?;
        let virtual_path = path::resolve_virtual(&self.current_dir, arg)?;
        let real = path::to_real_path(&user.home_dir, &virtual_path);
        Ok(ResolvedPath { virtual_path, real })
    }

    /// Whether `resolved` still lies inside the home directory once symlinks
    /// are followed on disk.
    pub async fn is_confined(&self, resolved: &ResolvedPath) -> Result<bool, FsError> {
        let user = match self.user() {
            Some(user) => user,
            None => return Ok(false),
        };
        let home = self.fs().canonicalize(&user.home_dir).await?;
        let real = self.fs().canonicalize(&resolved.real).await?;
        Ok(real.starts_with(home))
    }

    /// Whether the next data connection must be TLS.
    pub fn data_tls_required(&self) -> bool {
        let tls = &self.ctx.config.tls;
        self.data_protected || (tls.data_required && tls.implicit)
    }

    /// Data TLS is mandatory but an explicit-mode client has not sent PROT P.
    pub fn data_protection_missing(&self) -> bool {
        let tls = &self.ctx.config.tls;
        tls.data_required && !tls.implicit && !self.data_protected
    }
}
