// src/constants.rs

use std::time::Duration;

pub const USERNAME_REGEX: &str = r"^[a-zA-Z0-9_.-]{1,32}$";

/// Longest command line accepted on the control channel, CRLF included.
pub const MAX_COMMAND_LENGTH: usize = 512;

pub const DEFAULT_BANNER: &str = "FTP server is ready.";
pub const DEFAULT_PERMISSIONS: &str = "elradfmwM";
pub const DEFAULT_LISTEN_ADDRESSES: [&str; 2] = ["127.0.0.1:2121", "[::1]:2121"];

pub const DEFAULT_IDLE_TIMEOUT: Duration = Duration::from_secs(300);
pub const DEFAULT_DATA_TIMEOUT: Duration = Duration::from_secs(30);
pub const DEFAULT_HANDSHAKE_TIMEOUT: Duration = Duration::from_secs(10);
pub const DEFAULT_SHUTDOWN_GRACE: Duration = Duration::from_secs(5);
pub const DEFAULT_MAX_LOGIN_ATTEMPTS: u32 = 3;
/// Symlinks followed while resolving one path before giving up.
pub const MAX_SYMLINK_HOPS: u32 = 40;
/// How long a closing connection keeps draining input from the peer.
pub const LINGER_TIMEOUT: Duration = Duration::from_millis(500);

pub const DEFAULT_UPLOAD_BUFFER_SIZE: usize = 256 * 1024;
pub const DEFAULT_DOWNLOAD_BUFFER_SIZE: usize = 128 * 1024;

/// First byte of a TLS record carrying a handshake message.
pub const TLS_HANDSHAKE_RECORD: u8 = 0x16;
