// Channel security: rustls acceptor plus the implicit/explicit upgrade paths.

pub mod error;
pub mod tls_config;
pub mod tls_connection;

pub use error::TlsError;
pub use tls_config::TlsConfig;
pub use tls_connection::{maybe_upgrade, ChannelRole, TlsConnection};
