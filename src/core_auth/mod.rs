pub mod core_auth;
pub mod error;
pub mod helper;

pub use core_auth::{CredentialStore, User};
pub use error::{AuthError, CredentialError};
