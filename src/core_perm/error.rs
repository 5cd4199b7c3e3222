use crate::core_perm::permission::Capability;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PermissionError {
    #[error("Unknown permission letter '{0}' (expected one of \"elradfmwMT\")")]
    UnknownLetter(char),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AuthorizationError {
    #[error("Command {0} requires a logged-in user")]
    NotLoggedIn(String),

    #[error("User {username} lacks {capability} for {command}")]
    Denied {
        username: String,
        command: String,
        capability: Capability,
    },
}

impl AuthorizationError {
    pub fn to_ftp_response(&self) -> String {
        match self {
            AuthorizationError::NotLoggedIn(_) => "530 Log in with USER and PASS first.".to_string(),
            AuthorizationError::Denied { .. } => "550 Not enough privileges.".to_string(),
        }
    }
}
