use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    /// Unknown user and wrong password are deliberately indistinguishable.
    #[error("Login incorrect")]
    LoginIncorrect,
}

impl AuthError {
    pub fn to_ftp_response(&self) -> String {
        match self {
            AuthError::LoginIncorrect => "530 Login incorrect.".to_string(),
        }
    }
}

#[derive(Error, Debug)]
pub enum CredentialError {
    #[error("Duplicate user: {0}")]
    DuplicateUser(String),

    #[error("Invalid username: {0:?}")]
    InvalidUsername(String),

    #[error("Home directory of user {username} is not a directory: {path:?}")]
    MissingHome { username: String, path: PathBuf },

    #[error("Invalid username pattern: {0}")]
    Pattern(#[from] regex::Error),
}
