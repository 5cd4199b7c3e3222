use crate::core_fs::FsError;
use std::io;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum TransferError {
    #[error("Can't open data connection: {0}")]
    CantOpen(io::Error),

    #[error("Data connection failed: {0}")]
    Connection(io::Error),

    #[error("Data connection timed out")]
    TimedOut,

    #[error("Local error: {0}")]
    Local(FsError),
}

impl TransferError {
    pub fn to_ftp_response(&self) -> String {
        match self {
            TransferError::CantOpen(_) => "425 Can't open data connection.".to_string(),
            TransferError::Connection(_) | TransferError::TimedOut => {
                "426 Connection closed; transfer aborted.".to_string()
            }
            TransferError::Local(FsError::Io(_)) => {
                "451 Requested action aborted. Local error in processing.".to_string()
            }
            TransferError::Local(err) => err.to_ftp_response(),
        }
    }
}
