use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProtocolError {
    #[error("Unknown command {0:?}")]
    UnknownCommand(String),

    #[error("Syntax error: {0}")]
    Syntax(String),

    #[error("Bad sequence of commands: {0}")]
    BadSequence(String),

    #[error("Unsupported parameter: {0}")]
    UnsupportedParameter(String),

    #[error("Command line is not valid UTF-8")]
    InvalidEncoding,

    #[error("Command line exceeds the maximum length")]
    LineTooLong,
}

impl ProtocolError {
    pub fn to_ftp_response(&self) -> String {
        match self {
            ProtocolError::UnknownCommand(verb) => format!("500 Command \"{}\" not understood.", verb),
            ProtocolError::Syntax(_) => "501 Syntax error in parameters or arguments.".to_string(),
            ProtocolError::BadSequence(detail) => format!("503 Bad sequence of commands: {}.", detail),
            ProtocolError::UnsupportedParameter(_) => {
                "504 Command not implemented for that parameter.".to_string()
            }
            ProtocolError::InvalidEncoding => "501 Command is not valid UTF-8.".to_string(),
            ProtocolError::LineTooLong => "421 Command line too long; closing connection.".to_string(),
        }
    }
}
