use std::fmt;
use std::error::Error;

/// Unified application error.
///
/// Raised at startup (config, credentials) and when a run cannot
/// continue (worksheet unreadable, rewrite failed).
#[derive(Debug)]
pub enum AppError {
    Config(String),
    Auth(String),
    Network(String),
    Parse(String),
    Sheet(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Config(msg) => write!(f, "Config error: {}", msg),
            AppError::Auth(msg) => write!(f, "Auth error: {}", msg),
            AppError::Network(msg) => write!(f, "Network error: {}", msg),
            AppError::Parse(msg) => write!(f, "Parse error: {}", msg),
            AppError::Sheet(msg) => write!(f, "Sheet error: {}", msg),
        }
    }
}

impl Error for AppError {}

impl From<crate::monitor::ServiceError> for AppError {
    fn from(err: crate::monitor::ServiceError) -> Self {
        use crate::monitor::ServiceError;

        match err {
            ServiceError::Auth { message } => AppError::Auth(message),
            ServiceError::Network { message } => AppError::Network(message),
            ServiceError::Format { message } => AppError::Parse(message),
            ServiceError::Sheet { message } => AppError::Sheet(message),
            other => AppError::Network(other.to_string()),
        }
    }
}
