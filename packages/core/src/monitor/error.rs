//! Error types for the monitoring run

use thiserror::Error;

/// Problems with a single worksheet row, or with the worksheet layout.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RecordError {
    #[error("worksheet is missing the required '{column}' column")]
    MissingColumn { column: String },

    #[error("row {row}: '{column}' is empty")]
    MissingValue { row: usize, column: String },

    #[error("row {row}: line item ID '{value}' is not numeric")]
    InvalidLineItemId { row: usize, value: String },

    #[error("row {row}: impression threshold '{value}' is not a non-negative integer")]
    InvalidThreshold { row: usize, value: String },
}

/// Errors from the Sheets, Ad Manager and SMTP services
#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("Network error: {message}")]
    Network { message: String },

    #[error("{service} returned HTTP {status}: {body}")]
    Http {
        service: &'static str,
        status: u16,
        body: String,
    },

    #[error("Data format error: {message}")]
    Format { message: String },

    #[error("SOAP fault: {message}")]
    Fault { message: String },

    #[error("Authentication error: {message}")]
    Auth { message: String },

    #[error("Email error: {message}")]
    Email { message: String },

    #[error("Sheet error: {message}")]
    Sheet { message: String },
}

impl ServiceError {
    pub fn network(message: impl Into<String>) -> Self {
        Self::Network { message: message.into() }
    }

    pub fn format(message: impl Into<String>) -> Self {
        Self::Format { message: message.into() }
    }

    pub fn auth(message: impl Into<String>) -> Self {
        Self::Auth { message: message.into() }
    }

    pub fn email(message: impl Into<String>) -> Self {
        Self::Email { message: message.into() }
    }

    pub fn sheet(message: impl Into<String>) -> Self {
        Self::Sheet { message: message.into() }
    }
}

impl From<RecordError> for ServiceError {
    fn from(err: RecordError) -> Self {
        Self::sheet(err.to_string())
    }
}

/// Result type for service operations
pub type ServiceResult<T> = Result<T, ServiceError>;
