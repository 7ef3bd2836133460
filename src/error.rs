// src/error.rs
//! Classified errors shared by the normalizer, filter state and directory adapter

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// A filter value or form field outside its allowed taxonomy
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid value '{value}' for {field}: {message}")]
pub struct ValidationError {
    pub field: &'static str,
    pub value: String,
    pub message: String,
}

impl ValidationError {
    pub fn new(field: &'static str, value: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field,
            value: value.into(),
            message: message.into(),
        }
    }
}

/// A fetched record that cannot become a canonical job
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NormalizationError {
    #[error("record is not a JSON object")]
    NotAnObject,
    #[error("missing required field '{0}'")]
    MissingField(&'static str),
    #[error("malformed field '{field}': {reason}")]
    Malformed { field: &'static str, reason: String },
    #[error("unparseable posting date '{0}'")]
    InvalidDate(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Validation,
    Normalization,
    Network,
    Auth,
    Server,
    Decode,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Normalization(#[from] NormalizationError),

    #[error("network error: {message}")]
    Network { message: String },

    #[error("authentication failed: {message}")]
    Auth { message: String },

    #[error("service returned {status}: {message}")]
    Server { status: u16, message: String },

    #[error("unexpected response: {message}")]
    Decode { message: String },
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Validation(_) => ErrorKind::Validation,
            Error::Normalization(_) => ErrorKind::Normalization,
            Error::Network { .. } => ErrorKind::Network,
            Error::Auth { .. } => ErrorKind::Auth,
            Error::Server { .. } => ErrorKind::Server,
            Error::Decode { .. } => ErrorKind::Decode,
        }
    }

    /// Only failures that never reached the service are worth retrying
    pub fn is_retryable(&self) -> bool {
        matches!(self, Error::Network { .. })
    }

    pub fn network(message: impl Into<String>) -> Self {
        Error::Network {
            message: message.into(),
        }
    }

    pub fn decode(message: impl Into<String>) -> Self {
        Error::Decode {
            message: message.into(),
        }
    }
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            Error::decode(err.to_string())
        } else if let Some(status) = err.status() {
            Error::Server {
                status: status.as_u16(),
                message: err.to_string(),
            }
        } else {
            Error::network(err.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_network_errors_are_retryable() {
        assert!(Error::network("connection refused").is_retryable());
        assert!(!Error::Auth {
            message: "expired".into()
        }
        .is_retryable());
        assert!(!Error::Server {
            status: 500,
            message: "boom".into()
        }
        .is_retryable());
        assert!(!Error::from(NormalizationError::MissingField("id")).is_retryable());
    }

    #[test]
    fn test_kind_classification() {
        let err: Error = ValidationError::new("category", "astrology", "not a known industry").into();
        assert_eq!(err.kind(), ErrorKind::Validation);
        assert_eq!(Error::decode("nope").kind(), ErrorKind::Decode);
        assert_eq!(
            err.to_string(),
            "invalid value 'astrology' for category: not a known industry"
        );
    }
}
