use serde_json::Value;
use serde_json::json;
use thiserror::Error;

use crate::error_codes::{self, ErrorCategory};

/// Failures while converting between values, element trees and XML text.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MarshalError {
    #[error("Malformed XML: {0}")]
    Parse(String),

    #[error("Unsupported value for XML-RPC: {0}")]
    UnsupportedType(String),

    #[error("Unknown XML-RPC element <{0}>")]
    UnknownElement(String),

    #[error("Invalid <{tag}> content: {text:?}")]
    InvalidScalar { tag: String, text: String },

    #[error("Response contains no <value> element")]
    MissingValue,
}

impl MarshalError {
    pub fn code(&self) -> i32 {
        match self {
            MarshalError::Parse(_) => error_codes::PARSE_ERROR,
            MarshalError::UnsupportedType(_) => error_codes::INVALID_PARAMS,
            MarshalError::UnknownElement(_)
            | MarshalError::InvalidScalar { .. }
            | MarshalError::MissingValue => error_codes::INVALID_REQUEST,
        }
    }
}

#[derive(Error, Debug)]
pub enum ClientError {
    #[error("HTTP request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Service returned HTTP {status}")]
    HttpStatus { status: u16 },

    #[error("{0}")]
    Marshal(#[from] MarshalError),

    #[error("Failed to read upload file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Not connected to a service")]
    NotConnected,
}

impl ClientError {
    /// Returns the XML-RPC fault code that best describes this error.
    pub fn code(&self) -> i32 {
        match self {
            ClientError::Transport(_) | ClientError::HttpStatus { .. } => {
                error_codes::TRANSPORT_ERROR
            }
            ClientError::Marshal(e) => e.code(),
            ClientError::Io(_) | ClientError::NotConnected => error_codes::SYSTEM_ERROR,
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            ClientError::Transport(e) if e.is_timeout() => ErrorCategory::Timeout,
            ClientError::HttpStatus { status } if *status == 429 || *status == 503 => {
                ErrorCategory::Busy
            }
            ClientError::HttpStatus { status } if *status == 404 => ErrorCategory::NotFound,
            ClientError::Io(e) if e.kind() == std::io::ErrorKind::NotFound => {
                ErrorCategory::NotFound
            }
            _ => error_codes::category_for_code(self.code()),
        }
    }

    pub fn is_retryable(&self) -> bool {
        match self {
            ClientError::Transport(e) => e.is_timeout() || e.is_connect(),
            ClientError::HttpStatus { status } => *status == 429 || *status >= 502,
            _ => false,
        }
    }

    pub fn suggestion(&self) -> Option<&'static str> {
        match self {
            ClientError::Transport(_) => {
                Some("Check the service URL (--url or GRIDSHELL_URL) and network access")
            }
            ClientError::HttpStatus { status } if *status == 401 || *status == 403 => {
                Some("The service rejected the request; check your certificate or login")
            }
            ClientError::Marshal(MarshalError::Parse(_)) => {
                Some("The service did not answer with XML; the URL may point at a web page")
            }
            ClientError::NotConnected => Some("Restart without --offline to reach the service"),
            _ => None,
        }
    }

    pub fn to_json(&self) -> Value {
        let mut obj = json!({
            "code": self.code(),
            "message": self.to_string(),
            "category": self.category().as_str(),
            "retryable": self.is_retryable(),
        });
        if let Some(suggestion) = self.suggestion() {
            obj["suggestion"] = json!(suggestion);
        }
        obj
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_marshal_error_codes() {
        assert_eq!(
            MarshalError::Parse("x".into()).code(),
            error_codes::PARSE_ERROR
        );
        assert_eq!(
            MarshalError::UnsupportedType("NaN".into()).code(),
            error_codes::INVALID_PARAMS
        );
        assert_eq!(MarshalError::MissingValue.code(), error_codes::INVALID_REQUEST);
    }

    #[test]
    fn test_http_status_category() {
        let busy = ClientError::HttpStatus { status: 503 };
        assert_eq!(busy.category(), ErrorCategory::Busy);
        assert!(busy.is_retryable());

        let missing = ClientError::HttpStatus { status: 404 };
        assert_eq!(missing.category(), ErrorCategory::NotFound);
        assert!(!missing.is_retryable());
    }

    #[test]
    fn test_marshal_error_wraps_into_client_error() {
        let err: ClientError = MarshalError::Parse("unexpected eof".into()).into();
        assert_eq!(err.code(), error_codes::PARSE_ERROR);
        assert_eq!(err.category(), ErrorCategory::Internal);
        assert!(err.suggestion().is_some());
    }

    #[test]
    fn test_client_error_to_json() {
        let json = ClientError::NotConnected.to_json();
        assert_eq!(json["code"], error_codes::SYSTEM_ERROR);
        assert_eq!(json["category"], "external");
        assert_eq!(json["retryable"], false);
        assert!(json["suggestion"].as_str().unwrap().contains("--offline"));
    }
}
