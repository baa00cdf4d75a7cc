//! Shell errors with codes, categories and sysexits-style exit codes.

use std::io;

use gridshell_core::CoreError;
use gridshell_rpc::error_codes::{self, ErrorCategory};
use gridshell_rpc::ClientError;
use gridshell_rpc::MarshalError;
use serde_json::{json, Value};
use thiserror::Error;

use crate::render::FAULT_HINT;

#[derive(Error, Debug)]
pub enum ShellError {
    #[error(transparent)]
    Command(#[from] CoreError),

    #[error(transparent)]
    Client(#[from] ClientError),

    /// Fault returned by the service instead of a result.
    #[error("Internal Error {code}: {message}")]
    RemoteFault { code: i64, message: String },

    #[error("Terminal error: {0}")]
    Terminal(#[from] io::Error),
}

impl From<MarshalError> for ShellError {
    fn from(err: MarshalError) -> Self {
        ShellError::Client(ClientError::Marshal(err))
    }
}

impl ShellError {
    pub fn code(&self) -> i32 {
        match self {
            ShellError::Command(e) => e.code(),
            ShellError::Client(e) => e.code(),
            ShellError::RemoteFault { code, .. } => {
                i32::try_from(*code).unwrap_or(error_codes::APPLICATION_ERROR)
            }
            ShellError::Terminal(_) => error_codes::SYSTEM_ERROR,
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            ShellError::Command(CoreError::MissingArgs { .. }) => ErrorCategory::InvalidInput,
            ShellError::Command(CoreError::UnknownCommand { .. }) => ErrorCategory::NotFound,
            ShellError::Client(e) => e.category(),
            ShellError::RemoteFault { .. } => ErrorCategory::External,
            ShellError::Terminal(_) => ErrorCategory::Internal,
        }
    }

    pub fn suggestion(&self) -> Option<&'static str> {
        match self {
            ShellError::Command(CoreError::MissingArgs { .. }) => {
                Some("Run 'help <command>' to see its required arguments")
            }
            ShellError::Command(CoreError::UnknownCommand { .. }) => {
                Some("Run 'list' to see the available commands")
            }
            ShellError::Client(e) => e.suggestion(),
            ShellError::RemoteFault { .. } => Some(FAULT_HINT),
            ShellError::Terminal(_) => Some("Run 'gridshell exec <LINE>' when no terminal is attached"),
        }
    }

    pub fn is_retryable(&self) -> bool {
        match self {
            ShellError::Client(e) => e.is_retryable(),
            _ => false,
        }
    }

    /// Converts to UNIX sysexits.h-compliant exit code.
    pub fn exit_code(&self) -> i32 {
        match self.category() {
            ErrorCategory::InvalidInput => 64, // EX_USAGE
            ErrorCategory::NotFound => 69,     // EX_UNAVAILABLE
            ErrorCategory::Busy => 73,         // EX_CANTCREAT
            ErrorCategory::External => 74,     // EX_IOERR
            ErrorCategory::Internal => 74,     // EX_IOERR
            ErrorCategory::Timeout => 75,      // EX_TEMPFAIL
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
