//! XML-RPC fault codes.
//!
//! Codes follow the XML-RPC fault code interoperability convention:
//! - -32700 to -32702: Parse errors
//! - -32600 to -32603: Server errors (invalid request, unknown method, bad params)
//! - -32500, -32400, -32300: Application, system and transport errors

// Parse errors
pub const PARSE_ERROR: i32 = -32700;
pub const UNSUPPORTED_ENCODING: i32 = -32701;
pub const INVALID_CHARACTER: i32 = -32702;

// Server errors
pub const INVALID_REQUEST: i32 = -32600;
pub const METHOD_NOT_FOUND: i32 = -32601;
pub const INVALID_PARAMS: i32 = -32602;
pub const INTERNAL_ERROR: i32 = -32603;

// Application, system and transport errors
pub const APPLICATION_ERROR: i32 = -32500;
pub const SYSTEM_ERROR: i32 = -32400;
pub const TRANSPORT_ERROR: i32 = -32300;

/// Error category for programmatic handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Method, command or file not found
    NotFound,
    /// Invalid input parameters
    InvalidInput,
    /// Service busy or rate limited
    Busy,
    /// Internal error in the service or in marshaling
    Internal,
    /// External dependency failure (network, filesystem)
    External,
    /// Operation timed out
    Timeout,
}

impl ErrorCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCategory::NotFound => "not_found",
            ErrorCategory::InvalidInput => "invalid_input",
            ErrorCategory::Busy => "busy",
            ErrorCategory::Internal => "internal",
            ErrorCategory::External => "external",
            ErrorCategory::Timeout => "timeout",
        }
    }
}

/// Returns the error category for a given fault code.
pub fn category_for_code(code: i32) -> ErrorCategory {
    match code {
        METHOD_NOT_FOUND => ErrorCategory::NotFound,
        INVALID_REQUEST | INVALID_PARAMS | UNSUPPORTED_ENCODING | INVALID_CHARACTER => {
            ErrorCategory::InvalidInput
        }
        SYSTEM_ERROR | TRANSPORT_ERROR => ErrorCategory::External,
        _ => ErrorCategory::Internal,
    }
}
