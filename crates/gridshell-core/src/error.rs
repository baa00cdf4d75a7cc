use gridshell_rpc::error_codes;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CoreError {
    /// Only the number of unbound required fields is reported.
    #[error("Missing {count} arguments!")]
    MissingArgs { count: usize },

    #[error("Invalid Command!")]
    UnknownCommand { name: String },
}

impl CoreError {
    pub fn code(&self) -> i32 {
        match self {
            CoreError::MissingArgs { .. } => error_codes::INVALID_PARAMS,
            CoreError::UnknownCommand { .. } => error_codes::METHOD_NOT_FOUND,
        }
    }
}
