use bucket_tree::services::{
    membership::MembershipError, move_set::MoveSetError, rename_plan::PlanError,
};
use serde_json::json;
use std::{fmt, process::ExitCode};

/// A lightweight wrapper for command failures that keeps the message local.
#[derive(Debug)]
pub struct AppError {
    pub code: u8,
    pub message: String,
}

impl AppError {
    /// Create a new AppError with a specific exit code and message.
    pub fn new(code: u8, msg: impl Into<String>) -> Self {
        Self {
            code,
            message: msg.into(),
        }
    }

    /// Shortcut for an unexpected failure (exit code 1).
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::new(1, msg)
    }

    /// Shortcut for input the command cannot act on (exit code 2).
    pub fn bad_input(msg: impl Into<String>) -> Self {
        Self::new(2, msg)
    }

    /// Print the error as JSON on stderr and turn it into the process exit code.
    pub fn report(self) -> ExitCode {
        let body = json!({
            "error": self.message,
            "code": self.code,
        });
        eprintln!("{}", body);
        ExitCode::from(self.code)
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for AppError {}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::internal(format!("{:#}", err))
    }
}

impl From<MoveSetError> for AppError {
    fn from(err: MoveSetError) -> Self {
        match err {
            MoveSetError::EmptyPath => AppError::bad_input(err.to_string()),
            MoveSetError::Allocation(_) => AppError::internal(err.to_string()),
        }
    }
}

impl From<PlanError> for AppError {
    fn from(err: PlanError) -> Self {
        match err {
            PlanError::MoveSet(inner) => inner.into(),
            other => AppError::bad_input(other.to_string()),
        }
    }
}

impl From<MembershipError> for AppError {
    fn from(err: MembershipError) -> Self {
        AppError::internal(format!("{} ({})", err, err.to_error_code()))
    }
}
