//! Error types for the outer surface of the capture pipeline.
//!
//! Capture itself never fails: missing data degrades to empty strings or
//! unresolved selectors. Errors only arise when decoding what the host
//! adapter sends (event lines, option documents).

use serde::{Deserialize, Serialize};
use std::fmt;

/// Error codes for stream and option decoding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    InvalidEvent,
    InvalidOptions,
    InputTooLarge,
    InternalError,
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorCode::InvalidEvent => write!(f, "INVALID_EVENT"),
            ErrorCode::InvalidOptions => write!(f, "INVALID_OPTIONS"),
            ErrorCode::InputTooLarge => write!(f, "INPUT_TOO_LARGE"),
            ErrorCode::InternalError => write!(f, "INTERNAL_ERROR"),
        }
    }
}

/// An error with a hint on how to fix the input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiError {
    pub code: ErrorCode,
    pub message: String,
    pub suggestion: Option<String>,
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)?;
        if let Some(suggestion) = &self.suggestion {
            write!(f, " (hint: {})", suggestion)?;
        }
        Ok(())
    }
}

impl std::error::Error for ApiError {}

impl ApiError {
    /// An event line that could not be decoded.
    pub fn invalid_event(line_no: usize, error: &str) -> Self {
        Self {
            code: ErrorCode::InvalidEvent,
            message: format!("Line {}: invalid interaction event: {}", line_no, error),
            suggestion: Some(
                "Each line must be a JSON object with an \"event\" tag, e.g. {\"event\":\"click\",\"target\":{\"name\":\"button\"}}"
                    .into(),
            ),
        }
    }

    pub fn invalid_options(error: &str) -> Self {
        Self {
            code: ErrorCode::InvalidOptions,
            message: format!("Invalid capture options: {}", error),
            suggestion: Some(
                "Options use camelCase keys such as captureHover, ignoreNodes, waitTimeout".into(),
            ),
        }
    }

    /// An input line exceeded the reader's size limit.
    pub fn input_too_large(limit: usize) -> Self {
        Self {
            code: ErrorCode::InputTooLarge,
            message: format!("Input line exceeded {} byte limit", limit),
            suggestion: Some("Split the stream into one event per line".into()),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self {
            code: ErrorCode::InternalError,
            message: message.into(),
            suggestion: Some("This is an internal error. Please report it if it persists.".into()),
        }
    }
}
