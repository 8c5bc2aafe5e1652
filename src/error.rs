use serde::Serialize;
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SignageError {
    #[error("Malformed message: {0}")]
    MalformedMessage(String),

    #[error("Unknown room: {0}")]
    UnknownRoom(String),

    #[error("Registry store failure: {0}")]
    RegistryStore(String),

    #[error("Registry store timed out after {0:?}")]
    StoreTimeout(Duration),

    #[error("Timer for room {0} is no longer running")]
    TimerStopped(String),

    #[error("Message bus error: {0}")]
    Bus(String),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    JsonError(#[from] serde_json::Error),
}

#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
}

impl SignageError {
    pub fn to_error_code(&self) -> &'static str {
        match self {
            SignageError::MalformedMessage(_) => "MALFORMED_MESSAGE",
            SignageError::UnknownRoom(_) => "UNKNOWN_ROOM",
            SignageError::RegistryStore(_) | SignageError::StoreTimeout(_) => {
                "REGISTRY_STORE_FAILURE"
            },
            SignageError::TimerStopped(_) => "TIMER_STOPPED",
            SignageError::Bus(_) => "BUS_ERROR",
            SignageError::Config(_) => "INVALID_CONFIG",
            _ => "INTERNAL_ERROR",
        }
    }

    pub fn to_error_response(&self) -> ErrorResponse {
        ErrorResponse {
            error: self.to_string(),
            code: self.to_error_code().to_string(),
        }
    }

    /// Store failures are recoverable: discovery falls back to the default room
    pub fn is_store_failure(&self) -> bool {
        matches!(
            self,
            SignageError::RegistryStore(_) | SignageError::StoreTimeout(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, SignageError>;
