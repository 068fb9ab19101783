//! JSON response bodies.

use serde::Serialize;

pub mod questions;
pub mod users;

/// Body of every response that carries only a message.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Body of 500 responses. Never carries the underlying error.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ErrorResponse {
    pub status: bool,
    pub message: String,
}

impl ErrorResponse {
    pub fn internal() -> Self {
        Self {
            status: false,
            message: "Internal server error".to_string(),
        }
    }
}
