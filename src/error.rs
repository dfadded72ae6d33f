use thiserror::Error;
use actix_web::{ResponseError, HttpResponse, http::StatusCode};
use serde_json::json;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Chat error: {0}")]
    ChatError(#[from] ChatError),

    #[error("WebSocket error: {0}")]
    WebSocketError(#[from] WebSocketError),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Internal server error: {0}")]
    InternalError(String),
}

// Implement conversion from config::ConfigError
impl From<config::ConfigError> for AppError {
    fn from(err: config::ConfigError) -> Self {
        AppError::ConfigError(err.to_string())
    }
}

// Add conversion from std::io::Error
impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::InternalError(err.to_string())
    }
}

// Implement actix_web::ResponseError for AppError
impl ResponseError for AppError {
    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        let message = self.to_string();
        let response = json!({
            "error": {
                "status": status.as_u16(),
                "message": message
            }
        });
        HttpResponse::build(status).json(response)
    }

    fn status_code(&self) -> StatusCode {
        match self {
            AppError::ChatError(e) => match e {
                ChatError::InvalidInput(_) => StatusCode::BAD_REQUEST,
                ChatError::Unauthenticated => StatusCode::UNAUTHORIZED,
            },
            AppError::ConfigError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Errors produced by the chat core when an inbound event is rejected.
#[derive(Error, Debug)]
pub enum ChatError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Authentication failed. Please register before sending messages.")]
    Unauthenticated,
}

#[derive(Error, Debug)]
pub enum WebSocketError {
    #[error("Connection error: {0}")]
    ConnectionError(String),

    #[error("Message sending failed: {0}")]
    SendError(String),

    #[error("Invalid message format: {0}")]
    InvalidFormat(String),
}
