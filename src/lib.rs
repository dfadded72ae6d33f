pub mod chat;
pub mod config;
pub mod error;
pub mod websocket;

use std::sync::Arc;
use actix_web::HttpResponse;

pub use error::AppError;
pub type Result<T> = std::result::Result<T, AppError>;
pub use config::Settings;

pub use chat::{ClientEvent, EventRouter, Message, ServerEvent, Session};
pub use websocket::ChatServer;

/// Informational status endpoint handler
/// Returns a JSON response with a message, status token and timestamp
pub async fn server_status() -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({
        "message": "Chat server is running",
        "status": "ok",
        "timestamp": chrono::Utc::now().to_rfc3339()
    }))
}

/// Application state shared across all components
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Settings>,
    pub router: Arc<EventRouter>,
}

impl AppState {
    pub fn new(config: Settings) -> Self {
        Self {
            config: Arc::new(config),
            router: Arc::new(EventRouter::new()),
        }
    }
}
