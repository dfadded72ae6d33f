use actix_web::{web, App, HttpServer};
use actix_cors::Cors;
use chatroom_server::{server_status, AppError, AppState, ChatServer, Settings};
use dotenv::dotenv;
use std::sync::Arc;
use tracing::{error, info, Level};
use tracing_subscriber::FmtSubscriber;

#[actix_web::main]
async fn main() -> chatroom_server::Result<()> {
    // Load environment variables
    dotenv().ok();

    // Initialize logging
    FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .with_target(false)
        .with_thread_ids(true)
        .with_file(true)
        .with_line_number(true)
        .pretty()
        .init();

    // Load configuration
    let config = Settings::new()?;
    info!("Configuration loaded successfully");

    // Initialize application state
    let state = AppState::new(config.clone());
    let state = web::Data::new(state);

    // Start the WebSocket server on its own listener
    let ws_listener = tokio::net::TcpListener::bind(format!(
        "{}:{}",
        config.websocket.host, config.websocket.port
    ))
    .await?;
    let chat_server = Arc::new(ChatServer::new(state.router.clone()));

    info!(
        "WebSocket server ready to accept connections at ws://{}:{}",
        config.websocket.host, config.websocket.port
    );

    tokio::spawn(async move {
        chat_server.run(ws_listener).await;
        error!("WebSocket accept loop terminated");
    });

    // Create and bind TCP listener for the HTTP status surface
    let listener = std::net::TcpListener::bind(format!(
        "{}:{}",
        config.server.host, config.server.port
    ))?;

    info!("Starting HTTP server at {}:{}", config.server.host, config.server.port);

    // Start HTTP server
    HttpServer::new(move || {
        let cors = if config.cors.enabled {
            let cors_config = Cors::default();

            // Apply specific CORS rules based on configuration
            let cors_config = if config.cors.allow_any_origin {
                cors_config
                    .allow_any_origin()
                    .allow_any_method()
                    .allow_any_header()
            } else {
                // More restrictive CORS for production use
                cors_config
                    .allowed_origin("http://localhost:8080")
                    .allowed_origin("http://127.0.0.1:8080")
                    .allowed_methods(vec!["GET"])
                    .allowed_headers(vec!["Content-Type"])
            };

            // Set max age
            cors_config.max_age(config.cors.max_age as usize)
        } else {
            // CORS disabled - use most restrictive settings
            Cors::default()
        };

        App::new()
            .wrap(cors)
            .app_data(state.clone())
            .route("/", web::get().to(server_status))
    })
    .listen(listener)?
    .workers(config.server.workers as usize)
    .run()
    .await
    .map_err(|e| AppError::InternalError(e.to_string()))?;

    Ok(())
}
