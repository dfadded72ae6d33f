use actix_web::{test, web, App};
use chatroom_server::{server_status, AppState, Settings};
use chrono::DateTime;

#[actix_web::test]
async fn test_server_status() {
    // Create test app state
    let config = Settings::new().expect("Failed to load config");
    let state = web::Data::new(AppState::new(config));

    // Create test app
    let app = test::init_service(
        App::new()
            .app_data(state.clone())
            .route("/", web::get().to(server_status)),
    )
    .await;

    // Send request
    let req = test::TestRequest::get().uri("/").to_request();
    let resp = test::call_service(&app, req).await;

    // Assert response
    assert!(resp.status().is_success());

    // Parse response body
    let body = test::read_body(resp).await;
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();

    // Verify response format
    assert_eq!(json["message"], "Chat server is running");
    assert_eq!(json["status"], "ok");
    assert!(DateTime::parse_from_rfc3339(
        json["timestamp"].as_str().unwrap()
    )
    .is_ok());
}
