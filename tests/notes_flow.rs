//! Integration tests for the API client against a mock backend.
//!
//! Each test starts its own wiremock server and exercises the envelope
//! unwrapping, the sentinel guard, error mapping, and the save/load flow
//! end-to-end.

use std::time::Duration;

use pretty_assertions::assert_eq;
use serde_json::json;
use url::Url;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use anotes::api::{ApiClient, ApiError};
use anotes::session::MAIN_BODY;

fn client(server: &MockServer) -> ApiClient {
    ApiClient::new(
        Url::parse(&server.uri()).unwrap(),
        Duration::from_secs(5),
    )
    .unwrap()
}

fn topic_body(id: &str, title: &str, content: Option<&str>) -> serde_json::Value {
    json!({
        "id": id,
        "title": title,
        "content": content,
        "audioUrl": null,
        "category": { "name": "Work" },
    })
}

// ============================================================================
// List fetches
// ============================================================================

#[tokio::test]
async fn test_fetch_categories_unwraps_envelope() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/categories"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "statusCode": 200,
            "message": "ok",
            "data": [
                { "id": "c1", "name": "Work", "topics": [{ "id": "t1", "title": "Standup" }] },
                { "id": "c2", "name": "Home" },
            ],
        })))
        .mount(&server)
        .await;

    let categories = client(&server).fetch_categories().await.unwrap();
    assert_eq!(categories.len(), 2);
    assert_eq!(categories[0].name, "Work");
    assert_eq!(categories[0].topics.len(), 1);
    // topics defaults to empty when the backend omits it
    assert!(categories[1].topics.is_empty());
}

#[tokio::test]
async fn test_fetch_topics_error_uses_first_message() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/categories/missing/topics"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({
            "statusCode": 404,
            "message": ["Category not found", "second message"],
        })))
        .mount(&server)
        .await;

    let err = client(&server).fetch_topics("missing").await.unwrap_err();
    match err {
        ApiError::Status { code, message } => {
            assert_eq!(code, 404);
            assert_eq!(message, "Category not found");
        }
        other => panic!("expected status error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_non_json_error_body_falls_back_to_reason() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/categories"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .mount(&server)
        .await;

    let err = client(&server).fetch_categories().await.unwrap_err();
    assert_eq!(err.status_code(), 500);
    assert_eq!(err.message(), "Internal Server Error");
}

#[tokio::test]
async fn test_transport_error_maps_to_500() {
    // Nothing listening on this port
    let api = ApiClient::new(
        Url::parse("http://127.0.0.1:1").unwrap(),
        Duration::from_secs(1),
    )
    .unwrap();

    let err = api.fetch_categories().await.unwrap_err();
    assert!(matches!(err, ApiError::Transport(_)));
    assert_eq!(err.status_code(), 500);
    assert_eq!(err.message(), "No response from server");
}

// ============================================================================
// Notes: sentinel guard and save/load flow
// ============================================================================

#[tokio::test]
async fn test_sentinel_topic_skips_network() {
    let server = MockServer::start().await;
    // Any request at all is a failure
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let api = client(&server);
    assert!(api.fetch_topic_notes("c1", MAIN_BODY).await.unwrap().is_none());
    assert!(api.fetch_topic_notes("c1", "").await.unwrap().is_none());
}

#[tokio::test]
async fn test_save_then_load_round_trips_content() {
    let server = MockServer::start().await;

    Mock::given(method("PUT"))
        .and(path("/categories/c1/topics/t1/notes"))
        .and(body_json(json!({ "content": "hello" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "statusCode": 200,
            "message": "Notes updated",
        })))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/categories/c1/topics/t1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "statusCode": 200,
            "message": "ok",
            "data": {
                "behavior": null,
                "current": topic_body("t1", "Standup", Some("hello")),
                "next": topic_body("t2", "Retro", None),
            },
        })))
        .mount(&server)
        .await;

    let api = client(&server);

    let ack = api.update_topic_notes("c1", "t1", "hello").await.unwrap();
    assert_eq!(ack.code, 200);
    assert_eq!(ack.message, "Notes updated");

    let notes = api.fetch_topic_notes("c1", "t1").await.unwrap().unwrap();
    assert_eq!(notes.current.content.as_deref(), Some("hello"));
    assert!(notes.behavior.is_none());
    assert_eq!(notes.next.unwrap().title, "Retro");
}

#[tokio::test]
async fn test_notes_envelope_success_without_data_is_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/categories/c1/topics/t1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "statusCode": 200,
            "message": "ok",
        })))
        .mount(&server)
        .await;

    let err = client(&server).fetch_topic_notes("c1", "t1").await.unwrap_err();
    assert_eq!(err.status_code(), 200);
}

// ============================================================================
// Mutations
// ============================================================================

#[tokio::test]
async fn test_create_category_sends_name_and_returns_ack() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/categories"))
        .and(body_json(json!({ "name": "Ideas" })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "statusCode": 201,
            "message": "Category created",
        })))
        .mount(&server)
        .await;

    let ack = client(&server).create_category("Ideas").await.unwrap();
    assert_eq!(ack.code, 201);
    assert_eq!(ack.message, "Category created");
}

#[tokio::test]
async fn test_delete_topic_hits_expected_route() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/categories/c1/topics/t1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "statusCode": 200,
            "message": "Topic deleted",
        })))
        .expect(1)
        .mount(&server)
        .await;

    let ack = client(&server).delete_topic("c1", "t1").await.unwrap();
    assert_eq!(ack.message, "Topic deleted");
}

// ============================================================================
// Admin session
// ============================================================================

#[tokio::test]
async fn test_admin_login_posts_fixed_username() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/users/admin/login"))
        .and(body_json(json!({ "username": "admin", "password": "s3cret" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "statusCode": 200,
            "message": "Logged in",
        })))
        .mount(&server)
        .await;

    let ack = client(&server)
        .admin_login(&"s3cret".to_string().into())
        .await
        .unwrap();
    assert_eq!(ack.message, "Logged in");
}

#[tokio::test]
async fn test_admin_login_failure_carries_server_message() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/users/admin/login"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "statusCode": 401,
            "message": ["Invalid credentials"],
        })))
        .mount(&server)
        .await;

    let err = client(&server)
        .admin_login(&"wrong".to_string().into())
        .await
        .unwrap_err();
    assert_eq!(err.status_code(), 401);
    assert_eq!(err.message(), "Invalid credentials");
}

#[tokio::test]
async fn test_admin_logout_route() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/users/admin/logout"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "statusCode": 200,
            "message": "Logged out",
        })))
        .expect(1)
        .mount(&server)
        .await;

    let ack = client(&server).admin_logout().await.unwrap();
    assert_eq!(ack.message, "Logged out");
}
