//! Wire-level tests for the store client against a scripted HTTP server.

use serde::Deserialize;
use serde_json::json;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use ayf_store::{Filter, Order, StoreClient, StoreError};

#[derive(Debug, Deserialize, PartialEq)]
struct Row {
    id: i64,
    title: String,
}

async fn client_for(server: &MockServer) -> StoreClient {
    StoreClient::from_parts(&server.uri(), "anon-key", None)
}

#[tokio::test]
async fn select_renders_filters_order_and_limit() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/events"))
        .and(query_param("select", "*"))
        .and(query_param("date", "gte.2025-01-01"))
        .and(query_param("order", "date.asc"))
        .and(query_param("limit", "2"))
        .and(header("apikey", "anon-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "id": 1, "title": "Bible Study" },
            { "id": 2, "title": "Retreat" }
        ])))
        .mount(&server)
        .await;

    let client = client_for(&server).await;
    let rows: Vec<Row> = client
        .table("events")
        .select()
        .filter(Filter::gte("date", "2025-01-01"))
        .order("date", Order::Ascending)
        .limit(2)
        .fetch()
        .await
        .unwrap();

    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].title, "Bible Study");
}

#[tokio::test]
async fn fetch_one_maps_missing_row_to_not_found() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/events"))
        .respond_with(ResponseTemplate::new(406).set_body_json(json!({
            "message": "JSON object requested, multiple (or no) rows returned"
        })))
        .mount(&server)
        .await;

    let client = client_for(&server).await;
    let result = client
        .table("events")
        .select()
        .filter(Filter::eq("id", 999))
        .fetch_one::<Row>()
        .await;

    assert!(matches!(result, Err(StoreError::NotFound)));
}

#[tokio::test]
async fn insert_returns_first_representation_row() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/rest/v1/events"))
        .and(header("Prefer", "return=representation"))
        .respond_with(
            ResponseTemplate::new(201)
                .set_body_json(json!([{ "id": 7, "title": "New Event" }])),
        )
        .mount(&server)
        .await;

    let client = client_for(&server).await;
    let row: Row = client
        .table("events")
        .insert(&json!({ "title": "New Event" }))
        .await
        .unwrap();

    assert_eq!(row, Row { id: 7, title: "New Event".to_string() });
}

#[tokio::test]
async fn count_parses_content_range_total() {
    let server = MockServer::start().await;

    Mock::given(method("HEAD"))
        .and(path("/rest/v1/event_rsvps"))
        .and(query_param("event_id", "eq.3"))
        .respond_with(ResponseTemplate::new(200).insert_header("content-range", "*/42"))
        .mount(&server)
        .await;

    let client = client_for(&server).await;
    let count = client
        .table("event_rsvps")
        .count(vec![Filter::eq("event_id", 3)])
        .await
        .unwrap();

    assert_eq!(count, 42);
}

#[tokio::test]
async fn api_errors_carry_status_and_message() {
    let server = MockServer::start().await;

    Mock::given(method("DELETE"))
        .and(path("/rest/v1/events"))
        .respond_with(ResponseTemplate::new(403).set_body_json(json!({
            "message": "permission denied for table events"
        })))
        .mount(&server)
        .await;

    let client = client_for(&server).await;
    let result = client.table("events").delete(vec![Filter::eq("id", 1)]).await;

    match result {
        Err(StoreError::Api { status, message }) => {
            assert_eq!(status, 403);
            assert_eq!(message, "permission denied for table events");
        }
        other => panic!("expected api error, got {other:?}"),
    }
}

#[tokio::test]
async fn bearer_token_is_sent_once_installed() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/events"))
        .and(header("Authorization", "Bearer user-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;

    let client = client_for(&server).await;
    client.set_bearer(Some("user-token".to_string()));

    let rows: Vec<Row> = client.table("events").select().fetch().await.unwrap();
    assert!(rows.is_empty());
}

#[tokio::test]
async fn admin_calls_require_service_role_key() {
    let server = MockServer::start().await;
    let client = client_for(&server).await;

    let result = client.auth().admin_list_users().await;
    assert!(matches!(result, Err(StoreError::MissingServiceKey)));
}

#[tokio::test]
async fn sign_in_yields_session_with_user() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/auth/v1/token"))
        .and(query_param("grant_type", "password"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "access-123",
            "refresh_token": "refresh-456",
            "expires_in": 3600,
            "user": {
                "id": "6a6f9f9e-9b4e-4a7e-9d3a-0f3c2b1a0e9d",
                "email": "leader@gwarinpaayf.org",
                "user_metadata": { "role": "admin" }
            }
        })))
        .mount(&server)
        .await;

    let client = client_for(&server).await;
    let session = client
        .auth()
        .sign_in_with_password("leader@gwarinpaayf.org", "hunter2")
        .await
        .unwrap();

    assert_eq!(session.access_token, "access-123");
    assert_eq!(session.user.email.as_deref(), Some("leader@gwarinpaayf.org"));
    assert_eq!(session.user.role(), Some("admin"));
}

#[tokio::test]
async fn sign_up_without_session_reports_pending_confirmation() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/auth/v1/signup"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "35f1e6cf-4c52-41b1-8bdf-3a1f4e2d5c6b",
            "email": "newmember@example.com",
            "user_metadata": {}
        })))
        .mount(&server)
        .await;

    let client = client_for(&server).await;
    let result = client
        .auth()
        .sign_up("newmember@example.com", "hunter2", &Default::default())
        .await
        .unwrap();

    assert!(result.session.is_none());
    assert_eq!(result.user.email.as_deref(), Some("newmember@example.com"));
}

#[tokio::test]
async fn storage_public_url_has_bucket_and_path() {
    let server = MockServer::start().await;
    let client = client_for(&server).await;

    let url = client.bucket("images").public_url("gallery/abc.jpg");
    assert_eq!(
        url,
        format!("{}/storage/v1/object/public/images/gallery/abc.jpg", server.uri())
    );
}
