//! HTTP API tests against a mocked CMS.

use std::sync::Arc;

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
};
use blogport::server::{ServerState, create_router};
use blogport_core::Config;
use serde_json::{Value, json};
use tower::ServiceExt;
use wiremock::matchers::{method, path, path_regex};
use wiremock::{Mock, MockServer, ResponseTemplate};

const ENV_PATH: &str = "/spaces/space1/environments/master";

fn router_for(server: &MockServer) -> Router {
    let mut config = Config::default();
    config.cms.space_id = Some("space1".to_string());
    config.cms.management_token = Some("test_token".to_string());
    config.cms.api_url = server.uri();
    create_router(Arc::new(ServerState::new(&config)))
}

async fn body_bytes(response: axum::response::Response) -> Vec<u8> {
    axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap()
        .to_vec()
}

async fn mount_environment(server: &MockServer, status: u16, body: Value) {
    Mock::given(method("GET"))
        .and(path(ENV_PATH))
        .respond_with(ResponseTemplate::new(status).set_body_json(body))
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_import_returns_report() {
    let server = MockServer::start().await;
    mount_environment(&server, 200, json!({ "sys": { "id": "master" } })).await;

    Mock::given(method("GET"))
        .and(path(format!("{ENV_PATH}/entries")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "items": [ { "sys": { "id": "e0" }, "fields": { "title": { "en-US": "Old" } } } ]
        })))
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path(format!("{ENV_PATH}/entries")))
        .respond_with(
            ResponseTemplate::new(201)
                .set_body_json(json!({ "sys": { "id": "entry1", "version": 1 } })),
        )
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("PUT"))
        .and(path_regex(r"/entries/entry1/published$"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "sys": { "id": "entry1", "version": 2 } })),
        )
        .mount(&server)
        .await;

    let body = json!({ "posts": [
        { "title": "Old", "slug": "old" },
        { "title": "New", "slug": "new", "price": 12 }
    ]});
    let request = Request::builder()
        .method("POST")
        .uri("/import")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();

    let response = router_for(&server).oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let report: Value = serde_json::from_slice(&body_bytes(response).await).unwrap();
    assert_eq!(report["success"], true);
    assert_eq!(report["created"], 2);
    assert_eq!(report["skipped"], 1);
    assert_eq!(report["failed"], 0);
    assert_eq!(report["results"][0]["status"], "skipped (already exists)");
    assert_eq!(report["results"][1]["status"], "created");
}

#[tokio::test]
async fn test_import_with_rejected_token_is_unauthorized() {
    let server = MockServer::start().await;
    mount_environment(
        &server,
        403,
        json!({
            "sys": { "type": "Error", "id": "AccessDenied" },
            "message": "Forbidden"
        }),
    )
    .await;

    let request = Request::builder()
        .method("POST")
        .uri("/import")
        .body(Body::from(r#"{"posts":[{"title":"A"}]}"#))
        .unwrap();

    let response = router_for(&server).oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let body: Value = serde_json::from_slice(&body_bytes(response).await).unwrap();
    assert_eq!(body["error"], "Invalid or insufficient permissions");
    assert_eq!(body["details"], "Forbidden");

    let instructions = body["instructions"].as_array().unwrap();
    assert!(instructions.contains(&json!("Space ID: space1")));
    assert_eq!(instructions.last().unwrap(), "Error: AccessDenied");
}

#[tokio::test]
async fn test_export_csv_download() {
    let server = MockServer::start().await;
    mount_environment(&server, 200, json!({ "sys": { "id": "master" } })).await;

    Mock::given(method("GET"))
        .and(path(format!("{ENV_PATH}/entries")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "items": [ {
                "sys": { "id": "e1" },
                "fields": {
                    "title": { "en-US": "Hello, \"world\"" },
                    "slug": { "en-US": "hello" },
                    "price": { "en-US": 2.5 }
                }
            } ]
        })))
        .mount(&server)
        .await;

    let request = Request::builder()
        .uri("/export.csv")
        .body(Body::empty())
        .unwrap();
    let response = router_for(&server).oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()[header::CONTENT_TYPE],
        "text/csv; charset=utf-8"
    );
    let disposition = response.headers()[header::CONTENT_DISPOSITION]
        .to_str()
        .unwrap()
        .to_string();
    assert!(disposition.starts_with("attachment; filename=\"blog-posts-"));
    assert!(disposition.ends_with(".csv\""));

    let text = String::from_utf8(body_bytes(response).await).unwrap();
    let mut lines = text.lines();
    assert!(lines.next().unwrap().starts_with("Title,Slug,"));
    assert!(lines.next().unwrap().starts_with(r#""Hello, ""world""","hello","#));
}
