use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use chrono::{DateTime, Duration, Utc};
use serde_json::{json, Value};
use tower::ServiceExt;

use studyworks_server::store::MemoryStore;
use studyworks_server::token::TokenService;
use studyworks_server::{router, AppState};

const SECRET: &str = "test-secret";

fn app() -> Router {
    let tokens = TokenService::new(SECRET, Duration::minutes(30));
    router(AppState::new(Arc::new(MemoryStore::new()), tokens))
}

async fn send(app: &Router, req: Request<Body>) -> (StatusCode, Value) {
    let resp = app.clone().oneshot(req).await.unwrap();
    let status = resp.status();
    let bytes = hyper::body::to_bytes(resp.into_body()).await.unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, body)
}

fn json_request(method: Method, uri: &str, token: Option<&str>, body: Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

fn bare_request(method: Method, uri: &str, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    builder.body(Body::empty()).unwrap()
}

fn login_request(username: &str, password: &str) -> Request<Body> {
    Request::builder()
        .method(Method::POST)
        .uri("/api/token")
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(format!(
            "username={}&password={}",
            username, password
        )))
        .unwrap()
}

async fn register(app: &Router, username: &str, email: &str, password: &str) -> (StatusCode, Value) {
    let body = json!({
        "email": email,
        "username": username,
        "full_name": username.to_uppercase(),
        "password": password,
    });
    send(app, json_request(Method::POST, "/api/register", None, body)).await
}

async fn token_for(app: &Router, username: &str) -> String {
    let email = format!("{}@x.com", username);
    let (status, _) = register(app, username, &email, "pw123").await;
    assert_eq!(status, StatusCode::OK);
    let (status, body) = send(app, login_request(username, "pw123")).await;
    assert_eq!(status, StatusCode::OK);
    body["access_token"].as_str().unwrap().to_string()
}

async fn create_work(app: &Router, token: &str, title: &str) -> Value {
    let body = json!({ "title": title, "content": "first draft" });
    let (status, work) = send(app, json_request(Method::POST, "/api/works", Some(token), body)).await;
    assert_eq!(status, StatusCode::OK);
    work
}

fn instant(value: &Value) -> DateTime<Utc> {
    value.as_str().unwrap().parse().unwrap()
}

#[tokio::test]
async fn root_greets() {
    let app = app();
    let (status, body) = send(&app, bare_request(Method::GET, "/api/", None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "message": "Hello World" }));
}

#[tokio::test]
async fn status_checks_are_recorded_and_listed() {
    let app = app();
    let req = json_request(Method::POST, "/api/status", None, json!({ "client_name": "monitor" }));
    let (status, created) = send(&app, req).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(created["client_name"], "monitor");
    assert!(created["id"].is_string());
    assert!(created["timestamp"].is_string());

    let (status, listed) = send(&app, bare_request(Method::GET, "/api/status", None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(listed, json!([created]));
}

#[tokio::test]
async fn registration_rejects_duplicates() {
    let app = app();
    let (status, alice) = register(&app, "alice", "a@x.com", "pw123").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(alice["username"], "alice");
    assert_eq!(alice["email"], "a@x.com");
    assert!(alice.get("hashed_password").is_none());
    assert!(alice.get("password").is_none());

    let (status, body) = register(&app, "alice", "other@x.com", "pw123").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Username or email already registered");

    let (status, _) = register(&app, "alicia", "a@x.com", "pw123").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn registration_validates_body() {
    let app = app();
    let (status, body) = register(&app, "alice", "not-an-email", "pw123").await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error"], "ValidationError");

    let req = json_request(Method::POST, "/api/register", None, json!({ "username": "alice" }));
    let (status, _) = send(&app, req).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn login_failures_share_one_message() {
    let app = app();
    register(&app, "alice", "a@x.com", "pw123").await;

    let wrong_password = app.clone().oneshot(login_request("alice", "nope")).await.unwrap();
    assert_eq!(wrong_password.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(wrong_password.headers()[header::WWW_AUTHENTICATE], "Bearer");

    let (status, bad_pw) = send(&app, login_request("alice", "nope")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(bad_pw["message"], "Incorrect username or password");

    let (status, no_user) = send(&app, login_request("mallory", "pw123")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(no_user, bad_pw);
}

#[tokio::test]
async fn login_issues_bearer_token() {
    let app = app();
    register(&app, "alice", "a@x.com", "pw123").await;

    let (status, body) = send(&app, login_request("alice", "pw123")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["token_type"], "bearer");
    let token = body["access_token"].as_str().unwrap();
    assert!(!token.is_empty());

    let tokens = TokenService::new(SECRET, Duration::minutes(30));
    assert_eq!(tokens.validate(token).unwrap(), "alice");
}

#[tokio::test]
async fn works_require_valid_bearer() {
    let app = app();
    let (status, body) = send(&app, bare_request(Method::GET, "/api/works", None)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Could not validate credentials");

    let (status, _) = send(&app, bare_request(Method::GET, "/api/works", Some("garbage"))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let ghost = TokenService::new(SECRET, Duration::minutes(30))
        .issue("ghost")
        .unwrap();
    let (status, _) = send(&app, bare_request(Method::GET, "/api/works", Some(&ghost))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let token = token_for(&app, "alice").await;
    let expired = TokenService::new(SECRET, Duration::minutes(30))
        .issue_at("alice", Utc::now() - Duration::minutes(31))
        .unwrap();
    let (status, _) = send(&app, bare_request(Method::GET, "/api/works", Some(&expired))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    let (status, _) = send(&app, bare_request(Method::GET, "/api/works", Some(&token))).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn work_lifecycle() {
    let app = app();
    let token = token_for(&app, "alice").await;

    let work = create_work(&app, &token, "Essay").await;
    assert_eq!(work["title"], "Essay");
    assert_eq!(work["created_at"], work["updated_at"]);
    let uri = format!("/api/works/{}", work["id"].as_str().unwrap());

    let (status, listed) = send(&app, bare_request(Method::GET, "/api/works", Some(&token))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(listed, json!([work.clone()]));

    let (status, fetched) = send(&app, bare_request(Method::GET, &uri, Some(&token))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched, work);

    let patch = json!({ "title": "Essay v2", "content": "second draft" });
    let (status, updated) = send(&app, json_request(Method::PUT, &uri, Some(&token), patch)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["title"], "Essay v2");
    assert_eq!(updated["content"], "second draft");
    assert_eq!(updated["created_at"], work["created_at"]);
    assert!(instant(&updated["updated_at"]) > instant(&work["updated_at"]));

    let (status, body) = send(&app, bare_request(Method::DELETE, &uri, Some(&token))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "message": "Work deleted successfully" }));

    let (status, _) = send(&app, bare_request(Method::GET, &uri, Some(&token))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _) = send(&app, bare_request(Method::DELETE, &uri, Some(&token))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn foreign_works_look_nonexistent() {
    let app = app();
    let alice = token_for(&app, "alice").await;
    let bob = token_for(&app, "bob").await;

    let work = create_work(&app, &alice, "Private").await;
    let uri = format!("/api/works/{}", work["id"].as_str().unwrap());
    let missing = format!("/api/works/{}", uuid::Uuid::new_v4());

    let (status, nonexistent) = send(&app, bare_request(Method::GET, &missing, Some(&bob))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = send(&app, bare_request(Method::GET, &uri, Some(&bob))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, nonexistent);

    let patch = json!({ "title": "Stolen", "content": "" });
    let (status, body) = send(&app, json_request(Method::PUT, &uri, Some(&bob), patch)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, nonexistent);

    let (status, body) = send(&app, bare_request(Method::DELETE, &uri, Some(&bob))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, nonexistent);

    let (status, listed) = send(&app, bare_request(Method::GET, "/api/works", Some(&bob))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(listed, json!([]));

    let (status, fetched) = send(&app, bare_request(Method::GET, &uri, Some(&alice))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched["title"], "Private");
}

#[tokio::test]
async fn malformed_work_id_is_not_found() {
    let app = app();
    let token = token_for(&app, "alice").await;
    let (status, body) = send(&app, bare_request(Method::GET, "/api/works/not-a-uuid", Some(&token))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Work not found");
}

#[tokio::test]
async fn unknown_path_falls_back_to_404() {
    let app = app();
    let (status, body) = send(&app, bare_request(Method::GET, "/api/nowhere", None)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "NotFound");
}

#[tokio::test]
async fn cors_allows_any_origin_with_credentials() {
    let app = app();
    let req = Request::builder()
        .method(Method::OPTIONS)
        .uri("/api/works")
        .header(header::ORIGIN, "https://school.example")
        .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
        .header(header::ACCESS_CONTROL_REQUEST_HEADERS, "authorization")
        .body(Body::empty())
        .unwrap();
    let resp = app.oneshot(req).await.unwrap();
    let headers = resp.headers();
    assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_ORIGIN], "https://school.example");
    assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_CREDENTIALS], "true");
}
