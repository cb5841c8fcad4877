//! End-to-end pipeline tests: every request goes through `App::handle`, the
//! same entry point the server loop uses, so session restore, the gate, the
//! router, and the renderer are all exercised together.

use std::fs;
use std::sync::Arc;

use bytes::Bytes;
use http::header::{CONTENT_TYPE, LOCATION, SET_COOKIE};
use http::{HeaderMap, Method, StatusCode};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use taskboard::{
    App, Assets, AssetsController, MemorySessionStore, MemoryTaskStore, MemoryUserStore,
    Sessions, TaskController, UserController,
};

struct TestApp {
    // Keeps the asset directory alive for the test's duration.
    _assets_dir: tempfile::TempDir,
    app: App,
}

fn test_app() -> TestApp {
    let dir = tempfile::tempdir().expect("tempdir");
    for sub in ["html", "css", "js"] {
        fs::create_dir_all(dir.path().join(sub)).expect("mkdir");
    }
    fs::write(dir.path().join("html/signin.html"), "<h1>Sign in</h1>").expect("write");
    fs::write(dir.path().join("html/signup.html"), "<h1>Sign up</h1>").expect("write");
    fs::write(dir.path().join("css/styles.css"), "body {}").expect("write");
    fs::write(dir.path().join("js/app.js"), "'use strict';").expect("write");

    let sessions = Sessions::new(Arc::new(MemorySessionStore::new()));
    let assets = Arc::new(Assets::new(dir.path()));
    let app = App::new(
        Arc::new(UserController::new(
            Arc::new(MemoryUserStore::new()),
            sessions.clone(),
            Arc::clone(&assets),
        )),
        Arc::new(TaskController::new(Arc::new(MemoryTaskStore::new()))),
        Arc::new(AssetsController::new(assets)),
        sessions,
    );
    TestApp { _assets_dir: dir, app }
}

async fn send(
    app: &App,
    method: Method,
    path: &str,
    cookie: Option<&str>,
    body: Bytes,
) -> (StatusCode, HeaderMap, Bytes) {
    let response = app.handle(&method, path, cookie, body).await;
    let (parts, body) = response.into_parts();
    let bytes = body.collect().await.expect("Full body is infallible").to_bytes();
    (parts.status, parts.headers, bytes)
}

/// Signs a fresh user up and returns the session cookie pair (`sid=…`).
async fn signed_up(app: &App, username: &str) -> String {
    let body = json!({
        "firstName": "Ada",
        "lastName": "Lovelace",
        "username": username,
        "password": "s3cret",
    });
    let (status, headers, _) = send(
        app,
        Method::POST,
        "/users/signup",
        None,
        Bytes::from(body.to_string()),
    )
    .await;
    assert_eq!(status, StatusCode::FOUND);
    let set_cookie = headers[SET_COOKIE].to_str().expect("cookie is ascii");
    set_cookie
        .split(';')
        .next()
        .expect("cookie has a name=value part")
        .to_owned()
}

fn envelope(body: &Bytes) -> Value {
    serde_json::from_slice(body).expect("body is JSON")
}

#[tokio::test]
async fn anonymous_get_is_redirected_to_signin() {
    let t = test_app();
    let (status, headers, _) = send(&t.app, Method::GET, "/", None, Bytes::new()).await;
    assert_eq!(status, StatusCode::FOUND);
    assert_eq!(headers[LOCATION], "/users/signin");
}

#[tokio::test]
async fn anonymous_post_to_tasks_is_forbidden_with_no_body() {
    let t = test_app();
    let (status, _, body) = send(
        &t.app,
        Method::POST,
        "/tasks",
        None,
        Bytes::from(r#"{"title":"x"}"#),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert!(body.is_empty());
}

#[tokio::test]
async fn anonymous_client_gets_pages_and_assets() {
    let t = test_app();

    let (status, headers, body) =
        send(&t.app, Method::GET, "/users/signin", None, Bytes::new()).await;
    assert_eq!(status, StatusCode::OK);
    assert!(headers[CONTENT_TYPE].to_str().expect("ascii").starts_with("text/html"));
    assert_eq!(&body[..], b"<h1>Sign in</h1>");

    let (status, headers, _) =
        send(&t.app, Method::GET, "/frontend/css", None, Bytes::new()).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(headers[CONTENT_TYPE], "text/css");
}

#[tokio::test]
async fn signup_sets_a_cookie_and_the_session_survives_requests() {
    let t = test_app();
    let cookie = signed_up(&t.app, "ada").await;

    let (status, _, body) =
        send(&t.app, Method::GET, "/users/me", Some(&cookie), Bytes::new()).await;
    assert_eq!(status, StatusCode::OK);
    let profile = envelope(&body);
    assert_eq!(profile["username"], "ada");

    let (status, headers, _) =
        send(&t.app, Method::GET, "/", Some(&cookie), Bytes::new()).await;
    assert_eq!(status, StatusCode::OK, "session holder reaches the main page");
    assert!(headers.get(SET_COOKIE).is_none(), "no cookie change on a plain read");
}

#[tokio::test]
async fn session_holder_is_bounced_off_the_auth_pages() {
    let t = test_app();
    let cookie = signed_up(&t.app, "ada").await;

    let (status, headers, _) =
        send(&t.app, Method::GET, "/users/signin", Some(&cookie), Bytes::new()).await;
    assert_eq!(status, StatusCode::FOUND);
    assert_eq!(headers[LOCATION], "/");

    let (status, _, body) = send(
        &t.app,
        Method::POST,
        "/users/signup",
        Some(&cookie),
        Bytes::from("{}"),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(envelope(&body)["error"]["message"], "already authorized");
}

#[tokio::test]
async fn signup_with_empty_body_returns_envelope_and_no_cookie() {
    let t = test_app();
    let (status, headers, body) =
        send(&t.app, Method::POST, "/users/signup", None, Bytes::new()).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(envelope(&body)["error"]["code"], 400);
    assert!(headers.get(SET_COOKIE).is_none());
}

#[tokio::test]
async fn signin_error_envelopes_match_the_failure() {
    let t = test_app();
    signed_up(&t.app, "ada").await;

    let attempt = |username: &str, password: &str| {
        Bytes::from(json!({"username": username, "password": password}).to_string())
    };

    let (status, _, body) = send(
        &t.app,
        Method::POST,
        "/users/signin",
        None,
        attempt("nobody", "s3cret"),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(envelope(&body)["error"]["message"], "User not found");

    let (status, _, body) = send(
        &t.app,
        Method::POST,
        "/users/signin",
        None,
        attempt("ada", "wrong"),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(envelope(&body)["error"]["message"], "Incorrect password");

    let (status, headers, _) = send(
        &t.app,
        Method::POST,
        "/users/signin",
        None,
        attempt("ada", "s3cret"),
    )
    .await;
    assert_eq!(status, StatusCode::FOUND);
    assert_eq!(headers[LOCATION], "/");
    assert!(headers.contains_key(SET_COOKIE));
}

#[tokio::test]
async fn task_crud_through_the_full_pipeline() {
    let t = test_app();
    let cookie = signed_up(&t.app, "ada").await;

    let (status, _, body) = send(
        &t.app,
        Method::POST,
        "/tasks",
        Some(&cookie),
        Bytes::from(r#"{"title":"buy milk"}"#),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let id = envelope(&body)["id"].as_u64().expect("id embedded");

    let (status, _, body) =
        send(&t.app, Method::GET, "/tasks", Some(&cookie), Bytes::new()).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(envelope(&body).as_array().map(Vec::len), Some(1));

    let update = json!({"id": id, "title": "buy oat milk"});
    let (status, _, body) = send(
        &t.app,
        Method::PUT,
        "/tasks",
        Some(&cookie),
        Bytes::from(update.to_string()),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(envelope(&body)["title"], "buy oat milk");

    let (status, _, _) = send(
        &t.app,
        Method::DELETE,
        "/tasks",
        Some(&cookie),
        Bytes::from(json!({"id": id}).to_string()),
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (_, _, body) = send(&t.app, Method::GET, "/tasks", Some(&cookie), Bytes::new()).await;
    assert_eq!(envelope(&body).as_array().map(Vec::len), Some(0));
}

#[tokio::test]
async fn signout_clears_the_cookie_and_forgets_the_session() {
    let t = test_app();
    let cookie = signed_up(&t.app, "ada").await;

    let (status, headers, _) = send(
        &t.app,
        Method::DELETE,
        "/users/signout",
        Some(&cookie),
        Bytes::new(),
    )
    .await;
    assert_eq!(status, StatusCode::FOUND);
    assert_eq!(headers[LOCATION], "/users/signin");
    assert!(
        headers[SET_COOKIE]
            .to_str()
            .expect("ascii")
            .contains("Max-Age=0")
    );

    // The old cookie no longer restores a session.
    let (status, headers, _) =
        send(&t.app, Method::GET, "/", Some(&cookie), Bytes::new()).await;
    assert_eq!(status, StatusCode::FOUND);
    assert_eq!(headers[LOCATION], "/users/signin");
}

#[tokio::test]
async fn unknown_path_is_a_gated_404_envelope() {
    let t = test_app();
    let cookie = signed_up(&t.app, "ada").await;

    // With a session the 404 handler itself answers.
    let (status, _, body) =
        send(&t.app, Method::GET, "/no/such/path", Some(&cookie), Bytes::new()).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(envelope(&body)["error"]["code"], 404);

    // Without one, the gate fires before the 404 handler.
    let (status, headers, _) =
        send(&t.app, Method::GET, "/no/such/path", None, Bytes::new()).await;
    assert_eq!(status, StatusCode::FOUND);
    assert_eq!(headers[LOCATION], "/users/signin");
}

#[tokio::test]
async fn unregistered_method_is_405() {
    let t = test_app();
    let (status, _, _) = send(&t.app, Method::PATCH, "/tasks", None, Bytes::new()).await;
    assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
}
