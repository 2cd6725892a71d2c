use std::collections::HashMap;
use std::time::Duration;

use axum::extract::Query;
use axum::http::{HeaderMap, StatusCode};
use axum::routing::{get, post};
use axum::{Json, Router};
use blog_admin::api::transport::TransportError;
use blog_admin::api::{Body, HttpRequest, Method, ReqwestTransport, Transport};
use serde_json::{Value, json};
use tokio::net::TcpListener;

async fn echo(
    headers: HeaderMap,
    Query(query): Query<HashMap<String, String>>,
    Json(body): Json<Value>,
) -> Json<Value> {
    let authorization = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    Json(json!({
        "code": 200,
        "data": { "body": body, "query": query, "authorization": authorization },
    }))
}

async fn spawn_server() -> String {
    let app = Router::new()
        .route("/api/v1/admin/echo", post(echo))
        .route("/api/v1/admin/text", get(|| async { "plain text" }))
        .route("/api/v1/admin/empty", get(|| async { StatusCode::NO_CONTENT }))
        .route(
            "/api/v1/admin/missing",
            get(|| async {
                (
                    StatusCode::NOT_FOUND,
                    Json(json!({ "code": 404, "message": "文章不存在" })),
                )
            }),
        )
        .route(
            "/api/v1/admin/slow",
            get(|| async {
                tokio::time::sleep(Duration::from_secs(2)).await;
                "late"
            }),
        );

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}/api/v1/admin/", addr)
}

fn request(method: Method, path: &str, body: Body) -> HttpRequest {
    HttpRequest {
        method,
        path: path.to_string(),
        query: Vec::new(),
        headers: Vec::new(),
        body,
        timeout: Duration::from_secs(5),
    }
}

#[tokio::test]
async fn json_request_reaches_the_server() {
    let base = spawn_server().await;
    let transport = ReqwestTransport::new(&base, Duration::from_secs(5)).unwrap();

    let mut req = request(Method::POST, "/echo", Body::Json(json!({ "title": "hi" })));
    req.query = vec![("page".into(), "2".into())];
    req.headers = vec![("Authorization".into(), "Bearer token-1".into())];

    let response = transport.send(req).await.unwrap();

    assert_eq!(response.status, 200);
    let data = &response.body["data"];
    assert_eq!(data["body"], json!({ "title": "hi" }));
    assert_eq!(data["query"]["page"], "2");
    assert_eq!(data["authorization"], "Bearer token-1");
}

#[tokio::test]
async fn non_json_and_empty_bodies_are_preserved() {
    let base = spawn_server().await;
    let transport = ReqwestTransport::new(&base, Duration::from_secs(5)).unwrap();

    let text = transport
        .send(request(Method::GET, "text", Body::Empty))
        .await
        .unwrap();
    assert_eq!(text.body, Value::String("plain text".into()));

    let empty = transport
        .send(request(Method::GET, "/empty", Body::Empty))
        .await
        .unwrap();
    assert_eq!(empty.status, 204);
    assert!(empty.body.is_null());
}

#[tokio::test]
async fn error_statuses_are_returned_not_raised() {
    let base = spawn_server().await;
    let transport = ReqwestTransport::new(&base, Duration::from_secs(5)).unwrap();

    let response = transport
        .send(request(Method::GET, "/missing", Body::Empty))
        .await
        .unwrap();
    assert_eq!(response.status, 404);
    assert!(!response.is_success());
    assert_eq!(response.body["message"], "文章不存在");
}

#[tokio::test]
async fn slow_server_times_out() {
    let base = spawn_server().await;
    let transport = ReqwestTransport::new(&base, Duration::from_secs(5)).unwrap();

    let mut req = request(Method::GET, "/slow", Body::Empty);
    req.timeout = Duration::from_millis(100);

    let err = transport.send(req).await.unwrap_err();
    assert!(matches!(err, TransportError::Timeout), "{:?}", err);
}

#[tokio::test]
async fn closed_port_is_a_connect_error() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let transport =
        ReqwestTransport::new(&format!("http://{}", addr), Duration::from_secs(5)).unwrap();
    let err = transport
        .send(request(Method::GET, "/posts", Body::Empty))
        .await
        .unwrap_err();
    assert!(matches!(err, TransportError::Connect(_)), "{:?}", err);
}
