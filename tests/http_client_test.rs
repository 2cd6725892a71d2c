mod support;

use std::time::Duration;

use blog_admin::api::models::{CreateTagInput, PostQuery};
use blog_admin::api::{Body, Method, RequestOptions};
use blog_admin::cache::keys::auth_keys;
use blog_admin::error::ErrorKind;
use blog_admin::session::SessionState;
use serde_json::{Value, json};
use support::{TIMESTAMP, logged_in};

#[tokio::test]
async fn authenticated_requests_carry_the_bearer_token() {
    let h = logged_in().await;
    let token = h.ctx.session.current().unwrap().token;

    h.ctx.posts.list(&PostQuery::page(1, 10)).await.unwrap();

    let request = h.backend.last_request("GET", "/posts").unwrap();
    assert_eq!(
        request.header("Authorization"),
        Some(format!("Bearer {}", token).as_str())
    );
    assert!(request.header("X-Request-Id").is_some());
    assert_eq!(request.query_param("page"), Some("1"));
    assert_eq!(request.query_param("limit"), Some("10"));
}

#[tokio::test]
async fn login_is_sent_without_a_token() {
    let h = logged_in().await;
    let request = h.backend.last_request("POST", "/auth/login").unwrap();
    assert!(request.header("Authorization").is_none());
    assert_eq!(request.header("Content-Type"), Some("application/json"));
}

#[tokio::test]
async fn bodies_without_an_envelope_are_used_as_is() {
    let h = logged_in().await;
    h.backend.respond_next(
        "GET",
        "/posts/raw-1",
        200,
        json!({
            "id": "raw-1",
            "title": "Raw",
            "slug": "raw",
            "markdown": "legacy body",
            "status": "draft",
            "createdAt": TIMESTAMP,
            "updatedAt": TIMESTAMP,
        }),
    );

    let post = h.ctx.posts.get("raw-1").await.unwrap();
    assert_eq!(post.title, "Raw");
    assert_eq!(post.content, "legacy body");
}

#[tokio::test]
async fn unauthorized_response_ends_the_session() {
    let h = logged_in().await;
    assert!(h.ctx.cache.contains(&auth_keys::profile()));
    h.backend.revoke_tokens();

    let err = h.ctx.posts.list(&PostQuery::page(1, 10)).await.unwrap_err();

    assert_eq!(err.kind, ErrorKind::Auth);
    assert_eq!(err.status, Some(401));
    assert_eq!(h.ctx.session.state(), SessionState::Unauthenticated);
    assert!(h.ctx.session.current().is_none());
    assert!(h.credentials.snapshot().is_none());
    assert!(!h.ctx.cache.contains(&auth_keys::profile()));
    assert_eq!(h.navigator.redirects(), vec!["/login".to_string()]);
    assert_eq!(h.notices.errors().len(), 1);
}

#[tokio::test]
async fn forbidden_keeps_the_session() {
    let h = logged_in().await;
    h.backend
        .respond_next("DELETE", "/users/user-1", 403, json!({ "message": "无权删除该用户" }));

    let err = h.ctx.users.delete("user-1").await.unwrap_err();

    assert_eq!(err.kind, ErrorKind::Forbidden);
    assert_eq!(err.message, "无权删除该用户");
    assert_eq!(h.ctx.session.state(), SessionState::Authenticated);
    assert!(h.navigator.redirects().is_empty());
}

#[tokio::test]
async fn missing_resource_is_not_found_with_one_notice() {
    let h = logged_in().await;

    let err = h.ctx.posts.get("post-404").await.unwrap_err();

    assert_eq!(err.kind, ErrorKind::NotFound);
    assert_eq!(err.status, Some(404));
    assert_eq!(h.notices.errors(), vec!["记录不存在".to_string()]);
}

#[tokio::test]
async fn validation_errors_carry_field_messages() {
    let h = logged_in().await;
    h.backend.seed_tag("Rust");

    let err = h
        .ctx
        .tags
        .create(&CreateTagInput::named("Rust"))
        .await
        .unwrap_err();

    assert_eq!(err.kind, ErrorKind::Validation);
    assert_eq!(err.message, "标签名称已存在");
    assert_eq!(err.field_errors["name"], "名称已存在");
    assert_eq!(h.notices.errors().len(), 1);
    assert!(h.notices.successes().is_empty());
}

#[tokio::test]
async fn msg_field_is_used_for_the_message() {
    let h = logged_in().await;
    h.backend.use_msg_field();

    let err = h.ctx.tags.get("tag-404").await.unwrap_err();
    assert_eq!(err.message, "记录不存在");
}

#[tokio::test]
async fn missing_message_falls_back_to_kind_default() {
    let h = logged_in().await;
    h.backend.respond_next("GET", "/comments/stats", 503, Value::Null);

    let err = h.ctx.comments.stats().await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::Server);
    assert_eq!(err.message, "服务器错误，请稍后重试");
    assert!(err.is_retryable());
}

#[tokio::test]
async fn silent_requests_do_not_notify() {
    let h = logged_in().await;

    let err = h
        .ctx
        .client
        .request::<Value>(Method::GET, "/nowhere", Body::Empty, RequestOptions::silent())
        .await
        .unwrap_err();

    assert_eq!(err.kind, ErrorKind::NotFound);
    assert!(h.notices.all().is_empty());
}

#[tokio::test]
async fn unreachable_backend_is_a_network_error() {
    let h = logged_in().await;
    h.backend.set_offline(true);

    let err = h.ctx.posts.get("post-1").await.unwrap_err();

    assert_eq!(err.kind, ErrorKind::Network);
    assert!(err.status.is_none());
    assert!(err.is_retryable());
    assert_eq!(h.ctx.session.state(), SessionState::Authenticated);
    assert_eq!(h.notices.errors().len(), 1);
}

#[tokio::test(start_paused = true)]
async fn slow_backend_times_out_as_network_error() {
    let h = logged_in().await;
    h.backend.set_delay(Duration::from_secs(60));

    let err = h.ctx.posts.list(&PostQuery::page(1, 10)).await.unwrap_err();

    assert_eq!(err.kind, ErrorKind::Network);
    assert_eq!(err.message, "请求超时，请检查网络连接");
    assert_eq!(h.notices.errors(), vec!["请求超时，请检查网络连接".to_string()]);
}

#[tokio::test]
async fn mismatched_response_shape_is_unexpected() {
    let h = logged_in().await;
    h.backend
        .respond_next("GET", "/posts/odd", 200, json!({ "code": 200, "data": [1, 2, 3] }));

    let err = h.ctx.posts.get("odd").await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::Unexpected);
    assert_eq!(h.notices.errors().len(), 1);
}
