
use activity_client::fetch::{FetchError, ResilientFetcher};
use serde_json::{Value, json};
use test_helpers::*;

#[tokio::test]
async fn first_healthy_origin_wins_and_later_ones_are_skipped() {
    let healthy = spawn_static_origin(200, "application/json", json!({"x": 1}).to_string()).await;
    let never = spawn_static_origin(200, "application/json", json!({"x": 2}).to_string()).await;

    let fetcher = ResilientFetcher::new(&plain_host(), vec![healthy.url(), never.url()]);
    let result: Value = fetcher.get_json("/api/test").await.unwrap();

    assert_eq!(result, json!({"x": 1}));
    assert_eq!(healthy.hit_count(), 1);
    assert_eq!(never.hit_count(), 0);
}

#[tokio::test]
async fn every_origin_is_tried_until_one_succeeds() {
    let broken_a = spawn_static_origin(500, "application/json", "{}".to_string()).await;
    let broken_b = spawn_static_origin(503, "application/json", "{}".to_string()).await;
    let healthy = spawn_static_origin(200, "application/json", json!({"ok": true}).to_string()).await;

    let fetcher = ResilientFetcher::new(
        &plain_host(),
        vec![broken_a.url(), broken_b.url(), healthy.url()],
    );
    let result: Value = fetcher.get_json("/api/test").await.unwrap();

    assert_eq!(result, json!({"ok": true}));
    assert_eq!(broken_a.hit_count(), 1);
    assert_eq!(broken_b.hit_count(), 1);
    assert_eq!(healthy.hit_count(), 1);
}

#[tokio::test]
async fn wrong_content_type_counts_as_failure() {
    let html = spawn_static_origin(200, "text/html", "<html>not json</html>".to_string()).await;
    let healthy = spawn_static_origin(200, "application/json", json!({"ok": 1}).to_string()).await;

    let fetcher = ResilientFetcher::new(&plain_host(), vec![html.url(), healthy.url()]);
    let result: Value = fetcher.get_json("/api/test").await.unwrap();

    assert_eq!(result, json!({"ok": 1}));
    assert_eq!(html.hit_count(), 1);
}

#[tokio::test]
async fn last_attempts_error_surfaces_when_all_fail() {
    let first = spawn_static_origin(500, "application/json", "first failure".to_string()).await;
    let last = spawn_static_origin(503, "application/json", "final failure".to_string()).await;

    let fetcher = ResilientFetcher::new(&plain_host(), vec![first.url(), last.url()]);
    let err = fetcher.get_json::<Value>("/api/test").await.unwrap_err();

    match err {
        FetchError::Status { status, body } => {
            assert_eq!(status, 503);
            assert_eq!(body, "final failure");
        }
        other => panic!("expected status error, got {other:?}"),
    }
}

#[tokio::test]
async fn error_bodies_are_truncated() {
    let page = "<html>".to_string() + &"e".repeat(5000);
    let broken = spawn_static_origin(500, "text/html", page).await;

    let fetcher = ResilientFetcher::new(&plain_host(), vec![broken.url()]);
    let err = fetcher.get_json::<Value>("/api/test").await.unwrap_err();

    match err {
        FetchError::Status { body, .. } => assert_eq!(body.chars().count(), 180),
        other => panic!("expected status error, got {other:?}"),
    }
}

#[tokio::test]
async fn webview_host_rewrites_total_failure_into_proxy_hint() {
    let broken = spawn_static_origin(502, "text/html", "bad gateway".to_string()).await;

    let fetcher = ResilientFetcher::new(&webview_host(), vec![broken.url()]);
    let err = fetcher.get_json::<Value>("/api/stocks").await.unwrap_err();

    match err {
        FetchError::ProxyMapping(message) => {
            assert!(message.contains("/api"), "hint should name the mapping: {message}");
            assert!(message.contains("URL mapping"), "hint should be actionable: {message}");
        }
        other => panic!("expected proxy-mapping rewrite, got {other:?}"),
    }
}

#[tokio::test]
async fn plain_host_propagates_the_raw_error() {
    let broken = spawn_static_origin(502, "text/html", "bad gateway".to_string()).await;

    let fetcher = ResilientFetcher::new(&plain_host(), vec![broken.url()]);
    let err = fetcher.get_json::<Value>("/api/stocks").await.unwrap_err();

    assert!(matches!(err, FetchError::Status { status: 502, .. }));
}

#[tokio::test]
async fn post_sends_a_json_body_and_decodes_the_reply() {
    let backend = MockBackend::spawn().await;
    let api = backend.api();

    let ack = api
        .duel_join(&activity_types::DuelJoinRequest {
            user_id: "42".to_string(),
            display_name: "Alice".to_string(),
            code: "AB12".to_string(),
        })
        .await
        .unwrap();

    assert!(ack.ok);
    let calls = backend.join_calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0]["code"], "AB12");
    assert_eq!(calls[0]["user_id"], "42");
}

#[tokio::test]
async fn typed_read_endpoints_decode() {
    let backend = MockBackend::spawn().await;
    let api = backend.api();

    let stocks = api.stocks(Some("42")).await.unwrap();
    assert_eq!(stocks.stocks.len(), 1);

    let stats = api.dashboard_stats().await.unwrap();
    assert_eq!(stats.company_count, 3);
    assert_eq!(stats.seconds_until_close, 3600);

    let shop = api.shop().await.unwrap();
    assert_eq!(shop.items.len(), 1);
    assert!(shop.bucket.is_some());

    let account = api.account_status("42").await.unwrap();
    assert_eq!(account.user["balance"], 100.0);

    let history = api.history("42", 20, 0).await.unwrap();
    assert_eq!(history.total, 0);

    let token = api.oauth_token("code-1", None).await.unwrap();
    assert_eq!(token.access_token.as_deref(), Some("token-123"));
}
