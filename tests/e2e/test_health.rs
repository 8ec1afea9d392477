use crate::e2e::helpers;

use helpers::TestContext;
use hyper::StatusCode;
use test_context::test_context;

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_return_ok_for_health_check(ctx: &TestContext) {
    let response = ctx.client.get("/health").await.unwrap();

    response.assert_status(StatusCode::OK);

    // Health endpoint returns plain text
    let body = String::from_utf8(response.body_bytes.clone()).unwrap();
    assert_eq!(body, "OK");
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_return_liveness_message_at_root(ctx: &TestContext) {
    let response = ctx.client.get("/").await.unwrap();

    response.assert_status(StatusCode::OK);

    let message = response
        .body
        .as_ref()
        .and_then(|b| b.get("message"))
        .and_then(|m| m.as_str());
    assert!(message.is_some_and(|m| !m.is_empty()));
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_include_request_id_in_health_responses(ctx: &TestContext) {
    let response = ctx.client.get("/health").await.unwrap();
    response.assert_header_exists("x-request-id");

    let response = ctx.client.get("/").await.unwrap();
    response.assert_header_exists("x-request-id");
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_handle_concurrent_health_checks(ctx: &TestContext) {
    let mut futures = Vec::new();
    for _ in 0..10 {
        let client = ctx.client.clone();
        futures.push(async move { client.get("/health").await });
    }

    let results = futures::future::join_all(futures).await;

    for result in results {
        let response = result.unwrap();
        response.assert_status(StatusCode::OK);
    }
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_not_touch_backends_for_health_checks(ctx: &TestContext) {
    ctx.client.get("/health").await.unwrap();

    assert!(ctx.tts.calls().is_empty());
    assert!(ctx.storage.uploads().is_empty());
}
