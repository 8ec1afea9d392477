use crate::e2e::helpers;

use helpers::{TestContext, TEST_CHUNK_SIZE};
use hyper::StatusCode;
use pretty_assertions::assert_eq;
use serde_json::json;
use std::time::Duration;
use story_narrator::controllers::webhook::WebhookResponse;
use test_context::test_context;

fn story_of(chars: usize) -> String {
    "Era uma vez uma raposa muito curiosa. "
        .chars()
        .cycle()
        .take(chars)
        .collect()
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_narrate_and_upload_a_short_story(ctx: &TestContext) {
    let response = ctx
        .client
        .post(
            "/webhook",
            &json!({
                "id": "story42",
                "text": "Hello world",
                "language": "english",
                "gender": "female"
            }),
        )
        .await
        .unwrap();

    response.assert_status(StatusCode::OK);
    let body: WebhookResponse = response.json().unwrap();
    assert_eq!(body.id, "story42");
    assert!(!body.message.is_empty());

    let calls = ctx.tts.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].text, "Hello world");
    assert_eq!(calls[0].voice, "en-female");

    let uploads = ctx.storage.uploads();
    assert_eq!(uploads.len(), 1);
    assert_eq!(uploads[0].key, "story42.mp3");
    assert!(uploads[0].size > 0);

    // Local artifact is cleaned up after a successful upload
    assert!(ctx.artifacts().is_empty());
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_synthesize_every_chunk_of_a_long_story(ctx: &TestContext) {
    let text = story_of(TEST_CHUNK_SIZE * 2 + 20);

    let response = ctx
        .client
        .post(
            "/webhook",
            &json!({ "id": "long-story", "text": text, "language": "portuguese", "gender": "male" }),
        )
        .await
        .unwrap();

    response.assert_status(StatusCode::OK);

    let calls = ctx.tts.calls();
    assert_eq!(calls.len(), 3);
    assert!(calls.iter().all(|c| c.voice == "pt-male"));
    assert!(calls
        .iter()
        .all(|c| c.text.chars().count() <= TEST_CHUNK_SIZE));
    assert_eq!(
        calls.iter().map(|c| c.text.chars().count()).sum::<usize>(),
        text.chars().count()
    );

    let uploads = ctx.storage.uploads();
    assert_eq!(uploads.len(), 1);
    assert_eq!(uploads[0].key, "long-story.mp3");
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_count_multibyte_characters_when_chunking(ctx: &TestContext) {
    let text: String = "ação ".chars().cycle().take(TEST_CHUNK_SIZE + 10).collect();

    let response = ctx
        .client
        .post("/webhook", &json!({ "id": "acentos", "text": text }))
        .await
        .unwrap();

    response.assert_status(StatusCode::OK);

    let calls = ctx.tts.calls();
    assert_eq!(calls.len(), 2);
    let mut lengths: Vec<usize> = calls.iter().map(|c| c.text.chars().count()).collect();
    lengths.sort();
    assert_eq!(lengths, vec![10, TEST_CHUNK_SIZE]);
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_use_default_voice_when_not_specified(ctx: &TestContext) {
    let response = ctx
        .client
        .post("/webhook", &json!({ "id": "defaults", "text": "Olá" }))
        .await
        .unwrap();

    response.assert_status(StatusCode::OK);

    let calls = ctx.tts.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].voice, "pt-female");
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_reject_empty_text(ctx: &TestContext) {
    let response = ctx
        .client
        .post("/webhook", &json!({ "id": "story42", "text": "" }))
        .await
        .unwrap();

    response
        .assert_status(StatusCode::BAD_REQUEST)
        .assert_error_message("empty text");

    assert!(ctx.tts.calls().is_empty());
    assert!(ctx.storage.uploads().is_empty());
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_reject_missing_id(ctx: &TestContext) {
    let response = ctx
        .client
        .post("/webhook", &json!({ "text": "Hello world" }))
        .await
        .unwrap();

    response
        .assert_status(StatusCode::BAD_REQUEST)
        .assert_error_message("missing id");

    assert!(ctx.tts.calls().is_empty());
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_reject_ids_that_leave_the_storage_zone(ctx: &TestContext) {
    for id in ["../other-zone/evil", "nested/../escape", "a//b", "/absolute"] {
        let response = ctx
            .client
            .post("/webhook", &json!({ "id": id, "text": "Hello world" }))
            .await
            .unwrap();

        response
            .assert_status(StatusCode::BAD_REQUEST)
            .assert_error_message("invalid id");
    }

    assert!(ctx.tts.calls().is_empty());
    assert!(ctx.storage.uploads().is_empty());
    assert!(ctx.artifacts().is_empty());
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_upload_nested_ids_under_their_key(ctx: &TestContext) {
    let response = ctx
        .client
        .post("/webhook", &json!({ "id": "2024/story42", "text": "Hello world" }))
        .await
        .unwrap();

    response.assert_status(StatusCode::OK);

    let uploads = ctx.storage.uploads();
    assert_eq!(uploads.len(), 1);
    assert_eq!(uploads[0].key, "2024/story42.mp3");
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_reject_malformed_json(ctx: &TestContext) {
    let response = ctx
        .client
        .post_raw("/webhook", "{\"id\": \"story42\", \"text\": ")
        .await
        .unwrap();

    response.assert_status(StatusCode::BAD_REQUEST);
    assert!(response.body.as_ref().and_then(|b| b.get("error")).is_some());
    assert!(ctx.tts.calls().is_empty());
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_reject_unsupported_language(ctx: &TestContext) {
    let response = ctx
        .client
        .post(
            "/webhook",
            &json!({ "id": "story42", "text": "nuqneH", "language": "klingon", "gender": "male" }),
        )
        .await
        .unwrap();

    response
        .assert_status(StatusCode::BAD_REQUEST)
        .assert_error_message("klingon");

    assert!(ctx.tts.calls().is_empty());
    assert!(ctx.storage.uploads().is_empty());
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_reject_unsupported_gender(ctx: &TestContext) {
    let response = ctx
        .client
        .post(
            "/webhook",
            &json!({ "id": "story42", "text": "Hello", "gender": "robot" }),
        )
        .await
        .unwrap();

    response.assert_status(StatusCode::BAD_REQUEST);
    assert!(ctx.tts.calls().is_empty());
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_abort_without_upload_when_a_chunk_fails(ctx: &TestContext) {
    ctx.tts.fail_on("FAIL");
    let text = format!(
        "{}{}FAIL at the end",
        "a".repeat(TEST_CHUNK_SIZE),
        "b".repeat(TEST_CHUNK_SIZE)
    );

    let response = ctx
        .client
        .post("/webhook", &json!({ "id": "broken", "text": text }))
        .await
        .unwrap();

    response
        .assert_status(StatusCode::INTERNAL_SERVER_ERROR)
        .assert_error_message("chunk 2")
        .assert_error_message("502");

    assert!(ctx.storage.uploads().is_empty());
    assert!(ctx.artifacts().is_empty());
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_report_storage_rejection_and_keep_artifact(ctx: &TestContext) {
    ctx.storage.respond_with(401);

    let response = ctx
        .client
        .post("/webhook", &json!({ "id": "story42", "text": "Hello world" }))
        .await
        .unwrap();

    response
        .assert_status(StatusCode::INTERNAL_SERVER_ERROR)
        .assert_error_message("401")
        .assert_error_message("Unauthorized");

    assert_eq!(ctx.storage.uploads().len(), 1);

    let artifacts = ctx.artifacts();
    assert_eq!(artifacts.len(), 1);
    let name = artifacts[0].file_name().unwrap().to_string_lossy().to_string();
    assert!(name.starts_with("story42-"), "unexpected artifact name {name}");
    assert!(name.ends_with(".mp3"));
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_give_each_request_its_own_artifact(ctx: &TestContext) {
    ctx.storage.respond_with(503);

    for _ in 0..2 {
        ctx.client
            .post("/webhook", &json!({ "id": "same-id", "text": "Hello" }))
            .await
            .unwrap()
            .assert_status(StatusCode::INTERNAL_SERVER_ERROR);
    }

    assert_eq!(ctx.artifacts().len(), 2);
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_time_out_slow_synthesis(ctx: &TestContext) {
    ctx.tts.delay(helpers::TEST_REQUEST_TIMEOUT + Duration::from_secs(3));

    let response = ctx
        .client
        .post("/webhook", &json!({ "id": "slow", "text": "Hello world" }))
        .await
        .unwrap();

    response
        .assert_status(StatusCode::REQUEST_TIMEOUT)
        .assert_error_message("request timed out");
    assert!(ctx.storage.uploads().is_empty());
    assert!(ctx.artifacts().is_empty());
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_include_request_id_in_webhook_responses(ctx: &TestContext) {
    let ok = ctx
        .client
        .post("/webhook", &json!({ "id": "story42", "text": "Hello" }))
        .await
        .unwrap();
    ok.assert_header_exists("x-request-id");

    let bad = ctx
        .client
        .post("/webhook", &json!({ "id": "story42", "text": "" }))
        .await
        .unwrap();
    bad.assert_header_exists("x-request-id");
}
