use crate::helpers;

use helpers::TestContext;
use hyper::StatusCode;
use narrator_backend::domain::narration::dto::NarrationResponse;
use pretty_assertions::assert_eq;
use serde_json::json;
use test_context::test_context;

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_upload_the_assembled_track(ctx: &TestContext) {
    let response = ctx
        .client
        .post(
            "/api/narrations",
            &json!({
                "job_id": "episode-12",
                "language": "en",
                "text": "Today we look at how small towns are rebuilding their main streets.",
                "upload": {
                    "title": "Episode 12: Main Street",
                    "description": "Rebuilding the town centre",
                    "tags": ["towns", "economy"]
                }
            }),
        )
        .await
        .unwrap();

    response.assert_status(StatusCode::CREATED);

    let narration: NarrationResponse = response.json().unwrap();
    assert_eq!(narration.resource_id.as_deref(), Some("resource-session-1"));
    assert!(narration.warnings.is_empty());

    let track_size = std::fs::metadata(&narration.track_path).unwrap().len() as usize;
    assert_eq!(ctx.upload_host.received_len(), track_size);
    assert_eq!(ctx.upload_host.titles(), vec!["Episode 12: Main Street".to_string()]);
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_send_large_tracks_in_several_chunks(ctx: &TestContext) {
    // 64KiB chunks against roughly 4.8KB of audio per segment
    let script = "Each sentence here becomes part of a longer narration for the chunked upload. "
        .repeat(80);

    let response = ctx
        .client
        .post(
            "/api/narrations",
            &json!({
                "job_id": "long-form",
                "language": "en",
                "text": script,
                "upload": { "title": "Long form" }
            }),
        )
        .await
        .unwrap();

    response.assert_status(StatusCode::CREATED);

    let narration: NarrationResponse = response.json().unwrap();
    let track_size = std::fs::metadata(&narration.track_path).unwrap().len() as usize;
    assert!(track_size > 64 * 1024);
    assert_eq!(ctx.upload_host.chunk_calls(), track_size.div_ceil(64 * 1024));
    assert_eq!(ctx.upload_host.received_len(), track_size);
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_warn_when_the_cover_cannot_be_attached(ctx: &TestContext) {
    let missing_cover = ctx.output_dir.join("no-such-cover.png");

    let response = ctx
        .client
        .post(
            "/api/narrations",
            &json!({
                "job_id": "coverless",
                "language": "en",
                "text": "A short episode with a missing cover image.",
                "upload": {
                    "title": "Coverless",
                    "cover_image": missing_cover
                }
            }),
        )
        .await
        .unwrap();

    response.assert_status(StatusCode::CREATED);

    let narration: NarrationResponse = response.json().unwrap();
    assert!(narration.resource_id.is_some());
    assert_eq!(narration.warnings.len(), 1);
    assert!(narration.warnings[0].contains("cover"));
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_reject_an_upload_without_title(ctx: &TestContext) {
    let response = ctx
        .client
        .post(
            "/api/narrations",
            &json!({
                "job_id": "untitled",
                "language": "en",
                "text": "Nothing to see here.",
                "upload": { "title": "  " }
            }),
        )
        .await
        .unwrap();

    response
        .assert_status(StatusCode::BAD_REQUEST)
        .assert_error_message("title");
    assert_eq!(ctx.synthesis.calls(), 0);
    assert_eq!(ctx.upload_host.chunk_calls(), 0);
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_reject_caller_media_that_does_not_exist(ctx: &TestContext) {
    let response = ctx
        .client
        .post(
            "/api/narrations",
            &json!({
                "job_id": "composed",
                "language": "en",
                "text": "The narration for a composed video.",
                "upload": {
                    "title": "Composed",
                    "media_path": ctx.output_dir.join("missing.mp4")
                }
            }),
        )
        .await
        .unwrap();

    response.assert_status(StatusCode::BAD_REQUEST);
    assert_eq!(ctx.upload_host.chunk_calls(), 0);
}
