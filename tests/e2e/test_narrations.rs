use crate::helpers;

use helpers::fakes::{silent_wav, FAIL_MARKER, HOLD_MARKER};
use helpers::TestContext;
use hyper::StatusCode;
use narrator_backend::domain::narration::dto::{BatchNarrationResponse, NarrationResponse};
use narrator_backend::domain::narration::LanguageCode;
use pretty_assertions::assert_eq;
use serde_json::json;
use std::time::Duration;
use test_context::test_context;

const SCRIPT: &str = "Markets opened higher this morning after a quiet week. \
    Energy stocks led the gains while technology lagged behind. \
    Analysts expect the central bank to hold rates steady at its next meeting. \
    In other news, the city council approved a new budget for public transport. \
    The plan adds three bus lines and extends night service on weekends. \
    Construction on the northern tram extension is set to begin in the spring. \
    Finally, the weather stays mild through the weekend with light rain on Sunday. \
    Temperatures should climb again early next week across most of the region.";

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_narrate_a_framed_script_into_one_track(ctx: &TestContext) {
    let response = ctx
        .client
        .post(
            "/api/narrations",
            &json!({
                "job_id": "daily-brief",
                "text": SCRIPT,
                "language": "en",
                "intro": "Welcome to the daily brief.",
                "outro": "Thanks for listening."
            }),
        )
        .await
        .unwrap();

    response.assert_status(StatusCode::CREATED);

    let narration: NarrationResponse = response.json().unwrap();
    assert_eq!(narration.job_id, "daily-brief");
    assert_eq!(narration.language, LanguageCode::English);
    assert!(narration.segment_count > 1, "script should span several segments");
    assert_eq!(narration.resumed_segments, 0);
    assert!(narration.warnings.is_empty());
    assert!(narration.resource_id.is_none());

    // One provider call per segment, each within the bound
    assert_eq!(ctx.synthesis.calls(), narration.segment_count);
    let texts = ctx.synthesis.texts();
    assert!(texts.iter().all(|t| t.chars().count() <= 400));
    assert!(texts.iter().any(|t| t.starts_with("Welcome to the daily brief.")));
    assert!(texts.iter().any(|t| t.trim_end().ends_with("Thanks for listening.")));

    // 100ms of audio per segment, concatenated into one file
    assert_eq!(
        narration.track_path,
        ctx.output_dir.join("daily-brief").join("narration_en.wav")
    );
    assert!(narration.track_path.exists());
    let expected = narration.segment_count as f64 * 0.1;
    assert!((narration.duration_secs - expected).abs() < 0.01);

    // Segment files are cleaned up after assembly
    assert!(!ctx.work_dir.join("daily-brief").join("en").exists());
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_detect_language_when_not_given(ctx: &TestContext) {
    let response = ctx
        .client
        .post(
            "/api/narrations",
            &json!({
                "job_id": "resumen",
                "text": "Buenos días. Hoy hablamos de la economía, del tiempo y de las noticias más importantes de la semana."
            }),
        )
        .await
        .unwrap();

    response.assert_status(StatusCode::CREATED);

    let narration: NarrationResponse = response.json().unwrap();
    assert_eq!(narration.language, LanguageCode::Spanish);
    assert_eq!(
        narration.track_path,
        ctx.output_dir.join("resumen").join("narration_es.wav")
    );
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_strip_markup_when_cleaning_is_requested(ctx: &TestContext) {
    let response = ctx
        .client
        .post(
            "/api/narrations",
            &json!({
                "job_id": "cleaned",
                "language": "en",
                "clean_text": true,
                "text": "<p>Read the <b>full story</b> at https://example.com/story today.</p>"
            }),
        )
        .await
        .unwrap();

    response.assert_status(StatusCode::CREATED);

    let spoken = ctx.synthesis.texts().join(" ");
    assert!(spoken.contains("full story"));
    assert!(!spoken.contains("<b>"));
    assert!(!spoken.contains("https://"));
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_reuse_segments_left_by_an_earlier_run(ctx: &TestContext) {
    let segment_dir = ctx.work_dir.join("resumed-job").join("en");
    std::fs::create_dir_all(&segment_dir).unwrap();
    std::fs::write(segment_dir.join("segment_0000.wav"), silent_wav()).unwrap();

    let response = ctx
        .client
        .post(
            "/api/narrations",
            &json!({
                "job_id": "resumed-job",
                "language": "en",
                "text": "A single short sentence."
            }),
        )
        .await
        .unwrap();

    response.assert_status(StatusCode::CREATED);

    let narration: NarrationResponse = response.json().unwrap();
    assert_eq!(narration.segment_count, 1);
    assert_eq!(narration.resumed_segments, 1);
    assert_eq!(ctx.synthesis.calls(), 0);
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_reject_empty_text(ctx: &TestContext) {
    let response = ctx
        .client
        .post(
            "/api/narrations",
            &json!({ "job_id": "empty", "text": "   " }),
        )
        .await
        .unwrap();

    response
        .assert_status(StatusCode::BAD_REQUEST)
        .assert_error_message("Text cannot be empty");
    assert_eq!(ctx.synthesis.calls(), 0);
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_reject_text_that_cleans_down_to_nothing(ctx: &TestContext) {
    let response = ctx
        .client
        .post(
            "/api/narrations",
            &json!({
                "job_id": "only-markup",
                "clean_text": true,
                "text": "<div>   </div><p>https://example.com</p>"
            }),
        )
        .await
        .unwrap();

    response.assert_status(StatusCode::BAD_REQUEST);
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_reject_job_ids_that_escape_the_work_dir(ctx: &TestContext) {
    let response = ctx
        .client
        .post(
            "/api/narrations",
            &json!({ "job_id": "../etc", "text": "Hello there." }),
        )
        .await
        .unwrap();

    response
        .assert_status(StatusCode::BAD_REQUEST)
        .assert_error_message("job_id");
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_reject_unsupported_language(ctx: &TestContext) {
    let response = ctx
        .client
        .post(
            "/api/narrations",
            &json!({ "job_id": "klingon", "language": "tlh", "text": "Hello there." }),
        )
        .await
        .unwrap();

    response
        .assert_status(StatusCode::BAD_REQUEST)
        .assert_error_message("Unsupported language");
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_return_bad_gateway_without_retrying_fatal_provider_errors(
    ctx: &TestContext,
) {
    let response = ctx
        .client
        .post(
            "/api/narrations",
            &json!({
                "job_id": "rejected",
                "language": "en",
                "text": format!("This segment is {}.", FAIL_MARKER)
            }),
        )
        .await
        .unwrap();

    response.assert_status(StatusCode::BAD_GATEWAY);
    assert_eq!(ctx.synthesis.calls(), 1);
    assert!(!ctx.output_dir.join("rejected").join("narration_en.wav").exists());

    // The job is released after the failure
    let response = ctx
        .client
        .post(
            "/api/narrations",
            &json!({ "job_id": "rejected", "language": "en", "text": "Now it works." }),
        )
        .await
        .unwrap();
    response.assert_status(StatusCode::CREATED);
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_reject_a_duplicate_of_a_running_job(ctx: &TestContext) {
    let client = ctx.client.clone();
    let first = tokio::spawn(async move {
        client
            .post(
                "/api/narrations",
                &json!({
                    "job_id": "busy",
                    "language": "en",
                    "text": format!("Please {} for a moment.", HOLD_MARKER)
                }),
            )
            .await
            .unwrap()
    });

    tokio::time::timeout(Duration::from_secs(5), ctx.synthesis.started.notified())
        .await
        .expect("first request never reached the provider");

    let duplicate = ctx
        .client
        .post(
            "/api/narrations",
            &json!({ "job_id": "busy", "language": "en", "text": "Another take." }),
        )
        .await
        .unwrap();
    duplicate
        .assert_status(StatusCode::CONFLICT)
        .assert_error_message("already running");

    // Same job in another language is independent
    let other_language = ctx
        .client
        .post(
            "/api/narrations",
            &json!({ "job_id": "busy", "language": "fr", "text": "Une autre version." }),
        )
        .await
        .unwrap();
    other_language.assert_status(StatusCode::CREATED);

    ctx.synthesis.release.notify_one();
    let first = first.await.unwrap();
    first.assert_status(StatusCode::CREATED);
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_report_each_batch_item_independently(ctx: &TestContext) {
    let response = ctx
        .client
        .post(
            "/api/narrations/batch",
            &json!({
                "narrations": [
                    { "job_id": "weekly", "language": "en", "text": "The weekly roundup starts now." },
                    { "job_id": "weekly", "language": "fr", "text": format!("Le résumé {}.", FAIL_MARKER) },
                    { "job_id": "weekly", "language": "de", "text": "Die Wochenübersicht beginnt jetzt." }
                ]
            }),
        )
        .await
        .unwrap();

    response.assert_status(StatusCode::OK);

    let batch: BatchNarrationResponse = response.json().unwrap();
    assert_eq!(batch.results.len(), 3);

    assert!(batch.results[0].narration.is_some());
    assert!(batch.results[0].error.is_none());

    assert!(batch.results[1].narration.is_none());
    assert_eq!(batch.results[1].language.as_deref(), Some("fr"));
    assert!(batch.results[1].error.is_some());

    let german = batch.results[2].narration.as_ref().unwrap();
    assert_eq!(german.language, LanguageCode::German);
    assert!(ctx.output_dir.join("weekly").join("narration_de.wav").exists());
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_reject_an_empty_batch(ctx: &TestContext) {
    let response = ctx
        .client
        .post("/api/narrations/batch", &json!({ "narrations": [] }))
        .await
        .unwrap();

    response.assert_status(StatusCode::BAD_REQUEST);
}
