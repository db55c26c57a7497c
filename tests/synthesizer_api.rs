use newsreel::extractor::ExtractedContent;
use newsreel::synthesizer::{
    CONNECTION_ERROR_SENTINEL, GENERIC_ERROR_SENTINEL, NO_CONTENT_SENTINEL, RATE_LIMIT_SENTINEL,
    STATUS_ERROR_SENTINEL, StoryStatus, Synthesizer,
};
use serde_json::{Value, json};
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{method, path},
};

fn content(text: &str) -> ExtractedContent {
    ExtractedContent {
        text: text.to_string(),
    }
}

fn synthesizer_for(server: &MockServer) -> Synthesizer {
    Synthesizer::new("sk-test", "gpt-3.5-turbo", format!("{}/v1", server.uri())).unwrap()
}

fn completion_body(text: &str) -> Value {
    json!({"choices": [{"message": {"content": text}}]})
}

#[tokio::test]
async fn successful_synthesis_returns_trimmed_story() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion_body("  A fine story.  ")))
        .mount(&mock_server)
        .await;

    let story = synthesizer_for(&mock_server)
        .synthesize(&content("Some article text."))
        .await;

    assert_eq!(story.status, StoryStatus::Ok);
    assert_eq!(story.body, "A fine story.");
}

#[tokio::test]
async fn empty_content_never_calls_the_service() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion_body("unused")))
        .expect(0)
        .mount(&mock_server)
        .await;

    let story = synthesizer_for(&mock_server).synthesize(&content("")).await;

    assert_eq!(story.status, StoryStatus::NoContent);
    assert_eq!(story.body, NO_CONTENT_SENTINEL);
    assert!(mock_server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn rate_limit_maps_to_its_own_sentinel() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(429))
        .mount(&mock_server)
        .await;

    let story = synthesizer_for(&mock_server)
        .synthesize(&content("Some article text."))
        .await;

    assert_eq!(story.status, StoryStatus::UpstreamError);
    assert_eq!(story.body, RATE_LIMIT_SENTINEL);
}

#[tokio::test]
async fn non_success_status_maps_to_status_sentinel() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&mock_server)
        .await;

    let story = synthesizer_for(&mock_server)
        .synthesize(&content("Some article text."))
        .await;

    assert_eq!(story.status, StoryStatus::UpstreamError);
    assert_eq!(story.body, STATUS_ERROR_SENTINEL);
}

#[tokio::test]
async fn malformed_response_maps_to_generic_sentinel() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&mock_server)
        .await;

    let story = synthesizer_for(&mock_server)
        .synthesize(&content("Some article text."))
        .await;

    assert_eq!(story.status, StoryStatus::UpstreamError);
    assert_eq!(story.body, GENERIC_ERROR_SENTINEL);
}

#[tokio::test]
async fn connection_failure_maps_to_connection_sentinel() {
    // Nothing listens here.
    let synthesizer = Synthesizer::new("sk-test", "gpt-3.5-turbo", "http://127.0.0.1:1/v1").unwrap();

    let story = synthesizer.synthesize(&content("Some article text.")).await;

    assert_eq!(story.status, StoryStatus::UpstreamError);
    assert_eq!(story.body, CONNECTION_ERROR_SENTINEL);
}

#[tokio::test]
async fn overlong_content_is_truncated_in_the_request() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion_body("story")))
        .mount(&mock_server)
        .await;

    let text = "y".repeat(9000);
    synthesizer_for(&mock_server).synthesize(&content(&text)).await;

    let requests = mock_server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1);
    let body: Value = serde_json::from_slice(&requests[0].body).unwrap();
    let prompt = body["messages"][1]["content"].as_str().unwrap();
    let article = prompt.split("Article Content:\n").nth(1).unwrap();
    assert_eq!(article.chars().count(), 8000);
}

#[tokio::test]
async fn content_at_the_cap_is_sent_unmodified() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion_body("story")))
        .mount(&mock_server)
        .await;

    let text = "z".repeat(8000);
    synthesizer_for(&mock_server).synthesize(&content(&text)).await;

    let requests = mock_server.received_requests().await.unwrap();
    let body: Value = serde_json::from_slice(&requests[0].body).unwrap();
    let prompt = body["messages"][1]["content"].as_str().unwrap();
    let article = prompt.split("Article Content:\n").nth(1).unwrap();
    assert_eq!(article, text);
}

#[tokio::test]
async fn request_carries_fixed_generation_parameters() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion_body("story")))
        .mount(&mock_server)
        .await;

    synthesizer_for(&mock_server)
        .synthesize(&content("Some article text."))
        .await;

    let requests = mock_server.received_requests().await.unwrap();
    let body: Value = serde_json::from_slice(&requests[0].body).unwrap();
    assert_eq!(body["model"], "gpt-3.5-turbo");
    assert_eq!(body["max_tokens"], 1000);
    assert!((body["temperature"].as_f64().unwrap() - 0.7).abs() < 1e-6);
    assert_eq!(body["messages"][0]["role"], "system");
}
