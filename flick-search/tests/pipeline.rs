mod common;

use flick_http::HttpClient;
use flick_search::{
    FixedPicker, GenerationTracker, SearchError, SearchMode, SearchPipeline, SeededPicker,
    SelectedPhoto,
};
use serde_json::json;
use std::sync::Arc;
use wiremock::matchers::{method, path, query_param, query_param_is_missing};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn photos(n: usize) -> serde_json::Value {
    let photo: Vec<_> = (0..n)
        .map(|i| {
            json!({
                "id": i.to_string(),
                "owner": "12345@N00",
                "title": format!("photo {i}"),
                "url_m": format!("https://live.staticflickr.com/65535/{i}_m.jpg"),
            })
        })
        .collect();
    json!({
        "photos": {"page": 1, "pages": 1, "perpage": 100, "total": n, "photo": photo},
        "stat": "ok"
    })
}

#[tokio::test]
async fn phrase_search_sends_the_full_query_and_picks_a_photo() {
    common::init_test_tracing();
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/services/rest"))
        .and(query_param("method", "flickr.photos.search"))
        .and(query_param("api_key", "test-key"))
        .and(query_param("safe_search", "1"))
        .and(query_param("extras", "url_m"))
        .and(query_param("format", "json"))
        .and(query_param("nojsoncallback", "1"))
        .and(query_param("text", "red panda"))
        .and(query_param_is_missing("bbox"))
        .respond_with(ResponseTemplate::new(200).set_body_json(photos(5)))
        .expect(1)
        .mount(&server)
        .await;

    let http = HttpClient::new(&server.uri()).unwrap();
    let pipeline =
        SearchPipeline::with_picker(common::settings_for(&server), http, FixedPicker(3));

    let got = pipeline.run(&SearchMode::phrase("red panda")).await.unwrap();
    assert_eq!(
        got,
        SelectedPhoto {
            title: "photo 3".into(),
            image_url: "https://live.staticflickr.com/65535/3_m.jpg".into(),
        }
    );
}

#[tokio::test]
async fn location_search_sends_a_bounding_box() {
    common::init_test_tracing();
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/services/rest"))
        .and(query_param("bbox", "-44,-23.5,-42,-21.5"))
        .and(query_param_is_missing("text"))
        .respond_with(ResponseTemplate::new(200).set_body_json(photos(1)))
        .expect(1)
        .mount(&server)
        .await;

    let http = HttpClient::new(&server.uri()).unwrap();
    let pipeline = SearchPipeline::new(common::settings_for(&server), http);

    let got = pipeline
        .run(&SearchMode::location(-22.5, -43.0))
        .await
        .unwrap();
    assert_eq!(got.title, "photo 0");
}

#[tokio::test]
async fn server_error_is_reported_once() {
    common::init_test_tracing();
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500).set_body_string("oops"))
        .expect(1)
        .mount(&server)
        .await;

    let http = HttpClient::new(&server.uri()).unwrap();
    let pipeline = SearchPipeline::new(common::settings_for(&server), http);

    let err = pipeline.run(&SearchMode::phrase("x")).await.unwrap_err();
    assert_eq!(err, SearchError::HttpStatus(500));
    assert_eq!(err.user_message(), "No photo returned. Try again!");
}

#[tokio::test]
async fn api_failure_envelope_becomes_api_status() {
    common::init_test_tracing();
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "stat": "fail",
            "code": 100,
            "message": "Invalid API Key (Key has invalid format)"
        })))
        .mount(&server)
        .await;

    let http = HttpClient::new(&server.uri()).unwrap();
    let pipeline = SearchPipeline::new(common::settings_for(&server), http);

    let err = pipeline.run(&SearchMode::phrase("x")).await.unwrap_err();
    assert_eq!(
        err,
        SearchError::ApiStatus {
            stat: Some("fail".into()),
            code: Some(100),
            message: "Invalid API Key (Key has invalid format)".into(),
        }
    );
}

#[tokio::test]
async fn empty_result_list_is_no_results() {
    common::init_test_tracing();
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(photos(0)))
        .mount(&server)
        .await;

    let http = HttpClient::new(&server.uri()).unwrap();
    let pipeline = SearchPipeline::new(common::settings_for(&server), http);

    assert_eq!(
        pipeline.run(&SearchMode::phrase("zzzz")).await,
        Err(SearchError::NoResults)
    );
}

#[tokio::test]
async fn empty_body_is_reported() {
    common::init_test_tracing();
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    let http = HttpClient::new(&server.uri()).unwrap();
    let pipeline = SearchPipeline::new(common::settings_for(&server), http);

    assert_eq!(
        pipeline.run(&SearchMode::phrase("x")).await,
        Err(SearchError::EmptyBody)
    );
}

#[tokio::test]
async fn invalid_input_makes_no_request() {
    common::init_test_tracing();
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(photos(1)))
        .expect(0)
        .mount(&server)
        .await;

    let http = HttpClient::new(&server.uri()).unwrap();
    let pipeline = SearchPipeline::new(common::settings_for(&server), http);

    for mode in [
        SearchMode::phrase(""),
        SearchMode::location(91.0, 0.0),
        SearchMode::location(0.0, 181.0),
        SearchMode::location(f64::NAN, 0.0),
    ] {
        let err = pipeline.run(&mode).await.unwrap_err();
        assert!(matches!(err, SearchError::Validation(_)), "{mode:?} -> {err:?}");
    }
}

#[tokio::test]
async fn whitespace_phrase_is_sent_verbatim() {
    common::init_test_tracing();
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(query_param("text", "   "))
        .respond_with(ResponseTemplate::new(200).set_body_json(photos(1)))
        .expect(1)
        .mount(&server)
        .await;

    let http = HttpClient::new(&server.uri()).unwrap();
    let pipeline = SearchPipeline::new(common::settings_for(&server), http);

    let got = pipeline.run(&SearchMode::phrase("   ")).await.unwrap();
    assert_eq!(got.title, "photo 0");
}

#[tokio::test]
async fn unreachable_server_is_a_transport_error() {
    common::init_test_tracing();
    let mut settings = flick_search::SearchSettings::new("k");
    settings.endpoint = url::Url::parse("http://127.0.0.1:9/services/rest").unwrap();
    let http = HttpClient::new("http://127.0.0.1:9").unwrap();
    let pipeline = SearchPipeline::new(settings, http);

    let err = pipeline.run(&SearchMode::phrase("x")).await.unwrap_err();
    assert!(matches!(err, SearchError::Transport(_)), "{err:?}");
}

#[tokio::test]
async fn seeded_pickers_agree() {
    common::init_test_tracing();
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(photos(20)))
        .mount(&server)
        .await;

    let a = SearchPipeline::with_picker(
        common::settings_for(&server),
        HttpClient::new(&server.uri()).unwrap(),
        SeededPicker::new(42),
    );
    let b = SearchPipeline::with_picker(
        common::settings_for(&server),
        HttpClient::new(&server.uri()).unwrap(),
        SeededPicker::new(42),
    );
    for _ in 0..5 {
        let mode = SearchMode::phrase("same");
        assert_eq!(a.run(&mode).await, b.run(&mode).await);
    }
}

#[tokio::test]
async fn concurrent_searches_only_the_newest_is_current() {
    common::init_test_tracing();
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(query_param("text", "slow"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(photos(1))
                .set_delay(std::time::Duration::from_millis(300)),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(query_param("text", "fast"))
        .respond_with(ResponseTemplate::new(200).set_body_json(photos(2)))
        .mount(&server)
        .await;

    let pipeline = Arc::new(SearchPipeline::new(
        common::settings_for(&server),
        HttpClient::new(&server.uri()).unwrap(),
    ));
    let tracker = Arc::new(GenerationTracker::new());

    let slow = {
        let (p, t) = (pipeline.clone(), tracker.clone());
        tokio::spawn(async move { p.run_tracked(&SearchMode::phrase("slow"), &t).await })
    };
    tokio::time::sleep(std::time::Duration::from_millis(50)).await;
    let fast = pipeline
        .run_tracked(&SearchMode::phrase("fast"), &tracker)
        .await;
    let slow = slow.await.unwrap();

    assert!(slow.result.is_ok());
    assert!(!slow.is_current(&tracker));
    assert!(fast.is_current(&tracker));
}
