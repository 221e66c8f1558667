//! End-to-end pipeline tests against mock provider servers.
//!
//! Both upstreams are wiremock servers speaking the real wire formats:
//! the news search endpoint and an OpenAI-compatible chat completions
//! endpoint. The decision and scoring stages are told apart by their
//! prompt wording ("exactly one word" vs "Respond with only the number").

use std::time::Duration;

use serde_json::json;
use wiremock::matchers::{body_string_contains, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use newsdesk::{build_pipeline, PipelineConfig};

const SEARCH_PATH: &str = "/res/v1/news/search";
const CHAT_PATH: &str = "/chat/completions";

fn config_for(search: &MockServer, reasoning: &MockServer) -> PipelineConfig {
    PipelineConfig {
        search_api_key: "search-key".into(),
        search_base_url: search.uri(),
        search_interval: Duration::from_millis(10),
        reasoning_api_key: "reasoning-key".into(),
        reasoning_base_url: reasoning.uri(),
        eval_hold: Duration::from_millis(10),
        ..Default::default()
    }
}

fn news_body(items: &[(&str, &str)]) -> serde_json::Value {
    let results: Vec<serde_json::Value> = items
        .iter()
        .map(|(title, url)| {
            json!({
                "title": title,
                "url": url,
                "description": format!("coverage of {title}"),
                "page_age": "2026-08-01T09:00:00",
                "age": "3 days ago",
                "extra_snippets": ["snippet line"],
            })
        })
        .collect();
    json!({ "results": results })
}

fn chat_body(content: &str) -> serde_json::Value {
    json!({
        "id": "chatcmpl-test",
        "choices": [{
            "index": 0,
            "message": {"role": "assistant", "content": content},
            "finish_reason": "stop",
        }],
    })
}

/// Mount a decision answer for prompts mentioning `needle`.
async fn mount_decision(server: &MockServer, needle: &str, verdict: &str) {
    Mock::given(method("POST"))
        .and(path(CHAT_PATH))
        .and(body_string_contains("exactly one word"))
        .and(body_string_contains(needle))
        .respond_with(ResponseTemplate::new(200).set_body_json(chat_body(verdict)))
        .mount(server)
        .await;
}

/// Mount a scoring answer for prompts mentioning `needle`.
async fn mount_score(server: &MockServer, needle: &str, score: &str) {
    Mock::given(method("POST"))
        .and(path(CHAT_PATH))
        .and(body_string_contains("Respond with only the number"))
        .and(body_string_contains(needle))
        .respond_with(ResponseTemplate::new(200).set_body_json(chat_body(score)))
        .mount(server)
        .await;
}

fn subjects(names: &[&str]) -> Vec<String> {
    names.iter().map(|s| s.to_string()).collect()
}

#[tokio::test(flavor = "multi_thread")]
async fn run_covers_every_subject_and_recovers_search_failure() {
    let search = MockServer::start().await;
    let reasoning = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(SEARCH_PATH))
        .and(query_param("q", "acme"))
        .and(header("X-Subscription-Token", "search-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(news_body(&[(
            "Acme raises Series C",
            "https://wire.example/acme-series-c",
        )])))
        .mount(&search)
        .await;
    Mock::given(method("GET"))
        .and(path(SEARCH_PATH))
        .and(query_param("q", "globex"))
        .respond_with(ResponseTemplate::new(200).set_body_json(news_body(&[])))
        .mount(&search)
        .await;
    // The provider melts down for one subject; the run must not.
    Mock::given(method("GET"))
        .and(path(SEARCH_PATH))
        .and(query_param("q", "zeta"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&search)
        .await;

    mount_decision(&reasoning, "acme-series-c", "keep").await;
    mount_score(&reasoning, "acme-series-c", "8").await;

    let pipeline = build_pipeline(&config_for(&search, &reasoning)).expect("build");
    let report = pipeline
        .run(&subjects(&["acme", "globex", "zeta"]))
        .await
        .expect("run");

    assert_eq!(report.subjects.len(), 3);
    assert_eq!(report.report("zeta").map(<[_]>::len), Some(0));
    assert_eq!(report.report("globex").map(<[_]>::len), Some(0));

    let acme = report.report("acme").expect("acme entry");
    assert_eq!(acme.len(), 1);
    assert!(acme[0].keep);
    assert!((acme[0].score - 8.0).abs() < f64::EPSILON);
}

#[tokio::test(flavor = "multi_thread")]
async fn shared_url_is_evaluated_exactly_once() {
    let search = MockServer::start().await;
    let reasoning = MockServer::start().await;

    // The same article surfaces for both subjects.
    for subject in ["acme", "globex"] {
        Mock::given(method("GET"))
            .and(path(SEARCH_PATH))
            .and(query_param("q", subject))
            .respond_with(ResponseTemplate::new(200).set_body_json(news_body(&[(
                "Industry shakeup",
                "https://wire.example/industry-shakeup",
            )])))
            .mount(&search)
            .await;
    }

    Mock::given(method("POST"))
        .and(path(CHAT_PATH))
        .and(body_string_contains("exactly one word"))
        .respond_with(ResponseTemplate::new(200).set_body_json(chat_body("keep")))
        .expect(1)
        .mount(&reasoning)
        .await;
    Mock::given(method("POST"))
        .and(path(CHAT_PATH))
        .and(body_string_contains("Respond with only the number"))
        .respond_with(ResponseTemplate::new(200).set_body_json(chat_body("7")))
        .expect(1)
        .mount(&reasoning)
        .await;

    let pipeline = build_pipeline(&config_for(&search, &reasoning)).expect("build");
    let report = pipeline
        .run(&subjects(&["acme", "globex"]))
        .await
        .expect("run");

    // Attributed to the first subject that surfaced it, excluded from the rest.
    assert_eq!(report.report("acme").map(<[_]>::len), Some(1));
    assert_eq!(report.report("globex").map(<[_]>::len), Some(0));
    // The .expect(1) mocks verify the single evaluation on drop.
}

#[tokio::test(flavor = "multi_thread")]
async fn kept_and_removed_results_split_correctly() {
    let search = MockServer::start().await;
    let reasoning = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(SEARCH_PATH))
        .and(query_param("q", "acme"))
        .respond_with(ResponseTemplate::new(200).set_body_json(news_body(&[
            ("Acme quarterly results", "https://wire.example/story-a"),
            ("Celebrity gossip", "https://wire.example/story-b"),
        ])))
        .mount(&search)
        .await;

    mount_decision(&reasoning, "story-a", "keep").await;
    mount_decision(&reasoning, "story-b", "remove").await;
    mount_score(&reasoning, "story-a", "8").await;

    let pipeline = build_pipeline(&config_for(&search, &reasoning)).expect("build");
    let report = pipeline.run(&subjects(&["acme"])).await.expect("run");

    let acme = report.report("acme").expect("acme entry");
    assert_eq!(acme.len(), 1);
    assert_eq!(acme[0].item.url, "https://wire.example/story-a");
    assert!((acme[0].score - 8.0).abs() < f64::EPSILON);
}

#[tokio::test(flavor = "multi_thread")]
async fn reasoning_failure_fails_closed() {
    let search = MockServer::start().await;
    let reasoning = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(SEARCH_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(news_body(&[(
            "Acme story",
            "https://wire.example/acme-story",
        )])))
        .mount(&search)
        .await;
    // Every reasoning call errors out.
    Mock::given(method("POST"))
        .and(path(CHAT_PATH))
        .respond_with(ResponseTemplate::new(500))
        .mount(&reasoning)
        .await;

    let pipeline = build_pipeline(&config_for(&search, &reasoning)).expect("build");
    let report = pipeline.run(&subjects(&["acme"])).await.expect("run");

    // An erroring evaluation must never surface the item.
    assert_eq!(report.report("acme").map(<[_]>::len), Some(0));
}

#[tokio::test(flavor = "multi_thread")]
async fn scoring_failure_demotes_but_keeps() {
    let search = MockServer::start().await;
    let reasoning = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(SEARCH_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(news_body(&[(
            "Acme story",
            "https://wire.example/acme-story",
        )])))
        .mount(&search)
        .await;
    mount_decision(&reasoning, "acme-story", "keep").await;
    Mock::given(method("POST"))
        .and(path(CHAT_PATH))
        .and(body_string_contains("Respond with only the number"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&reasoning)
        .await;

    let pipeline = build_pipeline(&config_for(&search, &reasoning)).expect("build");
    let report = pipeline.run(&subjects(&["acme"])).await.expect("run");

    let acme = report.report("acme").expect("acme entry");
    assert_eq!(acme.len(), 1, "relevance was confirmed, item stays");
    assert!((acme[0].score - 0.0).abs() < f64::EPSILON);
}

#[tokio::test(flavor = "multi_thread")]
async fn report_is_ranked_and_truncated() {
    let search = MockServer::start().await;
    let reasoning = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(SEARCH_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(news_body(&[
            ("Story A", "https://wire.example/item-a"),
            ("Story B", "https://wire.example/item-b"),
            ("Story C", "https://wire.example/item-c"),
            ("Story D", "https://wire.example/item-d"),
            ("Story E", "https://wire.example/item-e"),
        ])))
        .mount(&search)
        .await;

    Mock::given(method("POST"))
        .and(path(CHAT_PATH))
        .and(body_string_contains("exactly one word"))
        .respond_with(ResponseTemplate::new(200).set_body_json(chat_body("keep")))
        .mount(&reasoning)
        .await;
    for (needle, score) in [
        ("item-a", "5"),
        ("item-b", "9"),
        ("item-c", "9"),
        ("item-d", "3"),
        ("item-e", "7"),
    ] {
        mount_score(&reasoning, needle, score).await;
    }

    let pipeline = build_pipeline(&config_for(&search, &reasoning)).expect("build");
    let report = pipeline.run(&subjects(&["acme"])).await.expect("run");

    // Scores [5, 9, 9, 3, 7] with the default cap of 3 → [9, 9, 7],
    // the equal nines keeping their discovery order.
    let urls: Vec<&str> = report
        .report("acme")
        .expect("acme entry")
        .iter()
        .map(|e| e.item.url.as_str())
        .collect();
    assert_eq!(
        urls,
        vec![
            "https://wire.example/item-b",
            "https://wire.example/item-c",
            "https://wire.example/item-e",
        ]
    );
}

#[tokio::test(flavor = "multi_thread")]
async fn search_requests_carry_freshness_and_auth() {
    let search = MockServer::start().await;
    let reasoning = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(SEARCH_PATH))
        .and(query_param("q", "acme"))
        .and(query_param("freshness", "pw"))
        .and(header("X-Subscription-Token", "search-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(news_body(&[])))
        .expect(1)
        .mount(&search)
        .await;

    let pipeline = build_pipeline(&config_for(&search, &reasoning)).expect("build");
    let report = pipeline.run(&subjects(&["acme"])).await.expect("run");
    assert_eq!(report.report("acme").map(<[_]>::len), Some(0));
}

#[tokio::test(flavor = "multi_thread")]
async fn reasoning_requests_carry_bearer_auth() {
    let search = MockServer::start().await;
    let reasoning = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(SEARCH_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(news_body(&[(
            "Acme story",
            "https://wire.example/acme-story",
        )])))
        .mount(&search)
        .await;
    Mock::given(method("POST"))
        .and(path(CHAT_PATH))
        .and(header("authorization", "Bearer reasoning-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(chat_body("remove")))
        .expect(1)
        .mount(&reasoning)
        .await;

    let pipeline = build_pipeline(&config_for(&search, &reasoning)).expect("build");
    let report = pipeline.run(&subjects(&["acme"])).await.expect("run");
    assert_eq!(report.report("acme").map(<[_]>::len), Some(0));
}

#[tokio::test(flavor = "multi_thread")]
async fn concurrent_searches_are_spread_by_the_interval_limiter() {
    let search = MockServer::start().await;
    let reasoning = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(SEARCH_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(news_body(&[])))
        .mount(&search)
        .await;

    let interval = Duration::from_millis(50);
    let mut config = config_for(&search, &reasoning);
    config.search_interval = interval;

    let pipeline = build_pipeline(&config).expect("build");
    let started = std::time::Instant::now();
    pipeline
        .run(&subjects(&["acme", "globex", "initech"]))
        .await
        .expect("run");

    // Three concurrent searches through a one-per-interval gate must take
    // at least two intervals end to end.
    assert!(
        started.elapsed() >= interval * 2,
        "searches were not rate limited: {:?}",
        started.elapsed()
    );
}
