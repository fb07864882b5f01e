//! Integration tests for HttpService + BlockingHttpService against a real server.
//!
//! Each test spawns an in-process fake recommendation service and a proxy in
//! front of it on 127.0.0.1:0, then exercises the HTTP client layer through
//! the full request/response cycle.

use axum::http::StatusCode;
use serde_json::json;
use tastetag_core::{Preference, Session, SessionEvent};
use tastetag_server::test_helpers::{spawn_stack, FakeUpstream};
use tastetag_service::{BlockingHttpService, HttpService, RecommendationService, ServiceError};

// ---- Async HttpService tests ----

#[tokio::test]
async fn health_check_via_http() {
    let fake = FakeUpstream::new();
    let (upstream, proxy) = spawn_stack(&fake).await;
    let svc = HttpService::new(&proxy.base_url, &upstream.base_url);
    svc.health_check().await.unwrap();
}

#[tokio::test]
async fn fetch_listing_through_proxy() {
    let fake = FakeUpstream::new().with_restaurants("foodie123", &["Tartine", "Zuni"]);
    let (upstream, proxy) = spawn_stack(&fake).await;
    let svc = HttpService::new(&proxy.base_url, &upstream.base_url);

    let listing = svc.fetch_listing("foodie123").await.unwrap();
    assert_eq!(listing.len(), 2);
    assert_eq!(listing.recommendations[1].name, "Zuni");
    assert_eq!(listing.username.as_deref(), Some("foodie123"));
    assert!(listing.extra.contains_key("output_files"));
    assert!(!listing.extra.contains_key("places"));
    assert!(listing.recommendations.iter().all(|r| !r.is_rated()));
}

#[tokio::test]
async fn fetch_listing_upstream_500() {
    let fake = FakeUpstream::new().failing_tag("foodie123");
    let (upstream, proxy) = spawn_stack(&fake).await;
    let svc = HttpService::new(&proxy.base_url, &upstream.base_url);

    let err = svc.fetch_listing("foodie123").await.unwrap_err();
    assert_eq!(err.status(), Some(500));
}

#[tokio::test]
async fn full_flow_sends_liked_items_to_rewrite() {
    let fake = FakeUpstream::new().with_restaurants("foodie123", &["Tartine", "Zuni"]);
    let (upstream, proxy) = spawn_stack(&fake).await;
    let svc = HttpService::new(&proxy.base_url, &upstream.base_url);

    let mut session = Session::new();
    session
        .apply(SessionEvent::SubmitTag("foodie123".into()))
        .unwrap();
    let tag = session.listing_request().unwrap().to_string();
    let listing = svc.fetch_listing(&tag).await.unwrap();
    session.apply(SessionEvent::ListingLoaded(listing)).unwrap();
    for index in 0..2 {
        session
            .apply(SessionEvent::SetPreference {
                index,
                preference: Preference::Like,
            })
            .unwrap();
    }

    let revision = svc.rewrite(session.submission().unwrap()).await.unwrap();
    assert_eq!(revision.current_prompt, "Describe this customer.");
    session.apply(SessionEvent::Evaluated(revision)).unwrap();

    let sent = fake.rewrite_requests();
    assert_eq!(sent.len(), 1);
    let items = sent[0]["recommendations"].as_array().unwrap();
    assert_eq!(items.len(), 2);
    assert!(items.iter().all(|item| item["preference"] == "like"));
    assert_eq!(sent[0]["username"], "foodie123");
    assert_eq!(
        sent[0]["output_files"]["analysis"],
        "outputs/foodie123_analysis.json"
    );
}

#[tokio::test]
async fn rewrite_non_success_status() {
    let fake = FakeUpstream::new()
        .with_restaurants("foodie123", &["Tartine"])
        .failing_rewrite(StatusCode::BAD_GATEWAY);
    let (upstream, proxy) = spawn_stack(&fake).await;
    let svc = HttpService::new(&proxy.base_url, &upstream.base_url);

    let listing = svc.fetch_listing("foodie123").await.unwrap();
    let err = svc.rewrite(&listing).await.unwrap_err();
    assert_eq!(err.status(), Some(502));
}

#[tokio::test]
async fn rewrite_unexpected_shape() {
    let fake = FakeUpstream::new()
        .with_restaurants("foodie123", &["Tartine"])
        .with_rewrite_reply(json!({ "prompt": "missing fields" }));
    let (upstream, proxy) = spawn_stack(&fake).await;
    let svc = HttpService::new(&proxy.base_url, &upstream.base_url);

    let listing = svc.fetch_listing("foodie123").await.unwrap();
    let err = svc.rewrite(&listing).await.unwrap_err();
    assert!(matches!(err, ServiceError::Malformed(_)));
}

#[tokio::test]
async fn unreachable_proxy_is_transport_error() {
    let svc = HttpService::new("http://127.0.0.1:9", "http://127.0.0.1:9");
    let err = svc.fetch_listing("foodie123").await.unwrap_err();
    assert!(matches!(err, ServiceError::Transport(_)));
}

// ---- Blocking wrapper ----

/// BlockingHttpService owns a runtime, so the servers run on their own
/// thread's runtime.
fn spawn_stack_on_thread(fake: FakeUpstream) -> (String, String) {
    let (tx, rx) = std::sync::mpsc::sync_channel(1);
    std::thread::spawn(move || {
        let rt = tokio::runtime::Runtime::new().unwrap();
        rt.block_on(async {
            let (upstream, proxy) = spawn_stack(&fake).await;
            tx.send((upstream.base_url.clone(), proxy.base_url.clone()))
                .unwrap();
            std::future::pending::<()>().await;
        });
    });
    rx.recv().unwrap()
}

#[test]
fn blocking_fetch_and_rewrite() {
    let fake = FakeUpstream::new().with_restaurants("foodie123", &["Tartine"]);
    let (upstream_url, proxy_url) = spawn_stack_on_thread(fake.clone());
    let svc = BlockingHttpService::new(&proxy_url, &upstream_url).unwrap();

    svc.health_check().unwrap();
    let mut listing = svc.fetch_listing("foodie123").unwrap();
    listing.recommendations[0].preference = Preference::Dislike;
    let revision = svc.rewrite(&listing).unwrap();
    assert!(revision.new_prompt.contains("bakeries"));
    assert_eq!(
        fake.rewrite_requests()[0]["recommendations"][0]["preference"],
        "dislike"
    );
}
