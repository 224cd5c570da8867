use std::time::Duration;

use stale::{HttpProber, ProbeOutcome, Prober};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn test_head_request_reports_status() {
    let server = MockServer::start().await;
    Mock::given(method("HEAD"))
        .and(path("/dead"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&server)
        .await;

    let prober = HttpProber::new(Duration::from_secs(5)).unwrap();
    let outcome = prober.probe(&format!("{}/dead", server.uri())).await;
    assert_eq!(outcome, ProbeOutcome::Status(404));
}

#[tokio::test]
async fn test_redirects_are_followed() {
    let server = MockServer::start().await;
    Mock::given(method("HEAD"))
        .and(path("/moved"))
        .respond_with(
            ResponseTemplate::new(301).insert_header("location", format!("{}/gone", server.uri())),
        )
        .mount(&server)
        .await;
    Mock::given(method("HEAD"))
        .and(path("/gone"))
        .respond_with(ResponseTemplate::new(410))
        .mount(&server)
        .await;

    let prober = HttpProber::new(Duration::from_secs(5)).unwrap();
    let outcome = prober.probe(&format!("{}/moved", server.uri())).await;
    assert_eq!(outcome, ProbeOutcome::Status(410));
}

#[tokio::test]
async fn test_server_errors_are_statuses() {
    let server = MockServer::start().await;
    Mock::given(method("HEAD"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let prober = HttpProber::new(Duration::from_secs(5)).unwrap();
    let outcome = prober.probe(&server.uri()).await;
    assert_eq!(outcome, ProbeOutcome::Status(503));
}

#[tokio::test]
async fn test_slow_server_times_out() {
    let server = MockServer::start().await;
    Mock::given(method("HEAD"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(2)))
        .mount(&server)
        .await;

    let prober = HttpProber::new(Duration::from_millis(200)).unwrap();
    let outcome = prober.probe(&format!("{}/slow", server.uri())).await;
    assert_eq!(outcome, ProbeOutcome::Timeout);
}

#[tokio::test]
async fn test_refused_connection_is_transport_error() {
    // Nothing listens on the discard port.
    let prober = HttpProber::new(Duration::from_secs(5)).unwrap();
    match prober.probe("http://127.0.0.1:9/").await {
        ProbeOutcome::Transport(detail) => assert!(!detail.is_empty()),
        other => panic!("expected transport error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_unsupported_scheme_is_transport_error() {
    let prober = HttpProber::new(Duration::from_secs(5)).unwrap();
    assert!(matches!(
        prober.probe("ftp://files.example/readme").await,
        ProbeOutcome::Transport(_)
    ));
}

#[tokio::test]
async fn test_redirect_chain_is_followed_to_the_end() {
    let server = MockServer::start().await;
    for hop in 0..4 {
        Mock::given(method("HEAD"))
            .and(path(format!("/hop/{}", hop)))
            .respond_with(
                ResponseTemplate::new(302)
                    .insert_header("location", format!("{}/hop/{}", server.uri(), hop + 1)),
            )
            .expect(1)
            .mount(&server)
            .await;
    }
    Mock::given(method("HEAD"))
        .and(path("/hop/4"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&server)
        .await;

    let prober = HttpProber::new(Duration::from_secs(5)).unwrap();
    let outcome = prober.probe(&format!("{}/hop/0", server.uri())).await;
    assert_eq!(outcome, ProbeOutcome::Status(404));
}

#[tokio::test]
async fn test_redirect_loop_is_transport_error() {
    let server = MockServer::start().await;
    Mock::given(method("HEAD"))
        .and(path("/loop"))
        .respond_with(
            ResponseTemplate::new(301).insert_header("location", format!("{}/loop", server.uri())),
        )
        .mount(&server)
        .await;

    let prober = HttpProber::new(Duration::from_secs(5)).unwrap();
    match prober.probe(&format!("{}/loop", server.uri())).await {
        ProbeOutcome::Transport(detail) => assert!(!detail.is_empty()),
        other => panic!("expected transport error, got {:?}", other),
    }
}
