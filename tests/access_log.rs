//! Access logging through a live listener.

use std::fs;
use std::time::Duration;

use site_server::http::{Chain, StaticSite};
use site_server::lifecycle::Outcome;
use site_server::observability::{AccessLog, DefaultComposer, LogRecord, MemorySink};

mod common;

use common::{client, start_server, Exploding};

fn status_only(record: &LogRecord) -> String {
    format!("{} {} {}", record.method, record.path, record.status.as_u16())
}

#[tokio::test]
async fn logs_static_site_requests() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("index.html"), "home").unwrap();
    fs::write(dir.path().join("about.html"), "about").unwrap();

    let sink = MemorySink::new();
    let handler = Chain::new()
        .with(AccessLog::new(sink.clone(), DefaultComposer::default()))
        .then(StaticSite::new(dir.path()));
    let server = start_server(handler, Duration::from_secs(2)).await;

    let http = client();
    let home = http.get(server.url("/")).send().await.unwrap();
    assert_eq!(home.status(), 200);
    assert_eq!(home.text().await.unwrap(), "home");

    let about = http.get(server.url("/about")).send().await.unwrap();
    assert_eq!(about.status(), 200);
    assert_eq!(about.text().await.unwrap(), "about");

    let missing = http.get(server.url("/foo")).send().await.unwrap();
    assert_eq!(missing.status(), 404);

    assert_eq!(server.stop().await, Outcome::Clean);

    let lines = sink.lines();
    assert_eq!(lines.len(), 3, "{lines:?}");
    assert!(lines[0].starts_with("[GET]\t/\t\tcode: 200\t"), "{}", lines[0]);
    assert!(lines[1].starts_with("[GET]\t/about\t\tcode: 200\t"), "{}", lines[1]);
    assert!(lines[2].starts_with("[GET]\t/foo\t\tcode: 404\t"), "{}", lines[2]);
}

#[tokio::test]
async fn panicking_handler_is_logged_and_answered_with_500() {
    let sink = MemorySink::new();
    let handler = Chain::new()
        .with(AccessLog::new(sink.clone(), status_only))
        .then(Exploding);
    let server = start_server(handler, Duration::from_secs(2)).await;

    let response = client()
        .post(server.url("/explode"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 500);

    // The server keeps serving after a handler panic.
    let again = client().get(server.url("/explode")).send().await.unwrap();
    assert_eq!(again.status(), 500);

    assert_eq!(server.stop().await, Outcome::Clean);
    assert_eq!(sink.lines(), vec!["POST /explode 500", "GET /explode 500"]);
}

#[tokio::test]
async fn two_loggers_with_different_sinks() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("index.html"), "home").unwrap();

    let outer = MemorySink::new();
    let inner = MemorySink::new();
    let handler = Chain::new()
        .with(AccessLog::new(outer.clone(), status_only))
        .with(AccessLog::new(inner.clone(), |r: &LogRecord| r.path.clone()))
        .then(StaticSite::new(dir.path()));
    let server = start_server(handler, Duration::from_secs(2)).await;

    client().get(server.url("/")).send().await.unwrap();
    assert_eq!(server.stop().await, Outcome::Clean);

    assert_eq!(outer.lines(), vec!["GET / 200"]);
    assert_eq!(inner.lines(), vec!["/"]);
}
