//! Time source acquisition against a mock time service: the network path
//! and every local-clock fallback path.

use std::time::Duration;

use agecalc::time_source::FixedClock;
use agecalc::{AcquiredInstant, Config, InstantSource, TimeSource, Widget};
use chrono::{DateTime, TimeZone, Utc};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const UTC_PATH: &str = "/api/timezone/Etc/UTC";

fn local_now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2001, 9, 9, 1, 46, 40).unwrap()
}

fn source_for(url: String) -> TimeSource<FixedClock> {
    let config = Config {
        time_url: Some(url),
        timeout: Duration::from_millis(500),
        ..Config::default()
    };
    TimeSource::new(&config)
        .unwrap()
        .with_clock(FixedClock(local_now()))
}

async fn mount(server: &MockServer, response: ResponseTemplate) {
    Mock::given(method("GET"))
        .and(path(UTC_PATH))
        .respond_with(response)
        .expect(1)
        .mount(server)
        .await;
}

fn assert_fell_back(got: AcquiredInstant) {
    assert_eq!(
        got,
        AcquiredInstant {
            instant: local_now(),
            source: InstantSource::LocalClock,
        }
    );
}

#[tokio::test]
async fn uses_network_time_when_available() {
    let server = MockServer::start().await;
    mount(
        &server,
        ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "abbreviation": "UTC",
            "datetime": "2024-03-01T12:00:00.123456+00:00",
            "utc_datetime": "2024-03-01T12:00:00.123456+00:00",
            "unixtime": 1709294400
        })),
    )
    .await;

    let got = source_for(format!("{}{UTC_PATH}", server.uri()))
        .acquire()
        .await;

    assert_eq!(got.source, InstantSource::Network);
    assert_eq!(
        got.instant.format("%Y-%m-%dT%H:%M:%S").to_string(),
        "2024-03-01T12:00:00"
    );
}

#[tokio::test]
async fn falls_back_on_server_error() {
    let server = MockServer::start().await;
    mount(&server, ResponseTemplate::new(503)).await;

    let got = source_for(format!("{}{UTC_PATH}", server.uri()))
        .acquire()
        .await;
    assert_fell_back(got);
}

#[tokio::test]
async fn falls_back_on_malformed_json() {
    let server = MockServer::start().await;
    mount(&server, ResponseTemplate::new(200).set_body_string("<html>oops</html>")).await;

    let got = source_for(format!("{}{UTC_PATH}", server.uri()))
        .acquire()
        .await;
    assert_fell_back(got);
}

#[tokio::test]
async fn falls_back_on_missing_timestamp_field() {
    let server = MockServer::start().await;
    mount(
        &server,
        ResponseTemplate::new(200).set_body_json(serde_json::json!({ "unixtime": 1709294400 })),
    )
    .await;

    let got = source_for(format!("{}{UTC_PATH}", server.uri()))
        .acquire()
        .await;
    assert_fell_back(got);
}

#[tokio::test]
async fn falls_back_on_unparsable_timestamp() {
    let server = MockServer::start().await;
    mount(
        &server,
        ResponseTemplate::new(200)
            .set_body_json(serde_json::json!({ "utc_datetime": "not a timestamp" })),
    )
    .await;

    let got = source_for(format!("{}{UTC_PATH}", server.uri()))
        .acquire()
        .await;
    assert_fell_back(got);
}

#[tokio::test]
async fn falls_back_on_timeout() {
    let server = MockServer::start().await;
    mount(
        &server,
        ResponseTemplate::new(200)
            .set_body_json(serde_json::json!({
                "utc_datetime": "2024-03-01T12:00:00+00:00"
            }))
            .set_delay(Duration::from_secs(3)),
    )
    .await;

    let got = source_for(format!("{}{UTC_PATH}", server.uri()))
        .acquire()
        .await;
    assert_fell_back(got);
}

#[tokio::test]
async fn falls_back_when_unreachable() {
    let server = MockServer::start().await;
    let url = format!("{}{UTC_PATH}", server.uri());
    drop(server);

    let got = source_for(url).acquire().await;
    assert_fell_back(got);
}

#[tokio::test]
async fn fallback_clears_loading_without_surfacing_an_error() {
    let server = MockServer::start().await;
    mount(&server, ResponseTemplate::new(500)).await;

    let mut widget = Widget::new();
    assert!(widget.is_loading());

    let acquired = source_for(format!("{}{UTC_PATH}", server.uri()))
        .acquire()
        .await;
    widget.set_instant(acquired);
    widget.on_birth_date_change("2000-09-09");

    assert!(!widget.is_loading());
    assert_eq!(
        widget.result_text(),
        "Your age is: 1 year, 0 months, and 0 days"
    );
}
