//! Console poller against a mocked OpenWeatherMap.

use std::time::Duration;

use secrecy::SecretString;
use serde_json::json;
use tokio_test::{assert_err, assert_ok};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use weather_service::data::locations::{self, Location};
use weather_service::data::openweather::{OpenWeatherClient, OpenWeatherError};
use weather_service::poller::{self, SweepStats};

fn client(server: &MockServer) -> OpenWeatherClient {
    OpenWeatherClient::new(
        &server.uri(),
        SecretString::from("test-key".to_string()),
        Duration::from_secs(5),
    )
    .unwrap()
}

fn current_weather(name: &str, temp: f64, description: &str) -> serde_json::Value {
    json!({
        "coord": { "lon": 0.0, "lat": 0.0 },
        "weather": [{ "id": 800, "main": "Clear", "description": description, "icon": "01d" }],
        "main": { "temp": temp, "feels_like": temp, "humidity": 55, "pressure": 1012 },
        "wind": { "speed": 3.4, "deg": 90 },
        "name": name,
        "cod": 200
    })
}

#[tokio::test]
async fn current_sends_imperial_units_and_key() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/data/2.5/weather"))
        .and(query_param("units", "imperial"))
        .and(query_param("appid", "test-key"))
        .and(query_param("lat", "21.309463585349853"))
        .and(query_param("lon", "-157.8570993659206"))
        .respond_with(ResponseTemplate::new(200).set_body_json(current_weather(
            "Honolulu",
            84.2,
            "few clouds",
        )))
        .expect(1)
        .mount(&server)
        .await;

    let honolulu = locations::find("Honolulu").unwrap();
    let weather = assert_ok!(client(&server).current(honolulu.lat, honolulu.lon).await);
    assert_eq!(weather.name, "Honolulu");
    assert_eq!(weather.main.humidity, 55);
}

#[tokio::test]
async fn current_reports_upstream_message() {
    let server = MockServer::start().await;
    Mock::given(path("/data/2.5/weather"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "cod": 401,
            "message": "Invalid API key."
        })))
        .mount(&server)
        .await;

    let err = assert_err!(client(&server).current(0.0, 0.0).await);
    match err {
        OpenWeatherError::Status { status, message } => {
            assert_eq!(status, 401);
            assert_eq!(message, "Invalid API key.");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn sweep_continues_past_failures() {
    let server = MockServer::start().await;
    Mock::given(path("/data/2.5/weather"))
        .and(query_param("lat", "10"))
        .respond_with(ResponseTemplate::new(200).set_body_json(current_weather(
            "Warmville",
            91.0,
            "clear sky",
        )))
        .mount(&server)
        .await;
    Mock::given(path("/data/2.5/weather"))
        .and(query_param("lat", "20"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;
    Mock::given(path("/data/2.5/weather"))
        .and(query_param("lat", "30"))
        .respond_with(ResponseTemplate::new(200).set_body_json(current_weather(
            "Coldton",
            12.0,
            "light snow",
        )))
        .mount(&server)
        .await;

    let cities = [
        Location::new("Warmville", 10.0, 1.0),
        Location::new("Broken", 20.0, 2.0),
        Location::new("Coldton", 30.0, 3.0),
    ];

    let mut out = Vec::new();
    let stats = poller::sweep(&client(&server), &cities, &mut out)
        .await
        .unwrap();
    assert_eq!(
        stats,
        SweepStats {
            succeeded: 2,
            failed: 1
        }
    );

    let text = String::from_utf8(out).unwrap();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines.len(), 3);
    assert!(lines[0].starts_with("Warmville: 91.0°F"));
    assert!(lines[0].ends_with(", hot"));
    assert!(lines[1].starts_with("Broken: error: openweathermap returned 500"));
    assert!(lines[2].contains("light snow"));
    assert!(lines[2].ends_with(", cold"));
}

#[tokio::test]
async fn run_without_interval_sweeps_once() {
    let server = MockServer::start().await;
    Mock::given(path("/data/2.5/weather"))
        .respond_with(ResponseTemplate::new(200).set_body_json(current_weather(
            "Anywhere",
            65.0,
            "overcast clouds",
        )))
        .expect(2)
        .mount(&server)
        .await;

    let cities = [
        Location::new("First", 1.0, 1.0),
        Location::new("Second", 2.0, 2.0),
    ];

    let mut out = Vec::new();
    poller::run(
        &client(&server),
        &cities,
        None,
        &mut out,
        std::future::pending(),
    )
    .await
    .unwrap();

    let text = String::from_utf8(out).unwrap();
    assert_eq!(text.lines().count(), 2);
    assert!(text.contains("First: 65.0°F"));
    assert!(text.contains(", moderate"));
}

#[tokio::test]
async fn run_with_interval_repeats_until_shutdown() {
    let server = MockServer::start().await;
    Mock::given(path("/data/2.5/weather"))
        .respond_with(ResponseTemplate::new(200).set_body_json(current_weather(
            "Anywhere",
            40.0,
            "mist",
        )))
        .mount(&server)
        .await;

    let cities = [Location::new("Only", 1.0, 1.0)];

    // Stop once the mock has served two sweeps.
    let shutdown = async {
        loop {
            let served = server.received_requests().await.map_or(0, |r| r.len());
            if served >= 2 {
                return;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    };

    let mut out = Vec::new();
    let result = tokio::time::timeout(
        Duration::from_secs(10),
        poller::run(
            &client(&server),
            &cities,
            Some(Duration::from_millis(20)),
            &mut out,
            shutdown,
        ),
    )
    .await;
    assert_ok!(assert_ok!(result));

    let text = String::from_utf8(out).unwrap();
    let headers = text.lines().filter(|l| l.starts_with("--- ")).count();
    let summaries = text.lines().filter(|l| l.starts_with("Only: 40.0°F")).count();
    assert!(headers >= 2, "expected repeated sweeps, got:\n{text}");
    assert_eq!(headers, summaries);
    assert!(text.lines().next().unwrap().ends_with(" UTC ---"));
    assert!(text.contains(", cold"));
}
