// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use std::time::Duration;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use webcrawlrs::config::settings::FetchSettings;
use webcrawlrs::engines::reqwest_engine::ReqwestEngine;
use webcrawlrs::engines::traits::{EngineError, FetchEngine, FetchRequest};
use webcrawlrs::utils::robots::{RobotsChecker, RobotsCheckerTrait};

fn fetch_settings() -> FetchSettings {
    FetchSettings {
        user_agent: "testbot/1.0".to_string(),
        timeout_secs: 5,
        max_redirects: 2,
        follow_redirects: true,
    }
}

#[tokio::test]
async fn test_fetch_sends_standard_headers() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/page"))
        .and(header("user-agent", "testbot/1.0"))
        .and(header("accept-language", "en-US,en;q=0.5"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-type", "text/html; charset=utf-8")
                .set_body_string("<html><body>ok</body></html>"),
        )
        .mount(&server)
        .await;

    let engine = ReqwestEngine::new(fetch_settings()).unwrap();
    let response = engine
        .fetch(&FetchRequest::new(format!("{}/page", server.uri())))
        .await
        .unwrap();

    assert_eq!(response.status_code, 200);
    assert!(response.content_type.starts_with("text/html"));
    assert!(response.body.contains("ok"));
    assert!(response.headers.contains_key("content-type"));
}

#[tokio::test]
async fn test_fetch_follows_redirects_and_forwards_headers() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/start"))
        .respond_with(ResponseTemplate::new(302).insert_header("location", "/end"))
        .mount(&server)
        .await;
    // 重定向跳转仍携带原始请求头
    Mock::given(method("GET"))
        .and(path("/end"))
        .and(header("user-agent", "testbot/1.0"))
        .respond_with(ResponseTemplate::new(200).set_body_string("arrived"))
        .mount(&server)
        .await;

    let engine = ReqwestEngine::new(fetch_settings()).unwrap();
    let response = engine
        .fetch(&FetchRequest::new(format!("{}/start", server.uri())))
        .await
        .unwrap();

    assert_eq!(response.status_code, 200);
    assert_eq!(response.body, "arrived");
}

#[tokio::test]
async fn test_fetch_redirect_overflow_is_an_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/loop"))
        .respond_with(ResponseTemplate::new(302).insert_header("location", "/loop"))
        .mount(&server)
        .await;

    let engine = ReqwestEngine::new(fetch_settings()).unwrap();
    let result = engine
        .fetch(&FetchRequest::new(format!("{}/loop", server.uri())))
        .await;

    assert!(matches!(result, Err(EngineError::TooManyRedirects(2))));
}

#[tokio::test]
async fn test_fetch_does_not_follow_when_disabled() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/start"))
        .respond_with(ResponseTemplate::new(301).insert_header("location", "/end"))
        .mount(&server)
        .await;

    let engine = ReqwestEngine::new(FetchSettings {
        follow_redirects: false,
        ..fetch_settings()
    })
    .unwrap();
    let response = engine
        .fetch(&FetchRequest::new(format!("{}/start", server.uri())))
        .await
        .unwrap();

    assert_eq!(response.status_code, 301);
}

#[tokio::test]
async fn test_robots_missing_file_allows_everything() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/robots.txt"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let robots = RobotsChecker::new("testbot/1.0");
    let allowed = robots
        .is_allowed(&format!("{}/anything", server.uri()), "testbot/1.0")
        .await
        .unwrap();
    assert!(allowed);
}

#[tokio::test]
async fn test_robots_disallow_rules_enforced() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/robots.txt"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            "User-agent: *\nDisallow: /private\nAllow: /private/public-bit\n",
        ))
        .mount(&server)
        .await;

    let robots = RobotsChecker::new("testbot/1.0");

    assert!(!robots
        .is_allowed(&format!("{}/private/secret", server.uri()), "testbot/1.0")
        .await
        .unwrap());
    assert!(robots
        .is_allowed(&format!("{}/open", server.uri()), "testbot/1.0")
        .await
        .unwrap());
    // 更长的Allow规则胜过Disallow
    assert!(robots
        .is_allowed(
            &format!("{}/private/public-bit/page", server.uri()),
            "testbot/1.0"
        )
        .await
        .unwrap());
}

#[tokio::test]
async fn test_robots_crawl_delay_surfaced() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/robots.txt"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string("User-agent: *\nCrawl-delay: 2\nDisallow:\n"),
        )
        .mount(&server)
        .await;

    let robots = RobotsChecker::new("testbot/1.0");
    let delay = robots
        .crawl_delay(&format!("{}/x", server.uri()), "testbot/1.0")
        .await
        .unwrap();
    assert_eq!(delay, Some(Duration::from_secs(2)));
}

#[tokio::test]
async fn test_robots_server_error_fails_open() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/robots.txt"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let robots = RobotsChecker::new("testbot/1.0");
    let allowed = robots
        .is_allowed(&format!("{}/anything", server.uri()), "testbot/1.0")
        .await
        .unwrap();
    assert!(allowed);
}

#[tokio::test]
async fn test_robots_fetched_once_per_host() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/robots.txt"))
        .respond_with(
            ResponseTemplate::new(200).set_body_string("User-agent: *\nDisallow: /no\n"),
        )
        .expect(1)
        .mount(&server)
        .await;

    let robots = RobotsChecker::new("testbot/1.0");
    for _ in 0..5 {
        robots
            .is_allowed(&format!("{}/ok", server.uri()), "testbot/1.0")
            .await
            .unwrap();
    }
    // Mock的expect(1)在drop时校验robots.txt只被抓取一次
}
