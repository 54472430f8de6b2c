// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use std::sync::Arc;

use webcrawlrs::config::settings::FilterSettings;
use webcrawlrs::domain::models::url::UrlStatus;
use webcrawlrs::domain::repositories::{CrawlJobRepository, PageRepository, UrlRepository};
use webcrawlrs::utils::errors::CrawlError;

use super::helpers::{crawl_settings, AllowAllRobots, CrawlHarness, DenyPathRobots, StubFetchEngine};

fn example_filter() -> FilterSettings {
    FilterSettings {
        allowed_domains: vec!["example.com".to_string()],
        ..Default::default()
    }
}

#[tokio::test]
async fn test_seed_normalizes_and_enqueues() {
    let harness = CrawlHarness::new(
        Arc::new(StubFetchEngine::new()),
        Arc::new(AllowAllRobots),
        FilterSettings::default(),
        crawl_settings(1),
    );

    let url = harness
        .service
        .add_seed("https://example.com/a#frag")
        .await
        .unwrap();

    assert_eq!(url.normalized_url, "https://example.com/a");
    assert_eq!(url.status, UrlStatus::Pending);
    assert_eq!(url.depth, 0);
    assert_eq!(harness.job_repo.count().await.unwrap(), 1);
}

#[tokio::test]
async fn test_concurrent_seeds_deduplicate() {
    let harness = Arc::new(CrawlHarness::new(
        Arc::new(StubFetchEngine::new()),
        Arc::new(AllowAllRobots),
        FilterSettings::default(),
        crawl_settings(1),
    ));

    let mut handles = Vec::new();
    for _ in 0..10 {
        let harness = harness.clone();
        handles.push(tokio::spawn(async move {
            harness.service.add_seed("https://example.com/a").await
        }));
    }
    for handle in handles {
        handle.await.unwrap().unwrap();
    }

    assert_eq!(
        harness
            .url_repo
            .count_by_status(UrlStatus::Pending)
            .await
            .unwrap(),
        1
    );
    assert_eq!(harness.job_repo.count().await.unwrap(), 1);
}

#[tokio::test]
async fn test_link_expansion_respects_scope_and_depth() {
    let html = concat!(
        "<html><body>",
        "<a href=\"/b\">b</a>",
        "<a href=\"#top\">top</a>",
        "<a href=\"mailto:x@y\">mail</a>",
        "<a href=\"javascript:void(0)\">js</a>",
        "<a href=\"https://other.com/c\">c</a>",
        "</body></html>"
    );
    let fetcher = StubFetchEngine::new()
        .with_page("https://example.com/", 200, html)
        .with_page(
            "https://example.com/b",
            200,
            "<html><body><a href=\"/deeper\">d</a></body></html>",
        );

    let harness = CrawlHarness::new(
        Arc::new(fetcher),
        Arc::new(AllowAllRobots),
        example_filter(),
        crawl_settings(1),
    );

    harness.service.add_seed("https://example.com/").await.unwrap();

    // 模拟工作器循环直到队列抽干
    while let Some(job) = harness.job_repo.dequeue().await.unwrap() {
        let url = harness
            .url_repo
            .find_by_id(job.url_id)
            .await
            .unwrap()
            .unwrap();
        match harness.service.process_url(&url).await {
            Ok(_) => harness.job_repo.complete(job.id).await.unwrap(),
            Err(_) => harness.job_repo.fail(job.id).await.unwrap(),
        }
    }

    // 只有同域的/b被发现，深度1
    let b = harness
        .url_repo
        .find_by_normalized_url("https://example.com/b")
        .await
        .unwrap()
        .expect("in-scope link should be discovered");
    assert_eq!(b.depth, 1);
    assert_eq!(b.parent_url, "https://example.com/");
    assert_eq!(b.status, UrlStatus::Fetched);

    assert!(harness
        .url_repo
        .find_by_normalized_url("https://other.com/c")
        .await
        .unwrap()
        .is_none());

    // 深度上限：/b在深度1被抓取但其出链不再扩展
    assert!(harness
        .url_repo
        .find_by_normalized_url("https://example.com/deeper")
        .await
        .unwrap()
        .is_none());

    let pages = harness.page_repo.count_pages().await.unwrap();
    assert_eq!(pages, 2);
}

#[tokio::test]
async fn test_dequeue_exclusivity_across_workers() {
    let harness = Arc::new(CrawlHarness::new(
        Arc::new(StubFetchEngine::new()),
        Arc::new(AllowAllRobots),
        FilterSettings::default(),
        crawl_settings(0),
    ));

    for i in 0..50 {
        harness
            .service
            .add_seed(&format!("https://example.com/page-{}", i))
            .await
            .unwrap();
    }

    let mut handles = Vec::new();
    for _ in 0..8 {
        let harness = harness.clone();
        handles.push(tokio::spawn(async move {
            let mut taken = Vec::new();
            while let Some(job) = harness.job_repo.dequeue().await.unwrap() {
                taken.push(job.id);
                tokio::task::yield_now().await;
            }
            taken
        }));
    }

    let mut all: Vec<uuid::Uuid> = Vec::new();
    for handle in handles {
        all.extend(handle.await.unwrap());
    }

    // 每个任务恰好被一个工作器取走
    assert_eq!(all.len(), 50);
    let unique: std::collections::HashSet<_> = all.iter().collect();
    assert_eq!(unique.len(), 50);
}

#[tokio::test]
async fn test_filtered_url_marked_failed() {
    let harness = CrawlHarness::new(
        Arc::new(StubFetchEngine::new()),
        Arc::new(AllowAllRobots),
        example_filter(),
        crawl_settings(1),
    );

    // 种子先入库，处理时才过滤
    let url = harness.service.add_seed("https://other.com/x").await.unwrap();
    let result = harness.service.process_url(&url).await;

    assert!(matches!(result, Err(CrawlError::Filtered(_))));
    let stored = harness
        .url_repo
        .find_by_id(url.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.status, UrlStatus::Failed);
    assert_eq!(harness.page_repo.count_pages().await.unwrap(), 0);
}

#[tokio::test]
async fn test_robots_denied_url_marked_failed() {
    let fetcher = StubFetchEngine::new().with_page(
        "https://example.com/private",
        200,
        "<html><body>secret</body></html>",
    );
    let harness = CrawlHarness::new(
        Arc::new(fetcher),
        Arc::new(DenyPathRobots {
            denied_path: "/private".to_string(),
        }),
        FilterSettings::default(),
        crawl_settings(1),
    );

    let url = harness
        .service
        .add_seed("https://example.com/private")
        .await
        .unwrap();
    let result = harness.service.process_url(&url).await;

    assert!(matches!(result, Err(CrawlError::Filtered(_))));
    let stored = harness.url_repo.find_by_id(url.id).await.unwrap().unwrap();
    assert_eq!(stored.status, UrlStatus::Failed);
    // robots拒绝发生在fetching之前，尝试次数不增加
    assert_eq!(stored.attempt_count, 0);
}

#[tokio::test]
async fn test_non_success_response_fails_url_but_persists_page() {
    let fetcher = StubFetchEngine::new().with_page(
        "https://example.com/gone",
        410,
        "<html><body>gone</body></html>",
    );
    let harness = CrawlHarness::new(
        Arc::new(fetcher),
        Arc::new(AllowAllRobots),
        FilterSettings::default(),
        crawl_settings(1),
    );

    let url = harness.service.add_seed("https://example.com/gone").await.unwrap();
    let result = harness.service.process_url(&url).await;

    assert!(matches!(result, Err(CrawlError::Protocol(410))));
    let stored = harness.url_repo.find_by_id(url.id).await.unwrap().unwrap();
    assert_eq!(stored.status, UrlStatus::Failed);
    assert_eq!(stored.attempt_count, 1);

    // persist_error_pages开启时响应仍被保存
    assert!(harness
        .page_repo
        .find_by_url("https://example.com/gone")
        .await
        .unwrap()
        .is_some());
}

#[tokio::test]
async fn test_successful_crawl_reaches_fetched() {
    let fetcher = StubFetchEngine::new().with_page(
        "https://example.com/ok",
        200,
        "<html><head><title>OK</title></head><body><p>hello world</p></body></html>",
    );
    let harness = CrawlHarness::new(
        Arc::new(fetcher),
        Arc::new(AllowAllRobots),
        FilterSettings::default(),
        crawl_settings(1),
    );

    let url = harness.service.add_seed("https://example.com/ok").await.unwrap();
    let page = harness.service.process_url(&url).await.unwrap();

    assert_eq!(page.title, "OK");
    assert!(page.plain_text.contains("hello world"));

    let stored = harness.url_repo.find_by_id(url.id).await.unwrap().unwrap();
    assert_eq!(stored.status, UrlStatus::Fetched);
    assert_eq!(stored.attempt_count, 1);
    assert!(stored.last_attempt.is_some());
}
