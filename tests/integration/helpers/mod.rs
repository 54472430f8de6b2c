// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

//! 集成测试辅助组件
//!
//! 内存仓库加桩引擎构成的爬取服务试验台

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use webcrawlrs::config::settings::{AnalysisSettings, CrawlSettings, FilterSettings};
use webcrawlrs::domain::services::crawl_service::CrawlService;
use webcrawlrs::domain::services::rate_limiter::HostRateLimiter;
use webcrawlrs::domain::services::url_filter::UrlFilter;
use webcrawlrs::engines::traits::{EngineError, FetchEngine, FetchRequest, FetchResponse};
use webcrawlrs::infrastructure::repositories::memory::{
    MemoryCrawlJobRepository, MemoryPageRepository, MemoryUrlRepository,
};
use webcrawlrs::utils::errors::CrawlError;
use webcrawlrs::utils::html_parser::HtmlParser;
use webcrawlrs::utils::robots::RobotsCheckerTrait;

/// 桩抓取引擎：按URL返回预置的HTML
pub struct StubFetchEngine {
    pages: HashMap<String, (u16, String)>,
}

impl StubFetchEngine {
    pub fn new() -> Self {
        Self {
            pages: HashMap::new(),
        }
    }

    pub fn with_page(mut self, url: &str, status: u16, html: &str) -> Self {
        self.pages
            .insert(url.to_string(), (status, html.to_string()));
        self
    }
}

#[async_trait]
impl FetchEngine for StubFetchEngine {
    async fn fetch(&self, request: &FetchRequest) -> Result<FetchResponse, EngineError> {
        match self.pages.get(&request.url) {
            Some((status, html)) => Ok(FetchResponse {
                status_code: *status,
                body: html.clone(),
                content_type: "text/html; charset=utf-8".to_string(),
                headers: HashMap::from([(
                    "content-type".to_string(),
                    "text/html; charset=utf-8".to_string(),
                )]),
                response_time_ms: 1,
            }),
            None => Ok(FetchResponse {
                status_code: 404,
                body: String::new(),
                content_type: "text/html".to_string(),
                headers: HashMap::new(),
                response_time_ms: 1,
            }),
        }
    }

    fn name(&self) -> &'static str {
        "stub"
    }
}

/// 全部放行的robots桩
pub struct AllowAllRobots;

#[async_trait]
impl RobotsCheckerTrait for AllowAllRobots {
    async fn is_allowed(&self, _url: &str, _user_agent: &str) -> Result<bool, CrawlError> {
        Ok(true)
    }

    async fn crawl_delay(
        &self,
        _url: &str,
        _user_agent: &str,
    ) -> Result<Option<Duration>, CrawlError> {
        Ok(None)
    }
}

/// 指定路径拒绝的robots桩
pub struct DenyPathRobots {
    pub denied_path: String,
}

#[async_trait]
impl RobotsCheckerTrait for DenyPathRobots {
    async fn is_allowed(&self, url: &str, _user_agent: &str) -> Result<bool, CrawlError> {
        Ok(!url.contains(&self.denied_path))
    }

    async fn crawl_delay(
        &self,
        _url: &str,
        _user_agent: &str,
    ) -> Result<Option<Duration>, CrawlError> {
        Ok(None)
    }
}

/// 测试用爬取配置：无延迟、深度1
pub fn crawl_settings(max_depth: i32) -> CrawlSettings {
    CrawlSettings {
        max_depth,
        concurrency: 2,
        politeness_delay_ms: 0,
        user_agent: "testbot/1.0".to_string(),
        persist_error_pages: true,
    }
}

/// 测试用分析配置：小维度、低开销
pub fn analysis_settings() -> AnalysisSettings {
    AnalysisSettings {
        embedding_dimension: 64,
        min_doc_freq: 1,
        max_features: 0,
        topics_per_content: 5,
        summary_max_length: 200,
        keywords_per_content: 10,
        poll_interval_secs: 1,
        batch_size: 20,
        similar_per_content: 5,
    }
}

/// 爬取服务试验台
pub struct CrawlHarness {
    pub service: Arc<CrawlService>,
    pub url_repo: Arc<MemoryUrlRepository>,
    pub page_repo: Arc<MemoryPageRepository>,
    pub job_repo: Arc<MemoryCrawlJobRepository>,
}

impl CrawlHarness {
    /// 以内存仓库与给定桩件搭建爬取服务
    pub fn new(
        fetcher: Arc<dyn FetchEngine>,
        robots: Arc<dyn RobotsCheckerTrait>,
        filter: FilterSettings,
        crawl: CrawlSettings,
    ) -> Self {
        let url_repo = Arc::new(MemoryUrlRepository::new());
        let page_repo = Arc::new(MemoryPageRepository::new());
        let job_repo = Arc::new(MemoryCrawlJobRepository::new());

        let service = Arc::new(CrawlService::new(
            url_repo.clone(),
            page_repo.clone(),
            job_repo.clone(),
            fetcher,
            HtmlParser::new(),
            UrlFilter::new(&filter),
            robots,
            Arc::new(HostRateLimiter::new(Duration::from_millis(
                crawl.politeness_delay_ms,
            ))),
            crawl,
        ));

        Self {
            service,
            url_repo,
            page_repo,
            job_repo,
        }
    }
}
