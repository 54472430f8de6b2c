// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use std::sync::Arc;
use tracing::{debug, error, info, instrument, warn};

use crate::config::settings::CrawlSettings;
use crate::domain::models::job::CrawlJob;
use crate::domain::models::page::Page;
use crate::domain::models::url::{CrawlUrl, UrlStatus};
use crate::domain::repositories::{
    CrawlJobRepository, PageRepository, RepositoryError, UrlRepository,
};
use crate::domain::services::rate_limiter::HostRateLimiter;
use crate::domain::services::url_filter::UrlFilter;
use crate::engines::traits::{FetchEngine, FetchRequest};
use crate::utils::errors::CrawlError;
use crate::utils::html_parser::HtmlParser;
use crate::utils::robots::RobotsCheckerTrait;
use crate::utils::url_utils::host_of;

/// 爬取编排服务
///
/// 系统的调度核心：接收种子、驱动单个URL的
/// pending → fetching → {fetched, failed} 状态机、
/// 在深度上限内扩展出链。所有针对单个URL的错误在此吸收：
/// 记录日志、标记failed、继续处理下一个
pub struct CrawlService {
    url_repo: Arc<dyn UrlRepository>,
    page_repo: Arc<dyn PageRepository>,
    job_repo: Arc<dyn CrawlJobRepository>,
    fetcher: Arc<dyn FetchEngine>,
    parser: HtmlParser,
    filter: UrlFilter,
    robots: Arc<dyn RobotsCheckerTrait>,
    limiter: Arc<HostRateLimiter>,
    config: CrawlSettings,
}

impl CrawlService {
    /// 创建新的爬取编排服务实例
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        url_repo: Arc<dyn UrlRepository>,
        page_repo: Arc<dyn PageRepository>,
        job_repo: Arc<dyn CrawlJobRepository>,
        fetcher: Arc<dyn FetchEngine>,
        parser: HtmlParser,
        filter: UrlFilter,
        robots: Arc<dyn RobotsCheckerTrait>,
        limiter: Arc<HostRateLimiter>,
        config: CrawlSettings,
    ) -> Self {
        Self {
            url_repo,
            page_repo,
            job_repo,
            fetcher,
            parser,
            filter,
            robots,
            limiter,
            config,
        }
    }

    /// 添加种子URL
    ///
    /// 幂等：规范化URL已存在时返回已有记录，不重复入队。
    /// 新种子以深度0、优先级0入队
    ///
    /// # 参数
    ///
    /// * `raw_url` - 原始URL字符串
    ///
    /// # 返回值
    ///
    /// * `Ok(CrawlUrl)` - 新建或已存在的URL记录
    /// * `Err(CrawlError)` - URL无效或仓库错误
    pub async fn add_seed(&self, raw_url: &str) -> Result<CrawlUrl, CrawlError> {
        let url = CrawlUrl::new(raw_url, 0, "")?;

        if let Some(existing) = self
            .url_repo
            .find_by_normalized_url(&url.normalized_url)
            .await?
        {
            return Ok(existing);
        }

        match self.url_repo.save(&url).await {
            Ok(saved) => {
                self.job_repo.enqueue(&CrawlJob::new(saved.id, 0)).await?;
                info!("Seed added: {}", saved.normalized_url);
                Ok(saved)
            }
            Err(RepositoryError::AlreadyExists) => {
                // 并发发现竞争落败，返回胜者的记录
                self.url_repo
                    .find_by_normalized_url(&url.normalized_url)
                    .await?
                    .ok_or_else(|| CrawlError::Repository(RepositoryError::NotFound))
            }
            Err(e) => Err(e.into()),
        }
    }

    /// 处理单个URL
    ///
    /// 状态机：过滤 → robots → fetching → 限速等待 → 抓取 →
    /// 解析 → 保存页面 → 扩展出链 → fetched。
    /// 任何一步失败都将URL标记为failed并返回原因；
    /// 失败只终结这个URL，不影响整体爬取
    ///
    /// # 参数
    ///
    /// * `url` - 待处理的URL记录
    ///
    /// # 返回值
    ///
    /// * `Ok(Page)` - 抓取并保存的页面
    /// * `Err(CrawlError)` - 该URL失败的原因
    #[instrument(skip(self, url), fields(url = %url.url, depth = url.depth))]
    pub async fn process_url(&self, url: &CrawlUrl) -> Result<Page, CrawlError> {
        match self.filter.should_crawl(&url.url, url.depth) {
            Ok(true) => {}
            Ok(false) => {
                self.mark_failed(url).await;
                return Err(CrawlError::Filtered("rejected by URL filter".to_string()));
            }
            Err(e) => {
                self.mark_failed(url).await;
                return Err(e);
            }
        }

        match self.robots.is_allowed(&url.url, &self.config.user_agent).await {
            Ok(true) => {}
            Ok(false) => {
                self.mark_failed(url).await;
                return Err(CrawlError::Filtered("disallowed by robots.txt".to_string()));
            }
            Err(e) => {
                self.mark_failed(url).await;
                return Err(e);
            }
        }

        self.url_repo
            .update_status(url.id, UrlStatus::Fetching)
            .await?;
        self.url_repo.increment_attempt_count(url.id).await?;

        // robots的Crawl-delay抬高该主机的生效延迟
        if let Ok(Some(delay)) = self
            .robots
            .crawl_delay(&url.url, &self.config.user_agent)
            .await
        {
            if let Ok(host) = host_of(&url.url) {
                self.limiter.set_delay(&host, delay);
            }
        }
        self.limiter.wait(&url.url).await?;

        let request = FetchRequest::new(url.url.clone());
        let response = match self.fetcher.fetch(&request).await {
            Ok(response) => response,
            Err(e) => {
                warn!("Fetch failed for {}: {}", url.url, e);
                self.mark_failed(url).await;
                return Err(e.into());
            }
        };

        if !self.filter.is_allowed_content_type(&response.content_type) {
            self.mark_failed(url).await;
            return Err(CrawlError::Filtered(format!(
                "content type {} not allowed",
                response.content_type
            )));
        }

        let mut page = Page::new(
            url.url.clone(),
            response.status_code,
            response.body,
            response.headers,
            response.content_type,
        );

        if !page.is_success() {
            if self.config.persist_error_pages {
                if let Err(e) = self.page_repo.save(&page).await {
                    error!("Failed to persist error page for {}: {}", url.url, e);
                }
            }
            self.mark_failed(url).await;
            return Err(CrawlError::Protocol(page.status_code));
        }

        // 解析失败可恢复：页面仍然保存，出链可能为空
        if let Err(e) = self.parser.parse(&mut page) {
            warn!("Parse failed for {}: {}", url.url, e);
        }

        if let Err(e) = self.page_repo.save(&page).await {
            error!("Failed to save page for {}: {}", url.url, e);
            self.mark_failed(url).await;
            return Err(e.into());
        }

        if url.depth < self.config.max_depth {
            self.process_links(&page.links, url.depth + 1, &url.url).await;
        }

        self.url_repo
            .update_status(url.id, UrlStatus::Fetched)
            .await?;

        Ok(page)
    }

    /// 扩展出链
    ///
    /// 每个链接：超出范围或规范化失败则丢弃；已发现则跳过；
    /// 否则保存并以优先级=深度入队（越深越不紧急）。
    /// 并发发现竞争由规范化URL唯一约束裁决
    async fn process_links(&self, links: &[String], depth: i32, parent_url: &str) {
        for link in links {
            if !self.filter.should_crawl(link, depth).unwrap_or(false) {
                debug!("Skipping out-of-scope link {}", link);
                continue;
            }

            let url = match CrawlUrl::new(link, depth, parent_url) {
                Ok(url) => url,
                Err(e) => {
                    debug!("Skipping malformed link {}: {}", link, e);
                    continue;
                }
            };

            match self
                .url_repo
                .find_by_normalized_url(&url.normalized_url)
                .await
            {
                Ok(Some(_)) => continue,
                Ok(None) => {}
                Err(e) => {
                    error!("Lookup failed for {}: {}", url.normalized_url, e);
                    continue;
                }
            }

            let saved = match self.url_repo.save(&url).await {
                Ok(saved) => saved,
                Err(RepositoryError::AlreadyExists) => continue,
                Err(e) => {
                    error!("Failed to save discovered URL {}: {}", url.normalized_url, e);
                    continue;
                }
            };

            if let Err(e) = self.job_repo.enqueue(&CrawlJob::new(saved.id, depth)).await {
                error!("Failed to enqueue job for {}: {}", saved.normalized_url, e);
            }
        }
    }

    async fn mark_failed(&self, url: &CrawlUrl) {
        if let Err(e) = self.url_repo.update_status(url.id, UrlStatus::Failed).await {
            error!("Failed to mark {} as failed: {}", url.url, e);
        }
    }
}
