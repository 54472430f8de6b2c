// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use async_trait::async_trait;
use reqwest::Client;
use robotstxt::DefaultMatcher;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use std::time::{Duration, Instant};
use tracing::{debug, warn};
use url::Url;

use crate::utils::errors::CrawlError;
use crate::utils::url_utils::parse_url;

/// Robots.txt检查器接口
#[async_trait]
pub trait RobotsCheckerTrait: Send + Sync {
    /// 检查URL是否被允许访问
    async fn is_allowed(&self, url_str: &str, user_agent: &str) -> Result<bool, CrawlError>;

    /// 获取主机的爬取延迟
    async fn crawl_delay(
        &self,
        url_str: &str,
        user_agent: &str,
    ) -> Result<Option<Duration>, CrawlError>;
}

/// 缓存的Robots.txt内容
#[derive(Clone)]
struct CachedRobots {
    /// 内容
    content: String,

    /// 过期时间
    expires_at: Instant,
}

/// Robots.txt检查器
///
/// 以主机为键缓存robots.txt内容。抓取失败（非404）时对该主机
/// 在有限TTL内放行；404视为无任何限制。首次抓取按主机单飞，
/// 防止并发工作器对同一主机造成抓取风暴。
pub struct RobotsChecker {
    /// HTTP客户端
    client: Client,

    /// 抓取robots.txt时使用的User-Agent
    user_agent: String,

    /// 内存缓存，读多写少
    cache: RwLock<HashMap<String, CachedRobots>>,

    /// 每主机的抓取单飞锁
    inflight: tokio::sync::Mutex<HashMap<String, Arc<tokio::sync::Mutex<()>>>>,

    /// 成功结果的缓存时长
    ttl: Duration,

    /// 失败放行的缓存时长
    error_ttl: Duration,
}

impl RobotsChecker {
    /// 创建新的Robots检查器实例
    pub fn new(user_agent: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            user_agent: user_agent.into(),
            cache: RwLock::new(HashMap::new()),
            inflight: tokio::sync::Mutex::new(HashMap::new()),
            ttl: Duration::from_secs(3600),
            error_ttl: Duration::from_secs(300),
        }
    }

    /// 获取robots.txt内容（带缓存与单飞）
    async fn robots_content(&self, url: &Url) -> Result<String, CrawlError> {
        let host = url
            .host_str()
            .ok_or_else(|| CrawlError::InvalidUrl(format!("no host in {}", url)))?;

        let robots_url = match url.port() {
            Some(port) => format!("{}://{}:{}/robots.txt", url.scheme(), host, port),
            None => format!("{}://{}/robots.txt", url.scheme(), host),
        };

        if let Some(content) = self.cached(&robots_url) {
            return Ok(content);
        }

        // 每主机单飞：第一个到达的工作器抓取，其余等待后读缓存
        let guard = {
            let mut inflight = self.inflight.lock().await;
            inflight
                .entry(robots_url.clone())
                .or_insert_with(|| Arc::new(tokio::sync::Mutex::new(())))
                .clone()
        };
        let _held = guard.lock().await;

        if let Some(content) = self.cached(&robots_url) {
            return Ok(content);
        }

        let (content, ttl) = self.fetch_robots(&robots_url).await;

        let mut cache = self.cache.write().unwrap();
        cache.insert(
            robots_url,
            CachedRobots {
                content: content.clone(),
                expires_at: Instant::now() + ttl,
            },
        );

        Ok(content)
    }

    fn cached(&self, robots_url: &str) -> Option<String> {
        let cache = self.cache.read().unwrap();
        cache
            .get(robots_url)
            .filter(|c| c.expires_at > Instant::now())
            .map(|c| c.content.clone())
    }

    /// 抓取robots.txt；失败时放行并缩短缓存时长
    async fn fetch_robots(&self, robots_url: &str) -> (String, Duration) {
        let response = self
            .client
            .get(robots_url)
            .header("User-Agent", &self.user_agent)
            .timeout(Duration::from_secs(5))
            .send()
            .await;

        match response {
            Ok(resp) if resp.status().is_success() => {
                let content = resp.text().await.unwrap_or_default();
                (content, self.ttl)
            }
            Ok(resp) if resp.status() == reqwest::StatusCode::NOT_FOUND => {
                // 404视为该主机无任何限制
                (String::new(), self.ttl)
            }
            Ok(resp) => {
                warn!(
                    "robots.txt fetch from {} returned {}, failing open",
                    robots_url,
                    resp.status()
                );
                (String::new(), self.error_ttl)
            }
            Err(e) => {
                warn!(
                    "robots.txt fetch from {} failed: {}, failing open",
                    robots_url, e
                );
                (String::new(), self.error_ttl)
            }
        }
    }

    /// 解析适用于给定User-Agent的Crawl-delay指令
    ///
    /// robotstxt库不暴露Crawl-delay，这里手工扫描：
    /// 先找到匹配的User-agent块，再在块内取Crawl-delay。
    fn parse_crawl_delay(content: &str, user_agent: &str) -> Option<Duration> {
        let mut current_agent_matched = false;
        let mut specific_agent_found = false;
        let mut delay: Option<f64> = None;

        for line in content.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let lower_line = line.to_lowercase();
            if let Some(agent) = lower_line.strip_prefix("user-agent:") {
                let agent = agent.trim();
                if agent == "*" {
                    current_agent_matched = !specific_agent_found;
                } else if user_agent.to_lowercase().contains(agent) {
                    current_agent_matched = true;
                    specific_agent_found = true;
                    delay = None;
                } else {
                    current_agent_matched = false;
                }
            } else if current_agent_matched {
                if let Some(value) = lower_line.strip_prefix("crawl-delay:") {
                    if let Ok(d) = value.trim().parse::<f64>() {
                        if d >= 0.0 {
                            delay = Some(d);
                        }
                    }
                }
            }
        }

        delay.map(Duration::from_secs_f64)
    }
}

#[async_trait]
impl RobotsCheckerTrait for RobotsChecker {
    async fn is_allowed(&self, url_str: &str, user_agent: &str) -> Result<bool, CrawlError> {
        let url = parse_url(url_str)?;
        let content = self.robots_content(&url).await?;
        if content.is_empty() {
            return Ok(true);
        }

        let mut matcher = DefaultMatcher::default();
        let allowed = matcher.one_agent_allowed_by_robots(&content, user_agent, url.as_str());
        if !allowed {
            debug!("{} disallowed by robots.txt", url_str);
        }
        Ok(allowed)
    }

    async fn crawl_delay(
        &self,
        url_str: &str,
        user_agent: &str,
    ) -> Result<Option<Duration>, CrawlError> {
        let url = parse_url(url_str)?;
        let content = self.robots_content(&url).await?;
        Ok(Self::parse_crawl_delay(&content, user_agent))
    }
}
