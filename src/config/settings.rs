// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::time::Duration;

/// 应用程序配置设置
///
/// 包含数据库、爬取、过滤、抓取和分析等所有配置项
#[derive(Debug, Deserialize)]
pub struct Settings {
    /// 数据库配置
    pub database: DatabaseSettings,
    /// 爬取配置
    pub crawl: CrawlSettings,
    /// URL过滤配置
    pub filter: FilterSettings,
    /// HTTP抓取配置
    pub fetch: FetchSettings,
    /// 内容分析配置
    pub analysis: AnalysisSettings,
}

/// 数据库配置设置
#[derive(Debug, Deserialize)]
pub struct DatabaseSettings {
    /// 数据库连接URL
    pub url: String,
    /// 最大连接数
    pub max_connections: Option<u32>,
    /// 最小连接数
    pub min_connections: Option<u32>,
    /// 连接超时时间（秒）
    pub connect_timeout: Option<u64>,
    /// 空闲连接超时时间（秒）
    pub idle_timeout: Option<u64>,
}

/// 爬取配置设置
#[derive(Debug, Clone, Deserialize)]
pub struct CrawlSettings {
    /// 最大爬取深度
    pub max_depth: i32,
    /// 并发工作器数量
    pub concurrency: usize,
    /// 每主机默认礼貌延迟（毫秒）
    pub politeness_delay_ms: u64,
    /// 爬虫User-Agent
    pub user_agent: String,
    /// 是否保存非2xx响应的页面
    pub persist_error_pages: bool,
}

impl CrawlSettings {
    /// 礼貌延迟
    pub fn politeness_delay(&self) -> Duration {
        Duration::from_millis(self.politeness_delay_ms)
    }
}

/// URL过滤配置设置
///
/// 所有规则均为可选：空列表表示不限制
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FilterSettings {
    /// 允许的域名后缀
    pub allowed_domains: Vec<String>,
    /// 允许的扩展名
    pub allowed_extensions: Vec<String>,
    /// 禁止的路径模式（正则）
    pub disallowed_paths: Vec<String>,
    /// 允许的Content-Type前缀
    pub allowed_content_types: Vec<String>,
    /// URL最大长度，0表示不限制
    pub max_url_length: usize,
}

/// HTTP抓取配置设置
#[derive(Debug, Clone, Deserialize)]
pub struct FetchSettings {
    /// 请求User-Agent
    pub user_agent: String,
    /// 单次请求超时时间（秒）
    pub timeout_secs: u64,
    /// 最大重定向次数
    pub max_redirects: usize,
    /// 是否跟随重定向
    pub follow_redirects: bool,
}

impl FetchSettings {
    /// 请求超时时间
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// 内容分析配置设置
#[derive(Debug, Clone, Deserialize)]
pub struct AnalysisSettings {
    /// 向量嵌入维度
    pub embedding_dimension: usize,
    /// 词项最小文档频率
    pub min_doc_freq: usize,
    /// 最大特征数，0表示不限制
    pub max_features: usize,
    /// 每篇内容提取的主题数
    pub topics_per_content: usize,
    /// 摘要最大长度（字符）
    pub summary_max_length: usize,
    /// 每篇内容提取的关键词数
    pub keywords_per_content: usize,
    /// 分析工作器轮询间隔（秒）
    pub poll_interval_secs: u64,
    /// 每轮处理的页面数
    pub batch_size: u64,
    /// 每篇内容记录的相似内容数
    pub similar_per_content: usize,
}

impl Settings {
    /// 创建新的配置实例
    ///
    /// 从默认值、可选配置文件和环境变量加载配置
    ///
    /// # Returns
    ///
    /// * `Ok(Settings)` - 成功加载的配置
    /// * `Err(ConfigError)` - 配置加载失败
    pub fn new() -> Result<Self, ConfigError> {
        let env = std::env::var("APP_ENVIRONMENT").unwrap_or_else(|_| "default".to_string());
        let builder = Config::builder()
            // Default DB pool settings
            .set_default("database.url", "postgres://localhost/webcrawlrs")?
            .set_default("database.max_connections", 20)?
            .set_default("database.min_connections", 2)?
            .set_default("database.connect_timeout", 10)?
            .set_default("database.idle_timeout", 300)?
            // Default crawl settings
            .set_default("crawl.max_depth", 2)?
            .set_default("crawl.concurrency", 5)?
            .set_default("crawl.politeness_delay_ms", 1000)?
            .set_default("crawl.user_agent", "webcrawlrs-bot/1.0")?
            .set_default("crawl.persist_error_pages", true)?
            // Default filter settings (empty list = no restriction)
            .set_default("filter.allowed_domains", Vec::<String>::new())?
            .set_default("filter.allowed_extensions", Vec::<String>::new())?
            .set_default("filter.disallowed_paths", Vec::<String>::new())?
            .set_default("filter.allowed_content_types", vec!["text/html".to_string()])?
            .set_default("filter.max_url_length", 2048)?
            // Default fetch settings
            .set_default("fetch.user_agent", "webcrawlrs-bot/1.0")?
            .set_default("fetch.timeout_secs", 30)?
            .set_default("fetch.max_redirects", 10)?
            .set_default("fetch.follow_redirects", true)?
            // Default analysis settings
            .set_default("analysis.embedding_dimension", 384)?
            .set_default("analysis.min_doc_freq", 1)?
            .set_default("analysis.max_features", 0)?
            .set_default("analysis.topics_per_content", 5)?
            .set_default("analysis.summary_max_length", 200)?
            .set_default("analysis.keywords_per_content", 10)?
            .set_default("analysis.poll_interval_secs", 30)?
            .set_default("analysis.batch_size", 20)?
            .set_default("analysis.similar_per_content", 5)?
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", env)).required(false))
            .add_source(Environment::with_prefix("WEBCRAWLRS").separator("__"));

        builder.build()?.try_deserialize()
    }
}
