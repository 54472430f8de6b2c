// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use std::sync::Arc;
use std::time::Duration;
use tracing::info;

use webcrawlrs::config::settings::Settings;
use webcrawlrs::domain::repositories::{
    ContentRepository, CrawlJobRepository, NamedEntityRepository, PageRepository,
    SimilarContentRepository, TopicRepository, UrlRepository,
};
use webcrawlrs::domain::services::analysis_service::AnalysisService;
use webcrawlrs::domain::services::crawl_service::CrawlService;
use webcrawlrs::domain::services::rate_limiter::HostRateLimiter;
use webcrawlrs::domain::services::url_filter::UrlFilter;
use webcrawlrs::engines::reqwest_engine::ReqwestEngine;
use webcrawlrs::engines::traits::FetchEngine;
use webcrawlrs::infrastructure::database::connection;
use webcrawlrs::infrastructure::ml::analyzers::{
    CueWordClassifier, FrequencyKeywordExtractor, LeadSummarizer, StopwordLanguageDetector,
    TextStatistics,
};
use webcrawlrs::infrastructure::ml::ner::HeuristicEntityRecognizer;
use webcrawlrs::infrastructure::ml::topics::KeywordTopicModeler;
use webcrawlrs::infrastructure::ml::vectorizer::HashingVectorizer;
use webcrawlrs::infrastructure::repositories::content_repo_impl::ContentRepositoryImpl;
use webcrawlrs::infrastructure::repositories::entity_repo_impl::NamedEntityRepositoryImpl;
use webcrawlrs::infrastructure::repositories::job_repo_impl::CrawlJobRepositoryImpl;
use webcrawlrs::infrastructure::repositories::page_repo_impl::PageRepositoryImpl;
use webcrawlrs::infrastructure::repositories::similar_content_repo_impl::SimilarContentRepositoryImpl;
use webcrawlrs::infrastructure::repositories::topic_repo_impl::TopicRepositoryImpl;
use webcrawlrs::infrastructure::repositories::url_repo_impl::UrlRepositoryImpl;
use webcrawlrs::queue::scheduler::MaintenanceScheduler;
use webcrawlrs::utils::html_parser::HtmlParser;
use webcrawlrs::utils::robots::RobotsChecker;
use webcrawlrs::utils::telemetry;
use webcrawlrs::workers::analysis_worker::AnalysisWorker;
use webcrawlrs::workers::crawl_worker::CrawlWorker;
use webcrawlrs::workers::manager::WorkerManager;
use webcrawlrs::workers::worker::Worker;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    telemetry::init_telemetry();
    info!("Starting webcrawlrs...");

    let settings = Settings::new()?;
    info!("Configuration loaded");

    let db = Arc::new(connection::create_pool(&settings.database).await?);
    info!("Database connection established");

    // 仓库
    let url_repo: Arc<dyn UrlRepository> = Arc::new(UrlRepositoryImpl::new(db.clone()));
    let page_repo: Arc<dyn PageRepository> = Arc::new(PageRepositoryImpl::new(db.clone()));
    let job_repo: Arc<dyn CrawlJobRepository> = Arc::new(CrawlJobRepositoryImpl::new(db.clone()));
    let content_repo: Arc<dyn ContentRepository> =
        Arc::new(ContentRepositoryImpl::new(db.clone()));
    let entity_repo: Arc<dyn NamedEntityRepository> =
        Arc::new(NamedEntityRepositoryImpl::new(db.clone()));
    let topic_repo: Arc<dyn TopicRepository> = Arc::new(TopicRepositoryImpl::new(db.clone()));
    let similar_repo: Arc<dyn SimilarContentRepository> =
        Arc::new(SimilarContentRepositoryImpl::new(db.clone()));

    // 爬取组件
    let fetcher: Arc<dyn FetchEngine> = Arc::new(ReqwestEngine::new(settings.fetch.clone())?);
    let filter = UrlFilter::new(&settings.filter);
    let robots = Arc::new(RobotsChecker::new(settings.crawl.user_agent.clone()));
    let limiter = Arc::new(HostRateLimiter::new(settings.crawl.politeness_delay()));

    let crawl_service = Arc::new(CrawlService::new(
        url_repo.clone(),
        page_repo.clone(),
        job_repo.clone(),
        fetcher,
        HtmlParser::new(),
        filter,
        robots,
        limiter,
        settings.crawl.clone(),
    ));

    // 分析组件
    let text_stats = Arc::new(TextStatistics);
    let analysis_service = Arc::new(AnalysisService::new(
        Arc::new(HashingVectorizer::new(&settings.analysis)),
        Arc::new(KeywordTopicModeler),
        Arc::new(HeuristicEntityRecognizer::new()),
        Arc::new(CueWordClassifier),
        Arc::new(LeadSummarizer),
        Arc::new(FrequencyKeywordExtractor),
        Arc::new(StopwordLanguageDetector),
        text_stats.clone(),
        text_stats.clone(),
        text_stats,
        settings.analysis.clone(),
    ));

    // 种子来自命令行参数
    for seed in std::env::args().skip(1) {
        match crawl_service.add_seed(&seed).await {
            Ok(url) => info!("Seed {} at depth {}", url.normalized_url, url.depth),
            Err(e) => tracing::warn!("Rejected seed {}: {}", seed, e),
        }
    }

    let mut manager = WorkerManager::new();

    manager.start_workers(settings.crawl.concurrency, || {
        Arc::new(CrawlWorker::new(
            crawl_service.clone(),
            url_repo.clone(),
            job_repo.clone(),
        )) as Arc<dyn Worker>
    });
    info!("Started {} crawl workers", settings.crawl.concurrency);

    manager.start_worker(Arc::new(AnalysisWorker::new(
        page_repo.clone(),
        content_repo.clone(),
        entity_repo.clone(),
        topic_repo.clone(),
        similar_repo.clone(),
        analysis_service,
        settings.analysis.clone(),
    )));

    let scheduler = MaintenanceScheduler::new(url_repo.clone(), job_repo.clone());
    manager.adopt(scheduler.start());

    // 周期性输出队列深度，便于观察爬取进度
    {
        let job_repo = job_repo.clone();
        manager.adopt(tokio::spawn(async move {
            let mut ticker = tokio::time::interval(Duration::from_secs(30));
            loop {
                ticker.tick().await;
                if let Ok(pending) = job_repo.count().await {
                    info!("Frontier depth: {} pending jobs", pending);
                }
            }
        }));
    }

    manager.wait_for_shutdown().await;
    Ok(())
}
