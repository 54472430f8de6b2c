// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::domain::repositories::{CrawlJobRepository, UrlRepository};
use crate::domain::services::crawl_service::CrawlService;
use crate::utils::errors::{CrawlError, WorkerError};
use crate::workers::worker::Worker;

/// 爬取工作器
///
/// 循环从前沿队列取任务并驱动单URL状态机。
/// 单个URL的失败只记入该任务；队列为空时短暂休眠
pub struct CrawlWorker {
    service: Arc<CrawlService>,
    url_repo: Arc<dyn UrlRepository>,
    job_repo: Arc<dyn CrawlJobRepository>,
    worker_id: Uuid,
}

impl CrawlWorker {
    /// 创建新的爬取工作器实例
    pub fn new(
        service: Arc<CrawlService>,
        url_repo: Arc<dyn UrlRepository>,
        job_repo: Arc<dyn CrawlJobRepository>,
    ) -> Self {
        Self {
            service,
            url_repo,
            job_repo,
            worker_id: Uuid::new_v4(),
        }
    }

    /// 处理下一个任务
    ///
    /// # 返回值
    ///
    /// * `Ok(true)` - 处理了一个任务
    /// * `Ok(false)` - 队列为空
    /// * `Err(WorkerError)` - 仓库访问失败
    async fn process_next(&self) -> Result<bool, WorkerError> {
        let Some(job) = self.job_repo.dequeue().await? else {
            return Ok(false);
        };

        let url = match self.url_repo.find_by_id(job.url_id).await? {
            Some(url) => url,
            None => {
                warn!("Job {} references missing URL {}", job.id, job.url_id);
                self.job_repo.fail(job.id).await?;
                return Ok(true);
            }
        };

        match self.service.process_url(&url).await {
            Ok(page) => {
                info!(
                    "Fetched {} ({} links, status {})",
                    url.url,
                    page.links.len(),
                    page.status_code
                );
                self.job_repo.complete(job.id).await?;
            }
            Err(CrawlError::Filtered(reason)) => {
                info!("Skipped {}: {}", url.url, reason);
                self.job_repo.fail(job.id).await?;
            }
            Err(e) => {
                warn!("Failed {}: {}", url.url, e);
                self.job_repo.fail(job.id).await?;
            }
        }

        Ok(true)
    }
}

#[async_trait]
impl Worker for CrawlWorker {
    /// 运行爬取工作器
    async fn run(&self) -> Result<(), WorkerError> {
        info!("Crawl worker {} started", self.worker_id);

        loop {
            match self.process_next().await {
                Ok(true) => {}
                Ok(false) => sleep(Duration::from_secs(1)).await,
                Err(e) => {
                    error!("Worker {} error: {}", self.worker_id, e);
                    sleep(Duration::from_secs(1)).await;
                }
            }
        }
    }

    fn name(&self) -> &str {
        "crawl_worker"
    }
}
