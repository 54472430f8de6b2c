// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use std::sync::Arc;
use tokio::task::JoinHandle;
use tokio::time::{interval, Duration};
use tracing::{error, info};

use crate::domain::repositories::{CrawlJobRepository, UrlRepository};

/// 队列维护调度器
///
/// 后台维护任务：定期把取消或崩溃遗留的fetching状态URL
/// 和processing状态任务重置为pending，使其能被重新取走。
/// 实际的任务调度由工作器通过dequeue主动拉取
pub struct MaintenanceScheduler {
    /// URL仓库
    url_repo: Arc<dyn UrlRepository>,
    /// 任务仓库
    job_repo: Arc<dyn CrawlJobRepository>,
    /// 判定卡住的超时时间
    stuck_timeout: chrono::Duration,
    /// 检查间隔
    tick_interval: Duration,
}

impl MaintenanceScheduler {
    /// 创建新的维护调度器实例
    ///
    /// # 参数
    ///
    /// * `url_repo` - URL仓库
    /// * `job_repo` - 任务仓库
    pub fn new(url_repo: Arc<dyn UrlRepository>, job_repo: Arc<dyn CrawlJobRepository>) -> Self {
        Self {
            url_repo,
            job_repo,
            stuck_timeout: chrono::Duration::minutes(10),
            tick_interval: Duration::from_secs(60),
        }
    }

    /// 启动调度器后台任务
    ///
    /// # 返回值
    ///
    /// 返回后台任务的句柄
    pub fn start(&self) -> JoinHandle<()> {
        let url_repo = self.url_repo.clone();
        let job_repo = self.job_repo.clone();
        let stuck_timeout = self.stuck_timeout;
        let tick_interval = self.tick_interval;

        tokio::spawn(async move {
            let mut ticker = interval(tick_interval);

            loop {
                ticker.tick().await;

                match url_repo.reset_stuck(stuck_timeout).await {
                    Ok(count) if count > 0 => info!("Reset {} stuck URLs", count),
                    Ok(_) => {}
                    Err(e) => error!("Failed to reset stuck URLs: {}", e),
                }

                match job_repo.reset_stuck(stuck_timeout).await {
                    Ok(count) if count > 0 => info!("Reset {} stuck jobs", count),
                    Ok(_) => {}
                    Err(e) => error!("Failed to reset stuck jobs: {}", e),
                }
            }
        })
    }
}
