// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::models::job::CrawlJob;
use crate::domain::repositories::RepositoryError;

/// 爬取任务仓库特质
///
/// 前沿队列的持久化边界。dequeue必须是原子预留：
/// 读取下一个pending任务并翻转为processing，跳过其他
/// 工作器锁定的行，保证同一任务至多被一个工作器取走
#[async_trait]
pub trait CrawlJobRepository: Send + Sync {
    /// 入队任务
    async fn enqueue(&self, job: &CrawlJob) -> Result<CrawlJob, RepositoryError>;

    /// 原子取出下一个任务
    ///
    /// 按 priority ASC, created_at ASC 排序；无可用任务时返回None
    async fn dequeue(&self) -> Result<Option<CrawlJob>, RepositoryError>;

    /// 标记任务处理完成
    async fn complete(&self, id: Uuid) -> Result<(), RepositoryError>;

    /// 标记任务处理失败
    async fn fail(&self, id: Uuid) -> Result<(), RepositoryError>;

    /// 统计队列中等待的任务数
    async fn count(&self) -> Result<u64, RepositoryError>;

    /// 重置长时间处于processing状态的任务为pending
    async fn reset_stuck(&self, older_than: chrono::Duration) -> Result<u64, RepositoryError>;

    /// 清空队列中等待的任务
    async fn clear(&self) -> Result<u64, RepositoryError>;
}
