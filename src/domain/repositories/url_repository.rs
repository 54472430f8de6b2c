// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::models::url::{CrawlUrl, UrlStatus};
use crate::domain::repositories::RepositoryError;

/// URL仓库特质
///
/// URL身份的唯一事实来源。normalized_url上的唯一约束
/// 在工作器之间串行化发现竞争：落败方观察到AlreadyExists并跳过
#[async_trait]
pub trait UrlRepository: Send + Sync {
    /// 保存新URL；规范化URL冲突时返回AlreadyExists
    async fn save(&self, url: &CrawlUrl) -> Result<CrawlUrl, RepositoryError>;

    /// 根据ID查找URL
    async fn find_by_id(&self, id: Uuid) -> Result<Option<CrawlUrl>, RepositoryError>;

    /// 根据规范化URL查找
    async fn find_by_normalized_url(
        &self,
        normalized_url: &str,
    ) -> Result<Option<CrawlUrl>, RepositoryError>;

    /// 查找等待抓取的URL
    async fn find_pending(&self, limit: u64) -> Result<Vec<CrawlUrl>, RepositoryError>;

    /// 更新URL状态
    async fn update_status(&self, id: Uuid, status: UrlStatus) -> Result<(), RepositoryError>;

    /// 递增尝试次数并记录尝试时间
    async fn increment_attempt_count(&self, id: Uuid) -> Result<(), RepositoryError>;

    /// 根据域名查找URL
    async fn find_by_domain(
        &self,
        domain: &str,
        limit: u64,
    ) -> Result<Vec<CrawlUrl>, RepositoryError>;

    /// 按状态统计URL数量
    async fn count_by_status(&self, status: UrlStatus) -> Result<u64, RepositoryError>;

    /// 重置长时间处于fetching状态的URL为pending
    ///
    /// 进程崩溃或取消会留下fetching残留，由维护任务定期回收
    async fn reset_stuck(&self, older_than: chrono::Duration) -> Result<u64, RepositoryError>;

    /// 删除早于指定天数的URL
    async fn delete_older_than(&self, days: i64) -> Result<u64, RepositoryError>;
}
