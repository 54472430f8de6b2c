// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::models::page::Page;
use crate::domain::repositories::RepositoryError;

/// 页面仓库特质
///
/// 每个URL至多存在一个页面（页面表上URL唯一）
#[async_trait]
pub trait PageRepository: Send + Sync {
    /// 保存页面
    async fn save(&self, page: &Page) -> Result<Page, RepositoryError>;

    /// 根据ID查找页面
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Page>, RepositoryError>;

    /// 根据URL查找页面
    async fn find_by_url(&self, url: &str) -> Result<Option<Page>, RepositoryError>;

    /// 查找最近抓取的页面
    async fn find_recent(&self, limit: u64) -> Result<Vec<Page>, RepositoryError>;

    /// 统计页面总数
    async fn count_pages(&self) -> Result<u64, RepositoryError>;

    /// 按文本内容搜索页面
    async fn search(&self, query: &str, limit: u64) -> Result<Vec<Page>, RepositoryError>;

    /// 删除早于指定天数的页面
    async fn delete_older_than(&self, days: i64) -> Result<u64, RepositoryError>;
}
