// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::models::content::{
    Content, ContentClass, EntityType, NamedEntity, SimilarContent, Topic,
};
use crate::domain::repositories::RepositoryError;

/// 内容仓库特质
///
/// 每个URL至多存在一条内容；重复保存时原地替换派生字段
#[async_trait]
pub trait ContentRepository: Send + Sync {
    /// 保存内容；同URL已存在时替换派生字段
    async fn save(&self, content: &Content) -> Result<Content, RepositoryError>;

    /// 根据ID查找内容
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Content>, RepositoryError>;

    /// 根据URL查找内容
    async fn find_by_url(&self, url: &str) -> Result<Option<Content>, RepositoryError>;

    /// 按分类查找内容
    async fn find_by_content_type(
        &self,
        class: ContentClass,
        limit: u64,
    ) -> Result<Vec<Content>, RepositoryError>;

    /// 按向量距离查找最近的内容
    ///
    /// 后端支持向量排序时使用之，否则线性扫描
    async fn find_nearest(
        &self,
        embedding: &[f32],
        limit: u64,
    ) -> Result<Vec<Content>, RepositoryError>;

    /// 按文本搜索内容
    async fn search(&self, query: &str, limit: u64) -> Result<Vec<Content>, RepositoryError>;

    /// 按分类统计内容数量
    async fn count_by_content_type(&self, class: ContentClass) -> Result<u64, RepositoryError>;

    /// 删除早于指定天数的内容
    async fn delete_older_than(&self, days: i64) -> Result<u64, RepositoryError>;
}

/// 命名实体仓库特质
#[async_trait]
pub trait NamedEntityRepository: Send + Sync {
    /// 保存实体并关联到内容
    async fn save(
        &self,
        entity: &NamedEntity,
        content_id: Uuid,
    ) -> Result<NamedEntity, RepositoryError>;

    /// 根据内容ID查找实体
    async fn find_by_content_id(
        &self,
        content_id: Uuid,
    ) -> Result<Vec<NamedEntity>, RepositoryError>;

    /// 按类型查找实体
    async fn find_by_type(
        &self,
        entity_type: EntityType,
        limit: u64,
    ) -> Result<Vec<NamedEntity>, RepositoryError>;

    /// 查找出现次数最多的实体
    async fn find_most_frequent(
        &self,
        entity_type: EntityType,
        limit: u64,
    ) -> Result<Vec<NamedEntity>, RepositoryError>;
}

/// 主题仓库特质
#[async_trait]
pub trait TopicRepository: Send + Sync {
    /// 保存主题并关联到内容
    async fn save(&self, topic: &Topic, content_id: Uuid) -> Result<Topic, RepositoryError>;

    /// 根据内容ID查找主题
    async fn find_by_content_id(&self, content_id: Uuid) -> Result<Vec<Topic>, RepositoryError>;

    /// 查找置信度最高的主题
    async fn find_most_confident(&self, limit: u64) -> Result<Vec<Topic>, RepositoryError>;
}

/// 相似内容仓库特质
#[async_trait]
pub trait SimilarContentRepository: Send + Sync {
    /// 保存相似内容对
    async fn save(&self, similar: &SimilarContent) -> Result<SimilarContent, RepositoryError>;

    /// 根据内容ID查找相似内容对
    async fn find_by_content_id(
        &self,
        content_id: Uuid,
        limit: u64,
    ) -> Result<Vec<SimilarContent>, RepositoryError>;

    /// 删除内容的全部相似记录
    async fn delete_by_content_id(&self, content_id: Uuid) -> Result<u64, RepositoryError>;
}
