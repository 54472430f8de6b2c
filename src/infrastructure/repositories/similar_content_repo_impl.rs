// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use async_trait::async_trait;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder,
    QuerySelect, Set,
};
use std::sync::Arc;
use uuid::Uuid;

use crate::domain::models::content::SimilarContent;
use crate::domain::repositories::{RepositoryError, SimilarContentRepository};
use crate::infrastructure::database::entities::similar_content as similar_entity;

/// 相似内容仓库实现
///
/// 有序对存储，不自动写入对称记录
#[derive(Clone)]
pub struct SimilarContentRepositoryImpl {
    /// 数据库连接
    db: Arc<DatabaseConnection>,
}

impl SimilarContentRepositoryImpl {
    /// 创建新的相似内容仓库实例
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }
}

impl From<similar_entity::Model> for SimilarContent {
    fn from(model: similar_entity::Model) -> Self {
        Self {
            content_id: model.content_id,
            similar_to_id: model.similar_to_id,
            similarity_score: model.similarity_score,
            created_at: model.created_at,
        }
    }
}

#[async_trait]
impl SimilarContentRepository for SimilarContentRepositoryImpl {
    async fn save(&self, similar: &SimilarContent) -> Result<SimilarContent, RepositoryError> {
        let model = similar_entity::ActiveModel {
            content_id: Set(similar.content_id),
            similar_to_id: Set(similar.similar_to_id),
            similarity_score: Set(similar.similarity_score),
            created_at: Set(similar.created_at),
        };
        model.insert(self.db.as_ref()).await?;
        Ok(similar.clone())
    }

    async fn find_by_content_id(
        &self,
        content_id: Uuid,
        limit: u64,
    ) -> Result<Vec<SimilarContent>, RepositoryError> {
        let models = similar_entity::Entity::find()
            .filter(similar_entity::Column::ContentId.eq(content_id))
            .order_by_desc(similar_entity::Column::SimilarityScore)
            .limit(limit)
            .all(self.db.as_ref())
            .await?;
        Ok(models.into_iter().map(Into::into).collect())
    }

    async fn delete_by_content_id(&self, content_id: Uuid) -> Result<u64, RepositoryError> {
        let result = similar_entity::Entity::delete_many()
            .filter(similar_entity::Column::ContentId.eq(content_id))
            .exec(self.db.as_ref())
            .await?;
        Ok(result.rows_affected)
    }
}
