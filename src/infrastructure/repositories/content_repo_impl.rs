// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use async_trait::async_trait;
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, Set,
};
use serde_json::Value;
use std::sync::Arc;
use uuid::Uuid;

use crate::domain::models::content::{Content, ContentClass};
use crate::domain::repositories::{ContentRepository, RepositoryError};
use crate::infrastructure::database::entities::content as content_entity;
use crate::infrastructure::ml::similarity;

/// 内容仓库实现
///
/// 基于SeaORM实现的内容数据访问层。命名实体与主题由各自
/// 仓库存取，这里只负责contents表。find_nearest读出候选
/// 嵌入后在进程内用相似度核心排序（线性扫描）
#[derive(Clone)]
pub struct ContentRepositoryImpl {
    /// 数据库连接
    db: Arc<DatabaseConnection>,
}

impl ContentRepositoryImpl {
    /// 创建新的内容仓库实例
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }
}

impl From<content_entity::Model> for Content {
    fn from(model: content_entity::Model) -> Self {
        let keywords: Vec<String> = serde_json::from_value(model.keywords).unwrap_or_default();
        let vector_embedding: Option<Vec<f32>> = model
            .vector_embedding
            .and_then(|v| serde_json::from_value(v).ok());

        Self {
            id: model.id,
            url: model.url,
            title: model.title,
            text: model.text,
            html: model.html,
            summary: model.summary,
            keywords,
            named_entities: Vec::new(),
            classification: model.classification.and_then(|c| c.parse().ok()),
            language: model.language,
            readability_score: model.readability_score,
            word_count: model.word_count,
            sentence_count: model.sentence_count,
            vector_embedding,
            topics: Vec::new(),
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

impl From<Content> for content_entity::ActiveModel {
    fn from(content: Content) -> Self {
        Self {
            id: Set(content.id),
            url: Set(content.url),
            title: Set(content.title),
            text: Set(content.text),
            html: Set(content.html),
            summary: Set(content.summary),
            keywords: Set(serde_json::to_value(&content.keywords).unwrap_or(Value::Null)),
            classification: Set(content.classification.map(|c| c.to_string())),
            language: Set(content.language),
            readability_score: Set(content.readability_score),
            word_count: Set(content.word_count),
            sentence_count: Set(content.sentence_count),
            vector_embedding: Set(content
                .vector_embedding
                .as_ref()
                .and_then(|v| serde_json::to_value(v).ok())),
            created_at: Set(content.created_at),
            updated_at: Set(content.updated_at),
        }
    }
}

#[async_trait]
impl ContentRepository for ContentRepositoryImpl {
    async fn save(&self, content: &Content) -> Result<Content, RepositoryError> {
        // 同URL重复分析时原地替换派生字段
        let existing = content_entity::Entity::find()
            .filter(content_entity::Column::Url.eq(content.url.as_str()))
            .one(self.db.as_ref())
            .await?;

        let mut model: content_entity::ActiveModel = content.clone().into();
        match existing {
            Some(current) => {
                model.id = Set(current.id);
                model.created_at = Set(current.created_at);
                model.updated_at = Set(Utc::now().into());
                let updated = model.update(self.db.as_ref()).await?;
                Ok(updated.into())
            }
            None => {
                model.insert(self.db.as_ref()).await?;
                Ok(content.clone())
            }
        }
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Content>, RepositoryError> {
        let model = content_entity::Entity::find_by_id(id)
            .one(self.db.as_ref())
            .await?;
        Ok(model.map(Into::into))
    }

    async fn find_by_url(&self, url: &str) -> Result<Option<Content>, RepositoryError> {
        let model = content_entity::Entity::find()
            .filter(content_entity::Column::Url.eq(url))
            .one(self.db.as_ref())
            .await?;
        Ok(model.map(Into::into))
    }

    async fn find_by_content_type(
        &self,
        class: ContentClass,
        limit: u64,
    ) -> Result<Vec<Content>, RepositoryError> {
        let models = content_entity::Entity::find()
            .filter(content_entity::Column::Classification.eq(class.to_string()))
            .order_by_desc(content_entity::Column::UpdatedAt)
            .limit(limit)
            .all(self.db.as_ref())
            .await?;
        Ok(models.into_iter().map(Into::into).collect())
    }

    async fn find_nearest(
        &self,
        embedding: &[f32],
        limit: u64,
    ) -> Result<Vec<Content>, RepositoryError> {
        let models = content_entity::Entity::find()
            .filter(content_entity::Column::VectorEmbedding.is_not_null())
            .all(self.db.as_ref())
            .await?;

        let contents: Vec<Content> = models.into_iter().map(Into::into).collect();
        let embeddings: Vec<Vec<f32>> = contents
            .iter()
            .map(|c| c.vector_embedding.clone().unwrap_or_default())
            .collect();

        let ranked = similarity::find_most_similar(embedding, &embeddings, limit as usize);
        let mut out = Vec::with_capacity(ranked.len());
        let mut contents: Vec<Option<Content>> = contents.into_iter().map(Some).collect();
        for idx in ranked {
            if let Some(content) = contents[idx].take() {
                out.push(content);
            }
        }
        Ok(out)
    }

    async fn search(&self, query: &str, limit: u64) -> Result<Vec<Content>, RepositoryError> {
        let models = content_entity::Entity::find()
            .filter(
                Condition::any()
                    .add(content_entity::Column::Title.contains(query))
                    .add(content_entity::Column::Text.contains(query)),
            )
            .order_by_desc(content_entity::Column::UpdatedAt)
            .limit(limit)
            .all(self.db.as_ref())
            .await?;
        Ok(models.into_iter().map(Into::into).collect())
    }

    async fn count_by_content_type(&self, class: ContentClass) -> Result<u64, RepositoryError> {
        let count = content_entity::Entity::find()
            .filter(content_entity::Column::Classification.eq(class.to_string()))
            .count(self.db.as_ref())
            .await?;
        Ok(count)
    }

    async fn delete_older_than(&self, days: i64) -> Result<u64, RepositoryError> {
        let cutoff = Utc::now() - chrono::Duration::days(days);
        let result = content_entity::Entity::delete_many()
            .filter(content_entity::Column::CreatedAt.lt(cutoff))
            .exec(self.db.as_ref())
            .await?;
        Ok(result.rows_affected)
    }
}
