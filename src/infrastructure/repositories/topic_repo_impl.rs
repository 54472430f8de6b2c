// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use async_trait::async_trait;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder,
    QuerySelect, Set,
};
use serde_json::Value;
use std::sync::Arc;
use uuid::Uuid;

use crate::domain::models::content::Topic;
use crate::domain::repositories::{RepositoryError, TopicRepository};
use crate::infrastructure::database::entities::topic as topic_entity;

/// 主题仓库实现
#[derive(Clone)]
pub struct TopicRepositoryImpl {
    /// 数据库连接
    db: Arc<DatabaseConnection>,
}

impl TopicRepositoryImpl {
    /// 创建新的主题仓库实例
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }
}

impl From<topic_entity::Model> for Topic {
    fn from(model: topic_entity::Model) -> Self {
        let keywords: Vec<String> = serde_json::from_value(model.keywords).unwrap_or_default();
        Self {
            id: model.id,
            name: model.name,
            keywords,
            confidence: model.confidence,
        }
    }
}

#[async_trait]
impl TopicRepository for TopicRepositoryImpl {
    async fn save(&self, topic: &Topic, content_id: Uuid) -> Result<Topic, RepositoryError> {
        let model = topic_entity::ActiveModel {
            id: Set(topic.id),
            content_id: Set(content_id),
            name: Set(topic.name.clone()),
            keywords: Set(serde_json::to_value(&topic.keywords).unwrap_or(Value::Null)),
            confidence: Set(topic.confidence),
        };
        model.insert(self.db.as_ref()).await?;
        Ok(topic.clone())
    }

    async fn find_by_content_id(&self, content_id: Uuid) -> Result<Vec<Topic>, RepositoryError> {
        let models = topic_entity::Entity::find()
            .filter(topic_entity::Column::ContentId.eq(content_id))
            .all(self.db.as_ref())
            .await?;
        Ok(models.into_iter().map(Into::into).collect())
    }

    async fn find_most_confident(&self, limit: u64) -> Result<Vec<Topic>, RepositoryError> {
        let models = topic_entity::Entity::find()
            .order_by_desc(topic_entity::Column::Confidence)
            .limit(limit)
            .all(self.db.as_ref())
            .await?;
        Ok(models.into_iter().map(Into::into).collect())
    }
}
