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

use crate::domain::models::content::{EntityType, NamedEntity};
use crate::domain::repositories::{NamedEntityRepository, RepositoryError};
use crate::infrastructure::database::entities::named_entity as entity_entity;

/// 命名实体仓库实现
#[derive(Clone)]
pub struct NamedEntityRepositoryImpl {
    /// 数据库连接
    db: Arc<DatabaseConnection>,
}

impl NamedEntityRepositoryImpl {
    /// 创建新的命名实体仓库实例
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }
}

impl From<entity_entity::Model> for NamedEntity {
    fn from(model: entity_entity::Model) -> Self {
        let positions: Vec<usize> = serde_json::from_value(model.positions).unwrap_or_default();
        Self {
            id: model.id,
            text: model.text,
            entity_type: model.entity_type.parse().unwrap_or_default(),
            count: model.count,
            positions,
        }
    }
}

#[async_trait]
impl NamedEntityRepository for NamedEntityRepositoryImpl {
    async fn save(
        &self,
        entity: &NamedEntity,
        content_id: Uuid,
    ) -> Result<NamedEntity, RepositoryError> {
        let model = entity_entity::ActiveModel {
            id: Set(entity.id),
            content_id: Set(content_id),
            text: Set(entity.text.clone()),
            entity_type: Set(entity.entity_type.to_string()),
            count: Set(entity.count),
            positions: Set(serde_json::to_value(&entity.positions).unwrap_or(Value::Null)),
        };
        model.insert(self.db.as_ref()).await?;
        Ok(entity.clone())
    }

    async fn find_by_content_id(
        &self,
        content_id: Uuid,
    ) -> Result<Vec<NamedEntity>, RepositoryError> {
        let models = entity_entity::Entity::find()
            .filter(entity_entity::Column::ContentId.eq(content_id))
            .all(self.db.as_ref())
            .await?;
        Ok(models.into_iter().map(Into::into).collect())
    }

    async fn find_by_type(
        &self,
        entity_type: EntityType,
        limit: u64,
    ) -> Result<Vec<NamedEntity>, RepositoryError> {
        let models = entity_entity::Entity::find()
            .filter(entity_entity::Column::EntityType.eq(entity_type.to_string()))
            .limit(limit)
            .all(self.db.as_ref())
            .await?;
        Ok(models.into_iter().map(Into::into).collect())
    }

    async fn find_most_frequent(
        &self,
        entity_type: EntityType,
        limit: u64,
    ) -> Result<Vec<NamedEntity>, RepositoryError> {
        let models = entity_entity::Entity::find()
            .filter(entity_entity::Column::EntityType.eq(entity_type.to_string()))
            .order_by_desc(entity_entity::Column::Count)
            .limit(limit)
            .all(self.db.as_ref())
            .await?;
        Ok(models.into_iter().map(Into::into).collect())
    }
}
