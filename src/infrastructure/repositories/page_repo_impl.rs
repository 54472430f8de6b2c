// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use async_trait::async_trait;
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, Set, SqlErr,
};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use uuid::Uuid;

use crate::domain::models::page::Page;
use crate::domain::repositories::{PageRepository, RepositoryError};
use crate::infrastructure::database::entities::page as page_entity;

/// 页面仓库实现
///
/// 基于SeaORM实现的页面数据访问层
#[derive(Clone)]
pub struct PageRepositoryImpl {
    /// 数据库连接
    db: Arc<DatabaseConnection>,
}

impl PageRepositoryImpl {
    /// 创建新的页面仓库实例
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }
}

impl From<page_entity::Model> for Page {
    fn from(model: page_entity::Model) -> Self {
        let headers: HashMap<String, String> =
            serde_json::from_value(model.headers).unwrap_or_default();
        let links: Vec<String> = serde_json::from_value(model.links).unwrap_or_default();

        Self {
            id: model.id,
            url: model.url,
            status_code: model.status_code as u16,
            title: model.title,
            html: model.html,
            plain_text: model.plain_text,
            headers,
            links,
            content_type: model.content_type,
            fetched_at: model.fetched_at,
            parsed_at: model.parsed_at,
        }
    }
}

impl From<Page> for page_entity::ActiveModel {
    fn from(page: Page) -> Self {
        Self {
            id: Set(page.id),
            url: Set(page.url),
            status_code: Set(page.status_code as i32),
            title: Set(page.title),
            html: Set(page.html),
            plain_text: Set(page.plain_text),
            headers: Set(serde_json::to_value(&page.headers).unwrap_or(Value::Null)),
            links: Set(serde_json::to_value(&page.links).unwrap_or(Value::Null)),
            content_type: Set(page.content_type),
            fetched_at: Set(page.fetched_at),
            parsed_at: Set(page.parsed_at),
        }
    }
}

#[async_trait]
impl PageRepository for PageRepositoryImpl {
    async fn save(&self, page: &Page) -> Result<Page, RepositoryError> {
        let model: page_entity::ActiveModel = page.clone().into();
        match model.insert(self.db.as_ref()).await {
            Ok(_) => Ok(page.clone()),
            Err(e) => {
                if matches!(e.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) {
                    Err(RepositoryError::AlreadyExists)
                } else {
                    Err(e.into())
                }
            }
        }
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Page>, RepositoryError> {
        let model = page_entity::Entity::find_by_id(id)
            .one(self.db.as_ref())
            .await?;
        Ok(model.map(Into::into))
    }

    async fn find_by_url(&self, url: &str) -> Result<Option<Page>, RepositoryError> {
        let model = page_entity::Entity::find()
            .filter(page_entity::Column::Url.eq(url))
            .one(self.db.as_ref())
            .await?;
        Ok(model.map(Into::into))
    }

    async fn find_recent(&self, limit: u64) -> Result<Vec<Page>, RepositoryError> {
        let models = page_entity::Entity::find()
            .order_by_desc(page_entity::Column::FetchedAt)
            .limit(limit)
            .all(self.db.as_ref())
            .await?;
        Ok(models.into_iter().map(Into::into).collect())
    }

    async fn count_pages(&self) -> Result<u64, RepositoryError> {
        let count = page_entity::Entity::find().count(self.db.as_ref()).await?;
        Ok(count)
    }

    async fn search(&self, query: &str, limit: u64) -> Result<Vec<Page>, RepositoryError> {
        let models = page_entity::Entity::find()
            .filter(
                Condition::any()
                    .add(page_entity::Column::Title.contains(query))
                    .add(page_entity::Column::PlainText.contains(query)),
            )
            .order_by_desc(page_entity::Column::FetchedAt)
            .limit(limit)
            .all(self.db.as_ref())
            .await?;
        Ok(models.into_iter().map(Into::into).collect())
    }

    async fn delete_older_than(&self, days: i64) -> Result<u64, RepositoryError> {
        let cutoff = Utc::now() - chrono::Duration::days(days);
        let result = page_entity::Entity::delete_many()
            .filter(page_entity::Column::FetchedAt.lt(cutoff))
            .exec(self.db.as_ref())
            .await?;
        Ok(result.rows_affected)
    }
}
