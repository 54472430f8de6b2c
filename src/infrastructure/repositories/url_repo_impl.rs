// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use async_trait::async_trait;
use chrono::Utc;
use sea_orm::{
    sea_query::Expr, ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set, SqlErr,
};
use std::sync::Arc;
use uuid::Uuid;

use crate::domain::models::url::{CrawlUrl, UrlStatus};
use crate::domain::repositories::{RepositoryError, UrlRepository};
use crate::infrastructure::database::entities::url as url_entity;

/// URL仓库实现
///
/// 基于SeaORM实现的URL数据访问层。normalized_url上的
/// 唯一约束把并发发现竞争转化为AlreadyExists
#[derive(Clone)]
pub struct UrlRepositoryImpl {
    /// 数据库连接
    db: Arc<DatabaseConnection>,
}

impl UrlRepositoryImpl {
    /// 创建新的URL仓库实例
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }
}

impl From<url_entity::Model> for CrawlUrl {
    fn from(model: url_entity::Model) -> Self {
        Self {
            id: model.id,
            url: model.url,
            normalized_url: model.normalized_url,
            depth: model.depth,
            status: model.status.parse().unwrap_or_default(),
            parent_url: model.parent_url,
            attempt_count: model.attempt_count,
            last_attempt: model.last_attempt,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

impl From<CrawlUrl> for url_entity::ActiveModel {
    fn from(url: CrawlUrl) -> Self {
        Self {
            id: Set(url.id),
            url: Set(url.url),
            normalized_url: Set(url.normalized_url),
            depth: Set(url.depth),
            status: Set(url.status.to_string()),
            parent_url: Set(url.parent_url),
            attempt_count: Set(url.attempt_count),
            last_attempt: Set(url.last_attempt),
            created_at: Set(url.created_at),
            updated_at: Set(url.updated_at),
        }
    }
}

#[async_trait]
impl UrlRepository for UrlRepositoryImpl {
    async fn save(&self, url: &CrawlUrl) -> Result<CrawlUrl, RepositoryError> {
        let model: url_entity::ActiveModel = url.clone().into();

        match model.insert(self.db.as_ref()).await {
            Ok(_) => Ok(url.clone()),
            Err(e) => {
                if matches!(e.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) {
                    Err(RepositoryError::AlreadyExists)
                } else {
                    Err(e.into())
                }
            }
        }
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<CrawlUrl>, RepositoryError> {
        let model = url_entity::Entity::find_by_id(id)
            .one(self.db.as_ref())
            .await?;
        Ok(model.map(Into::into))
    }

    async fn find_by_normalized_url(
        &self,
        normalized_url: &str,
    ) -> Result<Option<CrawlUrl>, RepositoryError> {
        let model = url_entity::Entity::find()
            .filter(url_entity::Column::NormalizedUrl.eq(normalized_url))
            .one(self.db.as_ref())
            .await?;
        Ok(model.map(Into::into))
    }

    async fn find_pending(&self, limit: u64) -> Result<Vec<CrawlUrl>, RepositoryError> {
        let models = url_entity::Entity::find()
            .filter(url_entity::Column::Status.eq(UrlStatus::Pending.to_string()))
            .order_by_asc(url_entity::Column::CreatedAt)
            .limit(limit)
            .all(self.db.as_ref())
            .await?;
        Ok(models.into_iter().map(Into::into).collect())
    }

    async fn update_status(&self, id: Uuid, status: UrlStatus) -> Result<(), RepositoryError> {
        let result = url_entity::Entity::update_many()
            .col_expr(url_entity::Column::Status, Expr::value(status.to_string()))
            .col_expr(
                url_entity::Column::UpdatedAt,
                Expr::value(chrono::DateTime::<chrono::FixedOffset>::from(Utc::now())),
            )
            .filter(url_entity::Column::Id.eq(id))
            .exec(self.db.as_ref())
            .await?;

        if result.rows_affected == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    async fn increment_attempt_count(&self, id: Uuid) -> Result<(), RepositoryError> {
        let now = chrono::DateTime::<chrono::FixedOffset>::from(Utc::now());
        let result = url_entity::Entity::update_many()
            .col_expr(
                url_entity::Column::AttemptCount,
                Expr::col(url_entity::Column::AttemptCount).add(1),
            )
            .col_expr(url_entity::Column::LastAttempt, Expr::value(Some(now)))
            .col_expr(url_entity::Column::UpdatedAt, Expr::value(now))
            .filter(url_entity::Column::Id.eq(id))
            .exec(self.db.as_ref())
            .await?;

        if result.rows_affected == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    async fn find_by_domain(
        &self,
        domain: &str,
        limit: u64,
    ) -> Result<Vec<CrawlUrl>, RepositoryError> {
        let models = url_entity::Entity::find()
            .filter(url_entity::Column::NormalizedUrl.contains(domain))
            .order_by_desc(url_entity::Column::CreatedAt)
            .limit(limit)
            .all(self.db.as_ref())
            .await?;
        Ok(models.into_iter().map(Into::into).collect())
    }

    async fn count_by_status(&self, status: UrlStatus) -> Result<u64, RepositoryError> {
        let count = url_entity::Entity::find()
            .filter(url_entity::Column::Status.eq(status.to_string()))
            .count(self.db.as_ref())
            .await?;
        Ok(count)
    }

    async fn reset_stuck(&self, older_than: chrono::Duration) -> Result<u64, RepositoryError> {
        let threshold = Utc::now() - older_than;
        let result = url_entity::Entity::update_many()
            .col_expr(
                url_entity::Column::Status,
                Expr::value(UrlStatus::Pending.to_string()),
            )
            .col_expr(
                url_entity::Column::UpdatedAt,
                Expr::value(chrono::DateTime::<chrono::FixedOffset>::from(Utc::now())),
            )
            .filter(url_entity::Column::Status.eq(UrlStatus::Fetching.to_string()))
            .filter(url_entity::Column::UpdatedAt.lt(threshold))
            .exec(self.db.as_ref())
            .await?;
        Ok(result.rows_affected)
    }

    async fn delete_older_than(&self, days: i64) -> Result<u64, RepositoryError> {
        let cutoff = Utc::now() - chrono::Duration::days(days);
        let result = url_entity::Entity::delete_many()
            .filter(url_entity::Column::CreatedAt.lt(cutoff))
            .exec(self.db.as_ref())
            .await?;
        Ok(result.rows_affected)
    }
}
