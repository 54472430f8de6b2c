// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use async_trait::async_trait;
use chrono::Utc;
use sea_orm::{
    sea_query::{Expr, LockBehavior, LockType},
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, Set, TransactionTrait,
};
use std::sync::Arc;
use uuid::Uuid;

use crate::domain::models::job::{CrawlJob, JobStatus};
use crate::domain::repositories::{CrawlJobRepository, RepositoryError};
use crate::infrastructure::database::entities::crawl_job as job_entity;

/// 爬取任务仓库实现
///
/// 基于SeaORM实现的前沿队列。dequeue在事务内用
/// FOR UPDATE SKIP LOCKED预留下一个pending任务并翻转为
/// processing，保证同一任务至多被一个工作器取走
#[derive(Clone)]
pub struct CrawlJobRepositoryImpl {
    /// 数据库连接
    db: Arc<DatabaseConnection>,
}

impl CrawlJobRepositoryImpl {
    /// 创建新的任务仓库实例
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }
}

impl From<job_entity::Model> for CrawlJob {
    fn from(model: job_entity::Model) -> Self {
        Self {
            id: model.id,
            url_id: model.url_id,
            priority: model.priority,
            status: model.status.parse().unwrap_or_default(),
            created_at: model.created_at,
            started_at: model.started_at,
        }
    }
}

impl From<CrawlJob> for job_entity::ActiveModel {
    fn from(job: CrawlJob) -> Self {
        Self {
            id: Set(job.id),
            url_id: Set(job.url_id),
            priority: Set(job.priority),
            status: Set(job.status.to_string()),
            created_at: Set(job.created_at),
            started_at: Set(job.started_at),
        }
    }
}

#[async_trait]
impl CrawlJobRepository for CrawlJobRepositoryImpl {
    async fn enqueue(&self, job: &CrawlJob) -> Result<CrawlJob, RepositoryError> {
        let model: job_entity::ActiveModel = job.clone().into();
        model.insert(self.db.as_ref()).await?;
        Ok(job.clone())
    }

    async fn dequeue(&self) -> Result<Option<CrawlJob>, RepositoryError> {
        let txn = self.db.begin().await?;

        let job = job_entity::Entity::find()
            .filter(job_entity::Column::Status.eq(JobStatus::Pending.to_string()))
            .order_by_asc(job_entity::Column::Priority)
            .order_by_asc(job_entity::Column::CreatedAt)
            .lock_with_behavior(LockType::Update, LockBehavior::SkipLocked)
            .one(&txn)
            .await?;

        if let Some(job) = job {
            let mut active: job_entity::ActiveModel = job.into();
            active.status = Set(JobStatus::Processing.to_string());
            active.started_at = Set(Some(Utc::now().into()));

            let updated = active.update(&txn).await?;
            txn.commit().await?;

            return Ok(Some(updated.into()));
        }

        txn.commit().await?;
        Ok(None)
    }

    async fn complete(&self, id: Uuid) -> Result<(), RepositoryError> {
        self.set_status(id, JobStatus::Done).await
    }

    async fn fail(&self, id: Uuid) -> Result<(), RepositoryError> {
        self.set_status(id, JobStatus::Error).await
    }

    async fn count(&self) -> Result<u64, RepositoryError> {
        let count = job_entity::Entity::find()
            .filter(job_entity::Column::Status.eq(JobStatus::Pending.to_string()))
            .count(self.db.as_ref())
            .await?;
        Ok(count)
    }

    async fn reset_stuck(&self, older_than: chrono::Duration) -> Result<u64, RepositoryError> {
        let threshold = Utc::now() - older_than;
        let result = job_entity::Entity::update_many()
            .col_expr(
                job_entity::Column::Status,
                Expr::value(JobStatus::Pending.to_string()),
            )
            .filter(job_entity::Column::Status.eq(JobStatus::Processing.to_string()))
            .filter(job_entity::Column::StartedAt.lt(threshold))
            .exec(self.db.as_ref())
            .await?;
        Ok(result.rows_affected)
    }

    async fn clear(&self) -> Result<u64, RepositoryError> {
        let result = job_entity::Entity::delete_many()
            .filter(job_entity::Column::Status.eq(JobStatus::Pending.to_string()))
            .exec(self.db.as_ref())
            .await?;
        Ok(result.rows_affected)
    }
}

impl CrawlJobRepositoryImpl {
    async fn set_status(&self, id: Uuid, status: JobStatus) -> Result<(), RepositoryError> {
        let result = job_entity::Entity::update_many()
            .col_expr(job_entity::Column::Status, Expr::value(status.to_string()))
            .filter(job_entity::Column::Id.eq(id))
            .exec(self.db.as_ref())
            .await?;

        if result.rows_affected == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }
}
