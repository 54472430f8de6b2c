// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use sea_orm::DbErr;
use thiserror::Error;

/// 内容仓库接口模块
pub mod content_repository;

/// 任务仓库接口模块
pub mod job_repository;

/// 页面仓库接口模块
pub mod page_repository;

/// URL仓库接口模块
pub mod url_repository;

pub use content_repository::{
    ContentRepository, NamedEntityRepository, SimilarContentRepository, TopicRepository,
};
pub use job_repository::CrawlJobRepository;
pub use page_repository::PageRepository;
pub use url_repository::UrlRepository;

/// 仓库错误类型
#[derive(Error, Debug)]
pub enum RepositoryError {
    /// 数据库错误
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
    /// 记录未找到
    #[error("Record not found")]
    NotFound,
    /// 记录已存在（唯一约束冲突）
    #[error("Record already exists")]
    AlreadyExists,
    /// 存储后端错误
    #[error("Storage error: {0}")]
    Storage(String),
}
