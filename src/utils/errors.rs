// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use thiserror::Error;

use crate::domain::repositories::RepositoryError;
use crate::engines::traits::EngineError;

/// 爬取错误类型
///
/// 单个URL处理过程中可能出现的所有错误种类
#[derive(Error, Debug)]
pub enum CrawlError {
    /// URL解析或规范化失败
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// 被策略拒绝（过滤器或robots.txt）
    #[error("Rejected by policy: {0}")]
    Filtered(String),

    /// 网络错误（DNS、TCP、TLS、超时、重定向溢出）
    #[error("Network error: {0}")]
    Network(#[from] EngineError),

    /// 非2xx响应
    #[error("Protocol error: status {0}")]
    Protocol(u16),

    /// HTML解析失败
    #[error("Parse error: {0}")]
    Parse(String),

    /// 仓库错误
    #[error("Repository error: {0}")]
    Repository(#[from] RepositoryError),

    /// 操作被取消
    #[error("Cancelled")]
    Cancelled,
}

/// Worker错误类型
#[derive(Error, Debug)]
pub enum WorkerError {
    #[error("Repository error: {0}")]
    Repository(#[from] RepositoryError),

    #[error("Internal error: {0}")]
    Internal(String),
}
