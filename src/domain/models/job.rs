// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use chrono::{DateTime, FixedOffset, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// 爬取任务实体
///
/// 前沿队列中的一个工作单元，引用待抓取的URL。
/// 队列按 priority ASC, created_at ASC 排序，数值越小越紧急
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrawlJob {
    /// 任务唯一标识符
    pub id: Uuid,
    /// 待抓取URL的标识符
    pub url_id: Uuid,
    /// 任务优先级，种子为0，扩展链接为其深度
    pub priority: i32,
    /// 任务状态
    pub status: JobStatus,
    /// 创建时间
    pub created_at: DateTime<FixedOffset>,
    /// 开始处理时间
    pub started_at: Option<DateTime<FixedOffset>>,
}

/// 任务状态枚举
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    /// 等待处理
    #[default]
    Pending,
    /// 处理中，同一时刻至多一个工作器持有
    Processing,
    /// 处理完成
    Done,
    /// 处理失败
    Error,
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            JobStatus::Pending => write!(f, "pending"),
            JobStatus::Processing => write!(f, "processing"),
            JobStatus::Done => write!(f, "done"),
            JobStatus::Error => write!(f, "error"),
        }
    }
}

impl FromStr for JobStatus {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(JobStatus::Pending),
            "processing" => Ok(JobStatus::Processing),
            "done" => Ok(JobStatus::Done),
            "error" => Ok(JobStatus::Error),
            _ => Err(()),
        }
    }
}

impl CrawlJob {
    /// 创建一个新的爬取任务
    ///
    /// # 参数
    ///
    /// * `url_id` - 待抓取URL的标识符
    /// * `priority` - 优先级，数值越小越紧急
    pub fn new(url_id: Uuid, priority: i32) -> Self {
        Self {
            id: Uuid::new_v4(),
            url_id,
            priority,
            status: JobStatus::Pending,
            created_at: Utc::now().into(),
            started_at: None,
        }
    }
}
