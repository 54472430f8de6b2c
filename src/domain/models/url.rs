// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use chrono::{DateTime, FixedOffset, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::utils::errors::CrawlError;
use crate::utils::url_utils::normalize_url;

/// URL实体
///
/// 表示爬取过程中发现的一个URL及其生命周期状态
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrawlUrl {
    /// URL唯一标识符
    pub id: Uuid,
    /// 提交时的原始URL
    pub url: String,
    /// 规范化URL，全局唯一，作为去重键
    pub normalized_url: String,
    /// 发现深度，种子为0
    pub depth: i32,
    /// URL状态
    pub status: UrlStatus,
    /// 发现该URL的父URL，种子为空
    pub parent_url: String,
    /// 已尝试抓取次数
    pub attempt_count: i32,
    /// 最近一次尝试时间
    pub last_attempt: Option<DateTime<FixedOffset>>,
    /// 创建时间
    pub created_at: DateTime<FixedOffset>,
    /// 更新时间
    pub updated_at: DateTime<FixedOffset>,
}

/// URL状态枚举
///
/// 状态只沿 pending → fetching → {fetched, failed} 转换
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum UrlStatus {
    /// 等待抓取
    #[default]
    Pending,
    /// 抓取中
    Fetching,
    /// 抓取完成
    Fetched,
    /// 抓取失败
    Failed,
}

impl fmt::Display for UrlStatus {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            UrlStatus::Pending => write!(f, "pending"),
            UrlStatus::Fetching => write!(f, "fetching"),
            UrlStatus::Fetched => write!(f, "fetched"),
            UrlStatus::Failed => write!(f, "failed"),
        }
    }
}

impl FromStr for UrlStatus {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(UrlStatus::Pending),
            "fetching" => Ok(UrlStatus::Fetching),
            "fetched" => Ok(UrlStatus::Fetched),
            "failed" => Ok(UrlStatus::Failed),
            _ => Err(()),
        }
    }
}

impl CrawlUrl {
    /// 创建一个新的URL实体
    ///
    /// 解析并规范化原始URL；无法解析时返回错误
    ///
    /// # 参数
    ///
    /// * `raw_url` - 原始URL字符串
    /// * `depth` - 发现深度
    /// * `parent_url` - 父URL，种子为空字符串
    ///
    /// # 返回值
    ///
    /// * `Ok(CrawlUrl)` - 新创建的URL实体
    /// * `Err(CrawlError)` - URL无效
    pub fn new(raw_url: &str, depth: i32, parent_url: &str) -> Result<Self, CrawlError> {
        let normalized = normalize_url(raw_url)?;

        Ok(Self {
            id: Uuid::new_v4(),
            url: raw_url.to_string(),
            normalized_url: normalized,
            depth,
            status: UrlStatus::Pending,
            parent_url: parent_url.to_string(),
            attempt_count: 0,
            last_attempt: None,
            created_at: Utc::now().into(),
            updated_at: Utc::now().into(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_seed_url() {
        let url = CrawlUrl::new("https://example.com/a#frag", 0, "").unwrap();
        assert_eq!(url.normalized_url, "https://example.com/a");
        assert_eq!(url.status, UrlStatus::Pending);
        assert_eq!(url.depth, 0);
        assert_eq!(url.attempt_count, 0);
        assert!(url.parent_url.is_empty());
    }

    #[test]
    fn test_new_rejects_invalid_url() {
        assert!(CrawlUrl::new("http://[bad", 0, "").is_err());
    }

    #[test]
    fn test_status_round_trip() {
        for status in [
            UrlStatus::Pending,
            UrlStatus::Fetching,
            UrlStatus::Fetched,
            UrlStatus::Failed,
        ] {
            assert_eq!(status.to_string().parse::<UrlStatus>().unwrap(), status);
        }
    }
}
