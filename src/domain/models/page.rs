// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use chrono::{DateTime, FixedOffset, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

/// 页面实体
///
/// 表示一个已抓取的网页。仅当对应URL达到fetched状态时存在
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Page {
    /// 页面唯一标识符
    pub id: Uuid,
    /// 页面URL
    pub url: String,
    /// HTTP状态码
    pub status_code: u16,
    /// 页面标题
    pub title: String,
    /// 原始HTML
    pub html: String,
    /// 提取的纯文本
    pub plain_text: String,
    /// 响应头（首值）
    pub headers: HashMap<String, String>,
    /// 出链，按文档顺序，仅http/https协议
    pub links: Vec<String>,
    /// Content-Type响应头
    pub content_type: String,
    /// 抓取时间
    pub fetched_at: DateTime<FixedOffset>,
    /// 解析时间
    pub parsed_at: Option<DateTime<FixedOffset>>,
}

impl Page {
    /// 创建一个新的页面实体
    pub fn new(
        url: String,
        status_code: u16,
        html: String,
        headers: HashMap<String, String>,
        content_type: String,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            url,
            status_code,
            title: String::new(),
            html,
            plain_text: String::new(),
            headers,
            links: Vec::new(),
            content_type,
            fetched_at: Utc::now().into(),
            parsed_at: None,
        }
    }

    /// 设置页面标题
    pub fn set_title(&mut self, title: String) {
        self.title = title;
        self.parsed_at = Some(Utc::now().into());
    }

    /// 设置提取的纯文本
    pub fn set_plain_text(&mut self, text: String) {
        self.plain_text = text;
        self.parsed_at = Some(Utc::now().into());
    }

    /// 设置提取的出链
    pub fn add_links(&mut self, links: Vec<String>) {
        self.links = links;
        self.parsed_at = Some(Utc::now().into());
    }

    /// 响应是否为成功状态
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status_code)
    }
}
