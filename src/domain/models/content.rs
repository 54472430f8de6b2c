// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use chrono::{DateTime, FixedOffset, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// 内容分类枚举
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ContentClass {
    /// 纯文本
    Text,
    /// 文章
    Article,
    /// 博客
    Blog,
    /// 技术文档
    Documentation,
    /// 产品页
    Product,
    /// 首页
    Homepage,
    /// 其他
    #[default]
    Other,
}

impl fmt::Display for ContentClass {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ContentClass::Text => write!(f, "text"),
            ContentClass::Article => write!(f, "article"),
            ContentClass::Blog => write!(f, "blog"),
            ContentClass::Documentation => write!(f, "documentation"),
            ContentClass::Product => write!(f, "product"),
            ContentClass::Homepage => write!(f, "homepage"),
            ContentClass::Other => write!(f, "other"),
        }
    }
}

impl FromStr for ContentClass {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "text" => Ok(ContentClass::Text),
            "article" => Ok(ContentClass::Article),
            "blog" => Ok(ContentClass::Blog),
            "documentation" => Ok(ContentClass::Documentation),
            "product" => Ok(ContentClass::Product),
            "homepage" => Ok(ContentClass::Homepage),
            "other" => Ok(ContentClass::Other),
            _ => Err(()),
        }
    }
}

/// 实体类型枚举
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum EntityType {
    /// 人物
    Person,
    /// 组织
    Organization,
    /// 地点
    Location,
    /// 日期
    Date,
    /// 产品
    Product,
    /// 事件
    Event,
    /// 其他
    #[default]
    Other,
}

impl fmt::Display for EntityType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            EntityType::Person => write!(f, "person"),
            EntityType::Organization => write!(f, "organization"),
            EntityType::Location => write!(f, "location"),
            EntityType::Date => write!(f, "date"),
            EntityType::Product => write!(f, "product"),
            EntityType::Event => write!(f, "event"),
            EntityType::Other => write!(f, "other"),
        }
    }
}

impl FromStr for EntityType {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "person" => Ok(EntityType::Person),
            "organization" => Ok(EntityType::Organization),
            "location" => Ok(EntityType::Location),
            "date" => Ok(EntityType::Date),
            "product" => Ok(EntityType::Product),
            "event" => Ok(EntityType::Event),
            "other" => Ok(EntityType::Other),
            _ => Err(()),
        }
    }
}

/// 内容实体
///
/// 页面分析产出的派生记录。每个分析字段均为可选，
/// 缺失表示对应分析器失败或被跳过
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Content {
    /// 内容唯一标识符
    pub id: Uuid,
    /// 来源URL
    pub url: String,
    /// 标题
    pub title: String,
    /// 纯文本
    pub text: String,
    /// 原始HTML
    pub html: String,
    /// 摘要
    pub summary: Option<String>,
    /// 关键词，有序
    pub keywords: Vec<String>,
    /// 命名实体
    pub named_entities: Vec<NamedEntity>,
    /// 内容分类
    pub classification: Option<ContentClass>,
    /// 语言标签（BCP-47风格）
    pub language: Option<String>,
    /// 可读性评分
    pub readability_score: Option<f64>,
    /// 词数
    pub word_count: Option<i32>,
    /// 句数
    pub sentence_count: Option<i32>,
    /// 向量嵌入，长度为全局配置的维度
    pub vector_embedding: Option<Vec<f32>>,
    /// 主题
    pub topics: Vec<Topic>,
    /// 创建时间
    pub created_at: DateTime<FixedOffset>,
    /// 更新时间
    pub updated_at: DateTime<FixedOffset>,
}

impl Content {
    /// 创建一个新的内容实体
    pub fn new(url: String, title: String, text: String, html: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            url,
            title,
            text,
            html,
            summary: None,
            keywords: Vec::new(),
            named_entities: Vec::new(),
            classification: None,
            language: None,
            readability_score: None,
            word_count: None,
            sentence_count: None,
            vector_embedding: None,
            topics: Vec::new(),
            created_at: Utc::now().into(),
            updated_at: Utc::now().into(),
        }
    }

    /// 设置向量嵌入
    pub fn set_vector_embedding(&mut self, embedding: Vec<f32>) {
        self.vector_embedding = Some(embedding);
        self.touch();
    }

    /// 设置命名实体
    pub fn add_named_entities(&mut self, entities: Vec<NamedEntity>) {
        self.named_entities = entities;
        self.touch();
    }

    /// 设置主题
    pub fn add_topics(&mut self, topics: Vec<Topic>) {
        self.topics = topics;
        self.touch();
    }

    /// 设置内容分类
    pub fn set_classification(&mut self, class: ContentClass) {
        self.classification = Some(class);
        self.touch();
    }

    /// 设置摘要
    pub fn set_summary(&mut self, summary: String) {
        self.summary = Some(summary);
        self.touch();
    }

    /// 设置关键词
    pub fn set_keywords(&mut self, keywords: Vec<String>) {
        self.keywords = keywords;
        self.touch();
    }

    /// 设置语言
    pub fn set_language(&mut self, language: String) {
        self.language = Some(language);
        self.touch();
    }

    /// 设置可读性评分
    pub fn set_readability_score(&mut self, score: f64) {
        self.readability_score = Some(score);
        self.touch();
    }

    /// 设置词数
    pub fn set_word_count(&mut self, count: i32) {
        self.word_count = Some(count);
        self.touch();
    }

    /// 设置句数
    pub fn set_sentence_count(&mut self, count: i32) {
        self.sentence_count = Some(count);
        self.touch();
    }

    fn touch(&mut self) {
        self.updated_at = Utc::now().into();
    }
}

/// 命名实体
///
/// positions为实体在文本中出现的零基字符偏移，
/// 非空且严格递增
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NamedEntity {
    /// 实体唯一标识符
    pub id: Uuid,
    /// 实体文本
    pub text: String,
    /// 实体类型
    pub entity_type: EntityType,
    /// 出现次数
    pub count: i32,
    /// 出现位置（字符偏移）
    pub positions: Vec<usize>,
}

impl NamedEntity {
    /// 创建一个新的命名实体
    ///
    /// 出现次数由位置数量推导
    pub fn new(text: String, entity_type: EntityType, positions: Vec<usize>) -> Self {
        Self {
            id: Uuid::new_v4(),
            text,
            entity_type,
            count: positions.len() as i32,
            positions,
        }
    }
}

/// 主题
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Topic {
    /// 主题唯一标识符
    pub id: Uuid,
    /// 主题名称
    pub name: String,
    /// 主题关键词
    pub keywords: Vec<String>,
    /// 置信度，0到1之间
    pub confidence: f64,
}

impl Topic {
    /// 创建一个新的主题
    pub fn new(name: String, keywords: Vec<String>, confidence: f64) -> Self {
        Self {
            id: Uuid::new_v4(),
            name,
            keywords,
            confidence,
        }
    }
}

/// 相似内容对
///
/// 有序对，存储上不自动对称
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimilarContent {
    /// 源内容ID
    pub content_id: Uuid,
    /// 相似内容ID
    pub similar_to_id: Uuid,
    /// 余弦相似度，-1到1之间
    pub similarity_score: f64,
    /// 创建时间
    pub created_at: DateTime<FixedOffset>,
}

impl SimilarContent {
    /// 创建一个新的相似内容对
    pub fn new(content_id: Uuid, similar_to_id: Uuid, similarity_score: f64) -> Self {
        Self {
            content_id,
            similar_to_id,
            similarity_score,
            created_at: Utc::now().into(),
        }
    }
}
