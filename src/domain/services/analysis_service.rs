// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, instrument};

use crate::config::settings::AnalysisSettings;
use crate::domain::models::content::{Content, ContentClass, NamedEntity, Topic};

/// 分析错误类型
#[derive(Error, Debug)]
pub enum AnalysisError {
    /// 向量维度不一致
    #[error("Dimension mismatch: {left} != {right}")]
    DimensionMismatch { left: usize, right: usize },
    /// 输入为空
    #[error("Empty input")]
    EmptyInput,
    /// 分析器失败
    #[error("Analyzer failed: {0}")]
    Failed(String),
}

/// 文本向量化能力
#[async_trait]
pub trait TextVectorizer: Send + Sync {
    /// 为文本生成向量嵌入
    async fn vectorize(&self, text: &str) -> Result<Vec<f32>, AnalysisError>;
}

/// 主题提取能力
#[async_trait]
pub trait TopicModeler: Send + Sync {
    /// 从文本提取主题
    async fn extract_topics(
        &self,
        text: &str,
        num_topics: usize,
    ) -> Result<Vec<Topic>, AnalysisError>;
}

/// 命名实体识别能力
#[async_trait]
pub trait NamedEntityRecognizer: Send + Sync {
    /// 从文本提取命名实体
    async fn extract_entities(&self, text: &str) -> Result<Vec<NamedEntity>, AnalysisError>;
}

/// 内容分类能力
#[async_trait]
pub trait ContentClassifier: Send + Sync {
    /// 对文本进行分类
    async fn classify(&self, text: &str) -> Result<ContentClass, AnalysisError>;
}

/// 文本摘要能力
#[async_trait]
pub trait TextSummarizer: Send + Sync {
    /// 生成不超过max_length字符的摘要
    async fn summarize(&self, text: &str, max_length: usize) -> Result<String, AnalysisError>;
}

/// 关键词提取能力
#[async_trait]
pub trait KeywordExtractor: Send + Sync {
    /// 从文本提取关键词
    async fn extract_keywords(
        &self,
        text: &str,
        num_keywords: usize,
    ) -> Result<Vec<String>, AnalysisError>;
}

/// 语言检测能力
#[async_trait]
pub trait LanguageDetector: Send + Sync {
    /// 检测文本语言，返回BCP-47风格标签
    async fn detect_language(&self, text: &str) -> Result<String, AnalysisError>;
}

/// 可读性分析能力
#[async_trait]
pub trait ReadabilityAnalyzer: Send + Sync {
    /// 计算文本可读性评分
    async fn analyze_readability(&self, text: &str) -> Result<f64, AnalysisError>;
}

/// 词数统计能力
#[async_trait]
pub trait WordCounter: Send + Sync {
    /// 统计文本词数
    async fn count_words(&self, text: &str) -> Result<usize, AnalysisError>;
}

/// 句数统计能力
#[async_trait]
pub trait SentenceCounter: Send + Sync {
    /// 统计文本句数
    async fn count_sentences(&self, text: &str) -> Result<usize, AnalysisError>;
}

/// 内容分析服务
///
/// 固定管线：依次运行各能力接口并将成功的结果写入
/// 对应字段。失败按字段吞掉：任何单个分析器失败都不会
/// 中止管线，产出的内容可能只有部分字段
pub struct AnalysisService {
    vectorizer: Arc<dyn TextVectorizer>,
    topic_modeler: Arc<dyn TopicModeler>,
    entity_recognizer: Arc<dyn NamedEntityRecognizer>,
    classifier: Arc<dyn ContentClassifier>,
    summarizer: Arc<dyn TextSummarizer>,
    keyword_extractor: Arc<dyn KeywordExtractor>,
    language_detector: Arc<dyn LanguageDetector>,
    readability_analyzer: Arc<dyn ReadabilityAnalyzer>,
    word_counter: Arc<dyn WordCounter>,
    sentence_counter: Arc<dyn SentenceCounter>,
    config: AnalysisSettings,
}

impl AnalysisService {
    /// 创建新的内容分析服务实例
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        vectorizer: Arc<dyn TextVectorizer>,
        topic_modeler: Arc<dyn TopicModeler>,
        entity_recognizer: Arc<dyn NamedEntityRecognizer>,
        classifier: Arc<dyn ContentClassifier>,
        summarizer: Arc<dyn TextSummarizer>,
        keyword_extractor: Arc<dyn KeywordExtractor>,
        language_detector: Arc<dyn LanguageDetector>,
        readability_analyzer: Arc<dyn ReadabilityAnalyzer>,
        word_counter: Arc<dyn WordCounter>,
        sentence_counter: Arc<dyn SentenceCounter>,
        config: AnalysisSettings,
    ) -> Self {
        Self {
            vectorizer,
            topic_modeler,
            entity_recognizer,
            classifier,
            summarizer,
            keyword_extractor,
            language_detector,
            readability_analyzer,
            word_counter,
            sentence_counter,
            config,
        }
    }

    /// 分析内容
    ///
    /// 对content.text运行全部能力接口；每个成功的结果写入
    /// 对应字段并更新updated_at。对同一文本重复运行
    /// （分析器确定的前提下）产出相同字段值
    #[instrument(skip(self, content), fields(url = %content.url))]
    pub async fn analyse_content(&self, content: &mut Content) {
        let text = content.text.clone();

        match self.vectorizer.vectorize(&text).await {
            Ok(embedding) => content.set_vector_embedding(embedding),
            Err(e) => debug!("Vectorizer failed: {}", e),
        }

        match self
            .topic_modeler
            .extract_topics(&text, self.config.topics_per_content)
            .await
        {
            Ok(topics) => content.add_topics(topics),
            Err(e) => debug!("Topic extraction failed: {}", e),
        }

        match self.entity_recognizer.extract_entities(&text).await {
            Ok(entities) => content.add_named_entities(entities),
            Err(e) => debug!("Entity extraction failed: {}", e),
        }

        match self.classifier.classify(&text).await {
            Ok(class) => content.set_classification(class),
            Err(e) => debug!("Classification failed: {}", e),
        }

        match self
            .summarizer
            .summarize(&text, self.config.summary_max_length)
            .await
        {
            Ok(summary) => content.set_summary(summary),
            Err(e) => debug!("Summarization failed: {}", e),
        }

        match self
            .keyword_extractor
            .extract_keywords(&text, self.config.keywords_per_content)
            .await
        {
            Ok(keywords) => content.set_keywords(keywords),
            Err(e) => debug!("Keyword extraction failed: {}", e),
        }

        match self.language_detector.detect_language(&text).await {
            Ok(language) => content.set_language(language),
            Err(e) => debug!("Language detection failed: {}", e),
        }

        match self.readability_analyzer.analyze_readability(&text).await {
            Ok(score) => content.set_readability_score(score),
            Err(e) => debug!("Readability analysis failed: {}", e),
        }

        match self.word_counter.count_words(&text).await {
            Ok(count) => content.set_word_count(count as i32),
            Err(e) => debug!("Word count failed: {}", e),
        }

        match self.sentence_counter.count_sentences(&text).await {
            Ok(count) => content.set_sentence_count(count as i32),
            Err(e) => debug!("Sentence count failed: {}", e),
        }
    }
}
