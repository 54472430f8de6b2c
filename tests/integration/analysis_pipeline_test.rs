// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use async_trait::async_trait;
use std::sync::Arc;

use webcrawlrs::domain::models::content::Content;
use webcrawlrs::domain::services::analysis_service::{
    AnalysisError, AnalysisService, TextVectorizer,
};
use webcrawlrs::infrastructure::ml::analyzers::{
    CueWordClassifier, FrequencyKeywordExtractor, LeadSummarizer, StopwordLanguageDetector,
    TextStatistics,
};
use webcrawlrs::infrastructure::ml::ner::HeuristicEntityRecognizer;
use webcrawlrs::infrastructure::ml::topics::KeywordTopicModeler;
use webcrawlrs::infrastructure::ml::vectorizer::HashingVectorizer;

use super::helpers::analysis_settings;

const SAMPLE_TEXT: &str = "Paris is the capital of France. The crawler visited Paris twice \
during March. Acme Corp published detailed documentation about their crawler engine. \
The engine fetches pages politely and analyses content for keywords and topics.";

fn full_service() -> AnalysisService {
    let settings = analysis_settings();
    let stats = Arc::new(TextStatistics);
    AnalysisService::new(
        Arc::new(HashingVectorizer::new(&settings)),
        Arc::new(KeywordTopicModeler),
        Arc::new(HeuristicEntityRecognizer::new()),
        Arc::new(CueWordClassifier),
        Arc::new(LeadSummarizer),
        Arc::new(FrequencyKeywordExtractor),
        Arc::new(StopwordLanguageDetector),
        stats.clone(),
        stats.clone(),
        stats,
        settings,
    )
}

fn sample_content() -> Content {
    Content::new(
        "https://example.com/article".to_string(),
        "Sample".to_string(),
        SAMPLE_TEXT.to_string(),
        format!("<html><body><p>{}</p></body></html>", SAMPLE_TEXT),
    )
}

/// 向量化必定失败的桩
struct FailingVectorizer;

#[async_trait]
impl TextVectorizer for FailingVectorizer {
    async fn vectorize(&self, _text: &str) -> Result<Vec<f32>, AnalysisError> {
        Err(AnalysisError::Failed("backend offline".to_string()))
    }
}

#[tokio::test]
async fn test_pipeline_populates_all_fields() {
    let service = full_service();
    let mut content = sample_content();

    service.analyse_content(&mut content).await;

    let embedding = content.vector_embedding.as_ref().expect("embedding");
    assert_eq!(embedding.len(), 64);

    assert!(!content.keywords.is_empty());
    assert!(content.keywords.len() <= 10);
    assert!(content.keywords.contains(&"crawler".to_string()));

    assert!(!content.named_entities.is_empty());
    assert_eq!(content.named_entities[0].text, "Paris");

    assert!(content.topics.len() <= 5);
    assert!(!content.topics.is_empty());

    assert!(content.classification.is_some());
    assert_eq!(content.language.as_deref(), Some("en"));
    assert!(content.readability_score.is_some());
    assert!(content.word_count.unwrap() > 30);
    assert!(content.sentence_count.unwrap() >= 4);

    let summary = content.summary.as_ref().expect("summary");
    assert!(summary.chars().count() <= 200);
}

#[tokio::test]
async fn test_pipeline_survives_failing_analyzer() {
    let settings = analysis_settings();
    let stats = Arc::new(TextStatistics);
    let service = AnalysisService::new(
        Arc::new(FailingVectorizer),
        Arc::new(KeywordTopicModeler),
        Arc::new(HeuristicEntityRecognizer::new()),
        Arc::new(CueWordClassifier),
        Arc::new(LeadSummarizer),
        Arc::new(FrequencyKeywordExtractor),
        Arc::new(StopwordLanguageDetector),
        stats.clone(),
        stats.clone(),
        stats,
        settings,
    );

    let mut content = sample_content();
    service.analyse_content(&mut content).await;

    // 失败的分析器留下空字段，其余字段照常填充
    assert!(content.vector_embedding.is_none());
    assert!(!content.keywords.is_empty());
    assert!(content.summary.is_some());
    assert!(content.word_count.is_some());
}

#[tokio::test]
async fn test_reanalysis_is_idempotent() {
    let service = full_service();

    let mut first = sample_content();
    service.analyse_content(&mut first).await;

    let mut second = first.clone();
    service.analyse_content(&mut second).await;

    assert_eq!(first.vector_embedding, second.vector_embedding);
    assert_eq!(first.keywords, second.keywords);
    assert_eq!(first.summary, second.summary);
    assert_eq!(first.classification, second.classification);
    assert_eq!(first.language, second.language);
    assert_eq!(first.readability_score, second.readability_score);
    assert_eq!(first.word_count, second.word_count);
    assert_eq!(first.sentence_count, second.sentence_count);

    let first_entities: Vec<(&str, &[usize])> = first
        .named_entities
        .iter()
        .map(|e| (e.text.as_str(), e.positions.as_slice()))
        .collect();
    let second_entities: Vec<(&str, &[usize])> = second
        .named_entities
        .iter()
        .map(|e| (e.text.as_str(), e.positions.as_slice()))
        .collect();
    assert_eq!(first_entities, second_entities);
}
