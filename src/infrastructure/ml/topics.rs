// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use async_trait::async_trait;

use crate::domain::models::content::Topic;
use crate::domain::services::analysis_service::{
    AnalysisError, KeywordExtractor, TopicModeler,
};
use crate::infrastructure::ml::analyzers::FrequencyKeywordExtractor;

/// 关键词分组主题提取器
///
/// 在无训练语料的前提下用高频关键词近似主题：
/// 取前n*3个关键词按顺序分为n组，组首词为主题名，
/// 置信度为该组词频占比
pub struct KeywordTopicModeler;

#[async_trait]
impl TopicModeler for KeywordTopicModeler {
    async fn extract_topics(
        &self,
        text: &str,
        num_topics: usize,
    ) -> Result<Vec<Topic>, AnalysisError> {
        if num_topics == 0 {
            return Ok(Vec::new());
        }

        let extractor = FrequencyKeywordExtractor;
        let keywords = extractor.extract_keywords(text, num_topics * 3).await?;
        if keywords.is_empty() {
            return Ok(Vec::new());
        }

        let total_terms = keywords.len() as f64;
        let chunk_size = keywords.len().div_ceil(num_topics);

        let topics = keywords
            .chunks(chunk_size)
            .map(|chunk| {
                let confidence = (chunk.len() as f64 / total_terms).clamp(0.0, 1.0);
                Topic::new(chunk[0].clone(), chunk.to_vec(), confidence)
            })
            .collect();

        Ok(topics)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_topics_bounded_and_confident() {
        let modeler = KeywordTopicModeler;
        let text = "crawler frontier robots fetcher parser scheduler queue worker \
                    politeness delay frontier crawler robots crawler";
        let topics = modeler.extract_topics(text, 3).await.unwrap();

        assert!(!topics.is_empty());
        assert!(topics.len() <= 3);
        for topic in &topics {
            assert!(!topic.name.is_empty());
            assert!(!topic.keywords.is_empty());
            assert!((0.0..=1.0).contains(&topic.confidence));
            assert_eq!(topic.name, topic.keywords[0]);
        }
        // 最高频词领衔第一个主题
        assert_eq!(topics[0].name, "crawler");
    }

    #[tokio::test]
    async fn test_zero_topics_requested() {
        let modeler = KeywordTopicModeler;
        assert!(modeler
            .extract_topics("some text here", 0)
            .await
            .unwrap()
            .is_empty());
    }
}
