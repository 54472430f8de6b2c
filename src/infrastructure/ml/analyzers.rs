// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use async_trait::async_trait;
use std::collections::HashMap;

use crate::domain::models::content::ContentClass;
use crate::domain::services::analysis_service::{
    AnalysisError, ContentClassifier, KeywordExtractor, LanguageDetector, ReadabilityAnalyzer,
    SentenceCounter, TextSummarizer, WordCounter,
};

/// 英文常见停用词
const STOPWORDS: [&str; 32] = [
    "the", "and", "for", "that", "this", "with", "from", "are", "was", "were", "been", "have",
    "has", "had", "will", "would", "can", "could", "should", "there", "their", "they", "them",
    "then", "than", "but", "not", "you", "your", "its", "into", "about",
];

/// 按句子边界切分文本，保留非空片段
fn split_sentences(text: &str) -> Vec<&str> {
    text.split(|c| c == '.' || c == '!' || c == '?')
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .collect()
}

/// 首句摘要器
///
/// 依次累加整句，直到再加一句就超过长度上限；
/// 一句都放不下时按字符边界截断
pub struct LeadSummarizer;

#[async_trait]
impl TextSummarizer for LeadSummarizer {
    async fn summarize(&self, text: &str, max_length: usize) -> Result<String, AnalysisError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(AnalysisError::EmptyInput);
        }

        if text.chars().count() <= max_length {
            return Ok(text.to_string());
        }

        let mut summary = String::new();
        for sentence in split_sentences(text) {
            let candidate_len = summary.chars().count() + sentence.chars().count() + 2;
            if candidate_len > max_length {
                break;
            }
            summary.push_str(sentence);
            summary.push_str(". ");
        }

        let summary = summary.trim_end().to_string();
        if summary.is_empty() {
            return Ok(text.chars().take(max_length).collect());
        }

        Ok(summary)
    }
}

/// 词频关键词提取器
///
/// 统计长度大于3的非停用词词频，按频次降序、
/// 首次出现位置升序取前n个
pub struct FrequencyKeywordExtractor;

#[async_trait]
impl KeywordExtractor for FrequencyKeywordExtractor {
    async fn extract_keywords(
        &self,
        text: &str,
        num_keywords: usize,
    ) -> Result<Vec<String>, AnalysisError> {
        if text.trim().is_empty() {
            return Err(AnalysisError::EmptyInput);
        }

        let mut counts: HashMap<String, (usize, usize)> = HashMap::new();
        for (position, raw) in text
            .split(|c: char| !c.is_alphanumeric())
            .enumerate()
        {
            let token = raw.to_lowercase();
            if token.chars().count() <= 3 || STOPWORDS.contains(&token.as_str()) {
                continue;
            }
            let entry = counts.entry(token).or_insert((0, position));
            entry.0 += 1;
        }

        let mut keywords: Vec<(String, usize, usize)> = counts
            .into_iter()
            .map(|(token, (count, first))| (token, count, first))
            .collect();
        keywords.sort_by(|a, b| b.1.cmp(&a.1).then(a.2.cmp(&b.2)));
        keywords.truncate(num_keywords);

        Ok(keywords.into_iter().map(|(token, _, _)| token).collect())
    }
}

/// 线索词内容分类器
///
/// 依据文本中的线索词与篇幅分类；拿不准时归入other
pub struct CueWordClassifier;

impl CueWordClassifier {
    fn score(haystack: &str, cues: &[&str]) -> usize {
        cues.iter()
            .map(|cue| haystack.matches(cue).count())
            .sum()
    }
}

#[async_trait]
impl ContentClassifier for CueWordClassifier {
    async fn classify(&self, text: &str) -> Result<ContentClass, AnalysisError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(AnalysisError::EmptyInput);
        }

        let lower = text.to_lowercase();
        let word_count = lower.split_whitespace().count();

        let doc_score = Self::score(
            &lower,
            &["documentation", "api reference", "getting started", "usage", "installation"],
        );
        let blog_score = Self::score(&lower, &["posted by", "blog", "comments", "read more"]);
        let product_score = Self::score(
            &lower,
            &["add to cart", "price", "buy now", "in stock", "shipping"],
        );
        let home_score = Self::score(&lower, &["welcome to", "home page", "homepage"]);

        let best = [
            (ContentClass::Documentation, doc_score),
            (ContentClass::Blog, blog_score),
            (ContentClass::Product, product_score),
            (ContentClass::Homepage, home_score),
        ]
        .into_iter()
        .max_by_key(|(_, score)| *score)
        .filter(|(_, score)| *score >= 2);

        if let Some((class, _)) = best {
            return Ok(class);
        }

        if word_count >= 150 {
            Ok(ContentClass::Article)
        } else if word_count >= 20 {
            Ok(ContentClass::Text)
        } else {
            Ok(ContentClass::Other)
        }
    }
}

/// 停用词画像语言检测器
///
/// 统计各语言特征词命中次数，取最高者；
/// 无任何命中时默认en
pub struct StopwordLanguageDetector;

const LANGUAGE_PROFILES: [(&str, [&str; 8]); 5] = [
    ("en", ["the", "and", "for", "with", "that", "this", "from", "are"]),
    ("de", ["der", "die", "das", "und", "ist", "nicht", "ein", "mit"]),
    ("fr", ["le", "la", "les", "des", "est", "une", "dans", "pour"]),
    ("es", ["el", "los", "las", "por", "una", "con", "para", "del"]),
    ("it", ["il", "gli", "che", "per", "una", "con", "del", "sono"]),
];

#[async_trait]
impl LanguageDetector for StopwordLanguageDetector {
    async fn detect_language(&self, text: &str) -> Result<String, AnalysisError> {
        if text.trim().is_empty() {
            return Err(AnalysisError::EmptyInput);
        }

        let tokens: Vec<String> = text
            .split_whitespace()
            .map(|t| t.trim_matches(|c: char| !c.is_alphanumeric()).to_lowercase())
            .collect();

        let mut best = ("en", 0usize);
        for (language, profile) in LANGUAGE_PROFILES {
            let hits = tokens
                .iter()
                .filter(|t| profile.contains(&t.as_str()))
                .count();
            if hits > best.1 {
                best = (language, hits);
            }
        }

        Ok(best.0.to_string())
    }
}

/// 文本统计分析器
///
/// Flesch阅读难易度、词数与句数
pub struct TextStatistics;

impl TextStatistics {
    /// 估算单词音节数：计元音字母簇，至少为1
    fn syllables(word: &str) -> usize {
        let mut count = 0;
        let mut in_group = false;
        for c in word.chars() {
            let is_vowel = matches!(c.to_ascii_lowercase(), 'a' | 'e' | 'i' | 'o' | 'u' | 'y');
            if is_vowel && !in_group {
                count += 1;
            }
            in_group = is_vowel;
        }
        count.max(1)
    }
}

#[async_trait]
impl ReadabilityAnalyzer for TextStatistics {
    async fn analyze_readability(&self, text: &str) -> Result<f64, AnalysisError> {
        let words: Vec<&str> = text.split_whitespace().collect();
        let sentences = split_sentences(text);
        if words.is_empty() || sentences.is_empty() {
            return Err(AnalysisError::EmptyInput);
        }

        let syllables: usize = words.iter().map(|w| Self::syllables(w)).sum();
        let words_per_sentence = words.len() as f64 / sentences.len() as f64;
        let syllables_per_word = syllables as f64 / words.len() as f64;

        Ok(206.835 - 1.015 * words_per_sentence - 84.6 * syllables_per_word)
    }
}

#[async_trait]
impl WordCounter for TextStatistics {
    async fn count_words(&self, text: &str) -> Result<usize, AnalysisError> {
        Ok(text.split_whitespace().count())
    }
}

#[async_trait]
impl SentenceCounter for TextStatistics {
    async fn count_sentences(&self, text: &str) -> Result<usize, AnalysisError> {
        Ok(split_sentences(text).len())
    }
}
