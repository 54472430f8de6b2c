// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use async_trait::async_trait;
use regex::Regex;
use std::collections::HashMap;

use crate::domain::models::content::{EntityType, NamedEntity};
use crate::domain::services::analysis_service::{AnalysisError, NamedEntityRecognizer};

/// 常见地名，用于启发式地点识别
const LOCATIONS: [&str; 24] = [
    "Paris", "London", "Berlin", "Madrid", "Rome", "Tokyo", "Beijing", "Moscow", "Amsterdam",
    "Vienna", "Dublin", "Lisbon", "Oslo", "Stockholm", "France", "Germany", "Spain", "Italy",
    "Japan", "China", "Russia", "Europe", "America", "Asia",
];

/// 月份与星期名，用于启发式日期识别
const DATE_WORDS: [&str; 19] = [
    "January", "February", "March", "April", "May", "June", "July", "August", "September",
    "October", "November", "December", "Monday", "Tuesday", "Wednesday", "Thursday", "Friday",
    "Saturday", "Sunday",
];

/// 组织名后缀
const ORG_SUFFIXES: [&str; 7] = ["Inc", "Corp", "Ltd", "LLC", "GmbH", "Foundation", "University"];

/// 启发式命名实体识别器
///
/// 以大写开头的词序列作为候选实体，按词表与形态线索分类。
/// 短实体与停用词被过滤；每个实体携带其在原文中全部
/// 非重叠起始位置（字符偏移），结果按最早出现排序
pub struct HeuristicEntityRecognizer {
    candidate: Regex,
}

impl Default for HeuristicEntityRecognizer {
    fn default() -> Self {
        Self::new()
    }
}

impl HeuristicEntityRecognizer {
    /// 创建新的实体识别器实例
    pub fn new() -> Self {
        Self {
            candidate: Regex::new(r"[A-Z][A-Za-z]*(?: [A-Z][A-Za-z]*)*").unwrap(),
        }
    }

    /// 对候选实体表面形态分类
    fn classify(surface: &str) -> EntityType {
        let words: Vec<&str> = surface.split(' ').collect();

        if words.iter().any(|w| DATE_WORDS.contains(w)) {
            return EntityType::Date;
        }
        if words
            .iter()
            .any(|w| ORG_SUFFIXES.contains(w))
        {
            return EntityType::Organization;
        }
        if words.iter().all(|w| LOCATIONS.contains(w)) {
            return EntityType::Location;
        }
        if words.len() >= 2 {
            return EntityType::Person;
        }

        EntityType::Other
    }
}

/// 判断实体是否应当被过滤
///
/// 去除首尾空白并小写后，长度不超过2个字符或为停用词的丢弃
fn is_filtered_entity(surface: &str) -> bool {
    let trimmed = surface.trim().to_lowercase();
    const STOPWORDS: [&str; 6] = ["the", "at", "of", "a", "in", "this"];
    trimmed.chars().count() <= 2 || STOPWORDS.contains(&trimmed.as_str())
}

/// 查找子串在文本中的全部非重叠起始位置
///
/// 位置为零基字符偏移；一次匹配后从匹配末尾继续扫描
pub fn find_all_positions(text: &str, substr: &str) -> Vec<usize> {
    let runes: Vec<char> = text.chars().collect();
    let target: Vec<char> = substr.chars().collect();
    let mut positions = Vec::new();

    if target.is_empty() || target.len() > runes.len() {
        return positions;
    }

    let mut i = 0;
    while i + target.len() <= runes.len() {
        if runes[i..i + target.len()] == target[..] {
            positions.push(i);
            i += target.len();
        } else {
            i += 1;
        }
    }

    positions
}

#[async_trait]
impl NamedEntityRecognizer for HeuristicEntityRecognizer {
    async fn extract_entities(&self, text: &str) -> Result<Vec<NamedEntity>, AnalysisError> {
        if text.trim().is_empty() {
            return Err(AnalysisError::EmptyInput);
        }

        let mut seen: HashMap<String, EntityType> = HashMap::new();
        for m in self.candidate.find_iter(text) {
            let surface = m.as_str();
            if is_filtered_entity(surface) {
                continue;
            }
            seen.entry(surface.to_string())
                .or_insert_with(|| Self::classify(surface));
        }

        let mut entities: Vec<NamedEntity> = seen
            .into_iter()
            .filter_map(|(surface, entity_type)| {
                let positions = find_all_positions(text, &surface);
                if positions.is_empty() {
                    return None;
                }
                Some(NamedEntity::new(surface, entity_type, positions))
            })
            .collect();

        entities.sort_by_key(|e| e.positions[0]);
        Ok(entities)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_repeated_entity_positions() {
        let ner = HeuristicEntityRecognizer::new();
        let entities = ner
            .extract_entities("Paris is nice. Paris again.")
            .await
            .unwrap();

        assert_eq!(entities.len(), 1);
        assert_eq!(entities[0].text, "Paris");
        assert_eq!(entities[0].entity_type, EntityType::Location);
        assert_eq!(entities[0].positions, vec![0, 15]);
        assert_eq!(entities[0].count, 2);
    }

    #[tokio::test]
    async fn test_entities_sorted_by_first_position() {
        let ner = HeuristicEntityRecognizer::new();
        let entities = ner
            .extract_entities("Acme Corp hired Alice Smith in Berlin.")
            .await
            .unwrap();

        let texts: Vec<&str> = entities.iter().map(|e| e.text.as_str()).collect();
        assert_eq!(texts, vec!["Acme Corp", "Alice Smith", "Berlin"]);
        assert_eq!(entities[0].entity_type, EntityType::Organization);
        assert_eq!(entities[1].entity_type, EntityType::Person);
        assert_eq!(entities[2].entity_type, EntityType::Location);

        let firsts: Vec<usize> = entities.iter().map(|e| e.positions[0]).collect();
        let mut sorted = firsts.clone();
        sorted.sort_unstable();
        assert_eq!(firsts, sorted);
    }

    #[tokio::test]
    async fn test_short_and_stopword_entities_dropped() {
        let ner = HeuristicEntityRecognizer::new();
        let entities = ner.extract_entities("We met At the UN u A office.").await.unwrap();
        assert!(entities.iter().all(|e| e.text.chars().count() > 2));
        assert!(!entities.iter().any(|e| e.text == "At"));
    }

    #[test]
    fn test_find_all_positions_is_rune_aware() {
        // 多字节字符计入字符偏移而非字节偏移
        assert_eq!(find_all_positions("héllo Paris x Paris", "Paris"), vec![6, 14]);
    }

    #[test]
    fn test_find_all_positions_non_overlapping() {
        assert_eq!(find_all_positions("aaaa", "aa"), vec![0, 2]);
    }

    #[tokio::test]
    async fn test_date_classification() {
        let ner = HeuristicEntityRecognizer::new();
        let entities = ner
            .extract_entities("The launch happened in March.")
            .await
            .unwrap();
        let march = entities.iter().find(|e| e.text == "March").unwrap();
        assert_eq!(march.entity_type, EntityType::Date);
    }
}
