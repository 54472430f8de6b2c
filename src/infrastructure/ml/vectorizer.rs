// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use async_trait::async_trait;
use std::collections::hash_map::DefaultHasher;
use std::collections::HashMap;
use std::hash::{Hash, Hasher};
use std::sync::RwLock;

use crate::config::settings::AnalysisSettings;
use crate::domain::services::analysis_service::{AnalysisError, TextVectorizer};

/// 文档频率统计
#[derive(Default)]
struct DocumentFrequencies {
    /// 词项桶 → 出现过该词项的文档数
    counts: HashMap<usize, u32>,
    /// 已见文档总数
    total_docs: u32,
}

/// 哈希TF-IDF向量化器
///
/// 词项经特征哈希落入固定维度的桶，TF-IDF加权后做L2归一。
/// 文档频率只通过fit更新；vectorize为只读，因此对同一文本
/// 在同一模型状态下输出确定
pub struct HashingVectorizer {
    dimension: usize,
    min_doc_freq: usize,
    max_features: usize,
    df: RwLock<DocumentFrequencies>,
}

impl HashingVectorizer {
    /// 从分析配置创建向量化器
    pub fn new(config: &AnalysisSettings) -> Self {
        Self {
            dimension: config.embedding_dimension,
            min_doc_freq: config.min_doc_freq,
            max_features: config.max_features,
            df: RwLock::new(DocumentFrequencies::default()),
        }
    }

    /// 用一批文档训练文档频率表
    pub fn fit(&self, documents: &[&str]) {
        let mut df = self.df.write().unwrap();
        for doc in documents {
            let mut seen = std::collections::HashSet::new();
            for token in Self::tokenize(doc) {
                seen.insert(self.bucket(&token));
            }
            for bucket in seen {
                *df.counts.entry(bucket).or_insert(0) += 1;
            }
            df.total_docs += 1;
        }
    }

    fn tokenize(text: &str) -> impl Iterator<Item = String> + '_ {
        text.split(|c: char| !c.is_alphanumeric())
            .filter(|t| t.len() > 2)
            .map(|t| t.to_lowercase())
    }

    fn bucket(&self, token: &str) -> usize {
        let mut hasher = DefaultHasher::new();
        token.hash(&mut hasher);
        (hasher.finish() as usize) % self.dimension
    }
}

#[async_trait]
impl TextVectorizer for HashingVectorizer {
    async fn vectorize(&self, text: &str) -> Result<Vec<f32>, AnalysisError> {
        if text.trim().is_empty() {
            return Err(AnalysisError::EmptyInput);
        }

        let tokens: Vec<String> = match self.max_features {
            0 => Self::tokenize(text).collect(),
            cap => Self::tokenize(text).take(cap).collect(),
        };
        if tokens.is_empty() {
            return Err(AnalysisError::EmptyInput);
        }

        let mut tf: HashMap<usize, f64> = HashMap::new();
        for token in &tokens {
            *tf.entry(self.bucket(token)).or_insert(0.0) += 1.0;
        }

        let df = self.df.read().unwrap();
        let mut vector = vec![0.0f32; self.dimension];
        for (bucket, count) in tf {
            let doc_freq = df.counts.get(&bucket).copied().unwrap_or(0) as usize;
            if df.total_docs > 0 && doc_freq < self.min_doc_freq {
                continue;
            }

            let idf = if df.total_docs > 0 {
                ((1.0 + df.total_docs as f64) / (1.0 + doc_freq as f64)).ln() + 1.0
            } else {
                1.0
            };
            vector[bucket] = ((1.0 + count.ln()) * idf) as f32;
        }

        // L2归一
        let norm: f64 = vector.iter().map(|x| (*x as f64) * (*x as f64)).sum::<f64>().sqrt();
        if norm > 0.0 {
            for x in &mut vector {
                *x = (*x as f64 / norm) as f32;
            }
        }

        Ok(vector)
    }
}
