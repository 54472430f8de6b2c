// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::services::analysis_service::AnalysisError;

/// 计算两个向量的余弦相似度
///
/// f32输入以f64累加。任一向量为零向量时返回0.0；
/// 维度不一致时返回DimensionMismatch
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> Result<f64, AnalysisError> {
    if a.len() != b.len() {
        return Err(AnalysisError::DimensionMismatch {
            left: a.len(),
            right: b.len(),
        });
    }

    let mut dot = 0.0f64;
    let mut norm_a = 0.0f64;
    let mut norm_b = 0.0f64;
    for (ai, bi) in a.iter().zip(b.iter()) {
        dot += (*ai as f64) * (*bi as f64);
        norm_a += (*ai as f64) * (*ai as f64);
        norm_b += (*bi as f64) * (*bi as f64);
    }

    if norm_a == 0.0 || norm_b == 0.0 {
        return Ok(0.0);
    }

    Ok(dot / (norm_a.sqrt() * norm_b.sqrt()))
}

/// 在候选向量集合中查找与查询向量最相似的前k个
///
/// 返回候选下标，按相似度降序；集合为空或k为0时返回空。
/// 维度不一致的候选被跳过
pub fn find_most_similar(query: &[f32], embeddings: &[Vec<f32>], limit: usize) -> Vec<usize> {
    if embeddings.is_empty() || limit == 0 {
        return Vec::new();
    }

    let mut pairs: Vec<(usize, f64)> = embeddings
        .iter()
        .enumerate()
        .filter_map(|(idx, vec)| {
            cosine_similarity(query, vec)
                .ok()
                .map(|score| (idx, score))
        })
        .collect();

    pairs.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
    pairs.truncate(limit);
    pairs.into_iter().map(|(idx, _)| idx).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cosine_identity() {
        let v = vec![1.0f32, 2.0, 3.0];
        let score = cosine_similarity(&v, &v).unwrap();
        assert!((score - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_cosine_opposite() {
        let v = vec![1.0f32, 2.0, 3.0];
        let neg: Vec<f32> = v.iter().map(|x| -x).collect();
        let score = cosine_similarity(&v, &neg).unwrap();
        assert!((score + 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_cosine_orthogonal() {
        let score = cosine_similarity(&[1.0, 0.0, 0.0], &[0.0, 1.0, 0.0]).unwrap();
        assert_eq!(score, 0.0);
    }

    #[test]
    fn test_cosine_zero_vector() {
        let score = cosine_similarity(&[1.0, 2.0], &[0.0, 0.0]).unwrap();
        assert_eq!(score, 0.0);
    }

    #[test]
    fn test_cosine_symmetry() {
        let a = vec![0.3f32, -1.5, 2.0];
        let b = vec![1.1f32, 0.4, -0.2];
        assert_eq!(
            cosine_similarity(&a, &b).unwrap(),
            cosine_similarity(&b, &a).unwrap()
        );
    }

    #[test]
    fn test_cosine_dimension_mismatch() {
        let err = cosine_similarity(&[1.0, 0.0], &[1.0, 0.0, 0.0]).unwrap_err();
        assert!(matches!(
            err,
            AnalysisError::DimensionMismatch { left: 2, right: 3 }
        ));
    }

    #[test]
    fn test_top_k_ordering_and_length() {
        let query = vec![1.0f32, 0.0];
        let embeddings = vec![
            vec![0.0f32, 1.0],  // 相似度 0
            vec![1.0f32, 0.0],  // 相似度 1
            vec![1.0f32, 1.0],  // 相似度 ~0.707
            vec![-1.0f32, 0.0], // 相似度 -1
        ];

        let top = find_most_similar(&query, &embeddings, 3);
        assert_eq!(top, vec![1, 2, 0]);

        assert_eq!(find_most_similar(&query, &embeddings, 10).len(), 4);
        assert!(find_most_similar(&query, &[], 3).is_empty());
        assert!(find_most_similar(&query, &embeddings, 0).is_empty());
    }
}
