// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 文本统计分析器模块
pub mod analyzers;

/// 命名实体识别模块
pub mod ner;

/// 余弦相似度模块
pub mod similarity;

/// 主题提取模块
pub mod topics;

/// 文本向量化模块
pub mod vectorizer;
