// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, error, info};

use crate::config::settings::AnalysisSettings;
use crate::domain::models::content::{Content, SimilarContent};
use crate::domain::models::page::Page;
use crate::domain::repositories::{
    ContentRepository, NamedEntityRepository, PageRepository, SimilarContentRepository,
    TopicRepository,
};
use crate::domain::services::analysis_service::AnalysisService;
use crate::infrastructure::ml::similarity;
use crate::utils::errors::WorkerError;
use crate::workers::worker::Worker;

/// 分析工作器
///
/// 爬取旁路的消费者：轮询尚无内容记录的已抓取页面，
/// 运行分析管线，持久化内容、实体与主题，
/// 并用相似度核心记录每篇内容的top-k相似对
pub struct AnalysisWorker {
    page_repo: Arc<dyn PageRepository>,
    content_repo: Arc<dyn ContentRepository>,
    entity_repo: Arc<dyn NamedEntityRepository>,
    topic_repo: Arc<dyn TopicRepository>,
    similar_repo: Arc<dyn SimilarContentRepository>,
    analysis: Arc<AnalysisService>,
    config: AnalysisSettings,
}

impl AnalysisWorker {
    /// 创建新的分析工作器实例
    pub fn new(
        page_repo: Arc<dyn PageRepository>,
        content_repo: Arc<dyn ContentRepository>,
        entity_repo: Arc<dyn NamedEntityRepository>,
        topic_repo: Arc<dyn TopicRepository>,
        similar_repo: Arc<dyn SimilarContentRepository>,
        analysis: Arc<AnalysisService>,
        config: AnalysisSettings,
    ) -> Self {
        Self {
            page_repo,
            content_repo,
            entity_repo,
            topic_repo,
            similar_repo,
            analysis,
            config,
        }
    }

    /// 处理一批页面
    ///
    /// # 返回值
    ///
    /// 返回本轮分析的页面数
    pub async fn process_batch(&self) -> Result<usize, WorkerError> {
        let pages = self.page_repo.find_recent(self.config.batch_size).await?;
        let mut analysed = 0;

        for page in pages {
            if self.content_repo.find_by_url(&page.url).await?.is_some() {
                continue;
            }
            self.analyse_page(&page).await?;
            analysed += 1;
        }

        Ok(analysed)
    }

    /// 分析单个页面并持久化产物
    async fn analyse_page(&self, page: &Page) -> Result<(), WorkerError> {
        let mut content = Content::new(
            page.url.clone(),
            page.title.clone(),
            page.plain_text.clone(),
            page.html.clone(),
        );

        self.analysis.analyse_content(&mut content).await;

        let saved = self.content_repo.save(&content).await?;

        for entity in &content.named_entities {
            if let Err(e) = self.entity_repo.save(entity, saved.id).await {
                error!("Failed to save entity {}: {}", entity.text, e);
            }
        }
        for topic in &content.topics {
            if let Err(e) = self.topic_repo.save(topic, saved.id).await {
                error!("Failed to save topic {}: {}", topic.name, e);
            }
        }

        if let Some(embedding) = &content.vector_embedding {
            self.record_similar(saved.id, embedding).await;
        }

        debug!("Analysed {}", page.url);
        Ok(())
    }

    /// 记录与已有内容的top-k相似对
    async fn record_similar(&self, content_id: uuid::Uuid, embedding: &[f32]) {
        let candidates = match self
            .content_repo
            .find_nearest(embedding, self.config.similar_per_content as u64 + 1)
            .await
        {
            Ok(candidates) => candidates,
            Err(e) => {
                error!("Similarity lookup failed: {}", e);
                return;
            }
        };

        for candidate in candidates {
            if candidate.id == content_id {
                continue;
            }
            let Some(other) = &candidate.vector_embedding else {
                continue;
            };
            let Ok(score) = similarity::cosine_similarity(embedding, other) else {
                continue;
            };

            let pair = SimilarContent::new(content_id, candidate.id, score);
            if let Err(e) = self.similar_repo.save(&pair).await {
                error!("Failed to save similar pair: {}", e);
            }
        }
    }
}

#[async_trait]
impl Worker for AnalysisWorker {
    /// 运行分析工作器
    async fn run(&self) -> Result<(), WorkerError> {
        info!("Analysis worker started");

        loop {
            match self.process_batch().await {
                Ok(count) if count > 0 => info!("Analysed {} pages", count),
                Ok(_) => {}
                Err(e) => error!("Analysis batch failed: {}", e),
            }
            sleep(Duration::from_secs(self.config.poll_interval_secs)).await;
        }
    }

    fn name(&self) -> &str {
        "analysis_worker"
    }
}
