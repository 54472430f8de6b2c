// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

//! 内存仓库实现
//!
//! 实现全部仓库契约的进程内后端，供测试与轻量部署使用。
//! 互斥锁保证dequeue与save的原子性，与SQL实现提供
//! 相同的行为保证（唯一约束、至多一个工作器取走任务）

use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::Mutex;
use uuid::Uuid;

use crate::domain::models::content::{
    Content, ContentClass, EntityType, NamedEntity, SimilarContent, Topic,
};
use crate::domain::models::job::{CrawlJob, JobStatus};
use crate::domain::models::page::Page;
use crate::domain::models::url::{CrawlUrl, UrlStatus};
use crate::domain::repositories::{
    ContentRepository, CrawlJobRepository, NamedEntityRepository, PageRepository, RepositoryError,
    SimilarContentRepository, TopicRepository, UrlRepository,
};
use crate::infrastructure::ml::similarity;

/// 内存URL仓库
#[derive(Default)]
pub struct MemoryUrlRepository {
    urls: Mutex<HashMap<Uuid, CrawlUrl>>,
}

impl MemoryUrlRepository {
    /// 创建空的内存URL仓库
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UrlRepository for MemoryUrlRepository {
    async fn save(&self, url: &CrawlUrl) -> Result<CrawlUrl, RepositoryError> {
        let mut urls = self.urls.lock().unwrap();
        if urls
            .values()
            .any(|u| u.normalized_url == url.normalized_url)
        {
            return Err(RepositoryError::AlreadyExists);
        }
        urls.insert(url.id, url.clone());
        Ok(url.clone())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<CrawlUrl>, RepositoryError> {
        Ok(self.urls.lock().unwrap().get(&id).cloned())
    }

    async fn find_by_normalized_url(
        &self,
        normalized_url: &str,
    ) -> Result<Option<CrawlUrl>, RepositoryError> {
        Ok(self
            .urls
            .lock()
            .unwrap()
            .values()
            .find(|u| u.normalized_url == normalized_url)
            .cloned())
    }

    async fn find_pending(&self, limit: u64) -> Result<Vec<CrawlUrl>, RepositoryError> {
        let urls = self.urls.lock().unwrap();
        let mut pending: Vec<CrawlUrl> = urls
            .values()
            .filter(|u| u.status == UrlStatus::Pending)
            .cloned()
            .collect();
        pending.sort_by_key(|u| u.created_at);
        pending.truncate(limit as usize);
        Ok(pending)
    }

    async fn update_status(&self, id: Uuid, status: UrlStatus) -> Result<(), RepositoryError> {
        let mut urls = self.urls.lock().unwrap();
        let url = urls.get_mut(&id).ok_or(RepositoryError::NotFound)?;
        url.status = status;
        url.updated_at = Utc::now().into();
        Ok(())
    }

    async fn increment_attempt_count(&self, id: Uuid) -> Result<(), RepositoryError> {
        let mut urls = self.urls.lock().unwrap();
        let url = urls.get_mut(&id).ok_or(RepositoryError::NotFound)?;
        url.attempt_count += 1;
        url.last_attempt = Some(Utc::now().into());
        url.updated_at = Utc::now().into();
        Ok(())
    }

    async fn find_by_domain(
        &self,
        domain: &str,
        limit: u64,
    ) -> Result<Vec<CrawlUrl>, RepositoryError> {
        let urls = self.urls.lock().unwrap();
        let mut found: Vec<CrawlUrl> = urls
            .values()
            .filter(|u| u.normalized_url.contains(domain))
            .cloned()
            .collect();
        found.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        found.truncate(limit as usize);
        Ok(found)
    }

    async fn count_by_status(&self, status: UrlStatus) -> Result<u64, RepositoryError> {
        Ok(self
            .urls
            .lock()
            .unwrap()
            .values()
            .filter(|u| u.status == status)
            .count() as u64)
    }

    async fn reset_stuck(&self, older_than: chrono::Duration) -> Result<u64, RepositoryError> {
        let threshold = Utc::now() - older_than;
        let mut urls = self.urls.lock().unwrap();
        let mut reset = 0;
        for url in urls.values_mut() {
            if url.status == UrlStatus::Fetching && url.updated_at < threshold {
                url.status = UrlStatus::Pending;
                url.updated_at = Utc::now().into();
                reset += 1;
            }
        }
        Ok(reset)
    }

    async fn delete_older_than(&self, days: i64) -> Result<u64, RepositoryError> {
        let cutoff = Utc::now() - chrono::Duration::days(days);
        let mut urls = self.urls.lock().unwrap();
        let before = urls.len();
        urls.retain(|_, u| u.created_at >= cutoff);
        Ok((before - urls.len()) as u64)
    }
}

/// 内存任务仓库
///
/// dequeue在同一把锁内完成选取与状态翻转，
/// 与SQL实现的select-for-update语义一致
#[derive(Default)]
pub struct MemoryCrawlJobRepository {
    jobs: Mutex<HashMap<Uuid, CrawlJob>>,
}

impl MemoryCrawlJobRepository {
    /// 创建空的内存任务仓库
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CrawlJobRepository for MemoryCrawlJobRepository {
    async fn enqueue(&self, job: &CrawlJob) -> Result<CrawlJob, RepositoryError> {
        let mut jobs = self.jobs.lock().unwrap();
        jobs.insert(job.id, job.clone());
        Ok(job.clone())
    }

    async fn dequeue(&self) -> Result<Option<CrawlJob>, RepositoryError> {
        let mut jobs = self.jobs.lock().unwrap();
        let next_id = jobs
            .values()
            .filter(|j| j.status == JobStatus::Pending)
            .min_by_key(|j| (j.priority, j.created_at, j.id))
            .map(|j| j.id);

        match next_id {
            Some(id) => {
                let job = jobs.get_mut(&id).ok_or(RepositoryError::NotFound)?;
                job.status = JobStatus::Processing;
                job.started_at = Some(Utc::now().into());
                Ok(Some(job.clone()))
            }
            None => Ok(None),
        }
    }

    async fn complete(&self, id: Uuid) -> Result<(), RepositoryError> {
        let mut jobs = self.jobs.lock().unwrap();
        let job = jobs.get_mut(&id).ok_or(RepositoryError::NotFound)?;
        job.status = JobStatus::Done;
        Ok(())
    }

    async fn fail(&self, id: Uuid) -> Result<(), RepositoryError> {
        let mut jobs = self.jobs.lock().unwrap();
        let job = jobs.get_mut(&id).ok_or(RepositoryError::NotFound)?;
        job.status = JobStatus::Error;
        Ok(())
    }

    async fn count(&self) -> Result<u64, RepositoryError> {
        Ok(self
            .jobs
            .lock()
            .unwrap()
            .values()
            .filter(|j| j.status == JobStatus::Pending)
            .count() as u64)
    }

    async fn reset_stuck(&self, older_than: chrono::Duration) -> Result<u64, RepositoryError> {
        let threshold = Utc::now() - older_than;
        let mut jobs = self.jobs.lock().unwrap();
        let mut reset = 0;
        for job in jobs.values_mut() {
            if job.status == JobStatus::Processing
                && job.started_at.is_some_and(|t| t < threshold)
            {
                job.status = JobStatus::Pending;
                job.started_at = None;
                reset += 1;
            }
        }
        Ok(reset)
    }

    async fn clear(&self) -> Result<u64, RepositoryError> {
        let mut jobs = self.jobs.lock().unwrap();
        let before = jobs.len();
        jobs.retain(|_, j| j.status != JobStatus::Pending);
        Ok((before - jobs.len()) as u64)
    }
}

/// 内存页面仓库
#[derive(Default)]
pub struct MemoryPageRepository {
    pages: Mutex<HashMap<Uuid, Page>>,
}

impl MemoryPageRepository {
    /// 创建空的内存页面仓库
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PageRepository for MemoryPageRepository {
    async fn save(&self, page: &Page) -> Result<Page, RepositoryError> {
        let mut pages = self.pages.lock().unwrap();
        if pages.values().any(|p| p.url == page.url) {
            return Err(RepositoryError::AlreadyExists);
        }
        pages.insert(page.id, page.clone());
        Ok(page.clone())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Page>, RepositoryError> {
        Ok(self.pages.lock().unwrap().get(&id).cloned())
    }

    async fn find_by_url(&self, url: &str) -> Result<Option<Page>, RepositoryError> {
        Ok(self
            .pages
            .lock()
            .unwrap()
            .values()
            .find(|p| p.url == url)
            .cloned())
    }

    async fn find_recent(&self, limit: u64) -> Result<Vec<Page>, RepositoryError> {
        let pages = self.pages.lock().unwrap();
        let mut recent: Vec<Page> = pages.values().cloned().collect();
        recent.sort_by(|a, b| b.fetched_at.cmp(&a.fetched_at));
        recent.truncate(limit as usize);
        Ok(recent)
    }

    async fn count_pages(&self) -> Result<u64, RepositoryError> {
        Ok(self.pages.lock().unwrap().len() as u64)
    }

    async fn search(&self, query: &str, limit: u64) -> Result<Vec<Page>, RepositoryError> {
        let pages = self.pages.lock().unwrap();
        let mut found: Vec<Page> = pages
            .values()
            .filter(|p| p.title.contains(query) || p.plain_text.contains(query))
            .cloned()
            .collect();
        found.sort_by(|a, b| b.fetched_at.cmp(&a.fetched_at));
        found.truncate(limit as usize);
        Ok(found)
    }

    async fn delete_older_than(&self, days: i64) -> Result<u64, RepositoryError> {
        let cutoff = Utc::now() - chrono::Duration::days(days);
        let mut pages = self.pages.lock().unwrap();
        let before = pages.len();
        pages.retain(|_, p| p.fetched_at >= cutoff);
        Ok((before - pages.len()) as u64)
    }
}

/// 内存内容仓库
#[derive(Default)]
pub struct MemoryContentRepository {
    contents: Mutex<HashMap<Uuid, Content>>,
}

impl MemoryContentRepository {
    /// 创建空的内存内容仓库
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ContentRepository for MemoryContentRepository {
    async fn save(&self, content: &Content) -> Result<Content, RepositoryError> {
        let mut contents = self.contents.lock().unwrap();
        // 同URL重复分析时原地替换，保留原id与创建时间
        if let Some(existing) = contents.values().find(|c| c.url == content.url) {
            let mut replacement = content.clone();
            replacement.id = existing.id;
            replacement.created_at = existing.created_at;
            replacement.updated_at = Utc::now().into();
            let id = existing.id;
            contents.insert(id, replacement.clone());
            return Ok(replacement);
        }
        contents.insert(content.id, content.clone());
        Ok(content.clone())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Content>, RepositoryError> {
        Ok(self.contents.lock().unwrap().get(&id).cloned())
    }

    async fn find_by_url(&self, url: &str) -> Result<Option<Content>, RepositoryError> {
        Ok(self
            .contents
            .lock()
            .unwrap()
            .values()
            .find(|c| c.url == url)
            .cloned())
    }

    async fn find_by_content_type(
        &self,
        class: ContentClass,
        limit: u64,
    ) -> Result<Vec<Content>, RepositoryError> {
        let contents = self.contents.lock().unwrap();
        let mut found: Vec<Content> = contents
            .values()
            .filter(|c| c.classification == Some(class))
            .cloned()
            .collect();
        found.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        found.truncate(limit as usize);
        Ok(found)
    }

    async fn find_nearest(
        &self,
        embedding: &[f32],
        limit: u64,
    ) -> Result<Vec<Content>, RepositoryError> {
        let contents: Vec<Content> = self
            .contents
            .lock()
            .unwrap()
            .values()
            .filter(|c| c.vector_embedding.is_some())
            .cloned()
            .collect();

        let embeddings: Vec<Vec<f32>> = contents
            .iter()
            .map(|c| c.vector_embedding.clone().unwrap_or_default())
            .collect();

        let ranked = similarity::find_most_similar(embedding, &embeddings, limit as usize);
        let mut slots: Vec<Option<Content>> = contents.into_iter().map(Some).collect();
        Ok(ranked.into_iter().filter_map(|i| slots[i].take()).collect())
    }

    async fn search(&self, query: &str, limit: u64) -> Result<Vec<Content>, RepositoryError> {
        let contents = self.contents.lock().unwrap();
        let mut found: Vec<Content> = contents
            .values()
            .filter(|c| c.title.contains(query) || c.text.contains(query))
            .cloned()
            .collect();
        found.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        found.truncate(limit as usize);
        Ok(found)
    }

    async fn count_by_content_type(&self, class: ContentClass) -> Result<u64, RepositoryError> {
        Ok(self
            .contents
            .lock()
            .unwrap()
            .values()
            .filter(|c| c.classification == Some(class))
            .count() as u64)
    }

    async fn delete_older_than(&self, days: i64) -> Result<u64, RepositoryError> {
        let cutoff = Utc::now() - chrono::Duration::days(days);
        let mut contents = self.contents.lock().unwrap();
        let before = contents.len();
        contents.retain(|_, c| c.created_at >= cutoff);
        Ok((before - contents.len()) as u64)
    }
}

/// 内存命名实体仓库
#[derive(Default)]
pub struct MemoryNamedEntityRepository {
    entities: Mutex<Vec<(Uuid, NamedEntity)>>,
}

impl MemoryNamedEntityRepository {
    /// 创建空的内存命名实体仓库
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl NamedEntityRepository for MemoryNamedEntityRepository {
    async fn save(
        &self,
        entity: &NamedEntity,
        content_id: Uuid,
    ) -> Result<NamedEntity, RepositoryError> {
        self.entities
            .lock()
            .unwrap()
            .push((content_id, entity.clone()));
        Ok(entity.clone())
    }

    async fn find_by_content_id(
        &self,
        content_id: Uuid,
    ) -> Result<Vec<NamedEntity>, RepositoryError> {
        Ok(self
            .entities
            .lock()
            .unwrap()
            .iter()
            .filter(|(owner, _)| *owner == content_id)
            .map(|(_, e)| e.clone())
            .collect())
    }

    async fn find_by_type(
        &self,
        entity_type: EntityType,
        limit: u64,
    ) -> Result<Vec<NamedEntity>, RepositoryError> {
        Ok(self
            .entities
            .lock()
            .unwrap()
            .iter()
            .filter(|(_, e)| e.entity_type == entity_type)
            .take(limit as usize)
            .map(|(_, e)| e.clone())
            .collect())
    }

    async fn find_most_frequent(
        &self,
        entity_type: EntityType,
        limit: u64,
    ) -> Result<Vec<NamedEntity>, RepositoryError> {
        let entities = self.entities.lock().unwrap();
        let mut found: Vec<NamedEntity> = entities
            .iter()
            .filter(|(_, e)| e.entity_type == entity_type)
            .map(|(_, e)| e.clone())
            .collect();
        found.sort_by(|a, b| b.count.cmp(&a.count));
        found.truncate(limit as usize);
        Ok(found)
    }
}

/// 内存主题仓库
#[derive(Default)]
pub struct MemoryTopicRepository {
    topics: Mutex<Vec<(Uuid, Topic)>>,
}

impl MemoryTopicRepository {
    /// 创建空的内存主题仓库
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TopicRepository for MemoryTopicRepository {
    async fn save(&self, topic: &Topic, content_id: Uuid) -> Result<Topic, RepositoryError> {
        self.topics.lock().unwrap().push((content_id, topic.clone()));
        Ok(topic.clone())
    }

    async fn find_by_content_id(&self, content_id: Uuid) -> Result<Vec<Topic>, RepositoryError> {
        Ok(self
            .topics
            .lock()
            .unwrap()
            .iter()
            .filter(|(owner, _)| *owner == content_id)
            .map(|(_, t)| t.clone())
            .collect())
    }

    async fn find_most_confident(&self, limit: u64) -> Result<Vec<Topic>, RepositoryError> {
        let topics = self.topics.lock().unwrap();
        let mut found: Vec<Topic> = topics.iter().map(|(_, t)| t.clone()).collect();
        found.sort_by(|a, b| {
            b.confidence
                .partial_cmp(&a.confidence)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        found.truncate(limit as usize);
        Ok(found)
    }
}

/// 内存相似内容仓库
#[derive(Default)]
pub struct MemorySimilarContentRepository {
    pairs: Mutex<Vec<SimilarContent>>,
}

impl MemorySimilarContentRepository {
    /// 创建空的内存相似内容仓库
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SimilarContentRepository for MemorySimilarContentRepository {
    async fn save(&self, similar: &SimilarContent) -> Result<SimilarContent, RepositoryError> {
        let mut pairs = self.pairs.lock().unwrap();
        pairs.retain(|p| {
            !(p.content_id == similar.content_id && p.similar_to_id == similar.similar_to_id)
        });
        pairs.push(similar.clone());
        Ok(similar.clone())
    }

    async fn find_by_content_id(
        &self,
        content_id: Uuid,
        limit: u64,
    ) -> Result<Vec<SimilarContent>, RepositoryError> {
        let pairs = self.pairs.lock().unwrap();
        let mut found: Vec<SimilarContent> = pairs
            .iter()
            .filter(|p| p.content_id == content_id)
            .cloned()
            .collect();
        found.sort_by(|a, b| {
            b.similarity_score
                .partial_cmp(&a.similarity_score)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        found.truncate(limit as usize);
        Ok(found)
    }

    async fn delete_by_content_id(&self, content_id: Uuid) -> Result<u64, RepositoryError> {
        let mut pairs = self.pairs.lock().unwrap();
        let before = pairs.len();
        pairs.retain(|p| p.content_id != content_id);
        Ok((before - pairs.len()) as u64)
    }
}
