// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use webcrawlrs::domain::models::content::{Content, ContentClass, EntityType, NamedEntity};
use webcrawlrs::domain::models::job::{CrawlJob, JobStatus};
use webcrawlrs::domain::models::url::{CrawlUrl, UrlStatus};
use uuid::Uuid;

#[test]
fn test_seed_url_defaults() {
    let url = CrawlUrl::new("https://example.com", 0, "").unwrap();
    assert_eq!(url.normalized_url, "https://example.com/");
    assert_eq!(url.status, UrlStatus::Pending);
    assert_eq!(url.attempt_count, 0);
    assert!(url.last_attempt.is_none());
}

#[test]
fn test_url_status_parsing_rejects_unknown() {
    assert!("bogus".parse::<UrlStatus>().is_err());
    assert_eq!("fetched".parse::<UrlStatus>().unwrap(), UrlStatus::Fetched);
}

#[test]
fn test_new_job_is_pending() {
    let job = CrawlJob::new(Uuid::new_v4(), 3);
    assert_eq!(job.status, JobStatus::Pending);
    assert_eq!(job.priority, 3);
    assert!(job.started_at.is_none());
}

#[test]
fn test_content_setters_bump_updated_at() {
    let mut content = Content::new(
        "https://example.com/".to_string(),
        "T".to_string(),
        "text".to_string(),
        "<html></html>".to_string(),
    );
    let before = content.updated_at;
    std::thread::sleep(std::time::Duration::from_millis(5));

    content.set_summary("a summary".to_string());
    assert!(content.updated_at > before);
    assert_eq!(content.summary.as_deref(), Some("a summary"));

    content.set_classification(ContentClass::Article);
    assert_eq!(content.classification, Some(ContentClass::Article));
}

#[test]
fn test_named_entity_count_follows_positions() {
    let entity = NamedEntity::new("Paris".to_string(), EntityType::Location, vec![0, 15]);
    assert_eq!(entity.count, 2);
    assert!(entity.positions.windows(2).all(|w| w[0] < w[1]));
}

#[test]
fn test_content_class_round_trip() {
    for class in [
        ContentClass::Text,
        ContentClass::Article,
        ContentClass::Blog,
        ContentClass::Documentation,
        ContentClass::Product,
        ContentClass::Homepage,
        ContentClass::Other,
    ] {
        assert_eq!(class.to_string().parse::<ContentClass>().unwrap(), class);
    }
}
