// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use regex::Regex;
use tracing::warn;

use crate::config::settings::FilterSettings;
use crate::utils::errors::CrawlError;
use crate::utils::url_utils::parse_url;

/// URL过滤器
///
/// 决定一个URL是否在爬取范围内。所有规则均为可选，
/// 空列表表示不限制；首个拒绝的规则生效。
/// 规则顺序：URL长度 → 域名后缀 → 扩展名 → 路径正则
pub struct UrlFilter {
    allowed_domains: Vec<String>,
    allowed_extensions: Vec<String>,
    disallowed_paths: Vec<Regex>,
    allowed_content_types: Vec<String>,
    max_url_length: usize,
}

impl UrlFilter {
    /// 从配置创建URL过滤器
    ///
    /// 无法编译的路径正则被跳过并记录日志，不影响其余规则
    pub fn new(config: &FilterSettings) -> Self {
        let disallowed_paths = config
            .disallowed_paths
            .iter()
            .filter_map(|pattern| match Regex::new(pattern) {
                Ok(re) => Some(re),
                Err(e) => {
                    warn!("Ignoring invalid disallowed path pattern {}: {}", pattern, e);
                    None
                }
            })
            .collect();

        Self {
            allowed_domains: config.allowed_domains.clone(),
            allowed_extensions: config.allowed_extensions.clone(),
            disallowed_paths,
            allowed_content_types: config.allowed_content_types.clone(),
            max_url_length: config.max_url_length,
        }
    }

    /// 判断URL是否应当被爬取
    ///
    /// # 参数
    ///
    /// * `url_str` - 待判断的URL
    /// * `_depth` - 发现深度（深度上限由编排器另行检查）
    ///
    /// # 返回值
    ///
    /// * `Ok(bool)` - 是否在爬取范围内
    /// * `Err(CrawlError)` - URL无法解析
    pub fn should_crawl(&self, url_str: &str, _depth: i32) -> Result<bool, CrawlError> {
        let url = parse_url(url_str)?;

        if self.max_url_length > 0 && url_str.len() > self.max_url_length {
            return Ok(false);
        }

        if !self.allowed_domains.is_empty() {
            let host = url.host_str().unwrap_or_default();
            if !self
                .allowed_domains
                .iter()
                .any(|domain| host.ends_with(domain.as_str()))
            {
                return Ok(false);
            }
        }

        if !self.allowed_extensions.is_empty() {
            if let Some(ext) = Self::extension_of(url.path()) {
                if !self
                    .allowed_extensions
                    .iter()
                    .any(|allowed| allowed.eq_ignore_ascii_case(ext))
                {
                    return Ok(false);
                }
            }
        }

        for pattern in &self.disallowed_paths {
            if pattern.is_match(url.path()) {
                return Ok(false);
            }
        }

        Ok(true)
    }

    /// 判断响应Content-Type是否被允许
    ///
    /// 与URL规则分开应用：编排器在拿到响应头后调用。
    /// 比较时去除分号后的参数
    pub fn is_allowed_content_type(&self, content_type: &str) -> bool {
        if self.allowed_content_types.is_empty() {
            return true;
        }

        let main_type = content_type
            .split(';')
            .next()
            .unwrap_or(content_type)
            .trim();

        self.allowed_content_types
            .iter()
            .any(|allowed| main_type.starts_with(allowed.as_str()))
    }

    fn extension_of(path: &str) -> Option<&str> {
        let last_segment = path.rsplit('/').next().unwrap_or(path);
        match last_segment.rsplit_once('.') {
            Some((_, ext)) if !ext.is_empty() => Some(ext),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filter(config: FilterSettings) -> UrlFilter {
        UrlFilter::new(&config)
    }

    #[test]
    fn test_empty_config_allows_everything() {
        let f = filter(FilterSettings::default());
        assert!(f.should_crawl("https://anything.example/path", 0).unwrap());
        assert!(f.is_allowed_content_type("application/pdf"));
    }

    #[test]
    fn test_max_url_length() {
        let f = filter(FilterSettings {
            max_url_length: 30,
            ..Default::default()
        });
        assert!(f.should_crawl("https://example.com/a", 0).unwrap());
        assert!(!f
            .should_crawl("https://example.com/a-very-long-path-over-limit", 0)
            .unwrap());
    }

    #[test]
    fn test_domain_suffix_match() {
        let f = filter(FilterSettings {
            allowed_domains: vec!["example.com".to_string()],
            ..Default::default()
        });
        assert!(f.should_crawl("https://example.com/a", 0).unwrap());
        assert!(f.should_crawl("https://sub.example.com/a", 0).unwrap());
        assert!(!f.should_crawl("https://other.com/a", 0).unwrap());
    }

    #[test]
    fn test_extension_rules_apply_only_when_path_has_extension() {
        let f = filter(FilterSettings {
            allowed_extensions: vec!["html".to_string()],
            ..Default::default()
        });
        assert!(f.should_crawl("https://example.com/page.HTML", 0).unwrap());
        assert!(f.should_crawl("https://example.com/no-extension", 0).unwrap());
        assert!(!f.should_crawl("https://example.com/image.png", 0).unwrap());
    }

    #[test]
    fn test_disallowed_paths_regex() {
        let f = filter(FilterSettings {
            disallowed_paths: vec!["^/admin".to_string(), "[invalid".to_string()],
            ..Default::default()
        });
        // 无效正则被忽略，不影响其余规则
        assert!(!f.should_crawl("https://example.com/admin/users", 0).unwrap());
        assert!(f.should_crawl("https://example.com/public", 0).unwrap());
    }

    #[test]
    fn test_content_type_strips_parameters() {
        let f = filter(FilterSettings {
            allowed_content_types: vec!["text/html".to_string()],
            ..Default::default()
        });
        assert!(f.is_allowed_content_type("text/html; charset=utf-8"));
        assert!(!f.is_allowed_content_type("application/json"));
    }

    #[test]
    fn test_malformed_url_is_an_error() {
        let f = filter(FilterSettings::default());
        assert!(f.should_crawl("http://[bad", 0).is_err());
    }
}
