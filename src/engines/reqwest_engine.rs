// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::config::settings::FetchSettings;
use crate::engines::traits::{EngineError, FetchEngine, FetchRequest, FetchResponse};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::redirect::Policy;
use std::collections::HashMap;
use std::time::Instant;
use url::Url;

/// 抓取引擎
///
/// 基于reqwest实现的HTTP GET抓取引擎。重定向手工跟随：
/// 每一跳转发原始请求头，超过上限即报错
pub struct ReqwestEngine {
    client: reqwest::Client,
    config: FetchSettings,
}

impl ReqwestEngine {
    /// 创建新的抓取引擎实例
    ///
    /// # 参数
    ///
    /// * `config` - 抓取配置
    pub fn new(config: FetchSettings) -> Result<Self, EngineError> {
        let client = reqwest::Client::builder()
            .redirect(Policy::none())
            .timeout(config.timeout())
            .build()?;

        Ok(Self { client, config })
    }

    /// 构建标准请求头集合
    fn build_headers(&self, request: &FetchRequest) -> HeaderMap {
        let mut headers = HeaderMap::new();

        let standard = [
            ("User-Agent", self.config.user_agent.as_str()),
            (
                "Accept",
                "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8",
            ),
            ("Accept-Language", "en-US,en;q=0.5"),
            ("Connection", "keep-alive"),
        ];
        for (name, value) in standard {
            if let (Ok(name), Ok(value)) = (
                HeaderName::from_bytes(name.as_bytes()),
                HeaderValue::from_str(value),
            ) {
                headers.insert(name, value);
            }
        }

        for (name, value) in &request.headers {
            if let (Ok(name), Ok(value)) = (
                HeaderName::from_bytes(name.as_bytes()),
                HeaderValue::from_str(value),
            ) {
                headers.insert(name, value);
            }
        }

        headers
    }
}

#[async_trait]
impl FetchEngine for ReqwestEngine {
    /// 执行HTTP抓取
    ///
    /// # 参数
    ///
    /// * `request` - 抓取请求
    ///
    /// # 返回值
    ///
    /// * `Ok(FetchResponse)` - 抓取响应
    /// * `Err(EngineError)` - 抓取过程中出现的错误
    async fn fetch(&self, request: &FetchRequest) -> Result<FetchResponse, EngineError> {
        let headers = self.build_headers(request);
        let start = Instant::now();

        let mut current_url = request.url.clone();
        let mut hops = 0usize;

        let response = loop {
            let response = self
                .client
                .get(&current_url)
                .headers(headers.clone())
                .send()
                .await?;

            if !response.status().is_redirection() || !self.config.follow_redirects {
                break response;
            }

            hops += 1;
            if hops > self.config.max_redirects {
                return Err(EngineError::TooManyRedirects(self.config.max_redirects));
            }

            let location = response
                .headers()
                .get("location")
                .and_then(|v| v.to_str().ok())
                .ok_or_else(|| {
                    EngineError::Other(format!("redirect without Location from {}", current_url))
                })?;

            // Location可能是相对路径
            current_url = match Url::parse(&current_url).and_then(|base| base.join(location)) {
                Ok(next) => next.to_string(),
                Err(e) => {
                    return Err(EngineError::Other(format!(
                        "invalid redirect target {}: {}",
                        location, e
                    )))
                }
            };
        };

        let status_code = response.status().as_u16();

        let content_type = response
            .headers()
            .get("content-type")
            .and_then(|v| v.to_str().ok())
            .map(|v| v.to_string())
            .unwrap_or_else(|| "text/html".to_string());

        let mut response_headers = HashMap::new();
        for (name, value) in response.headers() {
            if let Ok(value) = value.to_str() {
                response_headers
                    .entry(name.as_str().to_string())
                    .or_insert_with(|| value.to_string());
            }
        }

        let body = response.text().await?;

        Ok(FetchResponse {
            status_code,
            body,
            content_type,
            headers: response_headers,
            response_time_ms: start.elapsed().as_millis() as u64,
        })
    }

    /// 获取引擎名称
    fn name(&self) -> &'static str {
        "reqwest"
    }
}
