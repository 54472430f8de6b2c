// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use url::{ParseError, Url};

use crate::utils::errors::CrawlError;

/// 解析并校验一个URL字符串
///
/// 接受绝对URL或无协议URL；无协议时默认补全为https。
/// 仅接受http/https协议，其余协议视为无效。
pub fn parse_url(raw: &str) -> Result<Url, CrawlError> {
    let parsed = match Url::parse(raw) {
        Ok(url) => url,
        Err(ParseError::RelativeUrlWithoutBase) => {
            Url::parse(&format!("https://{}", raw))
                .map_err(|e| CrawlError::InvalidUrl(format!("{}: {}", raw, e)))?
        }
        Err(e) => return Err(CrawlError::InvalidUrl(format!("{}: {}", raw, e))),
    };

    // 非特殊scheme且无host的输入（如 "example.com:80/"）按无协议处理
    let parsed = if parsed.host_str().is_none() && !raw.contains("://") {
        Url::parse(&format!("https://{}", raw))
            .map_err(|e| CrawlError::InvalidUrl(format!("{}: {}", raw, e)))?
    } else {
        parsed
    };

    match parsed.scheme() {
        "http" | "https" => Ok(parsed),
        other => Err(CrawlError::InvalidUrl(format!(
            "unsupported scheme '{}' in {}",
            other, raw
        ))),
    }
}

/// 规范化一个URL字符串
///
/// 规则按顺序应用：去除fragment；空协议补全为https；
/// 默认端口（http:80 / https:443）被去除；空路径置为"/"；
/// 查询串保持原有顺序与大小写。规范化结果是前沿队列的去重键。
pub fn normalize_url(raw: &str) -> Result<String, CrawlError> {
    let mut url = parse_url(raw)?;
    url.set_fragment(None);
    // 默认端口与空路径由WHATWG解析器本身归一
    Ok(url.to_string())
}

/// 将可能为相对路径的URL转换为绝对路径URL
pub fn resolve_url(base_url: &Url, path: &str) -> Result<Url, ParseError> {
    base_url.join(path)
}

/// 提取URL的主机名
pub fn host_of(url_str: &str) -> Result<String, CrawlError> {
    let url = parse_url(url_str)?;
    url.host_str()
        .map(|h| h.to_string())
        .ok_or_else(|| CrawlError::InvalidUrl(format!("no host in {}", url_str)))
}
