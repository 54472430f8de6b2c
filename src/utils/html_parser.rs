// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use scraper::{Html, Node, Selector};
use url::Url;

use crate::domain::models::page::Page;
use crate::utils::errors::CrawlError;
use crate::utils::url_utils::resolve_url;

/// 不参与正文提取的元素
const EXCLUDED_ELEMENTS: [&str; 6] = ["script", "style", "noscript", "iframe", "object", "embed"];

/// HTML解析器
///
/// 从抓取到的HTML中提取标题、纯文本和出链
#[derive(Default, Clone)]
pub struct HtmlParser;

impl HtmlParser {
    /// 创建新的HTML解析器实例
    pub fn new() -> Self {
        Self
    }

    /// 解析页面，填充标题、纯文本和链接
    pub fn parse(&self, page: &mut Page) -> Result<(), CrawlError> {
        let title = self.extract_title(&page.html);
        page.set_title(title);

        let text = self.extract_text(&page.html);
        page.set_plain_text(text);

        let links = self.extract_links(&page.html, &page.url)?;
        page.add_links(links);

        Ok(())
    }

    /// 提取页面标题
    ///
    /// 优先取title标签，为空时退回第一个标题元素
    pub fn extract_title(&self, html: &str) -> String {
        let document = Html::parse_document(html);

        let title_selector = Selector::parse("title").unwrap();
        if let Some(el) = document.select(&title_selector).next() {
            let title = el.text().collect::<String>().trim().to_string();
            if !title.is_empty() {
                return title;
            }
        }

        let heading_selector = Selector::parse("h1, h2, h3, h4, h5, h6").unwrap();
        document
            .select(&heading_selector)
            .next()
            .map(|el| el.text().collect::<String>().trim().to_string())
            .unwrap_or_default()
    }

    /// 提取纯文本
    ///
    /// 跳过脚本、样式等非正文元素，空白折叠为单个空格
    pub fn extract_text(&self, html: &str) -> String {
        let document = Html::parse_document(html);
        let mut out = String::new();

        let mut stack = vec![document.tree.root()];
        while let Some(node) = stack.pop() {
            match node.value() {
                Node::Text(text) => {
                    out.push_str(&text.text);
                    out.push(' ');
                }
                Node::Element(el) => {
                    if EXCLUDED_ELEMENTS.contains(&el.name()) {
                        continue;
                    }
                    // 逆序压栈保持文档顺序
                    let children: Vec<_> = node.children().collect();
                    for child in children.into_iter().rev() {
                        stack.push(child);
                    }
                }
                _ => {
                    let children: Vec<_> = node.children().collect();
                    for child in children.into_iter().rev() {
                        stack.push(child);
                    }
                }
            }
        }

        out.split_whitespace().collect::<Vec<_>>().join(" ")
    }

    /// 提取出链
    ///
    /// 相对链接基于base标签（若有）或页面URL解析，
    /// 仅保留http/https协议，按文档顺序返回
    pub fn extract_links(&self, html: &str, base_url: &str) -> Result<Vec<String>, CrawlError> {
        let mut base = Url::parse(base_url)
            .map_err(|e| CrawlError::Parse(format!("invalid base URL {}: {}", base_url, e)))?;

        let document = Html::parse_document(html);

        let base_selector = Selector::parse("base[href]").unwrap();
        if let Some(el) = document.select(&base_selector).next() {
            if let Some(href) = el.value().attr("href") {
                if let Ok(resolved) = resolve_url(&base, href) {
                    base = resolved;
                }
            }
        }

        let link_selector = Selector::parse("a[href]").unwrap();
        let mut links = Vec::new();
        for el in document.select(&link_selector) {
            let Some(href) = el.value().attr("href") else {
                continue;
            };
            if href.is_empty() || href.starts_with('#') {
                continue;
            }

            let Ok(resolved) = resolve_url(&base, href) else {
                continue;
            };

            if resolved.scheme() == "http" || resolved.scheme() == "https" {
                links.push(resolved.to_string());
            }
        }

        Ok(links)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_title_from_title_tag() {
        let parser = HtmlParser::new();
        let html = "<html><head><title> Hello </title></head><body><h1>Other</h1></body></html>";
        assert_eq!(parser.extract_title(html), "Hello");
    }

    #[test]
    fn test_extract_title_falls_back_to_heading() {
        let parser = HtmlParser::new();
        let html = "<html><body><h2>Section heading</h2></body></html>";
        assert_eq!(parser.extract_title(html), "Section heading");
    }

    #[test]
    fn test_extract_text_skips_scripts_and_collapses_whitespace() {
        let parser = HtmlParser::new();
        let html = "<html><body><p>Hello   world</p>\n<script>var x = 1;</script><p>again</p></body></html>";
        assert_eq!(parser.extract_text(html), "Hello world again");
    }

    #[test]
    fn test_extract_links_resolves_and_filters_schemes() {
        let parser = HtmlParser::new();
        let html = concat!(
            "<html><body>",
            "<a href=\"/b\">b</a>",
            "<a href=\"#top\">top</a>",
            "<a href=\"mailto:x@y\">mail</a>",
            "<a href=\"javascript:void(0)\">js</a>",
            "<a href=\"https://other.com/c\">c</a>",
            "</body></html>"
        );
        let links = parser
            .extract_links(html, "https://example.com/a")
            .unwrap();
        assert_eq!(
            links,
            vec![
                "https://example.com/b".to_string(),
                "https://other.com/c".to_string()
            ]
        );
    }

    #[test]
    fn test_extract_links_honors_base_tag() {
        let parser = HtmlParser::new();
        let html = concat!(
            "<html><head><base href=\"https://cdn.example.com/root/\"></head>",
            "<body><a href=\"page\">p</a></body></html>"
        );
        let links = parser
            .extract_links(html, "https://example.com/a")
            .unwrap();
        assert_eq!(links, vec!["https://cdn.example.com/root/page".to_string()]);
    }

    #[test]
    fn test_parse_fills_page_fields() {
        let parser = HtmlParser::new();
        let mut page = Page::new(
            "https://example.com/".to_string(),
            200,
            "<html><head><title>T</title></head><body><p>body text</p><a href=\"/x\">x</a></body></html>"
                .to_string(),
            Default::default(),
            "text/html".to_string(),
        );
        parser.parse(&mut page).unwrap();
        assert_eq!(page.title, "T");
        assert_eq!(page.plain_text, "T body text x");
        assert_eq!(page.links, vec!["https://example.com/x".to_string()]);
        assert!(page.parsed_at.is_some());
    }
}
