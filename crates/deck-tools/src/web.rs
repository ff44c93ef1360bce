//! Reference-page fetching.
//!
//! Fetches a URL and extracts the visible text of the page, the way a
//! reader would see it: script/style/navigation subtrees are dropped and
//! whitespace runs are collapsed. Failures map to `Error::ReferenceFetch`;
//! it is the prompt builder's job to treat those as "no content".

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use ego_tree::NodeRef;
use scraper::{Html, Node};

use deck_core::{Error, ReferenceFetcher, Result};

/// Tags whose entire subtree carries no visible prose.
const SKIPPED_TAGS: &[&str] = &[
    "script", "style", "nav", "footer", "header", "aside", "noscript",
];

pub struct PageFetcher {
    client: Client,
}

impl PageFetcher {
    pub fn new() -> Self {
        Self {
            client: Client::builder()
                .user_agent("agentdeck/0.1.0")
                .timeout(Duration::from_secs(30))
                .build()
                .unwrap_or_default(),
        }
    }
}

impl Default for PageFetcher {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ReferenceFetcher for PageFetcher {
    async fn fetch_text(&self, url: &str) -> Result<String> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| Error::reference_fetch(url, e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::reference_fetch(url, format!("HTTP {status}")));
        }

        let html = response
            .text()
            .await
            .map_err(|e| Error::reference_fetch(url, e.to_string()))?;

        Ok(visible_text(&html))
    }
}

/// Extract the visible text of an HTML document.
pub fn visible_text(html: &str) -> String {
    let document = Html::parse_document(html);
    let mut text = String::new();
    collect_text(document.tree.root(), &mut text);
    collapse_whitespace(&text)
}

fn collect_text(node: NodeRef<'_, Node>, out: &mut String) {
    match node.value() {
        Node::Element(el) if SKIPPED_TAGS.contains(&el.name()) => {}
        Node::Text(t) => {
            let trimmed = t.text.trim();
            if !trimmed.is_empty() {
                if !out.is_empty() {
                    out.push(' ');
                }
                out.push_str(trimmed);
            }
        }
        Node::Comment(_) | Node::Doctype(_) | Node::ProcessingInstruction(_) => {}
        _ => {
            for child in node.children() {
                collect_text(child, out);
            }
        }
    }
}

fn collapse_whitespace(text: &str) -> String {
    let mut result = String::with_capacity(text.len());
    let mut prev_was_space = false;

    for ch in text.chars() {
        if ch.is_whitespace() {
            if !prev_was_space {
                result.push(' ');
                prev_was_space = true;
            }
        } else {
            result.push(ch);
            prev_was_space = false;
        }
    }

    result.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_visible_text_keeps_prose() {
        let text =
            visible_text("<html><body><h1>Title</h1><p>First line.</p><p>Second.</p></body></html>");
        assert_eq!(text, "Title First line. Second.");
    }

    #[test]
    fn test_visible_text_drops_script_and_style_subtrees() {
        let text = visible_text(
            "<html><head><style>p { color: red; }</style></head>\
             <body><p>Hello</p><script>var x = 1;</script><p>World</p></body></html>",
        );
        assert_eq!(text, "Hello World");
    }

    #[test]
    fn test_visible_text_drops_navigation_chrome() {
        let text = visible_text(
            "<body><nav><a href='/'>Home</a></nav><main>Content here</main>\
             <footer>Copyright</footer></body>",
        );
        assert_eq!(text, "Content here");
    }

    #[test]
    fn test_collapse_whitespace_folds_runs() {
        assert_eq!(collapse_whitespace("  a \n\n  b\tc  "), "a b c");
    }

    #[test]
    fn test_visible_text_of_empty_page() {
        assert_eq!(visible_text("<html><body></body></html>"), "");
    }
}
