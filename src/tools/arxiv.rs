//! Academic-paper search against the arXiv Atom API.

use async_trait::async_trait;
use serde_json::{json, Value};

use super::{Tool, ToolKind};

const ARXIV_URL: &str = "http://export.arxiv.org/api/query";
const MAX_RESULTS: u64 = 3;

pub struct ArxivSearch;

impl ArxivSearch {
    pub fn new() -> Self {
        Self
    }
}

impl Default for ArxivSearch {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Tool for ArxivSearch {
    fn kind(&self) -> ToolKind {
        ToolKind::AcademicSearch
    }

    fn description(&self) -> &str {
        "Search arXiv for academic papers. Returns paper titles, abstracts, and links. Use for primary research on scientific questions."
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "query": {
                    "type": "string",
                    "description": "The search query"
                }
            },
            "required": ["query"]
        })
    }

    async fn execute(&self, args: Value) -> anyhow::Result<String> {
        let query = args["query"]
            .as_str()
            .ok_or_else(|| anyhow::anyhow!("Missing 'query' argument"))?;

        let url = format!(
            "{}?search_query=all:{}&start=0&max_results={}",
            ARXIV_URL,
            urlencoding::encode(query),
            MAX_RESULTS
        );

        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()?;

        let response = client.get(&url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(anyhow::anyhow!("HTTP error: {}", status));
        }

        let feed = response.text().await?;
        let entries = extract_entries(&feed);

        if entries.is_empty() {
            Ok(format!("No papers found for: {}", query))
        } else {
            Ok(entries.join("\n\n"))
        }
    }
}

/// Pull title/summary/link out of each Atom `<entry>`.
fn extract_entries(feed: &str) -> Vec<String> {
    feed.split("<entry>")
        .skip(1)
        .filter_map(|chunk| {
            let title = extract_tag(chunk, "title")?;
            let summary = extract_tag(chunk, "summary").unwrap_or_default();
            let link = extract_tag(chunk, "id").unwrap_or_default();
            Some(format!(
                "**{}**\n{}\nURL: {}",
                collapse_whitespace(&title),
                collapse_whitespace(&summary),
                link.trim()
            ))
        })
        .collect()
}

fn extract_tag(chunk: &str, tag: &str) -> Option<String> {
    let open = format!("<{}>", tag);
    let close = format!("</{}>", tag);
    let start = chunk.find(&open)? + open.len();
    let end = chunk[start..].find(&close)? + start;
    Some(xml_decode(&chunk[start..end]))
}

fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn xml_decode(s: &str) -> String {
    s.replace("&amp;", "&")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
}

#[cfg(test)]
mod tests {
    use super::*;

    const FEED: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<feed xmlns="http://www.w3.org/2005/Atom">
  <title>ArXiv Query Results</title>
  <entry>
    <id>http://arxiv.org/abs/1234.5678</id>
    <title>Vitamin D &amp; respiratory
      infection</title>
    <summary>A meta-analysis of
      randomized trials.</summary>
  </entry>
  <entry>
    <id>http://arxiv.org/abs/2345.6789</id>
    <title>Second paper</title>
    <summary>Another abstract.</summary>
  </entry>
</feed>"#;

    #[test]
    fn extracts_entries_from_feed() {
        let entries = extract_entries(FEED);
        assert_eq!(entries.len(), 2);
        assert!(entries[0].starts_with("**Vitamin D & respiratory infection**"));
        assert!(entries[0].contains("A meta-analysis of randomized trials."));
        assert!(entries[0].contains("URL: http://arxiv.org/abs/1234.5678"));
        assert!(entries[1].starts_with("**Second paper**"));
    }

    #[test]
    fn feed_title_is_not_an_entry() {
        // The feed-level <title> sits before the first <entry> and must not leak in.
        let entries = extract_entries(FEED);
        assert!(entries.iter().all(|e| !e.contains("ArXiv Query Results")));
    }

    #[test]
    fn empty_feed_yields_no_entries() {
        assert!(extract_entries("<feed></feed>").is_empty());
    }
}
