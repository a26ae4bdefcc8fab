//! General web search backed by the Tavily API.

use async_trait::async_trait;
use serde_json::{json, Value};

use super::{Tool, ToolKind};

const TAVILY_URL: &str = "https://api.tavily.com/search";
const DEFAULT_MAX_RESULTS: u64 = 10;

pub struct WebSearch {
    api_key: String,
}

impl WebSearch {
    pub fn new(api_key: String) -> Self {
        Self { api_key }
    }
}

#[async_trait]
impl Tool for WebSearch {
    fn kind(&self) -> ToolKind {
        ToolKind::WebSearch
    }

    fn description(&self) -> &str {
        "Search the web for current information on a topic. Returns result titles, snippets, and URLs. Use for news coverage, product pages, and general background."
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "query": {
                    "type": "string",
                    "description": "The search query"
                },
                "max_results": {
                    "type": "integer",
                    "description": "Maximum number of results to return (default: 10)"
                }
            },
            "required": ["query"]
        })
    }

    async fn execute(&self, args: Value) -> anyhow::Result<String> {
        let query = args["query"]
            .as_str()
            .ok_or_else(|| anyhow::anyhow!("Missing 'query' argument"))?;
        let max_results = args["max_results"].as_u64().unwrap_or(DEFAULT_MAX_RESULTS);

        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()?;

        let response = client
            .post(TAVILY_URL)
            .json(&json!({
                "api_key": self.api_key,
                "query": query,
                "max_results": max_results,
            }))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(anyhow::anyhow!("HTTP error: {}", status));
        }

        let body: Value = response.json().await?;
        let results = format_results(&body);

        if results.is_empty() {
            Ok(format!("No results found for: {}", query))
        } else {
            Ok(results.join("\n\n"))
        }
    }
}

/// Render the Tavily result array into titled snippets.
fn format_results(body: &Value) -> Vec<String> {
    body["results"]
        .as_array()
        .map(|results| {
            results
                .iter()
                .filter_map(|r| {
                    let title = r["title"].as_str()?;
                    let content = r["content"].as_str().unwrap_or("No snippet");
                    let url = r["url"].as_str().unwrap_or("");
                    Some(format!("**{}**\n{}\nURL: {}", title, content, url))
                })
                .collect()
        })
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_result_entries() {
        let body = json!({
            "results": [
                {"title": "Vitamin D and colds", "content": "A trial summary.", "url": "https://example.org/a"},
                {"title": "Untitled snippet", "url": "https://example.org/b"}
            ]
        });

        let formatted = format_results(&body);
        assert_eq!(formatted.len(), 2);
        assert!(formatted[0].starts_with("**Vitamin D and colds**"));
        assert!(formatted[0].contains("URL: https://example.org/a"));
        assert!(formatted[1].contains("No snippet"));
    }

    #[test]
    fn missing_results_array_yields_empty() {
        assert!(format_results(&json!({"answer": "n/a"})).is_empty());
        assert!(format_results(&json!({"results": []})).is_empty());
    }
}
