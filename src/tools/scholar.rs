//! Citation-index search via SerpAPI's Google Scholar engine.

use async_trait::async_trait;
use serde_json::{json, Value};

use super::{Tool, ToolKind};

const SERPAPI_URL: &str = "https://serpapi.com/search.json";
const MAX_RESULTS: u64 = 5;

pub struct ScholarSearch {
    api_key: String,
}

impl ScholarSearch {
    pub fn new(api_key: String) -> Self {
        Self { api_key }
    }
}

#[async_trait]
impl Tool for ScholarSearch {
    fn kind(&self) -> ToolKind {
        ToolKind::CitationSearch
    }

    fn description(&self) -> &str {
        "Search Google Scholar for peer-reviewed literature and citations. Returns titles, links, and snippets. Use to verify how well a claim is supported in the literature."
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
            "{}?engine=google_scholar&q={}&num={}&api_key={}",
            SERPAPI_URL,
            urlencoding::encode(query),
            MAX_RESULTS,
            self.api_key
        );

        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()?;

        let response = client.get(&url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(anyhow::anyhow!("HTTP error: {}", status));
        }

        let body: Value = response.json().await?;
        let results = format_results(&body);

        if results.is_empty() {
            Ok(format!("No citations found for: {}", query))
        } else {
            Ok(results.join("\n\n"))
        }
    }
}

fn format_results(body: &Value) -> Vec<String> {
    body["organic_results"]
        .as_array()
        .map(|results| {
            results
                .iter()
                .filter_map(|r| {
                    let title = r["title"].as_str()?;
                    let snippet = r["snippet"].as_str().unwrap_or("No snippet");
                    let link = r["link"].as_str().unwrap_or("");
                    Some(format!("**{}**\n{}\nURL: {}", title, snippet, link))
                })
                .collect()
        })
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_organic_results() {
        let body = json!({
            "organic_results": [
                {"title": "Creatine supplementation review", "snippet": "Cited by 412.", "link": "https://example.org/paper"}
            ]
        });

        let formatted = format_results(&body);
        assert_eq!(formatted.len(), 1);
        assert!(formatted[0].contains("Creatine supplementation review"));
        assert!(formatted[0].contains("Cited by 412."));
    }

    #[test]
    fn missing_results_yield_empty() {
        assert!(format_results(&json!({})).is_empty());
    }
}
