//! TavilySearch -- [`SearchTool`] backed by the Tavily search API.

use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use sms_ai_core::search::SearchTool;
use sms_ai_types::config::SearchSettings;
use sms_ai_types::error::SearchError;

#[derive(Debug, Serialize)]
struct TavilyRequest<'a> {
    query: &'a str,
    max_results: u32,
    topic: &'a str,
    search_depth: &'a str,
    include_answer: &'a str,
    include_raw_content: bool,
}

/// Tavily web search client. Results are returned as the raw response JSON.
pub struct TavilySearch {
    client: reqwest::Client,
    api_key: SecretString,
    settings: SearchSettings,
}

impl TavilySearch {
    pub fn new(api_key: SecretString, settings: SearchSettings) -> Result<Self, SearchError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(60))
            .build()
            .map_err(|e| SearchError::Request(format!("failed to create HTTP client: {e}")))?;
        Ok(Self {
            client,
            api_key,
            settings,
        })
    }
}

impl SearchTool for TavilySearch {
    fn name(&self) -> &str {
        "tavily"
    }

    async fn search(&self, query: &str) -> Result<Value, SearchError> {
        let url = format!("{}/search", self.settings.base_url.trim_end_matches('/'));
        let body = TavilyRequest {
            query,
            max_results: self.settings.max_results,
            topic: &self.settings.topic,
            search_depth: &self.settings.search_depth,
            include_answer: &self.settings.include_answer,
            include_raw_content: false,
        };

        let response = self
            .client
            .post(&url)
            .bearer_auth(self.api_key.expose_secret())
            .json(&body)
            .send()
            .await
            .map_err(|e| SearchError::Request(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SearchError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let value: Value = response
            .json()
            .await
            .map_err(|e| SearchError::Request(format!("invalid search response: {e}")))?;
        debug!(
            %query,
            results = value["results"].as_array().map_or(0, Vec::len),
            "tavily search complete"
        );
        Ok(value)
    }
}
