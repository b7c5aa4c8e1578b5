//! News headlines client
//!
//! Fetches latest headlines from a configurable JSON endpoint
//! (NewsAPI-style `{"articles": [{"title": ...}]}` shape).

use serde::Deserialize;

use crate::config::NewsConfig;
use crate::{Error, Result};

#[derive(Debug, Deserialize)]
struct NewsResponse {
    #[serde(default)]
    articles: Vec<Article>,
}

#[derive(Debug, Deserialize)]
struct Article {
    title: Option<String>,
}

/// News feed client
pub struct NewsClient {
    endpoint: String,
    api_key: Option<String>,
    headline_count: usize,
    client: reqwest::Client,
}

impl NewsClient {
    /// Create a client for a news endpoint
    #[must_use]
    pub fn new(config: &NewsConfig) -> Self {
        Self {
            endpoint: config.endpoint.clone(),
            api_key: config.api_key.clone(),
            headline_count: config.headline_count,
            client: reqwest::Client::new(),
        }
    }

    /// Latest headlines, at most the configured count
    ///
    /// # Errors
    ///
    /// Returns [`Error::News`] when the feed cannot be fetched.
    pub async fn latest_headlines(&self) -> Result<Vec<String>> {
        let mut request = self.client.get(&self.endpoint);
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let response = request.send().await?;
        if !response.status().is_success() {
            return Err(Error::News(format!(
                "news fetch failed with {}",
                response.status()
            )));
        }

        let news: NewsResponse = response.json().await?;
        let headlines: Vec<String> = news
            .articles
            .into_iter()
            .filter_map(|a| a.title)
            .filter(|t| !t.is_empty())
            .take(self.headline_count)
            .collect();

        tracing::debug!(count = headlines.len(), "fetched headlines");
        Ok(headlines)
    }
}
