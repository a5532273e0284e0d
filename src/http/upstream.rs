//! Optional upstream call made by `/ping` after the injected delay.

use std::time::Duration;

use crate::config::UpstreamConfig;

#[derive(Debug, Clone)]
pub struct Upstream {
    client: reqwest::Client,
    url: String,
}

impl Upstream {
    /// Build the upstream client, or `None` when no URL is configured.
    pub fn from_config(config: &UpstreamConfig) -> Result<Option<Self>, reqwest::Error> {
        let Some(url) = config.url.clone() else {
            return Ok(None);
        };
        let client = reqwest::Client::builder()
            .connect_timeout(Duration::from_millis(config.connect_timeout_ms))
            .build()?;
        Ok(Some(Self { client, url }))
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// GET the upstream and return its body. Non-2xx statuses are errors.
    pub async fn fetch(&self) -> Result<String, reqwest::Error> {
        self.client
            .get(&self.url)
            .send()
            .await?
            .error_for_status()?
            .text()
            .await
    }
}
