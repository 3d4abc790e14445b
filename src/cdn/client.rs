use super::{CdnService, GET_UPLOAD_URLS, PREHEAT, REFRESH};
use crate::models::{ApiResponse, KeyRequest};
use crate::{Error, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use tracing::{debug, info};

pub struct CdnClient {
    client: Client,
    token: String,
    base_url: String,
}

impl CdnClient {
    pub fn new(token: String, base_url: String, client: Client) -> Self {
        Self {
            client,
            token,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    async fn post<T: DeserializeOwned>(&self, endpoint: &str, key: &str) -> Result<Option<T>> {
        let url = format!("{}{}", self.base_url, endpoint);
        let request = KeyRequest {
            token: &self.token,
            key,
        };

        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| Error::protocol(endpoint, format!("request failed: {}", e)))?;

        let body = response
            .text()
            .await
            .map_err(|e| Error::protocol(endpoint, format!("failed to read response: {}", e)))?;
        let parsed: ApiResponse = serde_json::from_str(&body).map_err(|e| {
            debug!("Unparsable CDN response from {}: {}", endpoint, body);
            Error::protocol(endpoint, format!("invalid response body: {}", e))
        })?;

        if parsed.retcode != 0 {
            debug!("CDN API {} returned retcode {}", endpoint, parsed.retcode);
            return Err(Error::protocol(endpoint, parsed.message.unwrap_or_default()));
        }

        match parsed.data {
            None | Some(serde_json::Value::Null) => Ok(None),
            Some(data) => serde_json::from_value(data)
                .map(Some)
                .map_err(|e| Error::protocol(endpoint, format!("invalid response data: {}", e))),
        }
    }
}

#[async_trait]
impl CdnService for CdnClient {
    async fn get_upload_urls(&self, key: &str) -> Result<Vec<String>> {
        info!("Fetching upload URLs for key {} from Snap Hutao CDN...", key);
        let urls: Option<Vec<String>> = self.post(GET_UPLOAD_URLS, key).await?;
        Ok(urls.unwrap_or_default())
    }

    async fn preheat(&self, key: &str) -> Result<()> {
        info!("Preheating CDN for key {}", key);
        self.post::<serde_json::Value>(PREHEAT, key).await?;
        info!("CDN preheat triggered successfully for key {}.", key);
        Ok(())
    }

    async fn refresh(&self, key: &str) -> Result<()> {
        info!("Refreshing CDN for key {}", key);
        self.post::<serde_json::Value>(REFRESH, key).await?;
        info!("CDN refresh triggered successfully for key {}.", key);
        Ok(())
    }
}
