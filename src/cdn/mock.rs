use super::{CdnService, GET_UPLOAD_URLS, PREHEAT, REFRESH};
use crate::{Error, Result};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// In-memory control plane. Hands out `{base_url}/{key}` as the single
/// destination unless destinations were registered for the key.
#[derive(Clone)]
pub struct MockCdnClient {
    base_url: String,
    destinations: Arc<Mutex<HashMap<String, Vec<String>>>>,
    failure: Arc<Mutex<Option<String>>>,
    requested_keys: Arc<Mutex<Vec<String>>>,
    preheated: Arc<Mutex<Vec<String>>>,
    refreshed: Arc<Mutex<Vec<String>>>,
}

impl MockCdnClient {
    pub fn new() -> Self {
        Self {
            base_url: "https://mock-store.example.com".to_string(),
            destinations: Arc::new(Mutex::new(HashMap::new())),
            failure: Arc::new(Mutex::new(None)),
            requested_keys: Arc::new(Mutex::new(Vec::new())),
            preheated: Arc::new(Mutex::new(Vec::new())),
            refreshed: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn with_base_url(mut self, base_url: String) -> Self {
        self.base_url = base_url;
        self
    }

    pub fn with_destinations(self, key: &str, urls: Vec<String>) -> Self {
        self.destinations
            .lock()
            .unwrap()
            .insert(key.to_string(), urls);
        self
    }

    /// Make every call answer with a non-zero retcode carrying `message`.
    pub fn with_failure(self, message: &str) -> Self {
        *self.failure.lock().unwrap() = Some(message.to_string());
        self
    }

    pub fn get_requested_keys(&self) -> Vec<String> {
        self.requested_keys.lock().unwrap().clone()
    }

    pub fn get_preheated(&self) -> Vec<String> {
        self.preheated.lock().unwrap().clone()
    }

    pub fn get_refreshed(&self) -> Vec<String> {
        self.refreshed.lock().unwrap().clone()
    }

    fn check_failure(&self, endpoint: &str) -> Result<()> {
        match self.failure.lock().unwrap().as_ref() {
            Some(message) => Err(Error::protocol(endpoint, message.clone())),
            None => Ok(()),
        }
    }
}

impl Default for MockCdnClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CdnService for MockCdnClient {
    async fn get_upload_urls(&self, key: &str) -> Result<Vec<String>> {
        self.requested_keys.lock().unwrap().push(key.to_string());
        self.check_failure(GET_UPLOAD_URLS)?;

        let destinations = self.destinations.lock().unwrap();
        Ok(destinations
            .get(key)
            .cloned()
            .unwrap_or_else(|| vec![format!("{}/{}", self.base_url, key)]))
    }

    async fn preheat(&self, key: &str) -> Result<()> {
        self.check_failure(PREHEAT)?;
        self.preheated.lock().unwrap().push(key.to_string());
        Ok(())
    }

    async fn refresh(&self, key: &str) -> Result<()> {
        self.check_failure(REFRESH)?;
        self.refreshed.lock().unwrap().push(key.to_string());
        Ok(())
    }
}
