use super::TransferService;
use crate::{Error, Result};
use async_trait::async_trait;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

/// Records every PUT instead of sending it. Destinations registered with
/// `with_status` answer with that status code.
#[derive(Clone)]
pub struct MockTransfer {
    statuses: Arc<Mutex<HashMap<String, u16>>>,
    puts: Arc<Mutex<Vec<(String, PathBuf)>>>,
}

impl MockTransfer {
    pub fn new() -> Self {
        Self {
            statuses: Arc::new(Mutex::new(HashMap::new())),
            puts: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn with_status(self, url: &str, status: u16) -> Self {
        self.statuses
            .lock()
            .unwrap()
            .insert(url.to_string(), status);
        self
    }

    pub fn get_put_count(&self) -> usize {
        self.puts.lock().unwrap().len()
    }

    pub fn get_puts(&self) -> Vec<(String, PathBuf)> {
        self.puts.lock().unwrap().clone()
    }

    pub fn get_put_urls(&self) -> Vec<String> {
        self.get_puts().into_iter().map(|(url, _)| url).collect()
    }
}

impl Default for MockTransfer {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TransferService for MockTransfer {
    async fn put_file(&self, url: &str, path: &Path) -> Result<u64> {
        let metadata = tokio::fs::metadata(path)
            .await
            .map_err(|e| Error::invalid_path(path, e))?;

        self.puts
            .lock()
            .unwrap()
            .push((url.to_string(), path.to_path_buf()));

        let status = self.statuses.lock().unwrap().get(url).copied().unwrap_or(200);
        if status != 200 {
            return Err(Error::Upload {
                status,
                body: format!("mock status {}", status),
            });
        }

        Ok(metadata.len())
    }
}
