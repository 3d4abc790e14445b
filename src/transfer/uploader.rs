use super::progress::{LogProgress, ProgressObserver, ProgressTracker};
use super::TransferService;
use crate::{Error, Result};
use async_trait::async_trait;
use futures::StreamExt;
use reqwest::header::{CONTENT_LENGTH, CONTENT_TYPE};
use reqwest::{Body, Client, StatusCode};
use std::path::Path;
use std::sync::{Arc, Mutex};
use tokio::fs::File;
use tokio_util::io::ReaderStream;
use tracing::debug;

pub struct FileUploader {
    client: Client,
    observer: Arc<dyn ProgressObserver>,
}

impl FileUploader {
    pub fn new(client: Client) -> Self {
        Self {
            client,
            observer: Arc::new(LogProgress),
        }
    }

    pub fn with_observer(mut self, observer: Arc<dyn ProgressObserver>) -> Self {
        self.observer = observer;
        self
    }
}

#[async_trait]
impl TransferService for FileUploader {
    async fn put_file(&self, url: &str, path: &Path) -> Result<u64> {
        let metadata = tokio::fs::metadata(path)
            .await
            .map_err(|e| Error::invalid_path(path, e))?;
        if !metadata.is_file() {
            return Err(Error::invalid_path(path, "not a regular file"));
        }
        let total = metadata.len();

        let file = File::open(path)
            .await
            .map_err(|e| Error::invalid_path(path, e))?;

        let tracker = Arc::new(Mutex::new(ProgressTracker::new(
            total,
            Arc::clone(&self.observer),
        )));
        let stream_tracker = Arc::clone(&tracker);
        let stream = ReaderStream::new(file).map(move |chunk| {
            if let (Ok(bytes), Ok(mut tracker)) = (&chunk, stream_tracker.lock()) {
                tracker.advance(bytes.len() as u64);
            }
            chunk
        });

        debug!("PUT {} bytes from {}", total, path.display());
        let response = self
            .client
            .put(url)
            .header(CONTENT_TYPE, "application/octet-stream")
            .header(CONTENT_LENGTH, total)
            .body(Body::wrap_stream(stream))
            .send()
            .await?;

        let status = response.status();
        if status != StatusCode::OK {
            let body = response.text().await?;
            debug!("PUT {} answered {}", path.display(), status);
            return Err(Error::Upload {
                status: status.as_u16(),
                body,
            });
        }

        if let Ok(mut tracker) = tracker.lock() {
            tracker.finish();
        }

        Ok(total)
    }
}
