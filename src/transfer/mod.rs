//! File transfer to pre-signed destinations
//!
//! Streams a local file to one destination URL with a single PUT and reports
//! coarse progress while the body is being read.

pub mod mock;
pub mod progress;
pub mod uploader;

pub use mock::MockTransfer;
pub use progress::{LogProgress, Progress, ProgressObserver, ProgressTracker};
pub use uploader::FileUploader;

use crate::Result;
use async_trait::async_trait;
use std::path::Path;

#[async_trait]
pub trait TransferService: Send + Sync {
    /// PUT the full content of `path` to `url`. Returns the number of bytes sent.
    async fn put_file(&self, url: &str, path: &Path) -> Result<u64>;
}
