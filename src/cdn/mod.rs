//! CDN control-plane integration
//!
//! Issues the JSON calls that hand out pre-signed upload URLs and trigger
//! edge cache preheat/refresh for a key.

pub mod client;
pub mod mock;

pub use client::CdnClient;
pub use mock::MockCdnClient;

use crate::Result;
use async_trait::async_trait;

pub const GET_UPLOAD_URLS: &str = "/v2/getUploadUrls";
pub const PREHEAT: &str = "/v2/preheat";
pub const REFRESH: &str = "/v2/refresh";

#[async_trait]
pub trait CdnService: Send + Sync {
    /// Ordered list of pre-signed destinations for `key`. May be empty.
    async fn get_upload_urls(&self, key: &str) -> Result<Vec<String>>;
    async fn preheat(&self, key: &str) -> Result<()>;
    async fn refresh(&self, key: &str) -> Result<()>;
}
