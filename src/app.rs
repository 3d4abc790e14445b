//! Application orchestration for uploading a file or directory tree to the CDN.

use crate::cdn::{CdnClient, CdnService};
use crate::models::{Config, KeyUpload, PostAction, RunSummary, UploadRequest, UploadSession};
use crate::transfer::{FileUploader, TransferService};
use crate::walker::{derive_key, plan_uploads};
use crate::{Error, Result};
use std::path::Path;
use tracing::{info, warn};

/// Drives the upload protocol for one run: plan, upload every key to all of
/// its destinations in order, then run the post action.
pub struct App {
    cdn: Box<dyn CdnService>,
    transfer: Box<dyn TransferService>,
}

/// Injectable service bundle used to construct [`App`] in tests/harnesses.
pub struct AppServices {
    pub cdn: Box<dyn CdnService>,
    pub transfer: Box<dyn TransferService>,
}

impl App {
    pub fn with_services(services: AppServices) -> Self {
        Self {
            cdn: services.cdn,
            transfer: services.transfer,
        }
    }

    /// Build the HTTP-backed services from configuration. One connection pool
    /// is shared by the control-plane client and the uploader.
    pub fn new(config: &Config) -> Result<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(concat!("snap-hutao-cdn-client/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self::with_services(AppServices {
            cdn: Box::new(CdnClient::new(
                config.token.clone(),
                config.api_base.clone(),
                http_client.clone(),
            )),
            transfer: Box::new(FileUploader::new(http_client)),
        }))
    }

    /// Top-level key for `path`.
    ///
    /// Single files honor an explicit key and fall back to the file name.
    /// Directories are always keyed by their own name; an explicit key is
    /// ignored for them.
    pub fn resolve_key(path: &Path, explicit: Option<&str>) -> Result<String> {
        let metadata = std::fs::metadata(path).map_err(|_| {
            Error::Configuration(format!("Path does not exist: {}", path.display()))
        })?;

        if metadata.is_dir() {
            let key = derive_key(path)?;
            if let Some(explicit) = explicit.filter(|k| *k != key) {
                warn!(
                    "Ignoring key '{}' for directory {}, using '{}'",
                    explicit,
                    path.display(),
                    key
                );
            }
            return Ok(key);
        }

        match explicit {
            Some(key) => Ok(key.to_string()),
            None => derive_key(path),
        }
    }

    /// Upload one file to every destination the CDN hands out for `key`.
    pub async fn upload_key(&self, key: &str, path: &Path) -> Result<KeyUpload> {
        let destinations = self.cdn.get_upload_urls(key).await?;
        if destinations.is_empty() {
            return Err(Error::NoDestinations {
                key: key.to_string(),
            });
        }

        let session = UploadSession {
            key: key.to_string(),
            path: path.to_path_buf(),
            destinations,
        };
        let total = session.destinations.len();
        info!("Received {} upload URLs from Snap Hutao CDN.", total);

        let mut bytes = 0;
        for (i, url) in session.destinations.iter().enumerate() {
            info!("Uploading {} to URL {}/{}", session.path.display(), i + 1, total);
            bytes = self.transfer.put_file(url, &session.path).await?;
            info!("Uploaded {} to URL {}/{}", session.path.display(), i + 1, total);
        }

        info!(
            "File {} uploaded successfully to Snap Hutao CDN with key {}.",
            session.path.display(),
            session.key
        );

        Ok(KeyUpload {
            key: session.key,
            destinations: total,
            bytes,
        })
    }

    pub async fn dispatch_post_action(&self, action: PostAction, key: &str) -> Result<()> {
        match action {
            PostAction::Preheat => self.cdn.preheat(key).await,
            PostAction::Refresh => self.cdn.refresh(key).await,
            PostAction::None => {
                info!("No post action specified or action is 'none'. Skipping.");
                Ok(())
            }
        }
    }

    pub async fn run(&self, request: &UploadRequest) -> Result<RunSummary> {
        let key = Self::resolve_key(&request.path, request.key.as_deref())?;
        let targets = plan_uploads(&request.path, &key)?;

        info!("Starting Snap Hutao CDN upload");
        info!("Path: {}", request.path.display());
        info!("Key: {}", key);
        info!("Post Action: {}", request.post_action);
        info!("Files: {}", targets.len());

        if request.dry_run {
            for target in &targets {
                info!("Would upload {} -> {}", target.path.display(), target.key);
            }
            info!("Dry run complete, nothing was uploaded");
            return Ok(RunSummary {
                key,
                files: targets.len(),
                destinations: 0,
                bytes: 0,
                post_action: PostAction::None,
            });
        }

        let mut summary = RunSummary {
            key,
            files: 0,
            destinations: 0,
            bytes: 0,
            post_action: request.post_action,
        };

        for target in &targets {
            let uploaded = self.upload_key(&target.key, &target.path).await?;
            summary.files += 1;
            summary.destinations += uploaded.destinations;
            summary.bytes += uploaded.bytes;
        }

        self.dispatch_post_action(request.post_action, &summary.key)
            .await?;

        info!(
            "Uploaded {} file(s) ({} bytes) to {} destination(s) under key {}",
            summary.files, summary.bytes, summary.destinations, summary.key
        );
        Ok(summary)
    }
}
