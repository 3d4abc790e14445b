//! Uploader for the Snap Hutao CDN
//!
//! Requests pre-signed upload URLs from the CDN control plane, streams a local
//! file (or every file of a directory tree) to each of them, and optionally
//! asks the CDN to preheat or refresh the uploaded key afterwards.

pub mod app;
pub mod cdn;
pub mod error;
pub mod models;
pub mod transfer;
pub mod walker;

pub use error::{Error, Result};
