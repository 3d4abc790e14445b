use std::sync::Arc;
use tracing::{info, warn};

/// One progress observation for a single PUT.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Progress {
    pub percent: u8,
    pub bytes_sent: u64,
    pub total_bytes: u64,
}

/// Receives progress observations. Errors are logged and otherwise ignored.
pub trait ProgressObserver: Send + Sync {
    fn observe(&self, progress: &Progress) -> anyhow::Result<()>;
}

impl<F> ProgressObserver for F
where
    F: Fn(&Progress) -> anyhow::Result<()> + Send + Sync,
{
    fn observe(&self, progress: &Progress) -> anyhow::Result<()> {
        self(progress)
    }
}

/// Default observer: one `info` line per observation.
pub struct LogProgress;

impl ProgressObserver for LogProgress {
    fn observe(&self, progress: &Progress) -> anyhow::Result<()> {
        info!(
            "Upload progress: {}% ({}/{} bytes)",
            progress.percent, progress.bytes_sent, progress.total_bytes
        );
        Ok(())
    }
}

/// Byte accounting for one PUT. Emits an observation each time the completed
/// percentage enters a new decile, so a transfer yields at most ten
/// observations and the last one is at 100%.
pub struct ProgressTracker {
    total: u64,
    sent: u64,
    last_decile: u8,
    observer: Arc<dyn ProgressObserver>,
}

impl ProgressTracker {
    pub fn new(total: u64, observer: Arc<dyn ProgressObserver>) -> Self {
        Self {
            total,
            sent: 0,
            last_decile: 0,
            observer,
        }
    }

    pub fn advance(&mut self, bytes: u64) {
        self.sent = self.sent.saturating_add(bytes);
        self.report();
    }

    /// Mark the body as fully sent. Only emits for transfers that never
    /// reached 100% through `advance`, i.e. empty files.
    pub fn finish(&mut self) {
        if self.total == 0 {
            self.report();
        }
    }

    fn percent(&self) -> u8 {
        if self.total == 0 {
            return 100;
        }
        let pct = (self.sent as u128 * 100) / self.total as u128;
        pct.min(100) as u8
    }

    fn report(&mut self) {
        let percent = self.percent();
        let decile = percent / 10;
        if decile <= self.last_decile {
            return;
        }
        self.last_decile = decile;

        let progress = Progress {
            percent,
            bytes_sent: self.sent,
            total_bytes: self.total,
        };
        if let Err(e) = self.observer.observe(&progress) {
            warn!("Progress observer failed: {:#}", e);
        }
    }
}
