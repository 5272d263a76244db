use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use super::model::VideoProgress;
use super::store::ProgressStore;
use crate::prelude::FsService;
use crate::{AlistFile, Result};

pub const AUTO_SYNC_PERIOD: Duration = Duration::from_secs(5);
pub const MIN_SYNC_PERIOD: Duration = Duration::from_millis(1);

struct AutoSync {
    cancel: CancellationToken,
    handle: JoinHandle<()>,
}

/// Playback session of one video: turns time updates into store updates and
/// owns the periodic save of the store while the video is open.
///
/// Idle after construction; `start_auto_sync` moves it to syncing,
/// `stop_auto_sync` back to idle with a final save. Dropping it stops the
/// task without saving.
pub struct ProgressManager<R: FsService + 'static> {
    store: Arc<ProgressStore<R>>,
    file: AlistFile,
    period: Duration,
    sync: Option<AutoSync>,
}

impl<R: FsService + 'static> ProgressManager<R> {
    pub fn new(store: Arc<ProgressStore<R>>, file: AlistFile) -> Self {
        Self {
            store,
            file,
            period: AUTO_SYNC_PERIOD,
            sync: None,
        }
    }

    /// Periods below `MIN_SYNC_PERIOD` are raised to it.
    pub fn with_sync_period(mut self, period: Duration) -> Self {
        self.period = period.max(MIN_SYNC_PERIOD);
        self
    }

    pub fn file(&self) -> &AlistFile {
        &self.file
    }

    /// Binds the session to another video. A running autosave keeps running.
    pub fn load_progress(&mut self, file: AlistFile) {
        self.file = file;
    }

    pub fn update_progress(&self, current_time: f64, duration: f64) -> VideoProgress {
        let path = self.file.path();
        let progress = VideoProgress::observed(
            path,
            current_time,
            duration,
            chrono::Utc::now().timestamp_millis(),
        );
        self.store.update_video_progress(path, progress.clone());
        progress
    }

    pub fn get_video_progress(&self) -> Option<VideoProgress> {
        self.store.get_video_progress(self.file.path())
    }

    pub fn is_syncing(&self) -> bool {
        self.sync.is_some()
    }

    /// Saves the store every period until stopped. Restarting replaces the
    /// running task without an extra save. Must be called inside a tokio runtime.
    pub fn start_auto_sync(&mut self) {
        if let Some(old) = self.sync.take() {
            old.cancel.cancel();
            old.handle.abort();
        }
        let cancel = CancellationToken::new();
        let handle = tokio::spawn(run_auto_sync(
            self.store.clone(),
            self.period,
            cancel.clone(),
        ));
        debug!(path = %self.file.path(), "autosync started");
        self.sync = Some(AutoSync { cancel, handle });
    }

    /// Stops the periodic save and saves once more. `None` when nothing was
    /// running, in which case nothing is saved.
    pub async fn stop_auto_sync(&mut self) -> Option<Result<()>> {
        let sync = self.sync.take()?;
        sync.cancel.cancel();
        if let Err(e) = sync.handle.await {
            warn!(error = %e, "autosync task ended abnormally");
        }
        debug!(path = %self.file.path(), "autosync stopped");
        Some(self.store.save_progress().await)
    }
}

impl<R: FsService + 'static> Drop for ProgressManager<R> {
    fn drop(&mut self) {
        if let Some(sync) = self.sync.take() {
            sync.cancel.cancel();
        }
    }
}

async fn run_auto_sync<R: FsService + 'static>(
    store: Arc<ProgressStore<R>>,
    period: Duration,
    cancel: CancellationToken,
) {
    let mut ticker = interval_at(Instant::now() + period, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    loop {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => break,
            _ = ticker.tick() => {
                // saves run detached and may overlap
                let store = store.clone();
                tokio::spawn(async move {
                    if let Err(e) = store.save_progress().await {
                        warn!(error = %e, "autosave failed, retrying on next tick");
                    }
                });
            }
        }
    }
}
