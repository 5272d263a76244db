use parking_lot::RwLock;
use serde_json::Value;
use tracing::{debug, info, warn};

use super::model::*;
use crate::filetype::is_video;
use crate::prelude::FsService;
use crate::{join_path, AlistFile, Error, Result};

/// What [`ProgressStore::initialize`] did. Failures are reported here rather
/// than as an `Err`: a course without readable progress still opens.
#[derive(Debug)]
#[must_use]
pub enum LoadOutcome {
    Loaded,
    Missing,
    Failed(Error),
}

impl LoadOutcome {
    pub fn is_loaded(&self) -> bool {
        matches!(self, LoadOutcome::Loaded)
    }
}

#[derive(Debug)]
#[must_use]
pub struct ScanOutcome {
    pub added: usize,
    pub saved: Result<()>,
}

/// Progress of the active course, shared by reference between the CLI, the
/// per-video managers and their autosave tasks.
pub struct ProgressStore<R> {
    remote: R,
    state: RwLock<CourseProgress>,
}

impl<R: FsService> ProgressStore<R> {
    pub fn new(remote: R) -> Self {
        Self {
            remote,
            state: RwLock::new(CourseProgress::default()),
        }
    }

    pub fn remote(&self) -> &R {
        &self.remote
    }

    pub fn course_root(&self) -> String {
        self.state.read().course_root_path.clone()
    }

    pub fn sidecar_path(&self) -> String {
        join_path(&self.state.read().course_root_path, PROGRESS_FILE)
    }

    pub fn snapshot(&self) -> CourseProgress {
        self.state.read().clone()
    }

    /// Drops everything known about the previous course and loads `root`.
    pub async fn change_course(&self, root: &str) -> LoadOutcome {
        *self.state.write() = CourseProgress::for_root(root);
        info!(root, "course changed");
        self.initialize().await
    }

    /// Fetches the sidecar file and merges its top-level fields over the
    /// current state. The state is untouched unless the whole file parses.
    pub async fn initialize(&self) -> LoadOutcome {
        if self.course_root().is_empty() {
            return LoadOutcome::Failed(Error::NoCourse);
        }
        let path = self.sidecar_path();
        let merged = match self.fetch_sidecar(&path).await {
            Ok(blob) => self.merge(blob),
            Err(e) => Err(e),
        };
        match merged {
            Ok(()) => {
                debug!(path = %path, "progress loaded");
                LoadOutcome::Loaded
            }
            Err(e) if e.is_not_found() => {
                debug!(path = %path, "no progress file yet, using defaults");
                LoadOutcome::Missing
            }
            Err(e) => {
                warn!(path = %path, error = %e, "failed to load progress, using current state");
                LoadOutcome::Failed(e)
            }
        }
    }

    async fn fetch_sidecar(&self, path: &str) -> Result<Value> {
        let info = self.remote.get(path).await?;
        let bytes = self.remote.fetch_raw(info.raw_url()).await?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    fn merge(&self, blob: Value) -> Result<()> {
        let Value::Object(fields) = blob else {
            return Err(Error::NotObject);
        };
        let mut state = self.state.write();
        let Value::Object(mut current) = serde_json::to_value(&*state)? else {
            return Err(Error::NotObject);
        };
        current.extend(fields);
        *state = serde_json::from_value(Value::Object(current))?;
        Ok(())
    }

    pub fn get_video_progress(&self, path: &str) -> Option<VideoProgress> {
        self.state.read().videos.get(path).cloned()
    }

    /// Stores `progress` under `path` and refreshes the aggregate of its
    /// parent directory. The record's own path is overwritten with the key.
    pub fn update_video_progress(&self, path: &str, mut progress: VideoProgress) {
        path.clone_into(&mut progress.path);
        let mut state = self.state.write();
        state.videos.insert(path.to_owned(), progress);
        state.refresh_dir(parent_dir(path));
    }

    /// Completion of `path` in percent, 0 when nothing was recorded.
    pub fn get_dir_progress(&self, path: &str) -> f64 {
        self.state
            .read()
            .dir_progress
            .get(path)
            .map_or(0.0, |ratio| ratio * 100.0)
    }

    /// Registers every video of a directory listing that is not tracked yet,
    /// then saves. Known entries keep their progress.
    pub async fn init_dir_child_process(&self, files: &[AlistFile]) -> ScanOutcome {
        let added = {
            let mut state = self.state.write();
            let mut added = Vec::new();
            for file in files.iter().filter(|f| is_video(f)) {
                if state.videos.contains_key(file.path()) {
                    continue;
                }
                state
                    .videos
                    .insert(file.path().clone(), VideoProgress::unwatched(file.path()));
                added.push(file.path().clone());
            }
            // aggregates that now count an extra unwatched video
            let stale: Vec<String> = state
                .dir_progress
                .keys()
                .filter(|dir| added.iter().any(|p| p.starts_with(dir.as_str())))
                .cloned()
                .collect();
            for dir in &stale {
                state.refresh_dir(dir);
            }
            added.len()
        };
        let saved = self.save_progress().await;
        if let Err(e) = &saved {
            warn!(error = %e, "failed to save progress after scan");
        }
        ScanOutcome { added, saved }
    }

    /// Uploads the whole state as pretty JSON over the sidecar file.
    pub async fn save_progress(&self) -> Result<()> {
        let (path, content) = {
            let state = self.state.read();
            if state.course_root_path.is_empty() {
                return Err(Error::NoCourse);
            }
            (
                join_path(&state.course_root_path, PROGRESS_FILE),
                serde_json::to_vec_pretty(&*state)?,
            )
        };
        self.remote.put_form(&path, PROGRESS_FILE, content).await?;
        debug!(path = %path, "progress saved");
        Ok(())
    }
}
