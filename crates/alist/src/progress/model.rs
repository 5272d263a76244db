use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

pub const PROGRESS_FILE: &str = ".course_progress.json";
pub const SCHEMA_VERSION: &str = "1.0.0";

/// A video counts as watched once playback gets this close to the end.
pub const COMPLETION_WINDOW_SECS: f64 = 15.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoProgress {
    pub path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_time: Option<f64>,
    /// Unix time in milliseconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_updated: Option<i64>,
    #[serde(default)]
    pub completed: bool,
}

impl VideoProgress {
    pub fn unwatched(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            duration: None,
            current_time: None,
            last_updated: None,
            completed: false,
        }
    }

    pub fn observed(path: impl Into<String>, current_time: f64, duration: f64, now_ms: i64) -> Self {
        Self {
            path: path.into(),
            duration: Some(duration),
            current_time: Some(current_time),
            last_updated: Some(now_ms),
            completed: is_completed(current_time, duration),
        }
    }
}

pub fn is_completed(current_time: f64, duration: f64) -> bool {
    current_time >= duration - COMPLETION_WINDOW_SECS
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseProgress {
    pub version: String,
    #[serde(default)]
    pub course_path: String,
    #[serde(default)]
    pub course_root_path: String,
    #[serde(default)]
    pub videos: BTreeMap<String, VideoProgress>,
    /// Completed fraction in `[0, 1]` per directory.
    #[serde(default)]
    pub dir_progress: BTreeMap<String, f64>,
}

impl Default for CourseProgress {
    fn default() -> Self {
        Self {
            version: SCHEMA_VERSION.to_owned(),
            course_path: String::new(),
            course_root_path: String::new(),
            videos: BTreeMap::new(),
            dir_progress: BTreeMap::new(),
        }
    }
}

impl CourseProgress {
    pub fn for_root(root: impl Into<String>) -> Self {
        Self {
            course_root_path: root.into(),
            ..Default::default()
        }
    }

    /// Recomputes and stores the aggregate of `dir`. "Under" is a plain string
    /// prefix test on the video path, so `/course/1` also counts `/course/10/..`.
    pub fn refresh_dir(&mut self, dir: &str) {
        let (total, done) = self
            .videos
            .values()
            .filter(|v| v.path.starts_with(dir))
            .fold((0usize, 0usize), |(total, done), v| {
                (total + 1, done + usize::from(v.completed))
            });
        if total > 0 {
            self.dir_progress
                .insert(dir.to_owned(), done as f64 / total as f64);
        }
    }
}

/// Directory holding `path`; `/` for top-level entries.
pub fn parent_dir(path: &str) -> &str {
    match path.rfind('/') {
        Some(0) => "/",
        Some(idx) => &path[..idx],
        None => "",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_completion_window() {
        assert!(is_completed(85.0, 100.0));
        assert!(is_completed(100.0, 100.0));
        assert!(is_completed(120.0, 100.0));
        assert!(!is_completed(84.9, 100.0));
        assert!(!is_completed(0.0, 100.0));
        // shorter than the window: complete from the start
        assert!(is_completed(0.0, 10.0));
    }

    #[test]
    fn test_parent_dir() {
        assert_eq!(parent_dir("/a/b/v1.mp4"), "/a/b");
        assert_eq!(parent_dir("/v.mp4"), "/");
        assert_eq!(parent_dir("v.mp4"), "");
    }

    #[test]
    fn test_json_shape() -> anyhow::Result<()> {
        let mut progress = CourseProgress::for_root("/courses/rust");
        progress.course_path = "/courses/rust/ch1".to_owned();
        progress.videos.insert(
            "/courses/rust/ch1/a.mp4".to_owned(),
            VideoProgress::observed("/courses/rust/ch1/a.mp4", 12.5, 300.0, 1_700_000_000_000),
        );
        progress.videos.insert(
            "/courses/rust/ch1/b.mp4".to_owned(),
            VideoProgress::unwatched("/courses/rust/ch1/b.mp4"),
        );
        progress.refresh_dir("/courses/rust/ch1");

        let text = serde_json::to_string_pretty(&progress)?;
        assert!(text.contains("\n  \"version\": \"1.0.0\""));
        assert!(text.contains("\"courseRootPath\": \"/courses/rust\""));
        assert!(text.contains("\"currentTime\": 12.5"));
        assert!(text.contains("\"lastUpdated\": 1700000000000"));
        assert!(text.contains("\"dirProgress\""));
        // unset options are left out
        assert!(!text.contains("null"));

        let back: CourseProgress = serde_json::from_str(&text)?;
        assert_eq!(back, progress);
        Ok(())
    }

    #[test]
    fn test_old_file_without_dir_progress() -> anyhow::Result<()> {
        let text = r#"{"version":"1.0.0","coursePath":"","courseRootPath":"/c","videos":{
            "/c/a.mp4":{"path":"/c/a.mp4","duration":60,"currentTime":59,"lastUpdated":1,"completed":true}}}"#;
        let progress: CourseProgress = serde_json::from_str(text)?;
        assert!(progress.dir_progress.is_empty());
        assert_eq!(progress.videos["/c/a.mp4"].duration, Some(60.0));
        Ok(())
    }
}
