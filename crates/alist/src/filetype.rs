use crate::AlistFile;

const VIDEO_EXTENSIONS: [&str; 4] = [".mp4", ".webm", ".ogg", ".m3u8"];
const TEXT_EXTENSIONS: [&str; 13] = [
    ".txt", ".md", ".json", ".js", ".ts", ".html", ".css", ".vue", ".py", ".java", ".cpp", ".c",
    ".h",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    Video,
    Text,
    Other,
}

impl FileKind {
    /// Matches the lowercased whole name against known suffixes, so
    /// `lesson.part1.MP4` is a video.
    pub fn of_name(name: &str) -> Self {
        if name.is_empty() {
            return FileKind::Other;
        }
        let name = name.to_lowercase();
        if VIDEO_EXTENSIONS.iter().any(|ext| name.ends_with(ext)) {
            FileKind::Video
        } else if TEXT_EXTENSIONS.iter().any(|ext| name.ends_with(ext)) {
            FileKind::Text
        } else {
            FileKind::Other
        }
    }

    pub fn of(file: &AlistFile) -> Self {
        if *file.is_dir() {
            return FileKind::Other;
        }
        Self::of_name(file.name())
    }
}

pub fn is_video(file: &AlistFile) -> bool {
    FileKind::of(file) == FileKind::Video
}

pub fn is_text(file: &AlistFile) -> bool {
    FileKind::of(file) == FileKind::Text
}
