//! Transcripts stored on disk.

use super::{format_segments, TranscriptSegment, TranscriptSource};
use crate::error::{Result, TldwError};
use async_trait::async_trait;
use std::path::{Path, PathBuf};

/// Read a transcript file.
///
/// `.json` files hold an array of `{timestamp, text}` segments; anything else
/// is taken as plain text.
pub async fn read_transcript(path: &Path) -> Result<String> {
    let content = tokio::fs::read_to_string(path).await?;

    let is_json = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("json"));

    if is_json {
        let segments: Vec<TranscriptSegment> = serde_json::from_str(&content).map_err(|e| {
            TldwError::InvalidInput(format!("{} is not a segment list: {}", path.display(), e))
        })?;
        Ok(format_segments(&segments))
    } else {
        Ok(content)
    }
}

/// Looks up `<dir>/<video id>.txt` or `<dir>/<video id>.json`.
pub struct FileTranscriptSource {
    dir: PathBuf,
}

impl FileTranscriptSource {
    pub fn new(dir: PathBuf) -> Self {
        Self { dir }
    }
}

fn is_safe_id(video_id: &str) -> bool {
    !video_id.is_empty()
        && video_id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

#[async_trait]
impl TranscriptSource for FileTranscriptSource {
    fn name(&self) -> &str {
        "local file"
    }

    async fn fetch(&self, video_id: &str) -> Result<Option<String>> {
        if !is_safe_id(video_id) {
            return Ok(None);
        }

        for ext in ["txt", "json"] {
            let path = self.dir.join(format!("{}.{}", video_id, ext));
            if tokio::fs::try_exists(&path).await? {
                return read_transcript(&path).await.map(Some);
            }
        }
        Ok(None)
    }
}
