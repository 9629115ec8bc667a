//! Resolve a command-line `<source>` into transcript text.

use crate::error::{Result, TldwError};
use crate::transcript::{read_transcript, video_id, TranscriptFetcher};
use std::path::Path;
use tokio::io::AsyncReadExt;

/// A transcript and the session it belongs to.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadedTranscript {
    pub text: String,
    /// Video id or file stem; `None` for stdin.
    pub session: Option<String>,
}

/// Load a transcript from `-` (stdin), a file, or a video URL/id.
pub async fn load(source: &str, fetcher: Option<&TranscriptFetcher>) -> Result<LoadedTranscript> {
    if source == "-" {
        let mut text = String::new();
        tokio::io::stdin().read_to_string(&mut text).await?;
        return Ok(LoadedTranscript {
            text,
            session: None,
        });
    }

    let path = Path::new(source);
    if path.is_file() {
        return Ok(LoadedTranscript {
            text: read_transcript(path).await?,
            session: path
                .file_stem()
                .and_then(|s| s.to_str())
                .map(str::to_string),
        });
    }

    let Some(fetcher) = fetcher else {
        return Err(TldwError::TranscriptUnavailable(format!(
            "{} is not a file and no transcript fetcher is configured",
            source
        )));
    };

    let response = fetcher.fetch(source).await;
    match response.transcript {
        Some(text) => Ok(LoadedTranscript {
            text,
            session: video_id(source),
        }),
        None => Err(TldwError::TranscriptUnavailable(
            response
                .error
                .unwrap_or_else(|| format!("No transcript for {}", source)),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transcript::TranscriptSource;
    use async_trait::async_trait;

    struct Fixed;

    #[async_trait]
    impl TranscriptSource for Fixed {
        fn name(&self) -> &str {
            "API"
        }

        async fn fetch(&self, video_id: &str) -> Result<Option<String>> {
            Ok((video_id == "dQw4w9WgXcQ").then(|| "0:00 never gonna".to_string()))
        }
    }

    #[tokio::test]
    async fn test_load_file_uses_stem_as_session() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("lecture-01.txt");
        std::fs::write(&path, "0:00 welcome").unwrap();

        let loaded = load(path.to_str().unwrap(), None).await.unwrap();
        assert_eq!(loaded.text, "0:00 welcome");
        assert_eq!(loaded.session.as_deref(), Some("lecture-01"));
    }

    #[tokio::test]
    async fn test_load_video_through_fetcher() {
        let fetcher = TranscriptFetcher::new(vec![Box::new(Fixed)]);

        let loaded = load("https://youtu.be/dQw4w9WgXcQ", Some(&fetcher)).await.unwrap();
        assert_eq!(loaded.text, "0:00 never gonna");
        assert_eq!(loaded.session.as_deref(), Some("dQw4w9WgXcQ"));

        let err = load("https://youtu.be/aaaaaaaaaaa", Some(&fetcher)).await.unwrap_err();
        assert!(matches!(err, TldwError::TranscriptUnavailable(_)));
    }

    #[tokio::test]
    async fn test_load_without_fetcher() {
        assert!(matches!(
            load("dQw4w9WgXcQ", None).await,
            Err(TldwError::TranscriptUnavailable(_))
        ));
    }
}
