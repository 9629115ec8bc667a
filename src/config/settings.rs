//! Configuration settings for tldw.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Environment variable holding a comma-separated list of completion API keys.
pub const API_KEYS_ENV: &str = "TLDW_API_KEYS";

/// Root configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
#[derive(Default)]
pub struct Settings {
    pub general: GeneralSettings,
    pub completion: CompletionSettings,
    pub embedding: EmbeddingSettings,
    pub chunking: ChunkingSettings,
    pub retrieval: RetrievalSettings,
    pub store: StoreSettings,
    pub transcript: TranscriptSettings,
    pub prompts: PromptSettings,
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralSettings {
    /// Directory for storing application data.
    pub data_dir: String,
    /// Log level when no `-v` flag is given (trace, debug, info, warn, error).
    pub log_level: String,
}

impl Default for GeneralSettings {
    fn default() -> Self {
        Self {
            data_dir: "~/.tldw".to_string(),
            log_level: "warn".to_string(),
        }
    }
}

/// Chat-completion endpoint settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CompletionSettings {
    /// OpenAI-compatible chat completions URL.
    pub endpoint: String,
    /// Model used for single-pass and per-chunk calls.
    pub model: String,
    /// Model used for the question selection (reduce) stage.
    pub reduce_model: String,
    /// Pool of API keys, rotated round-robin.
    pub api_keys: Vec<String>,
    /// Per-request timeout in seconds.
    pub timeout_secs: u64,
    /// Maximum outstanding per-chunk requests.
    pub max_concurrent: usize,
}

impl Default for CompletionSettings {
    fn default() -> Self {
        Self {
            endpoint: "https://api.groq.com/openai/v1/chat/completions".to_string(),
            model: "deepseek-r1-distill-llama-70b".to_string(),
            reduce_model: "meta-llama/llama-4-maverick-17b-128e-instruct".to_string(),
            api_keys: Vec::new(),
            timeout_secs: 120,
            max_concurrent: 8,
        }
    }
}

/// Embedding service settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbeddingSettings {
    /// Local embedding server URL.
    pub endpoint: String,
    /// Per-request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for EmbeddingSettings {
    fn default() -> Self {
        Self {
            endpoint: "http://localhost:5005/embed".to_string(),
            timeout_secs: 30,
        }
    }
}

/// Transcript chunking settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChunkingSettings {
    /// Maximum words per chunk.
    pub max_words: usize,
}

impl Default for ChunkingSettings {
    fn default() -> Self {
        Self { max_words: 800 }
    }
}

/// Question-answering retrieval settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrievalSettings {
    /// Number of chunks used as answer context.
    pub top_k: usize,
}

impl Default for RetrievalSettings {
    fn default() -> Self {
        Self { top_k: 3 }
    }
}

/// Chunk store settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreSettings {
    /// Store provider (sqlite, memory).
    pub provider: String,
    /// Path to the SQLite database (for the sqlite provider).
    pub sqlite_path: String,
    /// Slot used when a request carries no session.
    pub default_slot: String,
}

impl Default for StoreSettings {
    fn default() -> Self {
        Self {
            provider: "sqlite".to_string(),
            sqlite_path: "~/.tldw/chunks.db".to_string(),
            default_slot: "video_chunks".to_string(),
        }
    }
}

/// Transcript source settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TranscriptSettings {
    /// Transcript API queried with `?part=transcript&id=<video id>`.
    pub api_endpoint: String,
    /// Directory with `<video id>.txt` / `<video id>.json` transcripts.
    pub local_dir: Option<String>,
    /// Per-request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for TranscriptSettings {
    fn default() -> Self {
        Self {
            api_endpoint: "https://yt.lemnoslife.com/videos".to_string(),
            local_dir: None,
            timeout_secs: 20,
        }
    }
}

/// Prompt customization settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
#[derive(Default)]
pub struct PromptSettings {
    /// Directory for custom prompts (overrides defaults).
    pub custom_dir: Option<String>,
    /// Custom variables available in all prompts as {{variable_name}}.
    pub variables: std::collections::HashMap<String, String>,
}

impl Settings {
    /// Load settings from the default configuration file.
    pub fn load() -> crate::error::Result<Self> {
        Self::load_from(None)
    }

    /// Load settings from a specific path, or default location if None.
    pub fn load_from(path: Option<&PathBuf>) -> crate::error::Result<Self> {
        let config_path = match path {
            Some(p) => p.clone(),
            None => Self::default_config_path(),
        };

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            let settings: Settings = toml::from_str(&content)?;
            Ok(settings)
        } else {
            Ok(Settings::default())
        }
    }

    /// Save settings to the default configuration file.
    pub fn save(&self) -> crate::error::Result<()> {
        self.save_to(&Self::default_config_path())
    }

    /// Save settings to a specific path.
    pub fn save_to(&self, path: &PathBuf) -> crate::error::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)
            .map_err(|e| crate::error::TldwError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Get the default configuration file path.
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("tldw")
            .join("config.toml")
    }

    /// Expand shell variables in paths (e.g., ~).
    pub fn expand_path(path: &str) -> PathBuf {
        PathBuf::from(shellexpand::tilde(path).to_string())
    }

    /// Get the expanded data directory path.
    pub fn data_dir(&self) -> PathBuf {
        Self::expand_path(&self.general.data_dir)
    }

    /// Get the expanded SQLite database path.
    pub fn sqlite_path(&self) -> PathBuf {
        Self::expand_path(&self.store.sqlite_path)
    }

    /// Completion API keys, with `TLDW_API_KEYS` taking precedence over the file.
    pub fn api_keys(&self) -> Vec<String> {
        match std::env::var(API_KEYS_ENV) {
            Ok(raw) if !raw.trim().is_empty() => split_keys(&raw),
            _ => self
                .completion
                .api_keys
                .iter()
                .map(|k| k.trim().to_string())
                .filter(|k| !k.is_empty())
                .collect(),
        }
    }

    /// Copy of the settings safe to print: API keys are masked.
    pub fn redacted(&self) -> Self {
        let mut copy = self.clone();
        copy.completion.api_keys = copy.completion.api_keys.iter().map(|k| mask_key(k)).collect();
        copy
    }
}

fn split_keys(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|k| !k.is_empty())
        .map(str::to_string)
        .collect()
}

/// Mask all but the last four characters of a key.
pub fn mask_key(key: &str) -> String {
    let chars: Vec<char> = key.chars().collect();
    if chars.len() <= 4 {
        return "*".repeat(chars.len());
    }
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{}{}", "*".repeat(chars.len() - 4), tail)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = Settings::default();
        assert_eq!(settings.chunking.max_words, 800);
        assert_eq!(settings.retrieval.top_k, 3);
        assert_eq!(settings.store.default_slot, "video_chunks");
        assert_ne!(settings.completion.model, settings.completion.reduce_model);
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let settings: Settings = toml::from_str(
            r#"
            [completion]
            api_keys = ["a", "b"]

            [chunking]
            max_words = 200
            "#,
        )
        .unwrap();

        assert_eq!(settings.completion.api_keys.len(), 2);
        assert_eq!(settings.chunking.max_words, 200);
        assert_eq!(settings.embedding.endpoint, "http://localhost:5005/embed");
    }

    #[test]
    fn test_save_and_load_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");

        let mut settings = Settings::default();
        settings.retrieval.top_k = 5;
        settings.save_to(&path).unwrap();

        let loaded = Settings::load_from(Some(&path)).unwrap();
        assert_eq!(loaded.retrieval.top_k, 5);
    }

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.toml");
        let loaded = Settings::load_from(Some(&path)).unwrap();
        assert_eq!(loaded.chunking.max_words, 800);
    }

    #[test]
    fn test_split_keys() {
        assert_eq!(split_keys(" k1, ,k2 ,"), vec!["k1", "k2"]);
    }

    #[test]
    fn test_mask_key() {
        assert_eq!(mask_key("gsk_abcdef1234"), "**********1234");
        assert_eq!(mask_key("abc"), "***");
    }

    #[test]
    fn test_redacted_masks_keys() {
        let mut settings = Settings::default();
        settings.completion.api_keys = vec!["secret-key-9999".to_string()];
        let redacted = settings.redacted();
        assert!(!redacted.completion.api_keys[0].contains("secret"));
        assert!(redacted.completion.api_keys[0].ends_with("9999"));
    }
}
