//! Configuration module for tldw.
//!
//! Handles loading and managing application settings and prompt templates.

mod prompts;
mod settings;

pub use prompts::{AnswerPrompts, Prompts, QuestionPrompts, SummarizePrompts};
pub use settings::{
    mask_key, ChunkingSettings, CompletionSettings, EmbeddingSettings, GeneralSettings,
    PromptSettings, RetrievalSettings, Settings, StoreSettings, TranscriptSettings, API_KEYS_ENV,
};
