//! Prompt templates for tldw.
//!
//! Prompts can be customized by placing TOML files in the custom prompts directory.

use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::LazyLock;

static PLACEHOLDER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{\{(\w+)\}\}").expect("valid placeholder regex"));

/// Collection of all prompt templates.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
#[derive(Default)]
pub struct Prompts {
    pub summarize: SummarizePrompts,
    pub questions: QuestionPrompts,
    pub answer: AnswerPrompts,
    /// Custom variables from config, available in all prompts.
    #[serde(skip)]
    pub variables: HashMap<String, String>,
}

/// Prompts for video summaries.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SummarizePrompts {
    /// System instruction for a transcript that fits one chunk.
    pub system: String,
    /// User prompt for a transcript that fits one chunk.
    pub user: String,
    /// System instruction for one section of a longer transcript.
    pub section_system: String,
    /// User prompt for one section of a longer transcript.
    pub section_user: String,
}

impl Default for SummarizePrompts {
    fn default() -> Self {
        Self {
            system: "You are an expert educator summarizing YouTube videos.".to_string(),
            user: "Summarize the YouTube video based on its transcript:\n\n{{transcript}}".to_string(),
            section_system: "You are an expert educator summarizing YouTube videos. Keep the summary concise and focused on key points keeping it strictly from 50 to 80 words.\nIn the summary, do not include phrases like 'In this video' or 'In this section'.\nMention the start time stamp of the section before starting the summary.".to_string(),
            section_user: "Summarize the following video section:\n\n{{chunk}}".to_string(),
        }
    }
}

/// Prompts for Q&A flashcard generation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct QuestionPrompts {
    pub system: String,
    pub user: String,
    pub section_system: String,
    pub section_user: String,
    /// System instruction for selecting the final pairs from all candidates.
    pub select_system: String,
    pub select_user: String,
}

impl Default for QuestionPrompts {
    fn default() -> Self {
        Self {
            system: "You are a helpful tutor generating questions to help users assess themselves.".to_string(),
            user: "Generate {{count}} questions to test a user (Q&A format) based on this transcript:\n\n{{transcript}}\n\n[MANDATORY] - Only generate the questions and answers, labeled like **Q1:** and **A1:**. No explanations.".to_string(),
            section_system: "You are a helpful tutor generating concise Q&A flashcards.".to_string(),
            section_user: "Generate {{count}} questions to test a user (Q&A format) based on this part of the transcript:\n\n{{chunk}}\n\n[MANDATORY] - Only generate the questions and answers and they should be labelled like **Q1:** and **A1:**. No explanation.".to_string(),
            select_system: "You are a helpful tutor selecting the best Q&A flashcards from a longer list.".to_string(),
            select_user: "From the following list of Q&A pairs, choose the most diverse and informative ones:\n\n{{candidates}}\n\nOnly output them in the format:\n\n**Q1:** ...\n**A1:** ...\n... up to Q{{count}}. Do not add any explanations or commentary.".to_string(),
        }
    }
}

/// Prompts for answering questions from retrieved context.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AnswerPrompts {
    pub system: String,
    pub user: String,
}

impl Default for AnswerPrompts {
    fn default() -> Self {
        Self {
            system: "You are an expert answering questions from video transcript context.".to_string(),
            user: "Answer the following question using the video content:\n\n{{context}}\n\nQuestion: {{question}}".to_string(),
        }
    }
}

impl Prompts {
    /// Load prompts from the default location, with optional custom directory and variables.
    pub fn load(
        custom_dir: Option<&str>,
        custom_variables: Option<&HashMap<String, String>>,
    ) -> crate::error::Result<Self> {
        let mut prompts = Prompts::default();

        if let Some(vars) = custom_variables {
            prompts.variables = vars.clone();
        }

        if let Some(dir) = custom_dir {
            let custom_path = PathBuf::from(shellexpand::tilde(dir).to_string());

            let summarize_path = custom_path.join("summarize.toml");
            if summarize_path.exists() {
                let content = std::fs::read_to_string(&summarize_path)?;
                prompts.summarize = toml::from_str(&content)?;
            }

            let questions_path = custom_path.join("questions.toml");
            if questions_path.exists() {
                let content = std::fs::read_to_string(&questions_path)?;
                prompts.questions = toml::from_str(&content)?;
            }

            let answer_path = custom_path.join("answer.toml");
            if answer_path.exists() {
                let content = std::fs::read_to_string(&answer_path)?;
                prompts.answer = toml::from_str(&content)?;
            }
        }

        Ok(prompts)
    }

    /// Render a prompt template with the given variables.
    ///
    /// Placeholders are replaced in one pass over the template, so text
    /// substituted for a variable is never itself expanded. Unknown
    /// placeholders are left as written.
    pub fn render(template: &str, vars: &HashMap<String, String>) -> String {
        PLACEHOLDER
            .replace_all(template, |caps: &Captures| match vars.get(&caps[1]) {
                Some(value) => value.clone(),
                None => caps[0].to_string(),
            })
            .into_owned()
    }

    /// Render a prompt template with both provided variables and custom config variables.
    /// Provided variables take precedence over custom config variables.
    pub fn render_with_custom(&self, template: &str, vars: &[(&str, &str)]) -> String {
        let mut merged = self.variables.clone();
        for (key, value) in vars {
            merged.insert((*key).to_string(), (*value).to_string());
        }
        Self::render(template, &merged)
    }
}
