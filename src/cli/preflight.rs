//! Pre-flight checks before expensive operations.
//!
//! Validates configuration up front so commands fail before any transcript
//! is fetched or any request is sent.

use crate::config::{Settings, API_KEYS_ENV};
use crate::error::{Result, TldwError};
use crate::http::parse_endpoint;

/// Requirements for different operations.
#[derive(Debug, Clone, Copy)]
pub enum Operation {
    /// Summaries and flashcards need completion keys.
    Generate,
    /// Answers need completion keys and an embedding endpoint.
    Ask,
    /// Transcript lookup has no credential requirements.
    Transcript,
}

/// Run pre-flight checks for the given operation.
pub fn check(operation: Operation, settings: &Settings) -> Result<()> {
    match operation {
        Operation::Generate => {
            check_api_keys(settings)?;
            parse_endpoint(&settings.completion.endpoint)?;
        }
        Operation::Ask => {
            check_api_keys(settings)?;
            parse_endpoint(&settings.completion.endpoint)?;
            parse_endpoint(&settings.embedding.endpoint)?;
        }
        Operation::Transcript => {
            parse_endpoint(&settings.transcript.api_endpoint)?;
        }
    }
    Ok(())
}

/// Check that at least one completion key is configured.
fn check_api_keys(settings: &Settings) -> Result<()> {
    if settings.api_keys().is_empty() {
        return Err(TldwError::Config(format!(
            "No API keys configured. Set {} (comma-separated) or [completion] api_keys in the config file",
            API_KEYS_ENV
        )));
    }
    Ok(())
}
