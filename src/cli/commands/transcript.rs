//! Transcript command implementation.

use crate::cli::preflight::{self, Operation};
use crate::cli::Output;
use crate::config::Settings;
use crate::error::TldwError;
use crate::transcript::TranscriptFetcher;
use anyhow::Result;

/// Run the transcript command.
pub async fn run_transcript(url: &str, json: bool, settings: Settings) -> Result<()> {
    preflight::check(Operation::Transcript, &settings)?;

    let fetcher = TranscriptFetcher::from_settings(&settings)?;

    let spinner = Output::spinner("Fetching transcript...");
    let response = fetcher.fetch(url).await;
    spinner.finish_and_clear();

    if json {
        println!("{}", serde_json::to_string_pretty(&response)?);
        return Ok(());
    }

    match response.transcript {
        Some(transcript) => {
            if let Some(method) = &response.method {
                Output::info(&format!("Fetched via {}", method));
            }
            println!("{}", transcript);
            Ok(())
        }
        None => {
            let error = response
                .error
                .unwrap_or_else(|| "No transcript found".to_string());
            Output::error(&error);
            Err(TldwError::TranscriptUnavailable(error).into())
        }
    }
}
