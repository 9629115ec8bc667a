//! Questions command implementation.

use crate::cli::preflight::{self, Operation};
use crate::cli::{source, Output};
use crate::config::Settings;
use crate::orchestrator::Orchestrator;
use crate::quiz::parse_qa_pairs;
use anyhow::Result;

/// Run the questions command.
pub async fn run_questions(input: &str, raw: bool, settings: Settings) -> Result<()> {
    if let Err(e) = preflight::check(Operation::Generate, &settings) {
        Output::error(&format!("{}", e));
        Output::info("Run 'tldw doctor' for detailed diagnostics.");
        return Err(e.into());
    }

    let orchestrator = Orchestrator::new(&settings)?;

    let spinner = Output::spinner("Loading transcript...");
    let loaded = match source::load(input, orchestrator.transcripts()).await {
        Ok(loaded) => loaded,
        Err(e) => {
            spinner.finish_and_clear();
            return Err(e.into());
        }
    };

    spinner.set_message("Writing flashcards...");
    let markup = orchestrator.questions(&loaded.text).await;
    spinner.finish_and_clear();

    let markup = match markup {
        Ok(markup) => markup,
        Err(e) => {
            Output::error(&format!("Failed to generate questions: {}", e));
            return Err(e.into());
        }
    };

    let pairs = parse_qa_pairs(&markup);
    if raw || pairs.is_empty() {
        println!("{}", markup);
    } else {
        Output::header("Flashcards");
        Output::flashcards(&pairs);
    }

    Ok(())
}
