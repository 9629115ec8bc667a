//! Summarize command implementation.

use crate::cli::preflight::{self, Operation};
use crate::cli::{source, Output};
use crate::config::Settings;
use crate::orchestrator::Orchestrator;
use anyhow::Result;

/// Run the summarize command.
pub async fn run_summarize(
    input: &str,
    session: Option<String>,
    no_wait: bool,
    settings: Settings,
) -> Result<()> {
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
    let session = session.or(loaded.session);

    spinner.set_message(format!(
        "Summarizing {} words...",
        loaded.text.split_whitespace().count()
    ));
    let outcome = orchestrator.summarize(&loaded.text, session.as_deref()).await;
    spinner.finish_and_clear();

    let outcome = match outcome {
        Ok(outcome) => outcome,
        Err(e) => {
            Output::error(&format!("Failed to summarize: {}", e));
            return Err(e.into());
        }
    };

    println!("{}", outcome.summary);

    if no_wait {
        return Ok(());
    }

    let slot = outcome.indexing.slot().to_string();
    let spinner = Output::spinner("Indexing chunks for questions...");
    let indexed = outcome.indexing.wait().await;
    spinner.finish_and_clear();

    match indexed {
        Ok(count) => Output::success(&format!(
            "Indexed {} chunks into session '{}'",
            count, slot
        )),
        Err(e) => Output::warning(&format!(
            "Summary is complete but indexing failed, questions will lack context: {}",
            e
        )),
    }

    Ok(())
}
