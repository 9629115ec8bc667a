//! Ask command implementation.

use crate::cli::preflight::{self, Operation};
use crate::cli::{source, Output};
use crate::config::Settings;
use crate::orchestrator::Orchestrator;
use anyhow::Result;

/// Run the ask command.
pub async fn run_ask(
    question: &str,
    input: Option<String>,
    session: Option<String>,
    show_context: bool,
    settings: Settings,
) -> Result<()> {
    if let Err(e) = preflight::check(Operation::Ask, &settings) {
        Output::error(&format!("{}", e));
        Output::info("Run 'tldw doctor' for detailed diagnostics.");
        return Err(e.into());
    }

    let orchestrator = Orchestrator::new(&settings)?;
    let mut session = session;

    if let Some(input) = input {
        let spinner = Output::spinner("Indexing transcript...");
        let indexed: crate::error::Result<usize> = async {
            let loaded = source::load(&input, orchestrator.transcripts()).await?;
            session = session.take().or(loaded.session);
            orchestrator
                .index(&loaded.text, session.as_deref())?
                .wait()
                .await
        }
        .await;
        spinner.finish_and_clear();

        match indexed {
            Ok(count) => Output::info(&format!("Indexed {} chunks", count)),
            Err(e) => {
                Output::error(&format!("Failed to index {}: {}", input, e));
                return Err(e.into());
            }
        }
    }

    let spinner = Output::spinner("Searching transcript...");
    let answer = orchestrator.answer(question, session.as_deref()).await;
    spinner.finish_and_clear();

    match answer {
        Ok(answer) => {
            if answer.context.is_empty() {
                Output::warning(&format!(
                    "Nothing indexed in session '{}'; the answer has no transcript context.",
                    orchestrator.slot_for(session.as_deref())
                ));
            }

            println!("\n{}\n", answer.answer);

            if show_context && !answer.context.is_empty() {
                Output::header("Context");
                for chunk in &answer.context {
                    Output::context_chunk(chunk);
                }
            }
        }
        Err(e) => {
            Output::error(&format!("Failed to generate answer: {}", e));
            return Err(e.into());
        }
    }

    Ok(())
}
