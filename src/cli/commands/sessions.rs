//! Sessions command implementation.

use crate::chunk_store::create_store;
use crate::cli::Output;
use crate::config::Settings;
use anyhow::Result;
use console::style;

/// List the sessions held in the chunk store.
pub async fn run_sessions(settings: Settings) -> Result<()> {
    let store = create_store(&settings)?;
    let slots = store.slots().await?;

    if slots.is_empty() {
        Output::info("No sessions indexed yet. Run 'tldw summarize <source>' first.");
        return Ok(());
    }

    Output::header(&format!("Sessions ({})", slots.len()));
    for slot in slots {
        println!(
            "  {} {} ({} chunks, saved {})",
            style("*").cyan(),
            style(&slot.name).bold(),
            slot.chunk_count,
            slot.saved_at.format("%Y-%m-%d %H:%M UTC")
        );
    }

    Ok(())
}
