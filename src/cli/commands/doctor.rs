//! Doctor command - verify configuration and backing services.

use crate::chunk_store::create_store;
use crate::cli::Output;
use crate::config::{mask_key, Settings, API_KEYS_ENV};
use crate::embedding::{Embedder, HttpEmbedder};
use crate::http::parse_endpoint;
use console::style;

/// Check result for a single item.
#[derive(Debug)]
pub struct CheckResult {
    pub name: String,
    pub status: CheckStatus,
    pub message: String,
    pub hint: Option<String>,
}

#[derive(Debug, PartialEq)]
pub enum CheckStatus {
    Ok,
    Warning,
    Error,
}

impl CheckResult {
    fn ok(name: &str, message: &str) -> Self {
        Self {
            name: name.to_string(),
            status: CheckStatus::Ok,
            message: message.to_string(),
            hint: None,
        }
    }

    fn warning(name: &str, message: &str, hint: &str) -> Self {
        Self {
            name: name.to_string(),
            status: CheckStatus::Warning,
            message: message.to_string(),
            hint: Some(hint.to_string()),
        }
    }

    fn error(name: &str, message: &str, hint: &str) -> Self {
        Self {
            name: name.to_string(),
            status: CheckStatus::Error,
            message: message.to_string(),
            hint: Some(hint.to_string()),
        }
    }

    fn print(&self) {
        let icon = match self.status {
            CheckStatus::Ok => style("✓").green(),
            CheckStatus::Warning => style("!").yellow(),
            CheckStatus::Error => style("✗").red(),
        };

        println!("  {} {} - {}", icon, style(&self.name).bold(), self.message);

        if let Some(hint) = &self.hint {
            println!("    {} {}", style("→").dim(), style(hint).dim());
        }
    }
}

fn section(title: &str, results: Vec<CheckResult>, all: &mut Vec<CheckResult>) {
    println!("{}", style(title).bold());
    for result in &results {
        result.print();
    }
    println!();
    all.extend(results);
}

/// Run all diagnostic checks.
pub async fn run_doctor(settings: &Settings) -> anyhow::Result<()> {
    Output::header("tldw Doctor");
    println!();
    println!("Checking configuration and services...\n");

    let mut checks = Vec::new();

    section("Completion API", check_completion(settings), &mut checks);
    section("Embedding Service", vec![check_embedding(settings).await], &mut checks);
    section("Transcripts", check_transcripts(settings), &mut checks);
    section("Chunk Store", vec![check_store(settings).await], &mut checks);
    section("Configuration", vec![check_config_file()], &mut checks);

    let errors = checks.iter().filter(|c| c.status == CheckStatus::Error).count();
    let warnings = checks.iter().filter(|c| c.status == CheckStatus::Warning).count();

    if errors > 0 {
        Output::error(&format!(
            "{} error(s) found. Please fix them before using tldw.",
            errors
        ));
        std::process::exit(1);
    } else if warnings > 0 {
        Output::warning(&format!("All checks passed with {} warning(s).", warnings));
    } else {
        Output::success("All checks passed! tldw is ready to use.");
    }

    Ok(())
}

fn check_api_keys(keys: &[String]) -> CheckResult {
    let hint = format!(
        "Set with: export {}='key1,key2' (or [completion] api_keys)",
        API_KEYS_ENV
    );
    match keys {
        [] => CheckResult::error("API keys", "none configured", &hint),
        [only] => CheckResult::warning(
            "API keys",
            &format!("1 key ({}), no rotation", mask_key(only)),
            "Add more keys to spread rate limits",
        ),
        [first, ..] => CheckResult::ok(
            "API keys",
            &format!("{} keys in rotation ({}, ...)", keys.len(), mask_key(first)),
        ),
    }
}

fn check_endpoint(name: &str, endpoint: &str) -> CheckResult {
    match parse_endpoint(endpoint) {
        Ok(url) => CheckResult::ok(name, url.as_str()),
        Err(e) => CheckResult::error(name, &e.to_string(), "Use an http:// or https:// URL"),
    }
}

fn check_completion(settings: &Settings) -> Vec<CheckResult> {
    vec![
        check_api_keys(&settings.api_keys()),
        check_endpoint("Endpoint", &settings.completion.endpoint),
        CheckResult::ok(
            "Models",
            &format!(
                "{} (reduce: {})",
                settings.completion.model, settings.completion.reduce_model
            ),
        ),
    ]
}

async fn check_embedding(settings: &Settings) -> CheckResult {
    let embedder = match HttpEmbedder::from_settings(settings) {
        Ok(embedder) => embedder,
        Err(e) => {
            return CheckResult::error("Embedding", &e.to_string(), "Fix [embedding] endpoint")
        }
    };

    match embedder.embed("tldw doctor").await {
        Ok(vector) => CheckResult::ok(
            "Embedding",
            &format!("{} ({} dimensions)", embedder.endpoint(), vector.len()),
        ),
        Err(e) => CheckResult::error(
            "Embedding",
            &e.to_string(),
            "Start the local embedding server or fix [embedding] endpoint",
        ),
    }
}

fn check_transcripts(settings: &Settings) -> Vec<CheckResult> {
    let mut results = vec![check_endpoint("Transcript API", &settings.transcript.api_endpoint)];

    match &settings.transcript.local_dir {
        Some(dir) => {
            let path = Settings::expand_path(dir);
            if path.is_dir() {
                results.push(CheckResult::ok("Local transcripts", &path.display().to_string()));
            } else {
                results.push(CheckResult::warning(
                    "Local transcripts",
                    &format!("{} (missing)", path.display()),
                    "Create the directory or unset [transcript] local_dir",
                ));
            }
        }
        None => results.push(CheckResult::ok("Local transcripts", "not configured")),
    }

    results
}

async fn check_store(settings: &Settings) -> CheckResult {
    let store = match create_store(settings) {
        Ok(store) => store,
        Err(e) => return CheckResult::error("Store", &e.to_string(), "Check [store] settings"),
    };

    let location = if settings.store.provider.eq_ignore_ascii_case("sqlite") {
        let path = settings.sqlite_path();
        let size = std::fs::metadata(&path)
            .map(|m| format_size(m.len()))
            .unwrap_or_else(|_| "unknown size".to_string());
        format!("{} ({})", path.display(), size)
    } else {
        "in memory (lost on exit)".to_string()
    };

    match store.slots().await {
        Ok(slots) => CheckResult::ok(
            "Store",
            &format!("{}, {} session(s)", location, slots.len()),
        ),
        Err(e) => CheckResult::error("Store", &e.to_string(), "Check [store] settings"),
    }
}

/// Check if config file exists.
fn check_config_file() -> CheckResult {
    let config_path = Settings::default_config_path();
    if config_path.exists() {
        CheckResult::ok("Config file", &format!("{}", config_path.display()))
    } else {
        CheckResult::warning(
            "Config file",
            "using defaults",
            "Create with: tldw config edit",
        )
    }
}

/// Format file size in human-readable format.
fn format_size(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if bytes >= GB {
        format!("{:.1} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.1} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.1} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} B", bytes)
    }
}
