//! CLI command implementations.

mod ask;
mod config;
mod doctor;
mod questions;
mod serve;
mod sessions;
mod summarize;
mod transcript;

pub use ask::run_ask;
pub use config::run_config;
pub use doctor::run_doctor;
pub use questions::run_questions;
pub use serve::run_serve;
pub use sessions::run_sessions;
pub use summarize::run_summarize;
pub use transcript::run_transcript;
