//! Generate EQUATIONS.md from the equation registry.
//!
//! # Usage
//!
//! ```bash
//! cargo run --bin gen-equations [OUTPUT_PATH]
//! ```
//!
//! Defaults to `calc_core/src/equations/EQUATIONS.md` (relative to the
//! workspace root). Set `RUST_LOG=debug` for more detail.

use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;

use calc_core::equations::{generate_equations_markdown, ALL_EQUATIONS};
use tracing_subscriber::EnvFilter;

const DEFAULT_OUTPUT: &str = "calc_core/src/equations/EQUATIONS.md";

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let output_path = std::env::args_os()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT));

    let markdown = generate_equations_markdown();
    tracing::debug!(equations = ALL_EQUATIONS.len(), "rendered registry");

    match fs::write(&output_path, &markdown) {
        Ok(()) => {
            tracing::info!(bytes = markdown.len(), path = %output_path.display(), "wrote EQUATIONS.md");
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::error!(path = %output_path.display(), error = %e, "failed to write EQUATIONS.md");
            ExitCode::FAILURE
        }
    }
}
