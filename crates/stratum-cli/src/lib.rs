//! CLI logic for the Stratum layout tool.
//!
//! Reads a model document, runs it through the [`Pipeline`] and writes the
//! layout document to a file or standard output.

pub mod error_adapter;

mod args;
mod config;

pub use args::Args;

use std::{fs, io::Write};

use log::{info, warn};

use stratum::{Pipeline, StratumError, diagnostic::ValidationReport};

/// Run the Stratum CLI application
///
/// Processes the input file through the Stratum pipeline and writes the
/// resulting layout document. Validation problems do not fail the run; the
/// validation report is returned so the caller can present it.
///
/// # Errors
///
/// Returns `StratumError` for:
/// - File I/O errors
/// - Configuration loading errors
/// - Malformed model documents
/// - Layout errors of the default engine
pub fn run(args: &Args) -> Result<ValidationReport, StratumError> {
    info!(
        input_path = args.input,
        output_path:? = args.output;
        "Processing model"
    );

    let app_config = config::load_config(args)?;

    let source = fs::read_to_string(&args.input)?;

    let pipeline = Pipeline::new(app_config);
    let output = pipeline.run_json(&source)?;
    let document = output.to_json()?;

    match &args.output {
        Some(path) => {
            fs::write(path, document)?;
            info!(output_file = path; "Layout exported successfully");
        }
        None => {
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(document.as_bytes())?;
            stdout.write_all(b"\n")?;
        }
    }

    if !output.warnings.is_empty() {
        warn!(count = output.warnings.len(); "Model produced warnings");
    }
    info!(
        algorithm = output.algorithm,
        nodes = output.layout.nodes.len(),
        edges = output.layout.edges.len(),
        valid = output.validation.valid();
        "Layout finished"
    );

    Ok(output.validation)
}
