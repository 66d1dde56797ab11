// SPDX-FileCopyrightText: 2026 Engram Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration error diagnostics.

use miette::Diagnostic;
use thiserror::Error;

/// A configuration error with diagnostic information.
#[derive(Debug, Error, Diagnostic)]
pub enum ConfigError {
    /// Configuration could not be parsed (TOML syntax, unknown key,
    /// wrong type).
    #[error("configuration parse error: {message}")]
    #[diagnostic(
        code(engram::config::parse),
        help("check engram.toml against the documented sections and key types")
    )]
    Parse {
        /// Description of the parse failure, including the offending key.
        message: String,
    },

    /// A semantic constraint on a config value was violated.
    #[error("validation error: {message}")]
    #[diagnostic(code(engram::config::validation))]
    Validation {
        /// Description of the validation failure.
        message: String,
    },
}

/// Render config errors to stderr as miette graphical reports.
pub fn render_errors(errors: &[ConfigError]) {
    use miette::GraphicalReportHandler;

    let handler = GraphicalReportHandler::new();
    for error in errors {
        let mut buf = String::new();
        let diagnostic: &dyn Diagnostic = error;
        if handler.render_report(&mut buf, diagnostic).is_ok() {
            eprint!("{buf}");
        } else {
            eprintln!("Error: {error}");
        }
    }
}

/// Convert a `figment::Error` into a list of `ConfigError` diagnostics.
///
/// A figment error may contain multiple underlying errors (one per bad
/// key); each becomes its own diagnostic.
pub fn figment_to_config_errors(err: figment::Error) -> Vec<ConfigError> {
    err.into_iter()
        .map(|error| ConfigError::Parse {
            message: error.to_string(),
        })
        .collect()
}
