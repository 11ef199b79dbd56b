//! Pre-flight checks before expensive operations.
//!
//! Validates that required inputs are available before starting
//! operations that would otherwise fail midway.

use crate::error::{GanjError, Result};
use std::path::Path;

/// Requirements for different operations.
#[derive(Debug, Clone, Copy)]
pub enum Operation<'a> {
    /// Ingestion needs a readable input file. A missing API key only
    /// downgrades the store to keyword search.
    Ingest { input: &'a Path },
}

/// Run pre-flight checks for the given operation.
///
/// Returns Ok(()) if all checks pass, or an error describing what's missing.
pub fn check(operation: Operation<'_>) -> Result<()> {
    match operation {
        Operation::Ingest { input } => {
            if !input.is_file() {
                return Err(GanjError::InvalidInput(format!(
                    "Transcript file not found: {}",
                    input.display()
                )));
            }
        }
    }
    Ok(())
}
