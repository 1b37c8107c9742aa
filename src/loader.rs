use std::fs;
use std::io::{IsTerminal, Read};
use std::path::Path;

use crate::error::{Result, RunError};
use crate::types::RawStep;

/// Load the step sequence: from the configured file when a path was given,
/// from a piped stdin stream otherwise. Reading is the only side effect.
pub fn load(path: Option<&Path>) -> Result<Vec<RawStep>> {
    let content = match path {
        Some(p) => fs::read_to_string(p).map_err(|e| {
            RunError::Usage(format!("cannot read steps file {}: {e}", p.display()))
        })?,
        None => read_piped_stdin()?,
    };
    parse_steps(&content)
}

fn read_piped_stdin() -> Result<String> {
    let mut stdin = std::io::stdin();
    if stdin.is_terminal() {
        return Err(RunError::Usage(
            "no steps file given and nothing piped on stdin".to_string(),
        ));
    }
    let mut buf = String::new();
    stdin
        .read_to_string(&mut buf)
        .map_err(|e| RunError::Usage(format!("cannot read stdin: {e}")))?;
    Ok(buf)
}

/// Parse a JSON array of step records. Split out of [`load`] so parsing is
/// testable without touching the filesystem.
pub fn parse_steps(content: &str) -> Result<Vec<RawStep>> {
    if content.trim().is_empty() {
        return Err(RunError::Usage("step input is empty".to_string()));
    }
    let steps: Vec<RawStep> =
        serde_json::from_str(content).map_err(|e| RunError::MalformedInput(e.to_string()))?;
    if steps.is_empty() {
        return Err(RunError::MalformedInput(
            "step list is empty".to_string(),
        ));
    }
    Ok(steps)
}
