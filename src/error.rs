use thiserror::Error;

use crate::driver::DriverError;

pub type Result<T> = std::result::Result<T, RunError>;

/// Everything that can end a run. `main` maps each variant to the process
/// exit code through [`RunError::exit_code`]; nothing else exits.
#[derive(Debug, Error)]
pub enum RunError {
    /// No usable step source: missing/unreadable file, nothing piped,
    /// or blank input.
    #[error("{0}")]
    Usage(String),

    /// Input was read but is not a non-empty JSON array of step objects.
    #[error("malformed step input: {0}")]
    MalformedInput(String),

    /// A step named an action outside the recognized set.
    #[error("step {index} ({action}): unknown action")]
    UnknownAction { index: usize, action: String },

    /// A step violates the field rules of its action kind.
    #[error("step {index} ({action}): {problems}")]
    InvalidStep {
        index: usize,
        action: String,
        problems: String,
    },

    /// The driver call failed or an assertion mismatched.
    #[error("step {index} ({action}): {cause}")]
    Step {
        index: usize,
        action: String,
        cause: StepFailure,
    },

    /// The browser session could not be opened.
    #[error("browser session: {0}")]
    Session(String),
}

impl RunError {
    pub fn exit_code(&self) -> u8 {
        match self {
            RunError::Usage(_) | RunError::MalformedInput(_) => 2,
            _ => 1,
        }
    }
}

/// What went wrong inside a dispatched step.
#[derive(Debug, Error)]
pub enum StepFailure {
    #[error(transparent)]
    Driver(#[from] DriverError),

    #[error("assertion failed ({} match): expected {expected:?}, got {actual:?}", mode(.exact))]
    Assertion {
        expected: String,
        actual: String,
        exact: bool,
    },
}

fn mode(exact: &bool) -> &'static str {
    if *exact { "exact" } else { "substring" }
}
