use std::env;
use std::path::PathBuf;

pub const DEFAULT_BASE_URL: &str = "http://localhost:3000";

/// Runtime configuration, assembled once in `main` and passed down.
/// Nothing below this layer reads the environment.
#[derive(Debug, Clone)]
pub struct Config {
    pub base_url: String,
    pub headless: bool,
    pub steps_file: Option<PathBuf>,
}

impl Config {
    /// `STEP_RUNNER_BASE_URL` wins over `BASE_URL`; the browser runs
    /// headless unless `HEADLESS` is exactly the string `false`; the CLI
    /// path argument wins over `STEPS_FILE`.
    pub fn from_env(steps_arg: Option<PathBuf>) -> Self {
        let base_url = env::var("STEP_RUNNER_BASE_URL")
            .or_else(|_| env::var("BASE_URL"))
            .unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());
        let headless = env::var("HEADLESS").map(|v| v != "false").unwrap_or(true);
        let steps_file = steps_arg.or_else(|| env::var("STEPS_FILE").map(PathBuf::from).ok());

        Self {
            base_url,
            headless,
            steps_file,
        }
    }
}
