use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use dotenvy::dotenv;

use step_runner::config::Config;
use step_runner::error::Result;
use step_runner::loader;
use step_runner::report;
use step_runner::runner::Runner;
use step_runner::session::ChromeDriver;

/// Run a JSON sequence of browser steps against a base URL.
#[derive(Parser)]
#[command(name = "step-runner", version)]
struct Cli {
    /// Path to the steps file; reads piped stdin when omitted
    /// (or the STEPS_FILE environment variable).
    steps: Option<PathBuf>,
}

fn main() -> ExitCode {
    dotenv().ok();

    let cli = Cli::parse();
    let config = Config::from_env(cli.steps);

    match run(&config) {
        Ok(total) => {
            report::success(total);
            ExitCode::SUCCESS
        }
        Err(e) => {
            report::failure(&e);
            ExitCode::from(e.exit_code())
        }
    }
}

/// Load, then acquire the session, then execute. Usage and input errors
/// happen before the browser ever launches; once launched, the driver is
/// dropped (and the browser released) on every return path.
fn run(config: &Config) -> Result<usize> {
    let steps = loader::load(config.steps_file.as_deref())?;
    let driver = ChromeDriver::launch(config.headless)?;
    let mut runner = Runner::new(driver, config.base_url.clone());
    runner.run(&steps)?;
    Ok(steps.len())
}
