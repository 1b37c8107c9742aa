use crate::driver::Driver;
use crate::error::{Result, RunError, StepFailure};
use crate::report;
use crate::types::{CompileError, RawStep, Step, WaitState};
use crate::urls;

/// Longest slice of page text echoed back in an assertion diagnostic.
const ACTUAL_TEXT_MAX_CHARS: usize = 200;

/// Drives one step sequence, in order, against one driver.
///
/// Fail-fast: the first error is recorded and returned, and the remaining
/// steps never execute. The driver is owned here for the duration of the
/// run and released by the caller dropping the runner.
pub struct Runner<D> {
    driver: D,
    base_url: String,
}

impl<D: Driver> Runner<D> {
    pub fn new(driver: D, base_url: impl Into<String>) -> Self {
        Self {
            driver,
            base_url: base_url.into(),
        }
    }

    pub fn driver(&self) -> &D {
        &self.driver
    }

    /// Execute steps 1..=n in order. Each record is compiled at its own
    /// position, so a sequence with a bad step at index k still executes
    /// everything before k.
    pub fn run(&mut self, steps: &[RawStep]) -> Result<()> {
        let total = steps.len();
        for (i, raw) in steps.iter().enumerate() {
            let index = i + 1;
            let action = raw.action_name();

            let step = Step::compile(raw).map_err(|e| match e {
                CompileError::UnknownAction => RunError::UnknownAction {
                    index,
                    action: action.clone(),
                },
                CompileError::Invalid(problems) => RunError::InvalidStep {
                    index,
                    action: action.clone(),
                    problems: problems.join("; "),
                },
            })?;

            report::step(index, total, &action);
            self.dispatch(&step).map_err(|cause| RunError::Step {
                index,
                action: action.clone(),
                cause,
            })?;
        }
        Ok(())
    }

    fn dispatch(&mut self, step: &Step) -> std::result::Result<(), StepFailure> {
        match step {
            Step::Navigate {
                url,
                wait_until,
                timeout,
            } => {
                let resolved = urls::resolve(&self.base_url, url);
                self.driver.goto(&resolved, *wait_until, *timeout)?;
            }
            Step::Click { target, timeout } => {
                self.driver.click(target, *timeout)?;
            }
            Step::Fill {
                selector,
                value,
                timeout,
            } => {
                self.driver.fill(selector, value, *timeout)?;
            }
            Step::Press {
                selector,
                key,
                timeout,
            } => {
                self.driver.press(selector.as_deref(), key, *timeout)?;
            }
            Step::Pause { ms } => {
                self.driver.pause(*ms);
            }
            Step::WaitForSelector {
                selector,
                state,
                timeout,
            } => {
                self.driver.wait_for(selector, *state, *timeout)?;
            }
            Step::AssertText {
                selector,
                expected,
                exact,
                timeout,
            } => {
                if let Some(selector) = selector {
                    self.driver
                        .wait_for(selector, WaitState::Visible, *timeout)?;
                }
                let actual = self.driver.read_text(selector.as_deref(), *timeout)?;
                let matched = if *exact {
                    actual.trim() == expected.trim()
                } else {
                    actual.contains(expected.as_str())
                };
                if !matched {
                    return Err(StepFailure::Assertion {
                        expected: expected.clone(),
                        actual: truncate(&actual, ACTUAL_TEXT_MAX_CHARS),
                        exact: *exact,
                    });
                }
            }
            Step::SelectOption {
                selector,
                values,
                timeout,
            } => {
                self.driver.select(selector, values, *timeout)?;
            }
        }
        Ok(())
    }
}

fn truncate(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        s.to_string()
    } else {
        let cut: String = s.chars().take(max_chars).collect();
        format!("{cut}...")
    }
}
