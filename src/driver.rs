use std::time::Duration;

use thiserror::Error;

use crate::types::{Target, WaitState, WaitUntil};

/// The browser capability set the interpreter depends on — nothing more.
///
/// [`ChromeDriver`](crate::session::ChromeDriver) implements it against a
/// live browser; tests substitute a scripted fake. Opening a session is
/// constructing an implementation, closing it is dropping one, so release
/// rides on ownership rather than on every caller remembering a cleanup
/// call.
pub trait Driver {
    fn goto(
        &mut self,
        url: &str,
        wait_until: WaitUntil,
        timeout: Duration,
    ) -> Result<(), DriverError>;

    fn click(&mut self, target: &Target, timeout: Duration) -> Result<(), DriverError>;

    fn fill(&mut self, selector: &str, value: &str, timeout: Duration) -> Result<(), DriverError>;

    /// Send a key to the selector's element, or to the page when `selector`
    /// is absent.
    fn press(
        &mut self,
        selector: Option<&str>,
        key: &str,
        timeout: Duration,
    ) -> Result<(), DriverError>;

    fn wait_for(
        &mut self,
        selector: &str,
        state: WaitState,
        timeout: Duration,
    ) -> Result<(), DriverError>;

    fn pause(&mut self, ms: u64);

    /// Rendered text of the selector's element, or of the page body when
    /// `selector` is absent.
    fn read_text(&mut self, selector: Option<&str>, timeout: Duration)
    -> Result<String, DriverError>;

    fn select(
        &mut self,
        selector: &str,
        values: &[String],
        timeout: Duration,
    ) -> Result<(), DriverError>;
}

/// Failures surfaced by a [`Driver`] implementation.
#[derive(Debug, Error)]
pub enum DriverError {
    #[error("element not found: {0}")]
    NotFound(String),

    #[error("timed out after {}ms waiting for {what}", .timeout.as_millis())]
    Timeout { what: String, timeout: Duration },

    #[error("navigation to {url} failed: {cause}")]
    Navigation { url: String, cause: String },

    #[error("no option matching {values:?} in {selector}")]
    OptionNotFound {
        selector: String,
        values: Vec<String>,
    },

    #[error("browser call failed: {0}")]
    Backend(String),
}
