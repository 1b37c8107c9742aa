use std::ffi::OsStr;
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::Context;
use headless_chrome::{Browser, Element, LaunchOptions, Tab};

use crate::driver::{Driver, DriverError};
use crate::error::RunError;
use crate::types::{Target, WaitState, WaitUntil};

/// Poll interval for readiness and element-state checks.
const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// One exclusive browser session: one browser process, one tab.
///
/// Dropping the value tears the browser down, so the session is released
/// on every exit path, including panics.
pub struct ChromeDriver {
    _browser: Browser,
    tab: Arc<Tab>,
}

impl ChromeDriver {
    pub fn launch(headless: bool) -> Result<Self, RunError> {
        Self::try_launch(headless).map_err(|e| RunError::Session(format!("{e:#}")))
    }

    // headless_chrome speaks anyhow; keep that dialect until the session
    // boundary and convert once.
    fn try_launch(headless: bool) -> anyhow::Result<Self> {
        let options = LaunchOptions {
            headless,
            args: vec![
                OsStr::new("--no-first-run"),
                OsStr::new("--no-default-browser-check"),
                OsStr::new("--disable-infobars"),
            ],
            idle_browser_timeout: Duration::from_secs(300),
            ..Default::default()
        };

        let browser = Browser::new(options).context("browser launch failed")?;
        let tab = browser.new_tab().context("cannot open tab")?;

        Ok(Self {
            _browser: browser,
            tab,
        })
    }

    fn resolve(&self, target: &Target, timeout: Duration) -> Result<Element<'_>, DriverError> {
        match target {
            Target::Selector(selector) => self.resolve_selector(selector, timeout),
            Target::Text { text, exact } => self
                .tab
                .wait_for_xpath_with_custom_timeout(&text_xpath(text, *exact), timeout)
                .map_err(|_| DriverError::NotFound(format!("text {text:?}"))),
        }
    }

    fn resolve_selector(
        &self,
        selector: &str,
        timeout: Duration,
    ) -> Result<Element<'_>, DriverError> {
        self.tab
            .wait_for_element_with_custom_timeout(selector, timeout)
            .map_err(|_| DriverError::NotFound(format!("selector {selector:?}")))
    }

    fn eval_string(&self, expr: &str) -> Result<String, DriverError> {
        let result = self
            .tab
            .evaluate(expr, false)
            .map_err(|e| DriverError::Backend(format!("{e:#}")))?;
        Ok(result
            .value
            .and_then(|v| v.as_str().map(String::from))
            .unwrap_or_default())
    }
}

impl Driver for ChromeDriver {
    fn goto(
        &mut self,
        url: &str,
        wait_until: WaitUntil,
        timeout: Duration,
    ) -> Result<(), DriverError> {
        self.tab
            .navigate_to(url)
            .map_err(|e| DriverError::Navigation {
                url: url.to_string(),
                cause: format!("{e:#}"),
            })?;

        let deadline = Instant::now() + timeout;
        loop {
            // evaluate fails transiently while the old document is being
            // torn down; treat that as not-ready, not as an error.
            let ready_state = self.eval_string("document.readyState").unwrap_or_default();
            let ready = match wait_until {
                WaitUntil::ContentLoaded => {
                    ready_state == "interactive" || ready_state == "complete"
                }
                WaitUntil::Load => ready_state == "complete",
            };
            if ready {
                return Ok(());
            }
            if Instant::now() >= deadline {
                return Err(DriverError::Timeout {
                    what: format!("navigation to {url}"),
                    timeout,
                });
            }
            std::thread::sleep(POLL_INTERVAL);
        }
    }

    fn click(&mut self, target: &Target, timeout: Duration) -> Result<(), DriverError> {
        let element = self.resolve(target, timeout)?;
        element
            .click()
            .map_err(|e| DriverError::Backend(format!("{e:#}")))?;
        Ok(())
    }

    fn fill(&mut self, selector: &str, value: &str, timeout: Duration) -> Result<(), DriverError> {
        let element = self.resolve_selector(selector, timeout)?;
        element
            .click()
            .map_err(|e| DriverError::Backend(format!("{e:#}")))?;

        // Clear any existing value, then type through the keyboard so input
        // listeners fire like they would for a real user.
        let selector_js = js_string(selector);
        self.tab
            .evaluate(
                &format!("document.querySelector({selector_js}).value = ''"),
                false,
            )
            .map_err(|e| DriverError::Backend(format!("{e:#}")))?;
        self.tab
            .type_str(value)
            .map_err(|e| DriverError::Backend(format!("{e:#}")))?;
        Ok(())
    }

    fn press(
        &mut self,
        selector: Option<&str>,
        key: &str,
        timeout: Duration,
    ) -> Result<(), DriverError> {
        if let Some(selector) = selector {
            // Focus the target before sending the key.
            let element = self.resolve_selector(selector, timeout)?;
            element
                .click()
                .map_err(|e| DriverError::Backend(format!("{e:#}")))?;
        }
        self.tab
            .press_key(key)
            .map_err(|e| DriverError::Backend(format!("{e:#}")))?;
        Ok(())
    }

    fn wait_for(
        &mut self,
        selector: &str,
        state: WaitState,
        timeout: Duration,
    ) -> Result<(), DriverError> {
        let probe = state_probe_js(selector);
        let deadline = Instant::now() + timeout;
        loop {
            let observed = self.eval_string(&probe).unwrap_or_default();
            let reached = match state {
                WaitState::Attached => observed == "visible" || observed == "hidden",
                WaitState::Visible => observed == "visible",
                WaitState::Hidden => observed == "hidden" || observed == "detached",
                WaitState::Detached => observed == "detached",
            };
            if reached {
                return Ok(());
            }
            if Instant::now() >= deadline {
                return Err(DriverError::Timeout {
                    what: format!("selector {selector:?} to become {state}"),
                    timeout,
                });
            }
            std::thread::sleep(POLL_INTERVAL);
        }
    }

    fn pause(&mut self, ms: u64) {
        std::thread::sleep(Duration::from_millis(ms));
    }

    fn read_text(
        &mut self,
        selector: Option<&str>,
        _timeout: Duration,
    ) -> Result<String, DriverError> {
        match selector {
            Some(selector) => {
                let selector_js = js_string(selector);
                self.eval_string(&format!(
                    "(document.querySelector({selector_js}) || {{}}).innerText || ''"
                ))
            }
            None => self.eval_string("document.body.innerText || ''"),
        }
    }

    fn select(
        &mut self,
        selector: &str,
        values: &[String],
        timeout: Duration,
    ) -> Result<(), DriverError> {
        self.resolve_selector(selector, timeout)?;

        let selector_js = js_string(selector);
        let values_js =
            serde_json::to_string(values).map_err(|e| DriverError::Backend(format!("{e:#}")))?;
        let js = format!(
            r#"(() => {{
  const el = document.querySelector({selector_js});
  if (!el || !el.options) return -1;
  const want = new Set({values_js});
  let hits = 0;
  for (const opt of el.options) {{
    opt.selected = want.has(opt.value) || want.has(opt.textContent.trim());
    if (opt.selected) hits += 1;
  }}
  el.dispatchEvent(new Event('input', {{ bubbles: true }}));
  el.dispatchEvent(new Event('change', {{ bubbles: true }}));
  return hits;
}})()"#
        );

        let result = self
            .tab
            .evaluate(&js, false)
            .map_err(|e| DriverError::Backend(format!("{e:#}")))?;
        match result.value.and_then(|v| v.as_i64()).unwrap_or(-1) {
            hits if hits > 0 => Ok(()),
            0 => Err(DriverError::OptionNotFound {
                selector: selector.to_string(),
                values: values.to_vec(),
            }),
            _ => Err(DriverError::NotFound(format!(
                "select element {selector:?}"
            ))),
        }
    }
}

/// A JS string literal for embedding a selector into injected scripts.
fn js_string(s: &str) -> String {
    serde_json::to_string(s).unwrap_or_else(|_| "''".to_string())
}

/// XPath query for a text-matched click target. Matches elements owning a
/// text node that contains (or, for exact matches, equals) the text.
fn text_xpath(text: &str, exact: bool) -> String {
    let quoted = xpath_quote(text);
    if exact {
        format!("//*[normalize-space(text()) = {quoted}]")
    } else {
        format!("//*[text()[contains(., {quoted})]]")
    }
}

/// XPath has no string escapes; text containing both quote kinds has to go
/// through concat().
fn xpath_quote(s: &str) -> String {
    if !s.contains('\'') {
        format!("'{s}'")
    } else if !s.contains('"') {
        format!("\"{s}\"")
    } else {
        let parts: Vec<String> = s.split('\'').map(|p| format!("'{p}'")).collect();
        format!("concat({})", parts.join(", \"'\", "))
    }
}

/// Reports 'detached', 'hidden', or 'visible' for a selector. Same
/// visibility rules as a user would perceive: in the layout tree and not
/// display:none / visibility:hidden / fully transparent. BODY and HTML
/// have no offsetParent yet still count as visible.
fn state_probe_js(selector: &str) -> String {
    let selector_js = js_string(selector);
    format!(
        r#"(() => {{
  const el = document.querySelector({selector_js});
  if (!el) return 'detached';
  const s = getComputedStyle(el);
  const hasBox = el.offsetParent !== null || el.tagName === 'BODY' || el.tagName === 'HTML';
  const visible = hasBox
    && s.display !== 'none' && s.visibility !== 'hidden' && s.opacity !== '0';
  return visible ? 'visible' : 'hidden';
}})()"#
    )
}
