use serde::Deserialize;
use std::fmt;
use std::time::Duration;

/// Default timeout for element-level operations (clicks, fills, waits).
pub const DEFAULT_TIMEOUT_MS: u64 = 10_000;
/// Navigations get more time than element-level operations.
pub const DEFAULT_NAV_TIMEOUT_MS: u64 = 30_000;
/// A `waitForTimeout` step with no duration pauses this long.
pub const DEFAULT_PAUSE_MS: u64 = 1_000;

/// One step record exactly as it appears in the input JSON.
///
/// Lenient by design: everything except `action` is optional here, both
/// spellings of the fallback pairs (`timeout`/`ms`, `value`/`values`) are
/// accepted, and unknown fields are ignored. [`Step::compile`] is where a
/// record either becomes a typed step or gets rejected.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawStep {
    pub action: String,
    pub selector: Option<String>,
    pub text: Option<String>,
    pub value: Option<String>,
    pub values: Option<Vec<String>>,
    pub url: Option<String>,
    pub key: Option<String>,
    pub timeout: Option<u64>,
    pub ms: Option<u64>,
    pub wait_until: Option<String>,
    pub state: Option<String>,
    pub exact: Option<bool>,
}

impl RawStep {
    /// The normalized action name used for dispatch and diagnostics.
    pub fn action_name(&self) -> String {
        self.action.trim().to_ascii_lowercase()
    }
}

/// What a click resolves against: a CSS selector or a text match.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    Selector(String),
    Text { text: String, exact: bool },
}

/// When a navigation counts as done.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaitUntil {
    ContentLoaded,
    Load,
}

/// The element condition `waitForSelector` waits for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaitState {
    Attached,
    Visible,
    Hidden,
    Detached,
}

impl fmt::Display for WaitState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            WaitState::Attached => "attached",
            WaitState::Visible => "visible",
            WaitState::Hidden => "hidden",
            WaitState::Detached => "detached",
        };
        f.write_str(name)
    }
}

/// A validated step: one tagged variant per recognized action kind, with
/// defaults applied and the fallback fields collapsed into one canonical
/// field per concept.
#[derive(Debug, Clone, PartialEq)]
pub enum Step {
    Navigate {
        url: String,
        wait_until: WaitUntil,
        timeout: Duration,
    },
    Click {
        target: Target,
        timeout: Duration,
    },
    Fill {
        selector: String,
        value: String,
        timeout: Duration,
    },
    Press {
        selector: Option<String>,
        key: String,
        timeout: Duration,
    },
    Pause {
        ms: u64,
    },
    WaitForSelector {
        selector: String,
        state: WaitState,
        timeout: Duration,
    },
    AssertText {
        selector: Option<String>,
        expected: String,
        exact: bool,
        timeout: Duration,
    },
    SelectOption {
        selector: String,
        values: Vec<String>,
        timeout: Duration,
    },
}

/// Why a raw record failed to compile into a [`Step`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompileError {
    /// The action name is outside the recognized set.
    UnknownAction,
    /// The action is recognized but the record violates its field rules.
    /// Every violation of the record is collected, not just the first.
    Invalid(Vec<String>),
}

impl Step {
    /// Validate one raw record into a typed step.
    ///
    /// Action names match case-insensitively. Field problems do not
    /// short-circuit: a bad record reports all of its violations at once.
    pub fn compile(raw: &RawStep) -> Result<Step, CompileError> {
        let mut problems = Vec::new();

        let step = match raw.action_name().as_str() {
            "navigate" | "goto" => Step::Navigate {
                url: require(raw.url.as_deref(), "url", &mut problems),
                wait_until: wait_until_of(raw, &mut problems),
                timeout: timeout_of(raw, DEFAULT_NAV_TIMEOUT_MS),
            },
            "click" => Step::Click {
                target: target_of(raw, &mut problems),
                timeout: timeout_of(raw, DEFAULT_TIMEOUT_MS),
            },
            "fill" | "type" => Step::Fill {
                selector: require(raw.selector.as_deref(), "selector", &mut problems),
                value: raw.value.clone().unwrap_or_default(),
                timeout: timeout_of(raw, DEFAULT_TIMEOUT_MS),
            },
            "press" => Step::Press {
                selector: raw.selector.clone(),
                key: require(raw.key.as_deref(), "key", &mut problems),
                timeout: timeout_of(raw, DEFAULT_TIMEOUT_MS),
            },
            "waitfortimeout" => Step::Pause {
                ms: raw.timeout.or(raw.ms).unwrap_or(DEFAULT_PAUSE_MS),
            },
            "waitforselector" => Step::WaitForSelector {
                selector: require(raw.selector.as_deref(), "selector", &mut problems),
                state: state_of(raw, &mut problems),
                timeout: timeout_of(raw, DEFAULT_TIMEOUT_MS),
            },
            "asserttext" => Step::AssertText {
                selector: raw.selector.clone(),
                expected: require(raw.text.as_deref(), "text", &mut problems),
                exact: raw.exact.unwrap_or(false),
                timeout: timeout_of(raw, DEFAULT_TIMEOUT_MS),
            },
            "selectoption" => Step::SelectOption {
                selector: require(raw.selector.as_deref(), "selector", &mut problems),
                values: values_of(raw, &mut problems),
                timeout: timeout_of(raw, DEFAULT_TIMEOUT_MS),
            },
            _ => return Err(CompileError::UnknownAction),
        };

        if problems.is_empty() {
            Ok(step)
        } else {
            Err(CompileError::Invalid(problems))
        }
    }
}

fn require(field: Option<&str>, name: &str, problems: &mut Vec<String>) -> String {
    match field {
        Some(v) => v.to_string(),
        None => {
            problems.push(format!("missing required field `{name}`"));
            String::new()
        }
    }
}

fn timeout_of(raw: &RawStep, default_ms: u64) -> Duration {
    Duration::from_millis(raw.timeout.unwrap_or(default_ms))
}

/// `click` takes a selector or a text match, never both.
fn target_of(raw: &RawStep, problems: &mut Vec<String>) -> Target {
    match (raw.selector.clone(), raw.text.clone()) {
        (Some(selector), None) => Target::Selector(selector),
        (None, Some(text)) => Target::Text {
            text,
            exact: raw.exact.unwrap_or(false),
        },
        (Some(_), Some(_)) => {
            problems.push("takes `selector` or `text`, not both".to_string());
            Target::Selector(String::new())
        }
        (None, None) => {
            problems.push("needs a `selector` or a `text` match".to_string());
            Target::Selector(String::new())
        }
    }
}

fn wait_until_of(raw: &RawStep, problems: &mut Vec<String>) -> WaitUntil {
    match raw.wait_until.as_deref() {
        None => WaitUntil::ContentLoaded,
        Some(s) => match s.to_ascii_lowercase().as_str() {
            "load" => WaitUntil::Load,
            "domcontentloaded" | "content-loaded" | "contentloaded" => WaitUntil::ContentLoaded,
            _ => {
                problems.push(format!("unsupported waitUntil {s:?}"));
                WaitUntil::ContentLoaded
            }
        },
    }
}

fn state_of(raw: &RawStep, problems: &mut Vec<String>) -> WaitState {
    match raw.state.as_deref() {
        None => WaitState::Visible,
        Some(s) => match s.to_ascii_lowercase().as_str() {
            "attached" => WaitState::Attached,
            "visible" => WaitState::Visible,
            "hidden" => WaitState::Hidden,
            "detached" => WaitState::Detached,
            _ => {
                problems.push(format!("unsupported state {s:?}"));
                WaitState::Visible
            }
        },
    }
}

/// `selectOption` accepts `values` or a single `value`; canonical form is
/// the non-empty list.
fn values_of(raw: &RawStep, problems: &mut Vec<String>) -> Vec<String> {
    if let Some(values) = raw.values.clone().filter(|v| !v.is_empty()) {
        values
    } else if let Some(value) = raw.value.clone() {
        vec![value]
    } else {
        problems.push("needs `values` (or a single `value`)".to_string());
        Vec::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(v: serde_json::Value) -> RawStep {
        serde_json::from_value(v).unwrap()
    }

    #[test]
    fn action_names_are_case_insensitive_with_aliases() {
        let nav = Step::compile(&raw(serde_json::json!({"action": "GoTo", "url": "/x"}))).unwrap();
        assert!(matches!(nav, Step::Navigate { .. }));

        let fill = Step::compile(&raw(
            serde_json::json!({"action": "TYPE", "selector": "#u", "value": "a"}),
        ))
        .unwrap();
        assert_eq!(
            fill,
            Step::Fill {
                selector: "#u".to_string(),
                value: "a".to_string(),
                timeout: Duration::from_millis(DEFAULT_TIMEOUT_MS),
            }
        );
    }

    #[test]
    fn navigate_defaults_and_custom_timeout() {
        let step = Step::compile(&raw(serde_json::json!({"action": "navigate", "url": "/login"})))
            .unwrap();
        assert_eq!(
            step,
            Step::Navigate {
                url: "/login".to_string(),
                wait_until: WaitUntil::ContentLoaded,
                timeout: Duration::from_millis(DEFAULT_NAV_TIMEOUT_MS),
            }
        );

        let step = Step::compile(&raw(serde_json::json!({
            "action": "navigate", "url": "/login", "waitUntil": "load", "timeout": 5000
        })))
        .unwrap();
        assert_eq!(
            step,
            Step::Navigate {
                url: "/login".to_string(),
                wait_until: WaitUntil::Load,
                timeout: Duration::from_millis(5000),
            }
        );
    }

    #[test]
    fn click_requires_selector_xor_text() {
        let err = Step::compile(&raw(serde_json::json!({"action": "click"}))).unwrap_err();
        let CompileError::Invalid(problems) = err else {
            panic!("expected Invalid");
        };
        assert_eq!(problems.len(), 1);
        assert!(problems[0].contains("selector"));

        let err = Step::compile(&raw(
            serde_json::json!({"action": "click", "selector": "#a", "text": "Go"}),
        ))
        .unwrap_err();
        assert!(matches!(err, CompileError::Invalid(_)));

        let by_text = Step::compile(&raw(
            serde_json::json!({"action": "click", "text": "Log in", "exact": true}),
        ))
        .unwrap();
        assert_eq!(
            by_text,
            Step::Click {
                target: Target::Text {
                    text: "Log in".to_string(),
                    exact: true,
                },
                timeout: Duration::from_millis(DEFAULT_TIMEOUT_MS),
            }
        );
    }

    #[test]
    fn fill_value_defaults_to_empty() {
        let step =
            Step::compile(&raw(serde_json::json!({"action": "fill", "selector": "#u"}))).unwrap();
        assert_eq!(
            step,
            Step::Fill {
                selector: "#u".to_string(),
                value: String::new(),
                timeout: Duration::from_millis(DEFAULT_TIMEOUT_MS),
            }
        );
    }

    #[test]
    fn pause_falls_back_from_timeout_to_ms_to_default() {
        let by_timeout =
            Step::compile(&raw(serde_json::json!({"action": "waitForTimeout", "timeout": 250})))
                .unwrap();
        assert_eq!(by_timeout, Step::Pause { ms: 250 });

        let by_ms =
            Step::compile(&raw(serde_json::json!({"action": "waitForTimeout", "ms": 75}))).unwrap();
        assert_eq!(by_ms, Step::Pause { ms: 75 });

        let default = Step::compile(&raw(serde_json::json!({"action": "waitForTimeout"}))).unwrap();
        assert_eq!(default, Step::Pause { ms: DEFAULT_PAUSE_MS });
    }

    #[test]
    fn select_option_normalizes_single_value() {
        let step = Step::compile(&raw(
            serde_json::json!({"action": "selectOption", "selector": "#c", "value": "DE"}),
        ))
        .unwrap();
        assert_eq!(
            step,
            Step::SelectOption {
                selector: "#c".to_string(),
                values: vec!["DE".to_string()],
                timeout: Duration::from_millis(DEFAULT_TIMEOUT_MS),
            }
        );
    }

    #[test]
    fn unknown_action_is_its_own_error() {
        let err = Step::compile(&raw(serde_json::json!({"action": "bogus"}))).unwrap_err();
        assert_eq!(err, CompileError::UnknownAction);
    }

    #[test]
    fn all_violations_reported_at_once() {
        let err = Step::compile(&raw(
            serde_json::json!({"action": "waitForSelector", "state": "shimmering"}),
        ))
        .unwrap_err();
        let CompileError::Invalid(problems) = err else {
            panic!("expected Invalid");
        };
        assert_eq!(problems.len(), 2);
        assert!(problems.iter().any(|p| p.contains("selector")));
        assert!(problems.iter().any(|p| p.contains("shimmering")));
    }

    #[test]
    fn assert_text_selector_is_optional() {
        let step = Step::compile(&raw(
            serde_json::json!({"action": "assertText", "text": "Welcome"}),
        ))
        .unwrap();
        assert_eq!(
            step,
            Step::AssertText {
                selector: None,
                expected: "Welcome".to_string(),
                exact: false,
                timeout: Duration::from_millis(DEFAULT_TIMEOUT_MS),
            }
        );
    }
}
