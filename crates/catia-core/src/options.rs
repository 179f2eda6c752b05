//! Capture options.

use serde::{Deserialize, Serialize};

use crate::error::ApiError;
use crate::selector::{IgnoreMatch, SelectorStyle};

/// Default delay before the first `wait` entry (milliseconds).
pub const DEFAULT_WAIT_TIMEOUT_MS: u64 = 5000;

/// Root containers excluded from capture unless overridden.
pub const DEFAULT_IGNORE_NODES: &[&str] = &["html", "body"];

fn default_ignore_nodes() -> Vec<String> {
    DEFAULT_IGNORE_NODES.iter().map(|s| s.to_string()).collect()
}

fn default_wait_timeout() -> u64 {
    DEFAULT_WAIT_TIMEOUT_MS
}

/// What the recorder captures and how it renders it.
///
/// Deserialized from camelCase JSON. Missing keys take their defaults;
/// unknown keys are ignored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CaptureOptions {
    /// Selectors (or bare tags) of elements never captured.
    #[serde(default = "default_ignore_nodes")]
    pub ignore_nodes: Vec<String>,
    /// How `ignore_nodes` is matched.
    #[serde(default)]
    pub ignore_match: IgnoreMatch,
    /// Which selector form is written to the log.
    #[serde(default)]
    pub selector_style: SelectorStyle,
    #[serde(default)]
    pub capture_hover: bool,
    /// Log `focus` when a previously hovered element gains focus.
    #[serde(default)]
    pub capture_focus_on_click: bool,
    #[serde(default)]
    pub capture_scroll: bool,
    /// Render a typed space as its key code.
    #[serde(default)]
    pub capture_space_press: bool,
    /// Disable consecutive-duplicate suppression for every token.
    #[serde(default)]
    pub register_multiple_times: bool,
    /// Emit periodic `wait` entries after load.
    #[serde(default)]
    pub show_wait: bool,
    #[serde(default = "default_wait_timeout")]
    pub wait_timeout: u64,
    #[serde(default)]
    pub allow_password_input: bool,
}

impl Default for CaptureOptions {
    fn default() -> Self {
        Self {
            ignore_nodes: default_ignore_nodes(),
            ignore_match: IgnoreMatch::default(),
            selector_style: SelectorStyle::default(),
            capture_hover: false,
            capture_focus_on_click: false,
            capture_scroll: false,
            capture_space_press: false,
            register_multiple_times: false,
            show_wait: false,
            wait_timeout: DEFAULT_WAIT_TIMEOUT_MS,
            allow_password_input: false,
        }
    }
}

impl CaptureOptions {
    /// Parse options from a JSON document.
    pub fn from_json(json: &str) -> Result<Self, ApiError> {
        serde_json::from_str(json).map_err(|e| ApiError::invalid_options(&e.to_string()))
    }
}
