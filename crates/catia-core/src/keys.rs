//! Keyboard classification: deciding between `type` and `press`.
//!
//! A key signal is logged as `type` when it carries meaningful text for an
//! editable target, and as `press` otherwise (named keys such as `Enter`,
//! keys on non-editable targets, or anything outside the printable set).

use crate::action::ActionToken;
use crate::node::NodeSnapshot;

/// Characters that count as typed text.
pub const PRINTABLE: &str = concat!(
    "abcdefghijklmnopqrstuvwxyz",
    "ABCDEFGHIJKLMNOPQRSTUVWXYZ",
    "0123456789",
    "`~!@#$%^&*()_-=+\\|}{][\":';<,.>/?*-+^~´ªºÇç«»ã",
);

/// Key code for the Tab key.
pub const TAB_KEY_CODE: u32 = 9;

/// Options that shape classification.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct KeyOptions {
    /// Replace a literal space with the key code (e.g. `Space`).
    pub capture_space_press: bool,
    /// Only printable single characters may be classified as `type`.
    pub type_digits: bool,
}

/// Result of classifying one key signal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyCapture {
    pub token: ActionToken,
    pub value: String,
}

/// Whether `value` is exactly one character of the printable set.
pub fn is_printable(value: &str) -> bool {
    let mut chars = value.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => PRINTABLE.contains(c),
        _ => false,
    }
}

/// The raw value of a key signal.
///
/// Prefers the key itself, then the target's value, inner HTML and text
/// content. Returns an empty string when none is available.
pub fn raw_value<'a>(key: Option<&'a str>, target: &'a NodeSnapshot) -> &'a str {
    key.filter(|k| !k.is_empty())
        .or_else(|| target.text_value())
        .unwrap_or_default()
}

/// Classify a key signal on `target`.
///
/// `type_digits` is expected to mirror the target's editability, so a
/// printable key on a non-editable target is still a `press`.
pub fn classify(
    key: Option<&str>,
    code: Option<&str>,
    target: &NodeSnapshot,
    options: KeyOptions,
) -> KeyCapture {
    let mut value = raw_value(key, target).to_string();

    if options.capture_space_press && value == " " {
        if let Some(code) = code.filter(|c| !c.is_empty()) {
            value = code.to_string();
        }
    }

    let token = if target.is_editable() && options.type_digits && is_printable(&value) {
        ActionToken::Type
    } else {
        ActionToken::Press
    };

    KeyCapture { token, value }
}
