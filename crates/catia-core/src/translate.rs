//! Translation of log lines into Cypress statements.
//!
//! Only a subset of the log grammar has a counterpart:
//!
//! | Log line                 | Statement                                          |
//! |--------------------------|----------------------------------------------------|
//! | `visit <url>`            | `beforeAll(() => {\n\tcy.visit("<url>");\n});`     |
//! | `type <text>`            | `cy.type("<text>").should("have.value","<text>");` |
//! | `click $ <sel>`          | `cy.get("<sel>").click();`                         |
//! | `double click $ <sel>`   | `cy.get("<sel>").click().click();`                 |
//! | `right click $ <sel>`    | `cy.get("<sel>").rightClick();`                    |
//! | `focus $ <sel>`          | `cy.get("<sel>").focus();`                         |
//!
//! Every other line translates to an empty string.

use tracing::debug;

use crate::action::{ActionToken, CapturedAction};

/// Translate one log line. The line is trimmed first.
pub fn translate_line(line: &str) -> String {
    let Some(action) = CapturedAction::parse(line) else {
        debug!("No statement for line: {}", line.trim());
        return String::new();
    };

    match action.token {
        ActionToken::Visit | ActionToken::Type => {
            // Only the first whitespace-delimited word is the target
            let Some(value) = action.payload().split_whitespace().next() else {
                return String::new();
            };
            let value = js_string(value);
            if action.token == ActionToken::Visit {
                format!("beforeAll(() => {{\n\tcy.visit(\"{}\");\n}});", value)
            } else {
                format!("cy.type(\"{0}\").should(\"have.value\",\"{0}\");", value)
            }
        }
        ActionToken::Click
        | ActionToken::DoubleClick
        | ActionToken::RightClick
        | ActionToken::Focus => {
            let selector = action.payload().trim_end();
            if selector.is_empty() {
                return String::new();
            }
            let chain = match action.token {
                ActionToken::DoubleClick => "click().click()",
                ActionToken::RightClick => "rightClick()",
                ActionToken::Focus => "focus()",
                _ => "click()",
            };
            format!("cy.get(\"{}\").{};", js_string(selector), chain)
        }
        _ => {
            debug!("No statement for line: {}", action);
            String::new()
        }
    }
}

/// Translate a whole log, dropping lines with no statement.
pub fn translate_log<S: AsRef<str>>(lines: &[S]) -> Vec<String> {
    lines
        .iter()
        .map(|line| translate_line(line.as_ref()))
        .filter(|statement| !statement.is_empty())
        .collect()
}

/// Escape text for a double-quoted JavaScript string literal.
fn js_string(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '\\' => escaped.push_str("\\\\"),
            '"' => escaped.push_str("\\\""),
            '\n' => escaped.push_str("\\n"),
            '\r' => escaped.push_str("\\r"),
            _ => escaped.push(c),
        }
    }
    escaped
}
