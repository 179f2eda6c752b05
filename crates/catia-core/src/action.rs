//! Action tokens and their rendered form.
//!
//! Every captured interaction is rendered as a single line of text:
//!
//! | Token kind | Rendered form | Example |
//! |------------|---------------|---------|
//! | selector-bearing | `<verb> $ <selector>` | `click $ form > button#submit` |
//! | value-bearing | `<verb> <value>` | `type a`, `visit http://example.com` |
//! | value-bearing, no value | `<verb>` | `copy`, `scroll down` |

use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

/// Marker between a selector-bearing verb and its selector.
pub const TOKEN_SELECTOR: &str = "$";

/// Separator between verb, marker and payload.
pub const TOKEN_SPACE: &str = " ";

/// `<verb>` optionally followed by whitespace and the rest of the line.
/// Longer verbs come first so `scroll down` is not read as a shorter verb.
static GRAMMAR: LazyLock<Result<Regex, regex::Error>> = LazyLock::new(|| {
    let mut verbs: Vec<&str> = ActionToken::ALL.iter().map(|t| t.verb()).collect();
    verbs.sort_by_key(|verb| std::cmp::Reverse(verb.len()));
    let alternation: Vec<String> = verbs.into_iter().map(regex::escape).collect();
    Regex::new(&format!(r"^({})(?:\s+(.*))?$", alternation.join("|")))
});

/// Every kind of action the recorder can log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ActionToken {
    Click,
    DoubleClick,
    RightClick,
    Hover,
    Focus,
    Type,
    Press,
    Wait,
    ScrollUp,
    ScrollDown,
    ScrollLeft,
    ScrollRight,
    Input,
    Copy,
    Paste,
    Cut,
    Select,
    Visit,
}

impl ActionToken {
    pub const ALL: [ActionToken; 18] = [
        ActionToken::Click,
        ActionToken::DoubleClick,
        ActionToken::RightClick,
        ActionToken::Hover,
        ActionToken::Focus,
        ActionToken::Type,
        ActionToken::Press,
        ActionToken::Wait,
        ActionToken::ScrollUp,
        ActionToken::ScrollDown,
        ActionToken::ScrollLeft,
        ActionToken::ScrollRight,
        ActionToken::Input,
        ActionToken::Copy,
        ActionToken::Paste,
        ActionToken::Cut,
        ActionToken::Select,
        ActionToken::Visit,
    ];

    /// The verb as it appears in the log.
    pub fn verb(self) -> &'static str {
        match self {
            ActionToken::Click => "click",
            ActionToken::DoubleClick => "double click",
            ActionToken::RightClick => "right click",
            ActionToken::Hover => "hoverover",
            ActionToken::Focus => "focus",
            ActionToken::Type => "type",
            ActionToken::Press => "press",
            ActionToken::Wait => "wait",
            ActionToken::ScrollUp => "scroll up",
            ActionToken::ScrollDown => "scroll down",
            ActionToken::ScrollLeft => "scroll left",
            ActionToken::ScrollRight => "scroll right",
            ActionToken::Input => "input",
            ActionToken::Copy => "copy",
            ActionToken::Paste => "paste",
            ActionToken::Cut => "cut",
            ActionToken::Select => "select",
            ActionToken::Visit => "visit",
        }
    }

    /// Whether the rendered form names a DOM target.
    pub fn is_selector_bearing(self) -> bool {
        matches!(
            self,
            ActionToken::Click
                | ActionToken::DoubleClick
                | ActionToken::RightClick
                | ActionToken::Hover
                | ActionToken::Focus
        )
    }

    pub fn is_value_bearing(self) -> bool {
        !self.is_selector_bearing()
    }

    /// Tokens that may repeat back to back in the log.
    pub fn is_dedup_exempt(self) -> bool {
        matches!(self, ActionToken::Type | ActionToken::Press)
    }

    /// Text placed before the payload: `verb $ ` or `verb `.
    pub fn prefix(self) -> String {
        if self.is_selector_bearing() {
            format!("{}{}{}{}", self.verb(), TOKEN_SPACE, TOKEN_SELECTOR, TOKEN_SPACE)
        } else {
            format!("{}{}", self.verb(), TOKEN_SPACE)
        }
    }

    /// Build the captured action for this token and payload parts.
    pub fn capture(self, parts: &[&str]) -> CapturedAction {
        CapturedAction::new(self, parts)
    }
}

impl fmt::Display for ActionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.verb())
    }
}

impl FromStr for ActionToken {
    type Err = String;

    /// Accepts either the token name (`doubleClick`) or the verb
    /// (`double click`), case-insensitively.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        ActionToken::ALL
            .into_iter()
            .find(|t| {
                t.verb() == wanted
                    || serde_json::to_value(t)
                        .ok()
                        .and_then(|v| v.as_str().map(str::to_lowercase))
                        .is_some_and(|name| name == wanted)
            })
            .ok_or_else(|| format!("unknown action '{}'", s))
    }
}

/// One rendered log entry and the token that produced it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapturedAction {
    pub token: ActionToken,
    pub rendered: String,
}

impl CapturedAction {
    /// Compose the rendered string: the token prefix followed by the parts
    /// concatenated without separator. A value-bearing token with no
    /// payload renders as the bare verb.
    pub fn new(token: ActionToken, parts: &[&str]) -> Self {
        let payload = parts.concat();
        let rendered = if payload.is_empty() && token.is_value_bearing() {
            token.verb().to_string()
        } else {
            format!("{}{}", token.prefix(), payload)
        };
        Self { token, rendered }
    }

    /// Split a rendered line back into verb and payload.
    ///
    /// Returns `None` for lines whose verb is not a known token, and for
    /// selector-bearing lines without the `$` marker.
    pub fn parse(line: &str) -> Option<Self> {
        let grammar = GRAMMAR.as_ref().ok()?;
        let caps = grammar.captures(line.trim())?;
        let verb = caps.get(1)?.as_str();
        let token = ActionToken::ALL.into_iter().find(|t| t.verb() == verb)?;
        let rest = caps.get(2).map_or("", |m| m.as_str());

        let payload = if token.is_selector_bearing() {
            rest.strip_prefix(TOKEN_SELECTOR)?.trim_start()
        } else {
            rest
        };
        Some(Self::new(token, &[payload]))
    }

    /// Text after the verb (and selector marker).
    pub fn payload(&self) -> &str {
        self.rendered
            .strip_prefix(&self.token.prefix())
            .unwrap_or_default()
    }
}

impl fmt::Display for CapturedAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.rendered)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_selector_bearing_prefix_has_marker() {
        assert_eq!(ActionToken::Click.prefix(), "click $ ");
        assert_eq!(ActionToken::DoubleClick.prefix(), "double click $ ");
        assert_eq!(ActionToken::Hover.prefix(), "hoverover $ ");
    }

    #[test]
    fn test_value_bearing_prefix_is_verb_and_space() {
        assert_eq!(ActionToken::Visit.prefix(), "visit ");
        assert_eq!(ActionToken::ScrollDown.prefix(), "scroll down ");
    }

    #[test]
    fn test_capture_concatenates_parts_without_separator() {
        let action = ActionToken::Wait.capture(&["1", "2"]);
        assert_eq!(action.rendered, "wait 12");
    }

    #[test]
    fn test_value_bearing_without_payload_is_bare_verb() {
        assert_eq!(ActionToken::Copy.capture(&[]).rendered, "copy");
        assert_eq!(ActionToken::ScrollLeft.capture(&[""]).rendered, "scroll left");
    }

    #[test]
    fn test_only_type_and_press_are_exempt() {
        let exempt: Vec<ActionToken> = ActionToken::ALL
            .into_iter()
            .filter(|t| t.is_dedup_exempt())
            .collect();
        assert_eq!(exempt, vec![ActionToken::Type, ActionToken::Press]);
    }

    #[test]
    fn test_token_parses_from_name_or_verb() {
        let parse = |s: &str| s.parse::<ActionToken>();
        assert_eq!(parse("doubleClick"), Ok(ActionToken::DoubleClick));
        assert_eq!(parse("double click"), Ok(ActionToken::DoubleClick));
        assert_eq!(parse("SCROLLUP"), Ok(ActionToken::ScrollUp));
        assert_eq!(parse("hoverover"), Ok(ActionToken::Hover));
        assert!("teleport".parse::<ActionToken>().is_err());
    }

    #[test]
    fn test_token_serializes_as_camel_case() {
        assert_eq!(
            serde_json::to_string(&ActionToken::RightClick).unwrap(),
            "\"rightClick\""
        );
    }

    #[test]
    fn test_parse_rendered_lines() {
        let click = CapturedAction::parse("click $ form > button#go").unwrap();
        assert_eq!(click.token, ActionToken::Click);
        assert_eq!(click.payload(), "form > button#go");

        let right = CapturedAction::parse("right click $ document").unwrap();
        assert_eq!(right.token, ActionToken::RightClick);

        let scroll = CapturedAction::parse("scroll down").unwrap();
        assert_eq!(scroll.token, ActionToken::ScrollDown);
        assert_eq!(scroll.payload(), "");

        let typed = CapturedAction::parse("type a").unwrap();
        assert_eq!(typed.token, ActionToken::Type);
        assert_eq!(typed.payload(), "a");
    }

    #[test]
    fn test_parse_rejects_unknown_or_malformed_lines() {
        assert_eq!(CapturedAction::parse("look u"), None);
        assert_eq!(CapturedAction::parse("click"), None);
        assert_eq!(CapturedAction::parse("click #no-marker"), None);
        assert_eq!(CapturedAction::parse("typed a"), None);
    }

    #[test]
    fn test_grammar_compiles() {
        assert!(GRAMMAR.is_ok());
    }

    #[test]
    fn test_parse_skips_extra_whitespace_after_verb() {
        let visit = CapturedAction::parse("  visit   http://a  ").unwrap();
        assert_eq!(visit.token, ActionToken::Visit);
        assert_eq!(visit.payload(), "http://a");

        let focus = CapturedAction::parse("focus\t$  #name").unwrap();
        assert_eq!(focus.payload(), "#name");
    }
}
