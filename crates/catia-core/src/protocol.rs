//! Wire types between the host adapter and the recorder.
//!
//! The host serializes each interaction as one JSON object per line, tagged
//! by `event`. An optional `at` field carries the milliseconds elapsed since
//! the session started and drives the wait timer.
//!
//! ```text
//! {"event":"load","location":"http://example.com","at":0}
//! {"event":"click","target":{"name":"BUTTON","parentName":"FORM","attributes":{"id":"submit"}}}
//! {"event":"keydown","target":{"name":"INPUT"},"key":"a","code":"KeyA","keyCode":65}
//! ```

use serde::{Deserialize, Serialize};

use crate::error::ApiError;
use crate::node::NodeSnapshot;
use crate::scroll::ScrollSample;

/// Interactions raised by the host environment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "camelCase")]
pub enum InteractionEvent {
    /// The page finished loading.
    Load { location: String },
    #[serde(rename = "mouseover")]
    MouseOver { target: NodeSnapshot },
    Focus { target: NodeSnapshot },
    /// Value change on an input element.
    Input {
        target: NodeSnapshot,
        #[serde(default)]
        value: Option<String>,
    },
    Click { target: NodeSnapshot },
    #[serde(rename = "dblclick")]
    DoubleClick { target: NodeSnapshot },
    #[serde(rename = "keydown")]
    KeyDown {
        target: NodeSnapshot,
        #[serde(default)]
        key: Option<String>,
        #[serde(default)]
        code: Option<String>,
        #[serde(default, rename = "keyCode")]
        key_code: Option<u32>,
    },
    #[serde(rename = "contextmenu")]
    ContextMenu {
        #[serde(default)]
        target: Option<NodeSnapshot>,
    },
    Scroll(ScrollSample),
    /// The host is about to render a frame.
    AnimationFrame,
    #[serde(rename = "selectstart")]
    SelectStart,
    Select,
    Copy,
    Paste,
    Cut,
}

impl InteractionEvent {
    /// Whether the event came from the user (as opposed to the page or the
    /// rendering loop).
    pub fn is_user_interaction(&self) -> bool {
        !matches!(
            self,
            InteractionEvent::Load { .. } | InteractionEvent::AnimationFrame
        )
    }
}

/// One line of the event stream.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventLine {
    /// Milliseconds since the session started.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub at: Option<u64>,
    #[serde(flatten)]
    pub event: InteractionEvent,
}

impl EventLine {
    /// Decode one stream line. `line_no` is 1-based and only used in errors.
    pub fn parse(line: &str, line_no: usize) -> Result<Self, ApiError> {
        serde_json::from_str(line).map_err(|e| ApiError::invalid_event(line_no, &e.to_string()))
    }
}

/// Delivered to observers after each appended log entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification<'a> {
    /// The full log so far, including the new entry.
    pub actions: &'a [String],
    pub last_action: &'a str,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parses_click_line() {
        let line = EventLine::parse(
            r#"{"event":"click","target":{"name":"BUTTON","attributes":{"id":"go"}}}"#,
            1,
        )
        .unwrap();
        assert_eq!(line.at, None);
        match line.event {
            InteractionEvent::Click { target } => {
                assert_eq!(target.tag(), "button");
                assert_eq!(target.attributes.get("id"), Some("go"));
            }
            other => panic!("Expected click, got {:?}", other),
        }
    }

    #[test]
    fn test_parses_timestamped_load() {
        let line = EventLine::parse(
            r#"{"at":1200,"event":"load","location":"http://example.com"}"#,
            3,
        )
        .unwrap();
        assert_eq!(line.at, Some(1200));
        assert_eq!(
            line.event,
            InteractionEvent::Load {
                location: "http://example.com".into()
            }
        );
    }

    #[test]
    fn test_parses_keydown_fields() {
        let line = EventLine::parse(
            r#"{"event":"keydown","target":{"name":"input"},"key":"Tab","code":"Tab","keyCode":9}"#,
            1,
        )
        .unwrap();
        match line.event {
            InteractionEvent::KeyDown { key, key_code, .. } => {
                assert_eq!(key.as_deref(), Some("Tab"));
                assert_eq!(key_code, Some(9));
            }
            other => panic!("Expected keydown, got {:?}", other),
        }
    }

    #[test]
    fn test_parses_scroll_and_bare_events() {
        let scroll =
            EventLine::parse(r#"{"event":"scroll","scrollY":40,"maxY":100}"#, 1).unwrap();
        assert_eq!(
            scroll.event,
            InteractionEvent::Scroll(ScrollSample {
                scroll_y: 40,
                max_y: 100,
                ..ScrollSample::default()
            })
        );

        let frame = EventLine::parse(r#"{"event":"animationFrame"}"#, 2).unwrap();
        assert_eq!(frame.event, InteractionEvent::AnimationFrame);

        let ctx = EventLine::parse(r#"{"event":"contextmenu"}"#, 3).unwrap();
        assert_eq!(ctx.event, InteractionEvent::ContextMenu { target: None });

        for name in ["selectstart", "select", "copy", "paste", "cut"] {
            let json = format!(r#"{{"event":"{}"}}"#, name);
            assert!(EventLine::parse(&json, 1).is_ok(), "{} should parse", name);
        }
    }

    #[test]
    fn test_unknown_event_is_invalid() {
        let err = EventLine::parse(r#"{"event":"teleport"}"#, 9).unwrap_err();
        assert_eq!(err.code, crate::error::ErrorCode::InvalidEvent);
        assert!(err.message.contains("Line 9"));
    }

    #[test]
    fn test_notification_uses_camel_case() {
        let actions = vec!["visit http://a".to_string()];
        let json = serde_json::to_string(&Notification {
            actions: &actions,
            last_action: "visit http://a",
        })
        .unwrap();
        assert_eq!(
            json,
            r#"{"actions":["visit http://a"],"lastAction":"visit http://a"}"#
        );
    }

    #[test]
    fn test_load_is_not_a_user_interaction() {
        let load = InteractionEvent::Load {
            location: "x".into(),
        };
        assert!(!load.is_user_interaction());
        assert!(InteractionEvent::Copy.is_user_interaction());
    }
}
