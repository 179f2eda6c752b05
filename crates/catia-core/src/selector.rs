//! Selector derivation for event targets.
//!
//! The builder applies priority-ordered rules and stops at the first one
//! that matches. Each rule yields a specific selector anchored on the
//! parent tag; the id and class rules also yield a short selector.
//!
//! # Rule Priority (highest to lowest)
//!
//! 1. Non-empty `id` → `#id`, specific `parent > tag#id`
//! 2. Non-empty `class` → `.class`, specific `parent > tag.class`
//! 3. First non-empty attribute → specific `parent > tag[attr="value"]`
//! 4. Tag name → specific `parent > tag`
//!
//! Resolution then filters the result against the ignore list (see
//! [`IgnoreMatch`]). An ignored element has no usable selector at all; the
//! builder never falls through to a lower-priority rule to rescue it. The
//! surviving result is rendered in the configured [`SelectorStyle`].

use serde::{Deserialize, Serialize};

use crate::node::NodeSnapshot;

/// Which rule produced a selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SelectorKind {
    Id,
    Class,
    Attribute,
    Tag,
}

/// Output of [`build_selector`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectorResult {
    pub kind: SelectorKind,
    /// `#id` or `.class`. Absent for attribute and tag selectors.
    pub short: Option<String>,
    /// Selector anchored on the parent tag.
    pub specific: String,
    tag: String,
}

impl SelectorResult {
    /// The value compared against the ignore list in [`IgnoreMatch::Short`]
    /// mode: the short selector, or the bare tag for the tag fallback.
    pub fn match_key(&self) -> Option<&str> {
        match self.kind {
            SelectorKind::Id | SelectorKind::Class => self.short.as_deref(),
            SelectorKind::Attribute => None,
            SelectorKind::Tag => Some(&self.tag),
        }
    }

    pub fn is_ignored(&self, ignore: &[String], mode: IgnoreMatch) -> bool {
        let hit = |candidate: &str| ignore.iter().any(|i| i == candidate);
        let short_hit = self.match_key().is_some_and(hit);
        match mode {
            IgnoreMatch::Short => short_hit,
            IgnoreMatch::Any => short_hit || hit(&self.specific),
        }
    }

    /// The selector written to the log for `style`.
    pub fn render(self, style: SelectorStyle) -> String {
        match (style, self.short) {
            (SelectorStyle::Short, Some(short)) => short,
            _ => self.specific,
        }
    }
}

/// How the ignore list is matched against a derived selector.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IgnoreMatch {
    /// Compare only the short form (or tag name for the tag fallback).
    #[default]
    Short,
    /// Also suppress elements whose specific form is listed.
    Any,
}

/// Which form of a selector is written to the log.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SelectorStyle {
    /// `#id` or `.class` when available, the specific form otherwise.
    #[default]
    Short,
    /// Always the parent-anchored form.
    Specific,
}

type Rule = fn(&NodeSnapshot, &Anchor) -> Option<SelectorResult>;

/// Rules in priority order. The tag fallback is applied when none match.
const RULES: &[Rule] = &[id_rule, class_rule, attribute_rule];

/// Tag and parent prefix shared by every rule.
struct Anchor {
    tag: String,
    prefix: String,
}

impl Anchor {
    fn of(node: &NodeSnapshot) -> Self {
        let parent = node.parent_tag();
        let prefix = if parent.is_empty() {
            String::new()
        } else {
            format!("{} > ", parent)
        };
        Self {
            tag: node.tag(),
            prefix,
        }
    }

    fn result(&self, kind: SelectorKind, short: Option<String>, suffix: &str) -> SelectorResult {
        SelectorResult {
            kind,
            short,
            specific: format!("{}{}{}", self.prefix, self.tag, suffix),
            tag: self.tag.clone(),
        }
    }
}

fn id_rule(node: &NodeSnapshot, anchor: &Anchor) -> Option<SelectorResult> {
    let id = node.attributes.get("id").filter(|id| !id.is_empty())?;
    Some(anchor.result(
        SelectorKind::Id,
        Some(format!("#{}", id)),
        &format!("#{}", id),
    ))
}

fn class_rule(node: &NodeSnapshot, anchor: &Anchor) -> Option<SelectorResult> {
    let class = node.class_value().filter(|c| !c.is_empty())?;
    Some(anchor.result(
        SelectorKind::Class,
        Some(format!(".{}", class)),
        &format!(".{}", class),
    ))
}

fn attribute_rule(node: &NodeSnapshot, anchor: &Anchor) -> Option<SelectorResult> {
    let (name, value) = node.attributes.iter().find(|(_, v)| !v.is_empty())?;
    Some(anchor.result(
        SelectorKind::Attribute,
        None,
        &format!("[{}=\"{}\"]", name, value),
    ))
}

/// Derive a selector for `node`.
///
/// Never fails: a node with no usable attributes still gets `parent > tag`.
pub fn build_selector(node: &NodeSnapshot) -> SelectorResult {
    let anchor = Anchor::of(node);
    RULES
        .iter()
        .find_map(|rule| rule(node, &anchor))
        .unwrap_or_else(|| anchor.result(SelectorKind::Tag, None, ""))
}

/// Derive the logged selector for `node`, or `None` when the element is
/// excluded by the ignore list.
pub fn resolve_selector(
    node: &NodeSnapshot,
    ignore: &[String],
    mode: IgnoreMatch,
    style: SelectorStyle,
) -> Option<String> {
    let result = build_selector(node);
    if result.is_ignored(ignore, mode) {
        tracing::debug!(
            "Ignoring <{}> ({:?} selector {})",
            node.tag(),
            result.kind,
            result.specific
        );
        return None;
    }
    Some(result.render(style))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn defaults() -> Vec<String> {
        vec!["html".to_string(), "body".to_string()]
    }

    fn specific(node: &NodeSnapshot, ignore: &[String], mode: IgnoreMatch) -> Option<String> {
        resolve_selector(node, ignore, mode, SelectorStyle::Specific)
    }

    #[test]
    fn test_id_takes_priority() {
        let node = NodeSnapshot::new("BUTTON")
            .with_parent("FORM")
            .with_attr("class", "primary")
            .with_attr("id", "submit");
        let result = build_selector(&node);
        assert_eq!(result.kind, SelectorKind::Id);
        assert_eq!(result.short.as_deref(), Some("#submit"));
        assert_eq!(result.specific, "form > button#submit");
    }

    #[test]
    fn test_empty_id_falls_through_to_class() {
        let node = NodeSnapshot::new("div")
            .with_parent("main")
            .with_attr("id", "")
            .with_attr("class", "card");
        let result = build_selector(&node);
        assert_eq!(result.kind, SelectorKind::Class);
        assert_eq!(result.short.as_deref(), Some(".card"));
        assert_eq!(result.specific, "main > div.card");
    }

    #[test]
    fn test_first_non_empty_attribute_in_order() {
        let node = NodeSnapshot::new("a")
            .with_parent("nav")
            .with_attr("title", "")
            .with_attr("href", "/home")
            .with_attr("rel", "next");
        let result = build_selector(&node);
        assert_eq!(result.kind, SelectorKind::Attribute);
        assert_eq!(result.short, None);
        assert_eq!(result.specific, "nav > a[href=\"/home\"]");
    }

    #[test]
    fn test_tag_fallback_when_attributes_empty() {
        let node = NodeSnapshot::new("span")
            .with_parent("p")
            .with_attr("title", "");
        let result = build_selector(&node);
        assert_eq!(result.kind, SelectorKind::Tag);
        assert_eq!(result.short, None);
        assert_eq!(result.specific, "p > span");
    }

    #[test]
    fn test_missing_parent_drops_combinator() {
        let result = build_selector(&NodeSnapshot::new("html"));
        assert_eq!(result.specific, "html");
    }

    #[test]
    fn test_ignored_short_selector_resolves_to_none() {
        let node = NodeSnapshot::new("div")
            .with_parent("body")
            .with_attr("id", "overlay");
        let ignore = vec!["#overlay".to_string()];
        assert_eq!(specific(&node, &ignore, IgnoreMatch::Short), None);
    }

    #[test]
    fn test_default_ignore_list_excludes_root_tags() {
        let body = NodeSnapshot::new("BODY").with_parent("html");
        assert_eq!(specific(&body, &defaults(), IgnoreMatch::Short), None);

        let div = NodeSnapshot::new("div").with_parent("body");
        assert_eq!(
            specific(&div, &defaults(), IgnoreMatch::Short).as_deref(),
            Some("body > div")
        );
    }

    #[test]
    fn test_body_with_id_is_not_ignored_by_tag() {
        let body = NodeSnapshot::new("body")
            .with_parent("html")
            .with_attr("id", "app");
        assert_eq!(
            specific(&body, &defaults(), IgnoreMatch::Short).as_deref(),
            Some("html > body#app")
        );
    }

    #[test]
    fn test_short_style_prefers_id_and_class() {
        let button = NodeSnapshot::new("button")
            .with_parent("form")
            .with_attr("id", "submit");
        assert_eq!(
            resolve_selector(&button, &defaults(), IgnoreMatch::Short, SelectorStyle::Short)
                .as_deref(),
            Some("#submit")
        );

        let link = NodeSnapshot::new("a").with_parent("nav").with_attr("href", "/x");
        assert_eq!(
            resolve_selector(&link, &defaults(), IgnoreMatch::Short, SelectorStyle::Short)
                .as_deref(),
            Some("nav > a[href=\"/x\"]")
        );
    }

    #[test]
    fn test_specific_form_only_ignored_in_any_mode() {
        let node = NodeSnapshot::new("a")
            .with_parent("nav")
            .with_attr("href", "/x");
        let ignore = vec!["nav > a[href=\"/x\"]".to_string()];
        assert!(specific(&node, &ignore, IgnoreMatch::Short).is_some());
        assert_eq!(specific(&node, &ignore, IgnoreMatch::Any), None);
    }
}
