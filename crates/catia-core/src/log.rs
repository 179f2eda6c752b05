//! The ordered action log and its duplicate register.

use crate::action::CapturedAction;

/// Append-only sequence of rendered actions.
///
/// Consecutive identical entries are suppressed unless the token is
/// dedup-exempt or the caller asks for multiplicity. The register holding
/// the last rendered string advances on every call, appended or not.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ActionLog {
    entries: Vec<String>,
    last_rendered: String,
}

impl ActionLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `action`. Returns true when it was appended.
    pub fn record(&mut self, action: &CapturedAction, register_multiple_times: bool) -> bool {
        let can_dispatch = action.rendered != self.last_rendered
            || action.token.is_dedup_exempt()
            || register_multiple_times;

        if can_dispatch {
            self.entries.push(action.rendered.clone());
        }
        self.last_rendered.clone_from(&action.rendered);
        can_dispatch
    }

    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn into_entries(self) -> Vec<String> {
        self.entries
    }
}
