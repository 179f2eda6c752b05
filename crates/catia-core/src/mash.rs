//! Folding runs of keystroke entries into single `input` entries.

use tracing::debug;

use crate::action::{ActionToken, CapturedAction};

/// Fold each run of consecutive entries whose verb is `keyword` into one
/// `input <joined>` entry, where `<joined>` concatenates their values with
/// all whitespace removed. Other entries pass through in order.
///
/// `keyword` names a token by verb or name. An unknown keyword leaves the
/// log unchanged.
///
/// ```
/// use catia_core::mash::mash_by_keyword;
///
/// let log = ["type h", "type i", "press Enter"];
/// assert_eq!(mash_by_keyword(&log, "type"), ["input hi", "press Enter"]);
/// ```
pub fn mash_by_keyword<S: AsRef<str>>(entries: &[S], keyword: &str) -> Vec<String> {
    let Ok(keyword) = keyword.parse::<ActionToken>() else {
        debug!("Not an action keyword: {:?}", keyword);
        return entries.iter().map(|e| e.as_ref().to_string()).collect();
    };

    let mut mashed = Vec::with_capacity(entries.len());
    let mut run: Option<String> = None;

    for entry in entries {
        let entry = entry.as_ref();
        match CapturedAction::parse(entry).filter(|action| action.token == keyword) {
            Some(action) => {
                let value = action.payload();
                let joined = run.get_or_insert_with(String::new);
                joined.extend(value.chars().filter(|c| !c.is_whitespace()));
            }
            None => {
                if let Some(joined) = run.take() {
                    mashed.push(folded(&joined));
                }
                mashed.push(entry.to_string());
            }
        }
    }
    if let Some(joined) = run {
        mashed.push(folded(&joined));
    }
    mashed
}

fn folded(joined: &str) -> String {
    ActionToken::Input.capture(&[joined]).rendered
}
