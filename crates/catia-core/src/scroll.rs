//! Scroll bucketing and the per-frame sampling gate.
//!
//! Each axis is split at its quarter point. Positions in `[quarter, max)`
//! read as scrolling forward (down/right), positions in `(0, quarter)` as
//! scrolling back (up/left). The two ends of the range emit nothing.
//!
//! ```text
//!  0        max/4                         max
//!  |--back---|--------forward--------------|
//! ```

use serde::{Deserialize, Serialize};

use crate::action::ActionToken;

/// Scroll offsets sampled from the host.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScrollSample {
    #[serde(default)]
    pub scroll_x: i64,
    #[serde(default)]
    pub scroll_y: i64,
    #[serde(default)]
    pub max_x: i64,
    #[serde(default)]
    pub max_y: i64,
}

fn bucket_axis(
    position: i64,
    max: i64,
    back: ActionToken,
    forward: ActionToken,
) -> Option<ActionToken> {
    let quarter = max / 4;
    if position < max && position >= quarter {
        Some(forward)
    } else if position > 0 && position < quarter {
        Some(back)
    } else {
        None
    }
}

/// Directional tokens for one sample. The vertical axis comes first.
pub fn bucket(sample: &ScrollSample) -> Vec<ActionToken> {
    [
        bucket_axis(
            sample.scroll_y,
            sample.max_y,
            ActionToken::ScrollUp,
            ActionToken::ScrollDown,
        ),
        bucket_axis(
            sample.scroll_x,
            sample.max_x,
            ActionToken::ScrollLeft,
            ActionToken::ScrollRight,
        ),
    ]
    .into_iter()
    .flatten()
    .collect()
}

/// Allows at most one bucketing pass per animation frame.
///
/// Every scroll notification overwrites the pending sample; only the first
/// one in a frame schedules a pass. The flag clears when the pass runs.
#[derive(Debug, Default)]
pub struct FrameGate {
    ticking: bool,
    latest: Option<ScrollSample>,
}

impl FrameGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a sample. Returns true when this call scheduled a new pass.
    pub fn offer(&mut self, sample: ScrollSample) -> bool {
        self.latest = Some(sample);
        if self.ticking {
            return false;
        }
        self.ticking = true;
        true
    }

    /// Run the scheduled pass, if any, returning the sample to bucket.
    pub fn on_frame(&mut self) -> Option<ScrollSample> {
        if !self.ticking {
            return None;
        }
        self.ticking = false;
        self.latest.take()
    }

    pub fn is_pending(&self) -> bool {
        self.ticking
    }
}
