//! Core types and logic for catia.
//!
//! This crate turns a stream of browser interactions into a normalized,
//! replayable action log. It performs no I/O: a host adapter delivers
//! [`protocol::InteractionEvent`]s and the [`recorder::Recorder`] answers
//! with log entries and observer notifications.
//!
//! # Modules
//!
//! - [`node`]: snapshots of event targets
//! - [`selector`]: ranked selector derivation and ignore filtering
//! - [`action`]: action tokens and their rendered form
//! - [`keys`]: type vs press classification
//! - [`scroll`]: scroll bucketing and the per-frame gate
//! - [`wait`]: the idle `wait` timer
//! - [`log`]: the action log with consecutive-duplicate suppression
//! - [`recorder`]: the capture session tying the above together
//! - [`options`]: capture options
//! - [`protocol`]: JSON-line event stream and notification payload
//! - [`translate`]: log lines to Cypress statements
//! - [`mash`]: folding keystroke runs into `input` entries
//! - [`error`]: API error types with actionable suggestions
//!
//! # Log Grammar
//!
//! | Form | Tokens |
//! |------|--------|
//! | `<verb> $ <selector>` | click, double click, right click, hoverover, focus |
//! | `<verb> <value>` | type, press, wait, input, visit |
//! | `<verb>` | scroll up/down/left/right, copy, paste, cut, select |

pub mod action;
pub mod error;
pub mod keys;
pub mod log;
pub mod mash;
pub mod node;
pub mod options;
pub mod protocol;
pub mod recorder;
pub mod scroll;
pub mod selector;
pub mod translate;
pub mod wait;
