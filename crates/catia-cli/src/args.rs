//! CLI argument parsing with clap derive macros.

use std::path::PathBuf;

use catia_core::options::CaptureOptions;
use catia_core::selector::{IgnoreMatch, SelectorStyle};
use clap::{Parser, Subcommand, ValueEnum};

const FILE_HELP: &str = "Input file, one entry per line [default: stdin]";

/// Capture browser interactions as a replayable action log.
///
/// Reads the JSON-line interaction stream produced by a host adapter and
/// prints normalized log entries. The log can then be translated into
/// Cypress statements or mashed into compact `input` entries.
#[derive(Debug, Parser)]
#[command(name = "catia", version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Record an interaction stream into an action log
    #[command(after_help = "\
Examples:
  catia record events.jsonl                 # Replay a captured stream
  adapter | catia record --live             # Record from a live adapter
  catia record --capture-hover events.jsonl # Also log hover actions
  catia record --show-wait --wait-timeout 2000 events.jsonl
  catia record --config ./catia.json events.jsonl

Config file lookup: --config, then $CATIA_CONFIG, then ~/.catia/config.json.
Flags given on the command line override the file.")]
    Record(RecordArgs),

    /// Translate a log into Cypress statements
    #[command(after_help = "\
Examples:
  catia translate actions.log               # One statement per supported line
  catia record events.jsonl | jq -r '.actions[]' | catia translate")]
    Translate(TranslateArgs),

    /// Fold consecutive keystroke entries into single input entries
    #[command(after_help = "\
Examples:
  catia mash actions.log                    # 'type h', 'type i' -> 'input hi'
  catia mash --keyword press actions.log    # Fold 'press' runs instead")]
    Mash(MashArgs),

    /// Show an end-to-end usage example
    Examples,
}

#[derive(Debug, clap::Args)]
pub struct RecordArgs {
    #[arg(help = FILE_HELP)]
    pub file: Option<PathBuf>,

    /// JSON file with capture options (camelCase keys)
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Drive the wait timer from the wall clock instead of `at` fields
    #[arg(long)]
    pub live: bool,

    /// Log hover actions
    #[arg(long)]
    pub capture_hover: bool,

    /// Log focus on previously hovered elements
    #[arg(long)]
    pub capture_focus_on_click: bool,

    /// Log scroll direction changes
    #[arg(long)]
    pub capture_scroll: bool,

    /// Log a typed space by its key code
    #[arg(long)]
    pub capture_space_press: bool,

    /// Keep consecutive duplicate entries
    #[arg(long)]
    pub register_multiple_times: bool,

    /// Log periodic wait entries while idle
    #[arg(long)]
    pub show_wait: bool,

    /// Delay before the first wait entry (milliseconds)
    #[arg(long, value_name = "MS")]
    pub wait_timeout: Option<u64>,

    /// Log keys typed into password inputs
    #[arg(long)]
    pub allow_password_input: bool,

    /// Selector or tag to ignore (repeatable, replaces the configured list)
    #[arg(long = "ignore", value_name = "SELECTOR")]
    pub ignore_nodes: Vec<String>,

    /// How the ignore list is matched
    #[arg(long, value_enum)]
    pub ignore_match: Option<IgnoreMatchArg>,

    /// Which selector form is logged
    #[arg(long, value_enum)]
    pub selector_style: Option<SelectorStyleArg>,
}

impl RecordArgs {
    /// Overlay flags given on the command line onto `options`.
    ///
    /// Boolean flags can only switch a capture on; an option enabled in the
    /// config file stays enabled.
    pub fn apply(&self, options: &mut CaptureOptions) {
        options.capture_hover |= self.capture_hover;
        options.capture_focus_on_click |= self.capture_focus_on_click;
        options.capture_scroll |= self.capture_scroll;
        options.capture_space_press |= self.capture_space_press;
        options.register_multiple_times |= self.register_multiple_times;
        options.show_wait |= self.show_wait;
        options.allow_password_input |= self.allow_password_input;

        if let Some(timeout) = self.wait_timeout {
            options.wait_timeout = timeout;
        }
        if !self.ignore_nodes.is_empty() {
            options.ignore_nodes = self.ignore_nodes.clone();
        }
        if let Some(mode) = self.ignore_match {
            options.ignore_match = mode.into();
        }
        if let Some(style) = self.selector_style {
            options.selector_style = style.into();
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum IgnoreMatchArg {
    /// Compare only `#id`, `.class` or the bare tag
    Short,
    /// Also compare the parent-anchored selector
    Any,
}

impl From<IgnoreMatchArg> for IgnoreMatch {
    fn from(arg: IgnoreMatchArg) -> Self {
        match arg {
            IgnoreMatchArg::Short => IgnoreMatch::Short,
            IgnoreMatchArg::Any => IgnoreMatch::Any,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum SelectorStyleArg {
    /// `#id` or `.class` when available
    Short,
    /// Always `parent > tag...`
    Specific,
}

impl From<SelectorStyleArg> for SelectorStyle {
    fn from(arg: SelectorStyleArg) -> Self {
        match arg {
            SelectorStyleArg::Short => SelectorStyle::Short,
            SelectorStyleArg::Specific => SelectorStyle::Specific,
        }
    }
}

#[derive(Debug, clap::Args)]
pub struct TranslateArgs {
    #[arg(help = FILE_HELP)]
    pub file: Option<PathBuf>,
}

#[derive(Debug, clap::Args)]
pub struct MashArgs {
    #[arg(help = FILE_HELP)]
    pub file: Option<PathBuf>,

    /// Verb whose consecutive entries are folded
    #[arg(short, long, default_value = "type")]
    pub keyword: String,
}

/// End-to-end example text for the `examples` command.
pub const EXAMPLES_TEXT: &str = r#"End-to-end example: record a login and turn it into a Cypress test

# 1. Write the interaction stream (normally produced by a host adapter)
cat > /tmp/login.jsonl <<'EOF'
{"at":0,"event":"load","location":"http://localhost:3000/login"}
{"at":400,"event":"click","target":{"name":"INPUT","parentName":"FORM","attributes":{"id":"user"}}}
{"at":600,"event":"keydown","target":{"name":"INPUT","attributes":{"id":"user"}},"key":"b","code":"KeyB"}
{"at":700,"event":"keydown","target":{"name":"INPUT","attributes":{"id":"user"}},"key":"o","code":"KeyO"}
{"at":800,"event":"keydown","target":{"name":"INPUT","attributes":{"id":"user"}},"key":"b","code":"KeyB"}
{"at":1500,"event":"click","target":{"name":"BUTTON","parentName":"FORM","attributes":{"class":"submit"}}}
EOF

# 2. Record it; the last line is the session summary
catia record /tmp/login.jsonl | tail -n 1 | jq -r '.actions[]' > /tmp/login.log

# 3. Fold the keystrokes
catia mash /tmp/login.log
#   visit http://localhost:3000/login
#   click $ #user
#   input bob
#   click $ .submit

# 4. Generate Cypress statements
catia translate /tmp/login.log
"#;
