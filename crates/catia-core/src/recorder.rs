//! The capture session.
//!
//! A [`Recorder`] owns everything one capture session needs: the action
//! log, the duplicate register, the observers, the scroll frame gate and the
//! wait timer. The host adapter feeds it [`InteractionEvent`]s one at a time
//! and every event is handled to completion before the call returns.
//!
//! ```
//! use catia_core::node::NodeSnapshot;
//! use catia_core::protocol::InteractionEvent;
//! use catia_core::recorder::Recorder;
//!
//! let mut recorder = Recorder::default();
//! recorder.begin();
//! recorder.handle(&InteractionEvent::Load { location: "http://example.com".into() });
//! recorder.handle(&InteractionEvent::Click {
//!     target: NodeSnapshot::new("BUTTON").with_attr("id", "submit"),
//! });
//! assert_eq!(recorder.actions(), ["visit http://example.com", "click $ #submit"]);
//! ```

use std::collections::HashSet;

use tracing::{debug, info, warn};

use crate::action::ActionToken;
use crate::keys::{self, KeyOptions, TAB_KEY_CODE};
use crate::log::ActionLog;
use crate::node::NodeSnapshot;
use crate::options::CaptureOptions;
use crate::protocol::{InteractionEvent, Notification};
use crate::scroll::{self, FrameGate, ScrollSample};
use crate::selector::resolve_selector;
use crate::wait::WaitTimer;

/// Fallback target for context menus raised outside any element.
const DOCUMENT_TARGET: &str = "document";

/// Receives a notification after every appended log entry.
pub trait ActionObserver {
    fn notify(&mut self, notification: &Notification<'_>);
}

impl<F> ActionObserver for F
where
    F: FnMut(&Notification<'_>),
{
    fn notify(&mut self, notification: &Notification<'_>) {
        self(notification)
    }
}

/// One capture session.
pub struct Recorder {
    options: CaptureOptions,
    log: ActionLog,
    observers: Vec<Box<dyn ActionObserver>>,
    gate: FrameGate,
    wait: WaitTimer,
    /// Selectors of elements resolved on hover; focus and color input are
    /// only captured for these.
    armed: HashSet<String>,
    now_ms: u64,
    started: bool,
}

impl Default for Recorder {
    fn default() -> Self {
        Self::new(CaptureOptions::default())
    }
}

impl Recorder {
    pub fn new(options: CaptureOptions) -> Self {
        Self {
            options,
            log: ActionLog::new(),
            observers: Vec::new(),
            gate: FrameGate::new(),
            wait: WaitTimer::new(),
            armed: HashSet::new(),
            now_ms: 0,
            started: false,
        }
    }

    /// Create a session with observers registered up front.
    pub fn with_observers(
        options: CaptureOptions,
        observers: Vec<Box<dyn ActionObserver>>,
    ) -> Self {
        Self {
            observers,
            ..Self::new(options)
        }
    }

    pub fn subscribe(&mut self, observer: impl ActionObserver + 'static) {
        self.observers.push(Box::new(observer));
    }

    /// Start capturing. Events handled before this are dropped.
    pub fn begin(&mut self) {
        if self.started {
            warn!("Capture already started, ignoring repeated begin");
            return;
        }
        self.started = true;
        info!("Capturing actions");
    }

    pub fn actions(&self) -> &[String] {
        self.log.entries()
    }

    /// End the session and return its log.
    pub fn finish(self) -> Vec<String> {
        info!("Capture finished with {} action(s)", self.log.len());
        self.log.into_entries()
    }

    /// Advance the session clock to `elapsed_ms` and emit any due `wait`
    /// entries. The clock never moves backwards.
    pub fn advance_to(&mut self, elapsed_ms: u64) {
        self.now_ms = self.now_ms.max(elapsed_ms);
        if !self.started {
            return;
        }
        for count in self.wait.fire_due(self.now_ms) {
            self.log_action(ActionToken::Wait, &[&count.to_string()]);
        }
    }

    /// Compose, deduplicate, append and notify.
    pub fn log_action(&mut self, token: ActionToken, parts: &[&str]) {
        let captured = token.capture(parts);
        if !self
            .log
            .record(&captured, self.options.register_multiple_times)
        {
            debug!("Suppressed repeated action: {}", captured.rendered);
            return;
        }

        debug!("Captured: {}", captured.rendered);
        let notification = Notification {
            actions: self.log.entries(),
            last_action: &captured.rendered,
        };
        for observer in &mut self.observers {
            observer.notify(&notification);
        }
    }

    fn selector_for(&self, target: &NodeSnapshot) -> Option<String> {
        resolve_selector(
            target,
            &self.options.ignore_nodes,
            self.options.ignore_match,
            self.options.selector_style,
        )
    }

    /// Handle one interaction.
    pub fn handle(&mut self, event: &InteractionEvent) {
        if !self.started {
            debug!("Capture not started, dropping {:?}", event);
            return;
        }

        if event.is_user_interaction() {
            self.wait.reset_count();
        }

        match event {
            InteractionEvent::Load { location } => self.on_load(location),
            InteractionEvent::MouseOver { target } => self.on_mouse_over(target),
            InteractionEvent::Focus { target } => self.on_focus(target),
            InteractionEvent::Input { target, value } => self.on_input(target, value.as_deref()),
            InteractionEvent::Click { target } => {
                self.on_target(ActionToken::Click, target);
            }
            InteractionEvent::DoubleClick { target } => {
                self.on_target(ActionToken::DoubleClick, target);
            }
            InteractionEvent::KeyDown {
                target,
                key,
                code,
                key_code,
            } => self.on_key_down(target, key.as_deref(), code.as_deref(), *key_code),
            InteractionEvent::ContextMenu { target } => self.on_context_menu(target.as_ref()),
            InteractionEvent::Scroll(sample) => self.on_scroll(*sample),
            InteractionEvent::AnimationFrame => self.on_frame(),
            InteractionEvent::SelectStart | InteractionEvent::Select => {
                self.log_action(ActionToken::Select, &[]);
            }
            InteractionEvent::Copy => self.log_action(ActionToken::Copy, &[]),
            InteractionEvent::Paste => self.log_action(ActionToken::Paste, &[]),
            InteractionEvent::Cut => self.log_action(ActionToken::Cut, &[]),
        }
    }

    fn on_load(&mut self, location: &str) {
        self.log_action(ActionToken::Visit, &[location]);
        if self.options.show_wait && !self.wait.is_armed() {
            self.wait.arm(self.now_ms, self.options.wait_timeout);
            debug!(
                "Wait timer armed, first tick in {} ms",
                self.options.wait_timeout
            );
        }
    }

    fn on_mouse_over(&mut self, target: &NodeSnapshot) {
        let Some(selector) = self.selector_for(target) else {
            return;
        };
        if self.options.capture_hover {
            self.log_action(ActionToken::Hover, &[&selector]);
        }
        self.armed.insert(selector);
    }

    fn on_focus(&mut self, target: &NodeSnapshot) {
        if !self.options.capture_focus_on_click || !target.is_focusable() {
            return;
        }
        if let Some(selector) = self.armed_selector(target) {
            self.log_action(ActionToken::Focus, &[&selector]);
        }
    }

    fn on_input(&mut self, target: &NodeSnapshot, value: Option<&str>) {
        if target.input_type().as_deref() != Some("color") {
            return;
        }
        if self.armed_selector(target).is_none() {
            return;
        }
        let value = value.or(target.value.as_deref()).unwrap_or_default();
        self.log_action(ActionToken::Input, &[value]);
    }

    fn armed_selector(&self, target: &NodeSnapshot) -> Option<String> {
        self.selector_for(target)
            .filter(|selector| self.armed.contains(selector))
    }

    fn on_target(&mut self, token: ActionToken, target: &NodeSnapshot) {
        if let Some(selector) = self.selector_for(target) {
            self.log_action(token, &[&selector]);
        }
    }

    fn on_key_down(
        &mut self,
        target: &NodeSnapshot,
        key: Option<&str>,
        code: Option<&str>,
        key_code: Option<u32>,
    ) {
        if key_code == Some(TAB_KEY_CODE) {
            self.on_target(ActionToken::Focus, target);
        }

        if target.is_password() && !self.options.allow_password_input {
            debug!("Skipping key on password input");
            return;
        }

        let options = KeyOptions {
            capture_space_press: self.options.capture_space_press,
            type_digits: target.is_editable(),
        };
        let typed = keys::classify(key, code, target, options);
        if !typed.value.is_empty() {
            self.log_action(typed.token, &[&typed.value]);
        }
    }

    fn on_context_menu(&mut self, target: Option<&NodeSnapshot>) {
        let selector = target
            .and_then(|t| self.selector_for(t))
            .unwrap_or_else(|| DOCUMENT_TARGET.to_string());
        self.log_action(ActionToken::RightClick, &[&selector]);
    }

    fn on_scroll(&mut self, sample: ScrollSample) {
        if !self.options.capture_scroll {
            return;
        }
        if self.gate.offer(sample) {
            debug!("Scroll pass scheduled for next frame");
        }
    }

    fn on_frame(&mut self) {
        let Some(sample) = self.gate.on_frame() else {
            return;
        };
        for token in scroll::bucket(&sample) {
            self.log_action(token, &[]);
        }
    }
}
