//! Keystroke injection seam.
//!
//! The scan state machine resolves commits into [`ResolvedOutput`]s; an implementation of
//! [`KeystrokeInjector`] turns them into real key presses. Every call receives the caller-owned
//! [`Session`] describing where the keystrokes should land.

pub mod dry_run;
pub mod echo;
pub mod xdotool;

use crate::error::Result;
use async_trait::async_trait;
use std::fmt;

pub use dry_run::DryRunInjector;
pub use echo::EchoInjector;
pub use xdotool::XdotoolInjector;

/// Keys that are sent as named actions rather than characters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputAction {
    Space,
    Backspace,
    Enter,
    CapsLockToggle,
}

/// The result of one commit, ready for injection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolvedOutput {
    /// A printable character with shift and case already applied.
    Char(char),
    Action(OutputAction),
}

impl fmt::Display for ResolvedOutput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResolvedOutput::Char(c) => write!(f, "'{c}'"),
            ResolvedOutput::Action(OutputAction::Space) => f.write_str("[SPACE]"),
            ResolvedOutput::Action(OutputAction::Backspace) => f.write_str("[BACKSPACE]"),
            ResolvedOutput::Action(OutputAction::Enter) => f.write_str("[ENTER]"),
            ResolvedOutput::Action(OutputAction::CapsLockToggle) => f.write_str("[CAPSLOCK]"),
        }
    }
}

/// Per-run injection context, created by the caller and passed to every injector call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    /// Window that keystrokes are directed at; `None` types into whatever has focus.
    pub target_window: Option<String>,
}

impl Session {
    pub fn new(target_window: Option<String>) -> Self {
        Self { target_window }
    }
}

/// Backend that performs OS-level keystroke injection.
///
/// Each call produces exactly one logical key press. Errors are reported to the caller, which
/// logs them and keeps scanning.
#[async_trait]
pub trait KeystrokeInjector: Send {
    /// Type one printable character, chording any modifiers it needs.
    async fn inject_char(&mut self, session: &Session, ch: char) -> Result<()>;

    /// Press one named key.
    async fn inject_action(&mut self, session: &Session, action: OutputAction) -> Result<()>;

    /// Dispatch a resolved output to the matching method.
    async fn inject(&mut self, session: &Session, output: ResolvedOutput) -> Result<()> {
        match output {
            ResolvedOutput::Char(ch) => self.inject_char(session, ch).await,
            ResolvedOutput::Action(action) => self.inject_action(session, action).await,
        }
    }
}

/// Available injector backends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
#[cfg_attr(feature = "config", derive(serde::Deserialize))]
#[cfg_attr(feature = "config", serde(rename_all = "kebab-case"))]
pub enum Backend {
    /// Send keystrokes to the X11 display through the `xdotool` command
    #[default]
    Xdotool,
    /// Write typed text to standard output
    Echo,
    /// Only log what would be typed
    DryRun,
}

/// Instantiate the injector for `backend`.
pub fn create_injector(backend: Backend) -> Box<dyn KeystrokeInjector> {
    match backend {
        Backend::Xdotool => Box::new(XdotoolInjector::new()),
        Backend::Echo => Box::new(EchoInjector::stdout()),
        Backend::DryRun => Box::new(DryRunInjector),
    }
}
