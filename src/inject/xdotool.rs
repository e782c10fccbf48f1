//! X11 keystroke injection through the `xdotool` command line tool.
//!
//! Each injected key spawns one `xdotool` process. When the session names a target window,
//! the window is activated first so the keystroke lands there regardless of focus changes.

use crate::error::{BlinkError, Result};
use crate::inject::{KeystrokeInjector, OutputAction, ResolvedOutput, Session};
use async_trait::async_trait;
use tokio::process::Command;

const DEFAULT_PROGRAM: &str = "xdotool";

/// Keysym names understood by `xdotool key`.
fn keysym(action: OutputAction) -> &'static str {
    match action {
        OutputAction::Space => "space",
        OutputAction::Backspace => "BackSpace",
        OutputAction::Enter => "Return",
        OutputAction::CapsLockToggle => "Caps_Lock",
    }
}

/// Build the `xdotool` argument list for one output.
///
/// Characters arrive with their case already resolved, so `type` runs with
/// `--clearmodifiers`: an active Caps Lock is released while typing and restored afterwards.
pub fn xdotool_args(session: &Session, output: ResolvedOutput) -> Vec<String> {
    let mut args = Vec::with_capacity(7);

    if let Some(window) = &session.target_window {
        args.extend(["windowactivate", "--sync", window.as_str()].map(String::from));
    }

    match output {
        ResolvedOutput::Char(ch) => {
            args.extend(["type", "--clearmodifiers", "--"].map(String::from));
            args.push(ch.to_string());
        }
        ResolvedOutput::Action(action) => {
            args.extend(["key", keysym(action)].map(String::from));
        }
    }

    args
}

/// Injector backed by the `xdotool` executable.
#[derive(Debug, Clone)]
pub struct XdotoolInjector {
    program: String,
}

impl XdotoolInjector {
    pub fn new() -> Self {
        Self::with_program(DEFAULT_PROGRAM)
    }

    /// Use a different executable, e.g. an absolute path or a wrapper script.
    pub fn with_program(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }

    async fn run(&self, args: Vec<String>) -> Result<()> {
        log::debug!("{} {}", self.program, args.join(" "));
        let status = Command::new(&self.program)
            .args(&args)
            .status()
            .await
            .map_err(|err| {
                BlinkError::injection(format!("failed to spawn {}: {err}", self.program))
            })?;

        if status.success() {
            Ok(())
        } else {
            Err(BlinkError::injection(format!(
                "{} exited with {status}",
                self.program
            )))
        }
    }
}

impl Default for XdotoolInjector {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl KeystrokeInjector for XdotoolInjector {
    async fn inject_char(&mut self, session: &Session, ch: char) -> Result<()> {
        self.run(xdotool_args(session, ResolvedOutput::Char(ch))).await
    }

    async fn inject_action(&mut self, session: &Session, action: OutputAction) -> Result<()> {
        self.run(xdotool_args(session, ResolvedOutput::Action(action)))
            .await
    }
}

/// Ask X11 for the currently focused window id.
pub async fn active_window() -> Result<String> {
    let output = Command::new(DEFAULT_PROGRAM)
        .arg("getactivewindow")
        .output()
        .await
        .map_err(|err| BlinkError::injection(format!("failed to spawn xdotool: {err}")))?;

    if !output.status.success() {
        return Err(BlinkError::injection(format!(
            "xdotool getactivewindow exited with {}",
            output.status
        )));
    }

    let window = String::from_utf8_lossy(&output.stdout).trim().to_string();
    if window.is_empty() {
        return Err(BlinkError::injection("no active window reported"));
    }
    Ok(window)
}
