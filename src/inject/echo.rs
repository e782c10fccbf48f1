//! Injector that writes typed text to a byte sink, standard output by default.

use crate::error::{BlinkError, Result};
use crate::inject::{KeystrokeInjector, OutputAction, Session};
use async_trait::async_trait;
use std::io::Write;

/// Echoes keystrokes as text. Backspace is rendered as an erase sequence so a terminal shows
/// the composed line correctly; caps-lock has no textual form and is skipped.
pub struct EchoInjector<W: Write + Send> {
    sink: W,
}

impl EchoInjector<std::io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(std::io::stdout())
    }
}

impl<W: Write + Send> EchoInjector<W> {
    pub fn new(sink: W) -> Self {
        Self { sink }
    }

    pub fn into_inner(self) -> W {
        self.sink
    }

    fn emit(&mut self, bytes: &[u8]) -> Result<()> {
        self.sink
            .write_all(bytes)
            .and_then(|_| self.sink.flush())
            .map_err(|err| BlinkError::injection(format!("echo write failed: {err}")))
    }
}

#[async_trait]
impl<W: Write + Send> KeystrokeInjector for EchoInjector<W> {
    async fn inject_char(&mut self, _session: &Session, ch: char) -> Result<()> {
        let mut buf = [0u8; 4];
        self.emit(ch.encode_utf8(&mut buf).as_bytes())
    }

    async fn inject_action(&mut self, _session: &Session, action: OutputAction) -> Result<()> {
        match action {
            OutputAction::Space => self.emit(b" "),
            OutputAction::Backspace => self.emit(b"\x08 \x08"),
            OutputAction::Enter => self.emit(b"\n"),
            OutputAction::CapsLockToggle => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn echoes_characters_and_actions() {
        let session = Session::default();
        let mut injector = EchoInjector::new(Vec::new());

        injector.inject_char(&session, 'H').await.unwrap();
        injector
            .inject_action(&session, OutputAction::Space)
            .await
            .unwrap();
        injector
            .inject_action(&session, OutputAction::CapsLockToggle)
            .await
            .unwrap();
        injector
            .inject_action(&session, OutputAction::Backspace)
            .await
            .unwrap();

        assert_eq!(injector.into_inner(), b"H \x08 \x08");
    }
}
