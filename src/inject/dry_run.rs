use crate::error::Result;
use crate::inject::{KeystrokeInjector, OutputAction, ResolvedOutput, Session};
use async_trait::async_trait;

/// Injector that only logs, for trying out a sensor without typing anywhere.
#[derive(Debug, Clone, Copy, Default)]
pub struct DryRunInjector;

#[async_trait]
impl KeystrokeInjector for DryRunInjector {
    async fn inject_char(&mut self, session: &Session, ch: char) -> Result<()> {
        log::info!(
            "dry-run: would type {} into {:?}",
            ResolvedOutput::Char(ch),
            session.target_window
        );
        Ok(())
    }

    async fn inject_action(&mut self, session: &Session, action: OutputAction) -> Result<()> {
        log::info!(
            "dry-run: would press {} in {:?}",
            ResolvedOutput::Action(action),
            session.target_window
        );
        Ok(())
    }
}
