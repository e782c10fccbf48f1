//! Application orchestration layer
//!
//! Wires the input service, the scan state machine, the keystroke injector, and console
//! feedback into one single-threaded loop. Each event is fully processed, including the
//! awaited injector call, before the next chunk of bytes is read.

use crate::error::Result;
use crate::feedback::FeedbackReporter;
use crate::inject::{KeystrokeInjector, Session};
use crate::input::InputService;
use crate::layout::{Item, KeyAction, Layout};
use crate::protocol::{BlinkEvent, ConfirmRowPolicy, ProtocolVariant};
use crate::scan::{ScanStateMachine, Transition};
use std::sync::Arc;
use tokio::io::AsyncRead;

/// Counters describing a finished run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub events: u64,
    pub commits: u64,
    pub unrecognized: u64,
    pub injection_failures: u64,
}

/// Whether a committed Shift can leave the cursor on its row with no event that returns to
/// row selection. Only the four-code protocol with the `cancel` policy has such an event.
pub fn shift_can_strand(
    layout: &Layout,
    protocol: ProtocolVariant,
    confirm_row_policy: ConfirmRowPolicy,
) -> bool {
    let can_leave_item_select =
        protocol == ProtocolVariant::FourCode && confirm_row_policy == ConfirmRowPolicy::Cancel;
    !can_leave_item_select && layout.contains(Item::Action(KeyAction::ToggleShift))
}

/// Application orchestrator - owns the scanning state and dispatches commits
pub struct Application {
    input: InputService,
    machine: ScanStateMachine,
    injector: Box<dyn KeystrokeInjector>,
    feedback: FeedbackReporter,
    summary: RunSummary,
}

impl Application {
    pub fn new(
        layout: Arc<Layout>,
        protocol: ProtocolVariant,
        confirm_row_policy: ConfirmRowPolicy,
        injector: Box<dyn KeystrokeInjector>,
        feedback: FeedbackReporter,
    ) -> Self {
        if shift_can_strand(&layout, protocol, confirm_row_policy) {
            log::warn!(
                "Layout has a Shift key but {protocol:?} with {confirm_row_policy:?} cannot leave \
                 its row after Shift is committed; shifted letters will be unreachable"
            );
        }

        Self {
            input: InputService::new(protocol),
            machine: ScanStateMachine::new(layout, confirm_row_policy),
            injector,
            feedback,
            summary: RunSummary::default(),
        }
    }

    pub fn machine(&self) -> &ScanStateMachine {
        &self.machine
    }

    pub fn feedback(&self) -> &FeedbackReporter {
        &self.feedback
    }

    pub fn summary(&self) -> RunSummary {
        self.summary
    }

    /// Scan until the byte source reaches end of stream.
    pub async fn run<R>(&mut self, reader: &mut R, session: &Session) -> Result<RunSummary>
    where
        R: AsyncRead + Unpin + ?Sized,
    {
        self.feedback.announce(&format!(
            "Blink-controlled keyboard ready. Codes: {}",
            self.input.protocol().describe()
        ));
        self.feedback
            .announce(&crate::feedback::describe_selection(&self.machine));

        while let Some(events) = self.input.poll_events(reader).await? {
            for event in events {
                self.process_event(event, session).await;
            }
        }

        log::info!("Blink source closed");
        Ok(self.summary)
    }

    /// Apply one event and dispatch any resulting output.
    pub async fn process_event(&mut self, event: BlinkEvent, session: &Session) -> Transition {
        self.summary.events += 1;
        let transition = self.machine.handle_event(event);

        match transition {
            Transition::Unrecognized(_) => self.summary.unrecognized += 1,
            Transition::Committed { output, .. } => {
                self.summary.commits += 1;
                if let Some(output) = output {
                    if let Err(err) = self.injector.inject(session, output).await {
                        self.summary.injection_failures += 1;
                        log::warn!("Failed to inject {output}: {err}");
                    }
                }
            }
            Transition::Moved | Transition::Ignored => {}
        }

        self.feedback.report(&self.machine, &transition);
        transition
    }
}
