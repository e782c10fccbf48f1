//! Console feedback for the person operating the sensor.
//!
//! After every processed event a status line shows what is highlighted; commits additionally
//! report what was typed. The composed text is tracked in a [`Transcript`] so the current line
//! can be shown while typing.

use crate::inject::{OutputAction, ResolvedOutput};
use crate::scan::{ScanMode, ScanStateMachine, Transition};
use std::io::Write;

/// Text composed so far on the current line.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Transcript {
    line: String,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn line(&self) -> &str {
        &self.line
    }

    /// Apply a committed output. Returns the finished line when `Enter` completes it.
    pub fn apply(&mut self, output: ResolvedOutput) -> Option<String> {
        match output {
            ResolvedOutput::Char(ch) => self.line.push(ch),
            ResolvedOutput::Action(OutputAction::Space) => self.line.push(' '),
            ResolvedOutput::Action(OutputAction::Backspace) => {
                self.line.pop();
            }
            ResolvedOutput::Action(OutputAction::Enter) => {
                return Some(std::mem::take(&mut self.line));
            }
            ResolvedOutput::Action(OutputAction::CapsLockToggle) => {}
        }
        None
    }
}

/// Human readable description of the current highlight.
pub fn describe_selection(machine: &ScanStateMachine) -> String {
    let cursor = machine.cursor();
    let row_label = machine
        .highlighted_row()
        .map(ToString::to_string)
        .unwrap_or_default();

    match cursor.mode {
        ScanMode::RowSelect => format!("Row {}: {}", cursor.row + 1, row_label),
        ScanMode::ItemSelect => match machine.highlighted_item() {
            Some(item) => format!("Row {}, key: <{}>", cursor.row + 1, item),
            None => format!("Row {}", cursor.row + 1),
        },
    }
}

/// Writes status lines to a sink, stderr by default.
pub struct FeedbackReporter {
    sink: Box<dyn Write + Send>,
    enabled: bool,
    transcript: Transcript,
}

impl FeedbackReporter {
    pub fn new(sink: Box<dyn Write + Send>, enabled: bool) -> Self {
        Self {
            sink,
            enabled,
            transcript: Transcript::new(),
        }
    }

    pub fn stderr(enabled: bool) -> Self {
        Self::new(Box::new(std::io::stderr()), enabled)
    }

    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    /// Print the startup banner.
    pub fn announce(&mut self, text: &str) {
        self.write_line(text);
    }

    /// Report the result of one event.
    pub fn report(&mut self, machine: &ScanStateMachine, transition: &Transition) {
        match transition {
            Transition::Unrecognized(code) => {
                self.write_line(&format!("Unknown blink code: {code} (ignored)"));
            }
            Transition::Committed {
                output: Some(output),
                ..
            } => {
                self.write_line(&format!("Typed: {output}"));
                if let Some(finished) = self.transcript.apply(*output) {
                    self.write_line(&format!("Final text: {finished}"));
                }
                self.write_line(&format!("Current text: {}", self.transcript.line()));
            }
            Transition::Committed { output: None, .. } => {
                let shift = if machine.modifiers().shift_active {
                    "ON"
                } else {
                    "OFF"
                };
                self.write_line(&format!("Shift mode: {shift}"));
            }
            Transition::Moved | Transition::Ignored => {}
        }

        let status = describe_selection(machine);
        self.write_line(&status);
    }

    fn write_line(&mut self, text: &str) {
        if !self.enabled {
            return;
        }
        // Feedback is best effort; a closed terminal must not stop typing.
        if let Err(err) = writeln!(self.sink, "{text}").and_then(|_| self.sink.flush()) {
            log::debug!("Feedback write failed: {err}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::{Layout, LayoutPreset};
    use crate::protocol::{BlinkEvent, ConfirmRowPolicy};
    use std::sync::{Arc, Mutex};

    #[derive(Clone, Default)]
    struct SharedBuffer(Arc<Mutex<Vec<u8>>>);

    impl Write for SharedBuffer {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    impl SharedBuffer {
        fn contents(&self) -> String {
            String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
        }
    }

    fn machine() -> ScanStateMachine {
        let layout = Arc::new(Layout::preset(LayoutPreset::Standard).unwrap());
        ScanStateMachine::new(layout, ConfirmRowPolicy::Cancel)
    }

    #[test]
    fn transcript_edits_line() {
        let mut transcript = Transcript::new();
        for output in [
            ResolvedOutput::Char('h'),
            ResolvedOutput::Char('x'),
            ResolvedOutput::Action(OutputAction::Backspace),
            ResolvedOutput::Char('i'),
            ResolvedOutput::Action(OutputAction::Space),
        ] {
            assert_eq!(transcript.apply(output), None);
        }
        assert_eq!(transcript.line(), "hi ");

        assert_eq!(
            transcript.apply(ResolvedOutput::Action(OutputAction::Enter)),
            Some("hi ".to_string())
        );
        assert_eq!(transcript.line(), "");
    }

    #[test]
    fn backspace_on_empty_line_is_harmless() {
        let mut transcript = Transcript::new();
        transcript.apply(ResolvedOutput::Action(OutputAction::Backspace));
        assert_eq!(transcript.line(), "");
    }

    #[test]
    fn describes_row_and_item_selection() {
        let mut machine = machine();
        machine.handle_event(BlinkEvent::Advance);
        assert_eq!(
            describe_selection(&machine),
            "Row 2: Q W E R T Y U I O P"
        );

        machine.handle_event(BlinkEvent::ConfirmRow);
        machine.handle_event(BlinkEvent::Advance);
        assert_eq!(describe_selection(&machine), "Row 2, key: <W>");
    }

    #[test]
    fn reports_commits_and_status() {
        let buffer = SharedBuffer::default();
        let mut reporter = FeedbackReporter::new(Box::new(buffer.clone()), true);
        let mut machine = machine();

        machine.handle_event(BlinkEvent::Advance);
        machine.handle_event(BlinkEvent::ConfirmRow);
        let transition = machine.handle_event(BlinkEvent::ConfirmItem);
        reporter.report(&machine, &transition);

        assert_eq!(
            buffer.contents(),
            "Typed: 'q'\nCurrent text: q\nRow 1: 1 2 3 4 5 6 7 8 9 0\n"
        );
        assert_eq!(reporter.transcript().line(), "q");
    }

    #[test]
    fn unknown_code_is_followed_by_status() {
        let buffer = SharedBuffer::default();
        let mut reporter = FeedbackReporter::new(Box::new(buffer.clone()), true);
        let mut machine = machine();

        let transition = machine.handle_event(BlinkEvent::Unrecognized(9));
        reporter.report(&machine, &transition);

        assert_eq!(
            buffer.contents(),
            "Unknown blink code: 9 (ignored)\nRow 1: 1 2 3 4 5 6 7 8 9 0\n"
        );
    }

    #[test]
    fn disabled_reporter_still_tracks_transcript() {
        let buffer = SharedBuffer::default();
        let mut reporter = FeedbackReporter::new(Box::new(buffer.clone()), false);
        let mut machine = machine();

        machine.handle_event(BlinkEvent::Advance);
        machine.handle_event(BlinkEvent::ConfirmRow);
        let transition = machine.handle_event(BlinkEvent::ConfirmItem);
        reporter.report(&machine, &transition);

        assert!(buffer.contents().is_empty());
        assert_eq!(reporter.transcript().line(), "q");
    }
}
