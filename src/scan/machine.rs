//! Two-level scanning state machine.
//!
//! Level one highlights a row, level two highlights an item within the confirmed row.
//! Confirming an item resolves it into a [`ResolvedOutput`] and returns the cursor to the
//! first row, except for the shift toggle which leaves the cursor where it is.
//!
//! The machine performs no I/O: the caller dispatches the output carried by
//! [`Transition::Committed`] to a keystroke injector. Identical event sequences from identical
//! starting states always produce identical transitions.

use crate::inject::{OutputAction, ResolvedOutput};
use crate::layout::{Item, KeyAction, Layout, Row};
use crate::protocol::{BlinkCode, BlinkEvent, ConfirmRowPolicy};
use crate::scan::state::{ModifierState, ScanCursor, ScanMode};
use std::sync::Arc;

/// How a committed item affects the cursor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommitKind {
    /// A typed character; consumes the shift latch.
    Character,
    /// Shift toggle; the cursor stays put.
    ModifierToggle,
    /// Named keys, literal punctuation, and caps-lock.
    Action,
}

/// Outcome of feeding one event into the machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// The cursor moved, reversed, or changed level.
    Moved,
    /// The event has no meaning in the current mode.
    Ignored,
    /// The code is outside the protocol alphabet.
    Unrecognized(BlinkCode),
    /// An item was confirmed.
    Committed {
        kind: CommitKind,
        item: Item,
        output: Option<ResolvedOutput>,
    },
}

/// Sole owner of the scan cursor and modifier latches.
#[derive(Debug, Clone)]
pub struct ScanStateMachine {
    layout: Arc<Layout>,
    cursor: ScanCursor,
    modifiers: ModifierState,
    confirm_row_policy: ConfirmRowPolicy,
}

impl ScanStateMachine {
    pub fn new(layout: Arc<Layout>, confirm_row_policy: ConfirmRowPolicy) -> Self {
        Self {
            layout,
            cursor: ScanCursor::initial(),
            modifiers: ModifierState::default(),
            confirm_row_policy,
        }
    }

    pub fn cursor(&self) -> &ScanCursor {
        &self.cursor
    }

    pub fn modifiers(&self) -> &ModifierState {
        &self.modifiers
    }

    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    /// Row under the cursor.
    pub fn highlighted_row(&self) -> Option<&Row> {
        self.layout.row(self.cursor.row)
    }

    /// Item under the cursor, only while selecting within a row.
    pub fn highlighted_item(&self) -> Option<Item> {
        match self.cursor.mode {
            ScanMode::RowSelect => None,
            ScanMode::ItemSelect => self.layout.item(self.cursor.row, self.cursor.item),
        }
    }

    /// Apply one event according to the transition table.
    pub fn handle_event(&mut self, event: BlinkEvent) -> Transition {
        let transition = match (self.cursor.mode, event) {
            (_, BlinkEvent::Unrecognized(code)) => {
                log::warn!("Unknown blink code: {code} (ignored)");
                Transition::Unrecognized(code)
            }
            (_, BlinkEvent::Reverse) => {
                self.cursor.direction = self.cursor.direction.reversed();
                log::debug!("Direction toggled to {}", self.cursor.direction);
                Transition::Moved
            }
            (ScanMode::RowSelect, BlinkEvent::Advance) => {
                let rows = self.layout.row_count();
                self.cursor.row = self.cursor.direction.step(self.cursor.row, rows);
                log::debug!("Highlighting row {}", self.cursor.row);
                Transition::Moved
            }
            (ScanMode::RowSelect, BlinkEvent::ConfirmRow | BlinkEvent::Select) => {
                self.cursor.enter_item_select();
                log::debug!("Selected row {}", self.cursor.row);
                Transition::Moved
            }
            (ScanMode::RowSelect, BlinkEvent::ConfirmItem) => Transition::Ignored,
            (ScanMode::ItemSelect, BlinkEvent::Advance) => {
                let items = self.layout.item_count(self.cursor.row);
                self.cursor.item = self.cursor.direction.step(self.cursor.item, items);
                log::debug!("Highlighting item {}", self.cursor.item);
                Transition::Moved
            }
            (ScanMode::ItemSelect, BlinkEvent::ConfirmRow) => match self.confirm_row_policy {
                ConfirmRowPolicy::Ignore => Transition::Ignored,
                ConfirmRowPolicy::Cancel => {
                    self.cursor.leave_item_select();
                    log::debug!("Cancelled back to row {}", self.cursor.row);
                    Transition::Moved
                }
            },
            (ScanMode::ItemSelect, BlinkEvent::ConfirmItem | BlinkEvent::Select) => self.commit(),
        };

        debug_assert!(self.cursor.row < self.layout.row_count());
        debug_assert!(
            self.cursor.mode == ScanMode::RowSelect
                || self.cursor.item < self.layout.item_count(self.cursor.row)
        );
        transition
    }

    fn commit(&mut self) -> Transition {
        let Some(item) = self.layout.item(self.cursor.row, self.cursor.item) else {
            // Unreachable for a validated layout.
            self.reset_cursor();
            return Transition::Ignored;
        };
        let number_row = self
            .highlighted_row()
            .is_some_and(Row::is_number_row);

        let (kind, output) = match item {
            Item::Char(letter) => {
                let ch = apply_case(letter, self.modifiers.uppercase());
                self.modifiers.shift_active = false;
                (CommitKind::Character, Some(ResolvedOutput::Char(ch)))
            }
            Item::Digit(digit) => {
                let shifted = if number_row && self.modifiers.shift_active {
                    Item::shifted_symbol(digit)
                } else {
                    None
                };
                let plain = char::from_digit(u32::from(digit), 10);
                self.modifiers.shift_active = false;
                (
                    CommitKind::Character,
                    shifted.or(plain).map(ResolvedOutput::Char),
                )
            }
            Item::Action(KeyAction::ToggleShift) => {
                self.modifiers.shift_active = !self.modifiers.shift_active;
                log::info!(
                    "Shift mode: {}",
                    if self.modifiers.shift_active { "ON" } else { "OFF" }
                );
                (CommitKind::ModifierToggle, None)
            }
            Item::Action(KeyAction::ToggleCapsLock) => {
                self.modifiers.caps_lock = !self.modifiers.caps_lock;
                log::info!(
                    "CapsLock: {}",
                    if self.modifiers.caps_lock { "ON" } else { "OFF" }
                );
                (
                    CommitKind::Action,
                    Some(ResolvedOutput::Action(OutputAction::CapsLockToggle)),
                )
            }
            Item::Action(KeyAction::Space) => (
                CommitKind::Action,
                Some(ResolvedOutput::Action(OutputAction::Space)),
            ),
            Item::Action(KeyAction::Backspace) => (
                CommitKind::Action,
                Some(ResolvedOutput::Action(OutputAction::Backspace)),
            ),
            Item::Action(KeyAction::Enter) => (
                CommitKind::Action,
                Some(ResolvedOutput::Action(OutputAction::Enter)),
            ),
            Item::Action(KeyAction::Literal(ch)) => {
                (CommitKind::Action, Some(ResolvedOutput::Char(ch)))
            }
        };

        if kind != CommitKind::ModifierToggle {
            self.reset_cursor();
        }

        if let Some(output) = output {
            log::info!("Typed: {output}");
        }

        Transition::Committed { kind, item, output }
    }

    fn reset_cursor(&mut self) {
        self.cursor = ScanCursor::initial();
    }
}

fn apply_case(letter: char, uppercase: bool) -> char {
    let mut converted: Box<dyn Iterator<Item = char>> = if uppercase {
        Box::new(letter.to_uppercase())
    } else {
        Box::new(letter.to_lowercase())
    };
    match (converted.next(), converted.next()) {
        (Some(single), None) => single,
        // Multi-character case mappings have no single keystroke; keep the layout glyph.
        _ => letter,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::{LayoutPreset, Row};
    use crate::scan::state::ScanDirection;

    fn abc_def() -> Arc<Layout> {
        Arc::new(
            Layout::new(vec![
                Row::from_chars("ABC").unwrap(),
                Row::from_chars("DEF").unwrap(),
            ])
            .unwrap(),
        )
    }

    fn standard(policy: ConfirmRowPolicy) -> ScanStateMachine {
        let layout = Arc::new(Layout::preset(LayoutPreset::Standard).unwrap());
        ScanStateMachine::new(layout, policy)
    }

    fn feed(machine: &mut ScanStateMachine, events: &[BlinkEvent]) -> Vec<Transition> {
        events.iter().map(|&e| machine.handle_event(e)).collect()
    }

    /// Walk to `(row, item)` from the initial cursor and enter item select.
    fn select(machine: &mut ScanStateMachine, row: usize, item: usize) {
        for _ in 0..row {
            machine.handle_event(BlinkEvent::Advance);
        }
        machine.handle_event(BlinkEvent::ConfirmRow);
        for _ in 0..item {
            machine.handle_event(BlinkEvent::Advance);
        }
    }

    fn commit_output(transition: Transition) -> Option<ResolvedOutput> {
        match transition {
            Transition::Committed { output, .. } => output,
            other => panic!("expected commit, got {other:?}"),
        }
    }

    #[test]
    fn row_advance_wraps() {
        let mut machine = ScanStateMachine::new(abc_def(), ConfirmRowPolicy::Ignore);
        machine.handle_event(BlinkEvent::Advance);
        assert_eq!(machine.cursor().row, 1);
        machine.handle_event(BlinkEvent::Advance);
        assert_eq!(machine.cursor().row, 0);
    }

    #[test]
    fn reverse_changes_direction_only() {
        let mut machine = ScanStateMachine::new(abc_def(), ConfirmRowPolicy::Ignore);
        assert_eq!(machine.handle_event(BlinkEvent::Reverse), Transition::Moved);
        assert_eq!(machine.cursor().direction, ScanDirection::Backward);
        assert_eq!(machine.cursor().row, 0);

        machine.handle_event(BlinkEvent::Advance);
        assert_eq!(machine.cursor().row, 1);
    }

    #[test]
    fn confirm_item_in_row_select_is_ignored() {
        let mut machine = ScanStateMachine::new(abc_def(), ConfirmRowPolicy::Ignore);
        assert_eq!(
            machine.handle_event(BlinkEvent::ConfirmItem),
            Transition::Ignored
        );
        assert_eq!(*machine.cursor(), ScanCursor::initial());
    }

    #[test]
    fn unrecognized_codes_leave_state_untouched() {
        let mut machine = ScanStateMachine::new(abc_def(), ConfirmRowPolicy::Ignore);
        machine.handle_event(BlinkEvent::Advance);
        let before = *machine.cursor();

        assert_eq!(
            machine.handle_event(BlinkEvent::Unrecognized(9)),
            Transition::Unrecognized(9)
        );
        assert_eq!(*machine.cursor(), before);
    }

    #[test]
    fn confirm_row_enters_item_select_at_first_item() {
        let mut machine = ScanStateMachine::new(abc_def(), ConfirmRowPolicy::Ignore);
        select(&mut machine, 1, 2);
        assert_eq!(machine.cursor().mode, ScanMode::ItemSelect);
        assert_eq!(machine.highlighted_item(), Some(Item::Char('F')));

        machine.handle_event(BlinkEvent::Advance);
        assert_eq!(machine.cursor().item, 0);
    }

    #[test]
    fn confirm_row_policy_in_item_select() {
        let mut ignore = ScanStateMachine::new(abc_def(), ConfirmRowPolicy::Ignore);
        select(&mut ignore, 1, 1);
        assert_eq!(
            ignore.handle_event(BlinkEvent::ConfirmRow),
            Transition::Ignored
        );
        assert_eq!(ignore.cursor().item, 1);

        let mut cancel = ScanStateMachine::new(abc_def(), ConfirmRowPolicy::Cancel);
        select(&mut cancel, 1, 1);
        assert_eq!(cancel.handle_event(BlinkEvent::ConfirmRow), Transition::Moved);
        assert_eq!(cancel.cursor().mode, ScanMode::RowSelect);
        assert_eq!(cancel.cursor().row, 1);
        assert_eq!(cancel.cursor().item, 0);
    }

    #[test]
    fn commit_lowercases_and_resets_cursor() {
        let mut machine = ScanStateMachine::new(abc_def(), ConfirmRowPolicy::Ignore);
        machine.handle_event(BlinkEvent::Reverse);
        select(&mut machine, 1, 1);

        let transition = machine.handle_event(BlinkEvent::ConfirmItem);
        assert_eq!(
            transition,
            Transition::Committed {
                kind: CommitKind::Character,
                item: Item::Char('E'),
                output: Some(ResolvedOutput::Char('e')),
            }
        );
        assert_eq!(*machine.cursor(), ScanCursor::initial());
    }

    #[test]
    fn shift_toggle_keeps_cursor_and_applies_once() {
        let mut machine = standard(ConfirmRowPolicy::Cancel);
        select(&mut machine, 4, 8);
        let before = *machine.cursor();

        let transition = machine.handle_event(BlinkEvent::ConfirmItem);
        assert!(matches!(
            transition,
            Transition::Committed {
                kind: CommitKind::ModifierToggle,
                output: None,
                ..
            }
        ));
        assert_eq!(*machine.cursor(), before);
        assert!(machine.modifiers().shift_active);

        machine.handle_event(BlinkEvent::ConfirmRow);
        machine.handle_event(BlinkEvent::Reverse);
        machine.handle_event(BlinkEvent::Reverse);
        // Back to row 4 in row-select; walk to row 1 ("QWERTYUIOP").
        machine.handle_event(BlinkEvent::Advance);
        machine.handle_event(BlinkEvent::Advance);
        machine.handle_event(BlinkEvent::ConfirmRow);
        assert_eq!(
            commit_output(machine.handle_event(BlinkEvent::ConfirmItem)),
            Some(ResolvedOutput::Char('Q'))
        );
        assert!(!machine.modifiers().shift_active);

        select(&mut machine, 1, 0);
        assert_eq!(
            commit_output(machine.handle_event(BlinkEvent::ConfirmItem)),
            Some(ResolvedOutput::Char('q'))
        );
    }

    #[test]
    fn shifted_number_row_emits_symbols() {
        let mut machine = standard(ConfirmRowPolicy::Cancel);
        machine.modifiers.shift_active = true;
        select(&mut machine, 0, 1);
        assert_eq!(
            commit_output(machine.handle_event(BlinkEvent::ConfirmItem)),
            Some(ResolvedOutput::Char('@'))
        );
        assert!(!machine.modifiers().shift_active);

        select(&mut machine, 0, 1);
        assert_eq!(
            commit_output(machine.handle_event(BlinkEvent::ConfirmItem)),
            Some(ResolvedOutput::Char('2'))
        );
    }

    #[test]
    fn digits_outside_number_row_ignore_shift_mapping() {
        let layout = Arc::new(Layout::preset(LayoutPreset::Alphabetic).unwrap());
        let mut machine = ScanStateMachine::new(layout, ConfirmRowPolicy::Ignore);
        machine.modifiers.shift_active = true;
        select(&mut machine, 3, 1);
        assert_eq!(
            commit_output(machine.handle_event(BlinkEvent::ConfirmItem)),
            Some(ResolvedOutput::Char('1'))
        );
        assert!(!machine.modifiers().shift_active);
    }

    #[test]
    fn caps_lock_toggles_and_forwards_key() {
        let mut machine = standard(ConfirmRowPolicy::Cancel);
        select(&mut machine, 4, 9);
        assert_eq!(
            machine.handle_event(BlinkEvent::ConfirmItem),
            Transition::Committed {
                kind: CommitKind::Action,
                item: Item::Action(KeyAction::ToggleCapsLock),
                output: Some(ResolvedOutput::Action(OutputAction::CapsLockToggle)),
            }
        );
        assert!(machine.modifiers().caps_lock);
        assert_eq!(*machine.cursor(), ScanCursor::initial());

        select(&mut machine, 2, 0);
        assert_eq!(
            commit_output(machine.handle_event(BlinkEvent::ConfirmItem)),
            Some(ResolvedOutput::Char('A'))
        );
    }

    #[test]
    fn named_actions_ignore_modifiers() {
        let mut machine = standard(ConfirmRowPolicy::Cancel);
        machine.modifiers.shift_active = true;
        select(&mut machine, 4, 1);
        assert_eq!(
            commit_output(machine.handle_event(BlinkEvent::ConfirmItem)),
            Some(ResolvedOutput::Action(OutputAction::Backspace))
        );
        assert!(machine.modifiers().shift_active);

        select(&mut machine, 4, 3);
        assert_eq!(
            commit_output(machine.handle_event(BlinkEvent::ConfirmItem)),
            Some(ResolvedOutput::Char('.'))
        );
        assert!(machine.modifiers().shift_active);
    }

    #[test]
    fn two_code_select_works_at_both_levels() {
        let mut machine = ScanStateMachine::new(abc_def(), ConfirmRowPolicy::Ignore);
        let transitions = feed(
            &mut machine,
            &[
                BlinkEvent::Advance,
                BlinkEvent::Select,
                BlinkEvent::Advance,
                BlinkEvent::Select,
            ],
        );
        assert_eq!(
            commit_output(transitions[3]),
            Some(ResolvedOutput::Char('e'))
        );
        assert_eq!(*machine.cursor(), ScanCursor::initial());
    }

    #[test]
    fn apply_case_handles_letters() {
        assert_eq!(apply_case('Q', false), 'q');
        assert_eq!(apply_case('Q', true), 'Q');
        assert_eq!(apply_case('É', false), 'é');
    }
}
