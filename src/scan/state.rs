//! Cursor and modifier state owned by the scan state machine.

use std::fmt;

/// Which level of the two-level scanner is active.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanMode {
    RowSelect,
    ItemSelect,
}

/// Direction in which `Advance` moves the highlight.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanDirection {
    Forward,
    Backward,
}

impl ScanDirection {
    pub fn reversed(self) -> Self {
        match self {
            ScanDirection::Forward => ScanDirection::Backward,
            ScanDirection::Backward => ScanDirection::Forward,
        }
    }

    /// Move `index` one step in this direction within `0..len`, wrapping at both ends.
    ///
    /// `len` must be non-zero; layouts guarantee this for every row.
    pub fn step(self, index: usize, len: usize) -> usize {
        debug_assert!(len > 0);
        match self {
            ScanDirection::Forward => (index + 1) % len,
            ScanDirection::Backward => (index + len - 1) % len,
        }
    }
}

impl fmt::Display for ScanDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScanDirection::Forward => f.write_str("forward"),
            ScanDirection::Backward => f.write_str("backward"),
        }
    }
}

/// Position of the scanning highlight.
///
/// `item` only carries meaning in [`ScanMode::ItemSelect`] and is zero otherwise.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScanCursor {
    pub mode: ScanMode,
    pub row: usize,
    pub item: usize,
    pub direction: ScanDirection,
}

impl ScanCursor {
    pub const fn initial() -> Self {
        Self {
            mode: ScanMode::RowSelect,
            row: 0,
            item: 0,
            direction: ScanDirection::Forward,
        }
    }

    pub(crate) fn enter_item_select(&mut self) {
        self.mode = ScanMode::ItemSelect;
        self.item = 0;
    }

    pub(crate) fn leave_item_select(&mut self) {
        self.mode = ScanMode::RowSelect;
        self.item = 0;
    }
}

impl Default for ScanCursor {
    fn default() -> Self {
        Self::initial()
    }
}

/// Shift is a one-shot latch; caps-lock persists until toggled again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ModifierState {
    pub shift_active: bool,
    pub caps_lock: bool,
}

impl ModifierState {
    /// Whether a letter committed now is typed in upper case.
    pub fn uppercase(&self) -> bool {
        self.caps_lock ^ self.shift_active
    }
}
