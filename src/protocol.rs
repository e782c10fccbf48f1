//! Blink-code protocol definitions.
//!
//! The sensor sends small decimal integers, one per line. How those integers map onto scanning
//! events depends on the firmware variant: the canonical four-code protocol separates advance,
//! reverse, row confirm, and item confirm, while the reduced two-code protocol only knows
//! advance and a level-dependent select.

/// Raw integer code as decoded from one line of the byte stream.
pub type BlinkCode = u64;

/// Scanning events produced by interpreting a [`BlinkCode`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlinkEvent {
    Advance,
    Reverse,
    ConfirmRow,
    ConfirmItem,
    /// Two-code select: confirms the row in row-select, the item in item-select.
    Select,
    /// A code outside the active protocol's alphabet.
    Unrecognized(BlinkCode),
}

/// Which code alphabet the sensor firmware emits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
#[cfg_attr(feature = "config", derive(serde::Deserialize))]
#[cfg_attr(feature = "config", serde(rename_all = "kebab-case"))]
pub enum ProtocolVariant {
    /// 1 = advance, 2 = reverse, 3 = confirm row, 4 = confirm item
    #[default]
    FourCode,
    /// 1 = advance, 2 = select
    TwoCode,
}

impl ProtocolVariant {
    /// Map a decoded code onto a scanning event.
    pub fn interpret(self, code: BlinkCode) -> BlinkEvent {
        match (self, code) {
            (ProtocolVariant::FourCode, 1) => BlinkEvent::Advance,
            (ProtocolVariant::FourCode, 2) => BlinkEvent::Reverse,
            (ProtocolVariant::FourCode, 3) => BlinkEvent::ConfirmRow,
            (ProtocolVariant::FourCode, 4) => BlinkEvent::ConfirmItem,
            (ProtocolVariant::TwoCode, 1) => BlinkEvent::Advance,
            (ProtocolVariant::TwoCode, 2) => BlinkEvent::Select,
            (_, other) => BlinkEvent::Unrecognized(other),
        }
    }

    /// Human readable summary of the code alphabet, shown at startup.
    pub fn describe(self) -> &'static str {
        match self {
            ProtocolVariant::FourCode => {
                "1=advance, 2=reverse, 3=select row, 4=select character"
            }
            ProtocolVariant::TwoCode => "1=advance, 2=select",
        }
    }
}

/// What a row confirmation does while an item is being selected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
#[cfg_attr(feature = "config", derive(serde::Deserialize))]
#[cfg_attr(feature = "config", serde(rename_all = "kebab-case"))]
pub enum ConfirmRowPolicy {
    /// Ignore the event
    Ignore,
    /// Return to row selection, keeping the highlighted row
    #[default]
    Cancel,
}
