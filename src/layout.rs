//! Static keyboard layout data.
//!
//! A [`Layout`] is an ordered list of non-empty [`Row`]s. It is validated once at startup and
//! then shared read-only with the scan state machine, which relies on every row having at
//! least one item so that modular cursor arithmetic never divides by zero.

use crate::error::{BlinkError, Result};
use std::fmt;

/// Symbols produced by shifting the digits `1..=9, 0` on a US number row.
const SHIFTED_DIGITS: [char; 10] = [')', '!', '@', '#', '$', '%', '^', '&', '*', '('];

/// Named key actions that can appear as layout items.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyAction {
    Space,
    Backspace,
    Enter,
    ToggleShift,
    ToggleCapsLock,
    /// Punctuation typed verbatim, unaffected by shift or caps-lock.
    Literal(char),
}

/// A selectable entry within a row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Item {
    /// A letter (stored upper case) whose case follows the modifier latches.
    Char(char),
    /// A decimal digit `0..=9`.
    Digit(u8),
    Action(KeyAction),
}

impl Item {
    /// Parse a single layout token.
    ///
    /// Accepts one letter, one digit, one printable punctuation character, or a
    /// case-insensitive action name.
    pub fn parse(token: &str) -> Result<Self> {
        let invalid = || BlinkError::InvalidItem {
            token: token.to_string(),
        };

        let mut chars = token.chars();
        if let (Some(ch), None) = (chars.next(), chars.next()) {
            return match ch {
                ' ' => Ok(Item::Action(KeyAction::Space)),
                c if c.is_ascii_digit() => Ok(Item::Digit(c as u8 - b'0')),
                c if c.is_alphabetic() => Ok(Item::Char(c.to_ascii_uppercase())),
                c if c.is_ascii_graphic() => Ok(Item::Action(KeyAction::Literal(c))),
                _ => Err(invalid()),
            };
        }

        match token.to_ascii_lowercase().as_str() {
            "space" => Ok(Item::Action(KeyAction::Space)),
            "backspace" | "del" => Ok(Item::Action(KeyAction::Backspace)),
            "enter" | "return" => Ok(Item::Action(KeyAction::Enter)),
            "shift" => Ok(Item::Action(KeyAction::ToggleShift)),
            "capslock" | "caps" => Ok(Item::Action(KeyAction::ToggleCapsLock)),
            _ => Err(invalid()),
        }
    }

    /// Symbol typed for this digit while shift is held on a number row.
    pub fn shifted_symbol(digit: u8) -> Option<char> {
        SHIFTED_DIGITS.get(digit as usize).copied()
    }
}

impl fmt::Display for Item {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Item::Char(c) => write!(f, "{c}"),
            Item::Digit(d) => write!(f, "{d}"),
            Item::Action(KeyAction::Space) => f.write_str("Space"),
            Item::Action(KeyAction::Backspace) => f.write_str("Backspace"),
            Item::Action(KeyAction::Enter) => f.write_str("Enter"),
            Item::Action(KeyAction::ToggleShift) => f.write_str("Shift"),
            Item::Action(KeyAction::ToggleCapsLock) => f.write_str("CapsLock"),
            Item::Action(KeyAction::Literal(c)) => write!(f, "{c}"),
        }
    }
}

/// One row of selectable items.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Row {
    items: Vec<Item>,
    number_row: bool,
}

impl Row {
    pub fn new(items: Vec<Item>, number_row: bool) -> Self {
        Self { items, number_row }
    }

    /// Build a row where every character of `chars` is one item.
    pub fn from_chars(chars: &str) -> Result<Self> {
        let items = chars
            .chars()
            .map(|c| Item::parse(c.encode_utf8(&mut [0; 4])))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self::new(items, false))
    }

    /// Mark this row as a number row, enabling shifted digit symbols.
    pub fn number_row(mut self) -> Self {
        self.number_row = true;
        self
    }

    pub fn items(&self) -> &[Item] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn is_number_row(&self) -> bool {
        self.number_row
    }
}

impl fmt::Display for Row {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (idx, item) in self.items.iter().enumerate() {
            if idx > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{item}")?;
        }
        Ok(())
    }
}

/// Row description as written in a configuration file.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "config", derive(serde::Deserialize))]
pub struct RowSpec {
    pub items: Vec<String>,
    #[cfg_attr(feature = "config", serde(default))]
    pub number_row: bool,
}

/// Built-in layouts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
#[cfg_attr(feature = "config", derive(serde::Deserialize))]
#[cfg_attr(feature = "config", serde(rename_all = "kebab-case"))]
pub enum LayoutPreset {
    /// QWERTY rows under a number row, plus punctuation and modifier keys
    #[default]
    Standard,
    /// QWERTY rows under a number row, with space, backspace and enter only
    Compact,
    /// Letters in alphabetical order, digits, punctuation, then editing keys
    Alphabetic,
}

/// Immutable, validated scanning layout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Layout {
    rows: Vec<Row>,
}

impl Layout {
    /// Validate and build a layout. Rejects layouts without rows and empty rows.
    pub fn new(rows: Vec<Row>) -> Result<Self> {
        if rows.is_empty() {
            return Err(BlinkError::EmptyLayout);
        }
        if let Some(row) = rows.iter().position(Row::is_empty) {
            return Err(BlinkError::EmptyRow { row });
        }
        Ok(Self { rows })
    }

    /// Build a layout from configuration row descriptions.
    pub fn from_specs(specs: &[RowSpec]) -> Result<Self> {
        let rows = specs
            .iter()
            .map(|spec| {
                let items = spec
                    .items
                    .iter()
                    .map(|token| Item::parse(token))
                    .collect::<Result<Vec<_>>>()?;
                Ok(Row::new(items, spec.number_row))
            })
            .collect::<Result<Vec<_>>>()?;
        Self::new(rows)
    }

    pub fn preset(preset: LayoutPreset) -> Result<Self> {
        use KeyAction::*;

        let editing = || {
            vec![
                Item::Action(Space),
                Item::Action(Backspace),
                Item::Action(Enter),
            ]
        };

        let rows = match preset {
            LayoutPreset::Standard => {
                let mut specials = editing();
                specials.extend(
                    ['.', ',', '!', '@', '#']
                        .into_iter()
                        .map(|c| Item::Action(Literal(c))),
                );
                specials.push(Item::Action(ToggleShift));
                specials.push(Item::Action(ToggleCapsLock));
                vec![
                    Row::from_chars("1234567890")?.number_row(),
                    Row::from_chars("QWERTYUIOP")?,
                    Row::from_chars("ASDFGHJKL")?,
                    Row::from_chars("ZXCVBNM")?,
                    Row::new(specials, false),
                ]
            }
            LayoutPreset::Compact => vec![
                Row::from_chars("1234567890")?,
                Row::from_chars("QWERTYUIOP")?,
                Row::from_chars("ASDFGHJKL")?,
                Row::from_chars("ZXCVBNM")?,
                Row::new(editing(), false),
            ],
            LayoutPreset::Alphabetic => vec![
                Row::from_chars("ABCDEFGHI")?,
                Row::from_chars("JKLMNOPQR")?,
                Row::from_chars("STUVWXYZ")?,
                Row::from_chars("0123456789")?,
                Row::from_chars(".,?!;:")?,
                Row::new(editing(), false),
            ],
        };

        Self::new(rows)
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Number of items in `row`, or zero when the row does not exist.
    pub fn item_count(&self, row: usize) -> usize {
        self.rows.get(row).map_or(0, Row::len)
    }

    pub fn row(&self, row: usize) -> Option<&Row> {
        self.rows.get(row)
    }

    pub fn item(&self, row: usize, index: usize) -> Option<Item> {
        self.rows.get(row)?.items.get(index).copied()
    }

    /// Whether any row holds `item`.
    pub fn contains(&self, item: Item) -> bool {
        self.rows.iter().any(|row| row.items().contains(&item))
    }
}
