//! Scanning selection subsystem.
//!
//! [`ScanStateMachine`] is the only component that interprets blink events. It owns the
//! [`ScanCursor`] and [`ModifierState`] and is driven by exactly one event loop.

pub mod machine;
pub mod state;

pub use machine::{CommitKind, ScanStateMachine, Transition};
pub use state::{ModifierState, ScanCursor, ScanDirection, ScanMode};
