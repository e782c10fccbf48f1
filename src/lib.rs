//! # blinkboard - Blink-Driven Scanning Keyboard
//!
//! Turns single-bit "blink" signals, detected by an external sensor and sent as small integer
//! codes over a serial link, into typed text and special keystrokes injected into the active
//! application.
//!
//! ## Architecture
//!
//! Data flows from raw bytes to keystrokes:
//!
//! - [`input`] - Blink decoder and protocol interpretation of the byte stream
//! - [`scan`] - Two-level row/item scanning state machine with modifier latches
//! - [`layout`] - Validated, immutable keyboard layouts and presets
//! - [`inject`] - Keystroke injector trait, session, and backends
//! - [`feedback`] - Console status lines and the composed-text transcript
//! - [`app`] - Event loop coordinating the components
//! - [`config`] - Runtime settings, optionally loaded from TOML
//! - [`error`] - Centralized error types and handling

pub mod error;
pub mod layout;
pub mod protocol;

pub mod input;
pub mod scan;

pub mod inject;

pub mod app;
pub mod config;
pub mod feedback;

// Re-export commonly used types for convenience
pub use error::{BlinkError, Result};

pub use app::{shift_can_strand, Application, RunSummary};
pub use config::Settings;
pub use inject::{KeystrokeInjector, OutputAction, ResolvedOutput, Session};
pub use layout::{Item, KeyAction, Layout, LayoutPreset, Row};
pub use protocol::{BlinkEvent, ConfirmRowPolicy, ProtocolVariant};
pub use scan::{ScanStateMachine, Transition};

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
