//! Input subsystem: byte-stream decoding and protocol interpretation.

pub mod decoder;
pub mod service;

// Public re-exports for convenience. Modules outside this crate should prefer importing
// from `crate::input` rather than reaching into submodules.
pub use decoder::{BlinkDecoder, MAX_LINE_DIGITS};
pub use service::{open_source, BlinkSource, InputService};
