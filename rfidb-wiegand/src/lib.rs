//! rfidb Wiegand - reader frame decoder
//!
//! Turns the D0/D1 pulse trains of a Wiegand reader into credential
//! codes. Card codes feed straight into the record store's lookups;
//! 24-bit card codes pair with `position_of_24`.

pub mod error;
pub mod decoder;
pub mod active;

pub use decoder::{Decoder, DecoderConfig, FrameKind, Reading, FRAME_TIMEOUT_MS};
pub use error::WiegandError;
