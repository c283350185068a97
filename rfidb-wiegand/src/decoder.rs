//! Wiegand frame decoding
//!
//! Each falling edge on D0 shifts in a 0 bit, on D1 a 1 bit. There is no
//! explicit end-of-frame marker: a frame is complete once the line has
//! been quiet for longer than the frame timeout. The frame length then
//! tells what was sent:
//!
//! - 4 bits: keypad key as a bare nibble
//! - 8 bits: keypad key, high nibble is the complement of the low nibble
//! - 26 bits: card, parity + 24 data bits + parity
//! - 34 bits: card, parity + 32 data bits + parity
//!
//! Anything else is line noise and is dropped.

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

/// Default quiet time that closes a frame
pub const FRAME_TIMEOUT_MS: u32 = 25;

/// Keypad '*' as sent by most readers
const KEY_STAR: u8 = 0x0A;

/// Keypad '#' as sent by most readers
const KEY_HASH: u8 = 0x0B;

/// Decoder settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DecoderConfig {
    /// Quiet time after the last edge that ends a frame
    pub frame_timeout_ms: u32,
}

impl Default for DecoderConfig {
    fn default() -> Self {
        DecoderConfig {
            frame_timeout_ms: FRAME_TIMEOUT_MS,
        }
    }
}

/// Kind of frame that produced a reading
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FrameKind {
    Keypad4,
    Keypad8,
    Card26,
    Card34,
}

impl FrameKind {
    fn from_bit_count(bits: u8) -> Option<Self> {
        match bits {
            4 => Some(FrameKind::Keypad4),
            8 => Some(FrameKind::Keypad8),
            26 => Some(FrameKind::Card26),
            34 => Some(FrameKind::Card34),
            _ => None,
        }
    }

    /// Frame length in bits
    pub fn bits(&self) -> u8 {
        match self {
            FrameKind::Keypad4 => 4,
            FrameKind::Keypad8 => 8,
            FrameKind::Card26 => 26,
            FrameKind::Card34 => 34,
        }
    }

    pub fn is_keypad(&self) -> bool {
        matches!(self, FrameKind::Keypad4 | FrameKind::Keypad8)
    }
}

/// One decoded frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Reading {
    pub kind: FrameKind,
    /// Card number, or key code ('*' and '#' as ASCII)
    pub code: u32,
    /// Frame bits as received, parity included
    pub raw: u64,
}

/// Bit accumulator for one reader
#[derive(Debug, Clone, Default)]
pub struct Decoder {
    config: DecoderConfig,
    bits: u64,
    bit_count: u8,
    last_edge_ms: u32,
    last: Option<Reading>,
}

impl Decoder {
    pub fn new() -> Self {
        Self::with_config(DecoderConfig::default())
    }

    pub fn with_config(config: DecoderConfig) -> Self {
        Decoder {
            config,
            bits: 0,
            bit_count: 0,
            last_edge_ms: 0,
            last: None,
        }
    }

    pub fn config(&self) -> &DecoderConfig {
        &self.config
    }

    /// Falling edge on D0
    pub fn data0(&mut self, now_ms: u32) {
        self.push(0, now_ms);
    }

    /// Falling edge on D1
    pub fn data1(&mut self, now_ms: u32) {
        self.push(1, now_ms);
    }

    /// Bits received in the frame still open
    pub fn bit_count(&self) -> u8 {
        self.bit_count
    }

    /// Close the pending frame if the line has gone quiet.
    /// Returns the reading when the frame was valid.
    pub fn poll(&mut self, now_ms: u32) -> Option<Reading> {
        if self.bit_count == 0 {
            return None;
        }
        if now_ms.wrapping_sub(self.last_edge_ms) <= self.config.frame_timeout_ms {
            return None;
        }

        let (bits, bit_count) = (self.bits, self.bit_count);
        self.bits = 0;
        self.bit_count = 0;

        match decode(bits, bit_count) {
            Some(reading) => {
                debug!(kind = ?reading.kind, code = reading.code, "wiegand frame");
                self.last = Some(reading);
                Some(reading)
            }
            None => {
                trace!(bit_count, raw = bits, "discarded wiegand frame");
                None
            }
        }
    }

    /// Most recent valid reading
    pub fn last_reading(&self) -> Option<Reading> {
        self.last
    }

    /// Drop any partial frame and the last reading
    pub fn clear(&mut self) {
        self.bits = 0;
        self.bit_count = 0;
        self.last = None;
    }

    fn push(&mut self, bit: u64, now_ms: u32) {
        self.bits = (self.bits << 1) | bit;
        self.bit_count = self.bit_count.saturating_add(1);
        self.last_edge_ms = now_ms;
    }
}

fn decode(bits: u64, bit_count: u8) -> Option<Reading> {
    let kind = FrameKind::from_bit_count(bit_count)?;
    let code = match kind {
        FrameKind::Keypad4 => translate_key((bits & 0x0F) as u8) as u32,
        FrameKind::Keypad8 => {
            let high = ((bits >> 4) & 0x0F) as u8;
            let low = (bits & 0x0F) as u8;
            if low != !high & 0x0F {
                return None;
            }
            translate_key(low) as u32
        }
        FrameKind::Card26 => ((bits & 0x01FF_FFFE) >> 1) as u32,
        FrameKind::Card34 => ((bits >> 1) & 0xFFFF_FFFF) as u32,
    };
    Some(Reading { kind, code, raw: bits })
}

fn translate_key(key: u8) -> u8 {
    match key {
        KEY_STAR => b'*',
        KEY_HASH => b'#',
        other => other,
    }
}
