//! The single active decoder
//!
//! Pin-change interrupt handlers are plain functions with no context
//! argument, so they reach the decoder through one static slot. Only one
//! decoder can be installed at a time; a second reader needs its own
//! handlers and its own slot.
//!
//! The slot is guarded by a mutex so that the main loop and the edge
//! handlers never observe a half-updated accumulator.

use parking_lot::{const_mutex, Mutex};

use crate::decoder::{Decoder, Reading};
use crate::error::WiegandError;

static ACTIVE: Mutex<Option<Decoder>> = const_mutex(None);

/// Make `decoder` the target of the edge handlers
pub fn install(decoder: Decoder) -> Result<(), WiegandError> {
    let mut slot = ACTIVE.lock();
    if slot.is_some() {
        return Err(WiegandError::AlreadyActive);
    }
    *slot = Some(decoder);
    Ok(())
}

/// Detach and return the installed decoder
pub fn uninstall() -> Option<Decoder> {
    ACTIVE.lock().take()
}

pub fn is_installed() -> bool {
    ACTIVE.lock().is_some()
}

/// D0 edge handler. Edges with no decoder installed are ignored.
pub fn on_data0(now_ms: u32) {
    if let Some(decoder) = ACTIVE.lock().as_mut() {
        decoder.data0(now_ms);
    }
}

/// D1 edge handler. Edges with no decoder installed are ignored.
pub fn on_data1(now_ms: u32) {
    if let Some(decoder) = ACTIVE.lock().as_mut() {
        decoder.data1(now_ms);
    }
}

/// Poll the installed decoder from the main loop
pub fn poll(now_ms: u32) -> Result<Option<Reading>, WiegandError> {
    ACTIVE
        .lock()
        .as_mut()
        .map(|decoder| decoder.poll(now_ms))
        .ok_or(WiegandError::NotInstalled)
}
