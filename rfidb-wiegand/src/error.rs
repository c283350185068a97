//! Decoder errors

use thiserror::Error;

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum WiegandError {
    #[error("a decoder is already installed")]
    AlreadyActive,

    #[error("no decoder is installed")]
    NotInstalled,
}
