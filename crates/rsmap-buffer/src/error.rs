//! Buffer-level errors.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum BufferError {
    #[error("buffer too short: need {needed} more bytes, have {remaining}")]
    BufferTooShort { needed: usize, remaining: usize },

    #[error("invalid UTF-8 string")]
    InvalidUtf8,

    #[error("string too long for a 1-byte length prefix: {0} bytes")]
    StringTooLong(usize),

    #[error("value out of range for smart encoding: {0}")]
    SmartOutOfRange(i32),
}
