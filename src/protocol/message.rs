//! Tagged Message Format
//!
//! Layout:
//! ┌──────────┬──────────────────────────────────────┐
//! │ Tag (1B) │ Body (variable)                      │
//! │   '#'    │                                      │
//! └──────────┴──────────────────────────────────────┘
//!
//! Hasil decode:
//! ┌──────────┬──────────────────────────────────────┐
//! │   '!'    │ Body, setiap byte + 1 (wrapping)     │
//! └──────────┴──────────────────────────────────────┘

use thiserror::Error;

/// Tag byte yang wajib ada di posisi 0
pub const TAG: u8 = b'#';
/// Pengganti tag pada output
pub const DECODED_TAG: u8 = b'!';
/// Nilai byte implicit di belakang message (guard slot)
pub const TERMINATOR: u8 = 0;

/// Status code hasil decode
#[repr(i8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Status {
    /// Provider tidak bisa menyediakan scratch storage
    AllocationFailure = -1,
    Success = 0,
    /// Message kosong atau tanpa tag byte
    MalformedMessage = 1,
}

impl Status {
    #[inline(always)]
    pub fn code(self) -> i32 {
        self as i8 as i32
    }

    #[inline(always)]
    pub fn from_code(code: i32) -> Option<Self> {
        match code {
            -1 => Some(Self::AllocationFailure),
            0 => Some(Self::Success),
            1 => Some(Self::MalformedMessage),
            _ => None,
        }
    }

    #[inline(always)]
    pub fn is_success(self) -> bool {
        self == Self::Success
    }
}

/// Alasan message dianggap malformed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum MalformedReason {
    #[error("message is empty")]
    Empty,
    #[error("expected tag byte 0x23, found {found:#04x}")]
    MissingTag { found: u8 },
}

/// Error dari decode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum DecodeError {
    #[error("provider could not supply {size} bytes of scratch storage")]
    AllocationFailure { size: usize },

    #[error("malformed message: {reason}")]
    MalformedMessage { reason: MalformedReason },
}

impl DecodeError {
    #[inline(always)]
    pub fn status(&self) -> Status {
        match self {
            Self::AllocationFailure { .. } => Status::AllocationFailure,
            Self::MalformedMessage { .. } => Status::MalformedMessage,
        }
    }
}

impl From<MalformedReason> for DecodeError {
    fn from(reason: MalformedReason) -> Self {
        Self::MalformedMessage { reason }
    }
}

impl<T> From<&Result<T, DecodeError>> for Status {
    fn from(result: &Result<T, DecodeError>) -> Self {
        match result {
            Ok(_) => Status::Success,
            Err(e) => e.status(),
        }
    }
}

/// Cek tag byte di posisi 0
#[inline(always)]
pub fn check_tag(msg: &[u8]) -> Result<(), MalformedReason> {
    match msg.first() {
        None => Err(MalformedReason::Empty),
        Some(&TAG) => Ok(()),
        Some(&found) => Err(MalformedReason::MissingTag { found }),
    }
}
