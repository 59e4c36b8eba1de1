//! Protocol Layer: Tagged Message Decoding
//!
//! Prinsip desain:
//! - Satu tag byte: `'#'` di posisi 0, tidak ada format lain
//! - Scratch dari provider: decoder tidak alokasi scratch sendiri
//! - Tiga outcome: success (0), malformed (1), allocation failure (-1)

mod decoder;
mod message;

pub use decoder::{transform, Decoder};
pub use message::{
    check_tag, DecodeError, MalformedReason, Status, DECODED_TAG, TAG, TERMINATOR,
};
