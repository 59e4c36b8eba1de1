//! Framedec - Tagged Frame Decoder
//!
//! Arsitektur:
//! - Pluggable Allocator: scratch storage diminta dari `ResourceProvider`
//! - Release Discipline: setiap reservasi di-release tepat satu kali
//! - Fresh Output: hasil decode tidak pernah alias ke scratch buffer

pub mod core;
pub mod protocol;
