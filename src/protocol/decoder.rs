//! Decoder dengan scratch buffer dari provider
//!
//! Alur satu panggilan:
//! 1. Reserve `len + 1` byte dari provider
//! 2. Validasi tag dan transform ke scratch buffer
//! 3. Copy `len` byte ke `Vec` baru (tidak alias ke scratch)
//! 4. Release scratch buffer, di semua exit path

use std::ops::{Deref, DerefMut};

use log::{debug, trace, warn};

use super::message::{check_tag, DecodeError, MalformedReason, Status, DECODED_TAG, TERMINATOR};
use crate::core::ResourceProvider;

/// Transform message ke `output`, window-nya sepanjang `output.len()`
///
/// `output[0]` diisi `'!'`, sisanya `msg[i] + 1` (wrapping). Index di luar
/// `msg` dibaca sebagai terminator `0x00`, jadi guard slot terakhir
/// berisi `0x01`.
#[inline(always)]
pub fn transform(msg: &[u8], output: &mut [u8]) -> Result<(), DecodeError> {
    if output.is_empty() {
        return Err(MalformedReason::Empty.into());
    }
    check_tag(msg)?;

    output[0] = DECODED_TAG;

    for (i, out) in output.iter_mut().enumerate().skip(1) {
        let byte = msg.get(i).copied().unwrap_or(TERMINATOR);
        *out = byte.wrapping_add(1);
    }

    Ok(())
}

/// Scratch buffer yang di-release otomatis saat keluar scope
struct Scratch<'p, P: ResourceProvider + ?Sized> {
    provider: &'p P,
    buffer: Option<P::Buffer>,
}

impl<'p, P: ResourceProvider + ?Sized> Scratch<'p, P> {
    #[inline(always)]
    fn reserve(provider: &'p P, size: usize) -> Option<Self> {
        let buffer = provider.reserve(size)?;
        Some(Self {
            provider,
            buffer: Some(buffer),
        })
    }
}

impl<P: ResourceProvider + ?Sized> Deref for Scratch<'_, P> {
    type Target = [u8];

    #[inline(always)]
    fn deref(&self) -> &[u8] {
        self.buffer.as_deref().unwrap_or_default()
    }
}

impl<P: ResourceProvider + ?Sized> DerefMut for Scratch<'_, P> {
    #[inline(always)]
    fn deref_mut(&mut self) -> &mut [u8] {
        self.buffer.as_deref_mut().unwrap_or_default()
    }
}

impl<P: ResourceProvider + ?Sized> Drop for Scratch<'_, P> {
    fn drop(&mut self) {
        if let Some(buffer) = self.buffer.take() {
            trace!("releasing scratch buffer of {} bytes", buffer.len());
            self.provider.release(buffer);
        }
    }
}

/// Stateless decoder di atas sebuah `ResourceProvider`
///
/// Tidak ada state antar panggilan; `Decoder` aman dipakai bersamaan
/// dari banyak thread jika provider-nya `Sync`.
#[derive(Debug, Default)]
pub struct Decoder<P> {
    provider: P,
}

impl<P: ResourceProvider> Decoder<P> {
    pub fn new(provider: P) -> Self {
        Self { provider }
    }

    #[inline(always)]
    pub fn provider(&self) -> &P {
        &self.provider
    }

    pub fn into_inner(self) -> P {
        self.provider
    }

    /// Decode satu message
    ///
    /// Returns hasil decode sepanjang `msg.len()`, atau:
    /// - `AllocationFailure` jika provider menolak `msg.len() + 1` byte
    /// - `MalformedMessage` jika message kosong atau tanpa tag `'#'`
    pub fn decode(&self, msg: &[u8]) -> Result<Vec<u8>, DecodeError> {
        // slice len <= isize::MAX, tidak mungkin overflow
        let size = msg.len() + 1;

        let mut scratch = match Scratch::reserve(&self.provider, size) {
            Some(scratch) => scratch,
            None => {
                debug!("provider refused {} bytes of scratch storage", size);
                return Err(DecodeError::AllocationFailure { size });
            }
        };
        trace!("reserved scratch buffer of {} bytes", size);

        if scratch.len() < size {
            warn!(
                "provider returned {} bytes for a {} byte request",
                scratch.len(),
                size
            );
            return Err(DecodeError::AllocationFailure { size });
        }

        if let Err(e) = transform(msg, &mut scratch[..size]) {
            debug!("rejecting message of {} bytes: {}", msg.len(), e);
            return Err(e);
        }

        Ok(scratch[..size - 1].to_vec())
    }

    /// Decode dengan hasil berupa pasangan (output, status code)
    ///
    /// Output kosong untuk semua status selain `0`.
    pub fn decode_status(&self, msg: &[u8]) -> (Vec<u8>, i32) {
        match self.decode(msg) {
            Ok(output) => (output, Status::Success.code()),
            Err(e) => (Vec::new(), e.status().code()),
        }
    }
}
