//! Pre-allocated slot pool
//!
//! Semua slot dialokasikan sekali saat init; setelah itu reserve/release
//! hanya memindahkan slot lewat lock-free ring buffer. Tidak ada alokasi
//! di hot path.
//!
//! Ring buffer-nya SPSC, jadi pool ini sengaja tidak `Sync`: reserve dan
//! release harus dari thread yang sama.

use std::cell::Cell;
use std::marker::PhantomData;
use std::ops::{Deref, DerefMut};

use log::{trace, warn};

use super::provider::ResourceProvider;
use super::ring_buffer::RingBuffer;

/// Buffer yang dipinjam dari pool
///
/// Panjang yang terlihat adalah ukuran yang diminta, bukan ukuran slot.
#[derive(Debug)]
pub struct PoolBuffer {
    slot: Box<[u8]>,
    len: usize,
}

impl Deref for PoolBuffer {
    type Target = [u8];

    #[inline(always)]
    fn deref(&self) -> &[u8] {
        &self.slot[..self.len]
    }
}

impl DerefMut for PoolBuffer {
    #[inline(always)]
    fn deref_mut(&mut self) -> &mut [u8] {
        &mut self.slot[..self.len]
    }
}

/// Provider dengan jumlah slot tetap berukuran `slot_size`
pub struct PoolProvider {
    free: RingBuffer<Box<[u8]>>,
    slot_size: usize,
    slots: usize,
    // !Sync: free-list hanya punya satu producer dan satu consumer
    _not_sync: PhantomData<Cell<()>>,
}

impl PoolProvider {
    /// Alokasi `slots` slot masing-masing `slot_size` byte
    ///
    /// # Panics
    /// Panic jika `slots == 0`
    pub fn new(slots: usize, slot_size: usize) -> Self {
        let free = RingBuffer::with_capacity(slots);
        for _ in 0..slots {
            // Kapasitas ring >= slots
            let pushed = free.push(vec![0u8; slot_size].into_boxed_slice()).is_ok();
            debug_assert!(pushed, "free-list smaller than slot count");
        }

        Self {
            free,
            slot_size,
            slots,
            _not_sync: PhantomData,
        }
    }

    #[inline(always)]
    pub fn slot_size(&self) -> usize {
        self.slot_size
    }

    #[inline(always)]
    pub fn slots(&self) -> usize {
        self.slots
    }

    /// Jumlah slot yang siap di-reserve
    #[inline(always)]
    pub fn available(&self) -> usize {
        self.free.len()
    }
}

impl ResourceProvider for PoolProvider {
    type Buffer = PoolBuffer;

    fn reserve(&self, size: usize) -> Option<Self::Buffer> {
        if size > self.slot_size {
            trace!("pool: {} bytes exceeds slot size {}", size, self.slot_size);
            return None;
        }

        let slot = match self.free.pop() {
            Some(slot) => slot,
            None => {
                trace!("pool: exhausted ({} slots in use)", self.slots);
                return None;
            }
        };

        trace!("pool: reserved {} bytes ({} slots left)", size, self.available());
        Some(PoolBuffer { slot, len: size })
    }

    fn release(&self, buffer: Self::Buffer) {
        if buffer.slot.len() != self.slot_size {
            warn!("pool: dropping foreign buffer of {} bytes", buffer.slot.len());
            return;
        }
        if self.free.push(buffer.slot).is_err() {
            warn!("pool: free-list full, dropping released slot");
            return;
        }
        trace!("pool: released slot ({} slots left)", self.available());
    }
}
