//! Heap-backed provider
//!
//! Setiap reservasi adalah `Box<[u8]>` baru. Limit opsional membatasi
//! total byte yang sedang dipinjam (outstanding), dihitung secara atomic
//! sehingga provider aman dipakai dari banyak thread.

use std::sync::atomic::{AtomicUsize, Ordering};

use log::{trace, warn};

use super::provider::ResourceProvider;

/// Provider berbasis heap allocation
#[derive(Debug, Default)]
pub struct HeapProvider {
    limit: Option<usize>,
    outstanding: AtomicUsize,
}

impl HeapProvider {
    /// Provider tanpa limit
    pub fn new() -> Self {
        Self::default()
    }

    /// Provider yang menolak jika outstanding bytes melebihi `limit`
    pub fn with_limit(limit: usize) -> Self {
        Self {
            limit: Some(limit),
            outstanding: AtomicUsize::new(0),
        }
    }

    /// Total byte yang sedang di-reserve dan belum di-release
    #[inline(always)]
    pub fn outstanding(&self) -> usize {
        self.outstanding.load(Ordering::Acquire)
    }

    #[inline(always)]
    pub fn limit(&self) -> Option<usize> {
        self.limit
    }

    fn account(&self, size: usize) -> bool {
        match self.limit {
            None => {
                self.outstanding.fetch_add(size, Ordering::AcqRel);
                true
            }
            Some(limit) => self
                .outstanding
                .fetch_update(Ordering::AcqRel, Ordering::Acquire, |used| {
                    used.checked_add(size).filter(|&total| total <= limit)
                })
                .is_ok(),
        }
    }
}

impl ResourceProvider for HeapProvider {
    type Buffer = Box<[u8]>;

    fn reserve(&self, size: usize) -> Option<Self::Buffer> {
        if !self.account(size) {
            trace!("heap: refused {} bytes (outstanding {})", size, self.outstanding());
            return None;
        }

        // try_reserve supaya OOM jadi refusal, bukan abort
        let mut storage = Vec::new();
        if storage.try_reserve_exact(size).is_err() {
            self.outstanding.fetch_sub(size, Ordering::AcqRel);
            trace!("heap: allocation of {} bytes failed", size);
            return None;
        }
        storage.resize(size, 0u8);

        trace!("heap: reserved {} bytes", size);
        Some(storage.into_boxed_slice())
    }

    fn release(&self, buffer: Self::Buffer) {
        let len = buffer.len();
        let released = self
            .outstanding
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |used| used.checked_sub(len));

        match released {
            Ok(_) => trace!("heap: released {} bytes", len),
            Err(used) => warn!(
                "heap: dropping foreign buffer of {} bytes (outstanding {})",
                len, used
            ),
        }
    }
}
