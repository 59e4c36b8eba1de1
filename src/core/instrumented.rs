//! Instrumented provider wrapper
//!
//! Membungkus provider apa pun, menghitung reserve/release, dan bisa
//! disuruh gagal (failure injection) tanpa state global.

use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};

use super::provider::ResourceProvider;

/// Snapshot statistik provider
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProviderStats {
    /// Reservasi yang berhasil
    pub reservations: u64,
    /// Reservasi yang ditolak (termasuk yang di-inject)
    pub refusals: u64,
    pub releases: u64,
    /// Total byte yang diminta lewat reservasi yang berhasil
    pub bytes_reserved: u64,
    /// Ukuran request terakhir (berhasil atau tidak)
    pub last_request: Option<usize>,
}

impl ProviderStats {
    /// Reservasi yang belum di-release
    #[inline(always)]
    pub fn outstanding(&self) -> u64 {
        self.reservations.saturating_sub(self.releases)
    }
}

/// Provider yang dibungkus dengan counter dan failure injection
#[derive(Debug)]
pub struct InstrumentedProvider<P> {
    inner: P,
    reservations: AtomicU64,
    refusals: AtomicU64,
    releases: AtomicU64,
    bytes_reserved: AtomicU64,
    // usize::MAX = belum ada request
    last_request: AtomicUsize,
    fail_always: AtomicBool,
    fail_next: AtomicUsize,
}

impl<P: Default> Default for InstrumentedProvider<P> {
    fn default() -> Self {
        Self::new(P::default())
    }
}

impl<P> InstrumentedProvider<P> {
    pub fn new(inner: P) -> Self {
        Self {
            inner,
            reservations: AtomicU64::new(0),
            refusals: AtomicU64::new(0),
            releases: AtomicU64::new(0),
            bytes_reserved: AtomicU64::new(0),
            last_request: AtomicUsize::new(usize::MAX),
            fail_always: AtomicBool::new(false),
            fail_next: AtomicUsize::new(0),
        }
    }

    /// Tolak `n` reservasi berikutnya
    pub fn fail_next(&self, n: usize) {
        self.fail_next.store(n, Ordering::Release);
    }

    /// Tolak semua reservasi selama `enabled`
    pub fn fail_always(&self, enabled: bool) {
        self.fail_always.store(enabled, Ordering::Release);
    }

    pub fn stats(&self) -> ProviderStats {
        let last = self.last_request.load(Ordering::Acquire);
        ProviderStats {
            reservations: self.reservations.load(Ordering::Acquire),
            refusals: self.refusals.load(Ordering::Acquire),
            releases: self.releases.load(Ordering::Acquire),
            bytes_reserved: self.bytes_reserved.load(Ordering::Acquire),
            last_request: (last != usize::MAX).then_some(last),
        }
    }

    pub fn inner(&self) -> &P {
        &self.inner
    }

    pub fn into_inner(self) -> P {
        self.inner
    }

    fn injected_failure(&self) -> bool {
        if self.fail_always.load(Ordering::Acquire) {
            return true;
        }
        self.fail_next
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |n| n.checked_sub(1))
            .is_ok()
    }
}

impl<P: ResourceProvider> ResourceProvider for InstrumentedProvider<P> {
    type Buffer = P::Buffer;

    fn reserve(&self, size: usize) -> Option<Self::Buffer> {
        self.last_request.store(size, Ordering::Release);

        let buffer = if self.injected_failure() {
            None
        } else {
            self.inner.reserve(size)
        };

        match buffer {
            Some(buffer) => {
                self.reservations.fetch_add(1, Ordering::AcqRel);
                self.bytes_reserved.fetch_add(size as u64, Ordering::AcqRel);
                Some(buffer)
            }
            None => {
                self.refusals.fetch_add(1, Ordering::AcqRel);
                None
            }
        }
    }

    fn release(&self, buffer: Self::Buffer) {
        self.releases.fetch_add(1, Ordering::AcqRel);
        self.inner.release(buffer);
    }
}
