//! Lock-Free Single-Producer Single-Consumer (SPSC) Ring Buffer
//!
//! Dipakai sebagai free-list untuk slot pool: `release` push slot kembali,
//! `reserve` pop slot. Value dipindahkan (move), bukan di-copy, jadi
//! tipe yang punya heap storage (mis. `Box<[u8]>`) aman disimpan.

use std::cell::UnsafeCell;
use std::mem::MaybeUninit;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Slot dalam ring buffer
#[repr(C, align(64))] // Cache line alignment untuk menghindari false sharing
struct Slot<T> {
    data: UnsafeCell<MaybeUninit<T>>,
}

impl<T> Slot<T> {
    const fn new() -> Self {
        Self {
            data: UnsafeCell::new(MaybeUninit::uninit()),
        }
    }
}

/// Padding untuk cache line isolation (64 bytes pada x86-64)
#[repr(C, align(64))]
struct CacheLinePadded<T> {
    value: T,
}

impl<T> CacheLinePadded<T> {
    const fn new(value: T) -> Self {
        Self { value }
    }
}

/// Lock-Free SPSC Ring Buffer dengan kapasitas runtime (power of 2)
#[repr(C)]
pub struct RingBuffer<T> {
    // Producer side
    head: CacheLinePadded<AtomicUsize>,
    // Consumer side
    tail: CacheLinePadded<AtomicUsize>,
    buffer: Box<[Slot<T>]>,
    mask: usize,
}

// SAFETY: Hanya satu producer (menulis head) dan satu consumer (menulis tail).
// Value di-move antar thread, jadi cukup T: Send.
unsafe impl<T: Send> Send for RingBuffer<T> {}
unsafe impl<T: Send> Sync for RingBuffer<T> {}

impl<T> RingBuffer<T> {
    /// Membuat ring buffer dengan kapasitas minimal `capacity`,
    /// dibulatkan ke power of 2 berikutnya.
    ///
    /// # Panics
    /// Panic jika `capacity == 0`
    pub fn with_capacity(capacity: usize) -> Self {
        assert!(capacity > 0, "capacity must be non-zero");
        let capacity = capacity.next_power_of_two();

        let mut buffer = Vec::with_capacity(capacity);
        for _ in 0..capacity {
            buffer.push(Slot::new());
        }

        Self {
            head: CacheLinePadded::new(AtomicUsize::new(0)),
            tail: CacheLinePadded::new(AtomicUsize::new(0)),
            buffer: buffer.into_boxed_slice(),
            mask: capacity - 1,
        }
    }

    /// Push value (Producer side)
    ///
    /// Jika buffer penuh, value dikembalikan lewat `Err`.
    #[inline(always)]
    pub fn push(&self, value: T) -> Result<(), T> {
        let head = self.head.value.load(Ordering::Relaxed);
        let tail = self.tail.value.load(Ordering::Acquire);

        if head.wrapping_sub(tail) >= self.capacity() {
            return Err(value);
        }

        let slot = &self.buffer[head & self.mask];

        // SAFETY: slot ini kosong dan tidak sedang dibaca consumer
        unsafe {
            (*slot.data.get()).write(value);
        }

        self.head
            .value
            .store(head.wrapping_add(1), Ordering::Release);

        Ok(())
    }

    /// Pop value (Consumer side)
    #[inline(always)]
    pub fn pop(&self) -> Option<T> {
        let tail = self.tail.value.load(Ordering::Relaxed);
        let head = self.head.value.load(Ordering::Acquire);

        if tail == head {
            return None;
        }

        let slot = &self.buffer[tail & self.mask];

        // SAFETY: slot sudah ditulis producer; setelah read, ownership pindah ke caller
        let value = unsafe { (*slot.data.get()).assume_init_read() };

        self.tail
            .value
            .store(tail.wrapping_add(1), Ordering::Release);

        Some(value)
    }

    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        let tail = self.tail.value.load(Ordering::Acquire);
        let head = self.head.value.load(Ordering::Acquire);
        tail == head
    }

    #[inline(always)]
    pub fn is_full(&self) -> bool {
        self.len() >= self.capacity()
    }

    /// Jumlah elemen dalam buffer
    #[inline(always)]
    pub fn len(&self) -> usize {
        let head = self.head.value.load(Ordering::Acquire);
        let tail = self.tail.value.load(Ordering::Acquire);
        head.wrapping_sub(tail)
    }

    #[inline(always)]
    pub fn capacity(&self) -> usize {
        self.mask + 1
    }
}

impl<T> Drop for RingBuffer<T> {
    fn drop(&mut self) {
        // Drop value yang masih tersimpan
        while self.pop().is_some() {}
    }
}
