//! Memory-Mapped Scratch Storage
//!
//! Setiap reservasi adalah anonymous mapping tersendiri:
//! - Kernel-managed: page baru selalu zero-filled oleh OS
//! - Page-granular: ukuran mapping dibulatkan ke page size
//! - Limit opsional pada total byte yang sedang di-map

use memmap2::{MmapMut, MmapOptions};
use std::ops::{Deref, DerefMut};
use std::sync::atomic::{AtomicUsize, Ordering};

use log::{debug, trace};

use super::provider::ResourceProvider;

const FALLBACK_PAGE_SIZE: usize = 4096;

/// Page size sistem
#[cfg(unix)]
pub fn page_size() -> usize {
    // SAFETY: sysconf tidak menyentuh memory milik kita
    let size = unsafe { libc::sysconf(libc::_SC_PAGESIZE) };
    if size > 0 {
        size as usize
    } else {
        FALLBACK_PAGE_SIZE
    }
}

#[cfg(not(unix))]
pub fn page_size() -> usize {
    FALLBACK_PAGE_SIZE
}

/// Buffer di atas anonymous mapping
///
/// Mapping bisa lebih besar dari `len`; sisa page tidak terlihat.
#[derive(Debug)]
pub struct MmapBuffer {
    mmap: MmapMut,
    len: usize,
}

impl MmapBuffer {
    /// Ukuran mapping sebenarnya (kelipatan page size)
    #[inline(always)]
    pub fn mapped_len(&self) -> usize {
        self.mmap.len()
    }
}

impl Deref for MmapBuffer {
    type Target = [u8];

    #[inline(always)]
    fn deref(&self) -> &[u8] {
        &self.mmap[..self.len]
    }
}

impl DerefMut for MmapBuffer {
    #[inline(always)]
    fn deref_mut(&mut self) -> &mut [u8] {
        &mut self.mmap[..self.len]
    }
}

/// Provider berbasis anonymous mmap
#[derive(Debug)]
pub struct MmapProvider {
    page_size: usize,
    limit: Option<usize>,
    mapped: AtomicUsize,
}

impl Default for MmapProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl MmapProvider {
    pub fn new() -> Self {
        Self {
            page_size: page_size(),
            limit: None,
            mapped: AtomicUsize::new(0),
        }
    }

    /// Provider yang menolak jika total mapped bytes melebihi `limit`
    pub fn with_limit(limit: usize) -> Self {
        Self {
            limit: Some(limit),
            ..Self::new()
        }
    }

    /// Total byte yang sedang di-map (kelipatan page size)
    #[inline(always)]
    pub fn mapped(&self) -> usize {
        self.mapped.load(Ordering::Acquire)
    }

    #[inline(always)]
    pub fn page_size(&self) -> usize {
        self.page_size
    }

    /// Bulatkan ke kelipatan page; minimal satu page
    fn map_len(&self, size: usize) -> Option<usize> {
        let pages = size.max(1).checked_add(self.page_size - 1)? / self.page_size;
        pages.checked_mul(self.page_size)
    }

    fn account(&self, map_len: usize) -> bool {
        self.mapped
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |used| {
                let total = used.checked_add(map_len)?;
                match self.limit {
                    Some(limit) if total > limit => None,
                    _ => Some(total),
                }
            })
            .is_ok()
    }
}

impl ResourceProvider for MmapProvider {
    type Buffer = MmapBuffer;

    fn reserve(&self, size: usize) -> Option<Self::Buffer> {
        let map_len = self.map_len(size)?;

        if !self.account(map_len) {
            trace!("mmap: refused {} bytes (mapped {})", size, self.mapped());
            return None;
        }

        let mmap = match MmapOptions::new().len(map_len).map_anon() {
            Ok(mmap) => mmap,
            Err(e) => {
                self.mapped.fetch_sub(map_len, Ordering::AcqRel);
                debug!("mmap: anonymous map of {} bytes failed: {}", map_len, e);
                return None;
            }
        };

        trace!("mmap: reserved {} bytes ({} mapped)", size, map_len);
        Some(MmapBuffer { mmap, len: size })
    }

    fn release(&self, buffer: Self::Buffer) {
        let map_len = buffer.mapped_len();
        drop(buffer); // munmap
        self.mapped.fetch_sub(map_len, Ordering::AcqRel);
        trace!("mmap: released {} mapped bytes", map_len);
    }
}
