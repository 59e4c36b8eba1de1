//! Resource Provider interface
//!
//! Provider menyediakan byte storage mentah untuk satu panggilan decode
//! dan menerimanya kembali lewat `release`. Handle yang dikembalikan
//! sudah bertipe dan berukuran, jadi tidak perlu reinterpretasi pointer.

use std::ops::DerefMut;

/// Sumber scratch storage untuk decoder.
///
/// Kontrak:
/// - `reserve(size)` mengembalikan buffer dengan panjang tepat `size` byte,
///   atau `None` jika provider kehabisan storage (atau sengaja menolak).
/// - `release(buffer)` dipanggil tepat satu kali untuk setiap reservasi
///   yang berhasil. Buffer tetap valid sampai di-release.
///
/// Release dari buffer milik provider lain tidak didefinisikan.
pub trait ResourceProvider {
    /// Handle ke writable byte storage
    type Buffer: DerefMut<Target = [u8]>;

    /// Minta storage sebesar `size` byte
    fn reserve(&self, size: usize) -> Option<Self::Buffer>;

    /// Kembalikan storage yang sebelumnya di-reserve
    fn release(&self, buffer: Self::Buffer);
}

impl<P: ResourceProvider + ?Sized> ResourceProvider for &P {
    type Buffer = P::Buffer;

    #[inline(always)]
    fn reserve(&self, size: usize) -> Option<Self::Buffer> {
        (**self).reserve(size)
    }

    #[inline(always)]
    fn release(&self, buffer: Self::Buffer) {
        (**self).release(buffer)
    }
}

/// Provider yang selalu menolak reservasi
#[derive(Debug, Default, Clone, Copy)]
pub struct Refuse;

impl ResourceProvider for Refuse {
    type Buffer = Box<[u8]>;

    #[inline(always)]
    fn reserve(&self, _size: usize) -> Option<Self::Buffer> {
        None
    }

    #[inline(always)]
    fn release(&self, _buffer: Self::Buffer) {}
}
