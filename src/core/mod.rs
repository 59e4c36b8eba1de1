//! Core module: Resource Provider dan implementasinya
//!
//! Prinsip desain:
//! - Typed Handle: provider mengembalikan buffer berukuran, bukan raw pointer
//! - Explicit Dependency: provider di-inject ke decoder, tidak ada global state
//! - Pre-allocation: pool dan mmap menghindari alokasi di hot path

mod heap;
mod instrumented;
mod mmap;
mod pool;
mod provider;
mod ring_buffer;

pub use heap::HeapProvider;
pub use instrumented::{InstrumentedProvider, ProviderStats};
pub use mmap::{page_size, MmapBuffer, MmapProvider};
pub use pool::{PoolBuffer, PoolProvider};
pub use provider::{Refuse, ResourceProvider};
pub use ring_buffer::RingBuffer;
