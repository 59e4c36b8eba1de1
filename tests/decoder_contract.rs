//! Decoder vs Resource Provider contract
//!
//! Mock provider mencatat setiap panggilan reserve/release supaya urutan,
//! ukuran request, dan identitas handle bisa dicek persis.
//!
//! Usage:
//!   cargo test --test decoder_contract

use std::cell::{Cell, RefCell};
use std::ops::{Deref, DerefMut};

use framedec::core::ResourceProvider;
use framedec::protocol::{DecodeError, Decoder, MalformedReason, Status};

#[derive(Debug, Clone, PartialEq, Eq)]
enum Call {
    Reserve(usize),
    Release { id: u32, len: usize },
}

/// Buffer dengan identitas, supaya release bisa dicocokkan ke reserve
#[derive(Debug)]
struct MockBuffer {
    id: u32,
    data: Vec<u8>,
}

impl Deref for MockBuffer {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        &self.data
    }
}

impl DerefMut for MockBuffer {
    fn deref_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }
}

#[derive(Debug, Clone, Copy)]
enum Behavior {
    /// Buffer tepat sebesar request, diisi 0xAA
    Exact,
    /// Selalu menolak
    Refuse,
    /// Buffer lebih kecil dari request
    Short(usize),
}

struct MockProvider {
    behavior: Behavior,
    next_id: Cell<u32>,
    calls: RefCell<Vec<Call>>,
    last_contents: RefCell<Vec<u8>>,
}

impl MockProvider {
    fn new(behavior: Behavior) -> Self {
        Self {
            behavior,
            next_id: Cell::new(1),
            calls: RefCell::new(Vec::new()),
            last_contents: RefCell::new(Vec::new()),
        }
    }

    fn calls(&self) -> Vec<Call> {
        self.calls.borrow().clone()
    }
}

impl ResourceProvider for MockProvider {
    type Buffer = MockBuffer;

    fn reserve(&self, size: usize) -> Option<Self::Buffer> {
        self.calls.borrow_mut().push(Call::Reserve(size));

        let len = match self.behavior {
            Behavior::Exact => size,
            Behavior::Refuse => return None,
            Behavior::Short(shortfall) => size.saturating_sub(shortfall),
        };

        let id = self.next_id.get();
        self.next_id.set(id + 1);
        Some(MockBuffer {
            id,
            data: vec![0xAA; len],
        })
    }

    fn release(&self, buffer: Self::Buffer) {
        self.calls.borrow_mut().push(Call::Release {
            id: buffer.id,
            len: buffer.data.len(),
        });
        *self.last_contents.borrow_mut() = buffer.data;
    }
}

#[test]
fn failed_reserve_resources() {
    let decoder = Decoder::new(MockProvider::new(Behavior::Refuse));

    let (decoded, status) = decoder.decode_status(b"message which needs too much resources");
    assert_eq!(decoded, b"");
    assert_eq!(status, -1);

    // Tidak ada release untuk reservasi yang gagal
    assert_eq!(decoder.provider().calls(), vec![Call::Reserve(39)]);
}

#[test]
fn unsuccessful_decode() {
    let decoder = Decoder::new(MockProvider::new(Behavior::Exact));

    assert_eq!(decoder.decode_status(b"wrong message"), (Vec::new(), 1));
    assert_eq!(
        decoder.provider().calls(),
        vec![Call::Reserve(14), Call::Release { id: 1, len: 14 }]
    );
}

#[test]
fn successful_decode() {
    let decoder = Decoder::new(MockProvider::new(Behavior::Exact));

    assert_eq!(decoder.decode_status(b"#abc"), (b"!bcd".to_vec(), 0));
    assert_eq!(
        decoder.provider().calls(),
        vec![Call::Reserve(5), Call::Release { id: 1, len: 5 }]
    );
}

#[test]
fn empty_message_reserves_one_byte() {
    let decoder = Decoder::new(MockProvider::new(Behavior::Exact));

    assert_eq!(
        decoder.decode(b""),
        Err(DecodeError::MalformedMessage {
            reason: MalformedReason::Empty
        })
    );
    assert_eq!(
        decoder.provider().calls(),
        vec![Call::Reserve(1), Call::Release { id: 1, len: 1 }]
    );
}

#[test]
fn guard_slot_written_but_not_emitted() {
    let decoder = Decoder::new(MockProvider::new(Behavior::Exact));

    let decoded = decoder.decode(b"#abc").unwrap();
    assert_eq!(decoded.len(), 4);

    // Scratch berisi window len + 1; byte terakhir = terminator + 1
    assert_eq!(&*decoder.provider().last_contents.borrow(), b"!bcd\x01");
}

#[test]
fn malformed_message_leaves_scratch_untouched() {
    let decoder = Decoder::new(MockProvider::new(Behavior::Exact));

    decoder.decode(b"abc").unwrap_err();
    assert_eq!(&*decoder.provider().last_contents.borrow(), &[0xAAu8; 4]);
}

#[test]
fn short_buffer_is_released_and_reported() {
    let decoder = Decoder::new(MockProvider::new(Behavior::Short(1)));

    assert_eq!(
        decoder.decode(b"#abc"),
        Err(DecodeError::AllocationFailure { size: 5 })
    );
    assert_eq!(
        decoder.provider().calls(),
        vec![Call::Reserve(5), Call::Release { id: 1, len: 4 }]
    );
}

#[test]
fn each_call_gets_its_own_reservation() {
    let decoder = Decoder::new(MockProvider::new(Behavior::Exact));

    decoder.decode(b"#a").unwrap();
    decoder.decode(b"nope").unwrap_err();
    decoder.decode(b"#bc").unwrap();

    assert_eq!(
        decoder.provider().calls(),
        vec![
            Call::Reserve(3),
            Call::Release { id: 1, len: 3 },
            Call::Reserve(5),
            Call::Release { id: 2, len: 5 },
            Call::Reserve(4),
            Call::Release { id: 3, len: 4 },
        ]
    );
}

#[test]
fn result_does_not_alias_scratch() {
    let decoder = Decoder::new(MockProvider::new(Behavior::Exact));

    let decoded = decoder.decode(b"#xyz").unwrap();
    // Scratch sudah di-release dan dipindah ke last_contents; hasil tetap utuh
    decoder.provider().last_contents.borrow_mut().fill(0);
    assert_eq!(decoded, b"!yz{");
}

#[test]
fn status_matches_error() {
    let decoder = Decoder::new(MockProvider::new(Behavior::Exact));

    let result = decoder.decode(b"wrong message");
    assert_eq!(Status::from(&result), Status::MalformedMessage);

    let result = decoder.decode(b"#ok");
    assert_eq!(Status::from(&result), Status::Success);
}

#[test]
fn foreign_release_does_not_poison_limited_heap() {
    use framedec::core::HeapProvider;

    let provider = HeapProvider::with_limit(1024);
    provider.release(vec![0u8; 5].into_boxed_slice());

    let decoder = Decoder::new(provider);
    assert_eq!(decoder.decode_status(b"#abc"), (b"!bcd".to_vec(), 0));
    assert_eq!(decoder.provider().outstanding(), 0);
}
