//! Portable Poly1305 backend using 26-bit limbs and 64-bit products.
//!
//! Based on the public domain poly1305-donna-32 by Andrew Moon:
//! <https://github.com/floodyberry/poly1305-donna>
//!
//! Every step is straight-line arithmetic with no secret-dependent branches or memory
//! accesses. Byte order is handled by a single little-endian codec, so all targets take the
//! same path.

use crate::{
    BLOCK_SIZE, KEY_SIZE, Tag,
    field_element::{FieldElement, PADDED_BLOCK, load_u32_le},
};

#[cfg(feature = "zeroize")]
use zeroize::Zeroize;

/// Per-message Poly1305 state: the key halves and the accumulator.
pub(crate) struct State {
    /// Clamped multiplier, from key bytes 0..16.
    r: FieldElement,
    /// Added to the reduced accumulator to form the tag, from key bytes 16..32.
    pad: [u32; 4],
    /// Running polynomial evaluation.
    h: FieldElement,
}

impl State {
    /// Split a 32-byte one-time key into `r` and `pad`.
    pub(crate) fn new(key: &[u8]) -> Self {
        debug_assert_eq!(key.len(), KEY_SIZE);

        Self {
            r: FieldElement::clamped(&key[..BLOCK_SIZE]),
            pad: [
                load_u32_le(key, 16),
                load_u32_le(key, 20),
                load_u32_le(key, 24),
                load_u32_le(key, 28),
            ],
            h: FieldElement::default(),
        }
    }

    /// Fold whole 16-byte blocks into the accumulator.
    ///
    /// `data.len()` must be a multiple of [`BLOCK_SIZE`]. The `5 * r` terms are computed
    /// once for the whole run.
    pub(crate) fn compute_blocks(&mut self, data: &[u8], hibit: u32) {
        debug_assert_eq!(data.len() % BLOCK_SIZE, 0);

        let r = self.r.multiplier();
        let mut h = self.h;

        for block in data.chunks_exact(BLOCK_SIZE) {
            h = (h + FieldElement::from_block(block, hibit)).mul_reduce(&r);
        }

        self.h = h;
    }

    /// Absorb the trailing partial block (if any) and produce the tag.
    pub(crate) fn finalize(&mut self, tail: &[u8]) -> Tag {
        debug_assert!(tail.len() < BLOCK_SIZE);

        if !tail.is_empty() {
            let mut block = [0u8; BLOCK_SIZE];
            block[..tail.len()].copy_from_slice(tail);
            block[tail.len()] = 1;
            self.compute_blocks(&block, PADDED_BLOCK);
        }

        // tag = (h + pad) % 2^128
        let h = self.h.reduce().to_u32x4();
        let mut tag = Tag::default();
        let mut carry = 0u64;

        for ((chunk, word), pad) in tag.chunks_exact_mut(4).zip(h).zip(self.pad) {
            let f = u64::from(word) + u64::from(pad) + carry;
            chunk.copy_from_slice(&(f as u32).to_le_bytes());
            carry = f >> 32;
        }

        tag
    }
}

#[cfg(feature = "zeroize")]
impl Zeroize for State {
    fn zeroize(&mut self) {
        self.r.zeroize();
        self.pad.zeroize();
        self.h.zeroize();
    }
}
