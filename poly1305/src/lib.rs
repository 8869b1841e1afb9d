//! The Poly1305 one-time message authentication code.
//!
//! Poly1305 takes a 32-byte **one-time** key and a message and produces a 16-byte tag.
//! Without the key it is infeasible to forge a tag, but a key must authenticate exactly one
//! message: two tags under the same key let an attacker recover it and forge tags for other
//! messages. This crate makes reuse hard to do by accident. [`Poly1305`] cannot be cloned or
//! reset, and producing a tag consumes it.
//!
//! # Usage
//!
//! ```
//! use poly1305::{Poly1305, universal_hash::UniversalHash};
//!
//! let key = [0x42u8; poly1305::KEY_SIZE];
//!
//! // Feed the message in any number of chunks...
//! let mut mac = Poly1305::new(&key.into());
//! mac.update(b"Cryptographic Forum ");
//! mac.update(b"Research Group");
//! let tag = mac.finalize();
//!
//! // ...and verify it in constant time.
//! assert!(poly1305::verify(&tag, b"Cryptographic Forum Research Group", &key.into()));
//! ```
//!
//! A keyed instance cannot be duplicated or reset:
//!
//! ```compile_fail
//! use poly1305::{Poly1305, universal_hash::Reset};
//!
//! fn reusable<T: Reset>(_: &T) {}
//! reusable(&Poly1305::new(&[0u8; 32].into()));
//! ```
//!
//! ```compile_fail
//! use poly1305::Poly1305;
//!
//! let mac = Poly1305::new(&[0u8; 32].into());
//! let copy = mac.clone();
//! ```

// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

#![no_std]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc(
    html_logo_url = "https://raw.githubusercontent.com/RustCrypto/media/8f1a9894/logo.svg",
    html_favicon_url = "https://raw.githubusercontent.com/RustCrypto/media/8f1a9894/logo.svg"
)]
#![warn(missing_docs, rust_2018_idioms)]

#[cfg(any(feature = "std", test))]
extern crate std;

#[cfg(feature = "hazmat")]
pub mod hazmat;

mod backend;
#[cfg_attr(not(feature = "hazmat"), allow(dead_code, unreachable_pub))]
mod field_element;

#[cfg(test)]
mod fuzz;

pub use universal_hash;

use crate::{backend::soft::State, field_element::FULL_BLOCK};
use core::fmt::{self, Debug, Display};
use subtle::ConstantTimeEq;
use universal_hash::{
    KeyInit, UhfBackend, UhfClosure, UniversalHash,
    common::{BlockSizeUser, KeySizeUser, ParBlocksSizeUser},
    consts::{U1, U16, U32},
};

#[cfg(feature = "zeroize")]
use zeroize::Zeroize;

/// Size of a Poly1305 key in bytes
pub const KEY_SIZE: usize = 32;

/// Size of the blocks Poly1305 acts upon in bytes
pub const BLOCK_SIZE: usize = 16;

/// Size of a Poly1305 tag in bytes
pub const TAG_SIZE: usize = 16;

/// Poly1305 keys (32-bytes)
pub type Key = universal_hash::Key<Poly1305>;

/// Poly1305 blocks (16-bytes)
pub type Block = universal_hash::Block<Poly1305>;

/// Poly1305 tags (16-bytes)
pub type Tag = universal_hash::Block<Poly1305>;

/// The Poly1305 one-time authenticator.
///
/// Accepts the message as a byte stream through [`Poly1305::update`], split into chunks of
/// any size, and produces its tag with [`UniversalHash::finalize`]. The tag depends only on the
/// key and the concatenated message, not on how the message was split.
///
/// An instance is bound to one key and one message. It implements neither [`Clone`] nor
/// [`universal_hash::Reset`], and finalizing consumes it.
pub struct Poly1305 {
    /// Key material and accumulator.
    state: State,

    /// Message bytes not yet forming a full block.
    buffer: [u8; BLOCK_SIZE],

    /// Number of bytes of `buffer` in use, always less than [`BLOCK_SIZE`].
    offset: usize,
}

impl Poly1305 {
    /// Initialize Poly1305 with the given one-time key.
    #[must_use]
    pub fn new(key: &Key) -> Self {
        Self::from_key_bytes(key)
    }

    /// Initialize Poly1305 from a key slice, which must be exactly [`KEY_SIZE`] bytes.
    ///
    /// # Errors
    ///
    /// Returns [`KeySizeError`] carrying the slice length if it is not [`KEY_SIZE`].
    pub fn new_from_slice(key: &[u8]) -> Result<Self, KeySizeError> {
        if key.len() != KEY_SIZE {
            return Err(KeySizeError(key.len()));
        }

        Ok(Self::from_key_bytes(key))
    }

    fn from_key_bytes(key: &[u8]) -> Self {
        Self {
            state: State::new(key),
            buffer: [0u8; BLOCK_SIZE],
            offset: 0,
        }
    }

    /// Input message data into Poly1305.
    ///
    /// May be called any number of times with chunks of any length, including empty ones.
    pub fn update(&mut self, mut data: &[u8]) {
        if self.offset > 0 {
            let n = data.len().min(BLOCK_SIZE - self.offset);
            self.buffer[self.offset..self.offset + n].copy_from_slice(&data[..n]);
            self.offset += n;
            data = &data[n..];

            if self.offset < BLOCK_SIZE {
                return;
            }

            self.state.compute_blocks(&self.buffer, FULL_BLOCK);
            self.offset = 0;
        }

        let (blocks, tail) = data.split_at(data.len() - data.len() % BLOCK_SIZE);
        if !blocks.is_empty() {
            self.state.compute_blocks(blocks, FULL_BLOCK);
        }

        self.buffer[..tail.len()].copy_from_slice(tail);
        self.offset = tail.len();
    }

    /// Compute Poly1305 over `data` and return the tag.
    ///
    /// The final partial block gets the standard `0x01` terminator rather than zero
    /// padding to a block boundary.
    #[must_use]
    pub fn compute_unpadded(mut self, data: &[u8]) -> Tag {
        self.update(data);
        self.finalize()
    }
}

/// Compute the tag of `msg` under the one-time `key` and compare it with `tag` in constant
/// time.
///
/// Returns `true` if and only if `tag` is a valid authenticator for `msg`.
#[must_use]
pub fn verify(tag: &Tag, msg: &[u8], key: &Key) -> bool {
    let expected = Poly1305::new(key).compute_unpadded(msg);
    expected.as_slice().ct_eq(tag.as_slice()).into()
}

impl KeySizeUser for Poly1305 {
    type KeySize = U32;
}

impl KeyInit for Poly1305 {
    /// Initialize Poly1305 with the given key
    fn new(key: &Key) -> Self {
        Self::new(key)
    }
}

impl TryFrom<&[u8]> for Poly1305 {
    type Error = KeySizeError;

    fn try_from(key: &[u8]) -> Result<Self, KeySizeError> {
        Self::new_from_slice(key)
    }
}

impl BlockSizeUser for Poly1305 {
    type BlockSize = U16;
}

impl ParBlocksSizeUser for Poly1305 {
    type ParBlocksSize = U1;
}

impl UhfBackend for Poly1305 {
    /// Blocks go through the byte stream so they stay ordered with [`Poly1305::update`] input.
    fn proc_block(&mut self, block: &Block) {
        self.update(block);
    }
}

impl UniversalHash for Poly1305 {
    fn update_with_backend(&mut self, f: impl UhfClosure<BlockSize = Self::BlockSize>) {
        f.call(self);
    }

    /// Get the Poly1305 tag
    fn finalize(mut self) -> Tag {
        self.state.finalize(&self.buffer[..self.offset])
    }
}

#[cfg(feature = "std")]
impl std::io::Write for Poly1305 {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.update(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

impl Debug for Poly1305 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error> {
        f.debug_struct("Poly1305").finish_non_exhaustive()
    }
}

impl Drop for Poly1305 {
    fn drop(&mut self) {
        #[cfg(feature = "zeroize")]
        {
            self.state.zeroize();
            self.buffer.zeroize();
            self.offset.zeroize();
        }
    }
}

/// The key passed to Poly1305 was not [`KEY_SIZE`] bytes long.
///
/// Holds the length of the rejected key.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct KeySizeError(pub usize);

impl Display for KeySizeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "invalid Poly1305 key size: {} bytes (expected {KEY_SIZE})",
            self.0
        )
    }
}

impl core::error::Error for KeySizeError {}

/// Check that authenticating `data` in arbitrary chunks matches authenticating it at once.
///
/// The first [`KEY_SIZE`] bytes of `data` are the key; chunk lengths are derived from the
/// message bytes themselves.
///
/// # Panics
///
/// Panics if the streamed tag differs from the one-shot tag.
#[cfg(any(fuzzing, test))]
pub fn fuzz_streaming(data: &[u8]) {
    let Some((key, msg)) = data.split_at_checked(KEY_SIZE) else {
        return;
    };
    let (Ok(oneshot), Ok(mut streaming)) = (
        Poly1305::new_from_slice(key),
        Poly1305::new_from_slice(key),
    ) else {
        return;
    };

    let expected = oneshot.compute_unpadded(msg);

    let mut sizes = msg.iter().cycle();
    let mut rest = msg;
    while !rest.is_empty() {
        let step = sizes
            .next()
            .map_or(1, |&b| 1 + usize::from(b % 37))
            .min(rest.len());
        let (chunk, tail) = rest.split_at(step);
        streaming.update(chunk);
        streaming.update(&[]);
        rest = tail;
    }

    assert_eq!(expected, streaming.finalize());
}
