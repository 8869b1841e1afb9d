//! Arithmetic in Poly1305's prime field GF(2^130 - 5).
//!
//! Elements are stored in radix 2^26 as five `u32` limbs, the representation used by
//! poly1305-donna's 32-bit implementation. Products of two limbs fit comfortably in a `u64`,
//! and the reduction modulo `p = 2^130 - 5` folds the overflow above 2^130 back into the
//! lowest limb using `2^130 ≡ 5 (mod p)`.

use crate::BLOCK_SIZE;
use core::{
    fmt::{self, Debug},
    ops::{Add, AddAssign, Mul},
};

#[cfg(feature = "zeroize")]
use zeroize::Zeroize;

/// Low 26 bits of a limb.
const LIMB_MASK: u32 = 0x3ff_ffff;

/// [`LIMB_MASK`] widened for the 64-bit partial products.
const LIMB_MASK_WIDE: u64 = LIMB_MASK as u64;

/// Per-limb masks applied to `r`, clearing the bits Poly1305 requires to be zero.
const CLAMP: [u32; 5] = [0x3ff_ffff, 0x3ff_ff03, 0x3ff_c0ff, 0x3f0_3fff, 0x00f_ffff];

/// Value ORed into the top limb of every full 16-byte block: 2^128 in radix 2^26.
pub(crate) const FULL_BLOCK: u32 = 1 << 24;

/// Top-limb value for the final, explicitly padded block. Its 2^128 bit is the `0x01`
/// terminator byte already written into the block.
pub(crate) const PADDED_BLOCK: u32 = 0;

/// An element of GF(2^130 - 5).
///
/// # Representation
///
/// Five little-endian limbs of 26 bits each. Between a block addition and the following
/// multiplication the limbs may carry a few extra bits; [`FieldElement::reduce`] restores the
/// canonical form. All operations assume every limb stays below 2^31.
#[derive(Clone, Copy, Default)]
#[cfg_attr(test, derive(Eq, PartialEq))]
pub struct FieldElement([u32; 5]);

/// A multiplier `r` with its `5 * r` cross terms precomputed.
///
/// Built once per run of blocks so the per-block loop only performs the multiply.
#[derive(Clone, Copy)]
pub(crate) struct Multiplier {
    r: [u64; 5],
    s: [u64; 4],
}

impl FieldElement {
    /// Create a field element from raw radix-2^26 limbs, least significant first.
    ///
    /// Limbs are not required to be canonical, but each must be below 2^31.
    #[must_use]
    pub const fn from_limbs(limbs: [u32; 5]) -> Self {
        Self(limbs)
    }

    /// Raw radix-2^26 limbs, least significant first.
    #[must_use]
    pub const fn limbs(&self) -> [u32; 5] {
        self.0
    }

    /// Load the clamped multiplier `r` from the first 16 bytes of a key.
    pub(crate) fn clamped(bytes: &[u8]) -> Self {
        let mut r = Self::from_block(bytes, PADDED_BLOCK);
        for (limb, mask) in r.0.iter_mut().zip(CLAMP) {
            *limb &= mask;
        }
        r
    }

    /// Decode a 16-byte little-endian block, ORing `hibit` into the top limb.
    pub(crate) fn from_block(block: &[u8], hibit: u32) -> Self {
        debug_assert_eq!(block.len(), BLOCK_SIZE);

        Self([
            load_u32_le(block, 0) & LIMB_MASK,
            (load_u32_le(block, 3) >> 2) & LIMB_MASK,
            (load_u32_le(block, 6) >> 4) & LIMB_MASK,
            (load_u32_le(block, 9) >> 6) & LIMB_MASK,
            (load_u32_le(block, 12) >> 8) | hibit,
        ])
    }

    /// Precompute the multiplier tables for `self`.
    pub(crate) fn multiplier(&self) -> Multiplier {
        let r = self.0.map(u64::from);
        Multiplier {
            r,
            s: [r[1] * 5, r[2] * 5, r[3] * 5, r[4] * 5],
        }
    }

    /// Compute `self * r mod p`.
    ///
    /// The result is only partially carried: limb 1 may exceed 26 bits by a few bits.
    pub(crate) fn mul_reduce(self, m: &Multiplier) -> Self {
        let [h0, h1, h2, h3, h4] = self.0.map(u64::from);
        let [r0, r1, r2, r3, r4] = m.r;
        let [s1, s2, s3, s4] = m.s;

        let d0 = h0 * r0 + h1 * s4 + h2 * s3 + h3 * s2 + h4 * s1;
        let d1 = (d0 >> 26) + h0 * r1 + h1 * r0 + h2 * s4 + h3 * s3 + h4 * s2;
        let d2 = (d1 >> 26) + h0 * r2 + h1 * r1 + h2 * r0 + h3 * s4 + h4 * s3;
        let d3 = (d2 >> 26) + h0 * r3 + h1 * r2 + h2 * r1 + h3 * r0 + h4 * s4;
        let d4 = (d3 >> 26) + h0 * r4 + h1 * r3 + h2 * r2 + h3 * r1 + h4 * r0;

        // 2^130 = 5 (mod p)
        let h0 = (d0 & LIMB_MASK_WIDE) + (d4 >> 26) * 5;
        let h1 = (d1 & LIMB_MASK_WIDE) + (h0 >> 26);

        Self([
            (h0 & LIMB_MASK_WIDE) as u32,
            h1 as u32,
            (d2 & LIMB_MASK_WIDE) as u32,
            (d3 & LIMB_MASK_WIDE) as u32,
            (d4 & LIMB_MASK_WIDE) as u32,
        ])
    }

    /// Fully reduce this element into the canonical range `[0, p)`.
    ///
    /// Runs in constant time: the final subtraction of `p` is selected with a mask derived
    /// from the borrow of the top limb, never with a branch.
    #[must_use]
    pub fn reduce(self) -> Self {
        let mut h = self.0;

        // Two carry passes leave every limb canonical except possibly limb 0, which the
        // final step settles.
        for _ in 0..2 {
            for i in 0..4 {
                h[i + 1] += h[i] >> 26;
                h[i] &= LIMB_MASK;
            }
            h[0] += (h[4] >> 26) * 5;
            h[4] &= LIMB_MASK;
        }
        h[1] += h[0] >> 26;
        h[0] &= LIMB_MASK;

        // g = h + 5 - 2^130 = h - p
        let mut g = [0u32; 5];
        g[0] = h[0] + 5;
        for i in 1..5 {
            g[i] = h[i] + (g[i - 1] >> 26);
            g[i - 1] &= LIMB_MASK;
        }
        g[4] = g[4].wrapping_sub(1 << 26);

        // all ones when g did not borrow (h >= p), zero otherwise
        let mask = (g[4] >> 31).wrapping_sub(1);
        for i in 0..5 {
            h[i] = (h[i] & !mask) | (g[i] & mask);
        }

        Self(h)
    }

    /// Repack the low 128 bits into four little-endian `u32` words.
    ///
    /// Expects a canonical element; call [`FieldElement::reduce`] first.
    pub(crate) fn to_u32x4(self) -> [u32; 4] {
        let h = self.0;
        [
            h[0] | (h[1] << 26),
            (h[1] >> 6) | (h[2] << 20),
            (h[2] >> 12) | (h[3] << 14),
            (h[3] >> 18) | (h[4] << 8),
        ]
    }

    /// Encode the low 128 bits of this element as little-endian bytes.
    ///
    /// Expects a canonical element; call [`FieldElement::reduce`] first.
    #[must_use]
    pub fn to_bytes(self) -> [u8; BLOCK_SIZE] {
        let mut bytes = [0u8; BLOCK_SIZE];
        for (chunk, word) in bytes.chunks_exact_mut(4).zip(self.to_u32x4()) {
            chunk.copy_from_slice(&word.to_le_bytes());
        }
        bytes
    }
}

/// Read a little-endian `u32` at `offset`.
///
/// The only byte-order conversion in the crate; it is identical on every target.
pub(crate) fn load_u32_le(bytes: &[u8], offset: usize) -> u32 {
    u32::from_le_bytes([
        bytes[offset],
        bytes[offset + 1],
        bytes[offset + 2],
        bytes[offset + 3],
    ])
}

impl Debug for FieldElement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FieldElement(")?;
        for (i, limb) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{limb:#09x}")?;
        }
        write!(f, ")")
    }
}

/// A 128-bit little-endian value, without the 2^128 block bit.
impl From<&[u8; BLOCK_SIZE]> for FieldElement {
    #[inline]
    fn from(bytes: &[u8; BLOCK_SIZE]) -> Self {
        Self::from_block(bytes, PADDED_BLOCK)
    }
}

impl From<[u8; BLOCK_SIZE]> for FieldElement {
    #[inline]
    fn from(bytes: [u8; BLOCK_SIZE]) -> Self {
        Self::from(&bytes)
    }
}

impl Add for FieldElement {
    type Output = Self;

    /// Limb-wise addition without carrying.
    ///
    /// The sums must themselves stay below 2^31 per limb.
    #[inline]
    fn add(mut self, rhs: Self) -> Self {
        self += rhs;
        self
    }
}

impl AddAssign for FieldElement {
    #[inline]
    fn add_assign(&mut self, rhs: Self) {
        for (a, b) in self.0.iter_mut().zip(rhs.0) {
            *a += b;
        }
    }
}

impl Mul for FieldElement {
    type Output = Self;

    /// Multiply modulo `p`. The result is partially carried, like every intermediate
    /// accumulator value.
    ///
    /// Both operands are reduced first, so any limbs below 2^31 are accepted.
    #[inline]
    fn mul(self, rhs: Self) -> Self {
        self.reduce().mul_reduce(&rhs.reduce().multiplier())
    }
}

#[cfg(feature = "zeroize")]
impl Zeroize for FieldElement {
    fn zeroize(&mut self) {
        self.0.zeroize();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hex_literal::hex;

    /// p = 2^130 - 5 as (bits above 2^128, low 128 bits).
    const P: (u128, u128) = (3, u128::MAX - 4);

    fn limbs_of(hi: u128, lo: u128) -> FieldElement {
        let limb = |shift: u32| ((lo >> shift) as u32) & LIMB_MASK;
        FieldElement([
            limb(0),
            limb(26),
            limb(52),
            limb(78),
            ((lo >> 104) as u32) | ((hi as u32) << 24),
        ])
    }

    /// Schoolbook `(hi, lo) mod p`, then truncated to 128 bits.
    fn reference(mut hi: u128, mut lo: u128) -> u128 {
        while (hi, lo) >= P {
            let (l, borrow) = lo.overflowing_sub(P.1);
            lo = l;
            hi = hi - P.0 - u128::from(borrow);
        }
        lo
    }

    fn check_reduce(hi: u128, lo: u128) {
        let reduced = limbs_of(hi, lo).reduce();
        assert_eq!(u128::from_le_bytes(reduced.to_bytes()), reference(hi, lo));
    }

    #[test]
    fn reduce_below_modulus() {
        check_reduce(0, 0);
        check_reduce(0, 1);
        check_reduce(2, u128::MAX);
        check_reduce(P.0, P.1 - 1);
    }

    #[test]
    fn reduce_at_and_above_modulus() {
        // p, p + 1, p + 4, 2^130
        check_reduce(P.0, P.1);
        check_reduce(P.0, P.1 + 1);
        check_reduce(P.0, u128::MAX);
        check_reduce(4, 0);
        // 2p - 1 = 2^131 - 11
        check_reduce(7, u128::MAX - 10);
    }

    #[test]
    fn reduce_carries_overfull_limbs() {
        // every limb holding 2^26: 2^26 * (1 + 2^26 + 2^52 + 2^78 + 2^104)
        let fe = FieldElement([1 << 26; 5]);
        let lo = (1u128 << 26) | (1 << 52) | (1 << 78) | (1 << 104);
        let expected = FieldElement([5, 1, 1, 1, 1]);
        assert_eq!(fe.reduce(), expected);
        assert_eq!(u128::from_le_bytes(fe.reduce().to_bytes()), lo + 5);
    }

    #[test]
    fn reduce_is_idempotent() {
        let fe = limbs_of(7, u128::MAX - 10).reduce();
        assert_eq!(fe.reduce(), fe);
    }

    #[test]
    fn clamp_clears_required_bits() {
        let r = FieldElement::clamped(&[0xff; 16]);
        assert_eq!(
            r.to_bytes(),
            hex!("ffffff0ffcffff0ffcffff0ffcffff0f")
        );
    }

    #[test]
    fn block_flag_sets_bit_128() {
        let fe = FieldElement::from_block(&[0; 16], FULL_BLOCK);
        assert_eq!(fe.limbs(), [0, 0, 0, 0, 1 << 24]);
    }

    #[test]
    fn mul_small_values() {
        let a = FieldElement::from(&hex!("02000000000000000000000000000000"));
        let b = FieldElement::from(&hex!("03000000000000000000000000000000"));
        assert_eq!((a * b).reduce().limbs(), [6, 0, 0, 0, 0]);
    }

    #[test]
    fn mul_wraps_through_modulus() {
        // 2^129 * 2 = 2^130 = 5 (mod p)
        let a = FieldElement([0, 0, 0, 0, 1 << 25]);
        let two = FieldElement([2, 0, 0, 0, 0]);
        assert_eq!((a * two).reduce().limbs(), [5, 0, 0, 0, 0]);
    }

    #[test]
    fn mul_accepts_full_width_limbs() {
        let a = FieldElement([0x7fff_ffff; 5]);
        let b = FieldElement([0x7fff_ffff, 0, 0x7fff_ffff, 0, 0x7fff_ffff]);
        assert_eq!((a * b).reduce(), (a.reduce() * b.reduce()).reduce());
        assert_eq!((a * b).reduce(), (b * a).reduce());
    }

    #[test]
    fn load_is_little_endian() {
        assert_eq!(load_u32_le(&[0x01, 0x02, 0x03, 0x04, 0x05], 1), 0x0504_0302);
    }
}
