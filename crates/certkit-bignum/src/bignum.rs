//! The `BigNum` type: representation, conversion, and bit access.
//!
//! Magnitude is stored as little-endian `u64` limbs with a separate sign
//! flag, and the limb buffer is scrubbed on drop. Certificate serial
//! numbers and RSA operands both ride on this type, so the big-endian byte
//! constructors mirror the DER INTEGER payload order.

use certkit_types::CryptoError;
use zeroize::Zeroize;

/// Limb type: 64-bit words, least significant first.
pub type Limb = u64;
/// Wide type for limb products and carry chains.
pub type DoubleLimb = u128;

/// Bits per limb.
pub const LIMB_BITS: usize = 64;

/// Decimal digits that fit a single limb (10^19 < 2^64).
pub(crate) const DEC_CHUNK: usize = 19;
pub(crate) const DEC_BASE: Limb = 10_000_000_000_000_000_000;

/// An arbitrary-precision signed integer, zeroized on drop.
///
/// Canonical form: the limb vector is never empty, carries no leading zero
/// limbs (except the single limb of zero itself), and zero is never
/// negative. All constructors and operations maintain this, so derived
/// equality over the fields is numeric equality.
#[derive(Clone, Zeroize)]
#[zeroize(drop)]
pub struct BigNum {
    limbs: Vec<Limb>,
    negative: bool,
}

impl BigNum {
    /// The value zero.
    pub fn zero() -> Self {
        BigNum {
            limbs: vec![0],
            negative: false,
        }
    }

    /// Build from a `u64`.
    pub fn from_u64(value: u64) -> Self {
        BigNum {
            limbs: vec![value],
            negative: false,
        }
    }

    /// Build from big-endian bytes. Empty input is zero.
    pub fn from_bytes_be(bytes: &[u8]) -> Self {
        let mut limbs = Vec::with_capacity(bytes.len().div_ceil(8) + 1);
        for chunk in bytes.rchunks(8) {
            let mut limb: Limb = 0;
            for &byte in chunk {
                limb = (limb << 8) | byte as Limb;
            }
            limbs.push(limb);
        }
        BigNum::from_limbs(limbs)
    }

    /// Build from little-endian limbs. Leading zero limbs are dropped.
    pub fn from_limbs(limbs: Vec<Limb>) -> Self {
        let mut n = BigNum {
            limbs: if limbs.is_empty() { vec![0] } else { limbs },
            negative: false,
        };
        n.trim();
        n
    }

    /// Parse a decimal string, with an optional leading `-`.
    pub fn from_decimal(text: &str) -> Result<Self, CryptoError> {
        let (negative, digits) = match text.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, text),
        };
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(CryptoError::InvalidArg);
        }

        let mut value = BigNum::zero();
        let bytes = digits.as_bytes();
        let mut pos = 0;
        while pos < bytes.len() {
            let take = DEC_CHUNK.min(bytes.len() - pos);
            let mut chunk: Limb = 0;
            let mut scale: Limb = 1;
            for &b in &bytes[pos..pos + take] {
                chunk = chunk * 10 + (b - b'0') as Limb;
                scale *= 10;
            }
            value = value.mul(&BigNum::from_u64(scale)).add(&BigNum::from_u64(chunk));
            pos += take;
        }
        value.set_negative(negative);
        Ok(value)
    }

    /// Render as a decimal string.
    pub fn to_decimal(&self) -> String {
        if self.is_zero() {
            return "0".to_string();
        }

        let mut mag = self.clone();
        mag.set_negative(false);
        let mut groups: Vec<Limb> = Vec::new();
        while !mag.is_zero() {
            let (quotient, rem) = mag.div_rem_word(DEC_BASE);
            groups.push(rem);
            mag = quotient;
        }

        let mut out = String::with_capacity(groups.len() * DEC_CHUNK + 1);
        if self.is_negative() {
            out.push('-');
        }
        for (i, group) in groups.iter().rev().enumerate() {
            if i == 0 {
                out.push_str(&group.to_string());
            } else {
                // interior groups keep their leading zeros
                out.push_str(&format!("{group:019}"));
            }
        }
        out
    }

    /// Export the magnitude as minimal big-endian bytes. Zero is one byte.
    pub fn to_bytes_be(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.limbs.len() * 8);
        for &limb in self.limbs.iter().rev() {
            out.extend_from_slice(&limb.to_be_bytes());
        }
        let first = out
            .iter()
            .position(|&b| b != 0)
            .unwrap_or(out.len() - 1);
        out.drain(..first);
        out
    }

    /// Export the magnitude left-padded with zeros to exactly `len` bytes.
    pub fn to_bytes_be_padded(&self, len: usize) -> Result<Vec<u8>, CryptoError> {
        let sig = self.byte_len();
        if sig > len {
            return Err(CryptoError::BufferTooSmall {
                need: sig,
                got: len,
            });
        }
        let mut out = vec![0u8; len];
        if sig > 0 {
            out[len - sig..].copy_from_slice(&self.to_bytes_be());
        }
        Ok(out)
    }

    /// Number of significant bits; zero for zero.
    pub fn bit_len(&self) -> usize {
        bit_len_limbs(&self.limbs)
    }

    /// Number of significant bytes; zero for zero.
    pub fn byte_len(&self) -> usize {
        self.bit_len().div_ceil(8)
    }

    /// Number of limbs in the backing vector.
    pub fn num_limbs(&self) -> usize {
        self.limbs.len()
    }

    /// The little-endian limb slice.
    pub fn limbs(&self) -> &[Limb] {
        &self.limbs
    }

    pub fn is_zero(&self) -> bool {
        self.limbs.iter().all(|&l| l == 0)
    }

    pub fn is_one(&self) -> bool {
        !self.negative && self.limbs.len() == 1 && self.limbs[0] == 1
    }

    pub fn is_negative(&self) -> bool {
        self.negative
    }

    pub fn is_even(&self) -> bool {
        self.limbs[0] & 1 == 0
    }

    pub fn is_odd(&self) -> bool {
        self.limbs[0] & 1 == 1
    }

    /// Set the sign. Zero stays non-negative.
    pub fn set_negative(&mut self, negative: bool) {
        self.negative = negative && !self.is_zero();
    }

    /// Bit at position `idx`, counted from the least significant bit.
    pub fn get_bit(&self, idx: usize) -> u64 {
        match self.limbs.get(idx / LIMB_BITS) {
            Some(&limb) => (limb >> (idx % LIMB_BITS)) & 1,
            None => 0,
        }
    }

    /// Set the bit at position `idx`, growing the magnitude if needed.
    pub fn set_bit(&mut self, idx: usize) {
        let limb_idx = idx / LIMB_BITS;
        if limb_idx >= self.limbs.len() {
            self.limbs.resize(limb_idx + 1, 0);
        }
        self.limbs[limb_idx] |= 1 << (idx % LIMB_BITS);
    }

    /// Shift the magnitude left by `bits`. The sign is kept.
    pub fn shl(&self, bits: usize) -> BigNum {
        if self.is_zero() || bits == 0 {
            return self.clone();
        }
        let limb_shift = bits / LIMB_BITS;
        let bit_shift = bits % LIMB_BITS;
        let mut limbs = vec![0 as Limb; self.limbs.len() + limb_shift + 1];
        for (i, &limb) in self.limbs.iter().enumerate() {
            limbs[i + limb_shift] |= limb << bit_shift;
            if bit_shift != 0 {
                limbs[i + limb_shift + 1] |= limb >> (LIMB_BITS - bit_shift);
            }
        }
        let mut out = BigNum::from_limbs(limbs);
        out.set_negative(self.negative);
        out
    }

    /// Shift the magnitude right by `bits`. The sign is kept.
    pub fn shr(&self, bits: usize) -> BigNum {
        let limb_shift = bits / LIMB_BITS;
        if limb_shift >= self.limbs.len() {
            return BigNum::zero();
        }
        let bit_shift = bits % LIMB_BITS;
        let mut limbs = Vec::with_capacity(self.limbs.len() - limb_shift);
        for i in limb_shift..self.limbs.len() {
            let mut limb = self.limbs[i] >> bit_shift;
            if bit_shift != 0 && i + 1 < self.limbs.len() {
                limb |= self.limbs[i + 1] << (LIMB_BITS - bit_shift);
            }
            limbs.push(limb);
        }
        let mut out = BigNum::from_limbs(limbs);
        out.set_negative(self.negative);
        out
    }

    /// Compare magnitudes, ignoring sign.
    pub fn cmp_mag(&self, other: &BigNum) -> std::cmp::Ordering {
        cmp_limbs(&self.limbs, &other.limbs)
    }

    /// Divide the magnitude by a single non-zero word.
    /// Returns (quotient magnitude, remainder word); the sign is dropped.
    pub(crate) fn div_rem_word(&self, divisor: Limb) -> (BigNum, Limb) {
        let mut quotient = vec![0 as Limb; self.limbs.len()];
        let mut rem: DoubleLimb = 0;
        for i in (0..self.limbs.len()).rev() {
            let acc = (rem << LIMB_BITS) | self.limbs[i] as DoubleLimb;
            quotient[i] = (acc / divisor as DoubleLimb) as Limb;
            rem = acc % divisor as DoubleLimb;
        }
        (BigNum::from_limbs(quotient), rem as Limb)
    }

    /// Drop leading zero limbs and clear the sign of zero.
    pub(crate) fn trim(&mut self) {
        while self.limbs.len() > 1 && self.limbs.last() == Some(&0) {
            self.limbs.pop();
        }
        if self.negative && self.is_zero() {
            self.negative = false;
        }
    }
}

/// Significant bits in a little-endian limb slice.
pub(crate) fn bit_len_limbs(limbs: &[Limb]) -> usize {
    for (i, &limb) in limbs.iter().enumerate().rev() {
        if limb != 0 {
            return i * LIMB_BITS + (LIMB_BITS - limb.leading_zeros() as usize);
        }
    }
    0
}

/// Compare two little-endian limb slices as magnitudes.
pub(crate) fn cmp_limbs(a: &[Limb], b: &[Limb]) -> std::cmp::Ordering {
    for i in (0..a.len().max(b.len())).rev() {
        let x = a.get(i).copied().unwrap_or(0);
        let y = b.get(i).copied().unwrap_or(0);
        if x != y {
            return x.cmp(&y);
        }
    }
    std::cmp::Ordering::Equal
}

impl PartialEq for BigNum {
    fn eq(&self, other: &Self) -> bool {
        // both sides are canonical, so field equality is numeric equality
        self.negative == other.negative && self.limbs == other.limbs
    }
}

impl Eq for BigNum {}

impl PartialOrd for BigNum {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for BigNum {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        use std::cmp::Ordering;
        match (self.negative, other.negative) {
            (true, false) => Ordering::Less,
            (false, true) => Ordering::Greater,
            (false, false) => self.cmp_mag(other),
            (true, true) => other.cmp_mag(self),
        }
    }
}

impl std::fmt::Debug for BigNum {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let sign = if self.negative { "-" } else { "" };
        let hex: String = self.to_bytes_be().iter().map(|b| format!("{b:02x}")).collect();
        write!(f, "BigNum({sign}0x{hex})")
    }
}

impl std::fmt::Display for BigNum {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_decimal())
    }
}
