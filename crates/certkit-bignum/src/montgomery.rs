//! Montgomery-form modular multiplication and exponentiation.

use crate::bignum::{BigNum, DoubleLimb, Limb, LIMB_BITS};
use certkit_types::CryptoError;
use subtle::ConstantTimeEq;

/// Precomputed state for arithmetic modulo a fixed odd modulus.
///
/// Values are carried in Montgomery form `a * R mod N` with
/// `R = 2^(width * 64)`, which turns each modular reduction into a word
/// shift (REDC) instead of a division.
pub struct MontgomeryCtx {
    modulus: BigNum,
    /// Limb count of the modulus; determines R.
    width: usize,
    /// -N^(-1) mod 2^64.
    neg_inv: Limb,
    /// R^2 mod N, used to enter Montgomery form.
    rr: BigNum,
}

impl MontgomeryCtx {
    /// Build a context for an odd, non-zero modulus.
    pub fn new(modulus: &BigNum) -> Result<Self, CryptoError> {
        if modulus.is_zero() {
            return Err(CryptoError::BnDivisionByZero);
        }
        if modulus.is_even() {
            return Err(CryptoError::InvalidArg);
        }

        let width = modulus.num_limbs();
        let rr = BigNum::from_u64(1)
            .shl(2 * width * LIMB_BITS)
            .mod_reduce(modulus)?;

        Ok(MontgomeryCtx {
            modulus: modulus.clone(),
            width,
            neg_inv: neg_inv_word(modulus.limbs()[0]),
            rr,
        })
    }

    /// The modulus this context reduces by.
    pub fn modulus(&self) -> &BigNum {
        &self.modulus
    }

    /// Enter Montgomery form: a * R mod N.
    pub fn to_mont(&self, a: &BigNum) -> Result<BigNum, CryptoError> {
        let reduced = a.mod_reduce(&self.modulus)?;
        Ok(self.reduce(&reduced.mul(&self.rr)))
    }

    /// Leave Montgomery form: a * R^(-1) mod N.
    pub fn from_mont(&self, a: &BigNum) -> BigNum {
        self.reduce(a)
    }

    /// Multiply two values already in Montgomery form.
    pub fn mont_mul(&self, a: &BigNum, b: &BigNum) -> BigNum {
        self.reduce(&a.mul(b))
    }

    /// Square a value already in Montgomery form.
    pub fn mont_sqr(&self, a: &BigNum) -> BigNum {
        self.reduce(&a.sqr())
    }

    /// REDC (HAC 14.32): for t < N*R, compute t * R^(-1) mod N.
    ///
    /// Each round multiplies out the lowest live word with `q = t[i] * N'`,
    /// so after `width` rounds the low half is zero and the word shift is a
    /// slice. The result is below 2N; the final step subtracts N without a
    /// value-dependent branch.
    fn reduce(&self, t: &BigNum) -> BigNum {
        let width = self.width;
        let mod_limbs = self.modulus.limbs();

        let mut work = vec![0 as Limb; 2 * width + 2];
        let t_limbs = t.limbs();
        let live = t_limbs.len().min(work.len());
        work[..live].copy_from_slice(&t_limbs[..live]);

        for i in 0..width {
            let q = work[i].wrapping_mul(self.neg_inv);
            let mut carry: Limb = 0;
            for j in 0..width {
                let sum = q as DoubleLimb * mod_limbs[j] as DoubleLimb
                    + work[i + j] as DoubleLimb
                    + carry as DoubleLimb;
                work[i + j] = sum as Limb;
                carry = (sum >> LIMB_BITS) as Limb;
            }
            let mut k = i + width;
            while carry != 0 && k < work.len() {
                let sum = work[k] as DoubleLimb + carry as DoubleLimb;
                work[k] = sum as Limb;
                carry = (sum >> LIMB_BITS) as Limb;
                k += 1;
            }
        }

        let shifted = BigNum::from_limbs(work[width..2 * width + 1].to_vec());
        shifted.ct_sub_if_gte(&self.modulus)
    }

    /// base^exp mod N by fixed-window exponentiation.
    ///
    /// The window table is read with a constant-time gather so the memory
    /// access pattern does not depend on exponent bits.
    pub fn mont_exp(&self, base: &BigNum, exp: &BigNum) -> Result<BigNum, CryptoError> {
        if exp.is_zero() {
            if self.modulus.is_one() {
                return Ok(BigNum::zero());
            }
            return Ok(BigNum::from_u64(1));
        }

        let exp_bits = exp.bit_len();
        let window = window_bits_for(exp_bits);
        let table_len = 1usize << window;

        // table[i] = base^i in Montgomery form; table[0] is 1
        let base_mont = self.to_mont(base)?;
        let mut table = Vec::with_capacity(table_len);
        table.push(self.to_mont(&BigNum::from_u64(1))?);
        table.push(base_mont.clone());
        for i in 2..table_len {
            table.push(self.mont_mul(&table[i - 1], &base_mont));
        }

        let mut result = table[0].clone();
        let mut remaining = exp_bits;
        while remaining > 0 {
            let take = window.min(remaining);
            remaining -= take;

            for _ in 0..take {
                result = self.mont_sqr(&result);
            }

            let mut value: u64 = 0;
            for bit in 0..take {
                value |= exp.get_bit(remaining + bit) << bit;
            }

            result = self.mont_mul(&result, &gather(&table, value));
        }

        Ok(self.from_mont(&result))
    }
}

/// Select `table[index]` by scanning every entry.
fn gather(table: &[BigNum], index: u64) -> BigNum {
    let mut picked = table[0].clone();
    for (i, entry) in table.iter().enumerate().skip(1) {
        let hit = (i as u64).ct_eq(&index);
        picked = BigNum::ct_select(&picked, entry, hit);
    }
    picked
}

/// N' with N[0] * N' == -1 (mod 2^64), by Newton iteration on the word
/// inverse. Each step doubles the number of correct low bits.
fn neg_inv_word(n0: Limb) -> Limb {
    let mut inv: Limb = 1;
    for _ in 0..6 {
        inv = inv.wrapping_mul(2u64.wrapping_sub(n0.wrapping_mul(inv)));
    }
    inv.wrapping_neg()
}

/// Window width for an exponent of the given bit length.
fn window_bits_for(bits: usize) -> usize {
    match bits {
        0..=32 => 1,
        33..=64 => 2,
        65..=128 => 3,
        129..=256 => 4,
        257..=512 => 5,
        _ => 6,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn neg_inv_word_property() {
        for n0 in [1u64, 3, 0xFFFF_FFFF_FFFF_FFEF, 0x1234_5678_9ABC_DEF1] {
            let inv = neg_inv_word(n0);
            assert_eq!(n0.wrapping_mul(inv), u64::MAX, "n0={n0:#x}");
        }
    }

    #[test]
    fn even_modulus_rejected() {
        assert!(MontgomeryCtx::new(&BigNum::from_u64(100)).is_err());
        assert!(MontgomeryCtx::new(&BigNum::zero()).is_err());
    }

    #[test]
    fn mont_roundtrip() {
        let ctx = MontgomeryCtx::new(&BigNum::from_u64(0xFFFF_FFFF_FFFF_FFC5)).unwrap();
        let a = BigNum::from_u64(42);
        let back = ctx.from_mont(&ctx.to_mont(&a).unwrap());
        assert_eq!(back, a);
    }

    #[test]
    fn mont_mul_small() {
        let ctx = MontgomeryCtx::new(&BigNum::from_u64(97)).unwrap();
        let a = ctx.to_mont(&BigNum::from_u64(45)).unwrap();
        let b = ctx.to_mont(&BigNum::from_u64(67)).unwrap();
        let c = ctx.from_mont(&ctx.mont_mul(&a, &b));
        // 45 * 67 = 3015 = 31*97 + 8
        assert_eq!(c, BigNum::from_u64(8));
    }

    #[test]
    fn mont_exp_matches_ladder() {
        let ctx = MontgomeryCtx::new(&BigNum::from_u64(97)).unwrap();
        assert_eq!(
            ctx.mont_exp(&BigNum::from_u64(3), &BigNum::from_u64(4)).unwrap(),
            BigNum::from_u64(81)
        );
    }

    #[test]
    fn mont_exp_fermat() {
        // a^(p-1) == 1 (mod p) for prime p
        let p = BigNum::from_u64(0xFFFF_FFFF_FFFF_FFC5);
        let ctx = MontgomeryCtx::new(&p).unwrap();
        let exp = p.sub(&BigNum::from_u64(1));
        for a in [2u64, 3, 5, 42, 1 << 40] {
            let got = ctx.mont_exp(&BigNum::from_u64(a), &exp).unwrap();
            assert_eq!(got, BigNum::from_u64(1), "a={a}");
        }
    }

    #[test]
    fn mont_exp_multi_limb() {
        // 2^255 - 19, verified against a^(p-1) mod p == 1
        let p = {
            let mut n = BigNum::from_u64(1).shl(255);
            n = n.sub(&BigNum::from_u64(19));
            n
        };
        let ctx = MontgomeryCtx::new(&p).unwrap();
        let exp = p.sub(&BigNum::from_u64(1));
        let a = BigNum::from_u64(0xDEAD_BEEF);
        assert_eq!(ctx.mont_exp(&a, &exp).unwrap(), BigNum::from_u64(1));
    }

    #[test]
    fn gather_picks_each_entry() {
        let table: Vec<BigNum> = (0..8).map(BigNum::from_u64).collect();
        for i in 0..8u64 {
            assert_eq!(gather(&table, i), BigNum::from_u64(i));
        }
    }

    #[test]
    fn window_sizing() {
        assert_eq!(window_bits_for(16), 1);
        assert_eq!(window_bits_for(64), 2);
        assert_eq!(window_bits_for(128), 3);
        assert_eq!(window_bits_for(256), 4);
        assert_eq!(window_bits_for(512), 5);
        assert_eq!(window_bits_for(2048), 6);
    }
}
