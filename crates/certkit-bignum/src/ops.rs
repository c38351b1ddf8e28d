//! Arithmetic on `BigNum` values.
//!
//! Signed operations dispatch on the operand signs and delegate to
//! magnitude helpers working on raw limb slices. Division is restoring
//! binary long division; `mod_exp` routes odd moduli through Montgomery
//! exponentiation.

use crate::bignum::{bit_len_limbs, cmp_limbs, BigNum, DoubleLimb, Limb, LIMB_BITS};
use crate::montgomery::MontgomeryCtx;
use certkit_types::CryptoError;

impl BigNum {
    /// self + other.
    pub fn add(&self, other: &BigNum) -> BigNum {
        if self.is_negative() == other.is_negative() {
            let mut sum = BigNum::from_limbs(add_mag(self.limbs(), other.limbs()));
            sum.set_negative(self.is_negative());
            sum
        } else {
            let (mag, flipped) = sub_mag(self.limbs(), other.limbs());
            let mut diff = BigNum::from_limbs(mag);
            // the sign follows the operand with the larger magnitude
            diff.set_negative(if flipped {
                other.is_negative()
            } else {
                self.is_negative()
            });
            diff
        }
    }

    /// self - other.
    pub fn sub(&self, other: &BigNum) -> BigNum {
        if self.is_negative() != other.is_negative() {
            let mut sum = BigNum::from_limbs(add_mag(self.limbs(), other.limbs()));
            sum.set_negative(self.is_negative());
            sum
        } else {
            let (mag, flipped) = sub_mag(self.limbs(), other.limbs());
            let mut diff = BigNum::from_limbs(mag);
            diff.set_negative(if flipped {
                !self.is_negative()
            } else {
                self.is_negative()
            });
            diff
        }
    }

    /// self * other.
    pub fn mul(&self, other: &BigNum) -> BigNum {
        if self.is_zero() || other.is_zero() {
            return BigNum::zero();
        }
        let mut product = BigNum::from_limbs(mul_mag(self.limbs(), other.limbs()));
        product.set_negative(self.is_negative() != other.is_negative());
        product
    }

    /// self * self.
    pub fn sqr(&self) -> BigNum {
        if self.is_zero() {
            return BigNum::zero();
        }
        BigNum::from_limbs(mul_mag(self.limbs(), self.limbs()))
    }

    /// Truncated division: (quotient, remainder).
    ///
    /// The quotient rounds toward zero and the remainder takes the sign of
    /// the dividend, matching Rust's `/` and `%` on primitives.
    pub fn div_rem(&self, divisor: &BigNum) -> Result<(BigNum, BigNum), CryptoError> {
        if divisor.is_zero() {
            return Err(CryptoError::BnDivisionByZero);
        }
        let (q_mag, r_mag) = div_mag(self.limbs(), divisor.limbs());
        let mut quotient = BigNum::from_limbs(q_mag);
        let mut remainder = BigNum::from_limbs(r_mag);
        quotient.set_negative(self.is_negative() != divisor.is_negative());
        remainder.set_negative(self.is_negative());
        Ok((quotient, remainder))
    }

    /// self mod modulus, always in `[0, |modulus|)`.
    pub fn mod_reduce(&self, modulus: &BigNum) -> Result<BigNum, CryptoError> {
        let (_, mut rem) = self.div_rem(modulus)?;
        if rem.is_negative() {
            let mut mag = modulus.clone();
            mag.set_negative(false);
            rem = rem.add(&mag);
        }
        Ok(rem)
    }

    /// self^exp mod modulus.
    ///
    /// Odd moduli (every RSA modulus and prime) go through Montgomery
    /// exponentiation; even moduli fall back to a plain binary ladder.
    pub fn mod_exp(&self, exp: &BigNum, modulus: &BigNum) -> Result<BigNum, CryptoError> {
        if modulus.is_zero() {
            return Err(CryptoError::BnDivisionByZero);
        }
        if exp.is_negative() {
            return Err(CryptoError::InvalidArg);
        }
        if modulus.is_odd() {
            let ctx = MontgomeryCtx::new(modulus)?;
            return ctx.mont_exp(self, exp);
        }

        let mut result = BigNum::from_u64(1).mod_reduce(modulus)?;
        let mut base = self.mod_reduce(modulus)?;
        for i in 0..exp.bit_len() {
            if exp.get_bit(i) == 1 {
                result = result.mul(&base).mod_reduce(modulus)?;
            }
            base = base.sqr().mod_reduce(modulus)?;
        }
        Ok(result)
    }
}

/// |a| + |b|.
fn add_mag(a: &[Limb], b: &[Limb]) -> Vec<Limb> {
    let (long, short) = if a.len() >= b.len() { (a, b) } else { (b, a) };
    let mut out = Vec::with_capacity(long.len() + 1);
    let mut carry: Limb = 0;
    for (i, &limb) in long.iter().enumerate() {
        let rhs = short.get(i).copied().unwrap_or(0);
        let sum = limb as DoubleLimb + rhs as DoubleLimb + carry as DoubleLimb;
        out.push(sum as Limb);
        carry = (sum >> LIMB_BITS) as Limb;
    }
    out.push(carry);
    out
}

/// (| |a| - |b| |, a < b).
fn sub_mag(a: &[Limb], b: &[Limb]) -> (Vec<Limb>, bool) {
    let flipped = cmp_limbs(a, b) == std::cmp::Ordering::Less;
    let (hi, lo) = if flipped { (b, a) } else { (a, b) };
    let mut out = Vec::with_capacity(hi.len());
    let mut borrow: Limb = 0;
    for (i, &limb) in hi.iter().enumerate() {
        let rhs = lo.get(i).copied().unwrap_or(0);
        let (d1, underflow1) = limb.overflowing_sub(rhs);
        let (d2, underflow2) = d1.overflowing_sub(borrow);
        out.push(d2);
        borrow = underflow1 as Limb + underflow2 as Limb;
    }
    (out, flipped)
}

/// |a| * |b|, schoolbook.
fn mul_mag(a: &[Limb], b: &[Limb]) -> Vec<Limb> {
    let mut out = vec![0 as Limb; a.len() + b.len()];
    for (i, &av) in a.iter().enumerate() {
        if av == 0 {
            continue;
        }
        let mut carry: Limb = 0;
        for (j, &bv) in b.iter().enumerate() {
            let t = av as DoubleLimb * bv as DoubleLimb
                + out[i + j] as DoubleLimb
                + carry as DoubleLimb;
            out[i + j] = t as Limb;
            carry = (t >> LIMB_BITS) as Limb;
        }
        out[i + b.len()] = carry;
    }
    out
}

/// Restoring binary long division on magnitudes: (|a| / |b|, |a| mod |b|).
fn div_mag(a: &[Limb], b: &[Limb]) -> (Vec<Limb>, Vec<Limb>) {
    if cmp_limbs(a, b) == std::cmp::Ordering::Less {
        return (vec![0], a.to_vec());
    }

    let a_bits = bit_len_limbs(a);
    let mut quotient = vec![0 as Limb; a.len()];
    let mut rem: Vec<Limb> = vec![0];

    for i in (0..a_bits).rev() {
        shl1_in_place(&mut rem);
        rem[0] |= (a[i / LIMB_BITS] >> (i % LIMB_BITS)) & 1;
        if cmp_limbs(&rem, b) != std::cmp::Ordering::Less {
            sub_in_place(&mut rem, b);
            quotient[i / LIMB_BITS] |= 1 << (i % LIMB_BITS);
        }
    }

    (quotient, rem)
}

fn shl1_in_place(v: &mut Vec<Limb>) {
    let mut carry: Limb = 0;
    for limb in v.iter_mut() {
        let next = *limb >> (LIMB_BITS - 1);
        *limb = (*limb << 1) | carry;
        carry = next;
    }
    if carry != 0 {
        v.push(carry);
    }
}

/// v -= b, assuming v >= b.
fn sub_in_place(v: &mut [Limb], b: &[Limb]) {
    let mut borrow: Limb = 0;
    for (i, limb) in v.iter_mut().enumerate() {
        let rhs = b.get(i).copied().unwrap_or(0);
        let (d1, underflow1) = limb.overflowing_sub(rhs);
        let (d2, underflow2) = d1.overflowing_sub(borrow);
        *limb = d2;
        borrow = underflow1 as Limb + underflow2 as Limb;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn neg(v: u64) -> BigNum {
        let mut n = BigNum::from_u64(v);
        n.set_negative(true);
        n
    }

    #[test]
    fn add_sub_signed() {
        let five = BigNum::from_u64(5);
        let three = BigNum::from_u64(3);

        assert_eq!(five.add(&three), BigNum::from_u64(8));
        assert_eq!(five.add(&neg(3)), BigNum::from_u64(2));
        assert_eq!(three.add(&neg(5)), neg(2));
        assert_eq!(neg(5).add(&neg(3)), neg(8));

        assert_eq!(five.sub(&three), BigNum::from_u64(2));
        assert_eq!(three.sub(&five), neg(2));
        assert_eq!(neg(3).sub(&neg(5)), BigNum::from_u64(2));
        assert_eq!(neg(5).sub(&three), neg(8));
        assert_eq!(five.sub(&five), BigNum::zero());
    }

    #[test]
    fn add_carries_across_limbs() {
        let max = BigNum::from_u64(u64::MAX);
        let sum = max.add(&BigNum::from_u64(1));
        assert_eq!(sum, BigNum::from_u64(1).shl(64));
        assert_eq!(sum.sub(&BigNum::from_u64(1)), max);
    }

    #[test]
    fn mul_basic_and_signs() {
        let a = BigNum::from_u64(12345);
        let b = BigNum::from_u64(67890);
        assert_eq!(a.mul(&b), BigNum::from_u64(12345 * 67890));
        assert_eq!(a.mul(&neg(2)), neg(24690));
        assert_eq!(neg(3).mul(&neg(3)), BigNum::from_u64(9));
        assert_eq!(a.mul(&BigNum::zero()), BigNum::zero());
    }

    #[test]
    fn mul_multi_limb() {
        // (2^64 - 1)^2 = 2^128 - 2^65 + 1
        let max = BigNum::from_u64(u64::MAX);
        let sq = max.sqr();
        let expect = BigNum::from_u64(1)
            .shl(128)
            .sub(&BigNum::from_u64(1).shl(65))
            .add(&BigNum::from_u64(1));
        assert_eq!(sq, expect);
    }

    #[test]
    fn div_rem_basic() {
        let a = BigNum::from_u64(100);
        let b = BigNum::from_u64(7);
        let (q, r) = a.div_rem(&b).unwrap();
        assert_eq!(q, BigNum::from_u64(14));
        assert_eq!(r, BigNum::from_u64(2));
    }

    #[test]
    fn div_rem_signs() {
        let (q, r) = neg(100).div_rem(&BigNum::from_u64(7)).unwrap();
        assert_eq!(q, neg(14));
        assert_eq!(r, neg(2));
        let (q, r) = BigNum::from_u64(100).div_rem(&neg(7)).unwrap();
        assert_eq!(q, neg(14));
        assert_eq!(r, BigNum::from_u64(2));
    }

    #[test]
    fn div_rem_multi_limb() {
        let a = BigNum::from_decimal("340282366920938463463374607431768211455").unwrap();
        let b = BigNum::from_decimal("18446744073709551629").unwrap();
        let (q, r) = a.div_rem(&b).unwrap();
        assert_eq!(q.mul(&b).add(&r), a);
        assert!(r < b);
    }

    #[test]
    fn div_by_zero_rejected() {
        assert!(BigNum::from_u64(1).div_rem(&BigNum::zero()).is_err());
    }

    #[test]
    fn mod_reduce_is_canonical() {
        let m = BigNum::from_u64(7);
        assert_eq!(BigNum::from_u64(100).mod_reduce(&m).unwrap(), BigNum::from_u64(2));
        // negative input still lands in [0, m)
        assert_eq!(neg(1).mod_reduce(&m).unwrap(), BigNum::from_u64(6));
        assert_eq!(neg(14).mod_reduce(&m).unwrap(), BigNum::zero());
    }

    #[test]
    fn mod_exp_small() {
        let base = BigNum::from_u64(4);
        let exp = BigNum::from_u64(13);
        let m = BigNum::from_u64(497);
        // 4^13 mod 497 = 445
        assert_eq!(base.mod_exp(&exp, &m).unwrap(), BigNum::from_u64(445));
    }

    #[test]
    fn mod_exp_even_modulus() {
        let base = BigNum::from_u64(3);
        let exp = BigNum::from_u64(5);
        let m = BigNum::from_u64(100);
        // 243 mod 100 = 43
        assert_eq!(base.mod_exp(&exp, &m).unwrap(), BigNum::from_u64(43));
    }

    #[test]
    fn mod_exp_zero_exponent() {
        let m = BigNum::from_u64(97);
        assert_eq!(
            BigNum::from_u64(42).mod_exp(&BigNum::zero(), &m).unwrap(),
            BigNum::from_u64(1)
        );
        assert_eq!(
            BigNum::from_u64(42)
                .mod_exp(&BigNum::zero(), &BigNum::from_u64(1))
                .unwrap(),
            BigNum::zero()
        );
    }
}
