//! Constant-time helpers for `BigNum`.
//!
//! These avoid value-dependent branches and memory access patterns; the
//! Montgomery reduction path leans on them for its final subtraction and
//! window-table gather.

use crate::bignum::{BigNum, Limb};
use subtle::{Choice, ConstantTimeEq};

impl ConstantTimeEq for BigNum {
    fn ct_eq(&self, other: &Self) -> Choice {
        let mut acc: Limb = (self.is_negative() as Limb) ^ (other.is_negative() as Limb);
        for i in 0..self.limbs().len().max(other.limbs().len()) {
            let a = self.limbs().get(i).copied().unwrap_or(0);
            let b = other.limbs().get(i).copied().unwrap_or(0);
            acc |= a ^ b;
        }
        acc.ct_eq(&0)
    }
}

impl BigNum {
    /// Return `a` when `choice` is 0, `b` when it is 1, without branching
    /// on the choice.
    pub fn ct_select(a: &BigNum, b: &BigNum, choice: Choice) -> BigNum {
        let mask = (choice.unwrap_u8() as Limb).wrapping_neg();
        let len = a.limbs().len().max(b.limbs().len());
        let mut limbs = Vec::with_capacity(len);
        for i in 0..len {
            let av = a.limbs().get(i).copied().unwrap_or(0);
            let bv = b.limbs().get(i).copied().unwrap_or(0);
            limbs.push(av ^ (mask & (av ^ bv)));
        }

        let neg_a = a.is_negative() as Limb;
        let neg_b = b.is_negative() as Limb;
        let neg = neg_a ^ (mask & (neg_a ^ neg_b));
        let mut out = BigNum::from_limbs(limbs);
        out.set_negative(neg != 0);
        out
    }

    /// `self - modulus` if `self >= modulus`, else `self`, with the
    /// comparison folded into the subtraction borrow.
    ///
    /// Both values must be non-negative; the caller (Montgomery reduction)
    /// guarantees `self < 2 * modulus`.
    pub fn ct_sub_if_gte(&self, modulus: &BigNum) -> BigNum {
        let len = self.limbs().len().max(modulus.limbs().len());
        let mut diff = Vec::with_capacity(len);
        let mut borrow: Limb = 0;
        for i in 0..len {
            let a = self.limbs().get(i).copied().unwrap_or(0);
            let b = modulus.limbs().get(i).copied().unwrap_or(0);
            let (d1, underflow1) = a.overflowing_sub(b);
            let (d2, underflow2) = d1.overflowing_sub(borrow);
            diff.push(d2);
            borrow = underflow1 as Limb + underflow2 as Limb;
        }

        // no borrow out means self >= modulus
        let keep_diff = Choice::from((borrow == 0) as u8);
        BigNum::ct_select(self, &BigNum::from_limbs(diff), keep_diff)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ct_eq_matches_eq() {
        let a = BigNum::from_u64(42);
        let b = BigNum::from_u64(42);
        let c = BigNum::from_u64(43);
        let mut d = BigNum::from_u64(42);
        d.set_negative(true);

        assert_eq!(a.ct_eq(&b).unwrap_u8(), 1);
        assert_eq!(a.ct_eq(&c).unwrap_u8(), 0);
        assert_eq!(a.ct_eq(&d).unwrap_u8(), 0);
    }

    #[test]
    fn ct_eq_multi_limb() {
        let a = BigNum::from_u64(7).shl(130);
        let b = BigNum::from_u64(7).shl(130);
        let c = BigNum::from_u64(7).shl(131);
        assert_eq!(a.ct_eq(&b).unwrap_u8(), 1);
        assert_eq!(a.ct_eq(&c).unwrap_u8(), 0);
    }

    #[test]
    fn ct_select_both_ways() {
        let a = BigNum::from_u64(10);
        let b = BigNum::from_u64(1).shl(100);

        assert_eq!(BigNum::ct_select(&a, &b, Choice::from(0)), a);
        assert_eq!(BigNum::ct_select(&a, &b, Choice::from(1)), b);
    }

    #[test]
    fn ct_sub_if_gte_cases() {
        let m = BigNum::from_u64(97);
        assert_eq!(
            BigNum::from_u64(100).ct_sub_if_gte(&m),
            BigNum::from_u64(3)
        );
        assert_eq!(BigNum::from_u64(50).ct_sub_if_gte(&m), BigNum::from_u64(50));
        assert_eq!(BigNum::from_u64(97).ct_sub_if_gte(&m), BigNum::zero());
    }

    #[test]
    fn ct_sub_if_gte_multi_limb() {
        let m = BigNum::from_u64(1).shl(70);
        let just_over = m.add(&BigNum::from_u64(5));
        assert_eq!(just_over.ct_sub_if_gte(&m), BigNum::from_u64(5));
        let just_under = m.sub(&BigNum::from_u64(5));
        assert_eq!(just_under.ct_sub_if_gte(&m), m.sub(&BigNum::from_u64(5)));
    }
}
