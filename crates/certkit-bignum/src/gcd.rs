//! Greatest common divisor and modular inverse.

use crate::bignum::BigNum;
use certkit_types::CryptoError;

impl BigNum {
    /// gcd(self, other) by the Euclidean algorithm. Signs are ignored;
    /// gcd(0, 0) is rejected.
    pub fn gcd(&self, other: &BigNum) -> Result<BigNum, CryptoError> {
        if self.is_zero() && other.is_zero() {
            return Err(CryptoError::InvalidArg);
        }

        let mut a = self.clone();
        a.set_negative(false);
        let mut b = other.clone();
        b.set_negative(false);

        while !b.is_zero() {
            let (_, rem) = a.div_rem(&b)?;
            a = b;
            b = rem;
        }
        Ok(a)
    }

    /// self^(-1) mod modulus, via the extended Euclidean algorithm.
    ///
    /// Fails with `BnNoInverse` when gcd(self, modulus) != 1.
    pub fn mod_inv(&self, modulus: &BigNum) -> Result<BigNum, CryptoError> {
        if modulus.is_zero() || modulus.is_one() {
            return Err(CryptoError::InvalidArg);
        }

        // Invariant: r_prev = s_prev * self (mod modulus); the second
        // cofactor is never needed.
        let mut r_prev = self.mod_reduce(modulus)?;
        if r_prev.is_zero() {
            return Err(CryptoError::BnNoInverse);
        }
        let mut r = modulus.clone();
        let mut s_prev = BigNum::from_u64(1);
        let mut s = BigNum::zero();

        while !r.is_zero() {
            let (quotient, rem) = r_prev.div_rem(&r)?;
            r_prev = r;
            r = rem;

            let s_next = s_prev.sub(&quotient.mul(&s));
            s_prev = s;
            s = s_next;
        }

        if !r_prev.is_one() {
            return Err(CryptoError::BnNoInverse);
        }
        // s_prev may be negative; reduction makes it canonical
        s_prev.mod_reduce(modulus)
    }
}
