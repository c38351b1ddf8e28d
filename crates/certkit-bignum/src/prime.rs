//! Probabilistic primality testing.

use crate::bignum::{BigNum, Limb, LIMB_BITS};
use certkit_types::CryptoError;

/// Trial-division primes below 256.
const SMALL_PRIMES: [Limb; 54] = [
    2, 3, 5, 7, 11, 13, 17, 19, 23, 29, 31, 37, 41, 43, 47, 53, 59, 61, 67, 71, 73, 79, 83, 89,
    97, 101, 103, 107, 109, 113, 127, 131, 137, 139, 149, 151, 157, 163, 167, 173, 179, 181, 191,
    193, 197, 199, 211, 223, 227, 229, 233, 239, 241, 251,
];

impl BigNum {
    /// Miller-Rabin primality test with `rounds` random witnesses,
    /// preceded by trial division against the small primes.
    pub fn is_probably_prime(&self, rounds: usize) -> Result<bool, CryptoError> {
        let one = BigNum::from_u64(1);
        if self.is_negative() || self.is_zero() || *self == one {
            return Ok(false);
        }

        for &p in &SMALL_PRIMES {
            if *self == BigNum::from_u64(p) {
                return Ok(true);
            }
            let (_, rem) = self.div_rem_word(p);
            if rem == 0 {
                return Ok(false);
            }
        }
        // every survivor of trial division is > 255, so n-2 below is a
        // valid sampling bound

        // n - 1 = d * 2^r with d odd
        let n_minus_one = self.sub(&one);
        let r = trailing_zero_bits(&n_minus_one);
        let d = n_minus_one.shr(r);

        let n_minus_two = self.sub(&BigNum::from_u64(2));

        for _ in 0..rounds {
            // witness uniform in [2, n-2]
            let witness = BigNum::random_range(&n_minus_two)?.add(&one);

            let mut x = witness.mod_exp(&d, self)?;
            if x == one || x == n_minus_one {
                continue;
            }

            let mut probable = false;
            for _ in 1..r {
                x = x.sqr().mod_reduce(self)?;
                if x == n_minus_one {
                    probable = true;
                    break;
                }
            }
            if !probable {
                return Ok(false);
            }
        }

        Ok(true)
    }
}

/// Count of trailing zero bits; zero input gives zero.
fn trailing_zero_bits(n: &BigNum) -> usize {
    for (i, &limb) in n.limbs().iter().enumerate() {
        if limb != 0 {
            return i * LIMB_BITS + limb.trailing_zeros() as usize;
        }
    }
    0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn small_primes_accepted() {
        for &p in &SMALL_PRIMES {
            assert!(
                BigNum::from_u64(p).is_probably_prime(10).unwrap(),
                "{p} is prime"
            );
        }
    }

    #[test]
    fn small_composites_rejected() {
        for n in [0u64, 1, 4, 15, 255, 1001, 65535] {
            assert!(
                !BigNum::from_u64(n).is_probably_prime(10).unwrap(),
                "{n} is not prime"
            );
        }
    }

    #[test]
    fn medium_primes_accepted() {
        // primes above the trial-division table
        for p in [257u64, 65537, 4294967291, (1 << 61) - 1] {
            assert!(
                BigNum::from_u64(p).is_probably_prime(10).unwrap(),
                "{p} is prime"
            );
        }
    }

    #[test]
    fn carmichael_number_rejected() {
        // 561 = 3 * 11 * 17 falls to trial division; 1105 and 41041 too
        for n in [561u64, 1105, 41041] {
            assert!(!BigNum::from_u64(n).is_probably_prime(10).unwrap());
        }
        // 530881 = 13 * 97 * 421 survives the small-prime table
        assert!(!BigNum::from_u64(530881).is_probably_prime(10).unwrap());
    }

    #[test]
    fn large_prime_accepted() {
        // 2^127 - 1, Mersenne
        let p = BigNum::from_u64(1).shl(127).sub(&BigNum::from_u64(1));
        assert!(p.is_probably_prime(5).unwrap());
    }

    #[test]
    fn large_composite_rejected() {
        // 2^128 + 1 = 59649589127497217 * 5704689200685129054721
        let n = BigNum::from_u64(1).shl(128).add(&BigNum::from_u64(1));
        assert!(!n.is_probably_prime(5).unwrap());
    }

    #[test]
    fn trailing_zero_count() {
        assert_eq!(trailing_zero_bits(&BigNum::from_u64(1)), 0);
        assert_eq!(trailing_zero_bits(&BigNum::from_u64(8)), 3);
        assert_eq!(trailing_zero_bits(&BigNum::from_u64(1).shl(100)), 100);
    }
}
