//! Random big number generation backed by OS randomness.

use crate::bignum::BigNum;
use certkit_types::CryptoError;

/// Big-endian buffer of `bits` random bits with the excess high bits masked.
fn random_bytes(bits: usize) -> Result<Vec<u8>, CryptoError> {
    let mut buf = vec![0u8; bits.div_ceil(8)];
    getrandom::getrandom(&mut buf).map_err(|_| CryptoError::BnRandGenFail)?;
    let excess = buf.len() * 8 - bits;
    if excess > 0 {
        buf[0] &= 0xFF >> excess;
    }
    Ok(buf)
}

impl BigNum {
    /// Random value with exactly `bits` significant bits; the top bit is
    /// always set. With `odd`, the low bit is forced to 1 as well.
    pub fn random(bits: usize, odd: bool) -> Result<BigNum, CryptoError> {
        if bits == 0 {
            return Ok(BigNum::zero());
        }

        let mut result = BigNum::from_bytes_be(&random_bytes(bits)?);
        result.set_bit(bits - 1);
        if odd {
            result.set_bit(0);
        }
        Ok(result)
    }

    /// Random value uniform in [1, upper), by rejection sampling.
    pub fn random_range(upper: &BigNum) -> Result<BigNum, CryptoError> {
        if upper.is_negative() || upper.is_zero() || upper.is_one() {
            return Err(CryptoError::InvalidArg);
        }

        let bits = upper.bit_len();
        loop {
            let candidate = BigNum::from_bytes_be(&random_bytes(bits)?);
            if !candidate.is_zero() && candidate < *upper {
                return Ok(candidate);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn random_has_exact_bit_length() {
        for bits in [1, 7, 8, 15, 16, 63, 64, 65, 127, 128, 256] {
            let r = BigNum::random(bits, false).unwrap();
            assert_eq!(r.bit_len(), bits, "random({bits}) produced wrong bit_len");
        }
    }

    #[test]
    fn random_odd_forces_low_bit() {
        let r = BigNum::random(128, true).unwrap();
        assert!(r.is_odd());
        assert_eq!(r.bit_len(), 128);
    }

    #[test]
    fn random_zero_bits_is_zero() {
        assert!(BigNum::random(0, false).unwrap().is_zero());
    }

    #[test]
    fn random_range_stays_in_bounds() {
        let upper = BigNum::from_u64(1000);
        for _ in 0..50 {
            let r = BigNum::random_range(&upper).unwrap();
            assert!(!r.is_zero());
            assert!(r < upper);
        }
    }

    #[test]
    fn random_range_singleton() {
        // [1, 2) only contains 1
        let upper = BigNum::from_u64(2);
        assert!(BigNum::random_range(&upper).unwrap().is_one());
    }

    #[test]
    fn random_range_rejects_degenerate_bounds() {
        for upper in [BigNum::zero(), BigNum::from_u64(1)] {
            assert!(matches!(
                BigNum::random_range(&upper),
                Err(CryptoError::InvalidArg)
            ));
        }
        let mut negative = BigNum::from_u64(5);
        negative.set_negative(true);
        assert!(BigNum::random_range(&negative).is_err());
    }
}
