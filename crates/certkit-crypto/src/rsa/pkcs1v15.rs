//! PKCS#1 v1.5 padding for RSA signatures (RFC 8017).

use certkit_types::{CryptoError, HashAlgId};

/// DigestInfo DER prefix for MD2 (OID 1.2.840.113549.2.2).
const DIGEST_INFO_MD2: &[u8] = &[
    0x30, 0x20, 0x30, 0x0c, 0x06, 0x08, 0x2a, 0x86, 0x48, 0x86, 0xf7, 0x0d, 0x02, 0x02, 0x05,
    0x00, 0x04, 0x10,
];

/// DigestInfo DER prefix for MD5 (OID 1.2.840.113549.2.5).
const DIGEST_INFO_MD5: &[u8] = &[
    0x30, 0x20, 0x30, 0x0c, 0x06, 0x08, 0x2a, 0x86, 0x48, 0x86, 0xf7, 0x0d, 0x02, 0x05, 0x05,
    0x00, 0x04, 0x10,
];

/// DigestInfo DER prefix for SHA-1 (OID 1.3.14.3.2.26).
const DIGEST_INFO_SHA1: &[u8] = &[
    0x30, 0x21, 0x30, 0x09, 0x06, 0x05, 0x2b, 0x0e, 0x03, 0x02, 0x1a, 0x05, 0x00, 0x04, 0x14,
];

/// DigestInfo DER prefix for SHA-224 (OID 2.16.840.1.101.3.4.2.4).
const DIGEST_INFO_SHA224: &[u8] = &[
    0x30, 0x2d, 0x30, 0x0d, 0x06, 0x09, 0x60, 0x86, 0x48, 0x01, 0x65, 0x03, 0x04, 0x02, 0x04,
    0x05, 0x00, 0x04, 0x1c,
];

/// DigestInfo DER prefix for SHA-256 (OID 2.16.840.1.101.3.4.2.1).
const DIGEST_INFO_SHA256: &[u8] = &[
    0x30, 0x31, 0x30, 0x0d, 0x06, 0x09, 0x60, 0x86, 0x48, 0x01, 0x65, 0x03, 0x04, 0x02, 0x01,
    0x05, 0x00, 0x04, 0x20,
];

/// DigestInfo DER prefix for SHA-384 (OID 2.16.840.1.101.3.4.2.2).
const DIGEST_INFO_SHA384: &[u8] = &[
    0x30, 0x41, 0x30, 0x0d, 0x06, 0x09, 0x60, 0x86, 0x48, 0x01, 0x65, 0x03, 0x04, 0x02, 0x02,
    0x05, 0x00, 0x04, 0x30,
];

/// DigestInfo DER prefix for SHA-512 (OID 2.16.840.1.101.3.4.2.3).
const DIGEST_INFO_SHA512: &[u8] = &[
    0x30, 0x51, 0x30, 0x0d, 0x06, 0x09, 0x60, 0x86, 0x48, 0x01, 0x65, 0x03, 0x04, 0x02, 0x03,
    0x05, 0x00, 0x04, 0x40,
];

/// Return the DigestInfo prefix for a hash algorithm.
///
/// Dispatch is by algorithm, not digest length: MD2 and MD5 both produce
/// 16-byte digests but carry different OIDs.
fn digest_info_prefix(alg: HashAlgId) -> &'static [u8] {
    match alg {
        HashAlgId::Md2 => DIGEST_INFO_MD2,
        HashAlgId::Md5 => DIGEST_INFO_MD5,
        HashAlgId::Sha1 => DIGEST_INFO_SHA1,
        HashAlgId::Sha224 => DIGEST_INFO_SHA224,
        HashAlgId::Sha256 => DIGEST_INFO_SHA256,
        HashAlgId::Sha384 => DIGEST_INFO_SHA384,
        HashAlgId::Sha512 => DIGEST_INFO_SHA512,
    }
}

/// EMSA-PKCS1-v1_5 encoding for signatures (RFC 8017 9.2).
///
/// EM = 0x00 || 0x01 || PS || 0x00 || DigestInfo
/// where PS consists of 0xFF bytes with length >= 8.
pub(crate) fn pkcs1v15_sign_pad(
    alg: HashAlgId,
    digest: &[u8],
    k: usize,
) -> Result<Vec<u8>, CryptoError> {
    if digest.len() != alg.output_size() {
        return Err(CryptoError::InvalidArg);
    }
    let prefix = digest_info_prefix(alg);
    let t_len = prefix.len() + digest.len();

    // k must be at least t_len + 11 (3 header bytes + 8 min padding)
    if k < t_len + 11 {
        return Err(CryptoError::RsaInvalidPadding);
    }

    let ps_len = k - t_len - 3;
    let mut em = Vec::with_capacity(k);
    em.push(0x00);
    em.push(0x01);
    em.extend(std::iter::repeat(0xFF).take(ps_len));
    em.push(0x00);
    em.extend_from_slice(prefix);
    em.extend_from_slice(digest);

    debug_assert_eq!(em.len(), k);
    Ok(em)
}

/// EMSA-PKCS1-v1_5 verification (RFC 8017 9.2).
///
/// Checks that `em` has the structure: 0x00 || 0x01 || PS || 0x00 || DigestInfo
/// and that the embedded digest matches.
pub(crate) fn pkcs1v15_verify_unpad(
    alg: HashAlgId,
    em: &[u8],
    expected_digest: &[u8],
    k: usize,
) -> Result<bool, CryptoError> {
    // Reconstruct the expected EM and compare
    let expected_em = pkcs1v15_sign_pad(alg, expected_digest, k)?;

    // Constant-time comparison
    use subtle::ConstantTimeEq;
    Ok(em.ct_eq(&expected_em).into())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sign_pad_sha256_structure() {
        let digest = vec![0xAA; 32];
        let k = 128; // RSA-1024 modulus length
        let em = pkcs1v15_sign_pad(HashAlgId::Sha256, &digest, k).unwrap();

        assert_eq!(em.len(), k);
        assert_eq!(em[0], 0x00);
        assert_eq!(em[1], 0x01);

        // PS should be all 0xFF
        let t_len = DIGEST_INFO_SHA256.len() + 32;
        let ps_len = k - t_len - 3;
        for &b in &em[2..2 + ps_len] {
            assert_eq!(b, 0xFF);
        }

        // Separator
        assert_eq!(em[2 + ps_len], 0x00);

        // DigestInfo prefix
        assert_eq!(
            &em[3 + ps_len..3 + ps_len + DIGEST_INFO_SHA256.len()],
            DIGEST_INFO_SHA256
        );

        // Digest
        assert_eq!(&em[3 + ps_len + DIGEST_INFO_SHA256.len()..], &digest[..]);
    }

    #[test]
    fn test_sign_pad_all_algorithms() {
        for (alg, len) in [
            (HashAlgId::Md2, 16),
            (HashAlgId::Md5, 16),
            (HashAlgId::Sha1, 20),
            (HashAlgId::Sha224, 28),
            (HashAlgId::Sha256, 32),
            (HashAlgId::Sha384, 48),
            (HashAlgId::Sha512, 64),
        ] {
            let digest = vec![0xBB; len];
            let em = pkcs1v15_sign_pad(alg, &digest, 128).unwrap();
            assert_eq!(em.len(), 128, "{}", alg.name());
            assert!(em.ends_with(&digest), "{}", alg.name());
        }
    }

    #[test]
    fn test_md2_and_md5_prefixes_differ() {
        // Same digest length, different DigestInfo OIDs
        let digest = vec![0xCC; 16];
        let em_md2 = pkcs1v15_sign_pad(HashAlgId::Md2, &digest, 128).unwrap();
        let em_md5 = pkcs1v15_sign_pad(HashAlgId::Md5, &digest, 128).unwrap();
        assert_ne!(em_md2, em_md5);
    }

    #[test]
    fn test_sign_pad_wrong_digest_length() {
        let digest = vec![0xEE; 20]; // SHA-1 length, wrong for SHA-256
        assert!(pkcs1v15_sign_pad(HashAlgId::Sha256, &digest, 128).is_err());
    }

    #[test]
    fn test_sign_pad_k_too_small() {
        let digest = vec![0xAA; 32];
        // For SHA-256: t_len = 19 + 32 = 51, need k >= 51 + 11 = 62
        assert!(pkcs1v15_sign_pad(HashAlgId::Sha256, &digest, 61).is_err());
        assert!(pkcs1v15_sign_pad(HashAlgId::Sha256, &digest, 62).is_ok());
    }

    #[test]
    fn test_verify_unpad_roundtrip() {
        let digest = vec![0x42; 32];
        let k = 128;
        let em = pkcs1v15_sign_pad(HashAlgId::Sha256, &digest, k).unwrap();
        let ok = pkcs1v15_verify_unpad(HashAlgId::Sha256, &em, &digest, k).unwrap();
        assert!(ok);
    }

    #[test]
    fn test_verify_unpad_wrong_digest() {
        let digest = vec![0x42; 32];
        let k = 128;
        let em = pkcs1v15_sign_pad(HashAlgId::Sha256, &digest, k).unwrap();

        let wrong = vec![0x43; 32];
        let ok = pkcs1v15_verify_unpad(HashAlgId::Sha256, &em, &wrong, k).unwrap();
        assert!(!ok);
    }

    #[test]
    fn test_verify_unpad_wrong_algorithm() {
        // A signature padded for MD5 must not verify as MD2
        let digest = vec![0x42; 16];
        let k = 128;
        let em = pkcs1v15_sign_pad(HashAlgId::Md5, &digest, k).unwrap();
        let ok = pkcs1v15_verify_unpad(HashAlgId::Md2, &em, &digest, k).unwrap();
        assert!(!ok);
    }
}
