//! Key identifier computation (RFC 5280 §4.2.1.2).
//!
//! Both derivation methods hash the subjectPublicKey BIT STRING
//! payload, excluding tag, length, and the unused-bits octet, which is
//! what `openssl x509 -ext subjectKeyIdentifier` hashes as well. The
//! same key therefore yields the same identifier whether it arrives
//! inside a certificate, a certification request, an SPKAC blob, or a
//! bare SubjectPublicKeyInfo.

use certkit_crypto::hash;
use certkit_types::{HashAlgId, X509Error};
use certkit_utils::asn1::Decoder;
use certkit_utils::pem;

use super::certificate::{Certificate, SubjectPublicKeyInfo};
use super::csr::CertificationRequest;
use super::spkac::SignedPublicKeyAndChallenge;

/// The key sources an identifier can be computed from.
#[derive(Debug, Clone, Copy)]
pub enum KeyMaterial<'a> {
    Certificate(&'a Certificate),
    Request(&'a CertificationRequest),
    Spkac(&'a SignedPublicKeyAndChallenge),
    PublicKeyInfo(&'a SubjectPublicKeyInfo),
    /// PEM armor or bare DER of a SubjectPublicKeyInfo.
    Encoded(&'a [u8]),
}

/// How the SHA-1 of the key is folded into an identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyIdMethod {
    /// The full 160-bit hash (RFC 5280 §4.2.1.2 method 1).
    Sha1,
    /// The least significant 60 bits of the hash behind a 0100 type
    /// nibble, 8 bytes in all (RFC 5280 §4.2.1.2 method 2).
    Sha1Truncated,
}

/// Derives the key identifier for `source`.
pub fn compute_key_identifier(
    source: KeyMaterial<'_>,
    method: KeyIdMethod,
) -> Result<Vec<u8>, X509Error> {
    let key_bits = match source {
        KeyMaterial::Certificate(cert) => &cert.subject_public_key_info.subject_public_key,
        KeyMaterial::Request(csr) => &csr.subject_public_key_info.subject_public_key,
        KeyMaterial::Spkac(spkac) => &spkac.subject_public_key_info.subject_public_key,
        KeyMaterial::PublicKeyInfo(spki) => &spki.subject_public_key,
        KeyMaterial::Encoded(input) => {
            let spki = parse_public_key_info(input)?;
            let digest = hash::digest(HashAlgId::Sha1, &spki.subject_public_key)?;
            return Ok(fold(digest, method));
        }
    };
    let digest = hash::digest(HashAlgId::Sha1, key_bits)?;
    Ok(fold(digest, method))
}

fn fold(digest: Vec<u8>, method: KeyIdMethod) -> Vec<u8> {
    match method {
        KeyIdMethod::Sha1 => digest,
        KeyIdMethod::Sha1Truncated => {
            let mut id = digest[digest.len() - 8..].to_vec();
            id[0] = (id[0] & 0x0F) | 0x40;
            id
        }
    }
}

fn parse_public_key_info(input: &[u8]) -> Result<SubjectPublicKeyInfo, X509Error> {
    let der;
    let data = match std::str::from_utf8(input).ok().and_then(pem::scrub) {
        Some(scrubbed) => {
            der = scrubbed;
            der.as_slice()
        }
        None => input,
    };
    let mut dec = Decoder::new(data);
    SubjectPublicKeyInfo::from_decoder(&mut dec)
}

#[cfg(test)]
mod tests {
    use super::super::fixtures;
    use super::*;

    #[test]
    fn test_full_hash_matches_issued_ski() {
        let ca = Certificate::from_pem(fixtures::CA_PEM).unwrap();
        let id = compute_key_identifier(KeyMaterial::Certificate(&ca), KeyIdMethod::Sha1).unwrap();
        assert_eq!(id, fixtures::CA_SKI);

        let leaf = Certificate::from_pem(fixtures::LEAF_PEM).unwrap();
        let id =
            compute_key_identifier(KeyMaterial::Certificate(&leaf), KeyIdMethod::Sha1).unwrap();
        assert_eq!(id, fixtures::LEAF_SKI);
    }

    #[test]
    fn test_truncated_method() {
        let ca = Certificate::from_pem(fixtures::CA_PEM).unwrap();
        let full =
            compute_key_identifier(KeyMaterial::Certificate(&ca), KeyIdMethod::Sha1).unwrap();
        let id = compute_key_identifier(KeyMaterial::Certificate(&ca), KeyIdMethod::Sha1Truncated)
            .unwrap();

        assert_eq!(id.len(), 8);
        assert_eq!(id[0] >> 4, 0x4);
        // Everything below the type nibble comes from the hash tail.
        assert_eq!(id[0] & 0x0F, full[12] & 0x0F);
        assert_eq!(id[1..], full[13..]);
    }

    #[test]
    fn test_same_key_same_identifier_across_documents() {
        let leaf = Certificate::from_pem(fixtures::LEAF_PEM).unwrap();
        let csr = CertificationRequest::from_pem(fixtures::LEAF_CSR_PEM).unwrap();
        let spkac = SignedPublicKeyAndChallenge::load(fixtures::SPKAC_LINE.as_bytes()).unwrap();

        let from_cert =
            compute_key_identifier(KeyMaterial::Certificate(&leaf), KeyIdMethod::Sha1).unwrap();
        let from_csr =
            compute_key_identifier(KeyMaterial::Request(&csr), KeyIdMethod::Sha1).unwrap();
        let from_spkac =
            compute_key_identifier(KeyMaterial::Spkac(&spkac), KeyIdMethod::Sha1).unwrap();

        assert_eq!(from_cert, from_csr);
        assert_eq!(from_cert, from_spkac);
    }

    #[test]
    fn test_encoded_key_with_and_without_armor() {
        let ca = Certificate::from_pem(fixtures::CA_PEM).unwrap();
        let der = ca.subject_public_key_info.to_der();

        let id = compute_key_identifier(KeyMaterial::Encoded(&der), KeyIdMethod::Sha1).unwrap();
        assert_eq!(id, fixtures::CA_SKI);

        let armored = pem::encode("PUBLIC KEY", &der);
        let id = compute_key_identifier(KeyMaterial::Encoded(armored.as_bytes()), KeyIdMethod::Sha1)
            .unwrap();
        assert_eq!(id, fixtures::CA_SKI);
    }

    #[test]
    fn test_bare_key_info() {
        let ca = Certificate::from_pem(fixtures::CA_PEM).unwrap();
        let spki = ca.subject_public_key_info.clone();
        let id =
            compute_key_identifier(KeyMaterial::PublicKeyInfo(&spki), KeyIdMethod::Sha1).unwrap();
        assert_eq!(id, fixtures::CA_SKI);
    }

    #[test]
    fn test_encoded_garbage_is_an_error() {
        let outcome = compute_key_identifier(KeyMaterial::Encoded(b"junk"), KeyIdMethod::Sha1);
        assert!(outcome.is_err());
    }
}
