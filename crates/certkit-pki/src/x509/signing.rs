//! PKCS#1 v1.5 signature suites shared by certificates, CSRs, CRLs, and
//! SPKAC documents.

use certkit_crypto::hash;
use certkit_crypto::rsa::RsaPrivateKey;
use certkit_types::{HashAlgId, X509Error};
use certkit_utils::oid::{known, Oid};

use super::certificate::{AlgorithmIdentifier, AlgorithmParams, SubjectPublicKeyInfo};

// ---------------------------------------------------------------------------
// Suite table
// ---------------------------------------------------------------------------

/// Map a signature algorithm OID to the digest it pairs with RSA.
///
/// Returns `None` for anything outside the seven `*WithRSAEncryption`
/// suites (RFC 3279 §2.2.1, RFC 4055 §5), which callers report as an
/// indeterminate check rather than a failed one.
pub(crate) fn signature_hash(oid: &Oid) -> Option<HashAlgId> {
    if *oid == known::md2_with_rsa_encryption() {
        Some(HashAlgId::Md2)
    } else if *oid == known::md5_with_rsa_encryption() {
        Some(HashAlgId::Md5)
    } else if *oid == known::sha1_with_rsa_encryption() {
        Some(HashAlgId::Sha1)
    } else if *oid == known::sha224_with_rsa_encryption() {
        Some(HashAlgId::Sha224)
    } else if *oid == known::sha256_with_rsa_encryption() {
        Some(HashAlgId::Sha256)
    } else if *oid == known::sha384_with_rsa_encryption() {
        Some(HashAlgId::Sha384)
    } else if *oid == known::sha512_with_rsa_encryption() {
        Some(HashAlgId::Sha512)
    } else {
        None
    }
}

/// The AlgorithmIdentifier naming `hash` with RSA, parameters NULL.
pub(crate) fn signature_algorithm(hash: HashAlgId) -> AlgorithmIdentifier {
    let oid = match hash {
        HashAlgId::Md2 => known::md2_with_rsa_encryption(),
        HashAlgId::Md5 => known::md5_with_rsa_encryption(),
        HashAlgId::Sha1 => known::sha1_with_rsa_encryption(),
        HashAlgId::Sha224 => known::sha224_with_rsa_encryption(),
        HashAlgId::Sha256 => known::sha256_with_rsa_encryption(),
        HashAlgId::Sha384 => known::sha384_with_rsa_encryption(),
        HashAlgId::Sha512 => known::sha512_with_rsa_encryption(),
    };
    AlgorithmIdentifier {
        oid,
        params: AlgorithmParams::Null,
    }
}

// ---------------------------------------------------------------------------
// Sign / check
// ---------------------------------------------------------------------------

/// Sign `data` with PKCS#1 v1.5 under the given digest.
pub(crate) fn sign(
    key: &RsaPrivateKey,
    hash: HashAlgId,
    data: &[u8],
) -> Result<Vec<u8>, X509Error> {
    let digest = hash::digest(hash, data)?;
    Ok(key.sign_pkcs1v15(hash, &digest)?)
}

/// Check `signature` over `signed` against the signer's public key.
///
/// `Some(true)`/`Some(false)` is a completed check; `None` means the key
/// type or signature algorithm is outside the supported RSA set and the
/// check could not be performed. A key that claims rsaEncryption but does
/// not parse fails the check rather than escaping it.
pub(crate) fn check_signature(
    spki: &SubjectPublicKeyInfo,
    algorithm: &Oid,
    signed: &[u8],
    signature: &[u8],
) -> Option<bool> {
    let hash = signature_hash(algorithm)?;
    if spki.algorithm.oid != known::rsa_encryption() {
        return None;
    }
    let Ok(key) = spki.rsa_public_key() else {
        return Some(false);
    };
    let Ok(digest) = hash::digest(hash, signed) else {
        return Some(false);
    };
    Some(
        key.verify_pkcs1v15(hash, &digest, signature)
            .unwrap_or(false),
    )
}
