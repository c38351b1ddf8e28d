//! Unified hash module.
//!
//! This module re-exports all supported hash algorithm implementations and
//! provides a common entry point for digest computation. Individual hash
//! algorithms (MD2, MD5, SHA-1, SHA-2) live in their own feature-gated
//! modules and are re-exported here for convenience.

use certkit_types::{CryptoError, HashAlgId};

pub use crate::provider::Digest;

#[cfg(feature = "md2")]
pub use crate::md2::Md2;

#[cfg(feature = "md5")]
pub use crate::md5::Md5;

#[cfg(feature = "sha1")]
pub use crate::sha1::Sha1;

#[cfg(feature = "sha2")]
pub use crate::sha2::{Sha224, Sha256, Sha384, Sha512};

/// Instantiate a streaming digest context for `alg`.
///
/// Returns [`CryptoError::NotSupported`] when the corresponding algorithm
/// feature is compiled out.
pub fn new_digest(alg: HashAlgId) -> Result<Box<dyn Digest>, CryptoError> {
    match alg {
        #[cfg(feature = "md2")]
        HashAlgId::Md2 => Ok(Box::new(Md2::new())),
        #[cfg(feature = "md5")]
        HashAlgId::Md5 => Ok(Box::new(Md5::new())),
        #[cfg(feature = "sha1")]
        HashAlgId::Sha1 => Ok(Box::new(Sha1::new())),
        #[cfg(feature = "sha2")]
        HashAlgId::Sha224 => Ok(Box::new(Sha224::new())),
        #[cfg(feature = "sha2")]
        HashAlgId::Sha256 => Ok(Box::new(Sha256::new())),
        #[cfg(feature = "sha2")]
        HashAlgId::Sha384 => Ok(Box::new(Sha384::new())),
        #[cfg(feature = "sha2")]
        HashAlgId::Sha512 => Ok(Box::new(Sha512::new())),
        #[allow(unreachable_patterns)]
        _ => Err(CryptoError::NotSupported),
    }
}

/// One-shot digest computation dispatched by algorithm identifier.
pub fn digest(alg: HashAlgId, data: &[u8]) -> Result<Vec<u8>, CryptoError> {
    let mut ctx = new_digest(alg)?;
    ctx.update(data)?;
    let mut out = vec![0u8; ctx.output_size()];
    ctx.finish(&mut out)?;
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dispatch_output_sizes() {
        for alg in [
            HashAlgId::Md2,
            HashAlgId::Md5,
            HashAlgId::Sha1,
            HashAlgId::Sha224,
            HashAlgId::Sha256,
            HashAlgId::Sha384,
            HashAlgId::Sha512,
        ] {
            let out = digest(alg, b"abc").unwrap();
            assert_eq!(out.len(), alg.output_size(), "{}", alg.name());
        }
    }

    #[test]
    fn test_dispatch_matches_direct() {
        assert_eq!(
            digest(HashAlgId::Sha256, b"abc").unwrap(),
            Sha256::digest(b"abc").unwrap().to_vec()
        );
        assert_eq!(
            digest(HashAlgId::Md5, b"abc").unwrap(),
            Md5::digest(b"abc").unwrap().to_vec()
        );
    }
}
