/// Hash algorithm identifiers.
///
/// These cover the digest half of the RSA signature suites X.509 documents
/// use in practice. MD2 and MD5 are decode/verify-legacy only; new
/// signatures should use the SHA-2 family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HashAlgId {
    Md2,
    Md5,
    Sha1,
    Sha224,
    Sha256,
    Sha384,
    Sha512,
}

impl HashAlgId {
    /// Digest output length in bytes.
    pub fn output_size(self) -> usize {
        match self {
            HashAlgId::Md2 | HashAlgId::Md5 => 16,
            HashAlgId::Sha1 => 20,
            HashAlgId::Sha224 => 28,
            HashAlgId::Sha256 => 32,
            HashAlgId::Sha384 => 48,
            HashAlgId::Sha512 => 64,
        }
    }

    /// Lowercase name as used in algorithm dispatch ("sha256", "md5", ...).
    pub fn name(self) -> &'static str {
        match self {
            HashAlgId::Md2 => "md2",
            HashAlgId::Md5 => "md5",
            HashAlgId::Sha1 => "sha1",
            HashAlgId::Sha224 => "sha224",
            HashAlgId::Sha256 => "sha256",
            HashAlgId::Sha384 => "sha384",
            HashAlgId::Sha512 => "sha512",
        }
    }
}
