/// Cryptographic operation errors.
#[derive(Debug, thiserror::Error)]
pub enum CryptoError {
    // General errors
    #[error("invalid argument")]
    InvalidArg,
    #[error("operation not supported")]
    NotSupported,
    #[error("invalid key")]
    InvalidKey,

    // Buffer errors
    #[error("buffer length not enough: need {need}, got {got}")]
    BufferTooSmall { need: usize, got: usize },
    #[error("input data too long")]
    InputOverflow,

    // BigNum errors
    #[error("big number: division by zero")]
    BnDivisionByZero,
    #[error("big number: no modular inverse")]
    BnNoInverse,
    #[error("big number: prime generation failed")]
    BnPrimeGenFail,
    #[error("big number: random generation failed")]
    BnRandGenFail,

    // RSA errors
    #[error("rsa: invalid key bits")]
    RsaInvalidKeyBits,
    #[error("rsa: verification failed")]
    RsaVerifyFail,
    #[error("rsa: invalid padding")]
    RsaInvalidPadding,
    #[error("rsa: missing key info")]
    RsaNoKeyInfo,

    // Encoding/Decoding errors
    #[error("decode: asn1 buffer failed")]
    DecodeAsn1Fail,
    #[error("decode: unknown oid")]
    DecodeUnknownOid,
}

/// X.509 document errors.
///
/// Expected, data-driven outcomes (a chain that does not resolve, a revoked
/// serial that is not found, a signature that simply does not verify) are not
/// errors; they surface as sentinel returns on the calling API. These variants
/// cover malformed input, unsupported constructs, and caller misuse.
#[derive(Debug, thiserror::Error)]
pub enum X509Error {
    #[error("asn1 parse error: {0}")]
    Asn1Error(String),
    #[error("invalid certificate: {0}")]
    InvalidCert(String),
    #[error("invalid certification request: {0}")]
    InvalidCsr(String),
    #[error("invalid crl: {0}")]
    InvalidCrl(String),
    #[error("invalid spkac: {0}")]
    InvalidSpkac(String),
    #[error("unsupported extension on encode: {0}")]
    UnsupportedExtension(String),
    #[error("unsupported algorithm: {0}")]
    UnsupportedAlgorithm(String),
    #[error("caller misuse: {0}")]
    Misuse(&'static str),
    #[error("ca-issuers fetch failed: {0}")]
    Fetch(String),
    #[error("crypto error: {0}")]
    CryptoError(#[from] CryptoError),
}
