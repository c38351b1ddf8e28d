#![forbid(unsafe_code)]
#![doc = "PKI document engine for certkit: X.509 certificates, CSRs, CRLs, and SPKAC."]

#[cfg(feature = "x509")]
mod encoding;

pub mod keys;

#[cfg(feature = "x509")]
pub mod x509;
