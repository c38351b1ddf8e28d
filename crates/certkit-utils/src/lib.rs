#![forbid(unsafe_code)]
#![doc = "Utility functions for certkit: ASN.1, Base64, PEM, OID."]

#[cfg(feature = "asn1")]
pub mod asn1;

#[cfg(feature = "base64")]
pub mod base64;

#[cfg(feature = "pem")]
pub mod pem;

#[cfg(feature = "oid")]
pub mod oid;
