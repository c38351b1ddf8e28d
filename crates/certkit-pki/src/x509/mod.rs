//! X.509 certificate, CSR, CRL, and SPKAC management.
//!
//! Documents are parsed from DER or PEM into typed structures, edited
//! through accessors, and signed or re-encoded. Each loaded document keeps
//! the exact byte span its signature covers, so verification never depends
//! on re-encoding.

pub mod attributes;
pub mod builder;
pub mod certificate;
pub mod crl;
pub mod csr;
pub mod extensions;
pub mod hostname;
pub mod identifier;
pub mod name;
pub mod oids;
mod signing;
pub mod spkac;
pub mod verify;

#[cfg(test)]
mod fixtures;

pub use attributes::{Attribute, AttributeValue, Disposition};
pub use builder::{sign_spkac, CertificateBuilder, Issuer, RequestBuilder, NO_EXPIRY};
pub use certificate::{
    AlgorithmIdentifier, AlgorithmParams, BitString, Certificate, SubjectPublicKeyInfo, Time,
    Validity,
};
pub use crl::{CertificateList, RevokedCertificate};
pub use csr::CertificationRequest;
pub use extensions::{Extension, ExtensionValue};
pub use hostname::{validate_date, validate_url};
pub use identifier::{compute_key_identifier, KeyIdMethod, KeyMaterial};
pub use name::{AttributeTypeAndValue, DnValue, Name, Rdn};
pub use spkac::SignedPublicKeyAndChallenge;
pub use verify::{CaIssuerFetcher, HttpFetcher, Validator, Verdict};
