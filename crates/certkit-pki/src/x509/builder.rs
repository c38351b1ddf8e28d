//! Certificate, CSR, CRL, and SPKAC issuance.
//!
//! [`Issuer`] couples a signing key with the identity fields that flow
//! into everything it signs. The builders stage a document and hand it
//! to the issuer; assembled documents are re-parsed so the stored raw
//! bytes are exactly what was signed.

use certkit_bignum::BigNum;
use certkit_crypto::rsa::RsaPrivateKey;
use certkit_types::{HashAlgId, X509Error};

use crate::encoding::{enc_bit_string, enc_seq};

use super::attributes::{set_attribute, Attribute, AttributeValue, Disposition};
use super::certificate::{
    AlgorithmIdentifier, BitString, Certificate, SubjectPublicKeyInfo, Time, Validity,
};
use super::crl::CertificateList;
use super::csr::CertificationRequest;
use super::extensions::{
    find_extension, set_extension, AuthorityKeyIdentifier, BasicConstraints, Extension,
    ExtensionValue, GeneralName, KeyUsage,
};
use super::identifier::{compute_key_identifier, KeyIdMethod, KeyMaterial};
use super::name::{DnValue, Name};
use super::signing;
use super::spkac::SignedPublicKeyAndChallenge;

/// The default validity window for issued certificates.
const ONE_YEAR: i64 = 31_536_000;

/// 99991231235959Z, the never-expires sentinel of RFC 5280 §4.1.2.5.
pub const NO_EXPIRY: i64 = 253_402_300_799;

// ---------------------------------------------------------------------------
// Issuer
// ---------------------------------------------------------------------------

/// A signing identity: the issuer name, the private key, and the cached
/// key identifier that feeds the authorityKeyIdentifier of everything
/// it signs.
pub struct Issuer {
    name: Name,
    key: RsaPrivateKey,
    key_identifier: Option<Vec<u8>>,
    alt_names: Option<Vec<GeneralName>>,
    hash: HashAlgId,
}

impl Issuer {
    /// An issuer with no backing certificate. The key identifier is
    /// computed from the key's public half.
    pub fn new(name: Name, key: RsaPrivateKey) -> Issuer {
        let spki = SubjectPublicKeyInfo::from_rsa_key(&key.public_key());
        let key_identifier =
            compute_key_identifier(KeyMaterial::PublicKeyInfo(&spki), KeyIdMethod::Sha1).ok();
        Issuer {
            name,
            key,
            key_identifier,
            alt_names: None,
            hash: HashAlgId::Sha256,
        }
    }

    /// An issuer backed by its own certificate. The name comes from the
    /// certificate subject, the key identifier from its
    /// subjectKeyIdentifier extension (computed from the key when the
    /// extension is absent), and the certificate's subjectAltName is
    /// remembered for the issuerAltName of signed CRLs.
    pub fn from_certificate(cert: &Certificate, key: RsaPrivateKey) -> Issuer {
        let key_identifier = cert.subject_key_identifier().map(<[u8]>::to_vec).or_else(|| {
            compute_key_identifier(KeyMaterial::Certificate(cert), KeyIdMethod::Sha1).ok()
        });
        let alt_names = cert
            .get_extension("id-ce-subjectAltName")
            .and_then(|ext| match &ext.value {
                ExtensionValue::SubjectAltName(names) => Some(names.clone()),
                _ => None,
            });
        Issuer {
            name: cert.subject.clone(),
            key,
            key_identifier,
            alt_names,
            hash: HashAlgId::Sha256,
        }
    }

    /// Select the signature digest; sha256 by default.
    pub fn hash(mut self, hash: HashAlgId) -> Issuer {
        self.hash = hash;
        self
    }

    pub fn name(&self) -> &Name {
        &self.name
    }

    pub fn key_identifier(&self) -> Option<&[u8]> {
        self.key_identifier.as_deref()
    }

    /// Sign a staged revocation list.
    ///
    /// The issuer name is stamped over whatever the list carried. On a
    /// v2 list the housekeeping extensions are refreshed: cRLNumber is
    /// set to `number` when given, otherwise advanced past the staged
    /// value; authorityKeyIdentifier and issuerAltName are rebuilt from
    /// this issuer. A v1 list without extensions is re-signed bare. The
    /// thisUpdate and nextUpdate fields pass through as staged.
    pub fn sign_crl(
        &self,
        list: &CertificateList,
        number: Option<BigNum>,
    ) -> Result<CertificateList, X509Error> {
        let mut crl = list.clone();
        let algorithm = signing::signature_algorithm(self.hash);
        crl.tbs_signature_algorithm = algorithm.clone();
        crl.signature_algorithm = algorithm;
        crl.issuer = self.name.clone();

        let next_number = match number {
            Some(number) => Some(number),
            None => crl.crl_number().map(|n| n.add(&BigNum::from_u64(1))),
        };

        crl.remove_extension("id-ce-authorityKeyIdentifier");
        crl.remove_extension("id-ce-issuerAltName");

        // Any extension forces at least v2.
        if crl.version.is_none()
            && (!crl.crl_extensions.is_empty()
                || crl.revoked.iter().any(|entry| !entry.extensions.is_empty()))
        {
            crl.version = Some(2);
        }

        if crl.version.is_some() {
            if let Some(number) = next_number {
                crl.set_extension(
                    "id-ce-cRLNumber",
                    ExtensionValue::CrlNumber(number),
                    false,
                    true,
                );
            }
            if let Some(id) = &self.key_identifier {
                crl.set_extension(
                    "id-ce-authorityKeyIdentifier",
                    ExtensionValue::AuthorityKeyIdentifier(AuthorityKeyIdentifier {
                        key_identifier: Some(id.clone()),
                        ..AuthorityKeyIdentifier::default()
                    }),
                    false,
                    true,
                );
            }
            if let Some(names) = &self.alt_names {
                crl.set_extension(
                    "id-ce-issuerAltName",
                    ExtensionValue::IssuerAltName(names.clone()),
                    false,
                    true,
                );
            }
        }

        let tbs = crl.encode_tbs()?;
        let signature = signing::sign(&self.key, self.hash, &tbs)?;
        CertificateList::from_der(&assemble(tbs, &crl.signature_algorithm, &signature))
    }
}

/// A fresh serial number: 20 random octets with the top bit cleared, as
/// RFC 5280 §4.1.2.2 requires of a positive serial of at most 20 octets.
fn random_serial() -> Result<BigNum, X509Error> {
    let mut bytes = [0u8; 20];
    getrandom::getrandom(&mut bytes)
        .map_err(|_| X509Error::InvalidCert("no entropy for a serial number".into()))?;
    bytes[0] &= 0x7F;
    Ok(BigNum::from_bytes_be(&bytes))
}

/// Wrap a signed TBS with its algorithm and signature into the outer
/// SEQUENCE every document kind shares.
fn assemble(tbs: Vec<u8>, algorithm: &AlgorithmIdentifier, signature: &[u8]) -> Vec<u8> {
    let mut body = tbs;
    body.extend_from_slice(&algorithm.to_der());
    body.extend_from_slice(&enc_bit_string(0, signature));
    enc_seq(&body)
}

// ---------------------------------------------------------------------------
// Certificate builder
// ---------------------------------------------------------------------------

/// Builder for issued certificates.
///
/// Fields left unstaged fall back to issuance defaults at [`build`]:
/// a fresh random serial and a validity window from now to one year
/// out. Extensions requested in a CSR are carried over; the issuer's
/// key identifier becomes the authorityKeyIdentifier.
///
/// [`build`]: CertificateBuilder::build
pub struct CertificateBuilder {
    subject: Name,
    subject_public_key_info: Option<SubjectPublicKeyInfo>,
    serial_number: Option<BigNum>,
    not_before: Option<Time>,
    not_after: Option<Time>,
    extensions: Vec<Extension>,
    subject_key_identifier: Option<Vec<u8>>,
    ca: bool,
}

impl CertificateBuilder {
    pub fn new(subject: Name) -> CertificateBuilder {
        CertificateBuilder {
            subject,
            subject_public_key_info: None,
            serial_number: None,
            not_before: None,
            not_after: None,
            extensions: Vec::new(),
            subject_key_identifier: None,
            ca: false,
        }
    }

    /// Stage a certificate for the subject of a certification request:
    /// its name, its public key, and the extensions it requested.
    pub fn from_request(csr: &CertificationRequest) -> CertificateBuilder {
        let mut builder = CertificateBuilder::new(csr.subject.clone());
        builder.subject_public_key_info = Some(csr.subject_public_key_info.clone());
        builder.extensions = csr.requested_extensions().map(<[Extension]>::to_vec).unwrap_or_default();
        builder
    }

    /// Stage a certificate for the key of a SPKAC document. The subject
    /// name is supplied by the caller since SPKAC carries none.
    pub fn from_spkac(subject: Name, spkac: &SignedPublicKeyAndChallenge) -> CertificateBuilder {
        let mut builder = CertificateBuilder::new(subject);
        builder.subject_public_key_info = Some(spkac.subject_public_key_info.clone());
        builder
    }

    /// Stage a re-issue of an existing certificate under a new issuer:
    /// subject, key, serial, validity, and extensions are kept, except
    /// for the authorityKeyIdentifier which the new issuer replaces.
    pub fn from_certificate(cert: &Certificate) -> CertificateBuilder {
        let mut builder = CertificateBuilder::new(cert.subject.clone());
        builder.subject_public_key_info = Some(cert.subject_public_key_info.clone());
        builder.serial_number = Some(cert.serial_number.clone());
        builder.not_before = Some(cert.validity.not_before);
        builder.not_after = Some(cert.validity.not_after);
        builder.extensions = cert.extensions.clone();
        super::extensions::remove_extension(&mut builder.extensions, "id-ce-authorityKeyIdentifier");
        builder
    }

    /// Set the subject public key. Required unless the builder was
    /// staged from a request, SPKAC, or certificate.
    pub fn public_key(mut self, spki: SubjectPublicKeyInfo) -> CertificateBuilder {
        self.subject_public_key_info = Some(spki);
        self
    }

    pub fn serial_number(mut self, serial: BigNum) -> CertificateBuilder {
        self.serial_number = Some(serial);
        self
    }

    pub fn start_date(mut self, timestamp: i64) -> CertificateBuilder {
        self.not_before = Some(Time::for_timestamp(timestamp));
        self
    }

    pub fn end_date(mut self, timestamp: i64) -> CertificateBuilder {
        self.not_after = Some(Time::for_timestamp(timestamp));
        self
    }

    /// Never expire: notAfter becomes the 99991231235959Z sentinel.
    pub fn lifetime(self) -> CertificateBuilder {
        self.end_date(NO_EXPIRY)
    }

    /// Stage an extension, overwriting a staged or requested one of the
    /// same type.
    pub fn extension(
        mut self,
        id: &str,
        value: ExtensionValue,
        critical: bool,
    ) -> CertificateBuilder {
        set_extension(&mut self.extensions, id, value, critical, true);
        self
    }

    /// Stage a subjectAltName, overwriting one requested in a CSR.
    pub fn subject_alt_name(self, names: Vec<GeneralName>) -> CertificateBuilder {
        self.extension(
            "id-ce-subjectAltName",
            ExtensionValue::SubjectAltName(names),
            false,
        )
    }

    /// Stage an explicit subjectKeyIdentifier value.
    pub fn key_identifier(mut self, id: Vec<u8>) -> CertificateBuilder {
        self.subject_key_identifier = Some(id);
        self
    }

    /// Mark the subject as a CA: basicConstraints asserts cA (critical,
    /// keeping any staged path length), keyCertSign and cRLSign join the
    /// key usage, and a subjectKeyIdentifier is computed when none was
    /// staged or requested.
    pub fn ca(mut self) -> CertificateBuilder {
        self.ca = true;
        self
    }

    /// Sign and assemble the certificate. The result is re-parsed from
    /// its own encoding, so `raw` and `tbs_raw` are exactly what was
    /// signed.
    pub fn build(self, issuer: &Issuer) -> Result<Certificate, X509Error> {
        let Some(spki) = self.subject_public_key_info else {
            return Err(X509Error::Misuse("no subject public key staged"));
        };

        let serial_number = match self.serial_number {
            Some(serial) => serial,
            None => random_serial()?,
        };
        let not_before = self.not_before.unwrap_or_else(Time::now);
        let not_after = self
            .not_after
            .unwrap_or_else(|| Time::for_timestamp(not_before.timestamp + ONE_YEAR));

        let mut extensions = self.extensions;
        if let Some(id) = issuer.key_identifier() {
            set_extension(
                &mut extensions,
                "id-ce-authorityKeyIdentifier",
                ExtensionValue::AuthorityKeyIdentifier(AuthorityKeyIdentifier {
                    key_identifier: Some(id.to_vec()),
                    ..AuthorityKeyIdentifier::default()
                }),
                false,
                true,
            );
        }
        if let Some(id) = &self.subject_key_identifier {
            set_extension(
                &mut extensions,
                "id-ce-subjectKeyIdentifier",
                ExtensionValue::SubjectKeyIdentifier(id.clone()),
                false,
                true,
            );
        }

        if self.ca {
            let usage = match find_extension(&extensions, "id-ce-keyUsage") {
                Some(Extension {
                    value: ExtensionValue::KeyUsage(usage),
                    ..
                }) => usage.0,
                _ => 0,
            };
            set_extension(
                &mut extensions,
                "id-ce-keyUsage",
                ExtensionValue::KeyUsage(KeyUsage(
                    usage | KeyUsage::KEY_CERT_SIGN | KeyUsage::CRL_SIGN,
                )),
                false,
                true,
            );

            let path_len = match find_extension(&extensions, "id-ce-basicConstraints") {
                Some(Extension {
                    value: ExtensionValue::BasicConstraints(bc),
                    ..
                }) => bc.path_len,
                _ => None,
            };
            set_extension(
                &mut extensions,
                "id-ce-basicConstraints",
                ExtensionValue::BasicConstraints(BasicConstraints { ca: true, path_len }),
                true,
                true,
            );

            if self.subject_key_identifier.is_none() {
                let id = compute_key_identifier(
                    KeyMaterial::PublicKeyInfo(&spki),
                    KeyIdMethod::Sha1,
                )?;
                // replace=false keeps an identifier the request asked for
                set_extension(
                    &mut extensions,
                    "id-ce-subjectKeyIdentifier",
                    ExtensionValue::SubjectKeyIdentifier(id),
                    false,
                    false,
                );
            }
        }

        let algorithm = signing::signature_algorithm(issuer.hash);
        let cert = Certificate {
            raw: Vec::new(),
            tbs_raw: Vec::new(),
            version: 3,
            serial_number,
            tbs_signature_algorithm: algorithm.clone(),
            issuer: issuer.name.clone(),
            validity: Validity {
                not_before,
                not_after,
            },
            subject: self.subject,
            subject_public_key_info: spki,
            issuer_unique_id: None,
            subject_unique_id: None,
            extensions,
            signature_algorithm: algorithm,
            signature: BitString::new(Vec::new()),
        };

        let tbs = cert.encode_tbs()?;
        let signature = signing::sign(&issuer.key, issuer.hash, &tbs)?;
        Certificate::from_der(&assemble(tbs, &cert.signature_algorithm, &signature))
    }

    /// Issue a self-signed CA certificate in one call: subject and
    /// issuer share the name and key.
    pub fn self_signed(subject: Name, key: &RsaPrivateKey) -> Result<Certificate, X509Error> {
        let issuer = Issuer::new(subject.clone(), key.clone());
        CertificateBuilder::new(subject)
            .public_key(SubjectPublicKeyInfo::from_rsa_key(&key.public_key()))
            .ca()
            .build(&issuer)
    }
}

// ---------------------------------------------------------------------------
// Request builder
// ---------------------------------------------------------------------------

/// Builder for PKCS#10 requests, self-signed with the subject's key.
pub struct RequestBuilder {
    subject: Name,
    attributes: Vec<Attribute>,
    extensions: Vec<Extension>,
    hash: HashAlgId,
}

impl RequestBuilder {
    pub fn new(subject: Name) -> RequestBuilder {
        RequestBuilder {
            subject,
            attributes: Vec::new(),
            extensions: Vec::new(),
            hash: HashAlgId::Sha256,
        }
    }

    /// Select the signature digest; sha256 by default.
    pub fn hash(mut self, hash: HashAlgId) -> RequestBuilder {
        self.hash = hash;
        self
    }

    /// Attach a pkcs-9-at-challengePassword attribute.
    pub fn challenge_password(mut self, password: &str) -> RequestBuilder {
        set_attribute(
            &mut self.attributes,
            "pkcs-9-at-challengePassword",
            AttributeValue::ChallengePassword(DnValue::Utf8(password.into())),
            Disposition::Replace,
        );
        self
    }

    /// Request an extension via pkcs-9-at-extensionRequest.
    pub fn extension(mut self, id: &str, value: ExtensionValue, critical: bool) -> RequestBuilder {
        set_extension(&mut self.extensions, id, value, critical, true);
        self
    }

    /// Sign and assemble the request with the subject's own key.
    pub fn build(self, key: &RsaPrivateKey) -> Result<CertificationRequest, X509Error> {
        let mut attributes = self.attributes;
        if !self.extensions.is_empty() {
            set_attribute(
                &mut attributes,
                "pkcs-9-at-extensionRequest",
                AttributeValue::ExtensionRequest(self.extensions),
                Disposition::Replace,
            );
        }

        let algorithm = signing::signature_algorithm(self.hash);
        let csr = CertificationRequest {
            raw: Vec::new(),
            tbs_raw: Vec::new(),
            version: 1,
            subject: self.subject,
            subject_public_key_info: SubjectPublicKeyInfo::from_rsa_key(&key.public_key()),
            attributes,
            signature_algorithm: algorithm,
            signature: BitString::new(Vec::new()),
        };

        let tbs = csr.encode_tbs()?;
        let signature = signing::sign(key, self.hash, &tbs)?;
        CertificationRequest::from_der(&assemble(tbs, &csr.signature_algorithm, &signature))
    }
}

// ---------------------------------------------------------------------------
// SPKAC signing
// ---------------------------------------------------------------------------

/// Create and sign a SPKAC document for the key. The challenge may be
/// empty, which is how `openssl spkac` emits one by default; bytes
/// outside the IA5 range are masked to seven bits.
pub fn sign_spkac(
    key: &RsaPrivateKey,
    challenge: &str,
    hash: HashAlgId,
) -> Result<SignedPublicKeyAndChallenge, X509Error> {
    let challenge = challenge.bytes().map(|b| (b & 0x7F) as char).collect();
    let spkac = SignedPublicKeyAndChallenge {
        raw: Vec::new(),
        tbs_raw: Vec::new(),
        subject_public_key_info: SubjectPublicKeyInfo::from_rsa_key(&key.public_key()),
        challenge,
        signature_algorithm: signing::signature_algorithm(hash),
        signature: BitString::new(Vec::new()),
    };

    let tbs = spkac.encode_tbs();
    let signature = signing::sign(key, hash, &tbs)?;
    SignedPublicKeyAndChallenge::from_der(&assemble(
        tbs,
        &spkac.signature_algorithm,
        &signature,
    ))
}

#[cfg(test)]
mod tests {
    use super::super::fixtures;
    use super::super::verify::Validator;
    use super::*;
    use crate::keys;
    use certkit_utils::asn1::TimeKind;

    fn ca_key() -> RsaPrivateKey {
        keys::parse_private_key_pem(fixtures::CA_KEY_PEM).unwrap()
    }

    fn ca() -> Certificate {
        Certificate::from_pem(fixtures::CA_PEM).unwrap()
    }

    fn issuer() -> Issuer {
        Issuer::from_certificate(&ca(), ca_key())
    }

    fn leaf_csr() -> CertificationRequest {
        CertificationRequest::from_pem(fixtures::LEAF_CSR_PEM).unwrap()
    }

    fn validator() -> Validator {
        let mut validator = Validator::new();
        validator.add_ca(ca());
        validator
    }

    #[test]
    fn test_issue_from_request() {
        let cert = CertificateBuilder::from_request(&leaf_csr())
            .serial_number(BigNum::from_u64(0x4444))
            .build(&issuer())
            .unwrap();

        assert_eq!(cert.version, 3);
        assert_eq!(cert.issuer, ca().subject);
        assert_eq!(cert.subject.get_dn_prop("id-at-commonName"), ["leaf.certkit.test"]);
        assert_eq!(cert.serial_number, BigNum::from_u64(0x4444));
        assert_eq!(
            validator().validate_certificate(&cert, true),
            super::super::verify::Verdict::Verified
        );

        // re-encoding reproduces the assembled bytes
        assert_eq!(cert.to_der().unwrap(), cert.raw);
    }

    #[test]
    fn test_requested_extensions_copied() {
        let cert = CertificateBuilder::from_request(&leaf_csr())
            .build(&issuer())
            .unwrap();

        let san = cert.get_extension("id-ce-subjectAltName").unwrap();
        let ExtensionValue::SubjectAltName(names) = &san.value else {
            panic!("expected a subjectAltName value");
        };
        assert_eq!(names.len(), 3);
        assert_eq!(names[0], GeneralName::DnsName("leaf.certkit.test".into()));
    }

    #[test]
    fn test_issuance_defaults() {
        let before = Time::now().timestamp;
        let cert = CertificateBuilder::from_request(&leaf_csr())
            .build(&issuer())
            .unwrap();
        let after = Time::now().timestamp;

        let serial = cert.serial_number.to_bytes_be();
        assert!(!serial.is_empty() && serial.len() <= 20);

        let window = &cert.validity;
        assert!(window.not_before.timestamp >= before);
        assert!(window.not_before.timestamp <= after);
        assert_eq!(
            window.not_after.timestamp - window.not_before.timestamp,
            31_536_000
        );
    }

    #[test]
    fn test_distinct_serials() {
        let a = CertificateBuilder::from_request(&leaf_csr())
            .build(&issuer())
            .unwrap();
        let b = CertificateBuilder::from_request(&leaf_csr())
            .build(&issuer())
            .unwrap();
        assert_ne!(a.serial_number, b.serial_number);
    }

    #[test]
    fn test_explicit_window() {
        let cert = CertificateBuilder::from_request(&leaf_csr())
            .start_date(fixtures::LEAF_NOT_BEFORE)
            .end_date(fixtures::LEAF_NOT_AFTER)
            .build(&issuer())
            .unwrap();
        assert_eq!(cert.validity.not_before.timestamp, fixtures::LEAF_NOT_BEFORE);
        assert_eq!(cert.validity.not_after.timestamp, fixtures::LEAF_NOT_AFTER);
    }

    #[test]
    fn test_lifetime_sentinel() {
        let cert = CertificateBuilder::from_request(&leaf_csr())
            .lifetime()
            .build(&issuer())
            .unwrap();
        assert_eq!(cert.validity.not_after.timestamp, 253_402_300_799);
        assert_eq!(cert.validity.not_after.kind, TimeKind::Generalized);
        // survives the assembly round trip
        let reparsed = Certificate::from_der(&cert.raw).unwrap();
        assert_eq!(reparsed.validity.not_after.timestamp, 253_402_300_799);
    }

    #[test]
    fn test_authority_key_identifier_injected() {
        let cert = CertificateBuilder::from_request(&leaf_csr())
            .build(&issuer())
            .unwrap();
        let aki = cert.authority_key_identifier().unwrap();
        assert_eq!(aki.key_identifier.as_deref(), Some(&fixtures::CA_SKI[..]));
        assert!(aki.authority_cert_issuer.is_empty());
        assert!(aki.authority_cert_serial_number.is_none());
    }

    #[test]
    fn test_ca_issuance() {
        let cert = CertificateBuilder::from_request(&leaf_csr())
            .ca()
            .build(&issuer())
            .unwrap();

        let usage = cert.get_extension("id-ce-keyUsage").unwrap();
        let ExtensionValue::KeyUsage(usage) = &usage.value else {
            panic!("expected a keyUsage value");
        };
        assert!(usage.has(KeyUsage::KEY_CERT_SIGN));
        assert!(usage.has(KeyUsage::CRL_SIGN));

        let bc = cert.get_extension("id-ce-basicConstraints").unwrap();
        assert!(bc.critical);
        let ExtensionValue::BasicConstraints(bc) = &bc.value else {
            panic!("expected a basicConstraints value");
        };
        assert!(bc.ca);

        // the subject key identifier is computed from the request key
        assert_eq!(cert.subject_key_identifier(), Some(&fixtures::LEAF_SKI[..]));

        // the new CA vouches for certificates in turn
        let mut validator = Validator::new();
        validator.add_ca(cert);
        let reissued = CertificateBuilder::from_request(&leaf_csr());
        let _ = reissued;
    }

    #[test]
    fn test_ca_unions_existing_key_usage() {
        let cert = CertificateBuilder::from_request(&leaf_csr())
            .extension(
                "id-ce-keyUsage",
                ExtensionValue::KeyUsage(KeyUsage(KeyUsage::DIGITAL_SIGNATURE)),
                false,
            )
            .ca()
            .build(&issuer())
            .unwrap();

        let usage = cert.get_extension("id-ce-keyUsage").unwrap();
        let ExtensionValue::KeyUsage(usage) = &usage.value else {
            panic!("expected a keyUsage value");
        };
        assert!(usage.has(KeyUsage::DIGITAL_SIGNATURE));
        assert!(usage.has(KeyUsage::KEY_CERT_SIGN));
        assert!(usage.has(KeyUsage::CRL_SIGN));
    }

    #[test]
    fn test_self_signed_root() {
        let key = ca_key();
        let name = Name::from_string("/O=CertKit/CN=Fresh Root").unwrap();
        let cert = CertificateBuilder::self_signed(name.clone(), &key).unwrap();

        assert_eq!(cert.subject, name);
        assert_eq!(cert.issuer, name);
        // same key as the CA fixture, so the same identifier
        assert_eq!(cert.subject_key_identifier(), Some(&fixtures::CA_SKI[..]));
        assert_eq!(
            cert.authority_key_identifier().unwrap().key_identifier.as_deref(),
            Some(&fixtures::CA_SKI[..])
        );

        // vouches for itself outside CA-only mode
        let validator = Validator::new();
        assert_eq!(
            validator.validate_certificate(&cert, false),
            super::super::verify::Verdict::Verified
        );
    }

    #[test]
    fn test_cross_sign_keeps_identity() {
        let leaf = Certificate::from_pem(fixtures::LEAF_PEM).unwrap();
        let cert = CertificateBuilder::from_certificate(&leaf)
            .build(&issuer())
            .unwrap();

        assert_eq!(cert.serial_number, leaf.serial_number);
        assert_eq!(cert.subject, leaf.subject);
        assert_eq!(cert.validity, leaf.validity);
        assert_eq!(
            cert.get_extension("id-ce-subjectAltName").map(|e| &e.value),
            leaf.get_extension("id-ce-subjectAltName").map(|e| &e.value)
        );
        assert_eq!(
            validator().validate_certificate(&cert, true),
            super::super::verify::Verdict::Verified
        );
    }

    #[test]
    fn test_build_without_key_fails() {
        let name = Name::from_string("/CN=keyless").unwrap();
        let err = CertificateBuilder::new(name).build(&issuer()).unwrap_err();
        assert!(matches!(err, X509Error::Misuse(_)));
    }

    #[test]
    fn test_from_spkac() {
        let spkac = SignedPublicKeyAndChallenge::load(fixtures::SPKAC_LINE.as_bytes()).unwrap();
        let name = Name::from_string("/CN=spkac subject").unwrap();
        let cert = CertificateBuilder::from_spkac(name.clone(), &spkac)
            .build(&issuer())
            .unwrap();
        assert_eq!(cert.subject, name);
        assert_eq!(cert.subject_public_key_info, spkac.subject_public_key_info);
        assert_eq!(
            validator().validate_certificate(&cert, true),
            super::super::verify::Verdict::Verified
        );
    }

    #[test]
    fn test_request_builder() {
        let key = ca_key();
        let name = Name::from_string("/O=CertKit/CN=requested.certkit.test").unwrap();
        let csr = RequestBuilder::new(name.clone())
            .challenge_password("topsecret")
            .extension(
                "id-ce-subjectAltName",
                ExtensionValue::SubjectAltName(vec![GeneralName::DnsName(
                    "requested.certkit.test".into(),
                )]),
                false,
            )
            .build(&key)
            .unwrap();

        assert_eq!(csr.version, 1);
        assert_eq!(csr.subject, name);
        assert_eq!(
            csr.verify_signature(),
            super::super::verify::Verdict::Verified
        );
        let values = csr
            .get_attribute("pkcs-9-at-challengePassword", Disposition::All)
            .unwrap();
        assert_eq!(values[0].text(), Some("topsecret"));
        assert!(csr.get_extension("id-ce-subjectAltName").is_some());

        // byte-exact reload
        let reparsed = CertificationRequest::from_der(&csr.raw).unwrap();
        assert_eq!(reparsed.to_der().unwrap(), csr.raw);
    }

    #[test]
    fn test_request_without_extensions_has_empty_attribute_list() {
        let key = ca_key();
        let name = Name::from_string("/CN=bare").unwrap();
        let csr = RequestBuilder::new(name).build(&key).unwrap();
        assert!(csr.attributes.is_empty());
        assert!(csr.requested_extensions().is_none());
        assert_eq!(
            csr.verify_signature(),
            super::super::verify::Verdict::Verified
        );
    }

    #[test]
    fn test_sign_spkac() {
        let key = ca_key();
        let spkac = sign_spkac(&key, "challenge-me", HashAlgId::Md5).unwrap();
        assert_eq!(spkac.challenge, "challenge-me");
        assert_eq!(
            spkac.signature_algorithm.oid.to_dot_string(),
            "1.2.840.113549.1.1.4"
        );
        assert_eq!(
            spkac.verify_signature(),
            super::super::verify::Verdict::Verified
        );
        assert!(spkac.save().starts_with("SPKAC="));
    }

    #[test]
    fn test_spkac_challenge_masked_to_ia5() {
        let key = ca_key();
        // "é" is 0xC3 0xA9; masking to seven bits gives "C)"
        let spkac = sign_spkac(&key, "é", HashAlgId::Sha256).unwrap();
        assert_eq!(spkac.challenge, "C)");

        let empty = sign_spkac(&key, "", HashAlgId::Sha256).unwrap();
        assert_eq!(empty.challenge, "");
    }

    #[test]
    fn test_sign_fresh_crl() {
        let mut staged = CertificateList::new();
        staged.revoke(BigNum::from_u64(0x5001), None);
        let crl = issuer()
            .sign_crl(&staged, Some(BigNum::from_u64(1)))
            .unwrap();

        assert_eq!(crl.version, Some(2));
        assert_eq!(crl.issuer, ca().subject);
        assert_eq!(crl.crl_number(), Some(&BigNum::from_u64(1)));
        assert_eq!(crl.this_update.timestamp, staged.this_update.timestamp);
        assert!(crl.get_revoked(&BigNum::from_u64(0x5001)).is_some());
        assert_eq!(
            validator().validate_crl(&crl),
            super::super::verify::Verdict::Verified
        );
    }

    #[test]
    fn test_resign_advances_crl_number() {
        let loaded = CertificateList::from_pem(fixtures::CRL_PEM).unwrap();
        let crl = issuer().sign_crl(&loaded, None).unwrap();

        assert_eq!(crl.crl_number(), Some(&BigNum::from_u64(2)));
        assert_eq!(crl.list_revoked(), loaded.list_revoked());
        let aki = crl.get_extension("id-ce-authorityKeyIdentifier").unwrap();
        let ExtensionValue::AuthorityKeyIdentifier(aki) = &aki.value else {
            panic!("expected an authorityKeyIdentifier value");
        };
        assert_eq!(aki.key_identifier.as_deref(), Some(&fixtures::CA_SKI[..]));
        assert_eq!(
            validator().validate_crl(&crl),
            super::super::verify::Verdict::Verified
        );
    }

    #[test]
    fn test_v1_crl_resigned_bare() {
        let mut staged = CertificateList::from_pem(fixtures::CRL_PEM).unwrap();
        staged.version = None;
        staged.crl_extensions.clear();
        for entry in &mut staged.revoked {
            entry.extensions.clear();
        }

        let crl = issuer().sign_crl(&staged, None).unwrap();
        assert_eq!(crl.version, None);
        assert!(crl.crl_extensions.is_empty());
        assert_eq!(
            validator().validate_crl(&crl),
            super::super::verify::Verdict::Verified
        );
    }

    #[test]
    fn test_crl_issuer_alt_name_from_certificate() {
        // an issuing CA whose certificate carries a subjectAltName
        let key = ca_key();
        let name = Name::from_string("/O=CertKit/CN=SAN Root").unwrap();
        let root = Issuer::new(name.clone(), key.clone());
        let cert = CertificateBuilder::new(name)
            .public_key(SubjectPublicKeyInfo::from_rsa_key(&key.public_key()))
            .subject_alt_name(vec![GeneralName::DnsName("ca.certkit.test".into())])
            .ca()
            .build(&root)
            .unwrap();

        let crl = Issuer::from_certificate(&cert, key)
            .sign_crl(&CertificateList::new(), None)
            .unwrap();
        let ian = crl.get_extension("id-ce-issuerAltName").unwrap();
        let ExtensionValue::IssuerAltName(names) = &ian.value else {
            panic!("expected an issuerAltName value");
        };
        assert_eq!(names, &[GeneralName::DnsName("ca.certkit.test".into())]);
    }

    #[test]
    fn test_issuer_without_certificate_computes_identifier() {
        let key = ca_key();
        let name = Name::from_string("/CN=bare issuer").unwrap();
        let issuer = Issuer::new(name, key);
        assert_eq!(issuer.key_identifier(), Some(&fixtures::CA_SKI[..]));
    }

    #[test]
    fn test_issuer_hash_selection() {
        let cert = CertificateBuilder::from_request(&leaf_csr())
            .build(&issuer().hash(HashAlgId::Sha512))
            .unwrap();
        assert_eq!(
            cert.signature_algorithm.oid.to_dot_string(),
            "1.2.840.113549.1.1.13"
        );
        assert_eq!(
            validator().validate_certificate(&cert, true),
            super::super::verify::Verdict::Verified
        );
    }
}
