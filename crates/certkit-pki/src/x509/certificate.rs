//! Certificate documents: DER/PEM loading, re-encoding, and field access.
//!
//! A loaded [`Certificate`] keeps the exact byte span of its
//! tbsCertificate alongside the parsed fields. Signature checks run over
//! that span, never over a re-encode, because optional-with-default
//! fields are not guaranteed to round-trip byte-identically.

use certkit_bignum::BigNum;
use certkit_crypto::rsa::RsaPublicKey;
use certkit_types::X509Error;
use certkit_utils::asn1::{Decoder, Encoder, TimeKind};
use certkit_utils::oid::{known, Oid};
use certkit_utils::pem;

use crate::encoding::{enc_bit_string, enc_explicit_ctx, enc_int, enc_primitive_ctx, enc_seq};
use crate::keys;

use super::extensions::{
    encode_extensions_der, find_extension, parse_extensions_der, remove_extension, set_extension,
    AuthorityKeyIdentifier, Extension, ExtensionValue,
};
use super::name::{parse_name, Name};
use super::oids;

// ---------------------------------------------------------------------------
// Algorithm identifiers
// ---------------------------------------------------------------------------

/// An AlgorithmIdentifier (RFC 5280 §4.1.1.2).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlgorithmIdentifier {
    pub oid: Oid,
    pub params: AlgorithmParams,
}

/// The parameters field of an AlgorithmIdentifier, keeping the
/// absent-versus-NULL distinction and any other payload verbatim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AlgorithmParams {
    Absent,
    Null,
    /// Full DER of a parameter value this crate does not interpret.
    Other(Vec<u8>),
}

impl AlgorithmIdentifier {
    pub fn new(oid: Oid) -> AlgorithmIdentifier {
        AlgorithmIdentifier {
            oid,
            params: AlgorithmParams::Absent,
        }
    }

    pub(crate) fn from_decoder(dec: &mut Decoder) -> Result<AlgorithmIdentifier, X509Error> {
        let mut alg = dec
            .read_sequence()
            .map_err(|e| X509Error::Asn1Error(e.to_string()))?;
        let oid_bytes = alg
            .read_oid()
            .map_err(|e| X509Error::Asn1Error(e.to_string()))?;
        let oid =
            Oid::from_der_value(oid_bytes).map_err(|e| X509Error::Asn1Error(e.to_string()))?;
        let params = if alg.is_empty() {
            AlgorithmParams::Absent
        } else {
            let tlv = alg
                .read_tlv()
                .map_err(|e| X509Error::Asn1Error(e.to_string()))?;
            if tlv.tag.number == 0x05 && tlv.value.is_empty() {
                AlgorithmParams::Null
            } else {
                AlgorithmParams::Other(tlv.to_der())
            }
        };
        Ok(AlgorithmIdentifier { oid, params })
    }

    /// Encode, substituting an explicit NULL for the parameters of RSA
    /// algorithm identifiers regardless of how they were stored; RFC 3279
    /// requires the NULL and common consumers reject its absence.
    pub fn to_der(&self) -> Vec<u8> {
        let mut enc = Encoder::new();
        enc.write_oid(&self.oid.to_der_value());
        if rsa_null_params(&self.oid) {
            enc.write_null();
        } else {
            match &self.params {
                AlgorithmParams::Absent => {}
                AlgorithmParams::Null => {
                    enc.write_null();
                }
                AlgorithmParams::Other(der) => {
                    enc.write_raw(der);
                }
            }
        }
        enc_seq(&enc.finish())
    }
}

fn rsa_null_params(oid: &Oid) -> bool {
    *oid == known::rsa_encryption()
        || *oid == known::md2_with_rsa_encryption()
        || *oid == known::md5_with_rsa_encryption()
        || *oid == known::sha1_with_rsa_encryption()
        || *oid == known::sha224_with_rsa_encryption()
        || *oid == known::sha256_with_rsa_encryption()
        || *oid == known::sha384_with_rsa_encryption()
        || *oid == known::sha512_with_rsa_encryption()
}

// ---------------------------------------------------------------------------
// Bit strings
// ---------------------------------------------------------------------------

/// A raw BIT STRING value (unused-bit count plus payload).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BitString {
    pub unused: u8,
    pub bytes: Vec<u8>,
}

impl BitString {
    pub fn new(bytes: Vec<u8>) -> BitString {
        BitString { unused: 0, bytes }
    }

    /// The value bytes as placed under an implicit tag: the unused-bit
    /// count octet followed by the payload.
    pub(crate) fn content(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(1 + self.bytes.len());
        out.push(self.unused);
        out.extend_from_slice(&self.bytes);
        out
    }
}

// ---------------------------------------------------------------------------
// Time and validity
// ---------------------------------------------------------------------------

/// A point in time together with the ASN.1 kind it was (or will be)
/// carried in, so re-encoding preserves the original choice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Time {
    pub kind: TimeKind,
    pub timestamp: i64,
}

// UTCTime covers 1950-01-01 through 2049-12-31 (RFC 5280 §4.1.2.5).
const UTC_TIME_MIN: i64 = -631_152_000;
const UTC_TIME_MAX: i64 = 2_524_608_000;

impl Time {
    /// Pick the encoding kind for a fresh timestamp: UTCTime for years
    /// 1950 through 2049, GeneralizedTime otherwise.
    pub fn for_timestamp(timestamp: i64) -> Time {
        let kind = if (UTC_TIME_MIN..UTC_TIME_MAX).contains(&timestamp) {
            TimeKind::Utc
        } else {
            TimeKind::Generalized
        };
        Time { kind, timestamp }
    }

    /// The current system time.
    pub fn now() -> Time {
        let timestamp = match std::time::SystemTime::now().duration_since(std::time::UNIX_EPOCH) {
            Ok(elapsed) => elapsed.as_secs() as i64,
            Err(before_epoch) => -(before_epoch.duration().as_secs() as i64),
        };
        Time::for_timestamp(timestamp)
    }

    pub(crate) fn from_decoder(dec: &mut Decoder) -> Result<Time, X509Error> {
        let (kind, timestamp) = dec
            .read_time()
            .map_err(|e| X509Error::Asn1Error(e.to_string()))?;
        Ok(Time { kind, timestamp })
    }

    pub(crate) fn to_der(&self) -> Vec<u8> {
        let mut enc = Encoder::new();
        match self.kind {
            TimeKind::Utc => enc.write_utc_time(self.timestamp),
            TimeKind::Generalized => enc.write_generalized_time(self.timestamp),
        };
        enc.finish()
    }
}

/// A certificate validity window (RFC 5280 §4.1.2.5).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Validity {
    pub not_before: Time,
    pub not_after: Time,
}

impl Validity {
    /// True when `when` falls inside the window. The lower bound is
    /// inclusive, the upper bound exclusive.
    pub fn contains(&self, when: i64) -> bool {
        self.not_before.timestamp <= when && when < self.not_after.timestamp
    }

    pub(crate) fn from_decoder(dec: &mut Decoder) -> Result<Validity, X509Error> {
        let mut seq = dec
            .read_sequence()
            .map_err(|e| X509Error::Asn1Error(e.to_string()))?;
        let not_before = Time::from_decoder(&mut seq)?;
        let not_after = Time::from_decoder(&mut seq)?;
        Ok(Validity {
            not_before,
            not_after,
        })
    }

    pub(crate) fn to_der(&self) -> Vec<u8> {
        let mut body = self.not_before.to_der();
        body.extend_from_slice(&self.not_after.to_der());
        enc_seq(&body)
    }
}

// ---------------------------------------------------------------------------
// Subject public key info
// ---------------------------------------------------------------------------

/// A SubjectPublicKeyInfo: the key algorithm and the raw key bit string.
///
/// Keys under unrecognized algorithms stay loadable and re-encodable;
/// only [`SubjectPublicKeyInfo::rsa_public_key`] insists on RSA.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubjectPublicKeyInfo {
    pub algorithm: AlgorithmIdentifier,
    pub unused_bits: u8,
    /// The BIT STRING payload; for RSA this is a PKCS#1 RSAPublicKey.
    pub subject_public_key: Vec<u8>,
}

impl SubjectPublicKeyInfo {
    pub(crate) fn from_decoder(dec: &mut Decoder) -> Result<SubjectPublicKeyInfo, X509Error> {
        let mut spki = dec
            .read_sequence()
            .map_err(|e| X509Error::Asn1Error(e.to_string()))?;
        let algorithm = AlgorithmIdentifier::from_decoder(&mut spki)?;
        let (unused_bits, key_bytes) = spki
            .read_bit_string()
            .map_err(|e| X509Error::Asn1Error(e.to_string()))?;
        Ok(SubjectPublicKeyInfo {
            algorithm,
            unused_bits,
            subject_public_key: key_bytes.to_vec(),
        })
    }

    pub fn from_der(data: &[u8]) -> Result<SubjectPublicKeyInfo, X509Error> {
        let mut dec = Decoder::new(data);
        Self::from_decoder(&mut dec)
    }

    /// Wrap an RSA public key.
    pub fn from_rsa_key(key: &RsaPublicKey) -> SubjectPublicKeyInfo {
        SubjectPublicKeyInfo {
            algorithm: AlgorithmIdentifier {
                oid: known::rsa_encryption(),
                params: AlgorithmParams::Null,
            },
            unused_bits: 0,
            subject_public_key: keys::encode_rsa_public_pkcs1_der(key),
        }
    }

    /// The key as an RSA object; algorithms other than rsaEncryption
    /// yield [`X509Error::UnsupportedAlgorithm`].
    pub fn rsa_public_key(&self) -> Result<RsaPublicKey, X509Error> {
        if self.algorithm.oid != known::rsa_encryption() {
            return Err(X509Error::UnsupportedAlgorithm(oids::describe_oid(
                &self.algorithm.oid,
            )));
        }
        Ok(keys::parse_rsa_public_pkcs1_der(&self.subject_public_key)?)
    }

    pub fn to_der(&self) -> Vec<u8> {
        let mut body = self.algorithm.to_der();
        body.extend_from_slice(&enc_bit_string(self.unused_bits, &self.subject_public_key));
        enc_seq(&body)
    }
}

// ---------------------------------------------------------------------------
// Certificate
// ---------------------------------------------------------------------------

/// A parsed X.509 certificate (RFC 5280 §4.1).
#[derive(Debug, Clone)]
pub struct Certificate {
    /// DER of the full Certificate SEQUENCE as loaded.
    pub raw: Vec<u8>,
    /// Exact byte span of the tbsCertificate, as signed.
    pub tbs_raw: Vec<u8>,
    /// Version number, 1-based (v3 is 3).
    pub version: u8,
    pub serial_number: BigNum,
    /// The signature field inside the TBS; must agree with the outer
    /// signatureAlgorithm.
    pub tbs_signature_algorithm: AlgorithmIdentifier,
    pub issuer: Name,
    pub validity: Validity,
    pub subject: Name,
    pub subject_public_key_info: SubjectPublicKeyInfo,
    pub issuer_unique_id: Option<BitString>,
    pub subject_unique_id: Option<BitString>,
    pub extensions: Vec<Extension>,
    pub signature_algorithm: AlgorithmIdentifier,
    pub signature: BitString,
}

impl Certificate {
    /// Parse a certificate from DER bytes.
    pub fn from_der(data: &[u8]) -> Result<Certificate, X509Error> {
        let mut outer = Decoder::new(data)
            .read_sequence()
            .map_err(|e| X509Error::Asn1Error(e.to_string()))?;

        // Capture the raw TBS span (tag + length + value) for signature
        // verification before descending into it.
        let remaining_before = outer.remaining();
        let tbs_tlv = outer
            .read_tlv()
            .map_err(|e| X509Error::Asn1Error(e.to_string()))?;
        let tbs_consumed = remaining_before.len() - outer.remaining().len();
        let tbs_raw = remaining_before[..tbs_consumed].to_vec();

        let mut tbs = Decoder::new(tbs_tlv.value);

        // version [0] EXPLICIT INTEGER DEFAULT v1
        let version = match tbs
            .try_read_context_specific(0, true)
            .map_err(|e| X509Error::Asn1Error(e.to_string()))?
        {
            Some(v_tlv) => {
                let mut v = Decoder::new(v_tlv.value);
                let bytes = v
                    .read_integer()
                    .map_err(|e| X509Error::Asn1Error(e.to_string()))?;
                bytes.last().copied().unwrap_or(0) + 1
            }
            None => 1,
        };

        let serial_number = BigNum::from_bytes_be(
            tbs.read_integer()
                .map_err(|e| X509Error::Asn1Error(e.to_string()))?,
        );

        let tbs_signature_algorithm = AlgorithmIdentifier::from_decoder(&mut tbs)?;
        let issuer = parse_name(&mut tbs)?;
        let validity = Validity::from_decoder(&mut tbs)?;
        let subject = parse_name(&mut tbs)?;
        let subject_public_key_info = SubjectPublicKeyInfo::from_decoder(&mut tbs)?;

        // issuerUniqueID [1] and subjectUniqueID [2], IMPLICIT BIT STRING
        let issuer_unique_id = read_unique_id(&mut tbs, 1)?;
        let subject_unique_id = read_unique_id(&mut tbs, 2)?;

        // extensions [3] EXPLICIT Extensions OPTIONAL
        let extensions = match tbs
            .try_read_context_specific(3, true)
            .map_err(|e| X509Error::Asn1Error(e.to_string()))?
        {
            Some(ext_tlv) => parse_extensions_der(ext_tlv.value)?,
            None => Vec::new(),
        };

        let signature_algorithm = AlgorithmIdentifier::from_decoder(&mut outer)?;
        let (sig_unused, sig_bytes) = outer
            .read_bit_string()
            .map_err(|e| X509Error::Asn1Error(e.to_string()))?;

        Ok(Certificate {
            raw: data.to_vec(),
            tbs_raw,
            version,
            serial_number,
            tbs_signature_algorithm,
            issuer,
            validity,
            subject,
            subject_public_key_info,
            issuer_unique_id,
            subject_unique_id,
            extensions,
            signature_algorithm,
            signature: BitString {
                unused: sig_unused,
                bytes: sig_bytes.to_vec(),
            },
        })
    }

    /// Parse a certificate from a PEM `CERTIFICATE` block.
    pub fn from_pem(text: &str) -> Result<Certificate, X509Error> {
        let blocks = pem::parse(text).map_err(|e| X509Error::Asn1Error(e.to_string()))?;
        let block = blocks
            .iter()
            .find(|b| b.label == "CERTIFICATE")
            .ok_or_else(|| X509Error::InvalidCert("no CERTIFICATE block found".into()))?;
        Self::from_der(&block.data)
    }

    /// Load from bytes of unknown framing: armored or bare base64 input
    /// is scrubbed and decoded, anything else is taken as raw DER.
    pub fn load(input: &[u8]) -> Result<Certificate, X509Error> {
        match std::str::from_utf8(input).ok().and_then(pem::scrub) {
            Some(der) => Self::from_der(&der),
            None => Self::from_der(input),
        }
    }

    /// Encode the tbsCertificate. Omits the version field for v1 and the
    /// extensions wrapper when the list is empty.
    pub(crate) fn encode_tbs(&self) -> Result<Vec<u8>, X509Error> {
        let mut body = Vec::new();
        if self.version > 1 {
            body.extend_from_slice(&enc_explicit_ctx(0, &enc_int(&[self.version - 1])));
        }
        body.extend_from_slice(&enc_int(&self.serial_number.to_bytes_be()));
        body.extend_from_slice(&self.tbs_signature_algorithm.to_der());
        body.extend_from_slice(&self.issuer.to_der());
        body.extend_from_slice(&self.validity.to_der());
        body.extend_from_slice(&self.subject.to_der());
        body.extend_from_slice(&self.subject_public_key_info.to_der());
        if let Some(id) = &self.issuer_unique_id {
            body.extend_from_slice(&enc_primitive_ctx(1, &id.content()));
        }
        if let Some(id) = &self.subject_unique_id {
            body.extend_from_slice(&enc_primitive_ctx(2, &id.content()));
        }
        if !self.extensions.is_empty() {
            body.extend_from_slice(&enc_explicit_ctx(
                3,
                &encode_extensions_der(&self.extensions)?,
            ));
        }
        Ok(enc_seq(&body))
    }

    /// Re-encode the certificate from its parsed fields. The signature
    /// bytes are emitted as stored; mutating the TBS without re-signing
    /// produces an encoding whose signature no longer verifies.
    pub fn to_der(&self) -> Result<Vec<u8>, X509Error> {
        let mut body = self.encode_tbs()?;
        body.extend_from_slice(&self.signature_algorithm.to_der());
        body.extend_from_slice(&enc_bit_string(
            self.signature.unused,
            &self.signature.bytes,
        ));
        Ok(enc_seq(&body))
    }

    pub fn to_pem(&self) -> Result<String, X509Error> {
        Ok(pem::encode("CERTIFICATE", &self.to_der()?))
    }

    // -----------------------------------------------------------------------
    // Accessors
    // -----------------------------------------------------------------------

    /// The subject key as an RSA object.
    pub fn public_key(&self) -> Result<RsaPublicKey, X509Error> {
        self.subject_public_key_info.rsa_public_key()
    }

    /// Look up an extension by symbolic name or dotted OID.
    pub fn get_extension(&self, id: &str) -> Option<&Extension> {
        find_extension(&self.extensions, id)
    }

    /// Install an extension. With `replace` false the call fails when the
    /// extension is already present. Returns false on failure.
    pub fn set_extension(
        &mut self,
        id: &str,
        value: ExtensionValue,
        critical: bool,
        replace: bool,
    ) -> bool {
        set_extension(&mut self.extensions, id, value, critical, replace)
    }

    /// Remove an extension; false when it was not present.
    pub fn remove_extension(&mut self, id: &str) -> bool {
        remove_extension(&mut self.extensions, id)
    }

    /// The subjectKeyIdentifier payload, when the extension is present.
    pub fn subject_key_identifier(&self) -> Option<&[u8]> {
        match &self.get_extension("id-ce-subjectKeyIdentifier")?.value {
            ExtensionValue::SubjectKeyIdentifier(id) => Some(id),
            _ => None,
        }
    }

    /// The authorityKeyIdentifier value, when the extension is present.
    pub fn authority_key_identifier(&self) -> Option<&AuthorityKeyIdentifier> {
        match &self.get_extension("id-ce-authorityKeyIdentifier")?.value {
            ExtensionValue::AuthorityKeyIdentifier(aki) => Some(aki),
            _ => None,
        }
    }
}

fn read_unique_id(dec: &mut Decoder, tag_num: u32) -> Result<Option<BitString>, X509Error> {
    let tlv = dec
        .try_read_context_specific(tag_num, false)
        .map_err(|e| X509Error::Asn1Error(e.to_string()))?;
    Ok(tlv.map(|tlv| {
        let (unused, bytes) = match tlv.value.split_first() {
            Some((&unused, rest)) => (unused, rest.to_vec()),
            None => (0, Vec::new()),
        };
        BitString { unused, bytes }
    }))
}

#[cfg(test)]
mod tests {
    use super::super::extensions::KeyUsage;
    use super::super::fixtures;
    use super::*;

    fn ca() -> Certificate {
        Certificate::from_pem(fixtures::CA_PEM).unwrap()
    }

    fn leaf() -> Certificate {
        Certificate::from_pem(fixtures::LEAF_PEM).unwrap()
    }

    #[test]
    fn test_parse_ca_fields() {
        let cert = ca();
        assert_eq!(cert.version, 3);
        assert_eq!(cert.serial_number, BigNum::from_u64(0x0123_4567_89AB_CDEF));
        assert_eq!(cert.subject.get_dn_prop("cn"), vec!["CertKit Test CA"]);
        assert_eq!(cert.subject.get_dn_prop("o"), vec!["CertKit"]);
        assert_eq!(cert.issuer, cert.subject);
        assert_eq!(cert.validity.not_before.timestamp, fixtures::CA_NOT_BEFORE);
        assert_eq!(cert.validity.not_after.timestamp, fixtures::CA_NOT_AFTER);
        assert_eq!(cert.validity.not_before.kind, TimeKind::Utc);
        assert_eq!(
            cert.signature_algorithm.oid,
            known::sha256_with_rsa_encryption()
        );
        assert_eq!(cert.tbs_signature_algorithm, cert.signature_algorithm);
        // TBS span: offset 4 in the outer SEQUENCE, 4-byte header + 542.
        assert_eq!(cert.tbs_raw.len(), 546);
        assert_eq!(&cert.raw[4..4 + 546], &cert.tbs_raw[..]);
    }

    #[test]
    fn test_parse_ca_extensions() {
        let cert = ca();
        assert_eq!(cert.extensions.len(), 3);
        assert_eq!(cert.subject_key_identifier(), Some(&fixtures::CA_SKI[..]));

        let bc = cert.get_extension("id-ce-basicConstraints").unwrap();
        assert!(bc.critical);
        let ExtensionValue::BasicConstraints(bc) = &bc.value else {
            panic!("wrong payload type");
        };
        assert!(bc.ca);
        assert_eq!(bc.path_len, None);

        let ku = cert.get_extension("id-ce-keyUsage").unwrap();
        assert!(ku.critical);
        let ExtensionValue::KeyUsage(ku) = &ku.value else {
            panic!("wrong payload type");
        };
        assert!(ku.has(KeyUsage::KEY_CERT_SIGN));
        assert!(ku.has(KeyUsage::CRL_SIGN));
        assert!(!ku.has(KeyUsage::DIGITAL_SIGNATURE));

        // Self-signed root carries no AKI.
        assert!(cert.authority_key_identifier().is_none());
    }

    #[test]
    fn test_leaf_issuer_and_aki() {
        let cert = leaf();
        assert_eq!(
            cert.serial_number,
            BigNum::from_bytes_be(&fixtures::LEAF_SERIAL)
        );
        assert_eq!(cert.issuer.get_dn_prop("cn"), vec!["CertKit Test CA"]);
        assert_eq!(cert.subject.get_dn_prop("cn"), vec!["leaf.certkit.test"]);
        let aki = cert.authority_key_identifier().unwrap();
        assert_eq!(aki.key_identifier.as_deref(), Some(&fixtures::CA_SKI[..]));
        assert!(aki.authority_cert_issuer.is_empty());
        assert_eq!(cert.subject_key_identifier(), Some(&fixtures::LEAF_SKI[..]));
    }

    #[test]
    fn test_leaf_subject_alt_name() {
        use super::super::extensions::GeneralName;
        let cert = leaf();
        let san = cert.get_extension("id-ce-subjectAltName").unwrap();
        let ExtensionValue::SubjectAltName(names) = &san.value else {
            panic!("wrong payload type");
        };
        assert_eq!(names.len(), 3);
        assert_eq!(names[0], GeneralName::DnsName("leaf.certkit.test".into()));
        assert_eq!(names[1], GeneralName::DnsName("*.alt.certkit.test".into()));
        assert_eq!(names[2].ip_string().as_deref(), Some("192.0.2.10"));
    }

    #[test]
    fn test_der_round_trip_is_byte_exact() {
        for text in [fixtures::CA_PEM, fixtures::LEAF_PEM] {
            let der = pem::parse(text).unwrap().remove(0).data;
            let cert = Certificate::from_der(&der).unwrap();
            assert_eq!(cert.to_der().unwrap(), der);
        }
    }

    #[test]
    fn test_pem_round_trip_matches_input() {
        let cert = ca();
        assert_eq!(cert.to_pem().unwrap(), fixtures::CA_PEM);
    }

    #[test]
    fn test_load_auto_detect() {
        // PEM with an OpenSSL-style preamble goes through the scrubber.
        let noisy = format!(
            "Bag Attributes\n    friendlyName: root\n{}",
            fixtures::CA_PEM
        );
        let from_noisy = Certificate::load(noisy.as_bytes()).unwrap();
        assert_eq!(
            from_noisy.subject.get_dn_prop("cn"),
            vec!["CertKit Test CA"]
        );

        // Raw DER goes through the fallback path.
        let der = pem::parse(fixtures::CA_PEM).unwrap().remove(0).data;
        let from_der = Certificate::load(&der).unwrap();
        assert_eq!(from_der.raw, der);

        // Bare base64 with no armor at all.
        let bare: String = fixtures::CA_PEM
            .lines()
            .filter(|l| !l.starts_with("-----"))
            .collect();
        assert!(Certificate::load(bare.as_bytes()).is_ok());
    }

    #[test]
    fn test_public_key() {
        let key = ca().public_key().unwrap();
        assert_eq!(key.bits(), 2048);
        assert_eq!(key.e_bytes(), vec![0x01, 0x00, 0x01]);
    }

    #[test]
    fn test_validity_window() {
        let v = ca().validity;
        assert!(!v.contains(fixtures::CA_NOT_BEFORE - 1));
        assert!(v.contains(fixtures::CA_NOT_BEFORE));
        assert!(v.contains(fixtures::CA_NOT_AFTER - 1));
        // notAfter itself is outside the window.
        assert!(!v.contains(fixtures::CA_NOT_AFTER));
    }

    #[test]
    fn test_extension_mutation() {
        let mut cert = leaf();
        // Present, replace=false: refused.
        assert!(!cert.set_extension(
            "id-ce-basicConstraints",
            ExtensionValue::BasicConstraints(Default::default()),
            false,
            false,
        ));
        assert!(cert.set_extension(
            "netscape-comment",
            ExtensionValue::NetscapeComment("issued for testing".into()),
            false,
            true,
        ));
        let ext = cert.get_extension("2.16.840.1.113730.1.13").unwrap();
        assert_eq!(
            ext.value,
            ExtensionValue::NetscapeComment("issued for testing".into())
        );
        assert!(cert.remove_extension("netscape-comment"));
        assert!(!cert.remove_extension("netscape-comment"));
    }

    #[test]
    fn test_unique_id_round_trip() {
        let mut cert = ca();
        cert.issuer_unique_id = Some(BitString::new(vec![0xAB, 0xCD]));
        let der = cert.to_der().unwrap();
        let reparsed = Certificate::from_der(&der).unwrap();
        assert_eq!(
            reparsed.issuer_unique_id,
            Some(BitString::new(vec![0xAB, 0xCD]))
        );
        assert_eq!(reparsed.subject_unique_id, None);
    }

    #[test]
    fn test_truncated_der_rejected() {
        let der = pem::parse(fixtures::CA_PEM).unwrap().remove(0).data;
        assert!(Certificate::from_der(&der[..der.len() - 4]).is_err());
        assert!(Certificate::from_der(&[]).is_err());
    }

    #[test]
    fn test_rsa_algorithm_params_normalize_to_null() {
        let alg = AlgorithmIdentifier::new(known::sha256_with_rsa_encryption());
        assert_eq!(
            alg.to_der(),
            vec![
                0x30, 0x0D, 0x06, 0x09, 0x2A, 0x86, 0x48, 0x86, 0xF7, 0x0D, 0x01, 0x01, 0x0B,
                0x05, 0x00
            ]
        );
    }

    #[test]
    fn test_non_rsa_algorithm_params_kept_verbatim() {
        // ecPublicKey with a named-curve parameter OID.
        let der = [
            0x30, 0x13, 0x06, 0x07, 0x2A, 0x86, 0x48, 0xCE, 0x3D, 0x02, 0x01, 0x06, 0x08, 0x2A,
            0x86, 0x48, 0xCE, 0x3D, 0x03, 0x01, 0x07,
        ];
        let mut dec = Decoder::new(&der);
        let alg = AlgorithmIdentifier::from_decoder(&mut dec).unwrap();
        assert!(matches!(alg.params, AlgorithmParams::Other(_)));
        assert_eq!(alg.to_der(), der);
    }
}
