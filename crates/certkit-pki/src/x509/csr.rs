//! PKCS#10 certification requests (RFC 2986).
//!
//! Requested extensions travel inside the pkcs-9-at-extensionRequest
//! attribute; the extension accessors here address that list directly and
//! create the attribute on first write.

use certkit_crypto::rsa::RsaPublicKey;
use certkit_types::X509Error;
use certkit_utils::asn1::Decoder;
use certkit_utils::pem;

use crate::encoding::{enc_bit_string, enc_int, enc_seq, enc_tlv};

use super::attributes::{
    encode_attribute_list, get_attribute, parse_attribute_list, remove_attribute, set_attribute,
    Attribute, AttributeValue, Disposition,
};
use super::certificate::{AlgorithmIdentifier, BitString, SubjectPublicKeyInfo};
use super::extensions::{
    find_extension, remove_extension, set_extension, Extension, ExtensionValue,
};
use super::name::{parse_name, Name};
use super::signing;
use super::verify::Verdict;

const EXTENSION_REQUEST: &str = "pkcs-9-at-extensionRequest";

/// A parsed PKCS#10 certification request.
#[derive(Debug, Clone)]
pub struct CertificationRequest {
    /// DER of the full CertificationRequest SEQUENCE as loaded.
    pub raw: Vec<u8>,
    /// Exact byte span of the certificationRequestInfo, as signed.
    pub tbs_raw: Vec<u8>,
    /// Version number, 1-based (v1 is 1).
    pub version: u8,
    pub subject: Name,
    pub subject_public_key_info: SubjectPublicKeyInfo,
    pub attributes: Vec<Attribute>,
    pub signature_algorithm: AlgorithmIdentifier,
    pub signature: BitString,
}

impl CertificationRequest {
    pub fn from_der(data: &[u8]) -> Result<CertificationRequest, X509Error> {
        let mut dec = Decoder::new(data);
        let mut outer = dec
            .read_sequence()
            .map_err(|e| X509Error::Asn1Error(e.to_string()))?;

        let remaining_before = outer.remaining();
        let tbs_tlv = outer
            .read_tlv()
            .map_err(|e| X509Error::Asn1Error(e.to_string()))?;
        let tbs_consumed = remaining_before.len() - outer.remaining().len();
        let tbs_raw = remaining_before[..tbs_consumed].to_vec();

        let mut tbs = Decoder::new(tbs_tlv.value);

        let version_bytes = tbs
            .read_integer()
            .map_err(|e| X509Error::Asn1Error(e.to_string()))?;
        let version = version_bytes.last().copied().unwrap_or(0) + 1;

        let subject = parse_name(&mut tbs)?;
        let subject_public_key_info = SubjectPublicKeyInfo::from_decoder(&mut tbs)?;

        // attributes [0] IMPLICIT SET OF Attribute
        let attributes = match tbs
            .try_read_context_specific(0, true)
            .map_err(|e| X509Error::Asn1Error(e.to_string()))?
        {
            Some(attr_tlv) => {
                let mut attrs = Decoder::new(attr_tlv.value);
                parse_attribute_list(&mut attrs)?
            }
            None => Vec::new(),
        };

        let signature_algorithm = AlgorithmIdentifier::from_decoder(&mut outer)?;
        let (sig_unused, sig_bytes) = outer
            .read_bit_string()
            .map_err(|e| X509Error::Asn1Error(e.to_string()))?;

        Ok(CertificationRequest {
            raw: data.to_vec(),
            tbs_raw,
            version,
            subject,
            subject_public_key_info,
            attributes,
            signature_algorithm,
            signature: BitString {
                unused: sig_unused,
                bytes: sig_bytes.to_vec(),
            },
        })
    }

    /// Parse from a PEM `CERTIFICATE REQUEST` block. The `NEW CERTIFICATE
    /// REQUEST` label some generators emit is accepted as well.
    pub fn from_pem(text: &str) -> Result<CertificationRequest, X509Error> {
        let blocks = pem::parse(text).map_err(|e| X509Error::Asn1Error(e.to_string()))?;
        let block = blocks
            .iter()
            .find(|b| b.label == "CERTIFICATE REQUEST" || b.label == "NEW CERTIFICATE REQUEST")
            .ok_or_else(|| X509Error::InvalidCsr("no CERTIFICATE REQUEST block found".into()))?;
        Self::from_der(&block.data)
    }

    /// Load from bytes of unknown framing: armored or bare base64 input
    /// is scrubbed and decoded, anything else is taken as raw DER.
    pub fn load(input: &[u8]) -> Result<CertificationRequest, X509Error> {
        match std::str::from_utf8(input).ok().and_then(pem::scrub) {
            Some(der) => Self::from_der(&der),
            None => Self::from_der(input),
        }
    }

    /// Encode the certificationRequestInfo. The attribute wrapper is
    /// emitted even when the list is empty, as RFC 2986 requires.
    pub(crate) fn encode_tbs(&self) -> Result<Vec<u8>, X509Error> {
        let mut body = enc_int(&[self.version - 1]);
        body.extend_from_slice(&self.subject.to_der());
        body.extend_from_slice(&self.subject_public_key_info.to_der());
        body.extend_from_slice(&enc_tlv(0xA0, &encode_attribute_list(&self.attributes)?));
        Ok(enc_seq(&body))
    }

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
        Ok(pem::encode("CERTIFICATE REQUEST", &self.to_der()?))
    }

    /// Check the self-signature over the request info with the request's
    /// own public key.
    pub fn verify_signature(&self) -> Verdict {
        Verdict::from_check(signing::check_signature(
            &self.subject_public_key_info,
            &self.signature_algorithm.oid,
            &self.tbs_raw,
            &self.signature.bytes,
        ))
    }

    pub fn public_key(&self) -> Result<RsaPublicKey, X509Error> {
        self.subject_public_key_info.rsa_public_key()
    }

    // -----------------------------------------------------------------------
    // Attribute access
    // -----------------------------------------------------------------------

    pub fn get_attribute(
        &self,
        id: &str,
        disposition: Disposition,
    ) -> Result<Vec<AttributeValue>, X509Error> {
        get_attribute(&self.attributes, id, disposition)
    }

    pub fn set_attribute(
        &mut self,
        id: &str,
        value: AttributeValue,
        disposition: Disposition,
    ) -> bool {
        set_attribute(&mut self.attributes, id, value, disposition)
    }

    pub fn remove_attribute(
        &mut self,
        id: &str,
        disposition: Disposition,
    ) -> Result<bool, X509Error> {
        remove_attribute(&mut self.attributes, id, disposition)
    }

    // -----------------------------------------------------------------------
    // Requested extensions
    // -----------------------------------------------------------------------

    /// The extension list inside the extensionRequest attribute, if any.
    pub fn requested_extensions(&self) -> Option<&[Extension]> {
        self.attributes.iter().find_map(|attribute| {
            attribute.values.iter().find_map(|value| match value {
                AttributeValue::ExtensionRequest(list) => Some(list.as_slice()),
                _ => None,
            })
        })
    }

    fn take_requested_extensions(&mut self) -> Vec<Extension> {
        for attribute in &mut self.attributes {
            for value in &mut attribute.values {
                if let AttributeValue::ExtensionRequest(list) = value {
                    return std::mem::take(list);
                }
            }
        }
        Vec::new()
    }

    fn store_requested_extensions(&mut self, list: Vec<Extension>) {
        for attribute in &mut self.attributes {
            for value in &mut attribute.values {
                if let AttributeValue::ExtensionRequest(slot) = value {
                    *slot = list;
                    return;
                }
            }
        }
        self.set_attribute(
            EXTENSION_REQUEST,
            AttributeValue::ExtensionRequest(list),
            Disposition::Append,
        );
    }

    pub fn get_extension(&self, id: &str) -> Option<&Extension> {
        find_extension(self.requested_extensions()?, id)
    }

    /// Install a requested extension, creating the extensionRequest
    /// attribute on first use. With `replace` false an existing extension
    /// of the same type is left untouched.
    pub fn set_extension(
        &mut self,
        id: &str,
        value: ExtensionValue,
        critical: bool,
        replace: bool,
    ) -> bool {
        let mut list = self.take_requested_extensions();
        let changed = set_extension(&mut list, id, value, critical, replace);
        self.store_requested_extensions(list);
        changed
    }

    pub fn remove_extension(&mut self, id: &str) -> bool {
        if self.requested_extensions().is_none() {
            return false;
        }
        let mut list = self.take_requested_extensions();
        let removed = remove_extension(&mut list, id);
        self.store_requested_extensions(list);
        removed
    }
}

#[cfg(test)]
mod tests {
    use super::super::extensions::{BasicConstraints, GeneralName};
    use super::super::fixtures;
    use super::*;

    fn leaf_csr() -> CertificationRequest {
        CertificationRequest::from_pem(fixtures::LEAF_CSR_PEM).unwrap()
    }

    #[test]
    fn test_parse_csr_fields() {
        let csr = leaf_csr();
        assert_eq!(csr.version, 1);
        assert_eq!(csr.subject.get_dn_prop("id-at-commonName"), ["leaf.certkit.test"]);
        assert_eq!(csr.subject.get_dn_prop("id-at-organizationName"), ["CertKit"]);
        assert_eq!(csr.attributes.len(), 2);
        assert_eq!(
            csr.signature_algorithm.oid.to_dot_string(),
            "1.2.840.113549.1.1.11"
        );
        assert_eq!(csr.public_key().unwrap().bits(), 2048);
    }

    #[test]
    fn test_challenge_password() {
        let csr = leaf_csr();
        let values = csr
            .get_attribute("pkcs-9-at-challengePassword", Disposition::All)
            .unwrap();
        assert_eq!(values.len(), 1);
        assert_eq!(values[0].text(), Some("s3kr1t"));
    }

    #[test]
    fn test_requested_extensions() {
        let csr = leaf_csr();
        let san = csr.get_extension("id-ce-subjectAltName").unwrap();
        assert!(!san.critical);
        let ExtensionValue::SubjectAltName(names) = &san.value else {
            panic!("expected a subjectAltName value");
        };
        assert_eq!(names.len(), 3);
        assert_eq!(names[0], GeneralName::DnsName("leaf.certkit.test".into()));
        assert_eq!(names[1], GeneralName::DnsName("*.alt.certkit.test".into()));
        assert_eq!(names[2].ip_string().as_deref(), Some("192.0.2.10"));
    }

    #[test]
    fn test_der_round_trip_is_byte_exact() {
        let blocks = pem::parse(fixtures::LEAF_CSR_PEM).unwrap();
        let der = &blocks[0].data;
        let csr = CertificationRequest::from_der(der).unwrap();
        assert_eq!(csr.to_der().unwrap(), *der);
        assert_eq!(csr.to_pem().unwrap(), fixtures::LEAF_CSR_PEM);
    }

    #[test]
    fn test_verify_signature() {
        let mut csr = leaf_csr();
        assert_eq!(csr.verify_signature(), Verdict::Verified);

        csr.signature.bytes[10] ^= 0xFF;
        assert_eq!(csr.verify_signature(), Verdict::Rejected);
    }

    #[test]
    fn test_load_auto_detect() {
        let blocks = pem::parse(fixtures::LEAF_CSR_PEM).unwrap();
        let der = blocks[0].data.clone();
        assert_eq!(
            CertificationRequest::load(&der).unwrap().tbs_raw,
            CertificationRequest::load(fixtures::LEAF_CSR_PEM.as_bytes())
                .unwrap()
                .tbs_raw
        );
    }

    #[test]
    fn test_set_extension_creates_attribute() {
        let mut csr = leaf_csr();
        csr.remove_attribute(EXTENSION_REQUEST, Disposition::All)
            .unwrap();
        assert!(csr.requested_extensions().is_none());
        assert!(csr.get_extension("id-ce-subjectAltName").is_none());

        assert!(csr.set_extension(
            "id-ce-basicConstraints",
            ExtensionValue::BasicConstraints(BasicConstraints {
                ca: false,
                path_len: None,
            }),
            false,
            false,
        ));
        assert_eq!(csr.attributes.len(), 2);
        assert!(csr.get_extension("id-ce-basicConstraints").is_some());

        // replace=false leaves the existing entry alone
        assert!(!csr.set_extension(
            "id-ce-basicConstraints",
            ExtensionValue::BasicConstraints(BasicConstraints {
                ca: true,
                path_len: Some(0),
            }),
            true,
            false,
        ));
        assert!(csr.remove_extension("id-ce-basicConstraints"));
        assert!(!csr.remove_extension("id-ce-basicConstraints"));
    }

    #[test]
    fn test_new_certificate_request_label_accepted() {
        let renamed = fixtures::LEAF_CSR_PEM.replace("CERTIFICATE REQUEST", "NEW CERTIFICATE REQUEST");
        let csr = CertificationRequest::from_pem(&renamed).unwrap();
        assert_eq!(csr.version, 1);
    }
}
