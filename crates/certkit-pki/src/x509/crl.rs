//! Certificate revocation lists (RFC 5280 §5).
//!
//! Revoked entries are keyed by serial number. Entry extensions such as
//! the reason code ride along as typed extension values and survive a
//! re-encode byte for byte.

use certkit_bignum::BigNum;
use certkit_types::{HashAlgId, X509Error};
use certkit_utils::asn1::{tags, Decoder, TagClass};
use certkit_utils::pem;

use crate::encoding::{enc_bit_string, enc_explicit_ctx, enc_int, enc_seq};

use super::certificate::{AlgorithmIdentifier, BitString, Time};
use super::extensions::{
    encode_extensions_der, find_extension, parse_extension_list, parse_extensions_der,
    remove_extension, set_extension, CrlReason, Extension, ExtensionValue,
};
use super::name::{parse_name, Name};
use super::signing;

/// A parsed certificate revocation list.
#[derive(Debug, Clone)]
pub struct CertificateList {
    /// DER of the full CertificateList SEQUENCE as loaded.
    pub raw: Vec<u8>,
    /// Exact byte span of the tbsCertList, as signed.
    pub tbs_raw: Vec<u8>,
    /// Version number, 1-based, when the optional field is present on the
    /// wire (v2 is 2). `None` re-encodes with the field omitted.
    pub version: Option<u8>,
    pub tbs_signature_algorithm: AlgorithmIdentifier,
    pub issuer: Name,
    pub this_update: Time,
    pub next_update: Option<Time>,
    pub revoked: Vec<RevokedCertificate>,
    pub crl_extensions: Vec<Extension>,
    pub signature_algorithm: AlgorithmIdentifier,
    pub signature: BitString,
}

/// One revoked certificate entry.
#[derive(Debug, Clone)]
pub struct RevokedCertificate {
    pub serial_number: BigNum,
    pub revocation_date: Time,
    pub extensions: Vec<Extension>,
}

impl RevokedCertificate {
    fn from_decoder(dec: &mut Decoder) -> Result<RevokedCertificate, X509Error> {
        let mut entry = dec
            .read_sequence()
            .map_err(|e| X509Error::Asn1Error(e.to_string()))?;
        let serial_number = BigNum::from_bytes_be(
            entry
                .read_integer()
                .map_err(|e| X509Error::Asn1Error(e.to_string()))?,
        );
        let revocation_date = Time::from_decoder(&mut entry)?;
        let extensions = if entry.is_empty() {
            Vec::new()
        } else {
            let mut list = entry
                .read_sequence()
                .map_err(|e| X509Error::Asn1Error(e.to_string()))?;
            parse_extension_list(&mut list)?
        };
        Ok(RevokedCertificate {
            serial_number,
            revocation_date,
            extensions,
        })
    }

    fn to_der(&self) -> Result<Vec<u8>, X509Error> {
        let mut body = enc_int(&self.serial_number.to_bytes_be());
        body.extend_from_slice(&self.revocation_date.to_der());
        if !self.extensions.is_empty() {
            body.extend_from_slice(&encode_extensions_der(&self.extensions)?);
        }
        Ok(enc_seq(&body))
    }

    /// The reason code carried in the entry extensions, if any.
    pub fn reason(&self) -> Option<CrlReason> {
        self.extensions.iter().find_map(|ext| match ext.value {
            ExtensionValue::CrlReason(reason) => Some(reason),
            _ => None,
        })
    }

    /// The invalidity date carried in the entry extensions, if any.
    pub fn invalidity_date(&self) -> Option<i64> {
        self.extensions.iter().find_map(|ext| match ext.value {
            ExtensionValue::InvalidityDate(when) => Some(when),
            _ => None,
        })
    }
}

impl CertificateList {
    /// An empty v2 list stamped with the current time, ready for staging
    /// entries and extensions. The issuer name and signature are
    /// placeholders until a signer fills them in.
    pub fn new() -> CertificateList {
        CertificateList {
            raw: Vec::new(),
            tbs_raw: Vec::new(),
            version: Some(2),
            tbs_signature_algorithm: signing::signature_algorithm(HashAlgId::Sha256),
            issuer: Name::new(),
            this_update: Time::now(),
            next_update: None,
            revoked: Vec::new(),
            crl_extensions: Vec::new(),
            signature_algorithm: signing::signature_algorithm(HashAlgId::Sha256),
            signature: BitString::new(Vec::new()),
        }
    }

    pub fn from_der(data: &[u8]) -> Result<CertificateList, X509Error> {
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

        // version INTEGER OPTIONAL; when absent the algorithm SEQUENCE
        // comes first
        let first = tbs
            .peek_tag()
            .map_err(|e| X509Error::Asn1Error(e.to_string()))?;
        let version = if first.class == TagClass::Universal && first.number == tags::INTEGER as u32
        {
            let bytes = tbs
                .read_integer()
                .map_err(|e| X509Error::Asn1Error(e.to_string()))?;
            Some(bytes.last().copied().unwrap_or(0) + 1)
        } else {
            None
        };

        let tbs_signature_algorithm = AlgorithmIdentifier::from_decoder(&mut tbs)?;
        let issuer = parse_name(&mut tbs)?;
        let this_update = Time::from_decoder(&mut tbs)?;

        // nextUpdate Time OPTIONAL
        let next_update = if tbs.is_empty() {
            None
        } else {
            let tag = tbs
                .peek_tag()
                .map_err(|e| X509Error::Asn1Error(e.to_string()))?;
            if tag.class == TagClass::Universal
                && (tag.number == tags::UTC_TIME as u32
                    || tag.number == tags::GENERALIZED_TIME as u32)
            {
                Some(Time::from_decoder(&mut tbs)?)
            } else {
                None
            }
        };

        // revokedCertificates SEQUENCE OF SEQUENCE OPTIONAL
        let mut revoked = Vec::new();
        if !tbs.is_empty() {
            let tag = tbs
                .peek_tag()
                .map_err(|e| X509Error::Asn1Error(e.to_string()))?;
            if tag.class == TagClass::Universal && tag.number == 0x10 {
                let mut entries = tbs
                    .read_sequence()
                    .map_err(|e| X509Error::Asn1Error(e.to_string()))?;
                while !entries.is_empty() {
                    revoked.push(RevokedCertificate::from_decoder(&mut entries)?);
                }
            }
        }

        // crlExtensions [0] EXPLICIT Extensions OPTIONAL
        let crl_extensions = if tbs.is_empty() {
            Vec::new()
        } else {
            match tbs
                .try_read_context_specific(0, true)
                .map_err(|e| X509Error::Asn1Error(e.to_string()))?
            {
                Some(ext_tlv) => parse_extensions_der(ext_tlv.value)?,
                None => Vec::new(),
            }
        };

        let signature_algorithm = AlgorithmIdentifier::from_decoder(&mut outer)?;
        let (sig_unused, sig_bytes) = outer
            .read_bit_string()
            .map_err(|e| X509Error::Asn1Error(e.to_string()))?;

        Ok(CertificateList {
            raw: data.to_vec(),
            tbs_raw,
            version,
            tbs_signature_algorithm,
            issuer,
            this_update,
            next_update,
            revoked,
            crl_extensions,
            signature_algorithm,
            signature: BitString {
                unused: sig_unused,
                bytes: sig_bytes.to_vec(),
            },
        })
    }

    /// Parse from a PEM `X509 CRL` block.
    pub fn from_pem(text: &str) -> Result<CertificateList, X509Error> {
        let blocks = pem::parse(text).map_err(|e| X509Error::Asn1Error(e.to_string()))?;
        let block = blocks
            .iter()
            .find(|b| b.label == "X509 CRL")
            .ok_or_else(|| X509Error::InvalidCrl("no X509 CRL block found".into()))?;
        Self::from_der(&block.data)
    }

    /// Load from bytes of unknown framing: armored or bare base64 input
    /// is scrubbed and decoded, anything else is taken as raw DER.
    pub fn load(input: &[u8]) -> Result<CertificateList, X509Error> {
        match std::str::from_utf8(input).ok().and_then(pem::scrub) {
            Some(der) => Self::from_der(&der),
            None => Self::from_der(input),
        }
    }

    /// Encode the tbsCertList. The version field re-encodes only when it
    /// was present on load, and the revoked list only when non-empty.
    pub(crate) fn encode_tbs(&self) -> Result<Vec<u8>, X509Error> {
        let mut body = Vec::new();
        if let Some(version) = self.version {
            body.extend_from_slice(&enc_int(&[version - 1]));
        }
        body.extend_from_slice(&self.tbs_signature_algorithm.to_der());
        body.extend_from_slice(&self.issuer.to_der());
        body.extend_from_slice(&self.this_update.to_der());
        if let Some(next_update) = &self.next_update {
            body.extend_from_slice(&next_update.to_der());
        }
        if !self.revoked.is_empty() {
            let mut entries = Vec::new();
            for entry in &self.revoked {
                entries.extend_from_slice(&entry.to_der()?);
            }
            body.extend_from_slice(&enc_seq(&entries));
        }
        if !self.crl_extensions.is_empty() {
            body.extend_from_slice(&enc_explicit_ctx(
                0,
                &encode_extensions_der(&self.crl_extensions)?,
            ));
        }
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
        Ok(pem::encode("X509 CRL", &self.to_der()?))
    }

    // -----------------------------------------------------------------------
    // Revocation list access
    // -----------------------------------------------------------------------

    /// Serial numbers of every revoked certificate.
    pub fn list_revoked(&self) -> Vec<&BigNum> {
        self.revoked.iter().map(|entry| &entry.serial_number).collect()
    }

    pub fn get_revoked(&self, serial: &BigNum) -> Option<&RevokedCertificate> {
        self.revoked
            .iter()
            .find(|entry| entry.serial_number == *serial)
    }

    fn get_revoked_mut(&mut self, serial: &BigNum) -> Option<&mut RevokedCertificate> {
        self.revoked
            .iter_mut()
            .find(|entry| entry.serial_number == *serial)
    }

    /// Add a revocation entry. Returns false when the serial is already
    /// listed. With no date given the entry is stamped with the current
    /// time.
    pub fn revoke(&mut self, serial: BigNum, date: Option<Time>) -> bool {
        if self.get_revoked(&serial).is_some() {
            return false;
        }
        self.revoked.push(RevokedCertificate {
            serial_number: serial,
            revocation_date: date.unwrap_or_else(Time::now),
            extensions: Vec::new(),
        });
        true
    }

    /// Drop the entry for a serial. Returns whether one was present.
    pub fn unrevoke(&mut self, serial: &BigNum) -> bool {
        let before = self.revoked.len();
        self.revoked.retain(|entry| entry.serial_number != *serial);
        self.revoked.len() != before
    }

    // -----------------------------------------------------------------------
    // Extension access
    // -----------------------------------------------------------------------

    pub fn get_extension(&self, id: &str) -> Option<&Extension> {
        find_extension(&self.crl_extensions, id)
    }

    pub fn set_extension(
        &mut self,
        id: &str,
        value: ExtensionValue,
        critical: bool,
        replace: bool,
    ) -> bool {
        set_extension(&mut self.crl_extensions, id, value, critical, replace)
    }

    pub fn remove_extension(&mut self, id: &str) -> bool {
        remove_extension(&mut self.crl_extensions, id)
    }

    /// The cRLNumber extension value, if present.
    pub fn crl_number(&self) -> Option<&BigNum> {
        match &self.get_extension("id-ce-cRLNumber")?.value {
            ExtensionValue::CrlNumber(number) => Some(number),
            _ => None,
        }
    }

    // -----------------------------------------------------------------------
    // Per-entry extension access
    // -----------------------------------------------------------------------

    pub fn get_revoked_extension(&self, serial: &BigNum, id: &str) -> Option<&Extension> {
        find_extension(&self.get_revoked(serial)?.extensions, id)
    }

    /// Install an extension on the entry for `serial`. Returns false when
    /// the serial is not listed or the extension is present and `replace`
    /// is unset.
    pub fn set_revoked_extension(
        &mut self,
        serial: &BigNum,
        id: &str,
        value: ExtensionValue,
        critical: bool,
        replace: bool,
    ) -> bool {
        match self.get_revoked_mut(serial) {
            Some(entry) => set_extension(&mut entry.extensions, id, value, critical, replace),
            None => false,
        }
    }

    pub fn remove_revoked_extension(&mut self, serial: &BigNum, id: &str) -> bool {
        match self.get_revoked_mut(serial) {
            Some(entry) => remove_extension(&mut entry.extensions, id),
            None => false,
        }
    }
}

impl Default for CertificateList {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::super::fixtures;
    use super::*;
    use certkit_utils::asn1::TimeKind;

    fn crl() -> CertificateList {
        CertificateList::from_pem(fixtures::CRL_PEM).unwrap()
    }

    fn leaf_serial() -> BigNum {
        BigNum::from_bytes_be(&fixtures::LEAF_SERIAL)
    }

    #[test]
    fn test_parse_crl_fields() {
        let crl = crl();
        assert_eq!(crl.version, Some(2));
        assert_eq!(crl.issuer.get_dn_prop("id-at-commonName"), ["CertKit Test CA"]);
        assert_eq!(crl.this_update.timestamp, fixtures::CRL_THIS_UPDATE);
        assert_eq!(crl.this_update.kind, TimeKind::Utc);
        assert_eq!(
            crl.next_update.map(|t| t.timestamp),
            Some(fixtures::CRL_NEXT_UPDATE)
        );
        assert_eq!(
            crl.signature_algorithm.oid.to_dot_string(),
            "1.2.840.113549.1.1.11"
        );
        assert_eq!(crl.tbs_raw.len(), 165);
        assert_eq!(crl.raw[4..169], crl.tbs_raw[..]);
    }

    #[test]
    fn test_parse_revoked_entry() {
        let crl = crl();
        assert_eq!(crl.revoked.len(), 1);
        assert_eq!(crl.list_revoked(), [&leaf_serial()]);

        let entry = crl.get_revoked(&leaf_serial()).unwrap();
        assert_eq!(entry.revocation_date.timestamp, fixtures::CRL_THIS_UPDATE);
        assert_eq!(entry.reason(), Some(CrlReason::KeyCompromise));
        assert_eq!(entry.invalidity_date(), None);
        assert!(crl.get_revoked(&BigNum::from_u64(7)).is_none());
    }

    #[test]
    fn test_crl_number() {
        let crl = crl();
        assert_eq!(crl.crl_number(), Some(&BigNum::from_u64(1)));
    }

    #[test]
    fn test_der_round_trip_is_byte_exact() {
        let blocks = pem::parse(fixtures::CRL_PEM).unwrap();
        let der = &blocks[0].data;
        let crl = CertificateList::from_der(der).unwrap();
        assert_eq!(crl.to_der().unwrap(), *der);
        assert_eq!(crl.to_pem().unwrap(), fixtures::CRL_PEM);
    }

    #[test]
    fn test_optional_fields_omitted() {
        let mut crl = crl();
        crl.version = None;
        crl.next_update = None;
        crl.revoked.clear();
        crl.crl_extensions.clear();

        let der = crl.to_der().unwrap();
        let reparsed = CertificateList::from_der(&der).unwrap();
        assert_eq!(reparsed.version, None);
        assert!(reparsed.next_update.is_none());
        assert!(reparsed.revoked.is_empty());
        assert!(reparsed.crl_extensions.is_empty());
        assert_eq!(reparsed.this_update.timestamp, fixtures::CRL_THIS_UPDATE);
    }

    #[test]
    fn test_revoke_and_unrevoke() {
        let mut crl = crl();
        let serial = BigNum::from_u64(0x1234);
        let date = Time::for_timestamp(fixtures::CRL_THIS_UPDATE + 60);

        assert!(crl.revoke(serial.clone(), Some(date)));
        assert!(!crl.revoke(serial.clone(), None));
        assert_eq!(crl.revoked.len(), 2);
        assert_eq!(
            crl.get_revoked(&serial).unwrap().revocation_date.timestamp,
            fixtures::CRL_THIS_UPDATE + 60
        );

        assert!(crl.unrevoke(&serial));
        assert!(!crl.unrevoke(&serial));
        assert_eq!(crl.revoked.len(), 1);
    }

    #[test]
    fn test_revoked_entry_extensions() {
        let mut crl = crl();
        let serial = leaf_serial();

        let reason = crl.get_revoked_extension(&serial, "id-ce-cRLReasons").unwrap();
        assert!(!reason.critical);

        assert!(crl.set_revoked_extension(
            &serial,
            "id-ce-invalidityDate",
            ExtensionValue::InvalidityDate(fixtures::CRL_THIS_UPDATE - 3600),
            false,
            false,
        ));
        assert_eq!(
            crl.get_revoked(&serial).unwrap().invalidity_date(),
            Some(fixtures::CRL_THIS_UPDATE - 3600)
        );

        // unknown serial
        assert!(!crl.set_revoked_extension(
            &BigNum::from_u64(9),
            "id-ce-invalidityDate",
            ExtensionValue::InvalidityDate(0),
            false,
            true,
        ));
        assert!(crl.remove_revoked_extension(&serial, "id-ce-invalidityDate"));
        assert!(!crl.remove_revoked_extension(&serial, "id-ce-invalidityDate"));
    }

    #[test]
    fn test_load_auto_detect() {
        let blocks = pem::parse(fixtures::CRL_PEM).unwrap();
        let der = blocks[0].data.clone();
        assert_eq!(
            CertificateList::load(&der).unwrap().tbs_raw,
            CertificateList::load(fixtures::CRL_PEM.as_bytes())
                .unwrap()
                .tbs_raw
        );
    }
}
