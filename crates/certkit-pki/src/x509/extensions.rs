//! Certificate and CRL extensions: typed payload models, the OID-keyed
//! decode/encode registry, and helpers for working with extension lists.
//!
//! Every recognized extension decodes into a typed [`ExtensionValue`]
//! variant. A recognized extension whose payload fails to decode is kept
//! as [`ExtensionValue::Opaque`] and re-encodes verbatim; an unrecognized
//! OID is kept as [`ExtensionValue::Unknown`] and refuses to re-encode.

use certkit_bignum::BigNum;
use certkit_types::X509Error;
use certkit_utils::asn1::{
    decode_string_value, decode_time_value, encode_string_value, encode_time_value, tags, Decoder,
    Encoder, TagClass, TimeKind, Tlv,
};
use certkit_utils::oid::Oid;

use crate::encoding::{
    bytes_to_u32, enc_bit_string, enc_bool, enc_explicit_ctx, enc_ia5, enc_int, enc_octet, enc_oid,
    enc_primitive_ctx, enc_raw_parts, enc_seq, enc_tlv,
};

use super::attributes::Attribute;
use super::name::{parse_name, parse_rdn_content, Name, Rdn};
use super::oids;

// ---------------------------------------------------------------------------
// Named-bit flag types
// ---------------------------------------------------------------------------

/// Key usage flags (RFC 5280 §4.2.1.3).
///
/// BIT STRING bit numbering: bit 0 = MSB of first byte (0x80). The second
/// content byte, when present, lands in the high byte of the `u16`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct KeyUsage(pub u16);

impl KeyUsage {
    pub const DIGITAL_SIGNATURE: u16 = 0x0080;
    pub const NON_REPUDIATION: u16 = 0x0040;
    pub const KEY_ENCIPHERMENT: u16 = 0x0020;
    pub const DATA_ENCIPHERMENT: u16 = 0x0010;
    pub const KEY_AGREEMENT: u16 = 0x0008;
    pub const KEY_CERT_SIGN: u16 = 0x0004;
    pub const CRL_SIGN: u16 = 0x0002;
    pub const ENCIPHER_ONLY: u16 = 0x0001;
    pub const DECIPHER_ONLY: u16 = 0x8000;

    pub fn has(&self, flag: u16) -> bool {
        self.0 & flag == flag
    }
}

/// CRL distribution point reason flags (RFC 5280 §4.2.1.13), packed the
/// same way as [`KeyUsage`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ReasonFlags(pub u16);

impl ReasonFlags {
    pub const UNUSED: u16 = 0x0080;
    pub const KEY_COMPROMISE: u16 = 0x0040;
    pub const CA_COMPROMISE: u16 = 0x0020;
    pub const AFFILIATION_CHANGED: u16 = 0x0010;
    pub const SUPERSEDED: u16 = 0x0008;
    pub const CESSATION_OF_OPERATION: u16 = 0x0004;
    pub const CERTIFICATE_HOLD: u16 = 0x0002;
    pub const PRIVILEGE_WITHDRAWN: u16 = 0x0001;
    pub const AA_COMPROMISE: u16 = 0x8000;

    pub fn has(&self, flag: u16) -> bool {
        self.0 & flag == flag
    }
}

/// Netscape certificate type flags, a single named-bit byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct NetscapeCertType(pub u8);

impl NetscapeCertType {
    pub const SSL_CLIENT: u8 = 0x80;
    pub const SSL_SERVER: u8 = 0x40;
    pub const SMIME: u8 = 0x20;
    pub const OBJECT_SIGNING: u8 = 0x10;
    pub const RESERVED: u8 = 0x08;
    pub const SSL_CA: u8 = 0x04;
    pub const SMIME_CA: u8 = 0x02;
    pub const OBJECT_SIGNING_CA: u8 = 0x01;

    pub fn has(&self, flag: u8) -> bool {
        self.0 & flag == flag
    }
}

/// Unpack up to two named-bit content bytes into a `u16`, masking off the
/// padding bits of the final byte.
fn named_bits_to_u16(unused: u8, bits: &[u8]) -> u16 {
    let mut value = 0u16;
    for (i, &b) in bits.iter().take(2).enumerate() {
        value |= (b as u16) << (8 * i);
    }
    if unused > 0 && unused < 8 && !bits.is_empty() && bits.len() <= 2 {
        let mask = 0xFFu8 << unused;
        if bits.len() == 1 {
            value &= mask as u16;
        } else {
            value &= ((mask as u16) << 8) | 0x00FF;
        }
    }
    value
}

/// Pack a `u16` of named bits into DER content bytes: trailing zero bytes
/// dropped, unused-bit count taken from the final byte.
fn u16_to_named_bits(value: u16) -> (u8, Vec<u8>) {
    let mut bytes = vec![value as u8, (value >> 8) as u8];
    while bytes.last() == Some(&0) {
        bytes.pop();
    }
    let unused = bytes.last().map_or(0, |b| b.trailing_zeros() as u8);
    (unused, bytes)
}

// ---------------------------------------------------------------------------
// GeneralName and name subtrees
// ---------------------------------------------------------------------------

/// A GeneralName CHOICE (RFC 5280 §4.2.1.6). Variants whose inner
/// structure this crate never consumes keep their full DER encoding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GeneralName {
    /// otherName `[0]`, kept as the complete tagged encoding.
    OtherName(Vec<u8>),
    /// rfc822Name `[1]`.
    Rfc822Name(String),
    /// dNSName `[2]`.
    DnsName(String),
    /// x400Address `[3]`, kept as the complete tagged encoding.
    X400Address(Vec<u8>),
    /// directoryName `[4]`.
    DirectoryName(Name),
    /// ediPartyName `[5]`, kept as the complete tagged encoding.
    EdiPartyName(Vec<u8>),
    /// uniformResourceIdentifier `[6]`.
    Uri(String),
    /// iPAddress `[7]`, the raw address octets.
    IpAddress(Vec<u8>),
    /// registeredID `[8]`.
    RegisteredId(Oid),
}

impl GeneralName {
    /// Render an iPAddress as dotted-quad or colon-separated text.
    pub fn ip_string(&self) -> Option<String> {
        match self {
            GeneralName::IpAddress(octets) => match octets.len() {
                4 => {
                    let mut addr = [0u8; 4];
                    addr.copy_from_slice(octets);
                    Some(std::net::Ipv4Addr::from(addr).to_string())
                }
                16 => {
                    let mut addr = [0u8; 16];
                    addr.copy_from_slice(octets);
                    Some(std::net::Ipv6Addr::from(addr).to_string())
                }
                _ => None,
            },
            _ => None,
        }
    }
}

/// A name constraint subtree (RFC 5280 §4.2.1.10).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneralSubtree {
    pub base: GeneralName,
    pub minimum: u32,
    pub maximum: Option<u32>,
}

impl GeneralSubtree {
    /// Split an iPAddress base carrying address-plus-mask octets into its
    /// two halves. Only 8-byte (IPv4) and 32-byte (IPv6) bases qualify.
    pub fn ip_range(&self) -> Option<(&[u8], &[u8])> {
        match &self.base {
            GeneralName::IpAddress(octets) if octets.len() == 8 || octets.len() == 32 => {
                Some(octets.split_at(octets.len() / 2))
            }
            _ => None,
        }
    }
}

/// Name constraints payload (RFC 5280 §4.2.1.10).
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct NameConstraints {
    pub permitted_subtrees: Vec<GeneralSubtree>,
    pub excluded_subtrees: Vec<GeneralSubtree>,
}

// ---------------------------------------------------------------------------
// Distribution points
// ---------------------------------------------------------------------------

/// The DistributionPointName CHOICE (RFC 5280 §4.2.1.13).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DistributionPointName {
    FullName(Vec<GeneralName>),
    NameRelativeToCrlIssuer(Rdn),
}

/// One entry of a CRL distribution points extension.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DistributionPoint {
    pub distribution_point: Option<DistributionPointName>,
    pub reasons: Option<ReasonFlags>,
    pub crl_issuer: Vec<GeneralName>,
}

/// Issuing distribution point CRL extension (RFC 5280 §5.2.5).
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct IssuingDistributionPoint {
    pub distribution_point: Option<DistributionPointName>,
    pub only_contains_user_certs: bool,
    pub only_contains_ca_certs: bool,
    pub only_some_reasons: Option<ReasonFlags>,
    pub indirect_crl: bool,
    pub only_contains_attribute_certs: bool,
}

// ---------------------------------------------------------------------------
// Certificate policies
// ---------------------------------------------------------------------------

/// One policy of a certificate policies extension (RFC 5280 §4.2.1.4).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PolicyInformation {
    pub policy_identifier: Oid,
    pub policy_qualifiers: Vec<PolicyQualifier>,
}

/// A policy qualifier: the qualifier OID plus its decoded value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PolicyQualifier {
    pub policy_qualifier_id: Oid,
    pub qualifier: QualifierValue,
}

/// The value of a policy qualifier. Qualifier OIDs outside the two
/// standard ones keep their full DER encoding and re-encode verbatim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QualifierValue {
    CpsUri(String),
    UserNotice(UserNotice),
    Unknown(Vec<u8>),
}

/// A user notice qualifier (RFC 5280 §4.2.1.4).
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct UserNotice {
    pub notice_ref: Option<NoticeReference>,
    pub explicit_text: Option<DisplayText>,
}

/// The notice reference of a user notice.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoticeReference {
    pub organization: DisplayText,
    pub notice_numbers: Vec<u32>,
}

/// A DisplayText CHOICE, tagged with the string kind it was carried in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DisplayText {
    Ia5(String),
    Visible(String),
    Bmp(String),
    Utf8(String),
}

impl DisplayText {
    pub fn text(&self) -> &str {
        match self {
            DisplayText::Ia5(s)
            | DisplayText::Visible(s)
            | DisplayText::Bmp(s)
            | DisplayText::Utf8(s) => s,
        }
    }
}

/// One mapping of a policy mappings extension (RFC 5280 §4.2.1.5).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PolicyMapping {
    pub issuer_domain_policy: Oid,
    pub subject_domain_policy: Oid,
}

// ---------------------------------------------------------------------------
// Remaining payload types
// ---------------------------------------------------------------------------

/// Basic constraints payload (RFC 5280 §4.2.1.9).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BasicConstraints {
    pub ca: bool,
    pub path_len: Option<u32>,
}

/// Authority key identifier payload (RFC 5280 §4.2.1.1).
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AuthorityKeyIdentifier {
    pub key_identifier: Option<Vec<u8>>,
    pub authority_cert_issuer: Vec<GeneralName>,
    pub authority_cert_serial_number: Option<BigNum>,
}

/// One entry of an authority or subject information access extension
/// (RFC 5280 §4.2.2.1).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessDescription {
    pub access_method: Oid,
    pub access_location: GeneralName,
}

/// Private key usage period payload (RFC 3280 §4.2.1.4).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PrivateKeyUsagePeriod {
    pub not_before: Option<i64>,
    pub not_after: Option<i64>,
}

/// Policy constraints payload (RFC 5280 §4.2.1.11).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PolicyConstraints {
    pub require_explicit_policy: Option<u32>,
    pub inhibit_policy_mapping: Option<u32>,
}

/// CRL entry revocation reason (RFC 5280 §5.3.1).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CrlReason {
    Unspecified,
    KeyCompromise,
    CaCompromise,
    AffiliationChanged,
    Superseded,
    CessationOfOperation,
    CertificateHold,
    RemoveFromCrl,
    PrivilegeWithdrawn,
    AaCompromise,
}

impl CrlReason {
    pub fn code(&self) -> u8 {
        match self {
            CrlReason::Unspecified => 0,
            CrlReason::KeyCompromise => 1,
            CrlReason::CaCompromise => 2,
            CrlReason::AffiliationChanged => 3,
            CrlReason::Superseded => 4,
            CrlReason::CessationOfOperation => 5,
            CrlReason::CertificateHold => 6,
            CrlReason::RemoveFromCrl => 8,
            CrlReason::PrivilegeWithdrawn => 9,
            CrlReason::AaCompromise => 10,
        }
    }

    fn from_code(code: u8) -> Option<CrlReason> {
        let reason = match code {
            0 => CrlReason::Unspecified,
            1 => CrlReason::KeyCompromise,
            2 => CrlReason::CaCompromise,
            3 => CrlReason::AffiliationChanged,
            4 => CrlReason::Superseded,
            5 => CrlReason::CessationOfOperation,
            6 => CrlReason::CertificateHold,
            8 => CrlReason::RemoveFromCrl,
            9 => CrlReason::PrivilegeWithdrawn,
            10 => CrlReason::AaCompromise,
            _ => return None,
        };
        Some(reason)
    }
}

// ---------------------------------------------------------------------------
// Extension registry
// ---------------------------------------------------------------------------

/// One extension of a certificate, CSR extension request, or CRL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Extension {
    pub oid: Oid,
    pub critical: bool,
    pub value: ExtensionValue,
}

/// A decoded extension payload, keyed by the extension OID.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExtensionValue {
    KeyUsage(KeyUsage),
    BasicConstraints(BasicConstraints),
    SubjectKeyIdentifier(Vec<u8>),
    CrlDistributionPoints(Vec<DistributionPoint>),
    AuthorityKeyIdentifier(AuthorityKeyIdentifier),
    CertificatePolicies(Vec<PolicyInformation>),
    PolicyMappings(Vec<PolicyMapping>),
    ExtendedKeyUsage(Vec<Oid>),
    AuthorityInfoAccess(Vec<AccessDescription>),
    SubjectInfoAccess(Vec<AccessDescription>),
    SubjectAltName(Vec<GeneralName>),
    IssuerAltName(Vec<GeneralName>),
    PrivateKeyUsagePeriod(PrivateKeyUsagePeriod),
    PolicyConstraints(PolicyConstraints),
    InhibitAnyPolicy(u32),
    NameConstraints(NameConstraints),
    SubjectDirectoryAttributes(Vec<Attribute>),
    NetscapeCertType(NetscapeCertType),
    NetscapeComment(String),
    NetscapeCaPolicyUrl(String),
    UserNotice(UserNotice),
    CrlNumber(BigNum),
    DeltaCrlIndicator(BigNum),
    IssuingDistributionPoint(IssuingDistributionPoint),
    FreshestCrl(Vec<DistributionPoint>),
    CrlReason(CrlReason),
    InvalidityDate(i64),
    CertificateIssuer(Vec<GeneralName>),
    HoldInstructionCode(Oid),
    /// A recognized extension whose payload is carried as raw DER, either
    /// because no structured decode exists for it or because its decode
    /// failed. Re-encodes verbatim.
    Opaque(Vec<u8>),
    /// An extension with an unrecognized OID. Refuses to re-encode.
    Unknown(Vec<u8>),
}

impl ExtensionValue {
    /// Decode an extension payload by OID. Never fails: a recognized OID
    /// whose payload will not parse comes back as `Opaque`, an
    /// unrecognized OID as `Unknown`.
    pub fn decode(oid: &Oid, data: &[u8]) -> ExtensionValue {
        match Self::try_decode(oid, data) {
            Ok(Some(value)) => value,
            Ok(None) => ExtensionValue::Unknown(data.to_vec()),
            Err(_) => ExtensionValue::Opaque(data.to_vec()),
        }
    }

    fn try_decode(oid: &Oid, data: &[u8]) -> Result<Option<ExtensionValue>, X509Error> {
        let value = match oid.arcs() {
            [2, 5, 29, 15] => ExtensionValue::KeyUsage(parse_key_usage(data)?),
            [2, 5, 29, 19] => ExtensionValue::BasicConstraints(parse_basic_constraints(data)?),
            [2, 5, 29, 14] => {
                let mut dec = Decoder::new(data);
                let ski = dec
                    .read_octet_string()
                    .map_err(|e| X509Error::Asn1Error(e.to_string()))?;
                ExtensionValue::SubjectKeyIdentifier(ski.to_vec())
            }
            [2, 5, 29, 31] => {
                ExtensionValue::CrlDistributionPoints(parse_distribution_points(data)?)
            }
            [2, 5, 29, 35] => {
                ExtensionValue::AuthorityKeyIdentifier(parse_authority_key_identifier(data)?)
            }
            [2, 5, 29, 32] => {
                ExtensionValue::CertificatePolicies(parse_certificate_policies(data)?)
            }
            [2, 5, 29, 33] => ExtensionValue::PolicyMappings(parse_policy_mappings(data)?),
            [2, 5, 29, 37] => ExtensionValue::ExtendedKeyUsage(parse_extended_key_usage(data)?),
            [1, 3, 6, 1, 5, 5, 7, 1, 1] => {
                ExtensionValue::AuthorityInfoAccess(parse_access_descriptions(data)?)
            }
            [1, 3, 6, 1, 5, 5, 7, 1, 11] => {
                ExtensionValue::SubjectInfoAccess(parse_access_descriptions(data)?)
            }
            [2, 5, 29, 17] => ExtensionValue::SubjectAltName(parse_general_names(data)?),
            [2, 5, 29, 18] => ExtensionValue::IssuerAltName(parse_general_names(data)?),
            [2, 5, 29, 16] => {
                ExtensionValue::PrivateKeyUsagePeriod(parse_private_key_usage_period(data)?)
            }
            [2, 5, 29, 36] => ExtensionValue::PolicyConstraints(parse_policy_constraints(data)?),
            [2, 5, 29, 54] => {
                let mut dec = Decoder::new(data);
                let skip = dec
                    .read_integer()
                    .map_err(|e| X509Error::Asn1Error(e.to_string()))?;
                ExtensionValue::InhibitAnyPolicy(bytes_to_u32(skip))
            }
            [2, 5, 29, 30] => ExtensionValue::NameConstraints(parse_name_constraints(data)?),
            [2, 5, 29, 9] => {
                ExtensionValue::SubjectDirectoryAttributes(parse_attribute_sequence(data)?)
            }
            [2, 16, 840, 1, 113730, 1, 1] => {
                ExtensionValue::NetscapeCertType(parse_netscape_cert_type(data)?)
            }
            [2, 16, 840, 1, 113730, 1, 13] => {
                let mut dec = Decoder::new(data);
                let comment = dec
                    .read_string()
                    .map_err(|e| X509Error::Asn1Error(e.to_string()))?;
                ExtensionValue::NetscapeComment(comment)
            }
            [2, 16, 840, 1, 113730, 1, 8] => {
                let mut dec = Decoder::new(data);
                let url = dec
                    .read_string()
                    .map_err(|e| X509Error::Asn1Error(e.to_string()))?;
                ExtensionValue::NetscapeCaPolicyUrl(url)
            }
            [1, 3, 6, 1, 5, 5, 7, 2, 2] => ExtensionValue::UserNotice(parse_user_notice(data)?),
            [2, 5, 29, 20] => {
                let mut dec = Decoder::new(data);
                let n = dec
                    .read_integer()
                    .map_err(|e| X509Error::Asn1Error(e.to_string()))?;
                ExtensionValue::CrlNumber(BigNum::from_bytes_be(n))
            }
            [2, 5, 29, 27] => {
                let mut dec = Decoder::new(data);
                let n = dec
                    .read_integer()
                    .map_err(|e| X509Error::Asn1Error(e.to_string()))?;
                ExtensionValue::DeltaCrlIndicator(BigNum::from_bytes_be(n))
            }
            [2, 5, 29, 28] => {
                ExtensionValue::IssuingDistributionPoint(parse_issuing_distribution_point(data)?)
            }
            [2, 5, 29, 46] => ExtensionValue::FreshestCrl(parse_distribution_points(data)?),
            [2, 5, 29, 21] => {
                let mut dec = Decoder::new(data);
                let code = dec
                    .read_enumerated()
                    .map_err(|e| X509Error::Asn1Error(e.to_string()))?;
                let reason = code
                    .first()
                    .copied()
                    .and_then(CrlReason::from_code)
                    .ok_or_else(|| X509Error::Asn1Error("unknown CRL reason code".into()))?;
                ExtensionValue::CrlReason(reason)
            }
            [2, 5, 29, 24] => {
                let mut dec = Decoder::new(data);
                let (_, timestamp) = dec
                    .read_time()
                    .map_err(|e| X509Error::Asn1Error(e.to_string()))?;
                ExtensionValue::InvalidityDate(timestamp)
            }
            [2, 5, 29, 29] => ExtensionValue::CertificateIssuer(parse_general_names(data)?),
            [2, 5, 29, 23] => {
                let mut dec = Decoder::new(data);
                let oid_bytes = dec
                    .read_oid()
                    .map_err(|e| X509Error::Asn1Error(e.to_string()))?;
                let code = Oid::from_der_value(oid_bytes)
                    .map_err(|e| X509Error::Asn1Error(e.to_string()))?;
                ExtensionValue::HoldInstructionCode(code)
            }
            // Recognized identifiers whose payloads stay raw.
            [1, 3, 6, 1, 5, 5, 7, 1, 12]
            | [1, 2, 840, 113533, 7, 65, 0]
            | [1, 3, 6, 1, 4, 1, 311, 20, 2]
            | [1, 3, 6, 1, 4, 1, 311, 21, 1]
            | [2, 23, 42, 7, 0]
            | [1, 3, 6, 1, 5, 5, 7, 2, 1] => ExtensionValue::Opaque(data.to_vec()),
            _ => return Ok(None),
        };
        Ok(Some(value))
    }

    /// Encode the payload back to its extnValue DER. `Unknown` payloads
    /// cannot be reproduced and report the offending extension.
    pub fn encode(&self, oid: &Oid) -> Result<Vec<u8>, X509Error> {
        let der = match self {
            ExtensionValue::KeyUsage(ku) => {
                let (unused, bytes) = u16_to_named_bits(ku.0);
                enc_bit_string(unused, &bytes)
            }
            ExtensionValue::BasicConstraints(bc) => encode_basic_constraints(bc),
            ExtensionValue::SubjectKeyIdentifier(ski) => enc_octet(ski),
            ExtensionValue::CrlDistributionPoints(dps) => encode_distribution_points(dps),
            ExtensionValue::AuthorityKeyIdentifier(aki) => encode_authority_key_identifier(aki),
            ExtensionValue::CertificatePolicies(policies) => encode_certificate_policies(policies),
            ExtensionValue::PolicyMappings(mappings) => encode_policy_mappings(mappings),
            ExtensionValue::ExtendedKeyUsage(purposes) => {
                let mut body = Vec::new();
                for purpose in purposes {
                    body.extend_from_slice(&enc_oid(&purpose.to_der_value()));
                }
                enc_seq(&body)
            }
            ExtensionValue::AuthorityInfoAccess(descs)
            | ExtensionValue::SubjectInfoAccess(descs) => encode_access_descriptions(descs),
            ExtensionValue::SubjectAltName(names)
            | ExtensionValue::IssuerAltName(names)
            | ExtensionValue::CertificateIssuer(names) => {
                enc_seq(&encode_general_names_content(names))
            }
            ExtensionValue::PrivateKeyUsagePeriod(period) => {
                encode_private_key_usage_period(period)
            }
            ExtensionValue::PolicyConstraints(pc) => encode_policy_constraints(pc),
            ExtensionValue::InhibitAnyPolicy(skip) => enc_int(&u32_to_be(*skip)),
            ExtensionValue::NameConstraints(nc) => encode_name_constraints(nc),
            ExtensionValue::SubjectDirectoryAttributes(attrs) => {
                let mut body = Vec::new();
                for attr in attrs {
                    body.extend_from_slice(&attr.to_der()?);
                }
                enc_seq(&body)
            }
            ExtensionValue::NetscapeCertType(nct) => {
                if nct.0 == 0 {
                    enc_bit_string(0, &[])
                } else {
                    enc_bit_string(nct.0.trailing_zeros() as u8, &[nct.0])
                }
            }
            ExtensionValue::NetscapeComment(comment) => enc_ia5(comment),
            ExtensionValue::NetscapeCaPolicyUrl(url) => enc_ia5(url),
            ExtensionValue::UserNotice(notice) => encode_user_notice(notice),
            ExtensionValue::CrlNumber(n) | ExtensionValue::DeltaCrlIndicator(n) => {
                enc_int(&n.to_bytes_be())
            }
            ExtensionValue::IssuingDistributionPoint(idp) => {
                encode_issuing_distribution_point(idp)
            }
            ExtensionValue::FreshestCrl(dps) => encode_distribution_points(dps),
            ExtensionValue::CrlReason(reason) => {
                let mut e = Encoder::new();
                e.write_enumerated(reason.code());
                e.finish()
            }
            ExtensionValue::InvalidityDate(timestamp) => {
                let mut e = Encoder::new();
                e.write_generalized_time(*timestamp);
                e.finish()
            }
            ExtensionValue::HoldInstructionCode(code) => enc_oid(&code.to_der_value()),
            ExtensionValue::Opaque(raw) => raw.clone(),
            ExtensionValue::Unknown(_) => {
                return Err(X509Error::UnsupportedExtension(oids::describe_oid(oid)))
            }
        };
        Ok(der)
    }
}

// ---------------------------------------------------------------------------
// Payload parsers
// ---------------------------------------------------------------------------

fn parse_key_usage(data: &[u8]) -> Result<KeyUsage, X509Error> {
    let mut dec = Decoder::new(data);
    let (unused, bits) = dec
        .read_bit_string()
        .map_err(|e| X509Error::Asn1Error(e.to_string()))?;
    Ok(KeyUsage(named_bits_to_u16(unused, bits)))
}

fn parse_basic_constraints(data: &[u8]) -> Result<BasicConstraints, X509Error> {
    let mut dec = Decoder::new(data);
    let mut seq = dec
        .read_sequence()
        .map_err(|e| X509Error::Asn1Error(e.to_string()))?;
    let mut bc = BasicConstraints::default();
    if !seq.is_empty() {
        let tag = seq
            .peek_tag()
            .map_err(|e| X509Error::Asn1Error(e.to_string()))?;
        if tag.class == TagClass::Universal && tag.number == 0x01 {
            bc.ca = seq
                .read_boolean()
                .map_err(|e| X509Error::Asn1Error(e.to_string()))?;
        }
    }
    if !seq.is_empty() {
        let depth = seq
            .read_integer()
            .map_err(|e| X509Error::Asn1Error(e.to_string()))?;
        bc.path_len = Some(bytes_to_u32(depth));
    }
    Ok(bc)
}

pub(crate) fn parse_general_name(tlv: &Tlv<'_>) -> Result<GeneralName, X509Error> {
    if tlv.tag.class != TagClass::ContextSpecific {
        return Err(X509Error::Asn1Error(
            "generalName requires a context-specific tag".into(),
        ));
    }
    let name = match tlv.tag.number {
        0 => GeneralName::OtherName(tlv.to_der()),
        1 => GeneralName::Rfc822Name(String::from_utf8_lossy(tlv.value).into_owned()),
        2 => GeneralName::DnsName(String::from_utf8_lossy(tlv.value).into_owned()),
        3 => GeneralName::X400Address(tlv.to_der()),
        4 => {
            let mut inner = Decoder::new(tlv.value);
            GeneralName::DirectoryName(parse_name(&mut inner)?)
        }
        5 => GeneralName::EdiPartyName(tlv.to_der()),
        6 => GeneralName::Uri(String::from_utf8_lossy(tlv.value).into_owned()),
        7 => GeneralName::IpAddress(tlv.value.to_vec()),
        8 => GeneralName::RegisteredId(
            Oid::from_der_value(tlv.value).map_err(|e| X509Error::Asn1Error(e.to_string()))?,
        ),
        n => {
            return Err(X509Error::Asn1Error(format!(
                "generalName tag [{n}] out of range"
            )))
        }
    };
    Ok(name)
}

/// Parse a run of GeneralName TLVs with no enclosing SEQUENCE, as found
/// under implicitly tagged GeneralNames fields.
pub(crate) fn parse_general_names_content(
    dec: &mut Decoder<'_>,
) -> Result<Vec<GeneralName>, X509Error> {
    let mut names = Vec::new();
    while !dec.is_empty() {
        let tlv = dec
            .read_tlv()
            .map_err(|e| X509Error::Asn1Error(e.to_string()))?;
        names.push(parse_general_name(&tlv)?);
    }
    Ok(names)
}

pub(crate) fn parse_general_names(data: &[u8]) -> Result<Vec<GeneralName>, X509Error> {
    let mut dec = Decoder::new(data);
    let mut seq = dec
        .read_sequence()
        .map_err(|e| X509Error::Asn1Error(e.to_string()))?;
    parse_general_names_content(&mut seq)
}

fn parse_authority_key_identifier(data: &[u8]) -> Result<AuthorityKeyIdentifier, X509Error> {
    let mut dec = Decoder::new(data);
    let mut seq = dec
        .read_sequence()
        .map_err(|e| X509Error::Asn1Error(e.to_string()))?;
    let mut aki = AuthorityKeyIdentifier::default();
    if let Some(tlv) = seq
        .try_read_context_specific(0, false)
        .map_err(|e| X509Error::Asn1Error(e.to_string()))?
    {
        aki.key_identifier = Some(tlv.value.to_vec());
    }
    if let Some(tlv) = seq
        .try_read_context_specific(1, true)
        .map_err(|e| X509Error::Asn1Error(e.to_string()))?
    {
        let mut names = Decoder::new(tlv.value);
        aki.authority_cert_issuer = parse_general_names_content(&mut names)?;
    }
    if let Some(tlv) = seq
        .try_read_context_specific(2, false)
        .map_err(|e| X509Error::Asn1Error(e.to_string()))?
    {
        aki.authority_cert_serial_number = Some(BigNum::from_bytes_be(tlv.value));
    }
    Ok(aki)
}

fn parse_extended_key_usage(data: &[u8]) -> Result<Vec<Oid>, X509Error> {
    let mut dec = Decoder::new(data);
    let mut seq = dec
        .read_sequence()
        .map_err(|e| X509Error::Asn1Error(e.to_string()))?;
    let mut purposes = Vec::new();
    while !seq.is_empty() {
        let oid_bytes = seq
            .read_oid()
            .map_err(|e| X509Error::Asn1Error(e.to_string()))?;
        purposes.push(
            Oid::from_der_value(oid_bytes).map_err(|e| X509Error::Asn1Error(e.to_string()))?,
        );
    }
    Ok(purposes)
}

fn parse_access_descriptions(data: &[u8]) -> Result<Vec<AccessDescription>, X509Error> {
    let mut dec = Decoder::new(data);
    let mut seq = dec
        .read_sequence()
        .map_err(|e| X509Error::Asn1Error(e.to_string()))?;
    let mut descs = Vec::new();
    while !seq.is_empty() {
        let mut entry = seq
            .read_sequence()
            .map_err(|e| X509Error::Asn1Error(e.to_string()))?;
        let method_bytes = entry
            .read_oid()
            .map_err(|e| X509Error::Asn1Error(e.to_string()))?;
        let access_method =
            Oid::from_der_value(method_bytes).map_err(|e| X509Error::Asn1Error(e.to_string()))?;
        let location_tlv = entry
            .read_tlv()
            .map_err(|e| X509Error::Asn1Error(e.to_string()))?;
        descs.push(AccessDescription {
            access_method,
            access_location: parse_general_name(&location_tlv)?,
        });
    }
    Ok(descs)
}

fn parse_private_key_usage_period(data: &[u8]) -> Result<PrivateKeyUsagePeriod, X509Error> {
    let mut dec = Decoder::new(data);
    let mut seq = dec
        .read_sequence()
        .map_err(|e| X509Error::Asn1Error(e.to_string()))?;
    let mut period = PrivateKeyUsagePeriod::default();
    if let Some(tlv) = seq
        .try_read_context_specific(0, false)
        .map_err(|e| X509Error::Asn1Error(e.to_string()))?
    {
        let (_, timestamp) = decode_time_value(tags::GENERALIZED_TIME as u32, tlv.value)
            .map_err(|e| X509Error::Asn1Error(e.to_string()))?;
        period.not_before = Some(timestamp);
    }
    if let Some(tlv) = seq
        .try_read_context_specific(1, false)
        .map_err(|e| X509Error::Asn1Error(e.to_string()))?
    {
        let (_, timestamp) = decode_time_value(tags::GENERALIZED_TIME as u32, tlv.value)
            .map_err(|e| X509Error::Asn1Error(e.to_string()))?;
        period.not_after = Some(timestamp);
    }
    Ok(period)
}

fn parse_policy_constraints(data: &[u8]) -> Result<PolicyConstraints, X509Error> {
    let mut dec = Decoder::new(data);
    let mut seq = dec
        .read_sequence()
        .map_err(|e| X509Error::Asn1Error(e.to_string()))?;
    let mut pc = PolicyConstraints::default();
    if let Some(tlv) = seq
        .try_read_context_specific(0, false)
        .map_err(|e| X509Error::Asn1Error(e.to_string()))?
    {
        pc.require_explicit_policy = Some(bytes_to_u32(tlv.value));
    }
    if let Some(tlv) = seq
        .try_read_context_specific(1, false)
        .map_err(|e| X509Error::Asn1Error(e.to_string()))?
    {
        pc.inhibit_policy_mapping = Some(bytes_to_u32(tlv.value));
    }
    Ok(pc)
}

fn parse_name_constraints(data: &[u8]) -> Result<NameConstraints, X509Error> {
    let mut dec = Decoder::new(data);
    let mut seq = dec
        .read_sequence()
        .map_err(|e| X509Error::Asn1Error(e.to_string()))?;
    let mut nc = NameConstraints::default();
    if let Some(tlv) = seq
        .try_read_context_specific(0, true)
        .map_err(|e| X509Error::Asn1Error(e.to_string()))?
    {
        nc.permitted_subtrees = parse_general_subtrees(tlv.value)?;
    }
    if let Some(tlv) = seq
        .try_read_context_specific(1, true)
        .map_err(|e| X509Error::Asn1Error(e.to_string()))?
    {
        nc.excluded_subtrees = parse_general_subtrees(tlv.value)?;
    }
    Ok(nc)
}

fn parse_general_subtrees(data: &[u8]) -> Result<Vec<GeneralSubtree>, X509Error> {
    let mut dec = Decoder::new(data);
    let mut subtrees = Vec::new();
    while !dec.is_empty() {
        let mut seq = dec
            .read_sequence()
            .map_err(|e| X509Error::Asn1Error(e.to_string()))?;
        let base_tlv = seq
            .read_tlv()
            .map_err(|e| X509Error::Asn1Error(e.to_string()))?;
        let mut subtree = GeneralSubtree {
            base: parse_general_name(&base_tlv)?,
            minimum: 0,
            maximum: None,
        };
        if let Some(tlv) = seq
            .try_read_context_specific(0, false)
            .map_err(|e| X509Error::Asn1Error(e.to_string()))?
        {
            subtree.minimum = bytes_to_u32(tlv.value);
        }
        if let Some(tlv) = seq
            .try_read_context_specific(1, false)
            .map_err(|e| X509Error::Asn1Error(e.to_string()))?
        {
            subtree.maximum = Some(bytes_to_u32(tlv.value));
        }
        subtrees.push(subtree);
    }
    Ok(subtrees)
}

fn parse_attribute_sequence(data: &[u8]) -> Result<Vec<Attribute>, X509Error> {
    let mut dec = Decoder::new(data);
    let mut seq = dec
        .read_sequence()
        .map_err(|e| X509Error::Asn1Error(e.to_string()))?;
    let mut attrs = Vec::new();
    while !seq.is_empty() {
        attrs.push(Attribute::from_decoder(&mut seq)?);
    }
    Ok(attrs)
}

fn parse_netscape_cert_type(data: &[u8]) -> Result<NetscapeCertType, X509Error> {
    let mut dec = Decoder::new(data);
    let (unused, bits) = dec
        .read_bit_string()
        .map_err(|e| X509Error::Asn1Error(e.to_string()))?;
    let mut value = bits.first().copied().unwrap_or(0);
    if unused > 0 && unused < 8 && bits.len() == 1 {
        value &= 0xFFu8 << unused;
    }
    Ok(NetscapeCertType(value))
}

fn parse_distribution_point_name(tlv: &Tlv<'_>) -> Result<DistributionPointName, X509Error> {
    if tlv.tag.class != TagClass::ContextSpecific || !tlv.tag.constructed {
        return Err(X509Error::Asn1Error(
            "distributionPointName requires a constructed context tag".into(),
        ));
    }
    match tlv.tag.number {
        0 => {
            let mut names = Decoder::new(tlv.value);
            Ok(DistributionPointName::FullName(
                parse_general_names_content(&mut names)?,
            ))
        }
        1 => Ok(DistributionPointName::NameRelativeToCrlIssuer(
            parse_rdn_content(tlv.value)?,
        )),
        n => Err(X509Error::Asn1Error(format!(
            "distributionPointName tag [{n}] out of range"
        ))),
    }
}

fn parse_reason_flags_content(content: &[u8]) -> ReasonFlags {
    match content.split_first() {
        Some((&unused, bits)) => ReasonFlags(named_bits_to_u16(unused, bits)),
        None => ReasonFlags(0),
    }
}

fn parse_distribution_point(seq: &mut Decoder<'_>) -> Result<DistributionPoint, X509Error> {
    let mut dp = DistributionPoint::default();
    if let Some(tlv) = seq
        .try_read_context_specific(0, true)
        .map_err(|e| X509Error::Asn1Error(e.to_string()))?
    {
        let mut inner = Decoder::new(tlv.value);
        let choice = inner
            .read_tlv()
            .map_err(|e| X509Error::Asn1Error(e.to_string()))?;
        dp.distribution_point = Some(parse_distribution_point_name(&choice)?);
    }
    if let Some(tlv) = seq
        .try_read_context_specific(1, false)
        .map_err(|e| X509Error::Asn1Error(e.to_string()))?
    {
        dp.reasons = Some(parse_reason_flags_content(tlv.value));
    }
    if let Some(tlv) = seq
        .try_read_context_specific(2, true)
        .map_err(|e| X509Error::Asn1Error(e.to_string()))?
    {
        let mut names = Decoder::new(tlv.value);
        dp.crl_issuer = parse_general_names_content(&mut names)?;
    }
    Ok(dp)
}

fn parse_distribution_points(data: &[u8]) -> Result<Vec<DistributionPoint>, X509Error> {
    let mut dec = Decoder::new(data);
    let mut seq = dec
        .read_sequence()
        .map_err(|e| X509Error::Asn1Error(e.to_string()))?;
    let mut points = Vec::new();
    while !seq.is_empty() {
        let mut entry = seq
            .read_sequence()
            .map_err(|e| X509Error::Asn1Error(e.to_string()))?;
        points.push(parse_distribution_point(&mut entry)?);
    }
    Ok(points)
}

fn parse_issuing_distribution_point(data: &[u8]) -> Result<IssuingDistributionPoint, X509Error> {
    let mut dec = Decoder::new(data);
    let mut seq = dec
        .read_sequence()
        .map_err(|e| X509Error::Asn1Error(e.to_string()))?;
    let mut idp = IssuingDistributionPoint::default();
    if let Some(tlv) = seq
        .try_read_context_specific(0, true)
        .map_err(|e| X509Error::Asn1Error(e.to_string()))?
    {
        let mut inner = Decoder::new(tlv.value);
        let choice = inner
            .read_tlv()
            .map_err(|e| X509Error::Asn1Error(e.to_string()))?;
        idp.distribution_point = Some(parse_distribution_point_name(&choice)?);
    }
    if let Some(tlv) = seq
        .try_read_context_specific(1, false)
        .map_err(|e| X509Error::Asn1Error(e.to_string()))?
    {
        idp.only_contains_user_certs = tlv.value.first().map_or(false, |&b| b != 0);
    }
    if let Some(tlv) = seq
        .try_read_context_specific(2, false)
        .map_err(|e| X509Error::Asn1Error(e.to_string()))?
    {
        idp.only_contains_ca_certs = tlv.value.first().map_or(false, |&b| b != 0);
    }
    if let Some(tlv) = seq
        .try_read_context_specific(3, false)
        .map_err(|e| X509Error::Asn1Error(e.to_string()))?
    {
        idp.only_some_reasons = Some(parse_reason_flags_content(tlv.value));
    }
    if let Some(tlv) = seq
        .try_read_context_specific(4, false)
        .map_err(|e| X509Error::Asn1Error(e.to_string()))?
    {
        idp.indirect_crl = tlv.value.first().map_or(false, |&b| b != 0);
    }
    if let Some(tlv) = seq
        .try_read_context_specific(5, false)
        .map_err(|e| X509Error::Asn1Error(e.to_string()))?
    {
        idp.only_contains_attribute_certs = tlv.value.first().map_or(false, |&b| b != 0);
    }
    Ok(idp)
}

fn parse_display_text(tlv: &Tlv<'_>) -> Result<DisplayText, X509Error> {
    let text = decode_string_value(tlv.tag.number, tlv.value)
        .map_err(|e| X509Error::Asn1Error(e.to_string()))?;
    let value = match tlv.tag.number as u8 {
        tags::IA5_STRING => DisplayText::Ia5(text),
        tags::VISIBLE_STRING => DisplayText::Visible(text),
        tags::BMP_STRING => DisplayText::Bmp(text),
        tags::UTF8_STRING => DisplayText::Utf8(text),
        _ => {
            return Err(X509Error::Asn1Error(
                "displayText carried in an unexpected string type".into(),
            ))
        }
    };
    Ok(value)
}

fn parse_user_notice_content(seq: &mut Decoder<'_>) -> Result<UserNotice, X509Error> {
    let mut notice = UserNotice::default();
    if !seq.is_empty() {
        let tag = seq
            .peek_tag()
            .map_err(|e| X509Error::Asn1Error(e.to_string()))?;
        if tag.class == TagClass::Universal && tag.number == 0x10 {
            let mut nr = seq
                .read_sequence()
                .map_err(|e| X509Error::Asn1Error(e.to_string()))?;
            let org_tlv = nr
                .read_tlv()
                .map_err(|e| X509Error::Asn1Error(e.to_string()))?;
            let organization = parse_display_text(&org_tlv)?;
            let mut numbers = nr
                .read_sequence()
                .map_err(|e| X509Error::Asn1Error(e.to_string()))?;
            let mut notice_numbers = Vec::new();
            while !numbers.is_empty() {
                let n = numbers
                    .read_integer()
                    .map_err(|e| X509Error::Asn1Error(e.to_string()))?;
                notice_numbers.push(bytes_to_u32(n));
            }
            notice.notice_ref = Some(NoticeReference {
                organization,
                notice_numbers,
            });
        }
    }
    if !seq.is_empty() {
        let tlv = seq
            .read_tlv()
            .map_err(|e| X509Error::Asn1Error(e.to_string()))?;
        notice.explicit_text = Some(parse_display_text(&tlv)?);
    }
    Ok(notice)
}

fn parse_user_notice(data: &[u8]) -> Result<UserNotice, X509Error> {
    let mut dec = Decoder::new(data);
    let mut seq = dec
        .read_sequence()
        .map_err(|e| X509Error::Asn1Error(e.to_string()))?;
    parse_user_notice_content(&mut seq)
}

fn parse_policy_qualifier(seq: &mut Decoder<'_>) -> Result<PolicyQualifier, X509Error> {
    let id_bytes = seq
        .read_oid()
        .map_err(|e| X509Error::Asn1Error(e.to_string()))?;
    let policy_qualifier_id =
        Oid::from_der_value(id_bytes).map_err(|e| X509Error::Asn1Error(e.to_string()))?;
    let tlv = seq
        .read_tlv()
        .map_err(|e| X509Error::Asn1Error(e.to_string()))?;
    let qualifier = match policy_qualifier_id.arcs() {
        [1, 3, 6, 1, 5, 5, 7, 2, 1] => QualifierValue::CpsUri(
            decode_string_value(tlv.tag.number, tlv.value)
                .map_err(|e| X509Error::Asn1Error(e.to_string()))?,
        ),
        [1, 3, 6, 1, 5, 5, 7, 2, 2] => {
            if tlv.tag.class != TagClass::Universal || tlv.tag.number != 0x10 {
                return Err(X509Error::Asn1Error(
                    "userNotice qualifier must be a SEQUENCE".into(),
                ));
            }
            let mut inner = Decoder::new(tlv.value);
            QualifierValue::UserNotice(parse_user_notice_content(&mut inner)?)
        }
        _ => QualifierValue::Unknown(tlv.to_der()),
    };
    Ok(PolicyQualifier {
        policy_qualifier_id,
        qualifier,
    })
}

fn parse_certificate_policies(data: &[u8]) -> Result<Vec<PolicyInformation>, X509Error> {
    let mut dec = Decoder::new(data);
    let mut seq = dec
        .read_sequence()
        .map_err(|e| X509Error::Asn1Error(e.to_string()))?;
    let mut policies = Vec::new();
    while !seq.is_empty() {
        let mut entry = seq
            .read_sequence()
            .map_err(|e| X509Error::Asn1Error(e.to_string()))?;
        let id_bytes = entry
            .read_oid()
            .map_err(|e| X509Error::Asn1Error(e.to_string()))?;
        let policy_identifier =
            Oid::from_der_value(id_bytes).map_err(|e| X509Error::Asn1Error(e.to_string()))?;
        let mut policy_qualifiers = Vec::new();
        if !entry.is_empty() {
            let mut qualifiers = entry
                .read_sequence()
                .map_err(|e| X509Error::Asn1Error(e.to_string()))?;
            while !qualifiers.is_empty() {
                let mut qualifier = qualifiers
                    .read_sequence()
                    .map_err(|e| X509Error::Asn1Error(e.to_string()))?;
                policy_qualifiers.push(parse_policy_qualifier(&mut qualifier)?);
            }
        }
        policies.push(PolicyInformation {
            policy_identifier,
            policy_qualifiers,
        });
    }
    Ok(policies)
}

fn parse_policy_mappings(data: &[u8]) -> Result<Vec<PolicyMapping>, X509Error> {
    let mut dec = Decoder::new(data);
    let mut seq = dec
        .read_sequence()
        .map_err(|e| X509Error::Asn1Error(e.to_string()))?;
    let mut mappings = Vec::new();
    while !seq.is_empty() {
        let mut entry = seq
            .read_sequence()
            .map_err(|e| X509Error::Asn1Error(e.to_string()))?;
        let issuer_bytes = entry
            .read_oid()
            .map_err(|e| X509Error::Asn1Error(e.to_string()))?;
        let subject_bytes = entry
            .read_oid()
            .map_err(|e| X509Error::Asn1Error(e.to_string()))?;
        mappings.push(PolicyMapping {
            issuer_domain_policy: Oid::from_der_value(issuer_bytes)
                .map_err(|e| X509Error::Asn1Error(e.to_string()))?,
            subject_domain_policy: Oid::from_der_value(subject_bytes)
                .map_err(|e| X509Error::Asn1Error(e.to_string()))?,
        });
    }
    Ok(mappings)
}

// ---------------------------------------------------------------------------
// Payload encoders
// ---------------------------------------------------------------------------

/// Minimal big-endian bytes of a `u32`, zero encoding as a single byte.
fn u32_to_be(n: u32) -> Vec<u8> {
    let bytes = n.to_be_bytes();
    let skip = bytes.iter().take_while(|&&b| b == 0).count().min(3);
    bytes[skip..].to_vec()
}

/// INTEGER content bytes for a `u32` in an implicitly tagged context,
/// where the sign padding must be applied by hand.
fn int_content_u32(n: u32) -> Vec<u8> {
    let mut bytes = u32_to_be(n);
    if bytes[0] & 0x80 != 0 {
        bytes.insert(0, 0);
    }
    bytes
}

/// INTEGER content bytes for a non-negative bignum in an implicitly
/// tagged context.
fn int_content_bignum(n: &BigNum) -> Vec<u8> {
    let mut bytes = n.to_bytes_be();
    if bytes[0] & 0x80 != 0 {
        bytes.insert(0, 0);
    }
    bytes
}

/// BIT STRING content bytes (unused-count octet plus data) for a `u16`
/// of named bits in an implicitly tagged context.
fn reason_flags_content(flags: ReasonFlags) -> Vec<u8> {
    let (unused, bytes) = u16_to_named_bits(flags.0);
    let mut content = vec![unused];
    content.extend_from_slice(&bytes);
    content
}

fn encode_basic_constraints(bc: &BasicConstraints) -> Vec<u8> {
    let mut body = Vec::new();
    if bc.ca {
        body.extend_from_slice(&enc_bool(true));
    }
    if let Some(depth) = bc.path_len {
        body.extend_from_slice(&enc_int(&u32_to_be(depth)));
    }
    enc_seq(&body)
}

pub(crate) fn encode_general_name(name: &GeneralName) -> Vec<u8> {
    match name {
        GeneralName::OtherName(raw)
        | GeneralName::X400Address(raw)
        | GeneralName::EdiPartyName(raw) => raw.clone(),
        GeneralName::Rfc822Name(s) => enc_primitive_ctx(1, s.as_bytes()),
        GeneralName::DnsName(s) => enc_primitive_ctx(2, s.as_bytes()),
        GeneralName::DirectoryName(name) => enc_explicit_ctx(4, &name.to_der()),
        GeneralName::Uri(s) => enc_primitive_ctx(6, s.as_bytes()),
        GeneralName::IpAddress(octets) => enc_primitive_ctx(7, octets),
        GeneralName::RegisteredId(oid) => enc_primitive_ctx(8, &oid.to_der_value()),
    }
}

pub(crate) fn encode_general_names_content(names: &[GeneralName]) -> Vec<u8> {
    let mut body = Vec::new();
    for name in names {
        body.extend_from_slice(&encode_general_name(name));
    }
    body
}

fn encode_authority_key_identifier(aki: &AuthorityKeyIdentifier) -> Vec<u8> {
    let mut body = Vec::new();
    if let Some(kid) = &aki.key_identifier {
        body.extend_from_slice(&enc_primitive_ctx(0, kid));
    }
    if !aki.authority_cert_issuer.is_empty() {
        body.extend_from_slice(&enc_explicit_ctx(
            1,
            &encode_general_names_content(&aki.authority_cert_issuer),
        ));
    }
    if let Some(serial) = &aki.authority_cert_serial_number {
        body.extend_from_slice(&enc_primitive_ctx(2, &int_content_bignum(serial)));
    }
    enc_seq(&body)
}

fn encode_access_descriptions(descs: &[AccessDescription]) -> Vec<u8> {
    let mut body = Vec::new();
    for desc in descs {
        body.extend_from_slice(&enc_seq(&enc_raw_parts(&[
            &enc_oid(&desc.access_method.to_der_value()),
            &encode_general_name(&desc.access_location),
        ])));
    }
    enc_seq(&body)
}

fn encode_private_key_usage_period(period: &PrivateKeyUsagePeriod) -> Vec<u8> {
    let mut body = Vec::new();
    if let Some(timestamp) = period.not_before {
        let content = encode_time_value(TimeKind::Generalized, timestamp);
        body.extend_from_slice(&enc_primitive_ctx(0, &content));
    }
    if let Some(timestamp) = period.not_after {
        let content = encode_time_value(TimeKind::Generalized, timestamp);
        body.extend_from_slice(&enc_primitive_ctx(1, &content));
    }
    enc_seq(&body)
}

fn encode_policy_constraints(pc: &PolicyConstraints) -> Vec<u8> {
    let mut body = Vec::new();
    if let Some(n) = pc.require_explicit_policy {
        body.extend_from_slice(&enc_primitive_ctx(0, &int_content_u32(n)));
    }
    if let Some(n) = pc.inhibit_policy_mapping {
        body.extend_from_slice(&enc_primitive_ctx(1, &int_content_u32(n)));
    }
    enc_seq(&body)
}

fn encode_general_subtrees(subtrees: &[GeneralSubtree]) -> Vec<u8> {
    let mut body = Vec::new();
    for subtree in subtrees {
        let mut entry = encode_general_name(&subtree.base);
        if subtree.minimum != 0 {
            entry.extend_from_slice(&enc_primitive_ctx(0, &int_content_u32(subtree.minimum)));
        }
        if let Some(maximum) = subtree.maximum {
            entry.extend_from_slice(&enc_primitive_ctx(1, &int_content_u32(maximum)));
        }
        body.extend_from_slice(&enc_seq(&entry));
    }
    body
}

fn encode_name_constraints(nc: &NameConstraints) -> Vec<u8> {
    let mut body = Vec::new();
    if !nc.permitted_subtrees.is_empty() {
        body.extend_from_slice(&enc_explicit_ctx(
            0,
            &encode_general_subtrees(&nc.permitted_subtrees),
        ));
    }
    if !nc.excluded_subtrees.is_empty() {
        body.extend_from_slice(&enc_explicit_ctx(
            1,
            &encode_general_subtrees(&nc.excluded_subtrees),
        ));
    }
    enc_seq(&body)
}

fn encode_distribution_point_name(name: &DistributionPointName) -> Vec<u8> {
    match name {
        DistributionPointName::FullName(names) => {
            enc_explicit_ctx(0, &encode_general_names_content(names))
        }
        DistributionPointName::NameRelativeToCrlIssuer(rdn) => {
            enc_explicit_ctx(1, &rdn.content_der())
        }
    }
}

fn encode_distribution_points(points: &[DistributionPoint]) -> Vec<u8> {
    let mut body = Vec::new();
    for point in points {
        let mut entry = Vec::new();
        if let Some(name) = &point.distribution_point {
            entry.extend_from_slice(&enc_explicit_ctx(0, &encode_distribution_point_name(name)));
        }
        if let Some(reasons) = point.reasons {
            entry.extend_from_slice(&enc_primitive_ctx(1, &reason_flags_content(reasons)));
        }
        if !point.crl_issuer.is_empty() {
            entry.extend_from_slice(&enc_explicit_ctx(
                2,
                &encode_general_names_content(&point.crl_issuer),
            ));
        }
        body.extend_from_slice(&enc_seq(&entry));
    }
    enc_seq(&body)
}

fn encode_issuing_distribution_point(idp: &IssuingDistributionPoint) -> Vec<u8> {
    let mut body = Vec::new();
    if let Some(name) = &idp.distribution_point {
        body.extend_from_slice(&enc_explicit_ctx(0, &encode_distribution_point_name(name)));
    }
    if idp.only_contains_user_certs {
        body.extend_from_slice(&enc_primitive_ctx(1, &[0xFF]));
    }
    if idp.only_contains_ca_certs {
        body.extend_from_slice(&enc_primitive_ctx(2, &[0xFF]));
    }
    if let Some(reasons) = idp.only_some_reasons {
        body.extend_from_slice(&enc_primitive_ctx(3, &reason_flags_content(reasons)));
    }
    if idp.indirect_crl {
        body.extend_from_slice(&enc_primitive_ctx(4, &[0xFF]));
    }
    if idp.only_contains_attribute_certs {
        body.extend_from_slice(&enc_primitive_ctx(5, &[0xFF]));
    }
    enc_seq(&body)
}

fn encode_display_text(text: &DisplayText) -> Vec<u8> {
    let (tag, s) = match text {
        DisplayText::Ia5(s) => (tags::IA5_STRING, s),
        DisplayText::Visible(s) => (tags::VISIBLE_STRING, s),
        DisplayText::Bmp(s) => (tags::BMP_STRING, s),
        DisplayText::Utf8(s) => (tags::UTF8_STRING, s),
    };
    enc_tlv(tag, &encode_string_value(tag as u32, s))
}

fn encode_user_notice(notice: &UserNotice) -> Vec<u8> {
    let mut body = Vec::new();
    if let Some(nr) = &notice.notice_ref {
        let mut entry = encode_display_text(&nr.organization);
        let mut numbers = Vec::new();
        for &n in &nr.notice_numbers {
            numbers.extend_from_slice(&enc_int(&u32_to_be(n)));
        }
        entry.extend_from_slice(&enc_seq(&numbers));
        body.extend_from_slice(&enc_seq(&entry));
    }
    if let Some(text) = &notice.explicit_text {
        body.extend_from_slice(&encode_display_text(text));
    }
    enc_seq(&body)
}

fn encode_policy_qualifier(qualifier: &PolicyQualifier) -> Vec<u8> {
    let value = match &qualifier.qualifier {
        QualifierValue::CpsUri(uri) => enc_ia5(uri),
        QualifierValue::UserNotice(notice) => encode_user_notice(notice),
        QualifierValue::Unknown(raw) => raw.clone(),
    };
    enc_seq(&enc_raw_parts(&[
        &enc_oid(&qualifier.policy_qualifier_id.to_der_value()),
        &value,
    ]))
}

fn encode_certificate_policies(policies: &[PolicyInformation]) -> Vec<u8> {
    let mut body = Vec::new();
    for policy in policies {
        let mut entry = enc_oid(&policy.policy_identifier.to_der_value());
        if !policy.policy_qualifiers.is_empty() {
            let mut qualifiers = Vec::new();
            for qualifier in &policy.policy_qualifiers {
                qualifiers.extend_from_slice(&encode_policy_qualifier(qualifier));
            }
            entry.extend_from_slice(&enc_seq(&qualifiers));
        }
        body.extend_from_slice(&enc_seq(&entry));
    }
    enc_seq(&body)
}

fn encode_policy_mappings(mappings: &[PolicyMapping]) -> Vec<u8> {
    let mut body = Vec::new();
    for mapping in mappings {
        body.extend_from_slice(&enc_seq(&enc_raw_parts(&[
            &enc_oid(&mapping.issuer_domain_policy.to_der_value()),
            &enc_oid(&mapping.subject_domain_policy.to_der_value()),
        ])));
    }
    enc_seq(&body)
}

// ---------------------------------------------------------------------------
// Extension lists
// ---------------------------------------------------------------------------

/// Parse a run of Extension SEQUENCEs. `dec` must sit over the contents
/// of the enclosing SEQUENCE OF Extension.
pub(crate) fn parse_extension_list(dec: &mut Decoder<'_>) -> Result<Vec<Extension>, X509Error> {
    let mut extensions = Vec::new();
    while !dec.is_empty() {
        let mut entry = dec
            .read_sequence()
            .map_err(|e| X509Error::Asn1Error(e.to_string()))?;
        let oid_bytes = entry
            .read_oid()
            .map_err(|e| X509Error::Asn1Error(e.to_string()))?;
        let oid =
            Oid::from_der_value(oid_bytes).map_err(|e| X509Error::Asn1Error(e.to_string()))?;
        let mut critical = false;
        let tag = entry
            .peek_tag()
            .map_err(|e| X509Error::Asn1Error(e.to_string()))?;
        if tag.class == TagClass::Universal && tag.number == 0x01 {
            critical = entry
                .read_boolean()
                .map_err(|e| X509Error::Asn1Error(e.to_string()))?;
        }
        let data = entry
            .read_octet_string()
            .map_err(|e| X509Error::Asn1Error(e.to_string()))?;
        let value = ExtensionValue::decode(&oid, data);
        extensions.push(Extension {
            oid,
            critical,
            value,
        });
    }
    Ok(extensions)
}

/// Parse an Extensions value (SEQUENCE OF Extension) from its DER.
pub(crate) fn parse_extensions_der(data: &[u8]) -> Result<Vec<Extension>, X509Error> {
    let mut dec = Decoder::new(data);
    let mut seq = dec
        .read_sequence()
        .map_err(|e| X509Error::Asn1Error(e.to_string()))?;
    parse_extension_list(&mut seq)
}

/// Encode an Extensions value (SEQUENCE OF Extension) to DER.
pub(crate) fn encode_extensions_der(extensions: &[Extension]) -> Result<Vec<u8>, X509Error> {
    let mut body = Vec::new();
    for ext in extensions {
        let mut entry = enc_oid(&ext.oid.to_der_value());
        if ext.critical {
            entry.extend_from_slice(&enc_bool(true));
        }
        entry.extend_from_slice(&enc_octet(&ext.value.encode(&ext.oid)?));
        body.extend_from_slice(&enc_seq(&entry));
    }
    Ok(enc_seq(&body))
}

/// Look up an extension by symbolic name or dotted OID.
pub(crate) fn find_extension<'a>(extensions: &'a [Extension], id: &str) -> Option<&'a Extension> {
    let oid = oids::resolve_oid(id)?;
    extensions.iter().find(|ext| ext.oid == oid)
}

/// Install an extension. An existing extension with the same OID is
/// overwritten when `replace` is set and left alone otherwise. Returns
/// whether the list changed.
pub(crate) fn set_extension(
    extensions: &mut Vec<Extension>,
    id: &str,
    value: ExtensionValue,
    critical: bool,
    replace: bool,
) -> bool {
    let Some(oid) = oids::resolve_oid(id) else {
        return false;
    };
    if let Some(existing) = extensions.iter_mut().find(|ext| ext.oid == oid) {
        if !replace {
            return false;
        }
        existing.critical = critical;
        existing.value = value;
        return true;
    }
    extensions.push(Extension {
        oid,
        critical,
        value,
    });
    true
}

/// Remove every extension with the given OID. Returns whether any were
/// removed.
pub(crate) fn remove_extension(extensions: &mut Vec<Extension>, id: &str) -> bool {
    let Some(oid) = oids::resolve_oid(id) else {
        return false;
    };
    let before = extensions.len();
    extensions.retain(|ext| ext.oid != oid);
    extensions.len() != before
}
