//! Distinguished names: the RDNSequence model, property accessors, and the
//! assorted renderings (string, OpenSSL-style map, DER, canonical DER, and
//! the canonical-DER hash).

use core::fmt;

use certkit_crypto::hash;
use certkit_types::{HashAlgId, X509Error};
use certkit_utils::asn1::{decode_string_value, encode_string_value, tags, Decoder, Encoder, TagClass, Tlv};
use certkit_utils::oid::Oid;

use super::oids;

// ---------------------------------------------------------------------------
// Model
// ---------------------------------------------------------------------------

/// An X.501 Name: a sequence of relative distinguished names.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Name {
    pub rdns: Vec<Rdn>,
}

/// One RDN: a set of attributes, almost always exactly one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rdn {
    pub attributes: Vec<AttributeTypeAndValue>,
}

/// A single attribute type and value inside an RDN.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributeTypeAndValue {
    pub oid: Oid,
    pub value: DnValue,
}

/// An attribute value, tagged with the string kind it was carried in so a
/// re-encode reproduces the original tag. Values that are not character
/// strings keep their full DER encoding untouched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DnValue {
    Utf8(String),
    Printable(String),
    Ia5(String),
    Numeric(String),
    T61(String),
    Visible(String),
    General(String),
    Universal(String),
    Bmp(String),
    Any(Vec<u8>),
}

impl DnValue {
    pub(crate) fn from_tlv(tlv: &Tlv) -> DnValue {
        if tlv.tag.class != TagClass::Universal || tlv.tag.constructed {
            return DnValue::Any(tlv.to_der());
        }
        let num = match u8::try_from(tlv.tag.number) {
            Ok(n) => n,
            Err(_) => return DnValue::Any(tlv.to_der()),
        };
        match decode_string_value(tlv.tag.number, tlv.value) {
            Ok(text) => match num {
                tags::UTF8_STRING => DnValue::Utf8(text),
                tags::PRINTABLE_STRING => DnValue::Printable(text),
                tags::IA5_STRING => DnValue::Ia5(text),
                tags::NUMERIC_STRING => DnValue::Numeric(text),
                tags::T61_STRING => DnValue::T61(text),
                tags::VISIBLE_STRING => DnValue::Visible(text),
                tags::GENERAL_STRING => DnValue::General(text),
                tags::UNIVERSAL_STRING => DnValue::Universal(text),
                tags::BMP_STRING => DnValue::Bmp(text),
                _ => DnValue::Any(tlv.to_der()),
            },
            Err(_) => DnValue::Any(tlv.to_der()),
        }
    }

    /// The text of a character-string value; `None` for non-string values.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            DnValue::Utf8(s)
            | DnValue::Printable(s)
            | DnValue::Ia5(s)
            | DnValue::Numeric(s)
            | DnValue::T61(s)
            | DnValue::Visible(s)
            | DnValue::General(s)
            | DnValue::Universal(s)
            | DnValue::Bmp(s) => Some(s),
            DnValue::Any(_) => None,
        }
    }

    /// Best-effort text for display purposes. Non-string values render
    /// their inner bytes lossily.
    pub fn display_text(&self) -> String {
        match self.as_text() {
            Some(s) => s.to_string(),
            None => {
                let DnValue::Any(der) = self else {
                    unreachable!()
                };
                let mut dec = Decoder::new(der);
                match dec.read_tlv() {
                    Ok(tlv) => String::from_utf8_lossy(tlv.value).into_owned(),
                    Err(_) => String::from_utf8_lossy(der).into_owned(),
                }
            }
        }
    }

    fn tag_number(&self) -> Option<u8> {
        match self {
            DnValue::Utf8(_) => Some(tags::UTF8_STRING),
            DnValue::Printable(_) => Some(tags::PRINTABLE_STRING),
            DnValue::Ia5(_) => Some(tags::IA5_STRING),
            DnValue::Numeric(_) => Some(tags::NUMERIC_STRING),
            DnValue::T61(_) => Some(tags::T61_STRING),
            DnValue::Visible(_) => Some(tags::VISIBLE_STRING),
            DnValue::General(_) => Some(tags::GENERAL_STRING),
            DnValue::Universal(_) => Some(tags::UNIVERSAL_STRING),
            DnValue::Bmp(_) => Some(tags::BMP_STRING),
            DnValue::Any(_) => None,
        }
    }

    /// Full DER encoding of this value, including its tag.
    pub(crate) fn to_der(&self) -> Vec<u8> {
        match (self.tag_number(), self.as_text()) {
            (Some(tag), Some(text)) => {
                let mut enc = Encoder::new();
                enc.write_tlv(tag, &encode_string_value(tag as u32, text));
                enc.finish()
            }
            _ => {
                let DnValue::Any(der) = self else {
                    unreachable!()
                };
                der.clone()
            }
        }
    }

    /// The value re-expressed for canonical comparison: character strings
    /// have runs of whitespace collapsed to one blank, are trimmed, are
    /// lowercased, and are retagged as UTF8String. Anything else is kept
    /// as stored.
    fn canonical(&self) -> DnValue {
        match self.as_text() {
            Some(text) => {
                let collapsed = text.split_whitespace().collect::<Vec<_>>().join(" ");
                DnValue::Utf8(collapsed.to_lowercase())
            }
            None => self.clone(),
        }
    }
}

// ---------------------------------------------------------------------------
// Property name translation
// ---------------------------------------------------------------------------

/// Translate a freeform property name (single-letter shorthand, long name,
/// or canonical identifier, any casing) to its canonical identifier.
fn translate_dn_prop(prop: &str) -> Option<&'static str> {
    let lowered = prop.to_ascii_lowercase();
    let name = match lowered.as_str() {
        "id-at-countryname" | "countryname" | "c" => "id-at-countryName",
        "id-at-organizationname" | "organizationname" | "o" => "id-at-organizationName",
        "id-at-dnqualifier" | "dnqualifier" => "id-at-dnQualifier",
        "id-at-commonname" | "commonname" | "cn" => "id-at-commonName",
        "id-at-stateorprovincename" | "stateorprovincename" | "state" | "province"
        | "provincename" | "st" => "id-at-stateOrProvinceName",
        "id-at-localityname" | "localityname" | "l" => "id-at-localityName",
        "id-emailaddress" | "emailaddress" => "id-emailAddress",
        "id-at-serialnumber" | "serialnumber" => "id-at-serialNumber",
        "id-at-postalcode" | "postalcode" => "id-at-postalCode",
        "id-at-streetaddress" | "streetaddress" => "id-at-streetAddress",
        "id-at-name" | "name" => "id-at-name",
        "id-at-givenname" | "givenname" => "id-at-givenName",
        "id-at-surname" | "surname" | "sn" => "id-at-surname",
        "id-at-initials" | "initials" => "id-at-initials",
        "id-at-generationqualifier" | "generationqualifier" => "id-at-generationQualifier",
        "id-at-organizationalunitname" | "organizationalunitname" | "ou" => {
            "id-at-organizationalUnitName"
        }
        "id-at-pseudonym" | "pseudonym" => "id-at-pseudonym",
        "id-at-title" | "title" => "id-at-title",
        "id-at-description" | "description" => "id-at-description",
        "id-at-role" | "role" => "id-at-role",
        "id-at-uniqueidentifier" | "uniqueidentifier" | "x500uniqueidentifier" => {
            "id-at-uniqueIdentifier"
        }
        _ => return None,
    };
    Some(name)
}

fn prop_oid(prop: &str) -> Option<Oid> {
    oids::resolve_oid(translate_dn_prop(prop)?)
}

// ---------------------------------------------------------------------------
// Parse / encode
// ---------------------------------------------------------------------------

/// Parse an X.501 Name from the decoder position (an RDNSequence).
pub(crate) fn parse_name(dec: &mut Decoder) -> Result<Name, X509Error> {
    let mut seq = dec
        .read_sequence()
        .map_err(|e| X509Error::Asn1Error(e.to_string()))?;
    let mut rdns = Vec::new();
    while !seq.is_empty() {
        let set = seq
            .read_set()
            .map_err(|e| X509Error::Asn1Error(e.to_string()))?;
        rdns.push(parse_rdn_content(set.remaining())?);
    }
    Ok(Name { rdns })
}

/// Parse the attribute list of one RDN (the content of the SET, without
/// the SET header). Implicitly tagged RDN fields carry exactly this.
pub(crate) fn parse_rdn_content(data: &[u8]) -> Result<Rdn, X509Error> {
    let mut set = Decoder::new(data);
    let mut attributes = Vec::new();
    while !set.is_empty() {
        let mut attr = set
            .read_sequence()
            .map_err(|e| X509Error::Asn1Error(e.to_string()))?;
        let oid_bytes = attr
            .read_oid()
            .map_err(|e| X509Error::Asn1Error(e.to_string()))?;
        let oid =
            Oid::from_der_value(oid_bytes).map_err(|e| X509Error::Asn1Error(e.to_string()))?;
        let tlv = attr
            .read_tlv()
            .map_err(|e| X509Error::Asn1Error(e.to_string()))?;
        attributes.push(AttributeTypeAndValue {
            oid,
            value: DnValue::from_tlv(&tlv),
        });
    }
    Ok(Rdn { attributes })
}

impl Name {
    pub fn new() -> Name {
        Name { rdns: Vec::new() }
    }

    pub fn is_empty(&self) -> bool {
        self.rdns.is_empty()
    }

    /// Parse a Name from its complete DER encoding.
    pub fn from_der(data: &[u8]) -> Result<Name, X509Error> {
        let mut dec = Decoder::new(data);
        parse_name(&mut dec)
    }

    /// Build a Name from a string-form DN such as
    /// `"C=GB, O=Example, CN=example.com"`.
    pub fn from_string(dn: &str) -> Result<Name, X509Error> {
        let mut name = Name::new();
        if !name.set_dn(dn, false) {
            return Err(X509Error::Misuse("unrecognized distinguished name property"));
        }
        Ok(name)
    }

    /// DER-encode the full RDNSequence.
    pub fn to_der(&self) -> Vec<u8> {
        let mut seq = Encoder::new();
        for rdn in &self.rdns {
            seq.write_raw(&rdn.to_der());
        }
        let mut enc = Encoder::new();
        enc.write_sequence(&seq.finish());
        enc.finish()
    }

    // -----------------------------------------------------------------------
    // Property accessors
    // -----------------------------------------------------------------------

    /// Append a single-attribute RDN for the given property. Returns false
    /// when the property name is not recognized.
    pub fn set_dn_prop(&mut self, prop: &str, value: &str) -> bool {
        let Some(oid) = prop_oid(prop) else {
            return false;
        };
        self.rdns.push(Rdn {
            attributes: vec![AttributeTypeAndValue {
                oid,
                value: DnValue::Utf8(value.to_string()),
            }],
        });
        true
    }

    /// Remove every RDN whose first attribute carries the given property.
    pub fn remove_dn_prop(&mut self, prop: &str) {
        let Some(oid) = prop_oid(prop) else {
            return;
        };
        self.rdns
            .retain(|rdn| rdn.attributes.first().map(|a| &a.oid) != Some(&oid));
    }

    /// Collect the values of every RDN whose first attribute carries the
    /// given property.
    pub fn get_dn_prop(&self, prop: &str) -> Vec<String> {
        let Some(oid) = prop_oid(prop) else {
            return Vec::new();
        };
        self.rdns
            .iter()
            .filter_map(|rdn| rdn.attributes.first())
            .filter(|attr| attr.oid == oid)
            .map(|attr| attr.value.display_text())
            .collect()
    }

    /// Replace (or, with `merge`, extend) this name from a string-form DN.
    /// Returns false if any property fails to translate; earlier fields may
    /// already have been applied at that point.
    pub fn set_dn(&mut self, dn: &str, merge: bool) -> bool {
        if !merge {
            self.rdns.clear();
        }
        for (prop, value) in tokenize_string_dn(dn) {
            if !self.set_dn_prop(prop, value) {
                return false;
            }
        }
        true
    }

    // -----------------------------------------------------------------------
    // Renderings
    // -----------------------------------------------------------------------

    /// OpenSSL-style map: the string rendering re-split into property and
    /// value pairs, with repeated properties merged into one entry.
    pub fn to_openssl(&self) -> Vec<(String, Vec<String>)> {
        let mut out: Vec<(String, Vec<String>)> = Vec::new();
        for (prop, value) in split_openssl_dn(&self.to_string()) {
            match out.iter_mut().find(|(p, _)| *p == prop) {
                Some((_, values)) => values.push(value),
                None => out.push((prop, vec![value])),
            }
        }
        out
    }

    /// Canonical bytes for comparison and hashing: the concatenated DER of
    /// each RDN (no enclosing SEQUENCE), every string value normalized to
    /// trimmed, lowercased, single-spaced UTF8String form.
    pub fn canonical_der(&self) -> Vec<u8> {
        let mut out = Vec::new();
        for rdn in &self.rdns {
            let normalized = Rdn {
                attributes: rdn
                    .attributes
                    .iter()
                    .map(|attr| AttributeTypeAndValue {
                        oid: attr.oid.clone(),
                        value: attr.value.canonical(),
                    })
                    .collect(),
            };
            out.extend_from_slice(&normalized.to_der());
        }
        out
    }

    /// Eight-hex-digit hash of the canonical form, as used for on-disk
    /// certificate store lookups: the first four bytes of the SHA-1 of
    /// [`Name::canonical_der`], byte-reversed.
    pub fn dn_hash(&self) -> Result<String, X509Error> {
        let digest = hash::digest(HashAlgId::Sha1, &self.canonical_der())?;
        Ok(format!(
            "{:02x}{:02x}{:02x}{:02x}",
            digest[3], digest[2], digest[1], digest[0]
        ))
    }
}

impl Rdn {
    /// The concatenated attribute TLVs, without the SET header.
    pub(crate) fn content_der(&self) -> Vec<u8> {
        let mut set = Encoder::new();
        for attr in &self.attributes {
            let mut inner = Encoder::new();
            inner.write_oid(&attr.oid.to_der_value());
            inner.write_raw(&attr.value.to_der());
            let mut seq = Encoder::new();
            seq.write_sequence(&inner.finish());
            set.write_raw(&seq.finish());
        }
        set.finish()
    }

    pub(crate) fn to_der(&self) -> Vec<u8> {
        let mut enc = Encoder::new();
        enc.write_set(&self.content_der());
        enc.finish()
    }
}

/// The string rendering: one field per RDN (first attribute only), joined
/// with `", "` for the common abbreviated properties and `"/"` for the rest.
impl fmt::Display for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for rdn in &self.rdns {
            let Some(attr) = rdn.attributes.first() else {
                continue;
            };
            let prop = oids::describe_oid(&attr.oid);
            let (delim, desc) = match prop.as_str() {
                "id-at-countryName" => (", ", "C".to_string()),
                "id-at-stateOrProvinceName" => (", ", "ST".to_string()),
                "id-at-organizationName" => (", ", "O".to_string()),
                "id-at-organizationalUnitName" => (", ", "OU".to_string()),
                "id-at-commonName" => (", ", "CN".to_string()),
                "id-at-localityName" => (", ", "L".to_string()),
                "id-at-surname" => (", ", "SN".to_string()),
                "id-at-uniqueIdentifier" => ("/", "x500UniqueIdentifier".to_string()),
                other => (
                    "/",
                    other.rsplit('-').next().unwrap_or(other).to_string(),
                ),
            };
            if !first {
                f.write_str(delim)?;
            }
            write!(f, "{}={}", desc, attr.value.display_text())?;
            first = false;
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// String-form tokenizers
// ---------------------------------------------------------------------------

/// Property prefixes recognized when parsing a string-form DN.
static STRING_DN_PROPS: &[&str] = &[
    "C=",
    "O=",
    "OU=",
    "CN=",
    "L=",
    "ST=",
    "SN=",
    "postalCode=",
    "streetAddress=",
    "emailAddress=",
    "serialNumber=",
    "organizationalUnitName=",
    "title=",
    "description=",
    "role=",
    "x500UniqueIdentifier=",
];

/// Is `at` the start of a field? Fields begin at the start of the string,
/// after a `/`, or after a comma and any run of spaces (in which case the
/// comma and spaces belong to the delimiter).
fn field_boundary(bytes: &[u8], at: usize) -> Option<usize> {
    match bytes.get(at) {
        Some(b'/') => Some(at + 1),
        Some(b',') => {
            let mut k = at + 1;
            while k < bytes.len() && bytes[k] == b' ' {
                k += 1;
            }
            Some(k)
        }
        _ if at == 0 => Some(0),
        _ => None,
    }
}

/// Split a string-form DN on the recognized property prefixes. Delimiters
/// inside values survive as long as they are not followed by a recognized
/// prefix.
fn tokenize_string_dn(dn: &str) -> Vec<(&str, &str)> {
    let bytes = dn.as_bytes();
    let mut fields = Vec::new();
    let mut current: Option<(&str, usize)> = None;
    let mut i = 0;
    while i < bytes.len() {
        if let Some(key_at) = field_boundary(bytes, i) {
            if let Some(prefix) = STRING_DN_PROPS
                .iter()
                .find(|p| dn[key_at..].starts_with(**p))
            {
                if let Some((prop, value_start)) = current.take() {
                    fields.push((prop, &dn[value_start..i]));
                }
                let prop = &prefix[..prefix.len() - 1];
                current = Some((prop, key_at + prefix.len()));
                i = key_at + prefix.len();
                continue;
            }
        }
        i += 1;
    }
    if let Some((prop, value_start)) = current {
        fields.push((prop, &dn[value_start..]));
    }
    fields
}

/// Split a string rendering into (property, value) pairs the OpenSSL way:
/// any alphanumeric word followed by `=` opens a field when it sits at a
/// field boundary.
fn split_openssl_dn(dn: &str) -> Vec<(String, String)> {
    let bytes = dn.as_bytes();
    let mut fields = Vec::new();
    let mut current: Option<(String, usize)> = None;
    let mut i = 0;
    while i < bytes.len() {
        if let Some(key_at) = field_boundary(bytes, i) {
            let mut k = key_at;
            if k < bytes.len() && bytes[k].is_ascii_alphabetic() {
                k += 1;
                while k < bytes.len() && bytes[k].is_ascii_alphanumeric() {
                    k += 1;
                }
                if k < bytes.len() && bytes[k] == b'=' {
                    if let Some((prop, value_start)) = current.take() {
                        fields.push((prop, dn[value_start..i].to_string()));
                    }
                    current = Some((dn[key_at..k].to_string(), k + 1));
                    i = k + 1;
                    continue;
                }
            }
        }
        i += 1;
    }
    if let Some((prop, value_start)) = current {
        fields.push((prop, dn[value_start..].to_string()));
    }
    fields
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_name() -> Name {
        let mut name = Name::new();
        assert!(name.set_dn_prop("c", "GB"));
        assert!(name.set_dn_prop("o", "TestOrg"));
        assert!(name.set_dn_prop("cn", "test.example.com"));
        name
    }

    #[test]
    fn test_prop_translation() {
        let mut name = Name::new();
        assert!(name.set_dn_prop("CN", "a"));
        assert!(name.set_dn_prop("commonName", "b"));
        assert!(name.set_dn_prop("id-at-commonName", "c"));
        assert_eq!(name.get_dn_prop("cn"), vec!["a", "b", "c"]);
        assert!(!name.set_dn_prop("no-such-prop", "x"));
    }

    #[test]
    fn test_remove_dn_prop() {
        let mut name = sample_name();
        name.set_dn_prop("ou", "first");
        name.set_dn_prop("ou", "second");
        assert_eq!(name.get_dn_prop("OU").len(), 2);
        name.remove_dn_prop("ou");
        assert!(name.get_dn_prop("OU").is_empty());
        assert_eq!(name.get_dn_prop("cn"), vec!["test.example.com"]);
    }

    #[test]
    fn test_string_rendering() {
        let name = sample_name();
        assert_eq!(name.to_string(), "C=GB, O=TestOrg, CN=test.example.com");
    }

    #[test]
    fn test_string_rendering_slash_fields() {
        let mut name = Name::new();
        name.set_dn_prop("cn", "leaf");
        name.set_dn_prop("title", "engineer");
        name.set_dn_prop("x500uniqueidentifier", "u-42");
        assert_eq!(
            name.to_string(),
            "CN=leaf/title=engineer/x500UniqueIdentifier=u-42"
        );
    }

    #[test]
    fn test_set_dn_string_form() {
        let mut name = Name::new();
        assert!(name.set_dn("C=GB, O=Acme, Inc/OU=Engineering, CN=example.com", false));
        assert_eq!(name.get_dn_prop("c"), vec!["GB"]);
        // A comma not followed by a recognized prefix stays in the value.
        assert_eq!(name.get_dn_prop("o"), vec!["Acme, Inc"]);
        assert_eq!(name.get_dn_prop("ou"), vec!["Engineering"]);
        assert_eq!(name.get_dn_prop("cn"), vec!["example.com"]);
    }

    #[test]
    fn test_set_dn_openssl_subject_form() {
        // Leading-slash form as produced by `openssl -subj`.
        let name = Name::from_string("/C=GB/O=CertKit/CN=example.com").unwrap();
        assert_eq!(name.get_dn_prop("c"), vec!["GB"]);
        assert_eq!(name.get_dn_prop("o"), vec!["CertKit"]);
        assert_eq!(name.get_dn_prop("cn"), vec!["example.com"]);
    }

    #[test]
    fn test_set_dn_replaces_unless_merging() {
        let mut name = Name::from_string("CN=old").unwrap();
        assert!(name.set_dn("CN=new", false));
        assert_eq!(name.get_dn_prop("cn"), vec!["new"]);
        assert!(name.set_dn("O=addition", true));
        assert_eq!(name.get_dn_prop("cn"), vec!["new"]);
        assert_eq!(name.get_dn_prop("o"), vec!["addition"]);
    }

    #[test]
    fn test_der_round_trip() {
        let name = sample_name();
        let der = name.to_der();
        let parsed = Name::from_der(&der).unwrap();
        assert_eq!(parsed, name);
        assert_eq!(parsed.to_der(), der);
    }

    #[test]
    fn test_parse_printable_string_value() {
        // SEQUENCE { SET { SEQUENCE { OID 2.5.4.6, PrintableString "US" } } }
        let der = [
            0x30, 0x0D, 0x31, 0x0B, 0x30, 0x09, 0x06, 0x03, 0x55, 0x04, 0x06, 0x13, 0x02, 0x55,
            0x53,
        ];
        let name = Name::from_der(&der).unwrap();
        assert_eq!(name.get_dn_prop("c"), vec!["US"]);
        let attr = &name.rdns[0].attributes[0];
        assert_eq!(attr.value, DnValue::Printable("US".to_string()));
        // Re-encoding keeps the PrintableString tag.
        assert_eq!(name.to_der(), der);
    }

    #[test]
    fn test_openssl_map_merges_duplicates() {
        let mut name = Name::new();
        name.set_dn_prop("cn", "a");
        name.set_dn_prop("cn", "b");
        name.set_dn_prop("o", "org");
        let map = name.to_openssl();
        assert_eq!(
            map,
            vec![
                ("CN".to_string(), vec!["a".to_string(), "b".to_string()]),
                ("O".to_string(), vec!["org".to_string()]),
            ]
        );
    }

    #[test]
    fn test_canonical_der_normalizes_strings() {
        let mut name = Name::new();
        name.set_dn_prop("cn", "  Test  CA ");
        name.set_dn_prop("c", "GB");
        let canon = name.canonical_der();
        // Two bare SET elements, no enclosing SEQUENCE.
        let expected = [
            0x31, 0x10, 0x30, 0x0E, 0x06, 0x03, 0x55, 0x04, 0x03, 0x0C, 0x07, b't', b'e', b's',
            b't', b' ', b'c', b'a', 0x31, 0x0B, 0x30, 0x09, 0x06, 0x03, 0x55, 0x04, 0x06, 0x0C,
            0x02, b'g', b'b',
        ];
        assert_eq!(canon, expected);
    }

    #[test]
    fn test_dn_hash() {
        let mut name = Name::new();
        name.set_dn_prop("cn", "  Test  CA ");
        name.set_dn_prop("c", "GB");
        assert_eq!(name.dn_hash().unwrap(), "c788f963");
    }

    #[test]
    fn test_from_string_rejects_unknown_prefix() {
        // "Z=" is not a recognized prefix, so the whole string ends up as
        // part of no field and the name parses empty.
        let name = Name::from_string("Z=whatever").unwrap();
        assert!(name.is_empty());
    }
}
