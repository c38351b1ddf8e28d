//! PKCS #10 attributes: the typed value registry and the disposition
//! addressing scheme used by the CSR accessors.
//!
//! A value index addresses the concatenation of every value carried by
//! same-typed attribute entries, in order. Indexing past the end of that
//! concatenation on a read is a caller error; on a write it reports an
//! unchanged list instead.

use certkit_types::X509Error;
use certkit_utils::asn1::{Decoder, Tlv};
use certkit_utils::oid::Oid;

use crate::encoding::{enc_oid, enc_seq, enc_set};

use super::extensions::{encode_extensions_der, parse_extensions_der, Extension};
use super::name::DnValue;
use super::oids;

/// How an attribute operation addresses values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disposition {
    /// Every value of the type.
    All,
    /// Write-only: add a value to the type's last entry.
    Append,
    /// Write-only: drop every value of the type first.
    Replace,
    /// One value, indexed across all same-typed entries.
    Index(usize),
}

/// One CSR attribute: a type and its SET OF values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    pub oid: Oid,
    pub values: Vec<AttributeValue>,
}

/// A decoded attribute value, keyed by the attribute type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttributeValue {
    /// pkcs-9-at-challengePassword, keeping its original string tag.
    ChallengePassword(DnValue),
    /// pkcs-9-at-unstructuredName, keeping its original string tag.
    UnstructuredName(DnValue),
    /// pkcs-9-at-extensionRequest: a full extensions list.
    ExtensionRequest(Vec<Extension>),
    /// Any other type, kept as the complete value encoding. Re-encodes
    /// verbatim.
    Unknown(Vec<u8>),
}

impl AttributeValue {
    /// Decode one SET member by attribute type. Never fails: a payload
    /// that will not parse stays raw.
    pub(crate) fn decode(oid: &Oid, tlv: &Tlv<'_>) -> AttributeValue {
        match oid.arcs() {
            [1, 2, 840, 113549, 1, 9, 7] => {
                AttributeValue::ChallengePassword(DnValue::from_tlv(tlv))
            }
            [1, 2, 840, 113549, 1, 9, 2] => {
                AttributeValue::UnstructuredName(DnValue::from_tlv(tlv))
            }
            [1, 2, 840, 113549, 1, 9, 14] => match parse_extensions_der(&tlv.to_der()) {
                Ok(extensions) => AttributeValue::ExtensionRequest(extensions),
                Err(_) => AttributeValue::Unknown(tlv.to_der()),
            },
            _ => AttributeValue::Unknown(tlv.to_der()),
        }
    }

    /// Full DER encoding of this value. Fails only when a contained
    /// extensions list refuses to encode.
    pub(crate) fn to_der(&self) -> Result<Vec<u8>, X509Error> {
        match self {
            AttributeValue::ChallengePassword(value)
            | AttributeValue::UnstructuredName(value) => Ok(value.to_der()),
            AttributeValue::ExtensionRequest(extensions) => encode_extensions_der(extensions),
            AttributeValue::Unknown(raw) => Ok(raw.clone()),
        }
    }

    /// The text of a string-valued attribute; `None` otherwise.
    pub fn text(&self) -> Option<&str> {
        match self {
            AttributeValue::ChallengePassword(value)
            | AttributeValue::UnstructuredName(value) => value.as_text(),
            _ => None,
        }
    }
}

impl Attribute {
    /// Read one Attribute SEQUENCE from `dec`.
    pub(crate) fn from_decoder(dec: &mut Decoder<'_>) -> Result<Attribute, X509Error> {
        let mut seq = dec
            .read_sequence()
            .map_err(|e| X509Error::Asn1Error(e.to_string()))?;
        let oid_bytes = seq
            .read_oid()
            .map_err(|e| X509Error::Asn1Error(e.to_string()))?;
        let oid =
            Oid::from_der_value(oid_bytes).map_err(|e| X509Error::Asn1Error(e.to_string()))?;
        let mut set = seq
            .read_set()
            .map_err(|e| X509Error::Asn1Error(e.to_string()))?;
        let mut values = Vec::new();
        while !set.is_empty() {
            let tlv = set
                .read_tlv()
                .map_err(|e| X509Error::Asn1Error(e.to_string()))?;
            values.push(AttributeValue::decode(&oid, &tlv));
        }
        Ok(Attribute { oid, values })
    }

    pub(crate) fn to_der(&self) -> Result<Vec<u8>, X509Error> {
        let mut set_content = Vec::new();
        for value in &self.values {
            set_content.extend_from_slice(&value.to_der()?);
        }
        let mut body = enc_oid(&self.oid.to_der_value());
        body.extend_from_slice(&enc_set(&set_content));
        Ok(enc_seq(&body))
    }
}

/// Parse a run of Attribute SEQUENCEs. `dec` must sit over the contents
/// of the enclosing collection (the CSR's implicitly tagged `[0]` or a
/// SEQUENCE OF Attribute).
pub(crate) fn parse_attribute_list(dec: &mut Decoder<'_>) -> Result<Vec<Attribute>, X509Error> {
    let mut attributes = Vec::new();
    while !dec.is_empty() {
        attributes.push(Attribute::from_decoder(dec)?);
    }
    Ok(attributes)
}

/// Encode attributes back to concatenated SEQUENCEs with no wrapper.
pub(crate) fn encode_attribute_list(attributes: &[Attribute]) -> Result<Vec<u8>, X509Error> {
    let mut body = Vec::new();
    for attribute in attributes {
        body.extend_from_slice(&attribute.to_der()?);
    }
    Ok(body)
}

/// Read attribute values by type. `All` collects every value; an index
/// addresses one value across same-typed entries; the write dispositions
/// are rejected.
pub(crate) fn get_attribute(
    attributes: &[Attribute],
    id: &str,
    disposition: Disposition,
) -> Result<Vec<AttributeValue>, X509Error> {
    let oid = oids::resolve_oid(id);
    match disposition {
        Disposition::Append | Disposition::Replace => Err(X509Error::Misuse(
            "append and replace dispositions address writes, not reads",
        )),
        Disposition::All => {
            let mut values = Vec::new();
            if let Some(oid) = oid {
                for attribute in attributes.iter().filter(|a| a.oid == oid) {
                    values.extend(attribute.values.iter().cloned());
                }
            }
            Ok(values)
        }
        Disposition::Index(mut n) => {
            if let Some(oid) = oid {
                for attribute in attributes.iter().filter(|a| a.oid == oid) {
                    if n >= attribute.values.len() {
                        n -= attribute.values.len();
                        continue;
                    }
                    return Ok(vec![attribute.values[n].clone()]);
                }
            }
            Err(X509Error::Misuse("attribute value index out of range"))
        }
    }
}

/// Install an attribute value. `All` and `Replace` drop existing entries
/// of the type first; `Append` extends the last existing entry, creating
/// one if needed; an index overwrites in place. Returns whether the list
/// changed, which an out-of-range index does not.
pub(crate) fn set_attribute(
    attributes: &mut Vec<Attribute>,
    id: &str,
    value: AttributeValue,
    disposition: Disposition,
) -> bool {
    let Some(oid) = oids::resolve_oid(id) else {
        return false;
    };
    match disposition {
        Disposition::All | Disposition::Replace => {
            attributes.retain(|a| a.oid != oid);
            attributes.push(Attribute {
                oid,
                values: vec![value],
            });
            true
        }
        Disposition::Append => {
            if let Some(attribute) = attributes.iter_mut().filter(|a| a.oid == oid).last() {
                attribute.values.push(value);
            } else {
                attributes.push(Attribute {
                    oid,
                    values: vec![value],
                });
            }
            true
        }
        Disposition::Index(mut n) => {
            for attribute in attributes.iter_mut().filter(|a| a.oid == oid) {
                if n >= attribute.values.len() {
                    n -= attribute.values.len();
                    continue;
                }
                attribute.values[n] = value;
                return true;
            }
            false
        }
    }
}

/// Remove attribute values by type. `All` drops every entry of the type;
/// an index removes one value and collapses the entry once its value
/// list is empty. Returns whether anything was removed.
pub(crate) fn remove_attribute(
    attributes: &mut Vec<Attribute>,
    id: &str,
    disposition: Disposition,
) -> Result<bool, X509Error> {
    let Some(oid) = oids::resolve_oid(id) else {
        return Ok(false);
    };
    match disposition {
        Disposition::Append | Disposition::Replace => Err(X509Error::Misuse(
            "append and replace dispositions address writes, not removals",
        )),
        Disposition::All => {
            let before = attributes.len();
            attributes.retain(|a| a.oid != oid);
            Ok(attributes.len() != before)
        }
        Disposition::Index(mut n) => {
            let mut i = 0;
            while i < attributes.len() {
                if attributes[i].oid == oid {
                    let len = attributes[i].values.len();
                    if n >= len {
                        n -= len;
                    } else {
                        attributes[i].values.remove(n);
                        if attributes[i].values.is_empty() {
                            attributes.remove(i);
                        }
                        return Ok(true);
                    }
                }
                i += 1;
            }
            Ok(false)
        }
    }
}
