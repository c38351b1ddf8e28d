//! OID (Object Identifier) management.

use certkit_types::*;

/// A parsed OID represented as a sequence of arc values.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Oid {
    arcs: Vec<u32>,
}

impl Oid {
    /// Create an OID from a slice of arc values.
    pub fn new(arcs: &[u32]) -> Self {
        Self {
            arcs: arcs.to_vec(),
        }
    }

    /// Return the arc values.
    pub fn arcs(&self) -> &[u32] {
        &self.arcs
    }

    /// Encode this OID to DER bytes (just the value, no tag/length).
    pub fn to_der_value(&self) -> Vec<u8> {
        let mut buf = Vec::new();
        if self.arcs.len() >= 2 {
            buf.push((self.arcs[0] * 40 + self.arcs[1]) as u8);
            for &arc in &self.arcs[2..] {
                encode_arc(&mut buf, arc);
            }
        }
        buf
    }

    /// Parse an OID from DER value bytes.
    pub fn from_der_value(data: &[u8]) -> Result<Self, CryptoError> {
        if data.is_empty() {
            return Err(CryptoError::DecodeAsn1Fail);
        }
        let mut arcs = Vec::new();
        let first = data[0] as u32;
        arcs.push(first / 40);
        arcs.push(first % 40);

        let mut i = 1;
        while i < data.len() {
            let (arc, consumed) = decode_arc(&data[i..])?;
            arcs.push(arc);
            i += consumed;
        }

        Ok(Self { arcs })
    }

    /// Parse an OID from its dotted-string form (e.g. "2.5.29.15").
    pub fn from_dot_string(s: &str) -> Result<Self, CryptoError> {
        let arcs: Vec<u32> = s
            .split('.')
            .map(|part| part.parse::<u32>().map_err(|_| CryptoError::InvalidArg))
            .collect::<Result<_, _>>()?;
        if arcs.len() < 2 || arcs[0] > 2 {
            return Err(CryptoError::InvalidArg);
        }
        Ok(Self { arcs })
    }

    /// Return the dotted-string representation (e.g., "1.2.840.113549.1.1.1").
    pub fn to_dot_string(&self) -> String {
        self.arcs
            .iter()
            .map(|a| a.to_string())
            .collect::<Vec<_>>()
            .join(".")
    }
}

impl std::fmt::Display for Oid {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_dot_string())
    }
}

impl std::str::FromStr for Oid {
    type Err = CryptoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_dot_string(s)
    }
}

fn encode_arc(buf: &mut Vec<u8>, mut value: u32) {
    if value < 0x80 {
        buf.push(value as u8);
        return;
    }
    let mut bytes = Vec::new();
    while value > 0 {
        bytes.push((value & 0x7F) as u8);
        value >>= 7;
    }
    bytes.reverse();
    for (i, b) in bytes.iter().enumerate() {
        if i < bytes.len() - 1 {
            buf.push(b | 0x80);
        } else {
            buf.push(*b);
        }
    }
}

fn decode_arc(data: &[u8]) -> Result<(u32, usize), CryptoError> {
    let mut value: u32 = 0;
    for (i, &byte) in data.iter().enumerate() {
        value = value.checked_shl(7).ok_or(CryptoError::DecodeAsn1Fail)? | (byte & 0x7F) as u32;
        if (byte & 0x80) == 0 {
            return Ok((value, i + 1));
        }
    }
    Err(CryptoError::DecodeAsn1Fail)
}

// Well-known OIDs
pub mod known {
    use super::Oid;

    // RSA keys and the PKCS#1 v1.5 signature suite
    pub fn rsa_encryption() -> Oid {
        Oid::new(&[1, 2, 840, 113549, 1, 1, 1])
    }
    pub fn md2_with_rsa_encryption() -> Oid {
        Oid::new(&[1, 2, 840, 113549, 1, 1, 2])
    }
    pub fn md5_with_rsa_encryption() -> Oid {
        Oid::new(&[1, 2, 840, 113549, 1, 1, 4])
    }
    pub fn sha1_with_rsa_encryption() -> Oid {
        Oid::new(&[1, 2, 840, 113549, 1, 1, 5])
    }
    pub fn sha224_with_rsa_encryption() -> Oid {
        Oid::new(&[1, 2, 840, 113549, 1, 1, 14])
    }
    pub fn sha256_with_rsa_encryption() -> Oid {
        Oid::new(&[1, 2, 840, 113549, 1, 1, 11])
    }
    pub fn sha384_with_rsa_encryption() -> Oid {
        Oid::new(&[1, 2, 840, 113549, 1, 1, 12])
    }
    pub fn sha512_with_rsa_encryption() -> Oid {
        Oid::new(&[1, 2, 840, 113549, 1, 1, 13])
    }

    // DN attribute types (X.520)
    pub fn common_name() -> Oid {
        Oid::new(&[2, 5, 4, 3])
    }
    pub fn country_name() -> Oid {
        Oid::new(&[2, 5, 4, 6])
    }
    pub fn organization_name() -> Oid {
        Oid::new(&[2, 5, 4, 10])
    }
    pub fn organizational_unit_name() -> Oid {
        Oid::new(&[2, 5, 4, 11])
    }
    pub fn state_or_province_name() -> Oid {
        Oid::new(&[2, 5, 4, 8])
    }
    pub fn locality_name() -> Oid {
        Oid::new(&[2, 5, 4, 7])
    }
    pub fn serial_number_attr() -> Oid {
        Oid::new(&[2, 5, 4, 5])
    }
    pub fn email_address() -> Oid {
        Oid::new(&[1, 2, 840, 113549, 1, 9, 1])
    }

    /// Map a well-known DN attribute OID to its short name.
    pub fn oid_to_dn_short_name(oid: &super::Oid) -> Option<&'static str> {
        let arcs = oid.arcs();
        match arcs {
            [2, 5, 4, 3] => Some("CN"),
            [2, 5, 4, 6] => Some("C"),
            [2, 5, 4, 10] => Some("O"),
            [2, 5, 4, 11] => Some("OU"),
            [2, 5, 4, 8] => Some("ST"),
            [2, 5, 4, 7] => Some("L"),
            [2, 5, 4, 5] => Some("serialNumber"),
            [1, 2, 840, 113549, 1, 9, 1] => Some("emailAddress"),
            _ => None,
        }
    }

    /// Map a DN attribute short name back to its OID. Accepts the same
    /// names `oid_to_dn_short_name` produces, case-insensitively.
    pub fn dn_short_name_to_oid(name: &str) -> Option<Oid> {
        match name.to_ascii_lowercase().as_str() {
            "cn" | "commonname" => Some(common_name()),
            "c" | "countryname" => Some(country_name()),
            "o" | "organizationname" => Some(organization_name()),
            "ou" | "organizationalunitname" => Some(organizational_unit_name()),
            "st" | "stateorprovincename" => Some(state_or_province_name()),
            "l" | "localityname" => Some(locality_name()),
            "serialnumber" => Some(serial_number_attr()),
            "emailaddress" => Some(email_address()),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_oid_roundtrip() {
        let oid = Oid::new(&[1, 2, 840, 113549, 1, 1, 1]);
        let der = oid.to_der_value();
        let parsed = Oid::from_der_value(&der).unwrap();
        assert_eq!(oid, parsed);
    }

    #[test]
    fn test_dot_string() {
        let oid = Oid::new(&[1, 2, 840, 113549, 1, 1, 1]);
        assert_eq!(oid.to_dot_string(), "1.2.840.113549.1.1.1");
    }

    #[test]
    fn test_from_dot_string() {
        let oid = Oid::from_dot_string("2.5.29.15").unwrap();
        assert_eq!(oid.arcs(), &[2, 5, 29, 15]);
        assert!(Oid::from_dot_string("not.an.oid").is_err());
        assert!(Oid::from_dot_string("1").is_err());
    }

    #[test]
    fn test_rsa_encryption_oid_der() {
        // The well-known DER encoding of rsaEncryption OID
        let oid = known::rsa_encryption();
        let der = oid.to_der_value();
        assert_eq!(der, &[0x2A, 0x86, 0x48, 0x86, 0xF7, 0x0D, 0x01, 0x01, 0x01]);
    }

    #[test]
    fn test_dn_short_name_mapping() {
        let cn = known::common_name();
        assert_eq!(known::oid_to_dn_short_name(&cn), Some("CN"));
        assert_eq!(known::dn_short_name_to_oid("cn"), Some(cn));
        assert_eq!(known::dn_short_name_to_oid("id-at-unknown"), None);
    }
}
