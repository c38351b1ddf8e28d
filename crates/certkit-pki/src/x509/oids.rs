//! Object identifier dictionary for certificate structures.
//!
//! Maps dotted-decimal OID strings to the symbolic names used by the X.509,
//! PKIX, and PKCS #9 specifications, and back. Accessors elsewhere in this
//! crate take either form and normalize through [`get_oid`].

use certkit_utils::oid::Oid;

/// Dotted-decimal OID to symbolic name, one entry per identifier this crate
/// can put a name to. Unlisted OIDs stay dotted everywhere they surface.
static OID_NAMES: &[(&str, &str)] = &[
    ("1.3.6.1.5.5.7", "id-pkix"),
    ("1.3.6.1.5.5.7.1", "id-pe"),
    ("1.3.6.1.5.5.7.2", "id-qt"),
    ("1.3.6.1.5.5.7.3", "id-kp"),
    ("1.3.6.1.5.5.7.48", "id-ad"),
    ("1.3.6.1.5.5.7.2.1", "id-qt-cps"),
    ("1.3.6.1.5.5.7.2.2", "id-qt-unotice"),
    ("1.3.6.1.5.5.7.48.1", "id-ad-ocsp"),
    ("1.3.6.1.5.5.7.48.2", "id-ad-caIssuers"),
    ("1.3.6.1.5.5.7.48.3", "id-ad-timeStamping"),
    ("1.3.6.1.5.5.7.48.5", "id-ad-caRepository"),
    ("2.5.4", "id-at"),
    ("2.5.4.41", "id-at-name"),
    ("2.5.4.4", "id-at-surname"),
    ("2.5.4.42", "id-at-givenName"),
    ("2.5.4.43", "id-at-initials"),
    ("2.5.4.44", "id-at-generationQualifier"),
    ("2.5.4.3", "id-at-commonName"),
    ("2.5.4.7", "id-at-localityName"),
    ("2.5.4.8", "id-at-stateOrProvinceName"),
    ("2.5.4.10", "id-at-organizationName"),
    ("2.5.4.11", "id-at-organizationalUnitName"),
    ("2.5.4.12", "id-at-title"),
    ("2.5.4.13", "id-at-description"),
    ("2.5.4.46", "id-at-dnQualifier"),
    ("2.5.4.6", "id-at-countryName"),
    ("2.5.4.5", "id-at-serialNumber"),
    ("2.5.4.65", "id-at-pseudonym"),
    ("2.5.4.17", "id-at-postalCode"),
    ("2.5.4.9", "id-at-streetAddress"),
    ("2.5.4.45", "id-at-uniqueIdentifier"),
    ("2.5.4.72", "id-at-role"),
    ("0.9.2342.19200300.100.1.25", "id-domainComponent"),
    ("1.2.840.113549.1.9", "pkcs-9"),
    ("1.2.840.113549.1.9.1", "id-emailAddress"),
    ("2.5.29", "id-ce"),
    ("2.5.29.35", "id-ce-authorityKeyIdentifier"),
    ("2.5.29.14", "id-ce-subjectKeyIdentifier"),
    ("2.5.29.15", "id-ce-keyUsage"),
    ("2.5.29.16", "id-ce-privateKeyUsagePeriod"),
    ("2.5.29.32", "id-ce-certificatePolicies"),
    ("2.5.29.32.0", "anyPolicy"),
    ("2.5.29.33", "id-ce-policyMappings"),
    ("2.5.29.17", "id-ce-subjectAltName"),
    ("2.5.29.18", "id-ce-issuerAltName"),
    ("2.5.29.9", "id-ce-subjectDirectoryAttributes"),
    ("2.5.29.19", "id-ce-basicConstraints"),
    ("2.5.29.30", "id-ce-nameConstraints"),
    ("2.5.29.36", "id-ce-policyConstraints"),
    ("2.5.29.31", "id-ce-cRLDistributionPoints"),
    ("2.5.29.37", "id-ce-extKeyUsage"),
    ("2.5.29.37.0", "anyExtendedKeyUsage"),
    ("1.3.6.1.5.5.7.3.1", "id-kp-serverAuth"),
    ("1.3.6.1.5.5.7.3.2", "id-kp-clientAuth"),
    ("1.3.6.1.5.5.7.3.3", "id-kp-codeSigning"),
    ("1.3.6.1.5.5.7.3.4", "id-kp-emailProtection"),
    ("1.3.6.1.5.5.7.3.8", "id-kp-timeStamping"),
    ("1.3.6.1.5.5.7.3.9", "id-kp-OCSPSigning"),
    ("2.5.29.54", "id-ce-inhibitAnyPolicy"),
    ("2.5.29.46", "id-ce-freshestCRL"),
    ("1.3.6.1.5.5.7.1.1", "id-pe-authorityInfoAccess"),
    ("1.3.6.1.5.5.7.1.11", "id-pe-subjectInfoAccess"),
    ("2.5.29.20", "id-ce-cRLNumber"),
    ("2.5.29.28", "id-ce-issuingDistributionPoint"),
    ("2.5.29.27", "id-ce-deltaCRLIndicator"),
    ("2.5.29.21", "id-ce-cRLReasons"),
    ("2.5.29.29", "id-ce-certificateIssuer"),
    ("2.5.29.23", "id-ce-holdInstructionCode"),
    // The hold-instruction arc below is the one RFC 5280 registers, quirky
    // first arc included.
    ("2.2.840.10040.2", "holdInstruction"),
    ("2.2.840.10040.2.1", "id-holdinstruction-none"),
    ("2.2.840.10040.2.2", "id-holdinstruction-callissuer"),
    ("2.2.840.10040.2.3", "id-holdinstruction-reject"),
    ("2.5.29.24", "id-ce-invalidityDate"),
    ("1.2.840.113549.2.2", "md2"),
    ("1.2.840.113549.2.5", "md5"),
    ("1.3.14.3.2.26", "id-sha1"),
    ("1.2.840.10040.4.1", "id-dsa"),
    ("1.2.840.10040.4.3", "id-dsa-with-sha1"),
    ("1.2.840.113549.1.1", "pkcs-1"),
    ("1.2.840.113549.1.1.1", "rsaEncryption"),
    ("1.2.840.113549.1.1.2", "md2WithRSAEncryption"),
    ("1.2.840.113549.1.1.4", "md5WithRSAEncryption"),
    ("1.2.840.113549.1.1.5", "sha1WithRSAEncryption"),
    ("1.2.840.10046.2.1", "dhpublicnumber"),
    ("2.16.840.1.101.2.1.1.22", "id-keyExchangeAlgorithm"),
    ("1.2.840.10045", "ansi-X9-62"),
    ("1.2.840.10045.4", "id-ecSigType"),
    ("1.2.840.10045.4.1", "ecdsa-with-SHA1"),
    ("1.2.840.10045.1", "id-fieldType"),
    ("1.2.840.10045.1.1", "prime-field"),
    ("1.2.840.10045.1.2", "characteristic-two-field"),
    ("1.2.840.10045.1.2.3", "id-characteristic-two-basis"),
    ("1.2.840.10045.1.2.3.1", "gnBasis"),
    ("1.2.840.10045.1.2.3.2", "tpBasis"),
    ("1.2.840.10045.1.2.3.3", "ppBasis"),
    ("1.2.840.10045.2", "id-publicKeyType"),
    ("1.2.840.10045.2.1", "id-ecPublicKey"),
    ("1.2.840.10045.3", "ellipticCurve"),
    ("1.2.840.10045.3.0", "c-TwoCurve"),
    ("1.2.840.10045.3.0.1", "c2pnb163v1"),
    ("1.2.840.10045.3.0.2", "c2pnb163v2"),
    ("1.2.840.10045.3.0.3", "c2pnb163v3"),
    ("1.2.840.10045.3.0.4", "c2pnb176w1"),
    ("1.2.840.10045.3.0.5", "c2pnb191v1"),
    ("1.2.840.10045.3.0.6", "c2pnb191v2"),
    ("1.2.840.10045.3.0.7", "c2pnb191v3"),
    ("1.2.840.10045.3.0.8", "c2pnb191v4"),
    ("1.2.840.10045.3.0.9", "c2pnb191v5"),
    ("1.2.840.10045.3.0.10", "c2pnb208w1"),
    ("1.2.840.10045.3.0.11", "c2pnb239v1"),
    ("1.2.840.10045.3.0.12", "c2pnb239v2"),
    ("1.2.840.10045.3.0.13", "c2pnb239v3"),
    ("1.2.840.10045.3.0.14", "c2pnb239v4"),
    ("1.2.840.10045.3.0.15", "c2pnb239v5"),
    ("1.2.840.10045.3.0.16", "c2pnb272w1"),
    ("1.2.840.10045.3.0.17", "c2pnb304w1"),
    ("1.2.840.10045.3.0.18", "c2pnb359v1"),
    ("1.2.840.10045.3.0.19", "c2pnb368w1"),
    ("1.2.840.10045.3.0.20", "c2pnb431r1"),
    ("1.2.840.10045.3.1", "primeCurve"),
    ("1.2.840.10045.3.1.1", "prime192v1"),
    ("1.2.840.10045.3.1.2", "prime192v2"),
    ("1.2.840.10045.3.1.3", "prime192v3"),
    ("1.2.840.10045.3.1.4", "prime239v1"),
    ("1.2.840.10045.3.1.5", "prime239v2"),
    ("1.2.840.10045.3.1.6", "prime239v3"),
    ("1.2.840.10045.3.1.7", "prime256v1"),
    ("1.2.840.113549.1.1.7", "id-RSAES-OAEP"),
    ("1.2.840.113549.1.1.9", "id-pSpecified"),
    ("1.2.840.113549.1.1.10", "id-RSASSA-PSS"),
    ("1.2.840.113549.1.1.8", "id-mgf1"),
    ("1.2.840.113549.1.1.14", "sha224WithRSAEncryption"),
    ("1.2.840.113549.1.1.11", "sha256WithRSAEncryption"),
    ("1.2.840.113549.1.1.12", "sha384WithRSAEncryption"),
    ("1.2.840.113549.1.1.13", "sha512WithRSAEncryption"),
    ("2.16.840.1.101.3.4.2.4", "id-sha224"),
    ("2.16.840.1.101.3.4.2.1", "id-sha256"),
    ("2.16.840.1.101.3.4.2.2", "id-sha384"),
    ("2.16.840.1.101.3.4.2.3", "id-sha512"),
    ("1.2.643.2.2.4", "id-GostR3411-94-with-GostR3410-94"),
    ("1.2.643.2.2.3", "id-GostR3411-94-with-GostR3410-2001"),
    ("1.2.643.2.2.20", "id-GostR3410-2001"),
    ("1.2.643.2.2.19", "id-GostR3410-94"),
    // Netscape certificate extension identifiers.
    ("2.16.840.1.113730", "netscape"),
    ("2.16.840.1.113730.1", "netscape-cert-extension"),
    ("2.16.840.1.113730.1.1", "netscape-cert-type"),
    ("2.16.840.1.113730.1.13", "netscape-comment"),
    ("2.16.840.1.113730.1.8", "netscape-ca-policy-url"),
    // Recognized but carried as raw payloads.
    ("1.3.6.1.5.5.7.1.12", "id-pe-logotype"),
    ("1.2.840.113533.7.65.0", "entrustVersInfo"),
    ("2.16.840.1.113733.1.6.9", "verisignPrivate"),
    // PKCS #9 / RFC 2985 request attributes.
    ("1.2.840.113549.1.9.2", "pkcs-9-at-unstructuredName"),
    ("1.2.840.113549.1.9.7", "pkcs-9-at-challengePassword"),
    ("1.2.840.113549.1.9.14", "pkcs-9-at-extensionRequest"),
];

/// Look up the symbolic name for a dotted-decimal OID string.
pub fn oid_to_name(dotted: &str) -> Option<&'static str> {
    OID_NAMES
        .iter()
        .find(|(oid, _)| *oid == dotted)
        .map(|(_, name)| *name)
}

/// Look up the dotted-decimal form of a symbolic name.
pub fn name_to_oid(name: &str) -> Option<&'static str> {
    OID_NAMES
        .iter()
        .find(|(_, n)| *n == name)
        .map(|(oid, _)| *oid)
}

/// Translate a symbolic identifier to its dotted-decimal form.
///
/// Input that is already dotted-decimal, or that names nothing in the
/// dictionary, comes back unchanged.
pub fn get_oid(id: &str) -> &str {
    match name_to_oid(id) {
        Some(oid) => oid,
        None => id,
    }
}

/// Resolve a symbolic name or dotted-decimal string to a parsed [`Oid`].
pub fn resolve_oid(id: &str) -> Option<Oid> {
    Oid::from_dot_string(get_oid(id)).ok()
}

/// Symbolic name for a parsed OID, falling back to its dotted form.
pub fn describe_oid(oid: &Oid) -> String {
    let dotted = oid.to_dot_string();
    match oid_to_name(&dotted) {
        Some(name) => name.to_string(),
        None => dotted,
    }
}
