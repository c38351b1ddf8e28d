//! URL, hostname, and validity-window checks.
//!
//! Name matching follows the HTTP-over-TLS rules of RFC 2818 §3.1: a
//! subjectAltName extension fixes the identity, and only without one
//! does the subject's commonName apply. A `*` in a name stands for a
//! run of characters inside one domain label, so `*.a.com` matches
//! `foo.a.com` but not `bar.foo.a.com`, and `f*.com` matches `foo.com`
//! but not `bar.com`.

use super::certificate::Certificate;
use super::extensions::{find_extension, ExtensionValue, GeneralName};

/// Whether the certificate vouches for the host named in `url`.
///
/// With a subjectAltName present the certificate can only match
/// through it: dNSName entries match the host directly, and iPAddress
/// entries match only a host shaped like a dotted-quad IPv4 address.
/// Without one, the subject's first commonName is matched instead,
/// wildcards included. Comparisons are byte-for-byte, so names that
/// differ in case do not match.
pub fn validate_url(cert: &Certificate, url: &str) -> bool {
    let Some(host) = url_host(url) else {
        return false;
    };

    if let Some(ext) = find_extension(&cert.extensions, "id-ce-subjectAltName") {
        let ExtensionValue::SubjectAltName(names) = &ext.value else {
            return false;
        };
        return names.iter().any(|name| match name {
            GeneralName::DnsName(pattern) => wildcard_match(pattern, host),
            GeneralName::IpAddress(_) => match name.ip_string() {
                Some(addr) => is_dotted_quad(host) && wildcard_match(&addr, host),
                None => false,
            },
            _ => false,
        });
    }

    match cert.subject.get_dn_prop("id-at-commonName").first() {
        Some(cn) => wildcard_match(cn, host),
        None => false,
    }
}

/// Whether `when` falls inside the certificate's validity window.
///
/// `notBefore` is included and `notAfter` is not: a certificate is no
/// longer valid at the exact moment it expires.
pub fn validate_date(cert: &Certificate, when: i64) -> bool {
    cert.validity.contains(when)
}

/// The host component of `url`, or `None` when it has no authority.
fn url_host(url: &str) -> Option<&str> {
    let (_, rest) = url.split_once("://")?;
    let authority = rest.split(['/', '?', '#']).next()?;
    let host = authority
        .rsplit_once('@')
        .map_or(authority, |(_, host)| host);
    let host = match host.strip_prefix('[') {
        Some(bracketed) => bracketed.split(']').next()?,
        None => host.split(':').next()?,
    };
    (!host.is_empty()).then_some(host)
}

/// Matches `pattern` against `host`, every `*` standing for a possibly
/// empty run of characters other than `.`.
fn wildcard_match(pattern: &str, host: &str) -> bool {
    let Some((prefix, rest)) = pattern.split_once('*') else {
        return pattern == host;
    };
    let Some(after) = host.strip_prefix(prefix) else {
        return false;
    };
    // The run may stop anywhere short of the next label break.
    let bound = after.find('.').unwrap_or(after.len());
    std::iter::once(0)
        .chain(after[..bound].char_indices().map(|(i, c)| i + c.len_utf8()))
        .any(|taken| wildcard_match(rest, &after[taken..]))
}

/// Four groups of one to three digits separated by dots.
fn is_dotted_quad(host: &str) -> bool {
    let mut groups = 0;
    for group in host.split('.') {
        if group.is_empty() || group.len() > 3 || !group.bytes().all(|b| b.is_ascii_digit()) {
            return false;
        }
        groups += 1;
    }
    groups == 4
}

#[cfg(test)]
mod tests {
    use super::super::extensions::remove_extension;
    use super::super::fixtures;
    use super::*;

    fn leaf() -> Certificate {
        Certificate::from_pem(fixtures::LEAF_PEM).unwrap()
    }

    /// The leaf with its subjectAltName stripped, leaving only the CN.
    fn leaf_without_san() -> Certificate {
        let mut cert = leaf();
        assert!(remove_extension(&mut cert.extensions, "id-ce-subjectAltName"));
        cert
    }

    #[test]
    fn test_url_matches_san_dns_name() {
        let cert = leaf();
        assert!(validate_url(&cert, "https://leaf.certkit.test/index.html"));
        assert!(validate_url(&cert, "http://leaf.certkit.test"));
        assert!(!validate_url(&cert, "https://other.certkit.test/"));
        // Byte-for-byte comparison: a case difference is a mismatch.
        assert!(!validate_url(&cert, "https://LEAF.certkit.test/"));
    }

    #[test]
    fn test_wildcard_spans_exactly_one_label() {
        let cert = leaf();
        assert!(validate_url(&cert, "https://foo.alt.certkit.test/"));
        assert!(!validate_url(&cert, "https://bar.foo.alt.certkit.test/"));
        assert!(!validate_url(&cert, "https://alt.certkit.test/"));
    }

    #[test]
    fn test_wildcard_match_rules() {
        assert!(wildcard_match("*.example.com", "foo.example.com"));
        assert!(!wildcard_match("*.example.com", "bar.foo.example.com"));
        assert!(!wildcard_match("*.example.com", "example.com"));
        // A fragment wildcard stays inside its label.
        assert!(wildcard_match("f*.com", "foo.com"));
        assert!(!wildcard_match("f*.com", "bar.com"));
        assert!(wildcard_match("f*o.example.com", "foo.example.com"));
        assert!(!wildcard_match("f*.com", "foo.example.com"));
    }

    #[test]
    fn test_ip_host_needs_ip_entry() {
        let cert = leaf();
        assert!(validate_url(&cert, "http://192.0.2.10/"));
        assert!(!validate_url(&cert, "http://192.0.2.11/"));
    }

    #[test]
    fn test_dotted_quad_gate() {
        assert!(is_dotted_quad("192.0.2.10"));
        assert!(!is_dotted_quad("::1"));
        assert!(!is_dotted_quad("192.0.2"));
        assert!(!is_dotted_quad("192.0.2.10.5"));
        assert!(!is_dotted_quad("1921.0.2.10"));
        assert!(!is_dotted_quad("192.0.2."));
    }

    #[test]
    fn test_san_presence_sidelines_common_name() {
        let mut cert = leaf();
        cert.subject.remove_dn_prop("id-at-commonName");
        cert.subject.set_dn_prop("id-at-commonName", "other.example.org");
        // The CN matches, but the subjectAltName decides.
        assert!(!validate_url(&cert, "https://other.example.org/"));
    }

    #[test]
    fn test_common_name_fallback_without_san() {
        let cert = leaf_without_san();
        assert!(validate_url(&cert, "https://leaf.certkit.test/"));
        assert!(!validate_url(&cert, "https://other.certkit.test/"));

        let mut cert = leaf_without_san();
        cert.subject.remove_dn_prop("id-at-commonName");
        cert.subject.set_dn_prop("id-at-commonName", "*.certkit.test");
        assert!(validate_url(&cert, "https://foo.certkit.test/"));
        assert!(!validate_url(&cert, "https://certkit.test/"));

        cert.subject.remove_dn_prop("id-at-commonName");
        assert!(!validate_url(&cert, "https://foo.certkit.test/"));
    }

    #[test]
    fn test_url_host_extraction() {
        assert_eq!(
            url_host("https://user:pw@host.example:8443/p?q#f"),
            Some("host.example")
        );
        assert_eq!(url_host("http://[2001:db8::1]:8080/x"), Some("2001:db8::1"));
        assert_eq!(url_host("http://host.example?q"), Some("host.example"));
        assert_eq!(url_host("http:///x"), None);
        assert_eq!(url_host("leaf.certkit.test"), None);
        assert_eq!(url_host("mailto:user@host.example"), None);
    }

    #[test]
    fn test_validity_window_excludes_expiry() {
        let cert = leaf();
        assert!(validate_date(&cert, fixtures::LEAF_NOT_BEFORE));
        assert!(validate_date(&cert, fixtures::LEAF_NOT_BEFORE + 86_400));
        assert!(!validate_date(&cert, fixtures::LEAF_NOT_BEFORE - 1));

        // The expiry instant itself is already outside the window.
        assert!(validate_date(&cert, fixtures::LEAF_NOT_AFTER - 1));
        assert!(!validate_date(&cert, fixtures::LEAF_NOT_AFTER));
    }
}
