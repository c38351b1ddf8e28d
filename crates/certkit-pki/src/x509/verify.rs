//! Signature validation against a trust store.
//!
//! A [`Validator`] holds trust anchors and policy. Validation never
//! mutates the validator, so one value can serve any number of
//! concurrent checks. Certificates resolve their signer by scanning
//! the store for a subject matching the issuer name, refined by the
//! subjectKeyIdentifier / authorityKeyIdentifier pairing, with a
//! self-signed fallback outside CA-only mode and at most one caIssuers
//! fetch hop per level when a fetcher is installed. CRLs resolve
//! against the store alone.

use std::io::{Read, Write};
use std::net::{TcpStream, ToSocketAddrs};
use std::time::Duration;

use certkit_types::X509Error;

use super::certificate::Certificate;
use super::crl::CertificateList;
use super::extensions::{
    find_extension, AuthorityKeyIdentifier, Extension, ExtensionValue, GeneralName,
};
use super::name::Name;
use super::oids;
use super::signing;

// ---------------------------------------------------------------------------
// Verdict
// ---------------------------------------------------------------------------

/// Outcome of a signature check.
///
/// `Indeterminate` means the check could not be carried out at all,
/// such as a signature suite or key type outside the supported set.
/// That is a different statement from `Rejected`, which reports a
/// signature that was checked and found wrong or a signer that could
/// not be resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Verified,
    Rejected,
    Indeterminate,
}

impl Verdict {
    pub(crate) fn from_check(outcome: Option<bool>) -> Verdict {
        match outcome {
            Some(true) => Verdict::Verified,
            Some(false) => Verdict::Rejected,
            None => Verdict::Indeterminate,
        }
    }

    /// `true` only for [`Verdict::Verified`].
    pub fn is_verified(self) -> bool {
        matches!(self, Verdict::Verified)
    }
}

// ---------------------------------------------------------------------------
// caIssuers fetching
// ---------------------------------------------------------------------------

/// Retrieves the bytes behind a caIssuers URI (RFC 5280 §4.2.2.1).
///
/// Validation only fetches when a fetcher is installed on the
/// [`Validator`]. Offline deployments leave it out and a missing
/// issuer simply stays unresolved.
pub trait CaIssuerFetcher: Send + Sync {
    fn fetch(&self, url: &str) -> Result<Vec<u8>, X509Error>;
}

/// Plain-HTTP fetcher with a hard timeout on connect, read, and write.
///
/// Only `http://` URIs are honored. Any other scheme, any status other
/// than 200, and any timeout is an error, which validation treats the
/// same as an absent issuer.
pub struct HttpFetcher {
    timeout: Duration,
}

impl HttpFetcher {
    pub fn new(timeout: Duration) -> HttpFetcher {
        HttpFetcher { timeout }
    }
}

impl CaIssuerFetcher for HttpFetcher {
    fn fetch(&self, url: &str) -> Result<Vec<u8>, X509Error> {
        let rest = url
            .strip_prefix("http://")
            .ok_or_else(|| X509Error::Fetch(format!("unsupported URL scheme: {url}")))?;
        let (authority, path) = match rest.find('/') {
            Some(pos) => (&rest[..pos], &rest[pos..]),
            None => (rest, "/"),
        };
        let (host, port) = match authority.rsplit_once(':') {
            Some((host, port)) => {
                let port: u16 = port
                    .parse()
                    .map_err(|_| X509Error::Fetch(format!("bad port in URL: {url}")))?;
                (host, port)
            }
            None => (authority, 80),
        };

        let addr = (host, port)
            .to_socket_addrs()
            .map_err(|e| X509Error::Fetch(e.to_string()))?
            .next()
            .ok_or_else(|| X509Error::Fetch(format!("no address for {host}")))?;
        let mut stream = TcpStream::connect_timeout(&addr, self.timeout)
            .map_err(|e| X509Error::Fetch(e.to_string()))?;
        stream
            .set_read_timeout(Some(self.timeout))
            .map_err(|e| X509Error::Fetch(e.to_string()))?;
        stream
            .set_write_timeout(Some(self.timeout))
            .map_err(|e| X509Error::Fetch(e.to_string()))?;

        let request = format!("GET {path} HTTP/1.0\r\nHost: {host}\r\nConnection: close\r\n\r\n");
        stream
            .write_all(request.as_bytes())
            .map_err(|e| X509Error::Fetch(e.to_string()))?;

        let mut response = Vec::new();
        stream
            .read_to_end(&mut response)
            .map_err(|e| X509Error::Fetch(e.to_string()))?;

        let header_end = response
            .windows(4)
            .position(|w| w == b"\r\n\r\n")
            .ok_or_else(|| X509Error::Fetch("malformed HTTP response".into()))?;
        let head = std::str::from_utf8(&response[..header_end])
            .map_err(|_| X509Error::Fetch("malformed HTTP response".into()))?;
        let code = head
            .lines()
            .next()
            .and_then(|status| status.split_whitespace().nth(1))
            .unwrap_or("");
        if code != "200" {
            return Err(X509Error::Fetch(format!("HTTP status {code:?} from {url}")));
        }
        Ok(response[header_end + 4..].to_vec())
    }
}

// ---------------------------------------------------------------------------
// Validator
// ---------------------------------------------------------------------------

/// Trust anchors plus validation policy for certificates and CRLs.
///
/// The store is read-only during validation. A fetched intermediate
/// extends a working set local to the call, never the validator
/// itself, so a shared `Validator` behaves identically for every
/// caller.
pub struct Validator {
    trusted: Vec<Certificate>,
    recursion_limit: i32,
    fetcher: Option<Box<dyn CaIssuerFetcher>>,
}

impl Default for Validator {
    fn default() -> Validator {
        Validator::new()
    }
}

impl Validator {
    /// An empty store with a recursion limit of 5 and no fetcher.
    pub fn new() -> Validator {
        Validator {
            trusted: Vec::new(),
            recursion_limit: 5,
            fetcher: None,
        }
    }

    /// Adds a trust anchor.
    pub fn add_ca(&mut self, ca: Certificate) -> &mut Self {
        self.trusted.push(ca);
        self
    }

    /// Parses one PEM certificate and adds it as a trust anchor.
    pub fn add_ca_pem(&mut self, pem: &str) -> Result<&mut Self, X509Error> {
        let ca = Certificate::from_pem(pem)?;
        Ok(self.add_ca(ca))
    }

    /// Caps how deep fetched-issuer validation may recurse.
    ///
    /// A validation entered at a depth equal to the limit is rejected
    /// before any work, so 0 rejects everything. A negative limit
    /// never matches any depth and removes the cap, leaving
    /// termination to the fetched chain itself.
    pub fn set_recursion_limit(&mut self, limit: i32) -> &mut Self {
        self.recursion_limit = limit;
        self
    }

    /// Installs the collaborator used to chase caIssuers URIs.
    pub fn set_fetcher(&mut self, fetcher: Box<dyn CaIssuerFetcher>) -> &mut Self {
        self.fetcher = Some(fetcher);
        self
    }

    /// The trust anchors currently loaded.
    pub fn trusted(&self) -> &[Certificate] {
        &self.trusted
    }

    /// Checks `cert`'s signature against the trust store.
    ///
    /// The signer is resolved inside the store first. With `ca_only`
    /// false, a certificate whose issuer and subject agree may also
    /// vouch for itself. When neither yields a signer and a fetcher is
    /// installed, one caIssuers hop is attempted: the fetched
    /// certificate must validate in its own right, one recursion level
    /// down, before it joins the working set and resolution is retried
    /// once. Anything still unresolved is rejected, never
    /// indeterminate. Indeterminate is reserved for a resolved signer
    /// whose signature suite cannot be checked.
    pub fn validate_certificate(&self, cert: &Certificate, ca_only: bool) -> Verdict {
        let mut fetched = Vec::new();
        self.validate_certificate_at(cert, ca_only, &mut fetched, 0)
    }

    /// Checks a CRL's signature against the trust store.
    ///
    /// CRLs never vouch for themselves and no fetch hop applies: the
    /// issuing CA has to be in the store already.
    pub fn validate_crl(&self, crl: &CertificateList) -> Verdict {
        let aki = authority_key_identifier(&crl.crl_extensions);
        let signer = self
            .trusted
            .iter()
            .find(|ca| issuer_matches(&crl.issuer, aki, ca, true));
        let Some(signer) = signer else {
            return Verdict::Rejected;
        };
        Verdict::from_check(signing::check_signature(
            &signer.subject_public_key_info,
            &crl.signature_algorithm.oid,
            &crl.tbs_raw,
            &crl.signature.bytes,
        ))
    }

    /// Builds the chain from `cert` toward a root using the store.
    ///
    /// The walk stops when no stored CA matches the current issuer, or
    /// when the match is the current certificate itself (a self-signed
    /// root already in hand). The returned list runs leaf first.
    pub fn chain(&self, cert: &Certificate) -> Vec<Certificate> {
        let mut chain = vec![cert.clone()];
        loop {
            let current = &chain[chain.len() - 1];
            let aki = authority_key_identifier(&current.extensions);
            let found = self
                .trusted
                .iter()
                .find(|ca| issuer_matches(&current.issuer, aki, ca, false));
            let Some(ca) = found else {
                break;
            };
            if ca.raw == current.raw {
                break;
            }
            let ca = ca.clone();
            chain.push(ca);
        }
        chain
    }

    fn validate_certificate_at(
        &self,
        cert: &Certificate,
        ca_only: bool,
        fetched: &mut Vec<Certificate>,
        depth: i32,
    ) -> Verdict {
        if depth == self.recursion_limit {
            return Verdict::Rejected;
        }

        if let Some(signer) = self.resolve_signer(cert, ca_only, fetched) {
            return self.check_certificate(cert, &signer);
        }

        // One fetch hop, then a single retry against the extended set.
        let Some(parent) = self.fetch_issuer(cert, ca_only, fetched, depth) else {
            return Verdict::Rejected;
        };
        fetched.push(parent);
        match self.resolve_signer(cert, ca_only, fetched) {
            Some(signer) => self.check_certificate(cert, &signer),
            None => Verdict::Rejected,
        }
    }

    /// Finds the certificate whose key should have produced `cert`'s
    /// signature, or `None` when nothing in the working set qualifies.
    /// A store match wins over the self-signed fallback.
    fn resolve_signer(
        &self,
        cert: &Certificate,
        ca_only: bool,
        fetched: &[Certificate],
    ) -> Option<Certificate> {
        let aki = authority_key_identifier(&cert.extensions);
        for ca in self.trusted.iter().chain(fetched) {
            if issuer_matches(&cert.issuer, aki, ca, true) {
                return Some(ca.clone());
            }
        }
        if !ca_only && issuer_matches(&cert.issuer, aki, cert, false) {
            return Some(cert.clone());
        }
        None
    }

    /// Pulls the certificate named by the caIssuers entry of the
    /// authorityInfoAccess extension. The fetched certificate has to
    /// prove itself, one recursion level down, before it is admitted.
    fn fetch_issuer(
        &self,
        cert: &Certificate,
        ca_only: bool,
        fetched: &mut Vec<Certificate>,
        depth: i32,
    ) -> Option<Certificate> {
        let fetcher = self.fetcher.as_ref()?;
        let url = ca_issuers_url(&cert.extensions)?;
        let body = fetcher.fetch(url).ok()?;
        let parent = Certificate::load(&body).ok()?;
        match self.validate_certificate_at(&parent, ca_only, fetched, depth + 1) {
            Verdict::Verified => Some(parent),
            _ => None,
        }
    }

    fn check_certificate(&self, cert: &Certificate, signer: &Certificate) -> Verdict {
        Verdict::from_check(signing::check_signature(
            &signer.subject_public_key_info,
            &cert.signature_algorithm.oid,
            &cert.tbs_raw,
            &cert.signature.bytes,
        ))
    }
}

// ---------------------------------------------------------------------------
// Issuer resolution
// ---------------------------------------------------------------------------

/// Decides whether `candidate` is the issuer that a certificate or CRL
/// names. Certificate validation, CRL validation, and chain building
/// all resolve issuers through this one function.
///
/// The candidate's subject must equal `issuer`. When the signed
/// document carries an authorityKeyIdentifier and the candidate
/// publishes a subjectKeyIdentifier, the AKI's keyIdentifier must be
/// present and equal to it; an AKI without a keyIdentifier disqualifies
/// any candidate that does publish an SKI. With `match_serial`, an
/// authorityCertSerialNumber in the AKI must also equal the candidate's
/// serial number. The self-signed fallback passes `match_serial` false,
/// since a certificate's own serial is not its issuer's.
fn issuer_matches(
    issuer: &Name,
    aki: Option<&AuthorityKeyIdentifier>,
    candidate: &Certificate,
    match_serial: bool,
) -> bool {
    if *issuer != candidate.subject {
        return false;
    }
    let Some(aki) = aki else {
        return true;
    };
    if let Some(ski) = subject_key_identifier(&candidate.extensions) {
        match &aki.key_identifier {
            Some(kid) if kid.as_slice() == ski => {}
            _ => return false,
        }
    }
    if match_serial {
        if let Some(serial) = &aki.authority_cert_serial_number {
            if *serial != candidate.serial_number {
                return false;
            }
        }
    }
    true
}

fn subject_key_identifier(extensions: &[Extension]) -> Option<&[u8]> {
    match &find_extension(extensions, "id-ce-subjectKeyIdentifier")?.value {
        ExtensionValue::SubjectKeyIdentifier(ski) => Some(ski),
        _ => None,
    }
}

fn authority_key_identifier(extensions: &[Extension]) -> Option<&AuthorityKeyIdentifier> {
    match &find_extension(extensions, "id-ce-authorityKeyIdentifier")?.value {
        ExtensionValue::AuthorityKeyIdentifier(aki) => Some(aki),
        _ => None,
    }
}

/// The first caIssuers URI in the authorityInfoAccess extension.
fn ca_issuers_url(extensions: &[Extension]) -> Option<&str> {
    let ext = find_extension(extensions, "id-pe-authorityInfoAccess")?;
    let ExtensionValue::AuthorityInfoAccess(descs) = &ext.value else {
        return None;
    };
    let ca_issuers = oids::resolve_oid("id-ad-caIssuers")?;
    descs.iter().find_map(|desc| match &desc.access_location {
        GeneralName::Uri(url) if desc.access_method == ca_issuers => Some(url.as_str()),
        _ => None,
    })
}
