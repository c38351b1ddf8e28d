//! Netscape SPKAC (signed public key and challenge) documents, as
//! produced by the HTML `<keygen>` element and `openssl spkac`.
//!
//! SPKAC payloads travel as a single base64 line, optionally prefixed
//! with `SPKAC=`, never with PEM armor.

use certkit_crypto::rsa::RsaPublicKey;
use certkit_types::X509Error;
use certkit_utils::asn1::Decoder;
use certkit_utils::base64;

use crate::encoding::{enc_bit_string, enc_ia5, enc_seq};

use super::certificate::{AlgorithmIdentifier, BitString, SubjectPublicKeyInfo};
use super::signing;
use super::verify::Verdict;

/// A parsed SPKAC document.
#[derive(Debug, Clone)]
pub struct SignedPublicKeyAndChallenge {
    /// DER of the full SignedPublicKeyAndChallenge SEQUENCE as loaded.
    pub raw: Vec<u8>,
    /// Exact byte span of the publicKeyAndChallenge, as signed.
    pub tbs_raw: Vec<u8>,
    pub subject_public_key_info: SubjectPublicKeyInfo,
    pub challenge: String,
    pub signature_algorithm: AlgorithmIdentifier,
    pub signature: BitString,
}

impl SignedPublicKeyAndChallenge {
    pub fn from_der(data: &[u8]) -> Result<SignedPublicKeyAndChallenge, X509Error> {
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
        let subject_public_key_info = SubjectPublicKeyInfo::from_decoder(&mut tbs)?;
        let challenge = tbs
            .read_string()
            .map_err(|e| X509Error::Asn1Error(e.to_string()))?;

        let signature_algorithm = AlgorithmIdentifier::from_decoder(&mut outer)?;
        let (sig_unused, sig_bytes) = outer
            .read_bit_string()
            .map_err(|e| X509Error::Asn1Error(e.to_string()))?;

        Ok(SignedPublicKeyAndChallenge {
            raw: data.to_vec(),
            tbs_raw,
            subject_public_key_info,
            challenge,
            signature_algorithm,
            signature: BitString {
                unused: sig_unused,
                bytes: sig_bytes.to_vec(),
            },
        })
    }

    /// Load from bytes of unknown framing: a base64 line with or without
    /// the `SPKAC=` prefix, or raw DER.
    pub fn load(input: &[u8]) -> Result<SignedPublicKeyAndChallenge, X509Error> {
        if let Ok(text) = std::str::from_utf8(input) {
            let body: String = text
                .trim()
                .strip_prefix("SPKAC=")
                .unwrap_or(text.trim())
                .chars()
                .filter(|c| !c.is_whitespace())
                .collect();
            if let Ok(der) = base64::decode(&body) {
                return Self::from_der(&der);
            }
        }
        Self::from_der(input)
    }

    /// Encode the publicKeyAndChallenge. The challenge is carried as an
    /// IA5String.
    pub(crate) fn encode_tbs(&self) -> Vec<u8> {
        let mut body = self.subject_public_key_info.to_der();
        body.extend_from_slice(&enc_ia5(&self.challenge));
        enc_seq(&body)
    }

    pub fn to_der(&self) -> Vec<u8> {
        let mut body = self.encode_tbs();
        body.extend_from_slice(&self.signature_algorithm.to_der());
        body.extend_from_slice(&enc_bit_string(
            self.signature.unused,
            &self.signature.bytes,
        ));
        enc_seq(&body)
    }

    /// Render as the single-line `SPKAC=` form with unwrapped base64.
    pub fn save(&self) -> String {
        format!("SPKAC={}", base64::encode(&self.to_der()))
    }

    /// Check the self-signature over the publicKeyAndChallenge with the
    /// document's own public key.
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
}
