//! Key collaborator: SSH public keys, raw signatures and signers.
//!
//! The signature engine only ever asks a key three things: what family it
//! belongs to, how to verify bytes against a raw signature, and what its wire
//! encoding is. Raw signatures in turn describe the algorithm that produced
//! them. Both capabilities live here so the engine never reaches into a
//! particular key type's byte layout.

mod certificate;
mod ed25519;
mod rsa;

pub use self::certificate::{CertType, Certificate, CertifiedSigner};
pub use self::ed25519::{Ed25519PublicKey, Ed25519Signer};
pub use self::rsa::{RsaPublicKey, RsaSigner};

use base64::engine::general_purpose::{STANDARD, STANDARD_NO_PAD};
use base64::Engine;
use keysig_wire::{WireBuf, WireError};
use sha2::{Digest as _, Sha256};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Signature algorithms accepted from RSA keys. Legacy `ssh-rsa` (SHA-1) is not.
pub const RSA_SIGNATURE_ALLOWLIST: [&str; 2] = ["rsa-sha2-512", "rsa-sha2-256"];

/// Errors raised by keys, certificates and signers.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum KeyError {
    /// Key type name not supported.
    #[error("unsupported key type: {0}")]
    UnsupportedKeyType(String),
    /// Key or signature blob is structurally invalid.
    #[error("malformed key material: {0}")]
    Malformed(String),
    /// Structurally valid encoding of an unusable key.
    #[error("invalid key: {0}")]
    InvalidKey(String),
    /// The signature names an algorithm that does not belong to the key.
    #[error("signature algorithm {signature} does not match {key} key")]
    AlgorithmMismatch {
        /// Key type name.
        key: &'static str,
        /// Algorithm named by the signature.
        signature: String,
    },
    /// The signature algorithm belongs to the key family but is not allowed.
    #[error("signature algorithm not allowed: {0}")]
    UnsupportedSignatureAlgorithm(String),
    /// The signature does not verify.
    #[error("signature does not verify")]
    VerificationFailed,
    /// A signer failed to produce a signature.
    #[error("signer failed: {0}")]
    Signing(String),
    /// A certificate failed the certificate-authority checks.
    #[error("certificate rejected: {0}")]
    Certificate(String),
}

impl From<WireError> for KeyError {
    fn from(e: WireError) -> Self {
        KeyError::Malformed(e.to_string())
    }
}

/// Broad key family, used for algorithm-confusion checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyFamily {
    /// Ed25519 keys.
    Ed25519,
    /// RSA keys; signatures self-describe their hash and padding.
    Rsa,
}

/// Opaque SSH signature blob: `string(algorithm) || string(signature bytes)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawSignature(Vec<u8>);

impl RawSignature {
    /// Encodes a signature from its algorithm name and raw bytes.
    pub fn new(algorithm: &str, signature: &[u8]) -> Result<Self, KeyError> {
        let mut buf = WireBuf::new();
        buf.put_string(algorithm.as_bytes())?;
        buf.put_string(signature)?;
        Ok(Self(buf.into_bytes()))
    }

    /// Wraps an already-encoded signature blob without inspecting it.
    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }

    /// Encoded blob.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Algorithm name the signature claims for itself.
    pub fn described_algorithm(&self) -> Result<String, KeyError> {
        let mut buf = WireBuf::from_slice(&self.0);
        Ok(buf.get_cstring()?)
    }

    /// Splits the blob into algorithm name and signature bytes, rejecting trailing data.
    pub(crate) fn parts(&self) -> Result<(String, Vec<u8>), KeyError> {
        let mut buf = WireBuf::from_slice(&self.0);
        let algorithm = buf.get_cstring()?;
        let signature = buf.get_string()?;
        buf.finish()?;
        Ok((algorithm, signature))
    }
}

/// Something that can produce SSH signatures, such as an in-memory key or an agent.
pub trait Signer {
    /// Public key that will be embedded in signatures.
    fn public_key(&self) -> PublicKey;

    /// Signs `data`, returning an encoded SSH signature blob.
    fn sign(&self, data: &[u8]) -> Result<RawSignature, KeyError>;
}

impl<S: Signer + ?Sized> Signer for Box<S> {
    fn public_key(&self) -> PublicKey {
        (**self).public_key()
    }

    fn sign(&self, data: &[u8]) -> Result<RawSignature, KeyError> {
        (**self).sign(data)
    }
}

/// SSH public key, possibly a certificate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PublicKey {
    /// `ssh-ed25519`
    Ed25519(Ed25519PublicKey),
    /// `ssh-rsa`
    Rsa(RsaPublicKey),
    /// `ssh-ed25519-cert-v01@openssh.com` or `ssh-rsa-cert-v01@openssh.com`
    Certificate(Box<Certificate>),
}

impl PublicKey {
    /// Decodes a key from its SSH wire blob. Trailing bytes are rejected.
    pub fn from_wire(blob: &[u8]) -> Result<Self, KeyError> {
        let mut buf = WireBuf::from_slice(blob);
        let key_type = buf.get_cstring()?;
        let key = match key_type.as_str() {
            Ed25519PublicKey::KEY_TYPE => PublicKey::Ed25519(Ed25519PublicKey::decode_body(&mut buf)?),
            RsaPublicKey::KEY_TYPE => PublicKey::Rsa(RsaPublicKey::decode_body(&mut buf)?),
            Certificate::ED25519_CERT_TYPE | Certificate::RSA_CERT_TYPE => {
                return Ok(PublicKey::Certificate(Box::new(Certificate::from_wire(blob)?)));
            }
            other => return Err(KeyError::UnsupportedKeyType(other.to_string())),
        };
        buf.finish()?;
        Ok(key)
    }

    /// SSH wire blob.
    pub fn to_wire(&self) -> Result<Vec<u8>, KeyError> {
        let mut buf = WireBuf::new();
        match self {
            PublicKey::Ed25519(key) => {
                buf.put_string(Ed25519PublicKey::KEY_TYPE.as_bytes())?;
                key.encode_body(&mut buf)?;
            }
            PublicKey::Rsa(key) => {
                buf.put_string(RsaPublicKey::KEY_TYPE.as_bytes())?;
                key.encode_body(&mut buf)?;
            }
            PublicKey::Certificate(cert) => return Ok(cert.as_bytes().to_vec()),
        }
        Ok(buf.into_bytes())
    }

    /// Parses the `authorized_keys` form: `type base64 [comment]`.
    pub fn from_openssh(text: &str) -> Result<Self, KeyError> {
        let mut tokens = text.split_ascii_whitespace();
        let key_type = tokens
            .next()
            .ok_or_else(|| KeyError::Malformed("empty key text".to_string()))?;
        if !is_known_key_type(key_type) {
            return Err(KeyError::UnsupportedKeyType(key_type.to_string()));
        }
        let encoded = tokens
            .next()
            .ok_or_else(|| KeyError::Malformed("missing key data".to_string()))?;
        let blob = STANDARD
            .decode(encoded)
            .map_err(|e| KeyError::Malformed(format!("key base64: {e}")))?;
        let key = PublicKey::from_wire(&blob)?;
        if key.key_type() != key_type {
            return Err(KeyError::Malformed(format!(
                "key type {} does not match encoded {}",
                key_type,
                key.key_type()
            )));
        }
        Ok(key)
    }

    /// Formats the key as `type base64`.
    pub fn to_openssh(&self) -> Result<String, KeyError> {
        Ok(format!("{} {}", self.key_type(), STANDARD.encode(self.to_wire()?)))
    }

    /// Key type name as it appears on the wire.
    pub fn key_type(&self) -> &'static str {
        match self {
            PublicKey::Ed25519(_) => Ed25519PublicKey::KEY_TYPE,
            PublicKey::Rsa(_) => RsaPublicKey::KEY_TYPE,
            PublicKey::Certificate(cert) => cert.key_type(),
        }
    }

    /// Family of the key; certificates report their subject key's family.
    pub fn family(&self) -> KeyFamily {
        match self {
            PublicKey::Ed25519(_) => KeyFamily::Ed25519,
            PublicKey::Rsa(_) => KeyFamily::Rsa,
            PublicKey::Certificate(cert) => cert.key().family(),
        }
    }

    /// Certificate details, if this key is a certificate.
    pub fn certificate(&self) -> Option<&Certificate> {
        match self {
            PublicKey::Certificate(cert) => Some(cert),
            _ => None,
        }
    }

    /// The key itself, or a certificate's subject key.
    pub fn plain_key(&self) -> &PublicKey {
        match self {
            PublicKey::Certificate(cert) => cert.key(),
            key => key,
        }
    }

    /// Short uppercase label used in human-readable output, e.g. `ED25519-CERT`.
    pub fn type_label(&self) -> &'static str {
        match self {
            PublicKey::Ed25519(_) => "ED25519",
            PublicKey::Rsa(_) => "RSA",
            PublicKey::Certificate(cert) => match cert.key() {
                PublicKey::Rsa(_) => "RSA-CERT",
                _ => "ED25519-CERT",
            },
        }
    }

    /// `SHA256:` fingerprint, unpadded base64 of the digest of the wire blob.
    ///
    /// Certificates are fingerprinted by their subject key.
    pub fn fingerprint(&self) -> Result<String, KeyError> {
        let digest = Sha256::digest(self.plain_key().to_wire()?);
        Ok(format!("SHA256:{}", STANDARD_NO_PAD.encode(digest)))
    }

    /// Verifies `message` against a raw signature made by this key.
    pub fn verify(&self, message: &[u8], signature: &RawSignature) -> Result<(), KeyError> {
        match self {
            PublicKey::Ed25519(key) => key.verify(message, signature),
            PublicKey::Rsa(key) => key.verify(message, signature),
            PublicKey::Certificate(cert) => cert.key().verify(message, signature),
        }
    }
}

impl FromStr for PublicKey {
    type Err = KeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PublicKey::from_openssh(s)
    }
}

impl fmt::Display for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.to_openssh() {
            Ok(text) => f.write_str(&text),
            Err(_) => f.write_str(self.key_type()),
        }
    }
}

/// Returns `true` for key type names this crate can parse.
pub fn is_known_key_type(name: &str) -> bool {
    matches!(
        name,
        Ed25519PublicKey::KEY_TYPE
            | RsaPublicKey::KEY_TYPE
            | Certificate::ED25519_CERT_TYPE
            | Certificate::RSA_CERT_TYPE
    )
}

/// Rejects deprecated sub-algorithms a key family would otherwise accept.
///
/// RSA signatures self-describe their hash and padding; only the SHA-2
/// variants are allowed. Other families are left to the key's own verifier.
pub fn check_signature_algorithm(
    key: &PublicKey,
    signature: &RawSignature,
) -> Result<(), KeyError> {
    if key.family() != KeyFamily::Rsa {
        return Ok(());
    }
    let algorithm = signature.described_algorithm()?;
    if RSA_SIGNATURE_ALLOWLIST.contains(&algorithm.as_str()) {
        Ok(())
    } else {
        Err(KeyError::UnsupportedSignatureAlgorithm(algorithm))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ed25519_key() -> PublicKey {
        Ed25519Signer::from_seed([3u8; 32]).public_key()
    }

    #[test]
    fn wire_round_trip_preserves_key() {
        let key = ed25519_key();
        let blob = key.to_wire().unwrap();
        assert_eq!(PublicKey::from_wire(&blob).unwrap(), key);
    }

    #[test]
    fn wire_rejects_trailing_bytes() {
        let mut blob = ed25519_key().to_wire().unwrap();
        blob.push(0);
        assert!(matches!(PublicKey::from_wire(&blob), Err(KeyError::Malformed(_))));
    }

    #[test]
    fn openssh_text_round_trip_with_comment() {
        let key = ed25519_key();
        let text = format!("{} user@host", key.to_openssh().unwrap());
        assert_eq!(text.parse::<PublicKey>().unwrap(), key);
    }

    #[test]
    fn openssh_text_rejects_type_mismatch() {
        let text = ed25519_key().to_openssh().unwrap();
        let forged = text.replacen("ssh-ed25519", "ssh-rsa", 1);
        assert!(matches!(PublicKey::from_openssh(&forged), Err(KeyError::Malformed(_))));
    }

    #[test]
    fn unknown_key_type_is_unsupported() {
        assert!(matches!(
            PublicKey::from_openssh("ssh-dss AAAA"),
            Err(KeyError::UnsupportedKeyType(t)) if t == "ssh-dss"
        ));
    }

    #[test]
    fn fingerprint_has_sha256_prefix_and_no_padding() {
        let fp = ed25519_key().fingerprint().unwrap();
        assert!(fp.starts_with("SHA256:"));
        assert!(!fp.ends_with('='));
        assert_eq!(fp.len(), "SHA256:".len() + 43);
    }

    #[test]
    fn described_algorithm_reads_leading_name() {
        let sig = RawSignature::new("rsa-sha2-256", &[1, 2, 3]).unwrap();
        assert_eq!(sig.described_algorithm().unwrap(), "rsa-sha2-256");
        assert!(RawSignature::from_bytes(vec![0, 0]).described_algorithm().is_err());
    }
}
