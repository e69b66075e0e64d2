use super::{
    check_signature_algorithm, Ed25519PublicKey, KeyError, PublicKey, RawSignature, RsaPublicKey,
    Signer,
};
use keysig_wire::WireBuf;

/// Critical options that only restrict interactive sessions and carry no
/// meaning for detached signatures.
const SESSION_ONLY_CRITICAL_OPTIONS: [&str; 2] = ["force-command", "source-address"];

/// Certificate purpose.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CertType {
    /// User certificate (wire value 1).
    User,
    /// Host certificate (wire value 2).
    Host,
}

impl CertType {
    fn from_u32(value: u32) -> Result<Self, KeyError> {
        match value {
            1 => Ok(CertType::User),
            2 => Ok(CertType::Host),
            other => Err(KeyError::Malformed(format!("unknown certificate type {other}"))),
        }
    }
}

/// OpenSSH certificate (`*-cert-v01@openssh.com`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Certificate {
    blob: Vec<u8>,
    signed_len: usize,
    key_type: &'static str,
    nonce: Vec<u8>,
    key: PublicKey,
    serial: u64,
    cert_type: CertType,
    key_id: String,
    principals: Vec<String>,
    valid_after: u64,
    valid_before: u64,
    critical_options: Vec<(String, Vec<u8>)>,
    extensions: Vec<(String, Vec<u8>)>,
    signature_key: PublicKey,
    signature: RawSignature,
}

impl Certificate {
    /// Ed25519 certificate type name.
    pub const ED25519_CERT_TYPE: &'static str = "ssh-ed25519-cert-v01@openssh.com";
    /// RSA certificate type name.
    pub const RSA_CERT_TYPE: &'static str = "ssh-rsa-cert-v01@openssh.com";

    /// Parses a certificate from its full wire blob.
    ///
    /// The CA signature is not checked here; see [`Certificate::check_authority`].
    pub fn from_wire(blob: &[u8]) -> Result<Self, KeyError> {
        let mut buf = WireBuf::from_slice(blob);
        let type_name = buf.get_cstring()?;
        let nonce = buf.get_string()?;
        let (key_type, key) = match type_name.as_str() {
            Self::ED25519_CERT_TYPE => (
                Self::ED25519_CERT_TYPE,
                PublicKey::Ed25519(Ed25519PublicKey::decode_body(&mut buf)?),
            ),
            Self::RSA_CERT_TYPE => (
                Self::RSA_CERT_TYPE,
                PublicKey::Rsa(RsaPublicKey::decode_body(&mut buf)?),
            ),
            other => return Err(KeyError::UnsupportedKeyType(other.to_string())),
        };
        let serial = buf.get_u64()?;
        let cert_type = CertType::from_u32(buf.get_u32()?)?;
        let key_id = buf.get_utf8()?;

        let mut packed = WireBuf::from(buf.get_string()?);
        let mut principals = Vec::new();
        while !packed.is_empty() {
            principals.push(packed.get_utf8()?);
        }

        let valid_after = buf.get_u64()?;
        let valid_before = buf.get_u64()?;
        let critical_options = read_option_list(buf.get_string()?)?;
        let extensions = read_option_list(buf.get_string()?)?;
        let _reserved = buf.get_string()?;

        let signature_key = PublicKey::from_wire(&buf.get_string()?)?;
        if signature_key.certificate().is_some() {
            return Err(KeyError::Malformed(
                "certificate signed by another certificate".to_string(),
            ));
        }
        let signed_len = buf.position();
        let signature = RawSignature::from_bytes(buf.get_string()?);
        buf.finish()?;

        Ok(Self {
            blob: blob.to_vec(),
            signed_len,
            key_type,
            nonce,
            key,
            serial,
            cert_type,
            key_id,
            principals,
            valid_after,
            valid_before,
            critical_options,
            extensions,
            signature_key,
            signature,
        })
    }

    /// Full wire blob.
    pub fn as_bytes(&self) -> &[u8] {
        &self.blob
    }

    /// Certificate type name.
    pub fn key_type(&self) -> &'static str {
        self.key_type
    }

    /// Certified (subject) key.
    pub fn key(&self) -> &PublicKey {
        &self.key
    }

    /// Key of the certificate authority that signed this certificate.
    pub fn signature_key(&self) -> &PublicKey {
        &self.signature_key
    }

    /// CA-assigned serial number.
    pub fn serial(&self) -> u64 {
        self.serial
    }

    /// Certificate purpose.
    pub fn cert_type(&self) -> CertType {
        self.cert_type
    }

    /// Free-form key identifier.
    pub fn key_id(&self) -> &str {
        &self.key_id
    }

    /// Principals the certificate is valid for.
    pub fn principals(&self) -> &[String] {
        &self.principals
    }

    /// Start of validity, seconds since the epoch.
    pub fn valid_after(&self) -> u64 {
        self.valid_after
    }

    /// End of validity (exclusive), seconds since the epoch.
    pub fn valid_before(&self) -> u64 {
        self.valid_before
    }

    /// Critical option names.
    pub fn critical_options(&self) -> impl Iterator<Item = &str> {
        self.critical_options.iter().map(|(name, _)| name.as_str())
    }

    /// Extension names.
    pub fn extensions(&self) -> impl Iterator<Item = &str> {
        self.extensions.iter().map(|(name, _)| name.as_str())
    }

    /// Nonce chosen by the CA.
    pub fn nonce(&self) -> &[u8] {
        &self.nonce
    }

    /// Certificate-authority validity check for signing use.
    ///
    /// Passes when the CA signature verifies, the certificate is a user
    /// certificate valid at `verify_time`, it names `principal` exactly, and
    /// every critical option is understood.
    pub fn check_authority(&self, principal: &str, verify_time: u64) -> Result<(), KeyError> {
        check_signature_algorithm(&self.signature_key, &self.signature)?;
        self.signature_key
            .verify(&self.blob[..self.signed_len], &self.signature)
            .map_err(|e| KeyError::Certificate(format!("CA signature invalid: {e}")))?;

        if self.cert_type != CertType::User {
            return Err(KeyError::Certificate("not a user certificate".to_string()));
        }
        self.check_validity(verify_time)?;
        if self.principals.is_empty() {
            return Err(KeyError::Certificate(
                "certificate lacks a principal list".to_string(),
            ));
        }
        if !self.principals.iter().any(|p| p == principal) {
            return Err(KeyError::Certificate(format!(
                "principal \"{principal}\" not in certificate"
            )));
        }
        if let Some(name) = self
            .critical_options()
            .find(|name| !SESSION_ONLY_CRITICAL_OPTIONS.contains(name))
        {
            return Err(KeyError::Certificate(format!(
                "unsupported critical option \"{name}\""
            )));
        }
        Ok(())
    }

    /// Checks `valid_after <= verify_time < valid_before`.
    pub fn check_validity(&self, verify_time: u64) -> Result<(), KeyError> {
        if verify_time < self.valid_after {
            return Err(KeyError::Certificate("certificate not yet valid".to_string()));
        }
        if verify_time >= self.valid_before {
            return Err(KeyError::Certificate("certificate expired".to_string()));
        }
        Ok(())
    }
}

fn read_option_list(raw: Vec<u8>) -> Result<Vec<(String, Vec<u8>)>, KeyError> {
    let mut buf = WireBuf::from(raw);
    let mut options = Vec::new();
    while !buf.is_empty() {
        let name = buf.get_cstring()?;
        let data = buf.get_string()?;
        options.push((name, data));
    }
    Ok(options)
}

/// Signer that presents a certificate in place of its plain public key.
pub struct CertifiedSigner<S> {
    certificate: Certificate,
    signer: S,
}

impl<S: Signer> CertifiedSigner<S> {
    /// Pairs a signer with a certificate issued for its key.
    pub fn new(certificate: Certificate, signer: S) -> Result<Self, KeyError> {
        if certificate.key() != &signer.public_key() {
            return Err(KeyError::InvalidKey(
                "certificate was not issued for this signing key".to_string(),
            ));
        }
        Ok(Self {
            certificate,
            signer,
        })
    }
}

impl<S: Signer> Signer for CertifiedSigner<S> {
    fn public_key(&self) -> PublicKey {
        PublicKey::Certificate(Box::new(self.certificate.clone()))
    }

    fn sign(&self, data: &[u8]) -> Result<RawSignature, KeyError> {
        self.signer.sign(data)
    }
}
