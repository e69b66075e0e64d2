//! Certificate fixtures for tests. Not part of the stable API.

use crate::keys::{Certificate, KeyError, PublicKey, Signer};
use keysig_wire::WireBuf;

/// Template for a test certificate.
#[derive(Debug, Clone)]
pub struct CertTemplate {
    /// Wire certificate type (1 user, 2 host).
    pub cert_type: u32,
    /// Principals listed in the certificate.
    pub principals: Vec<String>,
    /// Start of validity.
    pub valid_after: u64,
    /// End of validity (exclusive).
    pub valid_before: u64,
    /// Critical options as (name, data) pairs.
    pub critical_options: Vec<(String, Vec<u8>)>,
}

impl Default for CertTemplate {
    fn default() -> Self {
        Self {
            cert_type: 1,
            principals: Vec::new(),
            valid_after: 0,
            valid_before: u64::MAX,
            critical_options: Vec::new(),
        }
    }
}

impl CertTemplate {
    /// Template for a user certificate naming `principals`.
    pub fn user(principals: &[&str]) -> Self {
        Self {
            principals: principals.iter().map(|p| p.to_string()).collect(),
            ..Self::default()
        }
    }

    /// Encodes and signs a certificate for `subject` with `ca`.
    pub fn issue(&self, ca: &dyn Signer, subject: &PublicKey) -> Result<Certificate, KeyError> {
        let type_name = match subject {
            PublicKey::Ed25519(_) => Certificate::ED25519_CERT_TYPE,
            PublicKey::Rsa(_) => Certificate::RSA_CERT_TYPE,
            PublicKey::Certificate(_) => {
                return Err(KeyError::InvalidKey("cannot certify a certificate".to_string()))
            }
        };
        let mut subject_wire = WireBuf::from(subject.to_wire()?);
        subject_wire.get_string()?;

        let mut buf = WireBuf::new();
        buf.put_string(type_name.as_bytes())?;
        buf.put_string(&[0x42; 32])?;
        buf.put_bytes(subject_wire.peek());
        buf.put_u64(1);
        buf.put_u32(self.cert_type);
        buf.put_string(b"test-certificate")?;

        let mut principals = WireBuf::new();
        for principal in &self.principals {
            principals.put_string(principal.as_bytes())?;
        }
        buf.put_string(principals.as_ref())?;
        buf.put_u64(self.valid_after);
        buf.put_u64(self.valid_before);

        let mut critical = WireBuf::new();
        for (name, data) in &self.critical_options {
            critical.put_string(name.as_bytes())?;
            critical.put_string(data)?;
        }
        buf.put_string(critical.as_ref())?;
        buf.put_string(&[])?;
        buf.put_string(&[])?;
        buf.put_string(&ca.public_key().to_wire()?)?;

        let signature = ca.sign(buf.as_ref())?;
        buf.put_string(signature.as_bytes())?;
        Certificate::from_wire(&buf.into_bytes())
    }
}
