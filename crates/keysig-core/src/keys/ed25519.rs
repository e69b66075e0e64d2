use super::{KeyError, PublicKey, RawSignature, Signer};
use ed25519_dalek::{Signer as _, SigningKey, Verifier as _, VerifyingKey};
use keysig_wire::WireBuf;

/// Ed25519 public key (32 bytes).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Ed25519PublicKey([u8; 32]);

impl Ed25519PublicKey {
    /// Key type and signature algorithm name.
    pub const KEY_TYPE: &'static str = "ssh-ed25519";

    /// Creates a key from its compressed point, rejecting invalid points.
    pub fn from_bytes(bytes: [u8; 32]) -> Result<Self, KeyError> {
        VerifyingKey::from_bytes(&bytes)
            .map_err(|_| KeyError::InvalidKey("not a valid ed25519 point".to_string()))?;
        Ok(Self(bytes))
    }

    /// Raw key bytes.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    pub(crate) fn decode_body(buf: &mut WireBuf) -> Result<Self, KeyError> {
        let raw = buf.get_string()?;
        let bytes: [u8; 32] = raw.as_slice().try_into().map_err(|_| {
            KeyError::Malformed(format!("ed25519 key is {} bytes, expected 32", raw.len()))
        })?;
        Self::from_bytes(bytes)
    }

    pub(crate) fn encode_body(&self, buf: &mut WireBuf) -> Result<(), KeyError> {
        buf.put_string(&self.0)?;
        Ok(())
    }

    /// Verifies an `ssh-ed25519` signature.
    pub fn verify(&self, message: &[u8], signature: &RawSignature) -> Result<(), KeyError> {
        let (algorithm, raw) = signature.parts()?;
        if algorithm != Self::KEY_TYPE {
            return Err(KeyError::AlgorithmMismatch {
                key: Self::KEY_TYPE,
                signature: algorithm,
            });
        }
        let raw: [u8; 64] = raw.as_slice().try_into().map_err(|_| {
            KeyError::Malformed(format!("ed25519 signature is {} bytes, expected 64", raw.len()))
        })?;
        let verifying_key = VerifyingKey::from_bytes(&self.0)
            .map_err(|_| KeyError::InvalidKey("not a valid ed25519 point".to_string()))?;
        verifying_key
            .verify(message, &ed25519_dalek::Signature::from_bytes(&raw))
            .map_err(|_| KeyError::VerificationFailed)
    }
}

/// In-memory Ed25519 signer.
pub struct Ed25519Signer {
    signing_key: SigningKey,
}

impl Ed25519Signer {
    /// Creates a signer from a 32-byte secret seed.
    pub fn from_seed(seed: [u8; 32]) -> Self {
        Self {
            signing_key: SigningKey::from_bytes(&seed),
        }
    }

    /// Wraps an existing signing key.
    pub fn from_signing_key(signing_key: SigningKey) -> Self {
        Self { signing_key }
    }
}

impl Signer for Ed25519Signer {
    fn public_key(&self) -> PublicKey {
        PublicKey::Ed25519(Ed25519PublicKey(self.signing_key.verifying_key().to_bytes()))
    }

    fn sign(&self, data: &[u8]) -> Result<RawSignature, KeyError> {
        let signature = self.signing_key.sign(data);
        RawSignature::new(Ed25519PublicKey::KEY_TYPE, &signature.to_bytes())
    }
}
