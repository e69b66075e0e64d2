//! Binary signature blob codec.
//!
//! ```text
//! "SSHSIG" || uint32(version) || string(public key) || string(namespace)
//!          || string(reserved) || string(hash_alg) || string(signature)
//! ```

use crate::errors::SigError;
use crate::keys::{PublicKey, RawSignature};
use keysig_wire::{HashAlg, WireBuf, MAGIC_PREAMBLE};

/// Highest blob version understood: `1`.
pub const SIG_VERSION: u32 = 1;

/// Decoded signature blob. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SshSig {
    version: u32,
    public_key: PublicKey,
    namespace: String,
    reserved: Vec<u8>,
    hash_alg: HashAlg,
    signature: RawSignature,
}

impl SshSig {
    /// Builds a current-version signature with an empty reserved field.
    pub fn new(
        public_key: PublicKey,
        namespace: impl Into<String>,
        hash_alg: HashAlg,
        signature: RawSignature,
    ) -> Self {
        Self {
            version: SIG_VERSION,
            public_key,
            namespace: namespace.into(),
            reserved: Vec::new(),
            hash_alg,
            signature,
        }
    }

    /// Blob version.
    pub fn version(&self) -> u32 {
        self.version
    }

    /// Signer's public key.
    pub fn public_key(&self) -> &PublicKey {
        &self.public_key
    }

    /// Consumes the signature, returning the signer's public key.
    pub fn into_public_key(self) -> PublicKey {
        self.public_key
    }

    /// Namespace the signature was made for.
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Reserved field; empty for every signature produced today.
    pub fn reserved(&self) -> &[u8] {
        &self.reserved
    }

    /// Digest algorithm applied to the message.
    pub fn hash_alg(&self) -> HashAlg {
        self.hash_alg
    }

    /// Raw signature from the key primitive.
    pub fn signature(&self) -> &RawSignature {
        &self.signature
    }

    /// Serializes the blob.
    pub fn to_bytes(&self) -> Result<Vec<u8>, SigError> {
        let mut buf = WireBuf::new();
        buf.put_bytes(MAGIC_PREAMBLE);
        buf.put_u32(self.version);
        buf.put_string(&self.public_key.to_wire()?)?;
        buf.put_string(self.namespace.as_bytes())?;
        buf.put_string(&self.reserved)?;
        buf.put_string(self.hash_alg.as_str().as_bytes())?;
        buf.put_string(self.signature.as_bytes())?;
        Ok(buf.into_bytes())
    }

    /// Parses a blob. Every byte must be accounted for.
    pub fn from_bytes(blob: &[u8]) -> Result<Self, SigError> {
        let mut buf = WireBuf::from_slice(blob);
        let (version, key_blob, namespace) = read_header(&mut buf)?;
        let reserved = buf.get_string()?;
        let hash_alg: HashAlg = buf.get_cstring()?.parse()?;
        let signature = RawSignature::from_bytes(buf.get_string()?);
        buf.finish()?;

        let public_key = PublicKey::from_wire(&key_blob)?;
        Ok(Self {
            version,
            public_key,
            namespace,
            reserved,
            hash_alg,
            signature,
        })
    }
}

/// Reads the hash algorithm without touching the signature field, so the
/// message can be hashed before the rest of the blob is parsed.
pub fn peek_hash_alg(blob: &[u8]) -> Result<HashAlg, SigError> {
    let mut buf = WireBuf::from_slice(blob);
    read_header(&mut buf)?;
    buf.get_string()?;
    Ok(buf.get_cstring()?.parse()?)
}

fn read_header(buf: &mut WireBuf) -> Result<(u32, Vec<u8>, String), SigError> {
    if buf.get_bytes(MAGIC_PREAMBLE.len())? != MAGIC_PREAMBLE {
        return Err(SigError::Format("invalid magic preamble".to_string()));
    }
    let version = buf.get_u32()?;
    if version > SIG_VERSION {
        return Err(SigError::UnsupportedVersion {
            found: version,
            supported: SIG_VERSION,
        });
    }
    let key_blob = buf.get_string()?;
    let namespace = buf.get_utf8()?;
    Ok((version, key_blob, namespace))
}
