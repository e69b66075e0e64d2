use super::{KeyError, PublicKey, RawSignature, Signer};
use ::rsa::traits::PublicKeyParts;
use ::rsa::{BigUint, Pkcs1v15Sign, RsaPrivateKey};
use keysig_wire::WireBuf;
use sha2::{Digest as _, Sha256, Sha512};

/// Smallest modulus accepted, in bits.
pub const MIN_MODULUS_BITS: usize = 1024;

/// Largest modulus accepted, in bits. Matches OpenSSH's limit.
pub const MAX_MODULUS_BITS: usize = 16384;

/// RSA public key.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RsaPublicKey {
    inner: ::rsa::RsaPublicKey,
}

impl RsaPublicKey {
    /// Key type name; also the legacy SHA-1 signature algorithm name.
    pub const KEY_TYPE: &'static str = "ssh-rsa";
    /// PKCS#1 v1.5 with SHA-256.
    pub const SHA256_ALG: &'static str = "rsa-sha2-256";
    /// PKCS#1 v1.5 with SHA-512.
    pub const SHA512_ALG: &'static str = "rsa-sha2-512";

    /// Wraps a key, enforcing [`MIN_MODULUS_BITS`].
    pub fn new(inner: ::rsa::RsaPublicKey) -> Result<Self, KeyError> {
        let bits = inner.size() * 8;
        if bits < MIN_MODULUS_BITS {
            return Err(KeyError::InvalidKey(format!(
                "RSA modulus of {bits} bits is below {MIN_MODULUS_BITS}"
            )));
        }
        Ok(Self { inner })
    }

    /// Modulus size in bits.
    pub fn bits(&self) -> usize {
        self.inner.size() * 8
    }

    pub(crate) fn decode_body(buf: &mut WireBuf) -> Result<Self, KeyError> {
        let e = buf.get_mpint_unsigned()?;
        let n = buf.get_mpint_unsigned()?;
        let inner = ::rsa::RsaPublicKey::new_with_max_size(
            BigUint::from_bytes_be(&n),
            BigUint::from_bytes_be(&e),
            MAX_MODULUS_BITS,
        )
        .map_err(|e| KeyError::InvalidKey(e.to_string()))?;
        Self::new(inner)
    }

    pub(crate) fn encode_body(&self, buf: &mut WireBuf) -> Result<(), KeyError> {
        buf.put_mpint_unsigned(&self.inner.e().to_bytes_be())?;
        buf.put_mpint_unsigned(&self.inner.n().to_bytes_be())?;
        Ok(())
    }

    /// Verifies an `rsa-sha2-256` or `rsa-sha2-512` signature.
    ///
    /// Legacy `ssh-rsa` signatures are refused outright.
    pub fn verify(&self, message: &[u8], signature: &RawSignature) -> Result<(), KeyError> {
        let (algorithm, raw) = signature.parts()?;
        let (scheme, hashed) = match algorithm.as_str() {
            Self::SHA256_ALG => (Pkcs1v15Sign::new::<Sha256>(), Sha256::digest(message).to_vec()),
            Self::SHA512_ALG => (Pkcs1v15Sign::new::<Sha512>(), Sha512::digest(message).to_vec()),
            Self::KEY_TYPE => return Err(KeyError::UnsupportedSignatureAlgorithm(algorithm)),
            _ => {
                return Err(KeyError::AlgorithmMismatch {
                    key: Self::KEY_TYPE,
                    signature: algorithm,
                })
            }
        };
        let size = self.inner.size();
        if raw.len() > size {
            return Err(KeyError::Malformed(format!(
                "RSA signature of {} bytes exceeds modulus size {}",
                raw.len(),
                size
            )));
        }
        // Signatures shorter than the modulus are left-padded with zeros.
        let mut padded = vec![0u8; size - raw.len()];
        padded.extend_from_slice(&raw);
        self.inner
            .verify(scheme, &hashed, &padded)
            .map_err(|_| KeyError::VerificationFailed)
    }
}

/// In-memory RSA signer. Always signs with `rsa-sha2-512`.
pub struct RsaSigner {
    inner: RsaPrivateKey,
}

impl RsaSigner {
    /// Wraps a private key, enforcing [`MIN_MODULUS_BITS`].
    pub fn new(inner: RsaPrivateKey) -> Result<Self, KeyError> {
        RsaPublicKey::new(inner.to_public_key())?;
        Ok(Self { inner })
    }
}

impl Signer for RsaSigner {
    fn public_key(&self) -> PublicKey {
        PublicKey::Rsa(RsaPublicKey {
            inner: self.inner.to_public_key(),
        })
    }

    fn sign(&self, data: &[u8]) -> Result<RawSignature, KeyError> {
        let hashed = Sha512::digest(data);
        let signature = self
            .inner
            .sign_with_rng(&mut rand::thread_rng(), Pkcs1v15Sign::new::<Sha512>(), &hashed)
            .map_err(|e| KeyError::Signing(e.to_string()))?;
        RawSignature::new(RsaPublicKey::SHA512_ALG, &signature)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn signer() -> RsaSigner {
        let key = RsaPrivateKey::new(&mut rand::thread_rng(), 1024).unwrap();
        RsaSigner::new(key).unwrap()
    }

    #[test]
    fn sign_verify_and_wire_round_trip() {
        let signer = signer();
        let public = signer.public_key();
        let sig = signer.sign(b"payload").unwrap();
        assert_eq!(sig.described_algorithm().unwrap(), "rsa-sha2-512");
        assert!(public.verify(b"payload", &sig).is_ok());

        let decoded = PublicKey::from_wire(&public.to_wire().unwrap()).unwrap();
        assert_eq!(decoded, public);
        assert_eq!(decoded.verify(b"tampered", &sig), Err(KeyError::VerificationFailed));
    }

    #[test]
    fn legacy_sha1_signature_is_refused() {
        let signer = signer();
        let (_, raw) = signer.sign(b"payload").unwrap().parts().unwrap();
        let legacy = RawSignature::new("ssh-rsa", &raw).unwrap();
        assert!(matches!(
            signer.public_key().verify(b"payload", &legacy),
            Err(KeyError::UnsupportedSignatureAlgorithm(_))
        ));
    }

    fn key_blob(modulus_bytes: usize) -> Vec<u8> {
        let mut modulus = vec![0u8; modulus_bytes];
        modulus[0] = 0xc5;
        modulus[modulus_bytes - 1] = 0x01;
        let mut buf = WireBuf::new();
        buf.put_string(RsaPublicKey::KEY_TYPE.as_bytes()).unwrap();
        buf.put_mpint_unsigned(&[0x01, 0x00, 0x01]).unwrap();
        buf.put_mpint_unsigned(&modulus).unwrap();
        buf.into_bytes()
    }

    #[test]
    fn decodes_8192_bit_key() {
        let key = PublicKey::from_wire(&key_blob(1024)).unwrap();
        match &key {
            PublicKey::Rsa(rsa) => assert_eq!(rsa.bits(), 8192),
            other => panic!("expected an RSA key, got {other:?}"),
        }
        assert_eq!(PublicKey::from_wire(&key.to_wire().unwrap()).unwrap(), key);
    }

    #[test]
    fn modulus_above_16384_bits_is_rejected() {
        assert!(matches!(
            PublicKey::from_wire(&key_blob(2049)),
            Err(KeyError::InvalidKey(_))
        ));
    }

    #[test]
    fn small_modulus_is_rejected() {
        let key = RsaPrivateKey::new(&mut rand::thread_rng(), 512).unwrap();
        assert!(matches!(RsaSigner::new(key), Err(KeyError::InvalidKey(_))));
    }
}
