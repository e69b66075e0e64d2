//! Sign and verify orchestration.
//!
//! Signing: hash → build signed data → external signer → encode.
//! Verification: peek hash algorithm → hash → decode → namespace check →
//! algorithm check → external verifier over the rebuilt signed data.

use crate::errors::SigError;
use crate::keys::{check_signature_algorithm, PublicKey, Signer};
use crate::signature::{peek_hash_alg, SshSig};
use keysig_wire::{build_signed_data, hash_buffer, hash_reader, Digest, HashAlg};
use std::io::Read;
use tracing::{debug, trace};

/// Signs an in-memory message, returning the binary signature blob.
pub fn sign<S: Signer + ?Sized>(
    signer: &S,
    hash_alg: HashAlg,
    message: &[u8],
    namespace: &str,
) -> Result<Vec<u8>, SigError> {
    sign_digest(signer, &hash_buffer(message, hash_alg), namespace)
}

/// Signs the contents of a reader, hashed in fixed-size chunks.
pub fn sign_reader<S: Signer + ?Sized, R: Read>(
    signer: &S,
    hash_alg: HashAlg,
    reader: R,
    namespace: &str,
) -> Result<Vec<u8>, SigError> {
    let digest = hash_reader(reader, hash_alg)?;
    sign_digest(signer, &digest, namespace)
}

fn sign_digest<S: Signer + ?Sized>(
    signer: &S,
    digest: &Digest,
    namespace: &str,
) -> Result<Vec<u8>, SigError> {
    if namespace.is_empty() {
        return Err(SigError::InvalidNamespace);
    }
    let signed_data = build_signed_data(namespace, digest.alg(), digest.as_bytes())?;
    let public_key = signer.public_key();
    let signature = signer.sign(&signed_data)?;

    // A signer that answers with a disallowed algorithm produces a blob no
    // verifier will accept.
    check_signature_algorithm(&public_key, &signature)?;

    trace!(
        key_type = public_key.key_type(),
        hash_alg = %digest.alg(),
        namespace,
        "signed message"
    );
    SshSig::new(public_key, namespace, digest.alg(), signature).to_bytes()
}

/// Verifies a blob over an in-memory message. Returns the signer's key.
///
/// The returned key has only been shown to hold the private half; whether it
/// is *authorized* is a separate policy decision.
pub fn verify(blob: &[u8], message: &[u8], namespace: &str) -> Result<PublicKey, SigError> {
    let hash_alg = peek_hash_alg(blob)?;
    verify_digest(blob, &hash_buffer(message, hash_alg), namespace)
}

/// Verifies a blob over the contents of a reader.
pub fn verify_reader<R: Read>(
    blob: &[u8],
    reader: R,
    namespace: &str,
) -> Result<PublicKey, SigError> {
    let hash_alg = peek_hash_alg(blob)?;
    let digest = hash_reader(reader, hash_alg)?;
    verify_digest(blob, &digest, namespace)
}

fn verify_digest(blob: &[u8], digest: &Digest, namespace: &str) -> Result<PublicKey, SigError> {
    let sig = SshSig::from_bytes(blob)?;

    if sig.namespace() != namespace {
        debug!(expected = namespace, found = sig.namespace(), "namespace mismatch");
        return Err(SigError::NamespaceMismatch {
            expected: namespace.to_string(),
            found: sig.namespace().to_string(),
        });
    }

    if let Err(e) = check_signature_algorithm(sig.public_key(), sig.signature()) {
        debug!(error = %e, "signature algorithm rejected");
        return Err(e.into());
    }

    let signed_data = build_signed_data(namespace, sig.hash_alg(), digest.as_bytes())?;
    if let Err(e) = sig.public_key().verify(&signed_data, sig.signature()) {
        debug!(error = %e, key_type = sig.public_key().key_type(), "signature rejected");
        return Err(e.into());
    }

    trace!(key_type = sig.public_key().key_type(), namespace, "signature verified");
    Ok(sig.into_public_key())
}

/// Returns the key embedded in a blob without verifying anything.
pub fn get_public_key(blob: &[u8]) -> Result<PublicKey, SigError> {
    Ok(SshSig::from_bytes(blob)?.into_public_key())
}
