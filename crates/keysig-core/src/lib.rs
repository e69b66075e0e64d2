//! SSH detached signatures.
//!
//! This crate provides:
//! - The key collaborator: Ed25519 and RSA public keys, OpenSSH certificates,
//!   raw signatures and the [`Signer`] trait
//! - The binary signature blob codec ([`SshSig`])
//! - The sign and verify engine
//!
//! Core invariants:
//! - Every signature is bound to a namespace and a hash algorithm
//! - Decoding accounts for every byte; trailing data is an error
//! - RSA signatures must use a SHA-2 sub-algorithm
//! - Verification proves possession of a key, never authorization
//!
#![deny(missing_docs)]

/// Sign and verify orchestration.
pub mod engine;
/// Error types for signing and verification.
pub mod errors;
/// Public keys, certificates, raw signatures and signers.
pub mod keys;
/// Signature blob codec.
pub mod signature;
#[cfg(any(test, feature = "test-util"))]
#[doc(hidden)]
pub mod testutil;

pub use engine::{get_public_key, sign, sign_reader, verify, verify_reader};
pub use errors::SigError;
pub use keys::{
    CertType, Certificate, CertifiedSigner, Ed25519PublicKey, Ed25519Signer, KeyError, KeyFamily,
    PublicKey, RawSignature, RsaPublicKey, RsaSigner, Signer,
};
pub use keysig_wire::{armor, dearmor, ArmorError, HashAlg};
pub use signature::{peek_hash_alg, SshSig, SIG_VERSION};
