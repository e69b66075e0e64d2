use crate::keys::KeyError;
use keysig_wire::{HashError, WireError};
use thiserror::Error;

/// Errors raised while signing or verifying detached signatures.
#[derive(Error, Debug)]
pub enum SigError {
    /// Truncated or invalid field, bad magic, or trailing bytes.
    #[error("invalid signature format: {0}")]
    Format(String),
    /// The blob declares a version newer than this implementation knows.
    #[error("unsupported signature version {found} (highest supported {supported})")]
    UnsupportedVersion {
        /// Version found in the blob.
        found: u32,
        /// Highest version understood.
        supported: u32,
    },
    /// Hash or signature sub-algorithm not on the allow-list.
    #[error("unsupported algorithm: {0}")]
    UnsupportedAlgorithm(String),
    /// The signature was made for a different namespace.
    #[error("namespace mismatch: expected \"{expected}\", signature has \"{found}\"")]
    NamespaceMismatch {
        /// Namespace requested by the caller.
        expected: String,
        /// Namespace recorded in the signature.
        found: String,
    },
    /// A namespace that cannot be signed for (empty).
    #[error("invalid namespace")]
    InvalidNamespace,
    /// The cryptographic check did not pass.
    #[error("signature verification failed")]
    CryptoVerificationFailed,
    /// The signer failed to produce a signature.
    #[error("signing failed: {0}")]
    Signing(String),
    /// Reading the message failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<WireError> for SigError {
    fn from(e: WireError) -> Self {
        SigError::Format(e.to_string())
    }
}

impl From<HashError> for SigError {
    fn from(e: HashError) -> Self {
        match e {
            HashError::UnsupportedAlgorithm(name) => SigError::UnsupportedAlgorithm(name),
            HashError::Io(e) => SigError::Io(e),
        }
    }
}

impl From<KeyError> for SigError {
    fn from(e: KeyError) -> Self {
        match e {
            KeyError::UnsupportedKeyType(_) | KeyError::Malformed(_) | KeyError::InvalidKey(_) => {
                SigError::Format(e.to_string())
            }
            KeyError::UnsupportedSignatureAlgorithm(name) => SigError::UnsupportedAlgorithm(name),
            KeyError::AlgorithmMismatch { .. }
            | KeyError::VerificationFailed
            | KeyError::Certificate(_) => SigError::CryptoVerificationFailed,
            KeyError::Signing(reason) => SigError::Signing(reason),
        }
    }
}
