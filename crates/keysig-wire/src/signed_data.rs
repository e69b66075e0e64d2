//! Canonical bytes covered by a detached signature.
//!
//! The key never signs the message itself. It signs:
//!
//! ```text
//! "SSHSIG" || string(namespace) || string(reserved) || string(hash_alg) || string(digest)
//! ```
//!
//! The preamble keeps these signatures distinct from SSH authentication and
//! host-key signatures. Binding the namespace and hash algorithm name means a
//! signature made for one usage context or digest cannot be replayed in another.

use crate::buffer::{WireBuf, WireError};
use crate::hash::HashAlg;

/// Six-byte preamble shared by signature blobs and signed data: `b"SSHSIG"`.
pub const MAGIC_PREAMBLE: &[u8; 6] = b"SSHSIG";

/// Builds the exact byte sequence handed to the key's sign/verify primitive.
///
/// The reserved field is always written empty.
pub fn build_signed_data(
    namespace: &str,
    hash_alg: HashAlg,
    digest: &[u8],
) -> Result<Vec<u8>, WireError> {
    let mut buf = WireBuf::new();
    buf.put_bytes(MAGIC_PREAMBLE);
    buf.put_string(namespace.as_bytes())?;
    buf.put_string(&[])?;
    buf.put_string(hash_alg.as_str().as_bytes())?;
    buf.put_string(digest)?;
    Ok(buf.into_bytes())
}
