//! Wire primitives for SSH detached signatures.
//!
//! Everything that touches raw bytes lives here: the checked buffer used to
//! read and write SSH wire fields, the allow-listed hash front-end, the
//! domain-separated signed-data layout, and the textual armor.
//!
//! Nothing in this crate knows about keys. Key material is handled by
//! `keysig-core`, which treats key and signature blobs as opaque strings
//! read through [`WireBuf`].
//!
#![deny(missing_docs)]

/// Textual BEGIN/END armor for signature blobs.
pub mod armor;
/// Checked, owned byte buffer for SSH wire fields.
pub mod buffer;
/// Allow-listed digest algorithms and message hashing.
pub mod hash;
/// Canonical bytes covered by a detached signature.
pub mod signed_data;

pub use armor::{armor, dearmor, ArmorError};
pub use buffer::{WireBuf, WireError};
pub use hash::{hash_buffer, hash_reader, Digest, HashAlg, HashError};
pub use signed_data::{build_signed_data, MAGIC_PREAMBLE};
