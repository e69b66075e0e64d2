//! Revoked-key lists.
//!
//! One public key per line in `type base64 [comment]` form; blank lines and
//! `#` comments are skipped. Keys match on their public parts, so listing a
//! plain key also revokes every certificate issued for it. A certificate is
//! revoked as well when the CA key that signed it is listed.

use crate::allowed_signers::scan_lines;
use crate::errors::PolicyError;
use keysig_core::PublicKey;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use tracing::debug;

/// Fails with [`PolicyError::Revoked`] if `key` is listed in the file at `path`.
pub fn check_revoked(path: impl AsRef<Path>, key: &PublicKey) -> Result<(), PolicyError> {
    let path = path.as_ref();
    debug!(path = %path.display(), "reading revoked keys");
    check_revoked_reader(BufReader::new(File::open(path)?), key)
}

/// [`check_revoked`] over any buffered source.
pub fn check_revoked_reader<R: BufRead>(reader: R, key: &PublicKey) -> Result<(), PolicyError> {
    let subject = key.plain_key();
    let ca = key
        .certificate()
        .map(|cert| cert.signature_key().plain_key());

    let mut revoked_at = None;
    scan_lines(reader, |line, text| {
        let text = text.trim_start();
        if text.is_empty() || text.starts_with('#') {
            return Ok(false);
        }
        let listed = PublicKey::from_openssh(text).map_err(|e| PolicyError::Parse {
            line,
            reason: format!("invalid revoked key: {e}"),
        })?;
        let listed = listed.plain_key();
        if listed == subject || Some(listed) == ca {
            revoked_at = Some(line);
            return Ok(true);
        }
        Ok(false)
    })?;

    match revoked_at {
        Some(line) => {
            debug!(line, fingerprint = %key.fingerprint().unwrap_or_default(), "key revoked");
            Err(PolicyError::Revoked { line })
        }
        None => Ok(()),
    }
}
