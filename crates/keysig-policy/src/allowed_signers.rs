//! Allowed-signers file scanning.
//!
//! Each non-comment line reads
//!
//! ```text
//! principal-patterns [options] keytype base64-key [comment]
//! ```
//!
//! Lines are tried in order; the first one that authorizes the request wins.

use crate::errors::PolicyError;
use crate::options::{parse_options, SignerOptions};
use crate::pattern::match_pattern_list;
use crate::time;
use keysig_core::{Certificate, PublicKey};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use tracing::{debug, trace};

/// One parsed allowed-signers line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AllowedSignersEntry {
    /// 1-based line number in the source.
    pub line: usize,
    /// Principal pattern list, quotes removed.
    pub principals: String,
    /// Options clause.
    pub options: SignerOptions,
    /// Trusted key, or CA key when `options.cert_authority` is set.
    pub key: PublicKey,
}

impl AllowedSignersEntry {
    /// Parses a line. Returns `Ok(None)` for blank lines, comments, and lines
    /// whose principal patterns do not admit `required_principal`.
    ///
    /// The principal check happens before the key is looked at, so a bad key
    /// on a line for somebody else never fails the scan.
    pub fn parse(
        line: usize,
        text: &str,
        required_principal: Option<&str>,
    ) -> Result<Option<Self>, PolicyError> {
        let text = text.trim_start();
        if text.is_empty() || text.starts_with('#') {
            return Ok(None);
        }
        let parse_error = |reason: String| PolicyError::Parse { line, reason };

        let (principals, rest) = split_principals(text)
            .ok_or_else(|| parse_error("unterminated quoted principals".to_string()))?;
        if principals.is_empty() {
            return Err(parse_error("empty principals".to_string()));
        }
        if let Some(principal) = required_principal {
            if !match_pattern_list(principal, principals) {
                trace!(line, principal, "principal not admitted");
                return Ok(None);
            }
        }

        let (options, key) = match PublicKey::from_openssh(rest) {
            Ok(key) => (SignerOptions::default(), key),
            Err(_) => {
                let (clause, rest) = split_options(rest)
                    .ok_or_else(|| parse_error("unterminated quote in options".to_string()))?;
                if rest.is_empty() {
                    return Err(parse_error("missing key".to_string()));
                }
                let key = PublicKey::from_openssh(rest)
                    .map_err(|e| parse_error(format!("invalid key: {e}")))?;
                let options = parse_options(clause)
                    .map_err(|e| parse_error(format!("bad key options: {e}")))?;
                (options, key)
            }
        };

        Ok(Some(Self {
            line,
            principals: principals.to_string(),
            options,
            key,
        }))
    }

    /// Whether this line lets `signer` sign as `principal` in `namespace` at `verify_time`.
    pub fn authorizes(
        &self,
        signer: &PublicKey,
        principal: &str,
        namespace: &str,
        verify_time: u64,
    ) -> bool {
        if self.options.cert_authority {
            let Some(cert) = self.issued_certificate(signer) else {
                trace!(line = self.line, "key not certified by this authority");
                return false;
            };
            if let Err(e) = cert.check_authority(principal, verify_time) {
                debug!(line = self.line, error = %e, "certificate rejected");
                return false;
            }
        } else if &self.key != signer {
            trace!(line = self.line, "key differs");
            return false;
        }

        if let Some(namespaces) = &self.options.namespaces {
            if !match_pattern_list(namespace, namespaces) {
                debug!(line = self.line, namespace, "namespace not allowed");
                return false;
            }
        }
        if !self.options.is_valid_at(verify_time) {
            debug!(line = self.line, verify_time, "key outside validity window");
            return false;
        }
        true
    }

    /// Principals this line grants `signer` at `verify_time`, joined with commas.
    ///
    /// For a plain key this is the line's pattern list. For an authority it is
    /// the certificate's principals that the pattern list admits and that pass
    /// the certificate checks.
    pub fn granted_principals(&self, signer: &PublicKey, verify_time: u64) -> Option<String> {
        if !self.options.is_valid_at(verify_time) {
            return None;
        }
        if !self.options.cert_authority {
            return (&self.key == signer).then(|| self.principals.clone());
        }
        let cert = self.issued_certificate(signer)?;
        let admitted: Vec<&str> = cert
            .principals()
            .iter()
            .map(String::as_str)
            .filter(|p| match_pattern_list(p, &self.principals))
            .filter(|p| cert.check_authority(p, verify_time).is_ok())
            .collect();
        (!admitted.is_empty()).then(|| admitted.join(","))
    }

    fn issued_certificate<'a>(&self, signer: &'a PublicKey) -> Option<&'a Certificate> {
        signer
            .certificate()
            .filter(|cert| cert.signature_key() == &self.key)
    }
}

/// Splits off the principal list, which may be double-quoted.
fn split_principals(text: &str) -> Option<(&str, &str)> {
    if let Some(quoted) = text.strip_prefix('"') {
        let end = quoted.find('"')?;
        return Some((&quoted[..end], quoted[end + 1..].trim_start()));
    }
    let end = text.find(|c: char| c == ' ' || c == '\t').unwrap_or(text.len());
    Some((&text[..end], text[end..].trim_start()))
}

/// Splits off the options clause: everything up to the first unquoted blank.
fn split_options(text: &str) -> Option<(&str, &str)> {
    let bytes = text.as_bytes();
    let mut quoted = false;
    let mut i = 0;
    while i < bytes.len() && (quoted || (bytes[i] != b' ' && bytes[i] != b'\t')) {
        if bytes[i] == b'\\' && bytes.get(i + 1) == Some(&b'"') {
            i += 1;
        } else if bytes[i] == b'"' {
            quoted = !quoted;
        }
        i += 1;
    }
    if quoted {
        return None;
    }
    Some((&text[..i], text[i..].trim_start()))
}

fn open(path: &Path) -> Result<BufReader<File>, PolicyError> {
    debug!(path = %path.display(), "reading allowed signers");
    Ok(BufReader::new(File::open(path)?))
}

/// Feeds each line of `reader` to `visit` with its 1-based number, stopping
/// once `visit` returns `true`.
///
/// Lines are read as bytes. Invalid UTF-8 is replaced rather than failing the
/// scan, so it can only affect the line it sits on.
pub(crate) fn scan_lines<R: BufRead>(
    mut reader: R,
    mut visit: impl FnMut(usize, &str) -> Result<bool, PolicyError>,
) -> Result<bool, PolicyError> {
    let mut raw = Vec::new();
    let mut line = 0;
    loop {
        raw.clear();
        if reader.read_until(b'\n', &mut raw)? == 0 {
            return Ok(false);
        }
        line += 1;
        let decoded = String::from_utf8_lossy(&raw);
        let mut text: &str = &decoded;
        text = text.strip_suffix('\n').unwrap_or(text);
        text = text.strip_suffix('\r').unwrap_or(text);
        if visit(line, text)? {
            return Ok(true);
        }
    }
}

/// Scans `reader`, yielding every parsed entry that admits `required_principal`.
fn for_each_entry<R: BufRead>(
    reader: R,
    required_principal: Option<&str>,
    mut visit: impl FnMut(AllowedSignersEntry) -> bool,
) -> Result<bool, PolicyError> {
    scan_lines(reader, |line, text| {
        match AllowedSignersEntry::parse(line, text, required_principal)? {
            Some(entry) => Ok(visit(entry)),
            None => Ok(false),
        }
    })
}

/// Checks that `signer` may sign as `principal` in `namespace`, now.
pub fn check_allowed_signers(
    path: impl AsRef<Path>,
    signer: &PublicKey,
    principal: &str,
    namespace: &str,
) -> Result<(), PolicyError> {
    check_allowed_signers_at(path, signer, principal, namespace, time::now())
}

/// Checks that `signer` may sign as `principal` in `namespace` at `verify_time`.
pub fn check_allowed_signers_at(
    path: impl AsRef<Path>,
    signer: &PublicKey,
    principal: &str,
    namespace: &str,
    verify_time: u64,
) -> Result<(), PolicyError> {
    let reader = open(path.as_ref())?;
    check_allowed_signers_reader(reader, signer, principal, namespace, verify_time)
}

/// [`check_allowed_signers_at`] over any buffered source.
pub fn check_allowed_signers_reader<R: BufRead>(
    reader: R,
    signer: &PublicKey,
    principal: &str,
    namespace: &str,
    verify_time: u64,
) -> Result<(), PolicyError> {
    let found = for_each_entry(reader, Some(principal), |entry| {
        let ok = entry.authorizes(signer, principal, namespace, verify_time);
        if ok {
            debug!(line = entry.line, principal, namespace, "signer authorized");
        }
        ok
    })?;
    if found {
        Ok(())
    } else {
        Err(PolicyError::KeyNotFound)
    }
}

/// Principals `signer` is allowed to sign as at `verify_time`, one string per authorizing line.
pub fn find_principals(
    path: impl AsRef<Path>,
    signer: &PublicKey,
    verify_time: u64,
) -> Result<Vec<String>, PolicyError> {
    find_principals_reader(open(path.as_ref())?, signer, verify_time)
}

/// [`find_principals`] over any buffered source.
pub fn find_principals_reader<R: BufRead>(
    reader: R,
    signer: &PublicKey,
    verify_time: u64,
) -> Result<Vec<String>, PolicyError> {
    let mut found = Vec::new();
    for_each_entry(reader, None, |entry| {
        if let Some(principals) = entry.granted_principals(signer, verify_time) {
            found.push(principals);
        }
        false
    })?;
    non_empty(found)
}

/// Principal pattern lists of every line that admits `principal`.
pub fn match_principals(
    path: impl AsRef<Path>,
    principal: &str,
) -> Result<Vec<String>, PolicyError> {
    match_principals_reader(open(path.as_ref())?, principal)
}

/// [`match_principals`] over any buffered source.
pub fn match_principals_reader<R: BufRead>(
    reader: R,
    principal: &str,
) -> Result<Vec<String>, PolicyError> {
    let mut found = Vec::new();
    for_each_entry(reader, Some(principal), |entry| {
        found.push(entry.principals);
        false
    })?;
    non_empty(found)
}

fn non_empty(found: Vec<String>) -> Result<Vec<String>, PolicyError> {
    if found.is_empty() {
        Err(PolicyError::KeyNotFound)
    } else {
        Ok(found)
    }
}
