//! Allowed-signers authorization for SSH detached signatures.
//!
//! Verification only proves that a signature was made by some key. This
//! crate decides whether that key may sign as a given principal in a given
//! namespace, according to an allowed-signers file.
//!
#![deny(missing_docs)]

/// Allowed-signers file scanning.
pub mod allowed_signers;
/// Error types for policy evaluation.
pub mod errors;
/// Per-line options clause.
pub mod options;
/// Glob and pattern-list matching.
pub mod pattern;
/// Revoked-key lists.
pub mod revoked;
/// Absolute time parsing.
pub mod time;

pub use allowed_signers::{
    check_allowed_signers, check_allowed_signers_at, check_allowed_signers_reader,
    find_principals, find_principals_reader, match_principals, match_principals_reader,
    AllowedSignersEntry,
};
pub use errors::PolicyError;
pub use options::{parse_options, OptionsError, SignerOptions};
pub use pattern::{match_pattern, match_pattern_list};
pub use revoked::{check_revoked, check_revoked_reader};
pub use time::{parse_absolute_time, TimeError};
