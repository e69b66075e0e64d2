use thiserror::Error;

/// Errors raised while evaluating an allowed-signers policy.
#[derive(Error, Debug)]
pub enum PolicyError {
    /// The policy source could not be read.
    #[error("I/O error reading policy file: {0}")]
    Io(#[from] std::io::Error),
    /// A line that had to be examined could not be parsed.
    #[error("line {line}: {reason}")]
    Parse {
        /// 1-based line number.
        line: usize,
        /// What was wrong with the line.
        reason: String,
    },
    /// No line authorizes the request.
    #[error("no matching allowed signer found")]
    KeyNotFound,
    /// The key appears in a revoked-keys list.
    #[error("key is revoked (line {line})")]
    Revoked {
        /// 1-based line number of the listing.
        line: usize,
    },
}
