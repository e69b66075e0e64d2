//! `-O option` clauses shared by the signature subcommands.

use keysig_core::HashAlg;
use keysig_policy::{parse_absolute_time, TimeError};
use thiserror::Error;

/// Errors raised while processing `-O` options.
#[derive(Error, Debug)]
pub enum SigOptionError {
    /// Option not accepted by this subcommand.
    #[error("Invalid option \"{0}\"")]
    Invalid(String),
    /// `hashalg=` names an algorithm outside the allow-list.
    #[error("Unsupported hash algorithm \"{0}\"")]
    HashAlg(String),
    /// `verify-time=` could not be parsed.
    #[error("Invalid \"verify-time\" option: {0}")]
    VerifyTime(#[from] TimeError),
}

/// Which options a subcommand accepts.
#[derive(Debug, Clone, Copy, Default)]
pub struct Accepts {
    pub hashalg: bool,
    pub verify_time: bool,
    pub print_pubkey: bool,
}

/// Parsed `-O` options.
#[derive(Debug, Clone, Default)]
pub struct SigOptions {
    pub hash_alg: Option<HashAlg>,
    pub verify_time: Option<u64>,
    pub print_pubkey: bool,
}

impl SigOptions {
    /// Parses `opts`, rejecting anything `accepts` does not allow.
    ///
    /// Option names are case-insensitive.
    pub fn parse(opts: &[String], accepts: Accepts) -> Result<Self, SigOptionError> {
        let mut parsed = SigOptions::default();
        for opt in opts {
            if let Some(value) = strip_prefix_ignore_case(opt, "hashalg=").filter(|_| accepts.hashalg) {
                let alg = value
                    .parse()
                    .map_err(|_| SigOptionError::HashAlg(value.to_string()))?;
                parsed.hash_alg = Some(alg);
            } else if let Some(value) =
                strip_prefix_ignore_case(opt, "verify-time=").filter(|_| accepts.verify_time)
            {
                parsed.verify_time = Some(parse_absolute_time(value)?);
            } else if accepts.print_pubkey && opt.eq_ignore_ascii_case("print-pubkey") {
                parsed.print_pubkey = true;
            } else {
                return Err(SigOptionError::Invalid(opt.clone()));
            }
        }
        Ok(parsed)
    }

    /// Verification time, defaulting to now.
    pub fn verify_time_or_now(&self) -> u64 {
        self.verify_time.unwrap_or_else(keysig_policy::time::now)
    }
}

fn strip_prefix_ignore_case<'a>(text: &'a str, prefix: &str) -> Option<&'a str> {
    let head = text.get(..prefix.len())?;
    head.eq_ignore_ascii_case(prefix)
        .then(|| &text[prefix.len()..])
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: Accepts = Accepts {
        hashalg: true,
        verify_time: true,
        print_pubkey: true,
    };

    fn opts(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn parses_every_option() {
        let parsed = SigOptions::parse(
            &opts(&["hashalg=sha256", "Verify-Time=20240101Z", "PRINT-PUBKEY"]),
            ALL,
        )
        .unwrap();
        assert_eq!(parsed.hash_alg, Some(HashAlg::Sha256));
        assert_eq!(parsed.verify_time, Some(1_704_067_200));
        assert!(parsed.print_pubkey);
    }

    #[test]
    fn rejects_option_not_accepted_here() {
        let err = SigOptions::parse(&opts(&["hashalg=sha256"]), Accepts::default()).unwrap_err();
        assert!(matches!(err, SigOptionError::Invalid(_)));
    }

    #[test]
    fn rejects_unknown_hash() {
        let err = SigOptions::parse(&opts(&["hashalg=md5"]), ALL).unwrap_err();
        assert!(matches!(err, SigOptionError::HashAlg(name) if name == "md5"));
    }

    #[test]
    fn rejects_bad_time() {
        let err = SigOptions::parse(&opts(&["verify-time=yesterday"]), ALL).unwrap_err();
        assert!(matches!(err, SigOptionError::VerifyTime(_)));
    }
}
