//! Match-principals command implementation.

use crate::output;
use keysig_policy::{match_principals, PolicyError};
use std::path::PathBuf;

pub fn run(
    allowed_signers: PathBuf,
    identity: String,
) -> Result<(), Box<dyn std::error::Error>> {
    match match_principals(&allowed_signers, &identity) {
        Ok(lines) => {
            for line in lines {
                println!("{}", line);
            }
            Ok(())
        }
        Err(PolicyError::KeyNotFound) => {
            eprintln!("{}", output::NO_PRINCIPAL);
            std::process::exit(1);
        }
        Err(e) => Err(e.into()),
    }
}
