//! Find-principals command implementation.

use super::read_signature;
use crate::options::{Accepts, SigOptions};
use crate::output;
use keysig_core::get_public_key;
use keysig_policy::{find_principals, PolicyError};
use std::path::PathBuf;

pub fn run(
    signature: PathBuf,
    allowed_signers: PathBuf,
    options: Vec<String>,
) -> Result<(), Box<dyn std::error::Error>> {
    let options = SigOptions::parse(
        &options,
        Accepts {
            verify_time: true,
            ..Accepts::default()
        },
    )?;

    let key = get_public_key(&read_signature(&signature)?)?;
    let lines = match find_principals(&allowed_signers, &key, options.verify_time_or_now()) {
        Ok(lines) => lines,
        Err(PolicyError::KeyNotFound) => {
            eprintln!("{}", output::NO_PRINCIPAL);
            std::process::exit(1);
        }
        Err(e) => return Err(e.into()),
    };
    for principal in lines.iter().flat_map(|line| line.split(',')) {
        if !principal.is_empty() {
            println!("{}", principal);
        }
    }
    Ok(())
}
