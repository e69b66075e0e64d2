//! Verify command implementation.

use super::read_signature;
use crate::options::{Accepts, SigOptions};
use crate::output;
use keysig_core::{verify_reader, PublicKey};
use keysig_policy::{check_allowed_signers_at, check_revoked};
use std::io;
use std::path::PathBuf;
use tracing::debug;

/// Arguments of the `verify` subcommand.
pub struct VerifyArgs {
    pub allowed_signers: PathBuf,
    pub identity: String,
    pub namespace: String,
    pub signature: PathBuf,
    pub revoked_keys: Option<PathBuf>,
    pub options: Vec<String>,
    pub json: bool,
}

pub fn run(args: VerifyArgs) -> Result<(), Box<dyn std::error::Error>> {
    let options = SigOptions::parse(
        &args.options,
        Accepts {
            verify_time: true,
            print_pubkey: true,
            ..Accepts::default()
        },
    )?;

    let result = verify_and_authorize(&args, options.verify_time_or_now());
    report(&args.namespace, Some(args.identity.as_str()), &options, args.json, result)
}

fn verify_and_authorize(
    args: &VerifyArgs,
    verify_time: u64,
) -> Result<PublicKey, Box<dyn std::error::Error>> {
    let blob = read_signature(&args.signature)?;
    let key = verify_reader(&blob, io::stdin().lock(), &args.namespace)?;
    debug!(
        fingerprint = %key.fingerprint().unwrap_or_default(),
        "valid (unverified) signature"
    );
    if let Some(revoked_keys) = &args.revoked_keys {
        check_revoked(revoked_keys, &key)?;
    }
    check_allowed_signers_at(
        &args.allowed_signers,
        &key,
        &args.identity,
        &args.namespace,
        verify_time,
    )?;
    Ok(key)
}

/// Prints the outcome the way `verify` and `check-novalidate` share.
pub(crate) fn report(
    namespace: &str,
    principal: Option<&str>,
    options: &SigOptions,
    json: bool,
    result: Result<PublicKey, Box<dyn std::error::Error>>,
) -> Result<(), Box<dyn std::error::Error>> {
    match result {
        Ok(key) => {
            if json {
                println!(
                    "{}",
                    output::format_json(&output::verified_json(namespace, principal, &key))
                );
            } else {
                println!("{}", output::good_signature(namespace, principal, &key));
            }
            if options.print_pubkey {
                println!("{}", key.to_openssh()?);
            }
            Ok(())
        }
        Err(e) => {
            if json {
                println!(
                    "{}",
                    output::format_json(&output::failed_json(namespace, &e.to_string()))
                );
            } else {
                println!("{}", output::VERIFY_FAILED);
            }
            Err(e)
        }
    }
}
