//! Check-novalidate command implementation.

use super::read_signature;
use super::verify::report;
use crate::options::{Accepts, SigOptions};
use keysig_core::verify_reader;
use std::io;
use std::path::PathBuf;

pub fn run(
    namespace: String,
    signature: PathBuf,
    options: Vec<String>,
    json: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let options = SigOptions::parse(
        &options,
        Accepts {
            print_pubkey: true,
            ..Accepts::default()
        },
    )?;

    let result = read_signature(&signature).and_then(|blob| {
        verify_reader(&blob, io::stdin().lock(), &namespace).map_err(Into::into)
    });
    report(&namespace, None, &options, json, result)
}
