//! Sign command implementation.

use crate::keyfile;
use crate::options::{Accepts, SigOptions};
use keysig_core::{armor, sign_reader, Signer};
use std::fs::{self, File};
use std::io::{self, BufReader, Write};
use std::path::{Path, PathBuf};
use tracing::debug;

pub fn run(
    key: PathBuf,
    certificate: Option<PathBuf>,
    namespace: String,
    options: Vec<String>,
    files: Vec<PathBuf>,
) -> Result<(), Box<dyn std::error::Error>> {
    let options = SigOptions::parse(
        &options,
        Accepts {
            hashalg: true,
            ..Accepts::default()
        },
    )?;
    let hash_alg = options.hash_alg.unwrap_or_default();

    let stdin_requested = files.iter().any(|f| f == Path::new("-"));
    if stdin_requested && files.len() > 1 {
        return Err("Cannot sign mix of paths and standard input".into());
    }

    let signer = match &certificate {
        Some(cert) => keyfile::load_certified_signer(&key, cert),
        None => keyfile::load_signer(&key),
    }
    .map_err(|e| format!("Couldn't load key {}: {}", key.display(), e))?;
    debug!(key_type = signer.public_key().key_type(), %hash_alg, "loaded signing key");

    if files.is_empty() || stdin_requested {
        eprintln!("Signing data on standard input");
        let blob = sign_reader(&signer, hash_alg, io::stdin().lock(), &namespace)?;
        let mut stdout = io::stdout().lock();
        stdout.write_all(armor(&blob).as_bytes())?;
        stdout.flush()?;
        return Ok(());
    }

    for file in &files {
        sign_file(&signer, hash_alg, file, &namespace)?;
    }
    Ok(())
}

fn sign_file(
    signer: &dyn Signer,
    hash_alg: keysig_core::HashAlg,
    file: &Path,
    namespace: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    eprintln!("Signing file {}", file.display());
    let input = File::open(file)
        .map_err(|e| format!("Cannot open {} for signing: {}", file.display(), e))?;
    let blob = sign_reader(signer, hash_alg, BufReader::new(input), namespace)
        .map_err(|e| format!("Signing {} failed: {}", file.display(), e))?;

    let mut target = file.as_os_str().to_owned();
    target.push(".sig");
    let target = PathBuf::from(target);
    fs::write(&target, armor(&blob))
        .map_err(|e| format!("Cannot write to {}: {}", target.display(), e))?;
    eprintln!("Write signature to {}", target.display());
    Ok(())
}
