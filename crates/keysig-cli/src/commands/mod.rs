pub mod check_novalidate;
pub mod find_principals;
pub mod match_principals;
pub mod sign;
pub mod verify;

use keysig_core::dearmor;
use std::fs;
use std::path::Path;

/// Reads and dearmors a signature file.
pub(crate) fn read_signature(path: &Path) -> Result<Vec<u8>, Box<dyn std::error::Error>> {
    let text = fs::read_to_string(path)
        .map_err(|e| format!("Couldn't read signature file {}: {}", path.display(), e))?;
    Ok(dearmor(&text)?)
}
