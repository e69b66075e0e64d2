//! Output formatting utilities.

use keysig_core::PublicKey;
use serde_json::{json, Value};

/// Message printed when verification fails for any reason.
pub const VERIFY_FAILED: &str = "Could not verify signature.";

/// Message printed when no allowed-signers line matches.
pub const NO_PRINCIPAL: &str = "No principal matched.";

/// `Good "NS" signature [for ID] with TYPE key FP`.
pub fn good_signature(namespace: &str, principal: Option<&str>, key: &PublicKey) -> String {
    let fingerprint = key.fingerprint().unwrap_or_else(|_| "?".to_string());
    match principal {
        Some(principal) => format!(
            "Good \"{}\" signature for {} with {} key {}",
            namespace,
            principal,
            key.type_label(),
            fingerprint
        ),
        None => format!(
            "Good \"{}\" signature with {} key {}",
            namespace,
            key.type_label(),
            fingerprint
        ),
    }
}

/// JSON report of a successful verification.
pub fn verified_json(namespace: &str, principal: Option<&str>, key: &PublicKey) -> Value {
    json!({
        "verified": true,
        "namespace": namespace,
        "principal": principal,
        "key_type": key.key_type(),
        "fingerprint": key.fingerprint().ok(),
        "public_key": key.to_openssh().ok(),
    })
}

/// JSON report of a failed verification.
pub fn failed_json(namespace: &str, error: &str) -> Value {
    json!({
        "verified": false,
        "namespace": namespace,
        "error": error,
    })
}

/// Formats a JSON value on one line.
pub fn format_json(value: &Value) -> String {
    serde_json::to_string(value).unwrap_or_else(|_| "{}".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use keysig_core::{Ed25519Signer, Signer};

    #[test]
    fn good_line_with_and_without_principal() {
        let key = Ed25519Signer::from_seed([1; 32]).public_key();
        let fp = key.fingerprint().unwrap();
        assert_eq!(
            good_signature("file", Some("alice"), &key),
            format!("Good \"file\" signature for alice with ED25519 key {fp}")
        );
        assert_eq!(
            good_signature("file", None, &key),
            format!("Good \"file\" signature with ED25519 key {fp}")
        );
    }

    #[test]
    fn json_reports_key_details() {
        let key = Ed25519Signer::from_seed([1; 32]).public_key();
        let value = verified_json("git", Some("alice"), &key);
        assert_eq!(value["verified"], true);
        assert_eq!(value["key_type"], "ssh-ed25519");
        assert_eq!(value["principal"], "alice");
        assert_eq!(failed_json("git", "boom")["verified"], false);
    }
}
