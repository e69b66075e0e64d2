//! Signatures, keys and certificates produced by OpenSSH's `ssh-keygen -Y sign`.

use keysig_core::{dearmor, verify, CertType, HashAlg, PublicKey, SigError, SshSig};
use std::fs;
use std::path::PathBuf;

fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("../../testdata/openssh")
        .join(name)
}

fn read_text(name: &str) -> String {
    fs::read_to_string(fixture(name)).unwrap()
}

fn message() -> Vec<u8> {
    fs::read(fixture("message")).unwrap()
}

fn signature(name: &str) -> Vec<u8> {
    dearmor(&read_text(name)).unwrap()
}

#[test]
fn ed25519_signature_verifies() {
    let key = verify(&signature("alice.sig"), &message(), "file").unwrap();
    assert_eq!(key, read_text("alice.pub").parse::<PublicKey>().unwrap());
    assert_eq!(
        key.fingerprint().unwrap(),
        "SHA256:R+xZI7i9vEND/gHjY05T7YKbeRjWSKtfgjklqm46zDg"
    );
}

#[test]
fn ssh_keygen_defaults_to_sha512() {
    let sig = SshSig::from_bytes(&signature("alice.sig")).unwrap();
    assert_eq!(sig.hash_alg(), HashAlg::Sha512);
    assert_eq!(sig.namespace(), "file");
    assert!(sig.reserved().is_empty());
}

#[test]
fn rsa_signature_verifies() {
    let blob = signature("dave.sig");
    let sig = SshSig::from_bytes(&blob).unwrap();
    assert_eq!(sig.signature().described_algorithm().unwrap(), "rsa-sha2-512");

    let key = verify(&blob, &message(), "file").unwrap();
    assert_eq!(key, read_text("dave.pub").parse::<PublicKey>().unwrap());
    assert_eq!(key.type_label(), "RSA");
    assert_eq!(
        key.fingerprint().unwrap(),
        "SHA256:zCuib2ny5LBHpfaMs3SgfaGfs2fSVAbfKOWwmFog0BU"
    );
}

#[test]
fn certificate_signature_verifies() {
    let key = verify(&signature("carol.sig"), &message(), "git").unwrap();
    assert_eq!(key, read_text("carol-cert.pub").parse::<PublicKey>().unwrap());
    assert_eq!(key.type_label(), "ED25519-CERT");
    assert_eq!(
        key.fingerprint().unwrap(),
        "SHA256:b4D4bek+eW2QW8m1pBVcWyR+WFOwpx7RM+msGhJ7nI4"
    );

    let cert = key.certificate().unwrap();
    assert_eq!(cert.cert_type(), CertType::User);
    assert_eq!(cert.key_id(), "carol");
    assert_eq!(cert.principals(), ["carol@example.com".to_string()]);
    assert_eq!(cert.key(), &read_text("carol.pub").parse::<PublicKey>().unwrap());
    assert_eq!(
        cert.signature_key(),
        &read_text("ca.pub").parse::<PublicKey>().unwrap()
    );
    assert_eq!(cert.extensions().count(), 5);
    assert!(cert.check_authority("carol@example.com", 1_710_000_000).is_ok());
    assert!(cert.check_authority("bob@example.com", 1_710_000_000).is_err());
}

#[test]
fn wrong_namespace_or_message_is_rejected() {
    assert!(matches!(
        verify(&signature("alice.sig"), &message(), "git"),
        Err(SigError::NamespaceMismatch { .. })
    ));
    assert!(matches!(
        verify(&signature("alice.sig"), b"hello world\n", "file"),
        Err(SigError::CryptoVerificationFailed)
    ));
}
