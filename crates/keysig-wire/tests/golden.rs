use keysig_wire::{armor, build_signed_data, dearmor, hash_buffer, HashAlg, WireBuf};

#[test]
fn armor_matches_golden_text() {
    assert_eq!(
        armor(b"SSHSIG"),
        "-----BEGIN SSH SIGNATURE-----\nU1NIU0lH\n-----END SSH SIGNATURE-----\n"
    );
}

#[test]
fn dearmor_accepts_unwrapped_body_and_trailing_text() {
    let text = "-----BEGIN SSH SIGNATURE-----\nU1NI\nU0lH\n-----END SSH SIGNATURE-----\ntrailing comment\n";
    assert_eq!(dearmor(text).unwrap(), b"SSHSIG");
}

#[test]
fn signed_data_for_hello_world_is_stable() {
    let digest = hash_buffer(b"hello world", HashAlg::Sha256);
    let bytes = build_signed_data("file", digest.alg(), digest.as_bytes()).unwrap();

    let mut buf = WireBuf::from(bytes);
    assert_eq!(buf.get_bytes(6).unwrap(), b"SSHSIG");
    assert_eq!(buf.get_cstring().unwrap(), "file");
    assert!(buf.get_string().unwrap().is_empty());
    assert_eq!(buf.get_cstring().unwrap(), "sha256");
    assert_eq!(
        hex::encode(buf.get_string().unwrap()),
        "b94d27b9934d3e08a52e52d7da7dabfac484efe37a5380ee9088f7ace2efcde9"
    );
    buf.finish().unwrap();
}
