//! Fixed vectors: Ed25519 signing is deterministic, so the whole blob is stable.

use keysig_core::{armor, sign, verify, Ed25519Signer, HashAlg, PublicKey, Signer};

const SEED: [u8; 32] = [0x11; 32];

const HELLO_WORLD_BLOB: &str = "53534853494700000001000000330000000b7373682d6564323535313900000020\
d04ab232742bb4ab3a1368bd4615e4e6d0224ab71a016baf8520a332c97787370000000466696c65000000000000\
0006736861323536000000530000000b7373682d656432353531390000004006eced96810aa6a1d17c98c0cb212b\
a1a102926e01dfe486e16752578d4f2d161446c45fc4cad89d4d89909edf7116982bdcf3f3fd1166b80b9925a942\
af7b02";

const HELLO_WORLD_ARMOR: &str = "-----BEGIN SSH SIGNATURE-----
U1NIU0lHAAAAAQAAADMAAAALc3NoLWVkMjU1MTkAAAAg0EqyMnQrtKs6E2i9RhXk5tAiSr
caAWuvhSCjMsl3hzcAAAAEZmlsZQAAAAAAAAAGc2hhMjU2AAAAUwAAAAtzc2gtZWQyNTUx
OQAAAEAG7O2WgQqmodF8mMDLISuhoQKSbgHf5IbhZ1JXjU8tFhRGxF/EytidTYmQnt9xFp
gr3PPz/RFmuAuZJalCr3sC
-----END SSH SIGNATURE-----
";

const PUBLIC_KEY: &str = "ssh-ed25519 AAAAC3NzaC1lZDI1NTE5AAAAINBKsjJ0K7SrOhNovUYV5ObQIkq3GgFrr4UgozLJd4c3";

#[test]
fn hello_world_blob_is_stable() {
    let signer = Ed25519Signer::from_seed(SEED);
    let blob = sign(&signer, HashAlg::Sha256, b"hello world", "file").unwrap();
    assert_eq!(hex::encode(&blob), HELLO_WORLD_BLOB);
    assert_eq!(armor(&blob), HELLO_WORLD_ARMOR);
}

#[test]
fn fixed_blob_verifies() {
    let blob = hex::decode(HELLO_WORLD_BLOB).unwrap();
    let key = verify(&blob, b"hello world", "file").unwrap();
    assert_eq!(key, PUBLIC_KEY.parse::<PublicKey>().unwrap());
    assert_eq!(
        key.fingerprint().unwrap(),
        "SHA256:2HS8bJpYBy7bDfWIQN304coFKT0s6CVPABFLYq+IX5E"
    );
}

#[test]
fn public_key_text_matches_signer() {
    let signer = Ed25519Signer::from_seed(SEED);
    assert_eq!(signer.public_key().to_openssh().unwrap(), PUBLIC_KEY);
}
