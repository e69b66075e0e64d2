use sha2::{Digest as _, Sha256, Sha512};
use std::fmt;
use std::io::{self, Read};
use std::str::FromStr;
use thiserror::Error;

/// Read size used when hashing a stream: 64 KiB.
pub const HASH_CHUNK_SIZE: usize = 64 * 1024;

/// Errors raised by the hashing front-end.
#[derive(Error, Debug)]
pub enum HashError {
    /// The named algorithm is not on the allow-list.
    #[error("unsupported hash algorithm: {0}")]
    UnsupportedAlgorithm(String),
    /// Reading the input stream failed.
    #[error("I/O error while hashing: {0}")]
    Io(#[from] io::Error),
}

/// Allow-listed digest algorithms for detached signatures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum HashAlg {
    /// SHA-256, wire name `sha256`.
    Sha256,
    /// SHA-512, wire name `sha512`. Default for new signatures.
    #[default]
    Sha512,
}

impl HashAlg {
    /// Every algorithm accepted on the wire.
    pub const ALL: [HashAlg; 2] = [HashAlg::Sha256, HashAlg::Sha512];

    /// Wire name of the algorithm.
    pub fn as_str(self) -> &'static str {
        match self {
            HashAlg::Sha256 => "sha256",
            HashAlg::Sha512 => "sha512",
        }
    }

    /// Digest output length in bytes.
    pub fn digest_len(self) -> usize {
        match self {
            HashAlg::Sha256 => 32,
            HashAlg::Sha512 => 64,
        }
    }

    fn hasher(self) -> Hasher {
        match self {
            HashAlg::Sha256 => Hasher::Sha256(Sha256::new()),
            HashAlg::Sha512 => Hasher::Sha512(Sha512::new()),
        }
    }
}

impl FromStr for HashAlg {
    type Err = HashError;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        HashAlg::ALL
            .into_iter()
            .find(|alg| alg.as_str() == name)
            .ok_or_else(|| HashError::UnsupportedAlgorithm(name.to_string()))
    }
}

impl fmt::Display for HashAlg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

enum Hasher {
    Sha256(Sha256),
    Sha512(Sha512),
}

impl Hasher {
    fn update(&mut self, bytes: &[u8]) {
        match self {
            Hasher::Sha256(h) => h.update(bytes),
            Hasher::Sha512(h) => h.update(bytes),
        }
    }

    fn finish(self) -> Vec<u8> {
        match self {
            Hasher::Sha256(h) => h.finalize().to_vec(),
            Hasher::Sha512(h) => h.finalize().to_vec(),
        }
    }
}

/// Message digest tagged with the algorithm that produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Digest {
    alg: HashAlg,
    bytes: Vec<u8>,
}

impl Digest {
    /// Algorithm that produced the digest.
    pub fn alg(&self) -> HashAlg {
        self.alg
    }

    /// Raw digest bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }
}

/// Hashes an in-memory message.
pub fn hash_buffer(message: &[u8], alg: HashAlg) -> Digest {
    let mut hasher = alg.hasher();
    hasher.update(message);
    Digest {
        alg,
        bytes: hasher.finish(),
    }
}

/// Hashes a stream to EOF in fixed-size chunks.
///
/// Memory use is bounded by [`HASH_CHUNK_SIZE`] regardless of input size.
/// Interrupted and would-block reads are retried.
pub fn hash_reader<R: Read>(mut reader: R, alg: HashAlg) -> Result<Digest, HashError> {
    let mut hasher = alg.hasher();
    let mut chunk = vec![0u8; HASH_CHUNK_SIZE];
    let mut total: u64 = 0;
    loop {
        let n = match reader.read(&mut chunk) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) if e.kind() == io::ErrorKind::WouldBlock => {
                std::thread::yield_now();
                continue;
            }
            Err(e) => return Err(e.into()),
        };
        hasher.update(&chunk[..n]);
        total += n as u64;
    }
    tracing::trace!(alg = %alg, bytes = total, "hashed stream");
    Ok(Digest {
        alg,
        bytes: hasher.finish(),
    })
}
