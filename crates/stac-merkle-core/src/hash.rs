//! Hash function registry.
//!
//! A hash method names its function as free text ("sha256", "SHA-256", ...).
//! This module resolves that text to a closed set of algorithms. Names are
//! matched after lowercasing and removing `-`, `_` and spaces, so every
//! spelling of one algorithm resolves identically.
//!
//! SHA-1 and MD5 are weak; new catalogs should use the SHA-2 family or BLAKE3.

use std::fmt;
use std::str::FromStr;

use sha2::{Digest, Sha224, Sha256, Sha384, Sha512};

use crate::errors::{MerkleError, MerkleResult};

/// Supported one-way hash algorithms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HashFunction {
    Sha256,
    Sha224,
    Sha384,
    Sha512,
    Sha1,
    Md5,
    #[cfg(feature = "blake3")]
    Blake3,
}

impl HashFunction {
    /// Every algorithm compiled into this build, in a stable order.
    pub fn all() -> &'static [HashFunction] {
        &[
            HashFunction::Sha256,
            HashFunction::Sha224,
            HashFunction::Sha384,
            HashFunction::Sha512,
            HashFunction::Sha1,
            HashFunction::Md5,
            #[cfg(feature = "blake3")]
            HashFunction::Blake3,
        ]
    }

    /// Resolve a configuration name.
    pub fn parse(name: &str) -> MerkleResult<Self> {
        let key: String = name
            .chars()
            .filter(|c| !matches!(c, '-' | '_' | ' '))
            .flat_map(char::to_lowercase)
            .collect();

        match key.as_str() {
            "sha256" => Ok(Self::Sha256),
            "sha224" => Ok(Self::Sha224),
            "sha384" => Ok(Self::Sha384),
            "sha512" => Ok(Self::Sha512),
            "sha1" => Ok(Self::Sha1),
            "md5" => Ok(Self::Md5),
            #[cfg(feature = "blake3")]
            "blake3" => Ok(Self::Blake3),
            _ => Err(MerkleError::UnsupportedHashFunction(name.to_string())),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Sha256 => "sha256",
            Self::Sha224 => "sha224",
            Self::Sha384 => "sha384",
            Self::Sha512 => "sha512",
            Self::Sha1 => "sha1",
            Self::Md5 => "md5",
            #[cfg(feature = "blake3")]
            Self::Blake3 => "blake3",
        }
    }

    /// Digest length in bytes.
    pub fn output_len(&self) -> usize {
        match self {
            Self::Sha256 => 32,
            Self::Sha224 => 28,
            Self::Sha384 => 48,
            Self::Sha512 => 64,
            Self::Sha1 => 20,
            Self::Md5 => 16,
            #[cfg(feature = "blake3")]
            Self::Blake3 => 32,
        }
    }

    /// Hash raw bytes.
    pub fn digest(&self, bytes: &[u8]) -> Vec<u8> {
        match self {
            Self::Sha256 => Sha256::digest(bytes).to_vec(),
            Self::Sha224 => Sha224::digest(bytes).to_vec(),
            Self::Sha384 => Sha384::digest(bytes).to_vec(),
            Self::Sha512 => Sha512::digest(bytes).to_vec(),
            Self::Sha1 => sha1::Sha1::digest(bytes).to_vec(),
            Self::Md5 => md5::compute(bytes).0.to_vec(),
            #[cfg(feature = "blake3")]
            Self::Blake3 => blake3::hash(bytes).as_bytes().to_vec(),
        }
    }

    /// Hash raw bytes and return lowercase hex.
    pub fn digest_hex(&self, bytes: &[u8]) -> String {
        hex::encode(self.digest(bytes))
    }

    /// Hash the concatenation `left || right` of two hex digests.
    ///
    /// This is the parent-node rule shared by the reducer and the proof verifier.
    pub fn combine_hex(&self, left_hex: &str, right_hex: &str) -> MerkleResult<String> {
        let mut buf = decode_digest(left_hex)?;
        buf.extend_from_slice(&decode_digest(right_hex)?);
        Ok(self.digest_hex(&buf))
    }
}

impl FromStr for HashFunction {
    type Err = MerkleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for HashFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Decode a hex digest, reporting the offending text on failure.
pub fn decode_digest(hex_digest: &str) -> MerkleResult<Vec<u8>> {
    hex::decode(hex_digest).map_err(|_| MerkleError::malformed_digest(hex_digest))
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn names_resolve_case_and_punctuation_insensitively() {
        for name in ["sha256", "SHA-256", "Sha_256", "sha 256"] {
            assert_eq!(HashFunction::parse(name).unwrap(), HashFunction::Sha256);
        }
        assert_eq!(HashFunction::parse("SHA-512").unwrap(), HashFunction::Sha512);
        assert_eq!(HashFunction::parse("MD5").unwrap(), HashFunction::Md5);
        assert_eq!(HashFunction::parse("sha-1").unwrap(), HashFunction::Sha1);
    }

    #[test]
    fn unknown_name_is_rejected() {
        assert_matches!(
            HashFunction::parse("unsupported-hash"),
            Err(MerkleError::UnsupportedHashFunction(n)) if n == "unsupported-hash"
        );
    }

    #[test]
    fn known_vectors() {
        assert_eq!(
            HashFunction::Sha256.digest_hex(b"abc"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
        assert_eq!(
            HashFunction::Sha1.digest_hex(b"abc"),
            "a9993e364706816aba3e25717850c26c9cd0d89d"
        );
        assert_eq!(
            HashFunction::Md5.digest_hex(b"abc"),
            "900150983cd24fb0d6963f7d28e17f72"
        );
    }

    #[test]
    fn output_len_matches_digest() {
        for f in HashFunction::all() {
            assert_eq!(f.digest(b"x").len(), f.output_len(), "{f}");
        }
    }

    #[test]
    fn combine_rejects_bad_hex() {
        assert_matches!(
            HashFunction::Sha256.combine_hex("zz", "00"),
            Err(MerkleError::MalformedDigest(_))
        );
    }
}
