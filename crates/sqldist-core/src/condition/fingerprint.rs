//! Condition fingerprints: stable identity of a condition text, used to key
//! the translation cache and to deduplicate failure warnings.

use sha2::{Digest, Sha256};
use std::fmt;

///
/// ConditionFingerprint
///
/// SHA-256 of the trimmed condition text under a versioned domain tag.
/// Texts differing only in surrounding whitespace share a fingerprint.
///

#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct ConditionFingerprint([u8; 32]);

impl ConditionFingerprint {
    #[must_use]
    pub fn of(text: &str) -> Self {
        let text = text.trim();
        let len = u64::try_from(text.len()).unwrap_or(u64::MAX);

        let mut hasher = Sha256::new();
        hasher.update(b"condfp:v1");
        hasher.update(len.to_be_bytes());
        hasher.update(text.as_bytes());
        let digest = hasher.finalize();

        let mut out = [0u8; 32];
        out.copy_from_slice(&digest);
        Self(out)
    }

    #[must_use]
    pub const fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    #[must_use]
    pub fn as_hex(&self) -> String {
        let mut out = String::with_capacity(64);
        for byte in self.0 {
            use std::fmt::Write as _;
            let _ = write!(out, "{byte:02x}");
        }
        out
    }

    /// First eight hex digits, for log lines.
    #[must_use]
    pub fn short(&self) -> String {
        let mut hex = self.as_hex();
        hex.truncate(8);
        hex
    }
}

impl fmt::Display for ConditionFingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.as_hex())
    }
}
