//! Opaque block identifier.

use rand::Rng;
use std::fmt;

/// A 32-byte opaque block label.
///
/// Generated by hashing random bytes with Blake3. Blocks in the simulated
/// tree carry these purely as unique identifiers; nothing validates them
/// cryptographically. Safe to use as a map key.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BlockHash([u8; 32]);

impl BlockHash {
    /// Size of hash in bytes.
    pub const BYTES: usize = 32;

    /// Zero hash (all bytes are 0x00).
    pub const ZERO: Self = Self([0u8; 32]);

    /// Generate a fresh random label by hashing 32 random bytes.
    pub fn random<R: Rng>(rng: &mut R) -> Self {
        let mut bytes = [0u8; 32];
        rng.fill(&mut bytes);
        let hash = blake3::hash(&bytes);
        Self(*hash.as_bytes())
    }

    /// Convert to hex string.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Get bytes as slice reference.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Check if this is the zero hash.
    pub fn is_zero(&self) -> bool {
        self.0.iter().all(|&b| b == 0)
    }
}

impl fmt::Debug for BlockHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let hex = self.to_hex();
        write!(f, "BlockHash({}..{})", &hex[..8], &hex[56..])
    }
}

impl fmt::Display for BlockHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn test_random_hashes_distinct() {
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let a = BlockHash::random(&mut rng);
        let b = BlockHash::random(&mut rng);
        assert_ne!(a, b);
    }

    #[test]
    fn test_random_deterministic_for_seed() {
        let mut rng1 = ChaCha8Rng::seed_from_u64(42);
        let mut rng2 = ChaCha8Rng::seed_from_u64(42);
        assert_eq!(BlockHash::random(&mut rng1), BlockHash::random(&mut rng2));
    }

    #[test]
    fn test_hex_length() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let hash = BlockHash::random(&mut rng);
        assert_eq!(hash.to_hex().len(), 64);
    }

    #[test]
    fn test_is_zero() {
        assert!(BlockHash::ZERO.is_zero());
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        assert!(!BlockHash::random(&mut rng).is_zero());
    }
}
