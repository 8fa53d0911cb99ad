//! Domain-specific identifier types.

use rand::Rng;
use std::fmt;

/// Index of a node in the simulation roster.
///
/// This is a simulation-only concept for routing between in-process nodes;
/// nodes additionally carry an opaque [`PublicId`] for display.
pub type NodeIndex = u32;

/// Opaque public node identifier (33-byte key-shaped label).
///
/// Stands in for a real public key: unique, random, and used only as a
/// label. No key material or signatures exist in the simulation.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PublicId([u8; 33]);

impl PublicId {
    /// Size in bytes.
    pub const BYTES: usize = 33;

    /// Generate a fresh random identifier.
    pub fn random<R: Rng>(rng: &mut R) -> Self {
        let mut bytes = [0u8; 33];
        rng.fill(&mut bytes[..]);
        Self(bytes)
    }

    /// Get the bytes as a slice.
    pub fn as_bytes(&self) -> &[u8; 33] {
        &self.0
    }

    /// Convert to hex string.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl fmt::Debug for PublicId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PublicId({}..)", &hex::encode(&self.0[..4]))
    }
}

impl fmt::Display for PublicId {
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
    fn test_public_id_distinct() {
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let a = PublicId::random(&mut rng);
        let b = PublicId::random(&mut rng);
        assert_ne!(a, b);
        assert_eq!(a.to_hex().len(), 66);
    }
}
