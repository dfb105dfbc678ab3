use sha3::{Digest, Sha3_256};
use zwap_core::leaf::DistributionLeaf;

/// Compute SHA3-256 of arbitrary bytes → 32-byte array.
pub fn sha3_256(data: &[u8]) -> [u8; 32] {
    Sha3_256::digest(data).into()
}

/// Content hash of a distribution leaf.
pub fn hash_leaf(leaf: &DistributionLeaf) -> [u8; 32] {
    sha3_256(&leaf.to_bytes())
}

/// Combine two nodes. The pair is sorted first, so a proof carries no
/// left/right flags; the order of the proof elements still matters.
pub fn hash_pair(a: &[u8; 32], b: &[u8; 32]) -> [u8; 32] {
    let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
    let mut hasher = Sha3_256::new();
    hasher.update(lo);
    hasher.update(hi);
    hasher.finalize().into()
}
