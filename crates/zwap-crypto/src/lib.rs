pub mod hash;
pub mod merkle;

pub use hash::{hash_leaf, hash_pair, sha3_256};
pub use merkle::{verify_proof, MerkleClaimVerifier, MerkleTree, VerifiedClaim};
