//! Merkle membership proofs for distribution leaves.
//!
//! Nodes are combined with [`hash_pair`] (sorted pair), leaves with
//! [`hash_leaf`]. Odd levels duplicate their last node. Verification is a
//! pure fold; consumption (exactly-once) is tracked by the contract, never
//! here.

use std::collections::HashSet;

use tracing::{debug, warn};
use zwap_core::error::ZwapError;
use zwap_core::leaf::{DistributionLeaf, MerkleProof};
use zwap_core::types::Address;

use crate::hash::{hash_leaf, hash_pair};

/// Fold `proof` over the leaf hash and compare with `root`.
pub fn verify_proof(leaf: &DistributionLeaf, proof: &MerkleProof, root: &[u8; 32]) -> bool {
    let computed = proof
        .siblings()
        .iter()
        .fold(hash_leaf(leaf), |acc, sibling| hash_pair(&acc, sibling));
    &computed == root
}

/// A (leaf, proof) pair that has been checked against `root`.
///
/// Only [`MerkleClaimVerifier::verify`] can build one, so claim assembly
/// that takes a `&VerifiedClaim` cannot be reached with a bad proof.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VerifiedClaim {
    leaf: DistributionLeaf,
    proof: MerkleProof,
    root: [u8; 32],
}

impl VerifiedClaim {
    pub fn leaf(&self) -> &DistributionLeaf {
        &self.leaf
    }

    pub fn proof(&self) -> &MerkleProof {
        &self.proof
    }

    pub fn root(&self) -> &[u8; 32] {
        &self.root
    }
}

/// Verifier bound to one published epoch root.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MerkleClaimVerifier {
    root: [u8; 32],
}

impl MerkleClaimVerifier {
    pub fn new(root: [u8; 32]) -> Self {
        Self { root }
    }

    pub fn root(&self) -> &[u8; 32] {
        &self.root
    }

    pub fn check(&self, leaf: &DistributionLeaf, proof: &MerkleProof) -> bool {
        verify_proof(leaf, proof, &self.root)
    }

    /// Consumes the proof; on success it travels inside the returned
    /// [`VerifiedClaim`].
    pub fn verify(
        &self,
        leaf: DistributionLeaf,
        proof: MerkleProof,
    ) -> Result<VerifiedClaim, ZwapError> {
        if !self.check(&leaf, &proof) {
            warn!(
                epoch = leaf.epoch,
                address = %leaf.address,
                proof_len = proof.len(),
                root = %hex::encode(self.root),
                "merkle proof rejected"
            );
            return Err(ZwapError::InvalidProof);
        }
        debug!(epoch = leaf.epoch, address = %leaf.address, "merkle proof accepted");
        Ok(VerifiedClaim {
            leaf,
            proof,
            root: self.root,
        })
    }
}

/// Full tree over one epoch's leaves. Used by distributor tooling to publish
/// a root and hand out proofs.
#[derive(Clone, Debug)]
pub struct MerkleTree {
    leaves: Vec<DistributionLeaf>,
    /// `levels[0]` holds leaf hashes, the last level holds the root.
    levels: Vec<Vec<[u8; 32]>>,
}

impl MerkleTree {
    /// At most one leaf per (epoch, address) is allowed.
    pub fn from_leaves(leaves: Vec<DistributionLeaf>) -> Result<Self, ZwapError> {
        if leaves.is_empty() {
            return Err(ZwapError::InvalidConfig(
                "merkle tree needs at least one leaf".into(),
            ));
        }

        let mut seen = HashSet::with_capacity(leaves.len());
        for leaf in &leaves {
            if !seen.insert((leaf.epoch, leaf.address)) {
                return Err(ZwapError::DuplicateLeaf {
                    epoch: leaf.epoch,
                    address: leaf.address.to_string(),
                });
            }
        }

        let mut levels = vec![leaves.iter().map(hash_leaf).collect::<Vec<_>>()];
        while levels.last().map_or(false, |l| l.len() > 1) {
            let prev = &levels[levels.len() - 1];
            let next: Vec<[u8; 32]> = prev
                .chunks(2)
                .map(|pair| match pair {
                    [left, right] => hash_pair(left, right),
                    // Duplicate last entry if odd
                    [last] => hash_pair(last, last),
                    _ => unreachable!("chunks(2) yields one or two nodes"),
                })
                .collect();
            levels.push(next);
        }

        Ok(Self { leaves, levels })
    }

    pub fn root(&self) -> [u8; 32] {
        self.levels[self.levels.len() - 1][0]
    }

    pub fn leaves(&self) -> &[DistributionLeaf] {
        &self.leaves
    }

    /// Number of sibling hashes in every proof of this tree.
    pub fn depth(&self) -> usize {
        self.levels.len() - 1
    }

    /// Proof for the leaf at `index`, or `None` if out of range.
    pub fn proof(&self, index: usize) -> Option<MerkleProof> {
        if index >= self.leaves.len() {
            return None;
        }
        let mut idx = index;
        let mut siblings = Vec::with_capacity(self.depth());
        for level in &self.levels[..self.depth()] {
            let sibling = level.get(idx ^ 1).unwrap_or(&level[idx]);
            siblings.push(*sibling);
            idx /= 2;
        }
        Some(MerkleProof::new(siblings))
    }

    /// Proof for the allocation owned by `address`, if it is in the tree.
    pub fn proof_for(&self, address: &Address) -> Option<(DistributionLeaf, MerkleProof)> {
        let index = self.leaves.iter().position(|l| &l.address == address)?;
        Some((self.leaves[index], self.proof(index)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rand::{Rng, SeedableRng};

    fn leaf(i: u8, amount: u128) -> DistributionLeaf {
        DistributionLeaf::new(4, Address::from_bytes([i; 20]), amount)
    }

    fn tree_of(n: u8) -> MerkleTree {
        MerkleTree::from_leaves((0..n).map(|i| leaf(i, 1_000 + i as u128)).collect()).unwrap()
    }

    #[test]
    fn every_leaf_verifies() {
        for n in 1..=9u8 {
            let tree = tree_of(n);
            let verifier = MerkleClaimVerifier::new(tree.root());
            for (i, l) in tree.leaves().iter().enumerate() {
                let proof = tree.proof(i).unwrap();
                assert!(verifier.check(l, &proof), "n={n} i={i}");
            }
        }
    }

    #[test]
    fn single_leaf_tree_has_empty_proof() {
        let tree = tree_of(1);
        assert_eq!(tree.depth(), 0);
        assert!(tree.proof(0).unwrap().is_empty());
        assert_eq!(tree.root(), hash_leaf(&tree.leaves()[0]));
    }

    #[test]
    fn reordered_siblings_in_three_level_proof_fail() {
        let tree = tree_of(8);
        assert_eq!(tree.depth(), 3);
        let l = tree.leaves()[5];
        let mut siblings = tree.proof(5).unwrap().0;
        siblings.swap(0, 1);
        let verifier = MerkleClaimVerifier::new(tree.root());
        let err = verifier.verify(l, MerkleProof::new(siblings)).unwrap_err();
        assert!(matches!(err, ZwapError::InvalidProof));
    }

    #[test]
    fn proof_against_other_root_fails() {
        let a = tree_of(4);
        let b = MerkleTree::from_leaves((0..4).map(|i| leaf(i, 5)).collect()).unwrap();
        let proof = a.proof(2).unwrap();
        assert!(!verify_proof(&a.leaves()[2], &proof, &b.root()));
    }

    #[test]
    fn verified_claim_keeps_inputs() {
        let tree = tree_of(3);
        let proof = tree.proof(1).unwrap();
        let claim = MerkleClaimVerifier::new(tree.root())
            .verify(tree.leaves()[1], proof.clone())
            .unwrap();
        assert_eq!(claim.leaf(), &tree.leaves()[1]);
        assert_eq!(claim.proof(), &proof);
        assert_eq!(claim.root(), &tree.root());
    }

    #[test]
    fn duplicate_epoch_address_rejected() {
        let leaves = vec![leaf(1, 10), leaf(2, 20), leaf(1, 30)];
        let err = MerkleTree::from_leaves(leaves).unwrap_err();
        assert!(matches!(err, ZwapError::DuplicateLeaf { epoch: 4, .. }));
    }

    #[test]
    fn empty_tree_rejected() {
        assert!(MerkleTree::from_leaves(vec![]).is_err());
    }

    #[test]
    fn proof_for_looks_up_by_address() {
        let tree = tree_of(6);
        let (l, proof) = tree.proof_for(&Address::from_bytes([3; 20])).unwrap();
        assert_eq!(l.amount, 1_003);
        assert!(verify_proof(&l, &proof, &tree.root()));
        assert!(tree.proof_for(&Address::from_bytes([0xee; 20])).is_none());
        assert!(tree.proof(6).is_none());
    }

    #[test]
    fn random_trees_verify() {
        let mut rng = rand::rngs::StdRng::seed_from_u64(7);
        for _ in 0..20 {
            let n = rng.gen_range(1..40usize);
            let leaves: Vec<_> = (0..n)
                .map(|i| {
                    let mut addr = [0u8; 20];
                    rng.fill(&mut addr[..]);
                    addr[0] = i as u8;
                    DistributionLeaf::new(rng.gen_range(0..50), Address::from_bytes(addr), rng.gen())
                })
                .collect();
            let tree = MerkleTree::from_leaves(leaves).unwrap();
            let i = rng.gen_range(0..n);
            assert!(verify_proof(&tree.leaves()[i], &tree.proof(i).unwrap(), &tree.root()));
        }
    }

    proptest! {
        #[test]
        fn flipping_a_proof_byte_fails(n in 2u8..32, pick in any::<prop::sample::Index>(),
                                       byte in 0usize..32, bit in 0u8..8) {
            let tree = tree_of(n);
            let i = pick.index(n as usize);
            let mut proof = tree.proof(i).unwrap();
            let level = byte % proof.len();
            proof.0[level][byte] ^= 1 << bit;
            prop_assert!(!verify_proof(&tree.leaves()[i], &proof, &tree.root()));
        }

        #[test]
        fn flipping_an_amount_byte_fails(n in 1u8..32, pick in any::<prop::sample::Index>(),
                                         byte in 0usize..16, bit in 0u8..8) {
            let tree = tree_of(n);
            let i = pick.index(n as usize);
            let proof = tree.proof(i).unwrap();
            let mut l = tree.leaves()[i];
            let mut bytes = l.amount.to_be_bytes();
            bytes[byte] ^= 1 << bit;
            l.amount = u128::from_be_bytes(bytes);
            prop_assert!(!verify_proof(&l, &proof, &tree.root()));
        }
    }
}
