//! End-to-end claim flow: publish a tree, hand out a proof, verify it, build
//! the request and submit it through a recording caller.
//!
//! Run with:
//!   cargo test -p zwap-claim --test claim_flow

use std::cell::RefCell;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use zwap_claim::{
    submit_claim, CallParams, ClaimContext, ClaimRequestBuilder, ContractCaller, ContractParam,
    GasPolicy, SubmissionResult,
};
use zwap_core::error::ZwapError;
use zwap_core::leaf::{DistributionLeaf, MerkleProof};
use zwap_core::network::{Network, NetworkRegistry};
use zwap_core::types::Address;
use zwap_crypto::{MerkleClaimVerifier, MerkleTree};

// ── Mock submitter ───────────────────────────────────────────────────────────

struct Call {
    contract: Address,
    entry_point: String,
    args: serde_json::Value,
    params: CallParams,
}

struct RecordingCaller {
    accept: bool,
    calls: RefCell<Vec<Call>>,
}

impl RecordingCaller {
    fn new(accept: bool) -> Self {
        Self {
            accept,
            calls: RefCell::new(Vec::new()),
        }
    }
}

impl ContractCaller for RecordingCaller {
    fn call_contract(
        &self,
        contract: &Address,
        entry_point: &str,
        args: &[ContractParam],
        params: &CallParams,
    ) -> Result<SubmissionResult, ZwapError> {
        let mut calls = self.calls.borrow_mut();
        calls.push(Call {
            contract: *contract,
            entry_point: entry_point.to_string(),
            args: serde_json::to_value(args)?,
            params: params.clone(),
        });
        Ok(SubmissionResult {
            tx_id: format!("{:064x}", calls.len()),
            accepted: self.accept,
        })
    }
}

// ── Fixtures ─────────────────────────────────────────────────────────────────

fn contract() -> Address {
    Address::from_bytes([0xd1; 20])
}

fn registry() -> NetworkRegistry {
    let mut reg = NetworkRegistry::default();
    reg.set_distributor(Network::MainNet, contract()).unwrap();
    reg
}

fn epoch_leaves(epoch: u32, count: usize, seed: u64) -> Vec<DistributionLeaf> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..count)
        .map(|i| {
            let mut addr = [0u8; 20];
            rng.fill(&mut addr[..]);
            addr[0] = i as u8;
            DistributionLeaf::new(epoch, Address::from_bytes(addr), rng.gen_range(1..10_u128.pow(18)))
        })
        .collect()
}

// ── Tests ────────────────────────────────────────────────────────────────────

#[test]
fn every_allocation_claims_end_to_end() {
    let leaves = epoch_leaves(7, 13, 42);
    let tree = MerkleTree::from_leaves(leaves.clone()).unwrap();
    let verifier = MerkleClaimVerifier::new(tree.root());
    let reg = registry();
    let builder = ClaimRequestBuilder::new(&reg, GasPolicy::default());
    let caller = RecordingCaller::new(true);

    for leaf in &leaves {
        let (leaf, proof) = tree.proof_for(&leaf.address).unwrap();
        let claim = verifier.verify(leaf, proof).unwrap();
        let ctx = ClaimContext::connected(Network::MainNet, leaf.address);
        let tx = builder.build(&claim, &ctx, 2_000_000_000).unwrap();
        assert_eq!(tx.claim_amount(), leaf.amount);
        submit_claim(&caller, &tx).unwrap();
    }

    let calls = caller.calls.borrow();
    assert_eq!(calls.len(), leaves.len());
    for (call, leaf) in calls.iter().zip(&leaves) {
        assert_eq!(call.contract, contract());
        assert_eq!(call.entry_point, "Claim");
        assert_eq!(call.params.amount, "0");
        assert_eq!(call.params.gas_limit, "30000");
        assert_eq!(call.params.version, (1 << 16) | 1);
        let inner = &call.args[0]["value"]["arguments"];
        assert_eq!(inner[0], "7");
        assert_eq!(inner[1]["arguments"][0], leaf.address.to_hex());
        assert_eq!(inner[1]["arguments"][1], leaf.amount.to_string());
        assert_eq!(inner[2].as_array().unwrap().len(), tree.depth());
    }
}

#[test]
fn proof_from_distributor_json_round_trips() {
    let leaves = epoch_leaves(3, 6, 7);
    let tree = MerkleTree::from_leaves(leaves).unwrap();
    let (leaf, proof) = tree.proof_for(&tree.leaves()[4].address).unwrap();

    // as published: bare hex siblings, 0x-prefixed root
    let published: Vec<String> = proof.siblings().iter().map(hex::encode).collect();
    let root_hex = format!("0x{}", hex::encode(tree.root()));
    let leaf_json = serde_json::to_string(&leaf).unwrap();

    let parsed_leaf: DistributionLeaf = serde_json::from_str(&leaf_json).unwrap();
    let parsed_proof = MerkleProof::from_hex_strings(&published).unwrap();
    let root = zwap_core::types::decode_hash32(&root_hex).unwrap();

    assert!(MerkleClaimVerifier::new(root).verify(parsed_leaf, parsed_proof).is_ok());
}

#[test]
fn tampered_amount_never_reaches_the_caller() {
    let leaves = epoch_leaves(1, 4, 99);
    let tree = MerkleTree::from_leaves(leaves).unwrap();
    let (mut leaf, proof) = tree.proof_for(&tree.leaves()[2].address).unwrap();
    leaf.amount += 1;

    let err = MerkleClaimVerifier::new(tree.root())
        .verify(leaf, proof)
        .unwrap_err();
    assert!(matches!(err, ZwapError::InvalidProof));
}

#[test]
fn proof_from_another_epoch_is_rejected() {
    let epoch_one = MerkleTree::from_leaves(epoch_leaves(1, 5, 1)).unwrap();
    let epoch_two = MerkleTree::from_leaves(epoch_leaves(2, 5, 2)).unwrap();
    let (leaf, proof) = epoch_one.proof_for(&epoch_one.leaves()[0].address).unwrap();

    assert!(MerkleClaimVerifier::new(epoch_two.root())
        .verify(leaf, proof)
        .is_err());
}

#[test]
fn rejected_transaction_surfaces_as_submission_error() {
    let tree = MerkleTree::from_leaves(epoch_leaves(5, 2, 3)).unwrap();
    let (leaf, proof) = tree.proof_for(&tree.leaves()[1].address).unwrap();
    let claim = MerkleClaimVerifier::new(tree.root()).verify(leaf, proof).unwrap();

    let reg = registry();
    let tx = ClaimRequestBuilder::new(&reg, GasPolicy::default())
        .build(&claim, &ClaimContext::connected(Network::MainNet, leaf.address), 0)
        .unwrap();

    let caller = RecordingCaller::new(false);
    let err = submit_claim(&caller, &tx).unwrap_err();
    assert!(matches!(err, ZwapError::Submission(_)));
    assert_eq!(caller.calls.borrow().len(), 1);
}

#[test]
fn other_wallet_cannot_claim() {
    let tree = MerkleTree::from_leaves(epoch_leaves(5, 3, 4)).unwrap();
    let (leaf, proof) = tree.proof_for(&tree.leaves()[0].address).unwrap();
    let claim = MerkleClaimVerifier::new(tree.root()).verify(leaf, proof).unwrap();
    let intruder = tree.leaves()[1].address;

    let reg = registry();
    let err = ClaimRequestBuilder::new(&reg, GasPolicy::default())
        .build(&claim, &ClaimContext::connected(Network::MainNet, intruder), 0)
        .unwrap_err();
    assert!(matches!(err, ZwapError::ClaimerMismatch { .. }));
}
