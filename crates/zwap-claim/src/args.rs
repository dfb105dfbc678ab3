//! Contract call arguments.
//!
//! The distributor's `Claim` transition takes a single `claim` parameter of
//! ADT type `Claim`, itself wrapping the epoch, a `DistributionLeaf` and the
//! proof. Every ADT value is written `{constructor, argtypes, arguments}`;
//! numbers travel as decimal strings and byte strings as `0x` hex.

use serde::{Deserialize, Serialize};
use zwap_crypto::VerifiedClaim;

/// One named transition parameter.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContractParam {
    pub vname: String,
    #[serde(rename = "type")]
    pub ty: String,
    pub value: ParamValue,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParamValue {
    Str(String),
    List(Vec<ParamValue>),
    Adt(AdtValue),
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdtValue {
    pub constructor: String,
    pub argtypes: Vec<String>,
    pub arguments: Vec<ParamValue>,
}

impl AdtValue {
    pub fn new(constructor: &str, arguments: Vec<ParamValue>) -> Self {
        Self {
            constructor: constructor.to_string(),
            argtypes: Vec::new(),
            arguments,
        }
    }
}

/// Arguments for the `Claim` transition. Only a [`VerifiedClaim`] is
/// accepted, so the proof has already been checked against the root.
pub fn claim_args(claim: &VerifiedClaim) -> Vec<ContractParam> {
    let leaf = claim.leaf();
    let leaf_value = AdtValue::new(
        "DistributionLeaf",
        vec![
            ParamValue::Str(leaf.address.to_hex()),
            ParamValue::Str(leaf.amount.to_string()),
        ],
    );
    let proof = claim
        .proof()
        .to_prefixed_hex()
        .into_iter()
        .map(ParamValue::Str)
        .collect();

    vec![ContractParam {
        vname: "claim".to_string(),
        ty: "Claim".to_string(),
        value: ParamValue::Adt(AdtValue::new(
            "Claim",
            vec![
                ParamValue::Str(leaf.epoch.to_string()),
                ParamValue::Adt(leaf_value),
                ParamValue::List(proof),
            ],
        )),
    }]
}
