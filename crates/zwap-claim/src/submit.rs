use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use zwap_core::error::ZwapError;
use zwap_core::types::Address;

use crate::args::ContractParam;
use crate::builder::{CallParams, ClaimTransactionParams};

/// Outcome reported by the transaction submitter.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmissionResult {
    pub tx_id: String,
    pub accepted: bool,
}

/// Capability to invoke a contract transition. Implemented by the wallet or
/// RPC layer; signing happens behind this trait.
pub trait ContractCaller {
    fn call_contract(
        &self,
        contract: &Address,
        entry_point: &str,
        args: &[ContractParam],
        params: &CallParams,
    ) -> Result<SubmissionResult, ZwapError>;
}

/// Send a built claim through `caller`. A rejected transaction is returned as
/// `ZwapError::Submission`. Exactly-once is enforced by the contract; callers
/// keep at most one submission in flight per (address, epoch).
pub fn submit_claim<C: ContractCaller + ?Sized>(
    caller: &C,
    tx: &ClaimTransactionParams,
) -> Result<SubmissionResult, ZwapError> {
    let result = caller.call_contract(
        tx.contract_address(),
        tx.entry_point(),
        tx.args(),
        &tx.call_params(),
    )?;

    if !result.accepted {
        warn!(tx_id = %result.tx_id, contract = %tx.contract_address(), "claim rejected");
        return Err(ZwapError::Submission(format!(
            "transaction {} rejected",
            result.tx_id
        )));
    }
    info!(tx_id = %result.tx_id, contract = %tx.contract_address(), "claim submitted");
    Ok(result)
}
