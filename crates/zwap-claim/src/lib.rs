//! zwap-claim
//!
//! Turns a verified distribution leaf into the exact contract call that
//! claims it. Nothing here signs or broadcasts; submission goes through a
//! caller-supplied [`ContractCaller`].

pub mod args;
pub mod builder;
pub mod submit;

pub use args::{claim_args, AdtValue, ContractParam, ParamValue};
pub use builder::{pack_version, CallParams, ClaimContext, ClaimRequestBuilder, ClaimTransactionParams, GasPolicy};
pub use submit::{submit_claim, ContractCaller, SubmissionResult};
