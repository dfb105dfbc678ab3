pub mod amount;
pub mod constants;
pub mod error;
pub mod leaf;
pub mod network;
pub mod types;

pub use amount::Amount;
pub use constants::*;
pub use error::ZwapError;
pub use leaf::{DistributionLeaf, MerkleProof};
pub use network::{Network, NetworkEntry, NetworkRegistry};
pub use types::*;
