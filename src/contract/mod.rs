//! Storage contract access.
//!
//! # Data Flow
//! ```text
//! read:  getValue() calldata → eth_call → uint256 → decimal string → store
//! write: setValue(v) calldata → eth_sendTransaction → tx hash (submitted)
//!        → eth_getTransactionReceipt polling → confirmed | failed
//!        → read refresh → write lane released
//! ```
//!
//! # Design Decisions
//! - All calls go through the wallet provider; the wallet signs writes
//! - Read failures keep the last displayed value
//! - No timeout on confirmation; the chain and wallet decide

pub mod abi;
pub mod confirmation;
pub mod gateway;

pub use confirmation::Confirmation;
pub use gateway::{ContractGateway, PendingWrite};
