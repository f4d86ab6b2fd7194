//! Target network definition and reconciliation.
//!
//! # Data Flow
//! ```text
//! NetworkConfig (TOML)
//!     → chain.rs (ChainSpec, request parameters)
//!     → reconciler.rs (switch chain, add chain on 4902)
//!     → bool: wallet is on the target chain
//! ```

pub mod chain;
pub mod reconciler;

pub use chain::{AddChainParameter, ChainSpec, NativeCurrency, BASE_SEPOLIA_CHAIN_ID};
pub use reconciler::NetworkReconciler;
