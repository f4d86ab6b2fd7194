//! Wallet connection and storage-contract client.
//!
//! Connects to an injected wallet provider, keeps it on the target chain,
//! and reads/writes a single integer held by a storage contract.

pub mod config;
pub mod contract;
pub mod error;
pub mod lifecycle;
pub mod network;
pub mod observability;
pub mod provider;
pub mod session;

pub use config::schema::DappConfig;
pub use error::{ConnectError, FailureKind, ReadError, TxError};
pub use lifecycle::DappClient;
pub use provider::{HostEnvironment, WalletProvider};
