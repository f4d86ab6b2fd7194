//! Wallet provider capability surface.
//!
//! # Data Flow
//! ```text
//! HostEnvironment (injected providers)
//!     → locator.rs (select preferred wallet, advisory otherwise)
//!     → ProviderHandle (Arc<dyn WalletProvider>, shared read-only)
//!     → request(method, params) for accounts, chain switching, calls, txs
//!     → on/remove_listener for accountsChanged / chainChanged
//! ```
//!
//! # Design Decisions
//! - One provider handle per process, passed explicitly rather than looked up
//! - Errors carry EIP-1193 numeric codes so callers can branch on them
//! - Event delivery goes through per-listener channels; listeners are removed
//!   explicitly by id

pub mod dev_wallet;
pub mod events;
pub mod locator;
pub mod requests;
pub mod types;

pub use dev_wallet::DevWallet;
pub use events::ListenerRegistry;
pub use locator::{Advisory, HostEnvironment, Located, ProviderLocator};
pub use types::{
    EventKind, Listener, ListenerId, ProviderEvent, ProviderHandle, ProviderIdentity,
    ProviderRpcError, WalletProvider,
};
