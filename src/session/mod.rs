//! Session lifecycle and observable state.
//!
//! # Data Flow
//! ```text
//! ConnectionManager
//!     connect(): eth_requestAccounts → NetworkReconciler → commit
//!     restore_session(): eth_accounts + eth_chainId (no prompt)
//!     ChangeWatcher: accountsChanged / chainChanged push events
//!         ↓
//! SessionStore (watch channel) ──→ UI reads snapshots / awaits changes
//! Notifier (broadcast channel) ──→ UI shows notices
//! ```
//!
//! # Design Decisions
//! - Only the connection manager writes the session; the gateway writes the
//!   stored value and write phase
//! - Busy lanes are atomic flags taken through a scoped guard, released on
//!   every exit path
//! - Resets always produce a complete disconnected state

pub mod connection;
pub mod notice;
pub mod state;
pub mod store;

pub use connection::{ChangeWatcher, ConnectionManager};
pub use notice::{Notice, Notifier, Severity};
pub use state::{
    ConnectPhase, ConnectionStatus, PendingOperation, Session, SessionState, WritePhase,
    STORED_VALUE_SENTINEL,
};
pub use store::{Lane, PendingGuard, SessionStore};
