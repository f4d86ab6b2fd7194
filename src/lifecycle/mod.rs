//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (startup.rs):
//!     Locate provider → Build store/gateway/connection → Advisory
//!     → Restore authorized account → Read value → Watch wallet events
//!
//! Reload (startup.rs):
//!     chainChanged → ReloadRequired notice → stop watcher → reset → startup
//!
//! Signals (signals.rs):
//!     SIGTERM/SIGINT → stop watching, exit
//! ```

pub mod signals;
pub mod startup;

pub use startup::DappClient;
