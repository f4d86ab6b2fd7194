//! Observable session state with busy-lane guards.

use alloy::primitives::Address;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use tokio::sync::{watch, Notify};

use crate::session::state::{ConnectPhase, Session, SessionState, WritePhase, STORED_VALUE_SENTINEL};

/// Independent kinds of in-flight work. At most one of each runs at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lane {
    Connect,
    Write,
    Read,
}

/// Holds the reconciled state consumed by the UI.
#[derive(Debug)]
pub struct SessionStore {
    target_chain: u64,
    state: watch::Sender<SessionState>,
    connect_busy: AtomicBool,
    write_busy: AtomicBool,
    read_busy: AtomicBool,
    released: Notify,
    /// Bumped whenever the wallet reports a different account set.
    account_epoch: AtomicU64,
}

impl SessionStore {
    pub fn new(target_chain: u64, provider_available: bool) -> Self {
        let (state, _) = watch::channel(SessionState {
            provider_available,
            ..SessionState::default()
        });
        Self {
            target_chain,
            state,
            connect_busy: AtomicBool::new(false),
            write_busy: AtomicBool::new(false),
            read_busy: AtomicBool::new(false),
            released: Notify::new(),
            account_epoch: AtomicU64::new(0),
        }
    }

    pub fn target_chain(&self) -> u64 {
        self.target_chain
    }

    pub fn snapshot(&self) -> SessionState {
        self.state.borrow().clone()
    }

    /// Receive every subsequent state change.
    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.state.subscribe()
    }

    pub fn session(&self) -> Session {
        self.state.borrow().session.clone()
    }

    pub fn stored_value(&self) -> String {
        self.state.borrow().stored_value.clone()
    }

    pub fn is_busy(&self, lane: Lane) -> bool {
        self.flag(lane).load(Ordering::Acquire)
    }

    /// Claim a lane. Returns `None` if it is already taken.
    pub fn try_begin(&self, lane: Lane) -> Option<PendingGuard<'_>> {
        self.flag(lane)
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()?;
        if lane == Lane::Read {
            self.update(|s| s.reading = true);
        }
        Some(PendingGuard { store: self, lane })
    }

    /// Claim a lane, waiting for the current holder to release it.
    pub async fn begin(&self, lane: Lane) -> PendingGuard<'_> {
        loop {
            let released = self.released.notified();
            tokio::pin!(released);
            released.as_mut().enable();
            if let Some(guard) = self.try_begin(lane) {
                return guard;
            }
            released.await;
        }
    }

    fn flag(&self, lane: Lane) -> &AtomicBool {
        match lane {
            Lane::Connect => &self.connect_busy,
            Lane::Write => &self.write_busy,
            Lane::Read => &self.read_busy,
        }
    }

    fn update(&self, f: impl FnOnce(&mut SessionState)) {
        self.state.send_modify(f);
    }

    pub(crate) fn set_connect_phase(&self, phase: ConnectPhase) {
        self.update(|s| s.connect_phase = phase);
    }

    pub(crate) fn set_write_phase(&self, phase: WritePhase) {
        self.update(|s| s.write_phase = phase);
    }

    pub(crate) fn set_stored_value(&self, value: String) {
        self.update(|s| s.stored_value = value);
    }

    /// Current account-change epoch. Pass it back to [`Self::commit_session`].
    pub(crate) fn account_epoch(&self) -> u64 {
        self.account_epoch.load(Ordering::Acquire)
    }

    /// Record a verified connection on the target chain.
    ///
    /// If the wallet reported an account change since `epoch`, the latest
    /// reported account wins over `account`. Returns `None` when that change
    /// left no account, in which case nothing is committed.
    pub(crate) fn commit_session(&self, account: Address, epoch: u64) -> Option<Session> {
        let target = self.target_chain;
        let mut committed = None;
        self.update(|s| {
            let account = if self.account_epoch.load(Ordering::Acquire) == epoch {
                Some(account)
            } else {
                s.session.account
            };
            if let Some(account) = account {
                s.active_chain = Some(target);
                s.session = Session {
                    account: Some(account),
                    connected: true,
                };
                committed = Some(s.session.clone());
            }
        });
        committed
    }

    /// Adopt an account restored at startup, usable only if already on target.
    pub(crate) fn restore_session(&self, account: Address, chain: Option<u64>) -> Session {
        let target = self.target_chain;
        self.update(|s| {
            s.active_chain = chain;
            s.session = Session {
                account: Some(account),
                connected: chain == Some(target),
            };
        });
        self.session()
    }

    /// Switch to another authorized account without re-checking the network.
    ///
    /// Returns whether the session is connected afterwards.
    pub(crate) fn adopt_account(&self, account: Address) -> bool {
        let target = self.target_chain;
        self.update(|s| {
            self.account_epoch.fetch_add(1, Ordering::AcqRel);
            s.session = Session {
                account: Some(account),
                connected: s.active_chain == Some(target),
            };
        });
        self.session().connected
    }

    /// Drop the session after a failed connection attempt.
    pub(crate) fn reset_session(&self) {
        self.update(|s| s.session = Session::disconnected());
    }

    /// Drop the session and the displayed value (account access revoked).
    pub(crate) fn reset_disconnected(&self) {
        self.update(|s| {
            self.account_epoch.fetch_add(1, Ordering::AcqRel);
            s.session = Session::disconnected();
            s.stored_value = STORED_VALUE_SENTINEL.to_string();
        });
    }

    /// Return to freshly-started state, keeping provider availability and
    /// the phases of operations that still hold a lane.
    pub(crate) fn reset_all(&self) {
        self.update(|s| {
            *s = SessionState {
                provider_available: s.provider_available,
                connect_phase: s.connect_phase,
                write_phase: s.write_phase,
                reading: s.reading,
                ..SessionState::default()
            };
        });
    }
}

/// Scoped claim on a lane; releasing it clears the published phase.
#[derive(Debug)]
pub struct PendingGuard<'a> {
    store: &'a SessionStore,
    lane: Lane,
}

impl PendingGuard<'_> {
    pub fn lane(&self) -> Lane {
        self.lane
    }
}

impl Drop for PendingGuard<'_> {
    fn drop(&mut self) {
        match self.lane {
            Lane::Connect => self.store.set_connect_phase(ConnectPhase::Idle),
            Lane::Write => self.store.set_write_phase(WritePhase::Idle),
            Lane::Read => self.store.update(|s| s.reading = false),
        }
        self.store.flag(self.lane).store(false, Ordering::Release);
        self.store.released.notify_waiters();
    }
}
