//! Session context
//!
//! One writer applies credential transitions through [`SessionStore`]; any
//! number of readers observe them through a [`SessionReader`], which has no
//! way to change the session. Every transition advances the
//! [`Epoch`], and profile results are only accepted for the epoch they were
//! requested under.

use super::credentials::{Credentials, UserProfile};
use std::sync::Arc;
use tokio::sync::watch;

/// Identifies one credential transition
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Epoch(u64);

impl Epoch {
    fn next(self) -> Self {
        Epoch(self.0 + 1)
    }
}

#[derive(Debug, Clone, Default)]
pub enum ProfileState {
    /// No credentials, so nothing to fetch
    #[default]
    Absent,
    /// Credentials present, fetch not yet resolved
    Pending,
    Ready(Arc<UserProfile>),
    /// Fetch failed; the UI renders without a nickname
    Unavailable,
}

#[derive(Debug, Clone, Default)]
pub struct SessionState {
    epoch: Epoch,
    credentials: Option<Arc<Credentials>>,
    profile: ProfileState,
}

impl SessionState {
    pub fn epoch(&self) -> Epoch {
        self.epoch
    }

    pub fn is_authenticated(&self) -> bool {
        self.credentials.is_some()
    }

    pub fn credentials(&self) -> Option<&Arc<Credentials>> {
        self.credentials.as_ref()
    }

    pub fn profile_state(&self) -> &ProfileState {
        &self.profile
    }

    pub fn profile(&self) -> Option<&UserProfile> {
        match &self.profile {
            ProfileState::Ready(profile) => Some(profile),
            _ => None,
        }
    }

    /// Nickname for the greeting, absent while pending or after a failed fetch
    pub fn nickname(&self) -> Option<&str> {
        self.profile().and_then(|p| p.nickname.as_deref())
    }
}

#[derive(Debug, Clone)]
pub struct SessionStore {
    tx: Arc<watch::Sender<SessionState>>,
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionStore {
    /// Create an anonymous session
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(SessionState::default());
        Self { tx: Arc::new(tx) }
    }

    /// Replace the current credentials (last write wins)
    ///
    /// `Some` starts a pending profile fetch; `None` ends the session and
    /// drops the cached profile in the same update, so Anonymous is never
    /// observed alongside a profile.
    pub fn apply_credentials(&self, credentials: Option<Credentials>) -> Epoch {
        let mut applied = Epoch::default();
        self.tx.send_modify(|state| {
            state.epoch = state.epoch.next();
            state.profile = if credentials.is_some() {
                ProfileState::Pending
            } else {
                ProfileState::Absent
            };
            state.credentials = credentials.map(Arc::new);
            applied = state.epoch;
        });

        tracing::debug!(
            event = "session_transition",
            epoch = applied.0,
            authenticated = self.is_authenticated(),
            "Credentials applied"
        );
        applied
    }

    /// Record the outcome of a profile fetch issued under `epoch`
    ///
    /// `None` marks the profile unavailable. Returns false, leaving the state
    /// untouched, when the epoch has been superseded.
    pub fn complete_profile(&self, epoch: Epoch, profile: Option<UserProfile>) -> bool {
        self.tx.send_if_modified(|state| {
            if state.epoch != epoch || state.credentials.is_none() {
                return false;
            }
            state.profile = match profile {
                Some(profile) => ProfileState::Ready(Arc::new(profile)),
                None => ProfileState::Unavailable,
            };
            true
        })
    }

    pub fn credentials(&self) -> Option<Arc<Credentials>> {
        self.tx.borrow().credentials.clone()
    }

    pub fn is_authenticated(&self) -> bool {
        self.tx.borrow().is_authenticated()
    }

    pub fn epoch(&self) -> Epoch {
        self.tx.borrow().epoch
    }

    pub fn snapshot(&self) -> SessionState {
        self.tx.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.tx.subscribe()
    }

    /// Read-only handle onto this session
    pub fn reader(&self) -> SessionReader {
        SessionReader {
            tx: self.tx.clone(),
        }
    }
}

/// Read side of a [`SessionStore`]
#[derive(Debug, Clone)]
pub struct SessionReader {
    tx: Arc<watch::Sender<SessionState>>,
}

impl SessionReader {
    pub fn credentials(&self) -> Option<Arc<Credentials>> {
        self.tx.borrow().credentials.clone()
    }

    pub fn is_authenticated(&self) -> bool {
        self.tx.borrow().is_authenticated()
    }

    pub fn epoch(&self) -> Epoch {
        self.tx.borrow().epoch
    }

    pub fn snapshot(&self) -> SessionState {
        self.tx.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.tx.subscribe()
    }
}
