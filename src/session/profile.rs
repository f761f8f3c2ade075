//! Profile fetching
//!
//! The fetcher watches the session store. Each authenticated transition gets
//! exactly one userinfo request, run on its own task and tagged with the epoch
//! it was issued under. The store rejects results whose epoch is no longer
//! current, so the cached profile always belongs to the newest credentials
//! regardless of which request finished first.

use std::sync::Arc;
use tokio::task::JoinHandle;

use super::credentials::Credentials;
use super::store::{Epoch, ProfileState, SessionStore};
use crate::auth::provider::IdentityProvider;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchOutcome {
    /// Profile stored for the current credentials
    Applied,
    /// Fetch failed; profile marked unavailable
    Failed,
    /// Credentials changed while the request was in flight
    Discarded,
}

#[derive(Clone)]
pub struct ProfileFetcher {
    store: SessionStore,
    provider: Arc<dyn IdentityProvider>,
}

impl ProfileFetcher {
    pub fn new(store: SessionStore, provider: Arc<dyn IdentityProvider>) -> Self {
        Self { store, provider }
    }

    /// Issue one profile request for `credentials` and apply the result
    /// against the store as it is when the request resolves.
    pub async fn fetch(&self, epoch: Epoch, credentials: Arc<Credentials>) -> FetchOutcome {
        tracing::debug!(event = "profile_fetch_start", ?epoch, "Fetching user profile");

        match self
            .provider
            .fetch_user_info(credentials.access_token())
            .await
        {
            Ok(profile) => {
                let has_nickname = profile.nickname.is_some();
                if self.store.complete_profile(epoch, Some(profile)) {
                    tracing::info!(
                        event = "profile_fetched",
                        ?epoch,
                        has_nickname,
                        "User profile loaded"
                    );
                    FetchOutcome::Applied
                } else {
                    tracing::debug!(
                        event = "profile_discarded",
                        ?epoch,
                        current = ?self.store.epoch(),
                        "Discarding profile for superseded credentials"
                    );
                    FetchOutcome::Discarded
                }
            }
            Err(e) => {
                if self.store.complete_profile(epoch, None) {
                    tracing::warn!(
                        event = "profile_fetch_failed",
                        ?epoch,
                        error = %e,
                        "Failed to fetch user profile"
                    );
                    FetchOutcome::Failed
                } else {
                    tracing::debug!(
                        event = "profile_discarded",
                        ?epoch,
                        error = %e,
                        "Ignoring failed fetch for superseded credentials"
                    );
                    FetchOutcome::Discarded
                }
            }
        }
    }

    /// Observe the store until the returned task is aborted
    pub fn spawn(self) -> JoinHandle<()> {
        tokio::spawn(self.run())
    }

    async fn run(self) {
        let mut rx = self.store.subscribe();
        let mut last_requested: Option<Epoch> = None;

        loop {
            let pending = {
                let state = rx.borrow_and_update();
                match (state.credentials(), state.profile_state()) {
                    (Some(credentials), ProfileState::Pending)
                        if last_requested != Some(state.epoch()) =>
                    {
                        Some((state.epoch(), credentials.clone()))
                    }
                    _ => None,
                }
            };

            if let Some((epoch, credentials)) = pending {
                last_requested = Some(epoch);
                let fetcher = self.clone();
                tokio::spawn(async move {
                    fetcher.fetch(epoch, credentials).await;
                });
            }

            if rx.changed().await.is_err() {
                break;
            }
        }
    }
}
