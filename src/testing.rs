//! Test doubles for the external collaborators

use async_trait::async_trait;
use oauth2::AccessToken;
use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Mutex, PoisonError};
use tokio::sync::oneshot;

use crate::auth::provider::{IdentityProvider, ProviderError};
use crate::navigation::{Navigator, Route};
use crate::platform::{OpenError, UrlOpener};
use crate::session::{Credentials, UserProfile};

type ProfileResult = Result<UserProfile, ProviderError>;

/// Scripted identity provider
///
/// Profiles are looked up by access token. A gated token blocks its fetch
/// until the test sends the result, which lets tests pick completion order.
#[derive(Default)]
pub struct FakeProvider {
    logins: Mutex<VecDeque<Result<Credentials, ProviderError>>>,
    profiles: Mutex<HashMap<String, UserProfile>>,
    gates: Mutex<HashMap<String, oneshot::Receiver<ProfileResult>>>,
    logout_fails: AtomicBool,
    user_info_calls: AtomicUsize,
    logout_calls: AtomicUsize,
}

impl FakeProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_login(&self, result: Result<Credentials, ProviderError>) {
        lock(&self.logins).push_back(result);
    }

    pub fn set_profile(&self, token: &str, profile: UserProfile) {
        lock(&self.profiles).insert(token.to_string(), profile);
    }

    pub fn gate(&self, token: &str) -> oneshot::Sender<ProfileResult> {
        let (tx, rx) = oneshot::channel();
        lock(&self.gates).insert(token.to_string(), rx);
        tx
    }

    pub fn fail_logout(&self) {
        self.logout_fails.store(true, Ordering::SeqCst);
    }

    pub fn user_info_calls(&self) -> usize {
        self.user_info_calls.load(Ordering::SeqCst)
    }

    pub fn logout_calls(&self) -> usize {
        self.logout_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl IdentityProvider for FakeProvider {
    async fn login(&self) -> Result<Credentials, ProviderError> {
        lock(&self.logins)
            .pop_front()
            .unwrap_or(Err(ProviderError::Cancelled))
    }

    async fn logout(&self) -> Result<(), ProviderError> {
        self.logout_calls.fetch_add(1, Ordering::SeqCst);
        if self.logout_fails.load(Ordering::SeqCst) {
            Err(ProviderError::Cancelled)
        } else {
            Ok(())
        }
    }

    async fn fetch_user_info(&self, access_token: &AccessToken) -> ProfileResult {
        self.user_info_calls.fetch_add(1, Ordering::SeqCst);
        let token = access_token.secret().as_str();

        let gate = lock(&self.gates).remove(token);
        if let Some(gate) = gate {
            return gate.await.unwrap_or(Err(ProviderError::Cancelled));
        }

        lock(&self.profiles)
            .get(token)
            .cloned()
            .ok_or(ProviderError::Rejected {
                endpoint: "userinfo",
                status: 401,
            })
    }
}

/// Records every open attempt; URIs in the failing set are rejected
#[derive(Default)]
pub struct RecordingOpener {
    failing: Mutex<HashSet<String>>,
    attempts: Mutex<Vec<String>>,
}

impl RecordingOpener {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_on(&self, uri: &str) {
        lock(&self.failing).insert(uri.to_string());
    }

    pub fn attempts(&self) -> Vec<String> {
        lock(&self.attempts).clone()
    }
}

#[async_trait]
impl UrlOpener for RecordingOpener {
    async fn open_url(&self, uri: &str) -> Result<(), OpenError> {
        lock(&self.attempts).push(uri.to_string());
        if lock(&self.failing).contains(uri) {
            Err(OpenError::NoHandler(uri.to_string()))
        } else {
            Ok(())
        }
    }
}

#[derive(Default)]
pub struct RecordingNavigator {
    routes: Mutex<Vec<Route>>,
}

impl RecordingNavigator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn routes(&self) -> Vec<Route> {
        lock(&self.routes).clone()
    }
}

impl Navigator for RecordingNavigator {
    fn navigate(&self, route: Route) {
        lock(&self.routes).push(route);
    }
}

fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
