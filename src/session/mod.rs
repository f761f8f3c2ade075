//! Authenticated session
//!
//! - `store`: the session context and its transition function
//! - `profile`: userinfo fetching with stale-result discard
//! - `controller`: login and logout orchestration
//! - `credentials`: token set and user profile types

pub mod controller;
pub mod credentials;
pub mod profile;
pub mod store;

pub use controller::{LogoutAck, SessionController};
pub use credentials::{Credentials, UserProfile};
pub use profile::{FetchOutcome, ProfileFetcher};
pub use store::{Epoch, ProfileState, SessionReader, SessionState, SessionStore};
