//! Session state for a Fleap client.
//!
//! [`SessionStore`] holds the single authenticated user and exposes the
//! account and relationship operations available to them. It is an explicit
//! value: callers construct one per client session and pass it where needed.
//! Remote state lives behind any [`fleap_core::DocumentStore`].

pub mod credential;
pub mod error;
pub mod seed;
pub mod session;

pub use error::{Result, SessionError};
pub use session::{FollowOutcome, SessionStore};
