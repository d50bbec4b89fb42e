//! Error type for `fleap-session`.

use fleap_core::user::UserId;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SessionError {
  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),

  /// The caller's document was written but the target's was not. The
  /// relationship is one-sided until the same operation is issued again.
  #[error("relationship between {caller} and {target} left one-sided: {source}")]
  Asymmetric {
    caller: UserId,
    target: UserId,
    #[source]
    source: Box<dyn std::error::Error + Send + Sync>,
  },

  #[error("invalid post: {0}")]
  InvalidPost(String),

  #[error("password hashing failed: {0}")]
  Credential(String),
}

impl SessionError {
  pub(crate) fn store<E>(e: E) -> Self
  where
    E: std::error::Error + Send + Sync + 'static,
  {
    Self::Store(Box::new(e))
  }
}

pub type Result<T, E = SessionError> = std::result::Result<T, E>;
