//! Error type for `fleap-store-sqlite`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  #[error("json error: {0}")]
  Json(#[from] serde_json::Error),

  #[error("uuid parse error: {0}")]
  Uuid(#[from] uuid::Error),

  #[error("date/time parse error: {0}")]
  DateParse(String),

  /// An update targeted a user document that does not exist.
  #[error("user not found: {0}")]
  UserNotFound(fleap_core::user::UserId),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
