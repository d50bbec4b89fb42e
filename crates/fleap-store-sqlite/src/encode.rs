//! Encoding and decoding helpers between Rust domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! All timestamps are stored as RFC 3339 strings. User documents are stored as
//! compact JSON. UUIDs are stored as hyphenated lowercase strings.

use chrono::{DateTime, Utc};
use fleap_core::{
  notification::Notification,
  post::{Post, PostId},
  user::{User, UserId},
};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Uuid ─────────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

pub fn decode_uuid(s: &str) -> Result<Uuid> { Ok(Uuid::parse_str(s)?) }

// ─── DateTime<Utc> ────────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339() }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── User documents ───────────────────────────────────────────────────────────

pub fn encode_user(user: &User) -> Result<String> { Ok(serde_json::to_string(user)?) }

pub fn decode_user(s: &str) -> Result<User> { Ok(serde_json::from_str(s)?) }

// ─── Raw row types ────────────────────────────────────────────────────────────

/// A `notifications` row as read from SQLite, before parsing.
pub struct RawNotification {
  pub notification_id: String,
  pub target_user_id:  String,
  pub message:         String,
  pub created_at:      String,
}

impl RawNotification {
  pub fn into_notification(self) -> Result<Notification> {
    Ok(Notification {
      id:             decode_uuid(&self.notification_id)?,
      target_user_id: UserId(decode_uuid(&self.target_user_id)?),
      message:        self.message,
      created_at:     decode_dt(&self.created_at)?,
    })
  }
}

/// A `posts` row as read from SQLite, before parsing.
pub struct RawPost {
  pub post_id:    String,
  pub author_id:  String,
  pub content:    String,
  pub created_at: String,
}

impl RawPost {
  pub fn into_post(self) -> Result<Post> {
    Ok(Post {
      id:         PostId(decode_uuid(&self.post_id)?),
      author_id:  UserId(decode_uuid(&self.author_id)?),
      content:    self.content,
      created_at: decode_dt(&self.created_at)?,
    })
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn dt_survives_text_form() {
    let now = Utc::now();
    assert_eq!(decode_dt(&encode_dt(now)).unwrap(), now);
  }

  #[test]
  fn bad_dt_is_reported() {
    assert!(matches!(decode_dt("yesterday"), Err(Error::DateParse(_))));
  }

  #[test]
  fn bad_uuid_is_reported() {
    assert!(matches!(decode_uuid("not-a-uuid"), Err(Error::Uuid(_))));
  }

  #[test]
  fn raw_post_with_bad_author_fails() {
    let raw = RawPost {
      post_id:    encode_uuid(Uuid::new_v4()),
      author_id:  "nope".into(),
      content:    "hi".into(),
      created_at: encode_dt(Utc::now()),
    };
    assert!(raw.into_post().is_err());
  }
}
