//! User documents — the records stored in the `users` collection.
//!
//! A user document carries the account credentials and four set-like array
//! fields. `following`/`followers` are kept as inverses of each other by the
//! session layer; the store only ever sees independent array updates.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
  post::PostId,
  update::{ArrayOp, UserUpdate},
};

// ─── Identity ────────────────────────────────────────────────────────────────

/// Document key of a user in the `users` collection.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct UserId(pub Uuid);

impl UserId {
  pub fn new() -> Self { Self(Uuid::new_v4()) }
}

impl Default for UserId {
  fn default() -> Self { Self::new() }
}

impl fmt::Display for UserId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { self.0.fmt(f) }
}

/// The display name derived from an email address: everything before the
/// first `@`, or the whole address when it has none.
pub fn username_from_email(email: &str) -> &str {
  email.split_once('@').map_or(email, |(name, _)| name)
}

// ─── Document ────────────────────────────────────────────────────────────────

/// A full user document as persisted in the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
  pub id:            UserId,
  pub email:         String,
  pub username:      String,
  /// PHC string produced by argon2, e.g. `$argon2id$v=19$…`
  pub password_hash: String,
  #[serde(default)]
  pub posts:         Vec<PostId>,
  #[serde(default)]
  pub following:     Vec<UserId>,
  #[serde(default)]
  pub followers:     Vec<UserId>,
  /// Denormalized union of the posts of every account in `following`.
  #[serde(default)]
  pub feed:          Vec<PostId>,
  pub created_at:    DateTime<Utc>,
}

impl User {
  /// A freshly signed-up account: empty relationship sets, zero counters.
  pub fn new(email: impl Into<String>, password_hash: impl Into<String>) -> Self {
    let email = email.into();
    Self {
      id: UserId::new(),
      username: username_from_email(&email).to_owned(),
      email,
      password_hash: password_hash.into(),
      posts: Vec::new(),
      following: Vec::new(),
      followers: Vec::new(),
      feed: Vec::new(),
      created_at: Utc::now(),
    }
  }

  pub fn post_count(&self) -> usize { self.posts.len() }

  pub fn following_count(&self) -> usize { self.following.len() }

  pub fn follower_count(&self) -> usize { self.followers.len() }

  pub fn is_following(&self, other: UserId) -> bool {
    self.following.contains(&other)
  }

  /// Apply a single array-field update in place.
  pub fn apply(&mut self, update: &UserUpdate) {
    match update {
      UserUpdate::Posts(op) => op.apply(&mut self.posts),
      UserUpdate::Following(op) => op.apply(&mut self.following),
      UserUpdate::Followers(op) => op.apply(&mut self.followers),
      UserUpdate::Feed(op) => op.apply(&mut self.feed),
    }
  }

  /// Apply a batch of updates in order.
  pub fn apply_all(&mut self, updates: &[UserUpdate]) {
    for update in updates {
      self.apply(update);
    }
  }

  /// The `following` union for `target`, or `None` when `target` is this user.
  pub fn follow_op(&self, target: UserId) -> Option<UserUpdate> {
    (target != self.id).then(|| UserUpdate::Following(ArrayOp::Union(vec![target])))
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn username_is_text_before_at() {
    assert_eq!(username_from_email("a@b.com"), "a");
    assert_eq!(username_from_email("cneal005@ucr.edu"), "cneal005");
    assert_eq!(username_from_email("no-at-sign"), "no-at-sign");
    assert_eq!(username_from_email("x@y@z"), "x");
  }

  #[test]
  fn new_user_has_zeroed_counters() {
    let user = User::new("a@b.com", "hash");
    assert_eq!(user.username, "a");
    assert_eq!(user.post_count(), 0);
    assert_eq!(user.following_count(), 0);
    assert_eq!(user.follower_count(), 0);
    assert!(user.feed.is_empty());
  }

  #[test]
  fn follow_op_refuses_self() {
    let user = User::new("a@b.com", "hash");
    assert!(user.follow_op(user.id).is_none());
    assert!(user.follow_op(UserId::new()).is_some());
  }

  #[test]
  fn document_uses_plain_uuid_strings() {
    let mut user = User::new("a@b.com", "hash");
    let other = UserId::new();
    user.following.push(other);

    let json = serde_json::to_value(&user).unwrap();
    assert_eq!(json["following"][0], serde_json::json!(other.0.to_string()));
    assert_eq!(json["id"], serde_json::json!(user.id.0.to_string()));
  }

  #[test]
  fn missing_arrays_default_to_empty() {
    let json = serde_json::json!({
      "id":            UserId::new(),
      "email":         "a@b.com",
      "username":      "a",
      "password_hash": "hash",
      "created_at":    Utc::now(),
    });
    let user: User = serde_json::from_value(json).unwrap();
    assert!(user.posts.is_empty() && user.followers.is_empty());
  }
}
