//! Posts — authored content referenced by id from `posts` and `feed` arrays.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::user::UserId;

/// Document key of a post in the `posts` collection.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct PostId(pub Uuid);

impl PostId {
  pub fn new() -> Self { Self(Uuid::new_v4()) }
}

impl Default for PostId {
  fn default() -> Self { Self::new() }
}

impl fmt::Display for PostId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { self.0.fmt(f) }
}

/// A persisted post. The id and timestamp are assigned by the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Post {
  pub id:         PostId,
  pub author_id:  UserId,
  pub content:    String,
  pub created_at: DateTime<Utc>,
}

/// Input to [`DocumentStore::add_post`](crate::store::DocumentStore::add_post).
#[derive(Debug, Clone)]
pub struct NewPost {
  pub author_id: UserId,
  pub content:   String,
}

/// Sort posts newest first, breaking timestamp ties by id for a stable order.
pub fn newest_first(posts: &mut [Post]) {
  posts.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
}
