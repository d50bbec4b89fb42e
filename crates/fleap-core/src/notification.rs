//! Notifications — append-only records addressed to a user.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::user::UserId;

/// A persisted notification. The id and timestamp are assigned by the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
  pub id:             Uuid,
  pub target_user_id: UserId,
  pub message:        String,
  pub created_at:     DateTime<Utc>,
}

/// Input to
/// [`DocumentStore::add_notification`](crate::store::DocumentStore::add_notification).
#[derive(Debug, Clone)]
pub struct NewNotification {
  pub target_user_id: UserId,
  pub message:        String,
}

impl NewNotification {
  /// The notice sent to `target` when `follower_name` starts following them.
  pub fn followed_by(target: UserId, follower_name: &str) -> Self {
    Self {
      target_user_id: target,
      message:        format!("{follower_name} started following you"),
    }
  }
}
