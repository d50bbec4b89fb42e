//! [`MemoryStore`] — an in-process [`DocumentStore`].
//!
//! Backs tests and throwaway sessions. Locks are never held across an
//! `.await`.

use std::{
  collections::HashMap,
  sync::{Arc, RwLock},
};

use chrono::Utc;
use uuid::Uuid;

use crate::{
  Error, Result,
  notification::{NewNotification, Notification},
  post::{NewPost, Post, PostId},
  store::DocumentStore,
  update::UserUpdate,
  user::{User, UserId},
};

#[derive(Default)]
struct Collections {
  users:         HashMap<UserId, User>,
  notifications: Vec<Notification>,
  posts:         HashMap<PostId, Post>,
}

/// A document store held entirely in memory.
///
/// Cloning is cheap — clones share the same collections.
#[derive(Clone, Default)]
pub struct MemoryStore {
  inner: Arc<RwLock<Collections>>,
}

impl MemoryStore {
  pub fn new() -> Self { Self::default() }

  fn read<R>(&self, f: impl FnOnce(&Collections) -> R) -> Result<R> {
    let guard = self.inner.read().map_err(|_| Error::Poisoned)?;
    Ok(f(&*guard))
  }

  fn write<R>(&self, f: impl FnOnce(&mut Collections) -> R) -> Result<R> {
    let mut guard = self.inner.write().map_err(|_| Error::Poisoned)?;
    Ok(f(&mut *guard))
  }
}

impl DocumentStore for MemoryStore {
  type Error = Error;

  async fn get_user(&self, id: UserId) -> Result<Option<User>> {
    self.read(|c| c.users.get(&id).cloned())
  }

  async fn find_user_by_email(&self, email: &str) -> Result<Option<User>> {
    self.read(|c| {
      c.users
        .values()
        .filter(|u| u.email == email)
        .min_by_key(|u| u.created_at)
        .cloned()
    })
  }

  async fn set_user(&self, user: &User) -> Result<()> {
    self.write(|c| {
      c.users.insert(user.id, user.clone());
    })
  }

  async fn update_user(&self, id: UserId, updates: &[UserUpdate]) -> Result<()> {
    self.write(|c| match c.users.get_mut(&id) {
      Some(user) => {
        user.apply_all(updates);
        Ok(())
      }
      None => Err(Error::UserNotFound(id)),
    })?
  }

  async fn add_notification(&self, input: NewNotification) -> Result<Notification> {
    let notification = Notification {
      id:             Uuid::new_v4(),
      target_user_id: input.target_user_id,
      message:        input.message,
      created_at:     Utc::now(),
    };
    self.write(|c| c.notifications.push(notification.clone()))?;
    Ok(notification)
  }

  async fn notifications_for(&self, target: UserId) -> Result<Vec<Notification>> {
    self.read(|c| {
      c.notifications
        .iter()
        .filter(|n| n.target_user_id == target)
        .cloned()
        .collect()
    })
  }

  async fn add_post(&self, input: NewPost) -> Result<Post> {
    let post = Post {
      id:         PostId::new(),
      author_id:  input.author_id,
      content:    input.content,
      created_at: Utc::now(),
    };
    self.write(|c| c.posts.insert(post.id, post.clone()))?;
    Ok(post)
  }

  async fn get_post(&self, id: PostId) -> Result<Option<Post>> {
    self.read(|c| c.posts.get(&id).cloned())
  }
}
