//! The `DocumentStore` trait.
//!
//! The trait is implemented by storage backends ([`MemoryStore`] here,
//! `fleap-store-sqlite` for persistence). The session layer depends on this
//! abstraction, not on any concrete backend.
//!
//! [`MemoryStore`]: crate::memory::MemoryStore

use std::future::Future;

use crate::{
  notification::{NewNotification, Notification},
  post::{NewPost, Post, PostId},
  update::UserUpdate,
  user::{User, UserId},
};

/// Abstraction over a document database holding the `users`,
/// `notifications` and `posts` collections.
///
/// Writes to a single user document are atomic. Nothing spans two documents:
/// callers that need to touch two users issue two independent updates.
///
/// All methods return `Send` futures so the trait can be used in multi-threaded
/// async runtimes.
pub trait DocumentStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  // ── Users ─────────────────────────────────────────────────────────────

  /// Retrieve a user by id. Returns `None` if not found.
  fn get_user(
    &self,
    id: UserId,
  ) -> impl Future<Output = Result<Option<User>, Self::Error>> + Send + '_;

  /// Retrieve the first user whose email matches exactly (case-sensitive).
  fn find_user_by_email<'a>(
    &'a self,
    email: &'a str,
  ) -> impl Future<Output = Result<Option<User>, Self::Error>> + Send + 'a;

  /// Create the document, or overwrite it if the id is already taken.
  fn set_user<'a>(
    &'a self,
    user: &'a User,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + 'a;

  /// Apply `updates` in order to one user document as a single write.
  ///
  /// Returns an error if the document does not exist.
  fn update_user<'a>(
    &'a self,
    id: UserId,
    updates: &'a [UserUpdate],
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + 'a;

  // ── Notifications ─────────────────────────────────────────────────────

  /// Append a notification under a store-assigned id.
  fn add_notification(
    &self,
    input: NewNotification,
  ) -> impl Future<Output = Result<Notification, Self::Error>> + Send + '_;

  /// All notifications addressed to `target`, oldest first.
  fn notifications_for(
    &self,
    target: UserId,
  ) -> impl Future<Output = Result<Vec<Notification>, Self::Error>> + Send + '_;

  // ── Posts ─────────────────────────────────────────────────────────────

  /// Append a post under a store-assigned id.
  fn add_post(
    &self,
    input: NewPost,
  ) -> impl Future<Output = Result<Post, Self::Error>> + Send + '_;

  /// Retrieve a post by id. Returns `None` if not found.
  fn get_post(
    &self,
    id: PostId,
  ) -> impl Future<Output = Result<Option<Post>, Self::Error>> + Send + '_;
}
