//! [`SessionStore`] — the authenticated user and the operations open to them.
//!
//! The session is either logged out or holds one [`User`]. Every action
//! writes to the [`DocumentStore`] first and patches the local copy of the
//! session user only after the writes it depends on have succeeded.
//! Subscribers obtained through [`SessionStore::subscribe`] see each patch.
//!
//! Follow and unfollow touch two documents with two independent writes. If
//! the second write fails the first is not rolled back; the error is
//! [`SessionError::Asymmetric`] and issuing the same call again repairs the
//! relationship, since both writes are idempotent.

use std::sync::Arc;

use fleap_core::{
  DocumentStore, Lookup,
  notification::{NewNotification, Notification},
  post::{NewPost, Post, PostId, newest_first},
  update::{ArrayOp, UserUpdate},
  user::{User, UserId},
};
use serde::Serialize;
use tokio::sync::watch;

use crate::{Result, SessionError, credential};

/// Longest accepted post body, in characters.
pub const MAX_POST_LEN: usize = 5000;

/// What a follow or unfollow call did.
///
/// Only `Followed` and `Unfollowed` mean the store was written to; the other
/// variants are guards that leave every document untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FollowOutcome {
  Followed,
  Unfollowed,
  NotLoggedIn,
  SelfFollow,
  TargetMissing,
}

// ─── Session ─────────────────────────────────────────────────────────────────

/// Client-side session over a shared document store.
pub struct SessionStore<S: DocumentStore> {
  store: Arc<S>,
  user:  watch::Sender<Option<User>>,
}

impl<S: DocumentStore> SessionStore<S> {
  /// A logged-out session.
  pub fn new(store: Arc<S>) -> Self {
    let (user, _) = watch::channel(None);
    Self { store, user }
  }

  pub fn store(&self) -> &Arc<S> { &self.store }

  // ── Reactive state ────────────────────────────────────────────────────────

  /// Snapshot of the session user.
  pub fn user(&self) -> Option<User> { self.user.borrow().clone() }

  pub fn is_logged_in(&self) -> bool { self.user.borrow().is_some() }

  /// Watch the session user. The receiver starts at the current value.
  pub fn subscribe(&self) -> watch::Receiver<Option<User>> { self.user.subscribe() }

  fn current_id(&self) -> Option<UserId> { self.user.borrow().as_ref().map(|u| u.id) }

  fn set_user(&self, user: Option<User>) { self.user.send_replace(user); }

  /// Apply `updates` to the local copy if `id` is still the session user.
  fn patch(&self, id: UserId, updates: &[UserUpdate]) {
    self.user.send_if_modified(|slot| match slot {
      Some(user) if user.id == id => {
        user.apply_all(updates);
        true
      }
      _ => false,
    });
  }

  /// Replace the local copy with `fresh` if it is still the session user.
  fn replace_if_current(&self, fresh: User) {
    self.user.send_if_modified(|slot| match slot {
      Some(user) if user.id == fresh.id => {
        *user = fresh;
        true
      }
      _ => false,
    });
  }

  // ── Accounts ──────────────────────────────────────────────────────────────

  /// Log in as the user whose email matches exactly and whose password
  /// verifies. On failure the session is left as it was.
  pub async fn login(&self, email: &str, password: &str) -> Result<bool> {
    let candidate = self
      .store
      .find_user_by_email(email)
      .await
      .map_err(SessionError::store)?;

    let Some(user) =
      candidate.filter(|u| credential::verify_password(password, &u.password_hash))
    else {
      tracing::debug!("login rejected");
      return Ok(false);
    };

    tracing::info!(user_id = %user.id, "logged in");
    self.set_user(Some(user));
    Ok(true)
  }

  /// Clear the session. Logging out twice is harmless.
  pub fn logout(&self) {
    if let Some(user) = self.user.send_replace(None) {
      tracing::info!(user_id = %user.id, "logged out");
    }
  }

  /// Register a new account and log in as it.
  ///
  /// Returns `false` without touching the session if the email is already
  /// registered.
  pub async fn signup(&self, email: &str, password: &str) -> Result<bool> {
    let existing = self
      .store
      .find_user_by_email(email)
      .await
      .map_err(SessionError::store)?;
    if existing.is_some() {
      tracing::debug!("signup rejected: email already registered");
      return Ok(false);
    }

    let user = User::new(email, credential::hash_password(password)?);
    self.store.set_user(&user).await.map_err(SessionError::store)?;

    tracing::info!(user_id = %user.id, username = %user.username, "signed up");
    self.set_user(Some(user));
    Ok(true)
  }

  /// Fetch any user by id.
  pub async fn get_user_by_id(&self, id: UserId) -> Lookup<User> {
    let lookup = Lookup::from_result(self.store.get_user(id).await);
    if let Lookup::TransientFailure(e) = &lookup {
      tracing::warn!(user_id = %id, error = %e, "user lookup failed");
    }
    lookup
  }

  /// Reload the session user from the store, picking up changes other
  /// clients made (new followers, for instance). Logged out reads as
  /// `NotFound`.
  pub async fn refresh(&self) -> Lookup<User> {
    let Some(id) = self.current_id() else {
      return Lookup::NotFound;
    };
    let lookup = self.get_user_by_id(id).await;
    if let Lookup::Found(fresh) = &lookup {
      self.replace_if_current(fresh.clone());
    }
    lookup
  }

  // ── Relationships ─────────────────────────────────────────────────────────

  /// Follow `target_id`: add it to `following`, pull its posts into `feed`,
  /// add the session user to the target's `followers`, and notify the target.
  pub async fn follow_user(&self, target_id: UserId) -> Result<FollowOutcome> {
    let Some(me) = self.user() else {
      return Ok(FollowOutcome::NotLoggedIn);
    };
    let Some(follow) = me.follow_op(target_id) else {
      return Ok(FollowOutcome::SelfFollow);
    };
    let Some(target) = self
      .store
      .get_user(target_id)
      .await
      .map_err(SessionError::store)?
    else {
      tracing::debug!(target_id = %target_id, "follow target does not exist");
      return Ok(FollowOutcome::TargetMissing);
    };

    let was_following = me.is_following(target_id);
    let caller_updates = [follow, UserUpdate::Feed(ArrayOp::Union(target.posts))];

    self
      .store
      .update_user(me.id, &caller_updates)
      .await
      .map_err(SessionError::store)?;

    let target_updates = [UserUpdate::Followers(ArrayOp::Union(vec![me.id]))];
    if let Err(e) = self.store.update_user(target_id, &target_updates).await {
      tracing::warn!(
        caller = %me.id,
        target_id = %target_id,
        error = %e,
        "follow recorded for caller only"
      );
      return Err(SessionError::Asymmetric {
        caller: me.id,
        target: target_id,
        source: Box::new(e),
      });
    }

    if !was_following {
      let notice = NewNotification::followed_by(target_id, &me.username);
      if let Err(e) = self.store.add_notification(notice).await {
        tracing::warn!(target_id = %target_id, error = %e, "follow notification not sent");
      }
    }

    self.patch(me.id, &caller_updates);
    tracing::info!(caller = %me.id, target_id = %target_id, "followed");
    Ok(FollowOutcome::Followed)
  }

  /// Undo [`follow_user`](Self::follow_user): drop `target_id` from
  /// `following`, drop its current posts from `feed`, and take the session
  /// user out of the target's `followers`.
  pub async fn unfollow_user(&self, target_id: UserId) -> Result<FollowOutcome> {
    let Some(me) = self.user() else {
      return Ok(FollowOutcome::NotLoggedIn);
    };
    if me.id == target_id {
      return Ok(FollowOutcome::SelfFollow);
    }
    let Some(target) = self
      .store
      .get_user(target_id)
      .await
      .map_err(SessionError::store)?
    else {
      tracing::debug!(target_id = %target_id, "unfollow target does not exist");
      return Ok(FollowOutcome::TargetMissing);
    };

    let caller_updates = [
      UserUpdate::Following(ArrayOp::Remove(vec![target_id])),
      UserUpdate::Feed(ArrayOp::Remove(target.posts)),
    ];

    self
      .store
      .update_user(me.id, &caller_updates)
      .await
      .map_err(SessionError::store)?;

    let target_updates = [UserUpdate::Followers(ArrayOp::Remove(vec![me.id]))];
    if let Err(e) = self.store.update_user(target_id, &target_updates).await {
      tracing::warn!(
        caller = %me.id,
        target_id = %target_id,
        error = %e,
        "unfollow recorded for caller only"
      );
      return Err(SessionError::Asymmetric {
        caller: me.id,
        target: target_id,
        source: Box::new(e),
      });
    }

    self.patch(me.id, &caller_updates);
    tracing::info!(caller = %me.id, target_id = %target_id, "unfollowed");
    Ok(FollowOutcome::Unfollowed)
  }

  // ── Posts and feeds ───────────────────────────────────────────────────────

  /// Publish a post as the session user and copy its id into every
  /// follower's feed. Returns `None` when logged out.
  ///
  /// A follower whose feed cannot be written is skipped with a warning.
  pub async fn publish_post(&self, content: &str) -> Result<Option<Post>> {
    let Some(me) = self.user() else {
      return Ok(None);
    };

    let content = content.trim();
    if content.is_empty() {
      return Err(SessionError::InvalidPost("post is empty".into()));
    }
    if content.chars().count() > MAX_POST_LEN {
      return Err(SessionError::InvalidPost(format!(
        "post is longer than {MAX_POST_LEN} characters"
      )));
    }

    let post = self
      .store
      .add_post(NewPost { author_id: me.id, content: content.to_owned() })
      .await
      .map_err(SessionError::store)?;

    let author_updates = [UserUpdate::Posts(ArrayOp::Union(vec![post.id]))];
    self
      .store
      .update_user(me.id, &author_updates)
      .await
      .map_err(SessionError::store)?;

    // Followers gained since login are only visible in the stored document.
    let followers = match self.store.get_user(me.id).await.map_err(SessionError::store)? {
      Some(fresh) => {
        let followers = fresh.followers.clone();
        self.replace_if_current(fresh);
        followers
      }
      None => {
        self.patch(me.id, &author_updates);
        me.followers
      }
    };

    let fan_out = [UserUpdate::Feed(ArrayOp::Union(vec![post.id]))];
    for follower in followers {
      if let Err(e) = self.store.update_user(follower, &fan_out).await {
        tracing::warn!(%follower, post = %post.id, error = %e, "feed fan-out skipped follower");
      }
    }

    tracing::info!(author = %me.id, post = %post.id, "published post");
    Ok(Some(post))
  }

  /// Posts written by `user_id`, newest first. Unknown users have none.
  pub async fn timeline(&self, user_id: UserId) -> Result<Vec<Post>> {
    let Some(user) = self
      .store
      .get_user(user_id)
      .await
      .map_err(SessionError::store)?
    else {
      return Ok(Vec::new());
    };
    self.resolve_posts(&user.posts).await
  }

  /// The session user's feed resolved to posts, newest first. Empty when
  /// logged out.
  pub async fn feed(&self) -> Result<Vec<Post>> {
    let Some(me) = self.user() else {
      return Ok(Vec::new());
    };
    self.resolve_posts(&me.feed).await
  }

  /// Notifications addressed to the session user, oldest first. Empty when
  /// logged out.
  pub async fn notifications(&self) -> Result<Vec<Notification>> {
    let Some(id) = self.current_id() else {
      return Ok(Vec::new());
    };
    self
      .store
      .notifications_for(id)
      .await
      .map_err(SessionError::store)
  }

  async fn resolve_posts(&self, ids: &[PostId]) -> Result<Vec<Post>> {
    let mut posts = Vec::with_capacity(ids.len());
    for &id in ids {
      match self.store.get_post(id).await.map_err(SessionError::store)? {
        Some(post) => posts.push(post),
        None => tracing::debug!(post = %id, "dangling post reference"),
      }
    }
    newest_first(&mut posts);
    Ok(posts)
  }
}
