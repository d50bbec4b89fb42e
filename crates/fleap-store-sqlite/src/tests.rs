//! Integration tests for `SqliteStore` against an in-memory database.

use fleap_core::{
  notification::NewNotification,
  post::{NewPost, PostId},
  store::DocumentStore,
  update::{ArrayOp, UserUpdate},
  user::{User, UserId},
};

use crate::{Error, SqliteStore};

async fn store() -> SqliteStore {
  SqliteStore::open_in_memory()
    .await
    .expect("in-memory store")
}

async fn stored_user(s: &SqliteStore, email: &str) -> User {
  let user = User::new(email, "$argon2id$placeholder");
  s.set_user(&user).await.unwrap();
  user
}

// ─── Users ───────────────────────────────────────────────────────────────────

#[tokio::test]
async fn set_and_get_user() {
  let s = store().await;
  let user = stored_user(&s, "cneal005@ucr.edu").await;

  let fetched = s.get_user(user.id).await.unwrap();
  assert_eq!(fetched, Some(user));
}

#[tokio::test]
async fn get_user_missing_returns_none() {
  let s = store().await;
  let result = s.get_user(UserId::new()).await.unwrap();
  assert!(result.is_none());
}

#[tokio::test]
async fn set_user_overwrites_existing_document() {
  let s = store().await;
  let mut user = stored_user(&s, "old@example.com").await;

  user.email = "new@example.com".into();
  user.username = "new".into();
  s.set_user(&user).await.unwrap();

  let fetched = s.get_user(user.id).await.unwrap().unwrap();
  assert_eq!(fetched.email, "new@example.com");
  assert!(s.find_user_by_email("old@example.com").await.unwrap().is_none());
  assert!(s.find_user_by_email("new@example.com").await.unwrap().is_some());
}

#[tokio::test]
async fn find_by_email_is_exact_and_case_sensitive() {
  let s = store().await;
  let user = stored_user(&s, "fake@gmail.com").await;

  let hit = s.find_user_by_email("fake@gmail.com").await.unwrap();
  assert_eq!(hit.map(|u| u.id), Some(user.id));

  assert!(s.find_user_by_email("FAKE@gmail.com").await.unwrap().is_none());
  assert!(s.find_user_by_email("fake@gmail").await.unwrap().is_none());
  assert!(s.find_user_by_email("%@gmail.com").await.unwrap().is_none());
}

// ─── Array updates ───────────────────────────────────────────────────────────

#[tokio::test]
async fn union_is_idempotent() {
  let s = store().await;
  let user = stored_user(&s, "a@b.com").await;
  let target = UserId::new();
  let post = PostId::new();

  let updates = [
    UserUpdate::Following(ArrayOp::Union(vec![target])),
    UserUpdate::Feed(ArrayOp::Union(vec![post])),
  ];
  s.update_user(user.id, &updates).await.unwrap();
  s.update_user(user.id, &updates).await.unwrap();

  let fetched = s.get_user(user.id).await.unwrap().unwrap();
  assert_eq!(fetched.following, vec![target]);
  assert_eq!(fetched.feed, vec![post]);
}

#[tokio::test]
async fn remove_takes_out_only_listed_values() {
  let s = store().await;
  let user = stored_user(&s, "a@b.com").await;
  let keep = UserId::new();
  let drop = UserId::new();

  s.update_user(
    user.id,
    &[UserUpdate::Followers(ArrayOp::Union(vec![keep, drop]))],
  )
  .await
  .unwrap();
  s.update_user(user.id, &[UserUpdate::Followers(ArrayOp::Remove(vec![drop]))])
    .await
    .unwrap();

  let fetched = s.get_user(user.id).await.unwrap().unwrap();
  assert_eq!(fetched.followers, vec![keep]);
}

#[tokio::test]
async fn update_leaves_other_fields_alone() {
  let s = store().await;
  let user = stored_user(&s, "a@b.com").await;

  s.update_user(user.id, &[UserUpdate::Posts(ArrayOp::Union(vec![PostId::new()]))])
    .await
    .unwrap();

  let fetched = s.get_user(user.id).await.unwrap().unwrap();
  assert_eq!(fetched.post_count(), 1);
  assert_eq!(fetched.email, user.email);
  assert_eq!(fetched.password_hash, user.password_hash);
  assert!(fetched.following.is_empty());
}

#[tokio::test]
async fn update_missing_user_errors() {
  let s = store().await;
  let id = UserId::new();

  let err = s
    .update_user(id, &[UserUpdate::Following(ArrayOp::Union(vec![UserId::new()]))])
    .await
    .unwrap_err();
  assert!(matches!(err, Error::UserNotFound(missing) if missing == id));
}

// ─── Notifications ───────────────────────────────────────────────────────────

#[tokio::test]
async fn notifications_roundtrip_in_insertion_order() {
  let s = store().await;
  let target = UserId::new();
  let other = UserId::new();

  let first = s
    .add_notification(NewNotification::followed_by(target, "alice"))
    .await
    .unwrap();
  s.add_notification(NewNotification::followed_by(other, "alice"))
    .await
    .unwrap();
  let second = s
    .add_notification(NewNotification::followed_by(target, "bob"))
    .await
    .unwrap();

  let listed = s.notifications_for(target).await.unwrap();
  assert_eq!(listed.len(), 2);
  assert_eq!(listed[0].id, first.id);
  assert_eq!(listed[1].id, second.id);
  assert_eq!(listed[1].message, "bob started following you");
}

#[tokio::test]
async fn notifications_for_unknown_target_is_empty() {
  let s = store().await;
  assert!(s.notifications_for(UserId::new()).await.unwrap().is_empty());
}

// ─── Posts ───────────────────────────────────────────────────────────────────

#[tokio::test]
async fn add_and_get_post() {
  let s = store().await;
  let author = UserId::new();

  let post = s
    .add_post(NewPost { author_id: author, content: "first!".into() })
    .await
    .unwrap();

  let fetched = s.get_post(post.id).await.unwrap().unwrap();
  assert_eq!(fetched, post);
}

#[tokio::test]
async fn get_post_missing_returns_none() {
  let s = store().await;
  assert!(s.get_post(PostId::new()).await.unwrap().is_none());
}

// ─── Persistence ─────────────────────────────────────────────────────────────

#[tokio::test]
async fn reopening_a_file_keeps_documents() {
  let path = std::env::temp_dir().join(format!("fleap-{}.db", uuid::Uuid::new_v4()));

  let user = {
    let s = SqliteStore::open(&path).await.unwrap();
    stored_user(&s, "persist@example.com").await
  };

  let s = SqliteStore::open(&path).await.unwrap();
  let fetched = s.get_user(user.id).await.unwrap();
  assert_eq!(fetched.map(|u| u.email), Some("persist@example.com".to_string()));

  drop(s);
  let _ = std::fs::remove_file(&path);
}
