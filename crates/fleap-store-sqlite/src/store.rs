//! [`SqliteStore`] — the SQLite implementation of [`DocumentStore`].

use std::path::Path;

use chrono::Utc;
use rusqlite::OptionalExtension as _;
use uuid::Uuid;

use fleap_core::{
  notification::{NewNotification, Notification},
  post::{NewPost, Post, PostId},
  store::DocumentStore,
  update::UserUpdate,
  user::{User, UserId},
};

use crate::{
  Error, Result,
  encode::{
    RawNotification, RawPost, decode_user, encode_dt, encode_user, encode_uuid,
  },
  schema::SCHEMA,
};

/// Wrap a JSON failure raised inside a connection closure so it can travel
/// through `tokio_rusqlite`'s error type.
fn json_failure(e: serde_json::Error) -> rusqlite::Error {
  rusqlite::Error::ToSqlConversionFailure(Box::new(e))
}

// ─── Store ───────────────────────────────────────────────────────────────────

/// A Fleap document store backed by a single SQLite file.
///
/// Cloning is cheap — the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store — useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  /// Fetch one user document using `sql`, which must select a single
  /// `document` column and take one parameter.
  async fn query_user(&self, sql: &'static str, param: String) -> Result<Option<User>> {
    let raw: Option<String> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(sql, rusqlite::params![param], |row| row.get(0))
            .optional()?,
        )
      })
      .await?;

    raw.as_deref().map(decode_user).transpose()
  }
}

// ─── DocumentStore impl ──────────────────────────────────────────────────────

impl DocumentStore for SqliteStore {
  type Error = Error;

  // ── Users ─────────────────────────────────────────────────────────────────

  async fn get_user(&self, id: UserId) -> Result<Option<User>> {
    self
      .query_user("SELECT document FROM users WHERE user_id = ?1", encode_uuid(id.0))
      .await
  }

  async fn find_user_by_email(&self, email: &str) -> Result<Option<User>> {
    self
      .query_user(
        "SELECT document FROM users WHERE email = ?1
         ORDER BY created_at, rowid LIMIT 1",
        email.to_owned(),
      )
      .await
  }

  async fn set_user(&self, user: &User) -> Result<()> {
    let id_str   = encode_uuid(user.id.0);
    let email    = user.email.clone();
    let document = encode_user(user)?;
    let at_str   = encode_dt(user.created_at);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO users (user_id, email, document, created_at)
           VALUES (?1, ?2, ?3, ?4)
           ON CONFLICT (user_id) DO UPDATE SET
             email    = excluded.email,
             document = excluded.document",
          rusqlite::params![id_str, email, document, at_str],
        )?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  async fn update_user(&self, id: UserId, updates: &[UserUpdate]) -> Result<()> {
    let id_str  = encode_uuid(id.0);
    let updates = updates.to_vec();

    // Read, patch and write back inside one transaction.
    let found: bool = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;

        let raw: Option<String> = tx
          .query_row(
            "SELECT document FROM users WHERE user_id = ?1",
            rusqlite::params![id_str],
            |row| row.get(0),
          )
          .optional()?;

        let Some(raw) = raw else {
          return Ok(false);
        };

        let mut user: User = serde_json::from_str(&raw).map_err(json_failure)?;
        user.apply_all(&updates);
        let document = serde_json::to_string(&user).map_err(json_failure)?;

        tx.execute(
          "UPDATE users SET document = ?2 WHERE user_id = ?1",
          rusqlite::params![id_str, document],
        )?;
        tx.commit()?;
        Ok(true)
      })
      .await?;

    if !found {
      return Err(Error::UserNotFound(id));
    }
    Ok(())
  }

  // ── Notifications ─────────────────────────────────────────────────────────

  async fn add_notification(&self, input: NewNotification) -> Result<Notification> {
    let notification = Notification {
      id:             Uuid::new_v4(),
      target_user_id: input.target_user_id,
      message:        input.message,
      created_at:     Utc::now(),
    };

    let id_str     = encode_uuid(notification.id);
    let target_str = encode_uuid(notification.target_user_id.0);
    let message    = notification.message.clone();
    let at_str     = encode_dt(notification.created_at);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO notifications (notification_id, target_user_id, message, created_at)
           VALUES (?1, ?2, ?3, ?4)",
          rusqlite::params![id_str, target_str, message, at_str],
        )?;
        Ok(())
      })
      .await?;

    Ok(notification)
  }

  async fn notifications_for(&self, target: UserId) -> Result<Vec<Notification>> {
    let target_str = encode_uuid(target.0);

    let raws: Vec<RawNotification> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT notification_id, target_user_id, message, created_at
           FROM notifications
           WHERE target_user_id = ?1
           ORDER BY rowid",
        )?;
        let rows = stmt
          .query_map(rusqlite::params![target_str], |row| {
            Ok(RawNotification {
              notification_id: row.get(0)?,
              target_user_id:  row.get(1)?,
              message:         row.get(2)?,
              created_at:      row.get(3)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawNotification::into_notification).collect()
  }

  // ── Posts ─────────────────────────────────────────────────────────────────

  async fn add_post(&self, input: NewPost) -> Result<Post> {
    let post = Post {
      id:         PostId::new(),
      author_id:  input.author_id,
      content:    input.content,
      created_at: Utc::now(),
    };

    let id_str     = encode_uuid(post.id.0);
    let author_str = encode_uuid(post.author_id.0);
    let content    = post.content.clone();
    let at_str     = encode_dt(post.created_at);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO posts (post_id, author_id, content, created_at)
           VALUES (?1, ?2, ?3, ?4)",
          rusqlite::params![id_str, author_str, content, at_str],
        )?;
        Ok(())
      })
      .await?;

    Ok(post)
  }

  async fn get_post(&self, id: PostId) -> Result<Option<Post>> {
    let id_str = encode_uuid(id.0);

    let raw: Option<RawPost> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT post_id, author_id, content, created_at FROM posts WHERE post_id = ?1",
              rusqlite::params![id_str],
              |row| {
                Ok(RawPost {
                  post_id:    row.get(0)?,
                  author_id:  row.get(1)?,
                  content:    row.get(2)?,
                  created_at: row.get(3)?,
                })
              },
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawPost::into_post).transpose()
  }
}
