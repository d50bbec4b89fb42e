//! Demo accounts for local development.

use fleap_core::{
  DocumentStore,
  post::NewPost,
  update::{ArrayOp, UserUpdate},
  user::User,
};

use crate::{Result, SessionError, credential};

/// `(email, password, post count)` for each demo account.
pub const DEMO_ACCOUNTS: &[(&str, &str, usize)] = &[
  ("cneal005@ucr.edu", "234", 2),
  ("fake@gmail.com", "1", 5),
  ("real@gmail.com", "2", 10),
  ("legit@gmail.com", "3", 15),
  ("fraud@gmail.com", "4", 1),
];

/// Create every demo account whose email is not registered yet, each with a
/// few placeholder posts. An account left short of posts by an earlier failed
/// run is topped up. Returns the accounts that were created or topped up.
pub async fn seed_demo_accounts<S: DocumentStore>(store: &S) -> Result<Vec<User>> {
  let mut seeded = Vec::new();

  for &(email, password, post_count) in DEMO_ACCOUNTS {
    let existing = store
      .find_user_by_email(email)
      .await
      .map_err(SessionError::store)?;

    let mut user = match existing {
      Some(user) if user.post_count() >= post_count => continue,
      Some(user) => user,
      None => {
        let user = User::new(email, credential::hash_password(password)?);
        store.set_user(&user).await.map_err(SessionError::store)?;
        user
      }
    };

    let mut post_ids = Vec::with_capacity(post_count - user.post_count());
    for n in user.post_count() + 1..=post_count {
      let post = store
        .add_post(NewPost {
          author_id: user.id,
          content:   format!("{} post #{n}", user.username),
        })
        .await
        .map_err(SessionError::store)?;
      post_ids.push(post.id);

      // Recorded one at a time so a failure part-way keeps what was written.
      let update = [UserUpdate::Posts(ArrayOp::Union(vec![post.id]))];
      store.update_user(user.id, &update).await.map_err(SessionError::store)?;
    }
    user.apply(&UserUpdate::Posts(ArrayOp::Union(post_ids)));

    tracing::info!(user_id = %user.id, username = %user.username, "seeded demo account");
    seeded.push(user);
  }

  Ok(seeded)
}
