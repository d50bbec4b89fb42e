//! `fleap` — command-line client for a Fleap store.
//!
//! Every invocation opens the SQLite store, runs one command in a fresh
//! session and prints the result as JSON.
//!
//! # Usage
//!
//! ```text
//! fleap seed
//! fleap --email cneal005@ucr.edu --password 234 follow <USER_ID>
//! fleap --config ~/.config/fleap/fleap.toml feed
//! ```

mod settings;

use std::{path::PathBuf, sync::Arc};

use anyhow::{Context as _, Result, anyhow, bail};
use clap::{Parser, Subcommand};
use fleap_core::{Lookup, user::{User, UserId}};
use fleap_session::{SessionStore, credential, seed::seed_demo_accounts};
use fleap_store_sqlite::SqliteStore;
use serde_json::json;
use settings::Settings;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

// ─── CLI args ─────────────────────────────────────────────────────────────────

#[derive(Parser)]
#[command(name = "fleap", author, version, about = "Fleap social store client")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "fleap.toml")]
  config: PathBuf,

  /// SQLite database path; overrides `store_path` from the config.
  #[arg(long)]
  store: Option<PathBuf>,

  /// Account email used to open the session.
  #[arg(long, env = "FLEAP_EMAIL")]
  email: Option<String>,

  /// Account password (plaintext).
  #[arg(long, env = "FLEAP_PASSWORD")]
  password: Option<String>,

  #[command(subcommand)]
  command: Command,
}

#[derive(Subcommand)]
enum Command {
  /// Print the argon2 hash for a password entered on stdin and exit.
  HashPassword,
  #[command(flatten)]
  Store(StoreCommand),
}

/// Commands that open the store.
#[derive(Subcommand)]
enum StoreCommand {
  /// Create the demo accounts that are not registered yet.
  Seed,
  /// Register `--email`/`--password` as a new account.
  Signup,
  /// Check `--email`/`--password` and print the account.
  Login,
  /// Print a user's public profile.
  Show { id: Uuid },
  /// Follow a user.
  Follow { id: Uuid },
  /// Stop following a user.
  Unfollow { id: Uuid },
  /// Publish a post.
  Post { content: String },
  /// Print the posts of everyone you follow.
  Feed,
  /// Print a user's posts.
  Timeline { id: Uuid },
  /// Print notifications addressed to you.
  Notifications,
}

// ─── Entry point ──────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
  tracing_subscriber::fmt()
    .with_writer(std::io::stderr)
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();

  let command = match cli.command {
    // Helper mode: hash a password without touching the store.
    Command::HashPassword => {
      let password = read_password()?;
      println!("{}", credential::hash_password(&password)?);
      return Ok(());
    }
    Command::Store(command) => command,
  };

  let settings = Settings::load(&cli.config)?;

  // Flags override config file, which overrides defaults.
  let store_path = cli
    .store
    .map(|p| settings::expand_tilde(&p))
    .unwrap_or_else(|| settings.store_path.clone());
  let email = cli.email.or(settings.email);
  let password = cli.password.or(settings.password);

  if let Some(parent) = store_path.parent().filter(|p| !p.as_os_str().is_empty()) {
    std::fs::create_dir_all(parent)
      .with_context(|| format!("failed to create {parent:?}"))?;
  }
  let store = SqliteStore::open(&store_path)
    .await
    .with_context(|| format!("failed to open store at {store_path:?}"))?;
  let session = SessionStore::new(Arc::new(store));

  let credentials = Credentials { email, password };
  let output = run(command, &session, &credentials).await?;
  println!("{}", serde_json::to_string_pretty(&output)?);
  Ok(())
}

// ─── Commands ─────────────────────────────────────────────────────────────────

struct Credentials {
  email:    Option<String>,
  password: Option<String>,
}

impl Credentials {
  fn require(&self) -> Result<(&str, &str)> {
    let email = self.email.as_deref().ok_or_else(|| anyhow!("--email is required"))?;
    let password = self
      .password
      .as_deref()
      .ok_or_else(|| anyhow!("--password is required"))?;
    Ok((email, password))
  }
}

async fn run(
  command: StoreCommand,
  session: &SessionStore<SqliteStore>,
  credentials: &Credentials,
) -> Result<serde_json::Value> {
  match command {
    StoreCommand::Seed => {
      let created = seed_demo_accounts(session.store().as_ref())
        .await
        .context("seeding demo accounts")?;
      Ok(json!({ "created": created.iter().map(profile).collect::<Vec<_>>() }))
    }
    StoreCommand::Signup => {
      let (email, password) = credentials.require()?;
      if !session.signup(email, password).await.context("signup failed")? {
        bail!("{email} is already registered");
      }
      Ok(current_profile(session))
    }
    StoreCommand::Login => {
      log_in(session, credentials).await?;
      Ok(current_profile(session))
    }
    StoreCommand::Show { id } => match session.get_user_by_id(UserId(id)).await {
      Lookup::Found(user) => Ok(profile(&user)),
      Lookup::NotFound => bail!("user {id} not found"),
      Lookup::TransientFailure(e) => Err(anyhow!(e).context(format!("looking up {id}"))),
    },
    StoreCommand::Follow { id } => {
      log_in(session, credentials).await?;
      let outcome = session.follow_user(UserId(id)).await.context("follow failed")?;
      Ok(json!({ "outcome": outcome, "user": current_profile(session) }))
    }
    StoreCommand::Unfollow { id } => {
      log_in(session, credentials).await?;
      let outcome = session
        .unfollow_user(UserId(id))
        .await
        .context("unfollow failed")?;
      Ok(json!({ "outcome": outcome, "user": current_profile(session) }))
    }
    StoreCommand::Post { content } => {
      log_in(session, credentials).await?;
      let post = session
        .publish_post(&content)
        .await
        .context("publishing post")?
        .ok_or_else(|| anyhow!("session ended before the post was published"))?;
      Ok(serde_json::to_value(post)?)
    }
    StoreCommand::Feed => {
      log_in(session, credentials).await?;
      Ok(serde_json::to_value(session.feed().await.context("loading feed")?)?)
    }
    StoreCommand::Timeline { id } => {
      let posts = session.timeline(UserId(id)).await.context("loading timeline")?;
      Ok(serde_json::to_value(posts)?)
    }
    StoreCommand::Notifications => {
      log_in(session, credentials).await?;
      let notices = session.notifications().await.context("loading notifications")?;
      Ok(serde_json::to_value(notices)?)
    }
  }
}

async fn log_in(session: &SessionStore<SqliteStore>, credentials: &Credentials) -> Result<()> {
  let (email, password) = credentials.require()?;
  if !session.login(email, password).await.context("login failed")? {
    bail!("invalid email or password");
  }
  Ok(())
}

/// Public projection of a user; never includes the password hash.
fn profile(user: &User) -> serde_json::Value {
  json!({
    "id":        user.id,
    "email":     user.email,
    "username":  user.username,
    "posts":     user.post_count(),
    "following": user.following,
    "followers": user.followers,
    "feed":      user.feed.len(),
  })
}

fn current_profile(session: &SessionStore<SqliteStore>) -> serde_json::Value {
  session.user().as_ref().map_or(serde_json::Value::Null, profile)
}

/// Read a password from stdin.
fn read_password() -> Result<String> {
  use std::io::{self, BufRead, Write};
  let stdin = io::stdin();
  eprint!("Password: ");
  io::stderr().flush().ok();
  let mut line = String::new();
  stdin.lock().read_line(&mut line)?;
  Ok(
    line
      .trim_end_matches('\n')
      .trim_end_matches('\r')
      .to_string(),
  )
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn hash_password_needs_no_store() {
    let cli = Cli::try_parse_from(["fleap", "hash-password"]).unwrap();
    assert!(matches!(cli.command, Command::HashPassword));
  }

  #[test]
  fn store_commands_parse_at_top_level() {
    let id = Uuid::new_v4();
    let cli = Cli::try_parse_from(["fleap", "follow", &id.to_string()]).unwrap();
    assert!(matches!(
      cli.command,
      Command::Store(StoreCommand::Follow { id: parsed }) if parsed == id
    ));
  }
}
