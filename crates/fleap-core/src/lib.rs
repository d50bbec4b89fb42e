//! Core types and trait definitions for the Fleap social store.
//!
//! This crate is deliberately free of HTTP and database dependencies.
//! All other crates depend on it; it depends on nothing proprietary.

// We intentionally use native `async fn` in traits (stabilised in Rust 1.75).
// Suppress the advisory lint about `Send` bounds on the returned futures.
#![allow(async_fn_in_trait)]

pub mod error;
pub mod lookup;
pub mod memory;
pub mod notification;
pub mod post;
pub mod store;
pub mod update;
pub mod user;

pub use error::{Error, Result};
pub use lookup::Lookup;
pub use memory::MemoryStore;
pub use store::DocumentStore;
