//! Array-field update primitives.
//!
//! These mirror the array-union / array-remove operations of a document
//! database: both are idempotent, and a union never introduces duplicates.

use serde::{Deserialize, Serialize};

use crate::{post::PostId, user::UserId};

/// A set-like update applied to one array field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", content = "values", rename_all = "snake_case")]
pub enum ArrayOp<T> {
  /// Append every value not already present, keeping existing order.
  Union(Vec<T>),
  /// Remove every element equal to one of the values.
  Remove(Vec<T>),
}

impl<T: PartialEq + Clone> ArrayOp<T> {
  pub fn apply(&self, field: &mut Vec<T>) {
    match self {
      Self::Union(values) => {
        for value in values {
          if !field.contains(value) {
            field.push(value.clone());
          }
        }
      }
      Self::Remove(values) => field.retain(|existing| !values.contains(existing)),
    }
  }
}

/// An update to one of the array fields of a user document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "field", rename_all = "snake_case")]
pub enum UserUpdate {
  Posts(ArrayOp<PostId>),
  Following(ArrayOp<UserId>),
  Followers(ArrayOp<UserId>),
  Feed(ArrayOp<PostId>),
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn union_skips_existing_values() {
    let mut field = vec![1, 2];
    ArrayOp::Union(vec![2, 3, 3]).apply(&mut field);
    assert_eq!(field, vec![1, 2, 3]);
  }

  #[test]
  fn union_is_idempotent() {
    let op = ArrayOp::Union(vec![4, 5]);
    let mut once = vec![1];
    op.apply(&mut once);
    let mut twice = once.clone();
    op.apply(&mut twice);
    assert_eq!(once, twice);
  }

  #[test]
  fn remove_matches_exact_values_only() {
    let mut field = vec!["ab".to_string(), "abc".to_string(), "b".to_string()];
    ArrayOp::Remove(vec!["ab".to_string()]).apply(&mut field);
    assert_eq!(field, vec!["abc".to_string(), "b".to_string()]);
  }

  #[test]
  fn remove_of_absent_value_is_noop() {
    let mut field = vec![1, 2];
    ArrayOp::Remove(vec![9]).apply(&mut field);
    assert_eq!(field, vec![1, 2]);
  }
}
