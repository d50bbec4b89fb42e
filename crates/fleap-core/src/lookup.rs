//! Tagged result of a document fetch.

use std::fmt;

/// Outcome of reading a single document.
///
/// Keeps "absent" and "could not be read" apart; [`Lookup::found`] collapses
/// both into `None` for callers that only care whether a value arrived.
pub enum Lookup<T> {
  Found(T),
  NotFound,
  TransientFailure(Box<dyn std::error::Error + Send + Sync>),
}

impl<T> Lookup<T> {
  /// Build a lookup from a store read.
  pub fn from_result<E>(result: Result<Option<T>, E>) -> Self
  where
    E: std::error::Error + Send + Sync + 'static,
  {
    match result {
      Ok(Some(value)) => Self::Found(value),
      Ok(None) => Self::NotFound,
      Err(e) => Self::TransientFailure(Box::new(e)),
    }
  }

  pub fn found(self) -> Option<T> {
    match self {
      Self::Found(value) => Some(value),
      Self::NotFound | Self::TransientFailure(_) => None,
    }
  }

  pub fn is_found(&self) -> bool { matches!(self, Self::Found(_)) }

  pub fn is_not_found(&self) -> bool { matches!(self, Self::NotFound) }

  pub fn is_failure(&self) -> bool { matches!(self, Self::TransientFailure(_)) }
}

impl<T: fmt::Debug> fmt::Debug for Lookup<T> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Self::Found(value) => f.debug_tuple("Found").field(value).finish(),
      Self::NotFound => f.write_str("NotFound"),
      Self::TransientFailure(e) => {
        f.debug_tuple("TransientFailure").field(&e.to_string()).finish()
      }
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::Error;

  #[test]
  fn found_and_missing_collapse_to_option() {
    let hit: Lookup<u8> = Lookup::from_result(Ok::<_, Error>(Some(7)));
    assert!(hit.is_found());
    assert_eq!(hit.found(), Some(7));

    let miss: Lookup<u8> = Lookup::from_result(Ok::<_, Error>(None));
    assert!(miss.is_not_found());
    assert_eq!(miss.found(), None);
  }

  #[test]
  fn failure_is_distinct_but_collapses_to_none() {
    let failed: Lookup<u8> = Lookup::from_result(Err(Error::Poisoned));
    assert!(failed.is_failure());
    assert!(!failed.is_not_found());
    assert_eq!(failed.found(), None);
  }
}
