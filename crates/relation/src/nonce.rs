//! Freshness tokens for publications.

use uuid::Uuid;

/// Produces the token that marks a publication as complete and fresh.
///
/// The only semantic a nonce carries is distinctness: a new nonce tells
/// readers the bucket's fields form a new, complete publication. The
/// empty string is reserved for "not yet published".
pub trait NonceGenerator {
  fn generate(&mut self) -> String;
}

/// Production generator: random UUIDv4 strings.
#[derive(Debug, Default, Clone, Copy)]
pub struct UuidNonce;

impl NonceGenerator for UuidNonce {
  fn generate(&mut self) -> String {
    Uuid::new_v4().to_string()
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn nonces_are_fresh_and_non_empty() {
    let mut generator = UuidNonce;
    let a = generator.generate();
    let b = generator.generate();

    assert!(!a.is_empty());
    assert_ne!(a, b);
  }
}
