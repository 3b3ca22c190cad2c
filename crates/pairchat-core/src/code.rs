//! Random alphanumeric codes.
//!
//! Used both for the secret pairing code shared out of band and for the
//! correlation identifier that links a photo request to its fulfillment.

use rand::distributions::Alphanumeric;
use rand::Rng;

/// Length of secret codes and correlation identifiers.
pub const CODE_LEN: usize = 15;

/// Generate a random code of `len` characters drawn uniformly from `[A-Za-z0-9]`.
pub fn random_code(len: usize) -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .map(char::from)
        .take(len)
        .collect()
}

/// Generate a fresh photo-request correlation identifier.
///
/// Collisions with earlier identifiers are not checked.
pub fn correlation_id() -> String {
    random_code(CODE_LEN)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn code_has_requested_length() {
        assert_eq!(random_code(6).len(), 6);
        assert_eq!(random_code(0).len(), 0);
        assert_eq!(correlation_id().len(), CODE_LEN);
    }

    #[test]
    fn code_is_alphanumeric() {
        let code = random_code(200);
        assert!(code.chars().all(|c| c.is_ascii_alphanumeric()));
    }

    #[test]
    fn codes_differ() {
        assert_ne!(correlation_id(), correlation_id());
    }
}
