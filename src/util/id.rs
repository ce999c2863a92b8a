//! ID generation for tickets and profiles.
//!
//! IDs have the form `<prefix>-<hash>` where hash is base36 lowercase
//! (0-9, a-z) with adaptive length based on table size.

use chrono::{DateTime, Utc};
use sha2::{Digest, Sha256};

/// Prefix for ticket ids.
pub const TICKET_PREFIX: &str = "tk";
/// Prefix for profile ids.
pub const PROFILE_PREFIX: &str = "usr";

/// ID generation configuration.
#[derive(Debug, Clone)]
pub struct IdConfig {
    pub prefix: String,
    pub min_hash_length: usize,
    pub max_hash_length: usize,
    /// Maximum collision probability before increasing length.
    pub max_collision_prob: f64,
}

impl IdConfig {
    #[must_use]
    pub fn with_prefix(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            min_hash_length: 4,
            max_hash_length: 10,
            max_collision_prob: 0.25,
        }
    }
}

/// Produces unique ids, consulting a caller-provided existence check.
#[derive(Debug, Clone)]
pub struct IdGenerator {
    config: IdConfig,
}

impl IdGenerator {
    #[must_use]
    pub const fn new(config: IdConfig) -> Self {
        Self { config }
    }

    #[must_use]
    pub fn tickets() -> Self {
        Self::new(IdConfig::with_prefix(TICKET_PREFIX))
    }

    #[must_use]
    pub fn profiles() -> Self {
        Self::new(IdConfig::with_prefix(PROFILE_PREFIX))
    }

    #[must_use]
    pub fn prefix(&self) -> &str {
        &self.config.prefix
    }

    /// Smallest hash length keeping the birthday-collision odds under the limit.
    #[must_use]
    #[allow(
        clippy::cast_precision_loss,
        clippy::cast_possible_truncation,
        clippy::cast_possible_wrap
    )]
    pub fn optimal_length(&self, existing: usize) -> usize {
        let n = existing as f64;
        for len in self.config.min_hash_length..=self.config.max_hash_length {
            let space = 36_f64.powi(len as i32);
            let prob = 1.0 - (-n * n / (2.0 * space)).exp();
            if prob < self.config.max_collision_prob {
                return len;
            }
        }
        self.config.max_hash_length
    }

    /// Generate an id, retrying with nonces and longer hashes on collision.
    ///
    /// `exists` returns `true` if the id is already taken.
    pub fn generate<F>(&self, seed: &str, at: DateTime<Utc>, existing: usize, exists: F) -> String
    where
        F: Fn(&str) -> bool,
    {
        let mut length = self.optimal_length(existing);
        let mut nonce = 0u32;

        loop {
            let hash = compute_id_hash(&id_seed(seed, at, nonce), length);
            let id = format!("{}-{hash}", self.config.prefix);
            if !exists(&id) {
                return id;
            }
            nonce += 1;
            if nonce % 10 == 0 && length < self.config.max_hash_length {
                length += 1;
            }
            if nonce > 1000 {
                return format!("{}-{hash}-{nonce}", self.config.prefix);
            }
        }
    }
}

fn id_seed(seed: &str, at: DateTime<Utc>, nonce: u32) -> String {
    format!("{seed}|{}|{nonce}", at.timestamp_nanos_opt().unwrap_or(0))
}

/// Base36 hash of `input`, truncated (or zero-padded) to `length`.
#[must_use]
pub fn compute_id_hash(input: &str, length: usize) -> String {
    let digest = Sha256::digest(input.as_bytes());

    let mut num = 0u64;
    for &byte in digest.iter().take(8) {
        num = (num << 8) | u64::from(byte);
    }

    let encoded = base36_encode(num);
    let padded = if encoded.len() < length {
        format!("{encoded:0>length$}")
    } else {
        encoded
    };
    padded.chars().take(length).collect()
}

fn base36_encode(mut num: u64) -> String {
    const ALPHABET: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";
    if num == 0 {
        return "0".to_string();
    }
    let mut chars = Vec::new();
    while num > 0 {
        chars.push(ALPHABET[(num % 36) as usize] as char);
        num /= 36;
    }
    chars.into_iter().rev().collect()
}

/// Lowercase and trim user input; prepend `prefix-` when it is missing.
///
/// `abc1` becomes `tk-abc1`, `TK-ABC1` becomes `tk-abc1`.
#[must_use]
pub fn normalize_id(input: &str, prefix: &str) -> String {
    let lowered = input.trim().to_lowercase();
    if lowered.starts_with(&format!("{prefix}-")) {
        lowered
    } else {
        format!("{prefix}-{lowered}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_base36_encode() {
        assert_eq!(base36_encode(0), "0");
        assert_eq!(base36_encode(35), "z");
        assert_eq!(base36_encode(36), "10");
    }

    #[test]
    fn test_compute_id_hash_length() {
        assert_eq!(compute_id_hash("hello", 4).len(), 4);
        assert_eq!(compute_id_hash("hello", 10).len(), 10);
        assert_eq!(compute_id_hash("hello", 6), compute_id_hash("hello", 6));
    }

    #[test]
    fn test_optimal_length_grows() {
        let generator = IdGenerator::tickets();
        assert_eq!(generator.optimal_length(0), 4);
        assert!(generator.optimal_length(100_000) > generator.optimal_length(10));
    }

    #[test]
    fn test_generate_avoids_collisions() {
        let generator = IdGenerator::tickets();
        let at = Utc::now();
        let first = generator.generate("Printer jam", at, 0, |_| false);
        assert!(first.starts_with("tk-"));

        let taken: HashSet<String> = [first.clone()].into_iter().collect();
        let second = generator.generate("Printer jam", at, 1, |id| taken.contains(id));
        assert_ne!(first, second);
    }

    #[test]
    fn test_normalize_id() {
        assert_eq!(normalize_id("ABC1", TICKET_PREFIX), "tk-abc1");
        assert_eq!(normalize_id(" tk-abc1 ", TICKET_PREFIX), "tk-abc1");
        assert_eq!(normalize_id("usr-9z", PROFILE_PREFIX), "usr-9z");
    }
}
