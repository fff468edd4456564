//! Password generation: alphabet construction and uniform sampling.

use crate::error::{PasslockError, Result};
use crate::models::{GeneratedPassword, GenerationCriteria, StrengthReport};
use crate::policy::{RuleBasedPolicy, StrengthPolicy};
use rand::rngs::OsRng;
use rand::Rng;
use tokio::sync::Mutex;

pub const UPPERCASE: &str = "ABCDEFGHIJKLMNOPQRSTUVWXYZ";
pub const LOWERCASE: &str = "abcdefghijklmnopqrstuvwxyz";
pub const DIGITS: &str = "0123456789";
pub const SYMBOLS: &str = "!@#$%^&*()-_=+[]{}|;:,.<>?";

pub const MIN_LENGTH: usize = 8;
pub const MAX_LENGTH: usize = 128;
pub const MAX_EXCLUDED: usize = 50;

/// Build the candidate alphabet from the enabled class ranges, minus every
/// excluded character. Fails with `InvalidCriteria` when nothing remains.
pub fn build_alphabet(criteria: &GenerationCriteria) -> Result<Vec<char>> {
    if criteria.length < MIN_LENGTH || criteria.length > MAX_LENGTH {
        return Err(PasslockError::InvalidCriteria(format!(
            "length must be between {MIN_LENGTH} and {MAX_LENGTH}, got {}",
            criteria.length
        )));
    }

    let excluded: Vec<char> = criteria.exclude_characters.chars().collect();
    if excluded.len() > MAX_EXCLUDED {
        return Err(PasslockError::InvalidCriteria(format!(
            "at most {MAX_EXCLUDED} excluded characters allowed, got {}",
            excluded.len()
        )));
    }

    let mut alphabet = Vec::new();
    if criteria.include_uppercase {
        alphabet.extend(UPPERCASE.chars());
    }
    if criteria.include_lowercase {
        alphabet.extend(LOWERCASE.chars());
    }
    if criteria.include_numbers {
        alphabet.extend(DIGITS.chars());
    }
    if criteria.include_symbols {
        alphabet.extend(SYMBOLS.chars());
    }

    if alphabet.is_empty() {
        return Err(PasslockError::InvalidCriteria(
            "at least one character class must be enabled".to_string(),
        ));
    }

    alphabet.retain(|c| !excluded.contains(c));

    if alphabet.is_empty() {
        return Err(PasslockError::InvalidCriteria(
            "excluded characters cover the entire enabled alphabet".to_string(),
        ));
    }

    Ok(alphabet)
}

/// Draw `length` characters uniformly from `alphabet`.
///
/// `gen_range` performs a rejection-free uniform draw over the alphabet
/// size, so there is no modulo bias regardless of the alphabet length.
pub fn draw_uniform<R: Rng>(alphabet: &[char], length: usize, rng: &mut R) -> String {
    (0..length)
        .map(|_| alphabet[rng.gen_range(0..alphabet.len())])
        .collect()
}

/// Password generator with a pluggable scoring policy.
///
/// At most one generation request may be in flight per instance; a second
/// call started before the first resolves is rejected with
/// `GenerationInFlight` instead of being run concurrently.
pub struct PasswordGenerator<P: StrengthPolicy = RuleBasedPolicy> {
    policy: P,
    in_flight: Mutex<()>,
}

impl PasswordGenerator<RuleBasedPolicy> {
    /// Create a generator backed by the default rule-based policy.
    pub fn new() -> Self {
        Self::with_policy(RuleBasedPolicy::new())
    }
}

impl Default for PasswordGenerator<RuleBasedPolicy> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P: StrengthPolicy> PasswordGenerator<P> {
    /// Create a generator with a custom scoring policy.
    pub fn with_policy(policy: P) -> Self {
        Self {
            policy,
            in_flight: Mutex::new(()),
        }
    }

    /// Generate a password matching `criteria` and judge its strength.
    ///
    /// Pure apart from the random source: no state is retained between
    /// calls. Characters are drawn from the CSPRNG `OsRng`.
    pub async fn generate(&self, criteria: &GenerationCriteria) -> Result<GeneratedPassword> {
        let _guard = self
            .in_flight
            .try_lock()
            .map_err(|_| PasslockError::GenerationInFlight)?;

        let alphabet = build_alphabet(criteria)?;
        let password = draw_uniform(&alphabet, criteria.length, &mut OsRng);

        // The policy may suspend (a remote scorer); the guard is held until
        // it resolves so duplicate submissions cannot overlap.
        let report = self.policy.evaluate(&password).await?;

        Ok(GeneratedPassword {
            password,
            is_secure: report.is_secure,
        })
    }

    /// Score an arbitrary password and suggest a stronger alternative when
    /// it falls below the policy threshold.
    pub async fn evaluate(&self, password: &str) -> Result<StrengthReport> {
        if password.is_empty() {
            return Err(PasslockError::InvalidInput(
                "password must not be empty".to_string(),
            ));
        }
        self.policy.evaluate(password).await
    }

    /// Version tag of the underlying scoring policy.
    pub fn policy_version(&self) -> &'static str {
        self.policy.version()
    }
}
