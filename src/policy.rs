//! Strength scoring policies.
//!
//! The generator judges passwords through a pluggable [`StrengthPolicy`].
//! The default [`RuleBasedPolicy`] applies a fixed, documented rubric so the
//! same password always receives the same report for a given policy version:
//!
//! - +2 points per character, up to 40
//! - +20 bonus at 16 characters or more
//! - +10 per character class present (uppercase, lowercase, digit, symbol)
//! - score pinned to 5 when the password *is* a common password
//! - -25 when it merely *contains* one
//! - -15 for a run of 3+ identical characters
//! - -15 for an ascending or descending sequence of 4+ characters
//!
//! The result is clamped to [0, 100]; a password is secure at 60 or above.

use crate::error::Result;
use crate::generator::{draw_uniform, DIGITS, LOWERCASE, SYMBOLS, UPPERCASE};
use crate::models::StrengthReport;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::collections::hash_map::DefaultHasher;
use std::future::Future;
use std::hash::{Hash, Hasher};

/// Version tag of the rule-based rubric. Bumped whenever the scoring rules
/// change, since callers may cache reports keyed on it.
pub const POLICY_VERSION: &str = "rule-based/1";

/// Minimum score for a password to be judged secure.
pub const SECURE_THRESHOLD: u8 = 60;

const SUGGESTION_LENGTH: usize = 16;

/// Frequently used passwords, checked case-insensitively.
const COMMON_PASSWORDS: &[&str] = &[
    "password", "password1", "123456", "1234567", "12345678", "123456789",
    "1234567890", "qwerty", "qwertyuiop", "qazwsx", "zaq12wsx", "abc123",
    "111111", "121212", "696969", "letmein", "trustno1", "dragon", "monkey",
    "baseball", "football", "iloveyou", "sunshine", "princess", "superman",
    "batman", "starwars", "master", "shadow", "welcome", "freedom",
    "whatever", "secret", "admin", "login", "hello", "ninja", "mustang",
    "michael", "charlie",
];

/// A deterministic judgment of password strength.
///
/// Implementations must return the same report for the same password and
/// policy version. The evaluation may suspend (a remote scorer is a valid
/// implementation); failures surface as `TransientFailure` to the caller,
/// which may retry with the same input.
pub trait StrengthPolicy: Send + Sync {
    /// Identifies the rubric in effect.
    fn version(&self) -> &'static str;

    /// Score `password` and propose a stronger alternative if it is weak.
    fn evaluate(&self, password: &str) -> impl Future<Output = Result<StrengthReport>> + Send;
}

/// The built-in scoring policy. Stateless; see the module docs for the
/// rubric.
#[derive(Debug, Default, Clone, Copy)]
pub struct RuleBasedPolicy;

impl RuleBasedPolicy {
    pub fn new() -> Self {
        Self
    }

    fn report(password: &str) -> StrengthReport {
        let security_score = score(password);
        let is_secure = security_score >= SECURE_THRESHOLD;
        let suggestion = if is_secure {
            String::new()
        } else {
            suggest_stronger(password)
        };
        StrengthReport {
            security_score,
            is_secure,
            suggestion,
        }
    }
}

impl StrengthPolicy for RuleBasedPolicy {
    fn version(&self) -> &'static str {
        POLICY_VERSION
    }

    fn evaluate(&self, password: &str) -> impl Future<Output = Result<StrengthReport>> + Send {
        let report = Self::report(password);
        async move { Ok(report) }
    }
}

/// Apply the rubric to `password`, yielding a score in [0, 100].
pub fn score(password: &str) -> u8 {
    let chars: Vec<char> = password.chars().collect();
    let lowered = password.to_lowercase();

    if COMMON_PASSWORDS.contains(&lowered.as_str()) {
        return 5;
    }

    let mut score: i32 = (chars.len().min(20) as i32) * 2;
    if chars.len() >= 16 {
        score += 20;
    }

    let mut classes = 0;
    if chars.iter().any(|c| c.is_ascii_uppercase()) {
        classes += 1;
    }
    if chars.iter().any(|c| c.is_ascii_lowercase()) {
        classes += 1;
    }
    if chars.iter().any(|c| c.is_ascii_digit()) {
        classes += 1;
    }
    if chars.iter().any(|c| SYMBOLS.contains(*c)) {
        classes += 1;
    }
    score += classes * 10;

    if COMMON_PASSWORDS
        .iter()
        .any(|word| word.len() >= 4 && lowered.contains(word))
    {
        score -= 25;
    }
    if has_repeat_run(&chars, 3) {
        score -= 15;
    }
    if has_sequence_run(&chars, 4) {
        score -= 15;
    }

    score.clamp(0, 100) as u8
}

/// True when `chars` contains `min_run` or more identical characters in a
/// row.
fn has_repeat_run(chars: &[char], min_run: usize) -> bool {
    let mut run = 1;
    for window in chars.windows(2) {
        if window[0] == window[1] {
            run += 1;
            if run >= min_run {
                return true;
            }
        } else {
            run = 1;
        }
    }
    false
}

/// True when `chars` contains an ascending or descending run of `min_run`
/// or more consecutive alphanumeric characters ("abcd", "4321").
fn has_sequence_run(chars: &[char], min_run: usize) -> bool {
    let mut ascending = 1;
    let mut descending = 1;
    for window in chars.windows(2) {
        let (a, b) = (window[0], window[1]);
        let adjacent = a.is_ascii_alphanumeric() && b.is_ascii_alphanumeric();
        if adjacent && b as u32 == a as u32 + 1 {
            ascending += 1;
            descending = 1;
        } else if adjacent && a as u32 == b as u32 + 1 {
            descending += 1;
            ascending = 1;
        } else {
            ascending = 1;
            descending = 1;
        }
        if ascending >= min_run || descending >= min_run {
            return true;
        }
    }
    false
}

/// Derive a stronger alternative for a weak password.
///
/// The RNG is seeded from the password and the policy version, so repeated
/// evaluations of the same password propose the same alternative.
fn suggest_stronger(password: &str) -> String {
    let mut full_alphabet: Vec<char> = Vec::new();
    full_alphabet.extend(UPPERCASE.chars());
    full_alphabet.extend(LOWERCASE.chars());
    full_alphabet.extend(DIGITS.chars());
    full_alphabet.extend(SYMBOLS.chars());

    let mut hasher = DefaultHasher::new();
    POLICY_VERSION.hash(&mut hasher);
    password.hash(&mut hasher);
    let seed = hasher.finish();

    // The first candidate almost always passes the rubric; bumping the seed
    // covers the rare draw that trips a pattern penalty.
    for bump in 0..32u64 {
        let mut rng = StdRng::seed_from_u64(seed.wrapping_add(bump));
        let candidate = draw_uniform(&full_alphabet, SUGGESTION_LENGTH, &mut rng);
        if score(&candidate) >= SECURE_THRESHOLD {
            return candidate;
        }
    }

    let mut rng = StdRng::seed_from_u64(seed);
    draw_uniform(&full_alphabet, SUGGESTION_LENGTH * 2, &mut rng)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report(password: &str) -> StrengthReport {
        RuleBasedPolicy::report(password)
    }

    #[test]
    fn test_common_password_scores_floor() {
        let report = report("password");
        assert_eq!(report.security_score, 5);
        assert!(!report.is_secure);

        // Case-insensitive.
        assert_eq!(score("PaSsWoRd"), 5);
    }

    #[test]
    fn test_containing_common_word_is_penalized() {
        assert!(score("xKpassword9!") < score("xKpemswobd9!"));
    }

    #[test]
    fn test_repeat_run_detection() {
        assert!(has_repeat_run(&"aaab".chars().collect::<Vec<_>>(), 3));
        assert!(!has_repeat_run(&"aabb".chars().collect::<Vec<_>>(), 3));
    }

    #[test]
    fn test_sequence_run_detection() {
        assert!(has_sequence_run(&"abcd".chars().collect::<Vec<_>>(), 4));
        assert!(has_sequence_run(&"9876".chars().collect::<Vec<_>>(), 4));
        assert!(!has_sequence_run(&"abce".chars().collect::<Vec<_>>(), 4));
        // Digit-to-letter codepoint adjacency does not count.
        assert!(!has_sequence_run(&"89:;".chars().collect::<Vec<_>>(), 4));
    }

    #[test]
    fn test_mixed_long_password_is_secure() {
        let report = report("kV9#mQ2$wX7&zR4!");
        assert!(report.security_score >= SECURE_THRESHOLD);
        assert!(report.is_secure);
        assert!(report.suggestion.is_empty());
    }

    #[test]
    fn test_weak_password_gets_nonempty_secure_suggestion() {
        let report = report("kitten");
        assert!(!report.is_secure);
        assert!(!report.suggestion.is_empty());
        assert!(score(&report.suggestion) >= SECURE_THRESHOLD);
    }

    #[test]
    fn test_evaluation_is_deterministic() {
        let first = report("kitten");
        let second = report("kitten");
        assert_eq!(first, second);

        // Different passwords get different suggestions.
        let other = report("puppy");
        assert_ne!(first.suggestion, other.suggestion);
    }

    #[test]
    fn test_score_is_clamped() {
        let long: String = "aB3!".repeat(40);
        assert!(score(&long) <= 100);
        assert!(score("a") >= 1);
    }
}
