//! Data models for credentials and password generation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A stored site/username/secret record.
///
/// `id` and `created_at` are assigned once at creation and never change
/// afterwards, even across edits.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CredentialEntry {
    /// Unique identifier, assigned at creation.
    pub id: String,
    /// Display label naming the service the credential belongs to.
    pub site: String,
    /// Optional account identifier (may be empty).
    #[serde(default)]
    pub username: String,
    /// The stored password value. Persisted as-is; this store offers no
    /// encryption at rest.
    pub secret: String,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

/// Fields the caller supplies when creating an entry.
#[derive(Debug, Clone, Default)]
pub struct NewCredential {
    pub site: String,
    pub username: String,
    pub secret: String,
}

/// A partial update for an existing entry. `None` fields are left untouched.
#[derive(Debug, Clone, Default)]
pub struct CredentialPatch {
    pub site: Option<String>,
    pub username: Option<String>,
    pub secret: Option<String>,
}

/// Constraints for password generation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GenerationCriteria {
    /// Desired password length, bounded to [8, 128].
    pub length: usize,
    pub include_uppercase: bool,
    pub include_lowercase: bool,
    pub include_numbers: bool,
    pub include_symbols: bool,
    /// Characters to omit from the candidate alphabet (at most 50).
    #[serde(default)]
    pub exclude_characters: String,
}

impl Default for GenerationCriteria {
    fn default() -> Self {
        Self {
            length: 16,
            include_uppercase: true,
            include_lowercase: true,
            include_numbers: true,
            include_symbols: true,
            exclude_characters: String::new(),
        }
    }
}

/// Result of a generation request.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedPassword {
    pub password: String,
    /// Strength verdict for the freshly generated password.
    pub is_secure: bool,
}

/// Strength judgment for an arbitrary password.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct StrengthReport {
    /// Estimated resistance to guessing, 0 (trivial) to 100.
    pub security_score: u8,
    /// Threshold judgment derived from the score.
    pub is_secure: bool,
    /// A stronger alternative when `is_secure` is false, empty otherwise.
    #[serde(default)]
    pub suggestion: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entry_serialized_field_names() {
        let entry = CredentialEntry {
            id: "abc".to_string(),
            site: "GitHub".to_string(),
            username: "octocat".to_string(),
            secret: "hunter2".to_string(),
            created_at: Utc::now(),
        };
        let json = serde_json::to_value(&entry).unwrap();
        assert!(json.get("createdAt").is_some());
        assert_eq!(json["site"], "GitHub");
        assert_eq!(json["secret"], "hunter2");
    }

    #[test]
    fn test_entry_tolerates_missing_username() {
        let json = r#"{"id":"1","site":"Example","secret":"s","createdAt":"2024-01-01T00:00:00Z"}"#;
        let entry: CredentialEntry = serde_json::from_str(json).unwrap();
        assert_eq!(entry.username, "");
    }

    #[test]
    fn test_default_criteria() {
        let criteria = GenerationCriteria::default();
        assert_eq!(criteria.length, 16);
        assert!(criteria.include_uppercase);
        assert!(criteria.include_lowercase);
        assert!(criteria.include_numbers);
        assert!(criteria.include_symbols);
        assert!(criteria.exclude_characters.is_empty());
    }
}
