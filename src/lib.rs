//! passlock: a local password manager and generator with strength
//! evaluation.

pub mod bus;
pub mod cli;
pub mod clipboard;
pub mod error;
pub mod generator;
pub mod models;
pub mod policy;
pub mod storage;
pub mod store;

// Re-export commonly used types
pub use error::{PasslockError, Result};
pub use generator::PasswordGenerator;
pub use models::{CredentialEntry, GeneratedPassword, GenerationCriteria, StrengthReport};
pub use policy::{RuleBasedPolicy, StrengthPolicy};
pub use store::CredentialStore;
