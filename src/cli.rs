//! Command-line interface implementation.

use crate::clipboard::ClipboardManager;
use crate::error::{PasslockError, Result};
use crate::generator::PasswordGenerator;
use crate::models::{CredentialEntry, CredentialPatch, GenerationCriteria, NewCredential};
use crate::storage::FileStorage;
use crate::store::CredentialStore;
use clap::{Parser, Subcommand};
use colored::*;
use indicatif::ProgressBar;
use std::io::{self, BufRead};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use zeroize::Zeroize;

/// How long a copied secret stays on the clipboard.
const CLIPBOARD_TIMEOUT_SECS: u64 = 30;

/// Local password manager and generator.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Directory holding the credential store
    #[arg(
        short = 'f',
        long,
        global = true,
        env = "PASSLOCK_STORE",
        help = "Directory holding the credential store (default: platform data dir)"
    )]
    pub store_dir: Option<PathBuf>,

    /// Output format
    #[arg(
        short = 'o',
        long,
        global = true,
        value_enum,
        default_value = "text",
        help = "Output format"
    )]
    pub output: OutputFormat,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Clone, Copy, PartialEq, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Generate a password matching the given criteria
    Generate {
        /// Password length (8-128)
        #[arg(short, long, default_value_t = 16)]
        length: usize,

        /// Leave out uppercase letters
        #[arg(long)]
        no_uppercase: bool,

        /// Leave out lowercase letters
        #[arg(long)]
        no_lowercase: bool,

        /// Leave out digits
        #[arg(long)]
        no_numbers: bool,

        /// Leave out symbols
        #[arg(long)]
        no_symbols: bool,

        /// Characters to exclude from the password
        #[arg(short = 'x', long, default_value = "")]
        exclude: String,

        /// Save the generated password as an entry for this site
        #[arg(long)]
        site: Option<String>,

        /// Username for the saved entry
        #[arg(long, requires = "site")]
        username: Option<String>,

        /// Copy the password to the clipboard (cleared after a timeout)
        #[arg(short, long)]
        copy: bool,
    },

    /// Score a password and suggest a stronger one if it is weak
    Evaluate {
        /// Password to evaluate (prompted for when omitted)
        password: Option<String>,
    },

    /// List all stored credentials
    List {
        /// Show secrets in plaintext instead of masked
        #[arg(long)]
        show: bool,
    },

    /// Store a new credential
    Add {
        /// Site or service name
        site: String,

        /// Username or email
        #[arg(short, long, default_value = "")]
        username: String,

        /// Secret to store (prompted for when omitted)
        #[arg(short, long)]
        secret: Option<String>,
    },

    /// Edit an existing credential
    Edit {
        /// Entry id
        id: String,

        /// New site name
        #[arg(long)]
        site: Option<String>,

        /// New username
        #[arg(long)]
        username: Option<String>,

        /// New secret
        #[arg(long)]
        secret: Option<String>,
    },

    /// Delete a credential
    Remove {
        /// Entry id
        id: String,

        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },

    /// Search credentials by site or username
    Search {
        /// Case-insensitive term matched against site and username
        term: String,

        /// Show secrets in plaintext instead of masked
        #[arg(long)]
        show: bool,
    },
}

impl Cli {
    /// Execute the parsed command.
    pub async fn execute(self) -> Result<()> {
        match self.command {
            Commands::Generate {
                length,
                no_uppercase,
                no_lowercase,
                no_numbers,
                no_symbols,
                ref exclude,
                ref site,
                ref username,
                copy,
            } => {
                let criteria = GenerationCriteria {
                    length,
                    include_uppercase: !no_uppercase,
                    include_lowercase: !no_lowercase,
                    include_numbers: !no_numbers,
                    include_symbols: !no_symbols,
                    exclude_characters: exclude.clone(),
                };
                self.generate(&criteria, site.as_deref(), username.as_deref(), copy)
                    .await
            }
            Commands::Evaluate { ref password } => self.evaluate(password.clone()).await,
            Commands::List { show } => {
                let store = self.open_store()?;
                let entries = store.list()?;
                self.render_entries(&entries, show);
                Ok(())
            }
            Commands::Search { ref term, show } => {
                let store = self.open_store()?;
                let entries = store.search(term)?;
                self.render_entries(&entries, show);
                Ok(())
            }
            Commands::Add {
                ref site,
                ref username,
                ref secret,
            } => {
                let secret = match secret {
                    Some(secret) => secret.clone(),
                    None => read_secret("Secret to store")?,
                };
                let store = self.open_store()?;
                let entry = store.add(NewCredential {
                    site: site.clone(),
                    username: username.clone(),
                    secret,
                })?;
                match self.output {
                    OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&entry)?),
                    OutputFormat::Text => {
                        success(&format!("Added entry for {} (id: {})", entry.site, entry.id))
                    }
                }
                Ok(())
            }
            Commands::Edit {
                ref id,
                ref site,
                ref username,
                ref secret,
            } => {
                if site.is_none() && username.is_none() && secret.is_none() {
                    warning("Nothing to update");
                    return Ok(());
                }
                let store = self.open_store()?;
                let entry = store.update(
                    id,
                    CredentialPatch {
                        site: site.clone(),
                        username: username.clone(),
                        secret: secret.clone(),
                    },
                )?;
                match self.output {
                    OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&entry)?),
                    OutputFormat::Text => {
                        success(&format!("Updated entry for {} (id: {})", entry.site, entry.id))
                    }
                }
                Ok(())
            }
            Commands::Remove { ref id, yes } => {
                if !yes && atty::is(atty::Stream::Stdin) {
                    let confirmed = dialoguer::Confirm::new()
                        .with_prompt(format!("Permanently delete entry {id}?"))
                        .default(false)
                        .interact()
                        .map_err(|_| PasslockError::Cancelled)?;
                    if !confirmed {
                        return Err(PasslockError::Cancelled);
                    }
                }
                let store = self.open_store()?;
                store.remove(id)?;
                success("Entry removed");
                Ok(())
            }
        }
    }

    async fn generate(
        &self,
        criteria: &GenerationCriteria,
        site: Option<&str>,
        username: Option<&str>,
        copy: bool,
    ) -> Result<()> {
        let generator = PasswordGenerator::new();

        // The busy state is visible while the strength policy runs.
        let spinner = if self.output == OutputFormat::Text {
            let spinner = ProgressBar::new_spinner();
            spinner.set_message("Generating password...");
            spinner.enable_steady_tick(Duration::from_millis(80));
            Some(spinner)
        } else {
            None
        };

        let result = generator.generate(criteria).await;
        if let Some(spinner) = spinner {
            spinner.finish_and_clear();
        }
        let mut generated = result?;

        match self.output {
            OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&generated)?),
            OutputFormat::Text => {
                println!("{}", generated.password);
                if !generated.is_secure {
                    warning("This password may not be strong enough. Consider regenerating or adjusting the criteria.");
                }
            }
        }

        if copy {
            ClipboardManager::copy_with_timeout(&generated.password, CLIPBOARD_TIMEOUT_SECS)
                .await?;
            success(&format!(
                "Copied to clipboard (will clear in {CLIPBOARD_TIMEOUT_SECS} seconds)"
            ));
        }

        if let Some(site) = site {
            let store = self.open_store()?;
            let entry = store.add(NewCredential {
                site: site.to_string(),
                username: username.unwrap_or_default().to_string(),
                secret: generated.password.clone(),
            })?;
            success(&format!("Saved entry for {} (id: {})", entry.site, entry.id));
        }

        generated.password.zeroize();
        Ok(())
    }

    async fn evaluate(&self, password: Option<String>) -> Result<()> {
        let mut password = match password {
            Some(password) => password,
            None => read_secret("Password to evaluate")?,
        };

        let generator = PasswordGenerator::new();
        let report = generator.evaluate(&password).await?;
        password.zeroize();

        match self.output {
            OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
            OutputFormat::Text => {
                let verdict = if report.is_secure {
                    "secure".green().bold()
                } else {
                    "weak".red().bold()
                };
                println!(
                    "Score: {}/100 ({verdict}, policy {})",
                    report.security_score,
                    generator.policy_version()
                );
                if !report.is_secure {
                    println!("Suggestion: {}", report.suggestion);
                }
            }
        }
        Ok(())
    }

    fn open_store(&self) -> Result<CredentialStore> {
        let dir = self
            .store_dir
            .clone()
            .unwrap_or_else(FileStorage::default_dir);
        CredentialStore::open(Arc::new(FileStorage::new(dir)))
    }

    fn render_entries(&self, entries: &[CredentialEntry], show: bool) {
        match self.output {
            OutputFormat::Json => {
                let rendered: Vec<CredentialEntry> = entries
                    .iter()
                    .map(|entry| mask_entry(entry, show))
                    .collect();
                match serde_json::to_string_pretty(&rendered) {
                    Ok(json) => println!("{json}"),
                    Err(e) => eprintln!("{} {e}", "Error:".red().bold()),
                }
            }
            OutputFormat::Text => {
                warning("Secrets are stored unencrypted on disk. This tool is a demo, not a hardened vault.");
                if entries.is_empty() {
                    println!("(no entries)");
                    return;
                }
                for entry in entries {
                    let masked = mask_entry(entry, show);
                    println!("{}  {}", masked.site.bold(), masked.id.dimmed());
                    if !masked.username.is_empty() {
                        println!("  username: {}", masked.username);
                    }
                    println!("  secret:   {}", masked.secret);
                    println!(
                        "  created:  {}",
                        masked.created_at.format("%Y-%m-%d %H:%M UTC")
                    );
                }
            }
        }
    }
}

fn mask_entry(entry: &CredentialEntry, show: bool) -> CredentialEntry {
    let mut rendered = entry.clone();
    if !show {
        rendered.secret = "*".repeat(rendered.secret.chars().count());
    }
    rendered
}

/// Read a secret from the terminal, or from stdin when piped.
fn read_secret(prompt: &str) -> Result<String> {
    if atty::is(atty::Stream::Stdin) {
        let secret = dialoguer::Password::new()
            .with_prompt(prompt)
            .interact()
            .map_err(|_| PasslockError::Cancelled)?;
        Ok(secret)
    } else {
        let mut line = String::new();
        io::stdin().lock().read_line(&mut line)?;
        Ok(line.trim_end_matches(['\r', '\n']).to_string())
    }
}

/// Print a success message.
pub fn success(message: &str) {
    println!("{} {}", "✓".green(), message);
}

/// Print a warning message.
pub fn warning(message: &str) {
    println!("{} {}", "Warning:".yellow(), message);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parsing() {
        // Test that CLI can be parsed without panicking
        let cli = Cli::try_parse_from(["passlock", "list"]);
        assert!(cli.is_ok());

        let cli = Cli::try_parse_from(["passlock", "generate", "--length", "24", "--no-symbols"]);
        assert!(cli.is_ok());

        let cli = Cli::try_parse_from(["passlock", "search", "github", "--show"]);
        assert!(cli.is_ok());
    }

    #[test]
    fn test_generate_username_requires_site() {
        let cli = Cli::try_parse_from(["passlock", "generate", "--username", "octocat"]);
        assert!(cli.is_err());
    }

    #[test]
    fn test_mask_entry_hides_secret_by_default() {
        let entry = CredentialEntry {
            id: "1".to_string(),
            site: "Example".to_string(),
            username: String::new(),
            secret: "hunter2".to_string(),
            created_at: chrono::Utc::now(),
        };
        assert_eq!(mask_entry(&entry, false).secret, "*******");
        assert_eq!(mask_entry(&entry, true).secret, "hunter2");
    }
}
