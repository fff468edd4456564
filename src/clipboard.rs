//! Clipboard operations for generated and stored secrets.

use crate::error::{PasslockError, Result};
use copypasta::{ClipboardContext, ClipboardProvider};
use std::time::Duration;
use tokio::time::sleep;

/// Clipboard manager with time-locked copies.
pub struct ClipboardManager;

impl ClipboardManager {
    /// Copy text to clipboard with automatic clearing after timeout.
    pub async fn copy_with_timeout(text: &str, timeout_secs: u64) -> Result<()> {
        Self::copy(text)?;

        // Clear later only if the clipboard still holds our text.
        let text_to_clear = text.to_string();
        tokio::spawn(async move {
            sleep(Duration::from_secs(timeout_secs)).await;
            if let Ok(current) = Self::get_contents() {
                if current == text_to_clear {
                    let _ = Self::clear();
                }
            }
        });

        Ok(())
    }

    /// Copy text to clipboard.
    pub fn copy(text: &str) -> Result<()> {
        let mut ctx = ClipboardContext::new().map_err(|_| PasslockError::ClipboardFailed)?;

        ctx.set_contents(text.to_string())
            .map_err(|_| PasslockError::ClipboardFailed)?;

        Ok(())
    }

    /// Get clipboard contents.
    pub fn get_contents() -> Result<String> {
        let mut ctx = ClipboardContext::new().map_err(|_| PasslockError::ClipboardFailed)?;

        ctx.get_contents().map_err(|_| PasslockError::ClipboardFailed)
    }

    /// Clear clipboard.
    pub fn clear() -> Result<()> {
        Self::copy("")
    }
}
