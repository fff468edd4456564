//! Main entry point for passlock.

use clap::Parser;
use colored::Colorize;
use passlock::cli::Cli;

#[tokio::main]
async fn main() {
    // Set up colored output for Windows
    #[cfg(windows)]
    colored::control::set_virtual_terminal(true).ok();

    let cli = Cli::parse();

    if let Err(e) = cli.execute().await {
        eprintln!("{} {}", "Error:".red().bold(), e);
        std::process::exit(1);
    }
}
