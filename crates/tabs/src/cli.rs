use std::path::PathBuf;

use clap::{Parser, Subcommand};
use common::session::DEFAULT_EXPORT_FILENAME;

/// Save open tabs to an encrypted file and restore them later
#[derive(Parser)]
#[command(name = "tabs")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Address of the vault message channel
    #[arg(long, global = true, env = "TABS_VAULT_ADDR", default_value = "127.0.0.1:7878")]
    pub vault: String,

    /// Log level for diagnostics on stderr
    #[arg(long, global = true, env = "TABS_LOG_LEVEL", default_value = "warn")]
    pub log_level: String,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Encrypt a list of tab URLs into a file
    Export {
        /// Tab URLs to save
        #[arg(value_name = "URL")]
        urls: Vec<String>,

        /// Read additional URLs from a file, one per line
        #[arg(short, long, value_name = "FILE")]
        input: Option<PathBuf>,

        /// Where to write the encrypted session
        #[arg(short, long, value_name = "FILE", default_value = DEFAULT_EXPORT_FILENAME)]
        output: PathBuf,
    },

    /// Decrypt a saved session and print its URLs, one per line
    Restore {
        /// Encrypted session file
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },
}
