//! CLI module for API key management.
//!
//! Used either standalone or as the `keys` subcommand of the main
//! vpn-panel CLI.
//!
//! # Usage
//!
//! ```bash
//! # Mint a new key
//! vpn-panel keys mint -f /etc/API/api_keys.json --name ops --permissions admin
//!
//! # List registered keys (masked)
//! vpn-panel keys list -f /etc/API/api_keys.json
//! ```

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tabled::{Table, Tabled};

use crate::keys::ApiKeyStore;

/// API key management CLI arguments.
#[derive(Parser, Debug, Clone)]
#[command(name = "panel-keys", version, about = "Manage panel API keys")]
pub struct KeysArgs {
    #[command(subcommand)]
    pub command: KeysCommands,
}

#[derive(Subcommand, Debug, Clone)]
pub enum KeysCommands {
    /// Mint a new API key.
    Mint {
        /// Key registry file.
        #[arg(short, long, default_value = "/etc/API/api_keys.json")]
        file: PathBuf,

        /// Human-readable key name.
        #[arg(short, long)]
        name: String,

        /// Permissions granted to the key.
        #[arg(short, long, default_values_t = vec!["read".to_string()])]
        permissions: Vec<String>,
    },

    /// List registered keys (key material masked).
    List {
        /// Key registry file.
        #[arg(short, long, default_value = "/etc/API/api_keys.json")]
        file: PathBuf,
    },
}

/// Key row for display.
#[derive(Tabled)]
struct KeyDisplay {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Permissions")]
    permissions: String,
    #[tabled(rename = "Key")]
    key_preview: String,
    #[tabled(rename = "Created")]
    created: String,
}

/// Run the keys CLI with the given arguments.
pub fn run(args: KeysArgs) -> Result<(), Box<dyn std::error::Error>> {
    match args.command {
        KeysCommands::Mint {
            file,
            name,
            permissions,
        } => {
            let store = ApiKeyStore::load(file)?;
            let (key_id, data) = store.mint(&name, permissions)?;
            println!("Key minted successfully.");
            println!("  ID:          {}", key_id);
            println!("  Name:        {}", data.name);
            println!("  Permissions: {}", data.permissions.join(", "));
            println!("  Key:         {}", data.key);
            Ok(())
        }
        KeysCommands::List { file } => {
            let store = ApiKeyStore::load(file)?;
            let mut rows: Vec<KeyDisplay> = store
                .list()
                .into_iter()
                .map(|(id, summary)| KeyDisplay {
                    id,
                    name: summary.name,
                    permissions: summary.permissions.join(", "),
                    key_preview: summary.key_preview,
                    created: summary.created,
                })
                .collect();
            rows.sort_by(|a, b| a.id.cmp(&b.id));
            println!("{}", Table::new(rows));
            Ok(())
        }
    }
}
