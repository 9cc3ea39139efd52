use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "marketsync")]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Set the log level (trace, debug, info, warn, error); overrides the config file
    #[arg(short, long)]
    pub log_level: Option<String>,

    /// Enable JSON formatted logging
    #[arg(long)]
    pub json_logs: bool,

    /// TOML configuration file; `MARKETSYNC_*` variables apply when absent
    #[arg(short, long)]
    pub config: Option<String>,

    /// JSON marketplace fixture served by the in-memory provider
    #[arg(short, long)]
    pub fixture: Option<String>,

    /// Directory holding persisted OAuth credentials
    #[arg(long)]
    pub data_dir: Option<String>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Command {
    /// List accounts, optionally selecting one
    Accounts {
        #[arg(long)]
        select: Option<String>,
    },

    /// List assets for the active account
    Assets {
        /// Case-insensitive name/description filter
        #[arg(short, long)]
        query: Option<String>,

        /// Only show assets purchased in this session
        #[arg(long)]
        purchased: bool,
    },

    /// List orders placed by the active account
    Orders,

    /// Request tokens from the faucet
    Faucet {
        /// Amount to request; defaults to `sync.faucet_amount`
        #[arg(short, long)]
        amount: Option<u64>,
    },

    /// Publish an asset and list assets again
    Publish {
        #[arg(long)]
        name: String,

        #[arg(long, default_value = "")]
        description: String,

        /// Content URL; repeatable
        #[arg(long = "url")]
        urls: Vec<String>,

        #[arg(long, default_value_t = 0)]
        price: u64,
    },

    /// Purchase access to an asset
    Purchase { asset_id: String },

    /// Store the credential carried by an OAuth redirect, e.g. `/oauth/azure#access_token=...`
    OauthCallback { redirect: String },

    /// List cloud blobs visible to the stored credential
    CloudFiles {
        /// Clear the listing instead
        #[arg(long)]
        clear: bool,
    },

    /// Bootstrap only and print the state
    Snapshot,
}

/// Expand `~` and environment variables in a user-supplied path
pub fn expand_path(raw: &str) -> anyhow::Result<PathBuf> {
    let expanded = shellexpand::full(raw)
        .map_err(|e| anyhow::anyhow!("cannot expand path {}: {}", raw, e))?;
    Ok(PathBuf::from(expanded.as_ref()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_publish() {
        let args = Args::try_parse_from([
            "marketsync",
            "--fixture",
            "market.json",
            "publish",
            "--name",
            "Rainfall",
            "--url",
            "https://a",
            "--url",
            "https://b",
        ])
        .unwrap();

        assert_eq!(args.fixture.as_deref(), Some("market.json"));
        match args.command {
            Command::Publish { name, urls, price, .. } => {
                assert_eq!(name, "Rainfall");
                assert_eq!(urls.len(), 2);
                assert_eq!(price, 0);
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_parse_oauth_callback() {
        let args = Args::try_parse_from([
            "marketsync",
            "oauth-callback",
            "/oauth/azure#access_token=t",
        ])
        .unwrap();
        assert_eq!(
            args.command,
            Command::OauthCallback {
                redirect: "/oauth/azure#access_token=t".into()
            }
        );
    }

    #[test]
    fn test_expand_path() {
        assert_eq!(expand_path("/tmp/data").unwrap(), PathBuf::from("/tmp/data"));
    }
}
