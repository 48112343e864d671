use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "ledgerstore")]
#[command(about = "Ledger archive data store CLI", long_about = None)]
pub struct Cli {
    /// Bound every storage call to this many seconds (overrides config)
    #[arg(long, global = true)]
    pub timeout_secs: Option<u64>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Print the object key holding a ledger sequence
    Key(KeyArgs),
    #[command(flatten)]
    Store(StoreCommand),
}

/// Commands that talk to the configured destination
#[derive(Subcommand, Debug)]
pub enum StoreCommand {
    /// Check whether an object exists
    Exists(ObjectArgs),
    /// Print the stored size of an object in bytes
    Size(ObjectArgs),
    /// Download an object
    Get(GetArgs),
    /// Upload a file as an object
    Put(PutArgs),
}

#[derive(clap::Args, Debug)]
pub struct KeyArgs {
    /// Ledger sequence number
    pub sequence: u32,

    #[arg(long)]
    pub ledgers_per_file: Option<u32>,

    #[arg(long)]
    pub files_per_partition: Option<u32>,

    #[arg(long)]
    pub extension: Option<String>,
}

#[derive(clap::Args, Debug)]
pub struct ObjectArgs {
    /// Object key relative to the destination prefix
    pub key: String,
}

#[derive(clap::Args, Debug)]
pub struct GetArgs {
    pub key: String,

    /// Write to this file instead of stdout
    #[arg(long, short)]
    pub output: Option<PathBuf>,
}

#[derive(clap::Args, Debug)]
pub struct PutArgs {
    pub key: String,

    /// File to upload
    #[arg(long, short)]
    pub input: PathBuf,

    /// Leave an existing object untouched
    #[arg(long)]
    pub if_not_exists: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_key_needs_no_store() {
        let cli = Cli::try_parse_from(["ledgerstore", "key", "700", "--ledgers-per-file", "64"])
            .unwrap();
        assert!(matches!(
            cli.command,
            Commands::Key(KeyArgs {
                sequence: 700,
                ledgers_per_file: Some(64),
                ..
            })
        ));
    }

    #[test]
    fn test_store_commands_parse_flat() {
        let cli = Cli::try_parse_from(["ledgerstore", "exists", "0-63.xdr.gz"]).unwrap();
        assert!(matches!(
            cli.command,
            Commands::Store(StoreCommand::Exists(ObjectArgs { ref key })) if key == "0-63.xdr.gz"
        ));

        let cli = Cli::try_parse_from([
            "ledgerstore",
            "--timeout-secs",
            "5",
            "put",
            "0-63.xdr.gz",
            "--input",
            "batch.xdr.gz",
            "--if-not-exists",
        ])
        .unwrap();
        assert_eq!(cli.timeout_secs, Some(5));
        assert!(matches!(
            cli.command,
            Commands::Store(StoreCommand::Put(PutArgs {
                if_not_exists: true,
                ..
            }))
        ));
    }
}
