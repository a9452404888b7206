//! CLI command definitions

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use uuid::Uuid;

/// Per-user task lists served by virtual actors
#[derive(Debug, Parser)]
#[command(name = "todo-actors", about = "Per-user task lists served by virtual actors")]
pub struct Cli {
    /// Path to a TOML config file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Print a user's items as JSON
    Items {
        #[arg(short, long)]
        email: String,
    },

    /// Append an item to a user's list
    Add {
        #[arg(short, long)]
        email: String,

        /// What needs doing
        description: String,

        /// Client-chosen item id (accepted, not used)
        #[arg(long)]
        id: Option<Uuid>,
    },

    /// Mark the item at INDEX done (0-based, as listed by `items`)
    Complete {
        #[arg(short, long)]
        email: String,

        #[arg(value_name = "INDEX")]
        index: usize,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_add_with_id() {
        let cli = Cli::try_parse_from([
            "todo-actors",
            "add",
            "--email",
            "alice@example.com",
            "buy milk",
            "--id",
            "67e55044-10b1-426f-9247-bb680e5fe0c8",
        ])
        .unwrap();
        match cli.command {
            Command::Add {
                email,
                description,
                id,
            } => {
                assert_eq!(email, "alice@example.com");
                assert_eq!(description, "buy milk");
                assert!(id.is_some());
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_complete_requires_index() {
        assert!(Cli::try_parse_from(["todo-actors", "complete", "-e", "a@b.c"]).is_err());
    }
}
