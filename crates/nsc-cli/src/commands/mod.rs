//! CLI command definitions and handlers.

use anyhow::Result;
use clap::{Parser, Subcommand};

pub mod serve;

/// NoSQL Console - document and graph stores in one web UI
#[derive(Parser)]
#[command(name = "nosql-console")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Connect to both stores and start the web console
    Serve(serve::ServeArgs),
}

impl Cli {
    pub async fn execute(self) -> Result<()> {
        match self.command {
            Commands::Serve(args) => serve::execute(args).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serve_defaults() {
        let cli = Cli::try_parse_from(["nosql-console", "serve"]).unwrap();
        let Commands::Serve(args) = cli.command;
        assert_eq!(args.host, "127.0.0.1");
        assert_eq!(args.port, 3030);
        assert!(!args.log);
        assert!(args.config.is_none());
    }

    #[test]
    fn test_serve_flags() {
        let cli = Cli::try_parse_from([
            "nosql-console", "serve", "--port", "8080", "--config", "console.toml", "--log",
            "--log-file", "logs/console.log",
        ])
        .unwrap();
        let Commands::Serve(args) = cli.command;
        assert_eq!(args.port, 8080);
        assert_eq!(args.config.as_deref(), Some(std::path::Path::new("console.toml")));
        assert!(args.log);
    }
}
