use std::net::SocketAddr;
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(name = "desk", about = "Desk: a small ticket tracker", version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,

    /// TOML file with server settings
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// JSON data file (overrides the config file)
    #[arg(long, global = true)]
    pub data: Option<PathBuf>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
pub enum Command {
    /// Start the HTTP server
    Serve(ServeArgs),
    /// List tickets, or show one with its comments
    Tickets(TicketsArgs),
    /// List statuses
    Statuses,
    /// List categories
    Categories,
    /// Report dangling references and duplicate keys
    Check,
}

#[derive(Args)]
pub struct ServeArgs {
    /// Address to listen on (overrides the config file)
    #[arg(long)]
    pub bind: Option<SocketAddr>,
}

#[derive(Args)]
pub struct TicketsArgs {
    #[arg(long)]
    pub id: Option<u64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_serve_with_overrides() {
        let cli = Cli::try_parse_from([
            "desk", "serve", "--bind", "0.0.0.0:8080", "--data", "/tmp/db.json",
        ])
        .unwrap();
        assert_eq!(cli.data, Some(PathBuf::from("/tmp/db.json")));
        if let Command::Serve(args) = cli.command {
            assert_eq!(args.bind, Some("0.0.0.0:8080".parse().unwrap()));
        } else {
            panic!("wrong command");
        }
    }

    #[test]
    fn parse_tickets_by_id() {
        let cli =
            Cli::try_parse_from(["desk", "--format", "json", "tickets", "--id", "4"]).unwrap();
        assert_eq!(cli.format, OutputFormat::Json);
        if let Command::Tickets(args) = cli.command {
            assert_eq!(args.id, Some(4));
        } else {
            panic!("wrong command");
        }
    }

    #[test]
    fn parse_lookup_commands() {
        let cli = Cli::try_parse_from(["desk", "statuses", "-v"]).unwrap();
        assert!(cli.verbose);
        assert!(matches!(cli.command, Command::Statuses));
        let cli = Cli::try_parse_from(["desk", "categories"]).unwrap();
        assert!(matches!(cli.command, Command::Categories));
        let cli = Cli::try_parse_from(["desk", "check"]).unwrap();
        assert!(matches!(cli.command, Command::Check));
    }

    #[test]
    fn rejects_bad_bind_address() {
        assert!(Cli::try_parse_from(["desk", "serve", "--bind", "nowhere"]).is_err());
    }
}
