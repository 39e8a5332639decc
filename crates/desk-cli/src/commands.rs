use std::path::{Path, PathBuf};

use anyhow::Context;
use colored::Colorize;
use desk_core::Desk;
use desk_server::{DeskServer, ServerConfig};
use desk_types::{LookupEntry, LookupKind, Priority, Ticket};
use serde::Serialize;

use crate::cli::*;

pub fn run_command(cli: Cli) -> anyhow::Result<()> {
    let config = resolve_config(cli.config.as_deref(), cli.data)?;
    match cli.command {
        Command::Serve(args) => cmd_serve(config, args),
        Command::Tickets(args) => cmd_tickets(&open(&config)?, args, cli.format),
        Command::Statuses => cmd_lookups(&open(&config)?, LookupKind::Status, cli.format),
        Command::Categories => cmd_lookups(&open(&config)?, LookupKind::Category, cli.format),
        Command::Check => cmd_check(&open(&config)?, cli.format),
    }
}

/// Config file (or defaults) with the `--data` override applied.
fn resolve_config(path: Option<&Path>, data: Option<PathBuf>) -> anyhow::Result<ServerConfig> {
    let mut config = match path {
        Some(path) => ServerConfig::from_toml_file(path)?,
        None => ServerConfig::default(),
    };
    if let Some(data) = data {
        config.data_file = data;
    }
    Ok(config)
}

fn open(config: &ServerConfig) -> anyhow::Result<Desk> {
    Desk::open(&config.data_file)
        .with_context(|| format!("opening {}", config.data_file.display()))
}

fn cmd_serve(mut config: ServerConfig, args: ServeArgs) -> anyhow::Result<()> {
    if let Some(bind) = args.bind {
        config.bind_addr = bind;
    }
    let server = DeskServer::open(config)?;
    println!(
        "{} Desk server on {} (data: {})",
        "✓".green().bold(),
        server.config().bind_addr.to_string().bold(),
        server.config().data_file.display()
    );
    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(server.serve())?;
    Ok(())
}

fn cmd_tickets(desk: &Desk, args: TicketsArgs, format: OutputFormat) -> anyhow::Result<()> {
    if let Some(id) = args.id {
        let ticket = desk.tickets().get_one(id)?;
        if format == OutputFormat::Json {
            return print_json(&ticket);
        }
        let labels = Labels::load(desk)?;
        println!("{}", ticket_line(&ticket, &labels));
        println!("  {} {}", "User:".dimmed(), ticket.user);
        println!("  {} {}", "Created:".dimmed(), ticket.created_at.to_rfc3339());
        println!("  {}", ticket.description);
        if ticket.comments.is_empty() {
            println!("\n  No comments.");
        }
        for comment in &ticket.comments {
            println!(
                "\n  {} {} {}",
                comment.author.bold(),
                comment.created_at.to_rfc3339().dimmed(),
                comment.id.dimmed()
            );
            println!("    {}", comment.content);
        }
        return Ok(());
    }

    let tickets = desk.tickets().list_all()?;
    if format == OutputFormat::Json {
        return print_json(&tickets);
    }
    if tickets.is_empty() {
        println!("No tickets.");
        return Ok(());
    }
    let labels = Labels::load(desk)?;
    for ticket in &tickets {
        println!("{}", ticket_line(ticket, &labels));
    }
    Ok(())
}

fn cmd_lookups(desk: &Desk, kind: LookupKind, format: OutputFormat) -> anyhow::Result<()> {
    let entries = desk.lookups(kind).list()?;
    if format == OutputFormat::Json {
        return print_json(&entries);
    }
    if entries.is_empty() {
        println!("No {}.", kind.collection_name());
    }
    for entry in &entries {
        println!("{}  {}", entry.key.dimmed(), entry.label.bold());
    }
    Ok(())
}

fn cmd_check(desk: &Desk, format: OutputFormat) -> anyhow::Result<()> {
    let report = desk.check()?;
    if format == OutputFormat::Json {
        print_json(&report)?;
    } else if report.is_clean() {
        println!("{} No integrity violations.", "✓".green().bold());
    } else {
        for violation in &report.violations {
            println!("{} {}", "✗".red().bold(), violation);
        }
    }
    if !report.is_clean() {
        anyhow::bail!("{} integrity violation(s)", report.violations.len());
    }
    Ok(())
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Status and category labels for rendering ticket references.
struct Labels {
    statuses: Vec<LookupEntry>,
    categories: Vec<LookupEntry>,
}

impl Labels {
    fn load(desk: &Desk) -> anyhow::Result<Self> {
        Ok(Self {
            statuses: desk.statuses().list()?,
            categories: desk.categories().list()?,
        })
    }

    fn label(&self, kind: LookupKind, key: Option<&str>) -> String {
        let entries = match kind {
            LookupKind::Status => &self.statuses,
            LookupKind::Category => &self.categories,
        };
        match key {
            None => "-".to_string(),
            Some(key) => entries
                .iter()
                .find(|e| e.key == key)
                .map(|e| e.label.clone())
                .unwrap_or_else(|| format!("?{key}")),
        }
    }
}

fn ticket_line(ticket: &Ticket, labels: &Labels) -> String {
    format!(
        "{} {} [{}] {} / {}",
        format!("#{}", ticket.id).yellow().bold(),
        ticket.title.bold(),
        colored_priority(ticket.priority),
        labels
            .label(LookupKind::Status, ticket.reference(LookupKind::Status))
            .cyan(),
        labels
            .label(LookupKind::Category, ticket.reference(LookupKind::Category))
            .blue(),
    )
}

fn colored_priority(priority: Priority) -> colored::ColoredString {
    match priority {
        Priority::Critical => priority.as_str().red().bold(),
        Priority::High => priority.as_str().red(),
        Priority::Medium => priority.as_str().yellow(),
        Priority::Low => priority.as_str().green(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn data_flag_overrides_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("desk.toml");
        std::fs::write(&path, "data_file = \"from-file.json\"\ncors = false\n").unwrap();

        let config = resolve_config(Some(path.as_path()), None).unwrap();
        assert_eq!(config.data_file, PathBuf::from("from-file.json"));
        assert!(!config.cors);

        let config = resolve_config(Some(path.as_path()), Some("flag.json".into())).unwrap();
        assert_eq!(config.data_file, PathBuf::from("flag.json"));
    }

    #[test]
    fn missing_config_file_is_an_error() {
        assert!(resolve_config(Some(Path::new("/nonexistent/desk.toml")), None).is_err());
    }

    #[test]
    fn labels_resolve_known_missing_and_null_keys() {
        let labels = Labels {
            statuses: vec![LookupEntry::new("k1", "Open")],
            categories: vec![],
        };
        assert_eq!(labels.label(LookupKind::Status, Some("k1")), "Open");
        assert_eq!(labels.label(LookupKind::Category, Some("k1")), "?k1");
        assert_eq!(labels.label(LookupKind::Status, None), "-");
    }

    #[test]
    fn check_fails_on_violations() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("db.json");
        let duplicated = r#"{
            "tickets": [],
            "statuses": [{"key": "a", "label": "A"}, {"key": "a", "label": "B"}],
            "categories": []
        }"#;
        std::fs::write(&path, duplicated).unwrap();
        let desk = Desk::open(&path).unwrap();
        assert!(cmd_check(&desk, OutputFormat::Json).is_err());

        let clean = Desk::open(dir.path().join("clean.json")).unwrap();
        assert!(cmd_check(&clean, OutputFormat::Text).is_ok());
    }
}
