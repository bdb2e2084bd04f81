//! `fz logs` - inspect and prune the local event log

use anyhow::{Context, Result};
use chrono::{TimeZone, Utc};
use clap::Subcommand;
use colored::Colorize;
use dialoguer::Confirm;

use super::get_app_dir;
use crate::output;
use finanzas_core::services::{EntryPoint, LogEntry, LogStats, LoggingService};

/// Failed events echoed under the full listing
const ERROR_TAIL: usize = 3;

#[derive(Subcommand)]
pub enum LogsCommands {
    /// Show recent log entries
    List {
        /// Number of entries to show
        #[arg(short, long, default_value = "50")]
        limit: usize,
        /// Show only errors
        #[arg(long)]
        errors: bool,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Delete old log entries
    Clear {
        /// Delete entries older than N days
        #[arg(long, default_value = "30")]
        older_than_days: u64,
        /// Do not ask for confirmation
        #[arg(long, short = 'f')]
        force: bool,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Entry counts and database location
    Stats {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

pub fn run(command: LogsCommands) -> Result<()> {
    let service = open_log()?;
    match command {
        LogsCommands::List { limit, errors, json } => list(&service, limit, errors, json),
        LogsCommands::Clear {
            older_than_days,
            force,
            json,
        } => clear(&service, older_than_days, force, json),
        LogsCommands::Stats { json } => stats(&service, json),
    }
}

fn open_log() -> Result<LoggingService> {
    let app_dir = get_app_dir()?;
    std::fs::create_dir_all(&app_dir)
        .with_context(|| format!("Failed to create finanzas directory: {:?}", app_dir))?;
    LoggingService::new(&app_dir, EntryPoint::Cli, env!("CARGO_PKG_VERSION"))
}

fn list(service: &LoggingService, limit: usize, errors_only: bool, json: bool) -> Result<()> {
    let entries = if errors_only {
        service.get_errors(limit)?
    } else {
        service.get_recent(limit)?
    };

    if json {
        return output::print_json(&entries);
    }
    if entries.is_empty() {
        output::info("No log entries found.");
        return Ok(());
    }

    let mut table = output::create_table();
    table.set_header(vec!["Time", "Entry", "Event", "Context", ""]);
    for entry in &entries {
        table.add_row(entry_row(entry));
    }
    println!("{}", table);

    if errors_only {
        return Ok(());
    }
    let failures = service.get_errors(ERROR_TAIL)?;
    if !failures.is_empty() {
        println!("\n{}", "Recent errors:".red().bold());
        for entry in &failures {
            println!(
                "  {} {} {}",
                format_timestamp(entry.timestamp).dimmed(),
                entry.event,
                entry.error_message.as_deref().unwrap_or_default()
            );
        }
    }
    Ok(())
}

fn clear(service: &LoggingService, days: u64, force: bool, json: bool) -> Result<()> {
    let confirmed = force
        || json
        || Confirm::new()
            .with_prompt(format!("Delete log entries older than {} days?", days))
            .default(false)
            .interact()?;
    if !confirmed {
        output::info("Nothing deleted.");
        return Ok(());
    }

    let deleted = service.delete_older_than(days)?;
    if json {
        output::print_json(&serde_json::json!({ "deleted": deleted }))
    } else {
        output::success(&format!("Deleted {} log entries", deleted));
        Ok(())
    }
}

fn stats(service: &LoggingService, json: bool) -> Result<()> {
    let stats = service.stats()?;
    if json {
        return output::print_json(&stats);
    }
    for line in stats_lines(&stats) {
        println!("{}", line);
    }
    Ok(())
}

fn stats_lines(stats: &LogStats) -> Vec<String> {
    vec![
        "Event log".bold().to_string(),
        format!("  Entries:  {}", stats.total_entries),
        format!("  Errors:   {}", stats.error_count),
        format!("  File:     {}", stats.database_path.display()),
        format!("  Size:     {}", output::format_size(stats.database_size_bytes)),
    ]
}

fn entry_row(entry: &LogEntry) -> Vec<String> {
    let marker = match entry.error_message {
        Some(_) => "!".red().to_string(),
        None => String::new(),
    };
    vec![
        format_timestamp(entry.timestamp),
        entry.entry_point.clone(),
        entry.event.clone(),
        context_of(entry),
        marker,
    ]
}

fn format_timestamp(timestamp_ms: i64) -> String {
    Utc.timestamp_millis_opt(timestamp_ms)
        .single()
        .map(|dt| dt.format("%Y-%m-%d %H:%M:%S").to_string())
        .unwrap_or_else(|| timestamp_ms.to_string())
}

/// Command, route and status joined for the context column
fn context_of(entry: &LogEntry) -> String {
    let status = entry.http_status.map(|s| format!("HTTP {}", s));
    [entry.command.as_deref(), entry.route.as_deref(), status.as_deref()]
        .into_iter()
        .flatten()
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn entry() -> LogEntry {
        LogEntry {
            id: 1,
            timestamp: 0,
            entry_point: "cli".to_string(),
            app_version: "0.1.0".to_string(),
            platform: "linux".to_string(),
            event: "command_executed".to_string(),
            command: None,
            route: None,
            http_status: None,
            error_message: None,
        }
    }

    #[test]
    fn test_format_timestamp() {
        assert_eq!(format_timestamp(0), "1970-01-01 00:00:00");
        assert_eq!(format_timestamp(1_700_000_000_000), "2023-11-14 22:13:20");
    }

    #[test]
    fn test_context_skips_missing_parts() {
        assert_eq!(context_of(&entry()), "");

        let full = LogEntry {
            command: Some("expenses".to_string()),
            http_status: Some(401),
            ..entry()
        };
        assert_eq!(context_of(&full), "expenses, HTTP 401");
    }

    #[test]
    fn test_entry_row_marks_errors() {
        colored::control::set_override(false);
        assert_eq!(entry_row(&entry())[4], "");

        let failed = LogEntry {
            error_message: Some("boom".to_string()),
            ..entry()
        };
        assert_eq!(entry_row(&failed)[4], "!");
    }

    #[test]
    fn test_stats_lines() {
        colored::control::set_override(false);
        let stats = LogStats {
            total_entries: 12,
            error_count: 2,
            database_path: PathBuf::from("/tmp/logs.duckdb"),
            database_size_bytes: 0,
        };
        let lines = stats_lines(&stats);
        assert_eq!(lines[0], "Event log");
        assert_eq!(lines[1], "  Entries:  12");
        assert_eq!(lines[2], "  Errors:   2");
        assert_eq!(lines[3], "  File:     /tmp/logs.duckdb");
    }
}
