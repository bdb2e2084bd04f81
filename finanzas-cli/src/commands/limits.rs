//! Limits command - per-category spending limits

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Subcommand;
use finanzas_core::{CategoryLimit, Period};
use rust_decimal::Decimal;
use serde_json::json;

use super::with_context;
use crate::output;

#[derive(Subcommand)]
pub enum LimitCommands {
    /// List all limits
    List,
    /// Limits of one month (YYYY-MM, defaults to the current month)
    Period { period: Option<Period> },
    /// Show one limit
    Get { id: i64 },
    /// Limit of a category in a month
    Category {
        category: i64,
        period: Option<Period>,
    },
    /// Every limit ever set for a category
    History { category: i64 },
    /// Set the limit of a category for a month
    Set {
        #[arg(long)]
        category: i64,
        #[arg(long)]
        limit: Decimal,
        #[arg(long)]
        period: Option<Period>,
    },
    /// Set several limits from a JSON file (array of limits)
    Batch { file: PathBuf },
    /// Change the amount of an existing limit
    Update {
        id: i64,
        #[arg(long)]
        limit: Decimal,
    },
    /// Delete a limit
    Delete { id: i64 },
    /// Copy every limit from one month to another
    Copy { from: Period, to: Period },
}

pub fn run(command: LimitCommands, json: bool) -> Result<()> {
    with_context("limits", |app| {
        let service = &app.ctx.category_limit_service;

        match command {
            LimitCommands::List => print_list(&service.list()?, json),
            LimitCommands::Period { period } => {
                print_list(&service.by_period(period.unwrap_or_else(Period::current))?, json)
            }
            LimitCommands::Get { id } => print_list(&[service.get(id)?], json),
            LimitCommands::Category { category, period } => {
                let period = period.unwrap_or_else(Period::current);
                match service.by_category_and_period(category, period)? {
                    Some(limit) => print_list(&[limit], json),
                    None if json => output::print_json(&serde_json::Value::Null),
                    None => {
                        output::info(&format!("No limit for category {} in {}", category, period));
                        Ok(())
                    }
                }
            }
            LimitCommands::History { category } => {
                print_list(&service.history_by_category(category)?, json)
            }
            LimitCommands::Set {
                category,
                limit,
                period,
            } => {
                let period = period.unwrap_or_else(Period::current);
                let saved = service.create_or_update(&CategoryLimit::new(category, limit, period))?;
                if !json {
                    output::success(&format!("Limit set for category {} in {}", category, period));
                }
                print_list(&[saved], json)
            }
            LimitCommands::Batch { file } => {
                let content = std::fs::read_to_string(&file)
                    .with_context(|| format!("Failed to read {}", file.display()))?;
                let limits: Vec<CategoryLimit> = serde_json::from_str(&content)
                    .with_context(|| format!("{} is not a JSON array of limits", file.display()))?;
                let summary = service.create_batch(&limits)?;
                if json {
                    return output::print_json(&summary);
                }
                output::success(&format!("Submitted {} limits", limits.len()));
                Ok(())
            }
            LimitCommands::Update { id, limit } => {
                let mut current = service.get(id)?;
                current.limit = Some(limit);
                let updated = service.update(id, &current)?.unwrap_or(current);
                if !json {
                    output::success(&format!("Updated limit {}", id));
                }
                print_list(&[updated], json)
            }
            LimitCommands::Delete { id } => {
                service.delete(id)?;
                if json {
                    output::print_json(&json!({ "deleted": id }))
                } else {
                    output::success(&format!("Deleted limit {}", id));
                    Ok(())
                }
            }
            LimitCommands::Copy { from, to } => {
                let summary = service.copy_period(from, to)?;
                if json {
                    return output::print_json(&summary);
                }
                output::success(&format!("Copied limits from {} to {}", from, to));
                Ok(())
            }
        }
    })
}

fn print_list(limits: &[CategoryLimit], json: bool) -> Result<()> {
    if json {
        return output::print_json(limits);
    }
    if limits.is_empty() {
        output::info("No limits found.");
        return Ok(());
    }

    let mut table = output::create_table();
    table.set_header(vec!["ID", "Period", "Category", "Limit"]);
    for l in limits {
        table.add_row(vec![
            output::cell(l.id),
            output::cell(l.period()),
            output::cell(l.category_id),
            output::format_amount(l.limit),
        ]);
    }
    println!("{}", table);
    Ok(())
}
