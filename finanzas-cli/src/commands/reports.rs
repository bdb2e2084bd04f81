//! Reports command - summaries computed by the backend

use anyhow::Result;
use clap::Subcommand;
use colored::Colorize;
use finanzas_core::services::DEFAULT_EVOLUTION_MONTHS;
use finanzas_core::Period;
use serde_json::Value as JsonValue;

use super::with_context;
use crate::output;

#[derive(Subcommand)]
pub enum ReportCommands {
    /// Income and expense totals for a month (YYYY-MM, defaults to current)
    Summary { period: Option<Period> },
    /// Month-by-month totals
    Evolution {
        #[arg(long, default_value_t = DEFAULT_EVOLUTION_MONTHS)]
        months: u32,
    },
    /// Spending per category for a month
    ByCategory { period: Option<Period> },
    /// Budgeted versus actual spending
    Comparison,
}

pub fn run(command: ReportCommands, json: bool) -> Result<()> {
    with_context("reports", |app| {
        let service = &app.ctx.report_service;

        let (title, report) = match command {
            ReportCommands::Summary { period } => {
                let period = period.unwrap_or_else(Period::current);
                (format!("Summary {}", period), service.monthly_summary(period)?)
            }
            ReportCommands::Evolution { months } => (
                format!("Last {} months", months),
                service.monthly_evolution(months)?,
            ),
            ReportCommands::ByCategory { period } => {
                let period = period.unwrap_or_else(Period::current);
                (
                    format!("Spending by category {}", period),
                    service.spending_by_category(period)?,
                )
            }
            ReportCommands::Comparison => {
                ("Budget comparison".to_string(), service.budget_comparison()?)
            }
        };

        if json {
            return output::print_json(&report);
        }

        println!("{}", title.bold());
        println!();
        print_report(&report);
        Ok(())
    })
}

/// Render an untyped report: arrays of objects as tables, objects as
/// key/value rows, anything else as JSON
fn print_report(report: &JsonValue) {
    match report {
        JsonValue::Array(rows) if rows.iter().all(JsonValue::is_object) && !rows.is_empty() => {
            let mut columns: Vec<String> = Vec::new();
            for row in rows.iter().filter_map(JsonValue::as_object) {
                for key in row.keys() {
                    if !columns.contains(key) {
                        columns.push(key.clone());
                    }
                }
            }

            let mut table = output::create_table();
            table.set_header(columns.clone());
            for row in rows {
                table.add_row(columns.iter().map(|c| scalar(&row[c])).collect::<Vec<_>>());
            }
            println!("{}", table);
        }
        JsonValue::Object(map) => {
            let mut table = output::create_table();
            for (key, value) in map {
                table.add_row(vec![key.clone(), scalar(value)]);
            }
            println!("{}", table);
        }
        JsonValue::Array(rows) if rows.is_empty() => output::info("No data."),
        other => println!("{}", other),
    }
}

fn scalar(value: &JsonValue) -> String {
    match value {
        JsonValue::Null => "-".to_string(),
        JsonValue::String(s) => s.clone(),
        other => other.to_string(),
    }
}
