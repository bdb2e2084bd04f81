//! Expenses and incomes commands
//!
//! Both resources share one record shape, so they share one command set.

use anyhow::{anyhow, Result};
use clap::Subcommand;
use finanzas_core::domain::result::Result as CoreResult;
use finanzas_core::domain::Movement;
use finanzas_core::Period;
use rust_decimal::Decimal;
use serde_json::json;

use super::{with_context, App};
use crate::output;

#[derive(Clone, Copy)]
pub enum MovementKind {
    Expense,
    Income,
}

impl MovementKind {
    fn command(&self) -> &'static str {
        match self {
            MovementKind::Expense => "expenses",
            MovementKind::Income => "incomes",
        }
    }

    fn noun(&self) -> &'static str {
        match self {
            MovementKind::Expense => "expense",
            MovementKind::Income => "income",
        }
    }
}

#[derive(Subcommand)]
pub enum MovementCommands {
    /// List records; filters are passed to the backend as query parameters
    List {
        /// Filter as key=value (repeatable), e.g. --filter categoriaId=3
        #[arg(long = "filter", value_parser = parse_filter)]
        filters: Vec<(String, String)>,
    },
    /// List records of one month (YYYY-MM, defaults to the current month)
    Period { period: Option<Period> },
    /// Show one record
    Get { id: i64 },
    /// Create a record
    Create {
        #[arg(long)]
        amount: Decimal,
        #[arg(long)]
        category: i64,
        /// Date (YYYY-MM-DD), defaults to today
        #[arg(long)]
        date: Option<String>,
        #[arg(long)]
        description: Option<String>,
    },
    /// Update fields of a record
    Update {
        id: i64,
        #[arg(long)]
        amount: Option<Decimal>,
        #[arg(long)]
        category: Option<i64>,
        #[arg(long)]
        date: Option<String>,
        #[arg(long)]
        description: Option<String>,
    },
    /// Delete a record
    Delete { id: i64 },
}

fn parse_filter(raw: &str) -> std::result::Result<(String, String), String> {
    raw.split_once('=')
        .map(|(k, v)| (k.trim().to_string(), v.trim().to_string()))
        .filter(|(k, _)| !k.is_empty())
        .ok_or_else(|| format!("expected key=value, got '{}'", raw))
}

/// Dispatch to the expense or income service
struct Movements<'a> {
    app: &'a App,
    kind: MovementKind,
}

impl Movements<'_> {
    fn list(&self, params: Vec<(String, String)>) -> CoreResult<Vec<Movement>> {
        match self.kind {
            MovementKind::Expense => self.app.ctx.expense_service.list(params),
            MovementKind::Income => self.app.ctx.income_service.list(params),
        }
    }

    fn by_period(&self, period: Period) -> CoreResult<Vec<Movement>> {
        match self.kind {
            MovementKind::Expense => self.app.ctx.expense_service.by_period(period),
            MovementKind::Income => self.app.ctx.income_service.by_period(period),
        }
    }

    fn get(&self, id: i64) -> CoreResult<Movement> {
        match self.kind {
            MovementKind::Expense => self.app.ctx.expense_service.get(id),
            MovementKind::Income => self.app.ctx.income_service.get(id),
        }
    }

    fn create(&self, record: &Movement) -> CoreResult<Option<Movement>> {
        match self.kind {
            MovementKind::Expense => self.app.ctx.expense_service.create(record),
            MovementKind::Income => self.app.ctx.income_service.create(record),
        }
    }

    fn update(&self, id: i64, record: &Movement) -> CoreResult<Option<Movement>> {
        match self.kind {
            MovementKind::Expense => self.app.ctx.expense_service.update(id, record),
            MovementKind::Income => self.app.ctx.income_service.update(id, record),
        }
    }

    fn delete(&self, id: i64) -> CoreResult<()> {
        match self.kind {
            MovementKind::Expense => self.app.ctx.expense_service.delete(id),
            MovementKind::Income => self.app.ctx.income_service.delete(id),
        }
    }
}

pub fn run(kind: MovementKind, command: MovementCommands, json: bool) -> Result<()> {
    with_context(kind.command(), |app| {
        let records = Movements { app, kind };

        match command {
            MovementCommands::List { filters } => print_list(&records.list(filters)?, json),
            MovementCommands::Period { period } => {
                let period = period.unwrap_or_else(Period::current);
                print_list(&records.by_period(period)?, json)
            }
            MovementCommands::Get { id } => print_list(&[records.get(id)?], json),
            MovementCommands::Create {
                amount,
                category,
                date,
                description,
            } => {
                let date = date.unwrap_or_else(today);
                let mut record = Movement::new(amount, category, date);
                record.description = description;
                let created = records.create(&record)?.unwrap_or(record);
                if !json {
                    output::success(&format!("Created {}", kind.noun()));
                }
                print_list(&[created], json)
            }
            MovementCommands::Update {
                id,
                amount,
                category,
                date,
                description,
            } => {
                if amount.is_none() && category.is_none() && date.is_none() && description.is_none() {
                    return Err(anyhow!("Nothing to update"));
                }
                let mut record = records.get(id)?;
                if amount.is_some() {
                    record.amount = amount;
                }
                if category.is_some() {
                    record.category_id = category;
                }
                if date.is_some() {
                    record.date = date;
                }
                if description.is_some() {
                    record.description = description;
                }
                let updated = records.update(id, &record)?.unwrap_or(record);
                if !json {
                    output::success(&format!("Updated {} {}", kind.noun(), id));
                }
                print_list(&[updated], json)
            }
            MovementCommands::Delete { id } => {
                records.delete(id)?;
                if json {
                    output::print_json(&json!({ "deleted": id }))
                } else {
                    output::success(&format!("Deleted {} {}", kind.noun(), id));
                    Ok(())
                }
            }
        }
    })
}

fn today() -> String {
    chrono::Local::now().date_naive().format("%Y-%m-%d").to_string()
}

fn print_list(records: &[Movement], json: bool) -> Result<()> {
    if json {
        return output::print_json(records);
    }
    if records.is_empty() {
        output::info("No records found.");
        return Ok(());
    }

    let mut table = output::create_table();
    table.set_header(vec!["ID", "Date", "Amount", "Category", "Description"]);
    let mut total = Decimal::ZERO;
    for r in records {
        total += r.amount.unwrap_or_default();
        table.add_row(vec![
            output::cell(r.id),
            output::cell(r.day()),
            output::format_amount(r.amount),
            output::cell(r.category_id),
            output::cell(r.description.as_deref()),
        ]);
    }
    println!("{}", table);
    if records.len() > 1 {
        println!("Total: {}", output::format_amount(Some(total)));
    }
    Ok(())
}
