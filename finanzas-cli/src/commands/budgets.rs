//! Budgets command - manage monthly budgets

use anyhow::Result;
use clap::Subcommand;
use finanzas_core::{Budget, Period};
use rust_decimal::Decimal;
use serde_json::json;

use super::with_context;
use crate::output;

#[derive(Subcommand)]
pub enum BudgetCommands {
    /// List budgets
    List,
    /// Budgets of one month (YYYY-MM, defaults to the current month)
    Period { period: Option<Period> },
    /// Show one budget
    Get { id: i64 },
    /// Create a budget
    Create {
        #[arg(long)]
        name: String,
        #[arg(long)]
        amount: Decimal,
        #[arg(long)]
        category: Option<i64>,
        /// Month (YYYY-MM), defaults to the current month
        #[arg(long)]
        period: Option<Period>,
    },
    /// Update fields of a budget
    Update {
        id: i64,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        amount: Option<Decimal>,
    },
    /// Delete a budget
    Delete { id: i64 },
}

pub fn run(command: BudgetCommands, json: bool) -> Result<()> {
    with_context("budgets", |app| {
        let service = &app.ctx.budget_service;

        match command {
            BudgetCommands::List => print_list(&service.list(Vec::new())?, json),
            BudgetCommands::Period { period } => {
                let period = period.unwrap_or_else(Period::current);
                print_list(&service.by_period(period)?, json)
            }
            BudgetCommands::Get { id } => print_list(&[service.get(id)?], json),
            BudgetCommands::Create {
                name,
                amount,
                category,
                period,
            } => {
                let period = period.unwrap_or_else(Period::current);
                let budget = Budget {
                    name: Some(name),
                    amount: Some(amount),
                    category_id: category,
                    year: Some(period.year),
                    month: Some(period.month),
                    ..Default::default()
                };
                let created = service.create(&budget)?.unwrap_or(budget);
                if !json {
                    output::success("Budget created");
                }
                print_list(&[created], json)
            }
            BudgetCommands::Update { id, name, amount } => {
                let mut budget = service.get(id)?;
                if name.is_some() {
                    budget.name = name;
                }
                if amount.is_some() {
                    budget.amount = amount;
                }
                let updated = service.update(id, &budget)?.unwrap_or(budget);
                if !json {
                    output::success(&format!("Updated budget {}", id));
                }
                print_list(&[updated], json)
            }
            BudgetCommands::Delete { id } => {
                service.delete(id)?;
                if json {
                    output::print_json(&json!({ "deleted": id }))
                } else {
                    output::success(&format!("Deleted budget {}", id));
                    Ok(())
                }
            }
        }
    })
}

fn print_list(budgets: &[Budget], json: bool) -> Result<()> {
    if json {
        return output::print_json(budgets);
    }
    if budgets.is_empty() {
        output::info("No budgets found.");
        return Ok(());
    }

    let mut table = output::create_table();
    table.set_header(vec!["ID", "Period", "Name", "Amount", "Category"]);
    for b in budgets {
        table.add_row(vec![
            output::cell(b.id),
            output::cell(b.period()),
            output::cell(b.name.as_deref()),
            output::format_amount(b.amount),
            output::cell(b.category_id),
        ]);
    }
    println!("{}", table);
    Ok(())
}
