//! Categories command - manage spending and income categories

use anyhow::Result;
use clap::{Subcommand, ValueEnum};
use finanzas_core::{Category, CategoryKind};
use serde_json::json;

use super::with_context;
use crate::output;

#[derive(Clone, Copy, ValueEnum)]
pub enum KindArg {
    Expense,
    Income,
    Both,
}

impl From<KindArg> for CategoryKind {
    fn from(kind: KindArg) -> Self {
        match kind {
            KindArg::Expense => CategoryKind::Expense,
            KindArg::Income => CategoryKind::Income,
            KindArg::Both => CategoryKind::Both,
        }
    }
}

#[derive(Subcommand)]
pub enum CategoryCommands {
    /// List categories
    List {
        /// Only categories of this kind
        #[arg(long, value_enum)]
        kind: Option<KindArg>,
    },
    /// Show one category
    Get { id: i64 },
    /// Create a category
    Create {
        #[arg(long)]
        name: String,
        #[arg(long, value_enum)]
        kind: KindArg,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        color: Option<String>,
        #[arg(long)]
        icon: Option<String>,
    },
    /// Update fields of a category
    Update {
        id: i64,
        #[arg(long)]
        name: Option<String>,
        #[arg(long, value_enum)]
        kind: Option<KindArg>,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        color: Option<String>,
        #[arg(long)]
        icon: Option<String>,
    },
    /// Delete a category
    Delete { id: i64 },
}

pub fn run(command: CategoryCommands, json: bool) -> Result<()> {
    with_context("categories", |app| {
        let service = &app.ctx.category_service;

        match command {
            CategoryCommands::List { kind } => {
                let categories = service.list(kind.map(CategoryKind::from))?;
                print_list(&categories, json)
            }
            CategoryCommands::Get { id } => print_one(&service.get(id)?, json),
            CategoryCommands::Create {
                name,
                kind,
                description,
                color,
                icon,
            } => {
                let mut category = Category::new(name, kind.into());
                category.description = description;
                category.color = color;
                category.icon = icon;
                let created = service.create(&category)?.unwrap_or(category);
                if !json {
                    output::success("Category created");
                }
                print_one(&created, json)
            }
            CategoryCommands::Update {
                id,
                name,
                kind,
                description,
                color,
                icon,
            } => {
                // Start from the stored record so unknown fields survive
                let mut category = service.get(id)?;
                if name.is_some() {
                    category.name = name;
                }
                if let Some(kind) = kind {
                    category.kind = Some(kind.into());
                }
                if description.is_some() {
                    category.description = description;
                }
                if color.is_some() {
                    category.color = color;
                }
                if icon.is_some() {
                    category.icon = icon;
                }
                let updated = service.update(id, &category)?.unwrap_or(category);
                if !json {
                    output::success("Category updated");
                }
                print_one(&updated, json)
            }
            CategoryCommands::Delete { id } => {
                service.delete(id)?;
                if json {
                    output::print_json(&json!({ "deleted": id }))
                } else {
                    output::success(&format!("Deleted category {}", id));
                    Ok(())
                }
            }
        }
    })
}

fn print_list(categories: &[Category], json: bool) -> Result<()> {
    if json {
        return output::print_json(categories);
    }
    if categories.is_empty() {
        output::info("No categories found.");
        return Ok(());
    }

    let mut table = output::create_table();
    table.set_header(vec!["ID", "Name", "Kind", "Color", "Icon"]);
    for c in categories {
        table.add_row(vec![
            output::cell(c.id),
            output::cell(c.name.as_deref()),
            output::cell(c.kind),
            output::cell(c.color.as_deref()),
            output::cell(c.icon.as_deref()),
        ]);
    }
    println!("{}", table);
    Ok(())
}

fn print_one(category: &Category, json: bool) -> Result<()> {
    if json {
        return output::print_json(category);
    }
    print_list(std::slice::from_ref(category), false)
}
