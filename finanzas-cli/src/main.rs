//! Finanzas CLI - personal finance backend client

use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand};

mod commands;
mod output;

use commands::budgets::BudgetCommands;
use commands::categories::CategoryCommands;
use commands::limits::LimitCommands;
use commands::movements::{MovementCommands, MovementKind};
use commands::reports::ReportCommands;
use commands::{auth, budgets, categories, limits, logs, movements, open, reports};

/// Finanzas - your personal finance backend from the terminal
#[derive(Parser)]
#[command(name = "fz", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Sign in and store the session
    Login {
        /// Account email (prompted if omitted)
        email: Option<String>,
        /// Password (or FINANZAS_PASSWORD, piped stdin, prompt)
        #[arg(short, long)]
        password: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Create an account and sign in
    Register {
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        email: Option<String>,
        #[arg(short, long)]
        password: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Forget the stored session
    Logout {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Fetch the signed-in user's profile
    Whoami {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Change the account password
    Password {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show the local session state
    Status {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show where navigating to a path ends up
    Open {
        /// Path such as /gastos or /auth/login
        path: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Manage categories
    Categories {
        /// Output as JSON
        #[arg(long, global = true)]
        json: bool,
        #[command(subcommand)]
        command: CategoryCommands,
    },

    /// Manage expenses
    Expenses {
        /// Output as JSON
        #[arg(long, global = true)]
        json: bool,
        #[command(subcommand)]
        command: MovementCommands,
    },

    /// Manage incomes
    Incomes {
        /// Output as JSON
        #[arg(long, global = true)]
        json: bool,
        #[command(subcommand)]
        command: MovementCommands,
    },

    /// Manage monthly budgets
    Budgets {
        /// Output as JSON
        #[arg(long, global = true)]
        json: bool,
        #[command(subcommand)]
        command: BudgetCommands,
    },

    /// Manage per-category spending limits
    Limits {
        /// Output as JSON
        #[arg(long, global = true)]
        json: bool,
        #[command(subcommand)]
        command: LimitCommands,
    },

    /// Show reports
    Reports {
        /// Output as JSON
        #[arg(long, global = true)]
        json: bool,
        #[command(subcommand)]
        command: ReportCommands,
    },

    /// View and manage the local event log
    Logs {
        #[command(subcommand)]
        command: logs::LogsCommands,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let result = run(cli);

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            output::error(&e.to_string());
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Login { email, password, json } => auth::login(email, password, json),
        Commands::Register {
            name,
            email,
            password,
            json,
        } => auth::register(name, email, password, json),
        Commands::Logout { json } => auth::logout(json),
        Commands::Whoami { json } => auth::whoami(json),
        Commands::Password { json } => auth::change_password(json),
        Commands::Status { json } => auth::status(json),
        Commands::Open { path, json } => open::run(&path, json),
        Commands::Categories { json, command } => categories::run(command, json),
        Commands::Expenses { json, command } => {
            movements::run(MovementKind::Expense, command, json)
        }
        Commands::Incomes { json, command } => movements::run(MovementKind::Income, command, json),
        Commands::Budgets { json, command } => budgets::run(command, json),
        Commands::Limits { json, command } => limits::run(command, json),
        Commands::Reports { json, command } => reports::run(command, json),
        Commands::Logs { command } => logs::run(command),
    }
}
