//! Session commands - login, register, logout, whoami, password, status

use std::env;
use std::time::Duration;

use anyhow::{bail, Result};
use colored::Colorize;
use dialoguer::{Input, Password};
use finanzas_core::domain::ChangePasswordRequest;
use finanzas_core::services::SessionStore;
use finanzas_core::{AuthResponse, LoginRequest, RegisterRequest, Route};
use indicatif::{ProgressBar, ProgressStyle};
use serde_json::json;

use super::with_context;
use crate::output;

/// Get password from the flag, FINANZAS_PASSWORD, or an interactive prompt
fn get_password_or_prompt(password_flag: Option<String>, prompt: &str) -> Result<String> {
    if let Some(p) = password_flag {
        return Ok(p);
    }

    if let Ok(p) = env::var("FINANZAS_PASSWORD") {
        return Ok(p);
    }

    // Piped input: take the first line of stdin
    if atty::isnt(atty::Stream::Stdin) {
        let mut line = String::new();
        std::io::stdin().read_line(&mut line)?;
        let p = line.trim_end_matches(['\r', '\n']).to_string();
        if p.is_empty() {
            bail!("No password provided on stdin");
        }
        return Ok(p);
    }

    let p = Password::new().with_prompt(prompt).interact()?;
    Ok(p)
}

fn get_or_prompt(value: Option<String>, prompt: &str) -> Result<String> {
    match value {
        Some(v) => Ok(v),
        None => Ok(Input::<String>::new().with_prompt(prompt).interact_text()?),
    }
}

/// Run a login/register exchange behind a spinner
fn with_spinner<F>(message: &str, session: &SessionStore, call: F) -> Result<AuthResponse>
where
    F: FnOnce(&SessionStore) -> finanzas_core::domain::result::Result<AuthResponse>,
{
    let spinner = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.cyan} {msg}") {
        spinner.set_style(style);
    }
    spinner.set_message(message.to_string());
    spinner.enable_steady_tick(Duration::from_millis(80));

    let result = call(session);
    spinner.finish_and_clear();

    result.map_err(|e| match session.error() {
        Some(message) => anyhow::anyhow!(message),
        None => e.into(),
    })
}

fn print_welcome(response: &AuthResponse, json: bool) -> Result<()> {
    if json {
        return output::print_json(&json!({
            "authenticated": true,
            "user": response.user(),
            "route": Route::Dashboard,
        }));
    }
    output::success(&format!("Welcome, {}!", response.user().display_name()));
    Ok(())
}

pub fn login(email: Option<String>, password: Option<String>, json: bool) -> Result<()> {
    let email = get_or_prompt(email, "Email")?;
    let password = get_password_or_prompt(password, "Password")?;

    with_context("login", |app| {
        let request = LoginRequest::new(email, password);
        let response = with_spinner("Signing in...", &app.ctx.session, |s| s.login(&request))?;
        print_welcome(&response, json)
    })
}

pub fn register(
    name: Option<String>,
    email: Option<String>,
    password: Option<String>,
    json: bool,
) -> Result<()> {
    let nombre = get_or_prompt(name, "Name")?;
    let email = get_or_prompt(email, "Email")?;
    let password = match password {
        Some(p) => p,
        None => {
            let p1 = get_password_or_prompt(None, "Password")?;
            if env::var("FINANZAS_PASSWORD").is_err() {
                let p2 = Password::new().with_prompt("Confirm password").interact()?;
                if p1 != p2 {
                    bail!("Passwords do not match");
                }
            }
            p1
        }
    };

    with_context("register", |app| {
        let request = RegisterRequest {
            nombre,
            email,
            password,
        };
        let response =
            with_spinner("Creating account...", &app.ctx.session, |s| s.register(&request))?;
        print_welcome(&response, json)
    })
}

pub fn logout(json: bool) -> Result<()> {
    with_context("logout", |app| {
        app.ctx.session.logout();
        if json {
            output::print_json(&json!({ "authenticated": false }))
        } else {
            output::success("Logged out");
            Ok(())
        }
    })
}

pub fn whoami(json: bool) -> Result<()> {
    with_context("whoami", |app| {
        if !app.ctx.session.is_authenticated() {
            bail!("Not logged in. Run `fz login` first.");
        }
        let profile = app.ctx.session.fetch_profile()?;

        if json {
            return output::print_json(&profile);
        }
        println!("{}", profile.display_name().bold());
        println!("  Email: {}", profile.email);
        println!("  ID:    {}", profile.id);
        Ok(())
    })
}

pub fn change_password(json: bool) -> Result<()> {
    let current_password = get_password_or_prompt(None, "Current password")?;
    let new_password = Password::new()
        .with_prompt("New password")
        .with_confirmation("Confirm new password", "Passwords do not match")
        .interact()?;

    with_context("password", |app| {
        let request = ChangePasswordRequest {
            current_password,
            new_password,
        };
        let result = app.ctx.session.change_password(&request)?;

        if json {
            return output::print_json(&json!({ "changed": true, "response": result }));
        }
        output::success("Password changed");
        Ok(())
    })
}

/// Show the local session state without calling the backend
pub fn status(json: bool) -> Result<()> {
    with_context("status", |app| {
        let session = &app.ctx.session;
        let base_url = app.ctx.client.base_url().to_string();

        if json {
            return output::print_json(&json!({
                "state": session.state(),
                "authenticated": session.is_authenticated(),
                "user": session.user(),
                "api_url": base_url,
            }));
        }

        println!("{}", "Session Status".bold());
        println!();

        let mut table = output::create_table();
        let state = if session.is_authenticated() {
            "authenticated".green().to_string()
        } else {
            "anonymous".yellow().to_string()
        };
        table.add_row(vec!["State".to_string(), state]);
        table.add_row(vec![
            "User".to_string(),
            session
                .user()
                .map(|u| format!("{} <{}>", u.display_name(), u.email))
                .unwrap_or_else(|| "-".to_string()),
        ]);
        table.add_row(vec!["API".to_string(), base_url]);
        println!("{}", table);
        Ok(())
    })
}
