//! Open command - run a path through the route guard

use anyhow::Result;
use colored::Colorize;
use finanzas_core::router::{guard, GuardDecision};
use finanzas_core::services::LogEvent;
use finanzas_core::Route;
use serde_json::json;

use super::{log_event, with_context};
use crate::output;

pub fn run(path: &str, json: bool) -> Result<()> {
    with_context("open", |app| {
        let authenticated = app.ctx.session.is_authenticated();
        let requested = Route::resolve(path);
        let decision = guard(requested, authenticated);
        let destination = app.ctx.navigate(path);

        if let GuardDecision::Redirect(target) = decision {
            log_event(
                app.ctx.logger.as_deref(),
                LogEvent::new("route_redirected").with_route(target.name()),
            );
        }

        if json {
            return output::print_json(&json!({
                "path": path,
                "requested": requested,
                "destination": destination,
                "redirected": decision != GuardDecision::Allow,
                "authenticated": authenticated,
            }));
        }

        match decision {
            GuardDecision::Allow => {
                println!("{} {}", "→".green(), destination.path());
            }
            GuardDecision::Redirect(target) => {
                output::warning(&format!(
                    "{} requires {}; redirected to {}",
                    requested.path(),
                    if requested.meta().requires_auth { "login" } else { "a guest session" },
                    target.path()
                ));
            }
        }
        Ok(())
    })
}
