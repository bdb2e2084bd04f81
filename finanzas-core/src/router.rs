//! Navigation routes and the authentication guard
//!
//! The route table mirrors the web client:
//!
//! | path                  | route            | access   |
//! |-----------------------|------------------|----------|
//! | `/auth/login`         | login            | guest    |
//! | `/auth/register`      | register         | guest    |
//! | `/`                   | dashboard        | auth     |
//! | `/gastos`             | expenses         | auth     |
//! | `/ingresos`           | incomes          | auth     |
//! | `/categorias`         | categories       | auth     |
//! | `/presupuestos`       | budgets          | auth     |
//! | `/limites-categorias` | category limits  | auth     |
//! | `/reportes`           | reports          | auth     |
//!
//! Any other path resolves to the dashboard.

use std::fmt;

use serde::Serialize;

/// A named navigation target
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Route {
    Login,
    Register,
    Dashboard,
    Expenses,
    Incomes,
    Categories,
    Budgets,
    CategoryLimits,
    Reports,
}

/// Access rules attached to a route
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RouteMeta {
    pub requires_auth: bool,
    pub requires_guest: bool,
}

impl Route {
    pub const ALL: [Route; 9] = [
        Route::Login,
        Route::Register,
        Route::Dashboard,
        Route::Expenses,
        Route::Incomes,
        Route::Categories,
        Route::Budgets,
        Route::CategoryLimits,
        Route::Reports,
    ];

    /// Route name as used by the web client
    pub fn name(&self) -> &'static str {
        match self {
            Route::Login => "login",
            Route::Register => "register",
            Route::Dashboard => "dashboard",
            Route::Expenses => "gastos",
            Route::Incomes => "ingresos",
            Route::Categories => "categorias",
            Route::Budgets => "presupuestos",
            Route::CategoryLimits => "limites-categorias",
            Route::Reports => "reportes",
        }
    }

    pub fn path(&self) -> &'static str {
        match self {
            Route::Login => "/auth/login",
            Route::Register => "/auth/register",
            Route::Dashboard => "/",
            Route::Expenses => "/gastos",
            Route::Incomes => "/ingresos",
            Route::Categories => "/categorias",
            Route::Budgets => "/presupuestos",
            Route::CategoryLimits => "/limites-categorias",
            Route::Reports => "/reportes",
        }
    }

    pub fn meta(&self) -> RouteMeta {
        match self {
            Route::Login | Route::Register => RouteMeta {
                requires_auth: false,
                requires_guest: true,
            },
            // Dashboard and its children inherit the layout's requiresAuth
            _ => RouteMeta {
                requires_auth: true,
                requires_guest: false,
            },
        }
    }

    /// Resolve a path to a route; unmatched paths land on the dashboard
    pub fn resolve(path: &str) -> Route {
        let path = path.split(['?', '#']).next().unwrap_or("");
        let trimmed = path.trim_end_matches('/');
        let normalized = if trimmed.is_empty() { "/" } else { trimmed };

        Route::ALL
            .iter()
            .copied()
            .find(|route| route.path() == normalized)
            .unwrap_or(Route::Dashboard)
    }

    /// Look up a route by its name
    pub fn from_name(name: &str) -> Option<Route> {
        Route::ALL.iter().copied().find(|route| route.name() == name)
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Outcome of the navigation guard
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardDecision {
    Allow,
    Redirect(Route),
}

/// Decide whether navigation to `route` may proceed
pub fn guard(route: Route, is_authenticated: bool) -> GuardDecision {
    let meta = route.meta();
    if meta.requires_auth && !is_authenticated {
        GuardDecision::Redirect(Route::Login)
    } else if meta.requires_guest && is_authenticated {
        GuardDecision::Redirect(Route::Dashboard)
    } else {
        GuardDecision::Allow
    }
}

/// Resolve `path` and apply the guard, returning where navigation ends up
pub fn navigate(path: &str, is_authenticated: bool) -> Route {
    let route = Route::resolve(path);
    match guard(route, is_authenticated) {
        GuardDecision::Allow => route,
        GuardDecision::Redirect(target) => target,
    }
}

/// A navigation request emitted by the core
///
/// `full_reload` marks a hard redirect: the embedder must rebuild its
/// in-memory session from durable storage, as a browser would after
/// assigning `window.location`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Navigation {
    pub route: Route,
    pub full_reload: bool,
}

impl Navigation {
    pub fn to(route: Route) -> Self {
        Self {
            route,
            full_reload: false,
        }
    }

    pub fn reload(route: Route) -> Self {
        Self {
            route,
            full_reload: true,
        }
    }
}
