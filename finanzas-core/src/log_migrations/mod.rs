//! Event log schema, embedded at compile time and applied in order

/// Creates the `sys_migrations` bookkeeping table
pub const BOOTSTRAP_MIGRATION: (&str, &str) =
    ("000_migrations.sql", include_str!("000_migrations.sql"));

pub const LOG_MIGRATIONS: &[(&str, &str)] = &[
    BOOTSTRAP_MIGRATION,
    ("001_initial_schema.sql", include_str!("001_initial_schema.sql")),
];
