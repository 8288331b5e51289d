//! Event log migrations, embedded at build time
//!
//! Each entry is `(file name, sql)`. Entries are applied in listed order
//! and recorded in `sys_migrations`.

/// When adding a migration, create `NNN_description.sql` and append it here.
pub const LOG_MIGRATIONS: &[(&str, &str)] = &[
    ("000_migrations.sql", include_str!("000_migrations.sql")),
    (
        "001_initial_schema.sql",
        include_str!("001_initial_schema.sql"),
    ),
];
