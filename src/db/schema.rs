//! SQL DDL for initializing the database schema.
//! SQLite-first design; can be adapted for other RDBMS.

/// SQLite schema includes:
/// - `app_options` table (one configuration row per name)
///
/// Transient data/marker pairs, maintenance bookkeeping rows, and ordinary
/// application options all live in this one table, distinguished by name
/// prefix.
pub const SQLITE_INIT: &str = r"
-- ---------------------------------------------------------------------------
-- Application options (configuration key-value table)
-- ---------------------------------------------------------------------------
CREATE TABLE IF NOT EXISTS app_options (
    name TEXT PRIMARY KEY NOT NULL,
    value TEXT NOT NULL,
    autoload INTEGER NOT NULL DEFAULT 1
);

CREATE INDEX IF NOT EXISTS idx_app_options_autoload ON app_options(autoload);
";
