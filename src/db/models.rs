use serde::Serialize;
use sqlx::FromRow;

/// One row of the `app_options` table.
///
/// `autoload` marks rows the host application loads unconditionally on every
/// request; the daily optimizer exists to keep that set small.
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize)]
pub struct OptionRow {
    pub name: String,
    pub value: String,
    pub autoload: bool,
}
