//! SQL helper functions available to check bodies.
//!
//! Some catalog checks call helpers that the central database provides as
//! stored functions. They are registered here as DuckDB macros from an
//! explicit name → definition table.

use crate::error::{DbError, DbResult};
use duckdb::Connection;

/// A scalar macro installed on every connection.
pub struct SqlMacro {
    pub name: &'static str,
    pub params: &'static [&'static str],
    /// Macro body, referencing `params` by name
    pub body: &'static str,
}

/// All helper macros.
pub static SQL_MACROS: &[SqlMacro] = &[SqlMacro {
    // 'MM/DD/YYYY HH:mm' -> 'YYYY-MM-DD HH:mm'
    name: "get_sqlite_date_str",
    params: &["date_str"],
    body: "strftime(strptime(date_str, '%m/%d/%Y %H:%M'), '%Y-%m-%d %H:%M')",
}];

impl SqlMacro {
    pub fn create_statement(&self) -> String {
        format!(
            "CREATE OR REPLACE MACRO {}({}) AS {}",
            self.name,
            self.params.join(", "),
            self.body
        )
    }
}

/// Install every entry of [`SQL_MACROS`].
pub fn install_macros(conn: &Connection) -> DbResult<()> {
    for m in SQL_MACROS {
        conn.execute_batch(&m.create_statement())
            .map_err(|e| DbError::MigrationError(format!("macro {} failed: {e}", m.name)))?;
        log::debug!("Installed SQL macro {}", m.name);
    }
    Ok(())
}

#[cfg(test)]
#[path = "macros_test.rs"]
mod tests;
