//! Rendering of command results.
//!
//! Commands build `Tabled + Serialize` row structs and hand them to
//! [`OutputFormat::render`]. Status lines go to stdout only in table mode
//! so `--format json` output stays machine-readable.

use serde::Serialize;
use tabled::settings::Style;
use tabled::{Table, Tabled};

use plugboard_core::PluginResult;

/// Output format selection
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable table
    #[default]
    Table,
    /// Pretty-printed JSON array
    Json,
}

impl OutputFormat {
    /// Renders rows in this format.
    pub fn render<T: Serialize + Tabled>(self, rows: &[T]) -> PluginResult<String> {
        match self {
            Self::Table if rows.is_empty() => Ok("Nothing to show.".to_string()),
            Self::Table => {
                let mut table = Table::new(rows);
                table.with(Style::rounded());
                Ok(table.to_string())
            }
            Self::Json => Ok(serde_json::to_string_pretty(rows)?),
        }
    }

    /// Renders rows to stdout.
    pub fn emit<T: Serialize + Tabled>(self, rows: &[T]) -> PluginResult<()> {
        println!("{}", self.render(rows)?);
        Ok(())
    }

    /// Prints a status line after the rows, table mode only.
    pub fn status(self, msg: &str) {
        if self == Self::Table {
            println!("✓ {msg}");
        }
    }
}

/// Reports a failed command on stderr.
pub fn failure(msg: &str) {
    eprintln!("✗ {msg}");
}
