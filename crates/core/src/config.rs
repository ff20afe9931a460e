//! Sync configuration, loaded from an optional JSON file.
//!
//! Every section falls back to the stock template and schema when omitted.

use crate::batch::CellLayout;
use crate::colors::{BackgroundPolicy, StatusColorTable};
use crate::error::{Error, Result};
use crate::identity::TemplateNumbering;
use crate::record::{FieldNames, TableNames};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    pub cells: CellLayout,
    pub fields: FieldNames,
    pub tables: TableNames,
    pub background: BackgroundPolicy,
    pub template: TemplateNumbering,
    /// Replaces the built-in status table when present.
    pub status_colors: Option<HashMap<String, String>>,
}

impl SyncConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: SyncConfig = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject layouts that would write two fields into one cell.
    pub fn validate(&self) -> Result<()> {
        let cells = [
            ("title", self.cells.title),
            ("datetime", self.cells.datetime),
            ("channel", self.cells.channel),
            ("description", self.cells.description),
            ("moderators", self.cells.moderators),
            ("speakers", self.cells.speakers),
        ];
        for (i, (name, cell)) in cells.iter().enumerate() {
            if let Some((other, _)) = cells[i + 1..].iter().find(|(_, c)| c == cell) {
                return Err(Error::Config(format!(
                    "{} and {} share cell ({}, {})",
                    name, other, cell.row_index, cell.column_index
                )));
            }
        }
        if self.template.table_offset == self.template.notes_offset {
            return Err(Error::Config(
                "table_offset and notes_offset must differ".to_string(),
            ));
        }
        Ok(())
    }

    /// The status table in effect.
    pub fn status_table(&self) -> StatusColorTable {
        match &self.status_colors {
            Some(names) => StatusColorTable::from_names(names),
            None => StatusColorTable::builtin(),
        }
    }
}
