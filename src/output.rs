//! Output formatting for CLI display.
//!
//! Records are rendered either as a table (one row per record, a fixed set
//! of columns) or as pretty-printed JSON when `--json` is given.

use serde::Serialize;
use tabled::settings::Style;
use tabled::{Table, Tabled};

use crate::error::Result;
use crate::{Artifact, Build};

/// A record that can be shown as one table row.
pub trait TableRow {
    /// The row type holding the displayed columns.
    type Row: Tabled;

    fn to_row(&self) -> Self::Row;
}

/// Table row for a build.
#[derive(Debug, Tabled)]
pub struct BuildRow {
    pub repository: String,
    pub branch: String,
    pub build_num: u64,
    pub status: String,
    pub job_name: String,
    pub workflow: String,
}

impl TableRow for Build {
    type Row = BuildRow;

    fn to_row(&self) -> BuildRow {
        BuildRow {
            repository: self.reponame.clone(),
            branch: self.branch.clone(),
            build_num: self.build_num,
            status: self.status.clone(),
            job_name: self.workflows.job_name.clone(),
            workflow: self.workflows.workflow_name.clone(),
        }
    }
}

/// Table row for an artifact.
#[derive(Debug, Tabled)]
pub struct ArtifactRow {
    pub path: String,
    pub node: String,
    pub url: String,
}

impl TableRow for Artifact {
    type Row = ArtifactRow;

    fn to_row(&self) -> ArtifactRow {
        ArtifactRow {
            path: self.path.clone(),
            node: self.node_index.map(|n| n.to_string()).unwrap_or_default(),
            url: self.url.clone(),
        }
    }
}

/// Render records as a table, in the order given.
pub fn render_table<T: TableRow>(items: &[T]) -> String {
    let rows: Vec<T::Row> = items.iter().map(TableRow::to_row).collect();
    let mut table = Table::new(rows);
    table.with(Style::psql());
    table.to_string()
}

/// Render records as a pretty-printed JSON array.
pub fn render_json<T: Serialize>(items: &[T]) -> Result<String> {
    Ok(serde_json::to_string_pretty(items)?)
}
