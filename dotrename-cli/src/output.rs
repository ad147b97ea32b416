use comfy_table::{presets, CellAlignment, ContentArrangement, Table};
use dotrename::prelude::RewriteReport;
use serde::Serialize;

use crate::app::GlobalOptions;

/// Print `data` as JSON (if `--json`) or call `display_fn` for human-readable output.
pub fn print_output<T: Serialize>(
    data: &T,
    opts: &GlobalOptions,
    display_fn: impl FnOnce(&T),
) -> anyhow::Result<()> {
    if opts.json {
        let json = serde_json::to_string_pretty(data)?;
        println!("{json}");
    } else {
        display_fn(data);
    }
    Ok(())
}

#[derive(Debug, Serialize)]
pub struct ReportSummary {
    pub modules: Vec<ModuleSummary>,
    pub completion_order: Vec<String>,
    pub total_names: usize,
    pub signed: bool,
}

#[derive(Debug, Serialize)]
pub struct ModuleSummary {
    pub original: String,
    pub renamed: String,
    pub output: String,
    pub names: usize,
    pub references: usize,
    pub kinds: Vec<(String, usize)>,
}

impl From<&RewriteReport> for ReportSummary {
    fn from(report: &RewriteReport) -> Self {
        let modules = report
            .modules
            .iter()
            .map(|module| ModuleSummary {
                original: module.original.clone(),
                renamed: module.renamed.clone(),
                output: module.output.display().to_string(),
                names: module.rewritten,
                references: module.dependencies_updated,
                kinds: module
                    .stats
                    .iter()
                    .map(|(kind, count)| (kind.to_string(), count))
                    .collect(),
            })
            .collect();

        ReportSummary {
            modules,
            completion_order: report.completion_order.clone(),
            total_names: report.total_rewritten(),
            signed: report.signed,
        }
    }
}

/// Column alignment for tabular output.
#[derive(Clone, Copy)]
pub enum Align {
    Left,
    Right,
}

/// Whitespace-aligned table printed to stdout.
pub struct TabWriter {
    table: Table,
}

impl TabWriter {
    /// Create a new `TabWriter` with `(header, alignment)` columns.
    pub fn new(columns: Vec<(&str, Align)>) -> Self {
        let mut table = Table::new();
        table
            .load_preset(presets::NOTHING)
            .set_content_arrangement(ContentArrangement::Dynamic);

        let headers: Vec<&str> = columns.iter().map(|(name, _)| *name).collect();
        table.set_header(headers);

        // First column: no left padding. Last column: no right padding.
        let last = columns.len().saturating_sub(1);
        for (i, (_, align)) in columns.iter().enumerate() {
            if let Some(col) = table.column_mut(i) {
                col.set_cell_alignment(match align {
                    Align::Left => CellAlignment::Left,
                    Align::Right => CellAlignment::Right,
                });
                col.set_padding((u16::from(i != 0), u16::from(i != last)));
            }
        }

        Self { table }
    }

    /// Add a row. Values are given in column order.
    pub fn row(&mut self, values: Vec<String>) {
        self.table.add_row(values);
    }

    /// Print the table to stdout.
    pub fn print(&self) {
        for line in self.table.to_string().lines() {
            println!("{}", line.trim_end());
        }
    }
}
