//! Output formatting for the CLI.

use crate::config::OutputFormat;
use crate::error::Result;
use colored::*;
use papyrus_domain::StoredPaper;
use papyrus_extractor::{ExtractorError, ImportOutcome};
use serde_json::json;
use tabled::{
    builder::Builder,
    settings::{object::Rows, Alignment, Modify, Style},
};

/// Longest title shown in list tables before it is cut.
const TITLE_WIDTH: usize = 60;

/// Output formatter.
pub struct Formatter {
    format: OutputFormat,
    color_enabled: bool,
}

impl Formatter {
    /// Create a new formatter.
    pub fn new(format: OutputFormat, color_enabled: bool) -> Self {
        Self { format, color_enabled }
    }

    /// The selected output format.
    pub fn format(&self) -> OutputFormat {
        self.format
    }

    /// Format a list of papers.
    pub fn format_papers(&self, papers: &[StoredPaper]) -> Result<String> {
        match self.format {
            OutputFormat::Json => Ok(serde_json::to_string_pretty(papers)?),
            OutputFormat::Table => Ok(self.format_papers_table(papers)),
        }
    }

    /// Format a single paper with every field.
    pub fn format_paper(&self, paper: &StoredPaper) -> Result<String> {
        if self.format == OutputFormat::Json {
            return Ok(serde_json::to_string_pretty(paper)?);
        }

        let meta = &paper.metadata;
        let year = meta.year.map(|y| y.to_string());
        let id = paper.id.to_string();

        let mut builder = Builder::default();
        builder.push_record(["ID", id.as_str()]);
        builder.push_record(["Title", or_dash(meta.title.as_deref())]);
        builder.push_record(["Authors", or_dash(meta.authors.as_deref())]);
        builder.push_record(["Publication", or_dash(meta.publication.as_deref())]);
        builder.push_record(["Year", or_dash(year.as_deref())]);
        builder.push_record(["Summary", or_dash(meta.summary.as_deref())]);
        builder.push_record(["File", paper.file_path.as_str()]);

        let mut table = builder.build();
        table.with(Style::rounded());
        Ok(table.to_string())
    }

    /// Format papers as a table.
    fn format_papers_table(&self, papers: &[StoredPaper]) -> String {
        if papers.is_empty() {
            return self.colorize("No papers found.", "yellow");
        }

        let mut builder = Builder::default();
        builder.push_record(["ID", "Title", "Authors", "Year", "Publication"]);

        for paper in papers {
            let meta = &paper.metadata;
            builder.push_record([
                paper.id.to_string(),
                truncate(or_dash(meta.title.as_deref()), TITLE_WIDTH),
                first_author(meta.authors.as_deref()),
                meta.year.map(|y| y.to_string()).unwrap_or_else(|| "-".to_string()),
                or_dash(meta.publication.as_deref()).to_string(),
            ]);
        }

        let mut table = builder.build();
        table
            .with(Style::rounded())
            .with(Modify::new(Rows::first()).with(Alignment::center()));

        table.to_string()
    }

    /// Format the results of an import run.
    pub fn format_import_results(&self, outcomes: &[ImportOutcome]) -> Result<String> {
        if self.format == OutputFormat::Json {
            let results: Vec<serde_json::Value> = outcomes
                .iter()
                .map(|(path, result)| match result {
                    Ok(paper) => json!({
                        "path": path,
                        "status": "imported",
                        "paper": paper,
                    }),
                    Err(e) => {
                        let status = match e {
                            ExtractorError::Duplicate(_) => "duplicate",
                            _ => "failed",
                        };
                        json!({
                            "path": path,
                            "status": status,
                            "error": e.user_message(),
                        })
                    }
                })
                .collect();
            return Ok(serde_json::to_string_pretty(&results)?);
        }

        let mut lines = Vec::with_capacity(outcomes.len() + 1);
        let mut imported = 0;
        for (path, result) in outcomes {
            match result {
                Ok(paper) => {
                    imported += 1;
                    lines.push(self.success(&format!(
                        "{} → #{} {}",
                        path.display(),
                        paper.id,
                        or_dash(paper.metadata.title.as_deref())
                    )));
                }
                Err(ExtractorError::Duplicate(reason)) => {
                    lines.push(self.warning(&format!("{}: skipped, {}", path.display(), reason)));
                }
                Err(e) => {
                    lines.push(self.error(&format!("{}: {}", path.display(), e.user_message())));
                }
            }
        }
        lines.push(self.info(&format!("Imported {} of {} file(s)", imported, outcomes.len())));
        Ok(lines.join("\n"))
    }

    /// Format a success message.
    pub fn success(&self, message: &str) -> String {
        self.colorize(&format!("✓ {}", message), "green")
    }

    /// Format an error message.
    pub fn error(&self, message: &str) -> String {
        self.colorize(&format!("✗ {}", message), "red")
    }

    /// Format an info message.
    pub fn info(&self, message: &str) -> String {
        self.colorize(&format!("ℹ {}", message), "blue")
    }

    /// Format a warning message.
    pub fn warning(&self, message: &str) -> String {
        self.colorize(&format!("⚠ {}", message), "yellow")
    }

    /// Colorize text if color is enabled.
    fn colorize(&self, text: &str, color: &str) -> String {
        if !self.color_enabled {
            return text.to_string();
        }

        match color {
            "red" => text.red().to_string(),
            "green" => text.green().to_string(),
            "blue" => text.blue().to_string(),
            "yellow" => text.yellow().to_string(),
            _ => text.to_string(),
        }
    }
}

fn or_dash(value: Option<&str>) -> &str {
    match value {
        Some(v) if !v.trim().is_empty() => v,
        _ => "-",
    }
}

/// First listed author, with "et al." when there are more.
fn first_author(authors: Option<&str>) -> String {
    let names: Vec<&str> = authors
        .unwrap_or("")
        .split(',')
        .map(str::trim)
        .filter(|n| !n.is_empty())
        .collect();

    match names.as_slice() {
        [] => "-".to_string(),
        [only] => only.to_string(),
        [first, ..] => format!("{} et al.", first),
    }
}

fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let cut: String = text.chars().take(max_chars.saturating_sub(1)).collect();
    format!("{}…", cut)
}
