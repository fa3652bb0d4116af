//! Rendering of search results for the terminal

use anyhow::{Context, Result};
use clap::ValueEnum;
use mavensearch_core::{snippet, Artifact, BuildTool};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt::Write;

/// How results are printed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
}

const HEADERS: [&str; 8] = [
    "#",
    "Group",
    "Artifact",
    "Version",
    "Date",
    "Classifier",
    "Extension",
    "Repository",
];

fn row(index: usize, artifact: &Artifact) -> [String; 8] {
    let opt = |value: &Option<String>| value.clone().unwrap_or_default();
    [
        (index + 1).to_string(),
        artifact.group_id.clone(),
        artifact.artifact_id.clone(),
        artifact.version.clone(),
        artifact
            .version_date
            .map(|d| d.to_string())
            .unwrap_or_default(),
        opt(&artifact.classifier),
        opt(&artifact.extension),
        opt(&artifact.repository),
    ]
}

/// Results as an aligned text table, one artifact per row
pub fn render_table(artifacts: &[Artifact]) -> String {
    if artifacts.is_empty() {
        return "No artifacts found.\n".to_string();
    }

    let rows: Vec<[String; 8]> = artifacts
        .iter()
        .enumerate()
        .map(|(i, a)| row(i, a))
        .collect();
    let mut widths = HEADERS.map(|h| h.chars().count());
    for row in &rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let mut out = String::new();
    let mut push_line = |cells: &[&str]| {
        let line = cells
            .iter()
            .zip(widths)
            .map(|(cell, width)| format!("{cell:<width$}"))
            .collect::<Vec<_>>()
            .join("  ");
        out.push_str(line.trim_end());
        out.push('\n');
    };

    push_line(&HEADERS);
    for row in &rows {
        let cells: Vec<&str> = row.iter().map(String::as_str).collect();
        push_line(&cells);
    }
    out
}

/// Dependency snippets of `artifact` for each tool, separated by headings
pub fn render_snippets(artifact: &Artifact, tools: &[BuildTool]) -> String {
    let mut out = String::new();
    for tool in tools {
        let _ = writeln!(out, "--- {tool} ({}) ---", artifact.coordinates());
        let _ = writeln!(out, "{}", snippet(*tool, artifact));
    }
    out
}

#[derive(Serialize)]
struct JsonReport<'a> {
    artifacts: &'a [Artifact],
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    snippets: BTreeMap<String, String>,
}

/// Results as pretty JSON, with snippets of `selected` when tools are given
pub fn render_json(
    artifacts: &[Artifact],
    selected: Option<&Artifact>,
    tools: &[BuildTool],
) -> Result<String> {
    let snippets = match selected {
        Some(artifact) => tools
            .iter()
            .map(|tool| (tool.to_string(), snippet(*tool, artifact)))
            .collect(),
        None => BTreeMap::new(),
    };
    serde_json::to_string_pretty(&JsonReport {
        artifacts,
        snippets,
    })
    .context("Failed to serialize results")
}
