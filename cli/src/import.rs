// Lead list import files
//
// An import file is the rectangular table a spreadsheet export step
// produces: the column headers, string-valued rows, and optionally the
// platform-to-column mappings.

use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

use leadflow_core::{LeadRow, Platform, PlatformMapping};

#[derive(Debug, Deserialize)]
pub struct ImportFile {
    pub columns: Vec<String>,
    pub rows: Vec<LeadRow>,
    #[serde(default)]
    pub mappings: BTreeMap<Platform, PlatformMapping>,
}

pub fn parse(raw: &str) -> Result<ImportFile> {
    serde_json::from_str(raw).context("Failed to parse import file")
}

pub fn load(path: &Path) -> Result<ImportFile> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    parse(&raw)
}
