//! Tabular files → description files.
//!
//! Rows are numbered across all inputs in the order given (sequential
//! file first, then random), and that running number is the ordinal the
//! normalizer turns into the synthesized date. A row that fails to
//! normalize still consumes its ordinal, so the dates of the other rows do
//! not depend on which rows were rejected.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::config::Config;
use crate::models::SuiteKind;
use crate::normalize::{parse_date, Normalizer};
use crate::record::{read_rows, Row};
use crate::store::write_document;

#[derive(Debug, Default)]
pub struct GenerateReport {
    pub written: Vec<PathBuf>,
    pub failed_rows: usize,
    /// Ordinal the next row would have received.
    pub next_order: u32,
}

/// Normalize every row of every input and write one file per description.
pub fn generate_documents(
    normalizer: &Normalizer,
    inputs: &[(SuiteKind, Vec<Row>)],
    out: &Path,
    start_order: u32,
) -> Result<GenerateReport> {
    let mut report = GenerateReport {
        next_order: start_order,
        ..GenerateReport::default()
    };

    for (suite, rows) in inputs {
        for (line, row) in rows.iter().enumerate() {
            let order = report.next_order;
            report.next_order = order
                .checked_add(1)
                .context("row ordinal overflow")?;

            match normalizer.normalize_row(row, order, *suite) {
                Ok(doc) => {
                    let path = write_document(out, &doc)?;
                    info!(path = %path.display(), order, "wrote description");
                    report.written.push(path);
                }
                Err(e) => {
                    warn!(suite = %suite, row = line + 1, order, "skipping row: {}", e);
                    report.failed_rows += 1;
                }
            }
        }
    }

    Ok(report)
}

#[derive(Debug, Clone)]
pub struct GenerateArgs {
    pub sequential: Option<PathBuf>,
    pub random: Option<PathBuf>,
    pub out: PathBuf,
    pub start_order: u32,
    pub cluster_uuid: Option<String>,
}

pub fn run_generate(config: &Config, args: GenerateArgs) -> Result<()> {
    let base_date = parse_date(&config.generate.base_date)
        .with_context(|| format!("Invalid base date '{}'", config.generate.base_date))?;
    let cluster_uuid = args
        .cluster_uuid
        .clone()
        .unwrap_or_else(|| config.generate.cluster_uuid.clone());
    let normalizer = Normalizer::new(cluster_uuid, base_date);

    println!("generate {}", args.out.display());

    let mut inputs = Vec::new();
    for (suite, path) in [
        (SuiteKind::Sequential, &args.sequential),
        (SuiteKind::Random, &args.random),
    ] {
        if let Some(path) = path {
            let rows = read_rows(path)?;
            println!("  {}: {} rows from {}", suite, rows.len(), path.display());
            inputs.push((suite, rows));
        }
    }

    let report = generate_documents(&normalizer, &inputs, &args.out, args.start_order)?;

    println!("  documents written: {}", report.written.len());
    println!("  rows skipped: {}", report.failed_rows);
    println!("  next order: {}", report.next_order);
    println!("ok");

    Ok(())
}
