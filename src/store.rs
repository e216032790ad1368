//! File-backed document store: one pretty-printed JSON file per description.
//!
//! Files are named `<document id>.json`. Directory scans are flat and only
//! pick up files with a `.json` extension (case-insensitive); everything
//! else is ignored.

use anyhow::{bail, Context, Result};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use walkdir::WalkDir;

use crate::identity::document_id;
use crate::models::Description;

pub const DOCUMENT_EXTENSION: &str = "json";

/// A description read back from disk together with its identity.
#[derive(Debug, Clone)]
pub struct LoadedDocument {
    pub path: PathBuf,
    pub id: String,
    pub description: Description,
}

/// Result of loading a batch of files.
#[derive(Debug, Default)]
pub struct LoadedSet {
    pub documents: Vec<LoadedDocument>,
    /// Files that could not be read or parsed; already logged.
    pub unreadable: Vec<PathBuf>,
}

/// Serialize `doc` into `dir`, returning the written path.
///
/// Writing the same description twice replaces the file in place.
pub fn write_document(dir: &Path, doc: &Description) -> Result<PathBuf> {
    fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create output directory: {}", dir.display()))?;

    let path = dir.join(format!("{}.{}", document_id(doc), DOCUMENT_EXTENSION));
    let mut json = serde_json::to_string_pretty(doc)?;
    json.push('\n');
    fs::write(&path, json).with_context(|| format!("Failed to write {}", path.display()))?;

    Ok(path)
}

pub fn read_document(path: &Path) -> Result<Description> {
    let content =
        fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))?;
    let doc = serde_json::from_str(&content)
        .with_context(|| format!("Not a valid test description: {}", path.display()))?;
    Ok(doc)
}

/// List document files directly inside `dir`, sorted by file name.
pub fn scan_dir(dir: &Path) -> Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        bail!("Document directory does not exist: {}", dir.display());
    }

    let mut files = Vec::new();
    let walker = WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .follow_links(true)
        .sort_by_file_name();
    for entry in walker {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }
        let path = entry.path();
        if has_document_extension(path) {
            files.push(path.to_path_buf());
        } else {
            debug!(path = %path.display(), "ignoring non-document file");
        }
    }

    Ok(files)
}

fn has_document_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case(DOCUMENT_EXTENSION))
}

/// Read every path in order. Unreadable files are logged and collected
/// rather than failing the batch. When two files share an identifier the
/// later one replaces the earlier at the earlier one's position.
pub fn load_documents(paths: &[PathBuf]) -> LoadedSet {
    let mut set = LoadedSet::default();
    let mut positions: HashMap<String, usize> = HashMap::new();

    for path in paths {
        let description = match read_document(path) {
            Ok(doc) => doc,
            Err(e) => {
                warn!(path = %path.display(), "skipping unreadable document: {:#}", e);
                set.unreadable.push(path.clone());
                continue;
            }
        };

        let loaded = LoadedDocument {
            path: path.clone(),
            id: document_id(&description),
            description,
        };

        match positions.get(&loaded.id) {
            Some(&pos) => {
                warn!(
                    id = %loaded.id,
                    replaced = %set.documents[pos].path.display(),
                    by = %path.display(),
                    "duplicate document id"
                );
                set.documents[pos] = loaded;
            }
            None => {
                positions.insert(loaded.id.clone(), set.documents.len());
                set.documents.push(loaded);
            }
        }
    }

    set
}
