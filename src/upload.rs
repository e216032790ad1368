//! Upload orchestration.
//!
//! Coordinates the indexing flow: document files → classification →
//! index document → backend write. Documents are processed strictly in
//! input order, one backend call at a time. Per-document problems are
//! logged and skipped; any backend error aborts the rest of the batch.
//!
//! Re-running an upload is safe: every test is written under its stable
//! document id, so the backend replaces rather than duplicates it.

use anyhow::{bail, Context, Result};
use serde_json::Value;
use std::path::PathBuf;
use tracing::{debug, info, warn};

use crate::backend::{Credentials, ElasticsearchBackend, MemoryBackend, SearchBackend};
use crate::classify::{classify, Classification};
use crate::config::Config;
use crate::models::SuiteKind;
use crate::schema::{index_mapping, IndexedTest, SuiteResults};
use crate::store::{self, LoadedDocument};

/// Index used when neither the command line nor the config names one.
pub const DEFAULT_INDEX: &str = "ceph-tests";

#[derive(Debug, Clone)]
pub struct UploadOptions {
    pub index: String,
    /// Delete and recreate the index before writing.
    pub recreate_index: bool,
    /// Classify and build every write, but make no backend calls.
    pub dry_run: bool,
}

/// A write the upload performed, or would perform in a dry run.
#[derive(Debug, Clone, PartialEq)]
pub struct PlannedWrite {
    pub id: String,
    pub suite: SuiteKind,
    pub test_no: u32,
    pub document: Value,
}

#[derive(Debug, Default)]
pub struct UploadReport {
    pub planned: Vec<PlannedWrite>,
    /// Backend writes actually made (always 0 in dry runs).
    pub written: usize,
    pub skipped_unclassifiable: usize,
    /// Documents whose benchmark values failed numeric coercion.
    pub skipped_invalid: usize,
    pub index_recreated: bool,
}

/// Classify and write `docs` in order.
///
/// Test numbers start at 1 and count classified documents only, so skipped
/// documents leave no gaps.
pub fn upload_documents(
    docs: &[LoadedDocument],
    backend: &mut dyn SearchBackend,
    opts: &UploadOptions,
) -> Result<UploadReport> {
    let mut report = UploadReport::default();

    if opts.recreate_index {
        if opts.dry_run {
            info!(index = %opts.index, "dry run: would recreate index");
        } else {
            let existed = backend
                .delete_index(&opts.index)
                .with_context(|| format!("Failed to delete index '{}'", opts.index))?;
            backend
                .create_index(&opts.index, &index_mapping())
                .with_context(|| format!("Failed to create index '{}'", opts.index))?;
            info!(index = %opts.index, existed, "index recreated");
            report.index_recreated = true;
        }
    }

    let mut test_no = 0u32;
    for doc in docs {
        let outcome = match classify(&doc.id, &doc.description.benchmarks) {
            Ok(outcome) => outcome,
            Err(e) => {
                warn!(id = %doc.id, path = %doc.path.display(), "skipping document: {}", e);
                report.skipped_invalid += 1;
                continue;
            }
        };

        for warning in &outcome.warnings {
            warn!(id = %doc.id, "{}", warning);
        }

        let (suite, results) = match outcome.classification {
            Classification::Classified { suite, results } => (suite, results),
            Classification::Unclassifiable => {
                warn!(id = %doc.id, path = %doc.path.display(), "unclassifiable document, not indexed");
                report.skipped_unclassifiable += 1;
                continue;
            }
        };

        test_no += 1;
        let test = IndexedTest::new(
            &doc.id,
            test_no,
            &doc.description,
            SuiteResults::new(suite, results),
        );
        let document = serde_json::to_value(&test)?;
        debug!(id = %doc.id, %document, "index document");

        if !opts.dry_run {
            backend
                .put_document(&opts.index, &doc.id, &document)
                .with_context(|| format!("Failed to write document {}", doc.id))?;
            report.written += 1;
        }

        report.planned.push(PlannedWrite {
            id: doc.id.clone(),
            suite,
            test_no,
            document,
        });
    }

    Ok(report)
}

/// Where the documents to upload come from.
#[derive(Debug, Clone)]
pub enum DocumentSource {
    /// Every `.json` file directly inside the directory.
    Dir(PathBuf),
    /// Exactly these files, in this order.
    Files(Vec<PathBuf>),
}

/// Command-line view of an upload.
#[derive(Debug, Clone)]
pub struct UploadArgs {
    pub source: DocumentSource,
    /// `(host:port, index)`.
    pub elasticsearch: Option<(String, String)>,
    pub auth: Option<Credentials>,
    pub recreate_index: bool,
    pub dry_run: bool,
}

pub fn run_upload(config: &Config, args: UploadArgs) -> Result<()> {
    let es = &config.elasticsearch;
    let (host, index) = match args.elasticsearch {
        Some((host, index)) => (Some(host), index),
        None => (
            es.url.clone(),
            es.index.clone().unwrap_or_else(|| DEFAULT_INDEX.to_string()),
        ),
    };
    let auth = args.auth.or_else(|| match (&es.user, &es.password) {
        (Some(user), Some(password)) => Some(Credentials {
            user: user.clone(),
            password: password.clone(),
        }),
        _ => None,
    });

    let paths = match &args.source {
        DocumentSource::Dir(dir) => store::scan_dir(dir)?,
        DocumentSource::Files(files) => files.clone(),
    };
    let loaded = store::load_documents(&paths);

    let mut backend: Box<dyn SearchBackend> = if args.dry_run {
        // Never called in dry runs.
        Box::new(MemoryBackend::new())
    } else {
        let Some(host) = host else {
            bail!(
                "No Elasticsearch target: pass --elasticsearch <host:port> <index> \
                 or set elasticsearch.url in the config"
            );
        };
        let backend = ElasticsearchBackend::new(&host, auth, es)?;
        info!(url = %backend.base(), %index, "uploading");
        Box::new(backend)
    };

    let opts = UploadOptions {
        index,
        recreate_index: args.recreate_index,
        dry_run: args.dry_run,
    };
    let report = upload_documents(&loaded.documents, backend.as_mut(), &opts)?;

    if opts.dry_run {
        println!("upload {} (dry-run)", opts.index);
    } else {
        println!("upload {}", opts.index);
    }
    println!("  files: {}", paths.len());
    for write in &report.planned {
        println!("  [{}] {} ({})", write.test_no, write.id, write.suite);
    }
    if opts.dry_run {
        println!("  would write: {}", report.planned.len());
    } else {
        println!("  written: {}", report.written);
    }
    println!("  skipped unreadable: {}", loaded.unreadable.len());
    println!("  skipped unclassifiable: {}", report.skipped_unclassifiable);
    println!("  skipped invalid: {}", report.skipped_invalid);
    if opts.recreate_index {
        println!("  index recreated: {}", !opts.dry_run);
    }
    println!("ok");

    Ok(())
}
