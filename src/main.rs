//! # Ceph Brag CLI (`ceph-brag`)
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `ceph-brag generate` | Turn benchmark CSV files into one JSON description per test |
//! | `ceph-brag upload` | Classify description files and index them into Elasticsearch |
//!
//! ## Examples
//!
//! ```bash
//! # Create descriptions from both benchmark spreadsheets
//! ceph-brag generate --sequential ceph-tests-data-4ms.csv \
//!     --random ceph-tests-data-4kr.csv --out bootstrapping/
//!
//! # See what would be indexed
//! ceph-brag upload --dir bootstrapping/ --dry
//!
//! # Rebuild the index from scratch
//! ceph-brag upload --dir bootstrapping/ \
//!     --elasticsearch elastic.example.org:80 ceph-tests --esauth ceph XXX --delete
//! ```

use clap::{Parser, Subcommand};
use std::io::IsTerminal;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use ceph_brag::backend::Credentials;
use ceph_brag::config;
use ceph_brag::generate::{self, GenerateArgs};
use ceph_brag::upload::{self, DocumentSource, UploadArgs};

/// Normalize Ceph benchmark results and index them for search.
#[derive(Parser)]
#[command(name = "ceph-brag", version, about)]
struct Cli {
    /// Path to configuration file (TOML). Defaults apply when it does not exist.
    #[arg(long, global = true, default_value = "./config/ceph-brag.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create one JSON description per row of the benchmark CSV files.
    ///
    /// Rows of the sequential file come first, then rows of the random
    /// file; each row's position sets its synthesized date.
    Generate {
        /// CSV with 4M sequential (throughput-optimized) results.
        #[arg(long, required_unless_present = "random")]
        sequential: Option<PathBuf>,

        /// CSV with 4K random (IOPS-optimized) results.
        #[arg(long)]
        random: Option<PathBuf>,

        /// Directory to write description files into.
        #[arg(long, default_value = ".")]
        out: PathBuf,

        /// Ordinal of the first row.
        #[arg(long, default_value_t = 0)]
        start_order: u32,

        /// Cluster identifier for rows without a `cluster_uuid` column.
        #[arg(long)]
        cluster_uuid: Option<String>,
    },

    /// Index description files into Elasticsearch.
    Upload {
        /// Directory with description files (`*.json`).
        #[arg(long, required_unless_present = "files", conflicts_with = "files")]
        dir: Option<PathBuf>,

        /// Explicit description files, indexed in the given order.
        #[arg(long, num_args = 1.., required_unless_present = "dir")]
        files: Vec<PathBuf>,

        /// Elasticsearch address and index (eg: localhost:9200 ceph-tests).
        #[arg(long, num_args = 2, value_names = ["HOST:PORT", "INDEX"])]
        elasticsearch: Option<Vec<String>>,

        /// Basic-auth credentials for Elasticsearch.
        #[arg(long, num_args = 2, value_names = ["USER", "PASSWORD"])]
        esauth: Option<Vec<String>>,

        /// Delete and recreate the index before writing.
        #[arg(long)]
        delete: bool,

        /// Classify and report, but make no calls to Elasticsearch.
        #[arg(long)]
        dry: bool,
    },
}

/// Turn a two-value flag into a pair.
fn pair(values: Option<Vec<String>>) -> Option<(String, String)> {
    values.and_then(|v| match <[String; 2]>::try_from(v) {
        Ok([a, b]) => Some((a, b)),
        Err(_) => None,
    })
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("ceph_brag=info")),
        )
        .with_writer(std::io::stderr)
        .with_ansi(std::io::stderr().is_terminal())
        .init();

    let cli = Cli::parse();
    let cfg = config::load_config_or_default(&cli.config)?;

    match cli.command {
        Commands::Generate {
            sequential,
            random,
            out,
            start_order,
            cluster_uuid,
        } => {
            generate::run_generate(
                &cfg,
                GenerateArgs {
                    sequential,
                    random,
                    out,
                    start_order,
                    cluster_uuid,
                },
            )?;
        }
        Commands::Upload {
            dir,
            files,
            elasticsearch,
            esauth,
            delete,
            dry,
        } => {
            let source = match dir {
                Some(dir) => DocumentSource::Dir(dir),
                None => DocumentSource::Files(files),
            };
            let auth = pair(esauth).map(|(user, password)| Credentials { user, password });
            upload::run_upload(
                &cfg,
                UploadArgs {
                    source,
                    elasticsearch: pair(elasticsearch),
                    auth,
                    recreate_index: delete,
                    dry_run: dry,
                },
            )?;
        }
    }

    Ok(())
}
