//! Tabular input: CSV rows and the statically typed record read from them.
//!
//! A [`Row`] is the raw header → cell mapping of one CSV line. A
//! [`RawRecord`] is the typed view of that row for one benchmark suite;
//! building it is where a missing column becomes a
//! [`NormalizeError::MissingField`] instead of a failed lookup later on.

use anyhow::{Context, Result};
use std::collections::HashMap;
use std::path::Path;

use crate::error::NormalizeError;
use crate::models::{Flag, Scalar, SuiteKind};

/// One CSV line keyed by column header.
pub type Row = HashMap<String, String>;

/// Read every row of a CSV file with a header line.
pub fn read_rows(path: &Path) -> Result<Vec<Row>> {
    let mut reader = csv::Reader::from_path(path)
        .with_context(|| format!("Failed to open tabular file: {}", path.display()))?;

    let headers: Vec<String> = reader
        .headers()
        .with_context(|| format!("Failed to read header line of {}", path.display()))?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();

    let mut rows = Vec::new();
    for (line, result) in reader.records().enumerate() {
        let record = result
            .with_context(|| format!("Malformed row {} in {}", line + 1, path.display()))?;
        let row: Row = headers
            .iter()
            .cloned()
            .zip(record.iter().map(str::to_string))
            .collect();
        rows.push(row);
    }

    Ok(rows)
}

/// Cells of one benchmark kind (read or write) of a suite.
#[derive(Debug, Clone, PartialEq)]
pub struct BenchmarkCells {
    pub mbsec_osd_device: Scalar,
    pub cost_usable_tb_mbsec: Scalar,
    pub mbsec_cluster: Scalar,
    pub avg_latency: Scalar,
    pub latency_95th: Scalar,
}

/// Typed view of one tabular row for a given suite.
#[derive(Debug, Clone, PartialEq)]
pub struct RawRecord {
    pub suite: SuiteKind,
    /// Per-row cluster identifier, when the source carries one.
    pub cluster_uuid: Option<String>,
    pub person: String,
    pub company: String,
    pub osd_test: Scalar,
    pub osd_servers_test: Scalar,
    pub osd_devices_test: Scalar,
    pub osd_media: String,
    pub cost_raw_tb: Scalar,
    pub ceph_data_protection: String,
    pub cost_usable_tb: Scalar,
    pub vendor: String,
    pub model: String,
    pub hdds_3_5: Scalar,
    pub hdds_2_5: Scalar,
    pub ssds_2_5: Scalar,
    pub pcie_nvm: Scalar,
    pub journal_model: String,
    pub cpu: String,
    pub cpu_sockets: Scalar,
    pub ram_ddr: Scalar,
    pub controller: String,
    pub hba_raid_model: String,
    pub network_interface: String,
    pub os_version: String,
    pub kernel: String,
    pub ceph_version: String,
    pub ceph_groups: Scalar,
    pub net_public: String,
    pub net_cluster: String,
    pub client_nodes: Scalar,
    pub client_os: String,
    pub client_vms: Scalar,
    pub ceph_client: String,
    pub load_utility: String,
    pub load_io_queue: Scalar,
    pub load_cbt: Flag,
    pub published: Flag,
    pub link: String,
    pub observations: String,
    pub read: BenchmarkCells,
    pub write: BenchmarkCells,
}

impl RawRecord {
    /// Build the typed record, failing on the first absent column. Present
    /// cells never fail: whatever they hold is kept as a [`Scalar`].
    pub fn from_row(row: &Row, suite: SuiteKind) -> Result<Self, NormalizeError> {
        let cluster_uuid = row
            .get("cluster_uuid")
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
            .map(str::to_string);

        Ok(Self {
            suite,
            cluster_uuid,
            person: text(row, "person")?,
            company: text(row, "company")?,
            osd_test: scalar(row, "osd_test")?,
            osd_servers_test: scalar(row, "osd_servers_test")?,
            osd_devices_test: scalar(row, "osd_devices_test")?,
            osd_media: text(row, "osd_media")?,
            cost_raw_tb: scalar(row, "cost_raw_tb")?,
            ceph_data_protection: text(row, "ceph_data_protection")?,
            cost_usable_tb: scalar(row, "cost_usable_tb")?,
            vendor: text(row, "vendor")?,
            model: text(row, "model")?,
            hdds_3_5: scalar(row, "3_5_hdds")?,
            hdds_2_5: scalar(row, "2_5_hdds")?,
            ssds_2_5: scalar(row, "2_5_ssds")?,
            pcie_nvm: scalar(row, "pcie_nvm")?,
            journal_model: text(row, "journal_model")?,
            cpu: text(row, "cpu")?,
            cpu_sockets: scalar(row, "cpu_sockets")?,
            ram_ddr: scalar(row, "ram_ddr")?,
            controller: text(row, "controller")?,
            hba_raid_model: text(row, "hba_raid_model")?,
            network_interface: text(row, "network_interface")?,
            os_version: text(row, "os_version")?,
            kernel: text(row, "kernel")?,
            ceph_version: text(row, "ceph_version")?,
            ceph_groups: scalar(row, "ceph_groups")?,
            net_public: text(row, "net_public")?,
            net_cluster: text(row, "net_cluster")?,
            client_nodes: scalar(row, "client_nodes")?,
            client_os: text(row, "client_os")?,
            client_vms: scalar(row, "client_vms")?,
            ceph_client: text(row, "ceph_client")?,
            load_utility: text(row, "load_utility")?,
            load_io_queue: scalar(row, "load_io_queue")?,
            load_cbt: Flag::parse(&text(row, "load_cbt")?),
            published: Flag::parse(&text(row, "published")?),
            link: text(row, "link")?,
            observations: text(row, "observations")?,
            read: benchmark_cells(row, suite, false)?,
            write: benchmark_cells(row, suite, true)?,
        })
    }
}

/// Column names holding the benchmark cells of one suite kind, in
/// `BenchmarkCells` field order.
pub fn benchmark_columns(suite: SuiteKind, write: bool) -> [String; 5] {
    let (prefix, names) = match (suite, write) {
        (SuiteKind::Sequential, false) => ("4MSR", SEQUENTIAL_COLUMNS),
        (SuiteKind::Sequential, true) => ("4MSW", SEQUENTIAL_COLUMNS),
        (SuiteKind::Random, false) => ("4KRR", RANDOM_COLUMNS),
        (SuiteKind::Random, true) => ("4KRW", RANDOM_COLUMNS),
    };
    names.map(|n| format!("{}_{}", prefix, n))
}

const SEQUENTIAL_COLUMNS: [&str; 5] = [
    "mbsec_osd_device",
    "cost_usable_tb_mbsec",
    "mbsec_cluster",
    "latency_avg",
    "latency_95",
];

const RANDOM_COLUMNS: [&str; 5] = [
    "IOPS_OSD",
    "media_cost_IOP",
    "IOPS_cluster",
    "latency_avg",
    "latency_95",
];

fn benchmark_cells(
    row: &Row,
    suite: SuiteKind,
    write: bool,
) -> Result<BenchmarkCells, NormalizeError> {
    let [osd_device, cost, cluster, avg, p95] = benchmark_columns(suite, write);
    Ok(BenchmarkCells {
        mbsec_osd_device: scalar(row, &osd_device)?,
        cost_usable_tb_mbsec: scalar(row, &cost)?,
        mbsec_cluster: scalar(row, &cluster)?,
        avg_latency: scalar(row, &avg)?,
        latency_95th: scalar(row, &p95)?,
    })
}

fn text(row: &Row, field: &str) -> Result<String, NormalizeError> {
    row.get(field)
        .cloned()
        .ok_or_else(|| NormalizeError::MissingField(field.to_string()))
}

fn scalar(row: &Row, field: &str) -> Result<Scalar, NormalizeError> {
    text(row, field).map(|v| Scalar::infer(&v))
}
