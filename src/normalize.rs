//! Record normalization: one typed tabular row into one [`Description`].
//!
//! The tabular sources carry neither a submission time nor a cluster id,
//! so both are synthesized here. The date is a fixed base advanced by the
//! row's ordinal in whole days, which keeps identifiers unique and ordered
//! within a run but says nothing about when the test actually happened.

use chrono::{Duration, NaiveDateTime};

use crate::error::NormalizeError;
use crate::models::{
    default_pools, BenchmarkEntry, Ceph, Clients, Description, Information, Load, Network,
    Notes, OsdServers, Platform, Publication, Submitter, SuiteKind,
};
use crate::record::{BenchmarkCells, RawRecord, Row};

/// Placeholder cluster identifier used when neither the row nor the
/// configuration provides one.
pub const DEFAULT_CLUSTER_UUID: &str = "5e4eeae5-edf4-4d53-8ed5-5675207f9a35";

/// Date of the row with ordinal 0.
pub const DEFAULT_BASE_DATE: &str = "2014-05-01T20:00:34";

pub const DATE_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// Tool versions recorded on every platform section.
const V_FIO: &str = "2.2.13";
const V_SYSBENCH: &str = "0.5";
const V_RADOSBENCH: &str = "9.2.0";
const V_COLLECTL: &str = "4.0.2";

/// Parse a `YYYY-MM-DDTHH:MM:SS` timestamp.
pub fn parse_date(value: &str) -> Result<NaiveDateTime, chrono::ParseError> {
    NaiveDateTime::parse_from_str(value, DATE_FORMAT)
}

/// `base` advanced by `order` days, formatted as `YYYY-MM-DDTHH:MM:SS`.
pub fn synthesize_date(base: NaiveDateTime, order: u32) -> Result<String, NormalizeError> {
    base.checked_add_signed(Duration::days(i64::from(order)))
        .map(|d| d.format(DATE_FORMAT).to_string())
        .ok_or(NormalizeError::DateOutOfRange(order))
}

/// Produces descriptions for one run.
#[derive(Debug, Clone)]
pub struct Normalizer {
    cluster_uuid: String,
    base_date: NaiveDateTime,
}

impl Default for Normalizer {
    fn default() -> Self {
        Self {
            cluster_uuid: DEFAULT_CLUSTER_UUID.to_string(),
            base_date: parse_date(DEFAULT_BASE_DATE).expect("default base date is well-formed"),
        }
    }
}

impl Normalizer {
    pub fn new(cluster_uuid: impl Into<String>, base_date: NaiveDateTime) -> Self {
        Self {
            cluster_uuid: cluster_uuid.into(),
            base_date,
        }
    }

    /// Type the row for `suite`, then normalize it.
    pub fn normalize_row(
        &self,
        row: &Row,
        order: u32,
        suite: SuiteKind,
    ) -> Result<Description, NormalizeError> {
        let record = RawRecord::from_row(row, suite)?;
        self.normalize(&record, order)
    }

    /// Build the description of `record` at position `order`.
    pub fn normalize(&self, record: &RawRecord, order: u32) -> Result<Description, NormalizeError> {
        let date = synthesize_date(self.base_date, order)?;
        let cluster_uuid = record
            .cluster_uuid
            .clone()
            .unwrap_or_else(|| self.cluster_uuid.clone());

        Ok(Description {
            information: Information {
                cluster_uuid,
                date,
                submitter: Submitter {
                    person: record.person.clone(),
                    company: record.company.clone(),
                },
            },
            platform: Platform {
                osds: record.osd_test.clone(),
                osd_servers: record.osd_servers_test.clone(),
                osd_devices: record.osd_devices_test.clone(),
                osd_media: record.osd_media.clone(),
                cost_raw_tb: record.cost_raw_tb.clone(),
                ceph_data_protection: record.ceph_data_protection.clone(),
                cost_usable_tb: record.cost_usable_tb.clone(),
                v_fio: V_FIO.to_string(),
                v_sysbench: V_SYSBENCH.to_string(),
                v_radosbench: V_RADOSBENCH.to_string(),
                v_collectl: V_COLLECTL.to_string(),
            },
            osd_servers: OsdServers {
                server_vendor: record.vendor.clone(),
                server_model: record.model.clone(),
                hdds_3_5: record.hdds_3_5.clone(),
                hdds_2_5: record.hdds_2_5.clone(),
                ssds_2_5: record.ssds_2_5.clone(),
                nvme_for_osds: record.pcie_nvm.clone(),
                journal_model: record.journal_model.clone(),
                cpu: record.cpu.clone(),
                cpu_sockets: record.cpu_sockets.clone(),
                ram_gb: record.ram_ddr.clone(),
                hba_raid: record.controller.clone(),
                hba_raid_model: record.hba_raid_model.clone(),
                network_interface: record.network_interface.clone(),
                os_version: record.os_version.clone(),
                kernel_version: record.kernel.clone(),
            },
            pools: default_pools(),
            ceph: Ceph {
                v_ceph: record.ceph_version.clone(),
                pg_count: record.ceph_groups.clone(),
            },
            network: Network {
                pub_network: record.net_public.clone(),
                cluster_network: record.net_cluster.clone(),
            },
            clients: Clients {
                client_node_count: record.client_nodes.clone(),
                client_os: record.client_os.clone(),
                client_vm_count: record.client_vms.clone(),
                ceph_client: record.ceph_client.clone(),
            },
            load: Load {
                load_test_util: record.load_utility.clone(),
                io_queue_depth: record.load_io_queue.clone(),
                cbt: record.load_cbt,
                published: record.published,
            },
            publication: Publication {
                publication_url: record.link.clone(),
            },
            notes: Notes {
                observations: record.observations.clone(),
            },
            benchmarks: benchmarks(record),
        })
    }
}

/// The fixed read/write pair for the record's suite.
fn benchmarks(record: &RawRecord) -> Vec<BenchmarkEntry> {
    let suite = record.suite;
    vec![
        entry(suite, suite.read_kind(), &record.read),
        entry(suite, suite.write_kind(), &record.write),
    ]
}

fn entry(suite: SuiteKind, kind: &str, cells: &BenchmarkCells) -> BenchmarkEntry {
    BenchmarkEntry {
        suite: suite.tag().to_string(),
        kind: kind.to_string(),
        mbsec_osd_device: cells.mbsec_osd_device.clone(),
        cost_usable_tb_mbsec: cells.cost_usable_tb_mbsec.clone(),
        mbsec_cluster: cells.mbsec_cluster.clone(),
        avg_latency: cells.avg_latency.clone(),
        latency_95th: cells.latency_95th.clone(),
    }
}
