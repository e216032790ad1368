//! Core data models used throughout the pipeline.
//!
//! A [`Description`] is the normalized, nested document produced from one
//! tabular row. Field declaration order is the serialization order, so
//! written files keep the same key layout for every test.

use serde::{Deserialize, Serialize};
use std::fmt;

/// An untyped cell value passed through from the tabular source.
///
/// Inferred per cell: integers first, then finite floats, then text.
/// Blank cells become [`Scalar::Null`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Scalar {
    Null,
    Int(i64),
    Float(f64),
    Text(String),
}

impl Scalar {
    pub fn infer(cell: &str) -> Self {
        let trimmed = cell.trim();
        if trimmed.is_empty() {
            return Scalar::Null;
        }
        if let Ok(i) = trimmed.parse::<i64>() {
            return Scalar::Int(i);
        }
        match trimmed.parse::<f64>() {
            Ok(f) if f.is_finite() => Scalar::Float(f),
            _ => Scalar::Text(cell.to_string()),
        }
    }

    /// Finite numeric value, reading numeric text as a number.
    pub fn as_f64(&self) -> Option<f64> {
        let value = match self {
            Scalar::Int(i) => Some(*i as f64),
            Scalar::Float(f) => Some(*f),
            Scalar::Text(s) => s.trim().parse::<f64>().ok(),
            Scalar::Null => None,
        };
        value.filter(|f| f.is_finite())
    }

    /// Integral value, accepting integral floats such as `12.0` and
    /// numeric text.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Scalar::Int(i) => Some(*i),
            _ => self
                .as_f64()
                .filter(|f| f.fract() == 0.0 && (i64::MIN as f64..i64::MAX as f64).contains(f))
                .map(|f| f as i64),
        }
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scalar::Null => Ok(()),
            Scalar::Int(i) => write!(f, "{}", i),
            Scalar::Float(x) => write!(f, "{}", x),
            Scalar::Text(s) => f.write_str(s),
        }
    }
}

/// A `"Y"`/other flag, stored as the integer `1` or `0`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "u8", into = "u8")]
pub struct Flag(pub bool);

impl Flag {
    /// Only the exact string `"Y"` is true. Case is not folded and there
    /// is no third state: anything else, including `"y"` and blanks, is false.
    pub fn parse(value: &str) -> Self {
        Flag(value == "Y")
    }
}

impl From<u8> for Flag {
    fn from(v: u8) -> Self {
        Flag(v != 0)
    }
}

impl From<Flag> for u8 {
    fn from(f: Flag) -> Self {
        u8::from(f.0)
    }
}

/// Benchmark suite a test belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SuiteKind {
    /// Throughput-optimized 4M sequential read/write.
    Sequential,
    /// IOPS-optimized 4K random read/write.
    Random,
}

impl SuiteKind {
    pub const ALL: [SuiteKind; 2] = [SuiteKind::Sequential, SuiteKind::Random];

    /// Tag stored in the `suite` field of each benchmark entry.
    pub fn tag(self) -> &'static str {
        match self {
            SuiteKind::Sequential => "CBT_Throughput-optimized",
            SuiteKind::Random => "IOPS-optimized",
        }
    }

    pub fn read_kind(self) -> &'static str {
        match self {
            SuiteKind::Sequential => "4M Sequential Read",
            SuiteKind::Random => "4K Random Read",
        }
    }

    pub fn write_kind(self) -> &'static str {
        match self {
            SuiteKind::Sequential => "4M Sequential Write",
            SuiteKind::Random => "4K Random Write",
        }
    }

    /// Human-readable label, also written to the index as `Suite`.
    pub fn label(self) -> &'static str {
        match self {
            SuiteKind::Sequential => "throughput-optimized sequential",
            SuiteKind::Random => "IOPS-optimized random",
        }
    }

    pub fn from_tag(tag: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.tag() == tag)
    }
}

impl fmt::Display for SuiteKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Normalized test document ("description").
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Description {
    pub information: Information,
    pub platform: Platform,
    pub osd_servers: OsdServers,
    pub pools: Vec<Pool>,
    pub ceph: Ceph,
    pub network: Network,
    pub clients: Clients,
    pub load: Load,
    pub publication: Publication,
    pub notes: Notes,
    pub benchmarks: Vec<BenchmarkEntry>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Information {
    pub cluster_uuid: String,
    /// Synthesized `YYYY-MM-DDTHH:MM:SS`; not a real submission time.
    pub date: String,
    pub submitter: Submitter,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Submitter {
    pub person: String,
    pub company: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Platform {
    pub osds: Scalar,
    pub osd_servers: Scalar,
    pub osd_devices: Scalar,
    pub osd_media: String,
    pub cost_raw_tb: Scalar,
    pub ceph_data_protection: String,
    pub cost_usable_tb: Scalar,
    pub v_fio: String,
    pub v_sysbench: String,
    pub v_radosbench: String,
    pub v_collectl: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OsdServers {
    pub server_vendor: String,
    pub server_model: String,
    #[serde(rename = "3_5_hdds_for_osds")]
    pub hdds_3_5: Scalar,
    #[serde(rename = "2_5_hdds_for_osds")]
    pub hdds_2_5: Scalar,
    #[serde(rename = "2_5_ssds_for_osds")]
    pub ssds_2_5: Scalar,
    pub nvme_for_osds: Scalar,
    pub journal_model: String,
    #[serde(rename = "CPU")]
    pub cpu: String,
    #[serde(rename = "CPU_sockets")]
    pub cpu_sockets: Scalar,
    #[serde(rename = "RAM_GB")]
    pub ram_gb: Scalar,
    #[serde(rename = "HBA/RAID")]
    pub hba_raid: String,
    #[serde(rename = "HBA/RAID_model")]
    pub hba_raid_model: String,
    #[serde(rename = "Network_Interface")]
    pub network_interface: String,
    #[serde(rename = "v_OS")]
    pub os_version: String,
    #[serde(rename = "v_kernel")]
    pub kernel_version: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pool {
    pub pool_id: u32,
    pub pool_name: String,
    pub pool_pgpnum: u32,
    pub pool_size: u32,
}

/// The two pool descriptors every document carries, in this order.
pub fn default_pools() -> Vec<Pool> {
    vec![
        Pool {
            pool_id: 0,
            pool_name: "data".to_string(),
            pool_pgpnum: 512,
            pool_size: 2,
        },
        Pool {
            pool_id: 32,
            pool_name: "ssd".to_string(),
            pool_pgpnum: 512,
            pool_size: 1,
        },
    ]
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ceph {
    pub v_ceph: String,
    pub pg_count: Scalar,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Network {
    pub pub_network: String,
    pub cluster_network: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Clients {
    pub client_node_count: Scalar,
    #[serde(rename = "Client_OS")]
    pub client_os: String,
    pub client_vm_count: Scalar,
    pub ceph_client: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Load {
    pub load_test_util: String,
    #[serde(rename = "IO_queue_depth")]
    pub io_queue_depth: Scalar,
    /// Whether the Ceph Benchmarking Tool drove the test.
    #[serde(rename = "CBT")]
    pub cbt: Flag,
    pub published: Flag,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Publication {
    pub publication_url: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notes {
    pub observations: String,
}

/// One benchmark result inside a description.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BenchmarkEntry {
    pub suite: String,
    pub kind: String,
    pub mbsec_osd_device: Scalar,
    pub cost_usable_tb_mbsec: Scalar,
    pub mbsec_cluster: Scalar,
    pub avg_latency: Scalar,
    #[serde(rename = "95th_latency")]
    pub latency_95th: Scalar,
}
