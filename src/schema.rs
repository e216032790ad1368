//! Documents written to the search index, and the index mapping.
//!
//! Every test is indexed as one flat [`IndexedTest`]. The fields shared by
//! both suites live on the struct; the suite-specific result pair is the
//! [`SuiteResults`] enum, flattened so that a sequential test carries
//! `Seq_Read_4M`/`Seq_Write_4M` and a random test `Rand_Read_4K`/`Rand_Write_4K`,
//! plus the flat `fourMSR_*`/`fourMSW_*` (or `fourKRR_*`/`fourKRW_*`) fields.

use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use serde_json::{json, Value};

use crate::classify::{BenchResult, ResultPair};
use crate::models::{Description, SuiteKind};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IndexedResult {
    #[serde(rename = "MB/sec_per_OSD_Device")]
    pub mbsec_osd_device: Option<f64>,
    #[serde(rename = "Cost_TB_per_MB/sec")]
    pub cost_usable_tb_mbsec: f64,
    #[serde(rename = "MB/sec_per_Cluster")]
    pub mbsec_cluster: f64,
    #[serde(rename = "Latency_avg")]
    pub avg_latency: Option<f64>,
}

/// Pass-through values that are not numeric are indexed as null so the
/// float mapping never rejects a test.
impl From<BenchResult> for IndexedResult {
    fn from(r: BenchResult) -> Self {
        Self {
            mbsec_osd_device: r.mbsec_osd_device.as_f64(),
            cost_usable_tb_mbsec: r.cost_usable_tb_mbsec,
            mbsec_cluster: r.mbsec_cluster,
            avg_latency: r.avg_latency.as_f64(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SuiteResults {
    Sequential {
        read: IndexedResult,
        write: IndexedResult,
    },
    Random {
        read: IndexedResult,
        write: IndexedResult,
    },
}

impl SuiteResults {
    pub fn new(suite: SuiteKind, pair: ResultPair) -> Self {
        let read = pair.read.into();
        let write = pair.write.into();
        match suite {
            SuiteKind::Sequential => SuiteResults::Sequential { read, write },
            SuiteKind::Random => SuiteResults::Random { read, write },
        }
    }

    pub fn suite(&self) -> SuiteKind {
        match self {
            SuiteResults::Sequential { .. } => SuiteKind::Sequential,
            SuiteResults::Random { .. } => SuiteKind::Random,
        }
    }

    fn results(&self) -> (&IndexedResult, &IndexedResult) {
        match self {
            SuiteResults::Sequential { read, write } | SuiteResults::Random { read, write } => {
                (read, write)
            }
        }
    }
}

/// Result object keys and flat field prefixes, read then write.
fn result_keys(suite: SuiteKind) -> [(&'static str, &'static str); 2] {
    match suite {
        SuiteKind::Sequential => [("Seq_Read_4M", "fourMSR"), ("Seq_Write_4M", "fourMSW")],
        SuiteKind::Random => [("Rand_Read_4K", "fourKRR"), ("Rand_Write_4K", "fourKRW")],
    }
}

/// Flat per-result fields kept next to the result objects, queried by
/// existing dashboards as `<prefix>_<name>`.
const FLAT_FIELDS: [&str; 3] = ["mbsec_osd_device", "mbsec_cluster", "latency_avg"];

/// Each result is written both as an object (`Seq_Read_4M`) and as flat
/// fields (`fourMSR_mbsec_cluster`).
impl Serialize for SuiteResults {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let (read, write) = self.results();
        let mut map = serializer.serialize_map(Some(2 * (1 + FLAT_FIELDS.len())))?;
        for ((key, prefix), result) in result_keys(self.suite()).into_iter().zip([read, write]) {
            map.serialize_entry(key, result)?;
            let values = [
                result.mbsec_osd_device,
                Some(result.mbsec_cluster),
                result.avg_latency,
            ];
            for (field, value) in FLAT_FIELDS.into_iter().zip(values) {
                map.serialize_entry(&format!("{}_{}", prefix, field), &value)?;
            }
        }
        map.end()
    }
}

/// One test as stored in the index.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IndexedTest {
    #[serde(rename = "Id")]
    pub id: String,
    #[serde(rename = "Suite")]
    pub suite: String,
    #[serde(rename = "Config")]
    pub config: String,
    #[serde(rename = "Test_no")]
    pub test_no: u32,
    #[serde(rename = "Author")]
    pub author: String,
    #[serde(rename = "Company")]
    pub company: String,
    /// Counts are indexed as integers, or null when the description holds
    /// something non-integral.
    #[serde(rename = "OSD_Servers")]
    pub osd_servers: Option<i64>,
    #[serde(rename = "OSDs")]
    pub osds: Option<i64>,
    #[serde(rename = "OSD_Devices")]
    pub osd_devices: Option<i64>,
    #[serde(rename = "OSD_Media")]
    pub osd_media: String,
    #[serde(rename = "Data_Protection")]
    pub data_protection: String,
    #[serde(flatten)]
    pub results: SuiteResults,
}

impl IndexedTest {
    pub fn new(id: &str, test_no: u32, doc: &Description, results: SuiteResults) -> Self {
        let platform = &doc.platform;
        Self {
            id: id.to_string(),
            suite: results.suite().label().to_string(),
            config: config_string(doc),
            test_no,
            author: doc.information.submitter.person.clone(),
            company: doc.information.submitter.company.clone(),
            osd_servers: platform.osd_servers.as_i64(),
            osds: platform.osds.as_i64(),
            osd_devices: platform.osd_devices.as_i64(),
            osd_media: platform.osd_media.clone(),
            data_protection: platform.ceph_data_protection.clone(),
            results,
        }
    }
}

/// `"{osds}/{osd_media}/{data_protection}"`, e.g. `"10/HDD/replication"`.
/// The count is written as stored, so `10.0` stays `"10"` and a blank
/// count leaves the first part empty.
pub fn config_string(doc: &Description) -> String {
    format!(
        "{}/{}/{}",
        doc.platform.osds, doc.platform.osd_media, doc.platform.ceph_data_protection
    )
}

/// Index body (`{"mappings": ...}`) covering both test variants.
pub fn index_mapping() -> Value {
    let result = json!({
        "properties": {
            "MB/sec_per_OSD_Device": { "type": "float" },
            "Cost_TB_per_MB/sec": { "type": "float" },
            "MB/sec_per_Cluster": { "type": "float" },
            "Latency_avg": { "type": "float" }
        }
    });

    let mut body = json!({
        "mappings": {
            "properties": {
                "Id": { "type": "keyword" },
                "Suite": { "type": "keyword" },
                "Config": { "type": "keyword" },
                "Test_no": { "type": "integer" },
                "Author": { "type": "keyword" },
                "Company": { "type": "keyword" },
                "OSD_Servers": { "type": "integer" },
                "OSDs": { "type": "integer" },
                "OSD_Devices": { "type": "integer" },
                "OSD_Media": { "type": "keyword" },
                "Data_Protection": { "type": "keyword" },
                "Seq_Read_4M": result.clone(),
                "Seq_Write_4M": result.clone(),
                "Rand_Read_4K": result.clone(),
                "Rand_Write_4K": result
            }
        }
    });

    if let Some(properties) = body["mappings"]["properties"].as_object_mut() {
        for suite in SuiteKind::ALL {
            for (_, prefix) in result_keys(suite) {
                for field in FLAT_FIELDS {
                    properties.insert(format!("{}_{}", prefix, field), json!({ "type": "float" }));
                }
            }
        }
    }

    body
}
