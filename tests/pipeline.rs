//! End-to-end library flow: CSV → description files → classified upload.

use std::fs;
use std::path::Path;
use tempfile::TempDir;

use ceph_brag::backend::MemoryBackend;
use ceph_brag::generate::generate_documents;
use ceph_brag::models::SuiteKind;
use ceph_brag::normalize::Normalizer;
use ceph_brag::record::read_rows;
use ceph_brag::schema::index_mapping;
use ceph_brag::store::{load_documents, scan_dir};
use ceph_brag::upload::{upload_documents, UploadOptions};

const HEADER: &str = "person,company,osd_test,osd_servers_test,osd_devices_test,osd_media,\
cost_raw_tb,ceph_data_protection,cost_usable_tb,vendor,model,3_5_hdds,2_5_hdds,2_5_ssds,\
pcie_nvm,journal_model,cpu,cpu_sockets,ram_ddr,controller,hba_raid_model,network_interface,\
os_version,kernel,ceph_version,ceph_groups,net_public,net_cluster,client_nodes,client_os,\
client_vms,ceph_client,load_utility,load_io_queue,load_cbt,published,link,observations";

const COMMON: &str = "Jane,Acme,12,3,12,SSD,80,erasure coding,160,Dell,R730,0,0,12,0,none,\
E5-2680,2,256,RAID,PERC H730,40GbE,Ubuntu 14.04,3.13,0.94.5,2048,40GbE,40GbE,6,Ubuntu 14.04,\
,krbd,fio,32,Y,Y,https://example.org/ssd,all flash";

fn write_csv(path: &Path, prefixes: [&str; 2], names: [&str; 5], rows: &[[&str; 10]]) {
    let mut header = HEADER.to_string();
    for prefix in prefixes {
        for name in names {
            header.push_str(&format!(",{}_{}", prefix, name));
        }
    }
    let mut content = header + "\n";
    for values in rows {
        content.push_str(COMMON);
        content.push(',');
        content.push_str(&values.join(","));
        content.push('\n');
    }
    fs::write(path, content).unwrap();
}

fn inputs(tmp: &Path) -> Vec<(SuiteKind, Vec<ceph_brag::record::Row>)> {
    let seq = tmp.join("4ms.csv");
    write_csv(
        &seq,
        ["4MSR", "4MSW"],
        [
            "mbsec_osd_device",
            "cost_usable_tb_mbsec",
            "mbsec_cluster",
            "latency_avg",
            "latency_95",
        ],
        &[["300", "0.05", "3600", "12.5", "20", "150", "0.1", "1800", "25", "40"]],
    );
    let rnd = tmp.join("4kr.csv");
    write_csv(
        &rnd,
        ["4KRR", "4KRW"],
        [
            "IOPS_OSD",
            "media_cost_IOP",
            "IOPS_cluster",
            "latency_avg",
            "latency_95",
        ],
        &[
            ["9000", "0.001", "108000", "0.9", "1.5", "3000", "0.003", "36000", "n/a", "4"],
            ["8000", "0.001", "96000", "1.0", "1.7", "2500", "0.004", "30000", "2.8", "5"],
        ],
    );

    vec![
        (SuiteKind::Sequential, read_rows(&seq).unwrap()),
        (SuiteKind::Random, read_rows(&rnd).unwrap()),
    ]
}

fn options(dry_run: bool) -> UploadOptions {
    UploadOptions {
        index: "ceph-tests".to_string(),
        recreate_index: true,
        dry_run,
    }
}

#[test]
fn test_generate_then_upload() {
    let tmp = TempDir::new().unwrap();
    let out = tmp.path().join("docs");
    let report = generate_documents(&Normalizer::default(), &inputs(tmp.path()), &out, 0).unwrap();
    assert_eq!(report.written.len(), 3);
    assert_eq!(report.failed_rows, 0);

    let set = load_documents(&scan_dir(&out).unwrap());
    assert_eq!(set.documents.len(), 3);
    assert!(set.unreadable.is_empty());

    let mut backend = MemoryBackend::new();
    let upload = upload_documents(&set.documents, &mut backend, &options(false)).unwrap();
    assert_eq!(upload.written, 3);
    assert!(upload.index_recreated);
    assert_eq!(backend.indexes["ceph-tests"].body, index_mapping());

    let seq = backend.document("ceph-tests", &set.documents[0].id).unwrap();
    assert_eq!(seq["Suite"], "throughput-optimized sequential");
    assert_eq!(seq["Config"], "12/SSD/erasure coding");
    assert_eq!(seq["Seq_Read_4M"]["MB/sec_per_Cluster"], 3600.0);
    assert_eq!(seq["Seq_Write_4M"]["Latency_avg"], 25.0);

    let rnd = backend.document("ceph-tests", &set.documents[1].id).unwrap();
    assert_eq!(rnd["Suite"], "IOPS-optimized random");
    assert_eq!(rnd["Test_no"], 2);
    assert_eq!(rnd["Rand_Read_4K"]["Cost_TB_per_MB/sec"], 0.001);
    assert!(rnd["Rand_Write_4K"]["Latency_avg"].is_null());
    assert!(rnd.get("Seq_Read_4M").is_none());
}

#[test]
fn test_rerun_replaces_documents() {
    let tmp = TempDir::new().unwrap();
    let out = tmp.path().join("docs");
    let normalizer = Normalizer::default();
    generate_documents(&normalizer, &inputs(tmp.path()), &out, 0).unwrap();
    // Same ordinals, same identifiers: files are overwritten, not added.
    generate_documents(&normalizer, &inputs(tmp.path()), &out, 0).unwrap();
    let set = load_documents(&scan_dir(&out).unwrap());
    assert_eq!(set.documents.len(), 3);

    let mut backend = MemoryBackend::new();
    upload_documents(&set.documents, &mut backend, &options(false)).unwrap();
    upload_documents(&set.documents, &mut backend, &options(false)).unwrap();
    assert_eq!(backend.document_count("ceph-tests"), 3);
}

#[test]
fn test_dry_run_touches_nothing() {
    let tmp = TempDir::new().unwrap();
    let out = tmp.path().join("docs");
    generate_documents(&Normalizer::default(), &inputs(tmp.path()), &out, 5).unwrap();
    let set = load_documents(&scan_dir(&out).unwrap());

    let mut backend = MemoryBackend::new();
    let report = upload_documents(&set.documents, &mut backend, &options(true)).unwrap();
    assert_eq!(report.planned.len(), 3);
    assert_eq!(report.written, 0);
    assert_eq!(backend.calls(), 0);
    assert!(backend.indexes.is_empty());
    assert!(report.planned[0].id.starts_with("2014-05-06_20:00:34_"));
}
