//! # Ceph Brag
//!
//! Normalizes Ceph benchmark results into test descriptions and indexes
//! them into Elasticsearch.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────┐   ┌────────────┐   ┌────────────┐   ┌────────────┐   ┌───────────────┐
//! │ CSV rows │──▶│ Normalizer │──▶│ JSON files │──▶│ Classifier │──▶│ Elasticsearch │
//! │ (record) │   │ + identity │   │  (store)   │   │ + schema   │   │   (upload)    │
//! └──────────┘   └────────────┘   └────────────┘   └────────────┘   └───────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```bash
//! ceph-brag generate --sequential 4ms.csv --random 4kr.csv --out tests/
//! ceph-brag upload --dir tests/ --dry
//! ceph-brag upload --dir tests/ --elasticsearch localhost:9200 ceph-tests --delete
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`record`] | CSV reader and typed raw records |
//! | [`models`] | Description (normalized document) types |
//! | [`normalize`] | Row → description, date synthesis |
//! | [`identity`] | Stable document identifiers |
//! | [`store`] | One JSON file per description |
//! | [`classify`] | Suite classification and result pairs |
//! | [`schema`] | Index document variants and mapping |
//! | [`backend`] | Search backend trait, Elasticsearch and in-memory |
//! | [`upload`] | Upload orchestration |
//! | [`generate`] | CSV → description files |
//! | [`config`] | TOML configuration |
//! | [`error`] | Error types |

pub mod backend;
pub mod classify;
pub mod config;
pub mod error;
pub mod generate;
pub mod identity;
pub mod models;
pub mod normalize;
pub mod record;
pub mod schema;
pub mod store;
pub mod upload;
