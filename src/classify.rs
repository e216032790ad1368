//! Benchmark classification and result-pair extraction.
//!
//! Scans a description's benchmark entries, groups them by suite and picks
//! the suite whose Read and Write entries are both present. The picked
//! suite decides which index document variant the test is written as.
//! Every decision that drops an entry is reported as a [`ClassifyWarning`];
//! the caller decides how to surface them.

use std::fmt;

use crate::error::ClassifyError;
use crate::models::{BenchmarkEntry, Scalar, SuiteKind};

/// Indexed values of one benchmark kind.
#[derive(Debug, Clone, PartialEq)]
pub struct BenchResult {
    pub mbsec_osd_device: Scalar,
    pub cost_usable_tb_mbsec: f64,
    pub mbsec_cluster: f64,
    pub avg_latency: Scalar,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ResultPair {
    pub read: BenchResult,
    pub write: BenchResult,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Classification {
    Classified { suite: SuiteKind, results: ResultPair },
    /// No suite had both a Read and a Write entry.
    Unclassifiable,
}

/// Recoverable findings made while classifying.
#[derive(Debug, Clone, PartialEq)]
pub enum ClassifyWarning {
    UnknownSuite { tag: String },
    UnknownKind { suite: SuiteKind, kind: String },
    DuplicateEntry { suite: SuiteKind, kind: String },
    IncompleteSuite { suite: SuiteKind, missing: &'static str },
    AmbiguousSuites { chosen: SuiteKind, ignored: SuiteKind },
}

impl fmt::Display for ClassifyWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClassifyWarning::UnknownSuite { tag } => {
                write!(f, "unknown benchmark suite '{}', entry ignored", tag)
            }
            ClassifyWarning::UnknownKind { suite, kind } => {
                write!(f, "unknown kind '{}' in suite {}, entry ignored", kind, suite)
            }
            ClassifyWarning::DuplicateEntry { suite, kind } => {
                write!(f, "duplicate '{}' entry in suite {}, keeping the first", kind, suite)
            }
            ClassifyWarning::IncompleteSuite { suite, missing } => {
                write!(f, "suite {} has no '{}' entry", suite, missing)
            }
            ClassifyWarning::AmbiguousSuites { chosen, ignored } => {
                write!(f, "both suites present, using {} and ignoring {}", chosen, ignored)
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ClassifyOutcome {
    pub classification: Classification,
    pub warnings: Vec<ClassifyWarning>,
}

/// Read/write entries seen so far for one suite.
#[derive(Default)]
struct SuiteSlots<'a> {
    read: Option<&'a BenchmarkEntry>,
    write: Option<&'a BenchmarkEntry>,
}

/// Classify the benchmarks of the document identified by `document_id`.
///
/// Only the chosen suite's values are coerced; a coercion failure there is
/// an error for the whole document.
pub fn classify(
    document_id: &str,
    benchmarks: &[BenchmarkEntry],
) -> Result<ClassifyOutcome, ClassifyError> {
    let mut warnings = Vec::new();
    // Suites in order of first appearance.
    let mut seen: Vec<(SuiteKind, SuiteSlots<'_>)> = Vec::new();

    for entry in benchmarks {
        let Some(suite) = SuiteKind::from_tag(&entry.suite) else {
            warnings.push(ClassifyWarning::UnknownSuite {
                tag: entry.suite.clone(),
            });
            continue;
        };

        let pos = match seen.iter().position(|(s, _)| *s == suite) {
            Some(pos) => pos,
            None => {
                seen.push((suite, SuiteSlots::default()));
                seen.len() - 1
            }
        };
        let slots = &mut seen[pos].1;

        let slot = if entry.kind == suite.read_kind() {
            &mut slots.read
        } else if entry.kind == suite.write_kind() {
            &mut slots.write
        } else {
            warnings.push(ClassifyWarning::UnknownKind {
                suite,
                kind: entry.kind.clone(),
            });
            continue;
        };

        if slot.is_some() {
            warnings.push(ClassifyWarning::DuplicateEntry {
                suite,
                kind: entry.kind.clone(),
            });
        } else {
            *slot = Some(entry);
        }
    }

    let mut complete = Vec::new();
    for (suite, slots) in &seen {
        match (slots.read, slots.write) {
            (Some(read), Some(write)) => complete.push((*suite, read, write)),
            (None, _) => warnings.push(ClassifyWarning::IncompleteSuite {
                suite: *suite,
                missing: suite.read_kind(),
            }),
            (_, None) => warnings.push(ClassifyWarning::IncompleteSuite {
                suite: *suite,
                missing: suite.write_kind(),
            }),
        }
    }

    let Some(&(suite, read, write)) = complete.first() else {
        return Ok(ClassifyOutcome {
            classification: Classification::Unclassifiable,
            warnings,
        });
    };
    for &(ignored, _, _) in complete.iter().skip(1) {
        warnings.push(ClassifyWarning::AmbiguousSuites {
            chosen: suite,
            ignored,
        });
    }

    let results = ResultPair {
        read: bench_result(document_id, read)?,
        write: bench_result(document_id, write)?,
    };

    Ok(ClassifyOutcome {
        classification: Classification::Classified { suite, results },
        warnings,
    })
}

fn bench_result(document_id: &str, entry: &BenchmarkEntry) -> Result<BenchResult, ClassifyError> {
    Ok(BenchResult {
        mbsec_osd_device: entry.mbsec_osd_device.clone(),
        cost_usable_tb_mbsec: coerce_f64(
            document_id,
            entry,
            "cost_usable_tb_mbsec",
            &entry.cost_usable_tb_mbsec,
        )?,
        mbsec_cluster: coerce_f64(document_id, entry, "mbsec_cluster", &entry.mbsec_cluster)?,
        avg_latency: entry.avg_latency.clone(),
    })
}

/// Numeric value of a benchmark field. Numeric text is accepted; blanks,
/// non-numeric text and non-finite values are errors.
pub fn coerce_f64(
    document_id: &str,
    entry: &BenchmarkEntry,
    field: &'static str,
    value: &Scalar,
) -> Result<f64, ClassifyError> {
    value.as_f64().ok_or_else(|| ClassifyError::Parse {
        document: document_id.to_string(),
        kind: entry.kind.clone(),
        field,
        value: value.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(suite: &str, kind: &str, cost: Scalar, cluster: Scalar) -> BenchmarkEntry {
        BenchmarkEntry {
            suite: suite.to_string(),
            kind: kind.to_string(),
            mbsec_osd_device: Scalar::Int(90),
            cost_usable_tb_mbsec: cost,
            mbsec_cluster: cluster,
            avg_latency: Scalar::Float(35.2),
            latency_95th: Scalar::Int(50),
        }
    }

    fn pair(suite: SuiteKind) -> Vec<BenchmarkEntry> {
        vec![
            entry(suite.tag(), suite.read_kind(), Scalar::Float(0.41), Scalar::Int(900)),
            entry(suite.tag(), suite.write_kind(), Scalar::Float(0.93), Scalar::Int(400)),
        ]
    }

    #[test]
    fn test_sequential_pair_no_warnings() {
        let outcome = classify("doc", &pair(SuiteKind::Sequential)).unwrap();
        assert!(outcome.warnings.is_empty());
        match outcome.classification {
            Classification::Classified { suite, results } => {
                assert_eq!(suite, SuiteKind::Sequential);
                assert_eq!(results.read.cost_usable_tb_mbsec, 0.41);
                assert_eq!(results.read.mbsec_cluster, 900.0);
                assert_eq!(results.write.mbsec_cluster, 400.0);
                assert_eq!(results.write.mbsec_osd_device, Scalar::Int(90));
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_random_pair_write_first() {
        let mut benchmarks = pair(SuiteKind::Random);
        benchmarks.reverse();
        let outcome = classify("doc", &benchmarks).unwrap();
        assert!(outcome.warnings.is_empty());
        assert!(matches!(
            outcome.classification,
            Classification::Classified { suite: SuiteKind::Random, ref results }
                if results.read.mbsec_cluster == 900.0
        ));
    }

    #[test]
    fn test_unknown_suite_only_is_unclassifiable() {
        let benchmarks = vec![
            entry("fio-random", "4K Random Read", Scalar::Int(1), Scalar::Int(1)),
            entry("fio-random", "4K Random Write", Scalar::Int(1), Scalar::Int(1)),
        ];
        let outcome = classify("doc", &benchmarks).unwrap();
        assert_eq!(outcome.classification, Classification::Unclassifiable);
        assert_eq!(outcome.warnings.len(), 2);
        assert_eq!(
            outcome.warnings[0],
            ClassifyWarning::UnknownSuite {
                tag: "fio-random".to_string()
            }
        );
    }

    #[test]
    fn test_unknown_entry_excluded_but_document_kept() {
        let mut benchmarks = pair(SuiteKind::Sequential);
        benchmarks.insert(1, entry("other", "x", Scalar::Null, Scalar::Null));
        let outcome = classify("doc", &benchmarks).unwrap();
        assert_eq!(outcome.warnings.len(), 1);
        assert!(matches!(
            outcome.classification,
            Classification::Classified { suite: SuiteKind::Sequential, .. }
        ));
    }

    #[test]
    fn test_incomplete_suite() {
        let benchmarks = pair(SuiteKind::Sequential)[..1].to_vec();
        let outcome = classify("doc", &benchmarks).unwrap();
        assert_eq!(outcome.classification, Classification::Unclassifiable);
        assert_eq!(
            outcome.warnings,
            vec![ClassifyWarning::IncompleteSuite {
                suite: SuiteKind::Sequential,
                missing: "4M Sequential Write"
            }]
        );
    }

    #[test]
    fn test_unknown_kind_and_duplicate() {
        let mut benchmarks = pair(SuiteKind::Random);
        benchmarks.push(entry("IOPS-optimized", "8K Random Read", Scalar::Int(1), Scalar::Int(1)));
        benchmarks.push(entry("IOPS-optimized", "4K Random Read", Scalar::Int(5), Scalar::Int(5)));
        let outcome = classify("doc", &benchmarks).unwrap();
        assert_eq!(outcome.warnings.len(), 2);
        assert!(matches!(outcome.warnings[0], ClassifyWarning::UnknownKind { .. }));
        assert!(matches!(outcome.warnings[1], ClassifyWarning::DuplicateEntry { .. }));
        // First occurrence wins.
        assert!(matches!(
            outcome.classification,
            Classification::Classified { ref results, .. } if results.read.mbsec_cluster == 900.0
        ));
    }

    #[test]
    fn test_both_suites_first_wins() {
        let mut benchmarks = pair(SuiteKind::Random);
        benchmarks.extend(pair(SuiteKind::Sequential));
        let outcome = classify("doc", &benchmarks).unwrap();
        assert_eq!(
            outcome.warnings,
            vec![ClassifyWarning::AmbiguousSuites {
                chosen: SuiteKind::Random,
                ignored: SuiteKind::Sequential
            }]
        );
    }

    #[test]
    fn test_numeric_text_coerces() {
        let benchmarks = vec![
            entry(
                "CBT_Throughput-optimized",
                "4M Sequential Read",
                Scalar::Text(" 0.5 ".to_string()),
                Scalar::Text("900".to_string()),
            ),
            entry(
                "CBT_Throughput-optimized",
                "4M Sequential Write",
                Scalar::Int(1),
                Scalar::Float(1.5),
            ),
        ];
        let outcome = classify("doc", &benchmarks).unwrap();
        assert!(matches!(
            outcome.classification,
            Classification::Classified { ref results, .. }
                if results.read.cost_usable_tb_mbsec == 0.5 && results.read.mbsec_cluster == 900.0
        ));
    }

    #[test]
    fn test_parse_error_is_fatal_for_document() {
        let mut benchmarks = pair(SuiteKind::Sequential);
        benchmarks[1].mbsec_cluster = Scalar::Text("n/a".to_string());
        let err = classify("2014-05-01_20:00:34_x", &benchmarks).unwrap_err();
        assert_eq!(
            err,
            ClassifyError::Parse {
                document: "2014-05-01_20:00:34_x".to_string(),
                kind: "4M Sequential Write".to_string(),
                field: "mbsec_cluster",
                value: "n/a".to_string(),
            }
        );
    }

    #[test]
    fn test_blank_value_is_parse_error() {
        let mut benchmarks = pair(SuiteKind::Random);
        benchmarks[0].cost_usable_tb_mbsec = Scalar::Null;
        assert!(classify("doc", &benchmarks).is_err());
    }
}
