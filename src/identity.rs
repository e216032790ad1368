//! Stable document identity.

use crate::models::Description;

/// `<date with 'T' replaced by '_'>_<cluster_uuid>`, e.g.
/// `2014-05-01_20:00:34_5e4eeae5-edf4-4d53-8ed5-5675207f9a35`.
///
/// Used both as the file stem in the document store and as the write key
/// in the search index.
pub fn document_id(doc: &Description) -> String {
    format!(
        "{}_{}",
        doc.information.date.replacen('T', "_", 1),
        doc.information.cluster_uuid
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::SuiteKind;
    use crate::normalize::Normalizer;
    use crate::record::tests::sample_row;

    #[test]
    fn test_id_format() {
        let doc = Normalizer::default()
            .normalize_row(&sample_row(), 0, SuiteKind::Sequential)
            .unwrap();
        assert_eq!(
            document_id(&doc),
            "2014-05-01_20:00:34_5e4eeae5-edf4-4d53-8ed5-5675207f9a35"
        );
    }

    #[test]
    fn test_ids_distinct_and_ordered() {
        let normalizer = Normalizer::default();
        let ids: Vec<String> = (0..60)
            .map(|order| {
                let doc = normalizer
                    .normalize_row(&sample_row(), order, SuiteKind::Sequential)
                    .unwrap();
                document_id(&doc)
            })
            .collect();
        for pair in ids.windows(2) {
            assert!(pair[0] < pair[1]);
        }
    }

    #[test]
    fn test_id_is_deterministic() {
        let normalizer = Normalizer::default();
        let a = normalizer
            .normalize_row(&sample_row(), 5, SuiteKind::Sequential)
            .unwrap();
        let b = normalizer
            .normalize_row(&sample_row(), 5, SuiteKind::Sequential)
            .unwrap();
        assert_eq!(document_id(&a), document_id(&b));
    }
}
