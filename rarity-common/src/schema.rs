//! Structural checks for token documents
//!
//! Scoring assumes every document has an id and well-formed trait entries.
//! These checks run first and route failures to a [`ValidationReporter`].

use crate::metadata::NftDocument;
use crate::validation::{ValidationError, ValidationFailure, ValidationReporter};
use tracing::debug;

/// Check one document, collecting every failing field
pub fn validate_document(doc: &NftDocument) -> Result<(), ValidationFailure> {
    let mut keys = Vec::new();
    let mut validation_error = ValidationError::default();

    let mut fail = |key: String, message: String| {
        validation_error.insert(key.clone(), message);
        keys.push(key);
    };

    if doc.token_id.trim().is_empty() {
        fail("tokenId".to_string(), "tokenId is required".to_string());
    }

    if doc.attributes.is_empty() {
        fail(
            "attributes".to_string(),
            "at least one attribute is required".to_string(),
        );
    }

    for (i, entry) in doc.attributes.attributes.iter().enumerate() {
        if entry.trait_type.trim().is_empty() {
            fail(
                format!("attributes.{}.trait_type", i),
                format!("attribute {} is missing trait_type", i),
            );
        }
        if entry.value.trim().is_empty() {
            fail(
                format!("attributes.{}.value", i),
                format!("attribute {} is missing value", i),
            );
        }
    }

    if keys.is_empty() {
        Ok(())
    } else {
        Err(ValidationFailure {
            token_id: doc.token_id.clone(),
            keys,
            validation_error,
        })
    }
}

/// Check every document, appending failures to `reporter` in input order.
///
/// Returns the number of documents that failed.
pub fn validate_collection(docs: &[NftDocument], reporter: &mut ValidationReporter) -> usize {
    let mut failed = 0;
    for doc in docs {
        if let Err(failure) = validate_document(doc) {
            debug!(token_id = %failure.token_id, fields = ?failure.keys, "Document failed validation");
            reporter.add_error(failure);
            failed += 1;
        }
    }
    failed
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::{MetadataRecord, TraitEntry};

    fn doc(token_id: &str, attributes: Vec<TraitEntry>) -> NftDocument {
        NftDocument {
            token_id: token_id.to_string(),
            name: None,
            image: None,
            token_uri: None,
            attributes: MetadataRecord::new(attributes),
        }
    }

    #[test]
    fn test_valid_document_passes() {
        let d = doc("1", vec![TraitEntry::new("Background", "Red")]);
        assert!(validate_document(&d).is_ok());
    }

    #[test]
    fn test_missing_token_id_and_attributes() {
        let failure = validate_document(&doc("  ", vec![])).unwrap_err();
        assert_eq!(failure.keys, vec!["tokenId", "attributes"]);
        assert_eq!(
            failure.validation_error.message("tokenId"),
            Some("tokenId is required")
        );
    }

    #[test]
    fn test_blank_entry_fields_reported_by_position() {
        let d = doc(
            "9",
            vec![
                TraitEntry::new("Background", "Red"),
                TraitEntry::new("", "Laser"),
                TraitEntry::new("Hat", ""),
            ],
        );

        let failure = validate_document(&d).unwrap_err();
        assert_eq!(failure.token_id, "9");
        assert_eq!(
            failure.keys,
            vec!["attributes.1.trait_type", "attributes.2.value"]
        );
        assert_eq!(
            failure.validation_error.message("attributes.2.value"),
            Some("attribute 2 is missing value")
        );
    }

    #[test]
    fn test_null_value_from_json_is_reported() {
        let d: NftDocument = serde_json::from_str(
            r#"{"tokenId": "4", "attributes": [{"trait_type": "Hat", "value": null}]}"#,
        )
        .unwrap();
        let failure = validate_document(&d).unwrap_err();
        assert_eq!(failure.keys, vec!["attributes.0.value"]);
    }

    #[test]
    fn test_validate_collection_feeds_reporter() {
        let docs = vec![
            doc("1", vec![TraitEntry::new("Background", "Red")]),
            doc("2", vec![]),
            doc("3", vec![TraitEntry::new("", "Blue")]),
        ];
        let mut reporter = ValidationReporter::new();

        let failed = validate_collection(&docs, &mut reporter);

        assert_eq!(failed, 2);
        let ids: Vec<&str> = reporter
            .get_errors()
            .iter()
            .map(|f| f.token_id.as_str())
            .collect();
        assert_eq!(ids, vec!["2", "3"]);
    }
}
