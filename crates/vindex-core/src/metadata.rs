//! Metadata helpers shared by backends.

use crate::types::Metadata;

/// Reserved metadata key holding the record's source text.
pub const CONTENT_KEY: &str = "content";

/// Copy `metadata`, leaving out `excluded` keys.
///
/// The result never aliases the input.
#[must_use]
pub fn copy_without(metadata: &Metadata, excluded: &[&str]) -> Metadata {
    metadata
        .iter()
        .filter(|(key, _)| !excluded.contains(&key.as_str()))
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect()
}

/// Copy metadata for a caller, dropping the content key unless requested.
#[must_use]
pub fn for_caller(metadata: &Metadata, include_content: bool) -> Metadata {
    if include_content {
        metadata.clone()
    } else {
        copy_without(metadata, &[CONTENT_KEY])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample() -> Metadata {
        let mut metadata = Metadata::new();
        metadata.insert(CONTENT_KEY.to_string(), json!("hello"));
        metadata.insert("tag".to_string(), json!("x"));
        metadata
    }

    #[test]
    fn test_copy_without() {
        let original = sample();
        let copy = copy_without(&original, &["tag"]);

        assert_eq!(copy.len(), 1);
        assert!(copy.contains_key(CONTENT_KEY));
        assert_eq!(original.len(), 2);
    }

    #[test]
    fn test_for_caller_strips_content() {
        let copy = for_caller(&sample(), false);
        assert_eq!(copy.len(), 1);
        assert_eq!(copy.get("tag"), Some(&json!("x")));
    }

    #[test]
    fn test_for_caller_keeps_content() {
        let copy = for_caller(&sample(), true);
        assert_eq!(copy, sample());
    }
}
