//! RediSearch index schema.

use vindex_core::{CreateIndexOptions, Distance};

use super::VECTOR_FIELD;

/// RediSearch `DISTANCE_METRIC` token for a distance.
#[must_use]
pub fn distance_metric(distance: Distance) -> &'static str {
    match distance {
        Distance::Cosine => "COSINE",
        Distance::Euclidean => "L2",
        Distance::Dot => "IP",
    }
}

/// Schema for the vector index: a single FLAT `FLOAT32` vector field over
/// hashes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexSchema {
    pub index_name: String,
    /// Only hashes whose key starts with this prefix are indexed
    pub key_prefix: Option<String>,
    pub dimension: usize,
    pub distance: Distance,
}

impl IndexSchema {
    #[must_use]
    pub fn new(index_name: impl Into<String>, options: &CreateIndexOptions) -> Self {
        Self {
            index_name: index_name.into(),
            key_prefix: None,
            dimension: options.dimension,
            distance: options.distance,
        }
    }

    #[must_use]
    pub fn with_key_prefix(mut self, prefix: impl Into<String>) -> Self {
        let prefix = prefix.into();
        self.key_prefix = (!prefix.is_empty()).then_some(prefix);
        self
    }

    /// `FT.CREATE` arguments.
    #[must_use]
    pub fn args(&self) -> Vec<Vec<u8>> {
        let mut args: Vec<String> = vec![self.index_name.clone(), "ON".into(), "HASH".into()];

        if let Some(prefix) = &self.key_prefix {
            args.extend(["PREFIX".into(), "1".into(), prefix.clone()]);
        }

        args.extend([
            "SCHEMA".into(),
            VECTOR_FIELD.into(),
            "VECTOR".into(),
            "FLAT".into(),
            // number of attribute tokens that follow
            "6".into(),
            "TYPE".into(),
            "FLOAT32".into(),
            "DIM".into(),
            self.dimension.to_string(),
            "DISTANCE_METRIC".into(),
            distance_metric(self.distance).into(),
        ]);

        args.into_iter().map(String::into_bytes).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn as_text(args: Vec<Vec<u8>>) -> Vec<String> {
        args.into_iter()
            .map(|a| String::from_utf8(a).unwrap())
            .collect()
    }

    #[test]
    fn test_distance_metric_tokens() {
        assert_eq!(distance_metric(Distance::Cosine), "COSINE");
        assert_eq!(distance_metric(Distance::Euclidean), "L2");
        assert_eq!(distance_metric(Distance::Dot), "IP");
    }

    #[test]
    fn test_schema_args() {
        let schema = IndexSchema::new("docs", &CreateIndexOptions::new(384, Distance::Cosine));
        assert_eq!(
            as_text(schema.args()).join(" "),
            "docs ON HASH SCHEMA vec VECTOR FLAT 6 TYPE FLOAT32 DIM 384 DISTANCE_METRIC COSINE"
        );
    }

    #[test]
    fn test_schema_args_with_prefix() {
        let schema = IndexSchema::new("docs", &CreateIndexOptions::new(3, Distance::Euclidean))
            .with_key_prefix("doc:");
        assert_eq!(
            as_text(schema.args()).join(" "),
            "docs ON HASH PREFIX 1 doc: SCHEMA vec VECTOR FLAT 6 TYPE FLOAT32 DIM 3 DISTANCE_METRIC L2"
        );
    }

    #[test]
    fn test_empty_prefix_is_ignored() {
        let schema = IndexSchema::new("docs", &CreateIndexOptions::new(3, Distance::Dot))
            .with_key_prefix("");
        assert!(schema.key_prefix.is_none());
    }
}
