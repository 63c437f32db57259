//! Backend-native search filters.
//!
//! A filter is opaque to the [`Index`](crate::Index) contract: each backend
//! accepts exactly one [`Filter`] variant and rejects the others with
//! [`IndexError::Config`](crate::IndexError::Config).

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

use crate::types::Metadata;

/// A search filter, tagged by the backend that understands it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "backend", rename_all = "snake_case")]
pub enum Filter {
    /// RediSearch query filters
    Redis(RedisFilter),
    /// Exact-match metadata conditions, evaluated in process
    Metadata(MetadataFilter),
}

impl Filter {
    /// Name of the variant, for error messages.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Redis(_) => "redis",
            Self::Metadata(_) => "metadata",
        }
    }
}

impl From<RedisFilter> for Filter {
    fn from(filter: RedisFilter) -> Self {
        Self::Redis(filter)
    }
}

impl From<MetadataFilter> for Filter {
    fn from(filter: MetadataFilter) -> Self {
        Self::Metadata(filter)
    }
}

// ============================================================================
// RediSearch
// ============================================================================

/// Filters applied to a RediSearch KNN query.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RedisFilter {
    /// Query expression that replaces `*` on the left of the KNN clause,
    /// e.g. `@lang:{rust}`.
    #[serde(default)]
    pub prefilter: Option<String>,
    /// `FILTER` / `GEOFILTER` clauses
    #[serde(default)]
    pub fields: Vec<FieldFilter>,
}

impl RedisFilter {
    /// Create an empty filter (matches all).
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the pre-filter query expression.
    #[must_use]
    pub fn with_prefilter(mut self, expression: impl Into<String>) -> Self {
        self.prefilter = Some(expression.into());
        self
    }

    /// Add a numeric range clause.
    #[must_use]
    pub fn with_numeric(
        mut self,
        field: impl Into<String>,
        min: NumericBound,
        max: NumericBound,
    ) -> Self {
        self.fields.push(FieldFilter::Numeric {
            field: field.into(),
            min,
            max,
        });
        self
    }

    /// Add a geo radius clause.
    #[must_use]
    pub fn with_geo(
        mut self,
        field: impl Into<String>,
        longitude: f64,
        latitude: f64,
        radius: f64,
        unit: GeoUnit,
    ) -> Self {
        self.fields.push(FieldFilter::Geo {
            field: field.into(),
            longitude,
            latitude,
            radius,
            unit,
        });
        self
    }

    /// Returns true if the filter is empty (matches all).
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.prefilter.is_none() && self.fields.is_empty()
    }
}

/// A single field clause.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FieldFilter {
    Numeric {
        field: String,
        min: NumericBound,
        max: NumericBound,
    },
    Geo {
        field: String,
        longitude: f64,
        latitude: f64,
        radius: f64,
        unit: GeoUnit,
    },
}

/// One end of a numeric range.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NumericBound {
    #[default]
    Unbounded,
    Inclusive(f64),
    Exclusive(f64),
}

/// Distance unit for geo clauses.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GeoUnit {
    #[default]
    Meters,
    Kilometers,
    Feet,
    Miles,
}

impl GeoUnit {
    /// RediSearch unit token.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Meters => "m",
            Self::Kilometers => "km",
            Self::Feet => "ft",
            Self::Miles => "mi",
        }
    }
}

// ============================================================================
// Metadata
// ============================================================================

/// Exact-equality conditions on metadata keys. All must hold.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MetadataFilter {
    pub equals: HashMap<String, Value>,
}

impl MetadataFilter {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Require `key` to equal `value`.
    #[must_use]
    pub fn with_eq(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.equals.insert(key.into(), value.into());
        self
    }

    /// Check a record's metadata against every condition.
    #[must_use]
    pub fn matches(&self, metadata: &Metadata) -> bool {
        self.equals
            .iter()
            .all(|(key, expected)| metadata.get(key) == Some(expected))
    }
}
