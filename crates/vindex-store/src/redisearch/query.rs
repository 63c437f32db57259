//! KNN query construction.

use vindex_core::{FieldFilter, NumericBound, RedisFilter};

use super::{SCORE_FIELD, VECTOR_FIELD};

/// Name of the bound query-vector parameter.
pub const QUERY_VECTOR_PARAM: &str = "query_vector";

/// Query dialect the KNN syntax requires.
pub const DIALECT: u32 = 2;

/// A K-nearest-neighbor `FT.SEARCH` request.
///
/// The query vector is always passed as a bound parameter, never inlined in
/// the query string.
#[derive(Debug, Clone, PartialEq)]
pub struct KnnQuery {
    pub top_k: usize,
    /// Packed little-endian `f32` bytes
    pub vector: Vec<u8>,
    pub filter: RedisFilter,
    pub with_payloads: bool,
}

impl KnnQuery {
    #[must_use]
    pub fn new(top_k: usize, vector: Vec<u8>) -> Self {
        Self {
            top_k,
            vector,
            filter: RedisFilter::default(),
            with_payloads: true,
        }
    }

    #[must_use]
    pub fn with_filter(mut self, filter: RedisFilter) -> Self {
        self.filter = filter;
        self
    }

    /// The query string, e.g. `(*)=>[KNN 4 @vec $query_vector]`.
    #[must_use]
    pub fn query_string(&self) -> String {
        let base = self.filter.prefilter.as_deref().unwrap_or("*");
        format!(
            "({base})=>[KNN {} @{VECTOR_FIELD} ${QUERY_VECTOR_PARAM}]",
            self.top_k
        )
    }

    /// `FT.SEARCH` arguments after the index name.
    #[must_use]
    pub fn args(&self) -> Vec<Vec<u8>> {
        let mut args: Vec<Vec<u8>> = vec![self.query_string().into_bytes()];
        let mut push = |s: &str| args.push(s.as_bytes().to_vec());

        for clause in &self.filter.fields {
            match clause {
                FieldFilter::Numeric { field, min, max } => {
                    push("FILTER");
                    push(field.as_str());
                    push(&render_bound(*min, "-inf"));
                    push(&render_bound(*max, "+inf"));
                }
                FieldFilter::Geo {
                    field,
                    longitude,
                    latitude,
                    radius,
                    unit,
                } => {
                    push("GEOFILTER");
                    push(field.as_str());
                    push(&longitude.to_string());
                    push(&latitude.to_string());
                    push(&radius.to_string());
                    push(unit.as_str());
                }
            }
        }

        if self.with_payloads {
            push("WITHPAYLOADS");
        }

        push("SORTBY");
        push(SCORE_FIELD);
        push("ASC");
        push("LIMIT");
        push("0");
        push(&self.top_k.to_string());
        push("PARAMS");
        push("2");
        push(QUERY_VECTOR_PARAM);
        args.push(self.vector.clone());
        args.push(b"DIALECT".to_vec());
        args.push(DIALECT.to_string().into_bytes());

        args
    }
}

fn render_bound(bound: NumericBound, unbounded: &str) -> String {
    match bound {
        NumericBound::Unbounded => unbounded.to_string(),
        NumericBound::Inclusive(value) => value.to_string(),
        NumericBound::Exclusive(value) => format!("({value}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vindex_core::{codec, GeoUnit};

    fn text_args(query: &KnnQuery) -> Vec<String> {
        query
            .args()
            .into_iter()
            .map(|a| String::from_utf8_lossy(&a).into_owned())
            .collect()
    }

    #[test]
    fn test_query_string() {
        let query = KnnQuery::new(3, codec::encode(&[1.0]));
        assert_eq!(query.query_string(), "(*)=>[KNN 3 @vec $query_vector]");
    }

    #[test]
    fn test_query_string_with_prefilter() {
        let query = KnnQuery::new(5, vec![])
            .with_filter(RedisFilter::new().with_prefilter("@lang:{rust}"));
        assert_eq!(
            query.query_string(),
            "(@lang:{rust})=>[KNN 5 @vec $query_vector]"
        );
    }

    #[test]
    fn test_args_shape() {
        let vector = codec::encode(&[0.5, -0.5]);
        let query = KnnQuery::new(3, vector.clone());
        let args = query.args();

        let expected_tail: Vec<&[u8]> = vec![
            &b"WITHPAYLOADS"[..],
            &b"SORTBY"[..],
            &b"__vec_score"[..],
            &b"ASC"[..],
            &b"LIMIT"[..],
            &b"0"[..],
            &b"3"[..],
            &b"PARAMS"[..],
            &b"2"[..],
            &b"query_vector"[..],
            &vector[..],
            &b"DIALECT"[..],
            &b"2"[..],
        ];
        assert_eq!(args[0], b"(*)=>[KNN 3 @vec $query_vector]".to_vec());
        assert_eq!(
            args[1..].iter().map(Vec::as_slice).collect::<Vec<_>>(),
            expected_tail
        );
    }

    #[test]
    fn test_vector_is_bound_not_inlined() {
        let vector = codec::encode(&[1.0, 2.0, 3.0]);
        let query = KnnQuery::new(1, vector.clone());
        let args = query.args();

        let position = args.iter().position(|a| a == b"query_vector").unwrap();
        assert_eq!(args[position + 1], vector);
        assert!(!query.query_string().contains("1.0"));
    }

    #[test]
    fn test_numeric_filter_args() {
        let filter = RedisFilter::new()
            .with_numeric("year", NumericBound::Inclusive(2020.0), NumericBound::Unbounded)
            .with_numeric("price", NumericBound::Exclusive(1.5), NumericBound::Exclusive(9.0));
        let args = text_args(&KnnQuery::new(2, vec![]).with_filter(filter));

        assert_eq!(&args[1..5], &["FILTER", "year", "2020", "+inf"]);
        assert_eq!(&args[5..9], &["FILTER", "price", "(1.5", "(9"]);
    }

    #[test]
    fn test_geo_filter_args() {
        let filter = RedisFilter::new().with_geo("loc", 12.5, 41.9, 10.0, GeoUnit::Kilometers);
        let args = text_args(&KnnQuery::new(2, vec![]).with_filter(filter));

        assert_eq!(
            &args[1..7],
            &["GEOFILTER", "loc", "12.5", "41.9", "10", "km"]
        );
    }

    #[test]
    fn test_without_payloads() {
        let mut query = KnnQuery::new(2, vec![]);
        query.with_payloads = false;
        assert!(!text_args(&query).contains(&"WITHPAYLOADS".to_string()));
    }
}
