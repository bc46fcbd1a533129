use crate::error::QueryError;
use serde::Deserialize;

///
/// CONSTANTS
///

/// Largest bucket count the backend accepts for a terms aggregation.
/// Group-bys request all buckets; callers apply limits after extraction.
pub const MAX_BUCKETS: u32 = i32::MAX.unsigned_abs();

///
/// SearchConfig
///
/// Settings that shape lowered aggregation requests. Filter compilation
/// and name derivation never depend on it.
///

#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct SearchConfig {
    /// Bucket count requested by group-by and distinct aggregations.
    pub max_buckets: u32,

    /// Percentiles requested when a percentile aggregation names none.
    /// Empty leaves the choice to the backend.
    pub default_percents: Vec<f64>,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            max_buckets: MAX_BUCKETS,
            default_percents: Vec::new(),
        }
    }
}

impl SearchConfig {
    /// Parse and validate a TOML config document.
    pub fn from_toml_str(source: &str) -> Result<Self, QueryError> {
        let config: Self =
            toml::from_str(source).map_err(|err| QueryError::config(err.to_string()))?;
        config.validate()?;

        Ok(config)
    }

    pub fn validate(&self) -> Result<(), QueryError> {
        if self.max_buckets == 0 {
            return Err(QueryError::config("max_buckets must be at least 1"));
        }

        if let Some(p) = self
            .default_percents
            .iter()
            .find(|p| !(0.0..=100.0).contains(*p))
        {
            return Err(QueryError::config(format!(
                "percentile {p} is outside 0..=100"
            )));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_yields_defaults() {
        let config = SearchConfig::from_toml_str("").unwrap();

        assert_eq!(config, SearchConfig::default());
        assert_eq!(config.max_buckets, 2_147_483_647);
    }

    #[test]
    fn overrides_are_read() {
        let config =
            SearchConfig::from_toml_str("max_buckets = 100\ndefault_percents = [50.0, 99.0]")
                .unwrap();

        assert_eq!(config.max_buckets, 100);
        assert_eq!(config.default_percents, vec![50.0, 99.0]);
    }

    #[test]
    fn invalid_values_are_rejected() {
        assert!(SearchConfig::from_toml_str("max_buckets = 0").is_err());
        assert!(SearchConfig::from_toml_str("default_percents = [101.0]").is_err());
        assert!(SearchConfig::from_toml_str("unknown = 1").is_err());
    }
}
