//! Compiler configuration
//!
//! Plain serde data: the CLI fills it from a settings file and environment
//! variables, library users usually build it in code.

use crate::error::{Error, Result};
use crate::mapping::FieldMappings;
use crate::query::Operator;
use serde::{Deserialize, Serialize};

const DEFAULT_DATE_FRACTION_DIGITS: u8 = 3;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompilerConfig {
    /// `rows` sent when a query sets none.
    pub default_rows: Option<u32>,
    /// `q.op` sent when a query sets none.
    pub default_operator: Option<Operator>,
    /// Fractional second digits of rendered dates (0, 3, 6 or 9).
    pub date_fraction_digits: u8,
    /// Reject known function names called with the wrong number of arguments.
    pub strict_functions: bool,
    /// Per-domain property → Solr field mappings.
    pub fields: FieldMappings,
}

impl Default for CompilerConfig {
    fn default() -> Self {
        Self {
            default_rows: None,
            default_operator: None,
            date_fraction_digits: DEFAULT_DATE_FRACTION_DIGITS,
            strict_functions: false,
            fields: FieldMappings::default(),
        }
    }
}

impl CompilerConfig {
    pub fn validate(&self) -> Result<()> {
        if !matches!(self.date_fraction_digits, 0 | 3 | 6 | 9) {
            return Err(Error::Config(format!(
                "date_fraction_digits must be one of 0, 3, 6, 9 (got {})",
                self.date_fraction_digits
            )));
        }
        if self.default_rows == Some(0) {
            return Err(Error::Config(
                "default_rows must be greater than zero".into(),
            ));
        }
        self.fields.validate()
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| Error::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = CompilerConfig::default();
        assert_eq!(config.date_fraction_digits, 3);
        assert!(!config.strict_functions);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config = CompilerConfig::from_json_str(
            r#"{"default_rows": 25, "fields": {"Product": {"title": "title_t"}}}"#,
        )
        .unwrap();
        assert_eq!(config.default_rows, Some(25));
        assert_eq!(config.date_fraction_digits, 3);
        assert!(!config.fields.is_empty());
    }

    #[test]
    fn test_invalid_values_rejected() {
        assert!(CompilerConfig::from_json_str(r#"{"date_fraction_digits": 2}"#).is_err());
        assert!(CompilerConfig::from_json_str(r#"{"default_rows": 0}"#).is_err());
        assert!(CompilerConfig::from_json_str("not json").is_err());
    }
}
