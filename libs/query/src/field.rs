//! Named document property referenced by criteria, functions, sorts and projections.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Field {
    name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    boost: Option<f32>,
}

impl Field {
    /// Fails on an empty or blank name.
    pub fn new(name: impl Into<String>) -> Result<Self> {
        let field = Self {
            name: name.into(),
            boost: None,
        };
        field.validate()?;
        Ok(field)
    }

    /// Boost applied to criteria on this field that carry no boost of their own.
    pub fn with_boost(mut self, boost: f32) -> Self {
        self.boost = Some(boost);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn boost(&self) -> Option<f32> {
        self.boost
    }

    /// Deserialized fields bypass [`Field::new`], so the compiler re-checks.
    pub(crate) fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(Error::invalid("Field name must not be null or blank"));
        }
        Ok(())
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}
