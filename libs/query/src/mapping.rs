//! Domain property → Solr field name resolution.

use crate::error::{Error, Result};
use crate::field::Field;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Maps a domain property to the Solr field it is stored in.
///
/// Consulted for every field the compiler renders: criteria, function
/// arguments, sort, projection, group and facet fields.
pub trait FieldNameResolver: Send + Sync {
    fn resolve(&self, domain_type: Option<&str>, field: &Field) -> String;
}

/// Static per-domain mapping table, e.g. loaded from configuration:
///
/// ```json
/// { "Product": { "title": "title_t", "price": "price_d" } }
/// ```
///
/// Unmapped properties (and calls without a domain type) keep their name.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldMappings {
    domains: HashMap<String, HashMap<String, String>>,
}

impl FieldMappings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a mapping; the target must not be blank.
    pub fn map(
        mut self,
        domain_type: impl Into<String>,
        property: impl Into<String>,
        solr_field: impl Into<String>,
    ) -> Result<Self> {
        let solr_field = solr_field.into();
        if solr_field.trim().is_empty() {
            return Err(Error::Config("Mapped field name must not be blank".into()));
        }
        self.domains
            .entry(domain_type.into())
            .or_default()
            .insert(property.into(), solr_field);
        Ok(self)
    }

    pub fn is_empty(&self) -> bool {
        self.domains.values().all(HashMap::is_empty)
    }

    pub(crate) fn validate(&self) -> Result<()> {
        for (domain, properties) in &self.domains {
            for (property, target) in properties {
                if target.trim().is_empty() {
                    return Err(Error::Config(format!(
                        "Field mapping {}.{} has a blank target",
                        domain, property
                    )));
                }
            }
        }
        Ok(())
    }
}

impl FieldNameResolver for FieldMappings {
    fn resolve(&self, domain_type: Option<&str>, field: &Field) -> String {
        domain_type
            .and_then(|domain| self.domains.get(domain))
            .and_then(|properties| properties.get(field.name()))
            .cloned()
            .unwrap_or_else(|| field.name().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolves_per_domain() {
        let mappings = FieldMappings::new()
            .map("Product", "title", "title_t")
            .unwrap();
        let title = Field::new("title").unwrap();

        assert_eq!(mappings.resolve(Some("Product"), &title), "title_t");
        assert_eq!(mappings.resolve(Some("Order"), &title), "title");
        assert_eq!(mappings.resolve(None, &title), "title");
    }

    #[test]
    fn test_blank_target_rejected() {
        assert!(FieldMappings::new().map("Product", "title", " ").is_err());

        let loaded: FieldMappings =
            serde_json::from_str(r#"{"Product": {"title": ""}}"#).unwrap();
        assert!(matches!(loaded.validate(), Err(Error::Config(_))));
    }
}
