//! Faceting (`facet.*` parameters) and facet query result entries.

use crate::criteria::Node;
use crate::error::Result;
use crate::field::Field;
use crate::query::Query;
use serde::{Deserialize, Serialize};

const DEFAULT_FACET_LIMIT: u32 = 10;
const DEFAULT_FACET_MIN_COUNT: u32 = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FacetSort {
    #[default]
    Count,
    Index,
}

impl FacetSort {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Count => "count",
            Self::Index => "index",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FacetOptions {
    fields: Vec<Field>,
    queries: Vec<Node>,
    limit: u32,
    min_count: u32,
    sort: FacetSort,
    prefix: Option<String>,
    offset: Option<u32>,
    missing: bool,
}

impl Default for FacetOptions {
    fn default() -> Self {
        Self {
            fields: Vec::new(),
            queries: Vec::new(),
            limit: DEFAULT_FACET_LIMIT,
            min_count: DEFAULT_FACET_MIN_COUNT,
            sort: FacetSort::default(),
            prefix: None,
            offset: None,
            missing: false,
        }
    }
}

impl FacetOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_facet_on_field(mut self, name: &str) -> Result<Self> {
        self.fields.push(Field::new(name)?);
        Ok(self)
    }

    pub fn add_facet_query(mut self, query: impl Into<Node>) -> Self {
        self.queries.push(query.into());
        self
    }

    pub fn set_limit(mut self, limit: u32) -> Self {
        self.limit = limit;
        self
    }

    pub fn set_min_count(mut self, min_count: u32) -> Self {
        self.min_count = min_count;
        self
    }

    pub fn set_sort(mut self, sort: FacetSort) -> Self {
        self.sort = sort;
        self
    }

    pub fn set_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = Some(prefix.into());
        self
    }

    pub fn set_offset(mut self, offset: u32) -> Self {
        self.offset = Some(offset);
        self
    }

    pub fn set_missing(mut self, missing: bool) -> Self {
        self.missing = missing;
        self
    }

    pub fn facet_on_fields(&self) -> &[Field] {
        &self.fields
    }

    pub fn facet_queries(&self) -> &[Node] {
        &self.queries
    }

    pub fn limit(&self) -> u32 {
        self.limit
    }

    pub fn min_count(&self) -> u32 {
        self.min_count
    }

    pub fn sort(&self) -> FacetSort {
        self.sort
    }

    pub fn prefix(&self) -> Option<&str> {
        self.prefix.as_deref().filter(|p| !p.is_empty())
    }

    pub fn offset(&self) -> Option<u32> {
        self.offset
    }

    pub fn is_missing(&self) -> bool {
        self.missing
    }

    pub fn has_facets(&self) -> bool {
        !(self.fields.is_empty() && self.queries.is_empty())
    }
}

/// Count reported by Solr for one `facet.query`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FacetQueryEntry {
    value: String,
    count: u64,
}

impl FacetQueryEntry {
    pub fn new(value: impl Into<String>, count: u64) -> Self {
        Self {
            value: value.into(),
            count,
        }
    }

    pub fn key(&self) -> &str {
        &self.value
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn count(&self) -> u64 {
        self.count
    }

    /// Filter query selecting the documents counted by this entry.
    pub fn query(&self) -> Query {
        Query::new(Node::raw(self.value.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let options = FacetOptions::new();
        assert_eq!(options.limit(), 10);
        assert_eq!(options.min_count(), 1);
        assert_eq!(options.sort(), FacetSort::Count);
        assert!(!options.has_facets());
    }

    #[test]
    fn test_entry_query_is_raw_value() {
        let entry = FacetQueryEntry::new("price:[* TO 10]", 3);
        assert_eq!(entry.key(), "price:[* TO 10]");
        assert_eq!(entry.count(), 3);
        assert_eq!(entry.query().criteria(), &Node::raw("price:[* TO 10]"));
    }
}
