//! Result grouping (`group.*` parameters).

use crate::error::{Error, Result};
use crate::field::Field;
use crate::function::Function;
use crate::query::{Query, Sort};
use serde::{Deserialize, Serialize};

/// Grouping by fields, function values and/or queries.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GroupOptions {
    fields: Vec<Field>,
    functions: Vec<Function>,
    queries: Vec<Query>,
    limit: Option<i32>,
    offset: Option<u32>,
    sort: Sort,
    total_count: bool,
    group_main: bool,
    group_facets: bool,
    truncate: bool,
    cache_percent: u8,
}

impl GroupOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_group_by_field(mut self, name: &str) -> Result<Self> {
        self.fields.push(Field::new(name)?);
        Ok(self)
    }

    pub fn add_group_by_function(mut self, function: Function) -> Self {
        self.functions.push(function);
        self
    }

    pub fn add_group_by_query(mut self, query: Query) -> Self {
        self.queries.push(query);
        self
    }

    /// Documents per group; `-1` returns all of them.
    pub fn set_limit(mut self, limit: i32) -> Result<Self> {
        check_limit(limit)?;
        self.limit = Some(limit);
        Ok(self)
    }

    pub fn set_offset(mut self, offset: u32) -> Self {
        self.offset = Some(offset);
        self
    }

    pub fn add_sort(mut self, sort: Sort) -> Self {
        self.sort = std::mem::take(&mut self.sort).and(sort);
        self
    }

    /// Request the number of matching groups (`group.ngroups`).
    pub fn set_total_count(mut self, total_count: bool) -> Self {
        self.total_count = total_count;
        self
    }

    pub fn set_group_main(mut self, group_main: bool) -> Self {
        self.group_main = group_main;
        self
    }

    pub fn set_group_facets(mut self, group_facets: bool) -> Self {
        self.group_facets = group_facets;
        self
    }

    pub fn set_truncate_facets(mut self, truncate: bool) -> Self {
        self.truncate = truncate;
        self
    }

    pub fn set_cache_percent(mut self, percent: u8) -> Result<Self> {
        check_cache_percent(percent)?;
        self.cache_percent = percent;
        Ok(self)
    }

    pub fn group_by_fields(&self) -> &[Field] {
        &self.fields
    }

    pub fn group_by_functions(&self) -> &[Function] {
        &self.functions
    }

    pub fn group_by_queries(&self) -> &[Query] {
        &self.queries
    }

    pub fn limit(&self) -> Option<i32> {
        self.limit
    }

    pub fn offset(&self) -> Option<u32> {
        self.offset
    }

    pub fn sort(&self) -> &Sort {
        &self.sort
    }

    pub fn is_total_count(&self) -> bool {
        self.total_count
    }

    pub fn is_group_main(&self) -> bool {
        self.group_main
    }

    pub fn is_group_facets(&self) -> bool {
        self.group_facets
    }

    pub fn is_truncate_facets(&self) -> bool {
        self.truncate
    }

    pub fn cache_percent(&self) -> u8 {
        self.cache_percent
    }

    pub fn has_group_by(&self) -> bool {
        !(self.fields.is_empty() && self.functions.is_empty() && self.queries.is_empty())
    }

    /// Bounds checks for options that were deserialized rather than built.
    pub(crate) fn validate(&self) -> Result<()> {
        if let Some(limit) = self.limit {
            check_limit(limit)?;
        }
        check_cache_percent(self.cache_percent)?;
        self.queries.iter().try_for_each(Query::validate)
    }
}

fn check_limit(limit: i32) -> Result<()> {
    if limit < -1 {
        return Err(Error::invalid("Group limit must be -1 or greater"));
    }
    Ok(())
}

fn check_cache_percent(percent: u8) -> Result<()> {
    if percent > 100 {
        return Err(Error::invalid("Cache percent must be between 0 and 100"));
    }
    Ok(())
}
