//! Request parameter assembly (`q`, `fq`, `fl`, `sort`, `group.*`, `facet.*`).

use super::{QueryCompiler, RenderContext};
use crate::error::{Error, Result};
use crate::facet::FacetOptions;
use crate::group::GroupOptions;
use crate::named::NamedObjectsQuery;
use crate::query::{Query, Sort};
use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;

/// Ordered multi-map of Solr request parameters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SolrParams {
    entries: Vec<(String, String)>,
}

impl SolrParams {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a value; earlier values under the same name are kept.
    pub fn add(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.entries.push((name.into(), value.into()));
    }

    /// Replace every value under `name` with a single one.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        self.entries.retain(|(existing, _)| *existing != name);
        self.entries.push((name, value.into()));
    }

    /// First value under `name`.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(existing, _)| existing == name)
            .map(|(_, value)| value.as_str())
    }

    pub fn get_all(&self, name: &str) -> Vec<&str> {
        self.entries
            .iter()
            .filter(|(existing, _)| existing == name)
            .map(|(_, value)| value.as_str())
            .collect()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.iter().any(|(existing, _)| existing == name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries
            .iter()
            .map(|(name, value)| (name.as_str(), value.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// `name=value&...`, URL-encoded, in insertion order.
    pub fn to_query_string(&self) -> String {
        self.entries
            .iter()
            .map(|(name, value)| {
                format!(
                    "{}={}",
                    urlencoding::encode(name),
                    urlencoding::encode(value)
                )
            })
            .collect::<Vec<_>>()
            .join("&")
    }

    /// JSON object; repeated names become arrays.
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or(serde_json::Value::Null)
    }

    fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = Vec::new();
        for (name, _) in &self.entries {
            if !names.contains(&name.as_str()) {
                names.push(name);
            }
        }
        names
    }
}

impl Serialize for SolrParams {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let names = self.names();
        let mut map = serializer.serialize_map(Some(names.len()))?;
        for name in names {
            let values = self.get_all(name);
            match values.as_slice() {
                [single] => map.serialize_entry(name, single)?,
                many => map.serialize_entry(name, many)?,
            }
        }
        map.end()
    }
}

/// Compiled request: parameters plus the names given to group functions
/// and group queries.
#[derive(Debug, Clone)]
pub struct CompiledQuery {
    params: SolrParams,
    named: NamedObjectsQuery,
}

impl CompiledQuery {
    pub fn params(&self) -> &SolrParams {
        &self.params
    }

    /// Group-by functions and queries keyed by their rendered fragment.
    pub fn named(&self) -> &NamedObjectsQuery {
        &self.named
    }

    pub fn into_params(self) -> SolrParams {
        self.params
    }
}

impl QueryCompiler {
    pub fn compile(&self, query: &Query) -> Result<CompiledQuery> {
        self.compile_for(query, None)
    }

    /// Compile with field names resolved for `domain_type`.
    pub fn compile_for(&self, query: &Query, domain_type: Option<&str>) -> Result<CompiledQuery> {
        query.validate()?;
        let ctx = RenderContext::new(domain_type);
        let mut params = SolrParams::new();
        let mut named = NamedObjectsQuery::new(query.clone());

        params.add("q", self.get_query_string(query.criteria(), &ctx)?);

        for filter in query.filter_queries() {
            if let Some(fq) = self.create_query_string_from_node(filter, &ctx)? {
                params.add("fq", fq);
            }
        }

        self.append_projection(&mut params, query, &ctx)?;

        if !query.sort().is_empty() {
            params.add("sort", self.sort_string(query.sort(), &ctx)?);
        }

        if let Some(offset) = query.offset() {
            params.add("start", offset.to_string());
        }
        if let Some(rows) = query.rows().or(self.config().default_rows) {
            params.add("rows", rows.to_string());
        }
        if let Some(operator) = query.default_operator().or(self.config().default_operator) {
            params.add("q.op", operator.as_str());
        }
        if let Some(def_type) = query.def_type() {
            params.add("defType", def_type);
        }
        if let Some(handler) = query.request_handler() {
            params.add("qt", handler);
        }
        if let Some(millis) = query.time_allowed() {
            params.add("timeAllowed", millis.to_string());
        }

        if let Some(options) = query.group_options() {
            self.append_group_params(&mut params, &mut named, options, &ctx)?;
        }
        if let Some(options) = query.facet_options() {
            self.append_facet_params(&mut params, options, &ctx)?;
        }

        tracing::debug!(
            domain_type = domain_type,
            q = params.get("q"),
            params = params.len(),
            "Query compiled"
        );

        Ok(CompiledQuery { params, named })
    }

    fn append_projection(
        &self,
        params: &mut SolrParams,
        query: &Query,
        ctx: &RenderContext<'_>,
    ) -> Result<()> {
        let mut fields = Vec::with_capacity(query.projection().len() + query.calculated_fields().len());
        for field in query.projection() {
            fields.push(self.mapped_field_name(field, ctx)?);
        }
        for calculated in query.calculated_fields() {
            fields.push(self.create_calculated_field_fragment(calculated, ctx)?);
        }
        if !fields.is_empty() {
            params.add("fl", fields.join(","));
        }
        Ok(())
    }

    fn sort_string(&self, sort: &Sort, ctx: &RenderContext<'_>) -> Result<String> {
        let orders = sort
            .orders()
            .iter()
            .map(|order| {
                Ok(format!(
                    "{} {}",
                    self.mapped_field_name(&order.field, ctx)?,
                    order.direction.as_str()
                ))
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(orders.join(","))
    }

    fn append_group_params(
        &self,
        params: &mut SolrParams,
        named: &mut NamedObjectsQuery,
        options: &GroupOptions,
        ctx: &RenderContext<'_>,
    ) -> Result<()> {
        if !options.has_group_by() {
            return Err(Error::invalid(
                "At least one field, function or query must be set for grouping",
            ));
        }

        params.add("group", "true");
        for field in options.group_by_fields() {
            params.add("group.field", self.mapped_field_name(field, ctx)?);
        }
        for function in options.group_by_functions() {
            let fragment = self.create_function_fragment(function, 0, ctx)?;
            named.set_name(function.clone(), fragment.clone())?;
            params.add("group.func", fragment);
        }
        for group_query in options.group_by_queries() {
            let fragment = self.get_query_string(group_query.criteria(), ctx)?;
            named.set_name(group_query.clone(), fragment.clone())?;
            params.add("group.query", fragment);
        }

        if let Some(limit) = options.limit() {
            params.add("group.limit", limit.to_string());
        }
        if let Some(offset) = options.offset() {
            params.add("group.offset", offset.to_string());
        }
        if !options.sort().is_empty() {
            params.add("group.sort", self.sort_string(options.sort(), ctx)?);
        }
        if options.is_total_count() {
            params.add("group.ngroups", "true");
        }
        if options.is_group_main() {
            params.add("group.main", "true");
        }
        if options.is_group_facets() {
            params.add("group.facet", "true");
        }
        if options.is_truncate_facets() {
            params.add("group.truncate", "true");
        }
        if options.cache_percent() > 0 {
            params.add("group.cache.percent", options.cache_percent().to_string());
        }
        Ok(())
    }

    fn append_facet_params(
        &self,
        params: &mut SolrParams,
        options: &FacetOptions,
        ctx: &RenderContext<'_>,
    ) -> Result<()> {
        if !options.has_facets() {
            return Ok(());
        }

        params.add("facet", "true");
        for field in options.facet_on_fields() {
            params.add("facet.field", self.mapped_field_name(field, ctx)?);
        }
        for facet_query in options.facet_queries() {
            params.add("facet.query", self.get_query_string(facet_query, ctx)?);
        }
        params.add("facet.limit", options.limit().to_string());
        params.add("facet.mincount", options.min_count().to_string());
        params.add("facet.sort", options.sort().as_str());
        if let Some(prefix) = options.prefix() {
            params.add("facet.prefix", prefix);
        }
        if let Some(offset) = options.offset() {
            params.add("facet.offset", offset.to_string());
        }
        if options.is_missing() {
            params.add("facet.missing", "true");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_params_keep_order_and_repeats() {
        let mut params = SolrParams::new();
        params.add("q", "*:*");
        params.add("fq", "a:1");
        params.add("fq", "b:2");
        assert_eq!(params.get("fq"), Some("a:1"));
        assert_eq!(params.get_all("fq"), vec!["a:1", "b:2"]);

        params.set("fq", "c:3");
        assert_eq!(params.get_all("fq"), vec!["c:3"]);
        assert_eq!(params.len(), 2);
    }

    #[test]
    fn test_query_string_is_url_encoded() {
        let mut params = SolrParams::new();
        params.add("q", "title:\"a b\"");
        params.add("rows", "10");
        assert_eq!(
            params.to_query_string(),
            "q=title%3A%22a%20b%22&rows=10"
        );
    }

    #[test]
    fn test_json_groups_repeated_names() {
        let mut params = SolrParams::new();
        params.add("q", "*:*");
        params.add("fq", "a:1");
        params.add("fq", "b:2");
        assert_eq!(
            params.to_json(),
            serde_json::json!({"q": "*:*", "fq": ["a:1", "b:2"]})
        );
    }
}
