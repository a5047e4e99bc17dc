//! Query aggregate: the criteria tree plus everything that travels with it.

use crate::criteria::Node;
use crate::error::{Error, Result};
use crate::facet::FacetOptions;
use crate::field::Field;
use crate::function::Function;
use crate::group::GroupOptions;
use serde::{Deserialize, Serialize};

/// Default boolean operator (`q.op`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Operator {
    And,
    Or,
}

impl Operator {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::And => "AND",
            Self::Or => "OR",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    #[default]
    Asc,
    Desc,
}

impl Direction {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Asc => "asc",
            Self::Desc => "desc",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub field: Field,
    #[serde(default)]
    pub direction: Direction,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Sort {
    orders: Vec<Order>,
}

impl Sort {
    pub fn by(field: &str, direction: Direction) -> Result<Self> {
        Self::default().then(field, direction)
    }

    pub fn then(mut self, field: &str, direction: Direction) -> Result<Self> {
        self.orders.push(Order {
            field: Field::new(field)?,
            direction,
        });
        Ok(self)
    }

    pub fn and(mut self, other: Sort) -> Self {
        self.orders.extend(other.orders);
        self
    }

    pub fn orders(&self) -> &[Order] {
        &self.orders
    }

    pub fn is_empty(&self) -> bool {
        self.orders.is_empty()
    }
}

/// Output column computed by a function, optionally aliased.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalculatedField {
    #[serde(default)]
    alias: Option<String>,
    function: Function,
}

impl CalculatedField {
    pub fn new(alias: Option<&str>, function: Function) -> Self {
        Self {
            alias: alias.map(str::to_string),
            function,
        }
    }

    /// Alias when present and not blank.
    pub fn alias(&self) -> Option<&str> {
        self.alias.as_deref().filter(|a| !a.trim().is_empty())
    }

    pub fn function(&self) -> &Function {
        &self.function
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Query {
    criteria: Node,
    filter_queries: Vec<Node>,
    projection: Vec<Field>,
    calculated_fields: Vec<CalculatedField>,
    sort: Sort,
    offset: Option<u64>,
    rows: Option<u32>,
    group_options: Option<GroupOptions>,
    facet_options: Option<FacetOptions>,
    default_operator: Option<Operator>,
    def_type: Option<String>,
    request_handler: Option<String>,
    time_allowed: Option<u32>,
}

impl Query {
    pub fn new(criteria: impl Into<Node>) -> Self {
        Self {
            criteria: criteria.into(),
            ..Self::default()
        }
    }

    pub fn criteria(&self) -> &Node {
        &self.criteria
    }

    pub fn add_criteria(mut self, criteria: impl Into<Node>) -> Self {
        let current = std::mem::take(&mut self.criteria);
        self.criteria = match current {
            Node::Group(group) if group.clauses.is_empty() && !group.negating => criteria.into(),
            current => current.and(criteria),
        };
        self
    }

    pub fn add_filter_query(mut self, filter: impl Into<Node>) -> Self {
        self.filter_queries.push(filter.into());
        self
    }

    pub fn filter_queries(&self) -> &[Node] {
        &self.filter_queries
    }

    pub fn add_projection_on_field(mut self, name: &str) -> Result<Self> {
        self.projection.push(Field::new(name)?);
        Ok(self)
    }

    pub fn projection(&self) -> &[Field] {
        &self.projection
    }

    pub fn add_calculated_field(mut self, field: CalculatedField) -> Self {
        self.calculated_fields.push(field);
        self
    }

    pub fn calculated_fields(&self) -> &[CalculatedField] {
        &self.calculated_fields
    }

    pub fn add_sort(mut self, sort: Sort) -> Self {
        self.sort = std::mem::take(&mut self.sort).and(sort);
        self
    }

    pub fn sort(&self) -> &Sort {
        &self.sort
    }

    /// Page through results; `rows` must be positive.
    pub fn with_page(mut self, offset: u64, rows: u32) -> Result<Self> {
        check_rows(rows)?;
        self.offset = Some(offset);
        self.rows = Some(rows);
        Ok(self)
    }

    pub fn with_rows(mut self, rows: u32) -> Result<Self> {
        check_rows(rows)?;
        self.rows = Some(rows);
        Ok(self)
    }

    /// Re-checks what the builders enforce; deserialized queries skip them.
    pub(crate) fn validate(&self) -> Result<()> {
        if let Some(rows) = self.rows {
            check_rows(rows)?;
        }
        match &self.group_options {
            Some(options) => options.validate(),
            None => Ok(()),
        }
    }

    pub fn offset(&self) -> Option<u64> {
        self.offset
    }

    pub fn rows(&self) -> Option<u32> {
        self.rows
    }

    pub fn set_group_options(mut self, options: GroupOptions) -> Self {
        self.group_options = Some(options);
        self
    }

    pub fn group_options(&self) -> Option<&GroupOptions> {
        self.group_options.as_ref()
    }

    pub fn set_facet_options(mut self, options: FacetOptions) -> Self {
        self.facet_options = Some(options);
        self
    }

    pub fn facet_options(&self) -> Option<&FacetOptions> {
        self.facet_options.as_ref()
    }

    pub fn set_default_operator(mut self, operator: Operator) -> Self {
        self.default_operator = Some(operator);
        self
    }

    pub fn default_operator(&self) -> Option<Operator> {
        self.default_operator
    }

    pub fn set_def_type(mut self, def_type: impl Into<String>) -> Self {
        self.def_type = Some(def_type.into());
        self
    }

    pub fn def_type(&self) -> Option<&str> {
        self.def_type.as_deref()
    }

    pub fn set_request_handler(mut self, handler: impl Into<String>) -> Self {
        self.request_handler = Some(handler.into());
        self
    }

    pub fn request_handler(&self) -> Option<&str> {
        self.request_handler.as_deref()
    }

    /// Milliseconds Solr may spend on the search.
    pub fn set_time_allowed(mut self, millis: u32) -> Self {
        self.time_allowed = Some(millis);
        self
    }

    pub fn time_allowed(&self) -> Option<u32> {
        self.time_allowed
    }
}

fn check_rows(rows: u32) -> Result<()> {
    if rows == 0 {
        return Err(Error::invalid("Page size must be greater than zero"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::criteria::{Criteria, Junction};

    #[test]
    fn test_calculated_field_blank_alias_ignored() {
        let f = Function::new("foo").unwrap();
        assert_eq!(CalculatedField::new(Some(" "), f.clone()).alias(), None);
        assert_eq!(CalculatedField::new(None, f.clone()).alias(), None);
        assert_eq!(CalculatedField::new(Some("alias"), f).alias(), Some("alias"));
    }

    #[test]
    fn test_add_criteria_nests_explicit_root_group() {
        let a = Node::from(Criteria::where_field("a").unwrap().is("1"));
        let b = Node::from(Criteria::where_field("b").unwrap().is("2"));
        let explicit = Node::group([(Junction::And, a), (Junction::Or, b)]);
        let query =
            Query::new(explicit.clone()).add_criteria(Criteria::where_field("c").unwrap().is("3"));
        match query.criteria() {
            Node::Group(group) => assert_eq!(group.clauses[0].node, explicit),
            _ => panic!("Expected Group node"),
        }
    }

    #[test]
    fn test_add_criteria_replaces_empty_root() {
        let criteria = Criteria::where_field("a").unwrap().is("1");
        let query = Query::default().add_criteria(criteria.clone());
        assert_eq!(query.criteria(), &Node::Criteria(criteria));
    }

    #[test]
    fn test_page_requires_rows() {
        assert!(Query::default().with_page(0, 0).is_err());
        let query = Query::default().with_page(20, 10).unwrap();
        assert_eq!(query.offset(), Some(20));
        assert_eq!(query.rows(), Some(10));
    }

    #[test]
    fn test_sorts_accumulate() {
        let query = Query::default()
            .add_sort(Sort::by("price", Direction::Desc).unwrap())
            .add_sort(Sort::by("title", Direction::Asc).unwrap());
        assert_eq!(query.sort().orders().len(), 2);
    }
}
