//! Name-to-object side table attached to a query.
//!
//! Grouped results come back keyed by the rendered function or query; the
//! association lets callers find the object a group belongs to. Naming never
//! changes what gets rendered.

use crate::error::{Error, Result};
use crate::function::Function;
use crate::query::Query;
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq)]
pub enum NamedObject {
    Function(Function),
    Query(Query),
}

impl From<Function> for NamedObject {
    fn from(function: Function) -> Self {
        Self::Function(function)
    }
}

impl From<Query> for NamedObject {
    fn from(query: Query) -> Self {
        Self::Query(query)
    }
}

/// Decorates a [`Query`] with a unique name → object association.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct NamedObjectsQuery {
    query: Query,
    names: HashMap<String, NamedObject>,
}

impl NamedObjectsQuery {
    pub fn new(query: Query) -> Self {
        Self {
            query,
            names: HashMap::new(),
        }
    }

    pub fn query(&self) -> &Query {
        &self.query
    }

    /// Assign `name` to `object`; a name already in use is re-pointed.
    pub fn set_name(&mut self, object: impl Into<NamedObject>, name: impl Into<String>) -> Result<()> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(Error::invalid("Name must not be null or blank"));
        }
        self.names.insert(name, object.into());
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&NamedObject> {
        self.names.get(name)
    }

    pub fn names_association(&self) -> &HashMap<String, NamedObject> {
        &self.names
    }

    pub fn into_parts(self) -> (Query, HashMap<String, NamedObject>) {
        (self.query, self.names)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_name_rejected() {
        let mut decorator = NamedObjectsQuery::default();
        assert!(decorator
            .set_name(Function::new("f").unwrap(), " ")
            .is_err());
    }

    #[test]
    fn test_name_is_unique() {
        let mut decorator = NamedObjectsQuery::default();
        decorator.set_name(Function::new("f").unwrap(), "n").unwrap();
        decorator.set_name(Function::new("g").unwrap(), "n").unwrap();
        assert_eq!(decorator.names_association().len(), 1);
        assert_eq!(
            decorator.get("n"),
            Some(&NamedObject::Function(Function::new("g").unwrap()))
        );
    }
}
