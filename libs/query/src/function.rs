//! Function query model: a named operation over an ordered argument list.

use crate::criteria::{Criteria, Node};
use crate::error::{Error, Result};
use crate::field::Field;
use crate::geo::{Distance, Point};
use crate::query::Query;
use crate::value::Value;
use serde::{Deserialize, Serialize};

/// One function argument.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Argument {
    Value(Value),
    Field(Field),
    Function(Function),
    Criteria(Box<Node>),
    Query(Box<Query>),
}

impl Argument {
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Value(Value::Null))
    }
}

impl From<Value> for Argument {
    fn from(value: Value) -> Self {
        Self::Value(value)
    }
}

impl From<Field> for Argument {
    fn from(field: Field) -> Self {
        Self::Field(field)
    }
}

impl From<Function> for Argument {
    fn from(function: Function) -> Self {
        Self::Function(function)
    }
}

impl From<Node> for Argument {
    fn from(node: Node) -> Self {
        Self::Criteria(Box::new(node))
    }
}

impl From<Criteria> for Argument {
    fn from(criteria: Criteria) -> Self {
        Self::Criteria(Box::new(Node::Criteria(criteria)))
    }
}

impl From<Query> for Argument {
    fn from(query: Query) -> Self {
        Self::Query(Box::new(query))
    }
}

impl From<Point> for Argument {
    fn from(point: Point) -> Self {
        Self::Value(Value::Point(point))
    }
}

impl From<Distance> for Argument {
    fn from(distance: Distance) -> Self {
        Self::Value(Value::Distance(distance))
    }
}

impl From<&str> for Argument {
    fn from(value: &str) -> Self {
        Self::Value(Value::from(value))
    }
}

impl From<String> for Argument {
    fn from(value: String) -> Self {
        Self::Value(Value::Text(value))
    }
}

impl From<i32> for Argument {
    fn from(value: i32) -> Self {
        Self::Value(Value::from(value))
    }
}

impl From<i64> for Argument {
    fn from(value: i64) -> Self {
        Self::Value(Value::Integer(value))
    }
}

impl From<f64> for Argument {
    fn from(value: f64) -> Self {
        Self::Value(Value::Float(value))
    }
}

impl From<bool> for Argument {
    fn from(value: bool) -> Self {
        Self::Value(Value::Bool(value))
    }
}

/// Function query such as `product(price,0.8)`.
///
/// An absent argument list and an empty one are equivalent. Null slots are
/// accepted here and rejected when the function is rendered.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Function {
    operation: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    arguments: Option<Vec<Argument>>,
}

impl Function {
    pub fn new(operation: impl Into<String>) -> Result<Self> {
        Self::with_arguments(operation, None)
    }

    pub fn with_arguments(
        operation: impl Into<String>,
        arguments: Option<Vec<Argument>>,
    ) -> Result<Self> {
        let function = Self {
            operation: operation.into(),
            arguments,
        };
        function.validate()?;
        Ok(function)
    }

    /// Built-in operation name known to be non-blank.
    pub(crate) fn named(operation: &'static str) -> Self {
        Self {
            operation: operation.to_string(),
            arguments: None,
        }
    }

    /// Append an argument.
    pub fn arg(mut self, argument: impl Into<Argument>) -> Self {
        self.push_argument(argument.into());
        self
    }

    pub(crate) fn push_argument(&mut self, argument: Argument) {
        self.arguments.get_or_insert_with(Vec::new).push(argument);
    }

    pub fn operation(&self) -> &str {
        &self.operation
    }

    pub fn arguments(&self) -> &[Argument] {
        self.arguments.as_deref().unwrap_or(&[])
    }

    pub fn has_arguments(&self) -> bool {
        self.arguments.as_ref().is_some_and(|args| !args.is_empty())
    }

    pub(crate) fn validate(&self) -> Result<()> {
        if self.operation.trim().is_empty() {
            return Err(Error::invalid("Function operation must not be empty"));
        }
        Ok(())
    }
}
