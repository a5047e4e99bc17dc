//! Typed builders for common Solr function queries
//!
//! Every builder returns a plain [`Function`], so anything built here renders
//! exactly like a hand-assembled one. Known operation names carry arity bounds
//! in a compile-time perfect hash map; unknown names are never rejected.

use crate::error::{Error, Result};
use crate::field::Field;
use crate::function::{Argument, Function};
use crate::geo::Point;
use crate::query::Query;
use crate::value::Value;
use phf::phf_map;

/// Function metadata
#[derive(Debug, Clone, Copy)]
pub struct FunctionMetadata {
    pub name: &'static str,
    pub min_args: usize,
    pub max_args: Option<usize>, // None = unbounded
}

static FUNCTIONS_BY_NAME: phf::Map<&'static str, FunctionMetadata> = phf_map! {
    // Math
    "product" => FunctionMetadata { name: "product", min_args: 1, max_args: None },
    "sum" => FunctionMetadata { name: "sum", min_args: 1, max_args: None },
    "sub" => FunctionMetadata { name: "sub", min_args: 2, max_args: Some(2) },
    "div" => FunctionMetadata { name: "div", min_args: 2, max_args: Some(2) },
    "max" => FunctionMetadata { name: "max", min_args: 1, max_args: None },
    "min" => FunctionMetadata { name: "min", min_args: 1, max_args: None },
    "abs" => FunctionMetadata { name: "abs", min_args: 1, max_args: Some(1) },
    "log" => FunctionMetadata { name: "log", min_args: 1, max_args: Some(1) },
    "sqrt" => FunctionMetadata { name: "sqrt", min_args: 1, max_args: Some(1) },
    "pow" => FunctionMetadata { name: "pow", min_args: 2, max_args: Some(2) },

    // Boolean
    "exists" => FunctionMetadata { name: "exists", min_args: 1, max_args: Some(1) },
    "not" => FunctionMetadata { name: "not", min_args: 1, max_args: Some(1) },
    "if" => FunctionMetadata { name: "if", min_args: 3, max_args: Some(3) },
    "def" => FunctionMetadata { name: "def", min_args: 2, max_args: Some(2) },

    // Relevance
    "termfreq" => FunctionMetadata { name: "termfreq", min_args: 2, max_args: Some(2) },
    "docfreq" => FunctionMetadata { name: "docfreq", min_args: 2, max_args: Some(2) },
    "query" => FunctionMetadata { name: "query", min_args: 1, max_args: Some(2) },

    // Spatial
    "geodist" => FunctionMetadata { name: "geodist", min_args: 0, max_args: Some(3) },
    "dist" => FunctionMetadata { name: "dist", min_args: 3, max_args: None },

    // Dates
    "ms" => FunctionMetadata { name: "ms", min_args: 0, max_args: Some(2) },
};

/// Metadata for a known operation name.
pub fn lookup(operation: &str) -> Option<&'static FunctionMetadata> {
    FUNCTIONS_BY_NAME.get(operation)
}

/// Check the argument count of a known operation; unknown names pass.
pub fn validate_arity(function: &Function) -> Result<()> {
    let Some(metadata) = lookup(function.operation()) else {
        return Ok(());
    };
    let count = function.arguments().len();

    if count < metadata.min_args {
        return Err(Error::invalid(format!(
            "Function {} requires at least {} arguments, got {}",
            metadata.name, metadata.min_args, count
        )));
    }

    if let Some(max) = metadata.max_args {
        if count > max {
            return Err(Error::invalid(format!(
                "Function {} takes at most {} arguments, got {}",
                metadata.name, max, count
            )));
        }
    }

    Ok(())
}

/// Numeric-ish function input: a field, a number or a nested function.
#[derive(Debug, Clone, PartialEq)]
pub enum Operand {
    Field(Field),
    Number(Value),
    Function(Function),
}

impl Operand {
    /// Field reference by name; blank names are rejected.
    pub fn field(name: &str) -> Result<Self> {
        Field::new(name).map(Self::Field)
    }
}

impl From<Field> for Operand {
    fn from(field: Field) -> Self {
        Self::Field(field)
    }
}

impl From<Function> for Operand {
    fn from(function: Function) -> Self {
        Self::Function(function)
    }
}

impl From<i32> for Operand {
    fn from(value: i32) -> Self {
        Self::Number(Value::from(value))
    }
}

impl From<i64> for Operand {
    fn from(value: i64) -> Self {
        Self::Number(Value::Integer(value))
    }
}

impl From<f64> for Operand {
    fn from(value: f64) -> Self {
        Self::Number(Value::Float(value))
    }
}

impl From<Operand> for Argument {
    fn from(operand: Operand) -> Self {
        match operand {
            Operand::Field(field) => Argument::Field(field),
            Operand::Number(value) => Argument::Value(value),
            Operand::Function(function) => Argument::Function(function),
        }
    }
}

fn call(operation: &'static str, arguments: Vec<Argument>) -> Function {
    let mut function = Function::named(operation);
    for argument in arguments {
        function.push_argument(argument);
    }
    function
}

/// `product(x,y,...)`, grown with [`ProductBuilder::times`].
pub fn product(first: impl Into<Operand>) -> ProductBuilder {
    ProductBuilder {
        function: call("product", vec![first.into().into()]),
    }
}

#[derive(Debug, Clone)]
pub struct ProductBuilder {
    function: Function,
}

impl ProductBuilder {
    pub fn times(mut self, operand: impl Into<Operand>) -> Self {
        self.function.push_argument(operand.into().into());
        self
    }

    /// Multiply by a field given by name.
    pub fn times_field(self, name: &str) -> Result<Self> {
        Ok(self.times(Operand::field(name)?))
    }

    pub fn build(self) -> Function {
        self.function
    }
}

/// `sum(a,b,...)`; needs at least one operand.
pub fn sum<I>(operands: I) -> Result<Function>
where
    I: IntoIterator,
    I::Item: Into<Operand>,
{
    variadic("sum", operands)
}

/// `max(a,b,...)`; needs at least one operand.
pub fn max<I>(operands: I) -> Result<Function>
where
    I: IntoIterator,
    I::Item: Into<Operand>,
{
    variadic("max", operands)
}

fn variadic<I>(operation: &'static str, operands: I) -> Result<Function>
where
    I: IntoIterator,
    I::Item: Into<Operand>,
{
    let arguments: Vec<Argument> = operands.into_iter().map(|o| o.into().into()).collect();
    if arguments.is_empty() {
        return Err(Error::invalid(format!(
            "Function {} requires at least one operand",
            operation
        )));
    }
    Ok(call(operation, arguments))
}

pub fn div(dividend: impl Into<Operand>, divisor: impl Into<Operand>) -> Function {
    call("div", vec![dividend.into().into(), divisor.into().into()])
}

pub fn exists(operand: impl Into<Operand>) -> Function {
    call("exists", vec![operand.into().into()])
}

pub fn not(operand: impl Into<Operand>) -> Function {
    call("not", vec![operand.into().into()])
}

/// `if(condition,then,else)`.
pub fn if_(
    condition: impl Into<Operand>,
    then: impl Into<Argument>,
    otherwise: impl Into<Argument>,
) -> Result<Function> {
    let then = then.into();
    let otherwise = otherwise.into();
    if then.is_null() || otherwise.is_null() {
        return Err(Error::invalid("Branches of 'if' must not be null"));
    }
    Ok(call("if", vec![condition.into().into(), then, otherwise]))
}

/// `def(field,default)`: field value, or `default` when the document has none.
pub fn def(field: &str, default: impl Into<Argument>) -> Result<Function> {
    let default = default.into();
    if default.is_null() {
        return Err(Error::invalid("Default value must not be null"));
    }
    Ok(call("def", vec![Argument::Field(Field::new(field)?), default]))
}

/// `termfreq(field,term)`.
pub fn termfreq(field: &str, term: &str) -> Result<Function> {
    if term.trim().is_empty() {
        return Err(Error::invalid("Term must not be empty"));
    }
    Ok(call(
        "termfreq",
        vec![Argument::Field(Field::new(field)?), Argument::from(term)],
    ))
}

/// `geodist(sfield,x,y)`.
pub fn geodist(field: &str, location: Point) -> Result<Function> {
    Ok(call(
        "geodist",
        vec![Argument::Field(Field::new(field)?), Argument::from(location)],
    ))
}

/// `dist(power,x1,y1,x2,y2)`; power 2 is the euclidean distance.
pub fn dist(power: f64, from: Point, to: Point) -> Result<Function> {
    if !power.is_finite() || power <= 0.0 {
        return Err(Error::invalid("Power must be greater than zero"));
    }
    Ok(call(
        "dist",
        vec![
            Argument::from(power),
            Argument::from(from),
            Argument::from(to),
        ],
    ))
}

/// `ms()`: milliseconds since epoch for the current time.
pub fn currentdate() -> Function {
    Function::named("ms")
}

/// `ms(date)`: milliseconds since epoch for a date field or literal.
pub fn ms(date: impl Into<Argument>) -> Result<Function> {
    let date = date.into();
    if date.is_null() {
        return Err(Error::invalid("Date must not be null"));
    }
    Ok(call("ms", vec![date]))
}

/// `query(subquery[,default])`: score of `subquery` for each document.
pub fn query(subquery: Query, default: Option<f64>) -> Function {
    let mut arguments = vec![Argument::from(subquery)];
    if let Some(value) = default {
        arguments.push(Argument::from(value));
    }
    call("query", arguments)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_product_builder_keeps_order() {
        let f = product(Operand::field("price").unwrap())
            .times(0.8)
            .times_field("quantity")
            .unwrap()
            .build();
        assert_eq!(f.operation(), "product");
        assert_eq!(
            f.arguments(),
            &[
                Argument::Field(Field::new("price").unwrap()),
                Argument::Value(Value::Float(0.8)),
                Argument::Field(Field::new("quantity").unwrap()),
            ]
        );
    }

    #[test]
    fn test_builders_reject_blank_fields() {
        assert!(Operand::field(" ").is_err());
        assert!(product(1).times_field("").is_err());
        assert!(termfreq("", "rust").is_err());
        assert!(def("", 0).is_err());
        assert!(geodist("", Point::new(1.0, 2.0)).is_err());
    }

    #[test]
    fn test_null_builder_arguments_rejected() {
        assert!(def("price", Value::Null).is_err());
        assert!(ms(Value::Null).is_err());
        assert!(if_(Operand::field("a").unwrap(), Value::Null, 1).is_err());
    }

    #[test]
    fn test_variadic_requires_operand() {
        assert!(sum(Vec::<i32>::new()).is_err());
        assert_eq!(sum([1, 2, 3]).unwrap().arguments().len(), 3);
        assert_eq!(max([1.5, 2.5]).unwrap().operation(), "max");
    }

    #[test]
    fn test_arity_table() {
        assert!(validate_arity(&div(1, 2)).is_ok());
        assert!(validate_arity(&Function::new("div").unwrap().arg(1)).is_err());
        assert!(validate_arity(&Function::new("abs").unwrap().arg(1).arg(2)).is_err());
        assert!(validate_arity(&currentdate()).is_ok());
        // unknown names are never rejected
        assert!(validate_arity(&Function::new("foo").unwrap()).is_ok());
    }

    #[test]
    fn test_all_builders_registered() {
        for f in [
            product(1).build(),
            div(1, 2),
            exists(Operand::field("a").unwrap()),
            not(Operand::field("a").unwrap()),
            termfreq("text", "rust").unwrap(),
            geodist("store", Point::new(1.0, 2.0)).unwrap(),
            dist(2.0, Point::new(0.0, 0.0), Point::new(1.0, 1.0)).unwrap(),
            currentdate(),
            query(Query::default(), Some(0.0)),
        ] {
            assert!(
                lookup(f.operation()).is_some(),
                "Function '{}' is not registered",
                f.operation()
            );
            assert!(validate_arity(&f).is_ok());
        }
    }
}
