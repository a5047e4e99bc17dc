//! Predicate processors
//!
//! One variant per operation kind. Dispatch walks [`PROCESSORS`] in order and
//! the first variant whose [`Processor::can_process`] matches renders the
//! predicate; `Default` is last so every specific variant is tried first.

use super::{QueryCompiler, RenderContext};
use crate::criteria::{GeoValue, OperationKey, Predicate, PredicateKey, PredicateValue, Range};
use crate::error::{Error, Result};
use crate::escape::escape_criteria_value;
use crate::field::Field;
use crate::value::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Processor {
    Expression,
    Between,
    Near,
    Within,
    Fuzzy,
    Sloppy,
    Wildcard,
    Function,
    Default,
}

/// Dispatch order.
pub static PROCESSORS: [Processor; 9] = [
    Processor::Expression,
    Processor::Between,
    Processor::Near,
    Processor::Within,
    Processor::Fuzzy,
    Processor::Sloppy,
    Processor::Wildcard,
    Processor::Function,
    Processor::Default,
];

impl Processor {
    pub fn can_process(self, predicate: &Predicate) -> bool {
        let operation = predicate.operation();
        match self {
            Self::Expression => operation == Some(OperationKey::Expression),
            Self::Between => operation == Some(OperationKey::Between),
            Self::Near => operation == Some(OperationKey::Near),
            Self::Within => operation == Some(OperationKey::Within),
            Self::Fuzzy => operation == Some(OperationKey::Fuzzy),
            Self::Sloppy => operation == Some(OperationKey::Sloppy),
            Self::Wildcard => matches!(
                operation,
                Some(OperationKey::StartsWith | OperationKey::EndsWith | OperationKey::Contains)
            ),
            Self::Function => operation == Some(OperationKey::Function),
            Self::Default => match predicate.key() {
                None | Some(PredicateKey::Custom(_)) => true,
                Some(PredicateKey::Known(op)) => *op == OperationKey::Equals,
            },
        }
    }

    /// First processor accepting `predicate`.
    pub fn find(predicate: &Predicate) -> Result<Self> {
        PROCESSORS
            .iter()
            .copied()
            .find(|processor| processor.can_process(predicate))
            .ok_or_else(|| Error::UnsupportedPredicate(predicate.key_label().to_string()))
    }

    /// Render one predicate. `Ok(None)` means the predicate carries a null
    /// value and the clause is omitted.
    pub fn process(
        self,
        compiler: &QueryCompiler,
        predicate: &Predicate,
        field: Option<&Field>,
        ctx: &RenderContext<'_>,
    ) -> Result<Option<String>> {
        let value = predicate.value();
        if value.is_null() {
            return Ok(None);
        }

        let fragment = match self {
            Self::Expression => match value {
                PredicateValue::Single(Value::Text(raw)) => raw.clone(),
                PredicateValue::Single(other) => compiler.filter_criteria_value(other),
                _ => return Err(shape_mismatch(predicate)),
            },
            Self::Between => match value {
                PredicateValue::Range(range) => compiler.range_fragment(range),
                _ => return Err(shape_mismatch(predicate)),
            },
            Self::Near => match value {
                PredicateValue::Geo(GeoValue::Circle { center, distance }) => format!(
                    "{{!bbox pt={} sfield={} d={}}}",
                    center,
                    compiler.spatial_field(field, predicate, ctx)?,
                    distance
                ),
                PredicateValue::Geo(GeoValue::Box { bounds }) => format!(
                    "{}:[{} TO {}]",
                    compiler.spatial_field(field, predicate, ctx)?,
                    bounds.first,
                    bounds.second
                ),
                _ => return Err(shape_mismatch(predicate)),
            },
            Self::Within => match value {
                PredicateValue::Geo(GeoValue::Circle { center, distance }) => format!(
                    "{{!geofilt pt={} sfield={} d={}}}",
                    center,
                    compiler.spatial_field(field, predicate, ctx)?,
                    distance
                ),
                _ => return Err(shape_mismatch(predicate)),
            },
            Self::Fuzzy => match value {
                PredicateValue::Fuzzy { term, similarity } => {
                    let mut fragment = compiler.filter_criteria_value(term);
                    fragment.push('~');
                    if let Some(similarity) = similarity {
                        fragment.push_str(&crate::conversion::format_f32(*similarity));
                    }
                    fragment
                }
                PredicateValue::Single(term) => format!("{}~", compiler.filter_criteria_value(term)),
                _ => return Err(shape_mismatch(predicate)),
            },
            Self::Sloppy => match value {
                PredicateValue::Sloppy { phrase, slop } => {
                    format!("{}~{}", compiler.filter_criteria_value(phrase), slop)
                }
                _ => return Err(shape_mismatch(predicate)),
            },
            Self::Wildcard => match value {
                PredicateValue::Single(literal) => {
                    let literal = compiler.filter_criteria_value(literal);
                    match predicate.operation() {
                        Some(OperationKey::StartsWith) => format!("{}*", literal),
                        Some(OperationKey::EndsWith) => format!("*{}", literal),
                        _ => format!("*{}*", literal),
                    }
                }
                _ => return Err(shape_mismatch(predicate)),
            },
            Self::Function => match value {
                PredicateValue::Function(function) => {
                    compiler.create_function_fragment(function, 0, ctx)?
                }
                _ => return Err(shape_mismatch(predicate)),
            },
            Self::Default => match value {
                PredicateValue::Single(literal) => compiler.filter_criteria_value(literal),
                _ => return Err(shape_mismatch(predicate)),
            },
        };

        tracing::trace!(
            processor = ?self,
            key = predicate.key_label(),
            fragment = %fragment,
            "Predicate rendered"
        );
        Ok(Some(fragment))
    }
}

fn shape_mismatch(predicate: &Predicate) -> Error {
    Error::invalid(format!(
        "Predicate '{}' cannot take a {} value",
        predicate.key_label(),
        predicate.value().shape()
    ))
}

impl QueryCompiler {
    /// Literal value as embedded in a criteria fragment: text is escaped
    /// (wildcards kept, quoted when it contains a space), anything else goes
    /// through the conversion service unescaped.
    pub fn filter_criteria_value(&self, value: &Value) -> String {
        match value {
            Value::Text(text) => escape_criteria_value(text),
            other => self.conversions().convert(other).unwrap_or_default(),
        }
    }

    fn range_fragment(&self, range: &Range) -> String {
        let bound = |value: &Option<Value>| match value {
            Some(value) if !value.is_null() => self.filter_criteria_value(value),
            _ => "*".to_string(),
        };
        format!(
            "{}{} TO {}{}",
            if range.include_lower { '[' } else { '{' },
            bound(&range.lower),
            bound(&range.upper),
            if range.include_upper { ']' } else { '}' }
        )
    }

    fn spatial_field(
        &self,
        field: Option<&Field>,
        predicate: &Predicate,
        ctx: &RenderContext<'_>,
    ) -> Result<String> {
        let field = field.ok_or_else(|| {
            Error::invalid(format!(
                "Predicate '{}' requires a field",
                predicate.key_label()
            ))
        })?;
        self.mapped_field_name(field, ctx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geo::{Distance, GeoBox, Point};

    const SOME_VALUE: &str = "some value";

    fn render(predicate: &Predicate, field: Option<&Field>) -> Result<Option<String>> {
        let compiler = QueryCompiler::default();
        Processor::find(predicate)?.process(&compiler, predicate, field, &RenderContext::default())
    }

    #[test]
    fn test_dispatch_order_ends_with_default() {
        assert_eq!(PROCESSORS.last(), Some(&Processor::Default));
        assert_eq!(
            Processor::find(&Predicate::new(OperationKey::Equals, "x")).unwrap(),
            Processor::Default
        );
        assert_eq!(
            Processor::find(&Predicate::new(OperationKey::Contains, "x")).unwrap(),
            Processor::Wildcard
        );
    }

    #[test]
    fn test_null_value_is_omitted() {
        for key in [Some("$between"), Some("$near"), Some("invalid"), None] {
            let predicate = Predicate::with_key(key, Value::Null);
            assert_eq!(render(&predicate, None).unwrap(), None);
        }
    }

    #[test]
    fn test_default_escapes_value() {
        let predicate = Predicate::with_key(None, SOME_VALUE);
        assert_eq!(
            render(&predicate, None).unwrap().as_deref(),
            Some("\"some\\ value\"")
        );
    }

    #[test]
    fn test_range_bounds() {
        let between = |lower: Value, upper: Value, il, iu| {
            Predicate::new(
                OperationKey::Between,
                Range {
                    lower: Some(lower),
                    upper: Some(upper),
                    include_lower: il,
                    include_upper: iu,
                },
            )
        };
        assert_eq!(
            render(&between(5.into(), 10.into(), true, true), None)
                .unwrap()
                .as_deref(),
            Some("[5 TO 10]")
        );
        assert_eq!(
            render(&between(5.into(), Value::Null, false, true), None)
                .unwrap()
                .as_deref(),
            Some("{5 TO *]")
        );
    }

    #[test]
    fn test_geo_requires_field() {
        let predicate = Predicate::new(
            OperationKey::Within,
            GeoValue::Circle {
                center: Point::new(1.0, 2.0),
                distance: Distance::kilometers(3.0),
            },
        );
        assert!(matches!(
            render(&predicate, None),
            Err(Error::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_within_rejects_box() {
        let predicate = Predicate::new(
            OperationKey::Within,
            GeoValue::Box {
                bounds: GeoBox::new(Point::new(0.0, 0.0), Point::new(1.0, 1.0)),
            },
        );
        let field = Field::new("store").unwrap();
        assert!(matches!(
            render(&predicate, Some(&field)),
            Err(Error::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_shape_mismatch_is_fatal() {
        let predicate = Predicate::new(OperationKey::Between, "x");
        let err = render(&predicate, None).unwrap_err();
        assert_eq!(
            err,
            Error::InvalidArgument("Predicate '$between' cannot take a single value".into())
        );
    }
}
