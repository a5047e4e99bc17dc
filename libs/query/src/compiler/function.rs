//! Function fragment rendering: `{!func}op(arg,arg,...)`.

use super::{QueryCompiler, RenderContext};
use crate::error::{Error, Result};
use crate::function::{Argument, Function};
use crate::functions;
use crate::query::CalculatedField;
use crate::value::Value;

const FUNCTION_PREFIX: &str = "{!func}";

impl QueryCompiler {
    /// Render a function query.
    ///
    /// `level` is the nesting depth: the `{!func}` prefix is emitted at level
    /// 0 only, nested functions render as bare `op(...)`.
    pub fn create_function_fragment(
        &self,
        function: &Function,
        level: usize,
        ctx: &RenderContext<'_>,
    ) -> Result<String> {
        function.validate()?;
        if self.config().strict_functions {
            functions::validate_arity(function)?;
        }

        let mut fragment = String::new();
        if level == 0 {
            fragment.push_str(FUNCTION_PREFIX);
        }
        fragment.push_str(function.operation());
        fragment.push('(');

        for (index, argument) in function.arguments().iter().enumerate() {
            if index > 0 {
                fragment.push(',');
            }
            let rendered = self.render_argument(argument, level, ctx)?;
            fragment.push_str(&rendered);
        }

        fragment.push(')');
        Ok(fragment)
    }

    fn render_argument(
        &self,
        argument: &Argument,
        level: usize,
        ctx: &RenderContext<'_>,
    ) -> Result<String> {
        match argument {
            Argument::Value(Value::Null) => Err(Error::invalid(
                "Unable to parse 'null' within function arguments",
            )),
            Argument::Function(nested) => self.create_function_fragment(nested, level + 1, ctx),
            Argument::Criteria(node) => self.get_query_string(node, ctx),
            Argument::Query(query) => self.get_query_string(query.criteria(), ctx),
            Argument::Field(field) => self.mapped_field_name(field, ctx),
            Argument::Value(Value::Point(point)) => Ok(point.to_string()),
            Argument::Value(Value::Distance(distance)) => Ok(distance.to_string()),
            Argument::Value(value) => self.conversions().convert(value).ok_or_else(|| {
                Error::invalid("Unable to parse 'null' within function arguments")
            }),
        }
    }

    /// Function fragment of a calculated field, `alias:` prefixed when the
    /// alias is not blank.
    pub fn create_calculated_field_fragment(
        &self,
        field: &CalculatedField,
        ctx: &RenderContext<'_>,
    ) -> Result<String> {
        let fragment = self.create_function_fragment(field.function(), 0, ctx)?;
        Ok(match field.alias() {
            Some(alias) => format!("{}:{}", alias, fragment),
            None => fragment,
        })
    }
}
