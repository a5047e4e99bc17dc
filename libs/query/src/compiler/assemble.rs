//! Criteria tree → query string.

use super::{Processor, QueryCompiler, RenderContext};
use crate::conversion::format_f32;
use crate::criteria::{Criteria, Group, Node};
use crate::error::Result;
use crate::field::Field;

const MATCH_ALL: &str = "*:*";

impl QueryCompiler {
    /// Render a criteria tree. `Ok(None)` when nothing in it renders (empty
    /// groups, criteria whose predicates are all null).
    pub fn create_query_string_from_node(
        &self,
        node: &Node,
        ctx: &RenderContext<'_>,
    ) -> Result<Option<String>> {
        self.render_node(node, 0, ctx)
    }

    /// Like [`Self::create_query_string_from_node`], falling back to `*:*`.
    pub fn get_query_string(&self, node: &Node, ctx: &RenderContext<'_>) -> Result<String> {
        Ok(self
            .create_query_string_from_node(node, ctx)?
            .unwrap_or_else(|| MATCH_ALL.to_string()))
    }

    fn render_node(
        &self,
        node: &Node,
        depth: usize,
        ctx: &RenderContext<'_>,
    ) -> Result<Option<String>> {
        match node {
            Node::Criteria(criteria) => self.create_query_fragment_for_criteria(criteria, ctx),
            Node::Raw { query } if query.trim().is_empty() => Ok(None),
            Node::Raw { query } => Ok(Some(query.clone())),
            Node::Group(group) => self.render_group(group, depth, ctx),
        }
    }

    fn render_group(
        &self,
        group: &Group,
        depth: usize,
        ctx: &RenderContext<'_>,
    ) -> Result<Option<String>> {
        let mut body = String::new();
        let mut rendered = 0usize;

        for clause in &group.clauses {
            let Some(fragment) = self.render_node(&clause.node, depth + 1, ctx)? else {
                tracing::debug!("Omitting clause without fragment");
                continue;
            };
            if rendered > 0 {
                body.push_str(clause.junction.separator());
            }
            body.push_str(&fragment);
            rendered += 1;
        }

        if rendered == 0 {
            return Ok(None);
        }

        let mut fragment = String::with_capacity(body.len() + 3);
        if group.negating {
            fragment.push('-');
        }
        if depth > 0 || group.negating {
            fragment.push('(');
            fragment.push_str(&body);
            fragment.push(')');
        } else {
            fragment.push_str(&body);
        }
        Ok(Some(fragment))
    }

    /// Render one predicate chain: `[-]field:value`, `field:(a b)`, boosts.
    pub fn create_query_fragment_for_criteria(
        &self,
        criteria: &Criteria,
        ctx: &RenderContext<'_>,
    ) -> Result<Option<String>> {
        criteria.validate()?;
        let field = criteria.field();
        let field_name = field
            .map(|field| self.mapped_field_name(field, ctx))
            .transpose()?;

        let mut fragments = Vec::with_capacity(criteria.predicates().len());
        let mut references_field = false;
        for predicate in criteria.predicates() {
            references_field |= predicate
                .operation()
                .is_some_and(|op| op.references_field());
            let processor = Processor::find(predicate)?;
            if let Some(fragment) = processor.process(self, predicate, field, ctx)? {
                fragments.push(fragment);
            }
        }

        let mut out = String::new();
        if criteria.is_negating() {
            out.push('-');
        }

        if criteria.predicates().is_empty() {
            // A bare field matches any document that has a value.
            let Some(name) = field_name else {
                return Ok(None);
            };
            out.push_str(&name);
            out.push_str(":[* TO *]");
        } else {
            if fragments.is_empty() {
                tracing::debug!(
                    field = field.map(Field::name),
                    "Omitting criteria, all predicate values are null"
                );
                return Ok(None);
            }
            if let (false, Some(name)) = (references_field, &field_name) {
                out.push_str(name);
                out.push(':');
            }
            if fragments.len() > 1 {
                out.push('(');
                out.push_str(&fragments.join(" "));
                out.push(')');
            } else {
                out.push_str(&fragments[0]);
            }
        }

        if let Some(boost) = criteria.boost_value().or_else(|| field.and_then(Field::boost)) {
            out.push('^');
            out.push_str(&format_f32(boost));
        }

        Ok(Some(out))
    }
}
