//! Query compiler
//!
//! Owns the immutable collaborators every render call needs (configuration,
//! conversion service, field name resolver) and exposes the three rendering
//! stages:
//!
//! - [`QueryCompiler::create_function_fragment`] (function renderer)
//! - [`Processor`] dispatch over [`PROCESSORS`] (predicate processors)
//! - [`QueryCompiler::create_query_string_from_node`] and
//!   [`QueryCompiler::compile`] (query assembler)

mod assemble;
mod function;
mod params;
mod processor;

pub use params::{CompiledQuery, SolrParams};
pub use processor::{Processor, PROCESSORS};

use crate::config::CompilerConfig;
use crate::conversion::ConversionService;
use crate::error::Result;
use crate::field::Field;
use crate::mapping::FieldNameResolver;
use std::fmt;
use std::sync::Arc;

/// Per-call rendering context.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RenderContext<'a> {
    /// Domain type used for field name resolution.
    pub domain_type: Option<&'a str>,
}

impl<'a> RenderContext<'a> {
    pub fn new(domain_type: Option<&'a str>) -> Self {
        Self { domain_type }
    }
}

/// Reusable, thread-safe compiler
///
/// Holds only shared immutable state, so one instance can serve any number
/// of threads concurrently.
#[derive(Clone)]
pub struct QueryCompiler {
    config: Arc<CompilerConfig>,
    conversions: Arc<ConversionService>,
    resolver: Arc<dyn FieldNameResolver>,
}

impl QueryCompiler {
    /// Compiler whose field mappings and date format come from `config`.
    pub fn new(config: CompilerConfig) -> Result<Self> {
        Self::builder().config(config).build()
    }

    pub fn builder() -> QueryCompilerBuilder {
        QueryCompilerBuilder::default()
    }

    pub fn config(&self) -> &CompilerConfig {
        &self.config
    }

    pub fn conversions(&self) -> &ConversionService {
        &self.conversions
    }

    /// Validated field name after domain mapping.
    pub(crate) fn mapped_field_name(&self, field: &Field, ctx: &RenderContext<'_>) -> Result<String> {
        field.validate()?;
        Ok(self.resolver.resolve(ctx.domain_type, field))
    }
}

impl Default for QueryCompiler {
    fn default() -> Self {
        let config = CompilerConfig::default();
        Self {
            resolver: Arc::new(config.fields.clone()),
            config: Arc::new(config),
            conversions: Arc::new(ConversionService::default()),
        }
    }
}

impl fmt::Debug for QueryCompiler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QueryCompiler")
            .field("config", &self.config)
            .field("conversions", &self.conversions)
            .finish_non_exhaustive()
    }
}

#[derive(Default)]
pub struct QueryCompilerBuilder {
    config: Option<CompilerConfig>,
    conversions: Option<ConversionService>,
    resolver: Option<Arc<dyn FieldNameResolver>>,
}

impl QueryCompilerBuilder {
    pub fn config(mut self, config: CompilerConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Conversion service with custom converters. When unset, one is built
    /// from the configured date precision.
    pub fn conversions(mut self, conversions: ConversionService) -> Self {
        self.conversions = Some(conversions);
        self
    }

    /// Replace the configured [`crate::FieldMappings`] with another resolver.
    pub fn resolver(mut self, resolver: impl FieldNameResolver + 'static) -> Self {
        self.resolver = Some(Arc::new(resolver));
        self
    }

    pub fn build(self) -> Result<QueryCompiler> {
        let config = self.config.unwrap_or_default();
        config.validate()?;

        let conversions = match self.conversions {
            Some(conversions) => conversions,
            None => ConversionService::builder()
                .date_fraction_digits(config.date_fraction_digits)
                .build()?,
        };
        let resolver = self
            .resolver
            .unwrap_or_else(|| Arc::new(config.fields.clone()));

        tracing::debug!(
            strict_functions = config.strict_functions,
            default_rows = ?config.default_rows,
            "Query compiler initialized"
        );

        Ok(QueryCompiler {
            config: Arc::new(config),
            conversions: Arc::new(conversions),
            resolver,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mapping::FieldMappings;

    struct Upper;

    impl FieldNameResolver for Upper {
        fn resolve(&self, _domain_type: Option<&str>, field: &Field) -> String {
            field.name().to_uppercase()
        }
    }

    #[test]
    fn test_compiler_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<QueryCompiler>();
    }

    #[test]
    fn test_config_mappings_used_by_default() {
        let config = CompilerConfig {
            fields: FieldMappings::new().map("Product", "title", "title_t").unwrap(),
            ..CompilerConfig::default()
        };
        let compiler = QueryCompiler::new(config).unwrap();
        let title = Field::new("title").unwrap();

        assert_eq!(
            compiler
                .mapped_field_name(&title, &RenderContext::new(Some("Product")))
                .unwrap(),
            "title_t"
        );
        assert_eq!(
            compiler
                .mapped_field_name(&title, &RenderContext::default())
                .unwrap(),
            "title"
        );
    }

    #[test]
    fn test_custom_resolver() {
        let compiler = QueryCompiler::builder().resolver(Upper).build().unwrap();
        let title = Field::new("title").unwrap();
        assert_eq!(
            compiler
                .mapped_field_name(&title, &RenderContext::default())
                .unwrap(),
            "TITLE"
        );
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = CompilerConfig {
            date_fraction_digits: 4,
            ..CompilerConfig::default()
        };
        assert!(QueryCompiler::new(config).is_err());
    }
}
