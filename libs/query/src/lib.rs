//! Solr criteria compiler
//!
//! Turns an immutable criteria tree (field comparisons, ranges, boosts, geo
//! distance, fuzzy/wildcard matching, nested boolean groups, function queries)
//! into the textual query syntax understood by Solr's standard query parser,
//! plus the request parameters that travel with it.
//!
//! # Architecture Overview
//!
//! ```text
//! Query (criteria tree, options)
//!      |
//! Query Assembler -> walks groups, joins fragments with AND / OR
//!      |
//! Predicate Processors -> one fragment per predicate (first match wins)
//!      |
//! Function Fragment Renderer -> {!func}op(arg,arg,...)
//!      |
//! SolrParams (q, fq, fl, sort, group.*, facet.*)
//! ```
//!
//! # Example
//!
//! ```rust
//! use solrq_query::{Criteria, Node, Query, QueryCompiler};
//!
//! # fn main() -> solrq_query::Result<()> {
//! let criteria = Node::from(Criteria::where_field("title")?.is("rust"))
//!     .and(Criteria::where_field("price")?.less_than(30));
//!
//! let compiled = QueryCompiler::default().compile(&Query::new(criteria))?;
//! assert_eq!(compiled.params().get("q"), Some("title:rust AND price:[* TO 30}"));
//! # Ok(())
//! # }
//! ```

pub mod compiler;
pub mod config;
pub mod conversion;
pub mod criteria;
pub mod error;
pub mod escape;
pub mod facet;
pub mod field;
pub mod function;
pub mod functions;
pub mod geo;
pub mod group;
pub mod mapping;
pub mod named;
pub mod query;
pub mod value;

// Re-export main types
pub use compiler::{
    CompiledQuery, Processor, QueryCompiler, QueryCompilerBuilder, RenderContext, SolrParams,
    PROCESSORS,
};
pub use config::CompilerConfig;
pub use conversion::{ConversionService, ConversionServiceBuilder};
pub use criteria::{
    Clause, Criteria, GeoValue, Group, Junction, Node, OperationKey, Predicate, PredicateKey,
    PredicateValue, Range,
};
pub use error::{Error, Result};
pub use facet::{FacetOptions, FacetQueryEntry, FacetSort};
pub use field::Field;
pub use function::{Argument, Function};
pub use geo::{Distance, GeoBox, Metric, Point};
pub use group::GroupOptions;
pub use mapping::{FieldMappings, FieldNameResolver};
pub use named::{NamedObject, NamedObjectsQuery};
pub use query::{CalculatedField, Direction, Operator, Order, Query, Sort};
pub use value::{CustomValue, Value};
