#![allow(dead_code)]

use solrq_query::{Argument, Function, QueryCompiler, RenderContext};
use std::fmt;
use std::sync::OnceLock;

static COMPILER: OnceLock<QueryCompiler> = OnceLock::new();

/// Shared compiler with default configuration.
pub fn compiler() -> &'static QueryCompiler {
    COMPILER.get_or_init(QueryCompiler::default)
}

pub fn ctx() -> RenderContext<'static> {
    RenderContext::default()
}

/// `foo(...)` with the given argument list (absent when `None`).
pub fn foo(arguments: Option<Vec<Argument>>) -> Function {
    Function::with_arguments("foo", arguments).expect("valid operation name")
}

/// `bar(...)` with the given argument list.
pub fn bar(arguments: Option<Vec<Argument>>) -> Function {
    Function::with_arguments("bar", arguments).expect("valid operation name")
}

/// Application type without a registered converter.
pub struct FooBar;

impl fmt::Display for FooBar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("FooBar []")
    }
}
