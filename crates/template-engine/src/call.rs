//! The runtime invocation record built by the walker for each dispatch.

use crate::environment::Environment;
use crate::span::Span;

/// A `[start_offset, end_offset)` source range, re-exposed under the data
/// model's name for a `Call`'s location.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Range {
    pub start_offset: usize,
    pub end_offset: usize,
}

impl From<Span> for Range {
    fn from(span: Span) -> Self {
        Self { start_offset: span.start, end_offset: span.end }
    }
}

/// One invocation, fully evaluated inside-out and ready for dispatch.
///
/// Built once by the walker immediately before calling [`crate::registry::Registry::execute_macro`];
/// never mutated afterwards.
#[derive(Debug, Clone)]
pub struct Call<'env> {
    pub name: String,
    /// Each argument's fully inner-expanded string value, in source order.
    pub args: Vec<String>,
    /// The invocation body with nested invocations already substituted by
    /// their values, excluding the outer `{{`/`}}`.
    pub raw_inner: String,
    /// `"{{" + raw_inner + "}}"`.
    pub raw_with_braces: String,
    pub range: Range,
    pub env: &'env Environment,
}
