//! Walks the CST, expanding nested invocations inside-out and joining the
//! result back with byte-exact preservation of surrounding text (§4.4).

use crate::call::Call;
use crate::cst::{Argument, CloseToken, Document, Invocation, Item};
use crate::diagnostics::Diagnostics;
use crate::environment::Environment;
use crate::span::Span;

enum FlatItem<'a> {
    Plaintext(Span),
    /// Always real-closed: any synthetic descendant is flattened further
    /// before it would ever be pushed here.
    Invocation(&'a Invocation),
}

/// An invocation whose `CLOSE` is recovery-inserted never reaches dispatch:
/// it's flattened back into plaintext, while any complete (real-closed)
/// invocation nested inside it survives as an invocation item. A nested
/// invocation that is itself synthetic recurses through this same flatten.
fn flatten_synthetic<'a>(inv: &'a Invocation, out: &mut Vec<FlatItem<'a>>) {
    let end = inv.range().end;
    let mut cursor = inv.open.start;
    let mut nested_all: Vec<&Invocation> = inv.arguments.iter().flat_map(|a| a.nested.iter()).collect();
    nested_all.sort_by_key(|n| n.open.start);

    for nested in nested_all {
        let r = nested.range();
        if r.start < cursor {
            continue; // offset safety: drop ranges overlapping what's already emitted
        }
        if r.start > cursor {
            out.push(FlatItem::Plaintext(Span::new(cursor, r.start)));
        }
        if nested.close.is_synthetic() {
            flatten_synthetic(nested, out);
        } else {
            out.push(FlatItem::Invocation(nested));
        }
        cursor = r.end.max(cursor);
    }
    if end > cursor {
        out.push(FlatItem::Plaintext(Span::new(cursor, end)));
    }
}

/// The single entry point for expanding any invocation node, wherever it
/// occurs (top-level item or nested inside an argument). Dispatches through
/// `resolve` when real-closed; flattens to plaintext (recursively expanding
/// any well-formed descendants) when recovery-inserted.
fn expand_invocation<F: Fn(Call<'_>) -> String>(
    chars: &[char],
    inv: &Invocation,
    env: &Environment,
    resolve: &F,
    diagnostics: &dyn Diagnostics,
    depth: usize,
    max_depth: usize,
) -> String {
    if !inv.close.is_synthetic() {
        return evaluate_real_invocation(chars, inv, env, resolve, diagnostics, depth, max_depth);
    }
    let mut flat = Vec::new();
    flatten_synthetic(inv, &mut flat);
    let mut out = String::new();
    for item in flat {
        match item {
            FlatItem::Plaintext(span) => out.push_str(&span.slice(chars)),
            FlatItem::Invocation(node) => {
                out.push_str(&expand_invocation(chars, node, env, resolve, diagnostics, depth, max_depth));
            }
        }
    }
    out
}

fn evaluate_real_invocation<F: Fn(Call<'_>) -> String>(
    chars: &[char],
    inv: &Invocation,
    env: &Environment,
    resolve: &F,
    diagnostics: &dyn Diagnostics,
    depth: usize,
    max_depth: usize,
) -> String {
    if depth >= max_depth {
        diagnostics.runtime_warning(
            &inv.name,
            &format!("nesting depth exceeds configured maximum ({max_depth}); invocation left raw"),
        );
        return inv.range().slice(chars);
    }

    let mut arg_values = Vec::with_capacity(inv.arguments.len());
    for arg in &inv.arguments {
        arg_values.push(evaluate_argument(chars, arg, env, resolve, diagnostics, depth + 1, max_depth));
    }

    let inner_end = match inv.close {
        CloseToken::Real(close_span) => close_span.start,
        CloseToken::Synthetic => inv.range().end,
    };
    let mut raw_inner = String::new();
    let mut cursor = inv.ident.end;
    for (arg, value) in inv.arguments.iter().zip(&arg_values) {
        if arg.span.start > cursor {
            raw_inner.push_str(&Span::new(cursor, arg.span.start).slice(chars));
        }
        raw_inner.push_str(value);
        cursor = arg.span.end.max(cursor);
    }
    if inner_end > cursor {
        raw_inner.push_str(&Span::new(cursor, inner_end).slice(chars));
    }

    let mut raw_with_braces = String::with_capacity(raw_inner.len() + 4);
    raw_with_braces.push_str("{{");
    raw_with_braces.push_str(&raw_inner);
    raw_with_braces.push_str("}}");

    let call = Call {
        name: inv.name.clone(),
        args: arg_values,
        raw_inner,
        raw_with_braces,
        range: inv.range().into(),
        env,
    };
    resolve(call)
}

fn evaluate_argument<F: Fn(Call<'_>) -> String>(
    chars: &[char],
    arg: &Argument,
    env: &Environment,
    resolve: &F,
    diagnostics: &dyn Diagnostics,
    depth: usize,
    max_depth: usize,
) -> String {
    if arg.nested.is_empty() {
        return arg.span.slice(chars);
    }
    let mut out = String::new();
    let mut cursor = arg.span.start;
    for nested in &arg.nested {
        let r = nested.range();
        if r.start < cursor {
            continue;
        }
        if r.start > cursor {
            out.push_str(&Span::new(cursor, r.start).slice(chars));
        }
        out.push_str(&expand_invocation(chars, nested, env, resolve, diagnostics, depth, max_depth));
        cursor = r.end.max(cursor);
    }
    if arg.span.end > cursor {
        out.push_str(&Span::new(cursor, arg.span.end).slice(chars));
    }
    out
}

/// Walks the full document, applying `resolve` to each invocation and
/// copying every other code point through unchanged.
#[must_use]
pub fn walk<F: Fn(Call<'_>) -> String>(
    chars: &[char],
    document: &Document,
    env: &Environment,
    resolve: &F,
    diagnostics: &dyn Diagnostics,
    max_depth: usize,
) -> String {
    let mut out = String::with_capacity(chars.len());
    let mut cursor = 0usize;
    for item in &document.items {
        let range = item.range();
        if range.start > cursor {
            out.push_str(&Span::new(cursor, range.start).slice(chars));
        }
        match item {
            Item::Plaintext(span) => out.push_str(&span.slice(chars)),
            Item::Invocation(inv) => {
                out.push_str(&expand_invocation(chars, inv, env, resolve, diagnostics, 0, max_depth));
            }
        }
        cursor = range.end.max(cursor);
    }
    if chars.len() > cursor {
        out.push_str(&Span::new(cursor, chars.len()).slice(chars));
    }
    out
}
