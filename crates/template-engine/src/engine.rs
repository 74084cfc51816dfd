//! Ties lexer, parser, walker and registry together into `evaluate` (§4.5).

use std::sync::{OnceLock, RwLock};

use regex::{Captures, Regex};

use crate::call::Call;
use crate::diagnostics::{Diagnostics, SyntaxIssue};
use crate::environment::Environment;
use crate::lexer::lex;
use crate::parser::{parse_with_depth, DEFAULT_MAX_NESTING_DEPTH};
use crate::registry::Registry;
use crate::span::Position;
use crate::walker::walk;

fn time_shorthand_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)\{\{\s*time_utc\s*([+-]\s*\d+)\s*\}\}").expect("static pattern is valid"))
}

/// `{{time_UTC+N}}` / `{{time_UTC-N}}` is a compact legacy spelling that
/// never reaches the `time` macro as written: `+` breaks identifier lexing
/// mid-name, while `-` is a valid continue character and would instead glue
/// onto the name itself. Rewriting both forms to `{{time::UTC+N}}` ahead of
/// lexing lets one macro definition handle both signs uniformly.
fn rewrite_time_shorthand(input: &str) -> String {
    time_shorthand_re()
        .replace_all(input, |caps: &Captures<'_>| {
            let offset: String = caps[1].chars().filter(|c| !c.is_whitespace()).collect();
            let mut out = String::with_capacity(offset.len() + 13);
            out.push_str("{{time::UTC");
            out.push_str(&offset);
            out.push_str("}}");
            out
        })
        .into_owned()
}

fn bare_marker_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)<(user|bot|char|group|charifnotgroup)>").expect("static pattern is valid"))
}

/// Legacy bare markers (`<USER>`, `<BOT>`, ...), case-insensitive, rewritten
/// to their invocation-syntax equivalent so the rest of the pipeline treats
/// them identically to an explicit `{{user}}`.
fn rewrite_bare_markers(input: &str) -> String {
    bare_marker_re()
        .replace_all(input, |caps: &Captures<'_>| match caps[1].to_ascii_lowercase().as_str() {
            "user" => "{{user}}",
            "bot" | "char" => "{{char}}",
            "group" => "{{group}}",
            "charifnotgroup" => "{{charifnotgroup}}",
            other => unreachable!("marker regex alternation admits only known names, got {other}"),
        })
        .into_owned()
}

fn trim_marker_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(\r?\n)*\{\{trim\}\}(\r?\n)*").expect("static pattern is valid"))
}

/// `trim` is deliberately never registered as a macro (see template-stdlib):
/// it survives evaluation as literal text and is stripped here instead,
/// together with the newline runs on either side of it.
fn remove_trim_markers(input: &str) -> String {
    trim_marker_re().replace_all(input, "").into_owned()
}

fn unescape_braces(input: &str) -> String {
    input.replace("\\{", "{").replace("\\}", "}")
}

/// Drives one template through lex → parse → walk → postprocess. Cheap to
/// construct; holds no mutable state of its own beyond configuration.
pub struct Engine<'a> {
    diagnostics: &'a dyn Diagnostics,
    max_nesting_depth: usize,
}

impl<'a> Engine<'a> {
    #[must_use]
    pub fn new(diagnostics: &'a dyn Diagnostics) -> Self {
        Self { diagnostics, max_nesting_depth: DEFAULT_MAX_NESTING_DEPTH }
    }

    #[must_use]
    pub fn with_max_nesting_depth(mut self, depth: usize) -> Self {
        self.max_nesting_depth = depth;
        self
    }

    /// Expands every recognized invocation in `input`, leaving unrecognized
    /// or malformed ones as literal text. Never panics, never fails the
    /// document — per §7, errors are reported through `diagnostics`, not
    /// returned.
    #[must_use]
    pub fn evaluate(&self, input: &str, env: &Environment, registry: &RwLock<Registry>) -> String {
        if input.is_empty() {
            return String::new();
        }

        let rewritten = rewrite_bare_markers(&rewrite_time_shorthand(input));
        let chars: Vec<char> = rewritten.chars().collect();

        let lexed = lex(&chars);
        self.report_syntax(&lexed.errors, &rewritten, &chars, "lex");

        let parsed = parse_with_depth(&chars, &lexed.tokens, self.max_nesting_depth);
        self.report_syntax(&parsed.errors, &rewritten, &chars, "parse");

        let resolve = |call: Call<'_>| self.resolve_macro(call, registry);
        let walked = walk(&chars, &parsed.document, env, &resolve, self.diagnostics, self.max_nesting_depth);

        remove_trim_markers(&unescape_braces(&walked))
    }

    fn report_syntax<E>(&self, errors: &[E], source: &str, chars: &[char], phase: &str)
    where
        E: SyntaxErrorLike,
    {
        if errors.is_empty() {
            return;
        }
        let issues: Vec<SyntaxIssue> = errors
            .iter()
            .map(|e| {
                let span = e.span();
                let pos = Position::from_offset(chars, span.start);
                SyntaxIssue { message: e.message().to_string(), line: pos.line, column: pos.column, length: span.len() }
            })
            .collect();
        self.diagnostics.syntax_warning(phase, &issues, source);
    }

    /// Per §4.5: build the raw fallback text, honor a dynamic override if
    /// present (strict zero-arity), otherwise dispatch through the registry
    /// and let a configured post-process step see the result last.
    fn resolve_macro(&self, call: Call<'_>, registry: &RwLock<Registry>) -> String {
        let raw = call.raw_with_braces.clone();
        if call.name.is_empty() {
            return raw;
        }

        if let Some(dynamic) = call.env.dynamic_macros.get(&call.name) {
            if !call.args.is_empty() {
                self.diagnostics.runtime_warning(&call.name, "dynamic macro is strict zero-arity");
                return raw;
            }
            return dynamic.resolve();
        }

        let value = {
            let guard = registry.read().expect("registry lock poisoned");
            guard.execute_macro(&call, self.diagnostics)
        };
        let Some(value) = value else {
            return raw;
        };

        match &call.env.functions.post_process {
            Some(post) => {
                let pre_process = value.clone();
                match post(value) {
                    Ok(processed) => processed,
                    Err(message) => {
                        self.diagnostics.internal_error(&call.name, &message);
                        pre_process
                    }
                }
            }
            None => value,
        }
    }
}

trait SyntaxErrorLike {
    fn message(&self) -> &str;
    fn span(&self) -> crate::span::Span;
}

impl SyntaxErrorLike for crate::lexer::LexError {
    fn message(&self) -> &str {
        &self.message
    }
    fn span(&self) -> crate::span::Span {
        self.span
    }
}

impl SyntaxErrorLike for crate::parser::ParserError {
    fn message(&self) -> &str {
        &self.message
    }
    fn span(&self) -> crate::span::Span {
        self.span
    }
}
