//! Structured error types per pipeline stage (§7 of the design notes).
//!
//! Only [`RegistrationError`] is a hard failure — it aborts a single
//! `register_macro` call synchronously. Everything past registration is data,
//! not control flow: a [`HandlerOutcome`] is matched, never propagated with
//! `?`, and the engine always produces a string.

use std::fmt;

/// Returned by `register_macro` when a definition cannot be installed.
/// Registration is all-or-nothing: on error, no partial state is left behind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistrationError {
    /// The name (or an alias) was an empty string.
    EmptyName,
    /// No handler was supplied.
    MissingHandler { name: String },
    /// `name` or one of its aliases already resolves to another definition.
    NameCollision { name: String },
    /// An optional argument was followed by a required one.
    MisplacedOptionalArg { name: String, index: usize },
    /// `list.max < list.min`.
    MalformedList { name: String, min: usize, max: usize },
    /// An optional argument had no `default_value`.
    MissingDefault { name: String, index: usize },
}

impl fmt::Display for RegistrationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RegistrationError::EmptyName => write!(f, "definition name must not be empty"),
            RegistrationError::MissingHandler { name } => {
                write!(f, "definition '{name}' has no handler")
            }
            RegistrationError::NameCollision { name } => {
                write!(f, "'{name}' is already registered")
            }
            RegistrationError::MisplacedOptionalArg { name, index } => write!(
                f,
                "'{name}': optional argument at index {index} is followed by a required one"
            ),
            RegistrationError::MalformedList { name, min, max } => write!(
                f,
                "'{name}': list policy has max ({max}) < min ({min})"
            ),
            RegistrationError::MissingDefault { name, index } => write!(
                f,
                "'{name}': optional argument at index {index} has no default_value"
            ),
        }
    }
}

impl std::error::Error for RegistrationError {}

/// What a handler returns. Re-expresses the reference implementation's
/// tagged-exception control flow as data the engine matches on directly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HandlerOutcome {
    /// Successful expansion; already normalized to a string.
    Value(String),
    /// A user-facing problem (bad input, out-of-range argument). Logged as a
    /// runtime warning; the raw invocation is preserved in the output.
    RuntimeError(String),
    /// A bug in the definition or its dependencies. Logged as an internal
    /// error; the raw invocation is preserved in the output.
    InternalError(String),
}
