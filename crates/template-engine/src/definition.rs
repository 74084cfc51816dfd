//! The `Definition` record: everything the registry needs to validate and
//! dispatch one invocation name.

use std::fmt;
use std::sync::{Arc, OnceLock};

use regex::Regex;
use strum::{Display, EnumString};

use crate::call::{Call, Range};
use crate::environment::Environment;
use crate::error::HandlerOutcome;
use crate::normalize::{normalize, NormalizeInput};

fn integer_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^-?[0-9]+$").expect("static pattern is valid"))
}

/// Argument type closed set, with a union combinator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArgType {
    String,
    Integer,
    Number,
    Boolean,
    Union(Vec<ArgType>),
}

impl ArgType {
    #[must_use]
    pub fn accepts(&self, value: &str) -> bool {
        match self {
            ArgType::String => true,
            ArgType::Integer => integer_re().is_match(value),
            ArgType::Number => value.trim().parse::<f64>().is_ok_and(f64::is_finite),
            ArgType::Boolean => {
                matches!(value.to_ascii_lowercase().as_str(), "true" | "false" | "1" | "0" | "yes" | "no")
            }
            ArgType::Union(types) => types.iter().any(|t| t.accepts(value)),
        }
    }
}

impl fmt::Display for ArgType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgType::String => write!(f, "string"),
            ArgType::Integer => write!(f, "integer"),
            ArgType::Number => write!(f, "number"),
            ArgType::Boolean => write!(f, "boolean"),
            ArgType::Union(types) => {
                let parts: Vec<String> = types.iter().map(ToString::to_string).collect();
                write!(f, "{}", parts.join("|"))
            }
        }
    }
}

/// Grouping tag used by UI/autocomplete listings. `Other` is the escape
/// hatch for third-party definitions that don't fit the closed set.
#[derive(Debug, Clone, PartialEq, Eq, Display, EnumString)]
#[strum(serialize_all = "snake_case")]
pub enum Category {
    Utility,
    State,
    Random,
    Name,
    Text,
    Time,
    #[strum(default)]
    Other(String),
}

/// Where a definition came from; presentational, also useful for filtering
/// `list_macros`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString)]
#[strum(serialize_all = "snake_case")]
pub enum Source {
    Builtin,
    Extension,
    ThirdParty,
}

#[derive(Debug, Clone)]
pub struct ArgDef {
    pub name: String,
    pub arg_type: ArgType,
    pub optional: bool,
    pub default_value: Option<String>,
    pub sample_value: Option<String>,
    pub description: Option<String>,
}

impl ArgDef {
    #[must_use]
    pub fn required(name: impl Into<String>, arg_type: ArgType) -> Self {
        Self {
            name: name.into(),
            arg_type,
            optional: false,
            default_value: None,
            sample_value: None,
            description: None,
        }
    }

    #[must_use]
    pub fn optional(name: impl Into<String>, arg_type: ArgType, default_value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            arg_type,
            optional: true,
            default_value: Some(default_value.into()),
            sample_value: None,
            description: None,
        }
    }

    #[must_use]
    pub fn described(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    #[must_use]
    pub fn sample(mut self, sample_value: impl Into<String>) -> Self {
        self.sample_value = Some(sample_value.into());
        self
    }
}

/// A trailing variadic tail: between `min` and `max` extra positional
/// arguments are accepted beyond the fixed `unnamed_arg_defs`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListPolicy {
    pub min: usize,
    pub max: usize,
}

impl ListPolicy {
    pub const UNBOUNDED: ListPolicy = ListPolicy { min: 0, max: usize::MAX };

    #[must_use]
    pub const fn exact(min: usize, max: usize) -> Self {
        Self { min, max }
    }
}

#[derive(Debug, Clone)]
pub struct Alias {
    pub name: String,
    pub description: Option<String>,
    pub hidden: bool,
}

impl Alias {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into(), description: None, hidden: false }
    }

    #[must_use]
    pub fn hidden(mut self) -> Self {
        self.hidden = true;
        self
    }
}

/// Everything a handler is given at call time.
pub struct HandlerContext<'a, 'env> {
    pub unnamed_args: &'a [String],
    pub list: &'a [String],
    pub env: &'env Environment,
    pub call: &'a Call<'env>,
    pub range: Range,
    pub normalize: fn(NormalizeInput) -> String,
}

impl<'a, 'env> HandlerContext<'a, 'env> {
    #[must_use]
    pub fn new(unnamed_args: &'a [String], list: &'a [String], call: &'a Call<'env>) -> Self {
        Self { unnamed_args, list, env: call.env, call, range: call.range, normalize }
    }
}

pub type Handler = Arc<dyn Fn(&HandlerContext<'_, '_>) -> HandlerOutcome + Send + Sync>;

/// The contract describing one invocation name, installed via
/// `Registry::register_macro`.
#[derive(Clone)]
pub struct Definition {
    pub name: String,
    pub aliases: Vec<Alias>,
    pub category: Category,
    pub unnamed_arg_defs: Vec<ArgDef>,
    pub list: Option<ListPolicy>,
    pub strict_args: bool,
    pub returns: Option<String>,
    pub return_type: Option<ArgType>,
    pub example_usage: Option<String>,
    pub display_override: Option<String>,
    pub handler: Handler,
    pub source: Source,
    /// Set by the registry on lookup when resolved through an alias; never
    /// set on the stored definition itself.
    pub alias_of: Option<String>,
}

impl fmt::Debug for Definition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Definition")
            .field("name", &self.name)
            .field("aliases", &self.aliases)
            .field("category", &self.category)
            .field("unnamed_arg_defs", &self.unnamed_arg_defs)
            .field("list", &self.list)
            .field("strict_args", &self.strict_args)
            .field("source", &self.source)
            .field("alias_of", &self.alias_of)
            .finish_non_exhaustive()
    }
}

impl Definition {
    #[must_use]
    pub fn min_args(&self) -> usize {
        self.unnamed_arg_defs.iter().take_while(|a| !a.optional).count()
    }

    #[must_use]
    pub fn max_args(&self) -> usize {
        self.unnamed_arg_defs.len()
    }
}

/// Builder passed to `Registry::register_macro`. `unnamed_arg_defs` accepts
/// either an integer shorthand (that many untyped required string
/// arguments) or an explicit descriptor list, per the registration interface.
pub enum UnnamedArgDefs {
    Count(usize),
    Explicit(Vec<ArgDef>),
}

impl UnnamedArgDefs {
    fn into_defs(self) -> Vec<ArgDef> {
        match self {
            UnnamedArgDefs::Count(n) => (0..n).map(|i| ArgDef::required(format!("arg{i}"), ArgType::String)).collect(),
            UnnamedArgDefs::Explicit(defs) => defs,
        }
    }
}

pub struct RegisterOptions {
    pub aliases: Vec<Alias>,
    pub category: Category,
    pub unnamed_arg_defs: UnnamedArgDefs,
    pub list: Option<ListPolicy>,
    pub strict_args: bool,
    pub returns: Option<String>,
    pub return_type: Option<ArgType>,
    pub example_usage: Option<String>,
    pub display_override: Option<String>,
    pub handler: Handler,
    pub source: Source,
}

impl RegisterOptions {
    #[must_use]
    pub fn new<F>(handler: F) -> Self
    where
        F: Fn(&HandlerContext<'_, '_>) -> HandlerOutcome + Send + Sync + 'static,
    {
        Self {
            aliases: Vec::new(),
            category: Category::Utility,
            unnamed_arg_defs: UnnamedArgDefs::Count(0),
            list: None,
            strict_args: true,
            returns: None,
            return_type: None,
            example_usage: None,
            display_override: None,
            handler: Arc::new(handler),
            source: Source::Builtin,
        }
    }

    #[must_use]
    pub fn with_args(mut self, defs: Vec<ArgDef>) -> Self {
        self.unnamed_arg_defs = UnnamedArgDefs::Explicit(defs);
        self
    }

    #[must_use]
    pub fn with_arg_count(mut self, n: usize) -> Self {
        self.unnamed_arg_defs = UnnamedArgDefs::Count(n);
        self
    }

    #[must_use]
    pub fn with_list(mut self, list: ListPolicy) -> Self {
        self.list = Some(list);
        self
    }

    #[must_use]
    pub fn with_aliases(mut self, aliases: Vec<Alias>) -> Self {
        self.aliases = aliases;
        self
    }

    #[must_use]
    pub fn with_category(mut self, category: Category) -> Self {
        self.category = category;
        self
    }

    #[must_use]
    pub fn non_strict(mut self) -> Self {
        self.strict_args = false;
        self
    }

    pub(crate) fn into_definition(self, name: String) -> Definition {
        Definition {
            name,
            aliases: self.aliases,
            category: self.category,
            unnamed_arg_defs: self.unnamed_arg_defs.into_defs(),
            list: self.list,
            strict_args: self.strict_args,
            returns: self.returns,
            return_type: self.return_type,
            example_usage: self.example_usage,
            display_override: self.display_override,
            handler: self.handler,
            source: self.source,
            alias_of: None,
        }
    }
}
