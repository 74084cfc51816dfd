//! The per-evaluation `Environment` and the provider pipeline that builds it.

use std::cell::RefCell;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use indexmap::IndexMap;

use crate::diagnostics::Diagnostics;

#[derive(Debug, Clone, Default)]
pub struct Names {
    pub user: String,
    pub char: String,
    pub group: String,
    pub group_not_muted: String,
    pub not_char: String,
}

#[derive(Debug, Clone, Default)]
pub struct CharacterFields {
    pub char_prompt: String,
    pub char_instruction: String,
    pub description: String,
    pub personality: String,
    pub scenario: String,
    pub persona: String,
    pub mes_examples_raw: String,
    pub version: String,
    pub char_depth_prompt: String,
    pub creator_notes: String,
}

/// A per-evaluation ad-hoc definition that overrides the registry for the
/// invocation name it's keyed under. Always strict, always zero-arity.
#[derive(Clone)]
pub enum DynamicValue {
    Fixed(String),
    Lazy(Arc<dyn Fn() -> String + Send + Sync>),
}

impl DynamicValue {
    #[must_use]
    pub fn resolve(&self) -> String {
        match self {
            DynamicValue::Fixed(s) => s.clone(),
            DynamicValue::Lazy(f) => f(),
        }
    }
}

/// A one-shot cell: returns its value exactly once, then empty string forever.
/// Modeled as interior mutability since `Environment` is handed to handlers
/// by shared reference.
#[derive(Debug, Default)]
pub struct OriginalFn {
    value: RefCell<Option<String>>,
}

impl OriginalFn {
    #[must_use]
    pub fn new(value: Option<String>) -> Self {
        Self { value: RefCell::new(value) }
    }

    #[must_use]
    pub fn call(&self) -> String {
        self.value.borrow_mut().take().unwrap_or_default()
    }
}

pub type PostProcessFn = Arc<dyn Fn(String) -> Result<String, String> + Send + Sync>;

#[derive(Default)]
pub struct Functions {
    pub original: OriginalFn,
    pub post_process: Option<PostProcessFn>,
}

/// Threaded through evaluation by shared reference. Treated as immutable by
/// handler contract, though `extra` and `dynamic_macros` use interior
/// mutability because `setvar`/`getvar`-style handlers rely on sequential
/// top-level evaluation order (P5) to observe each other's writes.
pub struct Environment {
    pub content: String,
    pub content_hash: u64,
    pub names: Names,
    pub character: Option<CharacterFields>,
    pub system_model: Option<String>,
    pub dynamic_macros: IndexMap<String, DynamicValue>,
    pub functions: Functions,
    pub extra: RefCell<IndexMap<String, String>>,
}

impl Environment {
    #[must_use]
    pub fn content_hash_of(content: &str) -> u64 {
        let mut hasher = DefaultHasher::new();
        content.hash(&mut hasher);
        hasher.finish()
    }
}

/// Input the provider pipeline consumes to produce an [`Environment`].
/// Roughly: whatever the host application knows about the current chat turn.
#[derive(Default)]
pub struct RawEnvContext {
    pub content: String,
    pub name1: String,
    pub name2: String,
    pub name1_override: Option<String>,
    pub name2_override: Option<String>,
    pub in_group: bool,
    pub group_override: Option<String>,
    pub active_group_name: Option<String>,
    pub original: Option<String>,
    pub system_model: Option<String>,
    pub replace_character_card: bool,
    pub character: Option<CharacterFields>,
    pub dynamic_macros: IndexMap<String, DynamicValue>,
    pub post_process: Option<PostProcessFn>,
}

/// Ordering bucket for a registered provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bucket {
    Early,
    Normal,
    Late,
}

/// A provider contributes to (or overrides part of) the environment being
/// built. Returning `Err` does not abort the build — it's logged as an
/// internal error and construction continues with whatever the env holds so far.
pub type Provider = Box<dyn Fn(&RawEnvContext, &mut Environment) -> Result<(), String> + Send + Sync>;

#[derive(Default)]
pub struct EnvironmentBuilder {
    early: Vec<Provider>,
    normal: Vec<Provider>,
    late: Vec<Provider>,
}

impl EnvironmentBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register_provider(&mut self, bucket: Bucket, provider: Provider) {
        match bucket {
            Bucket::Early => self.early.push(provider),
            Bucket::Normal => self.normal.push(provider),
            Bucket::Late => self.late.push(provider),
        }
    }

    fn base_environment(ctx: &RawEnvContext) -> Environment {
        let user = ctx.name1_override.clone().unwrap_or_else(|| ctx.name1.clone());
        let char_name = ctx.name2_override.clone().unwrap_or_else(|| ctx.name2.clone());
        let (group, group_not_muted, not_char) = if ctx.in_group {
            let g = ctx
                .group_override
                .clone()
                .or_else(|| ctx.active_group_name.clone())
                .unwrap_or_else(|| "Group".to_string());
            (g.clone(), g.clone(), g)
        } else {
            (char_name.clone(), char_name.clone(), user.clone())
        };

        Environment {
            content_hash: Environment::content_hash_of(&ctx.content),
            content: ctx.content.clone(),
            names: Names { user, char: char_name, group, group_not_muted, not_char },
            character: if ctx.replace_character_card { ctx.character.clone() } else { None },
            system_model: ctx.system_model.clone(),
            dynamic_macros: IndexMap::new(),
            functions: Functions { original: OriginalFn::new(ctx.original.clone()), post_process: None },
            extra: RefCell::new(IndexMap::new()),
        }
    }

    /// Runs every registered provider in Early → Normal → Late order inside
    /// an isolated failure boundary, then overlays `ctx.dynamic_macros`.
    #[must_use]
    pub fn build_from_raw_env(&self, ctx: &RawEnvContext, diagnostics: &dyn Diagnostics) -> Environment {
        let mut env = Self::base_environment(ctx);
        env.functions.post_process = ctx.post_process.clone();
        for provider in self.early.iter().chain(self.normal.iter()).chain(self.late.iter()) {
            if let Err(message) = provider(ctx, &mut env) {
                diagnostics.internal_error("environment_provider", &message);
            }
        }
        for (name, value) in &ctx.dynamic_macros {
            env.dynamic_macros.insert(name.clone(), value.clone());
        }
        env
    }
}
