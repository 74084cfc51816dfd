//! The name table invocations dispatch through (§4.3), plus the process-wide
//! instance most embedders reach for instead of threading one by hand.

use std::sync::{OnceLock, RwLock};

use indexmap::IndexMap;

use crate::call::Call;
use crate::definition::{Category, Definition, HandlerContext, ListPolicy, RegisterOptions};
use crate::diagnostics::Diagnostics;
use crate::error::{HandlerOutcome, RegistrationError};

/// `{{//anything}}` is a comment shorthand baked into dispatch rather than
/// the name table: the identifier grammar swallows the body into the name
/// itself (`/` is a valid continue character), so no registered name could
/// ever match it exactly. Any name starting with `//` always wins here,
/// ahead of the name table, and always yields empty output.
fn comment_definition() -> Definition {
    RegisterOptions::new(|_ctx: &HandlerContext<'_, '_>| HandlerOutcome::Value(String::new()))
        .with_list(ListPolicy::UNBOUNDED)
        .with_category(Category::Utility)
        .non_strict()
        .into_definition("//".to_string())
}

#[derive(Default)]
pub struct Registry {
    definitions: IndexMap<String, Definition>,
    aliases: IndexMap<String, String>,
}

impl Registry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Installs a definition. Rejects empty names, collisions with any
    /// existing name or alias (including its own aliases against each
    /// other), optional arguments placed before a required one, optional
    /// arguments missing a default, and malformed list bounds.
    pub fn register_macro(&mut self, name: impl Into<String>, options: RegisterOptions) -> Result<(), RegistrationError> {
        let name = name.into();
        if name.is_empty() {
            return Err(RegistrationError::EmptyName);
        }
        if self.definitions.contains_key(&name) || self.aliases.contains_key(&name) {
            return Err(RegistrationError::NameCollision { name });
        }
        for alias in &options.aliases {
            if self.definitions.contains_key(&alias.name) || self.aliases.contains_key(&alias.name) {
                return Err(RegistrationError::NameCollision { name: alias.name.clone() });
            }
        }

        let def = options.into_definition(name.clone());

        let mut seen_optional = false;
        for (index, arg) in def.unnamed_arg_defs.iter().enumerate() {
            if arg.optional {
                seen_optional = true;
                if arg.default_value.is_none() {
                    return Err(RegistrationError::MissingDefault { name: name.clone(), index });
                }
            } else if seen_optional {
                return Err(RegistrationError::MisplacedOptionalArg { name: name.clone(), index });
            }
        }
        if let Some(list) = def.list {
            if list.max < list.min {
                return Err(RegistrationError::MalformedList { name: name.clone(), min: list.min, max: list.max });
            }
        }

        for alias in &def.aliases {
            self.aliases.insert(alias.name.clone(), name.clone());
        }
        self.definitions.insert(name, def);
        Ok(())
    }

    /// Removes a definition and its aliases. Returns `false` if `name` was
    /// never a primary name (aliases-only lookups are not accepted here).
    pub fn unregister_macro(&mut self, name: &str) -> bool {
        let Some(def) = self.definitions.shift_remove(name) else {
            return false;
        };
        for alias in &def.aliases {
            self.aliases.shift_remove(&alias.name);
        }
        true
    }

    #[must_use]
    pub fn has_macro(&self, name: &str) -> bool {
        name.starts_with("//") || self.definitions.contains_key(name) || self.aliases.contains_key(name)
    }

    #[must_use]
    pub fn list_macros(&self) -> Vec<&Definition> {
        self.definitions.values().collect()
    }

    /// Resolves `name` to a definition, following one alias hop and stamping
    /// `alias_of` on the returned clone. The `//` comment shorthand takes
    /// precedence over the name table entirely.
    #[must_use]
    pub fn get_macro(&self, name: &str) -> Option<Definition> {
        if name.starts_with("//") {
            return Some(comment_definition());
        }
        if let Some(def) = self.definitions.get(name) {
            return Some(def.clone());
        }
        let primary = self.aliases.get(name)?;
        let def = self.definitions.get(primary)?;
        let mut resolved = def.clone();
        resolved.alias_of = Some(primary.clone());
        Some(resolved)
    }

    /// The full dispatch algorithm: resolve, validate arity, apply defaults,
    /// validate types, split unnamed/list arguments, invoke, and let the
    /// handler normalize its own return value.
    ///
    /// `None` means only one thing: `call.name` resolved to no definition at
    /// all (the unknown-macro case, which §7 requires stay unlogged).
    /// Every other outcome — including a `strict_args` arity/type rejection —
    /// is `Some`, since `strict_args = false` must still invoke the handler
    /// after only warning, so the reject-with-raw path lives here rather than
    /// being a second signal the caller has to check for.
    pub fn execute_macro(&self, call: &Call<'_>, diagnostics: &dyn Diagnostics) -> Option<String> {
        let def = self.get_macro(&call.name)?;
        let n = call.args.len();
        let required = def.min_args();
        let positional = def.max_args();
        let list_min = def.list.map_or(0, |l| l.min);
        let list_max = def.list.map_or(0, |l| l.max);

        let arity_ok = required <= n && n <= positional + list_max && (n <= positional || n >= positional + list_min);
        if !arity_ok {
            diagnostics.runtime_warning(
                &call.name,
                &format!("expects {required}..{} argument(s), got {n}", positional + list_max),
            );
            if def.strict_args {
                return Some(call.raw_with_braces.clone());
            }
        }

        let unnamed: Vec<String> = def
            .unnamed_arg_defs
            .iter()
            .enumerate()
            .map(|(i, arg_def)| call.args.get(i).cloned().or_else(|| arg_def.default_value.clone()).unwrap_or_default())
            .collect();
        let list: Vec<String> =
            if def.list.is_some() && n > positional { call.args[positional..].to_vec() } else { Vec::new() };

        for (i, value) in unnamed.iter().enumerate() {
            let arg_def = &def.unnamed_arg_defs[i];
            if !arg_def.arg_type.accepts(value) {
                diagnostics.runtime_warning(
                    &call.name,
                    &format!("argument '{}' expected type {}, got '{value}'", arg_def.name, arg_def.arg_type),
                );
                if def.strict_args {
                    return Some(call.raw_with_braces.clone());
                }
            }
        }

        let ctx = HandlerContext::new(&unnamed, &list, call);
        match (def.handler)(&ctx) {
            HandlerOutcome::Value(v) => Some(v),
            HandlerOutcome::RuntimeError(message) => {
                diagnostics.runtime_warning(&call.name, &message);
                Some(call.raw_with_braces.clone())
            }
            HandlerOutcome::InternalError(message) => {
                diagnostics.internal_error(&call.name, &message);
                Some(call.raw_with_braces.clone())
            }
        }
    }
}

static GLOBAL: OnceLock<RwLock<Registry>> = OnceLock::new();

/// The process-wide registry most embedders share instead of threading a
/// `Registry` through by hand. `Engine` accepts either this or a private one.
pub fn global() -> &'static RwLock<Registry> {
    GLOBAL.get_or_init(|| RwLock::new(Registry::new()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::call::Range;
    use crate::definition::ArgDef;
    use crate::definition::ArgType;
    use crate::diagnostics::{CollectingDiagnostics, NoopDiagnostics};
    use crate::environment::{Bucket, EnvironmentBuilder, RawEnvContext};

    fn make_call<'env>(name: &str, args: Vec<String>, env: &'env crate::environment::Environment) -> Call<'env> {
        Call {
            raw_inner: name.to_string(),
            raw_with_braces: format!("{{{{{name}}}}}"),
            name: name.to_string(),
            range: Range { start_offset: 0, end_offset: 0 },
            args,
            env,
        }
    }

    #[test]
    fn comment_prefix_always_empty() {
        let registry = Registry::new();
        let ctx = RawEnvContext::default();
        let diag = NoopDiagnostics;
        let _ = Bucket::Normal;
        let env = EnvironmentBuilder::new().build_from_raw_env(&ctx, &diag);
        let call = make_call("//anything here", vec!["garbage".into()], &env);
        assert_eq!(registry.execute_macro(&call, &diag), Some(String::new()));
    }

    #[test]
    fn arity_and_type_validation() {
        let mut registry = Registry::new();
        registry
            .register_macro(
                "roll",
                RegisterOptions::new(|ctx: &HandlerContext<'_, '_>| HandlerOutcome::Value(ctx.unnamed_args[0].clone()))
                    .with_args(vec![ArgDef::required("sides", ArgType::Integer)]),
            )
            .unwrap();

        let ctx = RawEnvContext::default();
        let diag = CollectingDiagnostics::new();
        let env = EnvironmentBuilder::new().build_from_raw_env(&ctx, &NoopDiagnostics);

        let bad_arity = make_call("roll", vec![], &env);
        assert_eq!(registry.execute_macro(&bad_arity, &diag), Some("{{roll}}".into()));

        let bad_type = make_call("roll", vec!["abc".into()], &env);
        assert_eq!(registry.execute_macro(&bad_type, &diag), Some("{{roll}}".into()));

        let good = make_call("roll", vec!["20".into()], &env);
        assert_eq!(registry.execute_macro(&good, &diag), Some("20".into()));
        assert_eq!(diag.events().len(), 2);
    }

    #[test]
    fn non_strict_invokes_handler_despite_violation_but_still_warns() {
        let mut registry = Registry::new();
        registry
            .register_macro(
                "loose",
                RegisterOptions::new(|ctx: &HandlerContext<'_, '_>| HandlerOutcome::Value(ctx.unnamed_args[0].clone()))
                    .with_args(vec![ArgDef::required("sides", ArgType::Integer)])
                    .non_strict(),
            )
            .unwrap();

        let ctx = RawEnvContext::default();
        let diag = CollectingDiagnostics::new();
        let env = EnvironmentBuilder::new().build_from_raw_env(&ctx, &NoopDiagnostics);

        let bad_type = make_call("loose", vec!["abc".into()], &env);
        assert_eq!(registry.execute_macro(&bad_type, &diag), Some("abc".into()));
        assert_eq!(diag.events().len(), 1);
    }

    #[test]
    fn unknown_name_returns_none() {
        let registry = Registry::new();
        let ctx = RawEnvContext::default();
        let diag = NoopDiagnostics;
        let env = EnvironmentBuilder::new().build_from_raw_env(&ctx, &diag);
        let call = make_call("nope", vec![], &env);
        assert_eq!(registry.execute_macro(&call, &diag), None);
    }
}
