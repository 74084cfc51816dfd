//! `setvar`/`getvar`: scratch state scoped to one evaluation, backed by
//! [`template_engine::Environment::extra`]. Relies on the engine's guaranteed
//! left-to-right, top-level evaluation order to make writes visible to
//! later reads within the same document.

use template_engine::{ArgDef, ArgType, HandlerContext, HandlerOutcome, RegisterOptions, Registry, RegistrationError};

pub fn register(registry: &mut Registry) -> Result<(), RegistrationError> {
    registry.register_macro(
        "setvar",
        RegisterOptions::new(|ctx: &HandlerContext<'_, '_>| {
            let key = ctx.unnamed_args[0].clone();
            let value = ctx.unnamed_args[1].clone();
            ctx.env.extra.borrow_mut().insert(key, value);
            HandlerOutcome::Value(String::new())
        })
        .with_args(vec![ArgDef::required("key", ArgType::String), ArgDef::required("value", ArgType::String)]),
    )?;

    registry.register_macro(
        "getvar",
        RegisterOptions::new(|ctx: &HandlerContext<'_, '_>| {
            let value = ctx.env.extra.borrow().get(ctx.unnamed_args[0].as_str()).cloned().unwrap_or_default();
            HandlerOutcome::Value(value)
        })
        .with_args(vec![ArgDef::required("key", ArgType::String)]),
    )?;

    Ok(())
}
