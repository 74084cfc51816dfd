//! Identity macros backed by [`template_engine::Names`] and the one-shot
//! `original` accessor.

use template_engine::{Alias, HandlerContext, HandlerOutcome, RegisterOptions, Registry, RegistrationError};

pub fn register(registry: &mut Registry) -> Result<(), RegistrationError> {
    registry.register_macro(
        "user",
        RegisterOptions::new(|ctx: &HandlerContext<'_, '_>| HandlerOutcome::Value(ctx.env.names.user.clone())),
    )?;
    registry.register_macro(
        "char",
        RegisterOptions::new(|ctx: &HandlerContext<'_, '_>| HandlerOutcome::Value(ctx.env.names.char.clone())),
    )?;
    registry.register_macro(
        "group",
        RegisterOptions::new(|ctx: &HandlerContext<'_, '_>| HandlerOutcome::Value(ctx.env.names.group.clone())),
    )?;
    registry.register_macro(
        "group_not_muted",
        RegisterOptions::new(|ctx: &HandlerContext<'_, '_>| HandlerOutcome::Value(ctx.env.names.group_not_muted.clone()))
            .with_aliases(vec![Alias::new("non_muted_group_member")]),
    )?;
    registry.register_macro(
        "charifnotgroup",
        RegisterOptions::new(|ctx: &HandlerContext<'_, '_>| HandlerOutcome::Value(ctx.env.names.not_char.clone())),
    )?;
    registry.register_macro(
        "newline",
        RegisterOptions::new(|_ctx: &HandlerContext<'_, '_>| HandlerOutcome::Value("\n".to_string()))
            .with_aliases(vec![Alias::new("n")]),
    )?;
    registry.register_macro(
        "original",
        RegisterOptions::new(|ctx: &HandlerContext<'_, '_>| HandlerOutcome::Value(ctx.env.functions.original.call())),
    )?;
    Ok(())
}
