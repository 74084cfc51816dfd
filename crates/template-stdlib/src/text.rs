//! `{{reverse::text}}`: reverses its single argument by code point.

use template_engine::{ArgDef, ArgType, HandlerContext, HandlerOutcome, RegisterOptions, Registry, RegistrationError};

pub fn register(registry: &mut Registry) -> Result<(), RegistrationError> {
    registry.register_macro(
        "reverse",
        RegisterOptions::new(|ctx: &HandlerContext<'_, '_>| {
            HandlerOutcome::Value(ctx.unnamed_args[0].chars().rev().collect())
        })
        .with_args(vec![ArgDef::required("text", ArgType::String)]),
    )?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use template_engine::{Call, CollectingDiagnostics, EnvironmentBuilder, Range, RawEnvContext};

    #[test]
    fn reverses_ascii() {
        let mut registry = Registry::new();
        register(&mut registry).unwrap();
        let diag = CollectingDiagnostics::new();
        let ctx = RawEnvContext::default();
        let env = EnvironmentBuilder::new().build_from_raw_env(&ctx, &diag);
        let call = Call {
            name: "reverse".to_string(),
            args: vec!["abc".to_string()],
            raw_inner: "reverse::abc".to_string(),
            raw_with_braces: "{{reverse::abc}}".to_string(),
            range: Range { start_offset: 0, end_offset: 0 },
            env: &env,
        };
        assert_eq!(registry.execute_macro(&call, &diag), Some("cba".to_string()));
    }
}
