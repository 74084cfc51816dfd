//! `{{comment ...}}`: the word-form counterpart to the `//` shorthand the
//! registry special-cases directly. Accepts any body, arbitrary argument
//! count, and always yields empty output.
//!
//! `trim` is deliberately absent from this crate: it's never registered as a
//! macro at all, so it survives evaluation as literal `{{trim}}` text and is
//! instead stripped by the engine's postprocessing step, together with the
//! newline runs on either side of it.

use template_engine::{Category, HandlerContext, HandlerOutcome, ListPolicy, RegisterOptions, Registry, RegistrationError};

pub fn register(registry: &mut Registry) -> Result<(), RegistrationError> {
    registry.register_macro(
        "comment",
        RegisterOptions::new(|_ctx: &HandlerContext<'_, '_>| HandlerOutcome::Value(String::new()))
            .with_list(ListPolicy::UNBOUNDED)
            .with_category(Category::Utility)
            .non_strict(),
    )?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use template_engine::{Call, CollectingDiagnostics, EnvironmentBuilder, Range, RawEnvContext};

    #[test]
    fn comment_body_is_discarded() {
        let mut registry = Registry::new();
        register(&mut registry).unwrap();
        let diag = CollectingDiagnostics::new();
        let ctx = RawEnvContext::default();
        let env = EnvironmentBuilder::new().build_from_raw_env(&ctx, &diag);
        let call = Call {
            name: "comment".to_string(),
            args: vec!["this is ignored".to_string()],
            raw_inner: "comment this is ignored".to_string(),
            raw_with_braces: "{{comment this is ignored}}".to_string(),
            range: Range { start_offset: 0, end_offset: 0 },
            env: &env,
        };
        assert_eq!(registry.execute_macro(&call, &diag), Some(String::new()));
    }
}
