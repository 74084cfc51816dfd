//! Fuzz target: full `Engine::evaluate` over arbitrary text against a
//! registry carrying a couple of representative handlers.
//!
//! The engine never fails the document (§7) — a crash here means that
//! promise is broken, not that the input was unrecognized.

#![no_main]

use std::sync::RwLock;

use libfuzzer_sys::fuzz_target;

use template_engine::{
    ArgDef, ArgType, Engine, EnvironmentBuilder, HandlerContext, HandlerOutcome, NoopDiagnostics, RawEnvContext,
    RegisterOptions, Registry,
};

fn registry() -> Registry {
    let mut registry = Registry::new();
    let _ = registry.register_macro(
        "reverse",
        RegisterOptions::new(|ctx: &HandlerContext<'_, '_>| HandlerOutcome::Value(ctx.unnamed_args[0].chars().rev().collect()))
            .with_args(vec![ArgDef::required("text", ArgType::String)]),
    );
    registry
}

fuzz_target!(|data: &[u8]| {
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };
    if text.len() > 16384 {
        return;
    }

    let diagnostics = NoopDiagnostics;
    let registry = RwLock::new(registry());
    let ctx = RawEnvContext { name1: "User".into(), name2: "Character".into(), ..Default::default() };
    let env = EnvironmentBuilder::new().build_from_raw_env(&ctx, &diagnostics);
    let engine = Engine::new(&diagnostics);
    let _ = engine.evaluate(text, &env, &registry);
});
