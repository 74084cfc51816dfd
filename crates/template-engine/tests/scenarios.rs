//! End-to-end scenarios against a small hand-built registry, exercising the
//! invariants and concrete cases enumerated for the evaluation pipeline.

use std::sync::RwLock;

use template_engine::{
    ArgDef, ArgType, CollectingDiagnostics, Engine, EnvironmentBuilder, HandlerContext, HandlerOutcome,
    RawEnvContext, RegisterOptions, Registry,
};

fn registry() -> Registry {
    let mut registry = Registry::new();

    registry
        .register_macro(
            "newline",
            RegisterOptions::new(|_ctx: &HandlerContext<'_, '_>| HandlerOutcome::Value("\n".to_string())),
        )
        .unwrap();

    registry
        .register_macro(
            "setvar",
            RegisterOptions::new(|ctx: &HandlerContext<'_, '_>| {
                ctx.env.extra.borrow_mut().insert(ctx.unnamed_args[0].clone(), ctx.unnamed_args[1].clone());
                HandlerOutcome::Value(String::new())
            })
            .with_args(vec![ArgDef::required("key", ArgType::String), ArgDef::required("value", ArgType::String)]),
        )
        .unwrap();

    registry
        .register_macro(
            "getvar",
            RegisterOptions::new(|ctx: &HandlerContext<'_, '_>| {
                HandlerOutcome::Value(ctx.env.extra.borrow().get(&ctx.unnamed_args[0]).cloned().unwrap_or_default())
            })
            .with_args(vec![ArgDef::required("key", ArgType::String)]),
        )
        .unwrap();

    registry
        .register_macro(
            "reverse",
            RegisterOptions::new(|ctx: &HandlerContext<'_, '_>| {
                HandlerOutcome::Value(ctx.unnamed_args[0].chars().rev().collect())
            })
            .with_args(vec![ArgDef::required("text", ArgType::String)]),
        )
        .unwrap();

    registry
        .register_macro(
            "user",
            RegisterOptions::new(|ctx: &HandlerContext<'_, '_>| HandlerOutcome::Value(ctx.env.names.user.clone())),
        )
        .unwrap();

    registry
        .register_macro(
            "char",
            RegisterOptions::new(|ctx: &HandlerContext<'_, '_>| HandlerOutcome::Value(ctx.env.names.char.clone())),
        )
        .unwrap();

    registry
        .register_macro(
            "test-int-strict",
            RegisterOptions::new(|ctx: &HandlerContext<'_, '_>| HandlerOutcome::Value(ctx.unnamed_args[0].clone()))
                .with_args(vec![ArgDef::required("n", ArgType::Integer)]),
        )
        .unwrap();

    registry
}

fn eval(input: &str) -> String {
    let diagnostics = CollectingDiagnostics::new();
    let lock = RwLock::new(registry());
    let ctx = RawEnvContext { name1: "User".into(), name2: "Character".into(), ..Default::default() };
    let env = EnvironmentBuilder::new().build_from_raw_env(&ctx, &diagnostics);
    let engine = Engine::new(&diagnostics);
    engine.evaluate(input, &env, &lock)
}

fn eval_with_diagnostics(input: &str) -> (String, CollectingDiagnostics) {
    let diagnostics = CollectingDiagnostics::new();
    let lock = RwLock::new(registry());
    let ctx = RawEnvContext { name1: "User".into(), name2: "Character".into(), ..Default::default() };
    let env = EnvironmentBuilder::new().build_from_raw_env(&ctx, &diagnostics);
    let engine = Engine::new(&diagnostics);
    let output = engine.evaluate(input, &env, &lock);
    (output, diagnostics)
}

#[test]
fn scenario_01_newline() {
    assert_eq!(eval("Start {{newline}} end."), "Start \n end.");
}

#[test]
fn scenario_02_setvar_getvar_sequencing() {
    assert_eq!(
        eval("A {{setvar::test::4}}{{getvar::test}} B {{setvar::test::2}}{{getvar::test}} C"),
        "A 4 B 2 C"
    );
}

#[test]
fn scenario_03_nested_inside_out() {
    assert_eq!(eval("Result: {{reverse::{{newline}}}}"), "Result: \n");
}

#[test]
fn scenario_04_unknown_preserves_nested_expansion() {
    assert_eq!(eval("Test: {{unknown::my {{newline}} example}}"), "Test: {{unknown::my \n example}}");
}

#[test]
fn scenario_05_trim_strips_surrounding_newlines() {
    assert_eq!(eval("foo\n\n{{trim}}\n\nbar"), "foobar");
}

#[test]
fn scenario_06_quadruple_open_brace() {
    assert_eq!(eval("{{{{char}}"), "{{Character");
}

#[test]
fn scenario_07_unterminated_open_recovers() {
    let (output, diag) = eval_with_diagnostics("Test {{ hehe {{user}}");
    assert_eq!(output, "Test {{ hehe User");
    assert!(diag.events().iter().any(|e| e.channel == template_engine::diagnostics::Channel::SyntaxWarning));
}

#[test]
fn scenario_08_strict_type_violation_preserves_raw() {
    let (output, diag) = eval_with_diagnostics("Value: {{test-int-strict::abc}}");
    assert_eq!(output, "Value: {{test-int-strict::abc}}");
    assert!(diag
        .events()
        .iter()
        .any(|e| e.channel == template_engine::diagnostics::Channel::RuntimeWarning && e.message.contains("integer")));
}

#[test]
fn scenario_09_comment_shorthand() {
    assert_eq!(eval("{{//any // garbage}}X"), "X");
}

#[test]
fn scenario_10_bare_user_marker() {
    assert_eq!(eval("Hello <USER>!"), "Hello User!");
}

#[test]
fn invariant_p2_no_braces_round_trips() {
    let text = "plain prose with no double braces at all, just punctuation! and numbers 123.";
    assert_eq!(eval(text), text);
}

#[test]
fn invariant_p5_sibling_order_is_left_to_right() {
    assert_eq!(
        eval("{{setvar::x::a}}{{getvar::x}}{{setvar::x::b}}{{getvar::x}}"),
        "ab"
    );
}

#[test]
fn invariant_p6_registration_is_total() {
    let mut registry = Registry::new();
    registry
        .register_macro("ok", RegisterOptions::new(|_ctx: &HandlerContext<'_, '_>| HandlerOutcome::Value("y".into())))
        .unwrap();
    assert!(registry.has_macro("ok"));

    let err = registry
        .register_macro("ok", RegisterOptions::new(|_ctx: &HandlerContext<'_, '_>| HandlerOutcome::Value(String::new())))
        .unwrap_err();
    assert!(matches!(err, template_engine::RegistrationError::NameCollision { .. }));
    assert!(registry.has_macro("ok"));
}

#[test]
fn escaped_braces_do_not_open_an_invocation() {
    assert_eq!(eval(r"\{\{char\}\}"), "{{char}}");
}

#[test]
fn legacy_single_colon_and_whitespace_forms_match_double_colon() {
    assert_eq!(eval("{{reverse:abc}}"), "cba");
    assert_eq!(eval("{{reverse abc}}"), "cba");
}
