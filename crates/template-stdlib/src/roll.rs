//! `{{roll::NdM}}` / `{{roll::NdM+K}}`: dice notation evaluated against the
//! thread-local RNG.

use std::sync::OnceLock;

use rand::Rng;
use regex::Regex;
use template_engine::{
    normalize, ArgDef, ArgType, HandlerContext, HandlerOutcome, NormalizeInput, RegisterOptions, Registry,
    RegistrationError,
};

fn notation_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^(?i)(\d*)d(\d+)\s*([+-]\s*\d+)?$").expect("static pattern is valid"))
}

fn roll_notation(notation: &str) -> Result<i64, String> {
    let caps = notation_re().captures(notation.trim()).ok_or_else(|| format!("invalid dice notation '{notation}'"))?;
    let count: u32 = caps[1].parse().unwrap_or(1).max(1);
    let sides: u32 = caps[2].parse().map_err(|_| format!("invalid dice notation '{notation}'"))?;
    if sides == 0 {
        return Err(format!("invalid dice notation '{notation}': zero-sided die"));
    }
    let modifier: i64 = caps
        .get(3)
        .map(|m| m.as_str().chars().filter(|c| !c.is_whitespace()).collect::<String>().parse().unwrap_or(0))
        .unwrap_or(0);

    let mut rng = rand::thread_rng();
    let mut total: i64 = 0;
    for _ in 0..count {
        total += i64::from(rng.gen_range(1..=sides));
    }
    Ok(total + modifier)
}

pub fn register(registry: &mut Registry) -> Result<(), RegistrationError> {
    registry.register_macro(
        "roll",
        RegisterOptions::new(|ctx: &HandlerContext<'_, '_>| match roll_notation(&ctx.unnamed_args[0]) {
            Ok(total) => HandlerOutcome::Value(normalize(NormalizeInput::Int(total))),
            Err(message) => HandlerOutcome::RuntimeError(message),
        })
        .with_args(vec![ArgDef::required("notation", ArgType::String)]),
    )?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_die_stays_in_range() {
        for _ in 0..50 {
            let total = roll_notation("1d6").unwrap();
            assert!((1..=6).contains(&total));
        }
    }

    #[test]
    fn modifier_is_applied() {
        let total = roll_notation("1d1+5").unwrap();
        assert_eq!(total, 6);
    }

    #[test]
    fn negative_modifier_is_applied() {
        let total = roll_notation("2d1-1").unwrap();
        assert_eq!(total, 1);
    }

    #[test]
    fn malformed_notation_is_an_error() {
        assert!(roll_notation("not-dice").is_err());
        assert!(roll_notation("1d0").is_err());
    }
}
