//! `{{time::UTC}}` / `{{time::UTC+5}}` / `{{time::UTC-3}}`: current time at a
//! fixed UTC offset. The compact `{{time_UTC+5}}` spelling is rewritten to
//! this standard form by the engine's preprocessor before dispatch ever sees it.

use std::sync::OnceLock;

use chrono::{Duration, Utc};
use regex::Regex;
use template_engine::{
    normalize, ArgDef, ArgType, HandlerContext, HandlerOutcome, NormalizeInput, RegisterOptions, Registry,
    RegistrationError,
};

fn zone_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)^utc\s*([+-]\s*\d+)?$").expect("static pattern is valid"))
}

fn offset_hours(zone: &str) -> Result<i64, String> {
    let caps = zone_re().captures(zone.trim()).ok_or_else(|| format!("unsupported time zone '{zone}'"))?;
    Ok(caps
        .get(1)
        .map(|m| m.as_str().chars().filter(|c| !c.is_whitespace()).collect::<String>().parse().unwrap_or(0))
        .unwrap_or(0))
}

pub fn register(registry: &mut Registry) -> Result<(), RegistrationError> {
    registry.register_macro(
        "time",
        RegisterOptions::new(|ctx: &HandlerContext<'_, '_>| match offset_hours(&ctx.unnamed_args[0]) {
            Ok(hours) => {
                let at = Utc::now() + Duration::hours(hours);
                HandlerOutcome::Value(normalize(NormalizeInput::Timestamp(at)))
            }
            Err(message) => HandlerOutcome::RuntimeError(message),
        })
        .with_args(vec![ArgDef::required("zone", ArgType::String)]),
    )?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bare_utc_has_zero_offset() {
        assert_eq!(offset_hours("UTC").unwrap(), 0);
    }

    #[test]
    fn positive_and_negative_offsets_parse() {
        assert_eq!(offset_hours("UTC+5").unwrap(), 5);
        assert_eq!(offset_hours("UTC-3").unwrap(), -3);
    }

    #[test]
    fn unsupported_zone_is_an_error() {
        assert!(offset_hours("EST").is_err());
    }
}
