//! Coerces the various shapes a handler might want to return into the one
//! string type the engine actually joins back into the output.

use chrono::{DateTime, Utc};
use serde_json::Value as Json;

/// The value shapes a handler can hand to the `normalize` callback in its
/// [`crate::definition::HandlerContext`] rather than formatting by hand.
#[derive(Debug, Clone)]
pub enum NormalizeInput {
    Empty,
    Str(String),
    Int(i64),
    Float(f64),
    Bool(bool),
    Timestamp(DateTime<Utc>),
    Json(Json),
}

#[must_use]
pub fn normalize(value: NormalizeInput) -> String {
    match value {
        NormalizeInput::Empty => String::new(),
        NormalizeInput::Str(s) => s,
        NormalizeInput::Int(i) => i.to_string(),
        NormalizeInput::Float(f) => f.to_string(),
        NormalizeInput::Bool(b) => b.to_string(),
        NormalizeInput::Timestamp(ts) => ts.to_rfc3339(),
        NormalizeInput::Json(v) => serde_json::to_string(&v).unwrap_or_else(|_| v.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_is_empty_string() {
        assert_eq!(normalize(NormalizeInput::Empty), "");
    }

    #[test]
    fn json_falls_back_to_display_on_failure() {
        let v = Json::String("hi".into());
        assert_eq!(normalize(NormalizeInput::Json(v)), "\"hi\"");
    }
}
