#![doc = include_str!("../README.md")]

pub mod comment;
pub mod names;
pub mod roll;
pub mod text;
pub mod time;
pub mod variables;

use template_engine::{Registry, RegistrationError};

/// Registers every definition this crate ships: `user`/`char`/`group`/
/// `group_not_muted`/`charifnotgroup`/`newline`/`original`, `setvar`/`getvar`,
/// `roll`, `time`, `reverse`, and `comment`. `trim` is intentionally absent —
/// see [`comment`] for why.
pub fn register_all(registry: &mut Registry) -> Result<(), RegistrationError> {
    names::register(registry)?;
    variables::register(registry)?;
    roll::register(registry)?;
    time::register(registry)?;
    text::register(registry)?;
    comment::register(registry)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn register_all_succeeds_once() {
        let mut registry = Registry::new();
        register_all(&mut registry).unwrap();
        assert!(registry.has_macro("user"));
        assert!(registry.has_macro("roll"));
        assert!(!registry.has_macro("trim"));
    }
}
