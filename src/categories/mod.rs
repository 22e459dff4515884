pub mod fallback;
pub mod round;

pub use fallback::{layer_overrides, resolve_fallback_chain, FallbackOverrides, GENERAL_MERIT};
pub use round::{Round, RoundParseError};

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
#[error("category code cannot be empty")]
pub struct CategoryParseError;

/// Normalizes user-supplied category input ("2ag " -> "2AG").
pub fn parse_category(raw: &str) -> Result<String, CategoryParseError> {
    let normalized = raw.trim().to_ascii_uppercase();
    if normalized.is_empty() {
        return Err(CategoryParseError);
    }
    Ok(normalized)
}

#[cfg(test)]
mod tests {
    use super::{parse_category, CategoryParseError};

    #[test]
    fn uppercases_and_trims_category_codes() {
        assert_eq!(parse_category(" 2ag ").expect("valid category"), "2AG");
        assert_eq!(parse_category("GM").expect("valid category"), "GM");
    }

    #[test]
    fn rejects_blank_category() {
        assert_eq!(parse_category("   "), Err(CategoryParseError));
    }
}
