use std::collections::BTreeMap;

use once_cell::sync::Lazy;

/// General merit, the universal last-resort category.
pub const GENERAL_MERIT: &str = "GM";

/// Category code -> ordered chain of categories, as supplied by the server
/// (`fall_back`) or the local config.
pub type FallbackOverrides = BTreeMap<String, Vec<String>>;

static DEFAULT_CHAINS: Lazy<BTreeMap<&'static str, Vec<&'static str>>> = Lazy::new(|| {
    let rows: [(&str, &[&str]); 24] = [
        ("1R", &["1R", "1G", "GM"]),
        ("1K", &["1K", "1G", "GM"]),
        ("1G", &["1G", "GM"]),
        ("2AR", &["2AR", "2AG", "GM"]),
        ("2AK", &["2AK", "2AG", "GM"]),
        ("2AG", &["2AG", "GM"]),
        ("2BR", &["2BR", "2BG", "GM"]),
        ("2BK", &["2BK", "2BG", "GM"]),
        ("2BG", &["2BG", "GM"]),
        ("3AR", &["3AR", "3AG", "GM"]),
        ("3AK", &["3AK", "3AG", "GM"]),
        ("3AG", &["3AG", "GM"]),
        ("3BR", &["3BR", "3BG", "GM"]),
        ("3BK", &["3BK", "3BG", "GM"]),
        ("3BG", &["3BG", "GM"]),
        ("STR", &["STR", "STG", "GM"]),
        ("STK", &["STK", "STG", "GM"]),
        ("STG", &["STG", "GM"]),
        ("SCR", &["SCR", "SCG", "GM"]),
        ("SCK", &["SCK", "SCG", "GM"]),
        ("SCG", &["SCG", "GM"]),
        ("GMR", &["GMR", "GM"]),
        ("GMK", &["GMK", "GM"]),
        ("GM", &["GM"]),
    ];
    rows.into_iter()
        .map(|(category, chain)| (category, chain.to_vec()))
        .collect()
});

/// Expands `category` into the ordered list of categories to evaluate.
///
/// A non-empty override entry is returned verbatim. Otherwise the static
/// table is consulted, and unknown categories get `[category, "GM"]`.
pub fn resolve_fallback_chain(
    category: &str,
    overrides: Option<&FallbackOverrides>,
) -> Vec<String> {
    if let Some(chain) = overrides
        .and_then(|map| map.get(category))
        .filter(|chain| !chain.is_empty())
    {
        return chain.clone();
    }

    if let Some(chain) = DEFAULT_CHAINS.get(category) {
        return chain.iter().map(|c| c.to_string()).collect();
    }

    vec![category.to_string(), GENERAL_MERIT.to_string()]
}

/// Categories known to the static table, in code order.
pub fn known_categories() -> Vec<&'static str> {
    DEFAULT_CHAINS.keys().copied().collect()
}

/// Merges two override maps; non-empty entries in `top` replace `base`.
pub fn layer_overrides(
    base: &FallbackOverrides,
    top: Option<&FallbackOverrides>,
) -> FallbackOverrides {
    let mut merged = base.clone();
    if let Some(top) = top {
        for (category, chain) in top {
            if !chain.is_empty() {
                merged.insert(category.clone(), chain.clone());
            }
        }
    }
    merged
}
