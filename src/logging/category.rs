// src/logging/category.rs
//! Logger name classification

/// Known logger prefixes and their short category
const CATEGORY_PREFIXES: &[(&str, &str)] = &[
    ("scripts", "script"),
    ("spells", "spell"),
    ("entities", "creature"),
    ("creatures", "creature"),
    ("sql", "db"),
    ("network", "network"),
    ("maps", "map"),
    ("server", "server"),
];

/// Map a logger name to a short category.
///
/// Unknown names fall back to the segment before the first `.`, or the whole name when it has none.
pub fn classify(logger: &str) -> &str {
    for &(prefix, category) in CATEGORY_PREFIXES {
        if logger.starts_with(prefix) {
            return category;
        }
    }

    match logger.find('.') {
        Some(end) => &logger[..end],
        None => logger,
    }
}
