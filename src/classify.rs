//! Category text → [`Discipline`] classification.

use crate::types::Discipline;

/// Ordered keyword rules; the first rule with a keyword contained in the category wins.
const RULES: &[(&[&str], Discipline)] = &[
    (&["pipe", "duct", "cable", "equipment"], Discipline::Mep),
    (&["concrete", "steel", "masonry"], Discipline::Structural),
    (&["finish", "insulation"], Discipline::Architecture),
];

/// Derive a discipline from free-text category, e.g. a worksheet name.
///
/// Matching is a case-insensitive substring test. Blank categories and categories matching no
/// rule are [`Discipline::General`].
///
/// ```rust
/// use material_catalog::classify::classify;
/// use material_catalog::types::Discipline;
///
/// assert_eq!(classify("Reinforced Concrete"), Discipline::Structural);
/// assert_eq!(classify("Chilled Water Pipes"), Discipline::Mep);
/// ```
pub fn classify(category: &str) -> Discipline {
    let category = category.trim();
    if category.is_empty() {
        return Discipline::General;
    }

    let lowered = category.to_lowercase();
    RULES
        .iter()
        .find(|(keywords, _)| keywords.iter().any(|k| lowered.contains(*k)))
        .map(|(_, discipline)| *discipline)
        .unwrap_or(Discipline::General)
}
