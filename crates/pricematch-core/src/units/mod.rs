//! Quantity-unit canonicalization.
//!
//! Catalog images and catalog spreadsheets spell the same quantity a dozen
//! ways ("1,5 LT", "1.5L", "400GR", "400 g"). Exact-match filtering against
//! the vector index only works if both sides collapse to one spelling, so
//! [`normalize`] is applied identically at ingestion time and at query time.

/// Keywords that mark a unit as counting pieces rather than measuring
/// weight or volume. Matched case-insensitively by containment.
pub const COUNT_UNIT_KEYWORDS: [&str; 8] = [
    "SOBRE", "UNIDAD", "PAR", "PAQUETE", "PACK", "TABLETA", "BLISTER", "FRASCO",
];

/// Canonicalizes a free-text quantity string into the fixed vocabulary
/// {L, ML, KG, G} with a numeric prefix ("1,5 LT" -> "1.5L").
///
/// Empty or whitespace-only input yields the empty string; callers treat
/// that as "no filter applicable", never as a literal unit.
pub fn normalize(raw: &str) -> String {
    let mut unit: String = raw
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect::<String>()
        .to_uppercase()
        .replace(',', ".");

    if unit.is_empty() {
        return unit;
    }

    // Ordered substitutions, first occurrence each. Longest token first so
    // "LITROS" never degrades to "LS", and volume rules run before weight
    // rules so the G in "KG" is never rewritten.
    const SUBSTITUTIONS: [(&str, &str); 7] = [
        ("LITROS", "L"),
        ("LITRO", "L"),
        ("LT", "L"),
        ("CC", "ML"),
        ("KILOS", "KG"),
        ("GRAMOS", "G"),
        ("GR", "G"),
    ];

    for (from, to) in SUBSTITUTIONS {
        if from == "GRAMOS" {
            // The trailing-K rule sits between the KILOS and GRAMOS rules:
            // "1K" must become "1KG" before any G-rewriting applies.
            if unit.ends_with('K') {
                unit.push('G');
            }
        }
        if let Some(pos) = unit.find(from) {
            unit.replace_range(pos..pos + from.len(), to);
        }
    }

    unit
}

/// Returns `true` when the raw unit counts pieces (packs, sachets, pairs)
/// instead of measuring weight or volume.
pub fn is_count_unit(raw: &str) -> bool {
    let upper = raw.to_uppercase();
    COUNT_UNIT_KEYWORDS
        .iter()
        .any(|keyword| upper.contains(keyword))
}
