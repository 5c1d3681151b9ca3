use once_cell::sync::Lazy;
use regex::Regex;

use crate::models::Column;

/// Exact label of the product-name column. Triggers wide, wrapping, bold
/// rendering.
pub const PRODUCT_NAME_LABEL: &str = "שם מוצר";

/// Classification flags derived from a column label.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ColumnKind {
    pub numeric: bool,
    pub cost: bool,
    pub identity_name: bool,
}

/// Label pattern → classification flags. Matching is substring-based so label
/// variants like "מחיר לקרטון" or "total price" still classify. New languages
/// or synonyms are new rows here, not new code.
struct LabelRule {
    pattern: &'static str,
    numeric: bool,
    cost: bool,
}

const LABEL_RULES: &[LabelRule] = &[
    // Bilingual numeric keywords: price / quantity / total / cost / stock /
    // number / SKU.
    LabelRule {
        pattern: r#"(?i)מחיר|כמות|סה"כ|סה״כ|עלות|מלאי|מספר|מק״ט|quantity|qty|price|total|sku"#,
        numeric: true,
        cost: false,
    },
    // Cost figures get bold emphasis; narrower subset of numeric.
    LabelRule {
        pattern: "עלות",
        numeric: false,
        cost: true,
    },
];

static COMPILED_RULES: Lazy<Vec<(Regex, &'static LabelRule)>> = Lazy::new(|| {
    LABEL_RULES
        .iter()
        .map(|rule| {
            let regex = Regex::new(rule.pattern).expect("invalid label rule pattern");
            (regex, rule)
        })
        .collect()
});

/// Classify a column label. Pure; an empty label yields all-false flags.
pub fn classify_label(label: &str) -> ColumnKind {
    let mut kind = ColumnKind::default();
    if label.is_empty() {
        return kind;
    }

    for (regex, rule) in COMPILED_RULES.iter() {
        if regex.is_match(label) {
            kind.numeric |= rule.numeric;
            kind.cost |= rule.cost;
        }
    }
    kind.identity_name = label == PRODUCT_NAME_LABEL;
    kind
}

pub fn classify(column: &Column) -> ColumnKind {
    classify_label(&column.label)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn cost_label_is_numeric_and_cost() {
        let kind = classify_label("מחיר עלות");
        assert!(kind.numeric);
        assert!(kind.cost);
        assert!(!kind.identity_name);
    }

    #[test]
    fn notes_label_is_neither() {
        let kind = classify_label("הערות");
        assert_eq!(kind, ColumnKind::default());
    }

    #[test]
    fn hebrew_numeric_keywords_match_as_substrings() {
        for label in ["מחיר לקרטון", "כמות בקרטון", "מלאי נוכחי", "מק״ט"] {
            assert!(classify_label(label).numeric, "expected numeric: {label}");
        }
    }

    #[test]
    fn english_numeric_keywords_are_case_insensitive() {
        for label in ["Total Price", "QTY", "Sku", "quantity on hand"] {
            assert!(classify_label(label).numeric, "expected numeric: {label}");
        }
    }

    #[test]
    fn product_name_label_matches_exactly() {
        assert!(classify_label("שם מוצר").identity_name);
        // Trailing whitespace is a synonym for ordering, not for identity
        // styling.
        assert!(!classify_label("שם מוצר ").identity_name);
    }

    #[test]
    fn empty_label_is_all_false() {
        assert_eq!(classify_label(""), ColumnKind::default());
    }

    #[test]
    fn cost_subset_of_numeric_keyword_set() {
        let kind = classify_label("עלות נטו");
        assert!(kind.numeric);
        assert!(kind.cost);
    }
}
