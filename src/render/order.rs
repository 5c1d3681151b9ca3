use std::collections::{HashMap, HashSet};

use crate::models::Column;

/// Key of the synthetic row-index column prepended to every report.
pub const INDEX_KEY: &str = "__index";
pub const INDEX_LABEL: &str = "מס׳";

pub const SUPPLIER_LABEL: &str = "ספק";

/// Semantic role of a canonical column, used by the width heuristic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SemanticRole {
    Index,
    Identity,
    Text,
    Price,
    Cost,
    Carton,
    Date,
    Other,
}

/// One entry of the product-defined display order: a primary label, the
/// accepted synonym labels, and the semantic role. Matching is by exact
/// label, primary first, then synonyms in order.
struct CanonicalEntry {
    label: &'static str,
    synonyms: &'static [&'static str],
    role: SemanticRole,
}

const CANONICAL_ORDER: &[CanonicalEntry] = &[
    CanonicalEntry {
        label: "שם מוצר",
        synonyms: &["שם מוצר "],
        role: SemanticRole::Identity,
    },
    CanonicalEntry {
        label: "ספק",
        synonyms: &[],
        role: SemanticRole::Text,
    },
    CanonicalEntry {
        label: "מק״ט",
        synonyms: &["מקט", "מק\"ת", "SKU"],
        role: SemanticRole::Text,
    },
    CanonicalEntry {
        label: "מחיר לפני מע\"מ",
        synonyms: &["מחיר לפני מע״מ", "מחיר לפני מע\"מ "],
        role: SemanticRole::Price,
    },
    CanonicalEntry {
        label: "מחיר עלות",
        synonyms: &["עלות", "עלות מוצר", "עלות (מחיר)"],
        role: SemanticRole::Cost,
    },
    CanonicalEntry {
        label: "מחיר לאחר הנחה",
        synonyms: &["לאחר הנחה", "מחיר אחרי הנחה"],
        role: SemanticRole::Price,
    },
    CanonicalEntry {
        label: "כמות בקרטון",
        synonyms: &["כמות בקרטון ", "כמות/קרטון"],
        role: SemanticRole::Carton,
    },
    CanonicalEntry {
        label: "מחיר לקרטון",
        synonyms: &["מחיר קרטון", "מחיר לקרטון "],
        role: SemanticRole::Carton,
    },
    CanonicalEntry {
        label: "תאריך עדכון",
        synonyms: &["תאריך", "תאריך עדכון "],
        role: SemanticRole::Date,
    },
];

/// Role of a canonical label (primary or synonym). Columns outside the
/// canonical list are `Other`.
pub fn canonical_role(label: &str) -> SemanticRole {
    if label == INDEX_LABEL {
        return SemanticRole::Index;
    }
    CANONICAL_ORDER
        .iter()
        .find_map(|entry| {
            if entry.label == label || entry.synonyms.contains(&label) {
                Some(entry.role)
            } else {
                None
            }
        })
        .unwrap_or(SemanticRole::Other)
}

/// The synthetic index column prepended by the orderer.
pub fn index_column() -> Column {
    Column {
        key: INDEX_KEY.to_string(),
        label: INDEX_LABEL.to_string(),
        width: None,
    }
}

/// Canonicalize an unordered column set into the fixed display order:
/// index column first, then canonical entries in list order, then any
/// unmatched columns in their original relative order. No column is ever
/// dropped; running the orderer on its own output yields the same order.
pub fn order_for_display(columns: &[Column]) -> Vec<Column> {
    // First occurrence wins when labels collide; later duplicates fall
    // through to the leftover pass keyed by their unique key.
    let mut by_label: HashMap<&str, &Column> = HashMap::new();
    for column in columns {
        by_label.entry(column.label.as_str()).or_insert(column);
    }

    let mut picked = vec![index_column()];
    let mut picked_keys: HashSet<&str> = HashSet::new();
    picked_keys.insert(INDEX_KEY);

    for entry in CANONICAL_ORDER {
        let found = by_label.get(entry.label).copied().or_else(|| {
            entry
                .synonyms
                .iter()
                .find_map(|synonym| by_label.get(synonym).copied())
        });

        if let Some(column) = found {
            if picked_keys.insert(column.key.as_str()) {
                picked.push(column.clone());
            }
        }
    }

    for column in columns {
        if picked_keys.insert(column.key.as_str()) {
            picked.push(column.clone());
        }
    }

    picked
}
