//! Ranked selection of kept articles.
//!
//! Pure: filters to kept items, stable-sorts by score descending (equal
//! scores keep their discovery order), and truncates to the per-subject
//! cap. No I/O, no shared state.

use crate::types::EvaluatedItem;

/// Select the top `limit` kept items, best score first.
pub fn rank(items: Vec<EvaluatedItem>, limit: usize) -> Vec<EvaluatedItem> {
    let mut kept: Vec<EvaluatedItem> = items.into_iter().filter(|item| item.keep).collect();
    // Vec::sort_by is stable, so score ties preserve discovery order.
    kept.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    kept.truncate(limit);
    kept
}
