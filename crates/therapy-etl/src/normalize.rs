//! Record cleanup applied before writing.

use std::collections::HashSet;

use therapy_core::TherapyRecord;

/// Clean a record in place.
///
/// - every list is trimmed and loses empty entries
/// - aliases and trade names are deduplicated case-insensitively, keeping the
///   first spelling seen; the label is removed from the aliases
/// - an alias or trade-name list with more than `max_list_len` distinct
///   values is dropped entirely
/// - identifier lists lose exact duplicates and the concept's own id
pub fn normalize(record: &mut TherapyRecord, max_list_len: usize) {
    record.label = record
        .label
        .take()
        .map(|label| label.trim().to_string())
        .filter(|label| !label.is_empty());

    let mut aliases = dedupe_case_insensitive(std::mem::take(&mut record.aliases));
    if let Some(label) = &record.label {
        let folded = label.to_lowercase();
        aliases.retain(|alias| alias.to_lowercase() != folded);
    }
    record.aliases = cap_list(aliases, max_list_len, &record.concept_id, "aliases");

    let trade_names = dedupe_case_insensitive(std::mem::take(&mut record.trade_names));
    record.trade_names = cap_list(trade_names, max_list_len, &record.concept_id, "trade_names");

    let own_id = record.concept_id.clone();
    for list in [
        &mut record.xrefs,
        &mut record.associated_with,
        &mut record.rx_brand_ids,
    ] {
        *list = dedupe_exact(std::mem::take(list));
        list.retain(|id| *id != own_id);
    }
}

/// Keep the first spelling of each case-folded value, in order.
pub fn dedupe_case_insensitive(values: Vec<String>) -> Vec<String> {
    let mut seen = HashSet::new();
    values
        .into_iter()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty() && seen.insert(v.to_lowercase()))
        .collect()
}

fn dedupe_exact(values: Vec<String>) -> Vec<String> {
    let mut seen = HashSet::new();
    values
        .into_iter()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty() && seen.insert(v.clone()))
        .collect()
}

fn cap_list(values: Vec<String>, max_len: usize, concept_id: &str, field: &str) -> Vec<String> {
    if values.len() > max_len {
        tracing::debug!(concept_id, field, count = values.len(), max_len, "dropping oversized list");
        Vec::new()
    } else {
        values
    }
}
